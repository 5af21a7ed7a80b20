use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use nutri_track_domain::health::{ComponentStatus as DomainComponentStatus, HealthComponent, SystemStatus};

use crate::api::state::AppState;

/// Health check response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Unix timestamp of when the response was generated
    pub timestamp: i64,
    /// Uptime of the service in seconds
    pub uptime: i64,
    /// Details about the components of the system
    pub components: ComponentStatus,
    /// Environment information
    pub environment: String,
}

/// Status of individual system components
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// Local key-value store
    pub storage: ComponentHealthStatus,
    /// External nutrition backend
    pub backend: ComponentHealthStatus,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Option<&HealthComponent>> for ComponentHealthStatus {
    fn from(component: Option<&HealthComponent>) -> Self {
        match component {
            Some(component) => Self {
                status: map_component_status(&component.status),
                message: component.details.clone(),
            },
            None => Self {
                status: "error".to_string(),
                message: Some("Component was not checked".to_string()),
            },
        }
    }
}

/// Health check endpoint. A degraded service (backend unreachable) still
/// answers 200 because every local feature keeps working offline.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy or degraded", body = HealthResponse),
        (status = 503, description = "Local storage is not usable", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");

    let now = state.app.clock.now();
    let system_health = state.app.health.get_system_health().await;

    let (overall_status, code) = match system_health.status {
        SystemStatus::Healthy => ("ok", StatusCode::OK),
        SystemStatus::Degraded => ("degraded", StatusCode::OK),
        SystemStatus::Unhealthy => ("error", StatusCode::SERVICE_UNAVAILABLE),
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now.timestamp(),
        uptime: (now - state.started_at).num_seconds().max(0),
        components: ComponentStatus {
            storage: system_health.components.get("storage").into(),
            backend: system_health.components.get("backend").into(),
        },
        environment: state.environment.clone(),
    };

    (code, Json(response))
}

/// Map domain component status to API status string
fn map_component_status(status: &DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }
    .to_string()
}
