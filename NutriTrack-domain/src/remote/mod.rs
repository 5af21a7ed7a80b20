//! External collaborators: the sync, auth, calculation and analysis
//! services. The domain only talks to them through these traits.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

#[cfg(test)]
use mockall::automock;

pub mod dto;
#[cfg(feature = "with-http")]
pub mod http;

pub use dto::*;
#[cfg(feature = "with-http")]
pub use http::HttpBackend;

use crate::auth::{LoginRequest, RegisterRequest};

/// Failure talking to the backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    /// Connection refused, DNS failure, broken pipe ...
    #[error("Network error: {0}")]
    Transport(String),

    #[error("The request timed out")]
    Timeout,

    /// Credential missing, expired or rejected (401/403)
    #[error("{0}")]
    Unauthorized(String),

    /// Any other non-success status, with the server's own message
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RemoteError::Unauthorized(_))
    }

    /// Whether the request never got an answer from the server
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Transport(_) | RemoteError::Timeout)
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SyncRemote: Send + Sync {
    async fn push_profile(&self, token: &str, payload: &ProfileSyncPayload) -> Result<(), RemoteError>;

    async fn fetch_profile(&self, token: &str) -> Result<ProfileSyncResponse, RemoteError>;

    /// Upload the full meal collection
    async fn push_meals(&self, token: &str, meals: &[RemoteMeal]) -> Result<MealSyncResponse, RemoteError>;

    /// Meals logged within `[from, to]`
    async fn fetch_meals(
        &self,
        token: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RemoteMeal>, RemoteError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthRemote: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, RemoteError>;

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, RemoteError>;

    /// Validate a credential and return its owner
    async fn current_user(&self, token: &str) -> Result<RemoteUser, RemoteError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait NutritionBackend: Send + Sync {
    async fn calculate_profile(
        &self,
        request: &CalculateProfileRequest,
    ) -> Result<CalculateProfileResponse, RemoteError>;

    async fn analyze_food(&self, image: &FoodImage) -> Result<FoodAnalysis, RemoteError>;

    async fn health_check(&self) -> Result<(), RemoteError>;
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    /// Base URL including any path prefix, without a trailing slash
    pub base_url: String,
    /// Fixed timeout of the food analysis call
    pub analysis_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            analysis_timeout: Duration::from_secs(120),
        }
    }
}

impl RemoteConfig {
    /// Read `NUTRI_BACKEND_URL` and `NUTRI_ANALYSIS_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = env::var("NUTRI_BACKEND_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let analysis_timeout = env::var("NUTRI_ANALYSIS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.analysis_timeout);

        info!("Backend configuration: url={}, analysis_timeout={:?}", base_url, analysis_timeout);

        Self {
            base_url,
            analysis_timeout,
        }
    }
}
