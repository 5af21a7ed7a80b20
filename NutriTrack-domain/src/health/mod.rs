//! Health checks for the local store and the external backend

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use nutri_track_data::models::StorageKey;
use nutri_track_data::repository::KeyValueStore;

use crate::remote::NutritionBackend;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the local key-value store
    async fn check_storage_status(&self) -> Result<(), String>;

    /// Check the external backend
    async fn check_backend_status(&self) -> Result<(), String>;
}

/// Health of the local store and the backend. The app works offline, so
/// an unreachable backend only degrades the system.
pub struct DefaultHealthService {
    storage: Arc<dyn KeyValueStore>,
    backend: Arc<dyn NutritionBackend>,
}

impl fmt::Debug for DefaultHealthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultHealthService")
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl DefaultHealthService {
    pub fn new(storage: Arc<dyn KeyValueStore>, backend: Arc<dyn NutritionBackend>) -> Self {
        Self { storage, backend }
    }
}

#[async_trait]
impl HealthServiceTrait for DefaultHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let storage = match self.check_storage_status().await {
            Ok(()) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let backend = match self.check_backend_status().await {
            Ok(()) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some(e),
            },
        };

        let status = if storage.status == ComponentStatus::Unhealthy {
            SystemStatus::Unhealthy
        } else if backend.status != ComponentStatus::Healthy {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        SystemHealth {
            status,
            components: vec![
                ("storage".to_string(), storage),
                ("backend".to_string(), backend),
            ]
            .into_iter()
            .collect(),
        }
    }

    async fn check_storage_status(&self) -> Result<(), String> {
        self.storage
            .contains(StorageKey::User)
            .map(|_| ())
            .map_err(|e| format!("Storage error: {}", e))
    }

    async fn check_backend_status(&self) -> Result<(), String> {
        self.backend
            .health_check()
            .await
            .map_err(|e| format!("Backend unreachable: {}", e))
    }
}

/// Create the default health service
pub fn create_default_health_service(
    storage: Arc<dyn KeyValueStore>,
    backend: Arc<dyn NutritionBackend>,
) -> Arc<dyn HealthServiceTrait> {
    Arc::new(DefaultHealthService::new(storage, backend))
}
