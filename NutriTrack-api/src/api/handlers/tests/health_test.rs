#[cfg(test)]
mod health_tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use nutri_track_data::repository::InMemoryStorage;
    use nutri_track_domain::health::{
        ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus,
    };
    use nutri_track_domain::testing::InMemoryBackend;
    use nutri_track_domain::NutritionAppBuilder;

    use crate::api::handlers::health_check;
    use crate::api::state::AppState;

    // Reports whatever it was configured with
    #[derive(Debug)]
    struct StaticHealthService {
        status: SystemStatus,
        components: HashMap<String, HealthComponent>,
    }

    impl StaticHealthService {
        fn new(status: SystemStatus) -> Self {
            Self {
                status,
                components: HashMap::new(),
            }
        }

        fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<&str>) -> Self {
            self.components.insert(
                name.to_string(),
                HealthComponent {
                    status,
                    details: details.map(str::to_string),
                },
            );
            self
        }
    }

    #[async_trait]
    impl HealthServiceTrait for StaticHealthService {
        async fn get_system_health(&self) -> SystemHealth {
            SystemHealth {
                status: self.status.clone(),
                components: self.components.clone(),
            }
        }

        async fn check_storage_status(&self) -> Result<(), String> {
            match self.components.get("storage") {
                Some(c) if c.status == ComponentStatus::Unhealthy => Err("storage down".to_string()),
                _ => Ok(()),
            }
        }

        async fn check_backend_status(&self) -> Result<(), String> {
            match self.components.get("backend") {
                Some(c) if c.status != ComponentStatus::Healthy => Err("backend down".to_string()),
                _ => Ok(()),
            }
        }
    }

    fn state_with(health: StaticHealthService) -> AppState {
        let (mut app, _worker) =
            NutritionAppBuilder::with_remote(Arc::new(InMemoryStorage::new()), Arc::new(InMemoryBackend::new()))
                .build();
        app.health = Arc::new(health);
        AppState::new(app, "test")
    }

    async fn call(state: AppState) -> (StatusCode, Value) {
        let response = health_check(State(state)).await.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_healthy() {
        let health = StaticHealthService::new(SystemStatus::Healthy)
            .with_component("storage", ComponentStatus::Healthy, None)
            .with_component("backend", ComponentStatus::Healthy, None);

        let (status, body) = call(state_with(health)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["components"]["storage"]["status"], "ok");
        assert!(body["components"]["storage"].get("message").is_none());
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["uptime"].as_i64().unwrap() >= 0);
    }

    #[tokio::test]
    async fn test_degraded_backend_still_serves() {
        let health = StaticHealthService::new(SystemStatus::Degraded)
            .with_component("storage", ComponentStatus::Healthy, None)
            .with_component("backend", ComponentStatus::Degraded, Some("Backend unreachable: timeout"));

        let (status, body) = call(state_with(health)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["components"]["backend"]["status"], "degraded");
        assert_eq!(body["components"]["backend"]["message"], "Backend unreachable: timeout");
    }

    #[tokio::test]
    async fn test_unhealthy_storage_is_unavailable() {
        let health = StaticHealthService::new(SystemStatus::Unhealthy)
            .with_component("storage", ComponentStatus::Unhealthy, Some("Storage error: disk I/O"))
            .with_component("backend", ComponentStatus::Healthy, None);

        let (status, body) = call(state_with(health)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "error");
        assert_eq!(body["components"]["storage"]["status"], "error");
    }

    #[tokio::test]
    async fn test_missing_component_is_reported() {
        let health = StaticHealthService::new(SystemStatus::Healthy)
            .with_component("storage", ComponentStatus::Healthy, None);

        let (_, body) = call(state_with(health)).await;

        assert_eq!(body["components"]["backend"]["status"], "error");
        assert_eq!(body["components"]["backend"]["message"], "Component was not checked");
    }

    #[test]
    fn test_trait_object_component_checks() {
        let service: Arc<dyn HealthServiceTrait> = Arc::new(
            StaticHealthService::new(SystemStatus::Degraded)
                .with_component("backend", ComponentStatus::Degraded, None),
        );

        assert!(tokio_test::block_on(service.check_storage_status()).is_ok());
        assert!(tokio_test::block_on(service.check_backend_status()).is_err());
    }
}
