use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    AuthRemote, AuthResponse, CalculateProfileRequest, CalculateProfileResponse, FoodAnalysis,
    FoodImage, MealListResponse, MealSyncPayload, MealSyncResponse, NutritionBackend,
    ProfileSyncPayload, ProfileSyncResponse, RemoteConfig, RemoteError, RemoteMeal, RemoteUser,
    SyncRemote,
};
use crate::auth::{LoginRequest, RegisterRequest};

/// reqwest client for every backend endpoint
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: RemoteConfig,
}

impl HttpBackend {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await.map_err(map_transport_error)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

fn map_transport_error(error: reqwest::Error) -> RemoteError {
    if error.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Transport(error.to_string())
    }
}

/// Turn a non-success response into an error carrying the server's message.
/// The backend reports failures as `{"detail": "..."}`; validation failures
/// carry a list of `{"msg": ...}` objects instead.
async fn error_from_response(response: Response) -> RemoteError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = detail_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });

    debug!("Backend returned {}: {}", status, message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized(message),
        _ => RemoteError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

fn detail_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str).map(String::from))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

#[async_trait]
impl SyncRemote for HttpBackend {
    async fn push_profile(&self, token: &str, payload: &ProfileSyncPayload) -> Result<(), RemoteError> {
        let request = self
            .client
            .post(self.url("/sync/profile"))
            .bearer_auth(token)
            .json(payload);
        self.send(request).await.map(|_| ())
    }

    async fn fetch_profile(&self, token: &str) -> Result<ProfileSyncResponse, RemoteError> {
        let request = self.client.get(self.url("/sync/profile")).bearer_auth(token);
        match self.send_json(request).await {
            Err(RemoteError::Server { status: 404, .. }) => Ok(ProfileSyncResponse::default()),
            other => other,
        }
    }

    async fn push_meals(&self, token: &str, meals: &[RemoteMeal]) -> Result<MealSyncResponse, RemoteError> {
        let payload = MealSyncPayload {
            meals: meals.to_vec(),
        };
        let request = self
            .client
            .post(self.url("/sync/meals"))
            .bearer_auth(token)
            .json(&payload);
        self.send_json(request).await
    }

    async fn fetch_meals(
        &self,
        token: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RemoteMeal>, RemoteError> {
        let request = self
            .client
            .get(self.url("/sync/meals"))
            .bearer_auth(token)
            .query(&[
                ("from_date", from.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("to_date", to.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ]);
        let response: MealListResponse = self.send_json(request).await?;
        Ok(response.meals)
    }
}

#[async_trait]
impl AuthRemote for HttpBackend {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, RemoteError> {
        self.send_json(self.client.post(self.url("/auth/register")).json(request))
            .await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, RemoteError> {
        self.send_json(self.client.post(self.url("/auth/login")).json(request))
            .await
    }

    async fn current_user(&self, token: &str) -> Result<RemoteUser, RemoteError> {
        self.send_json(self.client.get(self.url("/auth/me")).bearer_auth(token))
            .await
    }
}

#[async_trait]
impl NutritionBackend for HttpBackend {
    async fn calculate_profile(
        &self,
        request: &CalculateProfileRequest,
    ) -> Result<CalculateProfileResponse, RemoteError> {
        self.send_json(self.client.post(self.url("/profile/calculate")).json(request))
            .await
    }

    async fn analyze_food(&self, image: &FoodImage) -> Result<FoodAnalysis, RemoteError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| RemoteError::Transport(format!("Invalid content type: {}", e)))?;
        let form = Form::new().part("image", part);

        let request = self
            .client
            .post(self.url("/analyze-food"))
            .timeout(self.config.analysis_timeout)
            .multipart(form);

        let result = self.send_json(request).await;
        if let Err(RemoteError::Timeout) = &result {
            warn!("Food analysis timed out after {:?}", self.config.analysis_timeout);
        }
        result
    }

    async fn health_check(&self) -> Result<(), RemoteError> {
        self.send(self.client.get(self.url("/health"))).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MealType;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> HttpBackend {
        HttpBackend::new(RemoteConfig {
            base_url: server.uri(),
            analysis_timeout: Duration::from_millis(200),
        })
    }

    fn remote_meal() -> RemoteMeal {
        RemoteMeal {
            id: Some("m1".to_string()),
            food_id: "oats".to_string(),
            food_name: "Avena".to_string(),
            emoji: "🥣".to_string(),
            grams: 40.0,
            calories: 150.0,
            protein: 5.0,
            carbs: 27.0,
            fat: 3.0,
            meal_type: MealType::Breakfast,
            timestamp: "2024-05-01T07:30:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_push_meals_sends_bearer_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sync/meals"))
            .and(header("authorization", "Bearer tok"))
            .and(body_partial_json(json!({"meals": [{"foodId": "oats", "mealType": "breakfast"}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "synced": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let response = backend_for(&server)
            .push_meals("tok", &[remote_meal()])
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.synced, 1);
    }

    #[tokio::test]
    async fn test_fetch_meals_passes_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sync/meals"))
            .and(query_param("from_date", "2024-05-01T00:00:00Z"))
            .and(query_param("to_date", "2024-05-08T00:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meals": [remote_meal()]})))
            .mount(&server)
            .await;

        let from = "2024-05-01T00:00:00Z".parse().unwrap();
        let to = "2024-05-08T00:00:00Z".parse().unwrap();
        let meals = backend_for(&server).fetch_meals("tok", from, to).await.unwrap();
        assert_eq!(meals, vec![remote_meal()]);
    }

    #[tokio::test]
    async fn test_missing_profile_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sync/profile"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
            .mount(&server)
            .await;

        let response = backend_for(&server).fetch_profile("tok").await.unwrap();
        assert!(response.into_complete().is_none());
    }

    #[tokio::test]
    async fn test_server_detail_becomes_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Incorrect email or password"})),
            )
            .mount(&server)
            .await;

        let request = LoginRequest {
            email: "a@b.co".to_string(),
            password: "secret1".to_string(),
        };
        let error = backend_for(&server).login(&request).await.unwrap_err();
        assert_eq!(
            error,
            RemoteError::Server {
                status: 400,
                message: "Incorrect email or password".to_string()
            }
        );
        assert_eq!(error.to_string(), "Incorrect email or password");
    }

    #[tokio::test]
    async fn test_validation_detail_list_is_joined() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "detail": [{"msg": "value is not a valid email"}, {"msg": "too short"}]
            })))
            .mount(&server)
            .await;

        let request = RegisterRequest {
            email: "x@y.z".to_string(),
            username: "abc".to_string(),
            password: "123456".to_string(),
        };
        let error = backend_for(&server).register(&request).await.unwrap_err();
        assert_eq!(error.to_string(), "value is not a valid email; too short");
    }

    #[tokio::test]
    async fn test_unauthorized_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})))
            .mount(&server)
            .await;

        let error = backend_for(&server).current_user("stale").await.unwrap_err();
        assert!(error.is_unauthorized());
    }

    #[tokio::test]
    async fn test_analysis_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze-food"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(json!({"success": true})),
            )
            .mount(&server)
            .await;

        let image = FoodImage {
            bytes: vec![0xFF, 0xD8, 0xFF],
            file_name: "meal.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        };
        let error = backend_for(&server).analyze_food(&image).await.unwrap_err();
        assert_eq!(error, RemoteError::Timeout);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let backend = HttpBackend::new(RemoteConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            analysis_timeout: Duration::from_secs(1),
        });
        let error = backend.health_check().await.unwrap_err();
        assert!(error.is_transport());
    }
}
