//! Mapping of domain failures to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use nutri_track_domain::auth::AuthError;
use nutri_track_domain::remote::RemoteError;
use nutri_track_domain::services::{
    AccountError, AnalysisError, MealServiceError, PlanError, ProfileServiceError, SyncError,
};
use nutri_track_domain::stores::StoreError;

use crate::entities::common::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("The requested {0} could not be found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unprocessable(String),

    /// The backend answered with an error
    #[error("{0}")]
    Backend(String),

    /// The backend could not be reached
    #[error("{0}")]
    BackendUnavailable(String),

    #[error("An unexpected error occurred")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Backend(_) => StatusCode::BAD_GATEWAY,
            ApiError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unprocessable(_) => "unprocessable",
            ApiError::Backend(_) => "backend_error",
            ApiError::BackendUnavailable(_) => "backend_unavailable",
            ApiError::Internal => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }
        let body = ErrorResponse::new(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{}: {}", field, reasons.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");
        ApiError::Validation(message)
    }
}

impl From<RemoteError> for ApiError {
    fn from(error: RemoteError) -> Self {
        match error {
            RemoteError::Unauthorized(message) => ApiError::Unauthorized(message),
            e if e.is_transport() => ApiError::BackendUnavailable(e.to_string()),
            e => ApiError::Backend(e.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Validation(message) => ApiError::Validation(message),
        }
    }
}

impl From<MealServiceError> for ApiError {
    fn from(error: MealServiceError) -> Self {
        match error {
            MealServiceError::Validation(message) => ApiError::Validation(message),
            MealServiceError::FavoriteNotFound(_) => ApiError::NotFound("favorite"),
            MealServiceError::NothingToLog => ApiError::Unprocessable(error.to_string()),
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(error: PlanError) -> Self {
        match error {
            PlanError::Validation(message) => ApiError::Validation(message),
            e @ PlanError::InsufficientRecipes { .. } => ApiError::Unprocessable(e.to_string()),
        }
    }
}

impl From<ProfileServiceError> for ApiError {
    fn from(error: ProfileServiceError) -> Self {
        match error {
            ProfileServiceError::Validation(message) => ApiError::Validation(message),
            ProfileServiceError::Remote(e) => e.into(),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::EmptyImage => ApiError::BadRequest(error.to_string()),
            AnalysisError::Remote(e) => e.into(),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(error: SyncError) -> Self {
        match error {
            SyncError::NotAuthenticated => ApiError::Unauthorized(error.to_string()),
            SyncError::NothingToSync => ApiError::Conflict(error.to_string()),
            SyncError::Remote(e) => e.into(),
            SyncError::InvalidRemoteData(_) => ApiError::Backend(error.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Validation(message) => ApiError::Validation(message),
            AuthError::Rejected(message) => ApiError::Unauthorized(message),
            AuthError::Remote(e) => e.into(),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(error: AccountError) -> Self {
        match error {
            AccountError::Auth(e) => e.into(),
            AccountError::Sync(e) => e.into(),
        }
    }
}
