use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, instrument};

use nutri_track_domain::auth::{LoginRequest, RegisterRequest};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::auth::{LoginResponse, RegisterResponse, SessionCheckResponse, SessionResponse};

/// Create an account; this device's data becomes its first server copy
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and local data uploaded", body = RegisterResponse),
        (status = 400, description = "Invalid registration", body = ErrorResponse),
        (status = 401, description = "Registration refused by the server", body = ErrorResponse),
        (status = 503, description = "Auth service unreachable", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let registered = state.app.account.register(request).await?;
    info!("Account {} registered", registered.user.id);
    Ok((StatusCode::CREATED, Json(registered.into())))
}

/// Sign in; the server's profile and last 30 days of meals replace local ones
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 503, description = "Auth service unreachable", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let logged_in = state.app.account.login(request).await?;
    Ok(Json(logged_in.into()))
}

/// Forget the credential. Local data is kept.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Signed out")
    ),
    tag = "auth"
)]
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> StatusCode {
    state.app.account.logout();
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state))]
pub async fn session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(state.app.session.snapshot().into())
}

/// Validate the stored credential with the server
#[utoipa::path(
    post,
    path = "/api/v1/auth/check",
    responses(
        (status = 200, description = "Outcome of the check", body = SessionCheckResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state))]
pub async fn check_session(State(state): State<AppState>) -> Json<SessionCheckResponse> {
    Json(state.app.account.check_session().await.into())
}
