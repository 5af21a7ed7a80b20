use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, instrument};
use validator::Validate;

use nutri_track_domain::entities::{MetabolicProfile, UserProfile, UserState};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::profile::OnboardingStepRequest;

/// Profile, targets, onboarding progress and sync status
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Current user state", body = UserState)
    ),
    tag = "profile"
)]
#[instrument(skip(state))]
pub async fn get_profile(State(state): State<AppState>) -> Json<UserState> {
    Json(state.app.profile.snapshot())
}

/// Calculate the metabolic targets for a profile and store both
#[utoipa::path(
    post,
    path = "/api/v1/profile/calculate",
    request_body = UserProfile,
    responses(
        (status = 200, description = "Targets calculated and stored", body = MetabolicProfile),
        (status = 400, description = "Invalid profile", body = ErrorResponse),
        (status = 502, description = "The calculation service failed", body = ErrorResponse),
        (status = 503, description = "The calculation service is unreachable", body = ErrorResponse)
    ),
    tag = "profile"
)]
#[instrument(skip(state, profile))]
pub async fn calculate_profile(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<MetabolicProfile>, ApiError> {
    let metabolic = state.app.profile.calculate(profile).await?;
    info!("Profile calculated: {:.0} kcal target", metabolic.target_calories);
    Ok(Json(metabolic))
}

#[utoipa::path(
    put,
    path = "/api/v1/profile/onboarding-step",
    request_body = OnboardingStepRequest,
    responses(
        (status = 204, description = "Step stored"),
        (status = 400, description = "Invalid step", body = ErrorResponse)
    ),
    tag = "profile"
)]
#[instrument(skip(state))]
pub async fn set_onboarding_step(
    State(state): State<AppState>,
    Json(request): Json<OnboardingStepRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;
    state.app.profile.set_onboarding_step(request.step);
    Ok(StatusCode::NO_CONTENT)
}

/// Forget the profile and targets. Meals, weight and water are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/profile",
    responses(
        (status = 204, description = "Profile cleared")
    ),
    tag = "profile"
)]
#[instrument(skip(state))]
pub async fn reset_profile(State(state): State<AppState>) -> StatusCode {
    state.app.profile.reset();
    info!("User profile reset");
    StatusCode::NO_CONTENT
}
