use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;
use validator::Validate;

use nutri_track_domain::entities::{FavoriteFood, WeightEntry};
use nutri_track_domain::services::insights;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::tracking::{
    AddWaterRequest, CreateWeightRequest, FavoriteAddedResponse, FavoritesQuery, WaterResponse,
    WeightLogResponse,
};

/// Weight log, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/weight",
    responses(
        (status = 200, description = "Weight entries", body = WeightLogResponse)
    ),
    tag = "tracking"
)]
#[instrument(skip(state))]
pub async fn list_weight(State(state): State<AppState>) -> Json<WeightLogResponse> {
    Json(WeightLogResponse {
        entries: state.app.weight.entries(),
        latest: state.app.weight.latest_weight(),
    })
}

/// Log today's weight, replacing an earlier entry of the same day
#[utoipa::path(
    post,
    path = "/api/v1/weight",
    request_body = CreateWeightRequest,
    responses(
        (status = 201, description = "Weight logged", body = WeightEntry),
        (status = 400, description = "Weight out of range", body = ErrorResponse)
    ),
    tag = "tracking"
)]
#[instrument(skip(state))]
pub async fn add_weight(
    State(state): State<AppState>,
    Json(request): Json<CreateWeightRequest>,
) -> Result<(StatusCode, Json<WeightEntry>), ApiError> {
    request.validate()?;
    let entry = state.app.weight.add_entry(request.weight_kg, request.note)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/weight/{id}",
    params(
        ("id" = String, Path, description = "Weight entry id")
    ),
    responses(
        (status = 204, description = "Entry removed"),
        (status = 404, description = "No entry with that id", body = ErrorResponse)
    ),
    tag = "tracking"
)]
#[instrument(skip(state))]
pub async fn remove_weight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.app.weight.remove_entry(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("weight entry"))
    }
}

/// Today's water intake
#[utoipa::path(
    get,
    path = "/api/v1/water",
    responses(
        (status = 200, description = "Water intake", body = WaterResponse)
    ),
    tag = "tracking"
)]
#[instrument(skip(state))]
pub async fn get_water(State(state): State<AppState>) -> Json<WaterResponse> {
    Json(water_response(&state))
}

#[utoipa::path(
    post,
    path = "/api/v1/water",
    request_body = AddWaterRequest,
    responses(
        (status = 200, description = "Water added to today", body = WaterResponse),
        (status = 400, description = "Amount out of range", body = ErrorResponse)
    ),
    tag = "tracking"
)]
#[instrument(skip(state))]
pub async fn add_water(
    State(state): State<AppState>,
    Json(request): Json<AddWaterRequest>,
) -> Result<Json<WaterResponse>, ApiError> {
    state.app.water.add_water(request.ml)?;
    Ok(Json(water_response(&state)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/water/today",
    responses(
        (status = 204, description = "Today's water reset")
    ),
    tag = "tracking"
)]
#[instrument(skip(state))]
pub async fn reset_water(State(state): State<AppState>) -> StatusCode {
    state.app.water.reset_today();
    StatusCode::NO_CONTENT
}

fn water_response(state: &AppState) -> WaterResponse {
    let water = &state.app.water;
    WaterResponse {
        date: state.app.clock.today(),
        today_ml: water.today_ml(),
        target_ml: state.app.weight.latest_weight().map(insights::water_target_ml),
        entries: water.entries(),
    }
}

/// Favorite foods, or only the most used ones with `top`
#[utoipa::path(
    get,
    path = "/api/v1/favorites",
    params(FavoritesQuery),
    responses(
        (status = 200, description = "Favorite foods", body = [FavoriteFood])
    ),
    tag = "tracking"
)]
#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    Query(query): Query<FavoritesQuery>,
) -> Json<Vec<FavoriteFood>> {
    let favorites = match query.top {
        Some(limit) => state.app.favorites.top(limit),
        None => state.app.favorites.all(),
    };
    Json(favorites)
}

/// Add a favorite; an existing favorite with the same food id is kept
#[utoipa::path(
    post,
    path = "/api/v1/favorites",
    request_body = FavoriteFood,
    responses(
        (status = 201, description = "Favorite added", body = FavoriteAddedResponse),
        (status = 200, description = "Already a favorite", body = FavoriteAddedResponse),
        (status = 400, description = "Invalid favorite", body = ErrorResponse)
    ),
    tag = "tracking"
)]
#[instrument(skip(state))]
pub async fn add_favorite(
    State(state): State<AppState>,
    Json(food): Json<FavoriteFood>,
) -> Result<(StatusCode, Json<FavoriteAddedResponse>), ApiError> {
    let added = state.app.favorites.add(food)?;
    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(FavoriteAddedResponse { added })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/favorites/{food_id}",
    params(
        ("food_id" = String, Path, description = "Food id of the favorite")
    ),
    responses(
        (status = 204, description = "Favorite removed"),
        (status = 404, description = "Not a favorite", body = ErrorResponse)
    ),
    tag = "tracking"
)]
#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(food_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.app.favorites.remove(&food_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("favorite"))
    }
}
