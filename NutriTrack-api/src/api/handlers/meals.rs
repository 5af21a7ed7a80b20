use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;
use validator::Validate;

use nutri_track_domain::entities::{LoggedMeal, MacroTotals, NewMeal};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::common::RemovedResponse;
use crate::entities::meals::{
    ClearMealsQuery, DayMealsResponse, LogAnalysisRequest, LogFavoriteRequest,
    LogPlannedRecipeRequest, LoggedMealsResponse, MealsQuery,
};

/// Meals of one local day
#[utoipa::path(
    get,
    path = "/api/v1/meals",
    params(MealsQuery),
    responses(
        (status = 200, description = "Meals of the day with totals", body = DayMealsResponse)
    ),
    tag = "meals"
)]
#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    Query(query): Query<MealsQuery>,
) -> Json<DayMealsResponse> {
    let date = query.date.unwrap_or_else(|| state.app.clock.today());
    let meals = state.app.meals.for_date(date);
    let totals = MacroTotals::from_meals(&meals).rounded();
    Json(DayMealsResponse { date, meals, totals })
}

/// Log a meal with explicit macros
#[utoipa::path(
    post,
    path = "/api/v1/meals",
    request_body = NewMeal,
    responses(
        (status = 201, description = "Meal logged", body = LoggedMeal),
        (status = 400, description = "Invalid meal", body = ErrorResponse)
    ),
    tag = "meals"
)]
#[instrument(skip(state, meal))]
pub async fn add_meal(
    State(state): State<AppState>,
    Json(meal): Json<NewMeal>,
) -> Result<(StatusCode, Json<LoggedMeal>), ApiError> {
    let logged = state.app.meal_log.add_meal(meal)?;
    Ok((StatusCode::CREATED, Json(logged)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/meals/{id}",
    params(
        ("id" = String, Path, description = "Meal id")
    ),
    responses(
        (status = 204, description = "Meal removed"),
        (status = 404, description = "No meal with that id", body = ErrorResponse)
    ),
    tag = "meals"
)]
#[instrument(skip(state))]
pub async fn remove_meal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.app.meal_log.remove_meal(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("meal"))
    }
}

/// Log a favorite food with its default portion unless overridden
#[utoipa::path(
    post,
    path = "/api/v1/meals/from-favorite",
    request_body = LogFavoriteRequest,
    responses(
        (status = 201, description = "Meal logged", body = LoggedMeal),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Food is not a favorite", body = ErrorResponse)
    ),
    tag = "meals"
)]
#[instrument(skip(state))]
pub async fn log_favorite(
    State(state): State<AppState>,
    Json(request): Json<LogFavoriteRequest>,
) -> Result<(StatusCode, Json<LoggedMeal>), ApiError> {
    request.validate()?;
    let logged = state
        .app
        .meal_log
        .log_favorite(&request.food_id, request.grams, request.meal_type)?;
    Ok((StatusCode::CREATED, Json(logged)))
}

/// Log every ingredient of an accepted plan slot as its own meal
#[utoipa::path(
    post,
    path = "/api/v1/meals/from-plan",
    request_body = LogPlannedRecipeRequest,
    responses(
        (status = 201, description = "Ingredients logged", body = LoggedMealsResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown recipe", body = ErrorResponse)
    ),
    tag = "meals"
)]
#[instrument(skip(state))]
pub async fn log_planned_recipe(
    State(state): State<AppState>,
    Json(request): Json<LogPlannedRecipeRequest>,
) -> Result<(StatusCode, Json<LoggedMealsResponse>), ApiError> {
    request.validate()?;
    let recipe = state
        .app
        .planner
        .scaled_recipe(&request.recipe_id, request.scale_factor)
        .ok_or(ApiError::NotFound("recipe"))?;

    let meals = state.app.meal_log.log_planned_recipe(&recipe, request.meal_type)?;
    Ok((StatusCode::CREATED, Json(LoggedMealsResponse { meals })))
}

/// Log the foods recognized by a photo analysis
#[utoipa::path(
    post,
    path = "/api/v1/meals/from-analysis",
    request_body = LogAnalysisRequest,
    responses(
        (status = 201, description = "Detected foods logged", body = LoggedMealsResponse),
        (status = 400, description = "Invalid detected food", body = ErrorResponse),
        (status = 422, description = "The analysis has no foods", body = ErrorResponse)
    ),
    tag = "meals"
)]
#[instrument(skip(state, request))]
pub async fn log_analysis(
    State(state): State<AppState>,
    Json(request): Json<LogAnalysisRequest>,
) -> Result<(StatusCode, Json<LoggedMealsResponse>), ApiError> {
    let meals = state
        .app
        .meal_log
        .log_detected_foods(&request.analysis, request.meal_type)?;
    Ok((StatusCode::CREATED, Json(LoggedMealsResponse { meals })))
}

/// Remove meals older than a number of days
#[utoipa::path(
    delete,
    path = "/api/v1/meals/old",
    params(ClearMealsQuery),
    responses(
        (status = 200, description = "Old meals removed", body = RemovedResponse),
        (status = 400, description = "Invalid number of days", body = ErrorResponse)
    ),
    tag = "meals"
)]
#[instrument(skip(state))]
pub async fn clear_old_meals(
    State(state): State<AppState>,
    Query(query): Query<ClearMealsQuery>,
) -> Result<Json<RemovedResponse>, ApiError> {
    query.validate()?;
    let removed = state.app.meal_log.clear_older_than(query.days);
    Ok(Json(RemovedResponse { removed }))
}
