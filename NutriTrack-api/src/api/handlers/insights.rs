use axum::{
    extract::{Query, State},
    Json,
};
use tracing::instrument;

use nutri_track_domain::services::insights;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::insights::{
    BodyInsightsResponse, TodayInsightsResponse, WeeklyInsightsResponse, WeightInsightsQuery,
    WeightInsightsResponse,
};

const DEFAULT_WEIGHT_WINDOW_DAYS: i64 = 30;

#[utoipa::path(
    get,
    path = "/api/v1/insights/today",
    responses(
        (status = 200, description = "Today's totals and progress", body = TodayInsightsResponse)
    ),
    tag = "insights"
)]
#[instrument(skip(state))]
pub async fn today(State(state): State<AppState>) -> Json<TodayInsightsResponse> {
    let app = &state.app;
    let today = app.clock.today();
    let meals = app.meals.all();
    let totals = insights::today_totals(&meals, today);

    Json(TodayInsightsResponse {
        date: today,
        totals,
        progress: app
            .user
            .metabolic_profile()
            .map(|targets| insights::macro_progress(totals, &targets)),
        water_ml: app.water.today_ml(),
        streak: insights::streak(&meals, today),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/insights/weekly",
    responses(
        (status = 200, description = "Averages over the last 7 days", body = WeeklyInsightsResponse)
    ),
    tag = "insights"
)]
#[instrument(skip(state))]
pub async fn weekly(State(state): State<AppState>) -> Json<WeeklyInsightsResponse> {
    let today = state.app.clock.today();
    let meals = state.app.meals.all();
    Json(WeeklyInsightsResponse {
        summary: insights::weekly_summary(&meals, today),
        streak: insights::streak(&meals, today),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/insights/weight",
    params(WeightInsightsQuery),
    responses(
        (status = 200, description = "Weight trend and change", body = WeightInsightsResponse),
        (status = 400, description = "Invalid window", body = ErrorResponse)
    ),
    tag = "insights"
)]
#[instrument(skip(state))]
pub async fn weight(
    State(state): State<AppState>,
    Query(query): Query<WeightInsightsQuery>,
) -> Result<Json<WeightInsightsResponse>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_WEIGHT_WINDOW_DAYS);
    if !(1..=3650).contains(&days) {
        return Err(ApiError::Validation("Days must be between 1 and 3650".to_string()));
    }

    let entries = state.app.weight.entries();
    Ok(Json(WeightInsightsResponse {
        days,
        latest: insights::latest_weight(&entries),
        trend: insights::weight_trend(&entries),
        change: insights::weight_change(&entries, state.app.clock.today(), days),
    }))
}

/// BMI and water target from the profile height and the latest weight
#[utoipa::path(
    get,
    path = "/api/v1/insights/body",
    responses(
        (status = 200, description = "Body metrics", body = BodyInsightsResponse),
        (status = 404, description = "No profile or weight logged yet", body = ErrorResponse)
    ),
    tag = "insights"
)]
#[instrument(skip(state))]
pub async fn body(State(state): State<AppState>) -> Result<Json<BodyInsightsResponse>, ApiError> {
    let profile = state.app.user.profile().ok_or(ApiError::NotFound("profile"))?;
    let weight_kg = state
        .app
        .weight
        .latest_weight()
        .unwrap_or(profile.current_weight_kg);
    let bmi = insights::bmi(weight_kg, profile.height_cm).ok_or(ApiError::NotFound("body metrics"))?;

    Ok(Json(BodyInsightsResponse {
        weight_kg,
        height_cm: profile.height_cm,
        bmi,
        category: insights::bmi_category(bmi),
        water_target_ml: insights::water_target_ml(weight_kg),
    }))
}
