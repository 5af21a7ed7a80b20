use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{debug, instrument};

use nutri_track_domain::catalog::RecipeCatalog;
use nutri_track_domain::entities::{MealPlan, PlannedRecipe, ProteinOption};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::plans::{GeneratePlanRequest, RecipeQuery};

/// Protein bases a plan can be built around
#[utoipa::path(
    get,
    path = "/api/v1/plans/proteins",
    responses(
        (status = 200, description = "Protein options", body = [ProteinOption])
    ),
    tag = "plans"
)]
pub async fn list_proteins() -> Json<Vec<ProteinOption>> {
    Json(RecipeCatalog::protein_options())
}

/// Generate a plan for the rest of today. Calling it again regenerates.
#[utoipa::path(
    post,
    path = "/api/v1/plans/generate",
    request_body = GeneratePlanRequest,
    responses(
        (status = 200, description = "Generated plan", body = MealPlan),
        (status = 400, description = "No calorie target available or invalid numbers", body = ErrorResponse),
        (status = 422, description = "The catalog cannot fill every slot", body = ErrorResponse)
    ),
    tag = "plans"
)]
#[instrument(skip(state))]
pub async fn generate_plan(
    State(state): State<AppState>,
    Json(request): Json<GeneratePlanRequest>,
) -> Result<Json<MealPlan>, ApiError> {
    let target = match request.target_calories {
        Some(target) => target,
        None => state
            .app
            .user
            .metabolic_profile()
            .map(|metabolic| metabolic.target_calories)
            .ok_or_else(|| {
                ApiError::Validation(
                    "Target calories are required until the profile is calculated".to_string(),
                )
            })?,
    };
    let consumed = request
        .consumed_calories
        .unwrap_or_else(|| state.app.meals.today_totals().calories);
    debug!("Planning with target {:.0} and {:.0} consumed", target, consumed);

    let plan = state
        .app
        .planner
        .generate_daily_plan(request.protein, target, consumed)?;
    Ok(Json(plan))
}

/// A catalog recipe, optionally scaled
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    params(
        ("id" = String, Path, description = "Recipe id"),
        RecipeQuery
    ),
    responses(
        (status = 200, description = "Recipe", body = PlannedRecipe),
        (status = 404, description = "Unknown recipe", body = ErrorResponse)
    ),
    tag = "plans"
)]
#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RecipeQuery>,
) -> Result<Json<PlannedRecipe>, ApiError> {
    state
        .app
        .planner
        .scaled_recipe(&id, query.scale.unwrap_or(1.0))
        .map(Json)
        .ok_or(ApiError::NotFound("recipe"))
}
