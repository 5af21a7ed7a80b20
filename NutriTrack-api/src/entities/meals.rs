use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use nutri_track_domain::entities::{LoggedMeal, MacroTotals, MealType};
use nutri_track_domain::remote::FoodAnalysis;

/// Query parameters for the meal log
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct MealsQuery {
    /// Local date (YYYY-MM-DD), defaults to today
    pub date: Option<NaiveDate>,
}

/// Query parameters for clearing old meals
#[derive(Debug, Clone, Deserialize, Validate, IntoParams, ToSchema)]
pub struct ClearMealsQuery {
    /// Meals logged before this many days ago are removed
    #[validate(range(min = 1, max = 3650, message = "Days must be between 1 and 3650"))]
    pub days: i64,
}

/// Meals of one local day with their totals
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DayMealsResponse {
    pub date: NaiveDate,
    pub meals: Vec<LoggedMeal>,
    pub totals: MacroTotals,
}

/// Log a favorite, optionally overriding its default portion and slot
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogFavoriteRequest {
    #[validate(length(min = 1, message = "Food id is required"))]
    pub food_id: String,

    #[validate(range(min = 1.0, max = 5000.0, message = "Grams must be between 1 and 5000"))]
    pub grams: Option<f64>,

    pub meal_type: Option<MealType>,
}

/// Log an accepted slot of a generated plan
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogPlannedRecipeRequest {
    #[validate(length(min = 1, message = "Recipe id is required"))]
    pub recipe_id: String,

    /// Scale factor of the plan the recipe came from
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,

    /// Defaults to the recipe's own slot
    pub meal_type: Option<MealType>,
}

fn default_scale_factor() -> f64 {
    1.0
}

/// Log the foods recognized in a photo
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogAnalysisRequest {
    pub analysis: FoodAnalysis,
    pub meal_type: MealType,
}

/// Meals created by one logging action
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoggedMealsResponse {
    pub meals: Vec<LoggedMeal>,
}
