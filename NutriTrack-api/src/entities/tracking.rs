use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use nutri_track_domain::entities::{WaterEntry, WeightEntry};

/// Request payload for logging today's weight
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWeightRequest {
    /// Weight in kilograms (20 - 300)
    pub weight_kg: f64,

    #[validate(length(max = 500, message = "Note cannot exceed 500 characters"))]
    pub note: Option<String>,
}

/// Weight log, oldest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeightLogResponse {
    pub entries: Vec<WeightEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<f64>,
}

/// Request payload for adding water to today's total
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddWaterRequest {
    /// Millilitres (1 - 5000)
    pub ml: u32,
}

/// Water intake of today with the recent history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WaterResponse {
    pub date: NaiveDate,
    pub today_ml: u32,
    /// Suggested daily intake from the latest weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_ml: Option<u32>,
    pub entries: Vec<WaterEntry>,
}

/// Query parameters for listing favorites
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct FavoritesQuery {
    /// Only the most used favorites, at most this many
    pub top: Option<usize>,
}

/// Whether a favorite was added or already existed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FavoriteAddedResponse {
    pub added: bool,
}
