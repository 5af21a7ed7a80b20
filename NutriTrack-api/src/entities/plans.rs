use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use nutri_track_domain::entities::ProteinBase;

/// Request a plan for the rest of today
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanRequest {
    pub protein: ProteinBase,

    /// Daily target, defaults to the calculated profile's target
    pub target_calories: Option<f64>,

    /// Calories already eaten, defaults to today's logged meals
    pub consumed_calories: Option<f64>,
}

/// Query parameters for a single recipe
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct RecipeQuery {
    /// Scale factor, clamped to 0.5 - 2.0 (default 1.0)
    pub scale: Option<f64>,
}
