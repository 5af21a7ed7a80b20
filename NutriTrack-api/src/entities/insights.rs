use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use nutri_track_domain::entities::{
    BmiCategory, MacroProgress, MacroTotals, WeeklySummary, WeightChange, WeightTrend,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayInsightsResponse {
    pub date: NaiveDate,
    pub totals: MacroTotals,
    /// Present once the metabolic profile is calculated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<MacroProgress>,
    pub water_ml: u32,
    /// Consecutive days with at least one meal
    pub streak: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeeklyInsightsResponse {
    /// Absent until two days of the last week have meals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<WeeklySummary>,
    pub streak: u32,
}

/// Query parameters for the weight insights
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct WeightInsightsQuery {
    /// Window of the weight change (default: 30)
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeightInsightsResponse {
    pub days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<WeightTrend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<WeightChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BodyInsightsResponse {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub category: BmiCategory,
    pub water_target_ml: u32,
}
