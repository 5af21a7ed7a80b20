use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::meal::MacroTotals;

/// Per-day averages over the trailing week
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days_logged: u32,
    pub daily_average: MacroTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

/// Today's intake against the metabolic targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MacroProgress {
    pub consumed: MacroTotals,
    pub target: MacroTotals,
    /// Negative once the target is exceeded
    pub remaining_calories: f64,
}
