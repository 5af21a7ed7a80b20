use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Water drunk on one local calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct WaterEntry {
    pub date: NaiveDate,
    pub ml: u32,
}
