use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use nutri_track_domain::entities::SyncStatus;
use nutri_track_domain::remote::FoodAnalysis;
use nutri_track_domain::services::{AnalysisOutcome, FullSyncReport, ProfilePull};

/// Result of a manual full sync
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncReportResponse {
    /// Whether the server's profile replaced the local one
    pub profile_applied: bool,
    pub meals_pulled: usize,
    pub meals_pushed: usize,
}

impl From<FullSyncReport> for SyncReportResponse {
    fn from(report: FullSyncReport) -> Self {
        Self {
            profile_applied: report.profile == ProfilePull::Applied,
            meals_pulled: report.meals_pulled,
            meals_pushed: report.meals_pushed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusResponse {
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    pub authenticated: bool,
}

/// Food photo analysis result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    pub detected: bool,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<FoodAnalysis>,
}

impl From<AnalysisOutcome> for AnalysisResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::NothingDetected { description } => Self {
                detected: false,
                description,
                analysis: None,
            },
            AnalysisOutcome::Detected(analysis) => Self {
                detected: true,
                description: analysis.meal_description.clone(),
                analysis: Some(analysis),
            },
        }
    }
}
