use chrono::{DateTime, Utc};

use nutri_track_domain::NutritionApp;

/// Shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub app: NutritionApp,
    pub started_at: DateTime<Utc>,
    pub environment: String,
}

impl AppState {
    pub fn new(app: NutritionApp, environment: impl Into<String>) -> Self {
        Self {
            started_at: app.clock.now(),
            app,
            environment: environment.into(),
        }
    }
}
