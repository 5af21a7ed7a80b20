// NutriTrack-api lib.rs
//
// HTTP service owning the NutriTrack application state. The UI talks to
// the stores and services only through these routes.

// Public modules
pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;

use axum::Router;
use nutri_track_domain::NutritionApp;

/// Create the application router
pub fn create_application(app: NutritionApp, environment: impl Into<String>) -> Router {
    api::create_app(api::AppState::new(app, environment))
}
