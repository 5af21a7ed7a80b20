// Public request and response bodies of the NutriTrack API.
// Domain entities that already derive ToSchema are returned as-is.

// Error bodies and shared responses
pub mod common;

// Account and session
pub mod auth;

// Meal log
pub mod meals;

// Onboarding
pub mod profile;

// Weight, water and favorites
pub mod tracking;

// Meal plan generator
pub mod plans;

// Aggregations
pub mod insights;

// Manual sync and food photo analysis
pub mod sync;
