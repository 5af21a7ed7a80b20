// NutriTrack Domain
// Stores, meal planning, sync and sessions for the NutriTrack application

// Request validation helpers
pub mod validation;

// Wall-clock access and local dates
pub mod clock;

// Domain entities
pub mod entities;

// Built-in recipe catalog
pub mod catalog;

// Per-domain state stores
pub mod stores;

// Services that implement business logic
pub mod services;

// Authentication session
pub mod auth;

// External backend contracts and HTTP client
pub mod remote;

// Health checks and system status
pub mod health;

// Store and service wiring
pub mod app;

pub use app::{NutritionApp, NutritionAppBuilder};

// Testing utilities - only available in tests or with the mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
