// NutriTrack Data
// Local persistence for the NutriTrack application state

// Database connection management
#[cfg(feature = "sqlite")]
pub mod database;

// Key-value stores and the typed per-domain wrapper
pub mod repository;

// Persisted layout
pub mod models;
