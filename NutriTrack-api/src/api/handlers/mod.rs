pub mod analysis;
pub mod auth;
pub mod health;
pub mod insights;
pub mod meals;
pub mod plans;
pub mod profile;
pub mod sync;
pub mod tracking;

// Tests module
#[cfg(test)]
mod tests;

// Re-export handlers for easier imports
pub use health::health_check;
