//! Per-domain state containers.
//!
//! Each store loads its blob once, keeps it behind a lock and writes it back
//! after every mutation. Stores are shared through `Arc` by whoever needs
//! them; nothing here is global.

use thiserror::Error;

pub mod favorites;
pub mod history;
pub mod meals;
pub mod user;
pub mod water;
pub mod weight;

pub use favorites::FavoritesStore;
pub use history::SuggestionHistoryStore;
pub use meals::MealStore;
pub use user::UserStore;
pub use water::WaterStore;
pub use weight::WeightStore;

/// Store errors. Only input validation can fail; persistence problems are
/// logged and swallowed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),
}
