// Domain entities and value objects
pub mod conversions;
pub mod favorite;
pub mod insights;
pub mod meal;
pub mod plan;
pub mod profile;
pub mod recipe;
pub mod session;
pub mod water;
pub mod weight;

// Re-export common types for easier imports
pub use favorite::FavoriteFood;
pub use insights::{BmiCategory, MacroProgress, WeeklySummary};
pub use meal::{FoodPortion, LoggedMeal, MacroTotals, MealType, NewMeal, StoredMeal};
pub use plan::{MealPlan, PlannedRecipe, SuggestionHistory};
pub use profile::{
    ActivityLevel, BudgetLevel, DietType, ExperienceLevel, Gender, Goal, MacroPercentages,
    MetabolicProfile, UserProfile, UserState,
};
pub use recipe::{ProteinBase, ProteinOption, Recipe, RecipeIngredient};
pub use session::{AuthSession, AuthUser, SyncStatus};
pub use water::WaterEntry;
pub use weight::{WeightChange, WeightEntry, WeightTrend};

/// Round to one decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
