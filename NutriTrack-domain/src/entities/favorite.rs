use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::meal::{FoodPortion, MealType};

/// Snapshot of a catalog food the user marked as favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FavoriteFood {
    #[validate(length(min = 1, message = "Food id is required"))]
    pub food_id: String,
    #[validate(length(min = 1, max = 200, message = "Food name must be between 1 and 200 characters"))]
    pub food_name: String,
    #[serde(default)]
    pub emoji: String,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub calories_per_100g: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub protein_per_100g: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub carbs_per_100g: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub fat_per_100g: f64,
    #[validate(range(min = 1.0, max = 5000.0, message = "Default portion must be between 1 and 5000 g"))]
    pub default_grams: f64,
    pub default_meal_type: MealType,
    #[serde(default)]
    pub times_used: u32,
}

impl FavoriteFood {
    pub fn portion(&self) -> FoodPortion {
        FoodPortion {
            food_id: self.food_id.clone(),
            food_name: self.food_name.clone(),
            emoji: self.emoji.clone(),
            calories_per_100g: self.calories_per_100g,
            protein_per_100g: self.protein_per_100g,
            carbs_per_100g: self.carbs_per_100g,
            fat_per_100g: self.fat_per_100g,
        }
    }
}
