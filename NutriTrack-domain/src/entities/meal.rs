use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::round1;

/// Meal slot tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Slots in plan order
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown meal type: {}", s))
    }
}

/// One consumed food item. Never edited after creation.
///
/// `date` is the device-local calendar date of `timestamp`, not the UTC date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LoggedMeal {
    pub id: String,
    pub food_id: String,
    pub food_name: String,
    pub emoji: String,
    pub grams: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal_type: MealType,
    pub timestamp: DateTime<Utc>,
    pub date: NaiveDate,
}

/// Meal record as found on disk, where older versions did not write `date`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMeal {
    pub id: String,
    pub food_id: String,
    pub food_name: String,
    #[serde(default)]
    pub emoji: String,
    pub grams: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal_type: MealType,
    pub timestamp: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Input for logging a meal by hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewMeal {
    #[validate(length(min = 1, message = "Food id is required"))]
    pub food_id: String,

    #[validate(length(min = 1, max = 200, message = "Food name must be between 1 and 200 characters"))]
    pub food_name: String,

    #[serde(default)]
    pub emoji: String,

    #[validate(range(min = 0.1, max = 5000.0, message = "Grams must be between 0.1 and 5000"))]
    pub grams: f64,

    #[validate(range(min = 0.0, max = 20000.0, message = "Calories must be between 0 and 20000"))]
    pub calories: f64,

    #[validate(range(min = 0.0, max = 2000.0, message = "Protein must be between 0 and 2000 g"))]
    pub protein: f64,

    #[validate(range(min = 0.0, max = 2000.0, message = "Carbs must be between 0 and 2000 g"))]
    pub carbs: f64,

    #[validate(range(min = 0.0, max = 2000.0, message = "Fat must be between 0 and 2000 g"))]
    pub fat: f64,

    pub meal_type: MealType,
}

/// A catalog food described per 100 g
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FoodPortion {
    pub food_id: String,
    pub food_name: String,
    #[serde(default)]
    pub emoji: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
}

impl FoodPortion {
    /// Macros for an arbitrary portion: calories to the unit, macros to 0.1 g
    pub fn to_new_meal(&self, grams: f64, meal_type: MealType) -> NewMeal {
        let multiplier = grams / 100.0;
        NewMeal {
            food_id: self.food_id.clone(),
            food_name: self.food_name.clone(),
            emoji: self.emoji.clone(),
            grams,
            calories: (self.calories_per_100g * multiplier).round(),
            protein: round1(self.protein_per_100g * multiplier),
            carbs: round1(self.carbs_per_100g * multiplier),
            fat: round1(self.fat_per_100g * multiplier),
            meal_type,
        }
    }
}

/// Summed calories and macros
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTotals {
    pub fn from_meals<'a>(meals: impl IntoIterator<Item = &'a LoggedMeal>) -> Self {
        meals.into_iter().fold(Self::default(), |mut acc, meal| {
            acc.calories += meal.calories;
            acc.protein += meal.protein;
            acc.carbs += meal.carbs;
            acc.fat += meal.fat;
            acc
        })
    }

    /// Divide every field, e.g. to get per-day averages
    pub fn divided_by(&self, divisor: f64) -> Self {
        if divisor == 0.0 {
            return Self::default();
        }
        Self {
            calories: self.calories / divisor,
            protein: self.protein / divisor,
            carbs: self.carbs / divisor,
            fat: self.fat / divisor,
        }
    }

    pub fn rounded(&self) -> Self {
        Self {
            calories: self.calories.round(),
            protein: round1(self.protein),
            carbs: round1(self.carbs),
            fat: round1(self.fat),
        }
    }
}
