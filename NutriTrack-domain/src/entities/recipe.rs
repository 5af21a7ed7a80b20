use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::meal::MealType;

/// Protein category used to filter the recipe catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ProteinBase {
    Chicken,
    Turkey,
    Beef,
    Fish,
    Eggs,
    Vegetarian,
}

impl ProteinBase {
    pub const ALL: [ProteinBase; 6] = [
        ProteinBase::Chicken,
        ProteinBase::Turkey,
        ProteinBase::Beef,
        ProteinBase::Fish,
        ProteinBase::Eggs,
        ProteinBase::Vegetarian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProteinBase::Chicken => "chicken",
            ProteinBase::Turkey => "turkey",
            ProteinBase::Beef => "beef",
            ProteinBase::Fish => "fish",
            ProteinBase::Eggs => "eggs",
            ProteinBase::Vegetarian => "vegetarian",
        }
    }

    /// Display metadata shown when choosing a protein
    pub fn option(&self) -> ProteinOption {
        let (name, emoji, description) = match self {
            ProteinBase::Chicken => ("Pollo", "🍗", "Pechuga, muslos, versátil y magro"),
            ProteinBase::Turkey => ("Pavo", "🦃", "Bajo en grasa, alto en proteína"),
            ProteinBase::Beef => ("Carne", "🥩", "Rica en hierro y B12"),
            ProteinBase::Fish => ("Pescado", "🐟", "Omega-3, salmón, atún, tilapia"),
            ProteinBase::Eggs => ("Huevos", "🥚", "Económico y completo"),
            ProteinBase::Vegetarian => ("Vegetariano", "🌱", "Legumbres, tofu, quinoa"),
        };
        ProteinOption {
            id: *self,
            name: name.to_string(),
            emoji: emoji.to_string(),
            description: description.to_string(),
        }
    }
}

impl fmt::Display for ProteinBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProteinBase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProteinBase::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown protein: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ProteinOption {
    pub id: ProteinBase,
    pub name: String,
    pub emoji: String,
    pub description: String,
}

/// Ingredient line with absolute macros at the stated grams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub food_id: String,
    pub name: String,
    pub emoji: String,
    pub grams: u32,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

/// Read-only catalog recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub meal_type: MealType,
    pub protein_base: ProteinBase,
    pub ingredients: Vec<RecipeIngredient>,
    pub total_calories: u32,
    pub total_protein: u32,
    pub total_carbs: u32,
    pub total_fat: u32,
    pub preparation_tip: String,
    /// Query for an external video search
    pub video_search: String,
}

impl Recipe {
    pub fn video_search_url(&self) -> String {
        format!(
            "https://www.youtube.com/results?search_query={}",
            urlencoding::encode(&self.video_search)
        )
    }
}
