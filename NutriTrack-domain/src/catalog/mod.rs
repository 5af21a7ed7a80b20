//! Built-in recipe catalog

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::error;

use crate::entities::{MealType, ProteinBase, ProteinOption, Recipe};

static BUILTIN_RECIPES: &str = include_str!("../../data/recipes.json");

static BUILTIN: Lazy<Arc<RecipeCatalog>> = Lazy::new(|| {
    match serde_json::from_str::<Vec<Recipe>>(BUILTIN_RECIPES) {
        Ok(recipes) => Arc::new(RecipeCatalog::new(recipes)),
        Err(e) => {
            error!("Built-in recipe catalog is unreadable: {}", e);
            Arc::new(RecipeCatalog::default())
        }
    }
});

/// Read-only set of recipes the meal plan generator draws from
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// The catalog shipped with the application, parsed once
    pub fn builtin() -> Arc<RecipeCatalog> {
        Arc::clone(&BUILTIN)
    }

    pub fn all(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Recipes matching both the protein and the slot, in catalog order
    pub fn candidates(&self, protein: ProteinBase, meal_type: MealType) -> Vec<&Recipe> {
        self.recipes
            .iter()
            .filter(|r| r.protein_base == protein && r.meal_type == meal_type)
            .collect()
    }

    pub fn protein_options() -> Vec<ProteinOption> {
        ProteinBase::ALL.iter().map(ProteinBase::option).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = RecipeCatalog::builtin();
        assert!(catalog.all().len() >= 40);

        let ids: HashSet<&str> = catalog.all().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.all().len(), "recipe ids must be unique");
    }

    #[test]
    fn test_every_protein_covers_every_slot() {
        let catalog = RecipeCatalog::builtin();
        for protein in ProteinBase::ALL {
            for slot in MealType::ALL {
                assert!(
                    !catalog.candidates(protein, slot).is_empty(),
                    "no {} recipe for {}",
                    slot,
                    protein
                );
            }
        }
    }

    #[test]
    fn test_totals_match_ingredients() {
        for recipe in RecipeCatalog::builtin().all() {
            let calories: u32 = recipe.ingredients.iter().map(|i| i.calories).sum();
            let protein: u32 = recipe.ingredients.iter().map(|i| i.protein).sum();
            assert_eq!(calories, recipe.total_calories, "{}", recipe.id);
            assert_eq!(protein, recipe.total_protein, "{}", recipe.id);
        }
    }

    #[test]
    fn test_lookup() {
        let catalog = RecipeCatalog::builtin();
        let first = &catalog.all()[0];
        assert_eq!(catalog.get(&first.id), Some(first));
        assert!(catalog.get("missing").is_none());
        assert_eq!(RecipeCatalog::protein_options().len(), 6);
    }
}
