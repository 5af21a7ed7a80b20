//! Daily meal plan generator.
//!
//! Picks one catalog recipe per slot for a protein, avoiding recipes
//! suggested in the last two days, and scales every portion by a single
//! factor so the plan fits the remaining calorie budget.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::RecipeCatalog;
use crate::clock::Clock;
use crate::entities::{MealPlan, MealType, PlannedRecipe, ProteinBase, Recipe, RecipeIngredient};
use crate::stores::SuggestionHistoryStore;

/// Floor of the calorie budget, so a nearly finished day still gets a
/// usable plan
pub const MIN_REMAINING_CALORIES: f64 = 500.0;
pub const MIN_SCALE_FACTOR: f64 = 0.5;
pub const MAX_SCALE_FACTOR: f64 = 2.0;
/// Recipes suggested today or on the previous two days count as recent
pub const RECENT_WINDOW_DAYS: i64 = 2;
/// Suggestion history retention
pub const HISTORY_RETENTION_DAYS: i64 = 7;

/// Source of uniform random indices
pub trait RandomSource: Send + Sync + fmt::Debug {
    /// Index in `0..len`; `len` is never zero
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("Insufficient recipes for protein {protein} ({meal_type})")]
    InsufficientRecipes {
        protein: ProteinBase,
        meal_type: MealType,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Budget left for the day, never below [`MIN_REMAINING_CALORIES`]
pub fn remaining_calories(target_calories: f64, consumed_calories: f64) -> f64 {
    (target_calories - consumed_calories).max(MIN_REMAINING_CALORIES)
}

/// Uniform factor bringing `raw_total` to `remaining`, clamped to
/// `[MIN_SCALE_FACTOR, MAX_SCALE_FACTOR]`
pub fn scale_factor(remaining: f64, raw_total: f64) -> f64 {
    let factor = if raw_total > 0.0 { remaining / raw_total } else { 1.0 };
    factor.clamp(MIN_SCALE_FACTOR, MAX_SCALE_FACTOR)
}

fn scale(value: u32, factor: f64) -> u32 {
    (f64::from(value) * factor).round() as u32
}

/// Copy of a recipe with every gram and macro figure scaled and rounded
pub fn scale_recipe(recipe: &Recipe, factor: f64) -> PlannedRecipe {
    let ingredients = recipe
        .ingredients
        .iter()
        .map(|i| RecipeIngredient {
            food_id: i.food_id.clone(),
            name: i.name.clone(),
            emoji: i.emoji.clone(),
            grams: scale(i.grams, factor),
            calories: scale(i.calories, factor),
            protein: scale(i.protein, factor),
            carbs: scale(i.carbs, factor),
            fat: scale(i.fat, factor),
        })
        .collect();

    PlannedRecipe {
        recipe_id: recipe.id.clone(),
        name: recipe.name.clone(),
        emoji: recipe.emoji.clone(),
        meal_type: recipe.meal_type,
        protein_base: recipe.protein_base,
        ingredients,
        total_calories: scale(recipe.total_calories, factor),
        total_protein: scale(recipe.total_protein, factor),
        total_carbs: scale(recipe.total_carbs, factor),
        total_fat: scale(recipe.total_fat, factor),
        preparation_tip: recipe.preparation_tip.clone(),
        video_url: recipe.video_search_url(),
        scale_factor: factor,
    }
}

pub struct MealPlanGenerator {
    catalog: Arc<RecipeCatalog>,
    history: Arc<SuggestionHistoryStore>,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for MealPlanGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MealPlanGenerator")
            .field("recipes", &self.catalog.all().len())
            .field("random", &self.random)
            .finish()
    }
}

impl MealPlanGenerator {
    pub fn new(
        catalog: Arc<RecipeCatalog>,
        history: Arc<SuggestionHistoryStore>,
        random: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            history,
            random,
            clock,
        }
    }

    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    /// Build a plan for today and record its recipes in the suggestion
    /// history. Regenerating is simply calling this again.
    pub fn generate_daily_plan(
        &self,
        protein: ProteinBase,
        target_calories: f64,
        consumed_calories: f64,
    ) -> Result<MealPlan, PlanError> {
        if !target_calories.is_finite() || target_calories <= 0.0 {
            return Err(PlanError::Validation("Target calories must be a positive number".to_string()));
        }
        if !consumed_calories.is_finite() || consumed_calories < 0.0 {
            return Err(PlanError::Validation("Consumed calories must not be negative".to_string()));
        }

        let remaining = remaining_calories(target_calories, consumed_calories);
        let today = self.clock.today();
        let recent = self
            .history
            .snapshot()
            .ids_since(today - Duration::days(RECENT_WINDOW_DAYS));

        let mut excluded: HashSet<String> = HashSet::new();
        let breakfast = self.pick_slot(protein, MealType::Breakfast, &recent, &mut excluded)?;
        let lunch = self.pick_slot(protein, MealType::Lunch, &recent, &mut excluded)?;
        let dinner = self.pick_slot(protein, MealType::Dinner, &recent, &mut excluded)?;
        let snack = self.pick_slot(protein, MealType::Snack, &recent, &mut excluded)?;

        let raw_total = breakfast.total_calories
            + lunch.total_calories
            + dinner.total_calories
            + snack.total_calories;
        let factor = scale_factor(remaining, f64::from(raw_total));

        let breakfast = scale_recipe(breakfast, factor);
        let lunch = scale_recipe(lunch, factor);
        let dinner = scale_recipe(dinner, factor);
        let snack = scale_recipe(snack, factor);
        let slots = [&breakfast, &lunch, &dinner, &snack];

        let plan = MealPlan {
            protein,
            total_calories: slots.iter().map(|r| r.total_calories).sum(),
            total_protein: slots.iter().map(|r| r.total_protein).sum(),
            total_carbs: slots.iter().map(|r| r.total_carbs).sum(),
            total_fat: slots.iter().map(|r| r.total_fat).sum(),
            breakfast,
            lunch,
            dinner,
            snack,
            scale_factor: factor,
            remaining_calories: remaining,
        };

        self.history.record(
            today,
            plan.recipe_ids(),
            today - Duration::days(HISTORY_RETENTION_DAYS),
        );

        info!(
            "Generated {} plan: {} kcal (scale {:.2}, budget {:.0})",
            protein, plan.total_calories, factor, remaining
        );
        Ok(plan)
    }

    /// A single catalog recipe at a given (clamped) scale, used when the
    /// user accepts one slot of a plan
    pub fn scaled_recipe(&self, recipe_id: &str, factor: f64) -> Option<PlannedRecipe> {
        let factor = if factor.is_finite() { factor } else { 1.0 };
        let factor = factor.clamp(MIN_SCALE_FACTOR, MAX_SCALE_FACTOR);
        self.catalog.get(recipe_id).map(|r| scale_recipe(r, factor))
    }

    fn pick_slot(
        &self,
        protein: ProteinBase,
        meal_type: MealType,
        recent: &HashSet<String>,
        excluded: &mut HashSet<String>,
    ) -> Result<&Recipe, PlanError> {
        let candidates = self.catalog.candidates(protein, meal_type);
        let recipe = self
            .pick_recipe(&candidates, recent, excluded)
            .ok_or(PlanError::InsufficientRecipes { protein, meal_type })?;
        excluded.insert(recipe.id.clone());
        Ok(recipe)
    }

    /// Fresh candidates first, then anything not already in this plan,
    /// then anything at all
    fn pick_recipe<'a>(
        &self,
        candidates: &[&'a Recipe],
        recent: &HashSet<String>,
        excluded: &HashSet<String>,
    ) -> Option<&'a Recipe> {
        let fresh: Vec<&'a Recipe> = candidates
            .iter()
            .copied()
            .filter(|r| !recent.contains(&r.id) && !excluded.contains(&r.id))
            .collect();
        if !fresh.is_empty() {
            return Some(fresh[self.random.pick(fresh.len())]);
        }

        let not_in_plan: Vec<&'a Recipe> = candidates
            .iter()
            .copied()
            .filter(|r| !excluded.contains(&r.id))
            .collect();
        if !not_in_plan.is_empty() {
            debug!("All candidates used recently, repeating one");
            return Some(not_in_plan[self.random.pick(not_in_plan.len())]);
        }

        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.random.pick(candidates.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::testing::SequenceRandom;
    use chrono::NaiveDate;
    use nutri_track_data::repository::InMemoryStorage;

    fn clock() -> Arc<FixedClock> {
        let local = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Arc::new(FixedClock::at_local(local, 0).unwrap())
    }

    fn recipe(id: &str, meal_type: MealType, calories: u32) -> Recipe {
        Recipe {
            id: id.to_string(),
            name: id.to_string(),
            emoji: "🍽️".to_string(),
            meal_type,
            protein_base: ProteinBase::Chicken,
            ingredients: vec![RecipeIngredient {
                food_id: format!("{}-main", id),
                name: "Main".to_string(),
                emoji: String::new(),
                grams: 150,
                calories,
                protein: 30,
                carbs: 20,
                fat: 10,
            }],
            total_calories: calories,
            total_protein: 30,
            total_carbs: 20,
            total_fat: 10,
            preparation_tip: String::new(),
            video_search: id.to_string(),
        }
    }

    fn small_catalog() -> Arc<RecipeCatalog> {
        Arc::new(RecipeCatalog::new(vec![
            recipe("b1", MealType::Breakfast, 400),
            recipe("b2", MealType::Breakfast, 400),
            recipe("l1", MealType::Lunch, 600),
            recipe("d1", MealType::Dinner, 600),
            recipe("s1", MealType::Snack, 400),
        ]))
    }

    fn generator(
        catalog: Arc<RecipeCatalog>,
        random: Arc<dyn RandomSource>,
        clock: Arc<FixedClock>,
    ) -> (MealPlanGenerator, Arc<SuggestionHistoryStore>) {
        let history = Arc::new(SuggestionHistoryStore::load(Arc::new(InMemoryStorage::new())));
        let generator = MealPlanGenerator::new(catalog, history.clone(), random, clock);
        (generator, history)
    }

    #[test]
    fn test_every_protein_yields_a_complete_plan() {
        let (generator, _) = generator(RecipeCatalog::builtin(), Arc::new(ThreadRandom), clock());

        for protein in ProteinBase::ALL {
            let plan = generator.generate_daily_plan(protein, 2000.0, 0.0).unwrap();
            let ids: HashSet<String> = plan.recipe_ids().into_iter().collect();
            assert_eq!(ids.len(), 4, "{} plan repeated a recipe", protein);
            for meal_type in MealType::ALL {
                assert_eq!(plan.slot(meal_type).meal_type, meal_type);
                assert_eq!(plan.slot(meal_type).protein_base, protein);
            }
            assert!((MIN_SCALE_FACTOR..=MAX_SCALE_FACTOR).contains(&plan.scale_factor));
        }
    }

    #[test]
    fn test_plan_totals_match_scaled_recipes() {
        let (generator, _) = generator(RecipeCatalog::builtin(), Arc::new(ThreadRandom), clock());
        let plan = generator
            .generate_daily_plan(ProteinBase::Fish, 1800.0, 300.0)
            .unwrap();

        let recipes = plan.recipes();
        assert_eq!(
            plan.total_calories,
            recipes.iter().map(|r| r.total_calories).sum::<u32>()
        );
        assert_eq!(plan.total_protein, recipes.iter().map(|r| r.total_protein).sum::<u32>());
        assert_eq!(plan.total_carbs, recipes.iter().map(|r| r.total_carbs).sum::<u32>());
        assert_eq!(plan.total_fat, recipes.iter().map(|r| r.total_fat).sum::<u32>());

        for planned in recipes {
            let ingredient_calories: u32 = planned.ingredients.iter().map(|i| i.calories).sum();
            let drift = (i64::from(ingredient_calories) - i64::from(planned.total_calories)).abs();
            assert!(drift <= planned.ingredients.len() as i64, "{}", planned.recipe_id);
            assert!(planned.video_url.starts_with("https://www.youtube.com/results?search_query="));
            assert_eq!(planned.scale_factor, plan.scale_factor);
        }
    }

    #[test]
    fn test_scale_factor_bounds() {
        assert_eq!(scale_factor(1000.0, 1000.0), 1.0);
        assert_eq!(scale_factor(5000.0, 1000.0), MAX_SCALE_FACTOR);
        assert_eq!(scale_factor(500.0, 2000.0), MIN_SCALE_FACTOR);
        assert_eq!(scale_factor(800.0, 0.0), 1.0);
        assert_eq!(remaining_calories(2000.0, 1900.0), MIN_REMAINING_CALORIES);
        assert_eq!(remaining_calories(2000.0, 500.0), 1500.0);
    }

    #[test]
    fn test_budget_floor_and_scaled_grams() {
        // Raw total is 2000 kcal, budget floors at 500 so the factor clamps to 0.5
        let (generator, _) = generator(small_catalog(), Arc::new(SequenceRandom::new(vec![0])), clock());
        let plan = generator
            .generate_daily_plan(ProteinBase::Chicken, 2000.0, 1950.0)
            .unwrap();

        assert_eq!(plan.remaining_calories, MIN_REMAINING_CALORIES);
        assert_eq!(plan.scale_factor, 0.5);
        assert_eq!(plan.lunch.total_calories, 300);
        assert_eq!(plan.lunch.ingredients[0].grams, 75);
        assert_eq!(plan.total_calories, 1000);
    }

    #[test]
    fn test_recent_recipes_are_avoided() {
        let clock = clock();
        let (generator, history) =
            generator(small_catalog(), Arc::new(SequenceRandom::new(vec![0])), clock.clone());

        history.record(
            clock.days_ago(1),
            vec!["b1".to_string(), "l1".to_string()],
            clock.days_ago(7),
        );
        let plan = generator
            .generate_daily_plan(ProteinBase::Chicken, 2000.0, 0.0)
            .unwrap();
        assert_eq!(plan.breakfast.recipe_id, "b2");

        // Only candidate for lunch was used yesterday, so it repeats
        assert_eq!(plan.lunch.recipe_id, "l1");
    }

    #[test]
    fn test_history_two_days_back_is_recent() {
        let clock = clock();
        let (generator, history) =
            generator(small_catalog(), Arc::new(SequenceRandom::new(vec![0])), clock.clone());

        history.record(clock.days_ago(2), vec!["b1".to_string()], clock.days_ago(7));
        let plan = generator
            .generate_daily_plan(ProteinBase::Chicken, 2000.0, 0.0)
            .unwrap();
        assert_eq!(plan.breakfast.recipe_id, "b2");
    }

    #[test]
    fn test_history_older_than_window_is_ignored() {
        let clock = clock();
        let (generator, history) =
            generator(small_catalog(), Arc::new(SequenceRandom::new(vec![0])), clock.clone());

        history.record(clock.days_ago(3), vec!["b1".to_string()], clock.days_ago(7));
        let plan = generator
            .generate_daily_plan(ProteinBase::Chicken, 2000.0, 0.0)
            .unwrap();
        assert_eq!(plan.breakfast.recipe_id, "b1");
    }

    #[test]
    fn test_generation_records_and_prunes_history() {
        let clock = clock();
        let (generator, history) =
            generator(small_catalog(), Arc::new(SequenceRandom::new(vec![0])), clock.clone());
        history.record(clock.days_ago(10), vec!["old".to_string()], clock.days_ago(30));

        let plan = generator
            .generate_daily_plan(ProteinBase::Chicken, 2000.0, 0.0)
            .unwrap();

        let snapshot = history.snapshot();
        assert_eq!(snapshot.ids_on(clock.today()), plan.recipe_ids().as_slice());
        assert_eq!(snapshot.dates().count(), 1);
    }

    #[test]
    fn test_regenerating_rotates_breakfast() {
        let (generator, _) = generator(small_catalog(), Arc::new(SequenceRandom::new(vec![0])), clock());
        let first = generator
            .generate_daily_plan(ProteinBase::Chicken, 2000.0, 0.0)
            .unwrap();
        let second = generator
            .generate_daily_plan(ProteinBase::Chicken, 2000.0, 0.0)
            .unwrap();
        assert_ne!(first.breakfast.recipe_id, second.breakfast.recipe_id);
    }

    #[test]
    fn test_missing_slot_fails_whole_plan() {
        let catalog = Arc::new(RecipeCatalog::new(vec![
            recipe("b1", MealType::Breakfast, 400),
            recipe("l1", MealType::Lunch, 600),
            recipe("d1", MealType::Dinner, 600),
        ]));
        let (generator, history) = generator(catalog, Arc::new(ThreadRandom), clock());

        let err = generator
            .generate_daily_plan(ProteinBase::Chicken, 2000.0, 0.0)
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::InsufficientRecipes {
                protein: ProteinBase::Chicken,
                meal_type: MealType::Snack,
            }
        );
        assert!(history.snapshot().is_empty());

        let err = generator
            .generate_daily_plan(ProteinBase::Beef, 2000.0, 0.0)
            .unwrap_err();
        assert!(matches!(err, PlanError::InsufficientRecipes { meal_type: MealType::Breakfast, .. }));
    }

    #[test]
    fn test_invalid_budget_is_rejected() {
        let (generator, _) = generator(small_catalog(), Arc::new(ThreadRandom), clock());
        assert!(matches!(
            generator.generate_daily_plan(ProteinBase::Chicken, 0.0, 0.0),
            Err(PlanError::Validation(_))
        ));
        assert!(matches!(
            generator.generate_daily_plan(ProteinBase::Chicken, 2000.0, -1.0),
            Err(PlanError::Validation(_))
        ));
    }

    #[test]
    fn test_scaled_recipe_clamps_factor() {
        let (generator, _) = generator(small_catalog(), Arc::new(ThreadRandom), clock());
        let planned = generator.scaled_recipe("l1", 10.0).unwrap();
        assert_eq!(planned.scale_factor, MAX_SCALE_FACTOR);
        assert_eq!(planned.total_calories, 1200);
        assert!(generator.scaled_recipe("missing", 1.0).is_none());
    }
}
