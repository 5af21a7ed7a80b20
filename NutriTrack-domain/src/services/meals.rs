//! Every way of logging a meal goes through [`MealService`], which keeps
//! the meal store and the background push in step.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use super::background::{SyncJob, SyncScheduler};
use crate::auth::AuthSessionManager;
use crate::entities::conversions::{
    convert_to_new_meal_from_detection, convert_to_new_meal_from_ingredient,
};
use crate::entities::{FoodPortion, LoggedMeal, MealType, NewMeal, PlannedRecipe};
use crate::remote::FoodAnalysis;
use crate::stores::{FavoritesStore, MealStore, StoreError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MealServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Food {0} is not a favorite")]
    FavoriteNotFound(String),

    #[error("Nothing to log")]
    NothingToLog,
}

impl From<StoreError> for MealServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Validation(message) => MealServiceError::Validation(message),
        }
    }
}

pub struct MealService {
    meals: Arc<MealStore>,
    favorites: Arc<FavoritesStore>,
    session: Arc<AuthSessionManager>,
    scheduler: SyncScheduler,
}

impl fmt::Debug for MealService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MealService")
            .field("meals", &self.meals)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl MealService {
    pub fn new(
        meals: Arc<MealStore>,
        favorites: Arc<FavoritesStore>,
        session: Arc<AuthSessionManager>,
        scheduler: SyncScheduler,
    ) -> Self {
        Self {
            meals,
            favorites,
            session,
            scheduler,
        }
    }

    pub fn store(&self) -> &MealStore {
        &self.meals
    }

    pub fn add_meal(&self, meal: NewMeal) -> Result<LoggedMeal, MealServiceError> {
        let logged = self.meals.add(meal)?;
        debug!("Logged {} ({} kcal)", logged.food_name, logged.calories);
        self.schedule_push();
        Ok(logged)
    }

    /// Returns whether a meal with that id existed
    pub fn remove_meal(&self, id: &str) -> bool {
        let removed = self.meals.remove(id);
        if removed {
            self.schedule_push();
        }
        removed
    }

    /// Log a catalog food described per 100 g
    pub fn log_food(
        &self,
        food: &FoodPortion,
        grams: f64,
        meal_type: MealType,
    ) -> Result<LoggedMeal, MealServiceError> {
        self.add_meal(food.to_new_meal(grams, meal_type))
    }

    /// Log a favorite with its default portion and slot unless overridden
    pub fn log_favorite(
        &self,
        food_id: &str,
        grams: Option<f64>,
        meal_type: Option<MealType>,
    ) -> Result<LoggedMeal, MealServiceError> {
        let favorite = self
            .favorites
            .get(food_id)
            .ok_or_else(|| MealServiceError::FavoriteNotFound(food_id.to_string()))?;

        let logged = self.log_food(
            &favorite.portion(),
            grams.unwrap_or(favorite.default_grams),
            meal_type.unwrap_or(favorite.default_meal_type),
        )?;
        self.favorites.increment_usage(food_id);
        Ok(logged)
    }

    /// One meal per food recognized in a photo
    pub fn log_detected_foods(
        &self,
        analysis: &FoodAnalysis,
        meal_type: MealType,
    ) -> Result<Vec<LoggedMeal>, MealServiceError> {
        let meals = analysis
            .matched_foods
            .iter()
            .map(|food| convert_to_new_meal_from_detection(food, meal_type))
            .collect();
        self.add_many(meals)
    }

    /// One meal per scaled ingredient of a planned recipe. The slot
    /// defaults to the recipe's own.
    pub fn log_planned_recipe(
        &self,
        recipe: &PlannedRecipe,
        meal_type: Option<MealType>,
    ) -> Result<Vec<LoggedMeal>, MealServiceError> {
        let meal_type = meal_type.unwrap_or(recipe.meal_type);
        let meals = recipe
            .ingredients
            .iter()
            .map(|ingredient| convert_to_new_meal_from_ingredient(ingredient, meal_type))
            .collect();
        let logged = self.add_many(meals)?;
        info!("Logged recipe {} as {} meals", recipe.recipe_id, logged.len());
        Ok(logged)
    }

    /// Drop meals older than `days`; returns how many were removed
    pub fn clear_older_than(&self, days: i64) -> usize {
        let removed = self.meals.clear_older_than(days);
        if removed > 0 {
            info!("Cleared {} meals older than {} days", removed, days);
        }
        removed
    }

    fn add_many(&self, meals: Vec<NewMeal>) -> Result<Vec<LoggedMeal>, MealServiceError> {
        if meals.is_empty() {
            return Err(MealServiceError::NothingToLog);
        }
        let logged = self.meals.add_all(meals)?;
        self.schedule_push();
        Ok(logged)
    }

    fn schedule_push(&self) {
        if self.session.is_authenticated() {
            self.scheduler.schedule(SyncJob::PushMeals);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::entities::RecipeIngredient;
    use crate::remote::{DetectedFood, MockAuthRemote};
    use crate::testing::{sample_favorite, sample_new_meal, seed_session};
    use chrono::NaiveDate;
    use nutri_track_data::repository::{InMemoryStorage, KeyValueStore};
    use tokio::sync::mpsc;

    struct Setup {
        service: MealService,
        favorites: Arc<FavoritesStore>,
        receiver: mpsc::Receiver<SyncJob>,
    }

    fn setup(signed_in: bool) -> Setup {
        let storage: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        if signed_in {
            seed_session(storage.clone(), "tok");
        }
        let local = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(23, 40, 0)
            .unwrap();
        let clock = Arc::new(FixedClock::at_local(local, -4).unwrap());
        let meals = Arc::new(MealStore::load(storage.clone(), clock));
        let favorites = Arc::new(FavoritesStore::load(storage.clone()));
        let session = Arc::new(AuthSessionManager::load(Arc::new(MockAuthRemote::new()), storage));
        let (scheduler, receiver) = SyncScheduler::channel(16);
        Setup {
            service: MealService::new(meals, favorites.clone(), session, scheduler),
            favorites,
            receiver,
        }
    }

    fn queued(receiver: &mut mpsc::Receiver<SyncJob>) -> usize {
        let mut count = 0;
        while receiver.try_recv().is_ok() {
            count += 1;
        }
        count
    }

    fn detected(name: &str, matched: Option<(&str, &str)>) -> DetectedFood {
        DetectedFood {
            detected_name: name.to_string(),
            matched_food_id: matched.map(|(id, _)| id.to_string()),
            matched_food_name: matched.map(|(_, name)| name.to_string()),
            estimated_grams: 120.0,
            preparation: String::new(),
            confidence: 0.9,
            match_confidence: None,
            calories: 180.0,
            protein: 12.0,
            carbs: 15.0,
            fat: 7.0,
            emoji: "🍽️".to_string(),
        }
    }

    #[test]
    fn test_add_and_remove_schedule_push_when_signed_in() {
        let mut s = setup(true);
        let meal = s.service.add_meal(sample_new_meal("oats", MealType::Breakfast)).unwrap();
        assert_eq!(meal.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert!(s.service.remove_meal(&meal.id));
        assert!(!s.service.remove_meal(&meal.id));
        assert_eq!(queued(&mut s.receiver), 2);
    }

    #[test]
    fn test_anonymous_mutations_stay_local() {
        let mut s = setup(false);
        s.service.add_meal(sample_new_meal("oats", MealType::Breakfast)).unwrap();
        assert_eq!(s.service.store().all().len(), 1);
        assert_eq!(queued(&mut s.receiver), 0);
    }

    #[test]
    fn test_invalid_meal_is_rejected() {
        let mut s = setup(true);
        let mut meal = sample_new_meal("oats", MealType::Breakfast);
        meal.grams = 0.0;
        assert!(matches!(s.service.add_meal(meal), Err(MealServiceError::Validation(_))));

        let mut meal = sample_new_meal("oats", MealType::Breakfast);
        meal.fat = -1.0;
        assert!(matches!(s.service.add_meal(meal), Err(MealServiceError::Validation(_))));

        assert!(s.service.store().all().is_empty());
        assert_eq!(queued(&mut s.receiver), 0);
    }

    #[test]
    fn test_log_favorite_uses_defaults_and_counts_usage() {
        let s = setup(false);
        s.favorites.add(sample_favorite("salmon")).unwrap();

        let meal = s.service.log_favorite("salmon", None, None).unwrap();
        assert_eq!(meal.grams, 150.0);
        assert_eq!(meal.calories, 300.0);
        assert_eq!(meal.protein, 30.0);
        assert_eq!(meal.meal_type, MealType::Lunch);

        let meal = s.service.log_favorite("salmon", Some(50.0), Some(MealType::Dinner)).unwrap();
        assert_eq!(meal.calories, 100.0);
        assert_eq!(meal.meal_type, MealType::Dinner);

        assert_eq!(s.favorites.get("salmon").unwrap().times_used, 2);
        assert_eq!(
            s.service.log_favorite("tofu", None, None),
            Err(MealServiceError::FavoriteNotFound("tofu".to_string()))
        );
    }

    #[test]
    fn test_log_detected_foods_one_meal_each() {
        let mut s = setup(true);
        let analysis = FoodAnalysis {
            success: true,
            matched_foods: vec![
                detected("grilled chicken", Some(("chicken-breast", "Pechuga de pollo"))),
                detected("mystery sauce", None),
            ],
            meal_description: "Chicken with sauce".to_string(),
            total_calories: 360.0,
            total_protein: 24.0,
            total_carbs: 30.0,
            total_fat: 14.0,
        };

        let logged = s.service.log_detected_foods(&analysis, MealType::Dinner).unwrap();
        assert_eq!(logged.len(), 2);
        assert_eq!(logged[0].food_id, "chicken-breast");
        assert_eq!(logged[0].food_name, "Pechuga de pollo");
        assert_eq!(logged[1].food_id, "ai-detected");
        assert_eq!(logged[1].food_name, "mystery sauce");
        assert!(logged.iter().all(|m| m.meal_type == MealType::Dinner));
        // One write, one push
        assert_eq!(queued(&mut s.receiver), 1);
    }

    #[test]
    fn test_log_planned_recipe_per_ingredient() {
        let s = setup(false);
        let ingredient = |id: &str, grams: u32, calories: u32| RecipeIngredient {
            food_id: id.to_string(),
            name: id.to_string(),
            emoji: String::new(),
            grams,
            calories,
            protein: 10,
            carbs: 5,
            fat: 2,
        };
        let recipe = PlannedRecipe {
            recipe_id: "r1".to_string(),
            name: "Bowl".to_string(),
            emoji: "🥗".to_string(),
            meal_type: MealType::Lunch,
            protein_base: crate::entities::ProteinBase::Chicken,
            ingredients: vec![ingredient("chicken-breast", 120, 198), ingredient("rice", 150, 195)],
            total_calories: 393,
            total_protein: 20,
            total_carbs: 10,
            total_fat: 4,
            preparation_tip: String::new(),
            video_url: String::new(),
            scale_factor: 1.0,
        };

        let logged = s.service.log_planned_recipe(&recipe, None).unwrap();
        assert_eq!(logged.len(), 2);
        assert_eq!(logged[0].grams, 120.0);
        assert_eq!(logged[1].calories, 195.0);
        assert!(logged.iter().all(|m| m.meal_type == MealType::Lunch));

        let logged = s.service.log_planned_recipe(&recipe, Some(MealType::Dinner)).unwrap();
        assert!(logged.iter().all(|m| m.meal_type == MealType::Dinner));
    }

    #[test]
    fn test_empty_analysis_logs_nothing() {
        let s = setup(false);
        let analysis = FoodAnalysis {
            success: true,
            matched_foods: vec![],
            meal_description: String::new(),
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fat: 0.0,
        };
        assert_eq!(
            s.service.log_detected_foods(&analysis, MealType::Lunch),
            Err(MealServiceError::NothingToLog)
        );
    }
}
