use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use nutri_track_data::models::StorageKey;
use nutri_track_data::repository::{DomainStore, KeyValueStore};
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use super::StoreError;
use crate::clock::Clock;
use crate::entities::conversions::migrate_stored_meals;
use crate::entities::{LoggedMeal, MacroTotals, NewMeal, StoredMeal};
use crate::validation::validate_request;

/// Logged meals in insertion order
#[derive(Debug)]
pub struct MealStore {
    storage: DomainStore<Vec<LoggedMeal>>,
    meals: RwLock<Vec<LoggedMeal>>,
    clock: Arc<dyn Clock>,
}

impl MealStore {
    /// Load meals, backfilling the local date of legacy records
    pub fn load(backend: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let storage = DomainStore::new(backend, StorageKey::Meals);
        let stored: Vec<StoredMeal> = storage.load_as();
        let (meals, migrated) = migrate_stored_meals(stored, clock.as_ref());
        if migrated {
            info!("Migrated {} stored meals to local dates", meals.len());
            storage.save(&meals);
        }
        Self {
            storage,
            meals: RwLock::new(meals),
            clock,
        }
    }

    pub fn has_local_data(&self) -> bool {
        self.storage.exists()
    }

    /// Stamp a validated meal with an id, the current time and today's
    /// local date, without storing it
    pub fn prepare(&self, meal: NewMeal) -> Result<LoggedMeal, StoreError> {
        validate_request(&meal).map_err(StoreError::Validation)?;
        let timestamp = self.clock.now();
        Ok(LoggedMeal {
            id: Uuid::new_v4().to_string(),
            food_id: meal.food_id,
            food_name: meal.food_name,
            emoji: meal.emoji,
            grams: meal.grams,
            calories: meal.calories,
            protein: meal.protein,
            carbs: meal.carbs,
            fat: meal.fat,
            meal_type: meal.meal_type,
            timestamp,
            date: self.clock.local_date(timestamp),
        })
    }

    pub fn add(&self, meal: NewMeal) -> Result<LoggedMeal, StoreError> {
        let mut added = self.add_all(vec![meal])?;
        Ok(added.remove(0))
    }

    /// Add several meals in one write. Nothing is stored if any of them is
    /// invalid.
    pub fn add_all(&self, meals: Vec<NewMeal>) -> Result<Vec<LoggedMeal>, StoreError> {
        let prepared = meals
            .into_iter()
            .map(|meal| self.prepare(meal))
            .collect::<Result<Vec<_>, _>>()?;

        let mut all = self.meals.write();
        all.extend(prepared.iter().cloned());
        self.storage.save(&all);
        Ok(prepared)
    }

    pub fn remove(&self, id: &str) -> bool {
        let mut all = self.meals.write();
        let before = all.len();
        all.retain(|m| m.id != id);
        let removed = all.len() != before;
        if removed {
            self.storage.save(&all);
        }
        removed
    }

    pub fn all(&self) -> Vec<LoggedMeal> {
        self.meals.read().clone()
    }

    pub fn for_date(&self, date: NaiveDate) -> Vec<LoggedMeal> {
        self.meals
            .read()
            .iter()
            .filter(|m| m.date == date)
            .cloned()
            .collect()
    }

    pub fn today(&self) -> Vec<LoggedMeal> {
        self.for_date(self.clock.today())
    }

    pub fn today_totals(&self) -> MacroTotals {
        let today = self.clock.today();
        let meals = self.meals.read();
        MacroTotals::from_meals(meals.iter().filter(|m| m.date == today))
    }

    /// Replace the whole collection, e.g. with the server's copy
    pub fn replace_all(&self, meals: Vec<LoggedMeal>) {
        let mut all = self.meals.write();
        *all = meals;
        self.storage.save(&all);
    }

    /// Drop meals dated more than `days` days before today. Returns how
    /// many were removed.
    pub fn clear_older_than(&self, days: i64) -> usize {
        let cutoff = self.clock.today() - Duration::days(days);
        let mut all = self.meals.write();
        let before = all.len();
        all.retain(|m| m.date >= cutoff);
        let removed = before - all.len();
        if removed > 0 {
            self.storage.save(&all);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::entities::MealType;
    use crate::testing::sample_new_meal;
    use nutri_track_data::repository::InMemoryStorage;
    use serde_json::json;

    fn clock_at(hour: u32, minute: u32, offset_hours: i32) -> Arc<FixedClock> {
        let local = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        Arc::new(FixedClock::at_local(local, offset_hours).unwrap())
    }

    #[test]
    fn test_local_date_near_utc_midnight() {
        // Late evening west of UTC and just after midnight east of UTC
        for (hour, minute, offset) in [(23, 30, -5), (19, 15, -5), (0, 20, 3), (0, 59, 1)] {
            let clock = clock_at(hour, minute, offset);
            let store = MealStore::load(Arc::new(InMemoryStorage::new()), clock.clone());
            let meal = store.add(sample_new_meal("oats", MealType::Breakfast)).unwrap();
            assert_eq!(meal.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        }
    }

    #[test]
    fn test_legacy_records_are_migrated_and_resaved() {
        let backend = Arc::new(InMemoryStorage::new());
        backend
            .put(
                StorageKey::Meals,
                &json!([{
                    "id": "legacy",
                    "foodId": "rice",
                    "foodName": "Arroz",
                    "emoji": "🍚",
                    "grams": 100.0,
                    "calories": 130.0,
                    "protein": 2.7,
                    "carbs": 28.0,
                    "fat": 0.3,
                    "mealType": "dinner",
                    "timestamp": "2024-06-15T03:00:00.000Z"
                }])
                .to_string(),
            )
            .unwrap();

        let store = MealStore::load(backend.clone(), clock_at(9, 0, -5));
        assert_eq!(store.all()[0].date, NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());

        let raw = backend.get(StorageKey::Meals).unwrap().unwrap();
        assert!(raw.contains("\"date\":\"2024-06-14\""));
    }

    #[test]
    fn test_add_remove_and_totals() {
        let clock = clock_at(12, 0, 0);
        let store = MealStore::load(Arc::new(InMemoryStorage::new()), clock.clone());
        let first = store.add(sample_new_meal("oats", MealType::Breakfast)).unwrap();
        store.add(sample_new_meal("rice", MealType::Lunch)).unwrap();

        let totals = store.today_totals();
        assert_eq!(totals.calories, 300.0);
        assert_eq!(store.today().len(), 2);

        assert!(store.remove(&first.id));
        assert!(!store.remove(&first.id));
        assert_eq!(store.today_totals().calories, 150.0);

        clock.advance(Duration::days(1));
        assert_eq!(store.today_totals(), MacroTotals::default());
    }

    #[test]
    fn test_add_all_is_all_or_nothing() {
        let store = MealStore::load(Arc::new(InMemoryStorage::new()), clock_at(12, 0, 0));
        let mut bad = sample_new_meal("bad", MealType::Snack);
        bad.grams = -1.0;

        let result = store.add_all(vec![sample_new_meal("ok", MealType::Snack), bad]);
        assert!(result.is_err());
        assert!(store.all().is_empty());
        assert!(!store.has_local_data());
    }

    #[test]
    fn test_clear_older_than() {
        let clock = clock_at(12, 0, 0);
        let store = MealStore::load(Arc::new(InMemoryStorage::new()), clock.clone());
        store.add(sample_new_meal("old", MealType::Lunch)).unwrap();
        clock.advance(Duration::days(8));
        store.add(sample_new_meal("new", MealType::Lunch)).unwrap();

        assert_eq!(store.clear_older_than(7), 1);
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0].food_id, "new");
    }
}
