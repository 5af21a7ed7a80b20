use std::sync::Arc;

use nutri_track_data::models::StorageKey;
use nutri_track_data::repository::{DomainStore, KeyValueStore};
use parking_lot::RwLock;
use uuid::Uuid;

use super::StoreError;
use crate::clock::Clock;
use crate::entities::{round1, WeightEntry};

pub const MIN_WEIGHT_KG: f64 = 20.0;
pub const MAX_WEIGHT_KG: f64 = 300.0;

/// Weight log, sorted ascending by date, one entry per date
#[derive(Debug)]
pub struct WeightStore {
    storage: DomainStore<Vec<WeightEntry>>,
    entries: RwLock<Vec<WeightEntry>>,
    clock: Arc<dyn Clock>,
}

impl WeightStore {
    pub fn load(backend: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let storage = DomainStore::new(backend, StorageKey::Weight);
        let mut entries: Vec<WeightEntry> = storage.load();
        entries.sort_by_key(|e| e.date);
        Self {
            storage,
            entries: RwLock::new(entries),
            clock,
        }
    }

    /// Record today's weight, replacing any earlier entry for today
    pub fn add_entry(&self, weight_kg: f64, note: Option<String>) -> Result<WeightEntry, StoreError> {
        if !weight_kg.is_finite() || !(MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&weight_kg) {
            return Err(StoreError::Validation(format!(
                "Weight must be a number between {} and {} kg",
                MIN_WEIGHT_KG, MAX_WEIGHT_KG
            )));
        }

        let today = self.clock.today();
        let entry = WeightEntry {
            id: Uuid::new_v4().to_string(),
            date: today,
            weight_kg: round1(weight_kg),
            note: note.filter(|n| !n.trim().is_empty()),
        };

        let mut entries = self.entries.write();
        entries.retain(|e| e.date != today);
        entries.push(entry.clone());
        entries.sort_by_key(|e| e.date);
        self.storage.save(&entries);
        Ok(entry)
    }

    pub fn remove_entry(&self, id: &str) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        let removed = entries.len() != before;
        if removed {
            self.storage.save(&entries);
        }
        removed
    }

    pub fn entries(&self) -> Vec<WeightEntry> {
        self.entries.read().clone()
    }

    pub fn latest_weight(&self) -> Option<f64> {
        self.entries.read().last().map(|e| e.weight_kg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{Duration, NaiveDate};
    use nutri_track_data::repository::InMemoryStorage;

    fn setup() -> (Arc<FixedClock>, WeightStore) {
        let local = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::at_local(local, 1).unwrap());
        let store = WeightStore::load(Arc::new(InMemoryStorage::new()), clock.clone());
        (clock, store)
    }

    #[test]
    fn test_same_day_entries_keep_last() {
        let (_, store) = setup();
        for weight in [80.0, 79.46, 79.0, 78.84] {
            store.add_entry(weight, None).unwrap();
        }

        let entries = store.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].weight_kg, 78.8);
    }

    #[test]
    fn test_entries_sorted_by_date() {
        let (clock, store) = setup();
        store.add_entry(80.0, Some("start".to_string())).unwrap();
        clock.advance(Duration::days(1));
        store.add_entry(79.5, Some("  ".to_string())).unwrap();

        let entries = store.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].date < entries[1].date);
        assert_eq!(entries[0].note.as_deref(), Some("start"));
        assert_eq!(entries[1].note, None);
        assert_eq!(store.latest_weight(), Some(79.5));
    }

    #[test]
    fn test_out_of_range_rejected_before_mutation() {
        let (_, store) = setup();
        store.add_entry(70.0, None).unwrap();

        for weight in [f64::NAN, f64::INFINITY, 5.0, 301.0] {
            assert!(store.add_entry(weight, None).is_err());
        }
        assert_eq!(store.latest_weight(), Some(70.0));
    }

    #[test]
    fn test_remove_entry() {
        let (_, store) = setup();
        let entry = store.add_entry(70.0, None).unwrap();
        assert!(store.remove_entry(&entry.id));
        assert!(store.entries().is_empty());
    }
}
