use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use nutri_track_data::models::StorageKey;
use nutri_track_data::repository::{DomainStore, KeyValueStore};
use parking_lot::RwLock;

use super::StoreError;
use crate::clock::Clock;
use crate::entities::WaterEntry;

/// Entries older than this many days are pruned on every write
pub const WATER_RETENTION_DAYS: i64 = 30;
pub const MAX_WATER_PER_ADD_ML: u32 = 5000;

/// Daily water totals
#[derive(Debug)]
pub struct WaterStore {
    storage: DomainStore<Vec<WaterEntry>>,
    entries: RwLock<Vec<WaterEntry>>,
    clock: Arc<dyn Clock>,
}

impl WaterStore {
    pub fn load(backend: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let storage = DomainStore::new(backend, StorageKey::Water);
        let entries = RwLock::new(storage.load());
        Self {
            storage,
            entries,
            clock,
        }
    }

    /// Add to today's total and return the new total
    pub fn add_water(&self, ml: u32) -> Result<u32, StoreError> {
        if ml == 0 || ml > MAX_WATER_PER_ADD_ML {
            return Err(StoreError::Validation(format!(
                "Water amount must be between 1 and {} ml",
                MAX_WATER_PER_ADD_ML
            )));
        }

        let today = self.clock.today();
        let cutoff = today - Duration::days(WATER_RETENTION_DAYS);

        let mut entries = self.entries.write();
        let total = match entries.iter_mut().find(|e| e.date == today) {
            Some(entry) => {
                entry.ml = entry.ml.saturating_add(ml);
                entry.ml
            }
            None => {
                entries.push(WaterEntry { date: today, ml });
                ml
            }
        };
        entries.retain(|e| e.date >= cutoff);
        self.storage.save(&entries);
        Ok(total)
    }

    pub fn ml_for(&self, date: NaiveDate) -> u32 {
        self.entries
            .read()
            .iter()
            .find(|e| e.date == date)
            .map(|e| e.ml)
            .unwrap_or(0)
    }

    pub fn today_ml(&self) -> u32 {
        self.ml_for(self.clock.today())
    }

    pub fn entries(&self) -> Vec<WaterEntry> {
        let mut entries = self.entries.read().clone();
        entries.sort_by_key(|e| e.date);
        entries
    }

    pub fn reset_today(&self) {
        let today = self.clock.today();
        let mut entries = self.entries.write();
        entries.retain(|e| e.date != today);
        self.storage.save(&entries);
    }
}
