use std::sync::Arc;

use chrono::NaiveDate;
use nutri_track_data::models::StorageKey;
use nutri_track_data::repository::{DomainStore, KeyValueStore};
use parking_lot::RwLock;

use crate::entities::SuggestionHistory;

/// Recipe ids handed out by the meal plan generator
#[derive(Debug)]
pub struct SuggestionHistoryStore {
    storage: DomainStore<SuggestionHistory>,
    history: RwLock<SuggestionHistory>,
}

impl SuggestionHistoryStore {
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let storage = DomainStore::new(backend, StorageKey::SuggestionHistory);
        let history = RwLock::new(storage.load());
        Self { storage, history }
    }

    pub fn snapshot(&self) -> SuggestionHistory {
        self.history.read().clone()
    }

    /// Append ids under `date`, drop dates before `keep_from`, then persist
    pub fn record(&self, date: NaiveDate, ids: Vec<String>, keep_from: NaiveDate) {
        let mut history = self.history.write();
        history.record(date, ids);
        history.prune_before(keep_from);
        self.storage.save(&history);
    }
}
