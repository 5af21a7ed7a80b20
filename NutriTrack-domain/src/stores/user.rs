use std::sync::Arc;

use chrono::{DateTime, Utc};
use nutri_track_data::models::StorageKey;
use nutri_track_data::repository::{DomainStore, KeyValueStore};
use parking_lot::RwLock;
use tracing::info;

use super::StoreError;
use crate::entities::{MetabolicProfile, SyncStatus, UserProfile, UserState};
use crate::validation::validate_request;

/// Profile, metabolic targets, onboarding flags and sync status
#[derive(Debug)]
pub struct UserStore {
    storage: DomainStore<UserState>,
    state: RwLock<UserState>,
}

impl UserStore {
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let storage = DomainStore::new(backend, StorageKey::User);
        let state = RwLock::new(storage.load());
        Self { storage, state }
    }

    pub fn snapshot(&self) -> UserState {
        self.state.read().clone()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.state.read().profile.clone()
    }

    pub fn metabolic_profile(&self) -> Option<MetabolicProfile> {
        self.state.read().metabolic_profile.clone()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.state.read().sync_status
    }

    /// Whether the user blob was ever written on this device
    pub fn has_local_data(&self) -> bool {
        self.storage.exists()
    }

    fn update<R>(&self, f: impl FnOnce(&mut UserState) -> R) -> R {
        let mut state = self.state.write();
        let result = f(&mut state);
        self.storage.save(&state);
        result
    }

    pub fn set_profile(&self, profile: UserProfile) -> Result<(), StoreError> {
        validate_request(&profile).map_err(StoreError::Validation)?;
        self.update(|state| state.profile = Some(profile));
        Ok(())
    }

    pub fn set_metabolic_profile(&self, metabolic: MetabolicProfile) {
        self.update(|state| state.metabolic_profile = Some(metabolic));
    }

    pub fn set_onboarding_step(&self, step: u8) {
        self.update(|state| state.onboarding_step = step);
    }

    pub fn complete_onboarding(&self) {
        self.update(|state| state.is_onboarded = true);
    }

    /// Forget the profile and start onboarding over
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.profile = None;
        state.metabolic_profile = None;
        state.is_onboarded = false;
        state.onboarding_step = 0;
        self.storage.clear();
        info!("User profile reset");
    }

    pub fn set_sync_status(&self, status: SyncStatus) {
        self.update(|state| state.sync_status = status);
    }

    pub fn mark_synced(&self, at: DateTime<Utc>) {
        self.update(|state| {
            state.sync_status = SyncStatus::Synced;
            state.last_sync_at = Some(at);
        });
    }

    /// Overwrite the local profile with the server's copy
    pub fn apply_remote_profile(&self, profile: UserProfile, metabolic: MetabolicProfile, at: DateTime<Utc>) {
        self.update(|state| {
            state.profile = Some(profile);
            state.metabolic_profile = Some(metabolic);
            state.is_onboarded = true;
            state.sync_status = SyncStatus::Synced;
            state.last_sync_at = Some(at);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_metabolic_profile, sample_profile};
    use nutri_track_data::repository::InMemoryStorage;

    #[test]
    fn test_state_survives_reload() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        let store = UserStore::load(backend.clone());
        store.set_profile(sample_profile()).unwrap();
        store.set_metabolic_profile(sample_metabolic_profile());
        store.complete_onboarding();
        store.set_sync_status(SyncStatus::Error);

        let reloaded = UserStore::load(backend);
        let state = reloaded.snapshot();
        assert!(state.is_onboarded);
        assert_eq!(state.sync_status, SyncStatus::Error);
        assert!(state.complete_profile().is_some());
    }

    #[test]
    fn test_invalid_profile_is_rejected_without_change() {
        let store = UserStore::load(Arc::new(InMemoryStorage::new()));
        let mut profile = sample_profile();
        profile.height_cm = 20.0;

        assert!(matches!(store.set_profile(profile), Err(StoreError::Validation(_))));
        assert!(store.profile().is_none());
        assert!(!store.has_local_data());
    }

    #[test]
    fn test_reset_removes_blob() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        let store = UserStore::load(backend.clone());
        store.set_profile(sample_profile()).unwrap();
        store.set_onboarding_step(4);
        assert!(store.has_local_data());

        store.reset();
        assert!(!store.has_local_data());
        let state = store.snapshot();
        assert!(state.profile.is_none());
        assert_eq!(state.onboarding_step, 0);
    }

    #[test]
    fn test_apply_remote_profile_marks_synced() {
        let store = UserStore::load(Arc::new(InMemoryStorage::new()));
        let at = Utc::now();
        store.apply_remote_profile(sample_profile(), sample_metabolic_profile(), at);

        let state = store.snapshot();
        assert!(state.is_onboarded);
        assert_eq!(state.sync_status, SyncStatus::Synced);
        assert_eq!(state.last_sync_at, Some(at));
    }
}
