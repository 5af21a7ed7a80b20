use std::sync::Arc;

use nutri_track_data::models::StorageKey;
use nutri_track_data::repository::{DomainStore, KeyValueStore};
use parking_lot::RwLock;

use super::StoreError;
use crate::entities::FavoriteFood;
use crate::validation::validate_request;

pub const DEFAULT_TOP_FAVORITES: usize = 5;

/// Favorite foods, unique per food id
#[derive(Debug)]
pub struct FavoritesStore {
    storage: DomainStore<Vec<FavoriteFood>>,
    favorites: RwLock<Vec<FavoriteFood>>,
}

impl FavoritesStore {
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let storage = DomainStore::new(backend, StorageKey::Favorites);
        let favorites = RwLock::new(storage.load());
        Self { storage, favorites }
    }

    /// Add a favorite with a zeroed usage counter. Returns `false` when the
    /// food is already a favorite.
    pub fn add(&self, mut food: FavoriteFood) -> Result<bool, StoreError> {
        validate_request(&food).map_err(StoreError::Validation)?;

        let mut favorites = self.favorites.write();
        if favorites.iter().any(|f| f.food_id == food.food_id) {
            return Ok(false);
        }
        food.times_used = 0;
        favorites.push(food);
        self.storage.save(&favorites);
        Ok(true)
    }

    pub fn remove(&self, food_id: &str) -> bool {
        let mut favorites = self.favorites.write();
        let before = favorites.len();
        favorites.retain(|f| f.food_id != food_id);
        let removed = favorites.len() != before;
        if removed {
            self.storage.save(&favorites);
        }
        removed
    }

    pub fn is_favorite(&self, food_id: &str) -> bool {
        self.favorites.read().iter().any(|f| f.food_id == food_id)
    }

    pub fn get(&self, food_id: &str) -> Option<FavoriteFood> {
        self.favorites.read().iter().find(|f| f.food_id == food_id).cloned()
    }

    /// Bump the usage counter, returning the new count
    pub fn increment_usage(&self, food_id: &str) -> Option<u32> {
        let mut favorites = self.favorites.write();
        let favorite = favorites.iter_mut().find(|f| f.food_id == food_id)?;
        favorite.times_used += 1;
        let count = favorite.times_used;
        self.storage.save(&favorites);
        Some(count)
    }

    /// Most used first; ties keep insertion order
    pub fn top(&self, limit: usize) -> Vec<FavoriteFood> {
        let mut favorites = self.favorites.read().clone();
        favorites.sort_by(|a, b| b.times_used.cmp(&a.times_used));
        favorites.truncate(limit);
        favorites
    }

    pub fn all(&self) -> Vec<FavoriteFood> {
        self.favorites.read().clone()
    }
}
