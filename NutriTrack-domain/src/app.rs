//! Wiring of stores and services.
//!
//! Everything is built once from a storage backend and the remote
//! collaborators, then shared through `Arc`. There are no globals.

use std::sync::Arc;

use nutri_track_data::repository::KeyValueStore;

use crate::auth::AuthSessionManager;
use crate::catalog::RecipeCatalog;
use crate::clock::{Clock, SystemClock};
use crate::health::{create_default_health_service, HealthServiceTrait};
use crate::remote::{AuthRemote, NutritionBackend, SyncRemote};
use crate::services::background::DEFAULT_SYNC_QUEUE_CAPACITY;
use crate::services::{
    AccountService, BackgroundSyncWorker, FoodAnalysisService, MealPlanGenerator, MealService,
    ProfileService, RandomSource, SyncEngine, SyncScheduler, ThreadRandom,
};
use crate::stores::{
    FavoritesStore, MealStore, SuggestionHistoryStore, UserStore, WaterStore, WeightStore,
};

/// Every store and service of the application
#[derive(Debug, Clone)]
pub struct NutritionApp {
    pub clock: Arc<dyn Clock>,
    pub user: Arc<UserStore>,
    pub meals: Arc<MealStore>,
    pub weight: Arc<WeightStore>,
    pub water: Arc<WaterStore>,
    pub favorites: Arc<FavoritesStore>,
    pub session: Arc<AuthSessionManager>,
    pub sync: Arc<SyncEngine>,
    pub scheduler: SyncScheduler,
    pub meal_log: Arc<MealService>,
    pub planner: Arc<MealPlanGenerator>,
    pub profile: Arc<ProfileService>,
    pub analysis: Arc<FoodAnalysisService>,
    pub account: Arc<AccountService>,
    pub health: Arc<dyn HealthServiceTrait>,
}

pub struct NutritionAppBuilder {
    storage: Arc<dyn KeyValueStore>,
    sync_remote: Arc<dyn SyncRemote>,
    auth_remote: Arc<dyn AuthRemote>,
    backend: Arc<dyn NutritionBackend>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    catalog: Arc<RecipeCatalog>,
    queue_capacity: usize,
}

impl NutritionAppBuilder {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        sync_remote: Arc<dyn SyncRemote>,
        auth_remote: Arc<dyn AuthRemote>,
        backend: Arc<dyn NutritionBackend>,
    ) -> Self {
        Self {
            storage,
            sync_remote,
            auth_remote,
            backend,
            clock: Arc::new(SystemClock),
            random: Arc::new(ThreadRandom),
            catalog: RecipeCatalog::builtin(),
            queue_capacity: DEFAULT_SYNC_QUEUE_CAPACITY,
        }
    }

    /// One value serving all three remote roles, like the HTTP backend
    pub fn with_remote<R>(storage: Arc<dyn KeyValueStore>, remote: Arc<R>) -> Self
    where
        R: SyncRemote + AuthRemote + NutritionBackend + 'static,
    {
        Self::new(storage, remote.clone(), remote.clone(), remote)
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn catalog(mut self, catalog: Arc<RecipeCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Load every store and build the services. The worker must be spawned
    /// by the caller for background pushes to happen.
    pub fn build(self) -> (NutritionApp, BackgroundSyncWorker) {
        let storage = self.storage;
        let clock = self.clock;

        let user = Arc::new(UserStore::load(storage.clone()));
        let meals = Arc::new(MealStore::load(storage.clone(), clock.clone()));
        let weight = Arc::new(WeightStore::load(storage.clone(), clock.clone()));
        let water = Arc::new(WaterStore::load(storage.clone(), clock.clone()));
        let favorites = Arc::new(FavoritesStore::load(storage.clone()));
        let history = Arc::new(SuggestionHistoryStore::load(storage.clone()));
        let session = Arc::new(AuthSessionManager::load(self.auth_remote, storage.clone()));

        let sync = Arc::new(SyncEngine::new(
            user.clone(),
            meals.clone(),
            session.clone(),
            self.sync_remote,
            clock.clone(),
        ));
        let (scheduler, receiver) = SyncScheduler::channel(self.queue_capacity);
        let worker = BackgroundSyncWorker::new(sync.clone(), receiver);

        let meal_log = Arc::new(MealService::new(
            meals.clone(),
            favorites.clone(),
            session.clone(),
            scheduler.clone(),
        ));
        let planner = Arc::new(MealPlanGenerator::new(self.catalog, history, self.random, clock.clone()));
        let profile = Arc::new(ProfileService::new(user.clone(), self.backend.clone()));
        let analysis = Arc::new(FoodAnalysisService::new(self.backend.clone()));
        let account = Arc::new(AccountService::new(session.clone(), sync.clone()));
        let health = create_default_health_service(storage, self.backend);

        let app = NutritionApp {
            clock,
            user,
            meals,
            weight,
            water,
            favorites,
            session,
            sync,
            scheduler,
            meal_log,
            planner,
            profile,
            analysis,
            account,
            health,
        };
        (app, worker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LoginRequest;
    use crate::entities::{MealType, ProteinBase};
    use crate::testing::{sample_new_meal, InMemoryBackend};
    use nutri_track_data::repository::InMemoryStorage;

    #[tokio::test]
    async fn test_logged_meal_reaches_server_in_background() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.seed_account("ana@example.com", "secret1");
        let (app, worker) = NutritionAppBuilder::with_remote(Arc::new(InMemoryStorage::new()), backend.clone()).build();

        app.account
            .login(LoginRequest {
                email: "ana@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        app.meal_log
            .add_meal(sample_new_meal("oats", MealType::Breakfast))
            .unwrap();

        // Dropping the app closes the queue so the worker finishes
        drop(app);
        worker.run().await;

        assert_eq!(backend.meals_of("ana@example.com").len(), 1);
    }

    #[tokio::test]
    async fn test_state_survives_rebuild() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        let backend = Arc::new(InMemoryBackend::new());

        let (app, _worker) = NutritionAppBuilder::with_remote(storage.clone(), backend.clone()).build();
        app.meal_log
            .add_meal(sample_new_meal("oats", MealType::Breakfast))
            .unwrap();
        app.weight.add_entry(70.0, None).unwrap();
        app.water.add_water(500).unwrap();
        app.planner
            .generate_daily_plan(ProteinBase::Eggs, 2000.0, 150.0)
            .unwrap();
        drop(app);

        let (app, _worker) = NutritionAppBuilder::with_remote(storage, backend).build();
        assert_eq!(app.meals.today().len(), 1);
        assert_eq!(app.weight.latest_weight(), Some(70.0));
        assert_eq!(app.water.today_ml(), 500);
    }
}
