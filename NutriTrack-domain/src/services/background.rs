//! Fire-and-forget meal pushes.
//!
//! Meal mutations enqueue a [`SyncJob`] on a bounded channel; a single
//! [`BackgroundSyncWorker`] drains it. A full queue drops the job, a failed
//! push is logged and forgotten. Nothing here ever reports back to the
//! code that scheduled the job.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::sync::SyncEngine;

pub const DEFAULT_SYNC_QUEUE_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncJob {
    /// Upload the full meal collection
    PushMeals,
}

/// Clonable handle for enqueueing background sync jobs
#[derive(Debug, Clone)]
pub struct SyncScheduler {
    sender: mpsc::Sender<SyncJob>,
}

impl SyncScheduler {
    /// A scheduler and the receiving end for its worker
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SyncJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueue without waiting. Returns whether the job was accepted.
    pub fn schedule(&self, job: SyncJob) -> bool {
        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                warn!("Background sync queue is full, dropping {:?}", job);
                false
            }
            Err(TrySendError::Closed(job)) => {
                debug!("Background sync worker stopped, dropping {:?}", job);
                false
            }
        }
    }
}

#[derive(Debug)]
pub struct BackgroundSyncWorker {
    engine: Arc<SyncEngine>,
    receiver: mpsc::Receiver<SyncJob>,
}

impl BackgroundSyncWorker {
    pub fn new(engine: Arc<SyncEngine>, receiver: mpsc::Receiver<SyncJob>) -> Self {
        Self { engine, receiver }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process jobs until every scheduler handle is dropped
    pub async fn run(mut self) {
        info!("Background sync worker started");
        while let Some(job) = self.receiver.recv().await {
            // Every push uploads the whole collection, so queued duplicates
            // add nothing
            let mut coalesced = 0;
            while self.receiver.try_recv().is_ok() {
                coalesced += 1;
            }
            if coalesced > 0 {
                debug!("Coalesced {} queued sync jobs", coalesced);
            }
            self.handle(job).await;
        }
        info!("Background sync worker stopped");
    }

    async fn handle(&self, job: SyncJob) {
        if !self.engine.is_authenticated() {
            debug!("Signed out since {:?} was scheduled, skipping", job);
            return;
        }

        match job {
            SyncJob::PushMeals => match self.engine.push_meals().await {
                Ok(count) => debug!("Background push sent {} meals", count),
                Err(e) => warn!("Background meal push failed: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthSessionManager;
    use crate::clock::SystemClock;
    use crate::entities::MealType;
    use crate::remote::MockAuthRemote;
    use crate::stores::{MealStore, UserStore};
    use crate::testing::{sample_new_meal, seed_session, InMemoryBackend};
    use nutri_track_data::repository::{InMemoryStorage, KeyValueStore};

    struct Setup {
        backend: Arc<InMemoryBackend>,
        meals: Arc<MealStore>,
        session: Arc<AuthSessionManager>,
        engine: Arc<SyncEngine>,
    }

    fn setup(signed_in: bool) -> Setup {
        let backend = Arc::new(InMemoryBackend::new());
        let token = backend.seed_account("ana@example.com", "secret1");
        let storage: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        if signed_in {
            seed_session(storage.clone(), &token);
        }
        let clock = Arc::new(SystemClock);
        let user = Arc::new(UserStore::load(storage.clone()));
        let meals = Arc::new(MealStore::load(storage.clone(), clock.clone()));
        let session = Arc::new(AuthSessionManager::load(Arc::new(MockAuthRemote::new()), storage));
        let engine = Arc::new(SyncEngine::new(
            user,
            meals.clone(),
            session.clone(),
            backend.clone(),
            clock,
        ));
        Setup {
            backend,
            meals,
            session,
            engine,
        }
    }

    #[test]
    fn test_full_queue_drops_jobs() {
        let (scheduler, _receiver) = SyncScheduler::channel(1);
        assert!(scheduler.schedule(SyncJob::PushMeals));
        assert!(!scheduler.schedule(SyncJob::PushMeals));
    }

    #[test]
    fn test_closed_queue_drops_jobs() {
        let (scheduler, receiver) = SyncScheduler::channel(4);
        drop(receiver);
        assert!(!scheduler.schedule(SyncJob::PushMeals));
    }

    #[tokio::test]
    async fn test_worker_pushes_meals() {
        let s = setup(true);
        s.meals.add(sample_new_meal("oats", MealType::Breakfast)).unwrap();
        let (scheduler, receiver) = SyncScheduler::channel(8);
        let worker = BackgroundSyncWorker::new(s.engine.clone(), receiver);

        scheduler.schedule(SyncJob::PushMeals);
        scheduler.schedule(SyncJob::PushMeals);
        drop(scheduler);
        worker.run().await;

        assert_eq!(s.backend.meals_of("ana@example.com").len(), 1);
        // Both jobs were queued before the worker ran, so one push covers them
        assert_eq!(s.backend.calls(), vec!["push_meals".to_string()]);
    }

    #[tokio::test]
    async fn test_worker_swallows_failures() {
        let s = setup(true);
        s.meals.add(sample_new_meal("oats", MealType::Breakfast)).unwrap();
        s.backend.set_offline(true);
        let (scheduler, receiver) = SyncScheduler::channel(8);
        let handle = BackgroundSyncWorker::new(s.engine.clone(), receiver).spawn();

        scheduler.schedule(SyncJob::PushMeals);
        drop(scheduler);
        handle.await.unwrap();

        assert_eq!(s.meals.all().len(), 1);
        assert!(s.backend.meals_of("ana@example.com").is_empty());
    }

    #[tokio::test]
    async fn test_worker_skips_after_logout() {
        let s = setup(true);
        s.meals.add(sample_new_meal("oats", MealType::Breakfast)).unwrap();
        let (scheduler, receiver) = SyncScheduler::channel(8);
        let worker = BackgroundSyncWorker::new(s.engine.clone(), receiver);

        scheduler.schedule(SyncJob::PushMeals);
        s.session.logout();
        drop(scheduler);
        worker.run().await;

        assert!(s.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_worker_ignores_anonymous_device() {
        let s = setup(false);
        s.meals.add(sample_new_meal("oats", MealType::Breakfast)).unwrap();
        let (scheduler, receiver) = SyncScheduler::channel(8);
        let worker = BackgroundSyncWorker::new(s.engine.clone(), receiver);

        scheduler.schedule(SyncJob::PushMeals);
        drop(scheduler);
        worker.run().await;

        assert!(s.backend.calls().is_empty());
    }
}
