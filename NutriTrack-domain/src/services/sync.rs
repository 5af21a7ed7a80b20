//! Reconciles the profile and meal domains with the sync service.
//!
//! There is no record-level conflict resolution. Each flow decides which
//! side wins for a whole domain:
//! - login: server wins for profile and meals (30 days)
//! - registration: the device seeds the server
//! - full sync: server wins for profile, meals (7 days) are pulled then
//!   pushed back

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::AuthSessionManager;
use crate::clock::Clock;
use crate::entities::conversions::{
    convert_to_domain_meal, convert_to_domain_profile, convert_to_remote_meal,
    convert_to_remote_profile,
};
use crate::entities::{LoggedMeal, SyncStatus};
use crate::remote::{ProfileSyncPayload, RemoteError, SyncRemote};
use crate::stores::{MealStore, UserStore};

/// Meal window restored on login
pub const LOGIN_MEAL_WINDOW_DAYS: i64 = 30;
/// Meal window refreshed by a manual sync
pub const FULL_SYNC_MEAL_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error("Sign in to sync your data")]
    NotAuthenticated,

    #[error("No profile data to sync")]
    NothingToSync,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Invalid data from server: {0}")]
    InvalidRemoteData(String),
}

/// Outcome of pulling the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilePull {
    Applied,
    /// Nothing stored on the server yet; local data untouched
    NoRemoteData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginSync {
    /// Profile and meals were replaced with the server's copy
    Restored { meals: usize },
    /// Brand-new account, nothing restored
    NoRemoteData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationSync {
    /// Local data became the server's initial copy
    Uploaded { profile: bool, meals: usize },
    /// This device had nothing to upload
    NothingLocal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullSyncReport {
    pub profile: ProfilePull,
    pub meals_pulled: usize,
    pub meals_pushed: usize,
}

pub struct SyncEngine {
    user: Arc<UserStore>,
    meals: Arc<MealStore>,
    session: Arc<AuthSessionManager>,
    remote: Arc<dyn SyncRemote>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("status", &self.user.sync_status())
            .field("session", &self.session)
            .finish()
    }
}

impl SyncEngine {
    pub fn new(
        user: Arc<UserStore>,
        meals: Arc<MealStore>,
        session: Arc<AuthSessionManager>,
        remote: Arc<dyn SyncRemote>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user,
            meals,
            session,
            remote,
            clock,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    fn token(&self) -> Result<String, SyncError> {
        self.session.token().ok_or(SyncError::NotAuthenticated)
    }

    /// Upload the local profile and metabolic targets
    pub async fn push_profile(&self) -> Result<(), SyncError> {
        let token = self.token()?;
        let payload = {
            let state = self.user.snapshot();
            let (profile, metabolic) = state.complete_profile().ok_or(SyncError::NothingToSync)?;
            ProfileSyncPayload {
                profile: convert_to_remote_profile(profile),
                metabolic_profile: metabolic.clone(),
            }
        };

        self.remote.push_profile(&token, &payload).await?;
        debug!("Profile pushed");
        Ok(())
    }

    /// Overwrite the local profile with the server's copy, if it has one
    pub async fn pull_profile(&self) -> Result<ProfilePull, SyncError> {
        let token = self.token()?;
        let response = self.remote.fetch_profile(&token).await?;

        let Some(remote) = response.into_complete() else {
            debug!("No profile on server");
            return Ok(ProfilePull::NoRemoteData);
        };

        let mut profile = convert_to_domain_profile(remote.profile).map_err(SyncError::InvalidRemoteData)?;
        // The server does not store the budget level
        if let Some(local) = self.user.profile() {
            profile.budget_level = local.budget_level;
        }
        self.user
            .apply_remote_profile(profile, remote.metabolic_profile, self.clock.now());
        debug!("Profile pulled");
        Ok(ProfilePull::Applied)
    }

    /// Upload the full local meal collection. An empty collection is not
    /// sent. Returns how many meals were sent.
    pub async fn push_meals(&self) -> Result<usize, SyncError> {
        let token = self.token()?;
        let meals = self.meals.all();
        if meals.is_empty() {
            debug!("No meals to push");
            return Ok(0);
        }

        let payload: Vec<_> = meals.iter().map(convert_to_remote_meal).collect();
        let response = self.remote.push_meals(&token, &payload).await?;
        debug!("Pushed {} meals, server stored {}", payload.len(), response.synced);
        Ok(payload.len())
    }

    /// Replace local meals with the server's meals of the trailing `days`
    pub async fn pull_meals(&self, days: i64) -> Result<usize, SyncError> {
        let token = self.token()?;
        let to = self.clock.now();
        let from = to - Duration::days(days);

        let remote = self.remote.fetch_meals(&token, from, to).await?;
        let meals: Vec<LoggedMeal> = remote
            .into_iter()
            .filter_map(|m| convert_to_domain_meal(m, self.clock.as_ref()))
            .collect();

        let count = meals.len();
        self.meals.replace_all(meals);
        debug!("Pulled {} meals from the last {} days", count, days);
        Ok(count)
    }

    /// After signing in: the server's profile and recent meals replace
    /// the local copies. A new account without a profile is not an error.
    pub async fn login_flow(&self) -> Result<LoginSync, SyncError> {
        self.token()?;
        self.user.set_sync_status(SyncStatus::Syncing);

        let result = self.restore_from_server().await;

        match &result {
            Ok(LoginSync::NoRemoteData) => {
                info!("No server data for this account yet, keeping local data");
                self.user.set_sync_status(SyncStatus::NotSynced);
            }
            Ok(LoginSync::Restored { meals }) => {
                info!("Restored profile and {} meals from server", meals);
                self.user.mark_synced(self.clock.now());
            }
            Err(e) => self.fail("Login sync", e),
        }
        result
    }

    /// After creating an account: upload whatever this device already
    /// holds, profile first
    pub async fn registration_flow(&self) -> Result<RegistrationSync, SyncError> {
        self.token()?;
        if !self.user.has_local_data() && !self.meals.has_local_data() {
            debug!("No local data to upload after registration");
            return Ok(RegistrationSync::NothingLocal);
        }

        self.user.set_sync_status(SyncStatus::Syncing);
        let result = self.upload_local().await;

        match &result {
            Ok(outcome) => {
                info!("Uploaded local data after registration: {:?}", outcome);
                self.user.mark_synced(self.clock.now());
            }
            Err(e) => self.fail("Registration sync", e),
        }
        result
    }

    /// Manual sync: pull profile, pull a week of meals, push meals back
    pub async fn full_sync(&self) -> Result<FullSyncReport, SyncError> {
        self.token()?;
        self.user.set_sync_status(SyncStatus::Syncing);

        let result = self.pull_then_push().await;

        match &result {
            Ok(report) => {
                info!("Full sync finished: {:?}", report);
                self.user.mark_synced(self.clock.now());
            }
            Err(e) => self.fail("Full sync", e),
        }
        result
    }

    async fn restore_from_server(&self) -> Result<LoginSync, SyncError> {
        match self.pull_profile().await? {
            ProfilePull::NoRemoteData => Ok(LoginSync::NoRemoteData),
            ProfilePull::Applied => {
                let meals = self.pull_meals(LOGIN_MEAL_WINDOW_DAYS).await?;
                Ok(LoginSync::Restored { meals })
            }
        }
    }

    async fn upload_local(&self) -> Result<RegistrationSync, SyncError> {
        let profile = match self.push_profile().await {
            Ok(()) => true,
            Err(SyncError::NothingToSync) => false,
            Err(e) => return Err(e),
        };
        let meals = self.push_meals().await?;
        Ok(RegistrationSync::Uploaded { profile, meals })
    }

    async fn pull_then_push(&self) -> Result<FullSyncReport, SyncError> {
        let profile = self.pull_profile().await?;
        let meals_pulled = self.pull_meals(FULL_SYNC_MEAL_WINDOW_DAYS).await?;
        let meals_pushed = self.push_meals().await?;
        Ok(FullSyncReport {
            profile,
            meals_pulled,
            meals_pushed,
        })
    }

    fn fail(&self, flow: &str, error: &SyncError) {
        warn!("{} failed: {}", flow, error);
        self.user.set_sync_status(SyncStatus::Error);
    }
}
