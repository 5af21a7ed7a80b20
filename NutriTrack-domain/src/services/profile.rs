use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::entities::conversions::{convert_to_calculate_request, convert_to_domain_metabolic};
use crate::entities::{MetabolicProfile, UserProfile, UserState};
use crate::remote::{NutritionBackend, RemoteError};
use crate::stores::{StoreError, UserStore};
use crate::validation::validate_request;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl From<StoreError> for ProfileServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Validation(message) => ProfileServiceError::Validation(message),
        }
    }
}

/// Onboarding and metabolic targets
pub struct ProfileService {
    user: Arc<UserStore>,
    backend: Arc<dyn NutritionBackend>,
}

impl fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileService").field("user", &self.user).finish()
    }
}

impl ProfileService {
    pub fn new(user: Arc<UserStore>, backend: Arc<dyn NutritionBackend>) -> Self {
        Self { user, backend }
    }

    pub fn snapshot(&self) -> UserState {
        self.user.snapshot()
    }

    /// Ask the calculation service for targets, then store the profile and
    /// its targets and finish onboarding. Nothing is stored on failure.
    pub async fn calculate(&self, profile: UserProfile) -> Result<MetabolicProfile, ProfileServiceError> {
        validate_request(&profile).map_err(ProfileServiceError::Validation)?;

        let request = convert_to_calculate_request(&profile);
        let response = self.backend.calculate_profile(&request).await?;
        let metabolic = convert_to_domain_metabolic(response);

        self.user.set_profile(profile)?;
        self.user.set_metabolic_profile(metabolic.clone());
        self.user.complete_onboarding();
        info!("Metabolic profile calculated: {} kcal target", metabolic.target_calories);
        Ok(metabolic)
    }

    pub fn set_onboarding_step(&self, step: u8) {
        self.user.set_onboarding_step(step);
    }

    pub fn reset(&self) {
        self.user.reset();
    }
}
