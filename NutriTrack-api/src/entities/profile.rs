use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Progress through the onboarding screens
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OnboardingStepRequest {
    #[validate(range(max = 20, message = "Onboarding step must be between 0 and 20"))]
    pub step: u8,
}
