use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::session::SyncStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Cutting,
    Maintenance,
    Bulking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum DietType {
    #[default]
    Omnivore,
    Vegetarian,
    Vegan,
    Pescatarian,
    Keto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// Demographic and preference snapshot collected during onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    pub gender: Gender,

    pub date_of_birth: NaiveDate,

    #[validate(range(min = 100.0, max = 250.0, message = "Height must be between 100 and 250 cm"))]
    pub height_cm: f64,

    #[validate(range(min = 20.0, max = 300.0, message = "Weight must be between 20 and 300 kg"))]
    pub current_weight_kg: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 20.0, max = 300.0, message = "Target weight must be between 20 and 300 kg"))]
    pub target_weight_kg: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 3.0, max = 60.0, message = "Body fat must be between 3 and 60 percent"))]
    pub body_fat_percentage: Option<f64>,

    pub goal: Goal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,

    pub activity_level: ActivityLevel,

    #[serde(default)]
    pub diet_type: DietType,

    #[serde(default)]
    pub restrictions: Vec<String>,

    #[validate(range(min = 1, max = 8, message = "Meals per day must be between 1 and 8"))]
    pub meals_per_day: u8,

    #[serde(default)]
    pub experience_level: ExperienceLevel,

    /// Minutes available for cooking per day
    #[validate(range(max = 600, message = "Cooking time must be at most 600 minutes"))]
    pub cooking_time: u32,

    #[serde(default)]
    pub budget_level: BudgetLevel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MacroPercentages {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Daily targets derived by the external calculation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MetabolicProfile {
    pub bmr: f64,
    pub tdee: f64,
    pub target_calories: f64,
    pub target_protein_g: f64,
    pub target_carbs_g: f64,
    pub target_fat_g: f64,
    #[serde(default)]
    pub macro_percentages: MacroPercentages,
    #[serde(default)]
    pub calculation_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_weight_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_to_goal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_intake: Option<f64>,
}

/// Everything persisted under the user key
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct UserState {
    pub profile: Option<UserProfile>,
    pub metabolic_profile: Option<MetabolicProfile>,
    pub is_onboarded: bool,
    pub onboarding_step: u8,
    pub sync_status: SyncStatus,
    pub last_sync_at: Option<DateTime<Utc>>,
}

impl UserState {
    /// Both halves needed to push a profile upstream
    pub fn complete_profile(&self) -> Option<(&UserProfile, &MetabolicProfile)> {
        match (&self.profile, &self.metabolic_profile) {
            (Some(profile), Some(metabolic)) => Some((profile, metabolic)),
            _ => None,
        }
    }
}
