//! Wire types of the external backend.
//!
//! Sync payloads are camelCase; auth, calculation and analysis payloads
//! are snake_case.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::{
    ActivityLevel, DietType, ExperienceLevel, Gender, Goal, MacroPercentages, MealType,
    MetabolicProfile,
};

/// Profile as stored by the sync service. Every field is optional there.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteProfile {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub height_cm: Option<f64>,
    pub current_weight_kg: Option<f64>,
    pub target_weight_kg: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub goal: Option<Goal>,
    pub target_date: Option<NaiveDate>,
    pub activity_level: Option<ActivityLevel>,
    pub diet_type: Option<DietType>,
    pub restrictions: Option<Vec<String>>,
    pub meals_per_day: Option<u8>,
    pub experience_level: Option<ExperienceLevel>,
    pub cooking_time: Option<u32>,
    pub motivation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSyncPayload {
    pub profile: RemoteProfile,
    pub metabolic_profile: MetabolicProfile,
}

/// `GET /sync/profile`; a missing half means the server holds no profile
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileSyncResponse {
    pub profile: Option<RemoteProfile>,
    pub metabolic_profile: Option<MetabolicProfile>,
}

impl ProfileSyncResponse {
    pub fn into_complete(self) -> Option<ProfileSyncPayload> {
        match (self.profile, self.metabolic_profile) {
            (Some(profile), Some(metabolic_profile)) => Some(ProfileSyncPayload {
                profile,
                metabolic_profile,
            }),
            _ => None,
        }
    }
}

/// Meal as exchanged with the sync service. There is no `date` field; the
/// server keys meals by `(foodId, timestamp)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMeal {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub food_id: String,
    pub food_name: String,
    #[serde(default)]
    pub emoji: String,
    pub grams: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal_type: MealType,
    /// ISO-8601, possibly without an offset (read as UTC)
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSyncPayload {
    pub meals: Vec<RemoteMeal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSyncResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub synced: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MealListResponse {
    #[serde(default)]
    pub meals: Vec<RemoteMeal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: RemoteUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateProfileRequest {
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub height_cm: f64,
    pub weight_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat_percentage: Option<f64>,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateProfileResponse {
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
    #[serde(default)]
    pub weekly_weight_change: Option<f64>,
    #[serde(default)]
    pub estimated_time_to_goal: Option<f64>,
    #[serde(default)]
    pub water_intake: Option<f64>,
}

/// Image upload for the analysis service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoodImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

fn default_food_emoji() -> String {
    "🍽️".to_string()
}

/// One food recognized in a photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DetectedFood {
    pub detected_name: String,
    #[serde(default)]
    pub matched_food_id: Option<String>,
    #[serde(default)]
    pub matched_food_name: Option<String>,
    pub estimated_grams: f64,
    #[serde(default)]
    pub preparation: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub match_confidence: Option<f64>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default = "default_food_emoji")]
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct FoodAnalysis {
    pub success: bool,
    #[serde(default)]
    pub matched_foods: Vec<DetectedFood>,
    #[serde(default)]
    pub meal_description: String,
    #[serde(default)]
    pub total_calories: f64,
    #[serde(default)]
    pub total_protein: f64,
    #[serde(default)]
    pub total_carbs: f64,
    #[serde(default)]
    pub total_fat: f64,
}

/// Ids come back as numbers from some endpoints and strings from others
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_meal_accepts_numeric_id() {
        let meal: RemoteMeal = serde_json::from_value(json!({
            "id": 42,
            "foodId": "rice",
            "foodName": "Arroz",
            "grams": 100.0,
            "calories": 130.0,
            "protein": 2.7,
            "carbs": 28.0,
            "fat": 0.3,
            "mealType": "lunch",
            "timestamp": "2024-05-01T12:00:00"
        }))
        .unwrap();
        assert_eq!(meal.id.as_deref(), Some("42"));
        assert_eq!(meal.emoji, "");
    }

    #[test]
    fn test_profile_response_half_missing_is_incomplete() {
        let response: ProfileSyncResponse = serde_json::from_value(json!({
            "profile": {"name": "Ana"},
            "metabolicProfile": null
        }))
        .unwrap();
        assert!(response.into_complete().is_none());
    }
}
