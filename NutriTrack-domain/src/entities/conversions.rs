//! Conversions between wire types, persisted layouts and domain entities.
//! Functions follow the pattern `convert_to_[target]_[model]`.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use tracing::warn;

use super::{
    AuthUser, LoggedMeal, MealType, MetabolicProfile, NewMeal, RecipeIngredient, StoredMeal,
    UserProfile,
};
use crate::clock::Clock;
use crate::remote::{
    CalculateProfileRequest, CalculateProfileResponse, DetectedFood, RemoteMeal, RemoteProfile,
    RemoteUser,
};

/// Food id given to detections that matched nothing in the catalog
pub const AI_DETECTED_FOOD_ID: &str = "ai-detected";

/// Parse an ISO-8601 timestamp. Values without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Bring legacy meal records up to date, deriving the local date where it
/// is missing. Returns whether anything changed.
pub fn migrate_stored_meals(stored: Vec<StoredMeal>, clock: &dyn Clock) -> (Vec<LoggedMeal>, bool) {
    let mut migrated = false;
    let mut meals = Vec::with_capacity(stored.len());

    for record in stored {
        let Some(timestamp) = parse_timestamp(&record.timestamp) else {
            warn!("Dropping meal {} with unreadable timestamp {:?}", record.id, record.timestamp);
            migrated = true;
            continue;
        };
        let date = match record.date {
            Some(date) => date,
            None => {
                migrated = true;
                clock.local_date(timestamp)
            }
        };
        meals.push(LoggedMeal {
            id: record.id,
            food_id: record.food_id,
            food_name: record.food_name,
            emoji: record.emoji,
            grams: record.grams,
            calories: record.calories,
            protein: record.protein,
            carbs: record.carbs,
            fat: record.fat,
            meal_type: record.meal_type,
            timestamp,
            date,
        });
    }

    (meals, migrated)
}

pub fn convert_to_remote_meal(meal: &LoggedMeal) -> RemoteMeal {
    RemoteMeal {
        id: Some(meal.id.clone()),
        food_id: meal.food_id.clone(),
        food_name: meal.food_name.clone(),
        emoji: meal.emoji.clone(),
        grams: meal.grams,
        calories: meal.calories,
        protein: meal.protein,
        carbs: meal.carbs,
        fat: meal.fat,
        meal_type: meal.meal_type,
        timestamp: meal.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Server meal to local record; the local date is derived from the
/// timestamp on this device. Records without an id get a fresh one.
pub fn convert_to_domain_meal(meal: RemoteMeal, clock: &dyn Clock) -> Option<LoggedMeal> {
    let Some(timestamp) = parse_timestamp(&meal.timestamp) else {
        warn!("Skipping server meal with unreadable timestamp {:?}", meal.timestamp);
        return None;
    };
    Some(LoggedMeal {
        id: meal.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        food_id: meal.food_id,
        food_name: meal.food_name,
        emoji: meal.emoji,
        grams: meal.grams,
        calories: meal.calories,
        protein: meal.protein,
        carbs: meal.carbs,
        fat: meal.fat,
        meal_type: meal.meal_type,
        timestamp,
        date: clock.local_date(timestamp),
    })
}

pub fn convert_to_remote_profile(profile: &UserProfile) -> RemoteProfile {
    RemoteProfile {
        name: Some(profile.name.clone()),
        gender: Some(profile.gender),
        birth_date: Some(profile.date_of_birth),
        height_cm: Some(profile.height_cm),
        current_weight_kg: Some(profile.current_weight_kg),
        target_weight_kg: profile.target_weight_kg,
        body_fat_percentage: profile.body_fat_percentage,
        goal: Some(profile.goal),
        target_date: profile.target_date,
        activity_level: Some(profile.activity_level),
        diet_type: Some(profile.diet_type),
        restrictions: Some(profile.restrictions.clone()),
        meals_per_day: Some(profile.meals_per_day),
        experience_level: Some(profile.experience_level),
        cooking_time: Some(profile.cooking_time),
        motivation: profile.motivation.clone(),
    }
}

/// Server profile to local profile. Fails when a field the app cannot work
/// without is missing; preference fields fall back to defaults.
pub fn convert_to_domain_profile(remote: RemoteProfile) -> Result<UserProfile, String> {
    fn required<T>(value: Option<T>, field: &str) -> Result<T, String> {
        value.ok_or_else(|| format!("Server profile is missing {}", field))
    }

    Ok(UserProfile {
        name: remote.name.unwrap_or_default(),
        gender: required(remote.gender, "gender")?,
        date_of_birth: required(remote.birth_date, "birthDate")?,
        height_cm: required(remote.height_cm, "heightCm")?,
        current_weight_kg: required(remote.current_weight_kg, "currentWeightKg")?,
        target_weight_kg: remote.target_weight_kg,
        body_fat_percentage: remote.body_fat_percentage,
        goal: required(remote.goal, "goal")?,
        target_date: remote.target_date,
        activity_level: required(remote.activity_level, "activityLevel")?,
        diet_type: remote.diet_type.unwrap_or_default(),
        restrictions: remote.restrictions.unwrap_or_default(),
        meals_per_day: remote.meals_per_day.unwrap_or(3),
        experience_level: remote.experience_level.unwrap_or_default(),
        cooking_time: remote.cooking_time.unwrap_or(30),
        budget_level: Default::default(),
        motivation: remote.motivation,
    })
}

pub fn convert_to_domain_user(remote: RemoteUser) -> AuthUser {
    AuthUser {
        id: remote.id,
        email: remote.email,
        username: remote.username,
        created_at: remote.created_at,
    }
}

pub fn convert_to_calculate_request(profile: &UserProfile) -> CalculateProfileRequest {
    CalculateProfileRequest {
        gender: profile.gender,
        date_of_birth: profile.date_of_birth,
        height_cm: profile.height_cm,
        weight_kg: profile.current_weight_kg,
        body_fat_percentage: profile.body_fat_percentage,
        activity_level: profile.activity_level,
        goal: profile.goal,
    }
}

pub fn convert_to_domain_metabolic(response: CalculateProfileResponse) -> MetabolicProfile {
    MetabolicProfile {
        bmr: response.bmr,
        tdee: response.tdee,
        target_calories: response.target_calories,
        target_protein_g: response.target_protein_g,
        target_carbs_g: response.target_carbs_g,
        target_fat_g: response.target_fat_g,
        macro_percentages: response.macro_percentages,
        calculation_method: response.calculation_method,
        weekly_weight_change: response.weekly_weight_change,
        estimated_time_to_goal: response.estimated_time_to_goal,
        water_intake: response.water_intake,
    }
}

/// Meal for one food recognized in a photo
pub fn convert_to_new_meal_from_detection(food: &DetectedFood, meal_type: MealType) -> NewMeal {
    NewMeal {
        food_id: food
            .matched_food_id
            .clone()
            .unwrap_or_else(|| AI_DETECTED_FOOD_ID.to_string()),
        food_name: food
            .matched_food_name
            .clone()
            .unwrap_or_else(|| food.detected_name.clone()),
        emoji: food.emoji.clone(),
        grams: food.estimated_grams,
        calories: food.calories,
        protein: food.protein,
        carbs: food.carbs,
        fat: food.fat,
        meal_type,
    }
}

/// Meal for one already-scaled ingredient of a planned recipe
pub fn convert_to_new_meal_from_ingredient(ingredient: &RecipeIngredient, meal_type: MealType) -> NewMeal {
    NewMeal {
        food_id: ingredient.food_id.clone(),
        food_name: ingredient.name.clone(),
        emoji: ingredient.emoji.clone(),
        grams: f64::from(ingredient.grams),
        calories: f64::from(ingredient.calories),
        protein: f64::from(ingredient.protein),
        carbs: f64::from(ingredient.carbs),
        fat: f64::from(ingredient.fat),
        meal_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;

    fn stored(id: &str, timestamp: &str, date: Option<NaiveDate>) -> StoredMeal {
        StoredMeal {
            id: id.to_string(),
            food_id: "apple".to_string(),
            food_name: "Manzana".to_string(),
            emoji: "🍎".to_string(),
            grams: 150.0,
            calories: 78.0,
            protein: 0.4,
            carbs: 21.0,
            fat: 0.3,
            meal_type: MealType::Snack,
            timestamp: timestamp.to_string(),
            date,
        }
    }

    fn clock_utc_minus_5() -> FixedClock {
        let local = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
        FixedClock::at_local(local, -5).unwrap()
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
            .and_utc();
        assert_eq!(parse_timestamp("2024-05-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T12:30:00.000"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_migration_backfills_local_date() {
        let clock = clock_utc_minus_5();
        // 02:00 UTC on the 2nd is 21:00 on the 1st in UTC-5
        let records = vec![
            stored("a", "2024-05-02T02:00:00.000Z", None),
            stored("b", "2024-05-02T15:00:00.000Z", NaiveDate::from_ymd_opt(2024, 5, 2)),
        ];

        let (meals, migrated) = migrate_stored_meals(records, &clock);
        assert!(migrated);
        assert_eq!(meals[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(meals[1].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn test_migration_noop_when_dates_present() {
        let clock = clock_utc_minus_5();
        let records = vec![stored("a", "2024-05-02T02:00:00Z", NaiveDate::from_ymd_opt(2024, 5, 1))];
        let (meals, migrated) = migrate_stored_meals(records, &clock);
        assert!(!migrated);
        assert_eq!(meals.len(), 1);
    }

    #[test]
    fn test_unreadable_timestamp_is_dropped() {
        let clock = clock_utc_minus_5();
        let (meals, migrated) = migrate_stored_meals(vec![stored("a", "garbage", None)], &clock);
        assert!(meals.is_empty());
        assert!(migrated);
    }

    #[test]
    fn test_detection_without_match_uses_detected_name() {
        let food = DetectedFood {
            detected_name: "grilled fish".to_string(),
            matched_food_id: None,
            matched_food_name: None,
            estimated_grams: 180.0,
            preparation: "grilled".to_string(),
            confidence: 0.8,
            match_confidence: None,
            calories: 230.0,
            protein: 40.0,
            carbs: 0.0,
            fat: 7.0,
            emoji: "🐟".to_string(),
        };
        let meal = convert_to_new_meal_from_detection(&food, MealType::Dinner);
        assert_eq!(meal.food_id, AI_DETECTED_FOOD_ID);
        assert_eq!(meal.food_name, "grilled fish");
        assert_eq!(meal.grams, 180.0);
    }

    #[test]
    fn test_remote_profile_missing_required_field() {
        let remote = RemoteProfile {
            name: Some("Ana".to_string()),
            ..RemoteProfile::default()
        };
        let error = convert_to_domain_profile(remote).unwrap_err();
        assert!(error.contains("gender"));
    }
}
