//! Test doubles and sample data for the domain layer.
//! Only available in tests or with the `mock` feature.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use nutri_track_data::models::StorageKey;
use nutri_track_data::repository::{DomainStore, KeyValueStore};
use parking_lot::Mutex;

use crate::auth::{LoginRequest, RegisterRequest};
use crate::entities::conversions::parse_timestamp;
use crate::entities::{
    ActivityLevel, AuthSession, AuthUser, BudgetLevel, DietType, ExperienceLevel, FavoriteFood,
    Gender, Goal, MacroPercentages, MealType, MetabolicProfile, NewMeal, UserProfile,
};
use crate::remote::{
    AuthRemote, AuthResponse, CalculateProfileRequest, CalculateProfileResponse, FoodAnalysis,
    FoodImage, MealSyncResponse, NutritionBackend, ProfileSyncPayload, ProfileSyncResponse,
    RemoteError, RemoteMeal, RemoteUser, SyncRemote,
};
use crate::services::planner::RandomSource;

#[derive(Debug, Default)]
struct Account {
    user: Option<RemoteUser>,
    password: String,
    profile: Option<ProfileSyncPayload>,
    meals: Vec<RemoteMeal>,
}

#[derive(Debug, Default)]
struct FakeServer {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    next_user_id: i64,
    next_meal_id: i64,
    next_token: u64,
    analysis: Option<FoodAnalysis>,
    calls: Vec<String>,
}

impl FakeServer {
    fn issue_token(&mut self, email: &str) -> String {
        self.next_token += 1;
        let token = format!("token-{}", self.next_token);
        self.tokens.insert(token.clone(), email.to_string());
        token
    }

    fn account_for(&mut self, token: &str) -> Result<&mut Account, RemoteError> {
        let email = self
            .tokens
            .get(token)
            .cloned()
            .ok_or_else(|| RemoteError::Unauthorized("Could not validate credentials".to_string()))?;
        self.accounts
            .get_mut(&email)
            .ok_or_else(|| RemoteError::Unauthorized("Could not validate credentials".to_string()))
    }
}

/// Fake backend implementing the sync, auth and nutrition services in
/// memory. Meals are deduplicated by `(foodId, timestamp)` and get numeric
/// server ids, like the real service.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    server: Mutex<FakeServer>,
    offline: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the server were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Names of the calls received so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.server.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.server.lock().calls.clear();
    }

    /// Create an account and return a valid token for it
    pub fn seed_account(&self, email: &str, password: &str) -> String {
        let mut server = self.server.lock();
        server.next_user_id += 1;
        let user = RemoteUser {
            id: server.next_user_id,
            email: email.to_string(),
            username: email.split('@').next().unwrap_or(email).to_string(),
            created_at: Some("2024-01-01T00:00:00".to_string()),
        };
        server.accounts.insert(
            email.to_string(),
            Account {
                user: Some(user),
                password: password.to_string(),
                ..Account::default()
            },
        );
        server.issue_token(email)
    }

    pub fn seed_profile(&self, email: &str, payload: ProfileSyncPayload) {
        let mut server = self.server.lock();
        if let Some(account) = server.accounts.get_mut(email) {
            account.profile = Some(payload);
        }
    }

    pub fn seed_meals(&self, email: &str, meals: Vec<RemoteMeal>) {
        let mut server = self.server.lock();
        let mut next_id = server.next_meal_id;
        if let Some(account) = server.accounts.get_mut(email) {
            for mut meal in meals {
                next_id += 1;
                meal.id = Some(next_id.to_string());
                account.meals.push(meal);
            }
        }
        server.next_meal_id = next_id;
    }

    pub fn profile_of(&self, email: &str) -> Option<ProfileSyncPayload> {
        self.server
            .lock()
            .accounts
            .get(email)
            .and_then(|a| a.profile.clone())
    }

    pub fn meals_of(&self, email: &str) -> Vec<RemoteMeal> {
        self.server
            .lock()
            .accounts
            .get(email)
            .map(|a| a.meals.clone())
            .unwrap_or_default()
    }

    /// Invalidate every issued token
    pub fn revoke_tokens(&self) {
        self.server.lock().tokens.clear();
    }

    /// Result returned by the next analysis calls
    pub fn set_analysis(&self, analysis: FoodAnalysis) {
        self.server.lock().analysis = Some(analysis);
    }

    fn begin(&self, call: &str) -> Result<parking_lot::MutexGuard<'_, FakeServer>, RemoteError> {
        let mut server = self.server.lock();
        server.calls.push(call.to_string());
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("connection refused".to_string()));
        }
        Ok(server)
    }
}

fn same_instant(a: &str, b: &str) -> bool {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

#[async_trait]
impl SyncRemote for InMemoryBackend {
    async fn push_profile(&self, token: &str, payload: &ProfileSyncPayload) -> Result<(), RemoteError> {
        let mut server = self.begin("push_profile")?;
        server.account_for(token)?.profile = Some(payload.clone());
        Ok(())
    }

    async fn fetch_profile(&self, token: &str) -> Result<ProfileSyncResponse, RemoteError> {
        let mut server = self.begin("fetch_profile")?;
        let account = server.account_for(token)?;
        Ok(match &account.profile {
            Some(payload) => ProfileSyncResponse {
                profile: Some(payload.profile.clone()),
                metabolic_profile: Some(payload.metabolic_profile.clone()),
            },
            None => ProfileSyncResponse::default(),
        })
    }

    async fn push_meals(&self, token: &str, meals: &[RemoteMeal]) -> Result<MealSyncResponse, RemoteError> {
        let mut server = self.begin("push_meals")?;
        let mut next_id = server.next_meal_id;
        let account = server.account_for(token)?;

        let mut synced = 0;
        for meal in meals {
            let known = account
                .meals
                .iter()
                .any(|m| m.food_id == meal.food_id && same_instant(&m.timestamp, &meal.timestamp));
            if known {
                continue;
            }
            next_id += 1;
            let mut stored = meal.clone();
            stored.id = Some(next_id.to_string());
            account.meals.push(stored);
            synced += 1;
        }

        server.next_meal_id = next_id;
        Ok(MealSyncResponse { success: true, synced })
    }

    async fn fetch_meals(
        &self,
        token: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RemoteMeal>, RemoteError> {
        let mut server = self.begin("fetch_meals")?;
        let account = server.account_for(token)?;
        let mut meals: Vec<(DateTime<Utc>, RemoteMeal)> = account
            .meals
            .iter()
            .filter_map(|m| parse_timestamp(&m.timestamp).map(|t| (t, m.clone())))
            .filter(|(t, _)| *t >= from && *t <= to)
            .collect();
        meals.sort_by_key(|(t, _)| *t);
        Ok(meals.into_iter().map(|(_, m)| m).collect())
    }
}

#[async_trait]
impl AuthRemote for InMemoryBackend {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, RemoteError> {
        {
            let server = self.begin("register")?;
            if server.accounts.contains_key(&request.email) {
                return Err(RemoteError::Server {
                    status: 400,
                    message: "Email already registered".to_string(),
                });
            }
        }
        let token = self.seed_account(&request.email, &request.password);
        let mut server = self.server.lock();
        let account = server.account_for(&token)?;
        let mut user = account
            .user
            .clone()
            .ok_or_else(|| RemoteError::Decode("account without user".to_string()))?;
        user.username = request.username.clone();
        account.user = Some(user.clone());
        Ok(AuthResponse {
            access_token: token,
            token_type: Some("bearer".to_string()),
            user,
        })
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, RemoteError> {
        let mut server = self.begin("login")?;
        let user = match server.accounts.get(&request.email) {
            Some(account) if account.password == request.password => account.user.clone(),
            _ => None,
        };
        let user = user.ok_or_else(|| RemoteError::Unauthorized("Incorrect email or password".to_string()))?;
        let token = server.issue_token(&request.email);
        Ok(AuthResponse {
            access_token: token,
            token_type: Some("bearer".to_string()),
            user,
        })
    }

    async fn current_user(&self, token: &str) -> Result<RemoteUser, RemoteError> {
        let mut server = self.begin("current_user")?;
        server
            .account_for(token)?
            .user
            .clone()
            .ok_or_else(|| RemoteError::Unauthorized("Could not validate credentials".to_string()))
    }
}

#[async_trait]
impl NutritionBackend for InMemoryBackend {
    async fn calculate_profile(
        &self,
        request: &CalculateProfileRequest,
    ) -> Result<CalculateProfileResponse, RemoteError> {
        let _server = self.begin("calculate_profile")?;
        let metabolic = sample_metabolic_profile();
        Ok(CalculateProfileResponse {
            bmr: (request.weight_kg * 22.0).round(),
            tdee: metabolic.tdee,
            target_calories: metabolic.target_calories,
            target_protein_g: metabolic.target_protein_g,
            target_carbs_g: metabolic.target_carbs_g,
            target_fat_g: metabolic.target_fat_g,
            macro_percentages: metabolic.macro_percentages,
            calculation_method: metabolic.calculation_method,
            weekly_weight_change: None,
            estimated_time_to_goal: None,
            water_intake: None,
        })
    }

    async fn analyze_food(&self, _image: &FoodImage) -> Result<FoodAnalysis, RemoteError> {
        let server = self.begin("analyze_food")?;
        Ok(server.analysis.clone().unwrap_or(FoodAnalysis {
            success: false,
            matched_foods: vec![],
            meal_description: String::new(),
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fat: 0.0,
        }))
    }

    async fn health_check(&self) -> Result<(), RemoteError> {
        let _server = self.begin("health_check")?;
        Ok(())
    }
}

/// Replays a fixed list of indices, wrapping around
#[derive(Debug)]
pub struct SequenceRandom {
    values: Vec<usize>,
    position: Mutex<usize>,
}

impl SequenceRandom {
    pub fn new(values: Vec<usize>) -> Self {
        Self {
            values,
            position: Mutex::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn pick(&self, len: usize) -> usize {
        if self.values.is_empty() || len == 0 {
            return 0;
        }
        let mut position = self.position.lock();
        let value = self.values[*position % self.values.len()];
        *position += 1;
        value % len
    }
}

pub fn sample_profile() -> UserProfile {
    UserProfile {
        name: "Ana".to_string(),
        gender: Gender::Female,
        date_of_birth: NaiveDate::from_ymd_opt(1992, 4, 12).unwrap(),
        height_cm: 165.0,
        current_weight_kg: 68.0,
        target_weight_kg: Some(62.0),
        body_fat_percentage: None,
        goal: Goal::Cutting,
        target_date: None,
        activity_level: ActivityLevel::Moderate,
        diet_type: DietType::Omnivore,
        restrictions: vec![],
        meals_per_day: 4,
        experience_level: ExperienceLevel::Beginner,
        cooking_time: 30,
        budget_level: BudgetLevel::Medium,
        motivation: None,
    }
}

pub fn sample_metabolic_profile() -> MetabolicProfile {
    MetabolicProfile {
        bmr: 1420.0,
        tdee: 2200.0,
        target_calories: 1800.0,
        target_protein_g: 135.0,
        target_carbs_g: 180.0,
        target_fat_g: 60.0,
        macro_percentages: MacroPercentages {
            protein: 30.0,
            carbs: 40.0,
            fat: 30.0,
        },
        calculation_method: "mifflin_st_jeor".to_string(),
        weekly_weight_change: None,
        estimated_time_to_goal: None,
        water_intake: None,
    }
}

/// 100 g portion worth 150 kcal
pub fn sample_new_meal(food_id: &str, meal_type: MealType) -> NewMeal {
    NewMeal {
        food_id: food_id.to_string(),
        food_name: food_id.to_string(),
        emoji: "🍽️".to_string(),
        grams: 100.0,
        calories: 150.0,
        protein: 10.0,
        carbs: 20.0,
        fat: 5.0,
        meal_type,
    }
}

pub fn sample_favorite(food_id: &str) -> FavoriteFood {
    FavoriteFood {
        food_id: food_id.to_string(),
        food_name: food_id.to_string(),
        emoji: "⭐".to_string(),
        calories_per_100g: 200.0,
        protein_per_100g: 20.0,
        carbs_per_100g: 10.0,
        fat_per_100g: 8.0,
        default_grams: 150.0,
        default_meal_type: MealType::Lunch,
        times_used: 0,
    }
}

pub fn sample_remote_meal(food_id: &str, timestamp: &str) -> RemoteMeal {
    RemoteMeal {
        id: None,
        food_id: food_id.to_string(),
        food_name: food_id.to_string(),
        emoji: "🍽️".to_string(),
        grams: 100.0,
        calories: 150.0,
        protein: 10.0,
        carbs: 20.0,
        fat: 5.0,
        meal_type: MealType::Lunch,
        timestamp: timestamp.to_string(),
    }
}

pub fn sample_user() -> AuthUser {
    AuthUser {
        id: 1,
        email: "ana@example.com".to_string(),
        username: "ana".to_string(),
        created_at: None,
    }
}

/// Persist a signed-in session so the next `AuthSessionManager::load`
/// picks it up
pub fn seed_session(backend: Arc<dyn KeyValueStore>, token: &str) {
    DomainStore::<AuthSession>::new(backend, StorageKey::AuthSession).save(&AuthSession {
        token: Some(token.to_string()),
        user: Some(sample_user()),
        is_returning_user: true,
    });
}
