use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Profile endpoints
        crate::api::handlers::profile::get_profile,
        crate::api::handlers::profile::calculate_profile,
        crate::api::handlers::profile::set_onboarding_step,
        crate::api::handlers::profile::reset_profile,

        // Meal log endpoints
        crate::api::handlers::meals::list_meals,
        crate::api::handlers::meals::add_meal,
        crate::api::handlers::meals::remove_meal,
        crate::api::handlers::meals::log_favorite,
        crate::api::handlers::meals::log_planned_recipe,
        crate::api::handlers::meals::log_analysis,
        crate::api::handlers::meals::clear_old_meals,

        // Weight, water and favorites
        crate::api::handlers::tracking::list_weight,
        crate::api::handlers::tracking::add_weight,
        crate::api::handlers::tracking::remove_weight,
        crate::api::handlers::tracking::get_water,
        crate::api::handlers::tracking::add_water,
        crate::api::handlers::tracking::reset_water,
        crate::api::handlers::tracking::list_favorites,
        crate::api::handlers::tracking::add_favorite,
        crate::api::handlers::tracking::remove_favorite,

        // Meal plan generator
        crate::api::handlers::plans::list_proteins,
        crate::api::handlers::plans::generate_plan,
        crate::api::handlers::plans::get_recipe,

        // Insights
        crate::api::handlers::insights::today,
        crate::api::handlers::insights::weekly,
        crate::api::handlers::insights::weight,
        crate::api::handlers::insights::body,

        // Auth endpoints
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::auth::session,
        crate::api::handlers::auth::check_session,

        // Sync and analysis
        crate::api::handlers::sync::full_sync,
        crate::api::handlers::sync::sync_status,
        crate::api::handlers::analysis::analyze_food
    ),
    components(
        schemas(
            // Shared
            crate::entities::common::ErrorResponse,
            crate::entities::common::RemovedResponse,

            // Health
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus,

            // Profile
            nutri_track_domain::entities::UserState,
            nutri_track_domain::entities::UserProfile,
            nutri_track_domain::entities::MetabolicProfile,
            nutri_track_domain::entities::MacroPercentages,
            nutri_track_domain::entities::Gender,
            nutri_track_domain::entities::ActivityLevel,
            nutri_track_domain::entities::Goal,
            nutri_track_domain::entities::DietType,
            nutri_track_domain::entities::ExperienceLevel,
            nutri_track_domain::entities::BudgetLevel,
            nutri_track_domain::entities::SyncStatus,
            crate::entities::profile::OnboardingStepRequest,

            // Meals
            nutri_track_domain::entities::LoggedMeal,
            nutri_track_domain::entities::NewMeal,
            nutri_track_domain::entities::MealType,
            nutri_track_domain::entities::MacroTotals,
            crate::entities::meals::DayMealsResponse,
            crate::entities::meals::LogFavoriteRequest,
            crate::entities::meals::LogPlannedRecipeRequest,
            crate::entities::meals::LogAnalysisRequest,
            crate::entities::meals::LoggedMealsResponse,

            // Tracking
            nutri_track_domain::entities::WeightEntry,
            nutri_track_domain::entities::WaterEntry,
            nutri_track_domain::entities::FavoriteFood,
            crate::entities::tracking::CreateWeightRequest,
            crate::entities::tracking::WeightLogResponse,
            crate::entities::tracking::AddWaterRequest,
            crate::entities::tracking::WaterResponse,
            crate::entities::tracking::FavoriteAddedResponse,

            // Plans
            nutri_track_domain::entities::ProteinBase,
            nutri_track_domain::entities::ProteinOption,
            nutri_track_domain::entities::RecipeIngredient,
            nutri_track_domain::entities::PlannedRecipe,
            nutri_track_domain::entities::MealPlan,
            crate::entities::plans::GeneratePlanRequest,

            // Insights
            nutri_track_domain::entities::WeeklySummary,
            nutri_track_domain::entities::MacroProgress,
            nutri_track_domain::entities::WeightTrend,
            nutri_track_domain::entities::WeightChange,
            nutri_track_domain::entities::BmiCategory,
            crate::entities::insights::TodayInsightsResponse,
            crate::entities::insights::WeeklyInsightsResponse,
            crate::entities::insights::WeightInsightsResponse,
            crate::entities::insights::BodyInsightsResponse,

            // Auth
            nutri_track_domain::auth::RegisterRequest,
            nutri_track_domain::auth::LoginRequest,
            nutri_track_domain::entities::AuthUser,
            crate::entities::auth::RegisterResponse,
            crate::entities::auth::LoginResponse,
            crate::entities::auth::SessionResponse,
            crate::entities::auth::SessionState,
            crate::entities::auth::SessionCheckResponse,

            // Sync and analysis
            crate::entities::sync::SyncReportResponse,
            crate::entities::sync::SyncStatusResponse,
            crate::entities::sync::AnalysisResponse,
            nutri_track_domain::remote::FoodAnalysis,
            nutri_track_domain::remote::DetectedFood
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "profile", description = "Onboarding and metabolic targets"),
        (name = "meals", description = "Meal log"),
        (name = "tracking", description = "Weight, water and favorite foods"),
        (name = "plans", description = "Daily meal plan generator"),
        (name = "insights", description = "Totals, averages and body metrics"),
        (name = "auth", description = "Account and session"),
        (name = "sync", description = "Cloud synchronization"),
        (name = "analysis", description = "Food photo analysis")
    ),
    info(
        title = "NutriTrack API",
        version = "0.1.0",
        description = "Local-first nutrition tracking: meal log, meal plans and cloud sync",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::PathItemType;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "NutriTrack API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().unwrap();
        assert!(tags.iter().any(|tag| tag.name == "plans"));
        assert!(tags.iter().any(|tag| tag.name == "sync"));

        let paths = &openapi.paths.paths;
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/api/v1/meals"));
        assert!(paths.contains_key("/api/v1/meals/{id}"));
        assert!(paths.contains_key("/api/v1/plans/generate"));
        assert!(paths.contains_key("/api/v1/recipes/{id}"));
        assert!(paths.contains_key("/api/v1/auth/login"));
        assert!(paths.contains_key("/api/v1/analysis"));
    }

    #[test]
    fn test_analysis_takes_multipart() {
        let openapi = ApiDoc::openapi();
        let analysis = openapi.paths.paths.get("/api/v1/analysis").unwrap();
        let post = analysis.operations.get(&PathItemType::Post).unwrap();
        let body = post.request_body.as_ref().unwrap();
        assert!(body.content.contains_key("multipart/form-data"));
    }

    #[test]
    fn test_schemas_registered() {
        let openapi = ApiDoc::openapi();
        let schemas = &openapi.components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("MealPlan"));
        assert!(schemas.contains_key("ErrorResponse"));
        assert!(schemas.contains_key("UserState"));
    }
}
