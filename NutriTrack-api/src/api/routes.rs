use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::api::handlers::{analysis, auth, health, insights, meals, plans, profile, sync, tracking};
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    let profile_routes = Router::new()
        .route("/profile", get(profile::get_profile).delete(profile::reset_profile))
        .route("/profile/calculate", post(profile::calculate_profile))
        .route("/profile/onboarding-step", put(profile::set_onboarding_step));

    // Static segments are matched before `:id`
    let meal_routes = Router::new()
        .route("/meals", get(meals::list_meals).post(meals::add_meal))
        .route("/meals/old", delete(meals::clear_old_meals))
        .route("/meals/from-favorite", post(meals::log_favorite))
        .route("/meals/from-plan", post(meals::log_planned_recipe))
        .route("/meals/from-analysis", post(meals::log_analysis))
        .route("/meals/:id", delete(meals::remove_meal));

    let tracking_routes = Router::new()
        .route("/weight", get(tracking::list_weight).post(tracking::add_weight))
        .route("/weight/:id", delete(tracking::remove_weight))
        .route("/water", get(tracking::get_water).post(tracking::add_water))
        .route("/water/today", delete(tracking::reset_water))
        .route("/favorites", get(tracking::list_favorites).post(tracking::add_favorite))
        .route("/favorites/:food_id", delete(tracking::remove_favorite));

    let plan_routes = Router::new()
        .route("/plans/proteins", get(plans::list_proteins))
        .route("/plans/generate", post(plans::generate_plan))
        .route("/recipes/:id", get(plans::get_recipe));

    let insight_routes = Router::new()
        .route("/insights/today", get(insights::today))
        .route("/insights/weekly", get(insights::weekly))
        .route("/insights/weight", get(insights::weight))
        .route("/insights/body", get(insights::body));

    let account_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session))
        .route("/auth/check", post(auth::check_session))
        .route("/sync", post(sync::full_sync))
        .route("/sync/status", get(sync::sync_status));

    let analysis_routes = Router::new()
        .route("/analysis", post(analysis::analyze_food))
        .layer(DefaultBodyLimit::max(analysis::MAX_IMAGE_BYTES));

    let api_routes = Router::new()
        .merge(profile_routes)
        .merge(meal_routes)
        .merge(tracking_routes)
        .merge(plan_routes)
        .merge(insight_routes)
        .merge(account_routes)
        .merge(analysis_routes);

    debug!("API routes configured");

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes)
        .with_state(state);

    // Configure the Swagger UI using the helper function
    let app = app.merge(configure_swagger_routes());
    debug!("Swagger UI merged");

    configure_http_layers(app)
}

/// CORS, security headers and request tracing
fn configure_http_layers(app: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    app.layer(SetResponseHeaderLayer::if_not_present(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    ))
    .layer(SetResponseHeaderLayer::if_not_present(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("DENY"),
    ))
    .layer(SetResponseHeaderLayer::if_not_present(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    ))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
}
