//! RainHub Server - Rain Gear Rental Station Network
//!
//! REST API server for kiosk clients and the admin back office.

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rainhub_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("rainhub_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RainHub Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/admin/login", post(api::auth::admin_login))
        .route("/auth/activate", post(api::auth::activate))
        .route("/auth/me", get(api::auth::me))
        // Rentals
        .route("/rentals/borrow", post(api::rentals::borrow))
        .route("/rentals/return", post(api::rentals::return_gear))
        .route("/rentals/current", get(api::rentals::current))
        .route("/rentals/history", get(api::rentals::history))
        // Stations
        .route("/stations", get(api::stations::list_stations))
        .route("/stations/map", get(api::stations::map_info))
        .route("/stations/:id", get(api::stations::get_station))
        .route("/stations/:id/online", put(api::stations::set_online))
        .route(
            "/stations/:id/slots/:slot/broken",
            put(api::stations::mark_slot_broken).delete(api::stations::clear_slot_broken),
        )
        // Users (admin)
        .route("/users", get(api::users::list_users))
        .route("/users/:id", get(api::users::get_user))
        .route("/users/:id/recharge", post(api::users::recharge))
        .route("/users/:id/reset-password", post(api::users::reset_password))
        // Gears (admin)
        .route("/gears", get(api::gears::list_gears))
        .route("/gears/:id", get(api::gears::get_gear))
        .route("/gears/:id/status", put(api::gears::update_status))
        // Stats and orders (admin)
        .route("/stats", get(api::stats::get_stats))
        .route("/orders/recent", get(api::stats::recent_orders))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
