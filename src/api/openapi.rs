//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, gears, health, rentals, stations, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RainHub API",
        version = "1.0.0",
        description = "Rain Gear Rental Station Network REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::admin_login,
        auth::activate,
        auth::me,
        // Rentals
        rentals::borrow,
        rentals::return_gear,
        rentals::current,
        rentals::history,
        // Stations
        stations::list_stations,
        stations::map_info,
        stations::get_station,
        stations::set_online,
        stations::mark_slot_broken,
        stations::clear_slot_broken,
        // Users
        users::list_users,
        users::get_user,
        users::recharge,
        users::reset_password,
        // Gears
        gears::list_gears,
        gears::get_gear,
        gears::update_status,
        // Stats
        stats::get_stats,
        stats::recent_orders,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::ActivateRequest,
            // Rentals
            rentals::BorrowRequest,
            rentals::ReturnRequest,
            crate::services::rental::RentalOutcome,
            crate::models::record::BorrowRecord,
            // Stations
            crate::models::station::Station,
            crate::models::station::StationDetail,
            crate::models::station::StationMapInfo,
            stations::OnlineUpdate,
            // Users
            crate::models::user::UserView,
            users::RechargeRequest,
            users::RechargeResponse,
            users::ResetPasswordRequest,
            // Gears
            crate::models::gear::RainGear,
            crate::models::gear::GearStatusUpdate,
            crate::models::enums::GearType,
            crate::models::enums::GearStatus,
            crate::models::enums::UserRole,
            gears::GearListResponse,
            // Stats
            stats::StatsResponse,
            stats::UserStats,
            stats::GearStats,
            stats::RentalStats,
            stats::StationStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "rentals", description = "Borrow and return operations"),
        (name = "stations", description = "Station inventory and maintenance"),
        (name = "users", description = "User management"),
        (name = "gears", description = "Gear management"),
        (name = "stats", description = "Statistics and orders")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
