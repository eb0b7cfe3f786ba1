//! Statistics and order endpoints (admin)

use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, models::record::BorrowRecord};

use super::AuthenticatedUser;

/// Statistics response
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub users: UserStats,
    pub gears: GearStats,
    pub rentals: RentalStats,
    pub stations: StationStats,
}

#[derive(Serialize, ToSchema)]
pub struct UserStats {
    /// Total number of accounts
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct GearStats {
    pub total: i64,
    pub borrowed: i64,
    pub broken: i64,
}

#[derive(Serialize, ToSchema)]
pub struct RentalStats {
    /// Open rentals
    pub active: i64,
    /// Closed rentals
    pub completed: i64,
    /// Total fees collected
    pub revenue: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct StationStats {
    /// Fraction of stations currently online
    pub online_rate: f64,
}

#[derive(Deserialize, IntoParams)]
pub struct RecentOrdersQuery {
    /// Maximum orders to return (default 50)
    pub limit: Option<i64>,
}

/// Network-wide statistics (admin)
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Statistics", body = StatsResponse),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    claims.require_admin()?;

    let stats = state.services.stats.overview().await?;
    Ok(Json(stats))
}

/// Most recent orders (admin)
#[utoipa::path(
    get,
    path = "/orders/recent",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(RecentOrdersQuery),
    responses(
        (status = 200, description = "Recent orders", body = Vec<BorrowRecord>),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn recent_orders(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RecentOrdersQuery>,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    claims.require_admin()?;

    let orders = state
        .services
        .orders
        .recent(query.limit.unwrap_or(50))
        .await?;
    Ok(Json(orders))
}
