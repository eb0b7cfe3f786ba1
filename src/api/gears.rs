//! Gear management endpoints (admin)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::gear::{GearQuery, GearStatusUpdate, RainGear},
};

use super::AuthenticatedUser;

/// Paginated gear listing response
#[derive(Serialize, ToSchema)]
pub struct GearListResponse {
    pub items: Vec<RainGear>,
    pub total: i64,
}

/// List gears with filters and pagination (admin)
#[utoipa::path(
    get,
    path = "/gears",
    tag = "gears",
    security(("bearer_auth" = [])),
    params(GearQuery),
    responses(
        (status = 200, description = "Gears", body = GearListResponse),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn list_gears(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<GearQuery>,
) -> AppResult<Json<GearListResponse>> {
    claims.require_admin()?;

    let (items, total) = state.services.gears.search(&query).await?;
    Ok(Json(GearListResponse { items, total }))
}

/// Get one gear (admin)
#[utoipa::path(
    get,
    path = "/gears/{id}",
    tag = "gears",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Gear ID")
    ),
    responses(
        (status = 200, description = "Gear", body = RainGear),
        (status = 404, description = "Gear not found")
    )
)]
pub async fn get_gear(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(gear_id): Path<String>,
) -> AppResult<Json<RainGear>> {
    claims.require_admin()?;

    let gear = state.services.gears.get(&gear_id).await?;
    Ok(Json(gear))
}

/// Override a docked gear's maintenance status (admin)
#[utoipa::path(
    put,
    path = "/gears/{id}/status",
    tag = "gears",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Gear ID")
    ),
    request_body = GearStatusUpdate,
    responses(
        (status = 200, description = "Updated gear", body = RainGear),
        (status = 400, description = "Invalid status code"),
        (status = 404, description = "Gear not found"),
        (status = 409, description = "Gear is currently borrowed")
    )
)]
pub async fn update_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(gear_id): Path<String>,
    Json(request): Json<GearStatusUpdate>,
) -> AppResult<Json<RainGear>> {
    claims.require_admin()?;

    let gear = state
        .services
        .gears
        .override_status(&gear_id, request.status)
        .await?;
    Ok(Json(gear))
}
