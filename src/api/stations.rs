//! Station endpoints: kiosk views and admin maintenance

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::station::{StationDetail, StationMapInfo},
};

use super::AuthenticatedUser;

/// Station online/offline request
#[derive(Deserialize, ToSchema)]
pub struct OnlineUpdate {
    pub online: bool,
}

/// List all stations with their slot inventory
#[utoipa::path(
    get,
    path = "/stations",
    tag = "stations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stations with inventory", body = Vec<StationDetail>)
    )
)]
pub async fn list_stations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<StationDetail>>> {
    let stations = state.services.stations.list_detailed().await?;
    Ok(Json(stations))
}

/// Map view: station positions, online flags and availability counts
#[utoipa::path(
    get,
    path = "/stations/map",
    tag = "stations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Map summary per station", body = Vec<StationMapInfo>)
    )
)]
pub async fn map_info(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<StationMapInfo>>> {
    let info = state.services.stations.map_info().await?;
    Ok(Json(info))
}

/// One station with its slot inventory
#[utoipa::path(
    get,
    path = "/stations/{id}",
    tag = "stations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i16, Path, description = "Station ID")
    ),
    responses(
        (status = 200, description = "Station detail", body = StationDetail),
        (status = 404, description = "Station not found")
    )
)]
pub async fn get_station(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(station_id): Path<i16>,
) -> AppResult<Json<StationDetail>> {
    let station = state.services.stations.get_detail(station_id).await?;
    Ok(Json(station))
}

/// Set a station online or offline (admin)
#[utoipa::path(
    put,
    path = "/stations/{id}/online",
    tag = "stations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i16, Path, description = "Station ID")
    ),
    request_body = OnlineUpdate,
    responses(
        (status = 204, description = "Updated"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Station not found")
    )
)]
pub async fn set_online(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(station_id): Path<i16>,
    Json(request): Json<OnlineUpdate>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state
        .services
        .stations
        .set_online(station_id, request.online)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Take a bay out of service (admin)
#[utoipa::path(
    put,
    path = "/stations/{id}/slots/{slot}/broken",
    tag = "stations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i16, Path, description = "Station ID"),
        ("slot" = i16, Path, description = "Slot index")
    ),
    responses(
        (status = 204, description = "Slot marked out of service"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Station not found")
    )
)]
pub async fn mark_slot_broken(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((station_id, slot_id)): Path<(i16, i16)>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state
        .services
        .stations
        .mark_slot_broken(station_id, slot_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Put a bay back in service (admin)
#[utoipa::path(
    delete,
    path = "/stations/{id}/slots/{slot}/broken",
    tag = "stations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i16, Path, description = "Station ID"),
        ("slot" = i16, Path, description = "Slot index")
    ),
    responses(
        (status = 204, description = "Slot back in service"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Station not found")
    )
)]
pub async fn clear_slot_broken(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((station_id, slot_id)): Path<(i16, i16)>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state
        .services
        .stations
        .clear_slot_broken(station_id, slot_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
