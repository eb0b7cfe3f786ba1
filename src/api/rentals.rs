//! Rental endpoints: borrow, return, current rental, history

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::record::BorrowRecord,
    services::rental::RentalOutcome,
};

use super::AuthenticatedUser;

/// Borrow request: either a concrete gear ID, or a station bay to resolve
#[derive(Deserialize, Validate, ToSchema)]
pub struct BorrowRequest {
    /// Gear identifier (scanned from the gear itself)
    pub gear_id: Option<String>,
    /// Station, when borrowing by bay
    pub station_id: Option<i16>,
    /// Bay index, when borrowing by bay
    #[validate(range(min = 1, max = 12))]
    pub slot_id: Option<i16>,
}

/// Return request: the gear and the bay it is being docked into
#[derive(Deserialize, Validate, ToSchema)]
pub struct ReturnRequest {
    pub gear_id: String,
    pub station_id: i16,
    #[validate(range(min = 1, max = 12))]
    pub slot_id: i16,
}

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Maximum records to return (default 50)
    pub limit: Option<i64>,
}

/// Borrow a gear for the authenticated user
#[utoipa::path(
    post,
    path = "/rentals/borrow",
    tag = "rentals",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Outcome of the borrow attempt", body = RentalOutcome),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<Json<RentalOutcome>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = match (&request.gear_id, request.station_id, request.slot_id) {
        (Some(gear_id), _, _) => {
            state
                .services
                .rentals
                .borrow_gear(&claims.sub, gear_id)
                .await?
        }
        (None, Some(station_id), Some(slot_id)) => {
            state
                .services
                .rentals
                .borrow_from_slot(&claims.sub, station_id, slot_id)
                .await?
        }
        _ => {
            return Err(AppError::BadRequest(
                "Either gear_id or station_id and slot_id are required".to_string(),
            ))
        }
    };
    Ok(Json(outcome))
}

/// Return the borrowed gear into a station bay
#[utoipa::path(
    post,
    path = "/rentals/return",
    tag = "rentals",
    security(("bearer_auth" = [])),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Outcome of the return attempt", body = RentalOutcome),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn return_gear(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<RentalOutcome>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = state
        .services
        .rentals
        .return_gear(
            &claims.sub,
            &request.gear_id,
            request.station_id,
            request.slot_id,
        )
        .await?;
    Ok(Json(outcome))
}

/// The authenticated user's open rental, if any
#[utoipa::path(
    get,
    path = "/rentals/current",
    tag = "rentals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Open borrow record, or null when nothing is out", body = BorrowRecord),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn current(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Option<BorrowRecord>>> {
    let record = state
        .services
        .orders
        .open_record_for(&claims.sub)
        .await?;
    Ok(Json(record))
}

/// The authenticated user's rental history
#[utoipa::path(
    get,
    path = "/rentals/history",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(HistoryQuery),
    responses(
        (status = 200, description = "Past and present rentals", body = Vec<BorrowRecord>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    let records = state
        .services
        .orders
        .history_for(&claims.sub, query.limit.unwrap_or(50))
        .await?;
    Ok(Json(records))
}
