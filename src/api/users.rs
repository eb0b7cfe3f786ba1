//! User management endpoints (admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::UserView,
};

use super::AuthenticatedUser;

#[derive(Deserialize, IntoParams)]
pub struct UserSearchQuery {
    /// Filter by ID or name fragment
    pub q: Option<String>,
}

/// Recharge request
#[derive(Deserialize, ToSchema)]
pub struct RechargeRequest {
    /// Amount to add to the balance; must be positive
    pub amount: Decimal,
}

/// Recharge response
#[derive(Serialize, ToSchema)]
pub struct RechargeResponse {
    pub user_id: String,
    /// Balance after the recharge
    pub balance: Decimal,
}

/// Password reset request
#[derive(Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// List users (admin)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserSearchQuery),
    responses(
        (status = 200, description = "Users", body = Vec<UserView>),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<UserSearchQuery>,
) -> AppResult<Json<Vec<UserView>>> {
    claims.require_admin()?;

    let users = state.services.users.search(query.q.as_deref()).await?;
    Ok(Json(users))
}

/// Get one user (admin)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User", body = UserView),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserView>> {
    claims.require_admin()?;

    let user = state.services.users.get(&user_id).await?;
    Ok(Json(user))
}

/// Top up a user's balance (admin)
#[utoipa::path(
    post,
    path = "/users/{id}/recharge",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = RechargeRequest,
    responses(
        (status = 200, description = "New balance", body = RechargeResponse),
        (status = 400, description = "Non-positive amount"),
        (status = 404, description = "User not found")
    )
)]
pub async fn recharge(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<String>,
    Json(request): Json<RechargeRequest>,
) -> AppResult<Json<RechargeResponse>> {
    claims.require_admin()?;

    let balance = state
        .services
        .users
        .recharge(&user_id, request.amount)
        .await?;
    Ok(Json(RechargeResponse { user_id, balance }))
}

/// Reset a user's password (admin)
#[utoipa::path(
    post,
    path = "/users/{id}/reset-password",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = ResetPasswordRequest,
    responses(
        (status = 204, description = "Password reset"),
        (status = 404, description = "User not found")
    )
)]
pub async fn reset_password(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .users
        .reset_password(&user_id, &request.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
