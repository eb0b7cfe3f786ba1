//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::UserView,
    services::auth::LoginResult,
};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Campus card / student number
    pub user_id: String,
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token; absent when the account still needs activation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub token_type: String,
    /// True when the account exists but has never been activated
    pub needs_activation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserView>,
}

/// First-use activation request
#[derive(Deserialize, Validate, ToSchema)]
pub struct ActivateRequest {
    /// Campus card / student number
    pub user_id: String,
    /// Registered name; must match the provisioned account
    pub real_name: String,
    /// Chosen password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Kiosk login
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated, or activation required", body = LoginResponse),
        (status = 401, description = "Unknown user or invalid password"),
        (status = 403, description = "Admin account refused at kiosk")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = match state
        .services
        .auth
        .login(&request.user_id, &request.password)
        .await?
    {
        LoginResult::Authenticated { token, user } => LoginResponse {
            token: Some(token),
            token_type: "Bearer".to_string(),
            needs_activation: false,
            user: Some(user),
        },
        LoginResult::NeedsActivation => LoginResponse {
            token: None,
            token_type: "Bearer".to_string(),
            needs_activation: true,
            user: None,
        },
    };
    Ok(Json(response))
}

/// Admin console login
#[utoipa::path(
    post,
    path = "/auth/admin/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Unknown user or invalid password"),
        (status = 403, description = "Account has no admin privileges")
    )
)]
pub async fn admin_login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .auth
        .admin_login(&request.user_id, &request.password)
        .await?;
    Ok(Json(LoginResponse {
        token: Some(token),
        token_type: "Bearer".to_string(),
        needs_activation: false,
        user: Some(user),
    }))
}

/// First-use activation: set a password and activate the account
#[utoipa::path(
    post,
    path = "/auth/activate",
    tag = "auth",
    request_body = ActivateRequest,
    responses(
        (status = 204, description = "Account activated"),
        (status = 401, description = "ID and name do not match"),
        (status = 409, description = "Already activated")
    )
)]
pub async fn activate(
    State(state): State<crate::AppState>,
    Json(request): Json<ActivateRequest>,
) -> AppResult<axum::http::StatusCode> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .auth
        .activate(&request.user_id, &request.real_name, &request.password)
        .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Current account state
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserView),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserView>> {
    let user = state.services.auth.me(&claims.sub).await?;
    Ok(Json(user))
}
