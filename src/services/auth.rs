//! Authentication service: kiosk login, first-use activation, admin login.
//!
//! Kiosk accounts are provisioned without a password; on first sign-in the
//! user proves identity with their ID and registered name and sets a
//! password, which also activates the account.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{User, UserClaims, UserView},
    repository::Repository,
};

/// Outcome of a kiosk login attempt
pub enum LoginResult {
    Authenticated { token: String, user: UserView },
    /// Account exists but has never been activated; the kiosk should take
    /// the user to the set-password flow.
    NeedsActivation,
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Kiosk login. Admin accounts are refused here, matching the station
    /// clients which have no admin surface.
    pub async fn login(&self, user_id: &str, password: &str) -> AppResult<LoginResult> {
        let user = self
            .repository
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Authentication("Unknown user ID".to_string()))?;

        if user.is_admin() {
            return Err(AppError::Authorization(
                "Admin accounts cannot sign in at a kiosk".to_string(),
            ));
        }
        let hash = match (&user.password, user.is_active) {
            (Some(hash), true) => hash.clone(),
            _ => return Ok(LoginResult::NeedsActivation),
        };
        if !verify_password(&hash, password) {
            return Err(AppError::Authentication("Invalid password".to_string()));
        }

        let token = self.issue_token(&user)?;
        Ok(LoginResult::Authenticated {
            token,
            user: user.into(),
        })
    }

    /// Admin console login
    pub async fn admin_login(&self, user_id: &str, password: &str) -> AppResult<(String, UserView)> {
        let user = self
            .repository
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Authentication("Unknown user ID".to_string()))?;

        if !user.is_admin() {
            return Err(AppError::Authorization(
                "This account has no admin privileges".to_string(),
            ));
        }
        let hash = user
            .password
            .clone()
            .ok_or_else(|| AppError::Authentication("Account has no password set".to_string()))?;
        if !verify_password(&hash, password) {
            return Err(AppError::Authentication("Invalid password".to_string()));
        }

        let token = self.issue_token(&user)?;
        Ok((token, user.into()))
    }

    /// First-use activation: the ID and registered name must match, then the
    /// chosen password is stored and the account becomes active.
    pub async fn activate(
        &self,
        user_id: &str,
        real_name: &str,
        password: &str,
    ) -> AppResult<()> {
        let user = self.repository.users.get_by_id(user_id).await?;

        if user.real_name != real_name {
            return Err(AppError::Authentication(
                "User ID and name do not match".to_string(),
            ));
        }
        if user.is_admin() {
            return Err(AppError::Authorization(
                "Admin accounts cannot be activated at a kiosk".to_string(),
            ));
        }
        if user.is_active {
            return Err(AppError::Conflict(
                "Account is already activated".to_string(),
            ));
        }

        let hash = hash_password(password)?;
        self.repository
            .users
            .set_password(user_id, &hash, true)
            .await?;
        tracing::info!(user_id, "account activated");
        Ok(())
    }

    /// Current account state for the authenticated user
    pub async fn me(&self, user_id: &str) -> AppResult<UserView> {
        Ok(self.repository.users.get_by_id(user_id).await?.into())
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = UserClaims {
            sub: user.user_id.clone(),
            name: user.real_name.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.jwt_expiration_hours as i64)).timestamp(),
        };
        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))
    }
}

/// Hash a password with argon2 and a fresh salt
pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
