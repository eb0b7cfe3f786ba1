//! User model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::models::enums::UserRole;

/// User account row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    /// Campus card / student number
    pub user_id: String,
    pub real_name: String,
    /// Hashed password (argon2); NULL until first-use activation
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Role (0=student, 1=staff, 9=admin)
    pub role: i16,
    /// Pre-funded credit balance
    pub credit: Decimal,
    pub is_active: bool,
}

impl User {
    pub fn role(&self) -> UserRole {
        UserRole::from(self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == UserRole::Admin
    }
}

/// Public view of a user account (no credentials)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    pub user_id: String,
    pub real_name: String,
    pub role: i16,
    pub credit: Decimal,
    pub is_active: bool,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            real_name: u.real_name,
            role: u.role,
            credit: u.credit,
            is_active: u.is_active,
        }
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User identifier
    pub sub: String,
    pub name: String,
    pub role: i16,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn role(&self) -> UserRole {
        UserRole::from(self.role)
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role() == UserRole::Admin {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Admin privileges required".to_string(),
            ))
        }
    }
}
