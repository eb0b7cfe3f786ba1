//! Users repository for database operations

use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, user_id: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, real_name, password, role, credit, is_active FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Get user by ID, without treating absence as an error
    pub async fn find_by_id(&self, user_id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, real_name, password, role, credit, is_active FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// List users, optionally filtered by a search string matched against
    /// ID or name
    pub async fn search(&self, text: Option<&str>) -> AppResult<Vec<User>> {
        let users = match text {
            Some(t) if !t.is_empty() => {
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT user_id, real_name, password, role, credit, is_active
                    FROM users
                    WHERE user_id ILIKE '%' || $1 || '%' OR real_name ILIKE '%' || $1 || '%'
                    ORDER BY user_id
                    "#,
                )
                .bind(t)
                .fetch_all(&self.pool)
                .await?
            }
            _ => {
                sqlx::query_as::<_, User>(
                    "SELECT user_id, real_name, password, role, credit, is_active FROM users ORDER BY user_id",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(users)
    }

    /// Total number of accounts
    pub async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Apply a relative credit delta and return the new balance.
    /// Always a delta, never an absolute overwrite, so concurrent
    /// adjustments on the same account cannot lose updates.
    pub async fn adjust_credit(&self, user_id: &str, delta: Decimal) -> AppResult<Decimal> {
        sqlx::query_scalar::<_, Decimal>(
            "UPDATE users SET credit = credit + $2 WHERE user_id = $1 RETURNING credit",
        )
        .bind(user_id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Store a new password hash; activates the account when `activate` is set
    pub async fn set_password(
        &self,
        user_id: &str,
        password_hash: &str,
        activate: bool,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password = $2, is_active = (is_active OR $3) WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .bind(activate)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }
}
