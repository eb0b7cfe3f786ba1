//! Admin user management service

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::user::UserView,
    repository::Repository,
    services::auth,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List users, optionally filtered by ID or name fragment
    pub async fn search(&self, text: Option<&str>) -> AppResult<Vec<UserView>> {
        let users = self.repository.users.search(text).await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    pub async fn get(&self, user_id: &str) -> AppResult<UserView> {
        Ok(self.repository.users.get_by_id(user_id).await?.into())
    }

    /// Top up an account and return the new balance. Always a relative
    /// delta so a concurrent rental settling on the same account cannot be
    /// overwritten.
    pub async fn recharge(&self, user_id: &str, amount: Decimal) -> AppResult<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Recharge amount must be positive".to_string(),
            ));
        }
        let balance = self.repository.users.adjust_credit(user_id, amount).await?;
        tracing::info!(user_id, %amount, %balance, "account recharged");
        Ok(balance)
    }

    /// Reset a user's password without touching the activation flag
    pub async fn reset_password(&self, user_id: &str, new_password: &str) -> AppResult<()> {
        // Ensure the account exists before hashing.
        self.repository.users.get_by_id(user_id).await?;
        let hash = auth::hash_password(new_password)?;
        self.repository
            .users
            .set_password(user_id, &hash, false)
            .await?;
        tracing::info!(user_id, "password reset by admin");
        Ok(())
    }
}
