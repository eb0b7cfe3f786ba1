//! Order (borrow record) queries for kiosk and admin views

use crate::{error::AppResult, models::record::BorrowRecord, repository::Repository};

#[derive(Clone)]
pub struct OrdersService {
    repository: Repository,
}

impl OrdersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Most recent orders across all users, for the admin order view
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<BorrowRecord>> {
        self.repository.records.recent(limit).await
    }

    /// A user's open rental, if any
    pub async fn open_record_for(&self, user_id: &str) -> AppResult<Option<BorrowRecord>> {
        self.repository.records.open_for_user(user_id).await
    }

    /// A user's rental history, most recent first
    pub async fn history_for(&self, user_id: &str, limit: i64) -> AppResult<Vec<BorrowRecord>> {
        self.repository.records.history_for_user(user_id, limit).await
    }
}
