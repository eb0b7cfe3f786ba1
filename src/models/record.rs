//! Borrow record model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Borrow/return transaction record.
///
/// A record is open while `return_time` is NULL and closes exactly once;
/// `cost` stays zero until the record is closed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub record_id: i64,
    pub user_id: String,
    pub gear_id: String,
    pub borrow_time: DateTime<Utc>,
    pub return_time: Option<DateTime<Utc>>,
    pub cost: Decimal,
}

impl BorrowRecord {
    pub fn is_open(&self) -> bool {
        self.return_time.is_none()
    }
}
