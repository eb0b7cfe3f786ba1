//! Borrow record repository for database operations

use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::record::BorrowRecord};

#[derive(Clone)]
pub struct RecordsRepository {
    pool: Pool<Postgres>,
}

impl RecordsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// The user's open record, if any. At most one exists at a time.
    pub async fn open_for_user(&self, user_id: &str) -> AppResult<Option<BorrowRecord>> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            SELECT record_id, user_id, gear_id, borrow_time, return_time, cost
            FROM record
            WHERE user_id = $1 AND return_time IS NULL
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Most recent records first, for the admin order view
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            r#"
            SELECT record_id, user_id, gear_id, borrow_time, return_time, cost
            FROM record
            ORDER BY borrow_time DESC
            LIMIT $1
            "#,
        )
        .bind(limit.clamp(1, 500))
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// A user's rental history, most recent first
    pub async fn history_for_user(&self, user_id: &str, limit: i64) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            r#"
            SELECT record_id, user_id, gear_id, borrow_time, return_time, cost
            FROM record
            WHERE user_id = $1
            ORDER BY borrow_time DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit.clamp(1, 500))
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Count open rentals
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM record WHERE return_time IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count closed rentals
    pub async fn count_completed(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM record WHERE return_time IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Total fees collected across closed rentals
    pub async fn total_revenue(&self) -> AppResult<Decimal> {
        let total: Option<Decimal> = sqlx::query_scalar(
            "SELECT SUM(cost) FROM record WHERE return_time IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total.unwrap_or(Decimal::ZERO))
    }
}
