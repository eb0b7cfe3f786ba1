//! Transaction-scoped store contract for the rental engine.
//!
//! One `RentalTx` spans exactly one borrow or return operation. All writes
//! are conditional updates keyed on the expected prior state; zero rows
//! affected is the concurrency-loss signal, never silent success. Dropping
//! a `RentalTx` without calling `commit` rolls every step back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use crate::{
    error::AppResult,
    models::{enums::GearStatus, gear::RainGear, record::BorrowRecord, user::User},
};

use super::Repository;

/// Source of rental transaction scopes.
///
/// The engine only sees this trait, which keeps it testable against an
/// in-memory fake store.
#[async_trait]
pub trait RentalStore: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn RentalTx>>;
}

/// Unit of work for one borrow or return operation.
#[async_trait]
pub trait RentalTx: Send {
    async fn get_user(&mut self, user_id: &str) -> AppResult<Option<User>>;

    /// Apply a relative balance delta, refusing a negative result.
    /// Returns false when the guard fails (insufficient funds) or the user
    /// row is missing.
    async fn adjust_balance(&mut self, user_id: &str, delta: Decimal) -> AppResult<bool>;

    async fn get_gear(&mut self, gear_id: &str) -> AppResult<Option<RainGear>>;

    /// Gear currently docked at the given bay, any status.
    async fn gear_occupying_slot(
        &mut self,
        station_id: i16,
        slot_id: i16,
    ) -> AppResult<Option<RainGear>>;

    /// Available -> Borrowed, clearing the location. False when the gear
    /// was not Available (another caller won the race, or it is broken).
    async fn set_gear_borrowed(&mut self, gear_id: &str) -> AppResult<bool>;

    /// Borrowed -> Available at the given bay. False when the gear was not
    /// Borrowed.
    async fn set_gear_available_at(
        &mut self,
        gear_id: &str,
        station_id: i16,
        slot_id: i16,
    ) -> AppResult<bool>;

    async fn open_record_for_user(&mut self, user_id: &str) -> AppResult<Option<BorrowRecord>>;

    async fn insert_record(
        &mut self,
        user_id: &str,
        gear_id: &str,
        borrow_time: DateTime<Utc>,
    ) -> AppResult<i64>;

    /// Close an open record. False when the record was already closed.
    async fn close_record(
        &mut self,
        record_id: i64,
        return_time: DateTime<Utc>,
        cost: Decimal,
    ) -> AppResult<bool>;

    /// Whether the bay is on the station's out-of-service list. Unknown
    /// stations cannot accept returns and count as out of service.
    async fn slot_out_of_service(&mut self, station_id: i16, slot_id: i16) -> AppResult<bool>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}

#[async_trait]
impl RentalStore for Repository {
    async fn begin(&self) -> AppResult<Box<dyn RentalTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgRentalTx { tx }))
    }
}

/// Postgres-backed unit of work
pub struct PgRentalTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RentalTx for PgRentalTx {
    async fn get_user(&mut self, user_id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, real_name, password, role, credit, is_active FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(user)
    }

    async fn adjust_balance(&mut self, user_id: &str, delta: Decimal) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET credit = credit + $2 WHERE user_id = $1 AND credit + $2 >= 0",
        )
        .bind(user_id)
        .bind(delta)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn get_gear(&mut self, gear_id: &str) -> AppResult<Option<RainGear>> {
        let gear = sqlx::query_as::<_, RainGear>(
            "SELECT gear_id, gear_type, status, station_id, slot_id FROM raingear WHERE gear_id = $1",
        )
        .bind(gear_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(gear)
    }

    async fn gear_occupying_slot(
        &mut self,
        station_id: i16,
        slot_id: i16,
    ) -> AppResult<Option<RainGear>> {
        let gear = sqlx::query_as::<_, RainGear>(
            r#"
            SELECT gear_id, gear_type, status, station_id, slot_id
            FROM raingear
            WHERE station_id = $1 AND slot_id = $2
            "#,
        )
        .bind(station_id)
        .bind(slot_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(gear)
    }

    async fn set_gear_borrowed(&mut self, gear_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE raingear
            SET status = $2, station_id = NULL, slot_id = NULL
            WHERE gear_id = $1 AND status = $3
            "#,
        )
        .bind(gear_id)
        .bind(i16::from(GearStatus::Borrowed))
        .bind(i16::from(GearStatus::Available))
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_gear_available_at(
        &mut self,
        gear_id: &str,
        station_id: i16,
        slot_id: i16,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE raingear
            SET status = $2, station_id = $3, slot_id = $4
            WHERE gear_id = $1 AND status = $5
            "#,
        )
        .bind(gear_id)
        .bind(i16::from(GearStatus::Available))
        .bind(station_id)
        .bind(slot_id)
        .bind(i16::from(GearStatus::Borrowed))
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn open_record_for_user(&mut self, user_id: &str) -> AppResult<Option<BorrowRecord>> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            SELECT record_id, user_id, gear_id, borrow_time, return_time, cost
            FROM record
            WHERE user_id = $1 AND return_time IS NULL
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(record)
    }

    async fn insert_record(
        &mut self,
        user_id: &str,
        gear_id: &str,
        borrow_time: DateTime<Utc>,
    ) -> AppResult<i64> {
        // Timestamp comes from the engine's clock read, never the
        // database's, so fee calculation later uses the same time source.
        let record_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO record (user_id, gear_id, borrow_time, cost)
            VALUES ($1, $2, $3, 0)
            RETURNING record_id
            "#,
        )
        .bind(user_id)
        .bind(gear_id)
        .bind(borrow_time)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(record_id)
    }

    async fn close_record(
        &mut self,
        record_id: i64,
        return_time: DateTime<Utc>,
        cost: Decimal,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE record SET return_time = $2, cost = $3 WHERE record_id = $1 AND return_time IS NULL",
        )
        .bind(record_id)
        .bind(return_time)
        .bind(cost)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn slot_out_of_service(&mut self, station_id: i16, slot_id: i16) -> AppResult<bool> {
        let broken: Option<bool> = sqlx::query_scalar(
            "SELECT $2 = ANY(broken_slots) FROM station WHERE station_id = $1",
        )
        .bind(station_id)
        .bind(slot_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(broken.unwrap_or(true))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
