//! Stations repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::station::{Station, StationMapInfo, STATION_CAPACITY},
};

#[derive(Clone)]
pub struct StationsRepository {
    pool: Pool<Postgres>,
}

impl StationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get station by ID
    pub async fn get_by_id(&self, station_id: i16) -> AppResult<Station> {
        sqlx::query_as::<_, Station>(
            "SELECT station_id, name, pos_x, pos_y, description, online, broken_slots FROM station WHERE station_id = $1",
        )
        .bind(station_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Station {} not found", station_id)))
    }

    /// All stations ordered by ID
    pub async fn list(&self) -> AppResult<Vec<Station>> {
        let stations = sqlx::query_as::<_, Station>(
            "SELECT station_id, name, pos_x, pos_y, description, online, broken_slots FROM station ORDER BY station_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stations)
    }

    /// Map view: static position data joined with the live count of
    /// borrowable gears per station
    pub async fn map_info(&self) -> AppResult<Vec<StationMapInfo>> {
        let rows = sqlx::query_as::<_, StationMapInfo>(
            r#"
            SELECT s.station_id, s.name, s.pos_x, s.pos_y, s.online,
                   COALESCE((
                       SELECT COUNT(*)
                       FROM raingear g
                       WHERE g.station_id = s.station_id
                         AND g.status = 1
                         AND NOT (g.slot_id = ANY(s.broken_slots))
                   ), 0) AS available_count
            FROM station s
            ORDER BY s.station_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Set the online flag
    pub async fn set_online(&self, station_id: i16, online: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE station SET online = $2 WHERE station_id = $1")
            .bind(station_id)
            .bind(online)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Station {} not found",
                station_id
            )));
        }
        Ok(())
    }

    /// Add a slot to the out-of-service list (idempotent)
    pub async fn mark_slot_broken(&self, station_id: i16, slot_id: i16) -> AppResult<()> {
        if !(1..=STATION_CAPACITY).contains(&slot_id) {
            return Err(AppError::Validation(format!(
                "Slot index must be between 1 and {}",
                STATION_CAPACITY
            )));
        }
        let result = sqlx::query(
            r#"
            UPDATE station
            SET broken_slots = array_append(broken_slots, $2)
            WHERE station_id = $1 AND NOT ($2 = ANY(broken_slots))
            "#,
        )
        .bind(station_id)
        .bind(slot_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            // Either unknown station or already marked; disambiguate.
            self.get_by_id(station_id).await?;
        }
        Ok(())
    }

    /// Remove a slot from the out-of-service list (idempotent)
    pub async fn clear_slot_broken(&self, station_id: i16, slot_id: i16) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE station SET broken_slots = array_remove(broken_slots, $2) WHERE station_id = $1",
        )
        .bind(station_id)
        .bind(slot_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Station {} not found",
                station_id
            )));
        }
        Ok(())
    }

    /// Fraction of stations currently online, 0.0 when there are none
    pub async fn online_rate(&self) -> AppResult<f64> {
        let rate: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(CASE WHEN online THEN 1.0 ELSE 0.0 END) FROM station",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(rate.unwrap_or(0.0))
    }
}
