//! Gear repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::GearStatus,
        gear::{GearQuery, RainGear},
    },
};

#[derive(Clone)]
pub struct GearsRepository {
    pool: Pool<Postgres>,
}

impl GearsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get gear by ID
    pub async fn get_by_id(&self, gear_id: &str) -> AppResult<RainGear> {
        sqlx::query_as::<_, RainGear>(
            "SELECT gear_id, gear_type, status, station_id, slot_id FROM raingear WHERE gear_id = $1",
        )
        .bind(gear_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Gear {} not found", gear_id)))
    }

    /// Gears docked at a station, ordered by slot
    pub async fn list_at_station(&self, station_id: i16) -> AppResult<Vec<RainGear>> {
        let gears = sqlx::query_as::<_, RainGear>(
            r#"
            SELECT gear_id, gear_type, status, station_id, slot_id
            FROM raingear
            WHERE station_id = $1
            ORDER BY slot_id
            "#,
        )
        .bind(station_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(gears)
    }

    /// Gear docked at one specific bay, if any
    pub async fn find_at_slot(
        &self,
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
        .fetch_optional(&self.pool)
        .await?;
        Ok(gear)
    }

    /// Paginated admin listing with optional station/slot/status filters
    pub async fn search(&self, query: &GearQuery) -> AppResult<(Vec<RainGear>, i64)> {
        let limit = query.limit.unwrap_or(50).clamp(1, 500);
        let offset = query.offset.unwrap_or(0).max(0);

        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT gear_id, gear_type, status, station_id, slot_id FROM raingear WHERE 1=1",
        );
        let mut count_builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM raingear WHERE 1=1");
        for b in [&mut builder, &mut count_builder] {
            if let Some(station_id) = query.station_id {
                b.push(" AND station_id = ").push_bind(station_id);
            }
            if let Some(slot_id) = query.slot_id {
                b.push(" AND slot_id = ").push_bind(slot_id);
            }
            if let Some(status) = query.status {
                b.push(" AND status = ").push_bind(status);
            }
        }
        builder
            .push(" ORDER BY gear_id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let gears = builder
            .build_query_as::<RainGear>()
            .fetch_all(&self.pool)
            .await?;
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((gears, total))
    }

    /// Flip a docked gear between Available and Broken.
    /// Conditional on the gear not being Borrowed so the override cannot
    /// collide with an in-flight rental.
    pub async fn set_docked_status(&self, gear_id: &str, status: GearStatus) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE raingear SET status = $2 WHERE gear_id = $1 AND status != $3",
        )
        .bind(gear_id)
        .bind(i16::from(status))
        .bind(i16::from(GearStatus::Borrowed))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Count gears in a given status
    pub async fn count_by_status(&self, status: GearStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM raingear WHERE status = $1")
            .bind(i16::from(status))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Total gear count
    pub async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM raingear")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
