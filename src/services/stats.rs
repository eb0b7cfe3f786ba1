//! Statistics service for the admin dashboard

use crate::{
    api::stats::{GearStats, RentalStats, StatsResponse, StationStats, UserStats},
    error::AppResult,
    models::enums::GearStatus,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Network-wide dashboard numbers
    pub async fn overview(&self) -> AppResult<StatsResponse> {
        let users_total = self.repository.users.count_all().await?;

        let gears_total = self.repository.gears.count_all().await?;
        let gears_borrowed = self
            .repository
            .gears
            .count_by_status(GearStatus::Borrowed)
            .await?;
        let gears_broken = self
            .repository
            .gears
            .count_by_status(GearStatus::Broken)
            .await?;

        let rentals_active = self.repository.records.count_active().await?;
        let rentals_completed = self.repository.records.count_completed().await?;
        let revenue = self.repository.records.total_revenue().await?;

        let online_rate = self.repository.stations.online_rate().await?;

        Ok(StatsResponse {
            users: UserStats { total: users_total },
            gears: GearStats {
                total: gears_total,
                borrowed: gears_borrowed,
                broken: gears_broken,
            },
            rentals: RentalStats {
                active: rentals_active,
                completed: rentals_completed,
                revenue,
            },
            stations: StationStats { online_rate },
        })
    }
}
