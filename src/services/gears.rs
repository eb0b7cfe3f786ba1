//! Admin gear management service

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::GearStatus,
        gear::{GearQuery, RainGear},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct GearsService {
    repository: Repository,
}

impl GearsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Paginated gear listing for the admin console
    pub async fn search(&self, query: &GearQuery) -> AppResult<(Vec<RainGear>, i64)> {
        self.repository.gears.search(query).await
    }

    pub async fn get(&self, gear_id: &str) -> AppResult<RainGear> {
        self.repository.gears.get_by_id(gear_id).await
    }

    /// Maintenance override: flip a docked gear between Available and
    /// Broken. Borrowed is owned by the rental engine and cannot be set
    /// here, nor can a gear currently out with a user be overridden.
    pub async fn override_status(&self, gear_id: &str, status: i16) -> AppResult<RainGear> {
        let status = GearStatus::try_from(status)
            .map_err(|v| AppError::Validation(format!("Invalid gear status {}", v)))?;
        if status == GearStatus::Borrowed {
            return Err(AppError::Validation(
                "Borrowed status is set by the rental engine only".to_string(),
            ));
        }

        if !self
            .repository
            .gears
            .set_docked_status(gear_id, status)
            .await?
        {
            // Distinguish "missing" from "currently out with a user".
            let gear = self.repository.gears.get_by_id(gear_id).await?;
            if gear.gear_status() == Some(GearStatus::Borrowed) {
                return Err(AppError::Conflict(
                    "Gear is currently borrowed and cannot be overridden".to_string(),
                ));
            }
        }
        tracing::info!(gear_id, status = %status, "gear status overridden");
        self.repository.gears.get_by_id(gear_id).await
    }

    pub async fn count_borrowed(&self) -> AppResult<i64> {
        self.repository.gears.count_by_status(GearStatus::Borrowed).await
    }

    pub async fn count_broken(&self) -> AppResult<i64> {
        self.repository.gears.count_by_status(GearStatus::Broken).await
    }
}
