//! Station management service

use crate::{
    error::AppResult,
    models::{
        enums::GearStatus,
        station::{StationDetail, StationMapInfo},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct StationsService {
    repository: Repository,
}

impl StationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All stations with their full slot inventory
    pub async fn list_detailed(&self) -> AppResult<Vec<StationDetail>> {
        let stations = self.repository.stations.list().await?;
        let mut result = Vec::with_capacity(stations.len());
        for station in stations {
            let gears = self
                .repository
                .gears
                .list_at_station(station.station_id)
                .await?;
            result.push(StationDetail::new(station, gears));
        }
        Ok(result)
    }

    /// One station with its full slot inventory
    pub async fn get_detail(&self, station_id: i16) -> AppResult<StationDetail> {
        let station = self.repository.stations.get_by_id(station_id).await?;
        let gears = self.repository.gears.list_at_station(station_id).await?;
        Ok(StationDetail::new(station, gears))
    }

    /// Map view: positions, online flags, live availability counts
    pub async fn map_info(&self) -> AppResult<Vec<StationMapInfo>> {
        self.repository.stations.map_info().await
    }

    /// Set a station online or offline
    pub async fn set_online(&self, station_id: i16, online: bool) -> AppResult<()> {
        self.repository.stations.set_online(station_id, online).await?;
        tracing::info!(station_id, online, "station availability changed");
        Ok(())
    }

    /// Take a bay out of service. A gear currently docked there is flagged
    /// Broken as well, so it cannot be borrowed through another path.
    pub async fn mark_slot_broken(&self, station_id: i16, slot_id: i16) -> AppResult<()> {
        self.repository
            .stations
            .mark_slot_broken(station_id, slot_id)
            .await?;
        if let Some(gear) = self.repository.gears.find_at_slot(station_id, slot_id).await? {
            self.repository
                .gears
                .set_docked_status(&gear.gear_id, GearStatus::Broken)
                .await?;
        }
        tracing::info!(station_id, slot_id, "slot taken out of service");
        Ok(())
    }

    /// Put a bay back in service, restoring a docked gear to Available.
    pub async fn clear_slot_broken(&self, station_id: i16, slot_id: i16) -> AppResult<()> {
        self.repository
            .stations
            .clear_slot_broken(station_id, slot_id)
            .await?;
        if let Some(gear) = self.repository.gears.find_at_slot(station_id, slot_id).await? {
            self.repository
                .gears
                .set_docked_status(&gear.gear_id, GearStatus::Available)
                .await?;
        }
        tracing::info!(station_id, slot_id, "slot back in service");
        Ok(())
    }
}
