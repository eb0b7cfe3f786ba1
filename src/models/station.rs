//! Station model and related types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::gear::RainGear;

/// Number of physical bays at every station.
pub const STATION_CAPACITY: i16 = 12;

/// Station row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Station {
    pub station_id: i16,
    pub name: String,
    pub pos_x: f64,
    pub pos_y: f64,
    pub description: Option<String>,
    pub online: bool,
    /// Slot indices administratively taken out of service,
    /// independent of whether a gear currently occupies them
    pub broken_slots: Vec<i16>,
}

impl Station {
    pub fn is_slot_out_of_service(&self, slot_id: i16) -> bool {
        !(1..=STATION_CAPACITY).contains(&slot_id) || self.broken_slots.contains(&slot_id)
    }
}

/// Station with its full slot inventory, for kiosk display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationDetail {
    #[serde(flatten)]
    pub station: Station,
    pub capacity: i16,
    /// Sparse slot index -> docked gear mapping; unoccupied slots are absent
    pub slots: BTreeMap<i16, RainGear>,
}

impl StationDetail {
    pub fn new(station: Station, gears: Vec<RainGear>) -> Self {
        let mut slots = BTreeMap::new();
        for gear in gears {
            if let Some(slot_id) = gear.slot_id {
                slots.insert(slot_id, gear);
            }
        }
        Self {
            station,
            capacity: STATION_CAPACITY,
            slots,
        }
    }

    /// Number of docked gears, regardless of condition.
    pub fn inventory_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of gears a kiosk user could actually borrow right now.
    pub fn available_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|(slot_id, gear)| {
                gear.is_available() && !self.station.is_slot_out_of_service(**slot_id)
            })
            .count()
    }
}

/// Per-station summary for the kiosk map view
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StationMapInfo {
    pub station_id: i16,
    pub name: String,
    pub pos_x: f64,
    pub pos_y: f64,
    pub online: bool,
    pub available_count: i64,
}
