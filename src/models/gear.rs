//! Rain gear model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::models::enums::{GearStatus, GearType};

/// Rain gear row.
///
/// `station_id`/`slot_id` are populated exactly when the gear is physically
/// docked (Available or Broken) and NULL while it is Borrowed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RainGear {
    pub gear_id: String,
    /// Type (1=standard, 2=windproof, 3=sunshade, 4=raincoat)
    pub gear_type: i16,
    /// Status (1=available, 2=borrowed, 3=broken)
    pub status: i16,
    pub station_id: Option<i16>,
    pub slot_id: Option<i16>,
}

impl RainGear {
    pub fn kind(&self) -> Option<GearType> {
        GearType::try_from(self.gear_type).ok()
    }

    pub fn gear_status(&self) -> Option<GearStatus> {
        GearStatus::try_from(self.status).ok()
    }

    pub fn is_available(&self) -> bool {
        self.gear_status() == Some(GearStatus::Available)
    }

    pub fn is_broken(&self) -> bool {
        self.gear_status() == Some(GearStatus::Broken)
    }

    pub fn deposit(&self) -> Option<Decimal> {
        self.kind().map(GearType::deposit)
    }
}

/// Query parameters for the admin gear listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct GearQuery {
    /// Restrict to one station
    pub station_id: Option<i16>,
    /// Restrict to one slot (requires station_id)
    pub slot_id: Option<i16>,
    /// Restrict to one status code
    pub status: Option<i16>,
    /// Page size (default 50)
    pub limit: Option<i64>,
    /// Page offset
    pub offset: Option<i64>,
}

/// Admin gear status override request
#[derive(Debug, Deserialize, ToSchema)]
pub struct GearStatusUpdate {
    /// New status (1=available, 3=broken); Borrowed is engine-driven only
    pub status: i16,
}
