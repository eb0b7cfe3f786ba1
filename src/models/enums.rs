//! Shared domain enums (matching the station database encoding)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// GearType
// ---------------------------------------------------------------------------

/// Rain gear type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum GearType {
    StandardPlastic = 1,
    PremiumWindproof = 2,
    Sunshade = 3,
    Raincoat = 4,
}

impl GearType {
    /// Refundable deposit charged at borrow time, sized by type.
    pub fn deposit(self) -> Decimal {
        match self {
            GearType::StandardPlastic => dec!(10),
            GearType::PremiumWindproof => dec!(20),
            GearType::Sunshade => dec!(15),
            GearType::Raincoat => dec!(25),
        }
    }

    /// Station slot sub-range this type may be returned to.
    /// Each type owns a fixed, non-overlapping band of the 12 bays.
    pub fn slot_range(self) -> RangeInclusive<i16> {
        match self {
            GearType::StandardPlastic => 1..=4,
            GearType::PremiumWindproof => 5..=8,
            GearType::Sunshade => 9..=10,
            GearType::Raincoat => 11..=12,
        }
    }

    /// Type occupying a given slot index, if the index is valid.
    pub fn for_slot(slot_id: i16) -> Option<GearType> {
        match slot_id {
            1..=4 => Some(GearType::StandardPlastic),
            5..=8 => Some(GearType::PremiumWindproof),
            9..=10 => Some(GearType::Sunshade),
            11..=12 => Some(GearType::Raincoat),
            _ => None,
        }
    }
}

impl TryFrom<i16> for GearType {
    type Error = i16;

    fn try_from(v: i16) -> Result<Self, i16> {
        match v {
            1 => Ok(GearType::StandardPlastic),
            2 => Ok(GearType::PremiumWindproof),
            3 => Ok(GearType::Sunshade),
            4 => Ok(GearType::Raincoat),
            other => Err(other),
        }
    }
}

impl From<GearType> for i16 {
    fn from(t: GearType) -> Self {
        t as i16
    }
}

impl std::fmt::Display for GearType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GearType::StandardPlastic => "Standard umbrella",
            GearType::PremiumWindproof => "Windproof umbrella",
            GearType::Sunshade => "Sunshade umbrella",
            GearType::Raincoat => "Raincoat",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// GearStatus
// ---------------------------------------------------------------------------

/// Gear lifecycle status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum GearStatus {
    Available = 1,
    Borrowed = 2,
    Broken = 3,
}

impl TryFrom<i16> for GearStatus {
    type Error = i16;

    fn try_from(v: i16) -> Result<Self, i16> {
        match v {
            1 => Ok(GearStatus::Available),
            2 => Ok(GearStatus::Borrowed),
            3 => Ok(GearStatus::Broken),
            other => Err(other),
        }
    }
}

impl From<GearStatus> for i16 {
    fn from(s: GearStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for GearStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GearStatus::Available => "Available",
            GearStatus::Borrowed => "Borrowed",
            GearStatus::Broken => "Broken",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// User role codes (stored in users.role)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum UserRole {
    Student = 0,
    Staff = 1,
    Admin = 9,
}

impl From<i16> for UserRole {
    fn from(v: i16) -> Self {
        match v {
            1 => UserRole::Staff,
            9 => UserRole::Admin,
            _ => UserRole::Student,
        }
    }
}

impl From<UserRole> for i16 {
    fn from(r: UserRole) -> Self {
        r as i16
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            UserRole::Student => "Student",
            UserRole::Staff => "Staff",
            UserRole::Admin => "Admin",
        };
        write!(f, "{}", label)
    }
}
