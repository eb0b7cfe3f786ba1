//! Data models for RainHub

pub mod enums;
pub mod gear;
pub mod record;
pub mod station;
pub mod user;

// Re-export commonly used types
pub use enums::{GearStatus, GearType, UserRole};
pub use gear::RainGear;
pub use record::BorrowRecord;
pub use station::{Station, StationDetail, StationMapInfo};
pub use user::{User, UserClaims};
