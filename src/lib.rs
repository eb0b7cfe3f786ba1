//! RainHub Rental Station Network
//!
//! A Rust server for a network of unattended rain-gear rental stations,
//! providing a REST JSON API for kiosk clients (borrow/return) and the
//! admin back office (users, gear, stations, orders).

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod pricing;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
