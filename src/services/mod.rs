//! Business logic services

pub mod auth;
pub mod gears;
pub mod orders;
pub mod rental;
pub mod stations;
pub mod stats;
pub mod users;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub rentals: rental::RentalService,
    pub orders: orders::OrdersService,
    pub stations: stations::StationsService,
    pub users: users::UsersService,
    pub gears: gears::GearsService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            rentals: rental::RentalService::new(Arc::new(repository.clone())),
            orders: orders::OrdersService::new(repository.clone()),
            stations: stations::StationsService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            gears: gears::GearsService::new(repository.clone()),
            stats: stats::StatsService::new(repository),
        }
    }
}
