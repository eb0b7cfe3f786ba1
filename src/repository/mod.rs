//! Repository layer for database operations

pub mod gears;
pub mod records;
pub mod rental;
pub mod stations;
pub mod users;

use sqlx::{Pool, Postgres};

pub use rental::{RentalStore, RentalTx};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub gears: gears::GearsRepository,
    pub stations: stations::StationsRepository,
    pub records: records::RecordsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            gears: gears::GearsRepository::new(pool.clone()),
            stations: stations::StationsRepository::new(pool.clone()),
            records: records::RecordsRepository::new(pool.clone()),
            pool,
        }
    }
}
