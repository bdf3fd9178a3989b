//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types; business rules stay in the domain. Row structs (`models.rs`) and
//! table definitions (`schema.rs`) never leave this module. Connections come
//! from a `bb8` pool through `diesel-async`, and every database failure is
//! mapped to the calling port's error type.
//!
//! # Example
//!
//! ```no_run
//! use backend::outbound::persistence::{DbPool, PoolConfig, PostgresStore, run_migrations};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://pass_culture@localhost/pass_culture";
//! run_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let ports = PostgresStore::new(pool).ports();
//! # let _ = ports;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::domain::RepositoryPorts;

mod diesel_booking_repository;
mod diesel_deposit_repository;
mod diesel_offer_repository;
mod diesel_offerer_repository;
mod diesel_payment_repository;
mod diesel_user_repository;
mod diesel_venue_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_deposit_repository::DieselDepositRepository;
pub use diesel_offer_repository::DieselOfferRepository;
pub use diesel_offerer_repository::DieselOffererRepository;
pub use diesel_payment_repository::DieselPaymentRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_venue_repository::DieselVenueRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

/// Every Diesel repository over one shared pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: DbPool,
}

impl PostgresStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Repository ports backed by PostgreSQL.
    pub fn ports(&self) -> RepositoryPorts {
        RepositoryPorts {
            users: Arc::new(DieselUserRepository::new(self.pool.clone())),
            offerers: Arc::new(DieselOffererRepository::new(self.pool.clone())),
            venues: Arc::new(DieselVenueRepository::new(self.pool.clone())),
            offers: Arc::new(DieselOfferRepository::new(self.pool.clone())),
            bookings: Arc::new(DieselBookingRepository::new(self.pool.clone())),
            deposits: Arc::new(DieselDepositRepository::new(self.pool.clone())),
            payments: Arc::new(DieselPaymentRepository::new(self.pool.clone())),
        }
    }
}
