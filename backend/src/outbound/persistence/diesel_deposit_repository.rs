//! PostgreSQL-backed `DepositRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DepositRepository, DepositRepositoryError};
use crate::domain::{Deposit, UserId};

use super::error_mapping::{StoreFailure, map_basic_failure};
use super::models::DepositRow;
use super::pool::DbPool;
use super::schema::deposits;

/// Diesel-backed implementation of the `DepositRepository` port.
#[derive(Clone)]
pub struct DieselDepositRepository {
    pool: DbPool,
}

impl DieselDepositRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DepositRepository for DieselDepositRepository {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Deposit>, DepositRepositoryError> {
        let map_error = |failure: StoreFailure| {
            map_basic_failure(
                failure,
                DepositRepositoryError::connection,
                DepositRepositoryError::query,
            )
        };
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let rows: Vec<DepositRow> = deposits::table
            .filter(deposits::user_id.eq(*user_id.as_uuid()))
            .select(DepositRow::as_select())
            .order_by(deposits::date_created)
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(rows.into_iter().map(Deposit::from).collect())
    }
}
