//! PostgreSQL-backed `VenueRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{VenueRepository, VenueRepositoryError};
use crate::domain::{OffererId, Venue, VenueId};

use super::error_mapping::{StoreFailure, map_basic_failure};
use super::models::VenueRow;
use super::pool::DbPool;
use super::schema::{mediations, offers, stocks, venues};

/// Diesel-backed implementation of the `VenueRepository` port.
#[derive(Clone)]
pub struct DieselVenueRepository {
    pool: DbPool,
}

impl DieselVenueRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(failure: StoreFailure) -> VenueRepositoryError {
    map_basic_failure(
        failure,
        VenueRepositoryError::connection,
        VenueRepositoryError::query,
    )
}

/// Outcome of the delete transaction before it is mapped to the port.
enum DeleteOutcome {
    Missing,
    HasStocks,
    Deleted,
}

#[async_trait]
impl VenueRepository for DieselVenueRepository {
    async fn find_by_id(&self, id: &VenueId) -> Result<Option<Venue>, VenueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let row: Option<VenueRow> = venues::table
            .find(*id.as_uuid())
            .select(VenueRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(err.into()))?;
        Ok(row.map(Venue::from))
    }

    async fn list_for_offerer(
        &self,
        offerer_id: &OffererId,
    ) -> Result<Vec<Venue>, VenueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let rows: Vec<VenueRow> = venues::table
            .filter(venues::managing_offerer_id.eq(*offerer_id.as_uuid()))
            .select(VenueRow::as_select())
            .order_by(venues::name)
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(rows.into_iter().map(Venue::from).collect())
    }

    async fn insert(&self, venue: &Venue) -> Result<(), VenueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        diesel::insert_into(venues::table)
            .values(VenueRow::from(venue))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                let failure = StoreFailure::from(err);
                match &venue.siret {
                    Some(siret) if failure.violates("siret") => {
                        VenueRepositoryError::duplicate_siret(siret.as_str())
                    }
                    _ => map_error(failure),
                }
            })?;
        Ok(())
    }

    async fn delete_with_offers(&self, id: &VenueId) -> Result<bool, VenueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let venue_id = *id.as_uuid();
        let outcome = conn
            .transaction(|conn| {
                async move {
                    let found: Option<Uuid> = venues::table
                        .find(venue_id)
                        .select(venues::id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    if found.is_none() {
                        return Ok(DeleteOutcome::Missing);
                    }
                    let venue_offers = offers::table
                        .filter(offers::venue_id.eq(venue_id))
                        .select(offers::id);
                    let has_stocks: bool = diesel::select(exists(
                        stocks::table.filter(stocks::offer_id.eq_any(venue_offers.clone())),
                    ))
                    .get_result(conn)
                    .await?;
                    if has_stocks {
                        return Ok(DeleteOutcome::HasStocks);
                    }
                    diesel::delete(
                        mediations::table.filter(mediations::offer_id.eq_any(venue_offers)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(offers::table.filter(offers::venue_id.eq(venue_id)))
                        .execute(conn)
                        .await?;
                    diesel::delete(venues::table.find(venue_id))
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(DeleteOutcome::Deleted)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_error(err.into()))?;
        match outcome {
            DeleteOutcome::Missing => Ok(false),
            DeleteOutcome::HasStocks => Err(VenueRepositoryError::has_stocks()),
            DeleteOutcome::Deleted => Ok(true),
        }
    }
}
