//! PostgreSQL-backed `OfferRepository` implementation using Diesel ORM.
//!
//! Covers offers, their stocks and their mediations.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::sum;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{OfferRepository, OfferRepositoryError};
use crate::domain::{Mediation, MediationId, Offer, OfferId, Stock, StockId, StockLevel, VenueId};

use super::error_mapping::{StoreFailure, map_basic_failure};
use super::models::{MediationRow, OfferRow, StockRow};
use super::pool::DbPool;
use super::schema::{bookings, mediations, offerers, offers, stocks, venues};

/// Diesel-backed implementation of the `OfferRepository` port.
#[derive(Clone)]
pub struct DieselOfferRepository {
    pool: DbPool,
}

impl DieselOfferRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(failure: StoreFailure) -> OfferRepositoryError {
    map_basic_failure(
        failure,
        OfferRepositoryError::connection,
        OfferRepositoryError::query,
    )
}

fn offers_from_rows(rows: Vec<OfferRow>) -> Result<Vec<Offer>, OfferRepositoryError> {
    rows.into_iter()
        .map(|row| Offer::try_from(row).map_err(OfferRepositoryError::query))
        .collect()
}

#[async_trait]
impl OfferRepository for DieselOfferRepository {
    async fn find_offer(&self, id: &OfferId) -> Result<Option<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let rows: Vec<OfferRow> = offers::table
            .filter(offers::id.eq(*id.as_uuid()))
            .select(OfferRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(offers_from_rows(rows)?.into_iter().next())
    }

    async fn insert_offer(&self, offer: &Offer) -> Result<(), OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        diesel::insert_into(offers::table)
            .values(OfferRow::from(offer))
            .execute(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(())
    }

    async fn list_for_venue(&self, venue_id: &VenueId) -> Result<Vec<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let rows: Vec<OfferRow> = offers::table
            .filter(offers::venue_id.eq(*venue_id.as_uuid()))
            .select(OfferRow::as_select())
            .order_by(offers::date_created.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        offers_from_rows(rows)
    }

    async fn set_active_for_venue(
        &self,
        venue_id: &VenueId,
        is_active: bool,
    ) -> Result<Vec<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let mut rows: Vec<OfferRow> =
            diesel::update(offers::table.filter(offers::venue_id.eq(*venue_id.as_uuid())))
                .set(offers::is_active.eq(is_active))
                .returning(OfferRow::as_returning())
                .get_results(&mut conn)
                .await
                .map_err(|err| map_error(err.into()))?;
        rows.sort_by(|a, b| b.date_created.cmp(&a.date_created));
        offers_from_rows(rows)
    }

    async fn list_visible(
        &self,
        departement_codes: &[String],
    ) -> Result<Vec<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let rows: Vec<OfferRow> = offers::table
            .inner_join(venues::table.inner_join(offerers::table))
            .filter(offers::is_active.eq(true))
            .filter(offerers::is_active.eq(true))
            .filter(
                offers::url
                    .is_not_null()
                    .or(venues::departement_code.eq_any(departement_codes)),
            )
            .select(OfferRow::as_select())
            .order_by(offers::date_created.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        offers_from_rows(rows)
    }

    async fn find_stock(&self, id: &StockId) -> Result<Option<Stock>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let row: Option<StockRow> = stocks::table
            .find(*id.as_uuid())
            .select(StockRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(err.into()))?;
        Ok(row.map(Stock::from))
    }

    async fn insert_stock(&self, stock: &Stock) -> Result<(), OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        diesel::insert_into(stocks::table)
            .values(StockRow::from(stock))
            .execute(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(())
    }

    async fn stock_levels(
        &self,
        offer_id: &OfferId,
    ) -> Result<Vec<StockLevel>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let rows: Vec<StockRow> = stocks::table
            .filter(stocks::offer_id.eq(*offer_id.as_uuid()))
            .select(StockRow::as_select())
            .order_by((stocks::beginning_datetime.asc(), stocks::date_modified.asc()))
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let booked: HashMap<Uuid, i64> = bookings::table
            .filter(bookings::stock_id.eq_any(&ids))
            .filter(bookings::is_cancelled.eq(false))
            .group_by(bookings::stock_id)
            .select((bookings::stock_id, sum(bookings::quantity)))
            .load::<(Uuid, Option<i64>)>(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?
            .into_iter()
            .map(|(stock_id, quantity)| (stock_id, quantity.unwrap_or(0)))
            .collect();
        Ok(rows
            .into_iter()
            .map(|row| StockLevel {
                booked: booked.get(&row.id).copied().unwrap_or(0),
                stock: Stock::from(row),
            })
            .collect())
    }

    async fn find_mediation(
        &self,
        id: &MediationId,
    ) -> Result<Option<Mediation>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let row: Option<MediationRow> = mediations::table
            .find(*id.as_uuid())
            .select(MediationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(err.into()))?;
        Ok(row.map(Mediation::from))
    }

    async fn insert_mediation(&self, mediation: &Mediation) -> Result<(), OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        diesel::insert_into(mediations::table)
            .values(MediationRow::from(mediation))
            .execute(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(())
    }

    async fn update_mediation(&self, mediation: &Mediation) -> Result<(), OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        diesel::update(mediations::table.find(*mediation.id.as_uuid()))
            .set(MediationRow::from(mediation))
            .execute(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(())
    }
}
