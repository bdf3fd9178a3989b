//! PostgreSQL-backed `BookingRepository` implementation using Diesel ORM.
//!
//! Booking writes rely on the `booking_update` trigger, which locks the
//! stock row and raises `tooManyBookings` when live bookings would exceed
//! the available quantity; concurrent bookings therefore serialise on the
//! stock.

use async_trait::async_trait;
use diesel::dsl::{exists, sum};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{BookingExportFilter, BookingRepository, BookingRepositoryError};
use crate::domain::{
    Booking, BookingDetails, BookingId, Deposit, Email, Offer, OffererId, Stock, StockId, UserId,
    Venue,
};

use super::error_mapping::{StoreFailure, map_basic_failure};
use super::models::{BookingRow, DepositRow, OfferRow, StockRow, VenueRow};
use super::pool::DbPool;
use super::schema::{bookings, deposits, offers, stocks, users, venues};

/// Outcome of the activation transaction before it is mapped to the port.
enum ActivationOutcome {
    AlreadyActivated,
    Activated,
}

type DetailsRow = (BookingRow, StockRow, OfferRow, VenueRow, String, String);

/// Bookings joined with their stock, offer, venue and booker.
macro_rules! details_query {
    () => {
        bookings::table
            .inner_join(stocks::table.inner_join(offers::table.inner_join(venues::table)))
            .inner_join(users::table)
            .select((
                BookingRow::as_select(),
                StockRow::as_select(),
                OfferRow::as_select(),
                VenueRow::as_select(),
                users::email,
                users::public_name,
            ))
    };
}

/// Diesel-backed implementation of the `BookingRepository` port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(failure: StoreFailure) -> BookingRepositoryError {
    map_basic_failure(
        failure,
        BookingRepositoryError::connection,
        BookingRepositoryError::query,
    )
}

fn map_write_error(failure: StoreFailure, token: &str) -> BookingRepositoryError {
    if failure == StoreFailure::Overbooked {
        BookingRepositoryError::overbooked()
    } else if failure.violates("token") {
        BookingRepositoryError::duplicate_token(token)
    } else if failure.violates("deposits_activation") {
        BookingRepositoryError::already_activated()
    } else {
        map_error(failure)
    }
}

fn details_from_row(row: DetailsRow) -> Result<BookingDetails, BookingRepositoryError> {
    let (booking, stock, offer, venue, email, public_name) = row;
    Ok(BookingDetails {
        booking: Booking::from(booking),
        stock: Stock::from(stock),
        offer: Offer::try_from(offer).map_err(BookingRepositoryError::query)?,
        venue: Venue::from(venue),
        user_email: Email::normalise(&email),
        user_public_name: public_name,
    })
}

fn details_from_rows(rows: Vec<DetailsRow>) -> Result<Vec<BookingDetails>, BookingRepositoryError> {
    rows.into_iter().map(details_from_row).collect()
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        diesel::insert_into(bookings::table)
            .values(BookingRow::from(booking))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err.into(), &booking.token))?;
        Ok(())
    }

    async fn update(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        diesel::update(bookings::table.find(*booking.id.as_uuid()))
            .set(BookingRow::from(booking))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err.into(), &booking.token))?;
        Ok(())
    }

    async fn find_details_by_token(
        &self,
        token: &str,
    ) -> Result<Option<BookingDetails>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let row: Option<DetailsRow> = details_query!()
            .filter(bookings::token.eq(token))
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(err.into()))?;
        row.map(details_from_row).transpose()
    }

    async fn find_details_by_id(
        &self,
        id: &BookingId,
    ) -> Result<Option<BookingDetails>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let row: Option<DetailsRow> = details_query!()
            .filter(bookings::id.eq(*id.as_uuid()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(err.into()))?;
        row.map(details_from_row).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<BookingDetails>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let rows: Vec<DetailsRow> = details_query!()
            .filter(bookings::user_id.eq(*user_id.as_uuid()))
            .order_by(bookings::date_created.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        details_from_rows(rows)
    }

    async fn list_for_offerers(
        &self,
        offerer_ids: &[OffererId],
        filter: &BookingExportFilter,
    ) -> Result<Vec<BookingDetails>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let ids: Vec<uuid::Uuid> = offerer_ids.iter().map(|id| *id.as_uuid()).collect();
        let mut query = details_query!()
            .filter(venues::managing_offerer_id.eq_any(ids))
            .into_boxed();
        if let Some(venue_id) = filter.venue_id {
            query = query.filter(venues::id.eq(*venue_id.as_uuid()));
        }
        if filter.only_digital_venues {
            query = query.filter(venues::is_virtual.eq(true));
        }
        if let Some(offer_id) = filter.offer_id {
            query = query.filter(offers::id.eq(*offer_id.as_uuid()));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(bookings::date_created.ge(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(bookings::date_created.le(to));
        }
        let rows: Vec<DetailsRow> = query
            .order_by(bookings::date_created.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        details_from_rows(rows)
    }

    async fn booked_quantity(&self, stock_id: &StockId) -> Result<i64, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let booked: Option<i64> = bookings::table
            .filter(bookings::stock_id.eq(*stock_id.as_uuid()))
            .filter(bookings::is_cancelled.eq(false))
            .select(sum(bookings::quantity))
            .first(&mut conn)
            .await
            .map_err(|err| map_error(err.into()))?;
        Ok(booked.unwrap_or(0))
    }

    async fn activate(
        &self,
        booking: &Booking,
        deposit: &Deposit,
    ) -> Result<(), BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| map_error(err.into()))?;
        let booking_row = BookingRow::from(booking);
        let deposit_row = DepositRow::from(deposit);
        let outcome = conn
            .transaction(|conn| {
                async move {
                    users::table
                        .find(deposit_row.user_id)
                        .select(users::id)
                        .for_update()
                        .first::<Uuid>(conn)
                        .await?;
                    let has_deposit: bool = diesel::select(exists(
                        deposits::table.filter(deposits::user_id.eq(deposit_row.user_id)),
                    ))
                    .get_result(conn)
                    .await?;
                    if has_deposit {
                        return Ok(ActivationOutcome::AlreadyActivated);
                    }
                    diesel::insert_into(deposits::table)
                        .values(&deposit_row)
                        .execute(conn)
                        .await?;
                    diesel::update(users::table.find(deposit_row.user_id))
                        .set(users::can_book_free_offers.eq(true))
                        .execute(conn)
                        .await?;
                    diesel::update(bookings::table.find(booking_row.id))
                        .set(&booking_row)
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(ActivationOutcome::Activated)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_write_error(err.into(), &booking.token))?;
        match outcome {
            ActivationOutcome::AlreadyActivated => {
                Err(BookingRepositoryError::already_activated())
            }
            ActivationOutcome::Activated => Ok(()),
        }
    }
}
