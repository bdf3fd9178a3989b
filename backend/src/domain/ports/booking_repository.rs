//! Port for bookings and the wallet movements they trigger.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Booking, BookingDetails, BookingId, Deposit, OfferId, OffererId, StockId, UserId, VenueId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by booking repository adapters.
    pub enum BookingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "booking repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "booking repository query failed: {message}",
        /// The store refused a booking beyond the stock's available quantity.
        Overbooked => "stock has no place left",
        /// The counter-mark clashed with an existing booking.
        DuplicateToken { token: String } => "booking token {token} already exists",
        /// The account already holds a deposit, so it cannot be activated twice.
        AlreadyActivated => "account is already activated",
    }
}

/// Filters of the booking export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingExportFilter {
    pub venue_id: Option<VenueId>,
    pub only_digital_venues: bool,
    pub offer_id: Option<OfferId>,
    /// Inclusive lower bound on the creation date.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the creation date.
    pub date_to: Option<DateTime<Utc>>,
}

impl BookingExportFilter {
    /// Whether `details` passes every filter.
    pub fn matches(&self, details: &BookingDetails) -> bool {
        let created = details.booking.date_created;
        self.venue_id.is_none_or(|id| id == details.venue.id)
            && (!self.only_digital_venues || details.venue.is_virtual)
            && self.offer_id.is_none_or(|id| id == details.offer.id)
            && self.date_from.is_none_or(|from| created >= from)
            && self.date_to.is_none_or(|to| created <= to)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Store a new booking.
    ///
    /// Fails with [`BookingRepositoryError::Overbooked`] when the store
    /// detects the stock is over-booked.
    async fn insert(&self, booking: &Booking) -> Result<(), BookingRepositoryError>;

    /// Overwrite an existing booking.
    async fn update(&self, booking: &Booking) -> Result<(), BookingRepositoryError>;

    /// Booking behind a counter-mark, with its joins.
    async fn find_details_by_token(
        &self,
        token: &str,
    ) -> Result<Option<BookingDetails>, BookingRepositoryError>;

    /// Booking by identifier, with its joins.
    async fn find_details_by_id(
        &self,
        id: &BookingId,
    ) -> Result<Option<BookingDetails>, BookingRepositoryError>;

    /// Every booking of a user, newest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<BookingDetails>, BookingRepositoryError>;

    /// Bookings on venues of the given offerers that pass `filter`.
    async fn list_for_offerers(
        &self,
        offerer_ids: &[OffererId],
        filter: &BookingExportFilter,
    ) -> Result<Vec<BookingDetails>, BookingRepositoryError>;

    /// Places held by non-cancelled bookings on a stock.
    async fn booked_quantity(&self, stock_id: &StockId) -> Result<i64, BookingRepositoryError>;

    /// In one transaction: store `deposit`, allow its user to book free
    /// offers, and store `booking` (already marked used).
    ///
    /// Fails with [`BookingRepositoryError::AlreadyActivated`] when the user
    /// already holds a deposit once the transaction has locked the account.
    async fn activate(
        &self,
        booking: &Booking,
        deposit: &Deposit,
    ) -> Result<(), BookingRepositoryError>;
}
