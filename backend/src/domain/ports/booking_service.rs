//! Driving port for bookings: reservation, cancellation, counter-mark
//! validation and export.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::BookingExportFilter;
use crate::domain::{Booking, BookingDetails, BookingId, Error, StockId, TokenCheck, UserId};

/// Booking as listed to its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingView {
    pub details: BookingDetails,
    pub status_label: &'static str,
    pub is_user_cancellable: bool,
    pub completed_url: Option<String>,
}

/// Exportable bookings, stamped with the instant their statuses refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingExport {
    pub rows: Vec<BookingDetails>,
    pub generated_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingService: Send + Sync {
    /// Book `quantity` places on a stock for the requester.
    async fn create(
        &self,
        requester: &UserId,
        stock_id: &StockId,
        quantity: i32,
    ) -> Result<Booking, Error>;

    /// Bookings of the requester, newest first.
    async fn list_for_user(&self, requester: &UserId) -> Result<Vec<BookingView>, Error>;

    /// Cancel a booking owned by the requester (any booking for admins).
    async fn cancel(&self, requester: &UserId, id: &BookingId) -> Result<BookingView, Error>;

    /// Booking behind a counter-mark, without changing it.
    async fn find_by_token(
        &self,
        requester: &UserId,
        token: &str,
        check: TokenCheck,
    ) -> Result<BookingDetails, Error>;

    /// Validate a counter-mark, activating the owner's pass for activation
    /// offers.
    async fn validate_token(
        &self,
        requester: &UserId,
        token: &str,
        check: TokenCheck,
    ) -> Result<(), Error>;

    /// Bookings on the offerers the requester may export.
    async fn export(
        &self,
        requester: &UserId,
        filter: BookingExportFilter,
    ) -> Result<BookingExport, Error>;
}
