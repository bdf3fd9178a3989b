//! Booking use-cases: reservation, cancellation, counter-mark validation and
//! export.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    BookingExport, BookingExportFilter, BookingRepositoryError, BookingService, BookingView,
};
use crate::domain::service_support::{
    Requester, UNKNOWN_OBJECT_MESSAGE, map_booking_error, map_deposit_error, map_offer_error,
    map_offerer_error,
};
use crate::domain::tokens::random_booking_token;
use crate::domain::{
    Booking, BookingDetails, BookingId, BookingRequestContext, Deposit, Error, Expenses,
    GLOBAL_FIELD, OffererId, RepositoryPorts, StockId, TOKEN_NOT_FOUND_MESSAGE, TokenCheck,
    UserId, ValidationPlan, can_export, check_cancellation, check_new_booking,
    check_token_access, plan_validation, wallet_balance,
};

/// Attempts at drawing a counter-mark that no other booking holds.
const TOKEN_ATTEMPTS: usize = 5;

/// Booking service implementing [`BookingService`].
#[derive(Clone)]
pub struct DomainBookingService {
    ports: RepositoryPorts,
    clock: Arc<dyn Clock>,
}

impl DomainBookingService {
    /// Create a new service over the given ports.
    pub fn new(ports: RepositoryPorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    fn view(&self, details: BookingDetails) -> BookingView {
        let now = self.clock.utc();
        BookingView {
            status_label: details.status_label(now),
            is_user_cancellable: details.is_user_cancellable(now),
            completed_url: details.completed_url(),
            details,
        }
    }

    async fn details_by_token(&self, token: &str) -> Result<BookingDetails, Error> {
        self.ports
            .bookings
            .find_details_by_token(&token.trim().to_uppercase())
            .await
            .map_err(map_booking_error)?
            .ok_or_else(|| Error::not_found(GLOBAL_FIELD, TOKEN_NOT_FOUND_MESSAGE))
    }

    async fn insert_with_fresh_token(&self, mut booking: Booking) -> Result<Booking, Error> {
        for _ in 0..TOKEN_ATTEMPTS {
            match self.ports.bookings.insert(&booking).await {
                Ok(()) => return Ok(booking),
                Err(BookingRepositoryError::DuplicateToken { token }) => {
                    warn!(%token, "booking token collision, drawing another");
                    booking.token = random_booking_token();
                }
                Err(err) => return Err(map_booking_error(err)),
            }
        }
        Err(Error::internal("could not draw a unique booking token"))
    }

    async fn exportable_offerers(&self, requester: &Requester) -> Result<Vec<OffererId>, Error> {
        if requester.user.is_admin {
            let offerers = self
                .ports
                .offerers
                .list_all()
                .await
                .map_err(map_offerer_error)?;
            return Ok(offerers.into_iter().map(|offerer| offerer.id).collect());
        }
        let mut ids: Vec<OffererId> = requester
            .links
            .iter()
            .map(|link| link.offerer_id)
            .filter(|id| can_export(&requester.user, &requester.links, *id))
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[async_trait]
impl BookingService for DomainBookingService {
    async fn create(
        &self,
        requester: &UserId,
        stock_id: &StockId,
        quantity: i32,
    ) -> Result<Booking, Error> {
        let user = self.ports.user(requester).await?;
        let stock = self
            .ports
            .offers
            .find_stock(stock_id)
            .await
            .map_err(map_offer_error)?
            .ok_or_else(|| {
                Error::invalid_request("stockId", "stockId ne correspond à aucun stock")
            })?;
        let offer = self.ports.offer(&stock.offer_id).await?;
        let venue = self.ports.venue(&offer.venue_id).await?;
        let offerer = self.ports.offerer(&venue.managing_offerer_id).await?;

        let deposits = self
            .ports
            .deposits
            .list_for_user(&user.id)
            .await
            .map_err(map_deposit_error)?;
        let history = self
            .ports
            .bookings
            .list_for_user(&user.id)
            .await
            .map_err(map_booking_error)?;
        let booked_quantity = self
            .ports
            .bookings
            .booked_quantity(&stock.id)
            .await
            .map_err(map_booking_error)?;
        let plain: Vec<Booking> = history.iter().map(|d| d.booking.clone()).collect();
        let expenses = Expenses::compute(&history);
        let now = self.clock.utc();

        check_new_booking(&BookingRequestContext {
            user: &user,
            stock: &stock,
            offer: &offer,
            offerer: &offerer,
            quantity,
            booked_quantity,
            wallet_balance: wallet_balance(&deposits, &plain),
            expenses: &expenses,
            now,
        })?;

        let booking = Booking {
            id: BookingId::random(),
            user_id: user.id,
            stock_id: stock.id,
            token: random_booking_token(),
            quantity,
            amount: stock.price,
            is_cancelled: false,
            is_used: false,
            date_created: now,
            date_used: None,
        };
        let booking = self.insert_with_fresh_token(booking).await?;
        info!(booking_id = %booking.id, stock_id = %stock.id, quantity, "booking created");
        Ok(booking)
    }

    async fn list_for_user(&self, requester: &UserId) -> Result<Vec<BookingView>, Error> {
        let user = self.ports.user(requester).await?;
        let bookings = self
            .ports
            .bookings
            .list_for_user(&user.id)
            .await
            .map_err(map_booking_error)?;
        Ok(bookings.into_iter().map(|details| self.view(details)).collect())
    }

    async fn cancel(&self, requester: &UserId, id: &BookingId) -> Result<BookingView, Error> {
        let user = self.ports.user(requester).await?;
        let mut details = self
            .ports
            .bookings
            .find_details_by_id(id)
            .await
            .map_err(map_booking_error)?
            .ok_or_else(|| Error::not_found("bookingId", UNKNOWN_OBJECT_MESSAGE))?;
        check_cancellation(&details, &user, self.clock.utc())?;

        details.booking.is_cancelled = true;
        self.ports
            .bookings
            .update(&details.booking)
            .await
            .map_err(map_booking_error)?;
        info!(booking_id = %details.booking.id, "booking cancelled");
        Ok(self.view(details))
    }

    async fn find_by_token(
        &self,
        requester: &UserId,
        token: &str,
        check: TokenCheck,
    ) -> Result<BookingDetails, Error> {
        let details = self.details_by_token(token).await?;
        let requester = self.ports.requester(requester).await?;
        check_token_access(&details, &check, &requester.user, &requester.links)?;
        Ok(details)
    }

    async fn validate_token(
        &self,
        requester: &UserId,
        token: &str,
        check: TokenCheck,
    ) -> Result<(), Error> {
        let mut details = self.details_by_token(token).await?;
        let requester = self.ports.requester(requester).await?;
        let owner_has_deposit = if details.offer.product_type.is_activation() {
            !self
                .ports
                .deposits
                .list_for_user(&details.booking.user_id)
                .await
                .map_err(map_deposit_error)?
                .is_empty()
        } else {
            false
        };
        let now = self.clock.utc();
        let plan = plan_validation(
            &details,
            &check,
            &requester.user,
            &requester.links,
            owner_has_deposit,
            now,
        )?;

        details.booking.mark_used(now);
        match plan {
            ValidationPlan::MarkUsed => self
                .ports
                .bookings
                .update(&details.booking)
                .await
                .map_err(map_booking_error)?,
            ValidationPlan::Activate => {
                let deposit = Deposit::activation(details.booking.user_id, now);
                self.ports
                    .bookings
                    .activate(&details.booking, &deposit)
                    .await
                    .map_err(map_booking_error)?;
                info!(user_id = %details.booking.user_id, "pass activated");
            }
        }
        info!(booking_id = %details.booking.id, "counter-mark validated");
        Ok(())
    }

    async fn export(
        &self,
        requester: &UserId,
        filter: BookingExportFilter,
    ) -> Result<BookingExport, Error> {
        let requester = self.ports.requester(requester).await?;
        let offerer_ids = self.exportable_offerers(&requester).await?;
        let rows = if offerer_ids.is_empty() {
            Vec::new()
        } else {
            self.ports
                .bookings
                .list_for_offerers(&offerer_ids, &filter)
                .await
                .map_err(map_booking_error)?
        };
        Ok(BookingExport {
            rows,
            generated_at: self.clock.utc(),
        })
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
