//! In-process store implementing every repository port.
//!
//! Used when no database URL is configured and by the behaviour tests. All
//! tables sit behind one mutex so each port call is atomic, mirroring the
//! transactions of the PostgreSQL adapters. The no-overbooking rule is
//! re-checked on every booking write, as the database trigger does.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    Booking, BookingDetails, BookingId, Deposit, Mediation, MediationId, Offer, OfferId, Offerer,
    OffererId, Payment, PaymentId, PaymentMessage, RepositoryPorts, Stock, StockId, User, UserId,
    UserOfferer, UserOffererId, Venue, VenueId,
};

mod repositories;

#[derive(Default)]
pub(crate) struct Tables {
    pub users: HashMap<UserId, User>,
    pub offerers: HashMap<OffererId, Offerer>,
    pub links: HashMap<UserOffererId, UserOfferer>,
    pub venues: HashMap<VenueId, Venue>,
    pub offers: HashMap<OfferId, Offer>,
    pub stocks: HashMap<StockId, Stock>,
    pub mediations: HashMap<MediationId, Mediation>,
    pub bookings: HashMap<BookingId, Booking>,
    pub deposits: Vec<Deposit>,
    pub payments: HashMap<PaymentId, Payment>,
    pub messages: HashMap<String, PaymentMessage>,
}

impl Tables {
    /// Places held on `stock_id` by live bookings other than `except`.
    pub(crate) fn booked_quantity(&self, stock_id: &StockId, except: Option<&BookingId>) -> i64 {
        self.bookings
            .values()
            .filter(|booking| booking.stock_id == *stock_id && !booking.is_cancelled)
            .filter(|booking| except != Some(&booking.id))
            .map(|booking| i64::from(booking.quantity))
            .sum()
    }

    /// Whether storing `booking` would exceed its stock.
    pub(crate) fn overbooks(&self, booking: &Booking) -> bool {
        if booking.is_cancelled {
            return false;
        }
        let Some(available) = self
            .stocks
            .get(&booking.stock_id)
            .and_then(|stock| stock.available)
        else {
            return false;
        };
        self.booked_quantity(&booking.stock_id, Some(&booking.id)) + i64::from(booking.quantity)
            > available
    }

    pub(crate) fn details(&self, booking: &Booking) -> Option<BookingDetails> {
        let stock = self.stocks.get(&booking.stock_id)?;
        let offer = self.offers.get(&stock.offer_id)?;
        let venue = self.venues.get(&offer.venue_id)?;
        let user = self.users.get(&booking.user_id)?;
        Some(BookingDetails {
            booking: booking.clone(),
            stock: stock.clone(),
            offer: offer.clone(),
            venue: venue.clone(),
            user_email: user.email.clone(),
            user_public_name: user.public_name.clone(),
        })
    }

    /// Joined bookings matching `keep`, newest first.
    pub(crate) fn details_where<F>(&self, keep: F) -> Vec<BookingDetails>
    where
        F: Fn(&BookingDetails) -> bool,
    {
        let mut found: Vec<BookingDetails> = self
            .bookings
            .values()
            .filter_map(|booking| self.details(booking))
            .filter(|details| keep(details))
            .collect();
        found.sort_by(|a, b| b.booking.date_created.cmp(&a.booking.date_created));
        found
    }

    pub(crate) fn offerer_ids_for(&self, user_id: &UserId) -> Vec<OffererId> {
        self.links
            .values()
            .filter(|link| link.user_id == *user_id)
            .map(|link| link.offerer_id)
            .collect()
    }
}

/// Shared in-memory store; clones see the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every repository port backed by this store.
    pub fn ports(&self) -> RepositoryPorts {
        let store = Arc::new(self.clone());
        RepositoryPorts {
            users: store.clone(),
            offerers: store.clone(),
            venues: store.clone(),
            offers: store.clone(),
            bookings: store.clone(),
            deposits: store.clone(),
            payments: store,
        }
    }

    /// Store a user as-is, bypassing sign-up rules.
    pub async fn seed_user(&self, user: User) {
        self.tables.lock().await.users.insert(user.id, user);
    }

    pub async fn seed_deposit(&self, deposit: Deposit) {
        self.tables.lock().await.deposits.push(deposit);
    }

    pub async fn seed_payment(&self, payment: Payment) {
        self.tables.lock().await.payments.insert(payment.id, payment);
    }

    pub async fn seed_payment_message(&self, message: PaymentMessage) {
        self.tables
            .lock()
            .await
            .messages
            .insert(message.name.clone(), message);
    }

    /// Snapshot of a stored user.
    pub async fn user(&self, id: &UserId) -> Option<User> {
        self.tables.lock().await.users.get(id).cloned()
    }

    /// Snapshot of a stored booking.
    pub async fn booking(&self, id: &BookingId) -> Option<Booking> {
        self.tables.lock().await.bookings.get(id).cloned()
    }

    pub(crate) fn tables(&self) -> &Mutex<Tables> {
        &self.tables
    }
}

#[cfg(test)]
mod tests;
