//! Port implementations over [`Tables`].

use async_trait::async_trait;

use crate::domain::ports::{
    BookingExportFilter, BookingRepository, BookingRepositoryError, DepositRepository,
    DepositRepositoryError, ManagedActivity, OfferRepository, OfferRepositoryError,
    OffererRepository, OffererRepositoryError, PaymentRepository, PaymentRepositoryError,
    UserPersistenceError, UserRepository, VenueRepository, VenueRepositoryError,
};
use crate::domain::{
    Booking, BookingDetails, BookingId, Deposit, Email, Mediation, MediationId, Offer, OfferId,
    Offerer, OffererId, Payment, PaymentId, PaymentStatus, Stock, StockId, StockLevel,
    TransactionStatus, User, UserId, UserOfferer, Venue, VenueId,
};

use super::InMemoryStore;

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut tables = self.tables().lock().await;
        if tables.users.values().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_str()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut tables = self.tables().lock().await;
        match tables.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(UserPersistenceError::query(format!("no user {}", user.id))),
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.tables().lock().await.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.tables().lock().await;
        Ok(tables.users.values().find(|user| user.email == *email).cloned())
    }

    async fn find_by_validation_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.tables().lock().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.validation_token.as_deref() == Some(token))
            .cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.tables().lock().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.reset_password_token.as_deref() == Some(token))
            .cloned())
    }
}

#[async_trait]
impl OffererRepository for InMemoryStore {
    async fn find_by_id(&self, id: &OffererId) -> Result<Option<Offerer>, OffererRepositoryError> {
        Ok(self.tables().lock().await.offerers.get(id).cloned())
    }

    async fn find_by_siren(&self, siren: &str) -> Result<Option<Offerer>, OffererRepositoryError> {
        let tables = self.tables().lock().await;
        Ok(tables
            .offerers
            .values()
            .find(|offerer| offerer.siren.as_str() == siren)
            .cloned())
    }

    async fn find_by_validation_token(
        &self,
        token: &str,
    ) -> Result<Option<Offerer>, OffererRepositoryError> {
        let tables = self.tables().lock().await;
        Ok(tables
            .offerers
            .values()
            .find(|offerer| offerer.validation_token.as_deref() == Some(token))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Offerer>, OffererRepositoryError> {
        let tables = self.tables().lock().await;
        let mut offerers: Vec<Offerer> = tables.offerers.values().cloned().collect();
        offerers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(offerers)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Offerer>, OffererRepositoryError> {
        let tables = self.tables().lock().await;
        let mut offerers: Vec<Offerer> = tables
            .offerer_ids_for(user_id)
            .iter()
            .filter_map(|id| tables.offerers.get(id).cloned())
            .collect();
        offerers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(offerers)
    }

    async fn create_with_virtual_venue(
        &self,
        offerer: &Offerer,
        venue: &Venue,
        link: &UserOfferer,
    ) -> Result<(), OffererRepositoryError> {
        let mut tables = self.tables().lock().await;
        if tables
            .offerers
            .values()
            .any(|existing| existing.siren == offerer.siren)
        {
            return Err(OffererRepositoryError::duplicate_siren(offerer.siren.as_str()));
        }
        tables.offerers.insert(offerer.id, offerer.clone());
        tables.venues.insert(venue.id, venue.clone());
        tables.links.insert(link.id, link.clone());
        Ok(())
    }

    async fn update(&self, offerer: &Offerer) -> Result<(), OffererRepositoryError> {
        let mut tables = self.tables().lock().await;
        match tables.offerers.get_mut(&offerer.id) {
            Some(stored) => {
                *stored = offerer.clone();
                Ok(())
            }
            None => Err(OffererRepositoryError::query(format!("no offerer {}", offerer.id))),
        }
    }

    async fn count_offers(&self, id: &OffererId) -> Result<i64, OffererRepositoryError> {
        let tables = self.tables().lock().await;
        let count = tables
            .offers
            .values()
            .filter(|offer| {
                tables
                    .venues
                    .get(&offer.venue_id)
                    .is_some_and(|venue| venue.managing_offerer_id == *id)
            })
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn links_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserOfferer>, OffererRepositoryError> {
        let tables = self.tables().lock().await;
        Ok(tables
            .links
            .values()
            .filter(|link| link.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn insert_link(&self, link: &UserOfferer) -> Result<(), OffererRepositoryError> {
        let mut tables = self.tables().lock().await;
        if tables
            .links
            .values()
            .any(|existing| existing.user_id == link.user_id && existing.offerer_id == link.offerer_id)
        {
            return Err(OffererRepositoryError::duplicate_link());
        }
        tables.links.insert(link.id, link.clone());
        Ok(())
    }

    async fn find_link_by_validation_token(
        &self,
        token: &str,
    ) -> Result<Option<UserOfferer>, OffererRepositoryError> {
        let tables = self.tables().lock().await;
        Ok(tables
            .links
            .values()
            .find(|link| link.validation_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update_link(&self, link: &UserOfferer) -> Result<(), OffererRepositoryError> {
        let mut tables = self.tables().lock().await;
        tables.links.insert(link.id, link.clone());
        Ok(())
    }

    async fn managed_activity(
        &self,
        user_id: &UserId,
    ) -> Result<ManagedActivity, OffererRepositoryError> {
        let tables = self.tables().lock().await;
        let offerer_ids = tables.offerer_ids_for(user_id);
        let managed: Vec<&Venue> = tables
            .venues
            .values()
            .filter(|venue| offerer_ids.contains(&venue.managing_offerer_id))
            .collect();
        Ok(ManagedActivity {
            has_physical_venues: managed.iter().any(|venue| !venue.is_virtual),
            has_offers: tables
                .offers
                .values()
                .any(|offer| managed.iter().any(|venue| venue.id == offer.venue_id)),
        })
    }
}

#[async_trait]
impl VenueRepository for InMemoryStore {
    async fn find_by_id(&self, id: &VenueId) -> Result<Option<Venue>, VenueRepositoryError> {
        Ok(self.tables().lock().await.venues.get(id).cloned())
    }

    async fn list_for_offerer(
        &self,
        offerer_id: &OffererId,
    ) -> Result<Vec<Venue>, VenueRepositoryError> {
        let tables = self.tables().lock().await;
        let mut venues: Vec<Venue> = tables
            .venues
            .values()
            .filter(|venue| venue.managing_offerer_id == *offerer_id)
            .cloned()
            .collect();
        venues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(venues)
    }

    async fn insert(&self, venue: &Venue) -> Result<(), VenueRepositoryError> {
        let mut tables = self.tables().lock().await;
        if let Some(siret) = &venue.siret
            && tables
                .venues
                .values()
                .any(|existing| existing.siret.as_ref() == Some(siret))
        {
            return Err(VenueRepositoryError::duplicate_siret(siret.as_str()));
        }
        tables.venues.insert(venue.id, venue.clone());
        Ok(())
    }

    async fn delete_with_offers(&self, id: &VenueId) -> Result<bool, VenueRepositoryError> {
        let mut tables = self.tables().lock().await;
        if !tables.venues.contains_key(id) {
            return Ok(false);
        }
        let offer_ids: Vec<OfferId> = tables
            .offers
            .values()
            .filter(|offer| offer.venue_id == *id)
            .map(|offer| offer.id)
            .collect();
        if tables
            .stocks
            .values()
            .any(|stock| offer_ids.contains(&stock.offer_id))
        {
            return Err(VenueRepositoryError::has_stocks());
        }
        tables
            .mediations
            .retain(|_, mediation| !offer_ids.contains(&mediation.offer_id));
        tables.offers.retain(|_, offer| offer.venue_id != *id);
        tables.venues.remove(id);
        Ok(true)
    }
}

#[async_trait]
impl OfferRepository for InMemoryStore {
    async fn find_offer(&self, id: &OfferId) -> Result<Option<Offer>, OfferRepositoryError> {
        Ok(self.tables().lock().await.offers.get(id).cloned())
    }

    async fn insert_offer(&self, offer: &Offer) -> Result<(), OfferRepositoryError> {
        self.tables().lock().await.offers.insert(offer.id, offer.clone());
        Ok(())
    }

    async fn list_for_venue(&self, venue_id: &VenueId) -> Result<Vec<Offer>, OfferRepositoryError> {
        let tables = self.tables().lock().await;
        let mut offers: Vec<Offer> = tables
            .offers
            .values()
            .filter(|offer| offer.venue_id == *venue_id)
            .cloned()
            .collect();
        offers.sort_by(|a, b| b.date_created.cmp(&a.date_created));
        Ok(offers)
    }

    async fn set_active_for_venue(
        &self,
        venue_id: &VenueId,
        is_active: bool,
    ) -> Result<Vec<Offer>, OfferRepositoryError> {
        let mut tables = self.tables().lock().await;
        let mut updated = Vec::new();
        for offer in tables.offers.values_mut() {
            if offer.venue_id == *venue_id {
                offer.is_active = is_active;
                updated.push(offer.clone());
            }
        }
        updated.sort_by(|a, b| b.date_created.cmp(&a.date_created));
        Ok(updated)
    }

    async fn list_visible(
        &self,
        departement_codes: &[String],
    ) -> Result<Vec<Offer>, OfferRepositoryError> {
        let tables = self.tables().lock().await;
        let mut offers: Vec<Offer> = tables
            .offers
            .values()
            .filter(|offer| offer.is_active)
            .filter(|offer| {
                let Some(venue) = tables.venues.get(&offer.venue_id) else {
                    return false;
                };
                let offerer_active = tables
                    .offerers
                    .get(&venue.managing_offerer_id)
                    .is_some_and(|offerer| offerer.is_active);
                offerer_active
                    && (offer.url.is_some()
                        || venue
                            .departement_code
                            .as_ref()
                            .is_some_and(|code| departement_codes.contains(code)))
            })
            .cloned()
            .collect();
        offers.sort_by(|a, b| b.date_created.cmp(&a.date_created));
        Ok(offers)
    }

    async fn find_stock(&self, id: &StockId) -> Result<Option<Stock>, OfferRepositoryError> {
        Ok(self.tables().lock().await.stocks.get(id).cloned())
    }

    async fn insert_stock(&self, stock: &Stock) -> Result<(), OfferRepositoryError> {
        self.tables().lock().await.stocks.insert(stock.id, stock.clone());
        Ok(())
    }

    async fn stock_levels(
        &self,
        offer_id: &OfferId,
    ) -> Result<Vec<StockLevel>, OfferRepositoryError> {
        let tables = self.tables().lock().await;
        let mut levels: Vec<StockLevel> = tables
            .stocks
            .values()
            .filter(|stock| stock.offer_id == *offer_id)
            .map(|stock| StockLevel {
                booked: tables.booked_quantity(&stock.id, None),
                stock: stock.clone(),
            })
            .collect();
        levels.sort_by_key(|level| (level.stock.beginning_datetime, level.stock.date_modified));
        Ok(levels)
    }

    async fn find_mediation(
        &self,
        id: &MediationId,
    ) -> Result<Option<Mediation>, OfferRepositoryError> {
        Ok(self.tables().lock().await.mediations.get(id).cloned())
    }

    async fn insert_mediation(&self, mediation: &Mediation) -> Result<(), OfferRepositoryError> {
        self.tables()
            .lock()
            .await
            .mediations
            .insert(mediation.id, mediation.clone());
        Ok(())
    }

    async fn update_mediation(&self, mediation: &Mediation) -> Result<(), OfferRepositoryError> {
        self.insert_mediation(mediation).await
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut tables = self.tables().lock().await;
        if tables
            .bookings
            .values()
            .any(|existing| existing.token == booking.token)
        {
            return Err(BookingRepositoryError::duplicate_token(booking.token.as_str()));
        }
        if tables.overbooks(booking) {
            return Err(BookingRepositoryError::overbooked());
        }
        tables.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn update(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut tables = self.tables().lock().await;
        if !tables.bookings.contains_key(&booking.id) {
            return Err(BookingRepositoryError::query(format!("no booking {}", booking.id)));
        }
        if tables.overbooks(booking) {
            return Err(BookingRepositoryError::overbooked());
        }
        tables.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find_details_by_token(
        &self,
        token: &str,
    ) -> Result<Option<BookingDetails>, BookingRepositoryError> {
        let tables = self.tables().lock().await;
        Ok(tables
            .bookings
            .values()
            .find(|booking| booking.token == token)
            .and_then(|booking| tables.details(booking)))
    }

    async fn find_details_by_id(
        &self,
        id: &BookingId,
    ) -> Result<Option<BookingDetails>, BookingRepositoryError> {
        let tables = self.tables().lock().await;
        Ok(tables.bookings.get(id).and_then(|booking| tables.details(booking)))
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<BookingDetails>, BookingRepositoryError> {
        let tables = self.tables().lock().await;
        Ok(tables.details_where(|details| details.booking.user_id == *user_id))
    }

    async fn list_for_offerers(
        &self,
        offerer_ids: &[OffererId],
        filter: &BookingExportFilter,
    ) -> Result<Vec<BookingDetails>, BookingRepositoryError> {
        let tables = self.tables().lock().await;
        Ok(tables.details_where(|details| {
            offerer_ids.contains(&details.venue.managing_offerer_id) && filter.matches(details)
        }))
    }

    async fn booked_quantity(&self, stock_id: &StockId) -> Result<i64, BookingRepositoryError> {
        Ok(self.tables().lock().await.booked_quantity(stock_id, None))
    }

    async fn activate(
        &self,
        booking: &Booking,
        deposit: &Deposit,
    ) -> Result<(), BookingRepositoryError> {
        let mut tables = self.tables().lock().await;
        if !tables.bookings.contains_key(&booking.id) {
            return Err(BookingRepositoryError::query(format!("no booking {}", booking.id)));
        }
        if tables.deposits.iter().any(|held| held.user_id == deposit.user_id) {
            return Err(BookingRepositoryError::already_activated());
        }
        let Some(user) = tables.users.get_mut(&deposit.user_id) else {
            return Err(BookingRepositoryError::query(format!("no user {}", deposit.user_id)));
        };
        user.can_book_free_offers = true;
        tables.deposits.push(deposit.clone());
        tables.bookings.insert(booking.id, booking.clone());
        Ok(())
    }
}

#[async_trait]
impl DepositRepository for InMemoryStore {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Deposit>, DepositRepositoryError> {
        let tables = self.tables().lock().await;
        Ok(tables
            .deposits
            .iter()
            .filter(|deposit| deposit.user_id == *user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, PaymentRepositoryError> {
        Ok(self.tables().lock().await.payments.get(id).cloned())
    }

    async fn find_with_last_status(
        &self,
        status: TransactionStatus,
    ) -> Result<Vec<Payment>, PaymentRepositoryError> {
        let tables = self.tables().lock().await;
        Ok(tables
            .payments
            .values()
            .filter(|payment| payment.has_last_status(status))
            .cloned()
            .collect())
    }

    async fn find_by_message(&self, name: &str) -> Result<Vec<Payment>, PaymentRepositoryError> {
        let tables = self.tables().lock().await;
        Ok(tables
            .payments
            .values()
            .filter(|payment| payment.payment_message_name.as_deref() == Some(name))
            .cloned()
            .collect())
    }

    async fn find_message_checksum(
        &self,
        name: &str,
    ) -> Result<Option<String>, PaymentRepositoryError> {
        let tables = self.tables().lock().await;
        Ok(tables
            .messages
            .get(name)
            .map(|message| message.checksum.clone()))
    }

    async fn append_status(
        &self,
        id: &PaymentId,
        status: &PaymentStatus,
    ) -> Result<(), PaymentRepositoryError> {
        let mut tables = self.tables().lock().await;
        match tables.payments.get_mut(id) {
            Some(payment) => {
                payment.statuses.push(status.clone());
                Ok(())
            }
            None => Err(PaymentRepositoryError::query(format!("no payment {id}"))),
        }
    }
}
