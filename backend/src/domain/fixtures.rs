//! Builders shared by domain and service tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::ports::{
    MockBookingRepository, MockDepositRepository, MockOfferRepository, MockOffererRepository,
    MockPaymentRepository, MockUserRepository, MockVenueRepository,
};
use crate::domain::{
    Booking, BookingDetails, BookingId, Email, Offer, OfferId, Offerer, OffererId, ProductType,
    RepositoryPorts, RightsType, Siren, Stock, StockId, ThingType, User, UserId, UserOfferer,
    UserOffererId, Venue, VenueId,
};

/// Fixed instant used as "now" across tests.
pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 3, 7, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub(crate) fn user(email: &str) -> User {
    User {
        id: UserId::random(),
        email: Email::normalise(email),
        password_hash: String::new(),
        public_name: "Test User".into(),
        departement_code: "93".into(),
        can_book_free_offers: true,
        is_admin: false,
        validation_token: None,
        reset_password_token: None,
        reset_password_token_validity_limit: None,
        date_created: now(),
    }
}

pub(crate) fn admin(email: &str) -> User {
    User {
        is_admin: true,
        can_book_free_offers: false,
        ..user(email)
    }
}

pub(crate) fn offerer() -> Offerer {
    Offerer {
        id: OffererId::random(),
        name: "Test Offerer".into(),
        siren: Siren::from_trusted("123456789".into()),
        address: Some("123 rue de Paris".into()),
        postal_code: "93100".into(),
        city: "Montreuil".into(),
        is_active: true,
        validation_token: None,
        bank_information: None,
        date_created: now(),
    }
}

pub(crate) fn link(user: &User, offerer_id: OffererId, rights: RightsType) -> UserOfferer {
    UserOfferer {
        id: UserOffererId::random(),
        user_id: user.id,
        offerer_id,
        rights,
        validation_token: None,
    }
}

pub(crate) fn venue(offerer_id: OffererId) -> Venue {
    Venue {
        id: VenueId::random(),
        managing_offerer_id: offerer_id,
        name: "La petite librairie".into(),
        public_name: None,
        siret: None,
        comment: Some("pas de siret".into()),
        address: Some("123 rue de Paris".into()),
        postal_code: Some("93100".into()),
        city: Some("Montreuil".into()),
        departement_code: Some("93".into()),
        booking_email: Some("booking@example.net".into()),
        latitude: None,
        longitude: None,
        is_virtual: false,
        validation_token: None,
    }
}

pub(crate) fn offer(venue: &Venue, product_type: ProductType) -> Offer {
    Offer {
        id: OfferId::random(),
        venue_id: venue.id,
        name: "Test Book".into(),
        description: None,
        product_type,
        url: None,
        is_active: true,
        duration_minutes: None,
        date_created: now(),
    }
}

pub(crate) fn thing_offer(venue: &Venue) -> Offer {
    offer(venue, ProductType::Thing(ThingType::LIVRE_EDITION))
}

pub(crate) fn stock(offer: &Offer, price: i64, available: Option<i64>) -> Stock {
    Stock {
        id: StockId::random(),
        offer_id: offer.id,
        price: Decimal::from(price),
        available,
        beginning_datetime: None,
        end_datetime: None,
        booking_limit_datetime: None,
        is_soft_deleted: false,
        date_modified: now(),
    }
}

pub(crate) fn booking(user: &User, stock: &Stock, quantity: i32) -> Booking {
    Booking {
        id: BookingId::random(),
        user_id: user.id,
        stock_id: stock.id,
        token: "ABCDEF".into(),
        quantity,
        amount: stock.price,
        is_cancelled: false,
        is_used: false,
        date_created: now(),
        date_used: None,
    }
}

/// Booking of one place on a fresh stock of `offer`.
pub(crate) fn details(user: &User, venue: &Venue, offer: &Offer, price: i64) -> BookingDetails {
    let stock = stock(offer, price, None);
    BookingDetails {
        booking: booking(user, &stock, 1),
        stock,
        offer: offer.clone(),
        venue: venue.clone(),
        user_email: user.email.clone(),
        user_public_name: user.public_name.clone(),
    }
}

/// Clock frozen at [`now`].
pub(crate) struct FixtureClock {
    pub(crate) utc_now: DateTime<Utc>,
}

impl mockable::Clock for FixtureClock {
    fn local(&self) -> DateTime<chrono::Local> {
        self.utc_now.with_timezone(&chrono::Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn mockable::Clock> {
    Arc::new(FixtureClock { utc_now: now() })
}

/// Mocked driven ports, converted into [`RepositoryPorts`] once configured.
#[derive(Default)]
pub(crate) struct MockPorts {
    pub(crate) users: MockUserRepository,
    pub(crate) offerers: MockOffererRepository,
    pub(crate) venues: MockVenueRepository,
    pub(crate) offers: MockOfferRepository,
    pub(crate) bookings: MockBookingRepository,
    pub(crate) deposits: MockDepositRepository,
    pub(crate) payments: MockPaymentRepository,
}

impl MockPorts {
    pub(crate) fn into_ports(self) -> RepositoryPorts {
        RepositoryPorts {
            users: Arc::new(self.users),
            offerers: Arc::new(self.offerers),
            venues: Arc::new(self.venues),
            offers: Arc::new(self.offers),
            bookings: Arc::new(self.bookings),
            deposits: Arc::new(self.deposits),
            payments: Arc::new(self.payments),
        }
    }

    /// Expect `user` to be loaded as the requester, with `links`.
    pub(crate) fn with_requester(&mut self, user: &User, links: Vec<UserOfferer>) {
        let found = user.clone();
        self.users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        self.offerers
            .expect_links_for_user()
            .returning(move |_| Ok(links.clone()));
    }
}
