//! Behaviour of the in-memory store that the services rely on.

use super::*;
use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, BookingService, DepositRepository,
    ManagedActivity, OfferRepository, OffererRepository, UserPersistenceError, UserRepository, VenueRepository,
    VenueRepositoryError,
};
use crate::domain::{
    DomainBookingService, ErrorCode, GLOBAL_FIELD, OVERBOOKING_MESSAGE, RightsType, fixtures,
};
use rstest::{fixture, rstest};

struct Catalogue {
    store: InMemoryStore,
    user: User,
    venue: Venue,
    offer: Offer,
    stock: Stock,
}

#[fixture]
async fn catalogue() -> Catalogue {
    let store = InMemoryStore::new();
    let user = fixtures::user("jeune@example.com");
    let offerer = fixtures::offerer();
    let venue = fixtures::venue(offerer.id);
    let offer = fixtures::thing_offer(&venue);
    let stock = fixtures::stock(&offer, 10, Some(2));
    {
        let mut tables = store.tables().lock().await;
        tables.users.insert(user.id, user.clone());
        tables.offerers.insert(offerer.id, offerer);
        tables.venues.insert(venue.id, venue.clone());
        tables.offers.insert(offer.id, offer.clone());
        tables.stocks.insert(stock.id, stock.clone());
    }
    Catalogue {
        store,
        user,
        venue,
        offer,
        stock,
    }
}

fn booking_with_token(catalogue: &Catalogue, token: &str, quantity: i32) -> Booking {
    let mut booking = fixtures::booking(&catalogue.user, &catalogue.stock, quantity);
    booking.token = token.to_owned();
    booking
}

#[rstest]
#[tokio::test]
async fn inserts_beyond_available_quantity_are_refused(#[future] catalogue: Catalogue) {
    let catalogue = catalogue.await;
    let first = booking_with_token(&catalogue, "AAAAAA", 2);
    BookingRepository::insert(&catalogue.store, &first)
        .await
        .expect("first booking fits");

    let second = booking_with_token(&catalogue, "BBBBBB", 1);
    let error = BookingRepository::insert(&catalogue.store, &second)
        .await
        .expect_err("stock exhausted");
    assert_eq!(error, BookingRepositoryError::Overbooked);
}

#[rstest]
#[tokio::test]
async fn cancelled_bookings_release_their_places(#[future] catalogue: Catalogue) {
    let catalogue = catalogue.await;
    let mut first = booking_with_token(&catalogue, "AAAAAA", 2);
    BookingRepository::insert(&catalogue.store, &first)
        .await
        .expect("insert");
    first.is_cancelled = true;
    BookingRepository::update(&catalogue.store, &first)
        .await
        .expect("cancel");

    let booked = catalogue
        .store
        .booked_quantity(&catalogue.stock.id)
        .await
        .expect("count");
    assert_eq!(booked, 0);
    let second = booking_with_token(&catalogue, "BBBBBB", 2);
    BookingRepository::insert(&catalogue.store, &second)
        .await
        .expect("places were released");
}

#[rstest]
#[tokio::test]
async fn duplicate_tokens_are_reported(#[future] catalogue: Catalogue) {
    let catalogue = catalogue.await;
    let first = booking_with_token(&catalogue, "AAAAAA", 1);
    BookingRepository::insert(&catalogue.store, &first)
        .await
        .expect("insert");
    let clash = booking_with_token(&catalogue, "AAAAAA", 1);
    let error = BookingRepository::insert(&catalogue.store, &clash)
        .await
        .expect_err("token clash");
    assert_eq!(error, BookingRepositoryError::duplicate_token("AAAAAA"));
}

#[rstest]
#[tokio::test]
async fn activation_credits_and_uses_in_one_step(#[future] catalogue: Catalogue) {
    let catalogue = catalogue.await;
    let mut user = catalogue.user.clone();
    user.can_book_free_offers = false;
    catalogue.store.seed_user(user.clone()).await;
    let mut booking = booking_with_token(&catalogue, "ACTIVE", 1);
    BookingRepository::insert(&catalogue.store, &booking)
        .await
        .expect("insert");

    booking.is_used = true;
    booking.date_used = Some(fixtures::now());
    let deposit = Deposit::activation(user.id, fixtures::now());
    catalogue
        .store
        .activate(&booking, &deposit)
        .await
        .expect("activation");

    let stored = catalogue.store.user(&user.id).await.expect("user");
    assert!(stored.can_book_free_offers);
    let stored_booking = catalogue.store.booking(&booking.id).await.expect("booking");
    assert!(stored_booking.is_used);
    let deposits = DepositRepository::list_for_user(&catalogue.store, &user.id)
        .await
        .expect("deposits");
    assert_eq!(deposits, vec![deposit]);
}

#[rstest]
#[tokio::test]
async fn second_activation_of_an_account_is_refused(#[future] catalogue: Catalogue) {
    let catalogue = catalogue.await;
    let user = catalogue.user.clone();
    let mut first = booking_with_token(&catalogue, "FIRST1", 1);
    let mut second = booking_with_token(&catalogue, "SECND2", 1);
    for booking in [&first, &second] {
        BookingRepository::insert(&catalogue.store, booking)
            .await
            .expect("insert");
    }

    first.is_used = true;
    second.is_used = true;
    let deposit = Deposit::activation(user.id, fixtures::now());
    catalogue
        .store
        .activate(&first, &deposit)
        .await
        .expect("first activation");
    let error = catalogue
        .store
        .activate(&second, &Deposit::activation(user.id, fixtures::now()))
        .await
        .expect_err("second activation");

    assert_eq!(error, BookingRepositoryError::AlreadyActivated);
    let deposits = DepositRepository::list_for_user(&catalogue.store, &user.id)
        .await
        .expect("deposits");
    assert_eq!(deposits, vec![deposit]);
    let untouched = catalogue.store.booking(&second.id).await.expect("booking");
    assert!(!untouched.is_used);
}

#[rstest]
#[tokio::test]
async fn venues_with_stocks_cannot_be_deleted(#[future] catalogue: Catalogue) {
    let catalogue = catalogue.await;
    let error = catalogue
        .store
        .delete_with_offers(&catalogue.venue.id)
        .await
        .expect_err("stock present");
    assert_eq!(error, VenueRepositoryError::HasStocks);

    catalogue.store.tables().lock().await.stocks.clear();
    let deleted = catalogue
        .store
        .delete_with_offers(&catalogue.venue.id)
        .await
        .expect("deleted");
    assert!(deleted);
    assert!(
        catalogue
            .store
            .find_offer(&catalogue.offer.id)
            .await
            .expect("lookup")
            .is_none()
    );
    let again = catalogue
        .store
        .delete_with_offers(&catalogue.venue.id)
        .await
        .expect("lookup");
    assert!(!again);
}

#[rstest]
#[case("93", true)]
#[case("75", false)]
#[tokio::test]
async fn visible_offers_follow_departements(
    #[future] catalogue: Catalogue,
    #[case] code: &str,
    #[case] visible: bool,
) {
    let catalogue = catalogue.await;
    let offers = catalogue
        .store
        .list_visible(&[code.to_owned()])
        .await
        .expect("offers");
    assert_eq!(offers.iter().any(|offer| offer.id == catalogue.offer.id), visible);
}

#[rstest]
#[tokio::test]
async fn digital_offers_are_visible_everywhere(#[future] catalogue: Catalogue) {
    let catalogue = catalogue.await;
    let mut digital = fixtures::thing_offer(&catalogue.venue);
    digital.url = Some("https://ebook.example.com".into());
    catalogue
        .store
        .insert_offer(&digital)
        .await
        .expect("insert");

    let offers = catalogue
        .store
        .list_visible(&["75".to_owned()])
        .await
        .expect("offers");
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].id, digital.id);
}

#[tokio::test]
async fn duplicate_emails_are_refused() {
    let store = InMemoryStore::new();
    let user = fixtures::user("jeune@example.com");
    UserRepository::insert(&store, &user).await.expect("insert");
    let twin = fixtures::user("JEUNE@example.com ");
    let error = UserRepository::insert(&store, &twin)
        .await
        .expect_err("same e-mail");
    assert_eq!(error, UserPersistenceError::duplicate_email("jeune@example.com"));
}

#[rstest]
#[tokio::test]
async fn managed_activity_reflects_linked_offerers(#[future] catalogue: Catalogue) {
    let catalogue = catalogue.await;
    let before = catalogue
        .store
        .managed_activity(&catalogue.user.id)
        .await
        .expect("activity");
    assert_eq!(before, ManagedActivity::default());

    let link = fixtures::link(
        &catalogue.user,
        catalogue.venue.managing_offerer_id,
        RightsType::Editor,
    );
    catalogue.store.insert_link(&link).await.expect("link");
    let after = catalogue
        .store
        .managed_activity(&catalogue.user.id)
        .await
        .expect("activity");
    assert!(after.has_physical_venues);
    assert!(after.has_offers);
}

#[rstest]
#[tokio::test]
async fn booking_service_reports_overbooking_from_the_store(#[future] catalogue: Catalogue) {
    let catalogue = catalogue.await;
    catalogue
        .store
        .seed_deposit(Deposit::activation(catalogue.user.id, fixtures::now()))
        .await;
    let service = DomainBookingService::new(catalogue.store.ports(), fixtures::fixture_clock());
    service
        .create(&catalogue.user.id, &catalogue.stock.id, 2)
        .await
        .expect("two places left");

    let error = service
        .create(&catalogue.user.id, &catalogue.stock.id, 1)
        .await
        .expect_err("no place left");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.messages(GLOBAL_FIELD), [OVERBOOKING_MESSAGE]);
}
