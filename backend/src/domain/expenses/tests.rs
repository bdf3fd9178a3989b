//! Tests for expense totals and cap enforcement.

use super::*;
use crate::domain::fixtures;
use crate::domain::{EventType, ProductType, Venue};
use rstest::{fixture, rstest};

#[fixture]
fn venue() -> Venue {
    fixtures::venue(fixtures::offerer().id)
}

fn offer_of(venue: &Venue, product_type: ProductType, digital: bool) -> Offer {
    let mut offer = fixtures::offer(venue, product_type);
    if digital {
        offer.url = Some("https://example.net".into());
    }
    offer
}

#[rstest]
fn no_bookings_means_no_spend() {
    let expenses = Expenses::compute(&[]);
    assert_eq!(expenses.all.max, Decimal::from(500));
    assert_eq!(expenses.physical.max, Decimal::from(200));
    assert_eq!(expenses.digital.max, Decimal::from(200));
    assert_eq!(expenses.all.actual, Decimal::ZERO);
}

#[rstest]
#[case(ThingType::AUDIOVISUEL, false, true, false)]
#[case(ThingType::INSTRUMENT, false, true, false)]
#[case(ThingType::LIVRE_EDITION, true, true, false)]
#[case(ThingType::AUDIOVISUEL, true, false, true)]
#[case(ThingType::PRESSE_ABO, true, false, true)]
#[case(ThingType::JEUX_VIDEO, false, false, false)]
#[case(ThingType::OEUVRE_ART, false, false, false)]
fn capping_eligibility(
    venue: Venue,
    #[case] thing: ThingType,
    #[case] digital: bool,
    #[case] physical_capped: bool,
    #[case] digital_capped: bool,
) {
    let offer = offer_of(&venue, ProductType::Thing(thing), digital);
    assert_eq!(is_physically_capped(&offer), physical_capped);
    assert_eq!(is_digitally_capped(&offer), digital_capped);
}

#[rstest]
fn events_are_never_capped(venue: Venue) {
    let offer = offer_of(&venue, ProductType::Event(EventType::CINEMA), false);
    assert!(!is_physically_capped(&offer));
    assert!(!is_digitally_capped(&offer));
}

#[rstest]
fn cancelled_bookings_are_excluded(venue: Venue) {
    let user = fixtures::user("jeune@example.com");
    let book = offer_of(&venue, ProductType::Thing(ThingType::LIVRE_EDITION), false);
    let kept = fixtures::details(&user, &venue, &book, 50);
    let mut cancelled = fixtures::details(&user, &venue, &book, 40);
    cancelled.booking.is_cancelled = true;

    let expenses = Expenses::compute(&[kept, cancelled]);

    assert_eq!(expenses.all.actual, Decimal::from(50));
    assert_eq!(expenses.physical.actual, Decimal::from(50));
    assert_eq!(expenses.digital.actual, Decimal::ZERO);
}

#[rstest]
fn totals_multiply_by_quantity(venue: Venue) {
    let user = fixtures::user("jeune@example.com");
    let music = offer_of(&venue, ProductType::Thing(ThingType::MUSIQUE), true);
    let mut details = fixtures::details(&user, &venue, &music, 15);
    details.booking.quantity = 2;

    let expenses = Expenses::compute(&[details]);

    assert_eq!(expenses.all.actual, Decimal::from(30));
    assert_eq!(expenses.digital.actual, Decimal::from(30));
}

#[rstest]
fn physical_cap_refuses_overspend(venue: Venue) {
    let user = fixtures::user("jeune@example.com");
    let book = offer_of(&venue, ProductType::Thing(ThingType::LIVRE_EDITION), false);
    let expenses = Expenses::compute(&[fixtures::details(&user, &venue, &book, 190)]);

    let err = expenses
        .check_new_spend(&book, Decimal::from(11))
        .expect_err("cap exceeded");

    assert_eq!(
        err.messages(GLOBAL_FIELD),
        ["Le plafond de 200 € pour les biens culturels ne vous permet pas de réserver cette offre."]
    );
    assert!(expenses.check_new_spend(&book, Decimal::from(10)).is_ok());
}

#[rstest]
fn digital_cap_refuses_overspend(venue: Venue) {
    let user = fixtures::user("jeune@example.com");
    let press = offer_of(&venue, ProductType::Thing(ThingType::PRESSE_ABO), true);
    let expenses = Expenses::compute(&[fixtures::details(&user, &venue, &press, 200)]);

    let err = expenses
        .check_new_spend(&press, Decimal::from(1))
        .expect_err("cap exceeded");

    assert_eq!(
        err.messages(GLOBAL_FIELD),
        ["Le plafond de 200 € pour les offres numériques ne vous permet pas de réserver cette offre."]
    );
}

#[rstest]
fn overflowing_spend_is_refused(venue: Venue) {
    let user = fixtures::user("jeune@example.com");
    let book = offer_of(&venue, ProductType::Thing(ThingType::LIVRE_EDITION), false);
    let mut huge = fixtures::details(&user, &venue, &book, 1);
    huge.booking.amount = Decimal::MAX;
    huge.booking.quantity = 2;

    let expenses = Expenses::compute(&[huge]);

    assert_eq!(expenses.all.actual, Decimal::MAX);
    assert!(expenses.check_new_spend(&book, Decimal::from(1)).is_err());
}
