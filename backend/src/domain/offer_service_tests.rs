//! Tests for the offer service.

use chrono::Duration;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;

use super::*;
use crate::domain::fixtures::{self, MockPorts};
use crate::domain::{
    ErrorCode, EventType, ProductType, StockLevel, User, Venue, VenueId,
};

struct Scene {
    pro: User,
    venue: Venue,
}

#[fixture]
fn scene() -> Scene {
    let pro = fixtures::user("pro@example.com");
    let venue = fixtures::venue(fixtures::offerer().id);
    Scene { pro, venue }
}

fn make_service(ports: MockPorts) -> DomainOfferService {
    DomainOfferService::new(ports.into_ports(), fixtures::fixture_clock())
}

fn with_editor(ports: &mut MockPorts, scene: &Scene) {
    let links = vec![fixtures::link(
        &scene.pro,
        scene.venue.managing_offerer_id,
        RightsType::Editor,
    )];
    ports.with_requester(&scene.pro, links);
    let venue = scene.venue.clone();
    ports
        .venues
        .expect_find_by_id()
        .returning(move |_| Ok(Some(venue.clone())));
}

fn offer_draft(venue_id: VenueId, type_code: &str) -> OfferDraft {
    OfferDraft {
        venue_id: Some(venue_id),
        name: "Concert".into(),
        type_code: type_code.into(),
        ..OfferDraft::default()
    }
}

#[rstest]
#[tokio::test]
async fn create_offer_stores_known_types(scene: Scene) {
    let mut ports = MockPorts::default();
    with_editor(&mut ports, &scene);
    ports
        .offers
        .expect_insert_offer()
        .times(1)
        .return_once(|_| Ok(()));

    let offer = make_service(ports)
        .create_offer(&scene.pro.id, offer_draft(scene.venue.id, "EventType.MUSIQUE"))
        .await
        .expect("created");

    assert_eq!(offer.product_type, ProductType::Event(EventType::MUSIQUE));
    assert_eq!(offer.date_created, fixtures::now());
}

#[rstest]
#[tokio::test]
async fn create_offer_rejects_unknown_types(scene: Scene) {
    let mut ports = MockPorts::default();
    with_editor(&mut ports, &scene);
    ports.offers.expect_insert_offer().never();

    let err = make_service(ports)
        .create_offer(&scene.pro.id, offer_draft(scene.venue.id, "EventType.NOPE"))
        .await
        .expect_err("unknown type");

    assert_eq!(err.messages("type"), ["Type d'offre inconnu"]);
}

#[rstest]
#[tokio::test]
async fn create_offer_requires_editor_rights(scene: Scene) {
    let mut ports = MockPorts::default();
    ports.with_requester(&scene.pro, Vec::new());
    let venue = scene.venue.clone();
    ports
        .venues
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(venue)));

    let err = make_service(ports)
        .create_offer(&scene.pro.id, offer_draft(scene.venue.id, "ThingType.LIVRE_EDITION"))
        .await
        .expect_err("forbidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn create_stock_requires_event_dates(scene: Scene) {
    let offer = fixtures::offer(&scene.venue, ProductType::Event(EventType::SPECTACLE_VIVANT));
    let offer_id = offer.id;
    let mut ports = MockPorts::default();
    with_editor(&mut ports, &scene);
    ports
        .offers
        .expect_find_offer()
        .return_once(move |_| Ok(Some(offer)));
    ports.offers.expect_insert_stock().never();

    let err = make_service(ports)
        .create_stock(
            &scene.pro.id,
            StockDraft {
                offer_id: Some(offer_id),
                price: Decimal::from(10),
                ..StockDraft::default()
            },
        )
        .await
        .expect_err("missing dates");

    assert_eq!(err.messages("beginningDatetime"), ["Ce paramètre est obligatoire"]);
}

#[rstest]
#[tokio::test]
async fn create_stock_defaults_booking_limit_to_event_start(scene: Scene) {
    let offer = fixtures::offer(&scene.venue, ProductType::Event(EventType::SPECTACLE_VIVANT));
    let offer_id = offer.id;
    let start = fixtures::now() + Duration::days(10);
    let mut ports = MockPorts::default();
    with_editor(&mut ports, &scene);
    ports
        .offers
        .expect_find_offer()
        .return_once(move |_| Ok(Some(offer)));
    ports
        .offers
        .expect_insert_stock()
        .times(1)
        .return_once(|_| Ok(()));

    let stock = make_service(ports)
        .create_stock(
            &scene.pro.id,
            StockDraft {
                offer_id: Some(offer_id),
                price: Decimal::from(10),
                available: Some(50),
                beginning_datetime: Some(start),
                end_datetime: Some(start + Duration::hours(2)),
                booking_limit_datetime: None,
            },
        )
        .await
        .expect("created");

    assert_eq!(stock.booking_limit_datetime, Some(start));
}

#[rstest]
#[tokio::test]
async fn get_offer_reports_remaining_places(scene: Scene) {
    let offer = fixtures::offer(&scene.venue, ProductType::Event(EventType::CINEMA));
    let offer_id = offer.id;
    let full = fixtures::stock(&offer, 5, Some(10));
    let open = fixtures::stock(&offer, 5, Some(10));
    let mut ports = MockPorts::default();
    ports
        .offers
        .expect_find_offer()
        .return_once(move |_| Ok(Some(offer)));
    ports.offers.expect_stock_levels().return_once(move |_| {
        Ok(vec![
            StockLevel {
                stock: full,
                booked: 10,
            },
            StockLevel {
                stock: open,
                booked: 4,
            },
        ])
    });

    let view = make_service(ports)
        .get_offer(&offer_id)
        .await
        .expect("found");

    assert_eq!(view.stock_alert_message, "plus de places pour 1 date");
}

#[tokio::test]
async fn list_offers_uses_department_visibility() {
    let user = fixtures::user("jeune@example.com");
    let user_id = user.id;
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    ports
        .offers
        .expect_list_visible()
        .withf(|departements: &[String]| {
            departements.iter().any(|code| code == "93")
                && departements.iter().any(|code| code == "75")
        })
        .times(1)
        .return_once(|_| Ok(Vec::new()));

    let offers = make_service(ports)
        .list_offers(&user_id)
        .await
        .expect("listed");

    assert!(offers.is_empty());
}

#[rstest]
#[tokio::test]
async fn update_mediation_applies_patch(scene: Scene) {
    let offer = fixtures::thing_offer(&scene.venue);
    let mediation = Mediation {
        id: MediationId::random(),
        offer_id: offer.id,
        author_id: None,
        credit: None,
        thumb_url: None,
        is_active: true,
        date_created: fixtures::now(),
    };
    let mediation_id = mediation.id;
    let mut ports = MockPorts::default();
    with_editor(&mut ports, &scene);
    ports
        .offers
        .expect_find_mediation()
        .return_once(move |_| Ok(Some(mediation)));
    ports
        .offers
        .expect_find_offer()
        .return_once(move |_| Ok(Some(offer)));
    ports
        .offers
        .expect_update_mediation()
        .withf(|mediation| !mediation.is_active)
        .times(1)
        .return_once(|_| Ok(()));

    let updated = make_service(ports)
        .update_mediation(
            &scene.pro.id,
            &mediation_id,
            MediationPatch {
                is_active: Some(false),
                credit: Some("Photo : Jeanne".into()),
            },
        )
        .await
        .expect("updated");

    assert!(!updated.is_active);
    assert_eq!(updated.credit.as_deref(), Some("Photo : Jeanne"));
}
