//! Tests for the offerer service.

use rstest::{fixture, rstest};

use super::*;
use crate::domain::fixtures::{self, MockPorts};
use crate::domain::ports::OffererRepositoryError;
use crate::domain::{INSUFFICIENT_RIGHTS_MESSAGE, User, VIRTUAL_VENUE_NAME};

fn make_service(ports: MockPorts) -> DomainOffererService {
    DomainOffererService::new(ports.into_ports(), fixtures::fixture_clock())
}

#[fixture]
fn pro() -> User {
    let mut user = fixtures::user("pro@example.com");
    user.can_book_free_offers = false;
    user
}

fn draft(siren: &str) -> OffererDraft {
    OffererDraft {
        name: "Librairie du coin".into(),
        siren: siren.into(),
        address: Some("1 rue du Commerce".into()),
        postal_code: "75015".into(),
        city: "Paris".into(),
    }
}

fn expect_view(ports: &mut MockPorts, n_offers: i64) {
    ports
        .offerers
        .expect_count_offers()
        .returning(move |_| Ok(n_offers));
    ports
        .venues
        .expect_list_for_offerer()
        .returning(|_| Ok(Vec::new()));
}

#[rstest]
#[tokio::test]
async fn create_stores_offerer_with_virtual_venue_and_validated_link(pro: User) {
    let mut ports = MockPorts::default();
    ports.with_requester(&pro, Vec::new());
    ports
        .offerers
        .expect_find_by_siren()
        .return_once(|_| Ok(None));
    let user_id = pro.id;
    ports
        .offerers
        .expect_create_with_virtual_venue()
        .withf(move |offerer, venue, link| {
            !offerer.is_validated()
                && venue.is_virtual
                && venue.name == VIRTUAL_VENUE_NAME
                && venue.managing_offerer_id == offerer.id
                && link.user_id == user_id
                && link.rights == RightsType::Editor
                && link.is_validated()
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));
    expect_view(&mut ports, 0);

    let view = make_service(ports)
        .create(&pro.id, draft("123456789"))
        .await
        .expect("created");

    assert!(view.user_has_access);
    assert_eq!(view.offerer.siren.as_str(), "123456789");
}

#[rstest]
#[tokio::test]
async fn create_with_known_siren_only_requests_a_link(pro: User) {
    let existing = fixtures::offerer();
    let existing_id = existing.id;
    let mut ports = MockPorts::default();
    ports.with_requester(&pro, Vec::new());
    ports
        .offerers
        .expect_find_by_siren()
        .return_once(move |_| Ok(Some(existing)));
    ports.offerers.expect_create_with_virtual_venue().never();
    ports
        .offerers
        .expect_insert_link()
        .withf(move |link| link.offerer_id == existing_id && !link.is_validated())
        .times(1)
        .return_once(|_| Ok(()));
    expect_view(&mut ports, 3);

    let view = make_service(ports)
        .create(&pro.id, draft("123456789"))
        .await
        .expect("join requested");

    assert!(!view.user_has_access);
    assert_eq!(view.n_offers, 3);
}

#[rstest]
#[tokio::test]
async fn create_reports_every_invalid_field(pro: User) {
    let mut ports = MockPorts::default();
    ports.with_requester(&pro, Vec::new());
    let mut bad = draft("12AB");
    bad.name = "  ".into();

    let err = make_service(ports)
        .create(&pro.id, bad)
        .await
        .expect_err("invalid draft");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(!err.messages("siren").is_empty());
    assert!(!err.messages("name").is_empty());
}

#[rstest]
#[tokio::test]
async fn get_requires_editor_rights(pro: User) {
    let offerer = fixtures::offerer();
    let id = offerer.id;
    let mut ports = MockPorts::default();
    ports.with_requester(&pro, Vec::new());
    ports
        .offerers
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(offerer)));

    let err = make_service(ports)
        .get(&pro.id, &id)
        .await
        .expect_err("forbidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.messages(GLOBAL_FIELD), [INSUFFICIENT_RIGHTS_MESSAGE]);
}

#[rstest]
#[case(RightsType::Editor, false)]
#[case(RightsType::Admin, true)]
#[tokio::test]
async fn set_active_requires_admin_rights(
    pro: User,
    #[case] rights: RightsType,
    #[case] allowed: bool,
) {
    let offerer = fixtures::offerer();
    let id = offerer.id;
    let mut ports = MockPorts::default();
    ports.with_requester(&pro, vec![fixtures::link(&pro, id, rights)]);
    ports
        .offerers
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(offerer)));
    ports
        .offerers
        .expect_update()
        .withf(|offerer| !offerer.is_active)
        .returning(|_| Ok(()));
    expect_view(&mut ports, 0);

    let result = make_service(ports).set_active(&pro.id, &id, false).await;

    match (allowed, result) {
        (true, Ok(view)) => assert!(!view.offerer.is_active),
        (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Forbidden),
        (true, Err(err)) => panic!("expected success, got {err}"),
        (false, Ok(_)) => panic!("expected refusal"),
    }
}

#[tokio::test]
async fn list_returns_every_offerer_to_admins() {
    let admin = fixtures::admin("admin@example.com");
    let mut ports = MockPorts::default();
    ports.with_requester(&admin, Vec::new());
    ports
        .offerers
        .expect_list_all()
        .return_once(|| Ok(vec![fixtures::offerer(), fixtures::offerer()]));
    ports.offerers.expect_list_for_user().never();
    expect_view(&mut ports, 0);

    let views = make_service(ports).list(&admin.id).await.expect("listed");

    assert_eq!(views.len(), 2);
    assert!(views.iter().all(|view| view.user_has_access));
}

#[rstest]
#[tokio::test]
async fn add_link_rejects_duplicates(pro: User) {
    let offerer = fixtures::offerer();
    let id = offerer.id;
    let target = fixtures::user("other@example.com");
    let target_id = target.id;
    let mut ports = MockPorts::default();
    let found = pro.clone();
    ports.users.expect_find_by_id().returning(move |user_id| {
        if *user_id == found.id {
            Ok(Some(found.clone()))
        } else {
            Ok(Some(target.clone()))
        }
    });
    let links = vec![fixtures::link(&pro, id, RightsType::Admin)];
    ports
        .offerers
        .expect_links_for_user()
        .return_once(move |_| Ok(links));
    ports
        .offerers
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(offerer)));
    ports
        .offerers
        .expect_insert_link()
        .return_once(|_| Err(OffererRepositoryError::duplicate_link()));

    let err = make_service(ports)
        .add_link(
            &pro.id,
            NewUserOfferer {
                user_id: target_id,
                offerer_id: id,
                rights: RightsType::Editor,
            },
        )
        .await
        .expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn validate_link_clears_token() {
    let pro = fixtures::user("pro@example.com");
    let mut link = fixtures::link(&pro, OffererId::random(), RightsType::Editor);
    link.validation_token = Some("LINK".into());
    let mut ports = MockPorts::default();
    ports
        .offerers
        .expect_find_link_by_validation_token()
        .return_once(move |_| Ok(Some(link)));
    ports
        .offerers
        .expect_update_link()
        .withf(|link| link.is_validated())
        .times(1)
        .return_once(|_| Ok(()));

    make_service(ports)
        .validate_link("LINK")
        .await
        .expect("validated");
}

#[tokio::test]
async fn validate_reports_unknown_token() {
    let mut ports = MockPorts::default();
    ports
        .offerers
        .expect_find_by_validation_token()
        .return_once(|_| Ok(None));

    let err = make_service(ports)
        .validate("NOPE")
        .await
        .expect_err("unknown");

    assert_eq!(err.code(), ErrorCode::NotFound);
}
