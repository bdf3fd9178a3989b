//! Tests for venue draft validation.

use super::*;
use crate::domain::Siren;
use chrono::Utc;
use rstest::{fixture, rstest};

#[fixture]
fn offerer() -> Offerer {
    Offerer {
        id: OffererId::random(),
        name: "Test Offerer".into(),
        siren: Siren::from_trusted("302559178".into()),
        address: Some("75 Rue Charles Fourier".into()),
        postal_code: "75013".into(),
        city: "Paris".into(),
        is_active: true,
        validation_token: None,
        bank_information: None,
        date_created: Utc::now(),
    }
}

#[fixture]
fn draft(offerer: Offerer) -> VenueDraft {
    VenueDraft {
        managing_offerer_id: Some(offerer.id),
        name: "Ma venue".into(),
        public_name: Some("Ma venue publique".into()),
        siret: Some("30255917810045".into()),
        address: Some("75 Rue Charles Fourier, 75013 Paris".into()),
        postal_code: Some("75200".into()),
        city: Some("Paris".into()),
        booking_email: Some("toto@btmx.fr".into()),
        latitude: Some(RawCoordinate::Number(48.82387)),
        longitude: Some(RawCoordinate::Number(2.35284)),
        ..VenueDraft::default()
    }
}

#[rstest]
fn venue_with_siret_is_validated(offerer: Offerer, draft: VenueDraft) {
    let venue = draft
        .into_venue(&offerer, false, "TOKEN".into())
        .expect("valid draft");

    assert!(venue.is_validated());
    assert_eq!(venue.departement_code.as_deref(), Some("75"));
    assert_eq!(venue.siret.as_ref().map(Siret::as_str), Some("30255917810045"));
}

#[rstest]
fn venue_with_comment_only_awaits_validation(offerer: Offerer, mut draft: VenueDraft) {
    draft.siret = None;
    draft.comment = Some("Je ne mets pas de SIRET pour une bonne raison".into());

    let venue = draft
        .into_venue(&offerer, false, "TOKEN".into())
        .expect("valid draft");

    assert!(!venue.is_validated());
}

#[rstest]
fn second_virtual_venue_is_refused(offerer: Offerer, mut draft: VenueDraft) {
    draft.is_virtual = true;

    let err = draft
        .into_venue(&offerer, true, "TOKEN".into())
        .expect_err("duplicate virtual venue");

    assert_eq!(
        err.messages("isVirtual"),
        ["Un lieu pour les offres numériques existe déjà pour cette structure"]
    );
}

#[rstest]
fn coordinates_report_range_and_format(offerer: Offerer, mut draft: VenueDraft) {
    draft.latitude = Some(RawCoordinate::Number(-98.82387));
    draft.longitude = Some(RawCoordinate::Text("112°3534".into()));

    let err = draft
        .into_venue(&offerer, false, "TOKEN".into())
        .expect_err("bad coordinates");

    assert_eq!(
        err.messages("latitude"),
        ["La latitude doit être comprise entre -90.0 et +90.0"]
    );
    assert_eq!(err.messages("longitude"), ["Format incorrect"]);
}

#[rstest]
fn coordinates_accept_numeric_text(offerer: Offerer, mut draft: VenueDraft) {
    draft.longitude = Some(RawCoordinate::Text("-179.5".into()));

    let venue = draft
        .into_venue(&offerer, false, "TOKEN".into())
        .expect("valid draft");

    assert_eq!(venue.longitude, Some(-179.5));
}

#[rstest]
fn siret_must_extend_the_offerer_siren(offerer: Offerer, mut draft: VenueDraft) {
    draft.siret = Some("12345678912345".into());

    let err = draft
        .into_venue(&offerer, false, "TOKEN".into())
        .expect_err("foreign siret");

    assert_eq!(
        err.messages("siret"),
        ["Ce code SIRET doit correspondre à un établissement de votre structure"]
    );
}

#[rstest]
fn physical_venue_needs_siret_or_comment(offerer: Offerer, mut draft: VenueDraft) {
    draft.siret = Some("   ".into());

    let err = draft
        .into_venue(&offerer, false, "TOKEN".into())
        .expect_err("neither siret nor comment");

    assert_eq!(
        err.messages("siret"),
        ["Veuillez renseigner soit un siret soit un commentaire"]
    );
}

#[rstest]
#[case("75013", "75")]
#[case("97100", "971")]
#[case("2A004", "2A")]
fn departement_codes(#[case] postal_code: &str, #[case] expected: &str) {
    assert_eq!(departement_code_for(postal_code), expected);
}
