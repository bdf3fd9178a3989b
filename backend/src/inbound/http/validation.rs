//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper reports failures as field-keyed domain errors so malformed
//! paths, bodies and query strings render like any other validation error.

use std::str::FromStr;

use actix_web::web;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::{Error, ErrorCode, ErrorCollector, GLOBAL_FIELD, UNKNOWN_OBJECT_MESSAGE};

/// Message for a mandatory field left out of a request.
pub(crate) const REQUIRED_MESSAGE: &str = "Ce paramètre est obligatoire";
/// Message for a value that cannot be parsed.
pub(crate) const INVALID_FORMAT_MESSAGE: &str = "Format incorrect";
/// Message for a key a PATCH body may not touch.
pub(crate) const NOT_EDITABLE_MESSAGE: &str = "Vous ne pouvez pas modifier ce champ";

/// Parse an identifier taken from the URL path.
///
/// A malformed identifier cannot match any row, so it is reported as 404.
pub(crate) fn parse_path_id<T: FromStr>(raw: &str) -> Result<T, Error> {
    raw.parse()
        .map_err(|_| Error::not_found(GLOBAL_FIELD, UNKNOWN_OBJECT_MESSAGE))
}

/// Parse an identifier sent in a body or query string.
pub(crate) fn parse_field_id<T: FromStr>(field: &str, raw: &str) -> Result<T, Error> {
    raw.parse()
        .map_err(|_| Error::invalid_request(field, INVALID_FORMAT_MESSAGE))
}

/// Parse an optional identifier sent in a body or query string.
pub(crate) fn parse_optional_id<T: FromStr>(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<T>, Error> {
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| parse_field_id(field, value))
        .transpose()
}

/// Parse an RFC 3339 timestamp.
pub(crate) fn parse_datetime(field: &str, raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| Error::invalid_request(field, INVALID_FORMAT_MESSAGE))
}

/// Parse an optional RFC 3339 timestamp; blank values count as absent.
pub(crate) fn parse_optional_datetime(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, Error> {
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| parse_datetime(field, value))
        .transpose()
}

/// Take a mandatory value, recording a missing-field error when absent.
pub(crate) fn take_required<T>(
    errors: &mut ErrorCollector,
    field: &str,
    value: Option<T>,
) -> Option<T> {
    if value.is_none() {
        errors.add(field, REQUIRED_MESSAGE);
    }
    value
}

/// Report every key of a PATCH body that is not in `editable`.
pub(crate) fn reject_unknown_keys(body: &Map<String, Value>, editable: &[&str]) -> Result<(), Error> {
    let mut errors = ErrorCollector::new();
    for key in body.keys().filter(|key| !editable.contains(&key.as_str())) {
        errors.add(key.clone(), NOT_EDITABLE_MESSAGE);
    }
    errors.into_result(ErrorCode::InvalidRequest)
}

/// JSON extractor settings rendering parse failures as field-keyed 400s.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|error, _request| {
        Error::invalid_request(GLOBAL_FIELD, format!("Corps de requête invalide : {error}"))
            .into()
    })
}

/// Query extractor settings rendering parse failures as field-keyed 400s.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|error, _request| {
        Error::invalid_request(GLOBAL_FIELD, format!("Paramètres invalides : {error}")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VenueId;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn path_ids_that_do_not_parse_are_not_found() {
        let error = parse_path_id::<VenueId>("AE").expect_err("malformed id");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.messages(GLOBAL_FIELD), [UNKNOWN_OBJECT_MESSAGE]);
    }

    #[test]
    fn field_ids_that_do_not_parse_name_their_field() {
        let error = parse_field_id::<VenueId>("venueId", "nope").expect_err("malformed id");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.messages("venueId"), [INVALID_FORMAT_MESSAGE]);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("  "))]
    fn blank_optional_values_are_absent(#[case] raw: Option<&str>) {
        let id = parse_optional_id::<VenueId>("venueId", raw).expect("blank is absent");
        assert!(id.is_none());
        let date = parse_optional_datetime("dateFrom", raw).expect("blank is absent");
        assert!(date.is_none());
    }

    #[rstest]
    #[case("2018-07-01T10:00:00Z")]
    #[case("2018-07-01T12:00:00+02:00")]
    fn rfc3339_timestamps_are_normalised_to_utc(#[case] raw: &str) {
        let parsed = parse_datetime("dateFrom", raw).expect("valid timestamp");
        assert_eq!(parsed.to_rfc3339(), "2018-07-01T10:00:00+00:00");
    }

    #[test]
    fn malformed_timestamps_are_rejected() {
        let error = parse_datetime("dateTo", "yesterday").expect_err("bad timestamp");
        assert_eq!(error.messages("dateTo"), [INVALID_FORMAT_MESSAGE]);
    }

    #[test]
    fn missing_required_values_are_collected() {
        let mut errors = ErrorCollector::new();
        let present = take_required(&mut errors, "name", Some("Cinéma"));
        let missing: Option<&str> = take_required(&mut errors, "siren", None);

        assert_eq!(present, Some("Cinéma"));
        assert!(missing.is_none());
        let error = errors
            .into_result(ErrorCode::InvalidRequest)
            .expect_err("siren is missing");
        assert_eq!(error.messages("siren"), [REQUIRED_MESSAGE]);
        assert!(error.messages("name").is_empty());
    }

    #[test]
    fn unknown_patch_keys_are_each_reported() {
        let body = json!({"isActive": false, "name": "x", "siren": "1"});
        let Value::Object(map) = body else {
            panic!("object literal");
        };

        let error = reject_unknown_keys(&map, &["isActive"]).expect_err("two keys refused");
        assert_eq!(error.messages("name"), [NOT_EDITABLE_MESSAGE]);
        assert_eq!(error.messages("siren"), [NOT_EDITABLE_MESSAGE]);
        assert!(error.messages("isActive").is_empty());
    }

    #[test]
    fn editable_keys_pass() {
        let Value::Object(map) = json!({"isActive": true}) else {
            panic!("object literal");
        };
        assert!(reject_unknown_keys(&map, &["isActive"]).is_ok());
    }
}
