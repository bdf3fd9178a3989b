//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror the JSON those types render to and live in the
//! inbound adapter layer where framework concerns belong.

use std::collections::BTreeMap;

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::Error`].
///
/// Error bodies map each offending field (or `global`) to its messages. The
/// correlation identifier travels in the `trace-id` response header.
#[derive(ToSchema)]
#[schema(
    as = crate::domain::Error,
    example = json!({"email": ["Un compte lié à cet email existe déjà"]})
)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema(BTreeMap<String, Vec<String>>);

/// OpenAPI schema for [`crate::domain::TransactionStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::TransactionStatus)]
pub enum TransactionStatusSchema {
    #[schema(rename = "PENDING")]
    Pending,
    #[schema(rename = "NOT_PROCESSABLE")]
    NotProcessable,
    #[schema(rename = "SENT")]
    Sent,
    #[schema(rename = "ERROR")]
    Error,
    #[schema(rename = "RETRY")]
    Retry,
    #[schema(rename = "BANNED")]
    Banned,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_schema_has_expected_name() {
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
    }

    #[test]
    fn error_schema_is_a_map_of_message_lists() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert!(
            schema_json.contains("additionalProperties"),
            "error body is keyed by field: {schema_json}"
        );
    }

    #[test]
    fn transaction_status_schema_lists_stored_names() {
        let schema_json = schema_to_json::<TransactionStatusSchema>();
        for status in ["PENDING", "NOT_PROCESSABLE", "SENT", "ERROR", "RETRY", "BANNED"] {
            assert!(schema_json.contains(status), "missing {status}");
        }
    }
}
