//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every handler mounted under `/api/v1` plus the health probes
//! - **Schemas**: request bodies, response DTOs and the wrappers in
//!   [`crate::inbound::http::schemas`] describing domain types
//! - **Security**: Session cookie authentication scheme
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::bookings::BookingRequestBody;
use crate::inbound::http::dto::{
    BookingResponse, ExpenseResponse, ExpensesResponse, FeatureResponse, MediationResponse,
    OfferDetailResponse, OfferResponse, OffererResponse, PaymentMessageResponse, PaymentResponse,
    PaymentStatusResponse, StockLevelResponse, StockResponse, TokenBookingResponse,
    UserBookingResponse, UserOffererResponse, UserProfileResponse, UserResponse, VenueResponse,
};
use crate::inbound::http::offerers::{OffererRequestBody, UserOffererRequestBody};
use crate::inbound::http::offers::{MediationRequestBody, OfferRequestBody, StockRequestBody};
use crate::inbound::http::payments::PaymentStatusRequest;
use crate::inbound::http::schemas::{ErrorSchema, TransactionStatusSchema};
use crate::inbound::http::users::{
    NewPasswordRequest, ResetPasswordRequest, SignInRequest, SignUpRequestBody,
};
use crate::inbound::http::venues::VenueRequestBody;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/users/signin.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "pass Culture backend API",
        description = "Accounts, offerers, venues, offers, bookings and payments of the pass Culture marketplace.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::features::list_features,
        crate::inbound::http::users::sign_in,
        crate::inbound::http::users::sign_out,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::sign_up,
        crate::inbound::http::users::request_password_reset,
        crate::inbound::http::users::reset_password,
        crate::inbound::http::validate::validate_user,
        crate::inbound::http::validate::validate_offerer,
        crate::inbound::http::validate::validate_user_offerer,
        crate::inbound::http::offerers::create_offerer,
        crate::inbound::http::offerers::list_offerers,
        crate::inbound::http::offerers::get_offerer,
        crate::inbound::http::offerers::patch_offerer,
        crate::inbound::http::offerers::list_user_offerers,
        crate::inbound::http::offerers::create_user_offerer,
        crate::inbound::http::venues::create_venue,
        crate::inbound::http::venues::get_venue,
        crate::inbound::http::venues::activate_venue_offers,
        crate::inbound::http::venues::deactivate_venue_offers,
        crate::inbound::http::offers::create_offer,
        crate::inbound::http::offers::list_offers,
        crate::inbound::http::offers::get_offer,
        crate::inbound::http::offers::create_stock,
        crate::inbound::http::offers::create_mediation,
        crate::inbound::http::offers::get_mediation,
        crate::inbound::http::offers::patch_mediation,
        crate::inbound::http::bookings::create_booking,
        crate::inbound::http::bookings::list_bookings,
        crate::inbound::http::bookings::export_bookings,
        crate::inbound::http::bookings::cancel_booking,
        crate::inbound::http::bookings::get_booking_by_token,
        crate::inbound::http::bookings::validate_booking_token,
        crate::inbound::http::payments::list_payments,
        crate::inbound::http::payments::get_payment_message,
        crate::inbound::http::payments::append_payment_status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        TransactionStatusSchema,
        SignInRequest,
        SignUpRequestBody,
        ResetPasswordRequest,
        NewPasswordRequest,
        OffererRequestBody,
        UserOffererRequestBody,
        VenueRequestBody,
        OfferRequestBody,
        StockRequestBody,
        MediationRequestBody,
        BookingRequestBody,
        PaymentStatusRequest,
        UserResponse,
        UserProfileResponse,
        ExpenseResponse,
        ExpensesResponse,
        OffererResponse,
        UserOffererResponse,
        VenueResponse,
        OfferResponse,
        OfferDetailResponse,
        StockResponse,
        StockLevelResponse,
        MediationResponse,
        BookingResponse,
        UserBookingResponse,
        TokenBookingResponse,
        PaymentResponse,
        PaymentStatusResponse,
        PaymentMessageResponse,
        FeatureResponse,
    )),
    tags(
        (name = "users", description = "Accounts, sessions and password resets"),
        (name = "validation", description = "E-mail validation links"),
        (name = "offerers", description = "Offerers and their staff"),
        (name = "venues", description = "Venues run by offerers"),
        (name = "offers", description = "Offers, stocks and mediations"),
        (name = "bookings", description = "Bookings, tokens and exports"),
        (name = "payments", description = "Payment transactions for administrators"),
        (name = "features", description = "Feature toggles of the deployment"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI paths and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/users/signin")]
    #[case("/api/v1/offerers/{id}")]
    #[case("/api/v1/bookings/token/{token}")]
    #[case("/api/v1/payments/{id}/statuses")]
    #[case("/api/v1/features")]
    #[case("/health/ready")]
    fn openapi_registers_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[test]
    fn openapi_user_schema_has_expected_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let user_schema = schemas.get("UserResponse").expect("UserResponse schema");

        assert_object_schema_has_field(user_schema, "email");
        assert_object_schema_has_field(user_schema, "canBookFreeOffers");
    }

    #[test]
    fn openapi_feature_schema_has_expected_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let feature_schema = schemas.get("FeatureResponse").expect("FeatureResponse schema");

        assert_object_schema_has_field(feature_schema, "nameKey");
        assert_object_schema_has_field(feature_schema, "isActive");
    }

    #[test]
    fn openapi_declares_session_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
