//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};

use crate::domain::ports::{
    MockAccountService, MockBookingService, MockOfferService, MockOffererService,
    MockPaymentService, MockVenueService,
};
use crate::domain::{Error, FeatureFlags, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Path of the helper route that signs a user in without credentials.
pub const TEST_SIGN_IN_PATH: &str = "/test/sign-in";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mocked driving ports, turned into [`HttpState`] once configured.
#[derive(Default)]
pub struct MockServices {
    pub accounts: MockAccountService,
    pub offerers: MockOffererService,
    pub venues: MockVenueService,
    pub offers: MockOfferService,
    pub bookings: MockBookingService,
    pub payments: MockPaymentService,
    pub features: FeatureFlags,
}

impl MockServices {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            accounts: Arc::new(self.accounts),
            offerers: Arc::new(self.offerers),
            venues: Arc::new(self.venues),
            offers: Arc::new(self.offers),
            bookings: Arc::new(self.bookings),
            payments: Arc::new(self.payments),
            features: self.features,
        })
    }
}

async fn sign_in(session: SessionContext, path: web::Path<UserId>) -> Result<HttpResponse, Error> {
    session.persist_user(&path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register [`TEST_SIGN_IN_PATH`]`/{id}` on an app under test.
pub fn sign_in_route(cfg: &mut web::ServiceConfig) {
    cfg.route(
        &format!("{TEST_SIGN_IN_PATH}/{{id}}"),
        web::post().to(sign_in),
    );
}

/// Sign `user_id` in through [`sign_in_route`] and return the session cookie.
pub async fn session_cookie_for<S>(app: &S, user_id: UserId) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri(&format!("{TEST_SIGN_IN_PATH}/{user_id}"))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "test sign-in failed");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
