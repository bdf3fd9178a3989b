//! Live server harness and shared world for marketplace behaviour tests.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The server runs the real application
//! over an in-memory store seeded with a small catalogue; the `WorldFixture`
//! stops it even if a test panics.

use std::cell::RefCell;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{HttpServer, web};
use awc::Client;
use chrono::Utc;
use mockable::DefaultClock;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use backend::domain::{
    Booking, BookingId, Deposit, Email, Offer, OfferId, Offerer, OffererId, ProductType,
    RepositoryPorts, RightsType, Siren, Siret, Stock, StockId, TRACE_ID_HEADER, ThingType, User,
    UserId, UserOfferer, UserOffererId, Venue, VenueId, hash_password,
};
use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::HttpState;
use backend::inbound::http::{AppDependencies, build_app};
use backend::outbound::memory::InMemoryStore;

pub(crate) const PASSWORD: &str = "User@1234567";
pub(crate) const ADMIN_EMAIL: &str = "admin@passculture.app";
pub(crate) const YOUNG_EMAIL: &str = "jeune@example.com";
pub(crate) const ACTIVATED_EMAIL: &str = "active@example.com";
pub(crate) const BOOK_PRICE: i64 = 30;

/// Identifiers of the seeded catalogue.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Catalogue {
    pub(crate) activation_stock: StockId,
    pub(crate) book_stock: StockId,
    pub(crate) book_offer: OfferId,
}

/// Last HTTP exchange seen by the client.
#[derive(Debug, Default)]
pub(crate) struct Exchange {
    pub(crate) status: Option<u16>,
    pub(crate) body: Option<Value>,
    pub(crate) trace_id: Option<String>,
}

pub(crate) struct MarketplaceWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) ports: RepositoryPorts,
    pub(crate) catalogue: Catalogue,
    pub(crate) session_cookie: Option<String>,
    pub(crate) last: Exchange,
    pub(crate) booking_token: Option<String>,
    pub(crate) booking_id: Option<String>,
}

pub(crate) type SharedWorld = Rc<RefCell<MarketplaceWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        shutdown(self.world.clone());
    }
}

pub(crate) fn shutdown(world: SharedWorld) {
    // `LocalSet` must be driven on the thread that owns it, so we lock the world
    // while calling `block_on`. The future must not try to lock the world.
    let ctx = world.borrow();
    let server = ctx.server.clone();
    ctx.local.block_on(&ctx.runtime, async move {
        server.stop(true).await;
    });
}

pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

/// Run `operation` against the store behind the running server.
pub(crate) fn with_ports<R, F>(world: &SharedWorld, operation: impl FnOnce(RepositoryPorts) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let ports = ctx.ports.clone();
    ctx.local.block_on(&ctx.runtime, operation(ports))
}

/// Send a JSON request, forwarding the stored session cookie, and record the
/// response. A `Set-Cookie` header replaces the stored cookie.
pub(crate) fn send(world: &SharedWorld, method: Method, path: &str, payload: Option<Value>) {
    let cookie = world.borrow().session_cookie.clone();
    let path = path.to_owned();
    let (exchange, set_cookie) = with_world_async(world, |base_url| async move {
        let mut request = Client::default().request(method, format!("{base_url}{path}"));
        if let Some(cookie) = cookie {
            request = request.insert_header((header::COOKIE, cookie));
        }
        let mut response = match payload {
            Some(payload) => request.send_json(&payload).await.expect("request sent"),
            None => request.send().await.expect("request sent"),
        };
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_owned);
        let trace_id = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let status = response.status().as_u16();
        let bytes = response.body().await.expect("response body");
        let body = serde_json::from_slice(&bytes).ok();
        (
            Exchange {
                status: Some(status),
                body,
                trace_id,
            },
            set_cookie,
        )
    });

    let mut ctx = world.borrow_mut();
    if set_cookie.is_some() {
        ctx.session_cookie = set_cookie;
    }
    ctx.last = exchange;
}

/// Sign in through the API, keeping the session cookie.
pub(crate) fn sign_in(world: &SharedWorld, email: &str) {
    world.borrow_mut().session_cookie = None;
    send(
        world,
        Method::POST,
        "/api/v1/users/signin",
        Some(serde_json::json!({ "identifier": email, "password": PASSWORD })),
    );
}

fn account(email: &str, is_admin: bool) -> User {
    User {
        id: UserId::random(),
        email: Email::normalise(email),
        password_hash: hash_password(PASSWORD).expect("password hashes"),
        public_name: email.split('@').next().unwrap_or(email).to_owned(),
        departement_code: "93".into(),
        can_book_free_offers: false,
        is_admin,
        validation_token: None,
        reset_password_token: None,
        reset_password_token_validity_limit: None,
        date_created: Utc::now(),
    }
}

fn offer(venue_id: VenueId, name: &str, product_type: ProductType) -> Offer {
    Offer {
        id: OfferId::random(),
        venue_id,
        name: name.to_owned(),
        description: None,
        product_type,
        url: None,
        is_active: true,
        duration_minutes: None,
        date_created: Utc::now(),
    }
}

fn stock(offer_id: OfferId, price: i64, available: Option<i64>) -> Stock {
    Stock {
        id: StockId::random(),
        offer_id,
        price: Decimal::from(price),
        available,
        beginning_datetime: None,
        end_datetime: None,
        booking_limit_datetime: None,
        is_soft_deleted: false,
        date_modified: Utc::now(),
    }
}

/// Seed an administrator, two young users (one already activated), an
/// offerer with a physical venue, an activation offer and a single book.
async fn seed(ports: &RepositoryPorts) -> Catalogue {
    let admin = account(ADMIN_EMAIL, true);
    let young = account(YOUNG_EMAIL, false);
    let activated = account(ACTIVATED_EMAIL, false);
    for user in [&admin, &young, &activated] {
        ports.users.insert(user).await.expect("user seeded");
    }

    let offerer = Offerer {
        id: OffererId::random(),
        name: "Librairie du Parc".into(),
        siren: Siren::from_trusted("123456789".into()),
        address: Some("1 rue du Parc".into()),
        postal_code: "93100".into(),
        city: "Montreuil".into(),
        is_active: true,
        validation_token: None,
        bank_information: None,
        date_created: Utc::now(),
    };
    let link = UserOfferer {
        id: UserOffererId::random(),
        user_id: admin.id,
        offerer_id: offerer.id,
        rights: RightsType::Admin,
        validation_token: None,
    };
    ports
        .offerers
        .create_with_virtual_venue(&offerer, &Venue::virtual_for(offerer.id), &link)
        .await
        .expect("offerer seeded");

    let mut venue = Venue::virtual_for(offerer.id);
    venue.id = VenueId::random();
    venue.name = "Librairie du Parc, Montreuil".into();
    venue.is_virtual = false;
    venue.address = Some("1 rue du Parc".into());
    venue.postal_code = Some("93100".into());
    venue.city = Some("Montreuil".into());
    venue.departement_code = Some("93".into());
    venue.siret = Some(Siret::from_trusted("12345678900012".into()));
    ports.venues.insert(&venue).await.expect("venue seeded");

    let activation = offer(
        venue.id,
        "Activation du pass Culture",
        ProductType::Thing(ThingType::ACTIVATION),
    );
    let book = offer(
        venue.id,
        "Les Misérables",
        ProductType::Thing(ThingType::LIVRE_EDITION),
    );
    let activation_stock = stock(activation.id, 0, None);
    let book_stock = stock(book.id, BOOK_PRICE, Some(1));
    for offer in [&activation, &book] {
        ports.offers.insert_offer(offer).await.expect("offer seeded");
    }
    for stock in [&activation_stock, &book_stock] {
        ports.offers.insert_stock(stock).await.expect("stock seeded");
    }

    let mut activation_booking = Booking {
        id: BookingId::random(),
        user_id: activated.id,
        stock_id: activation_stock.id,
        token: "ACTIV1".into(),
        quantity: 1,
        amount: Decimal::ZERO,
        is_cancelled: false,
        is_used: false,
        date_created: Utc::now(),
        date_used: None,
    };
    ports
        .bookings
        .insert(&activation_booking)
        .await
        .expect("activation booking seeded");
    activation_booking.mark_used(Utc::now());
    ports
        .bookings
        .activate(
            &activation_booking,
            &Deposit::activation(activated.id, Utc::now()),
        )
        .await
        .expect("activated user seeded");

    Catalogue {
        activation_stock: activation_stock.id,
        book_stock: book_stock.id,
        book_offer: book.id,
    }
}

async fn spawn_server(ports: RepositoryPorts) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;

    let health = HealthState::new();
    health.mark_ready();
    let deps = AppDependencies {
        health_state: web::Data::new(health),
        http_state: web::Data::new(HttpState::from_ports(ports, Arc::new(DefaultClock))),
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
        allowed_origins: vec!["https://app.passculture.beta.gouv.fr".to_owned()],
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .disable_signals()
        .workers(1)
        .listen(listener)
        .map_err(|err| err.to_string())?
        .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

fn create_runtime_and_local() -> (Runtime, LocalSet) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();

    (runtime, local)
}

pub(crate) fn world() -> WorldFixture {
    let (runtime, local) = create_runtime_and_local();
    let ports = InMemoryStore::new().ports();
    let catalogue = local.block_on(&runtime, seed(&ports));
    let (base_url, server) = local
        .block_on(&runtime, spawn_server(ports.clone()))
        .expect("server starts");

    WorldFixture {
        world: Rc::new(RefCell::new(MarketplaceWorld {
            runtime,
            local,
            base_url,
            server,
            ports,
            catalogue,
            session_cookie: None,
            last: Exchange::default(),
            booking_token: None,
            booking_id: None,
        })),
    }
}
