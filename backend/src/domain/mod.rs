//! Domain primitives, business rules and services.
//!
//! Purpose: hold the marketplace rules (wallets, expense caps, booking
//! lifecycle, rights over offerers) free of HTTP and SQL concerns. Inbound
//! adapters call the driving ports in [`ports`]; services reach storage only
//! through the driven repository ports.
//!
//! Public surface:
//! - Error / ErrorCode: failure carried to every adapter, keyed by field.
//! - Entities: User, Offerer, UserOfferer, Venue, Offer, Stock, Mediation,
//!   Booking, Deposit, Payment.
//! - Rules: wallet balances, Expenses, booking checks, stock alerts,
//!   department visibility, feature toggles.
//! - Services: `Domain*Service` implementations of the driving ports.

pub mod auth;
pub mod booking;
pub mod departments;
pub mod deposit;
pub mod error;
pub mod expenses;
pub mod features;
pub mod ids;
pub mod offer;
pub mod offer_type;
pub mod offerer;
pub mod payment;
pub mod ports;
pub mod tokens;
pub mod trace_id;
pub mod user;
pub mod venue;
pub mod wallet;

mod account_service;
mod booking_service;
mod offer_service;
mod offerer_service;
mod payment_service;
mod service_support;
mod venue_service;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::account_service::DomainAccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN_LENGTH, PasswordHashError,
    WEAK_PASSWORD_MESSAGE, check_password_strength, hash_password, verify_password,
};
pub use self::booking::{
    ALREADY_ACTIVATED_MESSAGE, Booking, BookingDetails, BookingRequestContext, EVENT_WINDOW_HOURS,
    OVERBOOKING_MESSAGE, TOKEN_NOT_FOUND_MESSAGE, TokenCheck, ValidationPlan, can_export,
    check_availability, check_cancellation, check_new_booking, check_token_access,
    is_user_cancellable, is_validation_window_open, plan_validation,
};
pub use self::booking_service::DomainBookingService;
pub use self::departments::visible_departement_codes;
pub use self::deposit::{ACTIVATION_DEPOSIT_AMOUNT, ACTIVATION_SOURCE, Deposit};
pub use self::error::{Error, ErrorCode, ErrorCollector, FieldErrors, GLOBAL_FIELD};
pub use self::expenses::{
    DIGITAL_CAP, Expense, Expenses, PHYSICAL_CAP, TOTAL_CAP, is_digitally_capped,
    is_physically_capped,
};
pub use self::features::{
    FEATURE_DISABLED_MESSAGE, FORBIDDEN_FIELD, Feature, FeatureFlags, FeatureToggle,
    UnknownFeature,
};
pub use self::ids::{
    BookingId, DepositId, MediationId, OfferId, OffererId, PaymentId, StockId, UserId,
    UserOffererId, VenueId,
};
pub use self::offer::{
    Mediation, Offer, OfferDraft, Stock, StockDraft, StockLevel, stock_alert_message,
};
pub use self::offer_service::DomainOfferService;
pub use self::offer_type::{EventType, ProductType, ThingType, UnknownProductType};
pub use self::offerer::{
    BankInformation, INSUFFICIENT_RIGHTS_MESSAGE, Offerer, RightsType, Siren, UserOfferer,
    ensure_rights, has_rights,
};
pub use self::offerer_service::DomainOffererService;
pub use self::payment::{Payment, PaymentMessage, PaymentStatus, TransactionStatus};
pub use self::payment_service::DomainPaymentService;
pub use self::service_support::{RepositoryPorts, UNKNOWN_OBJECT_MESSAGE};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    ADMIN_CANNOT_BOOK_MESSAGE, Email, RESET_PASSWORD_TOKEN_VALIDITY_HOURS, User,
};
pub use self::venue::{
    RawCoordinate, Siret, VIRTUAL_VENUE_NAME, Venue, VenueDraft, departement_code_for,
};
pub use self::venue_service::DomainVenueService;
pub use self::wallet::{WalletSummary, real_wallet_balance, wallet_balance};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error, GLOBAL_FIELD};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden(GLOBAL_FIELD, "nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
