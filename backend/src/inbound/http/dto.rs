//! Response payloads shared by several handler modules.
//!
//! Domain entities stay free of serde and utoipa concerns; these wrappers
//! decide the JSON shape (camelCase keys, string identifiers, numeric money)
//! and carry the OpenAPI schemas.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{BookingView, OfferView, OffererView, PaymentMessageView, UserProfile};
use crate::domain::{
    Booking, BookingDetails, Expense, Expenses, Feature, Mediation, Offer, Payment, PaymentStatus,
    Stock, StockLevel, User, UserOfferer, Venue,
};

/// Spend against one ceiling.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExpenseResponse {
    #[schema(value_type = f64, example = 500)]
    pub max: Decimal,
    #[schema(value_type = f64, example = 0)]
    pub actual: Decimal,
}

impl From<Expense> for ExpenseResponse {
    fn from(value: Expense) -> Self {
        Self {
            max: value.max,
            actual: value.actual,
        }
    }
}

/// Spend against each ceiling.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExpensesResponse {
    pub all: ExpenseResponse,
    pub physical: ExpenseResponse,
    pub digital: ExpenseResponse,
}

impl From<Expenses> for ExpensesResponse {
    fn from(value: Expenses) -> Self {
        Self {
            all: value.all.into(),
            physical: value.physical.into(),
            digital: value.digital.into(),
        }
    }
}

/// Public view of an account, without credentials.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "jeune@example.com")]
    pub email: String,
    pub public_name: String,
    #[schema(example = "93")]
    pub departement_code: String,
    pub can_book_free_offers: bool,
    pub is_admin: bool,
    pub is_validated: bool,
}

impl From<&User> for UserResponse {
    fn from(value: &User) -> Self {
        Self {
            id: value.id.to_string(),
            email: value.email.as_str().to_owned(),
            public_name: value.public_name.clone(),
            departement_code: value.departement_code.clone(),
            can_book_free_offers: value.can_book_free_offers,
            is_admin: value.is_admin,
            is_validated: value.is_validated(),
        }
    }
}

/// Signed-in user's profile with wallet and expense figures.
///
/// Wallet keys keep their historical snake-case names.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    #[serde(rename = "wallet_is_activated")]
    pub wallet_is_activated: bool,
    #[serde(rename = "wallet_balance")]
    #[schema(value_type = f64)]
    pub wallet_balance: Decimal,
    #[serde(rename = "real_wallet_balance")]
    #[schema(value_type = f64)]
    pub real_wallet_balance: Decimal,
    pub expenses: ExpensesResponse,
    pub has_physical_venues: bool,
    pub has_offers: bool,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            user: UserResponse::from(&value.user),
            wallet_is_activated: value.wallet.is_activated,
            wallet_balance: value.wallet.balance,
            real_wallet_balance: value.wallet.real_balance,
            expenses: value.expenses.into(),
            has_physical_venues: value.activity.has_physical_venues,
            has_offers: value.activity.has_offers,
        }
    }
}

/// Venue with its validation state.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueResponse {
    pub id: String,
    pub managing_offerer_id: String,
    pub name: String,
    pub public_name: Option<String>,
    #[schema(example = "12345678900012")]
    pub siret: Option<String>,
    pub comment: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub departement_code: Option<String>,
    pub booking_email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_virtual: bool,
    pub is_validated: bool,
}

impl From<Venue> for VenueResponse {
    fn from(value: Venue) -> Self {
        let is_validated = value.is_validated();
        Self {
            id: value.id.to_string(),
            managing_offerer_id: value.managing_offerer_id.to_string(),
            name: value.name,
            public_name: value.public_name,
            siret: value.siret.map(|siret| siret.as_str().to_owned()),
            comment: value.comment,
            address: value.address,
            postal_code: value.postal_code,
            city: value.city,
            departement_code: value.departement_code,
            booking_email: value.booking_email,
            latitude: value.latitude,
            longitude: value.longitude,
            is_virtual: value.is_virtual,
            is_validated,
        }
    }
}

/// Offerer as seen by the signed-in user.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OffererResponse {
    pub id: String,
    pub name: String,
    #[schema(example = "123456789")]
    pub siren: String,
    pub address: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub is_active: bool,
    pub is_validated: bool,
    pub n_offers: i64,
    pub bic: Option<String>,
    pub iban: Option<String>,
    pub user_has_access: bool,
    pub managed_venues: Vec<VenueResponse>,
}

impl From<OffererView> for OffererResponse {
    fn from(value: OffererView) -> Self {
        let OffererView {
            offerer,
            n_offers,
            user_has_access,
            managed_venues,
        } = value;
        Self {
            id: offerer.id.to_string(),
            is_validated: offerer.is_validated(),
            bic: offerer.bic().map(str::to_owned),
            iban: offerer.iban().map(str::to_owned),
            siren: offerer.siren.as_str().to_owned(),
            name: offerer.name,
            address: offerer.address,
            postal_code: offerer.postal_code,
            city: offerer.city,
            is_active: offerer.is_active,
            n_offers,
            user_has_access,
            managed_venues: managed_venues.into_iter().map(Into::into).collect(),
        }
    }
}

/// Link between a user and an offerer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserOffererResponse {
    pub id: String,
    pub user_id: String,
    pub offerer_id: String,
    #[schema(example = "editor")]
    pub rights: String,
    pub is_validated: bool,
}

impl From<UserOfferer> for UserOffererResponse {
    fn from(value: UserOfferer) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            offerer_id: value.offerer_id.to_string(),
            rights: value.rights.as_str().to_owned(),
            is_validated: value.is_validated(),
        }
    }
}

/// Offer without its stocks.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    pub id: String,
    pub venue_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "EventType.SPECTACLE_VIVANT")]
    pub type_code: String,
    pub url: Option<String>,
    pub is_active: bool,
    pub is_digital: bool,
    pub is_event: bool,
    pub duration_minutes: Option<i32>,
    pub date_created: DateTime<Utc>,
}

impl From<Offer> for OfferResponse {
    fn from(value: Offer) -> Self {
        Self {
            id: value.id.to_string(),
            venue_id: value.venue_id.to_string(),
            is_digital: value.is_digital(),
            is_event: value.is_event(),
            type_code: value.product_type.code().to_owned(),
            name: value.name,
            description: value.description,
            url: value.url,
            is_active: value.is_active,
            duration_minutes: value.duration_minutes,
            date_created: value.date_created,
        }
    }
}

/// Priced occurrence of an offer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockResponse {
    pub id: String,
    pub offer_id: String,
    #[schema(value_type = f64, example = 10)]
    pub price: Decimal,
    pub available: Option<i64>,
    pub beginning_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub booking_limit_datetime: Option<DateTime<Utc>>,
}

impl From<Stock> for StockResponse {
    fn from(value: Stock) -> Self {
        Self {
            id: value.id.to_string(),
            offer_id: value.offer_id.to_string(),
            price: value.price,
            available: value.available,
            beginning_datetime: value.beginning_datetime,
            end_datetime: value.end_datetime,
            booking_limit_datetime: value.booking_limit_datetime,
        }
    }
}

/// Stock with the places already booked on it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLevelResponse {
    #[serde(flatten)]
    pub stock: StockResponse,
    pub booked_quantity: i64,
    pub remaining_quantity: Option<i64>,
}

impl From<StockLevel> for StockLevelResponse {
    fn from(value: StockLevel) -> Self {
        let remaining_quantity = value.stock.remaining(value.booked);
        Self {
            stock: value.stock.into(),
            booked_quantity: value.booked,
            remaining_quantity,
        }
    }
}

/// Offer with its stocks and stock alert.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferDetailResponse {
    #[serde(flatten)]
    pub offer: OfferResponse,
    pub stocks: Vec<StockLevelResponse>,
    #[schema(example = "encore 3 en stock")]
    pub stock_alert_message: String,
}

impl From<OfferView> for OfferDetailResponse {
    fn from(value: OfferView) -> Self {
        Self {
            offer: value.offer.into(),
            stocks: value.stocks.into_iter().map(Into::into).collect(),
            stock_alert_message: value.stock_alert_message,
        }
    }
}

/// Illustrated presentation of an offer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediationResponse {
    pub id: String,
    pub offer_id: String,
    pub author_id: Option<String>,
    pub credit: Option<String>,
    pub thumb_url: Option<String>,
    pub is_active: bool,
    pub date_created: DateTime<Utc>,
}

impl From<Mediation> for MediationResponse {
    fn from(value: Mediation) -> Self {
        Self {
            id: value.id.to_string(),
            offer_id: value.offer_id.to_string(),
            author_id: value.author_id.map(|id| id.to_string()),
            credit: value.credit,
            thumb_url: value.thumb_url,
            is_active: value.is_active,
            date_created: value.date_created,
        }
    }
}

/// Reservation with its counter-mark.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,
    pub stock_id: String,
    pub user_id: String,
    #[schema(example = "2QLYYA")]
    pub token: String,
    pub quantity: i32,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub is_cancelled: bool,
    pub is_used: bool,
    pub date_created: DateTime<Utc>,
    pub date_used: Option<DateTime<Utc>>,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        Self {
            id: value.id.to_string(),
            stock_id: value.stock_id.to_string(),
            user_id: value.user_id.to_string(),
            token: value.token,
            quantity: value.quantity,
            amount: value.amount,
            is_cancelled: value.is_cancelled,
            is_used: value.is_used,
            date_created: value.date_created,
            date_used: value.date_used,
        }
    }
}

/// Booking as listed for its owner.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBookingResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    #[schema(example = "Réservé")]
    pub status_label: String,
    pub is_user_cancellable: bool,
    pub completed_url: Option<String>,
    pub stock: StockResponse,
    pub offer: OfferResponse,
    pub venue_name: String,
}

impl From<BookingView> for UserBookingResponse {
    fn from(value: BookingView) -> Self {
        let BookingDetails {
            booking,
            stock,
            offer,
            venue,
            ..
        } = value.details;
        Self {
            booking: booking.into(),
            status_label: value.status_label.to_owned(),
            is_user_cancellable: value.is_user_cancellable,
            completed_url: value.completed_url,
            stock: stock.into(),
            offer: offer.into(),
            venue_name: venue.name,
        }
    }
}

/// Summary returned by a counter-mark lookup.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenBookingResponse {
    pub booking_id: String,
    pub date: Option<DateTime<Utc>>,
    pub email: String,
    pub is_used: bool,
    pub offer_name: String,
    pub user_name: String,
    pub venue_departement_code: Option<String>,
}

impl From<BookingDetails> for TokenBookingResponse {
    fn from(value: BookingDetails) -> Self {
        Self {
            booking_id: value.booking.id.to_string(),
            date: value.stock.beginning_datetime,
            email: value.user_email.as_str().to_owned(),
            is_used: value.booking.is_used,
            offer_name: value.offer.name,
            user_name: value.user_public_name,
            venue_departement_code: value.venue.departement_code,
        }
    }
}

/// One entry of a payment's status history.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    #[schema(example = "PENDING")]
    pub status: String,
    pub detail: Option<String>,
    pub date: DateTime<Utc>,
}

impl From<PaymentStatus> for PaymentStatusResponse {
    fn from(value: PaymentStatus) -> Self {
        Self {
            status: value.status.as_str().to_owned(),
            detail: value.detail,
            date: value.date,
        }
    }
}

/// Reimbursement of one booking with its history.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: String,
    pub booking_id: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub reimbursement_rule: String,
    #[schema(value_type = f64)]
    pub reimbursement_rate: Decimal,
    pub recipient_name: String,
    pub recipient_siren: String,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub author: String,
    pub transaction_label: Option<String>,
    pub payment_message_name: Option<String>,
    pub current_status: Option<String>,
    pub statuses: Vec<PaymentStatusResponse>,
}

impl From<Payment> for PaymentResponse {
    fn from(value: Payment) -> Self {
        let current_status = value
            .current_status()
            .map(|status| status.status.as_str().to_owned());
        Self {
            id: value.id.to_string(),
            booking_id: value.booking_id.to_string(),
            amount: value.amount,
            reimbursement_rule: value.reimbursement_rule,
            reimbursement_rate: value.reimbursement_rate,
            recipient_name: value.recipient_name,
            recipient_siren: value.recipient_siren,
            iban: value.iban,
            bic: value.bic,
            author: value.author,
            transaction_label: value.transaction_label,
            payment_message_name: value.payment_message_name,
            current_status,
            statuses: value.statuses.into_iter().map(Into::into).collect(),
        }
    }
}

/// Payments sent together, with the message checksum.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMessageResponse {
    pub name: String,
    pub checksum: String,
    pub payments: Vec<PaymentResponse>,
}

impl From<PaymentMessageView> for PaymentMessageResponse {
    fn from(value: PaymentMessageView) -> Self {
        Self {
            name: value.name,
            checksum: value.checksum,
            payments: value.payments.into_iter().map(Into::into).collect(),
        }
    }
}

/// A feature toggle and whether it is active.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeatureResponse {
    #[schema(example = "WEBAPP_SIGNUP")]
    pub name_key: String,
    pub name: String,
    pub is_active: bool,
}

impl From<Feature> for FeatureResponse {
    fn from(value: Feature) -> Self {
        Self {
            name_key: value.toggle.name_key().to_owned(),
            name: value.toggle.description().to_owned(),
            is_active: value.is_active,
        }
    }
}
