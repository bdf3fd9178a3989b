//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Each row converts from a borrowed domain
//! value for writes and back into the domain type for reads; reads fail
//! with a message when a stored code no longer parses.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    BankInformation, Booking, Deposit, Email, Mediation, Offer, Offerer, Payment, PaymentStatus,
    Siren, Siret, Stock, User, UserOfferer, Venue,
};

use super::schema::{
    bookings, deposits, mediations, offerers, offers, payment_statuses, payments, stocks,
    user_offerers, users, venues,
};

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub public_name: String,
    pub departement_code: String,
    pub can_book_free_offers: bool,
    pub is_admin: bool,
    pub validation_token: Option<String>,
    pub reset_password_token: Option<String>,
    pub reset_password_token_validity_limit: Option<DateTime<Utc>>,
    pub date_created: DateTime<Utc>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: user.email.as_str().to_owned(),
            password_hash: user.password_hash.clone(),
            public_name: user.public_name.clone(),
            departement_code: user.departement_code.clone(),
            can_book_free_offers: user.can_book_free_offers,
            is_admin: user.is_admin,
            validation_token: user.validation_token.clone(),
            reset_password_token: user.reset_password_token.clone(),
            reset_password_token_validity_limit: user.reset_password_token_validity_limit,
            date_created: user.date_created,
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.into(),
            email: Email::normalise(&row.email),
            password_hash: row.password_hash,
            public_name: row.public_name,
            departement_code: row.departement_code,
            can_book_free_offers: row.can_book_free_offers,
            is_admin: row.is_admin,
            validation_token: row.validation_token,
            reset_password_token: row.reset_password_token,
            reset_password_token_validity_limit: row.reset_password_token_validity_limit,
            date_created: row.date_created,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = offerers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OffererRow {
    pub id: Uuid,
    pub name: String,
    pub siren: String,
    pub address: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub is_active: bool,
    pub validation_token: Option<String>,
    pub bic: Option<String>,
    pub iban: Option<String>,
    pub date_created: DateTime<Utc>,
}

impl From<&Offerer> for OffererRow {
    fn from(offerer: &Offerer) -> Self {
        Self {
            id: *offerer.id.as_uuid(),
            name: offerer.name.clone(),
            siren: offerer.siren.as_str().to_owned(),
            address: offerer.address.clone(),
            postal_code: offerer.postal_code.clone(),
            city: offerer.city.clone(),
            is_active: offerer.is_active,
            validation_token: offerer.validation_token.clone(),
            bic: offerer.bic().map(str::to_owned),
            iban: offerer.iban().map(str::to_owned),
            date_created: offerer.date_created,
        }
    }
}

impl From<OffererRow> for Offerer {
    fn from(row: OffererRow) -> Self {
        let bank_information = match (row.bic, row.iban) {
            (Some(bic), Some(iban)) => Some(BankInformation { bic, iban }),
            _ => None,
        };
        Self {
            id: row.id.into(),
            name: row.name,
            siren: Siren::from_trusted(row.siren),
            address: row.address,
            postal_code: row.postal_code,
            city: row.city,
            is_active: row.is_active,
            validation_token: row.validation_token,
            bank_information,
            date_created: row.date_created,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = user_offerers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserOffererRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub offerer_id: Uuid,
    pub rights: String,
    pub validation_token: Option<String>,
}

impl From<&UserOfferer> for UserOffererRow {
    fn from(link: &UserOfferer) -> Self {
        Self {
            id: *link.id.as_uuid(),
            user_id: *link.user_id.as_uuid(),
            offerer_id: *link.offerer_id.as_uuid(),
            rights: link.rights.as_str().to_owned(),
            validation_token: link.validation_token.clone(),
        }
    }
}

impl TryFrom<UserOffererRow> for UserOfferer {
    type Error = String;

    fn try_from(row: UserOffererRow) -> Result<Self, Self::Error> {
        let rights = row
            .rights
            .parse()
            .map_err(|_| format!("link {} has unknown rights {}", row.id, row.rights))?;
        Ok(Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            offerer_id: row.offerer_id.into(),
            rights,
            validation_token: row.validation_token,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = venues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct VenueRow {
    pub id: Uuid,
    pub managing_offerer_id: Uuid,
    pub name: String,
    pub public_name: Option<String>,
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
    pub validation_token: Option<String>,
}

impl From<&Venue> for VenueRow {
    fn from(venue: &Venue) -> Self {
        Self {
            id: *venue.id.as_uuid(),
            managing_offerer_id: *venue.managing_offerer_id.as_uuid(),
            name: venue.name.clone(),
            public_name: venue.public_name.clone(),
            siret: venue.siret.as_ref().map(|siret| siret.as_str().to_owned()),
            comment: venue.comment.clone(),
            address: venue.address.clone(),
            postal_code: venue.postal_code.clone(),
            city: venue.city.clone(),
            departement_code: venue.departement_code.clone(),
            booking_email: venue.booking_email.clone(),
            latitude: venue.latitude,
            longitude: venue.longitude,
            is_virtual: venue.is_virtual,
            validation_token: venue.validation_token.clone(),
        }
    }
}

impl From<VenueRow> for Venue {
    fn from(row: VenueRow) -> Self {
        Self {
            id: row.id.into(),
            managing_offerer_id: row.managing_offerer_id.into(),
            name: row.name,
            public_name: row.public_name,
            siret: row.siret.map(Siret::from_trusted),
            comment: row.comment,
            address: row.address,
            postal_code: row.postal_code,
            city: row.city,
            departement_code: row.departement_code,
            booking_email: row.booking_email,
            latitude: row.latitude,
            longitude: row.longitude,
            is_virtual: row.is_virtual,
            validation_token: row.validation_token,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = offers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OfferRow {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub product_type: String,
    pub url: Option<String>,
    pub is_active: bool,
    pub duration_minutes: Option<i32>,
    pub date_created: DateTime<Utc>,
}

impl From<&Offer> for OfferRow {
    fn from(offer: &Offer) -> Self {
        Self {
            id: *offer.id.as_uuid(),
            venue_id: *offer.venue_id.as_uuid(),
            name: offer.name.clone(),
            description: offer.description.clone(),
            product_type: offer.product_type.into(),
            url: offer.url.clone(),
            is_active: offer.is_active,
            duration_minutes: offer.duration_minutes,
            date_created: offer.date_created,
        }
    }
}

impl TryFrom<OfferRow> for Offer {
    type Error = String;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        let product_type = row
            .product_type
            .parse()
            .map_err(|err| format!("offer {}: {err}", row.id))?;
        Ok(Self {
            id: row.id.into(),
            venue_id: row.venue_id.into(),
            name: row.name,
            description: row.description,
            product_type,
            url: row.url,
            is_active: row.is_active,
            duration_minutes: row.duration_minutes,
            date_created: row.date_created,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = stocks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StockRow {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub price: Decimal,
    pub available: Option<i64>,
    pub beginning_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub booking_limit_datetime: Option<DateTime<Utc>>,
    pub is_soft_deleted: bool,
    pub date_modified: DateTime<Utc>,
}

impl From<&Stock> for StockRow {
    fn from(stock: &Stock) -> Self {
        Self {
            id: *stock.id.as_uuid(),
            offer_id: *stock.offer_id.as_uuid(),
            price: stock.price,
            available: stock.available,
            beginning_datetime: stock.beginning_datetime,
            end_datetime: stock.end_datetime,
            booking_limit_datetime: stock.booking_limit_datetime,
            is_soft_deleted: stock.is_soft_deleted,
            date_modified: stock.date_modified,
        }
    }
}

impl From<StockRow> for Stock {
    fn from(row: StockRow) -> Self {
        Self {
            id: row.id.into(),
            offer_id: row.offer_id.into(),
            price: row.price,
            available: row.available,
            beginning_datetime: row.beginning_datetime,
            end_datetime: row.end_datetime,
            booking_limit_datetime: row.booking_limit_datetime,
            is_soft_deleted: row.is_soft_deleted,
            date_modified: row.date_modified,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = mediations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct MediationRow {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub author_id: Option<Uuid>,
    pub credit: Option<String>,
    pub thumb_url: Option<String>,
    pub is_active: bool,
    pub date_created: DateTime<Utc>,
}

impl From<&Mediation> for MediationRow {
    fn from(mediation: &Mediation) -> Self {
        Self {
            id: *mediation.id.as_uuid(),
            offer_id: *mediation.offer_id.as_uuid(),
            author_id: mediation.author_id.map(|id| *id.as_uuid()),
            credit: mediation.credit.clone(),
            thumb_url: mediation.thumb_url.clone(),
            is_active: mediation.is_active,
            date_created: mediation.date_created,
        }
    }
}

impl From<MediationRow> for Mediation {
    fn from(row: MediationRow) -> Self {
        Self {
            id: row.id.into(),
            offer_id: row.offer_id.into(),
            author_id: row.author_id.map(Into::into),
            credit: row.credit,
            thumb_url: row.thumb_url,
            is_active: row.is_active,
            date_created: row.date_created,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stock_id: Uuid,
    pub token: String,
    pub quantity: i32,
    pub amount: Decimal,
    pub is_cancelled: bool,
    pub is_used: bool,
    pub date_created: DateTime<Utc>,
    pub date_used: Option<DateTime<Utc>>,
}

impl From<&Booking> for BookingRow {
    fn from(booking: &Booking) -> Self {
        Self {
            id: *booking.id.as_uuid(),
            user_id: *booking.user_id.as_uuid(),
            stock_id: *booking.stock_id.as_uuid(),
            token: booking.token.clone(),
            quantity: booking.quantity,
            amount: booking.amount,
            is_cancelled: booking.is_cancelled,
            is_used: booking.is_used,
            date_created: booking.date_created,
            date_used: booking.date_used,
        }
    }
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            stock_id: row.stock_id.into(),
            token: row.token,
            quantity: row.quantity,
            amount: row.amount,
            is_cancelled: row.is_cancelled,
            is_used: row.is_used,
            date_created: row.date_created,
            date_used: row.date_used,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = deposits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DepositRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub source: String,
    pub date_created: DateTime<Utc>,
}

impl From<&Deposit> for DepositRow {
    fn from(deposit: &Deposit) -> Self {
        Self {
            id: *deposit.id.as_uuid(),
            user_id: *deposit.user_id.as_uuid(),
            amount: deposit.amount,
            source: deposit.source.clone(),
            date_created: deposit.date_created,
        }
    }
}

impl From<DepositRow> for Deposit {
    fn from(row: DepositRow) -> Self {
        Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            amount: row.amount,
            source: row.source,
            date_created: row.date_created,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub reimbursement_rule: String,
    pub reimbursement_rate: Decimal,
    pub recipient_name: String,
    pub recipient_siren: String,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub author: String,
    pub transaction_label: Option<String>,
    pub payment_message_name: Option<String>,
}

impl PaymentRow {
    /// Combine the row with its status history.
    pub(crate) fn into_payment(self, statuses: Vec<PaymentStatus>) -> Payment {
        Payment {
            id: self.id.into(),
            booking_id: self.booking_id.into(),
            amount: self.amount,
            reimbursement_rule: self.reimbursement_rule,
            reimbursement_rate: self.reimbursement_rate,
            recipient_name: self.recipient_name,
            recipient_siren: self.recipient_siren,
            iban: self.iban,
            bic: self.bic,
            author: self.author,
            transaction_label: self.transaction_label,
            payment_message_name: self.payment_message_name,
            statuses,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payment_statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentStatusRow {
    pub payment_id: Uuid,
    pub status: String,
    pub detail: Option<String>,
    pub date: DateTime<Utc>,
}

impl TryFrom<PaymentStatusRow> for PaymentStatus {
    type Error = String;

    fn try_from(row: PaymentStatusRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|_| format!("payment {} has unknown status {}", row.payment_id, row.status))?;
        Ok(Self {
            status,
            detail: row.detail,
            date: row.date,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payment_statuses)]
pub(crate) struct NewPaymentStatusRow<'a> {
    pub payment_id: Uuid,
    pub status: &'a str,
    pub detail: Option<&'a str>,
    pub date: DateTime<Utc>,
}
