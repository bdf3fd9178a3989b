//! Offers, their stocks and their mediations.
//!
//! An offer is published at a venue. Each stock prices one occurrence (event)
//! or one batch (thing) and caps how many places can be booked.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{
    Error, ErrorCode, ErrorCollector, MediationId, OfferId, ProductType, StockId, UserId, Venue,
    VenueId,
};

const REQUIRED: &str = "Ce paramètre est obligatoire";
const MUST_BE_POSITIVE: &str = "La valeur doit être positive";
const PRICE_TOO_HIGH: &str = "Le prix doit être inférieur à 100 000 000 €";

/// Highest price a stock may carry, the bound of the `NUMERIC(10, 2)` column.
pub const MAX_STOCK_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Published offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub id: OfferId,
    pub venue_id: VenueId,
    pub name: String,
    pub description: Option<String>,
    pub product_type: ProductType,
    pub url: Option<String>,
    pub is_active: bool,
    pub duration_minutes: Option<i32>,
    pub date_created: DateTime<Utc>,
}

impl Offer {
    /// Offers delivered online carry a URL.
    pub fn is_digital(&self) -> bool {
        self.url.is_some()
    }

    /// Whether this offer describes dated occurrences.
    pub fn is_event(&self) -> bool {
        self.product_type.is_event_type()
    }
}

/// Client input for a new offer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferDraft {
    pub venue_id: Option<VenueId>,
    pub name: String,
    pub type_code: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
}

impl OfferDraft {
    /// Validate the draft against its venue.
    pub fn into_offer(self, venue: &Venue, now: DateTime<Utc>) -> Result<Offer, Error> {
        let mut errors = ErrorCollector::new();
        if self.name.trim().is_empty() {
            errors.add("name", REQUIRED);
        }
        let product_type = self.type_code.parse::<ProductType>().ok();
        if product_type.is_none() {
            errors.add("type", "Type d'offre inconnu");
        }
        let url = self.url.filter(|url| !url.trim().is_empty());
        match (venue.is_virtual, url.is_some()) {
            (true, false) => errors.add(
                "url",
                "Une offre physique ne peut être associée au lieu \"Offre numérique\"",
            ),
            (false, true) => errors.add(
                "url",
                "Une offre numérique doit obligatoirement être associée au lieu \"Offre numérique\"",
            ),
            _ => {}
        }
        if self.duration_minutes.is_some_and(|minutes| minutes < 0) {
            errors.add("durationMinutes", MUST_BE_POSITIVE);
        }
        errors.into_result(ErrorCode::InvalidRequest)?;

        let product_type = product_type.ok_or_else(|| {
            Error::invalid_request("type", "Type d'offre inconnu")
        })?;
        Ok(Offer {
            id: OfferId::random(),
            venue_id: venue.id,
            name: self.name.trim().to_owned(),
            description: self.description,
            product_type,
            url: url.map(|url| url.trim().to_owned()),
            is_active: true,
            duration_minutes: self.duration_minutes,
            date_created: now,
        })
    }
}

/// Priced, quantity-limited instance of an offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stock {
    pub id: StockId,
    pub offer_id: OfferId,
    pub price: Decimal,
    /// `None` means unlimited.
    pub available: Option<i64>,
    pub beginning_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub booking_limit_datetime: Option<DateTime<Utc>>,
    pub is_soft_deleted: bool,
    pub date_modified: DateTime<Utc>,
}

impl Stock {
    /// Whether bookings are closed at `now`.
    pub fn booking_limit_passed(&self, now: DateTime<Utc>) -> bool {
        self.booking_limit_datetime.is_some_and(|limit| limit < now)
    }

    /// Whether the event has started at `now`.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.beginning_datetime.is_some_and(|start| start <= now)
    }

    /// Places left once `booked` places are taken; `None` when unlimited.
    pub fn remaining(&self, booked: i64) -> Option<i64> {
        self.available.map(|available| (available - booked).max(0))
    }
}

/// Client input for a new stock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockDraft {
    pub offer_id: Option<OfferId>,
    pub price: Decimal,
    pub available: Option<i64>,
    pub beginning_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub booking_limit_datetime: Option<DateTime<Utc>>,
}

impl StockDraft {
    /// Validate the draft against its offer.
    ///
    /// Event stocks default their booking limit to the event start.
    pub fn into_stock(self, offer: &Offer, now: DateTime<Utc>) -> Result<Stock, Error> {
        let mut errors = ErrorCollector::new();
        if self.price < Decimal::ZERO {
            errors.add("price", MUST_BE_POSITIVE);
        } else if self.price > MAX_STOCK_PRICE {
            errors.add("price", PRICE_TOO_HIGH);
        }
        if self.available.is_some_and(|available| available < 0) {
            errors.add("available", MUST_BE_POSITIVE);
        }
        if offer.is_event() {
            if self.beginning_datetime.is_none() {
                errors.add("beginningDatetime", REQUIRED);
            }
            if self.end_datetime.is_none() {
                errors.add("endDatetime", REQUIRED);
            }
            if let (Some(start), Some(end)) = (self.beginning_datetime, self.end_datetime) {
                if end < start {
                    errors.add(
                        "endDatetime",
                        "La date de fin de l'événement doit être postérieure à la date de début",
                    );
                }
            }
        } else if self.beginning_datetime.is_some() || self.end_datetime.is_some() {
            errors.add(
                "beginningDatetime",
                "Impossible de mettre des dates de début et fin si l'offre ne porte pas sur un évènement",
            );
        }
        if let (Some(limit), Some(start)) = (self.booking_limit_datetime, self.beginning_datetime)
        {
            if limit > start {
                errors.add(
                    "bookingLimitDatetime",
                    "La date limite de réservation pour cette offre est postérieure à la date de début de l'évènement",
                );
            }
        }
        errors.into_result(ErrorCode::InvalidRequest)?;

        Ok(Stock {
            id: StockId::random(),
            offer_id: offer.id,
            price: self.price,
            available: self.available,
            booking_limit_datetime: self.booking_limit_datetime.or(self.beginning_datetime),
            beginning_datetime: self.beginning_datetime,
            end_datetime: self.end_datetime,
            is_soft_deleted: false,
            date_modified: now,
        })
    }
}

/// Stock paired with the number of places already booked on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLevel {
    pub stock: Stock,
    pub booked: i64,
}

fn plural(count: usize) -> &'static str {
    if count > 1 { "s" } else { "" }
}

/// Short status summarising how much of an offer is left.
///
/// Soft-deleted stocks are ignored.
///
/// # Examples
/// ```
/// use backend::domain::stock_alert_message;
///
/// assert_eq!(stock_alert_message(true, &[]), "pas encore de places");
/// assert_eq!(stock_alert_message(false, &[]), "pas encore de stock");
/// ```
pub fn stock_alert_message(is_event: bool, levels: &[StockLevel]) -> String {
    let live: Vec<&StockLevel> = levels
        .iter()
        .filter(|level| !level.stock.is_soft_deleted)
        .collect();
    if live.is_empty() {
        return if is_event {
            "pas encore de places".to_owned()
        } else {
            "pas encore de stock".to_owned()
        };
    }

    let remaining: Vec<i64> = live
        .iter()
        .filter_map(|level| level.stock.remaining(level.booked))
        .collect();
    if remaining.is_empty() {
        return "illimité".to_owned();
    }

    let exhausted = remaining.iter().filter(|left| **left == 0).count();
    let total_left: i64 = remaining.iter().sum();
    if exhausted == live.len() {
        return if is_event {
            "plus de places pour toutes les dates".to_owned()
        } else {
            "plus de stock".to_owned()
        };
    }
    if exhausted > 0 {
        return if is_event {
            format!("plus de places pour {exhausted} date{}", plural(exhausted))
        } else {
            format!("plus de stock pour {exhausted} offre{}", plural(exhausted))
        };
    }
    if is_event {
        format!("encore {total_left} places")
    } else {
        format!("encore {total_left} en stock")
    }
}

/// Illustrated presentation of an offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mediation {
    pub id: MediationId,
    pub offer_id: OfferId,
    pub author_id: Option<UserId>,
    pub credit: Option<String>,
    pub thumb_url: Option<String>,
    pub is_active: bool,
    pub date_created: DateTime<Utc>,
}
