//! Spending caps applied to a beneficiary's bookings.
//!
//! Three totals are tracked over non-cancelled bookings: everything, goods
//! under the physical cap, and online offers under the digital cap.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{BookingDetails, Error, GLOBAL_FIELD, Offer, ThingType};

/// Ceiling over all bookings.
pub const TOTAL_CAP: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
/// Ceiling over physical goods.
pub const PHYSICAL_CAP: Decimal = Decimal::from_parts(200, 0, 0, false, 0);
/// Ceiling over digital offers.
pub const DIGITAL_CAP: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Thing types counted against the physical cap when delivered offline.
pub const PHYSICAL_CAPPED_TYPES: [ThingType; 5] = [
    ThingType::AUDIOVISUEL,
    ThingType::INSTRUMENT,
    ThingType::JEUX,
    ThingType::LIVRE_EDITION,
    ThingType::MUSIQUE,
];

/// Thing types counted against the digital cap when delivered online.
pub const DIGITAL_CAPPED_TYPES: [ThingType; 4] = [
    ThingType::AUDIOVISUEL,
    ThingType::JEUX_VIDEO,
    ThingType::MUSIQUE,
    ThingType::PRESSE_ABO,
];

/// Whether `offer` counts against the physical cap.
///
/// Digital books count as physical goods.
pub fn is_physically_capped(offer: &Offer) -> bool {
    let Some(thing) = offer.product_type.as_thing() else {
        return false;
    };
    if offer.is_digital() {
        thing == ThingType::LIVRE_EDITION
    } else {
        PHYSICAL_CAPPED_TYPES.contains(&thing)
    }
}

/// Whether `offer` counts against the digital cap.
pub fn is_digitally_capped(offer: &Offer) -> bool {
    offer.is_digital()
        && offer
            .product_type
            .as_thing()
            .is_some_and(|thing| DIGITAL_CAPPED_TYPES.contains(&thing))
}

/// One ceiling and the amount spent against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expense {
    pub max: Decimal,
    pub actual: Decimal,
}

impl Expense {
    fn empty(max: Decimal) -> Self {
        Self {
            max,
            actual: Decimal::ZERO,
        }
    }

    fn would_exceed(&self, extra: Decimal) -> bool {
        self.actual
            .checked_add(extra)
            .is_none_or(|total| total > self.max)
    }
}

/// Expense summary of a user.
///
/// # Examples
/// ```
/// use backend::domain::Expenses;
///
/// let expenses = Expenses::compute(&[]);
/// let json = serde_json::to_value(&expenses).expect("serialise");
/// assert_eq!(json["all"]["max"], 500.0);
/// assert_eq!(json["physical"]["actual"], 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expenses {
    pub all: Expense,
    pub physical: Expense,
    pub digital: Expense,
}

impl Expenses {
    /// Sum non-cancelled bookings into the three totals.
    pub fn compute(bookings: &[BookingDetails]) -> Self {
        let mut expenses = Self {
            all: Expense::empty(TOTAL_CAP),
            physical: Expense::empty(PHYSICAL_CAP),
            digital: Expense::empty(DIGITAL_CAP),
        };
        for details in bookings.iter().filter(|d| !d.booking.is_cancelled) {
            let value = details.booking.value();
            expenses.all.actual = expenses.all.actual.saturating_add(value);
            if is_physically_capped(&details.offer) {
                expenses.physical.actual = expenses.physical.actual.saturating_add(value);
            }
            if is_digitally_capped(&details.offer) {
                expenses.digital.actual = expenses.digital.actual.saturating_add(value);
            }
        }
        expenses
    }

    /// Refuse spending `value` on `offer` when it breaks a capped total.
    pub fn check_new_spend(&self, offer: &Offer, value: Decimal) -> Result<(), Error> {
        if is_physically_capped(offer) && self.physical.would_exceed(value) {
            return Err(Error::invalid_request(
                GLOBAL_FIELD,
                format!(
                    "Le plafond de {} € pour les biens culturels ne vous permet pas de réserver cette offre.",
                    self.physical.max
                ),
            ));
        }
        if is_digitally_capped(offer) && self.digital.would_exceed(value) {
            return Err(Error::invalid_request(
                GLOBAL_FIELD,
                format!(
                    "Le plafond de {} € pour les offres numériques ne vous permet pas de réserver cette offre.",
                    self.digital.max
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
