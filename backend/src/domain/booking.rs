//! Bookings and the rules governing their lifecycle.
//!
//! A booking is created pending, may then be used (its counter-mark was
//! validated by the offerer) and may be cancelled. Cancellation and
//! validation both depend on how far away the event start is.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::{
    Email, Error, GLOBAL_FIELD, Offer, OfferId, Offerer, RightsType, Stock, StockId, User,
    UserId, UserOfferer, Venue, BookingId, ensure_rights, has_rights,
    INSUFFICIENT_RIGHTS_MESSAGE,
};

/// Hours before an event during which bookings can no longer be cancelled
/// and before which counter-marks cannot yet be validated.
pub const EVENT_WINDOW_HOURS: i64 = 72;

/// Message raised when a counter-mark does not resolve to a booking.
pub const TOKEN_NOT_FOUND_MESSAGE: &str = "Cette contremarque n'a pas été trouvée";

/// Message raised when a stock is over-booked.
pub const OVERBOOKING_MESSAGE: &str = "la quantité disponible pour cette offre est atteinte";

/// Raised when an activation booking targets an account that already holds a deposit.
pub const ALREADY_ACTIVATED_MESSAGE: &str = "Ce compte a déjà été activé";

/// Reservation of `quantity` places on a stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub stock_id: StockId,
    pub token: String,
    pub quantity: i32,
    /// Unit price at booking time.
    pub amount: Decimal,
    pub is_cancelled: bool,
    pub is_used: bool,
    pub date_created: DateTime<Utc>,
    pub date_used: Option<DateTime<Utc>>,
}

impl Booking {
    /// Amount charged to the wallet: unit price times quantity.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{Booking, BookingId, StockId, UserId};
    /// use rust_decimal::Decimal;
    ///
    /// let booking = Booking {
    ///     id: BookingId::random(),
    ///     user_id: UserId::random(),
    ///     stock_id: StockId::random(),
    ///     token: "ABCDEF".into(),
    ///     quantity: 2,
    ///     amount: Decimal::new(1250, 2),
    ///     is_cancelled: false,
    ///     is_used: false,
    ///     date_created: chrono::Utc::now(),
    ///     date_used: None,
    /// };
    /// assert_eq!(booking.value(), Decimal::new(25, 0));
    /// ```
    ///
    /// Saturates at [`Decimal::MAX`] rather than overflowing.
    pub fn value(&self) -> Decimal {
        self.amount.saturating_mul(Decimal::from(self.quantity))
    }

    /// Record the counter-mark validation.
    pub fn mark_used(&mut self, now: DateTime<Utc>) {
        self.is_used = true;
        self.date_used = Some(now);
    }
}

/// Whether a booking on a stock starting at `beginning` can be cancelled by
/// its owner at `now`.
///
/// Bookings on stocks without a start date stay cancellable.
///
/// # Examples
/// ```
/// use backend::domain::is_user_cancellable;
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// assert!(is_user_cancellable(None, now));
/// assert!(is_user_cancellable(Some(now + Duration::days(4)), now));
/// assert!(!is_user_cancellable(Some(now + Duration::hours(72)), now));
/// ```
pub fn is_user_cancellable(beginning: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    beginning.is_none_or(|start| start > now + Duration::hours(EVENT_WINDOW_HOURS))
}

/// Whether a counter-mark for an event starting at `beginning` can be
/// validated at `now`.
pub fn is_validation_window_open(beginning: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    beginning.is_none_or(|start| start <= now + Duration::hours(EVENT_WINDOW_HOURS))
}

/// Booking joined with everything needed to present or validate it.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDetails {
    pub booking: Booking,
    pub stock: Stock,
    pub offer: Offer,
    pub venue: Venue,
    pub user_email: Email,
    pub user_public_name: String,
}

impl BookingDetails {
    /// Status shown to the booking owner.
    pub fn status_label(&self, now: DateTime<Utc>) -> &'static str {
        if self.booking.is_cancelled {
            "Réservation annulée"
        } else if self.booking.is_used {
            "Contremarque validée"
        } else if self.stock.has_started(now) {
            "Validé"
        } else {
            "Réservé"
        }
    }

    /// Cancellation rule applied to this booking's stock.
    pub fn is_user_cancellable(&self, now: DateTime<Utc>) -> bool {
        is_user_cancellable(self.stock.beginning_datetime, now)
    }

    /// Offer URL personalised for this booking.
    ///
    /// `{token}`, `{email}` and `{offerId}` are substituted, and `http://` is
    /// prefixed when the URL does not start with `http`.
    pub fn completed_url(&self) -> Option<String> {
        let url = self.offer.url.as_deref()?;
        let completed = url
            .replace("{token}", &self.booking.token)
            .replace("{email}", self.user_email.as_str())
            .replace("{offerId}", &self.offer.id.to_string());
        if completed.starts_with("http") {
            Some(completed)
        } else {
            Some(format!("http://{completed}"))
        }
    }

    /// Offerer managing the venue of the booked offer.
    pub fn offerer_id(&self) -> crate::domain::OffererId {
        self.venue.managing_offerer_id
    }
}

/// Optional filters sent with a counter-mark lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCheck {
    pub email: Option<String>,
    pub offer_id: Option<OfferId>,
}

/// Check that `requester` may look at the booking behind a counter-mark.
///
/// A mismatching `email` or `offer_id` hides the booking (404). Without
/// editor rights on the offerer the lookup is forbidden (403).
pub fn check_token_access(
    details: &BookingDetails,
    check: &TokenCheck,
    requester: &User,
    requester_links: &[UserOfferer],
) -> Result<(), Error> {
    if let Some(email) = check.email.as_deref() {
        let email_matches = Email::normalise(email) == details.user_email;
        let offer_matches = check
            .offer_id
            .is_none_or(|offer_id| offer_id == details.offer.id);
        if !email_matches || !offer_matches {
            return Err(Error::not_found(GLOBAL_FIELD, TOKEN_NOT_FOUND_MESSAGE));
        }
    }
    ensure_rights(
        requester,
        requester_links,
        RightsType::Editor,
        details.offerer_id(),
    )
}

/// Transition chosen by [`plan_validation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPlan {
    /// Mark the booking used.
    MarkUsed,
    /// Grant the activation deposit, allow free bookings, mark used.
    Activate,
}

/// Decide how a counter-mark validation proceeds.
///
/// `owner_has_deposit` tells whether the booking owner already received a
/// deposit; it only matters for activation offers.
pub fn plan_validation(
    details: &BookingDetails,
    check: &TokenCheck,
    requester: &User,
    requester_links: &[UserOfferer],
    owner_has_deposit: bool,
    now: DateTime<Utc>,
) -> Result<ValidationPlan, Error> {
    check_token_access(details, check, requester, requester_links)?;

    if !is_validation_window_open(details.stock.beginning_datetime, now) {
        return Err(Error::forbidden(
            "beginningDatetime",
            "Vous ne pouvez pas valider cette contremarque plus de 72h avant le début de l'évènement",
        ));
    }
    if details.booking.is_cancelled {
        return Err(Error::gone("booking", "Cette réservation a été annulée"));
    }
    if details.booking.is_used {
        return Err(Error::gone("booking", "Cette réservation a déjà été validée"));
    }
    if details.offer.product_type.is_activation() {
        if !requester.is_admin {
            return Err(Error::forbidden(GLOBAL_FIELD, INSUFFICIENT_RIGHTS_MESSAGE));
        }
        if owner_has_deposit {
            return Err(Error::already_processed(
                GLOBAL_FIELD,
                ALREADY_ACTIVATED_MESSAGE,
            ));
        }
        return Ok(ValidationPlan::Activate);
    }
    Ok(ValidationPlan::MarkUsed)
}

/// Check that `requester` may cancel the booking in `details`.
pub fn check_cancellation(
    details: &BookingDetails,
    requester: &User,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    if details.booking.user_id != requester.id && !requester.is_admin {
        return Err(Error::forbidden(GLOBAL_FIELD, INSUFFICIENT_RIGHTS_MESSAGE));
    }
    if details.booking.is_used {
        return Err(Error::invalid_request(
            "booking",
            "Impossible d'annuler une réservation consommée",
        ));
    }
    if !requester.is_admin && !details.is_user_cancellable(now) {
        return Err(Error::invalid_request(
            "booking",
            "Impossible d'annuler une réservation moins de 72h avant le début de l'évènement",
        ));
    }
    Ok(())
}

/// Everything [`check_new_booking`] needs to judge a booking request.
#[derive(Debug, Clone)]
pub struct BookingRequestContext<'a> {
    pub user: &'a User,
    pub stock: &'a Stock,
    pub offer: &'a Offer,
    pub offerer: &'a Offerer,
    pub quantity: i32,
    /// Places already held by non-cancelled bookings on the stock.
    pub booked_quantity: i64,
    /// Current wallet balance of the user.
    pub wallet_balance: Decimal,
    /// Expenses of the user before this booking.
    pub expenses: &'a crate::domain::Expenses,
    pub now: DateTime<Utc>,
}

/// Apply the booking creation rules in order; the first failure wins.
pub fn check_new_booking(ctx: &BookingRequestContext<'_>) -> Result<(), Error> {
    if ctx.quantity < 1 {
        return Err(Error::invalid_request(
            "quantity",
            "Vous devez réserver une place ou plus.",
        ));
    }
    if ctx.stock.is_soft_deleted || !ctx.offer.is_active || !ctx.offerer.is_active {
        return Err(Error::invalid_request(
            "stockId",
            "Cette offre a été retirée. Elle n'est plus valable.",
        ));
    }
    if ctx.stock.booking_limit_passed(ctx.now) {
        return Err(Error::invalid_request(
            GLOBAL_FIELD,
            "La date limite de réservation de cette offre est dépassée",
        ));
    }
    if !ctx.user.can_book_free_offers && !ctx.offer.product_type.is_activation() {
        return Err(Error::invalid_request(
            "cannotBookFreeOffers",
            "Votre compte ne vous permet pas de faire de réservation.",
        ));
    }
    let insufficient_funds = || {
        Error::invalid_request(
            "insufficientFunds",
            "Le solde de votre pass est insuffisant pour réserver cette offre.",
        )
    };
    let value = ctx
        .stock
        .price
        .checked_mul(Decimal::from(ctx.quantity))
        .ok_or_else(insufficient_funds)?;
    if value > ctx.wallet_balance {
        return Err(insufficient_funds());
    }
    ctx.expenses.check_new_spend(ctx.offer, value)?;
    check_availability(ctx.stock, ctx.booked_quantity, i64::from(ctx.quantity))
}

/// Reject a booking of `quantity` places when `booked` are already taken.
pub fn check_availability(stock: &Stock, booked: i64, quantity: i64) -> Result<(), Error> {
    match stock.available {
        Some(available) if booked + quantity > available => {
            Err(Error::invalid_request(GLOBAL_FIELD, OVERBOOKING_MESSAGE))
        }
        _ => Ok(()),
    }
}

/// Whether `user` may see bookings of `offerer_id` in exports.
pub fn can_export(user: &User, links: &[UserOfferer], offerer_id: crate::domain::OffererId) -> bool {
    has_rights(user, links, RightsType::Editor, offerer_id)
}
