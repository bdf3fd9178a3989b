//! Repository bundle and error mapping shared by the domain services.

use std::sync::Arc;

use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, DepositRepository, DepositRepositoryError,
    OfferRepository, OfferRepositoryError, OffererRepository, OffererRepositoryError,
    PaymentRepository, PaymentRepositoryError, UserPersistenceError, UserRepository,
    OfferView, VenueRepository, VenueRepositoryError,
};
use crate::domain::{
    ALREADY_ACTIVATED_MESSAGE, Error, GLOBAL_FIELD, OVERBOOKING_MESSAGE, Offer, OfferId, Offerer, OffererId, RightsType,
    User, UserId, UserOfferer, Venue, VenueId, ensure_rights, stock_alert_message,
};

/// Message raised when an identifier resolves to nothing.
pub const UNKNOWN_OBJECT_MESSAGE: &str =
    "Aucun objet ne correspond à cet identifiant dans notre base de données";

/// Message raised when a validation token resolves to nothing.
pub(crate) const UNKNOWN_VALIDATION_TOKEN_MESSAGE: &str =
    "Aucun(e) objet ne correspond à ce code de validation ou l'objet est déjà validé";

/// Driven ports required by the domain services.
#[derive(Clone)]
pub struct RepositoryPorts {
    pub users: Arc<dyn UserRepository>,
    pub offerers: Arc<dyn OffererRepository>,
    pub venues: Arc<dyn VenueRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub deposits: Arc<dyn DepositRepository>,
    pub payments: Arc<dyn PaymentRepository>,
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::invalid_request("email", "Un compte lié à cet email existe déjà")
        }
    }
}

pub(crate) fn map_offerer_error(error: OffererRepositoryError) -> Error {
    match error {
        OffererRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("offerer repository unavailable: {message}"))
        }
        OffererRepositoryError::Query { message } => {
            Error::internal(format!("offerer repository error: {message}"))
        }
        OffererRepositoryError::DuplicateSiren { .. } => Error::invalid_request(
            "siren",
            "Une entrée avec cet identifiant existe déjà dans notre base de données",
        ),
        OffererRepositoryError::DuplicateLink => Error::invalid_request(
            GLOBAL_FIELD,
            "Une entrée avec cet identifiant existe déjà dans notre base de données",
        ),
    }
}

pub(crate) fn map_venue_error(error: VenueRepositoryError) -> Error {
    match error {
        VenueRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("venue repository unavailable: {message}"))
        }
        VenueRepositoryError::Query { message } => {
            Error::internal(format!("venue repository error: {message}"))
        }
        VenueRepositoryError::DuplicateSiret { .. } => Error::invalid_request(
            "siret",
            "Une entrée avec cet identifiant existe déjà dans notre base de données",
        ),
        VenueRepositoryError::HasStocks => Error::invalid_request(
            GLOBAL_FIELD,
            "Offres non supprimables car au moins une contient des stocks",
        ),
    }
}

pub(crate) fn map_offer_error(error: OfferRepositoryError) -> Error {
    match error {
        OfferRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("offer repository unavailable: {message}"))
        }
        OfferRepositoryError::Query { message } => {
            Error::internal(format!("offer repository error: {message}"))
        }
    }
}

pub(crate) fn map_booking_error(error: BookingRepositoryError) -> Error {
    match error {
        BookingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("booking repository unavailable: {message}"))
        }
        BookingRepositoryError::Query { message } => {
            Error::internal(format!("booking repository error: {message}"))
        }
        BookingRepositoryError::Overbooked => {
            Error::invalid_request(GLOBAL_FIELD, OVERBOOKING_MESSAGE)
        }
        BookingRepositoryError::DuplicateToken { token } => {
            Error::internal(format!("booking token collision on {token}"))
        }
        BookingRepositoryError::AlreadyActivated => {
            Error::already_processed(GLOBAL_FIELD, ALREADY_ACTIVATED_MESSAGE)
        }
    }
}

pub(crate) fn map_deposit_error(error: DepositRepositoryError) -> Error {
    match error {
        DepositRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("deposit repository unavailable: {message}"))
        }
        DepositRepositoryError::Query { message } => {
            Error::internal(format!("deposit repository error: {message}"))
        }
    }
}

pub(crate) fn map_payment_error(error: PaymentRepositoryError) -> Error {
    match error {
        PaymentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("payment repository unavailable: {message}"))
        }
        PaymentRepositoryError::Query { message } => {
            Error::internal(format!("payment repository error: {message}"))
        }
    }
}

/// Authenticated user behind a session, with their offerer links.
pub(crate) struct Requester {
    pub(crate) user: User,
    pub(crate) links: Vec<UserOfferer>,
}

impl Requester {
    pub(crate) fn ensure(&self, required: RightsType, offerer_id: OffererId) -> Result<(), Error> {
        ensure_rights(&self.user, &self.links, required, offerer_id)
    }

    pub(crate) fn ensure_admin(&self) -> Result<(), Error> {
        if self.user.is_admin {
            Ok(())
        } else {
            Err(Error::forbidden(
                GLOBAL_FIELD,
                crate::domain::INSUFFICIENT_RIGHTS_MESSAGE,
            ))
        }
    }
}

impl RepositoryPorts {
    /// Load the session user; a vanished account is treated as signed out.
    pub(crate) async fn user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(GLOBAL_FIELD, "Authentification nécessaire"))
    }

    pub(crate) async fn requester(&self, id: &UserId) -> Result<Requester, Error> {
        let user = self.user(id).await?;
        let links = self
            .offerers
            .links_for_user(&user.id)
            .await
            .map_err(map_offerer_error)?;
        Ok(Requester { user, links })
    }

    pub(crate) async fn offerer(&self, id: &OffererId) -> Result<Offerer, Error> {
        self.offerers
            .find_by_id(id)
            .await
            .map_err(map_offerer_error)?
            .ok_or_else(|| Error::not_found("offererId", UNKNOWN_OBJECT_MESSAGE))
    }

    pub(crate) async fn venue(&self, id: &VenueId) -> Result<Venue, Error> {
        self.venues
            .find_by_id(id)
            .await
            .map_err(map_venue_error)?
            .ok_or_else(|| Error::not_found("venueId", UNKNOWN_OBJECT_MESSAGE))
    }

    /// Offer with its stock levels and alert message.
    pub(crate) async fn offer_view(&self, offer: Offer) -> Result<OfferView, Error> {
        let stocks = self
            .offers
            .stock_levels(&offer.id)
            .await
            .map_err(map_offer_error)?;
        Ok(OfferView {
            stock_alert_message: stock_alert_message(offer.is_event(), &stocks),
            stocks,
            offer,
        })
    }

    pub(crate) async fn offer(&self, id: &OfferId) -> Result<Offer, Error> {
        self.offers
            .find_offer(id)
            .await
            .map_err(map_offer_error)?
            .ok_or_else(|| Error::not_found("offerId", UNKNOWN_OBJECT_MESSAGE))
    }
}
