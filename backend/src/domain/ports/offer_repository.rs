//! Port for offers, their stocks and their mediations.
use async_trait::async_trait;

use crate::domain::{
    Mediation, MediationId, Offer, OfferId, Stock, StockId, StockLevel, VenueId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by offer repository adapters.
    pub enum OfferRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "offer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "offer repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Fetch an offer by identifier.
    async fn find_offer(&self, id: &OfferId) -> Result<Option<Offer>, OfferRepositoryError>;

    /// Store a new offer.
    async fn insert_offer(&self, offer: &Offer) -> Result<(), OfferRepositoryError>;

    /// Offers published at a venue, newest first.
    async fn list_for_venue(&self, venue_id: &VenueId) -> Result<Vec<Offer>, OfferRepositoryError>;

    /// Set `is_active` on every offer of a venue and return them.
    async fn set_active_for_venue(
        &self,
        venue_id: &VenueId,
        is_active: bool,
    ) -> Result<Vec<Offer>, OfferRepositoryError>;

    /// Active offers of active offerers that are digital or located in one
    /// of `departement_codes`.
    async fn list_visible(
        &self,
        departement_codes: &[String],
    ) -> Result<Vec<Offer>, OfferRepositoryError>;

    /// Fetch a stock by identifier.
    async fn find_stock(&self, id: &StockId) -> Result<Option<Stock>, OfferRepositoryError>;

    /// Store a new stock.
    async fn insert_stock(&self, stock: &Stock) -> Result<(), OfferRepositoryError>;

    /// Stocks of an offer with their booked quantities.
    async fn stock_levels(&self, offer_id: &OfferId)
    -> Result<Vec<StockLevel>, OfferRepositoryError>;

    /// Fetch a mediation by identifier.
    async fn find_mediation(
        &self,
        id: &MediationId,
    ) -> Result<Option<Mediation>, OfferRepositoryError>;

    /// Store a new mediation.
    async fn insert_mediation(&self, mediation: &Mediation) -> Result<(), OfferRepositoryError>;

    /// Overwrite an existing mediation.
    async fn update_mediation(&self, mediation: &Mediation) -> Result<(), OfferRepositoryError>;
}
