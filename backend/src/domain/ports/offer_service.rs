//! Driving port for offers, stocks and mediations.

use async_trait::async_trait;

use crate::domain::{
    Error, Mediation, MediationId, Offer, OfferDraft, OfferId, Stock, StockDraft, StockLevel,
    UserId,
};

/// Offer with its stocks and a summary of what is left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferView {
    pub offer: Offer,
    pub stocks: Vec<StockLevel>,
    pub stock_alert_message: String,
}

/// Client input for a new mediation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediationDraft {
    pub offer_id: OfferId,
    pub credit: Option<String>,
    pub thumb_url: Option<String>,
}

/// Editable fields of a mediation; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediationPatch {
    pub is_active: Option<bool>,
    pub credit: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferService: Send + Sync {
    /// Publish an offer at a venue; requires editor rights.
    async fn create_offer(&self, requester: &UserId, draft: OfferDraft) -> Result<Offer, Error>;

    /// One offer with its stocks.
    async fn get_offer(&self, id: &OfferId) -> Result<OfferView, Error>;

    /// Active offers visible from the requester's department.
    async fn list_offers(&self, requester: &UserId) -> Result<Vec<Offer>, Error>;

    /// Add a stock to an offer; requires editor rights.
    async fn create_stock(&self, requester: &UserId, draft: StockDraft) -> Result<Stock, Error>;

    /// Illustrate an offer; requires editor rights.
    async fn create_mediation(
        &self,
        requester: &UserId,
        draft: MediationDraft,
    ) -> Result<Mediation, Error>;

    /// One mediation; requires editor rights.
    async fn get_mediation(&self, requester: &UserId, id: &MediationId)
    -> Result<Mediation, Error>;

    /// Edit a mediation; requires editor rights.
    async fn update_mediation(
        &self,
        requester: &UserId,
        id: &MediationId,
        patch: MediationPatch,
    ) -> Result<Mediation, Error>;
}
