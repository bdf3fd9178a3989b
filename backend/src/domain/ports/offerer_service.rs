//! Driving port for offerers and the links binding users to them.

use async_trait::async_trait;

use crate::domain::{Error, Offerer, OffererId, RightsType, UserId, UserOfferer, Venue};

/// Client input for a new offerer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffererDraft {
    pub name: String,
    pub siren: String,
    pub address: Option<String>,
    pub postal_code: String,
    pub city: String,
}

/// Offerer as shown to a given user.
#[derive(Debug, Clone, PartialEq)]
pub struct OffererView {
    pub offerer: Offerer,
    pub n_offers: i64,
    pub user_has_access: bool,
    pub managed_venues: Vec<Venue>,
}

/// Request to link a user to an offerer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserOfferer {
    pub user_id: UserId,
    pub offerer_id: OffererId,
    pub rights: RightsType,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OffererService: Send + Sync {
    /// Create the offerer, or ask to join it when its SIREN is already known.
    async fn create(&self, requester: &UserId, draft: OffererDraft)
    -> Result<OffererView, Error>;

    /// Offerers the requester is linked to; every offerer for admins.
    async fn list(&self, requester: &UserId) -> Result<Vec<OffererView>, Error>;

    /// One offerer; requires editor rights.
    async fn get(&self, requester: &UserId, id: &OffererId) -> Result<OffererView, Error>;

    /// Toggle `is_active`; requires admin rights.
    async fn set_active(
        &self,
        requester: &UserId,
        id: &OffererId,
        is_active: bool,
    ) -> Result<OffererView, Error>;

    /// Consume an offerer validation token.
    async fn validate(&self, token: &str) -> Result<(), Error>;

    /// Links between the requester and an offerer.
    async fn links(
        &self,
        requester: &UserId,
        offerer_id: &OffererId,
    ) -> Result<Vec<UserOfferer>, Error>;

    /// Create a link pending validation; requires admin rights.
    async fn add_link(
        &self,
        requester: &UserId,
        request: NewUserOfferer,
    ) -> Result<UserOfferer, Error>;

    /// Consume a link validation token.
    async fn validate_link(&self, token: &str) -> Result<(), Error>;
}
