//! Port for offerers and the user links granting rights over them.
use async_trait::async_trait;

use crate::domain::{Offerer, OffererId, UserId, UserOfferer, Venue};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by offerer repository adapters.
    pub enum OffererRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "offerer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "offerer repository query failed: {message}",
        /// Another offerer already holds the SIREN.
        DuplicateSiren { siren: String } => "an offerer already exists with SIREN {siren}",
        /// The user is already linked to the offerer.
        DuplicateLink => "user is already linked to this offerer",
    }
}

/// What a user manages through their offerer links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagedActivity {
    /// At least one linked offerer owns a non-virtual venue.
    pub has_physical_venues: bool,
    /// At least one linked offerer owns an offer.
    pub has_offers: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OffererRepository: Send + Sync {
    /// Fetch an offerer by identifier.
    async fn find_by_id(&self, id: &OffererId) -> Result<Option<Offerer>, OffererRepositoryError>;

    /// Fetch an offerer by SIREN.
    async fn find_by_siren(&self, siren: &str) -> Result<Option<Offerer>, OffererRepositoryError>;

    /// Fetch the offerer awaiting validation with `token`.
    async fn find_by_validation_token(
        &self,
        token: &str,
    ) -> Result<Option<Offerer>, OffererRepositoryError>;

    /// Every offerer, for global administrators.
    async fn list_all(&self) -> Result<Vec<Offerer>, OffererRepositoryError>;

    /// Offerers the user is linked to, validated or not.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Offerer>, OffererRepositoryError>;

    /// Store an offerer, its virtual venue and its first link atomically.
    async fn create_with_virtual_venue(
        &self,
        offerer: &Offerer,
        venue: &Venue,
        link: &UserOfferer,
    ) -> Result<(), OffererRepositoryError>;

    /// Overwrite an existing offerer.
    async fn update(&self, offerer: &Offerer) -> Result<(), OffererRepositoryError>;

    /// Number of offers across the offerer's venues.
    async fn count_offers(&self, id: &OffererId) -> Result<i64, OffererRepositoryError>;

    /// Every link of a user.
    async fn links_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserOfferer>, OffererRepositoryError>;

    /// Store a new link.
    async fn insert_link(&self, link: &UserOfferer) -> Result<(), OffererRepositoryError>;

    /// Fetch the link awaiting validation with `token`.
    async fn find_link_by_validation_token(
        &self,
        token: &str,
    ) -> Result<Option<UserOfferer>, OffererRepositoryError>;

    /// Overwrite an existing link.
    async fn update_link(&self, link: &UserOfferer) -> Result<(), OffererRepositoryError>;

    /// Venues and offers reachable through the user's links.
    async fn managed_activity(
        &self,
        user_id: &UserId,
    ) -> Result<ManagedActivity, OffererRepositoryError>;
}
