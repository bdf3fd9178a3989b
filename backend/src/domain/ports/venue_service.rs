//! Driving port for venues.

use async_trait::async_trait;

use crate::domain::ports::OfferView;
use crate::domain::{Error, UserId, Venue, VenueDraft, VenueId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VenueService: Send + Sync {
    /// Create a venue; requires editor rights on its offerer.
    async fn create(&self, requester: &UserId, draft: VenueDraft) -> Result<Venue, Error>;

    /// One venue; requires editor rights on its offerer.
    async fn get(&self, requester: &UserId, id: &VenueId) -> Result<Venue, Error>;

    /// Activate or deactivate every offer of a venue.
    async fn set_offers_active(
        &self,
        requester: &UserId,
        id: &VenueId,
        is_active: bool,
    ) -> Result<Vec<OfferView>, Error>;

    /// Remove a venue and its offers unless an offer carries stocks.
    async fn delete(&self, id: &VenueId) -> Result<(), Error>;
}
