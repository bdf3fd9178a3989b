//! Port for venue persistence.
use async_trait::async_trait;

use crate::domain::{OffererId, Venue, VenueId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by venue repository adapters.
    pub enum VenueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "venue repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "venue repository query failed: {message}",
        /// Another venue already holds the SIRET.
        DuplicateSiret { siret: String } => "a venue already exists with SIRET {siret}",
        /// At least one offer of the venue still has stocks.
        HasStocks => "venue offers still carry stocks",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VenueRepository: Send + Sync {
    /// Fetch a venue by identifier.
    async fn find_by_id(&self, id: &VenueId) -> Result<Option<Venue>, VenueRepositoryError>;

    /// Venues managed by an offerer.
    async fn list_for_offerer(
        &self,
        offerer_id: &OffererId,
    ) -> Result<Vec<Venue>, VenueRepositoryError>;

    /// Store a new venue.
    async fn insert(&self, venue: &Venue) -> Result<(), VenueRepositoryError>;

    /// Delete the venue and its offers, refusing when any offer has stocks.
    ///
    /// Returns whether a venue was removed.
    async fn delete_with_offers(&self, id: &VenueId) -> Result<bool, VenueRepositoryError>;
}
