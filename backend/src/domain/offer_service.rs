//! Offer, stock and mediation use-cases.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{MediationDraft, MediationPatch, OfferService, OfferView};
use crate::domain::service_support::{Requester, UNKNOWN_OBJECT_MESSAGE, map_offer_error};
use crate::domain::{
    Error, Mediation, MediationId, Offer, OfferDraft, OfferId, RepositoryPorts, RightsType, Stock,
    StockDraft, UserId, visible_departement_codes,
};

/// Offer service implementing [`OfferService`].
#[derive(Clone)]
pub struct DomainOfferService {
    ports: RepositoryPorts,
    clock: Arc<dyn Clock>,
}

impl DomainOfferService {
    /// Create a new service over the given ports.
    pub fn new(ports: RepositoryPorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    /// Load an offer and check the requester may edit it.
    async fn editable_offer(&self, requester: &Requester, id: &OfferId) -> Result<Offer, Error> {
        let offer = self.ports.offer(id).await?;
        let venue = self.ports.venue(&offer.venue_id).await?;
        requester.ensure(RightsType::Editor, venue.managing_offerer_id)?;
        Ok(offer)
    }

    async fn editable_mediation(
        &self,
        requester: &Requester,
        id: &MediationId,
    ) -> Result<Mediation, Error> {
        let mediation = self
            .ports
            .offers
            .find_mediation(id)
            .await
            .map_err(map_offer_error)?
            .ok_or_else(|| Error::not_found("mediationId", UNKNOWN_OBJECT_MESSAGE))?;
        self.editable_offer(requester, &mediation.offer_id).await?;
        Ok(mediation)
    }
}

#[async_trait]
impl OfferService for DomainOfferService {
    async fn create_offer(&self, requester: &UserId, draft: OfferDraft) -> Result<Offer, Error> {
        let requester = self.ports.requester(requester).await?;
        let venue_id = draft
            .venue_id
            .ok_or_else(|| Error::invalid_request("venueId", "Ce paramètre est obligatoire"))?;
        let venue = self.ports.venue(&venue_id).await?;
        requester.ensure(RightsType::Editor, venue.managing_offerer_id)?;

        let offer = draft.into_offer(&venue, self.clock.utc())?;
        self.ports
            .offers
            .insert_offer(&offer)
            .await
            .map_err(map_offer_error)?;
        info!(offer_id = %offer.id, venue_id = %venue.id, "offer created");
        Ok(offer)
    }

    async fn get_offer(&self, id: &OfferId) -> Result<OfferView, Error> {
        let offer = self.ports.offer(id).await?;
        self.ports.offer_view(offer).await
    }

    async fn list_offers(&self, requester: &UserId) -> Result<Vec<Offer>, Error> {
        let user = self.ports.user(requester).await?;
        let departements = visible_departement_codes(&user.departement_code);
        self.ports
            .offers
            .list_visible(&departements)
            .await
            .map_err(map_offer_error)
    }

    async fn create_stock(&self, requester: &UserId, draft: StockDraft) -> Result<Stock, Error> {
        let requester = self.ports.requester(requester).await?;
        let offer_id = draft
            .offer_id
            .ok_or_else(|| Error::invalid_request("offerId", "Ce paramètre est obligatoire"))?;
        let offer = self.editable_offer(&requester, &offer_id).await?;

        let stock = draft.into_stock(&offer, self.clock.utc())?;
        self.ports
            .offers
            .insert_stock(&stock)
            .await
            .map_err(map_offer_error)?;
        info!(stock_id = %stock.id, offer_id = %offer.id, "stock created");
        Ok(stock)
    }

    async fn create_mediation(
        &self,
        requester: &UserId,
        draft: MediationDraft,
    ) -> Result<Mediation, Error> {
        let requester = self.ports.requester(requester).await?;
        let offer = self.editable_offer(&requester, &draft.offer_id).await?;

        let mediation = Mediation {
            id: MediationId::random(),
            offer_id: offer.id,
            author_id: Some(requester.user.id),
            credit: draft.credit,
            thumb_url: draft.thumb_url,
            is_active: true,
            date_created: self.clock.utc(),
        };
        self.ports
            .offers
            .insert_mediation(&mediation)
            .await
            .map_err(map_offer_error)?;
        info!(mediation_id = %mediation.id, offer_id = %offer.id, "mediation created");
        Ok(mediation)
    }

    async fn get_mediation(
        &self,
        requester: &UserId,
        id: &MediationId,
    ) -> Result<Mediation, Error> {
        let requester = self.ports.requester(requester).await?;
        self.editable_mediation(&requester, id).await
    }

    async fn update_mediation(
        &self,
        requester: &UserId,
        id: &MediationId,
        patch: MediationPatch,
    ) -> Result<Mediation, Error> {
        let requester = self.ports.requester(requester).await?;
        let mut mediation = self.editable_mediation(&requester, id).await?;
        if let Some(is_active) = patch.is_active {
            mediation.is_active = is_active;
        }
        if let Some(credit) = patch.credit {
            mediation.credit = Some(credit);
        }
        self.ports
            .offers
            .update_mediation(&mediation)
            .await
            .map_err(map_offer_error)?;
        Ok(mediation)
    }
}

#[cfg(test)]
#[path = "offer_service_tests.rs"]
mod tests;
