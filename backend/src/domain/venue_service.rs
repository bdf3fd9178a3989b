//! Venue use-cases.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{OfferView, VenueService};
use crate::domain::service_support::{UNKNOWN_OBJECT_MESSAGE, map_offer_error, map_venue_error};
use crate::domain::tokens::random_link_token;
use crate::domain::{
    Error, GLOBAL_FIELD, RepositoryPorts, RightsType, UserId, Venue, VenueDraft, VenueId,
};

/// Venue service implementing [`VenueService`].
#[derive(Clone)]
pub struct DomainVenueService {
    ports: RepositoryPorts,
}

impl DomainVenueService {
    /// Create a new service over the given ports.
    pub fn new(ports: RepositoryPorts) -> Self {
        Self { ports }
    }
}

#[async_trait]
impl VenueService for DomainVenueService {
    async fn create(&self, requester: &UserId, draft: VenueDraft) -> Result<Venue, Error> {
        let requester = self.ports.requester(requester).await?;
        let offerer_id = draft.managing_offerer_id.ok_or_else(|| {
            Error::invalid_request("managingOffererId", "Ce paramètre est obligatoire")
        })?;
        let offerer = self.ports.offerer(&offerer_id).await?;
        requester.ensure(RightsType::Editor, offerer.id)?;

        let virtual_venue_exists = self
            .ports
            .venues
            .list_for_offerer(&offerer.id)
            .await
            .map_err(map_venue_error)?
            .iter()
            .any(|venue| venue.is_virtual);
        let venue = draft.into_venue(&offerer, virtual_venue_exists, random_link_token())?;
        self.ports
            .venues
            .insert(&venue)
            .await
            .map_err(map_venue_error)?;
        info!(venue_id = %venue.id, offerer_id = %offerer.id, "venue created");
        Ok(venue)
    }

    async fn get(&self, requester: &UserId, id: &VenueId) -> Result<Venue, Error> {
        let requester = self.ports.requester(requester).await?;
        let venue = self.ports.venue(id).await?;
        requester.ensure(RightsType::Editor, venue.managing_offerer_id)?;
        Ok(venue)
    }

    async fn set_offers_active(
        &self,
        requester: &UserId,
        id: &VenueId,
        is_active: bool,
    ) -> Result<Vec<OfferView>, Error> {
        let requester = self.ports.requester(requester).await?;
        let venue = self.ports.venue(id).await?;
        requester.ensure(RightsType::Editor, venue.managing_offerer_id)?;

        let offers = self
            .ports
            .offers
            .set_active_for_venue(&venue.id, is_active)
            .await
            .map_err(map_offer_error)?;
        info!(venue_id = %venue.id, is_active, count = offers.len(), "venue offers toggled");

        let mut views = Vec::with_capacity(offers.len());
        for offer in offers {
            views.push(self.ports.offer_view(offer).await?);
        }
        Ok(views)
    }

    async fn delete(&self, id: &VenueId) -> Result<(), Error> {
        match self.ports.venues.delete_with_offers(id).await {
            Ok(true) => {
                info!(venue_id = %id, "venue deleted");
                Ok(())
            }
            Ok(false) => Err(Error::not_found(GLOBAL_FIELD, UNKNOWN_OBJECT_MESSAGE)),
            Err(err) => {
                warn!(venue_id = %id, error = %err, "venue deletion refused");
                Err(map_venue_error(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for venue use-cases.
    use super::*;
    use crate::domain::fixtures::{self, MockPorts};
    use crate::domain::ports::VenueRepositoryError;
    use crate::domain::{ErrorCode, OffererId, StockLevel, User};
    use rstest::{fixture, rstest};

    #[fixture]
    fn pro() -> User {
        fixtures::user("pro@example.com")
    }

    fn draft(offerer_id: OffererId) -> VenueDraft {
        VenueDraft {
            managing_offerer_id: Some(offerer_id),
            name: "Cinéma du centre".into(),
            siret: Some("12345678900012".into()),
            postal_code: Some("75001".into()),
            city: Some("Paris".into()),
            ..VenueDraft::default()
        }
    }

    #[rstest]
    #[tokio::test]
    async fn create_refuses_a_second_virtual_venue(pro: User) {
        let offerer = fixtures::offerer();
        let offerer_id = offerer.id;
        let mut ports = MockPorts::default();
        let links = vec![fixtures::link(&pro, offerer_id, RightsType::Editor)];
        ports.with_requester(&pro, links);
        ports
            .offerers
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(offerer)));
        ports
            .venues
            .expect_list_for_offerer()
            .return_once(move |_| Ok(vec![Venue::virtual_for(offerer_id)]));
        ports.venues.expect_insert().never();

        let mut request = draft(offerer_id);
        request.is_virtual = true;
        request.siret = None;
        let err = DomainVenueService::new(ports.into_ports())
            .create(&pro.id, request)
            .await
            .expect_err("duplicate virtual venue");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.messages("isVirtual"),
            ["Un lieu pour les offres numériques existe déjà pour cette structure"]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn create_stores_validated_venue_with_siret(pro: User) {
        let offerer = fixtures::offerer();
        let offerer_id = offerer.id;
        let mut ports = MockPorts::default();
        let links = vec![fixtures::link(&pro, offerer_id, RightsType::Editor)];
        ports.with_requester(&pro, links);
        ports
            .offerers
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(offerer)));
        ports
            .venues
            .expect_list_for_offerer()
            .return_once(|_| Ok(Vec::new()));
        ports
            .venues
            .expect_insert()
            .withf(|venue| {
                venue.is_validated() && venue.departement_code.as_deref() == Some("75")
            })
            .times(1)
            .return_once(|_| Ok(()));

        let venue = DomainVenueService::new(ports.into_ports())
            .create(&pro.id, draft(offerer_id))
            .await
            .expect("created");

        assert_eq!(venue.managing_offerer_id, offerer_id);
    }

    #[rstest]
    #[tokio::test]
    async fn create_requires_rights_on_the_offerer(pro: User) {
        let offerer = fixtures::offerer();
        let offerer_id = offerer.id;
        let mut ports = MockPorts::default();
        ports.with_requester(&pro, Vec::new());
        ports
            .offerers
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(offerer)));

        let err = DomainVenueService::new(ports.into_ports())
            .create(&pro.id, draft(offerer_id))
            .await
            .expect_err("forbidden");

        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn get_reports_unknown_venue(pro: User) {
        let mut ports = MockPorts::default();
        ports.with_requester(&pro, Vec::new());
        ports.venues.expect_find_by_id().return_once(|_| Ok(None));

        let err = DomainVenueService::new(ports.into_ports())
            .get(&pro.id, &VenueId::random())
            .await
            .expect_err("unknown venue");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn deactivating_offers_reports_stock_alerts(pro: User) {
        let venue = fixtures::venue(fixtures::offerer().id);
        let offerer_id = venue.managing_offerer_id;
        let mut offer = fixtures::thing_offer(&venue);
        offer.is_active = false;
        let stock = fixtures::stock(&offer, 10, Some(5));
        let found = venue.clone();
        let mut ports = MockPorts::default();
        let links = vec![fixtures::link(&pro, offerer_id, RightsType::Editor)];
        ports.with_requester(&pro, links);
        ports
            .venues
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(found)));
        ports
            .offers
            .expect_set_active_for_venue()
            .withf(|_, is_active| !is_active)
            .return_once(move |_, _| Ok(vec![offer]));
        ports
            .offers
            .expect_stock_levels()
            .return_once(move |_| Ok(vec![StockLevel { stock, booked: 2 }]));

        let views = DomainVenueService::new(ports.into_ports())
            .set_offers_active(&pro.id, &venue.id, false)
            .await
            .expect("toggled");

        assert_eq!(views.len(), 1);
        assert!(!views[0].offer.is_active);
        assert_eq!(views[0].stock_alert_message, "encore 3 en stock");
    }

    #[tokio::test]
    async fn delete_refuses_venues_whose_offers_have_stocks() {
        let mut ports = MockPorts::default();
        ports
            .venues
            .expect_delete_with_offers()
            .return_once(|_| Err(VenueRepositoryError::has_stocks()));

        let err = DomainVenueService::new(ports.into_ports())
            .delete(&VenueId::random())
            .await
            .expect_err("has stocks");

        assert_eq!(
            err.messages(GLOBAL_FIELD),
            ["Offres non supprimables car au moins une contient des stocks"]
        );
    }
}
