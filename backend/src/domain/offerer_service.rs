//! Offerer use-cases and the links granting users rights over offerers.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{NewUserOfferer, OffererDraft, OffererService, OffererView};
use crate::domain::service_support::{
    Requester, UNKNOWN_OBJECT_MESSAGE, UNKNOWN_VALIDATION_TOKEN_MESSAGE, map_offerer_error,
    map_user_error, map_venue_error,
};
use crate::domain::tokens::random_link_token;
use crate::domain::{
    Error, ErrorCode, ErrorCollector, GLOBAL_FIELD, Offerer, OffererId, RepositoryPorts,
    RightsType, Siren, UserId, UserOfferer, UserOffererId, Venue, has_rights,
};

/// Offerer service implementing [`OffererService`].
#[derive(Clone)]
pub struct DomainOffererService {
    ports: RepositoryPorts,
    clock: Arc<dyn Clock>,
}

impl DomainOffererService {
    /// Create a new service over the given ports.
    pub fn new(ports: RepositoryPorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    async fn view(&self, requester: &Requester, offerer: Offerer) -> Result<OffererView, Error> {
        let n_offers = self
            .ports
            .offerers
            .count_offers(&offerer.id)
            .await
            .map_err(map_offerer_error)?;
        let managed_venues = self
            .ports
            .venues
            .list_for_offerer(&offerer.id)
            .await
            .map_err(map_venue_error)?;
        Ok(OffererView {
            user_has_access: has_rights(
                &requester.user,
                &requester.links,
                RightsType::Editor,
                offerer.id,
            ),
            n_offers,
            managed_venues,
            offerer,
        })
    }

    fn parse_draft(draft: &OffererDraft) -> Result<Siren, Error> {
        let mut errors = ErrorCollector::new();
        if draft.name.trim().is_empty() {
            errors.add("name", "Ce paramètre est obligatoire");
        }
        if draft.postal_code.trim().is_empty() {
            errors.add("postalCode", "Ce paramètre est obligatoire");
        }
        if draft.city.trim().is_empty() {
            errors.add("city", "Ce paramètre est obligatoire");
        }
        let siren = Siren::parse(&draft.siren);
        if let Err(err) = &siren {
            for message in err.messages("siren") {
                errors.add("siren", message.clone());
            }
        }
        errors.into_result(ErrorCode::InvalidRequest)?;
        siren
    }

    async fn join_existing(
        &self,
        mut requester: Requester,
        offerer: Offerer,
    ) -> Result<OffererView, Error> {
        let link = UserOfferer {
            id: UserOffererId::random(),
            user_id: requester.user.id,
            offerer_id: offerer.id,
            rights: RightsType::Editor,
            validation_token: Some(random_link_token()),
        };
        self.ports
            .offerers
            .insert_link(&link)
            .await
            .map_err(map_offerer_error)?;
        info!(offerer_id = %offerer.id, user_id = %link.user_id, "offerer join requested");
        requester.links.push(link);
        self.view(&requester, offerer).await
    }

    async fn create_new(
        &self,
        mut requester: Requester,
        draft: OffererDraft,
        siren: Siren,
    ) -> Result<OffererView, Error> {
        let offerer = Offerer {
            id: OffererId::random(),
            name: draft.name.trim().to_owned(),
            siren,
            address: draft.address.filter(|address| !address.trim().is_empty()),
            postal_code: draft.postal_code.trim().to_owned(),
            city: draft.city.trim().to_owned(),
            is_active: true,
            validation_token: Some(random_link_token()),
            bank_information: None,
            date_created: self.clock.utc(),
        };
        let venue = Venue::virtual_for(offerer.id);
        let link = UserOfferer {
            id: UserOffererId::random(),
            user_id: requester.user.id,
            offerer_id: offerer.id,
            rights: RightsType::Editor,
            validation_token: None,
        };
        self.ports
            .offerers
            .create_with_virtual_venue(&offerer, &venue, &link)
            .await
            .map_err(map_offerer_error)?;
        info!(offerer_id = %offerer.id, "offerer created");
        requester.links.push(link);
        self.view(&requester, offerer).await
    }
}

#[async_trait]
impl OffererService for DomainOffererService {
    async fn create(
        &self,
        requester: &UserId,
        draft: OffererDraft,
    ) -> Result<OffererView, Error> {
        let requester = self.ports.requester(requester).await?;
        let siren = Self::parse_draft(&draft)?;
        let existing = self
            .ports
            .offerers
            .find_by_siren(siren.as_str())
            .await
            .map_err(map_offerer_error)?;
        match existing {
            Some(offerer) => self.join_existing(requester, offerer).await,
            None => self.create_new(requester, draft, siren).await,
        }
    }

    async fn list(&self, requester: &UserId) -> Result<Vec<OffererView>, Error> {
        let requester = self.ports.requester(requester).await?;
        let offerers = if requester.user.is_admin {
            self.ports.offerers.list_all().await
        } else {
            self.ports.offerers.list_for_user(&requester.user.id).await
        }
        .map_err(map_offerer_error)?;

        let mut views = Vec::with_capacity(offerers.len());
        for offerer in offerers {
            views.push(self.view(&requester, offerer).await?);
        }
        Ok(views)
    }

    async fn get(&self, requester: &UserId, id: &OffererId) -> Result<OffererView, Error> {
        let requester = self.ports.requester(requester).await?;
        let offerer = self.ports.offerer(id).await?;
        requester.ensure(RightsType::Editor, offerer.id)?;
        self.view(&requester, offerer).await
    }

    async fn set_active(
        &self,
        requester: &UserId,
        id: &OffererId,
        is_active: bool,
    ) -> Result<OffererView, Error> {
        let requester = self.ports.requester(requester).await?;
        let mut offerer = self.ports.offerer(id).await?;
        requester.ensure(RightsType::Admin, offerer.id)?;
        offerer.is_active = is_active;
        self.ports
            .offerers
            .update(&offerer)
            .await
            .map_err(map_offerer_error)?;
        info!(offerer_id = %offerer.id, is_active, "offerer activity changed");
        self.view(&requester, offerer).await
    }

    async fn validate(&self, token: &str) -> Result<(), Error> {
        let mut offerer = self
            .ports
            .offerers
            .find_by_validation_token(token)
            .await
            .map_err(map_offerer_error)?
            .ok_or_else(|| Error::not_found(GLOBAL_FIELD, UNKNOWN_VALIDATION_TOKEN_MESSAGE))?;
        offerer.validation_token = None;
        self.ports
            .offerers
            .update(&offerer)
            .await
            .map_err(map_offerer_error)?;
        info!(offerer_id = %offerer.id, "offerer validated");
        Ok(())
    }

    async fn links(
        &self,
        requester: &UserId,
        offerer_id: &OffererId,
    ) -> Result<Vec<UserOfferer>, Error> {
        let requester = self.ports.requester(requester).await?;
        Ok(requester
            .links
            .into_iter()
            .filter(|link| link.offerer_id == *offerer_id)
            .collect())
    }

    async fn add_link(
        &self,
        requester: &UserId,
        request: NewUserOfferer,
    ) -> Result<UserOfferer, Error> {
        let requester = self.ports.requester(requester).await?;
        let offerer = self.ports.offerer(&request.offerer_id).await?;
        requester.ensure(RightsType::Admin, offerer.id)?;
        self.ports
            .users
            .find_by_id(&request.user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("userId", UNKNOWN_OBJECT_MESSAGE))?;

        let link = UserOfferer {
            id: UserOffererId::random(),
            user_id: request.user_id,
            offerer_id: offerer.id,
            rights: request.rights,
            validation_token: Some(random_link_token()),
        };
        self.ports
            .offerers
            .insert_link(&link)
            .await
            .map_err(map_offerer_error)?;
        info!(offerer_id = %offerer.id, user_id = %link.user_id, "offerer link created");
        Ok(link)
    }

    async fn validate_link(&self, token: &str) -> Result<(), Error> {
        let mut link = self
            .ports
            .offerers
            .find_link_by_validation_token(token)
            .await
            .map_err(map_offerer_error)?
            .ok_or_else(|| Error::not_found(GLOBAL_FIELD, UNKNOWN_VALIDATION_TOKEN_MESSAGE))?;
        link.validation_token = None;
        self.ports
            .offerers
            .update_link(&link)
            .await
            .map_err(map_offerer_error)?;
        info!(link_id = %link.id, "offerer link validated");
        Ok(())
    }
}

#[cfg(test)]
#[path = "offerer_service_tests.rs"]
mod tests;
