//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain driving ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountService, BookingService, OfferService, OffererService, PaymentService, VenueService,
};
use crate::domain::{
    DomainAccountService, DomainBookingService, DomainOfferService, DomainOffererService,
    DomainPaymentService, DomainVenueService, FeatureFlags, RepositoryPorts,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub offerers: Arc<dyn OffererService>,
    pub venues: Arc<dyn VenueService>,
    pub offers: Arc<dyn OfferService>,
    pub bookings: Arc<dyn BookingService>,
    pub payments: Arc<dyn PaymentService>,
    pub features: FeatureFlags,
}

impl HttpState {
    /// Domain services over `ports`, sharing one clock, with every feature
    /// active.
    pub fn from_ports(ports: RepositoryPorts, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: Arc::new(DomainAccountService::new(ports.clone(), clock.clone())),
            offerers: Arc::new(DomainOffererService::new(ports.clone(), clock.clone())),
            venues: Arc::new(DomainVenueService::new(ports.clone())),
            offers: Arc::new(DomainOfferService::new(ports.clone(), clock.clone())),
            bookings: Arc::new(DomainBookingService::new(ports.clone(), clock.clone())),
            payments: Arc::new(DomainPaymentService::new(ports, clock)),
            features: FeatureFlags::default(),
        }
    }

    #[must_use]
    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }
}
