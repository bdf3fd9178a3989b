//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) describe what the domain needs from storage;
//! each exposes a typed error built with [`define_port_error!`]. Driving
//! ports (`*Service`) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod booking_repository;
mod booking_service;
mod deposit_repository;
mod offer_repository;
mod offer_service;
mod offerer_repository;
mod offerer_service;
mod payment_repository;
mod payment_service;
mod user_repository;
mod venue_repository;
mod venue_service;

#[cfg(test)]
pub use account_service::MockAccountService;
pub use account_service::{AccountService, SignUpRequest, UserProfile};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{BookingExportFilter, BookingRepository, BookingRepositoryError};
#[cfg(test)]
pub use booking_service::MockBookingService;
pub use booking_service::{BookingExport, BookingService, BookingView};
#[cfg(test)]
pub use deposit_repository::MockDepositRepository;
pub use deposit_repository::{DepositRepository, DepositRepositoryError};
#[cfg(test)]
pub use offer_repository::MockOfferRepository;
pub use offer_repository::{OfferRepository, OfferRepositoryError};
#[cfg(test)]
pub use offer_service::MockOfferService;
pub use offer_service::{MediationDraft, MediationPatch, OfferService, OfferView};
#[cfg(test)]
pub use offerer_repository::MockOffererRepository;
pub use offerer_repository::{ManagedActivity, OffererRepository, OffererRepositoryError};
#[cfg(test)]
pub use offerer_service::MockOffererService;
pub use offerer_service::{NewUserOfferer, OffererDraft, OffererService, OffererView};
#[cfg(test)]
pub use payment_repository::MockPaymentRepository;
pub use payment_repository::{PaymentRepository, PaymentRepositoryError};
#[cfg(test)]
pub use payment_service::MockPaymentService;
pub use payment_service::{PaymentMessageView, PaymentService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use venue_repository::MockVenueRepository;
pub use venue_repository::{VenueRepository, VenueRepositoryError};
#[cfg(test)]
pub use venue_service::MockVenueService;
pub use venue_service::VenueService;
