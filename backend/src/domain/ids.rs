//! Strongly typed identifiers for every aggregate.
//!
//! Each identifier wraps a UUID and serialises as its hyphenated string form.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

define_id!(
    /// Identifier of a [`crate::domain::User`].
    UserId
);
define_id!(
    /// Identifier of an [`crate::domain::Offerer`].
    OffererId
);
define_id!(
    /// Identifier of a link between a user and an offerer.
    UserOffererId
);
define_id!(
    /// Identifier of a [`crate::domain::Venue`].
    VenueId
);
define_id!(
    /// Identifier of an [`crate::domain::Offer`].
    OfferId
);
define_id!(
    /// Identifier of a [`crate::domain::Stock`].
    StockId
);
define_id!(
    /// Identifier of a [`crate::domain::Mediation`].
    MediationId
);
define_id!(
    /// Identifier of a [`crate::domain::Booking`].
    BookingId
);
define_id!(
    /// Identifier of a [`crate::domain::Deposit`].
    DepositId
);
define_id!(
    /// Identifier of a [`crate::domain::Payment`].
    PaymentId
);
