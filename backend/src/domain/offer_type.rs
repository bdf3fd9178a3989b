//! Offer type codes.
//!
//! Offers carry a type string such as `EventType.CINEMA` or
//! `ThingType.LIVRE_EDITION`. Event types describe dated occurrences while
//! thing types describe goods and subscriptions.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_offer_types {
    ($name:ident, $prefix:literal, [$($variant:ident),* $(,)?]) => {
        #[doc = concat!("Type codes prefixed with `", $prefix, ".`.")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[expect(non_camel_case_types, reason = "variants mirror the stored type codes")]
        pub enum $name {
            $(
                #[doc = concat!("`", $prefix, ".", stringify!($variant), "`")]
                $variant,
            )*
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Bare variant name, without the enumeration prefix.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                }
            }

            /// Full type code as stored on offers.
            pub const fn code(self) -> &'static str {
                match self {
                    $(Self::$variant => concat!($prefix, ".", stringify!($variant)),)*
                }
            }

            /// Parse a full type code such as `"EventType.CINEMA"`.
            pub fn from_code(code: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|variant| variant.code() == code)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

define_offer_types!(
    EventType,
    "EventType",
    [
        ACTIVATION,
        CINEMA,
        CONFERENCE_DEBAT_DEDICACE,
        JEUX,
        MUSEES_PATRIMOINE,
        MUSIQUE,
        PRATIQUE_ARTISTIQUE,
        SPECTACLE_VIVANT,
    ]
);

define_offer_types!(
    ThingType,
    "ThingType",
    [
        ACTIVATION,
        AUDIOVISUEL,
        CINEMA_ABO,
        CINEMA_CARD,
        INSTRUMENT,
        JEUX,
        JEUX_VIDEO,
        JEUX_VIDEO_ABO,
        LIVRE_AUDIO,
        LIVRE_EDITION,
        MUSEES_PATRIMOINE_ABO,
        MUSIQUE,
        MUSIQUE_ABO,
        OEUVRE_ART,
        PRATIQUE_ARTISTIQUE_ABO,
        PRESSE_ABO,
        SPECTACLE_VIVANT_ABO,
    ]
);

/// Either an event or a thing type.
///
/// Serialises as its full code string.
///
/// # Examples
/// ```
/// use backend::domain::{ProductType, ThingType};
///
/// let parsed: ProductType = "ThingType.LIVRE_EDITION".parse().expect("known type");
/// assert_eq!(parsed, ProductType::Thing(ThingType::LIVRE_EDITION));
/// assert!(ProductType::is_thing("ThingType.JEUX_VIDEO"));
/// assert!(!ProductType::is_event(""));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProductType {
    /// A dated occurrence.
    Event(EventType),
    /// A good or a subscription.
    Thing(ThingType),
}

/// Raised when a type code is not part of either enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown offer type: {0}")]
pub struct UnknownProductType(pub String);

impl ProductType {
    /// Whether `code` names a thing type.
    pub fn is_thing(code: &str) -> bool {
        ThingType::from_code(code).is_some()
    }

    /// Whether `code` names an event type.
    pub fn is_event(code: &str) -> bool {
        EventType::from_code(code).is_some()
    }

    /// Full type code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Event(event) => event.code(),
            Self::Thing(thing) => thing.code(),
        }
    }

    /// Whether this is an event type.
    pub const fn is_event_type(self) -> bool {
        matches!(self, Self::Event(_))
    }

    /// Activation offers grant the pass when their booking is validated.
    pub const fn is_activation(self) -> bool {
        matches!(
            self,
            Self::Event(EventType::ACTIVATION) | Self::Thing(ThingType::ACTIVATION)
        )
    }

    /// Thing variant, when this is a thing type.
    pub const fn as_thing(self) -> Option<ThingType> {
        match self {
            Self::Thing(thing) => Some(thing),
            Self::Event(_) => None,
        }
    }
}

impl std::str::FromStr for ProductType {
    type Err = UnknownProductType;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        EventType::from_code(code)
            .map(Self::Event)
            .or_else(|| ThingType::from_code(code).map(Self::Thing))
            .ok_or_else(|| UnknownProductType(code.to_owned()))
    }
}

impl TryFrom<String> for ProductType {
    type Error = UnknownProductType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProductType> for String {
    fn from(value: ProductType) -> Self {
        value.code().to_owned()
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", false)]
    #[case("ThingType.AUDIOVISUEL", true)]
    #[case("EventType.PRATIQUE_ARTISTIQUE", false)]
    #[case("AUDIOVISUEL", false)]
    fn is_thing_matches_thing_codes(#[case] code: &str, #[case] expected: bool) {
        assert_eq!(ProductType::is_thing(code), expected);
    }

    #[rstest]
    #[case("", false)]
    #[case("EventType.MUSEES_PATRIMOINE", true)]
    #[case("ThingType.JEUX_VIDEO", false)]
    fn is_event_matches_event_codes(#[case] code: &str, #[case] expected: bool) {
        assert_eq!(ProductType::is_event(code), expected);
    }

    #[rstest]
    #[case(ProductType::Event(EventType::ACTIVATION), true)]
    #[case(ProductType::Thing(ThingType::ACTIVATION), true)]
    #[case(ProductType::Thing(ThingType::LIVRE_EDITION), false)]
    fn activation_covers_both_enumerations(#[case] product: ProductType, #[case] expected: bool) {
        assert_eq!(product.is_activation(), expected);
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = "ThingType.PIZZA".parse::<ProductType>().expect_err("unknown");
        assert_eq!(err.0, "ThingType.PIZZA");
    }

    #[test]
    fn serde_uses_full_code() {
        let json = serde_json::to_string(&ProductType::Event(EventType::CINEMA)).expect("json");
        assert_eq!(json, "\"EventType.CINEMA\"");
    }
}
