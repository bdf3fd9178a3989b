//! Feature toggles switched on or off per deployment.
//!
//! Every toggle is active unless the deployment disables it by name.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::Error;

/// Field under which a disabled feature is reported.
pub const FORBIDDEN_FIELD: &str = "Forbidden";

/// Message returned when a route sits behind a disabled feature.
pub const FEATURE_DISABLED_MESSAGE: &str =
    "You don't have access to this page or resource";

/// Toggles known to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureToggle {
    /// Beneficiaries may create their own account from the web app.
    WebappSignup,
}

impl FeatureToggle {
    pub const ALL: [Self; 1] = [Self::WebappSignup];

    /// Stable key used in configuration and API payloads.
    pub fn name_key(self) -> &'static str {
        match self {
            Self::WebappSignup => "WEBAPP_SIGNUP",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::WebappSignup => "Permettre aux bénéficiaires de créer un compte",
        }
    }
}

impl fmt::Display for FeatureToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature toggle: {0}")]
pub struct UnknownFeature(pub String);

impl FromStr for FeatureToggle {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|toggle| toggle.name_key() == s)
            .ok_or_else(|| UnknownFeature(s.to_owned()))
    }
}

/// A toggle with its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub toggle: FeatureToggle,
    pub is_active: bool,
}

/// Toggle states of one deployment.
///
/// ```
/// use backend::domain::{FeatureFlags, FeatureToggle};
///
/// let flags = FeatureFlags::parse_disabled("WEBAPP_SIGNUP").expect("known toggle");
/// assert!(!flags.is_active(FeatureToggle::WebappSignup));
/// assert!(FeatureFlags::default().is_active(FeatureToggle::WebappSignup));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    disabled: BTreeSet<FeatureToggle>,
}

impl FeatureFlags {
    pub fn with_disabled(disabled: impl IntoIterator<Item = FeatureToggle>) -> Self {
        Self {
            disabled: disabled.into_iter().collect(),
        }
    }

    /// Parse a comma-separated list of disabled toggle keys.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownFeature`] for a key no toggle carries.
    pub fn parse_disabled(list: &str) -> Result<Self, UnknownFeature> {
        let disabled = list
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(FeatureToggle::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { disabled })
    }

    pub fn is_active(&self, toggle: FeatureToggle) -> bool {
        !self.disabled.contains(&toggle)
    }

    /// Every known toggle with its state.
    pub fn features(&self) -> Vec<Feature> {
        FeatureToggle::ALL
            .into_iter()
            .map(|toggle| Feature {
                toggle,
                is_active: self.is_active(toggle),
            })
            .collect()
    }

    /// Refuse access when `toggle` is disabled.
    pub fn require(&self, toggle: FeatureToggle) -> Result<(), Error> {
        if self.is_active(toggle) {
            Ok(())
        } else {
            Err(Error::forbidden(FORBIDDEN_FIELD, FEATURE_DISABLED_MESSAGE))
        }
    }
}
