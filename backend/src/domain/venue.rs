//! Venues: physical or virtual places where an offerer publishes offers.

use serde::{Deserialize, Serialize};

use crate::domain::{Error, ErrorCode, ErrorCollector, Offerer, OffererId, VenueId};

/// Name given to the virtual venue created alongside every offerer.
pub const VIRTUAL_VENUE_NAME: &str = "Offre numérique";

const FORMAT_INCORRECT: &str = "Format incorrect";

/// Fourteen-digit establishment number; its first nine digits are the SIREN
/// of the owning offerer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Siret(String);

impl Siret {
    /// Validate fourteen ASCII digits, ignoring inner and outer spaces.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.len() == 14 && digits.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(digits))
        } else {
            Err(Error::invalid_request("siret", "Ce code SIRET est invalide"))
        }
    }

    /// Wrap a value already validated by the store.
    pub fn from_trusted(value: String) -> Self {
        Self(value)
    }

    /// Digits as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this establishment belongs to the company `siren`.
    pub fn belongs_to(&self, siren: &str) -> bool {
        self.0.starts_with(siren)
    }
}

/// Coordinate as sent by clients: either a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCoordinate {
    Number(f64),
    Text(String),
}

impl RawCoordinate {
    fn parse(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
        .filter(|value: &f64| value.is_finite())
    }
}

fn check_coordinate(
    errors: &mut ErrorCollector,
    field: &str,
    raw: Option<&RawCoordinate>,
    bound: f64,
    out_of_range: &str,
) -> Option<f64> {
    let raw = raw?;
    match raw.parse() {
        Some(value) if (-bound..=bound).contains(&value) => Some(value),
        Some(_) => {
            errors.add(field, out_of_range);
            None
        }
        None => {
            errors.add(field, FORMAT_INCORRECT);
            None
        }
    }
}

/// Department code for a postal code: two characters, three overseas.
///
/// # Examples
/// ```
/// use backend::domain::departement_code_for;
///
/// assert_eq!(departement_code_for("75013"), "75");
/// assert_eq!(departement_code_for("97300"), "973");
/// ```
pub fn departement_code_for(postal_code: &str) -> String {
    let trimmed = postal_code.trim();
    let width = if trimmed.starts_with("97") || trimmed.starts_with("98") {
        3
    } else {
        2
    };
    trimmed.chars().take(width).collect()
}

/// Persisted venue.
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub id: VenueId,
    pub managing_offerer_id: OffererId,
    pub name: String,
    pub public_name: Option<String>,
    pub siret: Option<Siret>,
    pub comment: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub departement_code: Option<String>,
    pub booking_email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_virtual: bool,
    pub validation_token: Option<String>,
}

impl Venue {
    /// Whether the venue was validated.
    pub fn is_validated(&self) -> bool {
        self.validation_token.is_none()
    }

    /// Virtual venue created with a new offerer.
    pub fn virtual_for(offerer_id: OffererId) -> Self {
        Self {
            id: VenueId::random(),
            managing_offerer_id: offerer_id,
            name: VIRTUAL_VENUE_NAME.to_owned(),
            public_name: None,
            siret: None,
            comment: None,
            address: None,
            postal_code: None,
            city: None,
            departement_code: None,
            booking_email: None,
            latitude: None,
            longitude: None,
            is_virtual: true,
            validation_token: None,
        }
    }
}

/// Client input for a new venue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueDraft {
    pub managing_offerer_id: Option<OffererId>,
    pub name: String,
    pub public_name: Option<String>,
    pub siret: Option<String>,
    pub comment: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub booking_email: Option<String>,
    pub latitude: Option<RawCoordinate>,
    pub longitude: Option<RawCoordinate>,
    pub is_virtual: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

impl VenueDraft {
    /// Validate the draft against its offerer and build the venue.
    ///
    /// Every faulty field is reported in one error. `virtual_venue_exists`
    /// tells whether the offerer already owns a virtual venue.
    /// `validation_token` is stored on a physical venue created without a
    /// SIRET.
    pub fn into_venue(
        self,
        offerer: &Offerer,
        virtual_venue_exists: bool,
        validation_token: String,
    ) -> Result<Venue, Error> {
        let mut errors = ErrorCollector::new();

        if self.name.trim().is_empty() {
            errors.add("name", "Ce paramètre est obligatoire");
        }
        if self.is_virtual && virtual_venue_exists {
            errors.add(
                "isVirtual",
                "Un lieu pour les offres numériques existe déjà pour cette structure",
            );
        }
        let latitude = check_coordinate(
            &mut errors,
            "latitude",
            self.latitude.as_ref(),
            90.0,
            "La latitude doit être comprise entre -90.0 et +90.0",
        );
        let longitude = check_coordinate(
            &mut errors,
            "longitude",
            self.longitude.as_ref(),
            180.0,
            "La longitude doit être comprise entre -180.0 et +180.0",
        );

        let comment = non_blank(self.comment);
        let siret = match non_blank(self.siret) {
            Some(raw) => match Siret::parse(&raw) {
                Ok(siret) if siret.belongs_to(offerer.siren.as_str()) => Some(siret),
                Ok(_) => {
                    errors.add(
                        "siret",
                        "Ce code SIRET doit correspondre à un établissement de votre structure",
                    );
                    None
                }
                Err(err) => {
                    for message in err.messages("siret") {
                        errors.add("siret", message.clone());
                    }
                    None
                }
            },
            None => {
                if !self.is_virtual && comment.is_none() {
                    errors.add(
                        "siret",
                        "Veuillez renseigner soit un siret soit un commentaire",
                    );
                }
                None
            }
        };

        errors.into_result(ErrorCode::InvalidRequest)?;

        let needs_validation = !self.is_virtual && siret.is_none();
        let postal_code = non_blank(self.postal_code);
        Ok(Venue {
            id: VenueId::random(),
            managing_offerer_id: offerer.id,
            name: self.name.trim().to_owned(),
            public_name: non_blank(self.public_name),
            siret,
            comment,
            address: non_blank(self.address),
            departement_code: postal_code.as_deref().map(departement_code_for),
            postal_code,
            city: non_blank(self.city),
            booking_email: non_blank(self.booking_email),
            latitude,
            longitude,
            is_virtual: self.is_virtual,
            validation_token: needs_validation.then_some(validation_token),
        })
    }
}

#[cfg(test)]
mod tests;
