//! Offerers (organisations selling offers) and the links granting users
//! rights over them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, OffererId, User, UserId, UserOffererId};

/// Message raised when a user lacks rights over an offerer.
pub const INSUFFICIENT_RIGHTS_MESSAGE: &str =
    "Vous n'avez pas les droits d'accès suffisant pour accéder à cette information.";

/// Nine-digit French company registration number.
///
/// # Examples
/// ```
/// use backend::domain::Siren;
///
/// assert!(Siren::parse("123456789").is_ok());
/// assert!(Siren::parse("12345678").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Siren(String);

impl Siren {
    /// Validate nine ASCII digits (surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.len() == 9 && trimmed.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(Error::invalid_request(
                "siren",
                "Ce code SIREN est invalide",
            ))
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
}

impl fmt::Display for Siren {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reimbursement coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankInformation {
    pub bic: String,
    pub iban: String,
}

/// Organisation owning venues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offerer {
    pub id: OffererId,
    pub name: String,
    pub siren: Siren,
    pub address: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub is_active: bool,
    pub validation_token: Option<String>,
    pub bank_information: Option<BankInformation>,
    pub date_created: DateTime<Utc>,
}

impl Offerer {
    /// Whether the platform validated the organisation.
    pub fn is_validated(&self) -> bool {
        self.validation_token.is_none()
    }

    /// BIC of the bank information, if any.
    pub fn bic(&self) -> Option<&str> {
        self.bank_information.as_ref().map(|bank| bank.bic.as_str())
    }

    /// IBAN of the bank information, if any.
    pub fn iban(&self) -> Option<&str> {
        self.bank_information.as_ref().map(|bank| bank.iban.as_str())
    }
}

/// Level of access a link grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RightsType {
    Admin,
    Editor,
}

impl RightsType {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
        }
    }

    /// Whether these rights include `required`.
    pub const fn covers(self, required: RightsType) -> bool {
        matches!(
            (self, required),
            (Self::Admin, _) | (Self::Editor, Self::Editor)
        )
    }
}

impl std::str::FromStr for RightsType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            other => Err(Error::invalid_request(
                "rights",
                format!("Droits inconnus : {other}"),
            )),
        }
    }
}

/// Link between a user and an offerer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOfferer {
    pub id: UserOffererId,
    pub user_id: UserId,
    pub offerer_id: OffererId,
    pub rights: RightsType,
    pub validation_token: Option<String>,
}

impl UserOfferer {
    /// Whether the link was validated.
    pub fn is_validated(&self) -> bool {
        self.validation_token.is_none()
    }
}

/// Whether `user` holds `required` rights on `offerer_id`.
///
/// Global administrators hold every right. Other users need a validated link
/// whose rights cover `required`.
///
/// # Examples
/// ```
/// use backend::domain::{has_rights, RightsType, UserOfferer};
/// # use backend::domain::{Email, OffererId, User, UserId, UserOffererId};
/// # let user = User {
/// #     id: UserId::random(), email: Email::normalise("pro@b.fr"), password_hash: String::new(),
/// #     public_name: "Pro".into(), departement_code: "93".into(), can_book_free_offers: false,
/// #     is_admin: false, validation_token: None, reset_password_token: None,
/// #     reset_password_token_validity_limit: None, date_created: chrono::Utc::now(),
/// # };
/// let offerer_id = OffererId::random();
/// let link = UserOfferer {
///     id: UserOffererId::random(),
///     user_id: user.id,
///     offerer_id,
///     rights: RightsType::Editor,
///     validation_token: Some("PENDING".into()),
/// };
/// assert!(!has_rights(&user, &[link], RightsType::Editor, offerer_id));
/// ```
pub fn has_rights(
    user: &User,
    links: &[UserOfferer],
    required: RightsType,
    offerer_id: OffererId,
) -> bool {
    user.is_admin
        || links.iter().any(|link| {
            link.user_id == user.id
                && link.offerer_id == offerer_id
                && link.is_validated()
                && link.rights.covers(required)
        })
}

/// Fail with 403 unless [`has_rights`] holds.
pub fn ensure_rights(
    user: &User,
    links: &[UserOfferer],
    required: RightsType,
    offerer_id: OffererId,
) -> Result<(), Error> {
    if has_rights(user, links, required, offerer_id) {
        Ok(())
    } else {
        Err(Error::forbidden(
            crate::domain::GLOBAL_FIELD,
            INSUFFICIENT_RIGHTS_MESSAGE,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Email, ErrorCode};
    use rstest::{fixture, rstest};

    #[fixture]
    fn pro() -> User {
        User {
            id: UserId::random(),
            email: Email::normalise("pro@example.com"),
            password_hash: String::new(),
            public_name: "Pro".into(),
            departement_code: "75".into(),
            can_book_free_offers: false,
            is_admin: false,
            validation_token: None,
            reset_password_token: None,
            reset_password_token_validity_limit: None,
            date_created: Utc::now(),
        }
    }

    fn link(user: &User, offerer_id: OffererId, rights: RightsType, token: Option<&str>) -> UserOfferer {
        UserOfferer {
            id: UserOffererId::random(),
            user_id: user.id,
            offerer_id,
            rights,
            validation_token: token.map(str::to_owned),
        }
    }

    #[rstest]
    fn unattached_user_has_no_rights(pro: User) {
        assert!(!has_rights(&pro, &[], RightsType::Editor, OffererId::random()));
    }

    #[rstest]
    fn validated_editor_link_grants_editor_rights(pro: User) {
        let offerer_id = OffererId::random();
        let links = [link(&pro, offerer_id, RightsType::Editor, None)];
        assert!(has_rights(&pro, &links, RightsType::Editor, offerer_id));
        assert!(!has_rights(&pro, &links, RightsType::Admin, offerer_id));
    }

    #[rstest]
    fn pending_link_grants_nothing(pro: User) {
        let offerer_id = OffererId::random();
        let links = [link(&pro, offerer_id, RightsType::Admin, Some("AZEFRGTHRQFQ"))];
        assert!(!has_rights(&pro, &links, RightsType::Editor, offerer_id));
    }

    #[rstest]
    fn link_on_another_offerer_grants_nothing(pro: User) {
        let links = [link(&pro, OffererId::random(), RightsType::Admin, None)];
        assert!(!has_rights(&pro, &links, RightsType::Editor, OffererId::random()));
    }

    #[rstest]
    fn global_admin_has_every_right(mut pro: User) {
        pro.is_admin = true;
        assert!(has_rights(&pro, &[], RightsType::Admin, OffererId::random()));
    }

    #[rstest]
    fn ensure_rights_reports_forbidden(pro: User) {
        let err = ensure_rights(&pro, &[], RightsType::Editor, OffererId::random())
            .expect_err("no link");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.messages("global"), [INSUFFICIENT_RIGHTS_MESSAGE]);
    }

    #[rstest]
    #[case("123456789", true)]
    #[case(" 123456789 ", true)]
    #[case("12345678A", false)]
    #[case("1234567890", false)]
    fn siren_shape(#[case] raw: &str, #[case] accepted: bool) {
        assert_eq!(Siren::parse(raw).is_ok(), accepted);
    }
}
