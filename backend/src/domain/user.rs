//! User accounts.
//!
//! A user is either a young beneficiary spending their pass, a professional
//! managing offerers, or a platform administrator.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, UserId};

/// Message raised when an administrator is allowed to book.
pub const ADMIN_CANNOT_BOOK_MESSAGE: &str = "Admin ne peut pas booker";

/// Lifetime of a password reset token.
pub const RESET_PASSWORD_TOKEN_VALIDITY_HOURS: i64 = 24;

/// E-mail address compared case-insensitively.
///
/// ## Invariants
/// - Stored trimmed and lower case so equality is a plain string comparison.
///
/// # Examples
/// ```
/// use backend::domain::Email;
///
/// assert_eq!(Email::normalise("  Jane@Example.COM "), Email::normalise("jane@example.com"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalise raw input.
    pub fn normalise(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// Normalised address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the address looks deliverable (`local@domain.tld`).
    pub fn is_well_formed(&self) -> bool {
        let Some((local, domain)) = self.0.split_once('@') else {
            return false;
        };
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !self.0.contains(char::is_whitespace)
    }
}

impl From<String> for Email {
    fn from(value: String) -> Self {
        Self::normalise(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registered account.
///
/// ## Invariants
/// - An administrator never has `can_book_free_offers` (see
///   [`User::check_invariants`]).
/// - The account is validated once `validation_token` is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub password_hash: String,
    pub public_name: String,
    pub departement_code: String,
    pub can_book_free_offers: bool,
    pub is_admin: bool,
    pub validation_token: Option<String>,
    pub reset_password_token: Option<String>,
    pub reset_password_token_validity_limit: Option<DateTime<Utc>>,
    pub date_created: DateTime<Utc>,
}

impl User {
    /// Whether the account went through e-mail validation.
    pub fn is_validated(&self) -> bool {
        self.validation_token.is_none()
    }

    /// Reject combinations the platform forbids.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{ErrorCode, User};
    /// # use backend::domain::{Email, UserId};
    /// # let mut user = User {
    /// #     id: UserId::random(), email: Email::normalise("a@b.fr"), password_hash: String::new(),
    /// #     public_name: "A".into(), departement_code: "93".into(), can_book_free_offers: true,
    /// #     is_admin: false, validation_token: None, reset_password_token: None,
    /// #     reset_password_token_validity_limit: None, date_created: chrono::Utc::now(),
    /// # };
    /// user.is_admin = true;
    /// let err = user.check_invariants().expect_err("admins cannot book");
    /// assert_eq!(err.code(), ErrorCode::InvalidRequest);
    /// ```
    pub fn check_invariants(&self) -> Result<(), Error> {
        if self.is_admin && self.can_book_free_offers {
            return Err(Error::invalid_request(
                "canBookFreeOffers",
                ADMIN_CANNOT_BOOK_MESSAGE,
            ));
        }
        Ok(())
    }

    /// Store a fresh reset token valid for 24 hours from `now`.
    pub fn start_password_reset(&mut self, token: String, now: DateTime<Utc>) {
        self.reset_password_token = Some(token);
        self.reset_password_token_validity_limit =
            Some(now + Duration::hours(RESET_PASSWORD_TOKEN_VALIDITY_HOURS));
    }

    /// Whether the stored reset token is still usable at `now`.
    pub fn reset_token_is_live(&self, now: DateTime<Utc>) -> bool {
        self.reset_password_token_validity_limit
            .is_some_and(|limit| now < limit)
    }

    /// Replace the password hash and consume the reset token.
    pub fn complete_password_reset(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.reset_password_token = None;
        self.reset_password_token_validity_limit = None;
    }
}
