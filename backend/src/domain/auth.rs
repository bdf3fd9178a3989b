//! Authentication primitives: sign-in credentials, password policy and
//! password hashing.
//!
//! Raw passwords never leave a [`Zeroizing`] buffer; only Argon2id hashes are
//! persisted.

use std::sync::OnceLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use regex::Regex;
use zeroize::Zeroizing;

use crate::domain::{Error, Email};

/// Message returned when a password does not satisfy [`check_password_strength`].
pub const WEAK_PASSWORD_MESSAGE: &str = "Le mot de passe doit faire au moins 12 caractères et \
     contenir à minima 1 majuscule, 1 minuscule, 1 chiffre et 1 caractère spécial parmi \
     _-&?~#|^@=+.$,<>%*!:;";

/// Minimum password length accepted at sign-up and reset.
pub const PASSWORD_MIN_LENGTH: usize = 12;

/// Validation failures raised while building [`LoginCredentials`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Identifier was missing or blank once trimmed.
    #[error("identifier must not be empty")]
    EmptyIdentifier,
    /// Password was missing or empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

impl From<LoginValidationError> for Error {
    fn from(value: LoginValidationError) -> Self {
        match value {
            LoginValidationError::EmptyIdentifier => {
                Error::unauthorized("identifier", "Identifiant manquant")
            }
            LoginValidationError::EmptyPassword => {
                Error::unauthorized("password", "Mot de passe manquant")
            }
        }
    }
}

/// Validated sign-in credentials.
///
/// ## Invariants
/// - `identifier` is a normalised e-mail (trimmed, lower case).
/// - `password` is non-empty and kept verbatim.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Jane@Example.com ", "pw").expect("valid");
/// assert_eq!(creds.identifier().as_str(), "jane@example.com");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    identifier: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Build credentials from raw inputs.
    pub fn try_from_parts(identifier: &str, password: &str) -> Result<Self, LoginValidationError> {
        if identifier.trim().is_empty() {
            return Err(LoginValidationError::EmptyIdentifier);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            identifier: Email::normalise(identifier),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised identifier used for the user lookup.
    pub fn identifier(&self) -> &Email {
        &self.identifier
    }

    /// Password as typed by the user.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

fn password_class_regexes() -> &'static [Regex; 4] {
    static RE: OnceLock<[Regex; 4]> = OnceLock::new();
    RE.get_or_init(|| {
        ["[a-z]", "[A-Z]", "[0-9]", r"[_\-&?~#|^@=+.$,<>%*!:;]"].map(|pattern| {
            Regex::new(pattern)
                .unwrap_or_else(|error| panic!("password regex failed to compile: {error}"))
        })
    })
}

/// Check a candidate password against the strength policy.
///
/// The password needs [`PASSWORD_MIN_LENGTH`] characters, one lower case
/// letter, one upper case letter, one digit and one special character.
///
/// # Examples
/// ```
/// use backend::domain::check_password_strength;
///
/// assert!(check_password_strength("password", "User@1234567").is_ok());
/// assert!(check_password_strength("password", "short").is_err());
/// ```
pub fn check_password_strength(field: &str, password: &str) -> Result<(), Error> {
    let long_enough = password.chars().count() >= PASSWORD_MIN_LENGTH;
    if long_enough && password_class_regexes().iter().all(|re| re.is_match(password)) {
        Ok(())
    } else {
        Err(Error::invalid_request(field, WEAK_PASSWORD_MESSAGE))
    }
}

/// Failure raised by the password hasher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(String);

/// Hash `password` with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHashError(err.to_string()))
}

/// Whether `candidate` matches the stored PHC `hash`.
///
/// An unparsable stored hash never matches.
pub fn verify_password(hash: &str, candidate: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
