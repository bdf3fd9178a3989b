//! Driving port for account use-cases: sign-in, sign-up, profile and
//! password recovery.
//!
//! Inbound adapters call this port without knowing how users, deposits or
//! bookings are stored, so HTTP handler tests can substitute a mock.

use async_trait::async_trait;

use crate::domain::ports::ManagedActivity;
use crate::domain::{Error, Expenses, LoginCredentials, User, UserId, WalletSummary};

/// Sign-up form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub public_name: String,
    pub departement_code: String,
}

/// User enriched with wallet, expenses and professional activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user: User,
    pub wallet: WalletSummary,
    pub expenses: Expenses,
    pub activity: ManagedActivity,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Check credentials and return the profile of the signed-in user.
    ///
    /// Unknown identifiers, unvalidated accounts and wrong passwords all fail
    /// with 401.
    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<UserProfile, Error>;

    /// Profile of an authenticated user.
    async fn profile(&self, user_id: &UserId) -> Result<UserProfile, Error>;

    /// Create an account awaiting e-mail validation.
    async fn sign_up(&self, request: SignUpRequest) -> Result<User, Error>;

    /// Consume an account validation token.
    async fn validate_account(&self, token: &str) -> Result<(), Error>;

    /// Store a fresh reset token for the account behind `email`.
    ///
    /// `None` means the field was missing. Unknown addresses succeed without
    /// effect.
    async fn request_password_reset(&self, email: Option<String>) -> Result<(), Error>;

    /// Set a new password using a reset token.
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), Error>;
}
