//! Account use-cases: authentication, profile, sign-up and password
//! recovery.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{AccountService, SignUpRequest, UserProfile};
use crate::domain::service_support::{
    UNKNOWN_VALIDATION_TOKEN_MESSAGE, map_booking_error, map_deposit_error, map_offerer_error,
    map_user_error,
};
use crate::domain::tokens::random_link_token;
use crate::domain::{
    Email, Error, ErrorCode, ErrorCollector, Expenses, GLOBAL_FIELD, LoginCredentials,
    RepositoryPorts, User, UserId, WalletSummary, check_password_strength, hash_password,
    verify_password,
};

/// Account service implementing [`AccountService`].
#[derive(Clone)]
pub struct DomainAccountService {
    ports: RepositoryPorts,
    clock: Arc<dyn Clock>,
}

impl DomainAccountService {
    /// Create a new service over the given ports.
    pub fn new(ports: RepositoryPorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    async fn build_profile(&self, user: User) -> Result<UserProfile, Error> {
        let deposits = self
            .ports
            .deposits
            .list_for_user(&user.id)
            .await
            .map_err(map_deposit_error)?;
        let bookings = self
            .ports
            .bookings
            .list_for_user(&user.id)
            .await
            .map_err(map_booking_error)?;
        let activity = self
            .ports
            .offerers
            .managed_activity(&user.id)
            .await
            .map_err(map_offerer_error)?;

        let plain: Vec<_> = bookings.iter().map(|d| d.booking.clone()).collect();
        Ok(UserProfile {
            wallet: WalletSummary::compute(&deposits, &plain),
            expenses: Expenses::compute(&bookings),
            activity,
            user,
        })
    }

    fn hash(password: &str) -> Result<String, Error> {
        hash_password(password).map_err(|err| Error::internal(err.to_string()))
    }
}

#[async_trait]
impl AccountService for DomainAccountService {
    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<UserProfile, Error> {
        let user = self
            .ports
            .users
            .find_by_email(credentials.identifier())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("identifier", "Identifiant incorrect"))?;
        if !user.is_validated() {
            return Err(Error::unauthorized(
                "identifier",
                "Ce compte n'est pas validé.",
            ));
        }
        if !verify_password(&user.password_hash, credentials.password()) {
            return Err(Error::unauthorized("password", "Mot de passe incorrect"));
        }
        info!(user_id = %user.id, "user signed in");
        self.build_profile(user).await
    }

    async fn profile(&self, user_id: &UserId) -> Result<UserProfile, Error> {
        let user = self.ports.user(user_id).await?;
        self.build_profile(user).await
    }

    async fn sign_up(&self, request: SignUpRequest) -> Result<User, Error> {
        let email = Email::normalise(&request.email);
        let mut errors = ErrorCollector::new();
        if !email.is_well_formed() {
            errors.add("email", "Le format de l'email est incorrect");
        }
        if let Err(err) = check_password_strength("password", &request.password) {
            for message in err.messages("password") {
                errors.add("password", message.clone());
            }
        }
        if request.public_name.trim().is_empty() {
            errors.add("publicName", "Ce paramètre est obligatoire");
        }
        errors.into_result(ErrorCode::InvalidRequest)?;

        let existing = self
            .ports
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Err(Error::invalid_request(
                "email",
                "Un compte lié à cet email existe déjà",
            ));
        }

        let user = User {
            id: UserId::random(),
            email,
            password_hash: Self::hash(&request.password)?,
            public_name: request.public_name.trim().to_owned(),
            departement_code: request.departement_code.trim().to_owned(),
            can_book_free_offers: false,
            is_admin: false,
            validation_token: Some(random_link_token()),
            reset_password_token: None,
            reset_password_token_validity_limit: None,
            date_created: self.clock.utc(),
        };
        user.check_invariants()?;
        self.ports.users.insert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, "account created");
        Ok(user)
    }

    async fn validate_account(&self, token: &str) -> Result<(), Error> {
        let mut user = self
            .ports
            .users
            .find_by_validation_token(token)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(GLOBAL_FIELD, UNKNOWN_VALIDATION_TOKEN_MESSAGE))?;
        user.validation_token = None;
        self.ports.users.update(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, "account validated");
        Ok(())
    }

    async fn request_password_reset(&self, email: Option<String>) -> Result<(), Error> {
        let raw = email.ok_or_else(|| Error::invalid_request("email", "L'email est manquant"))?;
        if raw.trim().is_empty() {
            return Err(Error::invalid_request("email", "L'email renseigné est vide"));
        }
        let Some(mut user) = self
            .ports
            .users
            .find_by_email(&Email::normalise(&raw))
            .await
            .map_err(map_user_error)?
        else {
            return Ok(());
        };
        user.start_password_reset(random_link_token(), self.clock.utc());
        self.ports.users.update(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, "password reset requested");
        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), Error> {
        let mut user = self
            .ports
            .users
            .find_by_reset_token(token)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| {
                Error::not_found(
                    "token",
                    "Votre lien de changement de mot de passe est invalide.",
                )
            })?;
        if !user.reset_token_is_live(self.clock.utc()) {
            return Err(Error::invalid_request(
                "token",
                "Votre lien de changement de mot de passe est périmé. Veuillez effectuer une nouvelle demande.",
            ));
        }
        check_password_strength("newPassword", new_password)?;
        user.complete_password_reset(Self::hash(new_password)?);
        self.ports.users.update(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, "password reset");
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
