//! Registration and login decision logic.

use crate::accounts::{
    models::{Location, NewUser, User},
    password::PasswordHasher,
    repo::{StoreError, UniqueField, UserStore},
};
use secrecy::SecretString;
use std::{fmt, sync::Arc};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Why a candidate registration was rejected.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("username is already taken")]
    DuplicateUsername,
    #[error("location does not exist")]
    InvalidLocation,
    /// Persistence or hashing failure; details are logged, not returned.
    #[error("storage failure")]
    Storage(#[source] anyhow::Error),
}

/// Why a login was rejected.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Unknown email and wrong password intentionally collapse into this.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("storage failure")]
    Storage(#[source] anyhow::Error),
}

fn registration_storage(err: StoreError) -> RegistrationError {
    RegistrationError::Storage(err.into())
}

/// Registration validator and login authenticator over a [`UserStore`].
pub struct AccountService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl fmt::Debug for AccountService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountService").finish_non_exhaustive()
    }
}

impl AccountService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Decide a candidate registration and persist it on success.
    ///
    /// Checks run in a fixed order: duplicate email, duplicate username,
    /// then location existence. A request failing more than one check
    /// reports the first. A unique violation raised by the store at commit
    /// time reports the same way as the corresponding pre-check.
    ///
    /// # Errors
    /// Returns a [`RegistrationError`] naming the first failed check, or
    /// `Storage` when persistence or hashing fails.
    pub async fn register(&self, candidate: NewUser) -> Result<User, RegistrationError> {
        if self
            .store
            .find_by_email(&candidate.email)
            .await
            .map_err(registration_storage)?
            .is_some()
        {
            debug!("registration rejected: duplicate email");
            return Err(RegistrationError::DuplicateEmail);
        }

        if self
            .store
            .find_by_username(&candidate.username)
            .await
            .map_err(registration_storage)?
            .is_some()
        {
            debug!("registration rejected: duplicate username");
            return Err(RegistrationError::DuplicateUsername);
        }

        if let Some(location_id) = candidate.location_id {
            if !self
                .store
                .location_exists(location_id)
                .await
                .map_err(registration_storage)?
            {
                debug!("registration rejected: unknown location {location_id}");
                return Err(RegistrationError::InvalidLocation);
            }
        }

        let password_hash = self
            .hasher
            .hash(&candidate.password)
            .map_err(RegistrationError::Storage)?;

        let id = Uuid::new_v4();
        match self
            .store
            .insert_user(
                id,
                &candidate.username,
                &candidate.email,
                &password_hash,
                candidate.location_id,
            )
            .await
        {
            Ok(user) => Ok(user),
            // Lost a concurrent race on the unique constraints; report the
            // same outcome the pre-checks would have.
            Err(StoreError::UniqueViolation(UniqueField::Email)) => {
                Err(RegistrationError::DuplicateEmail)
            }
            Err(StoreError::UniqueViolation(UniqueField::Username)) => {
                Err(RegistrationError::DuplicateUsername)
            }
            Err(StoreError::Backend(err)) => Err(RegistrationError::Storage(err)),
        }
    }

    /// Verify credentials, yielding the matched user.
    ///
    /// Unknown email and wrong password return the same error so responses
    /// cannot be used to probe which emails exist.
    ///
    /// # Errors
    /// Returns `InvalidCredentials` on any credential failure, `Storage`
    /// when the lookup itself fails.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, LoginError> {
        let user = self
            .store
            .find_by_email(email)
            .await
            .map_err(|err| LoginError::Storage(err.into()))?;

        let Some(user) = user else {
            debug!("login rejected: unknown email");
            return Err(LoginError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash) {
            debug!("login rejected: password mismatch");
            return Err(LoginError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Fetch a user by id (boundary reads).
    ///
    /// # Errors
    /// Returns the store's error untouched.
    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.store.find_user(id).await
    }

    /// Fetch a location by id; the boundary uses this to assemble responses.
    ///
    /// # Errors
    /// Returns the store's error untouched.
    pub async fn find_location(&self, id: Uuid) -> Result<Option<Location>, StoreError> {
        self.store.find_location(id).await
    }

    /// # Errors
    /// Returns the store's error untouched.
    pub async fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        self.store.list_locations().await
    }

    /// Create a location (administrative call).
    ///
    /// # Errors
    /// Returns the store's error untouched.
    pub async fn create_location(&self, name: &str) -> Result<Location, StoreError> {
        self.store.insert_location(Uuid::new_v4(), name).await
    }
}
