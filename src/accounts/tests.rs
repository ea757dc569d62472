//! Service-level tests over an in-memory store.

use super::models::{Location, NewUser, User};
use super::password::{HashParams, PasswordHasher};
use super::repo::{StoreError, UniqueField, UserStore};
use super::service::{AccountService, LoginError, RegistrationError};
use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-memory [`UserStore`] with the same commit-time uniqueness guarantee
/// the database gives: inserts check and write under one lock.
#[derive(Default)]
struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    users: Vec<User>,
    locations: Vec<Location>,
}

impl MemoryStore {
    async fn add_location(&self, name: &str) -> Location {
        let location = Location {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.inner.lock().await.locations.push(location.clone());
        location
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|user| user.id == id).cloned())
    }

    async fn insert_user(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
        password_hash: &str,
        location_id: Option<Uuid>,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;

        if inner.users.iter().any(|user| user.email == email) {
            return Err(StoreError::UniqueViolation(UniqueField::Email));
        }
        if inner.users.iter().any(|user| user.username == username) {
            return Err(StoreError::UniqueViolation(UniqueField::Username));
        }

        let user = User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            location_id,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());

        Ok(user)
    }

    async fn location_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.locations.iter().any(|location| location.id == id))
    }

    async fn find_location(&self, id: Uuid) -> Result<Option<Location>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .locations
            .iter()
            .find(|location| location.id == id)
            .cloned())
    }

    async fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.locations.clone())
    }

    async fn insert_location(&self, id: Uuid, name: &str) -> Result<Location, StoreError> {
        let location = Location {
            id,
            name: name.to_string(),
        };
        self.inner.lock().await.locations.push(location.clone());
        Ok(location)
    }
}

/// Store whose lookups see nothing but whose insert reports a duplicate,
/// mimicking a concurrent registration winning between check and commit.
struct RacedStore {
    field: UniqueField,
}

#[async_trait]
impl UserStore for RacedStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Ok(None)
    }

    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, StoreError> {
        Ok(None)
    }

    async fn find_user(&self, _id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(None)
    }

    async fn insert_user(
        &self,
        _id: Uuid,
        _username: &str,
        _email: &str,
        _password_hash: &str,
        _location_id: Option<Uuid>,
    ) -> Result<User, StoreError> {
        Err(StoreError::UniqueViolation(self.field))
    }

    async fn location_exists(&self, _id: Uuid) -> Result<bool, StoreError> {
        Ok(true)
    }

    async fn find_location(&self, _id: Uuid) -> Result<Option<Location>, StoreError> {
        Ok(None)
    }

    async fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        Ok(Vec::new())
    }

    async fn insert_location(&self, _id: Uuid, _name: &str) -> Result<Location, StoreError> {
        unimplemented!("not used by these tests")
    }
}

fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(HashParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

fn service_over(store: Arc<dyn UserStore>) -> AccountService {
    AccountService::new(store, test_hasher())
}

fn candidate(username: &str, email: &str, password: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password: SecretString::from(password.to_string()),
        location_id: None,
    }
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

#[tokio::test]
async fn register_then_login_succeeds() {
    let service = service_over(Arc::new(MemoryStore::default()));

    let user = service
        .register(candidate("alice", "a@x.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "a@x.com");
    assert!(user.location_id.is_none());

    let logged_in = service.login("a@x.com", &secret("secret1")).await.unwrap();
    assert_eq!(logged_in.id, user.id);
}

#[tokio::test]
async fn stored_hash_is_never_the_plaintext() {
    let service = service_over(Arc::new(MemoryStore::default()));

    let user = service
        .register(candidate("alice", "a@x.com", "secret1"))
        .await
        .unwrap();

    assert_ne!(user.password_hash, "secret1");
    assert!(user.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let service = service_over(Arc::new(MemoryStore::default()));

    service
        .register(candidate("alice", "a@x.com", "secret1"))
        .await
        .unwrap();

    let err = service
        .register(candidate("bob", "a@x.com", "x-secret"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateEmail));
}

#[tokio::test]
async fn duplicate_username_rejected() {
    let service = service_over(Arc::new(MemoryStore::default()));

    service
        .register(candidate("alice", "a@x.com", "secret1"))
        .await
        .unwrap();

    let err = service
        .register(candidate("alice", "b@x.com", "x-secret"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateUsername));
}

#[tokio::test]
async fn email_conflict_reported_before_username_conflict() {
    let service = service_over(Arc::new(MemoryStore::default()));

    service
        .register(candidate("alice", "a@x.com", "secret1"))
        .await
        .unwrap();

    // Both checks would fail; the email failure must win.
    let err = service
        .register(candidate("alice", "a@x.com", "x-secret"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateEmail));
}

#[tokio::test]
async fn unknown_location_rejected() {
    let service = service_over(Arc::new(MemoryStore::default()));

    let mut new_user = candidate("alice", "a@x.com", "secret1");
    new_user.location_id = Some(Uuid::new_v4());

    let err = service.register(new_user).await.unwrap_err();
    assert!(matches!(err, RegistrationError::InvalidLocation));
}

#[tokio::test]
async fn known_location_accepted() {
    let store = Arc::new(MemoryStore::default());
    let location = store.add_location("Seoul").await;
    let service = service_over(store);

    let mut new_user = candidate("alice", "a@x.com", "secret1");
    new_user.location_id = Some(location.id);

    let user = service.register(new_user).await.unwrap();
    assert_eq!(user.location_id, Some(location.id));
}

#[tokio::test]
async fn commit_time_email_race_reports_duplicate_email() {
    let service = service_over(Arc::new(RacedStore {
        field: UniqueField::Email,
    }));

    let err = service
        .register(candidate("alice", "a@x.com", "secret1"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateEmail));
}

#[tokio::test]
async fn commit_time_username_race_reports_duplicate_username() {
    let service = service_over(Arc::new(RacedStore {
        field: UniqueField::Username,
    }));

    let err = service
        .register(candidate("alice", "a@x.com", "secret1"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateUsername));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let service = service_over(Arc::new(MemoryStore::default()));

    service
        .register(candidate("alice", "a@x.com", "secret1"))
        .await
        .unwrap();

    let unknown_email = service
        .login("nobody@x.com", &secret("secret1"))
        .await
        .unwrap_err();
    let wrong_password = service
        .login("a@x.com", &secret("wrong"))
        .await
        .unwrap_err();

    assert!(matches!(unknown_email, LoginError::InvalidCredentials));
    assert!(matches!(wrong_password, LoginError::InvalidCredentials));
    // Same message either way; nothing to tell the two cases apart.
    assert_eq!(unknown_email.to_string(), wrong_password.to_string());
}

#[tokio::test]
async fn email_lookup_is_case_sensitive() {
    let service = service_over(Arc::new(MemoryStore::default()));

    service
        .register(candidate("alice", "Alice@x.com", "secret1"))
        .await
        .unwrap();

    // Lookups match the stored value's exact form.
    let err = service
        .login("alice@x.com", &secret("secret1"))
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::InvalidCredentials));
}
