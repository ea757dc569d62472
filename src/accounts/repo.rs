//! Persistence seam for accounts.
//!
//! [`UserStore`] is the surface the decision logic talks to; [`PgStore`] is
//! the PostgreSQL implementation. The store must enforce uniqueness on
//! `users.email` and `users.username` at commit time — the service's
//! pre-insert lookups only order the rejections, they cannot close the
//! check-then-insert race.

use crate::accounts::models::{Location, User};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Column guarded by a unique constraint in `users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

/// Errors surfaced by a [`UserStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Commit-time duplicate on a unique column.
    #[error("unique constraint violated on {0:?}")]
    UniqueViolation(UniqueField),
    /// Any other persistence failure; details stay in the logs.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// CRUD surface over users and locations.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup on the stored email value.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Exact-match lookup on the stored username value.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Insert a new user; a duplicate email or username at commit time must
    /// come back as [`StoreError::UniqueViolation`].
    async fn insert_user(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
        password_hash: &str,
        location_id: Option<Uuid>,
    ) -> Result<User, StoreError>;

    async fn location_exists(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn find_location(&self, id: Uuid) -> Result<Option<Location>, StoreError>;

    async fn list_locations(&self) -> Result<Vec<Location>, StoreError>;

    async fn insert_location(&self, id: Uuid, name: &str) -> Result<Location, StoreError>;
}

/// PostgreSQL-backed [`UserStore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, location_id, created_at";

fn unique_violation(err: &sqlx::Error) -> Option<UniqueField> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };

    if db_err.code().as_deref() != Some("23505") {
        return None;
    }

    match db_err.constraint() {
        Some("users_email_key") => Some(UniqueField::Email),
        Some("users_username_key") => Some(UniqueField::Username),
        _ => None,
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up user by email")?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up user by username")?;

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up user by id")?;

        Ok(user)
    }

    async fn insert_user(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
        password_hash: &str,
        location_id: Option<Uuid>,
    ) -> Result<User, StoreError> {
        let query = format!(
            r"
            INSERT INTO users (id, username, email, password_hash, location_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query.as_str()
        );
        let row = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .bind(location_id)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(user) => Ok(user),
            Err(err) => match unique_violation(&err) {
                Some(field) => Err(StoreError::UniqueViolation(field)),
                None => Err(StoreError::Backend(
                    anyhow::Error::new(err).context("failed to insert user"),
                )),
            },
        }
    }

    async fn location_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let query = "SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1) AS exists";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let exists = sqlx::query_scalar::<_, bool>(query)
            .bind(id)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to check location existence")?;

        Ok(exists)
    }

    async fn find_location(&self, id: Uuid) -> Result<Option<Location>, StoreError> {
        let query = "SELECT id, name FROM locations WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let location = sqlx::query_as::<_, Location>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up location")?;

        Ok(location)
    }

    async fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        let query = "SELECT id, name FROM locations ORDER BY name";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let locations = sqlx::query_as::<_, Location>(query)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to list locations")?;

        Ok(locations)
    }

    async fn insert_location(&self, id: Uuid, name: &str) -> Result<Location, StoreError> {
        let query = "INSERT INTO locations (id, name) VALUES ($1, $2) RETURNING id, name";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let location = sqlx::query_as::<_, Location>(query)
            .bind(id)
            .bind(name)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert location")?;

        Ok(location)
    }
}
