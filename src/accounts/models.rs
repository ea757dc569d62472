use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

/// A registered account as stored in `users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// PHC-format string produced by the hasher; never the plaintext.
    pub password_hash: String,
    pub location_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl FromRow<'_, PgRow> for User {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            location_id: row.try_get("location_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// A location users may reference, as stored in `locations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
}

impl FromRow<'_, PgRow> for Location {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

/// Candidate registration as received from the boundary.
///
/// Fields are syntactically validated by the HTTP layer before this struct
/// is built; the plaintext password stays wrapped until it reaches the
/// hasher.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub location_id: Option<Uuid>,
}
