//! Shared response payloads.

use crate::accounts::models::{Location, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Location as returned to clients.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct LocationResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<Location> for LocationResponse {
    fn from(location: Location) -> Self {
        Self {
            id: location.id,
            name: location.name,
        }
    }
}

/// User as returned to clients; the password hash never leaves the server.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub location_id: Option<Uuid>,
    pub location: Option<LocationResponse>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    #[must_use]
    pub fn from_user(user: User, location: Option<Location>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            location_id: user.location_id,
            location: location.map(LocationResponse::from),
            created_at: user.created_at,
        }
    }
}
