//! API handlers and shared validation helpers.
//!
//! Syntactic checks on request fields happen here, before the accounts
//! service is invoked; uniqueness and credential decisions belong to the
//! service.

pub mod health;
pub mod locations;
pub mod root;
pub mod types;
pub mod user_login;
pub mod user_register;
pub mod users;

use crate::accounts::{
    models::{Location, User},
    AccountService,
};
use regex::Regex;
use tracing::error;

/// Lightweight email sanity check used before touching the store.
pub fn valid_email(email: &str) -> bool {
    email.len() <= 100
        && Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Usernames are 3-50 characters.
pub fn valid_username(username: &str) -> bool {
    (3..=50).contains(&username.chars().count())
}

/// Plaintext passwords are accepted between 6 and 100 characters.
pub fn valid_password(password: &str) -> bool {
    (6..=100).contains(&password.chars().count())
}

/// Location names are non-empty and at most 100 characters.
pub fn valid_location_name(name: &str) -> bool {
    !name.trim().is_empty() && name.chars().count() <= 100
}

/// Resolve a user's location for response assembly.
///
/// A lookup failure only degrades the response (no embedded location); the
/// error itself is logged here.
pub(crate) async fn location_for(accounts: &AccountService, user: &User) -> Option<Location> {
    let id = user.location_id?;

    match accounts.find_location(id).await {
        Ok(location) => location,
        Err(err) => {
            error!("Failed to load location {} for response: {:?}", id, err);
            None
        }
    }
}
