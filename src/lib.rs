//! # Roster
//!
//! `roster` is a minimal user-registration and authentication backend:
//! create accounts, keep email and username unique, optionally attach a
//! location to a user, and verify credentials at login.
//!
//! ## Accounts
//!
//! Registration runs a fixed sequence of checks (duplicate email, duplicate
//! username, location existence) and persists an Argon2id password hash;
//! the plaintext never reaches the database. Login collapses "unknown
//! email" and "wrong password" into a single `Unauthorized` response so the
//! API cannot be used to enumerate accounts.
//!
//! ## Storage
//!
//! PostgreSQL via `sqlx`. Uniqueness is enforced twice: a pre-insert lookup
//! for friendly ordering of rejections, and unique constraints on
//! `users.email` / `users.username` that close the check-then-insert race at
//! commit time.

pub mod accounts;
pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
