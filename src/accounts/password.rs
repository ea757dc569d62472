//! Password hashing and verification.
//!
//! Argon2id in PHC string format: each hash carries its own random salt and
//! cost parameters, so two hashes of the same password differ while both
//! verify. Parameters are handed to the hasher at construction instead of
//! living in process-global state.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use tracing::warn;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes over the memory.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        // argon2 crate defaults: 19 MiB, 2 passes, 1 lane.
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Salted one-way hasher for account passwords.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Build a hasher from explicit cost parameters.
    ///
    /// # Errors
    /// Returns an error if the parameters are outside Argon2 bounds.
    pub fn new(params: HashParams) -> Result<Self> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|err| anyhow!("invalid Argon2 parameters: {err}"))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if hashing fails.
    pub fn hash(&self, plaintext: &SecretString) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.expose_secret().as_bytes(), &salt)
            .map_err(|err| anyhow!("failed to hash password: {err}"))?;

        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored PHC string.
    ///
    /// A stored value that does not parse as a PHC string counts as a
    /// mismatch rather than an error.
    #[must_use]
    pub fn verify(&self, plaintext: &SecretString, stored: &str) -> bool {
        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("stored password hash is not a valid PHC string: {err}");
                return false;
            }
        };

        self.argon2
            .verify_password(plaintext.expose_secret().as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reduced costs keep the test suite fast; the scheme is the same.
    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn hash_then_verify_round_trip() {
        let hasher = hasher();
        let hash = hasher.hash(&secret("secret1")).unwrap();

        assert!(hasher.verify(&secret("secret1"), &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = hasher();
        let first = hasher.hash(&secret("secret1")).unwrap();
        let second = hasher.hash(&secret("secret1")).unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(&secret("secret1"), &first));
        assert!(hasher.verify(&secret("secret1"), &second));
    }

    #[test]
    fn wrong_password_fails_verification() {
        let hasher = hasher();
        let hash = hasher.hash(&secret("secret1")).unwrap();

        assert!(!hasher.verify(&secret("secret2"), &hash));
    }

    #[test]
    fn hash_is_not_the_plaintext() {
        let hasher = hasher();
        let hash = hasher.hash(&secret("secret1")).unwrap();

        assert!(!hash.contains("secret1"));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn malformed_stored_hash_is_a_mismatch() {
        let hasher = hasher();

        assert!(!hasher.verify(&secret("secret1"), "not-a-phc-string"));
        assert!(!hasher.verify(&secret("secret1"), ""));
    }

    #[test]
    fn verification_uses_parameters_from_the_stored_hash() {
        // A hash produced under one parameter set verifies through a hasher
        // built with another; the PHC string carries its own costs.
        let writer = hasher();
        let reader = PasswordHasher::new(HashParams::default()).unwrap();

        let hash = writer.hash(&secret("secret1")).unwrap();
        assert!(reader.verify(&secret("secret1"), &hash));
    }

    #[test]
    fn rejects_out_of_bounds_parameters() {
        let result = PasswordHasher::new(HashParams {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });

        assert!(result.is_err());
    }
}
