//! Credential logics: password hashing and input checks.

use std::sync::LazyLock;

use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Argon2, Params, Version};
use rand::RngCore;
use rand::rngs::OsRng;
use regex_lite::Regex;
use validator::{ValidationError, ValidationErrors};

use crate::ServerError;
use crate::config::Argon2 as ArgonConfig;

const OBJECT_ID_LENGTH: usize = 12;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

#[derive(thiserror::Error, Debug)]
pub enum CryptoError {
    #[error("argon2 error: {0}")]
    Argon2(String),
}

impl From<CryptoError> for ServerError {
    fn from(err: CryptoError) -> Self {
        ServerError::internal("password hashing failed", err)
    }
}

/// Password manager that uses Argon2id and PHC string format for hashing and
/// verification.
pub struct PasswordManager {
    params: Params,
}

impl PasswordManager {
    /// Create a new [`PasswordManager`].
    pub fn new(config: Option<ArgonConfig>) -> Result<Self, CryptoError> {
        let config = config.unwrap_or_default();

        let params = Params::new(
            config.memory_cost,
            config.iterations,
            config.parallelism,
            Some(config.hash_length),
        )
        .map_err(|err| CryptoError::Argon2(err.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
    }

    /// Hash password using Argon2id.
    pub fn hash_password(
        &self,
        password: impl AsRef<[u8]>,
    ) -> Result<String, CryptoError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_ref(), &salt)
            .map_err(|e| CryptoError::Argon2(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify password against a PHC.
    pub fn verify_password(
        &self,
        password: impl AsRef<[u8]>,
        phc_hash: &str,
    ) -> Result<(), ServerError> {
        let parsed = PasswordHash::new(phc_hash)
            .map_err(|_| ServerError::InvalidCredentials)?;

        self.argon2()
            .verify_password(password.as_ref(), &parsed)
            .map_err(|_| ServerError::InvalidCredentials)
    }
}

/// Check a candidate password against the stored hash.
pub fn is_password_valid(
    pwd: &PasswordManager,
    candidate: &str,
    stored_hash: &str,
) -> Result<(), ServerError> {
    if candidate.is_empty() {
        return Err(ServerError::InvalidCredentials);
    }
    pwd.verify_password(candidate, stored_hash)
}

/// Check that a password and its confirmation are present and equal.
pub fn compare_password(
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationErrors> {
    let message = if password.is_empty() || confirmation.is_empty() {
        "Password and confirmation are required."
    } else if password != confirmation {
        "Passwords do not match."
    } else {
        return Ok(());
    };

    let mut errors = ValidationErrors::new();
    errors.add(
        "passwordCheck",
        ValidationError::new("password_mismatch").with_message(message.into()),
    );
    Err(errors)
}

/// Check email formatting.
pub fn validate_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// [`validator`] adapter of [`validate_email`].
pub fn email_format(value: &str) -> Result<(), ValidationError> {
    if validate_email(value) {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

/// Generate a random 24 hexadecimal characters identifier.
pub fn object_id() -> String {
    let mut bytes = [0u8; OBJECT_ID_LENGTH];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
pub(crate) fn test_password_manager() -> PasswordManager {
    PasswordManager::new(Some(ArgonConfig {
        memory_cost: 1024,
        iterations: 1,
        parallelism: 1,
        hash_length: 32,
    }))
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let pwd = test_password_manager();
        let hash = pwd.hash_password("pw1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "pw1");
        assert!(pwd.verify_password("pw1", &hash).is_ok());
        assert!(matches!(
            pwd.verify_password("pw2", &hash),
            Err(ServerError::InvalidCredentials)
        ));
        assert!(is_password_valid(&pwd, "", &hash).is_err());
    }

    #[test]
    fn test_two_hashes_differ() {
        let pwd = test_password_manager();
        assert_ne!(
            pwd.hash_password("same").unwrap(),
            pwd.hash_password("same").unwrap()
        );
    }

    #[test]
    fn test_unparsable_hash() {
        let pwd = test_password_manager();
        assert!(pwd.verify_password("pw1", "pw1").is_err());
    }

    #[test]
    fn test_compare_password() {
        assert!(compare_password("pw1", "pw1").is_ok());
        assert!(compare_password("pw1", "pw2").is_err());
        assert!(compare_password("", "").is_err());
        assert!(compare_password("pw1", "").is_err());
    }

    #[test]
    fn test_email() {
        for email in ["kim@test.com", "user.name+tag@mail.co.kr", "a@b.io"] {
            assert!(validate_email(email), "{email}");
        }
        for email in ["", "kim", "kim@", "@test.com", "kim@test", "kim@@test.com"] {
            assert!(!validate_email(email), "{email}");
        }
    }

    #[test]
    fn test_object_id() {
        let id = object_id();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, object_id());
    }
}
