//! Manage session tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

/// Default lifetime of a token, in seconds.
pub const EXPIRATION_TIME: u64 = 60 * 60; // 1 hour.

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Identifies the expiration time on or after which the JWT must not be
    /// accepted for processing.
    pub exp: u64,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the instance that issued the JWT.
    pub iss: String,
    /// User ID.
    pub sub: String,
}

/// Issue and check symmetric-key signed tokens.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expires_in: u64,
}

impl TokenManager {
    /// Create a new [`TokenManager`] instance.
    pub fn new(issuer: &str, secret: &str) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_owned(),
            expires_in: EXPIRATION_TIME,
        }
    }

    /// Change token lifetime.
    pub fn expires_in(mut self, seconds: u64) -> Self {
        self.expires_in = seconds;
        self
    }

    /// Create a new token for `user_id`.
    pub fn create(&self, user_id: &str) -> Result<String> {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| ServerError::internal("clock went backwards", err))?
            .as_secs();
        let claims = Claims {
            exp: time + self.expires_in,
            iat: time,
            iss: self.issuer.clone(),
            sub: user_id.to_owned(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|err| ServerError::internal("cannot sign token", err))
    }

    /// Decode and check a token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "rejected token");
                ServerError::Unauthorized
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_decode() {
        let manager = TokenManager::new("https://study.example.com/", "secret");
        let token = manager.create("65f0a1b2c3d4e5f6a7b8c9d0").unwrap();

        let claims = manager.decode(&token).unwrap();
        assert_eq!(claims.sub, "65f0a1b2c3d4e5f6a7b8c9d0");
        assert_eq!(claims.iss, "https://study.example.com/");
        assert_eq!(claims.exp - claims.iat, EXPIRATION_TIME);
    }

    #[test]
    fn test_reject_foreign_signature() {
        let ours = TokenManager::new("issuer", "secret");
        let theirs = TokenManager::new("issuer", "another secret");

        let token = theirs.create("user").unwrap();
        assert!(matches!(ours.decode(&token), Err(ServerError::Unauthorized)));
        assert!(ours.decode("not.a.token").is_err());
    }

    #[test]
    fn test_reject_other_issuer() {
        let ours = TokenManager::new("issuer", "secret");
        let theirs = TokenManager::new("someone-else", "secret");

        let token = theirs.create("user").unwrap();
        assert!(ours.decode(&token).is_err());
    }

    #[test]
    fn test_reject_expired() {
        let manager = TokenManager::new("issuer", "secret").expires_in(0);
        let token = manager.create("user").unwrap();

        // `exp == now` is already expired without leeway once a second passes.
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(manager.decode(&token).is_err());
    }
}
