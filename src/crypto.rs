//! Password hashing and bearer session tokens.
//!
//! Tokens are HS256 JWTs carrying `identity` and `exp`. Nothing is stored
//! server-side: a token is valid while its signature checks out and the clock
//! has not reached `exp`.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Source of "now" for expiry checks.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    identity: String,
    exp: i64,
}

#[derive(Clone)]
pub struct CredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_ttl: Duration,
    bcrypt_cost: u32,
    // Verified against when a login names an unknown account, so both paths pay for bcrypt.
    decoy_hash: Arc<str>,
    clock: Clock,
}

impl CredentialService {
    pub fn new(secret: &[u8], default_ttl: Duration, bcrypt_cost: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            default_ttl,
            bcrypt_cost,
            decoy_hash: bcrypt::hash("decoy-password", bcrypt_cost)
                .unwrap_or_default()
                .into(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the clock used for issuing and expiring tokens.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn hash_password(&self, plaintext: &str) -> AuthResult<String> {
        Ok(bcrypt::hash(plaintext, self.bcrypt_cost)?)
    }

    /// A malformed stored hash never verifies.
    pub fn verify_password(&self, plaintext: &str, hash: &str) -> bool {
        bcrypt::verify(plaintext, hash).unwrap_or(false)
    }

    /// Check a login attempt. With no stored hash the decoy hash is verified
    /// instead, and the attempt always fails.
    pub fn verify_login(&self, plaintext: &str, stored_hash: Option<&str>) -> bool {
        match stored_hash {
            Some(hash) => self.verify_password(plaintext, hash),
            None => {
                self.verify_password(plaintext, &self.decoy_hash);
                false
            }
        }
    }

    pub fn issue_token(&self, identity: &str, ttl: Option<Duration>) -> AuthResult<String> {
        let lifetime = ttl.unwrap_or(self.default_ttl);
        let exp = (self.clock)()
            .checked_add_signed(lifetime)
            .ok_or(AuthError::TokenLifetime(lifetime))?
            .timestamp();
        let claims = Claims {
            identity: identity.to_string(),
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)
    }

    pub fn verify_token(&self, token: &str) -> AuthResult<String> {
        // Expiry is checked below against our own clock, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token failed verification");
                AuthError::InvalidCredential
            })?
            .claims;

        if claims.identity.trim().is_empty() {
            return Err(AuthError::InvalidCredential);
        }

        if (self.clock)().timestamp() >= claims.exp {
            return Err(AuthError::ExpiredCredential);
        }

        Ok(claims.identity)
    }
}
