//! Refresh credentials: long-lived, carry the issuing origin.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Envelope;
use crate::auth::AuthError;

/// Payload of a refresh credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenPayload {
    #[serde(rename = "iss")]
    pub issuer: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expiration_time: i64,
    #[serde(rename = "jti")]
    pub id: i32,
    /// Network address the credential was issued to.
    #[serde(rename = "uip")]
    pub origin_address: String,
}

impl RefreshTokenPayload {
    /// A credential whose expiration time is at or before `now` is expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiration_time <= now
    }
}

/// Refresh credential envelope.
pub type RefreshToken = Envelope<RefreshTokenPayload>;

/// Issues and verifies refresh credentials.
#[derive(Clone)]
pub struct RefreshIssuer {
    name: String,
    key: Vec<u8>,
    lifetime: Duration,
}

impl RefreshIssuer {
    /// Lifetimes beyond what `chrono` can represent saturate.
    pub fn new(name: impl Into<String>, key: impl Into<Vec<u8>>, lifetime_hours: i64) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            lifetime: Duration::try_hours(lifetime_hours).unwrap_or(Duration::MAX),
        }
    }

    /// Issue a credential for auth record `record_id`, requested from `origin`.
    pub fn issue(&self, record_id: i32, origin: &str) -> RefreshToken {
        self.issue_at(Utc::now().timestamp(), record_id, origin)
    }

    pub fn issue_at(&self, now: i64, record_id: i32, origin: &str) -> RefreshToken {
        Envelope::new(RefreshTokenPayload {
            issuer: self.name.clone(),
            issued_at: now,
            expiration_time: now + self.lifetime.num_seconds(),
            id: record_id,
            origin_address: origin.to_string(),
        })
    }

    pub fn encode(&self, token: &RefreshToken) -> Result<String, AuthError> {
        token.encode(&self.key)
    }

    /// Verify the signature under this issuer's key. Does not check expiry.
    pub fn decode(&self, encoded: &str) -> Result<RefreshToken, AuthError> {
        RefreshToken::decode(encoded, &self.key)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

impl std::fmt::Debug for RefreshIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshIssuer")
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
