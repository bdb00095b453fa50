//! Access credentials: short-lived, carry the user id.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Envelope;
use crate::auth::AuthError;

/// Payload of an access credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenPayload {
    /// User the credential was issued to.
    #[serde(rename = "sub")]
    pub subject: i32,
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Unix seconds.
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Unix seconds.
    #[serde(rename = "exp")]
    pub expiration_time: i64,
    /// Auth record the credential belongs to.
    #[serde(rename = "jti")]
    pub id: i32,
}

/// Access credential envelope.
pub type AccessToken = Envelope<AccessTokenPayload>;

/// Issues and verifies access credentials.
#[derive(Clone)]
pub struct AccessIssuer {
    name: String,
    key: Vec<u8>,
    lifetime: Duration,
}

impl AccessIssuer {
    /// Lifetimes beyond what `chrono` can represent saturate.
    pub fn new(name: impl Into<String>, key: impl Into<Vec<u8>>, lifetime_minutes: i64) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            lifetime: Duration::try_minutes(lifetime_minutes).unwrap_or(Duration::MAX),
        }
    }

    /// Issue a credential for `user_id` bound to auth record `record_id`.
    pub fn issue(&self, user_id: i32, record_id: i32) -> AccessToken {
        self.issue_at(Utc::now().timestamp(), user_id, record_id)
    }

    /// Issue with an explicit `now` in unix seconds.
    pub fn issue_at(&self, now: i64, user_id: i32, record_id: i32) -> AccessToken {
        Envelope::new(AccessTokenPayload {
            subject: user_id,
            issuer: self.name.clone(),
            issued_at: now,
            expiration_time: now + self.lifetime.num_seconds(),
            id: record_id,
        })
    }

    pub fn encode(&self, token: &AccessToken) -> Result<String, AuthError> {
        token.encode(&self.key)
    }

    /// Verify the signature under this issuer's key. Does not check expiry.
    pub fn decode(&self, encoded: &str) -> Result<AccessToken, AuthError> {
        AccessToken::decode(encoded, &self.key)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

impl std::fmt::Debug for AccessIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessIssuer")
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
