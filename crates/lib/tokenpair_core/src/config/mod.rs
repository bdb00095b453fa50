//! Issuer and flow settings.

pub mod keys;

pub use keys::{generate_key, resolve_signing_key};

use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

use crate::auth::secret::DEFAULT_COST;

/// Default access credential lifetime: 15 minutes.
pub const DEFAULT_ACCESS_LIFETIME_MINUTES: i64 = 15;

/// Default refresh credential lifetime: 24 hours.
pub const DEFAULT_REFRESH_LIFETIME_HOURS: i64 = 24;

/// Default `iss` claim.
pub const DEFAULT_ISSUER: &str = "tokenpair";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a refresh does when the anomaly notification cannot be delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotifyFailurePolicy {
    /// Log the failure and hand out the new pair anyway.
    #[default]
    Ignore,
    /// Fail the refresh. The old record is already gone at that point.
    Abort,
}

impl FromStr for NotifyFailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "abort" => Ok(Self::Abort),
            other => Err(ConfigError::ValidationError(format!(
                "unknown notify failure policy '{other}' (expected 'ignore' or 'abort')"
            ))),
        }
    }
}

/// Settings for the issuers, the secret hasher and the refresh flow.
#[derive(Clone)]
pub struct AuthSettings {
    pub issuer_name: String,
    pub access_key: String,
    pub refresh_key: String,
    pub access_lifetime_minutes: i64,
    pub refresh_lifetime_hours: i64,
    pub bcrypt_cost: u32,
    pub notify_failure: NotifyFailurePolicy,
}

impl AuthSettings {
    /// Settings with default lifetimes and cost for the given keys.
    pub fn new(access_key: impl Into<String>, refresh_key: impl Into<String>) -> Self {
        Self {
            issuer_name: DEFAULT_ISSUER.to_string(),
            access_key: access_key.into(),
            refresh_key: refresh_key.into(),
            access_lifetime_minutes: DEFAULT_ACCESS_LIFETIME_MINUTES,
            refresh_lifetime_hours: DEFAULT_REFRESH_LIFETIME_HOURS,
            bcrypt_cost: DEFAULT_COST,
            notify_failure: NotifyFailurePolicy::default(),
        }
    }

    /// Reject settings the issuers cannot work with.
    ///
    /// The two keys must differ so that an access credential can never verify
    /// as a refresh credential.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_key.is_empty() || self.refresh_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "signing keys must not be empty".into(),
            ));
        }
        if self.access_key == self.refresh_key {
            return Err(ConfigError::ValidationError(
                "access and refresh signing keys must differ".into(),
            ));
        }
        if self.access_lifetime_minutes <= 0 || self.refresh_lifetime_hours <= 0 {
            return Err(ConfigError::ValidationError(
                "credential lifetimes must be positive".into(),
            ));
        }
        if Duration::try_minutes(self.access_lifetime_minutes).is_none()
            || Duration::try_hours(self.refresh_lifetime_hours).is_none()
        {
            return Err(ConfigError::ValidationError(
                "credential lifetimes are out of range".into(),
            ));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::ValidationError(format!(
                "bcrypt cost {} is outside 4..=31",
                self.bcrypt_cost
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("issuer_name", &self.issuer_name)
            .field("access_lifetime_minutes", &self.access_lifetime_minutes)
            .field("refresh_lifetime_hours", &self.refresh_lifetime_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("notify_failure", &self.notify_failure)
            .finish_non_exhaustive()
    }
}
