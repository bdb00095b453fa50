//! Credential pair issuance and rotation.
//!
//! [`AuthService`] bundles the two issuers with the user directory, the auth
//! record store and the anomaly notifier, and exposes the login and refresh
//! flows to the transport layer.

pub mod login;
mod pair;
pub mod refresh;
pub mod secret;

use std::sync::Arc;

use thiserror::Error;

use crate::config::{AuthSettings, NotifyFailurePolicy};
use crate::notify::AnomalyNotifier;
use crate::store::{AuthRecordStore, UserLookup};
use crate::token::access::AccessIssuer;
use crate::token::refresh::RefreshIssuer;
use secret::SecretHasher;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Malformed credential: {0}")]
    Malformed(String),

    #[error("Refresh credential has expired")]
    Expired,

    #[error("Access and refresh credentials belong to different records")]
    Mismatched,

    #[error("Refresh credential does not match the stored secret")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Issues fresh credential pairs and rotates them on renewal.
#[derive(Clone)]
pub struct AuthService {
    access: AccessIssuer,
    refresh: RefreshIssuer,
    hasher: SecretHasher,
    users: Arc<dyn UserLookup>,
    records: Arc<dyn AuthRecordStore>,
    notifier: Arc<dyn AnomalyNotifier>,
    notify_failure: NotifyFailurePolicy,
}

impl AuthService {
    /// Build a service from validated settings and its collaborators.
    pub fn new(
        settings: &AuthSettings,
        users: Arc<dyn UserLookup>,
        records: Arc<dyn AuthRecordStore>,
        notifier: Arc<dyn AnomalyNotifier>,
    ) -> Self {
        Self {
            access: AccessIssuer::new(
                settings.issuer_name.clone(),
                settings.access_key.as_bytes(),
                settings.access_lifetime_minutes,
            ),
            refresh: RefreshIssuer::new(
                settings.issuer_name.clone(),
                settings.refresh_key.as_bytes(),
                settings.refresh_lifetime_hours,
            ),
            hasher: SecretHasher::new(settings.bcrypt_cost),
            users,
            records,
            notifier,
            notify_failure: settings.notify_failure,
        }
    }

    pub fn access_issuer(&self) -> &AccessIssuer {
        &self.access
    }

    pub fn refresh_issuer(&self) -> &RefreshIssuer {
        &self.refresh
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::AuthService;
    use crate::config::AuthSettings;
    use crate::models::auth::User;
    use crate::notify::RecordingNotifier;
    use crate::store::memory::{MemoryAuthRecordStore, MemoryUserLookup};

    pub const USER_ID: i32 = 42;
    pub const OTHER_USER_ID: i32 = 7;

    pub struct Fixture {
        pub service: AuthService,
        pub users: Arc<MemoryUserLookup>,
        pub records: Arc<MemoryAuthRecordStore>,
        pub notifier: Arc<RecordingNotifier>,
    }

    pub fn fixture() -> Fixture {
        fixture_with(|_| {}, false)
    }

    /// Service over memory stores with two known users and bcrypt cost 4.
    pub fn fixture_with(tweak: impl FnOnce(&mut AuthSettings), failing_notifier: bool) -> Fixture {
        let mut settings = AuthSettings::new("access-test-key", "refresh-test-key");
        settings.bcrypt_cost = 4;
        tweak(&mut settings);

        let users = Arc::new(MemoryUserLookup::new([
            User {
                id: USER_ID,
                email: "user42@example.com".into(),
            },
            User {
                id: OTHER_USER_ID,
                email: "user7@example.com".into(),
            },
        ]));
        let records = Arc::new(MemoryAuthRecordStore::new());
        let notifier = Arc::new(if failing_notifier {
            RecordingNotifier::failing()
        } else {
            RecordingNotifier::new()
        });

        let service = AuthService::new(
            &settings,
            users.clone(),
            records.clone(),
            notifier.clone(),
        );
        Fixture {
            service,
            users,
            records,
            notifier,
        }
    }
}
