//! Refresh: validate a presented pair and rotate it.
//!
//! Checks run cheapest first and each one is fatal: refresh signature, access
//! signature, record id agreement, refresh expiry, record lookup, stored hash.
//! Only then is the old record deleted and a replacement pair issued.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::{AuthError, AuthService};
use crate::config::NotifyFailurePolicy;
use crate::models::auth::TokenPair;
use crate::notify::Notification;

impl AuthService {
    /// Exchange a valid pair for a new one. The presented refresh credential
    /// is single-use.
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
        origin: &str,
    ) -> Result<TokenPair, AuthError> {
        let refresh = self.refresh.decode(refresh_token)?;
        let access = self.access.decode(access_token)?;

        let record_id = refresh.payload.id;
        if access.payload.id != record_id {
            debug!(
                access_id = access.payload.id,
                refresh_id = record_id,
                "credential ids differ"
            );
            return Err(AuthError::Mismatched);
        }

        if refresh.payload.is_expired_at(Utc::now().timestamp()) {
            debug!(record_id, "refresh credential expired");
            return Err(AuthError::Expired);
        }

        let user_id = access.payload.subject;
        let record = self
            .records
            .get(record_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("auth record {record_id}")))?;
        if record.user_id != user_id {
            return Err(AuthError::Mismatched);
        }

        if !self.hasher.verify(refresh_token, &record.secret_hash) {
            warn!(record_id, user_id, "refresh credential does not match stored hash");
            return Err(AuthError::Unauthorized);
        }

        // A concurrent refresh with the same credential may have won the race.
        if !self.records.delete(record_id).await? {
            return Err(AuthError::NotFound(format!("auth record {record_id}")));
        }

        if refresh.payload.origin_address != origin {
            self.notify_origin_change(user_id, &refresh.payload.origin_address, origin)
                .await?;
        }

        let pair = self.issue_pair(user_id, origin).await?;
        info!(user_id, origin, "refresh succeeded");
        Ok(pair)
    }

    /// Warn the user about a refresh from `current`. Any failure on the way,
    /// including the recipient lookup, goes through the failure policy.
    async fn notify_origin_change(
        &self,
        user_id: i32,
        previous: &str,
        current: &str,
    ) -> Result<(), AuthError> {
        warn!(user_id, previous, current, "refresh from a new origin");

        match self.send_origin_warning(user_id, current).await {
            Ok(()) => Ok(()),
            Err(e) => match self.notify_failure {
                NotifyFailurePolicy::Ignore => {
                    warn!(user_id, error = %e, "anomaly notification failed");
                    Ok(())
                }
                NotifyFailurePolicy::Abort => Err(e),
            },
        }
    }

    async fn send_origin_warning(&self, user_id: i32, origin: &str) -> Result<(), AuthError> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("user {user_id}")))?;
        let notification = Notification::origin_changed(&user.email, origin);
        self.notifier
            .notify(&notification)
            .await
            .map_err(|e| AuthError::Notification(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{OTHER_USER_ID, USER_ID, fixture, fixture_with};
    use super::*;
    use crate::store::AuthRecordStore;

    #[tokio::test]
    async fn same_origin_rotates_without_notification() {
        let f = fixture();
        let pair = f.service.login(USER_ID, "10.0.0.1").await.unwrap();
        let next = f
            .service
            .refresh(&pair.access_token, &pair.refresh_token, "10.0.0.1")
            .await
            .unwrap();

        assert_ne!(next.refresh_token, pair.refresh_token);
        assert!(f.notifier.sent().is_empty());
        assert_eq!(f.records.len().await, 1);
    }

    #[tokio::test]
    async fn new_origin_notifies_once() {
        let f = fixture();
        let pair = f.service.login(USER_ID, "10.0.0.1").await.unwrap();
        let next = f
            .service
            .refresh(&pair.access_token, &pair.refresh_token, "10.0.0.2")
            .await
            .unwrap();

        let sent = f.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "user42@example.com");
        assert!(sent[0].body.contains("10.0.0.2"));

        let refresh = f.service.refresh_issuer().decode(&next.refresh_token).unwrap();
        assert_eq!(refresh.payload.origin_address, "10.0.0.2");
    }

    #[tokio::test]
    async fn refresh_credential_is_single_use() {
        let f = fixture();
        let pair = f.service.login(USER_ID, "a").await.unwrap();
        f.service
            .refresh(&pair.access_token, &pair.refresh_token, "a")
            .await
            .unwrap();
        let err = f
            .service
            .refresh(&pair.access_token, &pair.refresh_token, "a")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn pair_from_superseded_login_is_not_found() {
        let f = fixture();
        let old = f.service.login(USER_ID, "a").await.unwrap();
        f.service.login(USER_ID, "b").await.unwrap();
        let err = f
            .service
            .refresh(&old.access_token, &old.refresh_token, "a")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn pairs_of_different_users_are_mismatched() {
        let f = fixture();
        let a = f.service.login(USER_ID, "a").await.unwrap();
        let b = f.service.login(OTHER_USER_ID, "b").await.unwrap();
        let err = f
            .service
            .refresh(&a.access_token, &b.refresh_token, "a")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Mismatched));
    }

    #[tokio::test]
    async fn swapped_credentials_are_malformed() {
        let f = fixture();
        let pair = f.service.login(USER_ID, "a").await.unwrap();
        let err = f
            .service
            .refresh(&pair.refresh_token, &pair.access_token, "a")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)));
    }

    #[tokio::test]
    async fn tampered_refresh_is_malformed() {
        let f = fixture();
        let pair = f.service.login(USER_ID, "a").await.unwrap();
        let mut tampered = pair.refresh_token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'Q' } else { 'A' });
        let err = f
            .service
            .refresh(&pair.access_token, &tampered, "a")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)));
    }

    #[tokio::test]
    async fn expired_refresh_is_rejected() {
        let f = fixture_with(|s| s.refresh_lifetime_hours = 0, false);
        let pair = f.service.login(USER_ID, "a").await.unwrap();
        let err = f
            .service
            .refresh(&pair.access_token, &pair.refresh_token, "a")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Expired));
        // Validation failures never consume the record.
        assert_eq!(f.records.len().await, 1);
    }

    #[tokio::test]
    async fn hash_mismatch_is_unauthorized() {
        let f = fixture();
        let pair = f.service.login(USER_ID, "a").await.unwrap();
        let id = f
            .service
            .refresh_issuer()
            .decode(&pair.refresh_token)
            .unwrap()
            .payload
            .id;
        let mut record = f.records.get(id).await.unwrap().unwrap();
        record.secret_hash = f.service.hasher.hash("something else").unwrap();
        f.records.update(&record).await.unwrap();

        let err = f
            .service
            .refresh(&pair.access_token, &pair.refresh_token, "a")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
        assert!(f.records.get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn blank_stored_hash_is_unauthorized() {
        let f = fixture();
        let pair = f.service.login(USER_ID, "a").await.unwrap();
        let id = f
            .service
            .access_issuer()
            .decode(&pair.access_token)
            .unwrap()
            .payload
            .id;
        let mut record = f.records.get(id).await.unwrap().unwrap();
        record.secret_hash.clear();
        f.records.update(&record).await.unwrap();

        let err = f
            .service
            .refresh(&pair.access_token, &pair.refresh_token, "a")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn notifier_failure_is_ignored_by_default() {
        let f = fixture_with(|_| {}, true);
        let pair = f.service.login(USER_ID, "a").await.unwrap();
        let next = f
            .service
            .refresh(&pair.access_token, &pair.refresh_token, "b")
            .await;
        assert!(next.is_ok());
        assert_eq!(f.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn notifier_failure_aborts_when_configured() {
        let f = fixture_with(|s| s.notify_failure = NotifyFailurePolicy::Abort, true);
        let pair = f.service.login(USER_ID, "a").await.unwrap();
        let err = f
            .service
            .refresh(&pair.access_token, &pair.refresh_token, "b")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Notification(_)));
        // The old record was consumed before the notification was attempted.
        assert!(f.records.is_empty().await);
    }

    #[tokio::test]
    async fn missing_recipient_is_ignored_by_default() {
        let f = fixture();
        let pair = f.service.login(USER_ID, "a").await.unwrap();
        f.users.remove(USER_ID).await;

        let next = f
            .service
            .refresh(&pair.access_token, &pair.refresh_token, "b")
            .await;
        assert!(next.is_ok());
        assert!(f.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_recipient_aborts_when_configured() {
        let f = fixture_with(|s| s.notify_failure = NotifyFailurePolicy::Abort, false);
        let pair = f.service.login(USER_ID, "a").await.unwrap();
        f.users.remove(USER_ID).await;

        let err = f
            .service
            .refresh(&pair.access_token, &pair.refresh_token, "b")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }
}
