//! Login: issue a fresh pair, dropping whatever pair the user had before.

use tracing::{debug, info};

use super::{AuthError, AuthService};
use crate::models::auth::TokenPair;

impl AuthService {
    /// Issue a new credential pair for `user_id` requesting from `origin`.
    ///
    /// Fails with [`AuthError::NotFound`] before touching any record when the
    /// user does not exist.
    pub async fn login(&self, user_id: i32, origin: &str) -> Result<TokenPair, AuthError> {
        if self.users.get(user_id).await?.is_none() {
            debug!(user_id, "login for unknown user");
            return Err(AuthError::NotFound(format!("user {user_id}")));
        }

        self.records.delete_by_user(user_id).await?;
        let pair = self.issue_pair(user_id, origin).await?;

        info!(user_id, origin, "login succeeded");
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{USER_ID, fixture};
    use super::*;
    use crate::store::AuthRecordStore;

    #[tokio::test]
    async fn login_returns_pair_bound_to_new_record() {
        let f = fixture();
        let pair = f.service.login(USER_ID, "10.0.0.1").await.unwrap();

        let access = f.service.access_issuer().decode(&pair.access_token).unwrap();
        let refresh = f.service.refresh_issuer().decode(&pair.refresh_token).unwrap();
        assert_eq!(access.payload.subject, USER_ID);
        assert_eq!(access.payload.id, refresh.payload.id);
        assert_eq!(refresh.payload.origin_address, "10.0.0.1");

        let record = f.records.get(access.payload.id).await.unwrap().unwrap();
        assert_eq!(record.user_id, USER_ID);
        assert!(record.secret_hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found_and_leaves_store_untouched() {
        let f = fixture();
        let err = f.service.login(999, "10.0.0.1").await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
        assert!(f.records.is_empty().await);
    }

    #[tokio::test]
    async fn second_login_replaces_record() {
        let f = fixture();
        let first = f.service.login(USER_ID, "a").await.unwrap();
        let second = f.service.login(USER_ID, "b").await.unwrap();

        let first_id = f.service.access_issuer().decode(&first.access_token).unwrap().payload.id;
        let second_id = f.service.access_issuer().decode(&second.access_token).unwrap().payload.id;
        assert_ne!(first_id, second_id);
        assert!(f.records.get(first_id).await.unwrap().is_none());
        assert_eq!(f.records.len().await, 1);
    }
}
