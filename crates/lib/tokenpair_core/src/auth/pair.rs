//! Shared tail of login and refresh: create a record, issue and store a pair.

use tracing::debug;

use super::{AuthError, AuthService};
use crate::models::auth::TokenPair;

impl AuthService {
    /// Create a fresh auth record for `user_id` and issue a pair bound to it.
    ///
    /// The record has to exist before the refresh credential can embed its id,
    /// so the hash is attached with a second write. A failure between the two
    /// leaves a record with an empty hash, which no refresh will match. If a
    /// concurrent login replaced the record in between, the second write fails
    /// with [`AuthError::NotFound`] and no pair is handed out.
    pub(super) async fn issue_pair(
        &self,
        user_id: i32,
        origin: &str,
    ) -> Result<TokenPair, AuthError> {
        let mut record = self.records.create(user_id).await?;

        let access = self.access.issue(user_id, record.id);
        let refresh = self.refresh.issue(record.id, origin);
        let access_token = self.access.encode(&access)?;
        let refresh_token = self.refresh.encode(&refresh)?;

        record.secret_hash = self.hasher.hash(&refresh_token)?;
        self.records.update(&record).await?;

        debug!(user_id, record_id = record.id, "issued credential pair");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
