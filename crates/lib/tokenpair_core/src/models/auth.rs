//! Authentication domain models.

use serde::{Deserialize, Serialize};

/// Domain user. Read-only to the credential flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
}

/// The single live credential pairing for a user.
///
/// `secret_hash` is the bcrypt hash of the encoded refresh credential. It is
/// empty between record creation and the follow-up update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRecord {
    pub id: i32,
    pub user_id: i32,
    pub secret_hash: String,
}

/// An encoded access/refresh credential pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
