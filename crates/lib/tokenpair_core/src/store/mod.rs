//! Persistence contracts for users and auth records.
//!
//! The flows only see these traits. [`postgres`] backs them with `sqlx`,
//! [`memory`] keeps everything in process for tests and local runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::auth::AuthError;
use crate::models::auth::{AuthRecord, User};

/// Read access to the user directory.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn get(&self, user_id: i32) -> Result<Option<User>, AuthError>;
}

/// Storage for the per-user auth record.
///
/// Implementations keep at most one record per user: `create` replaces any
/// record the user already has and always hands out a fresh id.
#[async_trait]
pub trait AuthRecordStore: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<AuthRecord>, AuthError>;

    /// Create a record with an empty secret hash.
    async fn create(&self, user_id: i32) -> Result<AuthRecord, AuthError>;

    /// Overwrite the stored `user_id` and `secret_hash` of `record.id`.
    ///
    /// Fails with [`AuthError::NotFound`] when the record has been replaced
    /// or deleted in the meantime.
    async fn update(&self, record: &AuthRecord) -> Result<(), AuthError>;

    /// Delete by id. Returns `false` when no such record existed.
    async fn delete(&self, id: i32) -> Result<bool, AuthError>;

    /// Delete whatever record the user has. Absence is not an error.
    async fn delete_by_user(&self, user_id: i32) -> Result<(), AuthError>;
}
