//! In-process stores.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use super::{AuthRecordStore, UserLookup};
use crate::auth::AuthError;
use crate::models::auth::{AuthRecord, User};

/// Fixed user directory.
#[derive(Debug, Default)]
pub struct MemoryUserLookup {
    users: RwLock<HashMap<i32, User>>,
}

impl MemoryUserLookup {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn remove(&self, user_id: i32) -> Option<User> {
        self.users.write().await.remove(&user_id)
    }
}

#[async_trait]
impl UserLookup for MemoryUserLookup {
    async fn get(&self, user_id: i32) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}

#[derive(Debug, Default)]
struct Records {
    next_id: i32,
    by_id: HashMap<i32, AuthRecord>,
}

impl Records {
    fn remove_user(&mut self, user_id: i32) {
        self.by_id.retain(|_, r| r.user_id != user_id);
    }
}

/// Auth records behind a single mutex, so each call is atomic.
#[derive(Debug, Default)]
pub struct MemoryAuthRecordStore {
    inner: Mutex<Records>,
}

impl MemoryAuthRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AuthRecordStore for MemoryAuthRecordStore {
    async fn get(&self, id: i32) -> Result<Option<AuthRecord>, AuthError> {
        Ok(self.inner.lock().await.by_id.get(&id).cloned())
    }

    async fn create(&self, user_id: i32) -> Result<AuthRecord, AuthError> {
        let mut records = self.inner.lock().await;
        records.remove_user(user_id);
        records.next_id += 1;
        let record = AuthRecord {
            id: records.next_id,
            user_id,
            secret_hash: String::new(),
        };
        records.by_id.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: &AuthRecord) -> Result<(), AuthError> {
        let mut records = self.inner.lock().await;
        let Some(existing) = records.by_id.get_mut(&record.id) else {
            return Err(AuthError::NotFound(format!("auth record {}", record.id)));
        };
        existing.user_id = record.user_id;
        existing.secret_hash = record.secret_hash.clone();
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, AuthError> {
        Ok(self.inner.lock().await.by_id.remove(&id).is_some())
    }

    async fn delete_by_user(&self, user_id: i32) -> Result<(), AuthError> {
        self.inner.lock().await.remove_user(user_id);
        Ok(())
    }
}
