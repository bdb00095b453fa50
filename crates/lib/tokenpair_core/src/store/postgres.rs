//! PostgreSQL-backed stores.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{AuthRecordStore, UserLookup};
use crate::auth::AuthError;
use crate::models::auth::{AuthRecord, User};

/// Users from the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserLookup {
    pool: PgPool,
}

impl PgUserLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserLookup for PgUserLookup {
    async fn get(&self, user_id: i32) -> Result<Option<User>, AuthError> {
        let row = sqlx::query_as::<_, (i32, String)>("SELECT id, email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id, email)| User { id, email }))
    }
}

/// Auth records in the `auths` table.
///
/// `auths.user_id` is UNIQUE; `create` upserts on it and draws a new id from
/// the serial sequence, so concurrent logins for one user leave one row.
#[derive(Debug, Clone)]
pub struct PgAuthRecordStore {
    pool: PgPool,
}

impl PgAuthRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_record((id, user_id, secret_hash): (i32, i32, String)) -> AuthRecord {
    AuthRecord {
        id,
        user_id,
        secret_hash,
    }
}

#[async_trait]
impl AuthRecordStore for PgAuthRecordStore {
    async fn get(&self, id: i32) -> Result<Option<AuthRecord>, AuthError> {
        let row = sqlx::query_as::<_, (i32, i32, String)>(
            "SELECT id, user_id, refresh_token_hash FROM auths WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(to_record))
    }

    async fn create(&self, user_id: i32) -> Result<AuthRecord, AuthError> {
        let row = sqlx::query_as::<_, (i32, i32, String)>(
            "INSERT INTO auths (user_id, refresh_token_hash) VALUES ($1, '') \
             ON CONFLICT (user_id) DO UPDATE \
             SET id = nextval(pg_get_serial_sequence('auths', 'id')), \
                 refresh_token_hash = '' \
             RETURNING id, user_id, refresh_token_hash",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(to_record(row))
    }

    async fn update(&self, record: &AuthRecord) -> Result<(), AuthError> {
        let result =
            sqlx::query("UPDATE auths SET user_id = $1, refresh_token_hash = $2 WHERE id = $3")
                .bind(record.user_id)
                .bind(&record.secret_hash)
                .bind(record.id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound(format!("auth record {}", record.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM auths WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_user(&self, user_id: i32) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM auths WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
