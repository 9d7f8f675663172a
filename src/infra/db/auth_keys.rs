use sqlx::query_as;

use crate::application::repos::{AuthKeysRepo, CreateAuthKeyParams, RepoError};
use crate::domain::entities::AuthKeyRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(Debug, sqlx::FromRow)]
struct AuthKeyRow {
    id: i64,
    key_hash: Vec<u8>,
    user_id: i64,
    admin: bool,
}

impl From<AuthKeyRow> for AuthKeyRecord {
    fn from(row: AuthKeyRow) -> Self {
        Self {
            id: row.id,
            key_hash: row.key_hash,
            user_id: row.user_id,
            admin: row.admin,
        }
    }
}

#[async_trait::async_trait]
impl AuthKeysRepo for PostgresRepositories {
    async fn find_by_hash(&self, key_hash: &[u8]) -> Result<Option<AuthKeyRecord>, RepoError> {
        let row = query_as::<_, AuthKeyRow>(
            r#"
            SELECT id, key_hash, user_id, admin
            FROM authentication_keys
            WHERE key_hash = $1
            "#,
        )
        .bind(key_hash)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(AuthKeyRecord::from))
    }

    async fn find_admin_by_hash(
        &self,
        key_hash: &[u8],
    ) -> Result<Option<AuthKeyRecord>, RepoError> {
        let row = query_as::<_, AuthKeyRow>(
            r#"
            SELECT id, key_hash, user_id, admin
            FROM authentication_keys
            WHERE key_hash = $1 AND admin = TRUE
            "#,
        )
        .bind(key_hash)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(AuthKeyRecord::from))
    }

    async fn create_key(&self, params: CreateAuthKeyParams) -> Result<AuthKeyRecord, RepoError> {
        let row = query_as::<_, AuthKeyRow>(
            r#"
            INSERT INTO authentication_keys (key_hash, user_id, admin)
            VALUES ($1, $2, $3)
            RETURNING id, key_hash, user_id, admin
            "#,
        )
        .bind(params.key_hash)
        .bind(params.user_id)
        .bind(params.admin)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}
