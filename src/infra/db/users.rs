use sqlx::query_as;

use crate::application::repos::{RepoError, UserParams, UsersRepo};
use crate::domain::entities::UserRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    password_hash: String,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            password_hash: row.password_hash,
        }
    }
}

#[async_trait::async_trait]
impl UsersRepo for PostgresRepositories {
    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<UserRecord>, RepoError> {
        let rows = query_as::<_, UserRow>(
            r#"
            SELECT id, name, password_hash
            FROM users
            ORDER BY id
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
        let row = query_as::<_, UserRow>(
            "SELECT id, name, password_hash FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<UserRecord>, RepoError> {
        let row = query_as::<_, UserRow>(
            "SELECT id, name, password_hash FROM users WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn create_user(&self, params: UserParams) -> Result<UserRecord, RepoError> {
        let row = query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, password_hash)
            VALUES ($1, $2)
            RETURNING id, name, password_hash
            "#,
        )
        .bind(params.name)
        .bind(params.password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_user(&self, id: i64, params: UserParams) -> Result<UserRecord, RepoError> {
        let row = query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = $2, password_hash = $3
            WHERE id = $1
            RETURNING id, name, password_hash
            "#,
        )
        .bind(id)
        .bind(params.name)
        .bind(params.password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
