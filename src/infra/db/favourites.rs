use sqlx::query_as;

use crate::application::repos::{
    CreateFavouriteParams, FavouritesRepo, RepoError, UpdateFavouriteParams,
};
use crate::domain::entities::FavouriteRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(Debug, sqlx::FromRow)]
struct FavouriteRow {
    id: i64,
    title: String,
    description: Option<String>,
    user_id: i64,
    location_id: i64,
}

impl From<FavouriteRow> for FavouriteRecord {
    fn from(row: FavouriteRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            user_id: row.user_id,
            location_id: row.location_id,
        }
    }
}

#[async_trait::async_trait]
impl FavouritesRepo for PostgresRepositories {
    async fn list_for_user(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FavouriteRecord>, RepoError> {
        let rows = query_as::<_, FavouriteRow>(
            r#"
            SELECT id, title, description, user_id, location_id
            FROM favourites
            WHERE user_id = $1
            ORDER BY id
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(FavouriteRecord::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<FavouriteRecord>, RepoError> {
        let row = query_as::<_, FavouriteRow>(
            r#"
            SELECT id, title, description, user_id, location_id
            FROM favourites
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(FavouriteRecord::from))
    }

    async fn create_favourite(
        &self,
        params: CreateFavouriteParams,
    ) -> Result<FavouriteRecord, RepoError> {
        let row = query_as::<_, FavouriteRow>(
            r#"
            INSERT INTO favourites (title, description, user_id, location_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, user_id, location_id
            "#,
        )
        .bind(params.title)
        .bind(params.description)
        .bind(params.user_id)
        .bind(params.location_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_favourite(
        &self,
        params: UpdateFavouriteParams,
    ) -> Result<FavouriteRecord, RepoError> {
        let row = query_as::<_, FavouriteRow>(
            r#"
            UPDATE favourites
            SET title = $2, description = $3, location_id = $4
            WHERE id = $1
            RETURNING id, title, description, user_id, location_id
            "#,
        )
        .bind(params.id)
        .bind(params.title)
        .bind(params.description)
        .bind(params.location_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_favourite(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM favourites WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn owners_of_location(&self, location_id: i64) -> Result<Vec<i64>, RepoError> {
        let owners = sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT user_id FROM favourites WHERE location_id = $1 ORDER BY user_id",
        )
        .bind(location_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(owners)
    }
}
