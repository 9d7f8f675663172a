use sqlx::query_as;

use crate::application::repos::{LocationParams, LocationsRepo, RepoError};
use crate::domain::entities::LocationRecord;
use crate::domain::geo::BoundingBox;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(Debug, sqlx::FromRow)]
struct LocationRow {
    id: i64,
    name: String,
    latitude: f64,
    longitude: f64,
}

impl From<LocationRow> for LocationRecord {
    fn from(row: LocationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

#[async_trait::async_trait]
impl LocationsRepo for PostgresRepositories {
    async fn list_locations(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<LocationRecord>, RepoError> {
        let rows = query_as::<_, LocationRow>(
            r#"
            SELECT id, name, latitude, longitude
            FROM locations
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

        Ok(rows.into_iter().map(LocationRecord::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LocationRecord>, RepoError> {
        let row = query_as::<_, LocationRow>(
            "SELECT id, name, latitude, longitude FROM locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(LocationRecord::from))
    }

    async fn find_in_box(&self, bounds: BoundingBox) -> Result<Vec<LocationRecord>, RepoError> {
        let rows = query_as::<_, LocationRow>(
            r#"
            SELECT id, name, latitude, longitude
            FROM locations
            WHERE latitude BETWEEN $1 AND $2
              AND longitude BETWEEN $3 AND $4
            ORDER BY id
            "#,
        )
        .bind(bounds.min_latitude)
        .bind(bounds.max_latitude)
        .bind(bounds.min_longitude)
        .bind(bounds.max_longitude)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(LocationRecord::from).collect())
    }

    async fn create_location(&self, params: LocationParams) -> Result<LocationRecord, RepoError> {
        let row = query_as::<_, LocationRow>(
            r#"
            INSERT INTO locations (name, latitude, longitude)
            VALUES ($1, $2, $3)
            RETURNING id, name, latitude, longitude
            "#,
        )
        .bind(params.name)
        .bind(params.latitude)
        .bind(params.longitude)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_location(
        &self,
        id: i64,
        params: LocationParams,
    ) -> Result<LocationRecord, RepoError> {
        let row = query_as::<_, LocationRow>(
            r#"
            UPDATE locations
            SET name = $2, latitude = $3, longitude = $4
            WHERE id = $1
            RETURNING id, name, latitude, longitude
            "#,
        )
        .bind(id)
        .bind(params.name)
        .bind(params.latitude)
        .bind(params.longitude)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_location(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
