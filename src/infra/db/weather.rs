use sqlx::query_as;
use time::OffsetDateTime;

use crate::application::repos::{CreateWeatherParams, RepoError, WeatherRepo};
use crate::domain::entities::WeatherRecord;

use super::{PostgresRepositories, map_sqlx_error};

const WEATHER_COLUMNS: &str = "id, location_id, rain, humidity, wind_speed, wind_direction, \
    temperature, temperature_feel, cloud_cover, weather_description, weather_time";

#[derive(Debug, sqlx::FromRow)]
struct WeatherRow {
    id: i64,
    location_id: i64,
    rain: Option<f64>,
    humidity: Option<i32>,
    wind_speed: Option<f64>,
    wind_direction: Option<i32>,
    temperature: Option<f64>,
    temperature_feel: Option<i32>,
    cloud_cover: Option<String>,
    weather_description: Option<String>,
    weather_time: Option<OffsetDateTime>,
}

impl From<WeatherRow> for WeatherRecord {
    fn from(row: WeatherRow) -> Self {
        Self {
            id: row.id,
            location_id: row.location_id,
            rain: row.rain,
            humidity: row.humidity,
            wind_speed: row.wind_speed,
            wind_direction: row.wind_direction,
            temperature: row.temperature,
            temperature_feel: row.temperature_feel,
            cloud_cover: row.cloud_cover,
            weather_description: row.weather_description,
            weather_time: row.weather_time,
        }
    }
}

#[async_trait::async_trait]
impl WeatherRepo for PostgresRepositories {
    async fn list_weather(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<WeatherRecord>, RepoError> {
        let sql = format!(
            "SELECT {WEATHER_COLUMNS} FROM weather_data ORDER BY id OFFSET $1 LIMIT $2"
        );
        let rows = query_as::<_, WeatherRow>(&sql)
            .bind(offset)
            .bind(limit)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(WeatherRecord::from).collect())
    }

    async fn next_forecast(
        &self,
        location_id: i64,
        not_before: OffsetDateTime,
    ) -> Result<Option<WeatherRecord>, RepoError> {
        let sql = format!(
            "SELECT {WEATHER_COLUMNS} FROM weather_data \
             WHERE location_id = $1 AND weather_time >= $2 \
             ORDER BY weather_time, id \
             LIMIT 1"
        );
        let row = query_as::<_, WeatherRow>(&sql)
            .bind(location_id)
            .bind(not_before)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(WeatherRecord::from))
    }

    async fn create_forecasts(
        &self,
        params: Vec<CreateWeatherParams>,
    ) -> Result<Vec<WeatherRecord>, RepoError> {
        let sql = format!(
            "INSERT INTO weather_data (location_id, rain, humidity, wind_speed, wind_direction, \
             temperature, temperature_feel, cloud_cover, weather_description, weather_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {WEATHER_COLUMNS}"
        );

        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        let mut stored = Vec::with_capacity(params.len());
        for forecast in params {
            let row = query_as::<_, WeatherRow>(&sql)
                .bind(forecast.location_id)
                .bind(forecast.rain)
                .bind(forecast.humidity)
                .bind(forecast.wind_speed)
                .bind(forecast.wind_direction)
                .bind(forecast.temperature)
                .bind(forecast.temperature_feel)
                .bind(forecast.cloud_cover)
                .bind(forecast.weather_description)
                .bind(forecast.weather_time)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            stored.push(row.into());
        }
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(stored)
    }
}
