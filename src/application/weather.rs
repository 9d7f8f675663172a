//! Forecasts for stored locations, fetched from the upstream provider on
//! demand and kept in the database.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::application::error::AppError;
use crate::application::pagination::PageWindow;
use crate::application::repos::{CreateWeatherParams, LocationsRepo, WeatherRepo};
use crate::cache::{CollectionCache, CollectionKind, Owner};
use crate::domain::entities::WeatherRecord;

/// Stored forecasts older than this no longer count as current.
const FORECAST_STALE_AFTER: Duration = Duration::hours(1);

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Request(String),
    #[error("unexpected weather payload: {0}")]
    Decode(String),
    #[error("no {0} found for the coordinates")]
    NoMatch(&'static str),
}

/// One forecast step as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    pub rain: Option<f64>,
    pub humidity: Option<i32>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<i32>,
    pub temperature: Option<f64>,
    pub temperature_feel: Option<i32>,
    pub cloud_cover: Option<String>,
    pub description: Option<String>,
    pub time: Option<OffsetDateTime>,
}

impl Forecast {
    fn into_params(self, location_id: i64) -> CreateWeatherParams {
        CreateWeatherParams {
            location_id,
            rain: self.rain,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            wind_direction: self.wind_direction,
            temperature: self.temperature,
            temperature_feel: self.temperature_feel,
            cloud_cover: self.cloud_cover,
            weather_description: self.description,
            weather_time: self.time,
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Forecast steps for the coordinates, earliest first.
    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<Forecast>, WeatherError>;
}

#[derive(Clone)]
pub struct WeatherService {
    weather: Arc<dyn WeatherRepo>,
    locations: Arc<dyn LocationsRepo>,
    provider: Arc<dyn WeatherProvider>,
    cache: CollectionCache,
}

impl WeatherService {
    pub fn new(
        weather: Arc<dyn WeatherRepo>,
        locations: Arc<dyn LocationsRepo>,
        provider: Arc<dyn WeatherProvider>,
        cache: CollectionCache,
    ) -> Self {
        Self {
            weather,
            locations,
            provider,
            cache,
        }
    }

    pub async fn list(&self, window: PageWindow) -> Result<Vec<WeatherRecord>, AppError> {
        Ok(self
            .weather
            .list_weather(window.offset(), window.limit())
            .await?)
    }

    /// The stored forecast closest to now, fetching a fresh series when
    /// nothing recent is stored.
    pub async fn current(&self, location_id: i64) -> Result<WeatherRecord, AppError> {
        let location = self
            .locations
            .find_by_id(location_id)
            .await?
            .ok_or_else(|| AppError::not_found("location"))?;

        let not_before = OffsetDateTime::now_utc() - FORECAST_STALE_AFTER;
        if let Some(stored) = self.weather.next_forecast(location.id, not_before).await? {
            return Ok(stored);
        }

        let forecasts = self
            .provider
            .forecast(location.latitude, location.longitude)
            .await
            .inspect_err(|err| {
                warn!(
                    target = "bikinghub::weather",
                    location_id,
                    error = %err,
                    "weather provider failed"
                );
            })?;
        if forecasts.is_empty() {
            return Err(AppError::Unavailable(
                "weather provider returned no forecasts".to_string(),
            ));
        }

        let params = forecasts
            .into_iter()
            .map(|forecast| forecast.into_params(location.id))
            .collect();
        let stored = self.weather.create_forecasts(params).await?;
        self.cache.invalidate(CollectionKind::Weather, Owner::All);
        info!(
            target = "bikinghub::weather",
            location_id,
            stored = stored.len(),
            "stored fresh forecasts"
        );

        stored
            .into_iter()
            .next()
            .ok_or_else(|| AppError::unexpected("forecasts were not stored"))
    }
}
