//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::domain::entities::{
    AuthKeyRecord, FavouriteRecord, LocationRecord, UserRecord, WeatherRecord,
};
use crate::domain::geo::BoundingBox;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UserParams {
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct LocationParams {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct CreateFavouriteParams {
    pub title: String,
    pub description: Option<String>,
    pub user_id: i64,
    pub location_id: i64,
}

#[derive(Debug, Clone)]
pub struct UpdateFavouriteParams {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location_id: i64,
}

#[derive(Debug, Clone)]
pub struct CreateWeatherParams {
    pub location_id: i64,
    pub rain: Option<f64>,
    pub humidity: Option<i32>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<i32>,
    pub temperature: Option<f64>,
    pub temperature_feel: Option<i32>,
    pub cloud_cover: Option<String>,
    pub weather_description: Option<String>,
    pub weather_time: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct CreateAuthKeyParams {
    pub key_hash: Vec<u8>,
    pub user_id: i64,
    pub admin: bool,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<UserRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn create_user(&self, params: UserParams) -> Result<UserRecord, RepoError>;

    async fn update_user(&self, id: i64, params: UserParams) -> Result<UserRecord, RepoError>;

    /// Returns false when no row matched.
    async fn delete_user(&self, id: i64) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait LocationsRepo: Send + Sync {
    async fn list_locations(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<LocationRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<LocationRecord>, RepoError>;

    /// Candidates for proximity checks; callers refine with an exact distance.
    async fn find_in_box(&self, bounds: BoundingBox) -> Result<Vec<LocationRecord>, RepoError>;

    async fn create_location(&self, params: LocationParams) -> Result<LocationRecord, RepoError>;

    async fn update_location(
        &self,
        id: i64,
        params: LocationParams,
    ) -> Result<LocationRecord, RepoError>;

    async fn delete_location(&self, id: i64) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait FavouritesRepo: Send + Sync {
    async fn list_for_user(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FavouriteRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<FavouriteRecord>, RepoError>;

    async fn create_favourite(
        &self,
        params: CreateFavouriteParams,
    ) -> Result<FavouriteRecord, RepoError>;

    async fn update_favourite(
        &self,
        params: UpdateFavouriteParams,
    ) -> Result<FavouriteRecord, RepoError>;

    async fn delete_favourite(&self, id: i64) -> Result<bool, RepoError>;

    /// Distinct users holding a favourite of `location_id`.
    async fn owners_of_location(&self, location_id: i64) -> Result<Vec<i64>, RepoError>;
}

#[async_trait]
pub trait WeatherRepo: Send + Sync {
    async fn list_weather(&self, offset: i64, limit: i64)
    -> Result<Vec<WeatherRecord>, RepoError>;

    /// Earliest forecast for the location at or after `not_before`.
    async fn next_forecast(
        &self,
        location_id: i64,
        not_before: OffsetDateTime,
    ) -> Result<Option<WeatherRecord>, RepoError>;

    async fn create_forecasts(
        &self,
        params: Vec<CreateWeatherParams>,
    ) -> Result<Vec<WeatherRecord>, RepoError>;
}

#[async_trait]
pub trait AuthKeysRepo: Send + Sync {
    async fn find_by_hash(&self, key_hash: &[u8]) -> Result<Option<AuthKeyRecord>, RepoError>;

    /// Matches on the hash and the admin flag together.
    async fn find_admin_by_hash(
        &self,
        key_hash: &[u8],
    ) -> Result<Option<AuthKeyRecord>, RepoError>;

    async fn create_key(&self, params: CreateAuthKeyParams) -> Result<AuthKeyRecord, RepoError>;
}
