//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::geo::Coordinates;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRecord {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates for LocationRecord {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavouriteRecord {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub user_id: i64,
    pub location_id: i64,
}

/// One forecast row for a location; every measurement is optional because the
/// upstream feed omits values it cannot predict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRecord {
    pub id: i64,
    pub location_id: i64,
    pub rain: Option<f64>,
    pub humidity: Option<i32>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<i32>,
    pub temperature: Option<f64>,
    pub temperature_feel: Option<i32>,
    pub cloud_cover: Option<String>,
    pub weather_description: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub weather_time: Option<OffsetDateTime>,
}

/// A stored API key. Only the SHA-256 digest of the presented key is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthKeyRecord {
    pub id: i64,
    pub key_hash: Vec<u8>,
    pub user_id: i64,
    pub admin: bool,
}
