//! Forecast provider backed by the MML geocoding services and the FMI
//! forecast feed.
//!
//! Coordinates are first resolved to a municipality (reverse geocoding) and a
//! district (nearest place name); FMI is then queried by those names.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::debug;

use crate::application::weather::{Forecast, WeatherError, WeatherProvider};
use crate::config::WeatherSettings;

use super::error::InfraError;

const REVERSE_GEOCODE_PATH: &str = "geocoding/v2/pelias/reverse";
const PLACE_NAMES_PATH: &str = "geographic-names/features/v1/collections/places/items";
/// Villages and districts in the MML place-type taxonomy.
const DISTRICT_PLACE_TYPES: &str = "3010105,3020105";
/// Half the side of the box searched for a district name, in degrees.
const DISTRICT_SEARCH_DEGREES: f64 = 0.005;

#[derive(Clone)]
pub struct FmiWeatherProvider {
    client: Client,
    mml_base_url: Url,
    fmi_forecast_url: Url,
    mml_api_key: Option<String>,
}

impl FmiWeatherProvider {
    pub fn new(settings: &WeatherSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("bikinghub/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        Ok(Self {
            client,
            mml_base_url: settings.mml_base_url.clone(),
            fmi_forecast_url: settings.fmi_forecast_url.clone(),
            mml_api_key: settings.mml_api_key.clone(),
        })
    }

    fn mml_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, WeatherError> {
        let api_key = self
            .mml_api_key
            .as_deref()
            .ok_or_else(|| WeatherError::Request("mml api key is not configured".to_string()))?;

        let base = self.mml_base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/{path}"))
            .map_err(|err| WeatherError::Request(err.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("api-key", api_key);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, WeatherError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| WeatherError::Request(err.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| WeatherError::Request(err.to_string()))?;
        if !status.is_success() {
            return Err(WeatherError::Request(format!("upstream returned {status}")));
        }

        serde_json::from_slice(&bytes).map_err(|err| WeatherError::Decode(err.to_string()))
    }

    async fn municipality(&self, latitude: f64, longitude: f64) -> Result<String, WeatherError> {
        let url = self.mml_url(
            REVERSE_GEOCODE_PATH,
            &[
                ("lang", "fi".to_string()),
                ("sources", "addresses".to_string()),
                ("point.lon", longitude.to_string()),
                ("point.lat", latitude.to_string()),
            ],
        )?;
        let payload: FeatureCollection<AddressProperties> = self.get_json(url).await?;
        municipality_from(payload)
    }

    async fn district(&self, latitude: f64, longitude: f64) -> Result<String, WeatherError> {
        let bbox = format!(
            "{},{},{},{}",
            longitude - DISTRICT_SEARCH_DEGREES,
            latitude - DISTRICT_SEARCH_DEGREES,
            longitude + DISTRICT_SEARCH_DEGREES,
            latitude + DISTRICT_SEARCH_DEGREES,
        );
        let url = self.mml_url(
            PLACE_NAMES_PATH,
            &[
                ("placeType", DISTRICT_PLACE_TYPES.to_string()),
                ("bbox", bbox),
            ],
        )?;
        let payload: FeatureCollection<PlaceProperties> = self.get_json(url).await?;
        district_from(payload)
    }
}

#[async_trait]
impl WeatherProvider for FmiWeatherProvider {
    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<Forecast>, WeatherError> {
        let municipality = self.municipality(latitude, longitude).await?;
        let district = self.district(latitude, longitude).await?;
        debug!(
            target = "bikinghub::weather",
            %municipality,
            %district,
            "resolved forecast area"
        );

        let mut url = self.fmi_forecast_url.clone();
        url.query_pairs_mut()
            .append_pair("place", &district)
            .append_pair("area", &municipality);

        let payload: FmiForecastResponse = self.get_json(url).await?;
        Ok(forecasts_from(payload))
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection<P> {
    #[serde(default = "Vec::new")]
    features: Vec<Feature<P>>,
}

#[derive(Debug, Deserialize)]
struct Feature<P> {
    properties: P,
}

#[derive(Debug, Deserialize)]
struct AddressProperties {
    #[serde(rename = "kuntanimiFin")]
    municipality: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceProperties {
    #[serde(default)]
    name: Vec<PlaceName>,
}

#[derive(Debug, Deserialize)]
struct PlaceName {
    spelling: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmiForecastResponse {
    #[serde(default)]
    forecast_values: Vec<FmiForecastValue>,
    #[serde(default)]
    symbol_descriptions: Vec<FmiSymbol>,
}

#[derive(Debug, Deserialize)]
struct FmiForecastValue {
    #[serde(rename = "Precipitation1h")]
    precipitation: Option<f64>,
    #[serde(rename = "Humidity")]
    humidity: Option<f64>,
    #[serde(rename = "WindSpeedMS")]
    wind_speed: Option<f64>,
    #[serde(rename = "WindDirection")]
    wind_direction: Option<f64>,
    #[serde(rename = "Temperature")]
    temperature: Option<f64>,
    #[serde(rename = "FeelsLike")]
    feels_like: Option<f64>,
    #[serde(rename = "TotalCloudCover")]
    cloud_cover: Option<f64>,
    #[serde(rename = "SmartSymbol")]
    smart_symbol: Option<f64>,
    utctime: Option<String>,
    isolocaltime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FmiSymbol {
    id: i64,
    text_fi: Option<String>,
}

fn municipality_from(
    payload: FeatureCollection<AddressProperties>,
) -> Result<String, WeatherError> {
    payload
        .features
        .into_iter()
        .next()
        .and_then(|feature| feature.properties.municipality)
        .map(|name| name.to_lowercase())
        .ok_or(WeatherError::NoMatch("municipality"))
}

fn district_from(payload: FeatureCollection<PlaceProperties>) -> Result<String, WeatherError> {
    payload
        .features
        .into_iter()
        .next()
        .and_then(|feature| feature.properties.name.into_iter().next())
        .map(|name| name.spelling.to_lowercase())
        .ok_or(WeatherError::NoMatch("district"))
}

fn forecasts_from(payload: FmiForecastResponse) -> Vec<Forecast> {
    let symbols = payload.symbol_descriptions;
    payload
        .forecast_values
        .into_iter()
        .map(|value| {
            let description = value.smart_symbol.and_then(|symbol| {
                symbols
                    .iter()
                    .find(|candidate| candidate.id as f64 == symbol)
                    .and_then(|candidate| candidate.text_fi.clone())
            });
            let time = value
                .utctime
                .as_deref()
                .and_then(parse_utc_time)
                .or_else(|| value.isolocaltime.as_deref().and_then(parse_local_time));

            Forecast {
                rain: value.precipitation,
                humidity: value.humidity.map(round_i32),
                wind_speed: value.wind_speed,
                wind_direction: value.wind_direction.map(round_i32),
                temperature: value.temperature,
                temperature_feel: value.feels_like.map(round_i32),
                cloud_cover: value.cloud_cover.map(|cover| format!("{}%", round_i32(cover))),
                description,
                time,
            }
        })
        .collect()
}

fn round_i32(value: f64) -> i32 {
    value.round() as i32
}

/// `20240501T120000`, always UTC.
fn parse_utc_time(raw: &str) -> Option<OffsetDateTime> {
    let format = format_description!("[year][month][day]T[hour][minute][second]");
    PrimitiveDateTime::parse(raw, format)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// `2024-05-01T15:00:00` without an offset; read as UTC when nothing better
/// is available.
fn parse_local_time(raw: &str) -> Option<OffsetDateTime> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(raw, format)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn municipality_is_lowercased_from_first_feature() {
        let payload: FeatureCollection<AddressProperties> = serde_json::from_value(json!({
            "features": [
                {"properties": {"kuntanimiFin": "Oulu", "osoite.Osoite.postinumero": "90100"}},
                {"properties": {"kuntanimiFin": "Kempele"}}
            ]
        }))
        .expect("payload");

        assert_eq!(municipality_from(payload).expect("municipality"), "oulu");
    }

    #[test]
    fn empty_geocoding_result_is_no_match() {
        let payload: FeatureCollection<PlaceProperties> =
            serde_json::from_value(json!({"features": []})).expect("payload");

        assert!(matches!(
            district_from(payload),
            Err(WeatherError::NoMatch("district"))
        ));
    }

    #[test]
    fn district_uses_first_spelling() {
        let payload: FeatureCollection<PlaceProperties> = serde_json::from_value(json!({
            "features": [
                {"properties": {"name": [{"spelling": "Tuira"}, {"spelling": "Toppila"}]}}
            ]
        }))
        .expect("payload");

        assert_eq!(district_from(payload).expect("district"), "tuira");
    }

    #[test]
    fn forecast_values_map_to_forecasts() {
        let payload: FmiForecastResponse = serde_json::from_value(json!({
            "forecastValues": [
                {
                    "Precipitation1h": 0.4,
                    "Humidity": 81.6,
                    "WindSpeedMS": 3.2,
                    "WindDirection": 225,
                    "Temperature": 11.3,
                    "FeelsLike": 8.6,
                    "TotalCloudCover": 75,
                    "SmartSymbol": 31,
                    "utctime": "20240501T120000",
                    "isolocaltime": "2024-05-01T15:00:00"
                },
                {
                    "Temperature": 10.0,
                    "SmartSymbol": 99,
                    "isolocaltime": "2024-05-01T16:00:00"
                }
            ],
            "symbolDescriptions": [
                {"id": 31, "text_fi": "Heikkoja sadekuuroja", "text_en": "Light showers"}
            ],
            "dayLengthValues": []
        }))
        .expect("payload");

        let forecasts = forecasts_from(payload);
        assert_eq!(forecasts.len(), 2);

        let first = &forecasts[0];
        assert_eq!(first.rain, Some(0.4));
        assert_eq!(first.humidity, Some(82));
        assert_eq!(first.wind_direction, Some(225));
        assert_eq!(first.temperature_feel, Some(9));
        assert_eq!(first.cloud_cover.as_deref(), Some("75%"));
        assert_eq!(first.description.as_deref(), Some("Heikkoja sadekuuroja"));
        assert_eq!(first.time, Some(datetime!(2024-05-01 12:00:00 UTC)));

        let second = &forecasts[1];
        assert_eq!(second.description, None);
        assert_eq!(second.rain, None);
        assert_eq!(second.time, Some(datetime!(2024-05-01 16:00:00 UTC)));
    }

    #[test]
    fn malformed_times_are_dropped() {
        assert_eq!(parse_utc_time("2024-05-01"), None);
        assert_eq!(parse_local_time("yesterday"), None);
    }
}
