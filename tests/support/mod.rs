#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header};
use http_body_util::BodyExt;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower::ServiceExt;

use bikinghub::application::auth::{
    API_KEY_HEADER, AuthError, AuthGuard, PasswordHasher, Sha256KeyHasher,
};
use bikinghub::application::repos::{
    AuthKeysRepo, CreateAuthKeyParams, CreateFavouriteParams, CreateWeatherParams,
    FavouritesRepo, LocationParams, LocationsRepo, RepoError, UpdateFavouriteParams,
    UserParams, UsersRepo, WeatherRepo,
};
use bikinghub::application::weather::{Forecast, WeatherError, WeatherProvider};
use bikinghub::cache::{CacheConfig, CollectionCache, MemoryCacheStore};
use bikinghub::domain::entities::{
    AuthKeyRecord, FavouriteRecord, LocationRecord, UserRecord, WeatherRecord,
};
use bikinghub::domain::geo::BoundingBox;
use bikinghub::infra::http::{self, ApiState, api::ApiDependencies};

/// In-memory stand-in for every repository, counting the collection queries
/// the cache is supposed to absorb.
#[derive(Default)]
pub struct MemoryRepos {
    next_id: AtomicI64,
    users: Mutex<Vec<UserRecord>>,
    locations: Mutex<Vec<LocationRecord>>,
    favourites: Mutex<Vec<FavouriteRecord>>,
    weather: Mutex<Vec<WeatherRecord>>,
    keys: Mutex<Vec<AuthKeyRecord>>,
    pub user_list_calls: AtomicUsize,
    pub favourite_list_calls: AtomicUsize,
    pub weather_list_calls: AtomicUsize,
}

impl MemoryRepos {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn favourite_list_calls(&self) -> usize {
        self.favourite_list_calls.load(Ordering::SeqCst)
    }

    pub fn user_list_calls(&self) -> usize {
        self.user_list_calls.load(Ordering::SeqCst)
    }

    pub fn weather_list_calls(&self) -> usize {
        self.weather_list_calls.load(Ordering::SeqCst)
    }

    pub async fn favourite_count(&self) -> usize {
        self.favourites.lock().await.len()
    }
}

fn page<T: Clone>(items: &[T], offset: i64, limit: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    items.iter().skip(offset).take(limit).cloned().collect()
}

#[async_trait]
impl UsersRepo for MemoryRepos {
    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<UserRecord>, RepoError> {
        self.user_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(page(&self.users.lock().await, offset, limit))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.users.lock().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|u| u.name == name)
            .cloned())
    }

    async fn create_user(&self, params: UserParams) -> Result<UserRecord, RepoError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.name == params.name) {
            return Err(RepoError::Duplicate {
                constraint: "users_name_key".to_string(),
            });
        }
        let user = UserRecord {
            id: self.next_id(),
            name: params.name,
            password_hash: params.password_hash,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i64, params: UserParams) -> Result<UserRecord, RepoError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.name == params.name && u.id != id) {
            return Err(RepoError::Duplicate {
                constraint: "users_name_key".to_string(),
            });
        }
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepoError::NotFound)?;
        user.name = params.name;
        user.password_hash = params.password_hash;
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, RepoError> {
        let mut users = self.users.lock().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        let removed = users.len() != before;
        drop(users);
        if removed {
            self.favourites.lock().await.retain(|f| f.user_id != id);
            self.keys.lock().await.retain(|k| k.user_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl LocationsRepo for MemoryRepos {
    async fn list_locations(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<LocationRecord>, RepoError> {
        Ok(page(&self.locations.lock().await, offset, limit))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LocationRecord>, RepoError> {
        Ok(self
            .locations
            .lock()
            .await
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn find_in_box(&self, bounds: BoundingBox) -> Result<Vec<LocationRecord>, RepoError> {
        Ok(self
            .locations
            .lock()
            .await
            .iter()
            .filter(|l| {
                (bounds.min_latitude..=bounds.max_latitude).contains(&l.latitude)
                    && (bounds.min_longitude..=bounds.max_longitude).contains(&l.longitude)
            })
            .cloned()
            .collect())
    }

    async fn create_location(&self, params: LocationParams) -> Result<LocationRecord, RepoError> {
        let location = LocationRecord {
            id: self.next_id(),
            name: params.name,
            latitude: params.latitude,
            longitude: params.longitude,
        };
        self.locations.lock().await.push(location.clone());
        Ok(location)
    }

    async fn update_location(
        &self,
        id: i64,
        params: LocationParams,
    ) -> Result<LocationRecord, RepoError> {
        let mut locations = self.locations.lock().await;
        let location = locations
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(RepoError::NotFound)?;
        location.name = params.name;
        location.latitude = params.latitude;
        location.longitude = params.longitude;
        Ok(location.clone())
    }

    async fn delete_location(&self, id: i64) -> Result<bool, RepoError> {
        let mut locations = self.locations.lock().await;
        let before = locations.len();
        locations.retain(|l| l.id != id);
        let removed = locations.len() != before;
        drop(locations);
        if removed {
            self.favourites.lock().await.retain(|f| f.location_id != id);
            self.weather.lock().await.retain(|w| w.location_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl FavouritesRepo for MemoryRepos {
    async fn list_for_user(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FavouriteRecord>, RepoError> {
        self.favourite_list_calls.fetch_add(1, Ordering::SeqCst);
        let owned: Vec<FavouriteRecord> = self
            .favourites
            .lock()
            .await
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        Ok(page(&owned, offset, limit))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<FavouriteRecord>, RepoError> {
        Ok(self
            .favourites
            .lock()
            .await
            .iter()
            .find(|f| f.id == id)
            .cloned())
    }

    async fn create_favourite(
        &self,
        params: CreateFavouriteParams,
    ) -> Result<FavouriteRecord, RepoError> {
        let favourite = FavouriteRecord {
            id: self.next_id(),
            title: params.title,
            description: params.description,
            user_id: params.user_id,
            location_id: params.location_id,
        };
        self.favourites.lock().await.push(favourite.clone());
        Ok(favourite)
    }

    async fn update_favourite(
        &self,
        params: UpdateFavouriteParams,
    ) -> Result<FavouriteRecord, RepoError> {
        let mut favourites = self.favourites.lock().await;
        let favourite = favourites
            .iter_mut()
            .find(|f| f.id == params.id)
            .ok_or(RepoError::NotFound)?;
        favourite.title = params.title;
        favourite.description = params.description;
        favourite.location_id = params.location_id;
        Ok(favourite.clone())
    }

    async fn delete_favourite(&self, id: i64) -> Result<bool, RepoError> {
        let mut favourites = self.favourites.lock().await;
        let before = favourites.len();
        favourites.retain(|f| f.id != id);
        Ok(favourites.len() != before)
    }

    async fn owners_of_location(&self, location_id: i64) -> Result<Vec<i64>, RepoError> {
        let mut owners: Vec<i64> = self
            .favourites
            .lock()
            .await
            .iter()
            .filter(|f| f.location_id == location_id)
            .map(|f| f.user_id)
            .collect();
        owners.sort_unstable();
        owners.dedup();
        Ok(owners)
    }
}

#[async_trait]
impl WeatherRepo for MemoryRepos {
    async fn list_weather(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<WeatherRecord>, RepoError> {
        self.weather_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(page(&self.weather.lock().await, offset, limit))
    }

    async fn next_forecast(
        &self,
        location_id: i64,
        not_before: OffsetDateTime,
    ) -> Result<Option<WeatherRecord>, RepoError> {
        Ok(self
            .weather
            .lock()
            .await
            .iter()
            .filter(|w| w.location_id == location_id)
            .filter(|w| w.weather_time.is_some_and(|time| time >= not_before))
            .min_by_key(|w| (w.weather_time, w.id))
            .cloned())
    }

    async fn create_forecasts(
        &self,
        params: Vec<CreateWeatherParams>,
    ) -> Result<Vec<WeatherRecord>, RepoError> {
        let mut weather = self.weather.lock().await;
        let mut stored = Vec::with_capacity(params.len());
        for p in params {
            let record = WeatherRecord {
                id: self.next_id(),
                location_id: p.location_id,
                rain: p.rain,
                humidity: p.humidity,
                wind_speed: p.wind_speed,
                wind_direction: p.wind_direction,
                temperature: p.temperature,
                temperature_feel: p.temperature_feel,
                cloud_cover: p.cloud_cover,
                weather_description: p.weather_description,
                weather_time: p.weather_time,
            };
            weather.push(record.clone());
            stored.push(record);
        }
        Ok(stored)
    }
}

#[async_trait]
impl AuthKeysRepo for MemoryRepos {
    async fn find_by_hash(&self, key_hash: &[u8]) -> Result<Option<AuthKeyRecord>, RepoError> {
        Ok(self
            .keys
            .lock()
            .await
            .iter()
            .find(|k| k.key_hash == key_hash)
            .cloned())
    }

    async fn find_admin_by_hash(
        &self,
        key_hash: &[u8],
    ) -> Result<Option<AuthKeyRecord>, RepoError> {
        Ok(self
            .keys
            .lock()
            .await
            .iter()
            .find(|k| k.key_hash == key_hash && k.admin)
            .cloned())
    }

    async fn create_key(&self, params: CreateAuthKeyParams) -> Result<AuthKeyRecord, RepoError> {
        let key = AuthKeyRecord {
            id: self.next_id(),
            key_hash: params.key_hash,
            user_id: params.user_id,
            admin: params.admin,
        };
        self.keys.lock().await.push(key.clone());
        Ok(key)
    }
}

/// Stores passwords with a marker prefix; Argon2 is exercised in unit tests.
pub struct PlainPasswords;

impl PasswordHasher for PlainPasswords {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain${password}"))
    }

    fn verify_password(&self, password: &str, stored: &str) -> bool {
        stored.strip_prefix("plain$") == Some(password)
    }
}

/// Returns a fixed two-step forecast and counts upstream calls.
#[derive(Default)]
pub struct StubWeather {
    pub calls: AtomicUsize,
}

impl StubWeather {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn forecast(&self, _latitude: f64, _longitude: f64) -> Result<Vec<Forecast>, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = OffsetDateTime::now_utc();
        Ok(vec![
            Forecast {
                rain: Some(0.0),
                temperature: Some(12.5),
                description: Some("Selkeää".to_string()),
                time: Some(now + time::Duration::hours(1)),
                ..Default::default()
            },
            Forecast {
                rain: Some(0.3),
                temperature: Some(11.0),
                description: Some("Heikkoja sadekuuroja".to_string()),
                time: Some(now + time::Duration::hours(2)),
                ..Default::default()
            },
        ])
    }
}

pub struct TestApp {
    pub router: Router,
    pub repos: Arc<MemoryRepos>,
    pub weather: Arc<StubWeather>,
    guard: AuthGuard,
}

impl TestApp {
    pub fn new(page_size: u32) -> Self {
        let repos = Arc::new(MemoryRepos::default());
        let weather = Arc::new(StubWeather::default());
        let config = CacheConfig {
            page_size,
            invalidation_page_scan: 10,
            ..Default::default()
        };
        let cache = CollectionCache::new(Arc::new(MemoryCacheStore::new(&config)), config);

        let deps = ApiDependencies {
            users: repos.clone(),
            locations: repos.clone(),
            favourites: repos.clone(),
            weather: repos.clone(),
            auth_keys: repos.clone(),
            weather_provider: weather.clone(),
            key_hasher: Arc::new(Sha256KeyHasher),
            password_hasher: Arc::new(PlainPasswords),
        };
        let state = ApiState::new(deps, cache, 0.05);
        let guard = state.guard.clone();

        Self {
            router: http::build_router(state),
            repos,
            weather,
            guard,
        }
    }

    /// Insert a user directly and issue a key for them.
    pub async fn user_with_key(&self, name: &str, admin: bool) -> (UserRecord, String) {
        let user = self
            .repos
            .create_user(UserParams {
                name: name.to_string(),
                password_hash: format!("plain${name}"),
            })
            .await
            .expect("user");
        let issued = self.guard.issue_key(user.id, admin).await.expect("key");
        (user, issued.key)
    }

    pub async fn location(&self, name: &str, latitude: f64, longitude: f64) -> LocationRecord {
        self.repos
            .create_location(LocationParams {
                name: name.to_string(),
                latitude,
                longitude,
            })
            .await
            .expect("location")
    }

    pub async fn favourite(&self, user: &UserRecord, location: &LocationRecord, title: &str) {
        self.repos
            .create_favourite(CreateFavouriteParams {
                title: title.to_string(),
                description: None,
                user_id: user.id,
                location_id: location.id,
            })
            .await
            .expect("favourite");
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        key: Option<&str>,
        json: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        let body = match json {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("request should build");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Method::GET, uri, None, None).await
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be json")
}
