use std::sync::Arc;

use crate::application::auth::{AuthGuard, KeyHasher, PasswordHasher};
use crate::application::favourites::FavouriteService;
use crate::application::locations::LocationService;
use crate::application::repos::{
    AuthKeysRepo, FavouritesRepo, LocationsRepo, UsersRepo, WeatherRepo,
};
use crate::application::users::UserService;
use crate::application::weather::{WeatherProvider, WeatherService};
use crate::cache::CollectionCache;

/// Persistence and integration seams the API is assembled from.
#[derive(Clone)]
pub struct ApiDependencies {
    pub users: Arc<dyn UsersRepo>,
    pub locations: Arc<dyn LocationsRepo>,
    pub favourites: Arc<dyn FavouritesRepo>,
    pub weather: Arc<dyn WeatherRepo>,
    pub auth_keys: Arc<dyn AuthKeysRepo>,
    pub weather_provider: Arc<dyn WeatherProvider>,
    pub key_hasher: Arc<dyn KeyHasher>,
    pub password_hasher: Arc<dyn PasswordHasher>,
}

#[derive(Clone)]
pub struct ApiState {
    pub users: Arc<UserService>,
    pub locations: Arc<LocationService>,
    pub favourites: Arc<FavouriteService>,
    pub weather: Arc<WeatherService>,
    pub guard: AuthGuard,
    pub cache: CollectionCache,
}

impl ApiState {
    pub fn new(deps: ApiDependencies, cache: CollectionCache, dedup_radius_km: f64) -> Self {
        let users = UserService::new(deps.users.clone(), deps.password_hasher, cache.clone());
        let locations = LocationService::new(
            deps.locations.clone(),
            deps.favourites.clone(),
            cache.clone(),
            dedup_radius_km,
        );
        let favourites = FavouriteService::new(
            deps.favourites,
            deps.users,
            deps.locations.clone(),
            cache.clone(),
        );
        let weather = WeatherService::new(
            deps.weather,
            deps.locations,
            deps.weather_provider,
            cache.clone(),
        );

        Self {
            users: Arc::new(users),
            locations: Arc::new(locations),
            favourites: Arc::new(favourites),
            weather: Arc::new(weather),
            guard: AuthGuard::new(deps.auth_keys, deps.key_hasher),
            cache,
        }
    }
}
