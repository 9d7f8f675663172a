use std::sync::Arc;

use tracing::info;

use crate::application::error::AppError;
use crate::application::pagination::PageWindow;
use crate::application::repos::{FavouritesRepo, LocationParams, LocationsRepo};
use crate::cache::{CollectionCache, CollectionKind, Owner};
use crate::domain::entities::LocationRecord;
use crate::domain::error::{check_coordinates, non_blank};
use crate::domain::geo::{bounding_box, find_within_radius};
use crate::hypermedia::routes;

#[derive(Debug, Clone)]
pub struct LocationCommand {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationCommand {
    fn validate(self) -> Result<LocationParams, AppError> {
        let name = non_blank("location name", &self.name)?;
        check_coordinates(self.latitude, self.longitude)?;
        Ok(LocationParams {
            name: name.to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

#[derive(Clone)]
pub struct LocationService {
    locations: Arc<dyn LocationsRepo>,
    favourites: Arc<dyn FavouritesRepo>,
    cache: CollectionCache,
    dedup_radius_km: f64,
}

impl LocationService {
    pub fn new(
        locations: Arc<dyn LocationsRepo>,
        favourites: Arc<dyn FavouritesRepo>,
        cache: CollectionCache,
        dedup_radius_km: f64,
    ) -> Self {
        Self {
            locations,
            favourites,
            cache,
            dedup_radius_km,
        }
    }

    pub async fn list(&self, window: PageWindow) -> Result<Vec<LocationRecord>, AppError> {
        Ok(self
            .locations
            .list_locations(window.offset(), window.limit())
            .await?)
    }

    pub async fn find(&self, id: i64) -> Result<LocationRecord, AppError> {
        self.locations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("location"))
    }

    /// Create a location unless one already exists within the dedup radius.
    pub async fn create(&self, command: LocationCommand) -> Result<LocationRecord, AppError> {
        let params = command.validate()?;
        if let Some(existing) = self.nearby(params.latitude, params.longitude).await? {
            return Err(AppError::conflict(format!(
                "location already exists at {}",
                routes::location(existing.id)
            )));
        }

        let location = self.locations.create_location(params).await?;
        self.cache.invalidate(CollectionKind::Locations, Owner::All);
        info!(
            target = "bikinghub::locations",
            location_id = location.id,
            "location created"
        );
        Ok(location)
    }

    pub async fn update(
        &self,
        id: i64,
        command: LocationCommand,
    ) -> Result<LocationRecord, AppError> {
        self.find(id).await?;
        let params = command.validate()?;
        let location = self.locations.update_location(id, params).await?;
        self.cache.invalidate(CollectionKind::Locations, Owner::All);
        info!(target = "bikinghub::locations", location_id = id, "location updated");
        Ok(location)
    }

    /// Delete a location along with its favourites and forecasts.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.find(id).await?;
        let owners = self.favourites.owners_of_location(id).await?;
        if !self.locations.delete_location(id).await? {
            return Err(AppError::not_found("location"));
        }

        self.cache.invalidate(CollectionKind::Locations, Owner::All);
        self.cache.invalidate(CollectionKind::Weather, Owner::All);
        for owner in owners {
            self.cache
                .invalidate(CollectionKind::Favourites, Owner::User(owner));
        }
        info!(target = "bikinghub::locations", location_id = id, "location deleted");
        Ok(())
    }

    async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<LocationRecord>, AppError> {
        let bounds = bounding_box(latitude, longitude, self.dedup_radius_km);
        let candidates = self.locations.find_in_box(bounds).await?;
        Ok(find_within_radius(latitude, longitude, self.dedup_radius_km, candidates)
            .into_iter()
            .next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(latitude: f64, longitude: f64) -> LocationCommand {
        LocationCommand {
            name: " Tellus ".to_string(),
            latitude,
            longitude,
        }
    }

    #[test]
    fn validation_trims_name_and_checks_ranges() {
        let params = command(65.06, 25.47).validate().expect("valid");
        assert_eq!(params.name, "Tellus");

        for (lat, lon) in [(90.5, 0.0), (0.0, -180.1), (f64::NAN, 0.0), (0.0, f64::INFINITY)] {
            assert!(
                matches!(
                    command(lat, lon).validate(),
                    Err(AppError::Domain(_))
                ),
                "({lat}, {lon})"
            );
        }

        let blank = LocationCommand {
            name: "  ".to_string(),
            ..command(0.0, 0.0)
        };
        assert!(blank.validate().is_err());
    }
}
