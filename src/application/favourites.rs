use std::sync::Arc;

use tracing::info;

use crate::application::auth::AuthPrincipal;
use crate::application::error::AppError;
use crate::application::pagination::PageWindow;
use crate::application::repos::{
    CreateFavouriteParams, FavouritesRepo, LocationsRepo, UpdateFavouriteParams, UsersRepo,
};
use crate::cache::{CollectionCache, CollectionKind, Owner};
use crate::domain::entities::{FavouriteRecord, UserRecord};
use crate::domain::error::non_blank;

#[derive(Debug, Clone)]
pub struct FavouriteCommand {
    pub title: String,
    pub description: Option<String>,
    pub location_id: i64,
}

impl FavouriteCommand {
    fn title(&self) -> Result<String, AppError> {
        Ok(non_blank("title", &self.title)?.to_string())
    }
}

#[derive(Clone)]
pub struct FavouriteService {
    favourites: Arc<dyn FavouritesRepo>,
    users: Arc<dyn UsersRepo>,
    locations: Arc<dyn LocationsRepo>,
    cache: CollectionCache,
}

impl FavouriteService {
    pub fn new(
        favourites: Arc<dyn FavouritesRepo>,
        users: Arc<dyn UsersRepo>,
        locations: Arc<dyn LocationsRepo>,
        cache: CollectionCache,
    ) -> Self {
        Self {
            favourites,
            users,
            locations,
            cache,
        }
    }

    pub async fn owner(&self, name: &str) -> Result<UserRecord, AppError> {
        self.users
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found("user"))
    }

    pub async fn list(
        &self,
        owner: &UserRecord,
        window: PageWindow,
    ) -> Result<Vec<FavouriteRecord>, AppError> {
        Ok(self
            .favourites
            .list_for_user(owner.id, window.offset(), window.limit())
            .await?)
    }

    /// A favourite addressed under a user who does not own it does not exist.
    pub async fn find(
        &self,
        owner_name: &str,
        id: i64,
    ) -> Result<(UserRecord, FavouriteRecord), AppError> {
        let owner = self.owner(owner_name).await?;
        let favourite = self
            .favourites
            .find_by_id(id)
            .await?
            .filter(|favourite| favourite.user_id == owner.id)
            .ok_or_else(|| AppError::not_found("favourite"))?;
        Ok((owner, favourite))
    }

    pub async fn create(
        &self,
        principal: &AuthPrincipal,
        owner_name: &str,
        command: FavouriteCommand,
    ) -> Result<(UserRecord, FavouriteRecord), AppError> {
        let owner = self.owner(owner_name).await?;
        principal.require_self_or_admin(owner.id)?;
        let title = command.title()?;
        self.ensure_location(command.location_id).await?;

        let favourite = self
            .favourites
            .create_favourite(CreateFavouriteParams {
                title,
                description: command.description,
                user_id: owner.id,
                location_id: command.location_id,
            })
            .await?;

        self.cache
            .invalidate(CollectionKind::Favourites, Owner::User(owner.id));
        info!(
            target = "bikinghub::favourites",
            favourite_id = favourite.id,
            user_id = owner.id,
            "favourite created"
        );
        Ok((owner, favourite))
    }

    pub async fn update(
        &self,
        principal: &AuthPrincipal,
        owner_name: &str,
        id: i64,
        command: FavouriteCommand,
    ) -> Result<FavouriteRecord, AppError> {
        let (owner, _) = self.find(owner_name, id).await?;
        principal.require_self_or_admin(owner.id)?;
        let title = command.title()?;
        self.ensure_location(command.location_id).await?;

        let favourite = self
            .favourites
            .update_favourite(UpdateFavouriteParams {
                id,
                title,
                description: command.description,
                location_id: command.location_id,
            })
            .await?;

        self.cache
            .invalidate(CollectionKind::Favourites, Owner::User(owner.id));
        info!(
            target = "bikinghub::favourites",
            favourite_id = id,
            user_id = owner.id,
            "favourite updated"
        );
        Ok(favourite)
    }

    pub async fn delete(
        &self,
        principal: &AuthPrincipal,
        owner_name: &str,
        id: i64,
    ) -> Result<(), AppError> {
        let (owner, _) = self.find(owner_name, id).await?;
        principal.require_self_or_admin(owner.id)?;

        if !self.favourites.delete_favourite(id).await? {
            return Err(AppError::not_found("favourite"));
        }

        self.cache
            .invalidate(CollectionKind::Favourites, Owner::User(owner.id));
        info!(
            target = "bikinghub::favourites",
            favourite_id = id,
            user_id = owner.id,
            "favourite deleted"
        );
        Ok(())
    }

    async fn ensure_location(&self, id: i64) -> Result<(), AppError> {
        match self.locations.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::invalid_argument(format!(
                "location {id} does not exist"
            ))),
        }
    }
}
