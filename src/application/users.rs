use std::sync::Arc;

use tracing::info;

use crate::application::auth::{AuthPrincipal, PasswordHasher};
use crate::application::error::AppError;
use crate::application::pagination::PageWindow;
use crate::application::repos::{RepoError, UserParams, UsersRepo};
use crate::cache::{CollectionCache, CollectionKind, Owner};
use crate::domain::entities::UserRecord;
use crate::domain::error::DomainError;
use crate::domain::names::validate_user_name;

#[derive(Debug, Clone)]
pub struct UserCommand {
    pub name: String,
    pub password: String,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UsersRepo>,
    passwords: Arc<dyn PasswordHasher>,
    cache: CollectionCache,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        passwords: Arc<dyn PasswordHasher>,
        cache: CollectionCache,
    ) -> Self {
        Self {
            users,
            passwords,
            cache,
        }
    }

    pub async fn list(&self, window: PageWindow) -> Result<Vec<UserRecord>, AppError> {
        Ok(self
            .users
            .list_users(window.offset(), window.limit())
            .await?)
    }

    pub async fn find(&self, name: &str) -> Result<UserRecord, AppError> {
        self.users
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found("user"))
    }

    pub async fn create(&self, command: UserCommand) -> Result<UserRecord, AppError> {
        let params = self.params(command)?;
        let user = self
            .users
            .create_user(params)
            .await
            .map_err(duplicate_name)?;

        self.cache.invalidate(CollectionKind::Users, Owner::All);
        info!(target = "bikinghub::users", user_id = user.id, "user created");
        Ok(user)
    }

    pub async fn update(
        &self,
        principal: &AuthPrincipal,
        name: &str,
        command: UserCommand,
    ) -> Result<UserRecord, AppError> {
        let current = self.find(name).await?;
        principal.require_self_or_admin(current.id)?;

        let params = self.params(command)?;
        let user = self
            .users
            .update_user(current.id, params)
            .await
            .map_err(duplicate_name)?;

        self.invalidate_user(user.id);
        info!(target = "bikinghub::users", user_id = user.id, "user updated");
        Ok(user)
    }

    pub async fn delete(&self, principal: &AuthPrincipal, name: &str) -> Result<(), AppError> {
        let user = self.find(name).await?;
        principal.require_self_or_admin(user.id)?;

        if !self.users.delete_user(user.id).await? {
            return Err(AppError::not_found("user"));
        }

        self.invalidate_user(user.id);
        info!(target = "bikinghub::users", user_id = user.id, "user deleted");
        Ok(())
    }

    fn params(&self, command: UserCommand) -> Result<UserParams, AppError> {
        let name = validate_user_name(&command.name)
            .map_err(DomainError::from)?
            .to_string();
        if command.password.is_empty() {
            return Err(DomainError::blank("password").into());
        }
        let password_hash = self.passwords.hash_password(&command.password)?;
        Ok(UserParams {
            name,
            password_hash,
        })
    }

    /// Favourite hrefs embed the user name, so a user's favourites go too.
    fn invalidate_user(&self, user_id: i64) {
        self.cache.invalidate(CollectionKind::Users, Owner::All);
        self.cache
            .invalidate(CollectionKind::Favourites, Owner::User(user_id));
    }
}

fn duplicate_name(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate { .. } => AppError::conflict("user name already taken"),
        other => other.into(),
    }
}
