//! Favourites handlers. Every route is scoped by the owning user's name.

use axum::extract::{Extension, Path, Query, State};
use axum::response::Response;

use crate::application::auth::AuthPrincipal;
use crate::application::error::AppError;
use crate::cache::{CollectionKind, CollectionScope};
use crate::hypermedia::{representations, routes};
use crate::infra::http::api::models::{FavouriteRequest, JsonBody, PageQuery};
use crate::infra::http::api::state::ApiState;

use super::{created, document, mason, no_content, path_id, requested_page};

pub async fn list_favourites(
    State(state): State<ApiState>,
    Path(user): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let page = requested_page(&query)?;
    let owner = state.favourites.owner(&user).await?;
    let scope = CollectionScope::owned_by(CollectionKind::Favourites, owner.id);
    let favourites = state.favourites.clone();

    let cached = state
        .cache
        .respond(scope, page, |window| async move {
            let records = favourites.list(&owner, window).await?;
            Ok::<_, AppError>(representations::favourites_collection(
                &owner, &records, window,
            )?)
        })
        .await?;

    Ok(mason(cached.body))
}

pub async fn create_favourite(
    State(state): State<ApiState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(user): Path<String>,
    JsonBody(payload): JsonBody<FavouriteRequest>,
) -> Result<Response, AppError> {
    let (owner, favourite) = state
        .favourites
        .create(&principal, &user, payload.into())
        .await?;
    Ok(created(routes::favourite(&owner.name, favourite.id)))
}

pub async fn get_favourite(
    State(state): State<ApiState>,
    Path((user, id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let (owner, favourite) = state
        .favourites
        .find(&user, path_id(&id, "favourite")?)
        .await?;
    document(representations::favourite(&owner, &favourite)?)
}

pub async fn update_favourite(
    State(state): State<ApiState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path((user, id)): Path<(String, String)>,
    JsonBody(payload): JsonBody<FavouriteRequest>,
) -> Result<Response, AppError> {
    state
        .favourites
        .update(&principal, &user, path_id(&id, "favourite")?, payload.into())
        .await?;
    Ok(no_content())
}

pub async fn delete_favourite(
    State(state): State<ApiState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path((user, id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    state
        .favourites
        .delete(&principal, &user, path_id(&id, "favourite")?)
        .await?;
    Ok(no_content())
}
