//! Users handlers

use axum::extract::{Extension, Path, Query, State};
use axum::response::Response;

use crate::application::auth::AuthPrincipal;
use crate::application::error::AppError;
use crate::cache::{CollectionKind, CollectionScope};
use crate::hypermedia::{representations, routes};
use crate::infra::http::api::models::{JsonBody, PageQuery, UserRequest};
use crate::infra::http::api::state::ApiState;

use super::{created, document, mason, no_content, requested_page};

pub async fn list_users(
    State(state): State<ApiState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let page = requested_page(&query)?;
    let users = state.users.clone();

    let cached = state
        .cache
        .respond(
            CollectionScope::ownerless(CollectionKind::Users),
            page,
            |window| async move {
                let records = users.list(window).await?;
                Ok::<_, AppError>(representations::users_collection(&records, window)?)
            },
        )
        .await?;

    Ok(mason(cached.body))
}

pub async fn create_user(
    State(state): State<ApiState>,
    JsonBody(payload): JsonBody<UserRequest>,
) -> Result<Response, AppError> {
    let user = state.users.create(payload.into()).await?;
    Ok(created(routes::user(&user.name)))
}

pub async fn get_user(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let user = state.users.find(&name).await?;
    document(representations::user(&user)?)
}

pub async fn update_user(
    State(state): State<ApiState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(name): Path<String>,
    JsonBody(payload): JsonBody<UserRequest>,
) -> Result<Response, AppError> {
    state.users.update(&principal, &name, payload.into()).await?;
    Ok(no_content())
}

pub async fn delete_user(
    State(state): State<ApiState>,
    Extension(principal): Extension<AuthPrincipal>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    state.users.delete(&principal, &name).await?;
    Ok(no_content())
}
