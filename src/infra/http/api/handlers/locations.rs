//! Locations handlers, including the per-location current forecast.

use axum::extract::{Path, Query, State};
use axum::response::Response;

use crate::application::error::AppError;
use crate::cache::{CollectionKind, CollectionScope};
use crate::hypermedia::{representations, routes};
use crate::infra::http::api::models::{JsonBody, LocationRequest, PageQuery};
use crate::infra::http::api::state::ApiState;

use super::{created, document, mason, no_content, path_id, requested_page};

pub async fn list_locations(
    State(state): State<ApiState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let page = requested_page(&query)?;
    let locations = state.locations.clone();

    let cached = state
        .cache
        .respond(
            CollectionScope::ownerless(CollectionKind::Locations),
            page,
            |window| async move {
                let records = locations.list(window).await?;
                Ok::<_, AppError>(representations::locations_collection(&records, window)?)
            },
        )
        .await?;

    Ok(mason(cached.body))
}

pub async fn create_location(
    State(state): State<ApiState>,
    JsonBody(payload): JsonBody<LocationRequest>,
) -> Result<Response, AppError> {
    let location = state.locations.create(payload.into()).await?;
    Ok(created(routes::location(location.id)))
}

pub async fn get_location(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let location = state.locations.find(path_id(&id, "location")?).await?;
    document(representations::location(&location)?)
}

pub async fn update_location(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<LocationRequest>,
) -> Result<Response, AppError> {
    state
        .locations
        .update(path_id(&id, "location")?, payload.into())
        .await?;
    Ok(no_content())
}

pub async fn delete_location(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.locations.delete(path_id(&id, "location")?).await?;
    Ok(no_content())
}

pub async fn current_weather(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let forecast = state.weather.current(path_id(&id, "location")?).await?;
    document(representations::weather(&forecast)?)
}
