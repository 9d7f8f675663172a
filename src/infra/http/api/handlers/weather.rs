use axum::extract::{Query, State};
use axum::response::Response;

use crate::application::error::AppError;
use crate::cache::{CollectionKind, CollectionScope};
use crate::hypermedia::representations;
use crate::infra::http::api::models::PageQuery;
use crate::infra::http::api::state::ApiState;

use super::{mason, requested_page};

pub async fn list_weather(
    State(state): State<ApiState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let page = requested_page(&query)?;
    let weather = state.weather.clone();

    let cached = state
        .cache
        .respond(
            CollectionScope::ownerless(CollectionKind::Weather),
            page,
            |window| async move {
                let records = weather.list(window).await?;
                Ok::<_, AppError>(representations::weather_collection(&records, window)?)
            },
        )
        .await?;

    Ok(mason(cached.body))
}
