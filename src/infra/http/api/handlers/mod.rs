//! API handlers organized by resource type.
//!
//! Response helpers shared by every resource live here.

mod entry;
mod favourites;
mod locations;
mod users;
mod weather;

pub use entry::*;
pub use favourites::*;
pub use locations::*;
pub use users::*;
pub use weather::*;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::application::error::AppError;
use crate::application::pagination::parse_page;
use crate::hypermedia::{MASON_CONTENT_TYPE, MasonDocument};

use super::models::PageQuery;

fn mason(body: Bytes) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, MASON_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

fn document(document: MasonDocument) -> Result<Response, AppError> {
    Ok(mason(document.to_bytes()?))
}

fn created(location: String) -> Response {
    (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
}

fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

fn requested_page(query: &PageQuery) -> Result<u32, AppError> {
    Ok(parse_page(query.page.as_deref())?)
}

/// Integer path segments that do not parse address nothing.
fn path_id(raw: &str, entity: &'static str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::not_found(entity))
}
