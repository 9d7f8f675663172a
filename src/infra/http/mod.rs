pub mod api;
mod docs;
mod middleware;

pub use api::{ApiState, build_api_router};

use axum::response::{IntoResponse, Response};
use axum::{Router, middleware as axum_middleware, routing::get};

use crate::application::error::AppError;
use crate::hypermedia::routes;

use self::middleware::{log_responses, set_request_context};

/// Full application router: the resource API, the vocabulary documents and
/// the request-scoped middleware shared by both.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .merge(build_api_router(state))
        .route(routes::LINK_RELATIONS, get(docs::link_relations))
        .route(routes::PROFILE, get(docs::profile))
        .fallback(fallback)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn fallback() -> Response {
    AppError::not_found("resource").into_response()
}
