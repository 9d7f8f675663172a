use axum::response::Response;

use crate::application::error::AppError;
use crate::hypermedia::representations;

use super::document;

pub async fn entry_point() -> Result<Response, AppError> {
    document(representations::entry_point())
}
