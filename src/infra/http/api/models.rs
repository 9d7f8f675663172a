use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::Deserialize;

use crate::application::error::AppError;
use crate::application::favourites::FavouriteCommand;
use crate::application::locations::LocationCommand;
use crate::application::users::UserCommand;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub name: String,
    pub password: String,
}

impl From<UserRequest> for UserCommand {
    fn from(request: UserRequest) -> Self {
        Self {
            name: request.name,
            password: request.password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LocationRequest> for LocationCommand {
    fn from(request: LocationRequest) -> Self {
        Self {
            name: request.name,
            latitude: request.latitude,
            longitude: request.longitude,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FavouriteRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location_id: i64,
}

impl From<FavouriteRequest> for FavouriteCommand {
    fn from(request: FavouriteRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            location_id: request.location_id,
        }
    }
}

/// JSON body whose rejections render as Mason errors: a missing or foreign
/// content type is 415, anything else unreadable is 400.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::UnsupportedMediaType("requests must use application/json".to_string())
        }
        other => AppError::invalid_argument(other.body_text()),
    }
}
