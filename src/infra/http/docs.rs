//! Plain-text documentation served at the link-relation and profile URLs
//! referenced from every Mason document.

use axum::extract::Path;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::application::error::AppError;

const LINK_RELATIONS: &str = "\
bikinghub link relations

users-all          list of users (admin)
user-add           create a user (admin)
user-edit          replace a user's name and password
user-delete        delete a user and everything they own
locations-all      list of locations
location-add       create a location
location-edit      replace a location (admin)
location-delete    delete a location (admin)
location-view      the location a favourite or forecast refers to
weather-all        list of stored forecasts
weather-current    current forecast for a location
favourites-all     a user's favourites
favourite-add      add a favourite for a user
favourite-edit     replace a favourite
favourite-delete   delete a favourite
";

fn profile_text(profile: &str) -> Option<&'static str> {
    let text = match profile {
        "user" => {
            "user: {id, name}. Names are 1-64 characters of letters, digits, '_', '-' and '.'."
        }
        "location" => {
            "location: {id, name, latitude, longitude}. Latitude lies in [-90, 90], longitude in [-180, 180]."
        }
        "favourite" => {
            "favourite: {id, title, description, user_id, location_id}. Owned by the user named in its URL."
        }
        "weather" => {
            "weather: {id, location_id, rain, humidity, wind_speed, wind_direction, temperature, \
             temperature_feel, cloud_cover, weather_description, weather_time}."
        }
        "error" => "error: @error carries @message and a list of @messages with details.",
        _ => return None,
    };
    Some(text)
}

pub(super) async fn link_relations() -> Response {
    text(LINK_RELATIONS)
}

pub(super) async fn profile(Path(profile): Path<String>) -> Response {
    match profile_text(&profile) {
        Some(body) => text(body),
        None => AppError::not_found("profile").into_response(),
    }
}

fn text(body: &'static str) -> Response {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}
