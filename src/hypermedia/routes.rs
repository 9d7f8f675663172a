//! Route templates and href builders.
//!
//! The templates double as axum route paths and as the canonical prefix of
//! collection cache keys, so every href the API emits is built here.

pub const ENTRY_POINT: &str = "/api/";
pub const USERS: &str = "/api/users/";
pub const USER: &str = "/api/user/{user}/";
pub const LOCATIONS: &str = "/api/locations/";
pub const LOCATION: &str = "/api/location/{location}/";
pub const LOCATION_WEATHER: &str = "/api/location/{location}/weather/";
pub const FAVOURITES: &str = "/api/user/{user}/favourites/";
pub const FAVOURITE: &str = "/api/user/{user}/favourite/{favourite}/";
pub const WEATHER: &str = "/api/weather/";
pub const LINK_RELATIONS: &str = "/bikinghub/link-relations/";
pub const PROFILE: &str = "/bikinghub/profiles/{profile}/";

pub fn entry_point() -> String {
    ENTRY_POINT.to_string()
}

pub fn users() -> String {
    USERS.to_string()
}

pub fn user(name: &str) -> String {
    format!("/api/user/{name}/")
}

pub fn locations() -> String {
    LOCATIONS.to_string()
}

pub fn location(id: i64) -> String {
    format!("/api/location/{id}/")
}

pub fn location_weather(id: i64) -> String {
    format!("/api/location/{id}/weather/")
}

pub fn favourites(user: &str) -> String {
    format!("/api/user/{user}/favourites/")
}

pub fn favourite(user: &str, id: i64) -> String {
    format!("/api/user/{user}/favourite/{id}/")
}

pub fn weather() -> String {
    WEATHER.to_string()
}

/// Collection href for a page; page zero is the bare collection URL.
pub fn paged(href: &str, page: u32) -> String {
    if page == 0 {
        href.to_string()
    } else {
        format!("{href}?page={page}")
    }
}
