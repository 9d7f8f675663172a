//! Mason hypermedia documents and the control vocabulary of the API.

pub mod controls;
pub mod document;
pub mod representations;
pub mod routes;
pub mod schemas;

pub use controls::ControlName;
pub use document::{Control, HypermediaError, MasonDocument, MasonError, Method, Namespace};

pub const MASON_CONTENT_TYPE: &str = "application/vnd.mason+json";

pub const NAMESPACE: &str = "bikinghub";
pub const LINK_RELATIONS_URL: &str = "/bikinghub/link-relations/";

pub const USER_PROFILE: &str = "/bikinghub/profiles/user/";
pub const LOCATION_PROFILE: &str = "/bikinghub/profiles/location/";
pub const FAVOURITE_PROFILE: &str = "/bikinghub/profiles/favourite/";
pub const WEATHER_PROFILE: &str = "/bikinghub/profiles/weather/";
pub const ERROR_PROFILE: &str = "/bikinghub/profiles/error/";
