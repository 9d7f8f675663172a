//! Application services: authentication, pagination and the resource
//! services behind the HTTP handlers.

pub mod auth;
pub mod error;
pub mod favourites;
pub mod locations;
pub mod pagination;
pub mod repos;
pub mod users;
pub mod weather;
