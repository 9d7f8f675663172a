pub mod guard;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::{ApiDependencies, ApiState};

use axum::{
    Router,
    handler::Handler,
    middleware::from_fn_with_state,
    routing::get,
};

use crate::hypermedia::routes;

use self::guard::{require_admin, require_user};

/// Resource routes. Guards wrap single method handlers so that reads stay
/// open where the resource allows it.
pub fn build_api_router(state: ApiState) -> Router {
    let user = from_fn_with_state(state.guard.clone(), require_user);
    let admin = from_fn_with_state(state.guard.clone(), require_admin);

    Router::new()
        .route(routes::ENTRY_POINT, get(handlers::entry_point))
        .route(
            routes::USERS,
            get(handlers::list_users.layer(admin.clone()))
                .post(handlers::create_user.layer(admin.clone())),
        )
        .route(
            routes::USER,
            get(handlers::get_user)
                .put(handlers::update_user.layer(user.clone()))
                .delete(handlers::delete_user.layer(user.clone())),
        )
        .route(
            routes::LOCATIONS,
            get(handlers::list_locations).post(handlers::create_location.layer(user.clone())),
        )
        .route(
            routes::LOCATION,
            get(handlers::get_location)
                .put(handlers::update_location.layer(admin.clone()))
                .delete(handlers::delete_location.layer(admin)),
        )
        .route(routes::LOCATION_WEATHER, get(handlers::current_weather))
        .route(
            routes::FAVOURITES,
            get(handlers::list_favourites).post(handlers::create_favourite.layer(user.clone())),
        )
        .route(
            routes::FAVOURITE,
            get(handlers::get_favourite)
                .put(handlers::update_favourite.layer(user.clone()))
                .delete(handlers::delete_favourite.layer(user)),
        )
        .route(routes::WEATHER, get(handlers::list_weather))
        .with_state(state)
}
