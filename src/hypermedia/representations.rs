//! Mason representations of the API resources.

use serde::Serialize;

use crate::application::pagination::PageWindow;
use crate::domain::entities::{FavouriteRecord, LocationRecord, UserRecord, WeatherRecord};

use super::{
    Control, FAVOURITE_PROFILE, HypermediaError, LOCATION_PROFILE, MasonDocument, USER_PROFILE,
    WEATHER_PROFILE, routes,
};

pub fn entry_point() -> MasonDocument {
    let mut document = MasonDocument::new();
    document.add_api_namespace();
    document.add_control_self(routes::entry_point());
    document.add_control_users_all();
    document.add_control_locations_all();
    document.add_control_weather_all();
    document
}

fn collection(href: &str, window: PageWindow, len: usize) -> MasonDocument {
    let mut document = MasonDocument::new();
    document.add_api_namespace();
    document.add_control_self(routes::paged(href, window.page()));
    document.add_page_links(href, window.page(), len == window.size());
    document.ensure_items();
    document
}

fn item<T: Serialize>(record: &T, profile: &str) -> Result<MasonDocument, HypermediaError> {
    let mut item = MasonDocument::from_serializable(record)?;
    item.add_control_profile(profile);
    Ok(item)
}

pub fn users_collection(
    users: &[UserRecord],
    window: PageWindow,
) -> Result<MasonDocument, HypermediaError> {
    let mut document = collection(routes::USERS, window, users.len());
    document.add_control_user_add();
    document.add_control_locations_all();
    for user in users {
        let mut entry = item(user, USER_PROFILE)?;
        entry.add_control_self(routes::user(&user.name));
        document.push_item(entry)?;
    }
    Ok(document)
}

pub fn user(user: &UserRecord) -> Result<MasonDocument, HypermediaError> {
    let mut document = item(user, USER_PROFILE)?;
    document.add_api_namespace();
    document.add_control_self(routes::user(&user.name));
    document.add_control_collection(routes::users());
    document.add_control_user_edit(&user.name);
    document.add_control_user_delete(&user.name);
    document.add_control_favourites_all(&user.name);
    document.add_control_locations_all();
    Ok(document)
}

pub fn locations_collection(
    locations: &[LocationRecord],
    window: PageWindow,
) -> Result<MasonDocument, HypermediaError> {
    let mut document = collection(routes::LOCATIONS, window, locations.len());
    document.add_control_location_add();
    document.add_control_weather_all();
    for location in locations {
        let mut entry = item(location, LOCATION_PROFILE)?;
        entry.add_control_self(routes::location(location.id));
        document.push_item(entry)?;
    }
    Ok(document)
}

pub fn location(location: &LocationRecord) -> Result<MasonDocument, HypermediaError> {
    let mut document = item(location, LOCATION_PROFILE)?;
    document.add_api_namespace();
    document.add_control_self(routes::location(location.id));
    document.add_control_collection(routes::locations());
    document.add_control_location_edit(location.id);
    document.add_control_location_delete(location.id);
    document.add_control_location_weather(location.id);
    Ok(document)
}

pub fn favourites_collection(
    owner: &UserRecord,
    favourites: &[FavouriteRecord],
    window: PageWindow,
) -> Result<MasonDocument, HypermediaError> {
    let href = routes::favourites(&owner.name);
    let mut document = collection(&href, window, favourites.len());
    document.add_control("up", Control::get(routes::user(&owner.name)));
    document.add_control_favourite_add(&owner.name);
    document.add_control_locations_all();
    for favourite in favourites {
        let mut entry = item(favourite, FAVOURITE_PROFILE)?;
        entry.add_control_self(routes::favourite(&owner.name, favourite.id));
        document.push_item(entry)?;
    }
    Ok(document)
}

pub fn favourite(
    owner: &UserRecord,
    favourite: &FavouriteRecord,
) -> Result<MasonDocument, HypermediaError> {
    let mut document = item(favourite, FAVOURITE_PROFILE)?;
    document.add_api_namespace();
    document.add_control_self(routes::favourite(&owner.name, favourite.id));
    document.add_control_collection(routes::favourites(&owner.name));
    document.add_control_favourite_edit(&owner.name, favourite.id);
    document.add_control_favourite_delete(&owner.name, favourite.id);
    document.add_control_location_view(favourite.location_id);
    Ok(document)
}

pub fn weather_collection(
    forecasts: &[WeatherRecord],
    window: PageWindow,
) -> Result<MasonDocument, HypermediaError> {
    let mut document = collection(routes::WEATHER, window, forecasts.len());
    document.add_control_locations_all();
    for forecast in forecasts {
        let mut entry = item(forecast, WEATHER_PROFILE)?;
        entry.add_control_location_view(forecast.location_id);
        document.push_item(entry)?;
    }
    Ok(document)
}

pub fn weather(forecast: &WeatherRecord) -> Result<MasonDocument, HypermediaError> {
    let mut document = item(forecast, WEATHER_PROFILE)?;
    document.add_api_namespace();
    document.add_control_self(routes::location_weather(forecast.location_id));
    document.add_control_collection(routes::weather());
    document.add_control_location_view(forecast.location_id);
    Ok(document)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use serde_json::json;

    use super::*;
    use crate::hypermedia::{ControlName, LINK_RELATIONS_URL, Method, NAMESPACE};

    fn window(page: u32, size: u32) -> PageWindow {
        PageWindow::new(page, NonZeroU32::new(size).expect("non-zero"))
    }

    fn alice() -> UserRecord {
        UserRecord {
            id: 7,
            name: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
        }
    }

    fn favourite_record(id: i64) -> FavouriteRecord {
        FavouriteRecord {
            id,
            title: format!("spot {id}"),
            description: None,
            user_id: 7,
            location_id: 3,
        }
    }

    #[test]
    fn entry_point_declares_namespace_and_collections() {
        let document = entry_point();
        assert_eq!(
            document.namespaces()[NAMESPACE].name,
            LINK_RELATIONS_URL.to_string()
        );
        for name in [
            "bikinghub:users-all",
            "bikinghub:locations-all",
            "bikinghub:weather-all",
        ] {
            assert_eq!(
                document.control(name).map(|c| c.method),
                Some(Method::Get),
                "{name}"
            );
        }
    }

    #[test]
    fn user_documents_never_expose_password_hash() {
        let document = user(&alice()).expect("user document");
        assert_eq!(document.member("name"), Some(&json!("alice")));
        assert!(document.member("password_hash").is_none());

        let listing = users_collection(&[alice()], window(0, 10)).expect("collection");
        let body = String::from_utf8(listing.to_bytes().expect("bytes").to_vec()).expect("utf-8");
        assert!(!body.contains("argon2"));
    }

    #[test]
    fn favourites_collection_links_items_and_add_control() {
        let favourites = [favourite_record(1), favourite_record(2)];
        let document =
            favourites_collection(&alice(), &favourites, window(0, 2)).expect("collection");

        assert_eq!(document.item_count(), 2);
        assert_eq!(
            document.control("self").map(|c| c.href.as_str()),
            Some("/api/user/alice/favourites/")
        );
        let add = document
            .control("bikinghub:favourite-add")
            .expect("add control");
        assert_eq!(add.method, Method::Post);
        assert!(add.schema.is_some());
        assert_eq!(
            document.control("next").map(|c| c.href.as_str()),
            Some("/api/user/alice/favourites/?page=1")
        );

        let items = document.member("items").expect("items");
        assert_eq!(
            items[1]["@controls"]["self"]["href"],
            json!("/api/user/alice/favourite/2/")
        );
        assert_eq!(
            items[1]["@controls"]["profile"]["href"],
            json!(FAVOURITE_PROFILE)
        );
    }

    #[test]
    fn empty_collection_still_has_items_member() {
        let document = locations_collection(&[], window(2, 5)).expect("collection");
        assert_eq!(document.member("items"), Some(&json!([])));
        assert!(document.control("next").is_none());
        assert_eq!(
            document.control("self").map(|c| c.href.as_str()),
            Some("/api/locations/?page=2")
        );
    }

    #[test]
    fn item_documents_use_namespaced_controls_only_beyond_links() {
        let record = LocationRecord {
            id: 3,
            name: "Oulu".to_string(),
            latitude: 65.0,
            longitude: 25.5,
        };
        let document = location(&record).expect("location");
        for name in document.controls().keys() {
            if matches!(name.as_str(), "self" | "profile" | "collection") {
                continue;
            }
            let parsed = ControlName::parse(name).expect("namespaced");
            assert_eq!(parsed.namespace(), NAMESPACE);
        }
        assert!(document.control("bikinghub:weather-current").is_some());
    }
}
