//! Control naming convention and the domain control builders.
//!
//! Clients discover actions by splitting a control name on `:` and matching
//! the trailing verb, so names are always `<namespace>:<resource>-<verb>`.

use std::fmt;

use super::{
    LINK_RELATIONS_URL, NAMESPACE,
    document::{Control, HypermediaError, MasonDocument},
    routes, schemas,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlName {
    namespace: String,
    resource: String,
    verb: String,
}

impl ControlName {
    pub fn new(
        namespace: impl Into<String>,
        resource: impl Into<String>,
        verb: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            resource: resource.into(),
            verb: verb.into(),
        }
    }

    /// Name within the API namespace.
    pub fn bikinghub(resource: &str, verb: &str) -> Self {
        Self::new(NAMESPACE, resource, verb)
    }

    /// Split `ns:resource-verb`. The verb is the segment after the last `-`.
    pub fn parse(name: &str) -> Result<Self, HypermediaError> {
        let malformed = || HypermediaError::MalformedControlName(name.to_string());
        let (namespace, action) = name.split_once(':').ok_or_else(malformed)?;
        let (resource, verb) = action.rsplit_once('-').ok_or_else(malformed)?;
        if namespace.is_empty()
            || resource.is_empty()
            || verb.is_empty()
            || resource.contains(':')
        {
            return Err(malformed());
        }
        Ok(Self::new(namespace, resource, verb))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }
}

impl fmt::Display for ControlName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.namespace, self.resource, self.verb)
    }
}

impl MasonDocument {
    fn add_named(&mut self, resource: &str, verb: &str, control: Control) {
        self.add_control(ControlName::bikinghub(resource, verb).to_string(), control);
    }

    pub fn add_api_namespace(&mut self) {
        self.add_namespace(NAMESPACE, LINK_RELATIONS_URL);
    }

    pub fn add_control_self(&mut self, href: impl Into<String>) {
        self.add_control("self", Control::get(href));
    }

    pub fn add_control_profile(&mut self, profile: &str) {
        self.add_control("profile", Control::get(profile));
    }

    pub fn add_control_collection(&mut self, href: impl Into<String>) {
        self.add_control("collection", Control::get(href));
    }

    /// `prev`/`next` links around a collection page. `next` is offered only
    /// when the page came back full.
    pub fn add_page_links(&mut self, collection: &str, page: u32, full: bool) {
        if let Some(prev) = page.checked_sub(1) {
            self.add_control("prev", Control::get(routes::paged(collection, prev)));
        }
        if full && let Some(next) = page.checked_add(1) {
            self.add_control("next", Control::get(routes::paged(collection, next)));
        }
    }

    pub fn add_control_users_all(&mut self) {
        self.add_named(
            "users",
            "all",
            Control::get(routes::users()).with_title("Get all users"),
        );
    }

    pub fn add_control_user_add(&mut self) {
        self.add_named(
            "user",
            "add",
            Control::post(routes::users(), schemas::user()).with_title("Add a new user"),
        );
    }

    pub fn add_control_user_edit(&mut self, user: &str) {
        self.add_named(
            "user",
            "edit",
            Control::put(routes::user(user), schemas::user()).with_title("Edit a user"),
        );
    }

    pub fn add_control_user_delete(&mut self, user: &str) {
        self.add_named(
            "user",
            "delete",
            Control::delete(routes::user(user)).with_title("Delete a user"),
        );
    }

    pub fn add_control_locations_all(&mut self) {
        self.add_named(
            "locations",
            "all",
            Control::get(routes::locations()).with_title("Get all locations"),
        );
    }

    pub fn add_control_location_add(&mut self) {
        self.add_named(
            "location",
            "add",
            Control::post(routes::locations(), schemas::location())
                .with_title("Add a new location"),
        );
    }

    pub fn add_control_location_edit(&mut self, location: i64) {
        self.add_named(
            "location",
            "edit",
            Control::put(routes::location(location), schemas::location())
                .with_title("Edit a location"),
        );
    }

    pub fn add_control_location_delete(&mut self, location: i64) {
        self.add_named(
            "location",
            "delete",
            Control::delete(routes::location(location)).with_title("Delete a location"),
        );
    }

    pub fn add_control_location_weather(&mut self, location: i64) {
        self.add_named(
            "weather",
            "current",
            Control::get(routes::location_weather(location))
                .with_title("Get current weather for the location"),
        );
    }

    pub fn add_control_location_view(&mut self, location: i64) {
        self.add_named(
            "location",
            "view",
            Control::get(routes::location(location)).with_title("Get the location"),
        );
    }

    pub fn add_control_weather_all(&mut self) {
        self.add_named(
            "weather",
            "all",
            Control::get(routes::weather()).with_title("Get all weather data"),
        );
    }

    pub fn add_control_favourites_all(&mut self, user: &str) {
        self.add_named(
            "favourites",
            "all",
            Control::get(routes::favourites(user)).with_title("Get all favourite locations"),
        );
    }

    pub fn add_control_favourite_add(&mut self, user: &str) {
        self.add_named(
            "favourite",
            "add",
            Control::post(routes::favourites(user), schemas::favourite())
                .with_title("Add a new favourite location"),
        );
    }

    pub fn add_control_favourite_edit(&mut self, user: &str, favourite: i64) {
        self.add_named(
            "favourite",
            "edit",
            Control::put(routes::favourite(user, favourite), schemas::favourite())
                .with_title("Edit a favourite location"),
        );
    }

    pub fn add_control_favourite_delete(&mut self, user: &str, favourite: i64) {
        self.add_named(
            "favourite",
            "delete",
            Control::delete(routes::favourite(user, favourite))
                .with_title("Delete a favourite location"),
        );
    }
}
