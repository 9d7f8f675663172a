//! Collection cache keys.
//!
//! A key is the collection's route template followed by a bracketed scope
//! suffix, e.g. `/api/user/{user}/favourites/[owner_7_page_0]`. Templates are
//! distinct per collection, so keys never collide across kinds.

use std::fmt;

use crate::hypermedia::routes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Users,
    Locations,
    Favourites,
    Weather,
}

impl CollectionKind {
    pub fn route_template(self) -> &'static str {
        match self {
            Self::Users => routes::USERS,
            Self::Locations => routes::LOCATIONS,
            Self::Favourites => routes::FAVOURITES,
            Self::Weather => routes::WEATHER,
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Locations => "locations",
            Self::Favourites => "favourites",
            Self::Weather => "weather",
        }
    }
}

/// Whose slice of a collection a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    All,
    User(i64),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::User(id) => write!(f, "{id}"),
        }
    }
}

pub fn derive_key(kind: CollectionKind, owner: Owner, page: u32) -> String {
    format!("{}[owner_{owner}_page_{page}]", kind.route_template())
}
