//! Collection response cache.
//!
//! Paginated collection documents are rendered once and kept as immutable
//! bytes under keys derived from `(collection, owner, page)`. Only full pages
//! are stored; mutations drop every page of the affected scope.
//!
//! ```toml
//! [cache]
//! enabled = true
//! page_size = 50
//! ttl_seconds = 604800
//! invalidation_page_scan = 50
//! capacity = 1024
//! ```

mod collections;
mod config;
mod keys;
mod lock;
mod store;

pub use collections::{CacheOutcome, CachedPage, CollectionCache, CollectionScope};
pub use config::CacheConfig;
pub use keys::{CollectionKind, Owner, derive_key};
pub use store::{CacheStore, MemoryCacheStore};
