//! Cache storage.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// Key/value store for rendered documents.
///
/// `set` and `delete` are atomic per key; concurrent writers to one key
/// resolve as last write wins.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Bytes>;

    /// Store `value`; `None` keeps it until deleted or evicted.
    fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>);

    /// Remove `key`, reporting whether it was present.
    fn delete(&self, key: &str) -> bool;
}

#[derive(Clone)]
struct Entry {
    body: Bytes,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process LRU store.
pub struct MemoryCacheStore {
    entries: RwLock<LruCache<String, Entry>>,
}

impl MemoryCacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<Bytes> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let expired = entries.get(key)?.is_expired(Instant::now());
        if expired {
            entries.pop(key);
            return None;
        }
        entries.get(key).map(|entry| entry.body.clone())
    }

    fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) {
        let expires_at = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        let entry = Entry {
            body: value,
            expires_at,
        };
        rw_write(&self.entries, SOURCE, "set").put(key.to_string(), entry);
    }

    fn delete(&self, key: &str) -> bool {
        rw_write(&self.entries, SOURCE, "delete").pop(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    fn store_with_capacity(capacity: usize) -> MemoryCacheStore {
        MemoryCacheStore::new(&CacheConfig {
            capacity,
            ..Default::default()
        })
    }

    #[test]
    fn set_get_delete_roundtrip() {
        let store = store_with_capacity(4);
        assert!(store.get("k").is_none());

        store.set("k", Bytes::from_static(b"doc"), None);
        assert_eq!(store.get("k"), Some(Bytes::from_static(b"doc")));

        assert!(store.delete("k"));
        assert!(!store.delete("k"));
        assert!(store.get("k").is_none());
    }

    #[test]
    fn last_write_wins() {
        let store = store_with_capacity(4);
        store.set("k", Bytes::from_static(b"one"), None);
        store.set("k", Bytes::from_static(b"two"), None);
        assert_eq!(store.get("k"), Some(Bytes::from_static(b"two")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let store = store_with_capacity(4);
        store.set("k", Bytes::from_static(b"doc"), Some(Duration::ZERO));
        assert!(store.get("k").is_none());
        assert!(store.is_empty());

        store.set("k", Bytes::from_static(b"doc"), Some(Duration::from_secs(3600)));
        assert!(store.get("k").is_some());
    }

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let store = store_with_capacity(2);
        store.set("a", Bytes::from_static(b"a"), None);
        store.set("b", Bytes::from_static(b"b"), None);
        assert!(store.get("a").is_some());
        store.set("c", Bytes::from_static(b"c"), None);

        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
        assert!(store.get("c").is_some());
    }

    #[test]
    fn store_recovers_from_poisoned_lock() {
        let store = store_with_capacity(2);

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store
                .entries
                .write()
                .expect("entries lock should be acquired");
            panic!("poison entries lock");
        }));

        store.set("k", Bytes::from_static(b"doc"), None);
        assert!(store.get("k").is_some());
    }
}
