//! Cache configuration.

use std::num::{NonZeroU32, NonZeroUsize};
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_PAGE_SIZE: u32 = 50;
const DEFAULT_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_INVALIDATION_PAGE_SCAN: u32 = 50;
const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve and store collection pages through the cache.
    pub enabled: bool,
    /// Items per collection page.
    pub page_size: u32,
    /// Lifetime of a stored page; zero keeps pages until invalidated or evicted.
    pub ttl_seconds: u64,
    /// Pages `0..invalidation_page_scan` are dropped on every mutation.
    pub invalidation_page_scan: u32,
    /// Maximum number of stored pages.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: DEFAULT_PAGE_SIZE,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            invalidation_page_scan: DEFAULT_INVALIDATION_PAGE_SCAN,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            page_size: settings.page_size.get(),
            ttl_seconds: settings.ttl_seconds,
            invalidation_page_scan: settings.invalidation_page_scan,
            capacity: settings.capacity.get(),
        }
    }
}

impl CacheConfig {
    /// Returns the page size, clamping to 1 if zero.
    pub fn page_size_non_zero(&self) -> NonZeroU32 {
        NonZeroU32::new(self.page_size).unwrap_or(NonZeroU32::MIN)
    }

    /// Returns the capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_seconds > 0).then(|| Duration::from_secs(self.ttl_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.ttl(), Some(Duration::from_secs(604_800)));
        assert_eq!(config.invalidation_page_scan, 50);
        assert_eq!(config.capacity, 1024);
    }

    #[test]
    fn zero_ttl_means_no_expiry() {
        let config = CacheConfig {
            ttl_seconds: 0,
            ..Default::default()
        };
        assert_eq!(config.ttl(), None);
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            page_size: 0,
            capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.page_size_non_zero().get(), 1);
        assert_eq!(config.capacity_non_zero().get(), 1);
    }
}
