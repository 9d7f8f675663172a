//! Cache-aware assembly of paginated collection documents.
//!
//! `respond` walks CACHE_CHECK -> HIT | MISS -> build -> MAYBE_STORE. The
//! builder supplied by the handler runs the query and assembles the document;
//! this module only decides whether the rendered bytes are kept.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use metrics::counter;
use tracing::debug;

use crate::application::pagination::PageWindow;
use crate::hypermedia::{HypermediaError, MasonDocument};

use super::config::CacheConfig;
use super::keys::{CollectionKind, Owner, derive_key};
use super::store::CacheStore;

const METRIC_CACHE_HIT: &str = "bikinghub_cache_hit_total";
const METRIC_CACHE_MISS: &str = "bikinghub_cache_miss_total";
const METRIC_CACHE_STORE: &str = "bikinghub_cache_store_total";
const METRIC_CACHE_INVALIDATE: &str = "bikinghub_cache_invalidate_total";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionScope {
    pub kind: CollectionKind,
    pub owner: Owner,
}

impl CollectionScope {
    pub fn ownerless(kind: CollectionKind) -> Self {
        Self {
            kind,
            owner: Owner::All,
        }
    }

    pub fn owned_by(kind: CollectionKind, user_id: i64) -> Self {
        Self {
            kind,
            owner: Owner::User(user_id),
        }
    }

    pub fn key(&self, page: u32) -> String {
        derive_key(self.kind, self.owner, page)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Served stored bytes without building.
    Hit,
    /// Built a full page and stored it.
    Stored,
    /// Built a short page; nothing stored.
    Partial,
    /// Built a page past the invalidation scan; nothing stored.
    OutOfScan,
    /// Caching is switched off.
    Bypassed,
}

impl CacheOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Stored => "stored",
            Self::Partial => "partial",
            Self::OutOfScan => "out_of_scan",
            Self::Bypassed => "bypassed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CachedPage {
    pub body: Bytes,
    pub outcome: CacheOutcome,
}

#[derive(Clone)]
pub struct CollectionCache {
    store: Arc<dyn CacheStore>,
    config: CacheConfig,
}

impl CollectionCache {
    pub fn new(store: Arc<dyn CacheStore>, config: CacheConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn window(&self, page: u32) -> PageWindow {
        PageWindow::new(page, self.config.page_size_non_zero())
    }

    /// Serve one page of a collection, building and maybe storing it on a miss.
    ///
    /// Builder failures propagate untouched and leave the cache as it was.
    /// Pages that `invalidate` cannot reach are never stored.
    pub async fn respond<F, Fut, E>(
        &self,
        scope: CollectionScope,
        page: u32,
        build: F,
    ) -> Result<CachedPage, E>
    where
        F: FnOnce(PageWindow) -> Fut,
        Fut: Future<Output = Result<MasonDocument, E>>,
        E: From<HypermediaError>,
    {
        let window = self.window(page);
        let collection = scope.kind.as_str();

        if !self.config.enabled {
            let document = build(window).await?;
            return Ok(CachedPage {
                body: document.to_bytes()?,
                outcome: CacheOutcome::Bypassed,
            });
        }

        let key = scope.key(page);
        if let Some(body) = self.store.get(&key) {
            counter!(METRIC_CACHE_HIT, "collection" => collection).increment(1);
            debug!(cache = "collection", outcome = "hit", key = %key, "serving stored page");
            return Ok(CachedPage {
                body,
                outcome: CacheOutcome::Hit,
            });
        }
        counter!(METRIC_CACHE_MISS, "collection" => collection).increment(1);

        let document = build(window).await?;
        let body = document.to_bytes()?;

        let outcome = if page >= self.config.invalidation_page_scan {
            CacheOutcome::OutOfScan
        } else if document.item_count() == window.size() {
            self.store.set(&key, body.clone(), self.config.ttl());
            counter!(METRIC_CACHE_STORE, "collection" => collection).increment(1);
            CacheOutcome::Stored
        } else {
            CacheOutcome::Partial
        };
        debug!(
            cache = "collection",
            outcome = outcome.as_str(),
            key = %key,
            items = document.item_count(),
            "built collection page"
        );

        Ok(CachedPage { body, outcome })
    }

    /// Drop every page of a scope up to the configured scan width.
    /// Returns how many stored pages were removed.
    pub fn invalidate(&self, kind: CollectionKind, owner: Owner) -> usize {
        let removed = (0..self.config.invalidation_page_scan)
            .filter(|page| self.store.delete(&derive_key(kind, owner, *page)))
            .count();
        counter!(METRIC_CACHE_INVALIDATE, "collection" => kind.as_str())
            .increment(removed as u64);
        debug!(
            cache = "collection",
            collection = kind.as_str(),
            owner = %owner,
            removed,
            "invalidated collection pages"
        );
        removed
    }
}
