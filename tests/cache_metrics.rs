use std::collections::HashSet;
use std::sync::Arc;

use metrics_util::debugging::DebuggingRecorder;

use bikinghub::application::auth::{AuthGuard, AuthLevel, Sha256KeyHasher};
use bikinghub::cache::{
    CacheConfig, CollectionCache, CollectionKind, CollectionScope, MemoryCacheStore, Owner,
};
use bikinghub::hypermedia::{HypermediaError, MasonDocument};

mod support;

use support::MemoryRepos;

fn page_of(items: usize) -> Result<MasonDocument, HypermediaError> {
    let mut document = MasonDocument::new();
    document.ensure_items();
    for n in 0..items {
        let mut item = MasonDocument::new();
        item.insert("n", n.into())?;
        document.push_item(item)?;
    }
    Ok(document)
}

#[derive(Debug)]
struct BuildError;

impl From<HypermediaError> for BuildError {
    fn from(_: HypermediaError) -> Self {
        BuildError
    }
}

#[tokio::test]
async fn cache_and_guard_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let config = CacheConfig {
        page_size: 2,
        ..Default::default()
    };
    let cache = CollectionCache::new(Arc::new(MemoryCacheStore::new(&config)), config);
    let scope = CollectionScope::ownerless(CollectionKind::Locations);

    // miss + store, then hit
    for _ in 0..2 {
        cache
            .respond(scope, 0, |_| async { page_of(2).map_err(BuildError::from) })
            .await
            .expect("page builds");
    }
    assert_eq!(cache.invalidate(CollectionKind::Locations, Owner::All), 1);

    let guard = AuthGuard::new(Arc::new(MemoryRepos::default()), Arc::new(Sha256KeyHasher));
    let rejected = guard.authorize(Some("unknown"), AuthLevel::Admin).await;
    assert!(rejected.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    let names: HashSet<String> = snapshot
        .iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for metric in [
        "bikinghub_cache_hit_total",
        "bikinghub_cache_miss_total",
        "bikinghub_cache_store_total",
        "bikinghub_cache_invalidate_total",
        "bikinghub_auth_rejected_total",
    ] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }

    let labelled = snapshot.iter().any(|(composite_key, _, _, _)| {
        composite_key.key().name() == "bikinghub_cache_hit_total"
            && composite_key
                .key()
                .labels()
                .any(|label| label.key() == "collection" && label.value() == "locations")
    });
    assert!(labelled, "cache counters carry the collection label");
}
