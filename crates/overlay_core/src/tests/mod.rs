use super::*;
use crate::test_fixtures::{cache_with_delay, keys, label_view, FakeHandle, FakeWorld, FlakyFactory};


// --- Shared test helpers ------------------------------------------------

type TestCache = ReconciledViewCache<FakeHandle, String>;

/// Cache with delay 5 that has already observed `names` in order.
fn observed_cache(world: &FakeWorld, names: &[&str]) -> TestCache {
    let mut cache = cache_with_delay(5);
    cache.observe(world.handles(names), &mut label_view);
    cache
}

fn tick_n(cache: &mut TestCache, n: u32) -> Vec<ReconcileReport<FakeHandle, String>> {
    (0..n).filter_map(|_| cache.tick()).collect()
}

fn active_labels(cache: &TestCache) -> Vec<String> {
    cache.active_views().map(|e| e.view().clone()).collect()
}
