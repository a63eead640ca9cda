use corekit::cache::{Cache, CacheConfig};
use std::time::Duration;

#[test]
fn capacity_eviction_matches_documented_scenario() {
    let cache = Cache::<String>::new(CacheConfig::with_max_size(3));
    cache.set("a", "1".to_string(), None);
    cache.set("b", "2".to_string(), None);
    cache.set("c", "3".to_string(), None);
    cache.set("d", "4".to_string(), None);

    let mut keys = cache.keys();
    keys.sort();
    assert_eq!(keys, vec!["b", "c", "d"]);

    cache.get("b");
    cache.set("e", "5".to_string(), None);

    let mut keys = cache.keys();
    keys.sort();
    assert_eq!(keys, vec!["b", "d", "e"]);
}

#[test]
fn ttl_expiry_is_observationally_a_miss_plus_one_expiration() {
    let cache = Cache::<String>::new(CacheConfig::with_max_size(10));
    cache.set("k", "v".to_string(), Some(Duration::from_millis(100)));
    std::thread::sleep(Duration::from_millis(200));

    assert_eq!(cache.get("k"), None);
    assert_eq!(cache.metrics().expirations, 1);
}

#[test]
fn snapshot_restore_round_trip_preserves_live_entries() {
    let cache = Cache::<String>::new(CacheConfig::with_max_size(10));
    cache.set("alive", "v1".to_string(), None);
    cache.set("fleeting", "v2".to_string(), Some(Duration::from_millis(10)));

    let blob = cache.snapshot().unwrap();
    std::thread::sleep(Duration::from_millis(50));

    let restored = Cache::<String>::new(CacheConfig::with_max_size(10));
    let count = restored.restore(&blob).unwrap();

    assert_eq!(count, 1);
    assert_eq!(restored.get("alive"), Some("v1".to_string()));
    assert_eq!(restored.get("fleeting"), None);
}
