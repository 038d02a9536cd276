//! Tests for [`VolatileCache`] — TTL expiry, bounded capacity,
//! insertion-order eviction.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use doorman::{VolatileCache, VolatileCacheConfig};

fn cache(max_entries: usize) -> VolatileCache<String> {
    VolatileCache::new(
        VolatileCacheConfig::new()
            .max_entries(max_entries)
            .default_ttl(Duration::from_secs(60)),
    )
}

#[test]
fn miss_returns_none() {
    let cache = cache(10);
    assert!(cache.get("nonexistent").is_none());
}

#[test]
fn set_then_get() {
    let cache = cache(10);
    cache.set("key", "value".to_string(), None);
    assert_eq!(cache.get("key").as_deref(), Some("value"));
}

#[test]
fn overwrite_replaces_entry() {
    let cache = cache(10);
    cache.set("key", "old".to_string(), None);
    cache.set("key", "new".to_string(), None);
    assert_eq!(cache.get("key").as_deref(), Some("new"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn expired_entry_is_absent_and_lazily_evicted() {
    let cache = cache(10);
    cache.set("key", "value".to_string(), Some(Duration::ZERO));
    assert!(cache.get("key").is_none());
    // the failed read removed the entry
    assert_eq!(cache.len(), 0);
}

#[test]
fn eviction_is_insertion_order_not_access_order() {
    let cache = cache(3);
    cache.set("a", "1".to_string(), None);
    cache.set("b", "2".to_string(), None);
    cache.set("c", "3".to_string(), None);

    // reading the oldest entry must not protect it
    assert!(cache.get("a").is_some());

    cache.set("d", "4".to_string(), None);
    assert!(cache.get("a").is_none());
    assert!(cache.get("b").is_some());
    assert!(cache.get("c").is_some());
    assert!(cache.get("d").is_some());
}

#[test]
fn overwrite_moves_key_to_back_of_insertion_order() {
    let cache = cache(3);
    cache.set("a", "1".to_string(), None);
    cache.set("b", "2".to_string(), None);
    cache.set("c", "3".to_string(), None);
    cache.set("a", "1-again".to_string(), None);

    cache.set("d", "4".to_string(), None);
    assert!(cache.get("b").is_none());
    assert_eq!(cache.get("a").as_deref(), Some("1-again"));
    assert!(cache.get("c").is_some());
    assert!(cache.get("d").is_some());
}

#[test]
fn full_cache_evicts_exactly_the_earliest_entry() {
    let cache = cache(500);
    for i in 0..500 {
        cache.set(format!("key-{i}"), i.to_string(), None);
    }
    assert_eq!(cache.len(), 500);

    cache.set("one-more", "x".to_string(), None);
    assert_eq!(cache.len(), 500);
    assert!(cache.get("key-0").is_none());
    assert!(cache.get("key-1").is_some());
    assert!(cache.get("key-499").is_some());
    assert!(cache.get("one-more").is_some());
}

#[test]
fn delete_removes_entry() {
    let cache = cache(10);
    cache.set("key", "value".to_string(), None);
    assert!(cache.delete("key"));
    assert!(!cache.delete("key"));
    assert!(cache.get("key").is_none());
}

#[test]
fn clear_empties_cache() {
    let cache = cache(10);
    cache.set("a", "1".to_string(), None);
    cache.set("b", "2".to_string(), None);
    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.get("a").is_none());
}

#[test]
fn sweep_removes_only_expired_entries() {
    let cache = cache(10);
    cache.set("stale", "old".to_string(), Some(Duration::ZERO));
    cache.set("fresh", "new".to_string(), Some(Duration::from_secs(60)));

    assert_eq!(cache.sweep(), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.get("fresh").is_some());
}

#[test]
fn thread_safety() {
    let cache = Arc::new(cache(100));
    let mut handles = Vec::new();

    for i in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            cache.set(format!("key-{i}"), i.to_string(), None);
        }));
    }
    for i in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            // May or may not see the entry yet — shouldn't panic
            let _ = cache.get(&format!("key-{i}"));
        }));
    }

    for h in handles {
        h.join().expect("thread panicked");
    }

    for i in 0..10 {
        assert!(cache.get(&format!("key-{i}")).is_some());
    }
}
