// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sentinel_core::FakeClock;

fn cache(max_size: usize) -> (TtlCache<FakeClock>, FakeClock) {
    let clock = FakeClock::new();
    (
        TtlCache::new(Duration::from_secs(600), max_size, clock.clone()),
        clock,
    )
}

#[test]
fn get_returns_fresh_values() {
    let (mut cache, _clock) = cache(10);
    cache.set("k", "v");
    assert_eq!(cache.get("k"), Some("v"));
    assert_eq!(cache.get("missing"), None);
}

#[test]
fn expired_entries_miss_and_are_removed() {
    let (mut cache, clock) = cache(10);
    cache.set("k", "v");

    clock.advance(Duration::from_secs(599));
    assert_eq!(cache.get("k"), Some("v"));

    clock.advance(Duration::from_secs(2));
    assert_eq!(cache.get("k"), None);
    assert!(cache.is_empty());
}

#[test]
fn capacity_is_never_exceeded() {
    let (mut cache, _clock) = cache(3);
    for i in 0..10 {
        cache.set(format!("k{i}"), "v");
        assert!(cache.len() <= 3);
    }
}

#[test]
fn full_cache_prefers_sweeping_expired_entries() {
    let (mut cache, clock) = cache(2);
    cache.set("old", "v");
    clock.advance(Duration::from_secs(601));
    cache.set("a", "v");
    cache.set("b", "v");

    // "old" expired and was swept rather than evicting "a"
    assert_eq!(cache.get("a"), Some("v"));
    assert_eq!(cache.get("b"), Some("v"));
    assert_eq!(cache.get("old"), None);
}

#[test]
fn eviction_removes_the_oldest_insertion() {
    let (mut cache, clock) = cache(2);
    cache.set("first", "1");
    clock.advance(Duration::from_secs(1));
    cache.set("second", "2");
    clock.advance(Duration::from_secs(1));
    cache.set("third", "3");

    assert_eq!(cache.get("first"), None);
    assert_eq!(cache.get("second"), Some("2"));
    assert_eq!(cache.get("third"), Some("3"));
}

#[test]
fn eviction_ties_break_by_insertion_order() {
    let (mut cache, _clock) = cache(2);
    // same timestamp for both
    cache.set("a", "1");
    cache.set("b", "2");
    cache.set("c", "3");

    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.get("b"), Some("2"));
    assert_eq!(cache.get("c"), Some("3"));
}

#[test]
fn overwriting_a_key_refreshes_its_ttl() {
    let (mut cache, clock) = cache(10);
    cache.set("k", "v1");
    clock.advance(Duration::from_secs(500));
    cache.set("k", "v2");
    clock.advance(Duration::from_secs(500));

    assert_eq!(cache.get("k"), Some("v2"));
}
