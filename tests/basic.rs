use bytecache::listener::EvictionCause;
use bytecache::{Cache, CacheBuilder, FifoPolicy, LfuPolicy, LruPolicy};
use bytes::Bytes;
use std::sync::{Arc, Mutex};

fn make_cache(max_entries: usize) -> Cache<LruPolicy> {
    CacheBuilder::new(LruPolicy)
        .max_entries(max_entries)
        .build()
        .unwrap()
}

fn b(s: &str) -> Bytes {
    Bytes::copy_from_slice(s.as_bytes())
}

// ---------------------------------------------------------------------------
// Fundamental API correctness
// ---------------------------------------------------------------------------

#[test]
fn get_returns_none_on_miss() {
    let cache = make_cache(10);
    assert_eq!(cache.get(b"missing"), None);
    assert!(!cache.contains_key(b"missing"));
}

#[test]
fn put_and_get() {
    let cache = make_cache(10);
    let result = cache.put("hello", "world");
    assert!(result.inserted);
    assert_eq!(result.previous_value, None);
    assert!(!result.evicted());
    assert_eq!(cache.get(b"hello"), Some(b("world")));
    assert!(cache.contains_key(b"hello"));
}

#[test]
fn overwrite_returns_previous_and_reaccounts_bytes() {
    let cache = make_cache(10);
    cache.put("k", "v1");
    let result = cache.put("k", "v222");
    assert!(!result.inserted);
    assert_eq!(result.previous_value, Some(b("v1")));
    assert_eq!(cache.get(b"k"), Some(b("v222")));
    assert_eq!(cache.len(), 1, "update must not create a second entry");
    assert_eq!(cache.total_bytes(), 5, "only the latest value is counted");
    cache.check_consistency();
}

#[test]
fn remove_returns_value_and_frees_bytes() {
    let cache = make_cache(10);
    cache.put("key", "val");
    cache.put("other", "x");
    assert_eq!(cache.remove(b"key"), Some(b("val")));
    assert_eq!(cache.get(b"key"), None);
    assert_eq!(cache.total_bytes(), 6);
    cache.check_consistency();
}

#[test]
fn remove_of_unknown_key_changes_nothing() {
    let cache = make_cache(10);
    cache.put("a", "1");
    let before = (cache.len(), cache.total_bytes(), cache.eviction_order());
    assert_eq!(cache.remove(b"never-inserted"), None);
    assert_eq!((cache.len(), cache.total_bytes(), cache.eviction_order()), before);
    cache.check_consistency();
}

#[test]
fn peek_does_not_record_access() {
    let cache = make_cache(2);
    cache.put("a", "1");
    cache.put("b", "2");
    assert_eq!(cache.peek(b"a"), Some(b("1")));
    let result = cache.put("c", "3");
    assert_eq!(result.evicted_key, Some(b("a")), "peek must not refresh a");
}

#[test]
fn clear_empties_cache() {
    let cache = make_cache(10);
    cache.put("a", "1");
    cache.put("b", "2");
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.total_bytes(), 0);
    cache.check_consistency();
}

#[test]
fn stats_tracks_hits_and_misses() {
    let cache = make_cache(10);
    cache.put("k", "v");
    cache.get(b"k"); // hit
    cache.contains_key(b"k"); // hit
    cache.get(b"nope"); // miss

    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.inserts, 1);
    assert!(
        (stats.hit_rate - 2.0 / 3.0).abs() < 1e-9,
        "hit_rate = {}",
        stats.hit_rate
    );
}

#[test]
fn cache_is_clone_and_shared() {
    let c1 = make_cache(10);
    let c2 = c1.clone();
    c1.put("shared", "yes");
    assert!(
        c2.get(b"shared").is_some(),
        "cloned handle must see the same entries"
    );
}

// ---------------------------------------------------------------------------
// put_if_absent
// ---------------------------------------------------------------------------

#[test]
fn put_if_absent_inserts_once_and_keeps_first_value() {
    let cache = make_cache(10);
    let first = cache.put_if_absent("A", "1");
    assert!(first.inserted);
    assert_eq!(first.previous_value, None);

    let second = cache.put_if_absent("A", "2");
    assert!(!second.inserted);
    assert_eq!(second.previous_value, Some(b("1")));
    assert_eq!(cache.get(b"A"), Some(b("1")));
    assert_eq!(cache.total_bytes(), 2);
    cache.check_consistency();
}

#[test]
fn put_if_absent_on_present_key_records_access() {
    let cache = make_cache(2);
    cache.put("a", "1");
    cache.put("b", "2");
    cache.put_if_absent("a", "ignored");
    let result = cache.put("c", "3");
    assert_eq!(result.evicted_key, Some(b("b")));
}

#[test]
fn put_if_absent_never_overshoots() {
    let cache = CacheBuilder::new(LruPolicy)
        .max_entries(100)
        .max_bytes(20)
        .build()
        .unwrap();
    for i in 0..50 {
        let result = cache.put_if_absent(format!("k{i:02}"), "vvv");
        assert!(result.inserted);
        assert!(cache.total_bytes() <= 20, "bytes {}", cache.total_bytes());
    }
    cache.check_consistency();
}

#[test]
fn put_if_absent_rejects_entry_larger_than_byte_budget() {
    let cache = CacheBuilder::new(LruPolicy)
        .max_entries(10)
        .max_bytes(20)
        .build()
        .unwrap();
    let keys = ["a", "b", "c", "d", "e"];
    for k in keys {
        cache.put(k, "1");
    }

    let result = cache.put_if_absent("big", vec![0u8; 64]);
    assert!(!result.inserted);
    assert_eq!(result.previous_value, None);
    assert_eq!(result.evicted_count, 0);
    assert!(!result.evicted());

    assert_eq!(cache.len(), 5);
    assert_eq!(cache.total_bytes(), 10);
    assert!(cache.total_bytes() <= cache.max_bytes());
    for k in keys {
        assert_eq!(cache.peek(k.as_bytes()), Some(b("1")), "lost {k}");
    }
    assert_eq!(cache.peek(b"big"), None);
    assert_eq!(cache.stats().evictions, 0);
    cache.check_consistency();
}

#[test]
fn put_if_absent_on_present_key_counts_as_hit() {
    let cache = make_cache(10);
    cache.put_if_absent("a", "1");
    cache.put_if_absent("a", "2");
    cache.put_if_absent("a", "3");

    let stats = cache.stats();
    assert_eq!(stats.inserts, 1);
    assert_eq!(stats.updates, 0);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 0);
}

#[test]
fn rejected_put_if_absent_is_not_counted() {
    let cache = CacheBuilder::new(LruPolicy).max_bytes(4).build().unwrap();
    cache.put_if_absent("big", "too large");
    let stats = cache.stats();
    assert_eq!(stats.inserts, 0);
    assert_eq!(stats.hits, 0);
    assert!(cache.is_empty());
}

// ---------------------------------------------------------------------------
// Capacity enforcement
// ---------------------------------------------------------------------------

#[test]
fn capacity_is_respected_under_load() {
    let cap = 50;
    let cache = make_cache(cap);
    for i in 0..250u64 {
        cache.put(i.to_string(), i.to_string());
        assert!(cache.len() <= cap, "len {} exceeds capacity {}", cache.len(), cap);
    }
    cache.check_consistency();
}

#[test]
fn byte_bound_controls_capacity() {
    // Each entry is 2 key bytes + 10 value bytes = 12.
    let cache = CacheBuilder::new(LruPolicy)
        .max_entries(1_000)
        .max_bytes(100)
        .build()
        .unwrap();
    for i in 0..20u8 {
        cache.put(vec![b'k', i], vec![0u8; 10]);
    }
    assert!(cache.total_bytes() <= 100);
    assert_eq!(cache.len(), 8);
    assert_eq!(cache.stats().evictions, 12);
    cache.check_consistency();
}

#[test]
fn oversized_value_is_kept_alone() {
    let cache = CacheBuilder::new(LruPolicy)
        .max_entries(10)
        .max_bytes(8)
        .build()
        .unwrap();
    cache.put("a", "1");
    cache.put("b", "2");
    let result = cache.put("big", vec![7u8; 64]);
    assert!(result.inserted);
    assert_eq!(result.evicted_count, 2);
    assert_eq!(cache.len(), 1);

    // The next write pushes it out.
    let result = cache.put("c", "3");
    assert_eq!(result.evicted_key, Some(b("big")));
    cache.check_consistency();
}

// ---------------------------------------------------------------------------
// Eviction order
// ---------------------------------------------------------------------------

#[test]
fn lru_get_refreshes_entry() {
    let cache = make_cache(2);
    cache.put("A", "1");
    cache.put("B", "2");
    cache.get(b"A");
    let result = cache.put("C", "3");
    assert!(result.inserted);
    assert_eq!(result.evicted_key, Some(b("B")));
    assert_eq!(result.evicted_value, Some(b("2")));
    assert!(cache.contains_key(b"A"));
    assert!(cache.contains_key(b"C"));
}

#[test]
fn lru_evicts_least_recently_accessed_of_many() {
    let n = 8;
    let cache = make_cache(n);
    for i in 0..n {
        cache.put(format!("k{i}"), "v");
    }
    // Touch everything except k5, in a scrambled order.
    for i in [3, 0, 7, 1, 6, 2, 4] {
        assert!(cache.get(format!("k{i}").as_bytes()).is_some());
    }
    let result = cache.put("new", "v");
    assert_eq!(result.evicted_key, Some(b("k5")));
}

#[test]
fn lfu_keeps_frequently_read_entries() {
    let cache = CacheBuilder::new(LfuPolicy).max_entries(3).build().unwrap();
    cache.put("hot", "1");
    cache.put("warm", "2");
    cache.put("cold", "3");
    for _ in 0..5 {
        cache.get(b"hot");
    }
    cache.get(b"warm");

    let result = cache.put("new", "4");
    assert_eq!(result.evicted_key, Some(b("cold")));
    assert_eq!(cache.peek_entry(b"hot").map(|e| e.state().hits), Some(5));

    // "new" has zero hits, so it is next in line.
    let result = cache.put("newer", "5");
    assert_eq!(result.evicted_key, Some(b("new")));
}

#[test]
fn fifo_ignores_accesses() {
    let cache = CacheBuilder::new(FifoPolicy).max_entries(2).build().unwrap();
    cache.put("a", "1");
    cache.put("b", "2");
    cache.get(b"a");
    let result = cache.put("c", "3");
    assert_eq!(result.evicted_key, Some(b("a")));
}

#[test]
fn overwrite_keeps_insertion_sequence() {
    let cache = make_cache(10);
    cache.put("a", "1");
    let seq = cache.peek_entry(b"a").map(|e| e.seq());
    cache.put("a", "2");
    assert_eq!(cache.peek_entry(b"a").map(|e| e.seq()), seq);
}

#[test]
fn policy_name_reports_configured_policy() {
    assert_eq!(make_cache(1).policy_name(), "lru");
    let lfu = CacheBuilder::new(LfuPolicy).build().unwrap();
    assert_eq!(lfu.policy_name(), "lfu");
    let fifo = CacheBuilder::new(FifoPolicy).build().unwrap();
    assert_eq!(fifo.policy_name(), "fifo");
}

// ---------------------------------------------------------------------------
// EvictionListener
// ---------------------------------------------------------------------------

type Log = Arc<Mutex<Vec<(Vec<u8>, EvictionCause)>>>;

fn logging_cache(max_entries: usize) -> (Cache<LruPolicy>, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let log2 = Arc::clone(&log);
    let cache = CacheBuilder::new(LruPolicy)
        .max_entries(max_entries)
        .eviction_listener(move |key: &[u8], _val, cause| {
            log2.lock().unwrap().push((key.to_vec(), cause));
        })
        .build()
        .unwrap();
    (cache, log)
}

#[test]
fn listener_fires_on_capacity_eviction() {
    let (cache, log) = logging_cache(5);
    for i in 0..20u64 {
        cache.put(i.to_string(), (i * 10).to_string());
    }

    let events = log.lock().unwrap();
    assert_eq!(events.len(), 15);
    assert!(
        events.iter().all(|(_, c)| *c == EvictionCause::Capacity),
        "all events should be Capacity"
    );
    assert_eq!(events[0].0, b"0".to_vec());
}

#[test]
fn listener_fires_on_explicit_remove() {
    let (cache, log) = logging_cache(100);
    cache.put("42", "420");
    cache.remove(b"42");
    cache.remove(b"42");

    let events = log.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0], (b"42".to_vec(), EvictionCause::Explicit));
}

#[test]
fn listener_may_reenter_cache() {
    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let seen2 = Arc::clone(&seen);
    let slot: Arc<Mutex<Option<Cache<LruPolicy>>>> = Arc::new(Mutex::new(None));
    let slot2 = Arc::clone(&slot);

    let cache = CacheBuilder::new(LruPolicy)
        .max_entries(1)
        .eviction_listener(move |_key: &[u8], _val, _cause| {
            if let Some(c) = slot2.lock().unwrap().as_ref() {
                seen2.lock().unwrap().push(c.len());
            }
        })
        .build()
        .unwrap();
    *slot.lock().unwrap() = Some(cache.clone());

    cache.put("a", "1");
    cache.put("b", "2");
    assert_eq!(*seen.lock().unwrap(), vec![1]);

    // Break the handle cycle held by the listener.
    slot.lock().unwrap().take();
}
