//! Hit-rate comparison across bytecache policies, with Moka as a baseline.
//!
//! Replays a Zipf(s=1.0) access trace of image-sized payloads against each
//! policy under both bounds: a small entry count, then a byte budget that
//! binds first. The same trace is used for every run.
//!
//! Run with:
//!     cargo run --example hit_rate --release
//!
//! Set `RUST_LOG=bytecache=debug` to see eviction events (very noisy).

use bytecache::{CacheBuilder, EvictionPolicy, FifoPolicy, LfuPolicy, LruPolicy};
use bytes::Bytes;
use moka::sync::Cache as MokaCache;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Entry bound (number of unique entries each cache may hold).
const CAP: usize = 2_000;
/// Key universe size.  CAP is 10 % of POOL → moderately hard workload.
const POOL: usize = 20_000;
/// Number of accesses in the trace.
const TRACE: usize = 200_000;
/// Payload sizes drawn from [MIN_LEN, MAX_LEN).
const MIN_LEN: usize = 512;
const MAX_LEN: usize = 8 * 1024;

// ---------------------------------------------------------------------------
// Zipf(s=1.0) sampler via inverse CDF: k = N^u, u ~ Uniform(0, 1].
// ---------------------------------------------------------------------------

struct Xorshift64(u64);

impl Xorshift64 {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    /// Returns a uniform float in (0, 1].
    fn uniform(&mut self) -> f64 {
        let bits = self.next() >> 11;
        (bits + 1) as f64 / (1u64 << 53) as f64
    }

    /// Zipf(s=1) sample in [0, pool).
    fn zipf(&mut self, pool: usize) -> usize {
        let u = self.uniform();
        let k = (pool as f64).powf(u) as usize;
        k.saturating_sub(1).min(pool - 1)
    }
}

fn generate_trace(seed: u64, pool: usize, len: usize) -> Vec<usize> {
    let mut rng = Xorshift64(seed);
    (0..len).map(|_| rng.zipf(pool)).collect()
}

/// Deterministic payload per key so every run sees identical sizes.
fn payload(key: usize) -> Bytes {
    let mut rng = Xorshift64(key as u64 ^ 0x9E37_79B9_7F4A_7C15);
    let len = MIN_LEN + (rng.next() as usize % (MAX_LEN - MIN_LEN));
    Bytes::from(vec![(key % 251) as u8; len])
}

fn key_bytes(key: usize) -> Bytes {
    Bytes::copy_from_slice(&(key as u64).to_be_bytes())
}

// ---------------------------------------------------------------------------
// Runners
// ---------------------------------------------------------------------------

struct Run {
    hits: usize,
    evictions: u64,
    elapsed: Duration,
}

fn run_bytecache<P: EvictionPolicy>(policy: P, max_bytes: u64, trace: &[usize]) -> Run {
    let cache = CacheBuilder::new(policy)
        .max_entries(CAP)
        .max_bytes(max_bytes)
        .build()
        .expect("valid limits");
    let start = Instant::now();
    let mut hits = 0usize;
    for &key in trace {
        let k = key_bytes(key);
        if cache.get(&k).is_some() {
            hits += 1;
        } else {
            cache.put(k, payload(key));
        }
    }
    Run {
        hits,
        evictions: cache.stats().evictions,
        elapsed: start.elapsed(),
    }
}

fn run_moka(trace: &[usize]) -> Run {
    let cache: MokaCache<Bytes, Bytes> = MokaCache::new(CAP as u64);
    let start = Instant::now();
    let mut hits = 0usize;
    for &key in trace {
        let k = key_bytes(key);
        if cache.get(&k).is_some() {
            hits += 1;
        } else {
            cache.insert(k, payload(key));
        }
    }
    Run {
        hits,
        evictions: 0,
        elapsed: start.elapsed(),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Roughly a quarter of what CAP average-sized payloads would need.
    let tight_bytes = (CAP * (MIN_LEN + MAX_LEN) / 2 / 4) as u64;

    println!("bytecache — hit rate by policy");
    println!();
    println!("  Distribution : Zipf(s = 1.0)");
    println!("  Key universe : {POOL:>10} unique keys");
    println!(
        "  Capacity     : {CAP:>10} entries  ({:.0}% of universe)",
        CAP as f64 / POOL as f64 * 100.0
    );
    println!("  Byte budget  : {tight_bytes:>10} bytes (second table)");
    println!("  Trace length : {TRACE:>10} accesses");
    println!();

    let trace = generate_trace(0xDEAD_BEEF_1234_5678, POOL, TRACE);

    let col_cache = 16usize;
    let col_hits = 10usize;
    let col_evict = 10usize;
    let col_time = 12usize;

    let header = || {
        println!(
            "{:<col_cache$} {:>col_hits$} {:>9} {:>col_evict$} {:>col_time$}",
            "Cache", "Hits", "Hit Rate", "Evictions", "Time (ms)"
        );
        println!("{}", "─".repeat(col_cache + col_hits + col_evict + col_time + 13));
    };
    let print_row = |name: &str, run: Run| {
        println!(
            "{:<col_cache$} {:>col_hits$} {:>8.2}% {:>col_evict$} {:>col_time$}",
            name,
            run.hits,
            run.hits as f64 / TRACE as f64 * 100.0,
            run.evictions,
            run.elapsed.as_millis(),
        );
    };

    println!("Entry bound only:");
    header();
    print_row("bytecache/lru", run_bytecache(LruPolicy, u64::MAX, &trace));
    print_row("bytecache/lfu", run_bytecache(LfuPolicy, u64::MAX, &trace));
    print_row("bytecache/fifo", run_bytecache(FifoPolicy, u64::MAX, &trace));
    print_row("moka", run_moka(&trace));
    println!();

    println!("Byte budget binds first:");
    header();
    print_row("bytecache/lru", run_bytecache(LruPolicy, tight_bytes, &trace));
    print_row("bytecache/lfu", run_bytecache(LfuPolicy, tight_bytes, &trace));
    print_row("bytecache/fifo", run_bytecache(FifoPolicy, tight_bytes, &trace));
}
