//! Sharded `key -> Bucket` map for one context.

use dashmap::DashMap;

use quotalink_core::domain::{Bucket, Window};

/// Shard count used when the caller does not pick one.
pub const DEFAULT_SHARDS: usize = 128;

/// Concurrency-safe bucket storage for one context.
///
/// Keys hash onto independent shards, each behind its own lock. Increments
/// to one key serialize on that key's shard; keys on other shards never wait
/// for each other. Sweeping visits one shard at a time under the same locks,
/// so a consumption racing a sweep either keeps its key alive or recreates it.
/// It is never dropped.
pub struct KeyStore {
    window: Window,
    limit: u64,
    buckets: DashMap<String, Bucket>,
}

impl KeyStore {
    /// Create an empty store.
    ///
    /// `shards` is rounded up to a power of two, minimum 2.
    pub fn new(window: Window, limit: u64, shards: usize) -> Self {
        let shards = shards.max(2).next_power_of_two();

        Self {
            window,
            limit,
            buckets: DashMap::with_shard_amount(shards),
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Register `units` of consumption for `key` at `now`.
    ///
    /// Returns the post-increment utilization together with the context
    /// limit. The bucket is created on first use.
    pub fn consume_and_utilization(&self, key: &str, now: u64, units: u64) -> (u64, u64) {
        // Existing keys are updated in place without allocating the key.
        if let Some(mut bucket) = self.buckets.get_mut(key) {
            return (bucket.consume(&self.window, now, units), self.limit);
        }

        let mut bucket = self
            .buckets
            .entry(key.to_owned())
            .or_insert_with(|| Bucket::new(&self.window));

        (bucket.consume(&self.window, now, units), self.limit)
    }

    /// Read-only utilization of `key` at `now`; zero if the key is unknown.
    pub fn utilization(&self, key: &str, now: u64) -> u64 {
        self.buckets
            .get(key)
            .map(|bucket| bucket.utilization(&self.window, now))
            .unwrap_or(0)
    }

    /// Remove every bucket idle for longer than the window.
    ///
    /// Returns how many keys were removed.
    pub fn sweep(&self, now: u64) -> usize {
        let mut removed = 0;

        self.buckets.retain(|_, bucket| {
            let idle = bucket.is_idle(&self.window, now);
            if idle {
                removed += 1;
            }
            !idle
        });

        removed
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.buckets.contains_key(key)
    }
}
