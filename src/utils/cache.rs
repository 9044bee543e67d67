//! Simple In-Memory Cache
//!
//! Time-based caching for API responses. Expired entries stay readable
//! through `get_stale` until they are overwritten or cleaned up.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Simple time-based cache
pub struct Cache<T> {
    data: HashMap<String, (T, Instant)>,
    ttl: Duration,
}

impl<T: Clone> Cache<T> {
    pub fn new(ttl_seconds: u64) -> Self {
        Self::with_ttl(Duration::from_secs(ttl_seconds))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            data: HashMap::new(),
            ttl,
        }
    }

    /// Fresh value only
    pub fn get(&self, key: &str) -> Option<T> {
        self.data.get(key).and_then(|(value, inserted)| {
            if inserted.elapsed() < self.ttl {
                Some(value.clone())
            } else {
                None
            }
        })
    }

    /// Value regardless of age
    pub fn get_stale(&self, key: &str) -> Option<T> {
        self.data.get(key).map(|(value, _)| value.clone())
    }

    pub fn set(&mut self, key: String, value: T) {
        self.data.insert(key, (value, Instant::now()));
    }

    pub fn invalidate(&mut self, key: &str) {
        self.data.remove(key);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Remove expired entries
    pub fn cleanup(&mut self) {
        let ttl = self.ttl;
        self.data.retain(|_, (_, inserted)| inserted.elapsed() < ttl);
    }
}
