//! Per-key bounded attempt counter

use std::collections::HashMap;

/// Counts attempts per key against one shared threshold.
///
/// Entries are created on first increment and only ever grow; there is no
/// reset and no time component.
#[derive(Debug, Clone)]
pub struct RetryCounter {
    counts: HashMap<String, u32>,
    max_retries: u32,
}

impl RetryCounter {
    pub fn new(max_retries: u32) -> Self {
        Self {
            counts: HashMap::new(),
            max_retries,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn increment(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    /// Attempts recorded for `key`; 0 if never incremented
    pub fn count(&self, key: &str) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn is_maxed_out(&self, key: &str) -> bool {
        self.count(key) >= self.max_retries
    }

    /// Increment, then report whether the budget for `key` is spent
    pub fn record_attempt(&mut self, key: &str) -> bool {
        self.increment(key);
        self.is_maxed_out(key)
    }
}
