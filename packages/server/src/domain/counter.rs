//! Per-target counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One counter in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub count: i64,
    pub id: i64,
}

/// In-memory counters keyed by target id
#[derive(Debug, Default)]
pub struct Counter {
    counts: BTreeMap<i64, i64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter for `target` and return its new value.
    ///
    /// Unknown targets start at zero.
    pub fn increment(&mut self, target: i64) -> i64 {
        let count = self.counts.entry(target).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn get(&self, target: i64) -> i64 {
        self.counts.get(&target).copied().unwrap_or(0)
    }

    /// All counters, ordered by target id
    pub fn snapshot(&self) -> Vec<CountEntry> {
        self.counts
            .iter()
            .map(|(&id, &count)| CountEntry { count, id })
            .collect()
    }
}
