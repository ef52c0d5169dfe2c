use std::collections::BTreeMap;

use crate::types::Outcome;

/// Cumulative count of outcomes per `address|status` key.
///
/// Keys are kept in a `BTreeMap`, so iteration and rendering are always in
/// lexicographic key order no matter in which order outcomes arrived. Counts
/// only ever grow and keys are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: BTreeMap<String, u64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of the outcome's key.
    pub fn record(&mut self, outcome: &Outcome) {
        *self.counts.entry(outcome.tally_key()).or_insert(0) += 1;
    }

    pub fn record_all<'a>(&mut self, outcomes: impl IntoIterator<Item = &'a Outcome>) {
        for outcome in outcomes {
            self.record(outcome);
        }
    }

    pub fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(key, count)` pairs in lexicographic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Space-separated `key=count` tokens, sorted by key.
    pub fn render(&self) -> String {
        self.iter()
            .map(|(key, count)| format!("{key}={count}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
