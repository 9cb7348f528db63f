//! Per-layer vote counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::boundary::Boundary;

/// Vote count per boundary for one layer.
///
/// Only boundaries with at least one vote have an entry, including tallies
/// read back from JSON. Serializes as a JSON object keyed by boundary name,
/// e.g. `{"connection":2,"flow":1}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Boundary, u32>", into = "BTreeMap<Boundary, u32>")]
pub struct VoteTally(BTreeMap<Boundary, u32>);

impl VoteTally {
    /// An empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one vote for `boundary`.
    pub fn increment(&mut self, boundary: Boundary) {
        let count = self.0.entry(boundary).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Votes recorded for `boundary` (0 when absent).
    pub fn get(&self, boundary: Boundary) -> u32 {
        self.0.get(&boundary).copied().unwrap_or(0)
    }

    /// Whether no vote has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct boundaries with votes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Sum of all votes.
    pub fn total(&self) -> u32 {
        self.0.values().fold(0u32, |acc, v| acc.saturating_add(*v))
    }

    /// `(boundary, count)` pairs in boundary order.
    pub fn iter(&self) -> impl Iterator<Item = (Boundary, u32)> + '_ {
        self.0.iter().map(|(b, c)| (*b, *c))
    }

    /// Drop every vote.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<(Boundary, u32)> for VoteTally {
    fn from_iter<I: IntoIterator<Item = (Boundary, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|(_, count)| *count > 0).collect())
    }
}

impl From<BTreeMap<Boundary, u32>> for VoteTally {
    fn from(counts: BTreeMap<Boundary, u32>) -> Self {
        counts.into_iter().collect()
    }
}

impl From<VoteTally> for BTreeMap<Boundary, u32> {
    fn from(tally: VoteTally) -> Self {
        tally.0
    }
}
