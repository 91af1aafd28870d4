use std::collections::HashMap;

use crate::{foundation::core::Timestamp, ranking::rank::RankedEntry};

/// Ranked snapshot of every category at one distinct timestamp.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Keyframe {
    /// Snapshot time.
    pub timestamp: Timestamp,
    /// All categories, by descending value.
    pub entries: Vec<RankedEntry>,
}

impl Keyframe {
    /// The `n` highest-ranked entries (the bars actually drawn).
    pub fn top(&self, n: usize) -> &[RankedEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Value of the top entry; `0` for an empty snapshot.
    pub fn leader_value(&self) -> f64 {
        self.entries.first().map_or(0.0, |e| e.value)
    }
}

/// Order ranked snapshots by ascending timestamp into the keyframe timeline.
pub fn build(ranked: HashMap<Timestamp, Vec<RankedEntry>>) -> Vec<Keyframe> {
    let mut keyframes: Vec<Keyframe> = ranked
        .into_iter()
        .map(|(timestamp, entries)| Keyframe { timestamp, entries })
        .collect();
    keyframes.sort_by_key(|k| k.timestamp);
    keyframes
}
