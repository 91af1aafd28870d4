use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use indexmap::IndexSet;

use crate::{foundation::core::Timestamp, table::normalize::Record};

/// Distinct category names, in first-seen order.
///
/// The order matters: it is the tie-break order for equal values and the colour assignment order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameSet(IndexSet<Arc<str>>);

impl NameSet {
    /// Collect the distinct names of `records`.
    pub fn from_records(records: &[Record]) -> Self {
        Self(records.iter().map(|r| Arc::clone(&r.name)).collect())
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no names were observed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<str>> {
        self.0.iter()
    }

    /// First-seen position of `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.get_index_of(name)
    }
}

/// Effective rank cutoff `n`: the configured cutoff bounded by the number of names.
pub fn visible_slots(names: usize, cutoff: Option<usize>) -> usize {
    cutoff.map_or(names, |c| c.min(names))
}

/// A category's value and rank within one keyframe.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RankedEntry {
    /// Category label.
    pub name: Arc<str>,
    /// Aggregated value at this timestamp (`0` when the category had no row).
    pub value: f64,
    /// Position by descending value, clamped to `n`.
    pub rank: usize,
}

/// Rank every name at every distinct timestamp.
///
/// Duplicate `(timestamp, name)` rows keep the first value seen. Names without a row at a
/// timestamp are ranked with value `0`, so each snapshot holds exactly `names.len()` entries.
pub fn rank(
    records: &[Record],
    names: &NameSet,
    n: usize,
) -> HashMap<Timestamp, Vec<RankedEntry>> {
    if names.is_empty() {
        return HashMap::new();
    }

    let mut groups: HashMap<Timestamp, HashMap<&str, f64>> = HashMap::new();
    for r in records {
        groups
            .entry(r.timestamp)
            .or_default()
            .entry(&*r.name)
            .or_insert(r.value);
    }

    groups
        .into_iter()
        .map(|(ts, values)| {
            let entries = rank_snapshot(names, n, |name| values.get(name).copied().unwrap_or(0.0));
            (ts, entries)
        })
        .collect()
}

/// Rank all `names` by `value`, descending.
///
/// The sort is stable, so equal values keep `names` order. That tie-break is incidental rather
/// than a semantic guarantee. Entries past the cutoff share the terminal rank `n`.
pub fn rank_snapshot(
    names: &NameSet,
    n: usize,
    value: impl Fn(&str) -> f64,
) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = names
        .iter()
        .map(|name| RankedEntry {
            name: Arc::clone(name),
            value: value(name),
            rank: 0,
        })
        .collect();
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    for (i, e) in entries.iter_mut().enumerate() {
        e.rank = i.min(n);
    }
    entries
}
