use std::collections::HashMap;

use crate::ranking::keyframes::Keyframe;

/// Address of one ranked entry inside the keyframe timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct EntryId {
    /// Keyframe index.
    pub keyframe: usize,
    /// Position within that keyframe's entries.
    pub slot: usize,
}

impl EntryId {
    /// Build an id.
    pub fn new(keyframe: usize, slot: usize) -> Self {
        Self { keyframe, slot }
    }
}

/// Per-name chronological links between consecutive occurrences of the same category.
///
/// Both maps are total over the timeline: the first occurrence of a name is its own `prev`
/// and the last is its own `next`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Adjacency {
    prev: HashMap<EntryId, EntryId>,
    next: HashMap<EntryId, EntryId>,
}

impl Adjacency {
    /// Previous occurrence of the same name, or `id` itself.
    pub fn prev(&self, id: EntryId) -> EntryId {
        self.prev.get(&id).copied().unwrap_or(id)
    }

    /// Next occurrence of the same name, or `id` itself.
    pub fn next(&self, id: EntryId) -> EntryId {
        self.next.get(&id).copied().unwrap_or(id)
    }

    /// `true` when `id` was linked (i.e. it addresses an entry of the timeline).
    pub fn contains(&self, id: EntryId) -> bool {
        self.prev.contains_key(&id)
    }

    /// Number of linked entries.
    pub fn len(&self) -> usize {
        self.prev.len()
    }

    /// `true` for an empty timeline.
    pub fn is_empty(&self) -> bool {
        self.prev.is_empty()
    }

    /// Every linked entry as `(id, prev, next)`, sorted by id.
    pub fn links(&self) -> Vec<(EntryId, EntryId, EntryId)> {
        let mut out: Vec<_> = self
            .prev
            .iter()
            .map(|(&id, &prev)| (id, prev, self.next(id)))
            .collect();
        out.sort_by_key(|&(id, _, _)| id);
        out
    }
}

/// Link every entry to the neighbouring occurrences of its own name. Linear in total entries.
pub fn link(keyframes: &[Keyframe]) -> Adjacency {
    let mut chains: HashMap<&str, Vec<EntryId>> = HashMap::new();
    for (k, kf) in keyframes.iter().enumerate() {
        for (slot, e) in kf.entries.iter().enumerate() {
            chains.entry(&*e.name).or_default().push(EntryId::new(k, slot));
        }
    }

    let total = chains.values().map(Vec::len).sum();
    let mut adj = Adjacency {
        prev: HashMap::with_capacity(total),
        next: HashMap::with_capacity(total),
    };
    for chain in chains.values() {
        for (i, &id) in chain.iter().enumerate() {
            let prev = if i == 0 { id } else { chain[i - 1] };
            let next = chain.get(i + 1).copied().unwrap_or(id);
            adj.prev.insert(id, prev);
            adj.next.insert(id, next);
        }
    }
    adj
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{foundation::core::Timestamp, ranking::rank::RankedEntry};

    fn kf(ts: i64, entries: &[(&str, f64)]) -> Keyframe {
        Keyframe {
            timestamp: Timestamp(ts),
            entries: entries
                .iter()
                .enumerate()
                .map(|(i, &(name, value))| RankedEntry {
                    name: Arc::from(name),
                    value,
                    rank: i,
                })
                .collect(),
        }
    }

    #[test]
    fn links_follow_names_across_slots() {
        let kfs = [
            kf(1, &[("A", 10.0), ("B", 5.0)]),
            kf(2, &[("B", 12.0), ("A", 3.0)]),
        ];
        let adj = link(&kfs);
        let a1 = EntryId::new(0, 0);
        let a2 = EntryId::new(1, 1);
        let b1 = EntryId::new(0, 1);
        let b2 = EntryId::new(1, 0);

        assert_eq!(adj.next(a1), a2);
        assert_eq!(adj.prev(a2), a1);
        assert_eq!(adj.prev(b2), b1);
        assert_eq!(adj.next(b1), b2);
    }

    #[test]
    fn ends_are_self_referential() {
        let kfs = [kf(1, &[("A", 1.0)]), kf(2, &[("A", 2.0)])];
        let adj = link(&kfs);
        let first = EntryId::new(0, 0);
        let last = EntryId::new(1, 0);
        assert_eq!(adj.prev(first), first);
        assert_eq!(adj.next(last), last);
        assert_eq!(adj.len(), 2);
        assert!(adj.contains(first));
        assert!(!adj.contains(EntryId::new(5, 0)));
    }

    #[test]
    fn links_are_sorted_and_total() {
        let kfs = [
            kf(1, &[("A", 1.0), ("B", 0.0)]),
            kf(2, &[("B", 2.0), ("A", 1.0)]),
            kf(3, &[("A", 4.0), ("B", 3.0)]),
        ];
        let links = link(&kfs).links();
        assert_eq!(links.len(), 6);
        assert!(links.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn empty_timeline_has_no_links() {
        assert!(link(&[]).is_empty());
    }
}
