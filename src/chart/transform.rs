use std::sync::Arc;

use crate::{
    chart::{
        caption::DateGranularity,
        config::ChartConfig,
        layout::{Layout, LayoutOpts},
        palette::{TABLEAU10, ordinal_color},
    },
    foundation::core::{Rgb8, Timestamp},
    ranking::{
        keyframes::{self, Keyframe},
        link::{self, Adjacency, EntryId},
        rank::{self, NameSet, RankedEntry},
    },
    table::{
        element::ElementData,
        normalize::{self, Record},
    },
};

/// An immutable keyframe timeline plus everything needed to draw it.
///
/// Built once per data binding. Playback holds it behind an `Arc` and never mutates it.
#[derive(Clone, Debug)]
pub struct Chart {
    names: NameSet,
    n: usize,
    keyframes: Vec<Keyframe>,
    adjacency: Adjacency,
    layout: Layout,
    granularity: DateGranularity,
}

impl Chart {
    /// Run the full pipeline over a bound element: normalize, rank, build keyframes, link.
    #[tracing::instrument(skip_all, fields(rows = element.column(config.date.as_deref()).len()))]
    pub fn transform(config: &ChartConfig, element: &ElementData, layout: LayoutOpts) -> Self {
        let records = normalize::normalize(
            element.column(config.date.as_deref()),
            element.column(config.category.as_deref()),
            element.column(config.value.as_deref()),
        );
        let granularity =
            DateGranularity::from_column_name(element.column_name(config.date.as_deref()));
        Self::from_records(&records, config.cutoff(), layout, granularity)
    }

    /// Build from already-normalized records.
    pub fn from_records(
        records: &[Record],
        cutoff: Option<usize>,
        layout: LayoutOpts,
        granularity: DateGranularity,
    ) -> Self {
        let names = NameSet::from_records(records);
        let n = rank::visible_slots(names.len(), cutoff);
        let keyframes = keyframes::build(rank::rank(records, &names, n));
        let adjacency = link::link(&keyframes);
        tracing::debug!(
            names = names.len(),
            n,
            keyframes = keyframes.len(),
            links = adjacency.len(),
            "built keyframe timeline"
        );
        Self {
            names,
            n,
            keyframes,
            adjacency,
            layout: Layout::new(layout, n),
            granularity,
        }
    }

    /// Distinct names in first-seen order.
    pub fn names(&self) -> &NameSet {
        &self.names
    }

    /// Visible slots.
    pub fn n(&self) -> usize {
        self.n
    }

    /// The timeline, ascending by timestamp.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Keyframe at `index`.
    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    /// prev/next links.
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Resolved geometry.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Caption granularity picked from the date column.
    pub fn granularity(&self) -> DateGranularity {
        self.granularity
    }

    /// Number of keyframes.
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// `true` for a degenerate timeline; playback over it does nothing.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Entry addressed by `id`.
    pub fn entry(&self, id: EntryId) -> Option<&RankedEntry> {
        self.keyframes.get(id.keyframe)?.entries.get(id.slot)
    }

    /// Colour assigned to `name`.
    pub fn color(&self, name: &str) -> Rgb8 {
        self.names.index_of(name).map_or(TABLEAU10[0], ordinal_color)
    }

    /// Caption text for the keyframe at `index`.
    pub fn caption(&self, index: usize) -> Option<String> {
        self.keyframe(index).map(|kf| self.granularity.format(kf.timestamp))
    }

    /// Serializable view of the timeline and its links.
    pub fn summary(&self) -> TimelineSummary {
        TimelineSummary {
            n: self.n,
            names: self.names.iter().cloned().collect(),
            keyframes: self
                .keyframes
                .iter()
                .enumerate()
                .map(|(i, kf)| KeyframeSummary {
                    index: i,
                    timestamp: kf.timestamp,
                    caption: self.granularity.format(kf.timestamp),
                    entries: kf.entries.clone(),
                })
                .collect(),
            links: self
                .adjacency
                .links()
                .into_iter()
                .map(|(entry, prev, next)| LinkSummary { entry, prev, next })
                .collect(),
        }
    }
}

/// JSON-friendly dump of a [`Chart`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimelineSummary {
    /// Visible slots.
    pub n: usize,
    /// Names in first-seen order.
    pub names: Vec<Arc<str>>,
    /// Keyframes in timeline order.
    pub keyframes: Vec<KeyframeSummary>,
    /// Every entry's links, sorted by entry.
    pub links: Vec<LinkSummary>,
}

/// One keyframe in a [`TimelineSummary`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct KeyframeSummary {
    /// Position in the timeline.
    pub index: usize,
    /// Snapshot time.
    pub timestamp: Timestamp,
    /// Formatted caption.
    pub caption: String,
    /// Ranked entries.
    pub entries: Vec<RankedEntry>,
}

/// One entry's links in a [`TimelineSummary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LinkSummary {
    /// The entry.
    pub entry: EntryId,
    /// Previous occurrence of its name.
    pub prev: EntryId,
    /// Next occurrence of its name.
    pub next: EntryId,
}
