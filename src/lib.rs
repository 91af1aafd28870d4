//! Racebar is a racing bar chart engine.
//!
//! A bound table of `(timestamp, category, value)` columns becomes an immutable keyframe timeline:
//! one ranked snapshot per distinct timestamp, with every category linked to its neighbouring
//! occurrences so bars can enter, move and exit smoothly. A [`Player`] walks that timeline one
//! keyframe per period and drives any [`DrawSurface`]:
//!
//! - Parse a [`ChartInput`] (or fill [`ChartConfig`] + [`ElementData`] directly)
//! - Build a [`Chart`] with [`Chart::transform`]
//! - [`Player::bind`] it, then `start_iter` / `pause_iter` / `replay_iter` and [`Player::pump`]
//!
//! [`SvgSurface`] and [`frame_svg`] render frames as SVG; [`rasterize_svg`] and [`write_png`] turn
//! them into pixels.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod chart;
pub(crate) mod playback;
pub(crate) mod ranking;
pub(crate) mod render;
pub(crate) mod table;

pub use crate::foundation::core::{Rgb8, Timestamp};
pub use crate::foundation::error::{RacebarError, RacebarResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::lerp::Lerp;
pub use crate::chart::caption::{DateGranularity, format_thousands};
pub use crate::chart::config::{ChartConfig, ChartInput, PlaybackOpts, RankParam};
pub use crate::chart::layout::{BAND_PADDING, BandScale, Layout, LayoutOpts, LinearScale, Margin};
pub use crate::chart::palette::{TABLEAU10, ordinal_color};
pub use crate::chart::transform::{Chart, KeyframeSummary, LinkSummary, TimelineSummary};
pub use crate::playback::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::playback::player::Player;
pub use crate::playback::sequencer::{PlaybackState, Sequencer, Step};
pub use crate::playback::step::{
    BarAnchor, BarPhase, BarSample, BarTransition, FrameSample, Generation, StepPlan,
    TransitionHandle,
};
pub use crate::playback::surface::DrawSurface;
pub use crate::ranking::keyframes::{Keyframe, build as build_keyframes};
pub use crate::ranking::link::{Adjacency, EntryId, link};
pub use crate::ranking::rank::{NameSet, RankedEntry, rank, rank_snapshot, visible_slots};
pub use crate::render::raster::{RasterFrame, rasterize_svg, write_png};
pub use crate::render::svg::{SvgSurface, frame_svg};
pub use crate::table::element::{CellValue, ColumnMeta, ElementData};
pub use crate::table::normalize::{Record, normalize};
