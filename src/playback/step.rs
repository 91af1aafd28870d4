use std::{collections::HashSet, sync::Arc, time::Duration};

use crate::{
    animation::{ease::Ease, lerp::Lerp},
    chart::transform::Chart,
    foundation::{
        core::Rgb8,
        error::{RacebarError, RacebarResult},
    },
    ranking::link::EntryId,
};

/// Identity of one playback sequence. Every bind or replay mints a new one.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Generation(pub u64);

/// How a bar takes part in a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum BarPhase {
    /// Newly inside the top-`n` slice.
    Enter,
    /// Shown before and after the step.
    Update,
    /// Leaving the top-`n` slice; gone once the step settles.
    Exit,
}

/// Where a bar sits: a (possibly fractional) rank and the value its length encodes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BarAnchor {
    /// Rank band position.
    pub rank: f64,
    /// Bar value.
    pub value: f64,
}

impl Lerp for BarAnchor {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            rank: f64::lerp(&a.rank, &b.rank, t),
            value: f64::lerp(&a.value, &b.value, t),
        }
    }
}

/// One bar's motion over a step.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BarTransition {
    /// Category label (the bar's identity).
    pub name: Arc<str>,
    /// Fill colour.
    pub color: Rgb8,
    /// Enter, update, or exit.
    pub phase: BarPhase,
    /// Anchor at step start.
    pub from: BarAnchor,
    /// Anchor once the step settles.
    pub to: BarAnchor,
}

/// Everything a surface needs to animate from the previous keyframe to `keyframe`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StepPlan {
    /// Target keyframe index.
    pub keyframe: usize,
    /// x-domain maximum at step start.
    pub domain_from: f64,
    /// x-domain maximum once settled (the keyframe's leader value).
    pub domain_to: f64,
    /// Bars in draw order: the target's top-`n` slice, then exiting bars.
    pub bars: Vec<BarTransition>,
}

impl StepPlan {
    /// Plan the step that lands on `index`, coming from the keyframe `previous` (if any).
    ///
    /// Entering and updating bars start at `prev(e)`. Bars shown at `previous` but not at
    /// `index` exit towards `next(old)`, which is self for a name's last occurrence.
    pub fn for_keyframe(
        chart: &Chart,
        index: usize,
        previous: Option<usize>,
    ) -> RacebarResult<Self> {
        let n = chart.n();
        let target = chart.keyframe(index).ok_or_else(|| {
            RacebarError::playback(format!(
                "keyframe {index} out of range (timeline has {})",
                chart.len()
            ))
        })?;
        let before = match previous {
            Some(p) => Some((
                p,
                chart.keyframe(p).ok_or_else(|| {
                    RacebarError::playback(format!("previous keyframe {p} out of range"))
                })?,
            )),
            None => None,
        };

        let adjacency = chart.adjacency();
        let anchor_of = |id: EntryId| {
            chart.entry(id).map(|e| BarAnchor {
                rank: e.rank as f64,
                value: e.value,
            })
        };

        let shown_before: HashSet<&str> = before
            .map(|(_, kf)| kf.top(n).iter().map(|e| &*e.name).collect())
            .unwrap_or_default();

        let mut bars = Vec::with_capacity(n * 2);
        let mut shown_now = HashSet::with_capacity(n);
        for (slot, e) in target.top(n).iter().enumerate() {
            let id = EntryId::new(index, slot);
            let to = BarAnchor {
                rank: e.rank as f64,
                value: e.value,
            };
            let from = anchor_of(adjacency.prev(id)).unwrap_or(to);
            let phase = if shown_before.contains(&*e.name) {
                BarPhase::Update
            } else {
                BarPhase::Enter
            };
            shown_now.insert(&*e.name);
            bars.push(BarTransition {
                name: Arc::clone(&e.name),
                color: chart.color(&e.name),
                phase,
                from,
                to,
            });
        }

        if let Some((p, kf)) = before {
            for (slot, e) in kf.top(n).iter().enumerate() {
                if shown_now.contains(&*e.name) {
                    continue;
                }
                let id = EntryId::new(p, slot);
                let from = BarAnchor {
                    rank: e.rank as f64,
                    value: e.value,
                };
                let to = anchor_of(adjacency.next(id)).unwrap_or(from);
                bars.push(BarTransition {
                    name: Arc::clone(&e.name),
                    color: chart.color(&e.name),
                    phase: BarPhase::Exit,
                    from,
                    to,
                });
            }
        }

        let domain_to = target.leader_value();
        let domain_from = before.map_or(domain_to, |(_, kf)| kf.leader_value());
        Ok(Self {
            keyframe: index,
            domain_from,
            domain_to,
            bars,
        })
    }

    /// Bar anchors and x-domain at progress `t` (clamped to `[0, 1]`).
    pub fn sample(&self, t: f64, ease: Ease) -> FrameSample {
        let settled = t >= 1.0;
        let e = ease.apply(t);
        FrameSample {
            x_domain_max: f64::lerp(&self.domain_from, &self.domain_to, e),
            bars: self
                .bars
                .iter()
                .filter(|b| !(settled && b.phase == BarPhase::Exit))
                .map(|b| BarSample {
                    name: Arc::clone(&b.name),
                    color: b.color,
                    phase: b.phase,
                    at: BarAnchor::lerp(&b.from, &b.to, e),
                })
                .collect(),
        }
    }
}

/// A step evaluated at one instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameSample {
    /// Current x-domain maximum.
    pub x_domain_max: f64,
    /// Bars still on screen.
    pub bars: Vec<BarSample>,
}

/// One bar evaluated at one instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BarSample {
    /// Category label.
    pub name: Arc<str>,
    /// Fill colour.
    pub color: Rgb8,
    /// Phase within the step.
    pub phase: BarPhase,
    /// Interpolated anchor.
    pub at: BarAnchor,
}

/// Timing of one step's visual transition, handed to the surface with every update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionHandle {
    /// Sequence that issued the step.
    pub generation: Generation,
    /// Target keyframe index.
    pub keyframe: usize,
    /// Clock reading when the step was issued.
    pub started_at: Duration,
    /// Transition length.
    pub duration: Duration,
    /// Easing.
    pub ease: Ease,
}

impl TransitionHandle {
    /// Raw (uneased) progress at `now`, in `[0, 1]`.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// When the transition settles.
    pub fn ends_at(&self) -> Duration {
        self.started_at + self.duration
    }
}
