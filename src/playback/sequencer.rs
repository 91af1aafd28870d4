use std::{sync::Arc, time::Duration};

use crate::{
    chart::{config::PlaybackOpts, transform::Chart},
    playback::{
        continuation::PendingCaption,
        step::{Generation, StepPlan, TransitionHandle},
        surface::DrawSurface,
    },
};

/// Where a playback sequence is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum PlaybackState {
    /// No timeline bound.
    Idle,
    /// Timeline bound, timer not armed.
    Ready,
    /// Timer armed; every tick draws the next keyframe.
    Running,
    /// Timer cleared, cursor retained.
    Paused,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Timer {
    period: Duration,
    next_due: Duration,
}

/// One advance of the cursor.
#[derive(Clone, Debug)]
pub struct Step {
    /// Keyframe index the step lands on.
    pub index: usize,
    /// Interpolation anchors for the step.
    pub plan: Arc<StepPlan>,
}

/// Cursor and timer state for one pass over a keyframe timeline.
///
/// A sequencer is never rewound. Replaying or rebinding builds a new one with a new
/// [`Generation`], and dropping the old one drops its timer.
#[derive(Debug)]
pub struct Sequencer {
    chart: Arc<Chart>,
    generation: Generation,
    opts: PlaybackOpts,
    cursor: usize,
    state: PlaybackState,
    timer: Option<Timer>,
}

impl Sequencer {
    /// A `Ready` sequence positioned at keyframe 0.
    pub fn new(chart: Arc<Chart>, generation: Generation, opts: PlaybackOpts) -> Self {
        Self {
            chart,
            generation,
            opts,
            cursor: 0,
            state: PlaybackState::Ready,
            timer: None,
        }
    }

    /// The timeline being played.
    pub fn chart(&self) -> &Arc<Chart> {
        &self.chart
    }

    /// Identity of this sequence.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Index of the next keyframe to draw.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Lifecycle state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// `true` once every keyframe has been drawn (immediately, for an empty timeline).
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.chart.len()
    }

    /// Arm the repeating timer; the first tick is one period from `now`. No-op while running.
    pub fn start(&mut self, now: Duration) {
        if self.state == PlaybackState::Running {
            return;
        }
        let period = self.opts.duration();
        self.timer = Some(Timer {
            period,
            next_due: now + period,
        });
        self.state = PlaybackState::Running;
        tracing::debug!(generation = self.generation.0, cursor = self.cursor, "playback started");
    }

    /// Clear the timer, keeping the cursor. No-op unless running.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Running {
            return;
        }
        self.timer = None;
        self.state = PlaybackState::Paused;
        tracing::debug!(generation = self.generation.0, cursor = self.cursor, "playback paused");
    }

    /// When the next tick that would draw something is due.
    ///
    /// An exhausted sequence keeps running, but its ticks do nothing, so it reports none.
    pub fn next_due(&self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        self.timer.map(|t| t.next_due)
    }

    /// Move the cursor one keyframe forward and plan that step. `None` past the end.
    pub fn advance(&mut self) -> Option<Step> {
        if self.is_exhausted() {
            return None;
        }
        let index = self.cursor;
        let plan = match StepPlan::for_keyframe(&self.chart, index, index.checked_sub(1)) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!(
                    generation = self.generation.0,
                    keyframe = index,
                    error = %e,
                    "cannot plan step"
                );
                return None;
            }
        };
        self.cursor += 1;
        Some(Step {
            index,
            plan: Arc::new(plan),
        })
    }

    /// Timer tick due at `at`: re-arm for the next period and draw the next keyframe.
    pub(crate) fn fire<S: DrawSurface>(
        &mut self,
        surface: &mut S,
        at: Duration,
    ) -> Option<PendingCaption> {
        if let Some(timer) = self.timer.as_mut() {
            timer.next_due = at + timer.period;
        }
        self.draw_next(surface, at)
    }

    /// Draw the next keyframe as a step starting at `at`.
    ///
    /// Returns the caption update to apply once the step's transition settles.
    pub(crate) fn draw_next<S: DrawSurface>(
        &mut self,
        surface: &mut S,
        at: Duration,
    ) -> Option<PendingCaption> {
        let step = self.advance()?;
        if step.index == 0 {
            surface.begin(&self.chart, self.generation);
            if let Some(first) = self.chart.caption(0) {
                surface.set_caption(&first);
            }
        }

        let transition = TransitionHandle {
            generation: self.generation,
            keyframe: step.index,
            started_at: at,
            duration: self.opts.duration(),
            ease: self.opts.ease,
        };
        surface.update_axis(&step.plan, &transition);
        surface.update_bars(&step.plan, &transition);
        surface.update_labels(&step.plan, &transition);
        tracing::debug!(
            generation = self.generation.0,
            keyframe = step.index,
            at_ms = at.as_millis() as u64,
            "drew keyframe"
        );

        Some(PendingCaption {
            generation: self.generation,
            due: transition.ends_at(),
            text: self.chart.caption(step.index)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chart::{caption::DateGranularity, layout::LayoutOpts},
        foundation::core::Timestamp,
        table::normalize::Record,
    };

    fn chart(keyframes: i64) -> Arc<Chart> {
        let records: Vec<Record> = (0..keyframes)
            .map(|ts| Record {
                timestamp: Timestamp(ts),
                name: Arc::from("A"),
                value: ts as f64,
            })
            .collect();
        Arc::new(Chart::from_records(
            &records,
            None,
            LayoutOpts::default(),
            DateGranularity::Day,
        ))
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn new_sequence_is_ready_at_zero() {
        let s = Sequencer::new(chart(3), Generation(1), PlaybackOpts::default());
        assert_eq!(s.state(), PlaybackState::Ready);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.next_due(), None);
    }

    #[test]
    fn advance_walks_keyframes_in_order_then_stops() {
        let mut s = Sequencer::new(chart(3), Generation(1), PlaybackOpts::default());
        let indices: Vec<usize> = std::iter::from_fn(|| s.advance()).map(|st| st.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(s.is_exhausted());
        assert!(s.advance().is_none());
    }

    #[test]
    fn start_pause_resume_keeps_cursor() {
        let mut s = Sequencer::new(chart(3), Generation(1), PlaybackOpts::default());
        s.start(ms(0));
        assert_eq!(s.next_due(), Some(ms(1000)));
        s.start(ms(400));
        assert_eq!(s.next_due(), Some(ms(1000)));

        s.advance();
        s.pause();
        assert_eq!(s.state(), PlaybackState::Paused);
        assert_eq!(s.next_due(), None);
        assert_eq!(s.cursor(), 1);

        s.start(ms(5000));
        assert_eq!(s.state(), PlaybackState::Running);
        assert_eq!(s.next_due(), Some(ms(6000)));
        assert_eq!(s.advance().unwrap().index, 1);
    }

    #[test]
    fn empty_timeline_is_exhausted_from_the_start() {
        let mut s = Sequencer::new(chart(0), Generation(1), PlaybackOpts::default());
        s.start(ms(0));
        assert!(s.is_exhausted());
        assert_eq!(s.next_due(), None);
        assert!(s.advance().is_none());
    }
}
