use std::{sync::Arc, time::Duration};

use crate::{
    chart::{config::PlaybackOpts, transform::Chart},
    foundation::error::RacebarResult,
    playback::{
        clock::Clock,
        continuation::CaptionQueue,
        sequencer::{PlaybackState, Sequencer},
        step::Generation,
        surface::DrawSurface,
    },
};

/// Host-side playback session: one drawing surface, one bound timeline, one live sequence.
///
/// Nothing runs in the background. The host calls [`Player::pump`] whenever it wakes up
/// (typically at [`Player::next_deadline`]) and every event due by then fires in time order.
pub struct Player<S: DrawSurface, C: Clock> {
    surface: S,
    clock: C,
    opts: PlaybackOpts,
    sequencer: Option<Sequencer>,
    captions: CaptionQueue,
    last_generation: u64,
}

impl<S: DrawSurface, C: Clock> Player<S, C> {
    /// Create an idle player.
    pub fn new(surface: S, clock: C, opts: PlaybackOpts) -> RacebarResult<Self> {
        opts.validate()?;
        Ok(Self {
            surface,
            clock,
            opts,
            sequencer: None,
            captions: CaptionQueue::default(),
            last_generation: 0,
        })
    }

    /// Bind a freshly built timeline. Any running sequence is discarded together with its timer
    /// and pending captions; the new one waits in `Ready` for [`Player::start_iter`].
    pub fn bind(&mut self, chart: impl Into<Arc<Chart>>) {
        let chart = chart.into();
        let generation = self.mint_generation();
        self.replace_sequence(Sequencer::new(chart, generation, self.opts));
    }

    /// Drop the bound timeline and return to `Idle`.
    pub fn unbind(&mut self) {
        if let Some(old) = self.sequencer.take() {
            tracing::debug!(generation = old.generation().0, "unbound timeline");
        }
        self.captions.retain_generation(None);
    }

    /// Start or resume automatic advancement.
    pub fn start_iter(&mut self) {
        let now = self.clock.now();
        match self.sequencer.as_mut() {
            Some(seq) => seq.start(now),
            None => tracing::trace!("start ignored: no timeline bound"),
        }
    }

    /// Stop advancing, keeping the cursor.
    pub fn pause_iter(&mut self) {
        if let Some(seq) = self.sequencer.as_mut() {
            seq.pause();
        }
    }

    /// Restart from keyframe 0 with a brand-new sequence. Keyframe 0 is drawn immediately.
    pub fn replay_iter(&mut self) {
        let Some(chart) = self.sequencer.as_ref().map(|s| Arc::clone(s.chart())) else {
            tracing::trace!("replay ignored: no timeline bound");
            return;
        };
        let generation = self.mint_generation();
        self.replace_sequence(Sequencer::new(chart, generation, self.opts));

        let now = self.clock.now();
        if let Some(seq) = self.sequencer.as_mut() {
            seq.start(now);
            if let Some(caption) = seq.draw_next(&mut self.surface, now) {
                self.captions.push(caption);
            }
        }
    }

    /// Fire everything due by the clock's current reading. Returns how many keyframes were drawn.
    ///
    /// Missed ticks are replayed at their scheduled times. A caption due at the same instant as a
    /// tick is applied first.
    pub fn pump(&mut self) -> usize {
        let now = self.clock.now();
        let mut drawn = 0;
        loop {
            let caption_due = self.captions.next_due().filter(|d| *d <= now);
            let tick_due = self
                .sequencer
                .as_ref()
                .and_then(Sequencer::next_due)
                .filter(|d| *d <= now);

            match (caption_due, tick_due) {
                (Some(c), Some(t)) if c <= t => self.fire_caption(now),
                (Some(_), None) => self.fire_caption(now),
                (_, Some(t)) => {
                    if self.fire_tick(t) {
                        drawn += 1;
                    }
                }
                (None, None) => break,
            }
        }
        drawn
    }

    /// When the next caption or tick is due, if anything is scheduled.
    pub fn next_deadline(&self) -> Option<Duration> {
        let tick = self.sequencer.as_ref().and_then(Sequencer::next_due);
        match (self.captions.next_due(), tick) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// `true` when nothing further will be drawn without another control call.
    pub fn is_settled(&self) -> bool {
        self.captions.is_empty()
            && self
                .sequencer
                .as_ref()
                .is_none_or(|s| s.is_exhausted() || s.state() != PlaybackState::Running)
    }

    /// Lifecycle state of the live sequence; `Idle` without a timeline.
    pub fn state(&self) -> PlaybackState {
        self.sequencer
            .as_ref()
            .map_or(PlaybackState::Idle, Sequencer::state)
    }

    /// Index of the next keyframe to draw.
    pub fn cursor(&self) -> Option<usize> {
        self.sequencer.as_ref().map(Sequencer::cursor)
    }

    /// Identity of the live sequence.
    pub fn generation(&self) -> Option<Generation> {
        self.sequencer.as_ref().map(Sequencer::generation)
    }

    /// The bound timeline.
    pub fn chart(&self) -> Option<&Arc<Chart>> {
        self.sequencer.as_ref().map(Sequencer::chart)
    }

    /// Playback options.
    pub fn opts(&self) -> &PlaybackOpts {
        &self.opts
    }

    /// The drawing surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The drawing surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Tear down the session and hand back the surface.
    pub fn into_surface(self) -> S {
        self.surface
    }

    fn mint_generation(&mut self) -> Generation {
        self.last_generation += 1;
        Generation(self.last_generation)
    }

    fn replace_sequence(&mut self, next: Sequencer) {
        if let Some(old) = self.sequencer.take() {
            tracing::debug!(
                old = old.generation().0,
                new = next.generation().0,
                cursor = old.cursor(),
                pending_captions = self.captions.len(),
                "discarding playback sequence"
            );
        }
        let dropped = self.captions.retain_generation(Some(next.generation()));
        if dropped > 0 {
            tracing::trace!(dropped, "dropped captions of a discarded sequence");
        }
        self.sequencer = Some(next);
    }

    fn fire_caption(&mut self, now: Duration) {
        let Some(caption) = self.captions.pop_due(now) else {
            return;
        };
        if self.generation() != Some(caption.generation) {
            tracing::trace!(
                generation = caption.generation.0,
                "stale caption continuation ignored"
            );
            return;
        }
        self.surface.set_caption(&caption.text);
    }

    fn fire_tick(&mut self, at: Duration) -> bool {
        let Some(seq) = self.sequencer.as_mut() else {
            return false;
        };
        match seq.fire(&mut self.surface, at) {
            Some(caption) => {
                self.captions.push(caption);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chart::{caption::DateGranularity, layout::LayoutOpts},
        foundation::{core::Timestamp, error::RacebarError},
        playback::{
            clock::ManualClock,
            step::{StepPlan, TransitionHandle},
        },
        table::normalize::Record,
    };

    #[derive(Default)]
    struct Count {
        begins: usize,
        bars: usize,
        captions: Vec<String>,
    }

    impl DrawSurface for Count {
        fn begin(&mut self, _chart: &Arc<Chart>, _generation: Generation) {
            self.begins += 1;
        }
        fn update_axis(&mut self, _plan: &Arc<StepPlan>, _t: &TransitionHandle) {}
        fn update_bars(&mut self, _plan: &Arc<StepPlan>, _t: &TransitionHandle) {
            self.bars += 1;
        }
        fn update_labels(&mut self, _plan: &Arc<StepPlan>, _t: &TransitionHandle) {}
        fn set_caption(&mut self, text: &str) {
            self.captions.push(text.to_owned());
        }
    }

    fn chart(keyframes: i64) -> Chart {
        let records: Vec<Record> = (0..keyframes)
            .map(|d| Record {
                timestamp: Timestamp(d * 86_400_000),
                name: Arc::from("A"),
                value: 1.0,
            })
            .collect();
        Chart::from_records(&records, None, LayoutOpts::default(), DateGranularity::Day)
    }

    #[test]
    fn rejects_zero_duration() {
        let opts = PlaybackOpts {
            duration_ms: 0,
            ..PlaybackOpts::default()
        };
        let err = Player::new(Count::default(), ManualClock::new(), opts).err();
        assert!(matches!(err, Some(RacebarError::Validation(_))));
    }

    #[test]
    fn idle_player_ignores_controls() {
        let mut p = Player::new(Count::default(), ManualClock::new(), PlaybackOpts::default())
            .unwrap();
        p.start_iter();
        p.replay_iter();
        p.pause_iter();
        assert_eq!(p.pump(), 0);
        assert_eq!(p.state(), PlaybackState::Idle);
        assert!(p.is_settled());
        assert_eq!(p.surface().begins, 0);
    }

    #[test]
    fn runs_to_completion_and_settles() {
        let clock = ManualClock::new();
        let mut p = Player::new(Count::default(), clock.clone(), PlaybackOpts::default()).unwrap();
        p.bind(chart(3));
        assert_eq!(p.state(), PlaybackState::Ready);
        p.start_iter();
        assert_eq!(p.next_deadline(), Some(Duration::from_millis(1000)));

        clock.set(Duration::from_secs(10));
        assert_eq!(p.pump(), 3);
        assert_eq!(p.surface().begins, 1);
        assert_eq!(
            p.surface().captions,
            vec!["1970-01-01", "1970-01-01", "1970-01-02", "1970-01-03"]
        );
        assert!(p.is_settled());
        assert_eq!(p.next_deadline(), None);
        assert_eq!(p.state(), PlaybackState::Running);
    }

    #[test]
    fn unbind_returns_to_idle() {
        let clock = ManualClock::new();
        let mut p = Player::new(Count::default(), clock.clone(), PlaybackOpts::default()).unwrap();
        p.bind(chart(2));
        p.replay_iter();
        p.unbind();
        assert_eq!(p.state(), PlaybackState::Idle);
        assert_eq!(p.next_deadline(), None);
        clock.set(Duration::from_secs(5));
        assert_eq!(p.pump(), 0);
        assert_eq!(p.surface().captions, vec!["1970-01-01"]);
    }

    #[test]
    fn pending_caption_fires_while_paused() {
        let clock = ManualClock::new();
        let mut p = Player::new(Count::default(), clock.clone(), PlaybackOpts::default()).unwrap();
        p.bind(chart(2));
        p.start_iter();
        clock.set(Duration::from_millis(1000));
        assert_eq!(p.pump(), 1);
        p.pause_iter();
        assert_eq!(p.next_deadline(), Some(Duration::from_millis(2000)));

        clock.set(Duration::from_millis(2500));
        assert_eq!(p.pump(), 0);
        assert_eq!(p.surface().captions, vec!["1970-01-01", "1970-01-01"]);
        assert!(p.is_settled());
        assert_eq!(p.next_deadline(), None);
    }

    #[test]
    fn last_caption_fires_after_the_timeline_ends() {
        let clock = ManualClock::new();
        let mut p = Player::new(Count::default(), clock.clone(), PlaybackOpts::default()).unwrap();
        p.bind(chart(1));
        p.start_iter();
        clock.set(Duration::from_millis(1000));
        assert_eq!(p.pump(), 1);
        assert!(!p.is_settled());
        assert_eq!(p.next_deadline(), Some(Duration::from_millis(2000)));

        clock.set(Duration::from_millis(2000));
        assert_eq!(p.pump(), 0);
        assert_eq!(p.surface().captions, vec!["1970-01-01", "1970-01-01"]);
        assert!(p.is_settled());
    }
}
