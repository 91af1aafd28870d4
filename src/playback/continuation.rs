use std::{collections::VecDeque, time::Duration};

use crate::playback::step::Generation;

/// A caption update waiting for its step's transition to settle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PendingCaption {
    pub(crate) generation: Generation,
    pub(crate) due: Duration,
    pub(crate) text: String,
}

/// Deferred caption updates, ordered by due time.
#[derive(Debug, Default)]
pub(crate) struct CaptionQueue {
    pending: VecDeque<PendingCaption>,
}

impl CaptionQueue {
    pub(crate) fn push(&mut self, caption: PendingCaption) {
        // Equal due times keep push order.
        let at = self.pending.partition_point(|c| c.due <= caption.due);
        self.pending.insert(at, caption);
    }

    pub(crate) fn next_due(&self) -> Option<Duration> {
        self.pending.front().map(|c| c.due)
    }

    pub(crate) fn pop_due(&mut self, now: Duration) -> Option<PendingCaption> {
        if self.pending.front()?.due <= now {
            self.pending.pop_front()
        } else {
            None
        }
    }

    /// Drop every caption not issued by `live`. Returns how many were dropped.
    pub(crate) fn retain_generation(&mut self, live: Option<Generation>) -> usize {
        let before = self.pending.len();
        self.pending.retain(|c| Some(c.generation) == live);
        before - self.pending.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
