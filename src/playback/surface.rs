use std::sync::Arc;

use crate::{
    chart::transform::Chart,
    playback::step::{Generation, StepPlan, TransitionHandle},
};

/// The drawing collaborator a player drives.
///
/// Calls for one step always arrive in the order axis, bars, labels. The caption for that step
/// arrives later through [`DrawSurface::set_caption`], once its transition has settled.
pub trait DrawSurface {
    /// A new sequence takes over the surface. Anything drawn for an earlier generation is
    /// discarded.
    fn begin(&mut self, chart: &Arc<Chart>, generation: Generation);

    /// Animate the value axis towards `plan.domain_to`.
    fn update_axis(&mut self, plan: &Arc<StepPlan>, transition: &TransitionHandle);

    /// Animate the bars.
    fn update_bars(&mut self, plan: &Arc<StepPlan>, transition: &TransitionHandle);

    /// Animate the value labels.
    fn update_labels(&mut self, plan: &Arc<StepPlan>, transition: &TransitionHandle);

    /// Replace the timestamp caption.
    fn set_caption(&mut self, text: &str);
}
