pub(crate) mod clock;
pub(crate) mod continuation;
pub(crate) mod player;
pub(crate) mod sequencer;
pub(crate) mod step;
pub(crate) mod surface;
