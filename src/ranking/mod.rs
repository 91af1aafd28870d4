pub(crate) mod keyframes;
pub(crate) mod link;
pub(crate) mod rank;
