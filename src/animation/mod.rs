pub(crate) mod chain;
pub(crate) mod clock;
pub(crate) mod ease;
pub(crate) mod keyframe;
pub(crate) mod transition;
