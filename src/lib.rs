//! shredfx cuts an image into thin strips and animates them apart and back together.
//!
//! The crate has two cores and the collaborators needed to run them headless:
//!
//! - [`StripModel`] and [`Orientation`] partition an image into vertical or
//!   horizontal bands, optionally keeping only the even or odd half.
//! - [`KeyframeTrack`] and [`AnimationClock`] drive the spatial state of many
//!   [`ShreddedImage`]s in lockstep from wall-clock time.
//! - [`ShredRegistry`] owns the images by id, [`PendingImage`] carries
//!   background decodes, and [`CpuSurface`] rasterizes frames.
//! - [`ShredScene`] wires it all into the two-stage shred effect rendered by
//!   the `shredfx` binary.
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod animation;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod strips;

pub use crate::foundation::core::{Affine, Canvas, Parity, Point, Rect, Rgba8Premul};
pub use crate::foundation::error::{ShredError, ShredResult};
pub use crate::foundation::math::lerp;

pub use crate::assets::decode::{decode_image, decode_image_file};
pub use crate::assets::loader::{Completer, ImageSource, LoadState, PendingImage};
pub use crate::assets::pixmap::Pixmap;

pub use crate::render::composite::{PremulRgba8, over, over_in_place};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::surface::{PixelRect, Surface};

pub use crate::animation::chain::{ChainMode, ChainTick, ClockChain};
pub use crate::animation::clock::{AnimationClock, ClockState, ClockTick};
pub use crate::animation::ease::{Ease, Easing};
pub use crate::animation::keyframe::{
    Animatable, AnimationTargets, Keyframe, KeyframeEntry, KeyframeTrack, Property, PropertyValues,
};
pub use crate::animation::transition::{
    COLLAPSED_SPREAD, HOLD_REPEATS, SETTLE_REPEATS, build_transition,
};

pub use crate::strips::model::{Strip, StripModel};
pub use crate::strips::orientation::Orientation;
pub use crate::strips::registry::ShredRegistry;
pub use crate::strips::shredded::{
    DEFAULT_STRIP_WIDTH, Readiness, ShredOptions, ShreddedImage, SpatialState,
};

pub use crate::scene::config::{DEFAULT_WIDTH_SHARE, STRIP_WIDTH_ENV, SceneConfig};
pub use crate::scene::stage::{ShredScene, VERTICAL_ID};
