use std::sync::Arc;

use crate::{
    animation::keyframe::{Animatable, Property},
    assets::{
        loader::{LoadState, PendingImage},
        pixmap::Pixmap,
    },
    foundation::{
        core::{Parity, Point},
        error::{ShredError, ShredResult},
    },
    render::surface::Surface,
    strips::{
        model::{Strip, StripModel},
        orientation::Orientation,
    },
};

/// Strip width used when none is configured.
pub const DEFAULT_STRIP_WIDTH: u32 = 5;

/// Animated placement of a shredded image.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpatialState {
    pub x: f64,
    pub y: f64,
    /// Multiplier on the distance between consecutive strips; 1 means touching.
    pub spread: f64,
    pub opacity: f64,
}

impl Default for SpatialState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            spread: 1.0,
            opacity: 1.0,
        }
    }
}

impl SpatialState {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Construction parameters of a [`ShreddedImage`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShredOptions {
    pub strip_width: u32,
    pub parity: Option<Parity>,
    pub orientation: Orientation,
    /// Resize the loaded image to this width (keeping aspect) before slicing.
    pub target_width: Option<u32>,
    pub state: SpatialState,
}

impl Default for ShredOptions {
    fn default() -> Self {
        Self {
            strip_width: DEFAULT_STRIP_WIDTH,
            parity: None,
            orientation: Orientation::Vertical,
            target_width: None,
            state: SpatialState::default(),
        }
    }
}

impl ShredOptions {
    pub fn with_strip_width(mut self, strip_width: u32) -> Self {
        self.strip_width = strip_width;
        self
    }

    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = Some(parity);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_target_width(mut self, target_width: u32) -> Self {
        self.target_width = Some(target_width);
        self
    }

    pub fn with_state(mut self, state: SpatialState) -> Self {
        self.state = state;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    Ready,
    Failed,
}

#[derive(Clone, Debug)]
struct Built {
    source: Arc<Pixmap>,
    strips: Vec<Strip>,
}

/// Image cut into strips whose placement can be animated.
///
/// The strip set is built in one step by [`ShreddedImage::poll`] once the
/// backing load completes. Until then the image has no strips and draws
/// nothing.
#[derive(Clone, Debug)]
pub struct ShreddedImage {
    pending: PendingImage,
    model: StripModel,
    orientation: Orientation,
    target_width: Option<u32>,
    state: SpatialState,
    built: Option<Built>,
    failure: Option<String>,
}

impl ShreddedImage {
    /// Validates `options` and polls the load once.
    ///
    /// Fails with `InvalidGeometry` on a zero strip or target width, or when an
    /// already-loaded image has zero area.
    pub fn new(pending: PendingImage, options: ShredOptions) -> ShredResult<Self> {
        let model = StripModel::new(options.strip_width, options.parity)?;
        if options.target_width == Some(0) {
            return Err(ShredError::invalid_geometry("target width must be > 0"));
        }
        let mut image = Self {
            pending,
            model,
            orientation: options.orientation,
            target_width: options.target_width,
            state: options.state,
            built: None,
            failure: None,
        };
        image.poll()?;
        Ok(image)
    }

    /// Builds the strips if the load has completed since the last call.
    ///
    /// A failed load settles as [`Readiness::Failed`]; a loaded image with
    /// zero area settles the same way and reports `InvalidGeometry` once.
    pub fn poll(&mut self) -> ShredResult<Readiness> {
        if self.built.is_some() {
            return Ok(Readiness::Ready);
        }
        if self.failure.is_some() {
            return Ok(Readiness::Failed);
        }

        let loaded = match self.pending.state() {
            LoadState::Pending => return Ok(Readiness::Loading),
            LoadState::Failed(msg) => {
                self.failure = Some(msg.to_string());
                return Ok(Readiness::Failed);
            }
            LoadState::Ready(p) => Arc::clone(p),
        };

        match self.build(loaded) {
            Ok(built) => {
                self.built = Some(built);
                Ok(Readiness::Ready)
            }
            Err(err) => {
                self.failure = Some(err.to_string());
                Err(err)
            }
        }
    }

    #[tracing::instrument(skip(self, loaded), fields(image = self.pending.label()))]
    fn build(&self, loaded: Arc<Pixmap>) -> ShredResult<Built> {
        let source = match self.target_width {
            Some(w) if w != loaded.width() => Arc::new(loaded.resize_to_width(w)?),
            _ => loaded,
        };
        if source.has_zero_area() {
            return Err(ShredError::invalid_geometry(format!(
                "image '{}' decoded to {}x{}",
                self.pending.label(),
                source.width(),
                source.height()
            )));
        }

        let sliced = self.orientation.prepare(&source);
        let strips = self.model.build(&sliced)?;
        tracing::info!(
            strips = strips.len(),
            orientation = ?self.orientation,
            parity = ?self.model.parity(),
            "strips built"
        );
        Ok(Built { source, strips })
    }

    pub fn readiness(&self) -> Readiness {
        if self.built.is_some() {
            Readiness::Ready
        } else if self.failure.is_some() {
            Readiness::Failed
        } else {
            Readiness::Loading
        }
    }

    pub fn is_ready(&self) -> bool {
        self.built.is_some()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Retained strips; empty until ready.
    pub fn strips(&self) -> &[Strip] {
        match &self.built {
            Some(built) => &built.strips,
            None => &[],
        }
    }

    pub fn try_strips(&self) -> ShredResult<&[Strip]> {
        self.ready_parts().map(|b| b.strips.as_slice())
    }

    /// Loaded image after resizing, before any transpose.
    pub fn source(&self) -> Option<&Arc<Pixmap>> {
        self.built.as_ref().map(|b| &b.source)
    }

    pub fn try_source(&self) -> ShredResult<&Arc<Pixmap>> {
        self.ready_parts().map(|b| &b.source)
    }

    fn ready_parts(&self) -> ShredResult<&Built> {
        if let Some(built) = &self.built {
            return Ok(built);
        }
        match &self.failure {
            Some(msg) => Err(ShredError::Other(anyhow::anyhow!(
                "image '{}' is unusable: {msg}",
                self.pending.label()
            ))),
            None => Err(ShredError::not_ready(format!(
                "strips of '{}' are not built yet",
                self.pending.label()
            ))),
        }
    }

    pub fn pending(&self) -> &PendingImage {
        &self.pending
    }

    pub fn model(&self) -> &StripModel {
        &self.model
    }

    pub fn strip_width(&self) -> u32 {
        self.model.strip_width()
    }

    pub fn parity(&self) -> Option<Parity> {
        self.model.parity()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn state(&self) -> SpatialState {
        self.state
    }

    pub fn set_state(&mut self, state: SpatialState) {
        self.state = state;
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.state.x = x;
        self.state.y = y;
    }

    pub fn set_spread(&mut self, spread: f64) {
        self.state.spread = spread;
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.state.opacity = opacity;
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        self.draw_with_state(surface, self.state);
    }

    /// Draws with a one-off placement, leaving the animated state untouched.
    pub fn draw_with_state<S: Surface + ?Sized>(&self, surface: &mut S, state: SpatialState) {
        let Some(built) = &self.built else {
            return;
        };
        surface.save();
        surface.set_global_alpha(surface.global_alpha() * state.opacity);
        self.orientation.render(
            surface,
            &self.model,
            &built.strips,
            state.origin(),
            state.spread,
        );
        surface.restore();
    }
}

impl Animatable for ShreddedImage {
    fn property(&self, prop: Property) -> Option<f64> {
        Some(match prop {
            Property::X => self.state.x,
            Property::Y => self.state.y,
            Property::Spread => self.state.spread,
            Property::Opacity => self.state.opacity,
        })
    }

    fn set_property(&mut self, prop: Property, value: f64) {
        match prop {
            Property::X => self.state.x = value,
            Property::Y => self.state.y = value,
            Property::Spread => self.state.spread = value,
            Property::Opacity => self.state.opacity = value,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/strips/shredded.rs"]
mod tests;
