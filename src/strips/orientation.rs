use std::f64::consts::FRAC_PI_2;

use crate::{
    assets::{loader::PendingImage, pixmap::Pixmap},
    foundation::{core::Point, error::ShredResult},
    render::surface::Surface,
    strips::model::{Strip, StripModel},
};

/// Direction of the bands a shredded image is cut into.
///
/// Both variants share the column slicer: horizontal bands are produced by
/// slicing the transposed image and undoing the transpose while drawing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl Orientation {
    /// Image handed to the column slicer.
    pub fn prepare(self, source: &Pixmap) -> Pixmap {
        match self {
            Self::Vertical => source.clone(),
            Self::Horizontal => source.transpose(),
        }
    }

    /// Like [`Orientation::prepare`], straight from a load; `NotReady` while it is in flight.
    pub fn prepare_pending(self, pending: &PendingImage) -> ShredResult<Pixmap> {
        let source = pending.try_get()?;
        Ok(self.prepare(&source))
    }

    /// Unit step from one strip origin to the next, in surface space.
    pub fn axis(self) -> (f64, f64) {
        match self {
            Self::Vertical => (1.0, 0.0),
            Self::Horizontal => (0.0, 1.0),
        }
    }

    pub fn render<S: Surface + ?Sized>(
        self,
        surface: &mut S,
        model: &StripModel,
        strips: &[Strip],
        origin: Point,
        spread: f64,
    ) {
        match self {
            Self::Vertical => model.render(surface, strips, origin, spread),
            Self::Horizontal => {
                // Quarter turn plus mirror maps local (u, v) to surface (v, u),
                // so strip columns land as rows below `origin`.
                surface.save();
                surface.rotate(FRAC_PI_2);
                surface.scale(1.0, -1.0);
                model.render(surface, strips, Point::new(origin.y, origin.x), spread);
                surface.restore();
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/strips/orientation.rs"]
mod tests;
