use crate::{
    assets::pixmap::Pixmap,
    foundation::{
        core::{Parity, Point},
        error::{ShredError, ShredResult},
    },
    render::surface::Surface,
};

/// One retained band of a column partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Strip {
    index: usize,
    source_offset: u32,
    pixels: Pixmap,
}

impl Strip {
    /// Position of this band in the full (unfiltered) partition.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Left edge of the band in the sliced image.
    pub fn source_offset(&self) -> u32 {
        self.source_offset
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &Pixmap {
        &self.pixels
    }
}

/// Column slicer: fixed-width vertical bands, optionally one parity only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StripModel {
    strip_width: u32,
    parity: Option<Parity>,
}

impl StripModel {
    pub fn new(strip_width: u32, parity: Option<Parity>) -> ShredResult<Self> {
        if strip_width == 0 {
            return Err(ShredError::invalid_geometry("strip width must be > 0"));
        }
        Ok(Self {
            strip_width,
            parity,
        })
    }

    pub fn strip_width(&self) -> u32 {
        self.strip_width
    }

    pub fn parity(&self) -> Option<Parity> {
        self.parity
    }

    /// Number of bands in the full partition of an image `width` pixels wide.
    pub fn partition_len(&self, width: u32) -> usize {
        width.div_ceil(self.strip_width) as usize
    }

    /// Slices `image` into bands of `strip_width`; the last band may be narrower.
    pub fn build(&self, image: &Pixmap) -> ShredResult<Vec<Strip>> {
        if image.has_zero_area() {
            return Err(ShredError::invalid_geometry(format!(
                "cannot slice a {}x{} image",
                image.width(),
                image.height()
            )));
        }

        let strips = (0..self.partition_len(image.width()))
            .filter(|&index| self.parity.is_none_or(|p| p.matches(index)))
            .map(|index| {
                let source_offset = index as u32 * self.strip_width;
                Strip {
                    index,
                    source_offset,
                    pixels: image.crop(source_offset, 0, self.strip_width, image.height()),
                }
            })
            .collect();
        Ok(strips)
    }

    /// Distance from the origin to the `position`-th retained strip.
    pub fn offset(&self, position: usize, spread: f64) -> f64 {
        f64::from(self.strip_width) * position as f64 * spread
    }

    /// Draws retained strip `i` at `origin.x + strip_width * i * spread`.
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        strips: &[Strip],
        origin: Point,
        spread: f64,
    ) {
        for (i, strip) in strips.iter().enumerate() {
            let dst = Point::new(origin.x + self.offset(i, spread), origin.y);
            surface.draw_image(&strip.pixels, dst);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/strips/model.rs"]
mod tests;
