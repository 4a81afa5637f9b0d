use crate::{
    assets::pixmap::Pixmap,
    foundation::core::{Point, Rect},
};

/// Integer source region of a [`Pixmap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn full(image: &Pixmap) -> Self {
        Self {
            x: 0,
            y: 0,
            width: image.width(),
            height: image.height(),
        }
    }

    /// Intersection with the bounds of `image`.
    pub fn clamp_to(self, image: &Pixmap) -> Self {
        let x = self.x.min(image.width());
        let y = self.y.min(image.height());
        Self {
            x,
            y,
            width: self.width.min(image.width() - x),
            height: self.height.min(image.height() - y),
        }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// 2D drawing surface consumed by shredded images.
///
/// Mirrors the canvas-style state model: a current transform and global alpha
/// that `save`/`restore` push and pop. Transform calls compose in local space.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Clears `rect` (in local coordinates) to transparent.
    fn clear_rect(&mut self, rect: Rect);

    /// Draws `src` of `image` with its top-left corner at `dst` (local coordinates).
    fn draw_image_region(&mut self, image: &Pixmap, src: PixelRect, dst: Point);

    fn save(&mut self);

    /// Pops the last saved state; unbalanced calls are ignored.
    fn restore(&mut self);

    fn set_global_alpha(&mut self, alpha: f64);

    fn global_alpha(&self) -> f64;

    fn rotate(&mut self, radians: f64);

    fn translate(&mut self, dx: f64, dy: f64);

    fn scale(&mut self, sx: f64, sy: f64);

    fn reset_transform(&mut self);

    fn draw_image(&mut self, image: &Pixmap, dst: Point) {
        self.draw_image_region(image, PixelRect::full(image), dst);
    }

    fn clear(&mut self) {
        self.save();
        self.reset_transform();
        let rect = Rect::new(0.0, 0.0, f64::from(self.width()), f64::from(self.height()));
        self.clear_rect(rect);
        self.restore();
    }
}
