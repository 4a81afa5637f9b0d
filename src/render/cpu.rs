use std::sync::Arc;

use crate::{
    assets::pixmap::Pixmap,
    foundation::{
        core::{Affine, Canvas, Point, Rect, Rgba8Premul},
        error::{ShredError, ShredResult},
    },
    render::{
        composite::over_in_place,
        surface::{PixelRect, Surface},
    },
};

/// Coefficients closer than this to an integer are taken as that integer.
const SNAP_EPS: f64 = 1e-9;

#[derive(Clone, Copy, Debug)]
struct DrawState {
    transform: Affine,
    alpha: f64,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
        }
    }
}

/// Premultiplied RGBA8 raster surface.
///
/// Each image draw is rasterized by `vello_cpu` into a patch covering its
/// device bounds with nearest-neighbour sampling, then composited source-over
/// at the current global alpha. Transforms with an integral linear part
/// (identity, quarter turns, mirrors) are snapped to whole device pixels, so
/// such draws copy source pixels exactly at any fractional position.
#[derive(Clone, Debug)]
pub struct CpuSurface {
    pixels: Pixmap,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl CpuSurface {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            pixels: Pixmap::new(canvas.width, canvas.height),
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }

    /// Overwrites every pixel, ignoring transform and alpha.
    pub fn fill(&mut self, color: Rgba8Premul) {
        let px = color.to_array();
        for chunk in self.pixels.data_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    pub fn transform(&self) -> Affine {
        self.state.transform
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixels
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixels
    }

    /// Device pixels covered by `local` under `transform`, clipped to the
    /// surface, or `None` when the transform is degenerate or nothing is left.
    fn device_patch(&self, transform: Affine, local: Rect) -> Option<PixelRect> {
        let det = transform.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            tracing::debug!(?transform, "skipping draw under degenerate transform");
            return None;
        }

        let bbox = transform.transform_rect_bbox(local);
        let w = f64::from(self.pixels.width());
        let h = f64::from(self.pixels.height());
        let x0 = bbox.x0.floor().clamp(0.0, w) as u32;
        let y0 = bbox.y0.floor().clamp(0.0, h) as u32;
        let x1 = bbox.x1.ceil().clamp(0.0, w) as u32;
        let y1 = bbox.y1.ceil().clamp(0.0, h) as u32;
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(PixelRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    fn render_image(
        &mut self,
        image: &Pixmap,
        src: PixelRect,
        transform: Affine,
        patch: PixelRect,
    ) -> ShredResult<()> {
        let source = if src == PixelRect::full(image) {
            image.to_cpu_pixmap()?
        } else {
            image.crop(src.x, src.y, src.width, src.height).to_cpu_pixmap()?
        };
        let w = u16_dim(patch.width, "patch width")?;
        let h = u16_dim(patch.height, "patch height")?;

        let to_patch = Affine::translate((-f64::from(patch.x), -f64::from(patch.y))) * transform;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(to_patch));
        ctx.set_paint(vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(source)),
            sampler: nearest_sampler(),
        });
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(src.width),
            f64::from(src.height),
        ));
        ctx.flush();

        let mut rendered = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut rendered);
        self.composite_patch(rendered.data_as_u8_slice(), patch)
    }

    fn composite_patch(&mut self, patch_px: &[u8], patch: PixelRect) -> ShredResult<()> {
        let alpha = self.state.alpha as f32;
        let stride = self.pixels.width() as usize * 4;
        let row_bytes = patch.width as usize * 4;
        let data = self.pixels.data_mut();
        for (row, src_row) in patch_px.chunks_exact(row_bytes).enumerate() {
            let start = (patch.y as usize + row) * stride + patch.x as usize * 4;
            over_in_place(&mut data[start..start + row_bytes], src_row, alpha)?;
        }
        Ok(())
    }
}

impl Surface for CpuSurface {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn clear_rect(&mut self, rect: Rect) {
        let transform = pixel_align(self.state.transform);
        let Some(patch) = self.device_patch(transform, rect) else {
            return;
        };
        let inv = transform.inverse();
        for py in patch.y..patch.y + patch.height {
            for px in patch.x..patch.x + patch.width {
                let p = inv * Point::new(f64::from(px) + 0.5, f64::from(py) + 0.5);
                if p.x >= rect.x0 && p.x < rect.x1 && p.y >= rect.y0 && p.y < rect.y1 {
                    self.pixels.set_pixel(px, py, [0, 0, 0, 0]);
                }
            }
        }
    }

    fn draw_image_region(&mut self, image: &Pixmap, src: PixelRect, dst: Point) {
        let src = src.clamp_to(image);
        if src.is_empty() || self.state.alpha <= 0.0 {
            return;
        }

        let transform = pixel_align(self.state.transform * Affine::translate(dst.to_vec2()));
        let local = Rect::new(0.0, 0.0, f64::from(src.width), f64::from(src.height));
        let Some(patch) = self.device_patch(transform, local) else {
            return;
        };
        if let Err(err) = self.render_image(image, src, transform, patch) {
            tracing::warn!(error = %err, "image draw skipped");
        }
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        if alpha.is_finite() {
            self.state.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn global_alpha(&self) -> f64 {
        self.state.alpha
    }

    fn rotate(&mut self, radians: f64) {
        self.state.transform = self.state.transform * Affine::rotate(radians);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform = self.state.transform * Affine::translate((dx, dy));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform = self.state.transform * Affine::scale_non_uniform(sx, sy);
    }

    fn reset_transform(&mut self) {
        self.state.transform = Affine::IDENTITY;
    }
}

/// Snaps an integral linear part (after float noise from `rotate`) and moves
/// the translation to the nearest whole pixel, halves rounding up.
/// Other transforms pass through unchanged.
fn pixel_align(t: Affine) -> Affine {
    let [a, b, c, d, e, f] = t.as_coeffs();
    let snap = |v: f64| {
        let r = v.round();
        ((v - r).abs() < SNAP_EPS).then_some(r)
    };
    match (snap(a), snap(b), snap(c), snap(d)) {
        (Some(a), Some(b), Some(c), Some(d)) => Affine::new([
            a,
            b,
            c,
            d,
            (e + 0.5 + SNAP_EPS).floor(),
            (f + 0.5 + SNAP_EPS).floor(),
        ]),
        _ => t,
    }
}

fn nearest_sampler() -> vello_cpu::peniko::ImageSampler {
    vello_cpu::peniko::ImageSampler {
        quality: vello_cpu::peniko::ImageQuality::Low,
        ..vello_cpu::peniko::ImageSampler::default()
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn u16_dim(v: u32, what: &str) -> ShredResult<u16> {
    v.try_into()
        .map_err(|_| ShredError::validation(format!("{what} {v} exceeds u16")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
