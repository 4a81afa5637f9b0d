use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{ShredError, ShredResult};

/// Owned raster in premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixmap {
    /// Fully transparent pixmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height)],
        }
    }

    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> ShredResult<Self> {
        if data.len() != byte_len(width, height) {
            return Err(ShredError::validation(format!(
                "pixmap {width}x{height} expects {} bytes, got {}",
                byte_len(width, height),
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Premultiplies a straight-alpha `RgbaImage`.
    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let mut data = img.as_raw().clone();
        premultiply_rgba8_in_place(&mut data);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn has_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Copies a sub-rectangle; the region is clamped to the pixmap bounds.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Pixmap {
        let x0 = x.min(self.width);
        let y0 = y.min(self.height);
        let x1 = x.saturating_add(width).min(self.width);
        let y1 = y.saturating_add(height).min(self.height);
        let w = x1 - x0;
        let h = y1 - y0;

        let mut out = Pixmap::new(w, h);
        let row_bytes = w as usize * 4;
        for row in 0..h {
            let src = self.offset(x0, y0 + row);
            let dst = row as usize * row_bytes;
            out.data[dst..dst + row_bytes].copy_from_slice(&self.data[src..src + row_bytes]);
        }
        out
    }

    /// Reflects across the main diagonal: `out(x, y) = self(y, x)`.
    pub fn transpose(&self) -> Pixmap {
        let mut out = Pixmap::new(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set_pixel(y, x, self.pixel(x, y));
            }
        }
        out
    }

    /// Scales to `target_width`, keeping the aspect ratio.
    pub fn resize_to_width(&self, target_width: u32) -> ShredResult<Pixmap> {
        if target_width == 0 {
            return Err(ShredError::invalid_geometry("target width must be > 0"));
        }
        if self.has_zero_area() {
            return Err(ShredError::invalid_geometry(
                "cannot resize a zero-area image",
            ));
        }
        if target_width == self.width {
            return Ok(self.clone());
        }

        let scale = f64::from(target_width) / f64::from(self.width);
        let target_height = ((f64::from(self.height) * scale).round() as u32).max(1);

        // Filtering premultiplied samples keeps edges free of dark fringes.
        let buf = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .context("wrap pixmap as image buffer")?;
        let resized = image::imageops::resize(
            &buf,
            target_width,
            target_height,
            image::imageops::FilterType::Triangle,
        );
        Pixmap::from_premul_rgba8(target_width, target_height, resized.into_raw())
    }

    /// Straight-alpha copy for encoding.
    pub fn to_rgba_image(&self) -> ShredResult<image::RgbaImage> {
        let mut straight = self.data.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        let img = image::RgbaImage::from_raw(self.width, self.height, straight)
            .context("wrap pixmap as image buffer")?;
        Ok(img)
    }

    /// Converts to a `vello_cpu` pixmap for use as an image paint.
    pub fn to_cpu_pixmap(&self) -> ShredResult<vello_cpu::Pixmap> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| ShredError::validation("pixmap width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| ShredError::validation("pixmap height exceeds u16"))?;

        let mut may_have_opacities = false;
        let mut pixels = Vec::with_capacity(self.width as usize * self.height as usize);
        for px in self.data.chunks_exact(4) {
            let a = px[3];
            may_have_opacities |= a != 255;
            pixels.push(vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a,
            });
        }

        Ok(vello_cpu::Pixmap::from_parts_with_opacity(
            pixels,
            w,
            h,
            may_have_opacities,
        ))
    }

    pub fn save_png(&self, path: &Path) -> ShredResult<()> {
        let img = self.to_rgba_image()?;
        img.save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/pixmap.rs"]
mod tests;
