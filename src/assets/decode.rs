use std::path::Path;

use anyhow::Context;

use crate::{assets::pixmap::Pixmap, foundation::error::ShredResult};

/// Decodes any format `image` understands into a premultiplied [`Pixmap`].
pub fn decode_image(bytes: &[u8]) -> ShredResult<Pixmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(Pixmap::from_rgba_image(&dyn_img.to_rgba8()))
}

pub fn decode_image_file(path: &Path) -> ShredResult<Pixmap> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
