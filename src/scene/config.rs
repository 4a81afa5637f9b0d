use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    animation::ease::Ease,
    foundation::{
        core::{Canvas, Rgba8Premul},
        error::{ShredError, ShredResult},
    },
    strips::shredded::DEFAULT_STRIP_WIDTH,
};

/// Overrides `strip_width` of every loaded config when set to a positive integer.
pub const STRIP_WIDTH_ENV: &str = "SHREDFX_STRIP_WIDTH";

/// Share of the canvas width the image is scaled to when no target width is set.
pub const DEFAULT_WIDTH_SHARE: f64 = 0.2;

/// JSON description of a shred scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    /// Source image; relative paths resolve against the config file's directory.
    pub image: PathBuf,
    pub canvas: Canvas,
    #[serde(default = "default_strip_width")]
    pub strip_width: u32,
    #[serde(default)]
    pub target_width: Option<u32>,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: f64,
    #[serde(default = "default_ease")]
    pub ease: Ease,
    /// Gap between the halves once they have moved apart.
    #[serde(default = "default_gap")]
    pub gap: f64,
    /// Straight-alpha RGBA the canvas is filled with every frame.
    #[serde(default)]
    pub background: [u8; 4],
    /// Restart from the vertical stage after the horizontal one settles.
    #[serde(default)]
    pub looping: bool,
}

fn default_strip_width() -> u32 {
    DEFAULT_STRIP_WIDTH
}

fn default_interval_ms() -> f64 {
    2000.0
}

fn default_ease() -> Ease {
    Ease::InQuad
}

fn default_gap() -> f64 {
    24.0
}

impl SceneConfig {
    pub fn new(image: impl Into<PathBuf>, canvas: Canvas) -> Self {
        Self {
            image: image.into(),
            canvas,
            strip_width: default_strip_width(),
            target_width: None,
            interval_ms: default_interval_ms(),
            ease: default_ease(),
            gap: default_gap(),
            background: [0, 0, 0, 0],
            looping: false,
        }
    }

    /// Reads a config file, resolves `image` against its directory and
    /// applies the environment override.
    pub fn load(path: &Path) -> ShredResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let mut config: SceneConfig = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| ShredError::serde(format!("parse '{}': {e}", path.display())))?;

        if config.image.is_relative() {
            let root = path.parent().unwrap_or_else(|| Path::new("."));
            config.image = root.join(&config.image);
        }
        config.apply_env_override();
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> ShredResult<Self> {
        let config: SceneConfig =
            serde_json::from_str(json).map_err(|e| ShredError::serde(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_override(&mut self) {
        let raw = std::env::var(STRIP_WIDTH_ENV).ok();
        self.override_strip_width(raw.as_deref());
    }

    fn override_strip_width(&mut self, raw: Option<&str>) {
        let Some(width) = raw
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
        else {
            return;
        };
        tracing::debug!(width, "strip width overridden from environment");
        self.strip_width = width;
    }

    pub fn validate(&self) -> ShredResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ShredError::validation("canvas width/height must be > 0"));
        }
        if self.strip_width == 0 {
            return Err(ShredError::validation("strip_width must be > 0"));
        }
        if self.target_width == Some(0) {
            return Err(ShredError::validation("target_width must be > 0"));
        }
        if !self.interval_ms.is_finite() || self.interval_ms <= 0.0 {
            return Err(ShredError::validation("interval_ms must be > 0"));
        }
        if !self.gap.is_finite() || self.gap < 0.0 {
            return Err(ShredError::validation("gap must be finite and >= 0"));
        }
        Ok(())
    }

    /// Width the source image is scaled to before slicing.
    pub fn effective_target_width(&self) -> u32 {
        self.target_width.unwrap_or_else(|| {
            ((f64::from(self.canvas.width) * DEFAULT_WIDTH_SHARE).round() as u32).max(1)
        })
    }

    pub fn background(&self) -> Rgba8Premul {
        let [r, g, b, a] = self.background;
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
