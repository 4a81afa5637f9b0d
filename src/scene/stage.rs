use std::collections::BTreeMap;

use crate::{
    animation::{
        chain::{ChainMode, ChainTick, ClockChain},
        clock::AnimationClock,
        keyframe::PropertyValues,
        transition::build_transition,
    },
    assets::{
        loader::{ImageSource, PendingImage},
        pixmap::Pixmap,
    },
    foundation::{
        core::Point,
        error::{ShredError, ShredResult},
    },
    render::{cpu::CpuSurface, surface::Surface},
    scene::config::SceneConfig,
    strips::{
        model::Strip,
        orientation::Orientation,
        registry::ShredRegistry,
        shredded::{ShreddedImage, SpatialState},
    },
};

/// Registry id of the vertically cut pair.
pub const VERTICAL_ID: &str = "vertical";

/// Spread at which an even/odd pair, offset by one strip, reads as one image.
const INTERLEAVED_SPREAD: f64 = 2.0;

/// The two-stage shred animation.
///
/// The image is cut into vertical strips whose odd half slides away from
/// the even half. Each half is then cut again into horizontal strips and split
/// the same way downwards, leaving four interleaved copies. Nothing is drawn
/// until every image, including the derived ones, has its strips.
#[derive(Debug)]
pub struct ShredScene {
    config: SceneConfig,
    registry: ShredRegistry,
    vertical: (String, String),
    horizontal: Vec<(String, String)>,
    chain: Option<ClockChain>,
    shown_stage: Option<usize>,
}

impl ShredScene {
    pub fn new(config: SceneConfig, pending: PendingImage) -> ShredResult<Self> {
        config.validate()?;
        let mut registry = ShredRegistry::new(config.strip_width)?
            .with_target_width(config.effective_target_width());
        let vertical = registry.create_pair(VERTICAL_ID, pending, Orientation::Vertical)?;

        let mut horizontal = Vec::with_capacity(2);
        for half in [&vertical.0, &vertical.1] {
            let id = format!("{half}_horizontal");
            registry.duplicate(half, id.clone(), Orientation::Horizontal)?;
            horizontal.push((format!("{id}_even"), format!("{id}_odd")));
        }

        Ok(Self {
            config,
            registry,
            vertical,
            horizontal,
            chain: None,
            shown_stage: None,
        })
    }

    /// Starts decoding `config.image` in the background.
    pub fn load(config: SceneConfig) -> ShredResult<Self> {
        let pending = PendingImage::spawn(ImageSource::Path(config.image.clone()));
        Self::new(config, pending)
    }

    /// Decodes `config.image` before returning; the scene is ready unless the load failed.
    pub fn load_blocking(config: SceneConfig) -> ShredResult<Self> {
        let pending = PendingImage::load_blocking(ImageSource::Path(config.image.clone()));
        Self::new(config, pending)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn registry(&self) -> &ShredRegistry {
        &self.registry
    }

    pub fn vertical_ids(&self) -> (&str, &str) {
        (&self.vertical.0, &self.vertical.1)
    }

    pub fn horizontal_ids(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.horizontal
            .iter()
            .map(|(even, odd)| (even.as_str(), odd.as_str()))
    }

    pub fn is_ready(&self) -> bool {
        self.registry.is_ready()
    }

    pub fn is_animating(&self) -> bool {
        self.chain.as_ref().is_some_and(|c| !c.is_finished())
    }

    pub fn is_finished(&self) -> bool {
        self.chain.as_ref().is_some_and(ClockChain::is_finished)
    }

    /// 0 while the vertical pair animates, 1 for the horizontal pairs.
    pub fn active_stage(&self) -> Option<usize> {
        self.chain.as_ref().map(ClockChain::active_index)
    }

    /// Why the source image is unusable, if it is.
    pub fn failure(&self) -> Option<&str> {
        self.registry
            .get(&self.vertical.0)
            .and_then(ShreddedImage::failure)
    }

    /// Polls loads, authors the animation once everything is ready, then
    /// advances it to `t_ms`.
    pub fn update(&mut self, t_ms: f64) -> Option<ChainTick> {
        if self.chain.is_none() {
            if !self.registry.poll() {
                return None;
            }
            match self.build_chain() {
                Ok(chain) => {
                    tracing::info!(clocks = chain.len(), "shred animation authored");
                    self.chain = Some(chain);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "could not author the shred animation");
                    return None;
                }
            }
        }

        let chain = self.chain.as_mut()?;
        let tick = chain.update(t_ms, &mut self.registry);
        let stage = chain.active_index();
        if self.shown_stage != Some(stage) {
            self.show_stage(stage);
        }
        tick
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        if self.chain.is_some() {
            self.registry.draw(surface);
        }
    }

    /// One frame: clear, update, draw.
    pub fn tick<S: Surface + ?Sized>(&mut self, t_ms: f64, surface: &mut S) -> Option<ChainTick> {
        surface.clear();
        let tick = self.update(t_ms);
        self.draw(surface);
        tick
    }

    /// Updates to `t_ms` and renders onto a fresh canvas filled with the background.
    pub fn render_frame(&mut self, t_ms: f64) -> Pixmap {
        let mut surface = CpuSurface::new(self.config.canvas);
        surface.fill(self.config.background());
        self.update(t_ms);
        self.draw(&mut surface);
        surface.into_pixmap()
    }

    fn build_chain(&mut self) -> ShredResult<ClockChain> {
        let strip = f64::from(self.config.strip_width);
        let gap = self.config.gap.round();
        let canvas = self.config.canvas;
        let (ve, vo) = self.vertical.clone();

        let source = self.image(&ve)?.try_source()?;
        let (w, h) = (f64::from(source.width()), f64::from(source.height()));
        let x0 = ((f64::from(canvas.width) - (w + gap)) / 2.0).max(0.0).round();
        let y0 = ((f64::from(canvas.height) - (h + gap)) / 2.0).max(0.0).round();

        let even_extent = compact_extent(self.image(&ve)?.strips());
        let settled = [
            Point::new(x0, y0),
            Point::new(x0 + even_extent + gap, y0),
        ];
        self.place(&ve, Point::new(x0, y0))?;
        self.place(&vo, Point::new(x0 + strip, y0))?;
        let vertical_track = build_transition(
            &self.animated_state(&[ve.as_str(), vo.as_str()])?,
            &BTreeMap::from([(vo.clone(), settled[1])]),
        )?;

        let mut finals = BTreeMap::new();
        let mut keys = Vec::with_capacity(4);
        for ((he, ho), origin) in self.horizontal.clone().into_iter().zip(settled) {
            let extent = compact_extent(self.image(&he)?.strips());
            self.place(&he, origin)?;
            self.place(&ho, Point::new(origin.x, origin.y + strip))?;
            finals.insert(ho.clone(), Point::new(origin.x, origin.y + extent + gap));
            keys.push(he);
            keys.push(ho);
        }
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let horizontal_track = build_transition(&self.animated_state(&keys)?, &finals)?;

        let mode = if self.config.looping {
            ChainMode::Loop
        } else {
            ChainMode::Once
        };
        let mut chain = ClockChain::new(mode);
        for track in [vertical_track, horizontal_track] {
            chain.push(AnimationClock::with_track(
                track,
                self.config.interval_ms,
                self.config.ease,
            )?);
        }
        Ok(chain)
    }

    /// Current state without opacity, which the scene drives itself.
    fn animated_state(&self, ids: &[&str]) -> ShredResult<Vec<(String, PropertyValues)>> {
        let mut state = self.registry.current_state(ids)?;
        for (_, values) in &mut state {
            values.opacity = None;
        }
        Ok(state)
    }

    fn place(&mut self, id: &str, origin: Point) -> ShredResult<()> {
        let image = self
            .registry
            .get_mut(id)
            .ok_or_else(|| missing(id))?;
        image.set_state(SpatialState::at(origin.x, origin.y).with_spread(INTERLEAVED_SPREAD));
        Ok(())
    }

    fn show_stage(&mut self, stage: usize) {
        let vertical = [&self.vertical.0, &self.vertical.1];
        let horizontal = self.horizontal.iter().flat_map(|(e, o)| [e, o]);
        let (on, off): (f64, f64) = if stage == 0 { (1.0, 0.0) } else { (0.0, 1.0) };

        for id in vertical {
            if let Some(image) = self.registry.get_mut(id) {
                image.set_opacity(on);
            }
        }
        for id in horizontal {
            if let Some(image) = self.registry.get_mut(id) {
                image.set_opacity(off);
            }
        }
        tracing::debug!(stage, "stage shown");
        self.shown_stage = Some(stage);
    }

    fn image(&self, id: &str) -> ShredResult<&ShreddedImage> {
        self.registry.get(id).ok_or_else(|| missing(id))
    }
}

/// Length covered by `strips` once they touch.
fn compact_extent(strips: &[Strip]) -> f64 {
    f64::from(strips.iter().map(Strip::width).sum::<u32>())
}

fn missing(id: &str) -> ShredError {
    ShredError::validation(format!("scene image '{id}' is missing"))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/stage.rs"]
mod tests;
