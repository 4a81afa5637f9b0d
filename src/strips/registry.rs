use std::collections::BTreeMap;

use crate::{
    animation::keyframe::{Animatable, AnimationTargets, PropertyValues},
    assets::{loader::PendingImage, pixmap::Pixmap},
    foundation::{
        core::{Canvas, Parity, Point},
        error::{ShredError, ShredResult},
    },
    render::{cpu::CpuSurface, surface::Surface},
    strips::{
        orientation::Orientation,
        shredded::{Readiness, ShredOptions, ShreddedImage, SpatialState},
    },
};

/// Even/odd pair to be cut from a compact capture of another image once it loads.
#[derive(Clone, Debug)]
struct Derivation {
    source: String,
    id: String,
    orientation: Orientation,
}

/// Caller-owned set of shredded images keyed by string id.
///
/// Images draw in insertion order. Ids double as keyframe target keys, so the
/// registry is what clocks resolve their targets against.
#[derive(Clone, Debug)]
pub struct ShredRegistry {
    strip_width: u32,
    target_width: Option<u32>,
    images: BTreeMap<String, ShreddedImage>,
    order: Vec<String>,
    derivations: Vec<Derivation>,
}

impl ShredRegistry {
    pub fn new(strip_width: u32) -> ShredResult<Self> {
        if strip_width == 0 {
            return Err(ShredError::invalid_geometry("strip width must be > 0"));
        }
        Ok(Self {
            strip_width,
            target_width: None,
            images: BTreeMap::new(),
            order: Vec::new(),
            derivations: Vec::new(),
        })
    }

    /// Resize every image created through [`ShredRegistry::create_pair`] to this width.
    pub fn with_target_width(mut self, target_width: u32) -> Self {
        self.target_width = Some(target_width);
        self
    }

    pub fn strip_width(&self) -> u32 {
        self.strip_width
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.images.contains_key(id)
    }

    /// Ids in insertion (draw) order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&ShreddedImage> {
        self.images.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ShreddedImage> {
        self.images.get_mut(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, image: ShreddedImage) -> ShredResult<()> {
        let id = id.into();
        if self.images.contains_key(&id) || self.derivations.iter().any(|d| d.claims(&id)) {
            return Err(ShredError::validation(format!("image id '{id}' is already taken")));
        }
        self.images.insert(id.clone(), image);
        self.order.push(id);
        Ok(())
    }

    pub fn create(
        &mut self,
        id: impl Into<String>,
        pending: PendingImage,
        options: ShredOptions,
    ) -> ShredResult<&mut ShreddedImage> {
        let id = id.into();
        let image = ShreddedImage::new(pending, options)?;
        self.insert(id.clone(), image)?;
        self.image_mut(&id)
    }

    /// Creates `<id>_even` and `<id>_odd` from one load, sharing `orientation`.
    pub fn create_pair(
        &mut self,
        id: &str,
        pending: PendingImage,
        orientation: Orientation,
    ) -> ShredResult<(String, String)> {
        let even = format!("{id}{}", Parity::Even.suffix());
        let odd = format!("{id}{}", Parity::Odd.suffix());
        for key in [&even, &odd] {
            if self.images.contains_key(key) {
                return Err(ShredError::validation(format!("image id '{key}' is already taken")));
            }
        }

        let base = ShredOptions {
            strip_width: self.strip_width,
            orientation,
            target_width: self.target_width,
            ..ShredOptions::default()
        };
        // Build both before inserting either so a failure leaves no half pair behind.
        let even_img = ShreddedImage::new(pending.clone(), base.with_parity(Parity::Even))?;
        let odd_img = ShreddedImage::new(pending, base.with_parity(Parity::Odd))?;
        self.insert(even.clone(), even_img)?;
        self.insert(odd.clone(), odd_img)?;
        tracing::debug!(even = %even, odd = %odd, ?orientation, "created shredded pair");
        Ok((even, odd))
    }

    /// Creates a pair cut from a compact capture of `source`.
    ///
    /// If `source` is still loading the pair is queued and materializes in a
    /// later [`ShredRegistry::poll`].
    pub fn duplicate(
        &mut self,
        source: &str,
        id: impl Into<String>,
        orientation: Orientation,
    ) -> ShredResult<()> {
        let derivation = Derivation {
            source: source.to_string(),
            id: id.into(),
            orientation,
        };
        let image = self.images.get(source).ok_or_else(|| unknown(source))?;
        if let Some(reason) = image.failure() {
            return Err(ShredError::Other(anyhow::anyhow!(
                "cannot duplicate '{source}': {reason}"
            )));
        }
        let ready = image.is_ready();
        if self.images.keys().any(|k| derivation.claims(k))
            || self.derivations.iter().any(|d| d.id == derivation.id)
        {
            return Err(ShredError::validation(format!(
                "pair id '{}' is already taken",
                derivation.id
            )));
        }

        if ready {
            self.materialize(&derivation)
        } else {
            tracing::debug!(source, id = %derivation.id, "source loading; duplicate queued");
            self.derivations.push(derivation);
            Ok(())
        }
    }

    #[tracing::instrument(skip(self, derivation), fields(source = %derivation.source, id = %derivation.id))]
    fn materialize(&mut self, derivation: &Derivation) -> ShredResult<()> {
        let capture = self.capture_compact(&derivation.source)?;
        self.create_pair(
            &derivation.id,
            PendingImage::ready(capture),
            derivation.orientation,
        )?;
        tracing::info!("derived pair materialized");
        Ok(())
    }

    /// True once every image has strips and no derivation is outstanding.
    pub fn is_ready(&self) -> bool {
        self.derivations.is_empty() && self.images.values().all(ShreddedImage::is_ready)
    }

    /// Advances loads and queued derivations; returns [`ShredRegistry::is_ready`].
    ///
    /// Errors are logged per image rather than returned: one bad source must
    /// not stall the frame loop.
    pub fn poll(&mut self) -> bool {
        for id in &self.order {
            let Some(image) = self.images.get_mut(id) else {
                continue;
            };
            if let Err(err) = image.poll() {
                tracing::warn!(id = %id, error = %err, "shredded image unusable");
            }
        }

        let queued = std::mem::take(&mut self.derivations);
        for derivation in queued {
            let readiness = self.images.get(&derivation.source).map(ShreddedImage::readiness);
            match readiness {
                Some(Readiness::Loading) => self.derivations.push(derivation),
                Some(Readiness::Ready) => {
                    if let Err(err) = self.materialize(&derivation) {
                        tracing::warn!(
                            source = %derivation.source,
                            id = %derivation.id,
                            error = %err,
                            "dropping derivation"
                        );
                    }
                }
                Some(Readiness::Failed) | None => tracing::warn!(
                    source = %derivation.source,
                    id = %derivation.id,
                    "source unusable; dropping derivation"
                ),
            }
        }
        self.is_ready()
    }

    /// Draws every ready image in insertion order.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        for id in &self.order {
            if let Some(image) = self.images.get(id) {
                image.draw(surface);
            }
        }
    }

    /// Renders `id` with touching strips at the origin, fully opaque, on a
    /// canvas the size of its source.
    pub fn capture_compact(&self, id: &str) -> ShredResult<Pixmap> {
        let image = self.images.get(id).ok_or_else(|| unknown(id))?;
        let source = image.try_source()?;
        let mut surface = CpuSurface::new(Canvas::new(source.width(), source.height())?);
        image.draw_with_state(&mut surface, SpatialState::default());
        Ok(surface.into_pixmap())
    }

    /// Interleaves an even and an odd half back into one image.
    pub fn capture_combined(&self, even: &str, odd: &str) -> ShredResult<Pixmap> {
        let even_img = self.images.get(even).ok_or_else(|| unknown(even))?;
        let odd_img = self.images.get(odd).ok_or_else(|| unknown(odd))?;
        if even_img.parity() != Some(Parity::Even) || odd_img.parity() != Some(Parity::Odd) {
            return Err(ShredError::validation(format!(
                "'{even}' and '{odd}' are not an even/odd pair"
            )));
        }
        if even_img.orientation() != odd_img.orientation()
            || even_img.strip_width() != odd_img.strip_width()
        {
            return Err(ShredError::validation(format!(
                "'{even}' and '{odd}' were cut differently"
            )));
        }

        let source = even_img.try_source()?;
        odd_img.try_source()?;
        let mut surface = CpuSurface::new(Canvas::new(source.width(), source.height())?);
        let step = f64::from(even_img.strip_width());
        let (ax, ay) = even_img.orientation().axis();
        let interleaved = SpatialState::default().with_spread(2.0);
        even_img.draw_with_state(&mut surface, interleaved);
        odd_img.draw_with_state(
            &mut surface,
            SpatialState {
                x: ax * step,
                y: ay * step,
                ..interleaved
            },
        );
        Ok(surface.into_pixmap())
    }

    /// Present state of `ids`, in that order, for authoring transitions.
    pub fn current_state(&self, ids: &[&str]) -> ShredResult<Vec<(String, PropertyValues)>> {
        ids.iter()
            .map(|&id| {
                let image = self.images.get(id).ok_or_else(|| unknown(id))?;
                Ok((id.to_string(), PropertyValues::capture(image)))
            })
            .collect()
    }

    /// Settled origin of an image, if known.
    pub fn origin(&self, id: &str) -> Option<Point> {
        self.images.get(id).map(|image| image.state().origin())
    }

    fn image_mut(&mut self, id: &str) -> ShredResult<&mut ShreddedImage> {
        self.images.get_mut(id).ok_or_else(|| unknown(id))
    }
}

impl Derivation {
    fn claims(&self, key: &str) -> bool {
        [Parity::Even, Parity::Odd]
            .iter()
            .any(|p| key == format!("{}{}", self.id, p.suffix()))
    }
}

impl AnimationTargets for ShredRegistry {
    fn target_mut(&mut self, key: &str) -> Option<&mut dyn Animatable> {
        self.images
            .get_mut(key)
            .map(|image| image as &mut dyn Animatable)
    }
}

fn unknown(id: &str) -> ShredError {
    ShredError::validation(format!("no shredded image with id '{id}'"))
}

#[cfg(test)]
#[path = "../../tests/unit/strips/registry.rs"]
mod tests;
