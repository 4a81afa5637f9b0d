use std::{
    path::PathBuf,
    sync::{Arc, OnceLock},
};

use crate::{
    assets::{decode, pixmap::Pixmap},
    foundation::error::{ShredError, ShredResult},
};

/// Where the pixels of a shredded image come from.
#[derive(Clone, Debug)]
pub enum ImageSource {
    /// Encoded image file on disk.
    Path(PathBuf),
    /// Encoded image bytes (PNG, JPEG, ...).
    Encoded(Arc<Vec<u8>>),
    /// Already decoded premultiplied pixels.
    Pixels(Arc<Pixmap>),
}

impl ImageSource {
    fn label(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Encoded(bytes) => format!("<{} encoded bytes>", bytes.len()),
            Self::Pixels(p) => format!("<{}x{} pixels>", p.width(), p.height()),
        }
    }

    fn decode(&self) -> ShredResult<Arc<Pixmap>> {
        match self {
            Self::Path(p) => decode::decode_image_file(p).map(Arc::new),
            Self::Encoded(bytes) => decode::decode_image(bytes).map(Arc::new),
            Self::Pixels(p) => Ok(Arc::clone(p)),
        }
    }
}

type LoadOutcome = Result<Arc<Pixmap>, String>;

/// Observable state of a [`PendingImage`].
#[derive(Debug)]
pub enum LoadState<'a> {
    Pending,
    Ready(&'a Arc<Pixmap>),
    Failed(&'a str),
}

/// Completion signal for an image load.
///
/// Clones share one write-once cell: any number of listeners can poll or block
/// on the same load without interfering with each other, and the outcome is
/// published atomically.
#[derive(Clone, Debug)]
pub struct PendingImage {
    label: Arc<str>,
    cell: Arc<OnceLock<LoadOutcome>>,
}

/// Write side of an unresolved [`PendingImage`].
#[derive(Debug)]
pub struct Completer {
    label: Arc<str>,
    cell: Arc<OnceLock<LoadOutcome>>,
}

impl Completer {
    /// Publishes the outcome. A second completion of the same cell is ignored.
    pub fn complete(self, outcome: ShredResult<Pixmap>) {
        publish(&self.label, &self.cell, outcome.map(Arc::new));
    }
}

impl PendingImage {
    /// Already-loaded pixels.
    pub fn ready(pixmap: Pixmap) -> Self {
        let cell = OnceLock::new();
        let label = format!("<{}x{} pixels>", pixmap.width(), pixmap.height());
        let _ = cell.set(Ok(Arc::new(pixmap)));
        Self {
            label: label.into(),
            cell: Arc::new(cell),
        }
    }

    /// A load completed later by the host through the returned [`Completer`].
    pub fn unresolved(label: impl Into<String>) -> (Self, Completer) {
        let label: Arc<str> = label.into().into();
        let cell = Arc::new(OnceLock::new());
        (
            Self {
                label: Arc::clone(&label),
                cell: Arc::clone(&cell),
            },
            Completer { label, cell },
        )
    }

    /// Decodes on the calling thread.
    #[tracing::instrument(skip(source), fields(source = %source.label()))]
    pub fn load_blocking(source: ImageSource) -> Self {
        let (pending, completer) = Self::unresolved(source.label());
        publish(&completer.label, &completer.cell, source.decode());
        pending
    }

    /// Decodes on a worker thread; poll [`PendingImage::state`] from the frame loop.
    #[tracing::instrument(skip(source), fields(source = %source.label()))]
    pub fn spawn(source: ImageSource) -> Self {
        if let ImageSource::Pixels(p) = &source {
            let (pending, completer) = Self::unresolved(source.label());
            publish(&completer.label, &completer.cell, Ok(Arc::clone(p)));
            return pending;
        }

        let (pending, completer) = Self::unresolved(source.label());
        let spawned = std::thread::Builder::new()
            .name("shredfx-decode".to_string())
            .spawn(move || {
                let outcome = source.decode();
                publish(&completer.label, &completer.cell, outcome);
            });
        if let Err(err) = spawned {
            publish(
                &pending.label,
                &pending.cell,
                Err(ShredError::Other(anyhow::Error::new(err).context("spawn decode thread"))),
            );
        }
        pending
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> LoadState<'_> {
        match self.cell.get() {
            None => LoadState::Pending,
            Some(Ok(p)) => LoadState::Ready(p),
            Some(Err(msg)) => LoadState::Failed(msg),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state(), LoadState::Ready(_))
    }

    /// Ready or failed.
    pub fn is_settled(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Non-blocking access; `NotReady` while the load is in flight.
    pub fn try_get(&self) -> ShredResult<Arc<Pixmap>> {
        match self.state() {
            LoadState::Pending => Err(ShredError::not_ready(format!(
                "image '{}' is still loading",
                self.label
            ))),
            LoadState::Ready(p) => Ok(Arc::clone(p)),
            LoadState::Failed(msg) => Err(failed(&self.label, msg)),
        }
    }

    /// Blocks until the load settles.
    pub fn wait(&self) -> ShredResult<Arc<Pixmap>> {
        match self.cell.wait() {
            Ok(p) => Ok(Arc::clone(p)),
            Err(msg) => Err(failed(&self.label, msg)),
        }
    }
}

fn publish(label: &str, cell: &OnceLock<LoadOutcome>, outcome: ShredResult<Arc<Pixmap>>) {
    let outcome = match outcome {
        Ok(p) => {
            tracing::info!(image = label, width = p.width(), height = p.height(), "image loaded");
            Ok(p)
        }
        Err(err) => {
            let msg = format!("{err:#}");
            tracing::warn!(image = label, error = %msg, "image load failed");
            Err(msg)
        }
    };
    if cell.set(outcome).is_err() {
        tracing::debug!(image = label, "load already completed; ignoring second outcome");
    }
}

fn failed(label: &str, msg: &str) -> ShredError {
    ShredError::Other(anyhow::anyhow!("image '{label}' failed to load: {msg}"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
