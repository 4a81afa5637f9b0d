/// Convenience result type used across shredfx.
pub type ShredResult<T> = Result<T, ShredError>;

/// Top-level error taxonomy used by the strip and animation APIs.
#[derive(thiserror::Error, Debug)]
pub enum ShredError {
    /// An asynchronous dependency (image decode) has not completed yet.
    #[error("not ready: {0}")]
    NotReady(String),

    /// Non-positive strip width or zero-area source image.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Keyframes of one track reference different targets or a different order.
    #[error("inconsistent keyframe targets: {0}")]
    InconsistentKeyframeTargets(String),

    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShredError {
    /// Build a [`ShredError::NotReady`] value.
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    /// Build a [`ShredError::InvalidGeometry`] value.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Build a [`ShredError::InconsistentKeyframeTargets`] value.
    pub fn inconsistent_targets(msg: impl Into<String>) -> Self {
        Self::InconsistentKeyframeTargets(msg.into())
    }

    /// Build a [`ShredError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ShredError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True for the transient "asset still loading" condition.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
