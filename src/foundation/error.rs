/// Crate-wide result alias.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors surfaced by `rasterbridge`.
///
/// Capability boundaries ("this backend does not handle that primitive") are not errors; the
/// drawing entry points report those through their `bool` return value instead.
#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    /// Invalid caller input (dimensions, buffer lengths, control point arrays).
    #[error("validation error: {0}")]
    Validation(String),

    /// A rendering backend could not be brought up.
    #[error("backend error: {0}")]
    Backend(String),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RasterError {
    /// Build a [`RasterError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RasterError::Backend`].
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build a [`RasterError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
