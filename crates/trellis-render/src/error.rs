use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The backend lacks an optional capability (e.g. offscreen targets).
    /// Callers are expected to degrade rather than abort the frame.
    #[error("not supported by this backend: {0}")]
    NotSupported(String),
    /// A texture target could not be created or resized.
    #[error("texture target failure: {0}")]
    Target(String),
    /// Backend-specific failure submitting or presenting a frame.
    #[error("backend failure: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
