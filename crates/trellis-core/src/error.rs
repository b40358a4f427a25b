use thiserror::Error;

/// Core error taxonomy. Structural and programmer errors are reported
/// synchronously through these variants; cosmetic conditions (no-delta
/// `set_area`, z-order moves with ineligible siblings) are silent no-ops and
/// never produce an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Illegal attach/reparent (cycle, double-attach, self-parenting).
    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// Operation not valid in the current state (e.g. capturing input from a
    /// disabled element, starting a second drag).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Name or handle lookup miss where the element is required to exist.
    #[error("unknown element: {0}")]
    UnknownObject(String),

    /// Feature unavailable from the current backend capability.
    #[error("not supported: {0}")]
    NotSupported(String),
}

pub type Result<T> = std::result::Result<T, Error>;
