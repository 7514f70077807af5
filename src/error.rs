use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core.
///
/// Per-step numeric degeneracies never surface here; they are recovered
/// locally by the kernel. Only construction and API misuse produce errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Physical parameter outside its domain (non-positive mass or radius,
    /// negative energy, non-finite vectors).
    #[error("domain error: {0}")]
    Domain(String),

    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Malformed configuration document.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Propagated I/O errors (configuration files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
