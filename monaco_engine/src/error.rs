//! Error types for the Monaco engine
//!
//! Every fallible engine operation returns [`Result`]. Failures are logged
//! where they are created (see the `engine_err!` / `engine_bail!` macros), so
//! callers only decide whether a failure is fatal for them.

use std::fmt;

/// Result type for Monaco engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Monaco engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Native graphics API error (Vulkan, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// GPU object creation failed or a resource was misused
    InvalidResource(String),

    /// Initialization failed (device, swap chain, application)
    InitializationFailed(String),

    /// Null handle, empty name, zero dimension or any other rejected input
    InvalidArgument(String),

    /// Asset file missing or unreadable
    AssetNotFound(String),

    /// Asset file read but its content could not be parsed
    ParseFailed(String),

    /// Feature or format not supported by this build
    Unsupported(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::AssetNotFound(msg) => write!(f, "Asset not found: {}", msg),
            Error::ParseFailed(msg) => write!(f, "Parse failed: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
