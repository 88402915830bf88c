//! Error types for the video texture bridge
//!
//! Every failure in this crate is frame-local: surface allocation errors,
//! device loss and unsupported backends are reported through this type and
//! logged, but never abort the process.

use std::fmt;

/// Result type for video texture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Video texture errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan, Direct3D11, Metal, OpenGL)
    BackendError(String),

    /// Out of host or device memory
    OutOfMemory,

    /// Invalid resource (surface, descriptor, handle)
    InvalidResource(String),

    /// Initialization failed (device context, render pass)
    InitializationFailed(String),

    /// The host's active graphics API has no surface backend
    UnsupportedBackend(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UnsupportedBackend(msg) => write!(f, "Unsupported backend: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
