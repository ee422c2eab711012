//! Error taxonomy for the bridge.
//!
//! Every failure a caller can observe falls into one of three classes:
//! a caller error (`InvalidArgument`), a transport-level error carrying the
//! platform code (`IoFailure`), or a sequencing violation that correct use
//! makes unreachable (`Internal`). No operation in this crate retries on its
//! own; recovering from any of these means re-initializing from scratch.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VtIoError {
    /// The mode selector text is not one of the recognized literals.
    #[error("unrecognized VT mode {0:?}")]
    InvalidArgument(String),

    /// A transport could not be opened, read, or written.
    #[error("transport I/O failure: {0}")]
    IoFailure(#[from] io::Error),

    /// A state that correct call sequencing should never reach.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl VtIoError {
    /// Platform error code behind an `IoFailure`, if the OS supplied one.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            VtIoError::IoFailure(err) => err.raw_os_error(),
            _ => None,
        }
    }
}

/// Outcome of a start request: running, or nothing configured to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    /// The bridge was configured and both agents are now running.
    Started,
    /// No bridge was configured; the call was a no-op.
    NotConfigured,
}

pub type Result<T> = std::result::Result<T, VtIoError>;
