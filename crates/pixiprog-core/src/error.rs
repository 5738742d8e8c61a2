//! Error types for pixiprog-core
//!
//! Every error here is terminal: the loader never retries, because a retry
//! after a partial transfer would leave the FPGA in an undefined
//! configuration state. The operator re-runs the tool instead.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// INIT did not assert within the bounded poll window after the reset pulse
    #[error("device not ready: INIT did not go high after the PROG pulse")]
    HardwareNotReady,

    /// No candidate configuration file exists
    #[error("FPGA configuration file not found")]
    ConfigurationNotFound,

    /// Fewer bytes were read from the image file than its reported size
    #[error("short read from configuration file: expected {expected} bytes, got {got}")]
    ShortRead {
        /// File size reported by the filesystem
        expected: u64,
        /// Bytes actually read
        got: u64,
    },

    /// Memory for the image buffer could not be obtained
    #[error("memory allocation for configuration image failed")]
    Allocation,

    /// Control-line backend failure
    #[error("control line setup failed: {0}")]
    Port(String),

    /// Register transport failure
    #[error("register transfer failed: {0}")]
    Transport(String),

    /// Underlying I/O error while reading the image file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for this error.
    ///
    /// Allocation failure is distinguished (exit 2) so supervising scripts
    /// can tell it apart from hardware or file problems (exit 1).
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Allocation => 2,
            _ => 1,
        }
    }
}

/// Result type alias using the core error type
pub type Result<T> = std::result::Result<T, Error>;
