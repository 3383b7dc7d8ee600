//! Error types for the CLI

use thiserror::Error;
use young_gen::{ConfigError, InvariantViolation, LayoutError};

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O error
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A script line could not be parsed
    #[error("script line {line}: {message}")]
    Script {
        /// 1-based line number
        line: usize,
        /// What was wrong with it
        message: String,
    },

    /// The generation rejected an operation
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// `verify` found a broken invariant
    #[error("verification failed: {0}")]
    Verify(#[from] InvariantViolation),

    /// An allocation did not fit
    #[error("{target} cannot allocate {bytes} bytes")]
    OutOfSpace {
        /// Space the allocation was aimed at
        target: String,
        /// Requested size
        bytes: usize,
    },
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
