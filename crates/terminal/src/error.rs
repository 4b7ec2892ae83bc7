//! Unified error type for terminal operations.
//!
//! Each layer keeps its own error enum; [`TerminalError`] wraps them for
//! callers (the CLI) that only need to report what went wrong.

use thiserror::Error;

use tillpoint_core::CartError;

use crate::backend::{BackendError, SaleError};
use crate::config::ConfigError;
use crate::counters::CountersError;
use crate::storage::StorageError;

/// Error from any terminal operation.
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart rejected a change.
    #[error("{0}")]
    Cart(#[from] CartError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Sale failed: {0}")]
    Sale(#[from] SaleError),

    #[error("Counters error: {0}")]
    Counters(#[from] CountersError),

    /// Receipt template failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),
}

/// Result type alias for terminal operations.
pub type Result<T> = std::result::Result<T, TerminalError>;
