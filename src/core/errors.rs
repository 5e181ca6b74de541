//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cobmap operations.
///
/// Analysis itself never fails on malformed source; unmatched constructs
/// yield empty lists and zero counts. The only conditions surfaced upward
/// are read failures and configuration problems.
#[derive(Debug, Error)]
pub enum CobmapError {
    /// Reading source content failed (missing file, permissions, encoding)
    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CobmapError>;

/// Read a source file fully into memory, mapping I/O failures to the
/// single read-failure condition surfaced by the core.
pub fn read_source(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CobmapError::Read {
        path: path.to_path_buf(),
        source,
    })
}
