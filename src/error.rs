//! # Error Module
//!
//! Unified error handling for the riffcarve crate.
//! Provides a central error type that wraps domain-specific errors.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::metadata::MetadataError;

/// Central error type for riffcarve operations.
#[derive(Debug, Error)]
pub enum RiffCarveError {
    /// Error decoding a stream's chunk tree
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error recording metadata
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using RiffCarveError
pub type Result<T> = std::result::Result<T, RiffCarveError>;
