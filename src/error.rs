//! Error types for record resolution, decoding, normalization and export

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Dimensions;

/// Errors raised while resolving the input path. These abort the run before
/// any record is processed.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Input path does not exist
    #[error("file or directory does not exist: {path}")]
    NotFound { path: PathBuf },

    /// Failed to enumerate a directory of records
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A record could not be opened or its pixel data could not be decoded
#[derive(Debug, Error)]
#[error("failed to decode {path}: {cause:#}")]
pub struct DecodeError {
    pub path: PathBuf,
    pub cause: anyhow::Error,
}

impl DecodeError {
    pub fn new(path: impl Into<PathBuf>, cause: anyhow::Error) -> Self {
        Self {
            path: path.into(),
            cause,
        }
    }
}

/// Sample buffer length does not match the declared dimensions
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{len} samples cannot fill a {dimensions} array")]
pub struct ShapeError {
    pub dimensions: Dimensions,
    pub len: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    /// The resolved window has its upper bound below its lower bound
    #[error("invalid intensity window: max {high} is below min {low}")]
    InvalidWindow { low: f64, high: f64 },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Failure of a single record. The batch continues past these.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
