pub mod cli;
pub mod dicom;
pub mod error;
pub mod export;
pub mod image;
pub mod pipeline;
pub mod pixel;
pub mod source;
pub mod types;

// Re-export commonly used items
pub use error::{DecodeError, ExportError, NormalizeError, RecordError, SourceError};
pub use pipeline::{Pipeline, RunConfig, RunReport};
pub use pixel::{NormalizedArray, RawPixelArray};
