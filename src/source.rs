//! Resolving an input path to the records it names

use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// Extension of record files picked up from a directory
pub const RECORD_EXTENSION: &str = "dcm";

/// Ordered, immutable set of record paths
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordSet {
    records: Vec<PathBuf>,
}

impl RecordSet {
    /// Resolve `path` to its records.
    ///
    /// A file is taken as-is. A directory contributes every regular file
    /// directly inside it with a `.dcm` extension (any case), sorted by
    /// path. An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] if `path` does not exist, or
    /// [`SourceError::DirectoryRead`] if the directory cannot be listed
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SourceError::NotFound {
                path: path.to_path_buf(),
            });
        }

        if !path.is_dir() {
            return Ok(Self {
                records: vec![path.to_path_buf()],
            });
        }

        let read_error = |source| SourceError::DirectoryRead {
            path: path.to_path_buf(),
            source,
        };

        let mut records = Vec::new();
        for entry in std::fs::read_dir(path).map_err(read_error)? {
            let entry_path = entry.map_err(read_error)?.path();
            if entry_path.is_file() && is_record_file(&entry_path) {
                records.push(entry_path);
            }
        }
        records.sort();

        Ok(Self { records })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.records.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[inline]
fn is_record_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(RECORD_EXTENSION))
}

/// Base name used for a record's artifacts
#[must_use]
pub fn record_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "record".to_string(), |stem| stem.to_string_lossy().into_owned())
}
