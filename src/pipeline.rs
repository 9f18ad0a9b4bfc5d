//! Batch driver: read, normalize and export every record of a [`RecordSet`]
//!
//! Records are independent. A record without pixel data is skipped, and a
//! record that fails to decode, normalize or export is reported without
//! stopping the batch. The normalized arrays come back in input order.

use log::{error, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::dicom::{ReadOutcome, RecordReader};
use crate::error::{ExportError, RecordError, SourceError};
use crate::export::{ExportKind, Exporter, OutputFormat};
use crate::image::Normalization;
use crate::pixel::NormalizedArray;
use crate::source::{record_stem, RecordSet};

/// Settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub kind: ExportKind,
    pub normalization: Normalization,
    /// Process records on the rayon thread pool
    pub parallel: bool,
}

impl RunConfig {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, normalization: Normalization) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: OutputFormat::default(),
            kind: ExportKind::default(),
            normalization,
            parallel: false,
        }
    }

    #[must_use]
    pub fn exporter(&self) -> Exporter {
        Exporter::new(&self.output_dir, self.kind, self.format)
    }
}

#[derive(Debug)]
pub enum RecordStatus {
    Exported { artifact: PathBuf },
    /// The record has no pixel data
    Skipped,
    Failed(RecordError),
}

#[derive(Debug)]
pub struct RecordReport {
    pub path: PathBuf,
    pub status: RecordStatus,
    /// Position of this record's array in [`RunReport::normalized`]
    pub normalized_index: Option<usize>,
}

/// Outcome of a run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Normalized arrays of every record that got that far, in input order
    pub normalized: Vec<NormalizedArray>,
    /// One entry per input record, in input order
    pub records: Vec<RecordReport>,
}

impl RunReport {
    pub fn exported(&self) -> impl Iterator<Item = &Path> {
        self.records.iter().filter_map(|r| match &r.status {
            RecordStatus::Exported { artifact } => Some(artifact.as_path()),
            _ => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &Path> {
        self.records
            .iter()
            .filter(|r| matches!(r.status, RecordStatus::Skipped))
            .map(|r| r.path.as_path())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &RecordError)> {
        self.records.iter().filter_map(|r| match &r.status {
            RecordStatus::Failed(e) => Some((r.path.as_path(), e)),
            _ => None,
        })
    }

    /// Normalized arrays paired with the record they came from
    pub fn arrays(&self) -> impl Iterator<Item = (&Path, &NormalizedArray)> {
        self.records.iter().filter_map(|r| {
            r.normalized_index
                .and_then(|i| self.normalized.get(i))
                .map(|array| (r.path.as_path(), array))
        })
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

#[derive(Debug)]
pub struct Pipeline<R> {
    records: RecordSet,
    reader: R,
}

impl<R: RecordReader> Pipeline<R> {
    /// Resolve `path` into the record set this pipeline will process
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the path does not exist or cannot be listed
    pub fn new(path: impl AsRef<Path>, reader: R) -> Result<Self, SourceError> {
        Ok(Self::from_records(RecordSet::resolve(path)?, reader))
    }

    #[must_use]
    pub fn from_records(records: RecordSet, reader: R) -> Self {
        Self { records, reader }
    }

    #[must_use]
    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    /// Process every record and collect the results
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::CreateDir`] if the output directory cannot be
    /// created. Per-record failures are reported in the [`RunReport`].
    pub fn run(&self, config: &RunConfig) -> Result<RunReport, ExportError> {
        if !config.output_dir.exists() {
            info!(
                "Output directory {} does not exist, creating it",
                config.output_dir.display()
            );
        }
        std::fs::create_dir_all(&config.output_dir).map_err(|source| ExportError::CreateDir {
            path: config.output_dir.clone(),
            source,
        })?;

        info!(
            "Processing {} record(s) with {} normalization, {} {} export",
            self.records.len(),
            config.normalization,
            config.format,
            config.kind
        );

        let exporter = config.exporter();
        let process = |path: &PathBuf| self.process_record(path, config.normalization, &exporter);

        // Indexed collect keeps input order regardless of completion order
        let results: Vec<(Option<NormalizedArray>, RecordReport)> = if config.parallel {
            self.records.as_slice().par_iter().map(process).collect()
        } else {
            self.records.iter().map(process).collect()
        };

        let mut report = RunReport::default();
        for (array, mut record) in results {
            if let Some(array) = array {
                record.normalized_index = Some(report.normalized.len());
                report.normalized.push(array);
            }
            report.records.push(record);
        }

        info!(
            "Done: {} exported, {} skipped, {} failed",
            report.exported().count(),
            report.skipped().count(),
            report.failures().count()
        );

        Ok(report)
    }

    fn process_record(
        &self,
        path: &Path,
        normalization: Normalization,
        exporter: &Exporter,
    ) -> (Option<NormalizedArray>, RecordReport) {
        let raw = match self.reader.read(path) {
            Ok(ReadOutcome::Pixels(raw)) => raw,
            Ok(ReadOutcome::NoPixelData) => {
                warn!("{}: file has no pixel data, skipping", path.display());
                return (None, report(path, RecordStatus::Skipped));
            }
            Err(e) => return (None, failed(path, e.into())),
        };

        let normalized = match normalization.apply(&raw) {
            Ok(normalized) => normalized,
            Err(e) => return (None, failed(path, e.into())),
        };
        drop(raw);

        let status = match exporter.export(&normalized, &record_stem(path)) {
            Ok(artifact) => {
                info!("{} -> {}", path.display(), artifact.display());
                RecordStatus::Exported { artifact }
            }
            Err(e) => {
                error!("{}: {e}", path.display());
                RecordStatus::Failed(e.into())
            }
        };

        (Some(normalized), report(path, status))
    }
}

fn report(path: &Path, status: RecordStatus) -> RecordReport {
    RecordReport {
        path: path.to_path_buf(),
        status,
        normalized_index: None,
    }
}

fn failed(path: &Path, e: RecordError) -> RecordReport {
    error!("{}: {e}", path.display());
    report(path, RecordStatus::Failed(e))
}
