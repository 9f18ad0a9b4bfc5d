//! Writing normalized arrays to disk
//!
//! Artifacts land in `<output_dir>/img/<stem>.<ext>` for raster exports and
//! `<output_dir>/plt/<stem>.<ext>` for plot exports.

use clap::ValueEnum;
use image::ImageFormat;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::image::{Colormap, Figure};
use crate::pixel::NormalizedArray;

/// Encoded file format of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
}

impl OutputFormat {
    #[inline]
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }

    #[inline]
    #[must_use]
    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpg => ImageFormat::Jpeg,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// What gets written for each record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportKind {
    /// The 8-bit array itself, one pixel per sample
    #[default]
    Raster,
    /// The array drawn into a figure through a grayscale colormap
    Plot,
}

impl ExportKind {
    #[must_use]
    pub fn from_plot_flag(plot: bool) -> Self {
        if plot { Self::Plot } else { Self::Raster }
    }

    #[inline]
    #[must_use]
    pub fn subdirectory(self) -> &'static str {
        match self {
            Self::Raster => "img",
            Self::Plot => "plt",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raster => write!(f, "raster"),
            Self::Plot => write!(f, "plot"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    kind: ExportKind,
    format: OutputFormat,
}

impl Exporter {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, kind: ExportKind, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            kind,
            format,
        }
    }

    /// Directory all artifacts of this exporter are written to
    #[must_use]
    pub fn target_dir(&self) -> PathBuf {
        self.output_dir.join(self.kind.subdirectory())
    }

    #[must_use]
    pub fn artifact_path(&self, stem: &str) -> PathBuf {
        self.target_dir()
            .join(format!("{stem}.{ext}", ext = self.format.extension()))
    }

    /// Write one artifact named after `stem` and return its path.
    ///
    /// The target directory and any missing parents are created on demand.
    /// Creation is idempotent, so concurrent exports may race on it safely.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be encoded or written
    pub fn export(&self, array: &NormalizedArray, stem: &str) -> Result<PathBuf, ExportError> {
        let dir = self.target_dir();
        std::fs::create_dir_all(&dir).map_err(|source| ExportError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let path = self.artifact_path(stem);
        match self.kind {
            ExportKind::Raster => self.write_raster(array, &path)?,
            ExportKind::Plot => self.write_plot(array, &path)?,
        }

        Ok(path)
    }

    fn write_raster(&self, array: &NormalizedArray, path: &Path) -> Result<(), ExportError> {
        let image = array.to_gray_image()?;
        image
            .save_with_format(path, self.format.image_format())
            .map_err(|source| ExportError::Encode {
                path: path.to_path_buf(),
                source,
            })
    }

    fn write_plot(&self, array: &NormalizedArray, path: &Path) -> Result<(), ExportError> {
        let mut figure = Figure::default();
        figure.imshow(array, Colormap::Gray)?;
        figure
            .save(path, self.format.image_format())
            .map_err(|source| ExportError::Encode {
                path: path.to_path_buf(),
                source,
            })
    }
}
