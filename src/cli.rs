use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

use crate::export::{ExportKind, OutputFormat};
use crate::image::Normalization;
use crate::pipeline::RunConfig;
use crate::types::IntensityWindow;

/// Convert DICOM pixel data to 8-bit PNG/JPEG images
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// DICOM file, or directory of .dcm files
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Directory to write img/ or plt/ into
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Image format of the written files
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Png)]
    pub format: OutputFormat,

    /// Render each image as a grayscale plot instead of a raw raster
    #[arg(short, long)]
    pub plot: bool,

    /// Process records in parallel
    #[arg(short = 'j', long)]
    pub parallel: bool,

    /// Apply Rescale Slope/Intercept before normalizing (e.g. Hounsfield units)
    #[arg(short, long)]
    pub rescale: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Scale each image by its own maximum intensity
    Static,
    /// Clip each image to an intensity window, then scale the window
    Dynamic {
        /// Lower window bound; defaults to the image minimum
        #[arg(long, allow_negative_numbers = true)]
        min: Option<i32>,

        /// Upper window bound; defaults to the image maximum
        #[arg(long, allow_negative_numbers = true)]
        max: Option<i32>,
    },
}

impl Args {
    /// Reject a window that can never be valid before touching any record
    ///
    /// # Errors
    ///
    /// Returns a message if both bounds are given and `max < min`
    pub fn validate(&self) -> Result<(), String> {
        if let Mode::Dynamic {
            min: Some(min),
            max: Some(max),
        } = self.mode
            && max < min
        {
            return Err(format!("--max ({max}) must not be below --min ({min})"));
        }
        Ok(())
    }

    #[must_use]
    pub fn normalization(&self) -> Normalization {
        match self.mode {
            Mode::Static => Normalization::Static,
            Mode::Dynamic { min, max } => Normalization::Dynamic(IntensityWindow::from_bounds(min, max)),
        }
    }

    #[must_use]
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            output_dir: self.output_dir.clone(),
            format: self.format,
            kind: ExportKind::from_plot_flag(self.plot),
            normalization: self.normalization(),
            parallel: self.parallel,
        }
    }

    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
