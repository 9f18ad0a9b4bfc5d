//! DICOM record reading
//!
//! [`RecordReader`] is the seam between the pipeline and the record decoder.
//! [`DicomReader`] implements it on top of the `dicom` crates: it opens a
//! file, reports records without a pixel data element, validates the image
//! attributes and decodes the single grayscale frame into a
//! [`RawPixelArray`].

mod parser;
mod pixel_data;
mod validation;

pub use parser::{ErrorContext, ImageAttributes};

use anyhow::{Context, Result};
use dicom::dictionary_std::tags;
use dicom::object::{open_file, FileDicomObject, InMemDicomObject, StandardDataDictionary};
use log::debug;
use std::path::Path;

use crate::error::DecodeError;
use crate::pixel::RawPixelArray;

pub type DicomObject = FileDicomObject<InMemDicomObject<StandardDataDictionary>>;

/// Result of reading one record
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Pixels(RawPixelArray),
    /// The record is valid but carries no image (structured reports,
    /// RT structure sets, ...)
    NoPixelData,
}

/// Decodes a record into its raw pixel array
pub trait RecordReader: Sync {
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the record cannot be opened or its pixel
    /// data cannot be decoded
    fn read(&self, path: &Path) -> Result<ReadOutcome, DecodeError>;
}

/// Reads DICOM Part 10 files
#[derive(Debug, Clone, Copy, Default)]
pub struct DicomReader {
    apply_rescale: bool,
}

impl DicomReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map stored values through Rescale Slope/Intercept (e.g. to Hounsfield
    /// units) before handing them to the normalizer
    #[must_use]
    pub fn with_rescale(mut self, apply_rescale: bool) -> Self {
        self.apply_rescale = apply_rescale;
        self
    }

    fn read_record(&self, path: &Path) -> Result<ReadOutcome> {
        let obj = open_dicom_file(path)?;

        if obj.get(tags::PIXEL_DATA).is_none() {
            let context = ErrorContext::from(&obj);
            debug!(
                "{}: no pixel data element{}",
                path.display(),
                context.describe().map(|d| format!(" ({d})")).unwrap_or_default()
            );
            return Ok(ReadOutcome::NoPixelData);
        }

        let attributes = parser::extract_image_attributes(&obj)?;
        validation::validate_attributes(&attributes)?;

        let bytes = pixel_data::extract_pixel_bytes(&obj, &attributes.transfer_syntax_uid)?;
        let mut samples = pixel_data::interpret_samples(
            &bytes,
            attributes.bit_depth,
            attributes.is_signed(),
            attributes.dimensions.pixel_count(),
        )?;

        if self.apply_rescale && !attributes.rescale.is_identity() {
            samples = pixel_data::apply_rescale(&samples, attributes.rescale);
        }

        debug!(
            "{}: {} {} samples, {}, {}",
            path.display(),
            attributes.dimensions,
            samples.kind(),
            attributes.bit_depth,
            attributes.rescale
        );

        let array = RawPixelArray::new(attributes.dimensions, samples)
            .context("Pixel data does not match the image dimensions")?;

        Ok(ReadOutcome::Pixels(array))
    }
}

impl RecordReader for DicomReader {
    fn read(&self, path: &Path) -> Result<ReadOutcome, DecodeError> {
        self.read_record(path).map_err(|e| DecodeError::new(path, e))
    }
}

/// Open and parse a DICOM file
pub fn open_dicom_file(file_path: &Path) -> Result<DicomObject> {
    open_file(file_path).with_context(|| format!("Failed to open DICOM file: {}", file_path.display()))
}


#[cfg(test)]
mod tests {
    use super::fixtures::{write_report, CtSlice};
    use super::*;
    use crate::pixel::Samples;
    use assert_matches::assert_matches;

    #[test]
    fn test_reads_unsigned_slice() {
        let dir = tempfile::tempdir().unwrap();
        let path = CtSlice::unsigned(2, 2, vec![0, 50, 100, 200]).write(dir.path(), "a.dcm");

        let outcome = DicomReader::new().read(&path).unwrap();
        let ReadOutcome::Pixels(array) = outcome else {
            panic!("expected pixel data");
        };
        assert_eq!(array.dimensions(), crate::types::Dimensions::new(2, 2));
        assert_eq!(array.samples(), &Samples::U16(vec![0, 50, 100, 200]));
    }

    #[test]
    fn test_reads_big_endian_slice() {
        #[allow(deprecated)]
        use dicom::dictionary_std::uids::EXPLICIT_VR_BIG_ENDIAN;

        let dir = tempfile::tempdir().unwrap();
        let slice = CtSlice {
            transfer_syntax: EXPLICIT_VR_BIG_ENDIAN,
            ..CtSlice::unsigned(1, 3, vec![1, 256, 1000])
        };
        let path = slice.write(dir.path(), "big_endian.dcm");

        let ReadOutcome::Pixels(array) = DicomReader::new().read(&path).unwrap() else {
            panic!("expected pixel data");
        };
        assert_eq!(array.samples(), &Samples::U16(vec![1, 256, 1000]));
    }

    #[test]
    fn test_report_has_no_pixel_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), "report.dcm");

        let outcome = DicomReader::new().read(&path).unwrap();
        assert_eq!(outcome, ReadOutcome::NoPixelData);
    }

    #[test]
    fn test_signed_slice_with_rescale() {
        let dir = tempfile::tempdir().unwrap();
        let slice = CtSlice {
            signed: true,
            bits_stored: 12,
            rescale_intercept: Some("-1024"),
            ..CtSlice::unsigned(1, 3, vec![(-1000i16) as u16, 0, 1000])
        };
        let path = slice.write(dir.path(), "signed.dcm");

        let ReadOutcome::Pixels(stored) = DicomReader::new().read(&path).unwrap() else {
            panic!("expected pixel data");
        };
        assert_eq!(stored.samples(), &Samples::I16(vec![-1000, 0, 1000]));

        let ReadOutcome::Pixels(rescaled) = DicomReader::new().with_rescale(true).read(&path).unwrap() else {
            panic!("expected pixel data");
        };
        assert_eq!(rescaled.samples(), &Samples::F64(vec![-2024.0, -1024.0, -24.0]));
    }

    #[test]
    fn test_color_records_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let slice = CtSlice {
            photometric: "RGB",
            samples_per_pixel: 3,
            ..CtSlice::unsigned(1, 2, vec![1, 2, 3, 4, 5, 6])
        };
        let path = slice.write(dir.path(), "color.dcm");

        let err = DicomReader::new().read(&path).unwrap_err();
        assert_eq!(err.path, path);
        assert!(err.to_string().contains("RGB"));
    }

    #[test]
    fn test_non_dicom_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.dcm");
        std::fs::write(&path, b"plain text, not a DICOM file").unwrap();

        let result = DicomReader::new().read(&path);
        assert_matches!(result, Err(DecodeError { .. }));
    }
}
