use anyhow::{Context, Result};
use dicom::core::dictionary::UidDictionary;
use dicom::dictionary_std::sop_class;
use dicom::dictionary_std::tags;

use super::DicomObject;
use crate::types::{BitDepth, Dimensions, RescaleParams};

/// Partial metadata for error message context
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub modality: Option<String>,
    pub sop_class: Option<String>,
}

impl ErrorContext {
    pub fn format_error(&self, tag_name: &str) -> String {
        match self.describe() {
            Some(description) => format!(
                "Missing or invalid {tag_name} tag - this may be a non-image DICOM file ({description})"
            ),
            None => format!("Missing or invalid {tag_name} tag"),
        }
    }

    /// "Modality: .., SOP Class: .." or `None` when nothing is known
    pub fn describe(&self) -> Option<String> {
        let mut parts = Vec::new();

        if let Some(modality) = &self.modality {
            parts.push(format!("Modality: {modality}"));
        }

        if let Some(sop_class) = &self.sop_class {
            parts.push(format!("SOP Class: {sop_class}"));
        }

        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

impl From<&DicomObject> for ErrorContext {
    fn from(obj: &DicomObject) -> Self {
        ErrorContext {
            modality: extract_string(obj, tags::MODALITY),
            sop_class: extract_sop_class(obj),
        }
    }
}

/// Image attributes needed to interpret the pixel data element
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttributes {
    pub dimensions: Dimensions,
    pub bit_depth: BitDepth,
    /// 0 = unsigned, 1 = two's complement
    pub pixel_representation: u16,
    pub samples_per_pixel: u16,
    pub number_of_frames: u32,
    pub photometric_interpretation: String,
    pub rescale: RescaleParams,
    pub transfer_syntax_uid: String,
}

impl ImageAttributes {
    #[inline]
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.pixel_representation == 1
    }
}

pub fn extract_image_attributes(obj: &DicomObject) -> Result<ImageAttributes> {
    let error_context = ErrorContext::from(obj);

    Ok(ImageAttributes {
        dimensions: extract_dimensions(obj, &error_context)?,
        bit_depth: extract_bit_depth(obj, &error_context)?,
        pixel_representation: extract_pixel_representation(obj),
        samples_per_pixel: extract_samples_per_pixel(obj),
        number_of_frames: extract_number_of_frames(obj),
        photometric_interpretation: extract_photometric_interpretation(obj),
        rescale: extract_rescale_params(obj),
        transfer_syntax_uid: extract_transfer_syntax_uid(obj),
    })
}

pub fn extract_dimensions(obj: &DicomObject, error_context: &ErrorContext) -> Result<Dimensions> {
    let rows = obj
        .get(tags::ROWS)
        .and_then(|e| e.to_int::<u16>().ok())
        .with_context(|| error_context.format_error("Rows"))?;

    let cols = obj
        .get(tags::COLUMNS)
        .and_then(|e| e.to_int::<u16>().ok())
        .with_context(|| error_context.format_error("Columns"))?;

    Ok(Dimensions::new(rows, cols))
}

pub fn extract_bit_depth(obj: &DicomObject, error_context: &ErrorContext) -> Result<BitDepth> {
    let allocated = obj
        .get(tags::BITS_ALLOCATED)
        .and_then(|e| e.to_int::<u16>().ok())
        .with_context(|| error_context.format_error("Bits Allocated"))?;

    // Bits Stored is mandatory, but some writers drop it for full-width data
    let stored = obj
        .get(tags::BITS_STORED)
        .and_then(|e| e.to_int::<u16>().ok())
        .unwrap_or(allocated);

    Ok(BitDepth::new(allocated, stored))
}

pub fn extract_rescale_params(obj: &DicomObject) -> RescaleParams {
    // Present mainly on CT/PET, where they map stored values to Hounsfield
    // units or activity
    let slope = obj
        .get(tags::RESCALE_SLOPE)
        .and_then(|e| e.to_float64().ok())
        .unwrap_or(1.0);

    let intercept = obj
        .get(tags::RESCALE_INTERCEPT)
        .and_then(|e| e.to_float64().ok())
        .unwrap_or(0.0);

    RescaleParams::new(slope, intercept)
}

#[inline]
pub fn extract_pixel_representation(obj: &DicomObject) -> u16 {
    obj.get(tags::PIXEL_REPRESENTATION)
        .and_then(|e| e.to_int::<u16>().ok())
        .unwrap_or(0)
}

#[inline]
pub fn extract_number_of_frames(obj: &DicomObject) -> u32 {
    obj.get(tags::NUMBER_OF_FRAMES)
        .and_then(|e| e.to_int::<u32>().ok())
        .unwrap_or(1)
}

#[inline]
pub fn extract_samples_per_pixel(obj: &DicomObject) -> u16 {
    obj.get(tags::SAMPLES_PER_PIXEL)
        .and_then(|e| e.to_int::<u16>().ok())
        .unwrap_or(1)
}

pub fn extract_photometric_interpretation(obj: &DicomObject) -> String {
    extract_string(obj, tags::PHOTOMETRIC_INTERPRETATION).unwrap_or_else(|| "MONOCHROME2".to_string())
}

pub fn extract_transfer_syntax_uid(obj: &DicomObject) -> String {
    obj.meta()
        .transfer_syntax()
        .trim_end_matches('\0')
        .to_string()
}

pub fn extract_sop_class(obj: &DicomObject) -> Option<String> {
    obj.get(tags::SOP_CLASS_UID)
        .and_then(|e| e.value().to_str().ok())
        .map(|uid| {
            let uid = uid.trim_end_matches('\0').trim();
            sop_class::StandardSopClassDictionary
                .by_uid(uid)
                .map_or_else(|| uid.to_string(), |entry| format!("{} ({uid})", entry.name))
        })
}

fn extract_string(obj: &DicomObject, tag: dicom::core::Tag) -> Option<String> {
    obj.get(tag)
        .and_then(|e| e.value().to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
