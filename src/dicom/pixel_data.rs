//! DICOM pixel data extraction
//!
//! Pixel bytes are pulled out of the object (decoding compressed transfer
//! syntaxes through `dicom-pixeldata`) and then interpreted as typed samples
//! according to the bit depth and pixel representation.

use anyhow::{bail, Context, Result};
use dicom::dictionary_std::tags;
use dicom::pixeldata::PixelDecoder;

use super::DicomObject;
use crate::pixel::Samples;
use crate::types::{BitDepth, RescaleParams};

/// Extract pixel data bytes, little-endian, one frame
pub fn extract_pixel_bytes(obj: &DicomObject, transfer_syntax_uid: &str) -> Result<Vec<u8>> {
    #[allow(deprecated)]
    use dicom::dictionary_std::uids::EXPLICIT_VR_BIG_ENDIAN;

    if transfer_syntax_uid == EXPLICIT_VR_BIG_ENDIAN {
        extract_native(obj)
    } else {
        extract_decoded(obj)
    }
}

/// Read the parsed element as is. The parser has already turned big-endian
/// words into native values, so no swapping is needed here.
fn extract_native(obj: &DicomObject) -> Result<Vec<u8>> {
    let pixel_data_obj = obj.get(tags::PIXEL_DATA).context("Missing pixel data")?;

    Ok(pixel_data_obj
        .to_bytes()
        .context("Failed to get raw pixel data bytes")?
        .to_vec())
}

/// Decode pixel data (handles compression)
fn extract_decoded(obj: &DicomObject) -> Result<Vec<u8>> {
    let decoded_pixel_data = obj
        .decode_pixel_data()
        .context("Failed to decode pixel data")?;

    // Raw stored values; the modality LUT is applied separately on request
    Ok(decoded_pixel_data.data().to_vec())
}

/// Interpret little-endian bytes as `pixel_count` typed samples.
///
/// Bits above `bit_depth.stored` are masked off for unsigned data and
/// replaced by the sign bit for signed data.
pub fn interpret_samples(bytes: &[u8], bit_depth: BitDepth, signed: bool, pixel_count: usize) -> Result<Samples> {
    let needed = pixel_count * bit_depth.bytes_per_pixel();
    if bytes.len() < needed {
        bail!(
            "Pixel data too short: {} bytes for {pixel_count} pixels at {bit_depth}",
            bytes.len()
        );
    }
    // Odd-length values carry a trailing pad byte
    let bytes = &bytes[..needed];
    let stored = u32::from(bit_depth.stored);

    let samples = match (bit_depth.allocated, signed) {
        (8, false) => Samples::U8(bytes.iter().map(|&b| b & mask_u8(stored)).collect()),
        (8, true) => Samples::I16(
            bytes
                .iter()
                .map(|&b| i16::from(sign_extend_i8(b as i8, stored)))
                .collect(),
        ),
        (16, false) => Samples::U16(
            bytes
                .chunks_exact(2)
                .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]) & mask_u16(stored))
                .collect(),
        ),
        (16, true) => Samples::I16(
            bytes
                .chunks_exact(2)
                .map(|chunk| sign_extend_i16(i16::from_le_bytes([chunk[0], chunk[1]]), stored))
                .collect(),
        ),
        (32, false) => Samples::U32(
            bytes
                .chunks_exact(4)
                .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) & mask_u32(stored))
                .collect(),
        ),
        (32, true) => Samples::I32(
            bytes
                .chunks_exact(4)
                .map(|chunk| sign_extend_i32(i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]), stored))
                .collect(),
        ),
        (allocated, _) => bail!("Unsupported bits allocated: {allocated}"),
    };

    Ok(samples)
}

/// Map stored values to real-world units
#[must_use]
pub fn apply_rescale(samples: &Samples, rescale: RescaleParams) -> Samples {
    Samples::F64(samples.to_f64().into_iter().map(|v| rescale.apply(v)).collect())
}

#[inline]
fn mask_u8(stored: u32) -> u8 {
    u8::MAX.checked_shr(8 - stored.min(8)).unwrap_or(0)
}

#[inline]
fn mask_u16(stored: u32) -> u16 {
    u16::MAX.checked_shr(16 - stored.min(16)).unwrap_or(0)
}

#[inline]
fn mask_u32(stored: u32) -> u32 {
    u32::MAX.checked_shr(32 - stored.min(32)).unwrap_or(0)
}

#[inline]
fn sign_extend_i8(value: i8, stored: u32) -> i8 {
    let shift = 8 - stored.min(8);
    value.wrapping_shl(shift).wrapping_shr(shift)
}

#[inline]
fn sign_extend_i16(value: i16, stored: u32) -> i16 {
    let shift = 16 - stored.min(16);
    value.wrapping_shl(shift).wrapping_shr(shift)
}

#[inline]
fn sign_extend_i32(value: i32, stored: u32) -> i32 {
    let shift = 32 - stored.min(32);
    value.wrapping_shl(shift).wrapping_shr(shift)
}
