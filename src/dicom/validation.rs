use anyhow::{bail, Result};

use super::parser::ImageAttributes;

#[inline]
pub fn validate_grayscale(photometric_interpretation: &str, samples_per_pixel: u16) -> Result<()> {
    let is_grayscale = matches!(photometric_interpretation, "MONOCHROME1" | "MONOCHROME2");

    if !is_grayscale || samples_per_pixel != 1 {
        bail!(
            "Unsupported photometric interpretation {photometric_interpretation} with {samples_per_pixel} samples per pixel (only single-channel grayscale is supported)"
        );
    }

    Ok(())
}

#[inline]
pub fn validate_single_frame(number_of_frames: u32) -> Result<()> {
    if number_of_frames != 1 {
        bail!("Multi-frame images are not supported ({number_of_frames} frames)");
    }

    Ok(())
}

pub fn validate_attributes(attributes: &ImageAttributes) -> Result<()> {
    if !attributes.dimensions.is_valid() {
        bail!("Invalid image dimensions: {}", attributes.dimensions);
    }

    if !attributes.bit_depth.is_valid() {
        bail!(
            "Unsupported bit depth: {} (expected 8, 16, or 32 bits allocated)",
            attributes.bit_depth
        );
    }

    validate_grayscale(&attributes.photometric_interpretation, attributes.samples_per_pixel)?;
    validate_single_frame(attributes.number_of_frames)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BitDepth, Dimensions, RescaleParams};

    fn ct_attributes() -> ImageAttributes {
        ImageAttributes {
            dimensions: Dimensions::new(512, 512),
            bit_depth: BitDepth::new(16, 12),
            pixel_representation: 1,
            samples_per_pixel: 1,
            number_of_frames: 1,
            photometric_interpretation: "MONOCHROME2".to_string(),
            rescale: RescaleParams::new(1.0, -1024.0),
            transfer_syntax_uid: "1.2.840.10008.1.2.1".to_string(),
        }
    }

    #[test]
    fn test_accepts_single_frame_grayscale() {
        assert!(validate_attributes(&ct_attributes()).is_ok());

        let inverted = ImageAttributes {
            photometric_interpretation: "MONOCHROME1".to_string(),
            ..ct_attributes()
        };
        assert!(validate_attributes(&inverted).is_ok());
    }

    #[test]
    fn test_rejects_color() {
        let rgb = ImageAttributes {
            photometric_interpretation: "RGB".to_string(),
            samples_per_pixel: 3,
            ..ct_attributes()
        };
        let err = validate_attributes(&rgb).unwrap_err();
        assert!(err.to_string().contains("RGB"));
    }

    #[test]
    fn test_rejects_multi_frame() {
        let volume = ImageAttributes {
            number_of_frames: 120,
            ..ct_attributes()
        };
        let err = validate_attributes(&volume).unwrap_err();
        assert!(err.to_string().contains("120 frames"));
    }

    #[test]
    fn test_rejects_bad_geometry_and_depth() {
        let empty = ImageAttributes {
            dimensions: Dimensions::new(0, 512),
            ..ct_attributes()
        };
        assert!(validate_attributes(&empty).is_err());

        let odd_depth = ImageAttributes {
            bit_depth: BitDepth::new(12, 12),
            ..ct_attributes()
        };
        assert!(validate_attributes(&odd_depth).is_err());
    }
}
