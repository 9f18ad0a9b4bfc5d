//! Intensity normalization to 8-bit display values
//!
//! Both normalizers widen samples to `f64`, map them onto `[0, 1]` and scale
//! to `[0, 255]`, rounding to nearest with ties away from zero. A degenerate
//! range (zero maximum, or a window whose bounds coincide) produces an
//! all-zero array instead of dividing by zero.

use std::fmt;

use crate::error::NormalizeError;
use crate::pixel::{NormalizedArray, RawPixelArray};
use crate::types::IntensityWindow;

/// Normalization policy applied to every record of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Scale by the array's own maximum, negatives treated as background
    Static,
    /// Clip to a window, then scale the window onto the full 8-bit range
    Dynamic(IntensityWindow),
}

impl Normalization {
    /// # Errors
    ///
    /// Returns [`NormalizeError::InvalidWindow`] if a dynamic window resolves
    /// to an upper bound below its lower bound
    pub fn apply(&self, raw: &RawPixelArray) -> Result<NormalizedArray, NormalizeError> {
        match self {
            Self::Static => Ok(normalize_static(raw)),
            Self::Dynamic(window) => normalize_dynamic(raw, window),
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Dynamic(window) => write!(f, "dynamic {window}"),
        }
    }
}

/// Rescale using the array's observed maximum.
///
/// Negative and NaN samples are clamped to zero. The largest finite sample
/// maps to 255, and `+inf` saturates there too.
#[must_use]
pub fn normalize_static(raw: &RawPixelArray) -> NormalizedArray {
    let dimensions = raw.dimensions();
    let values = raw.samples().to_f64();

    // The 0.0 seed clamps negatives out
    let max = values
        .iter()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |max, &v| max.max(v));
    if max <= 0.0 {
        return NormalizedArray::zeros(dimensions);
    }

    let data = values
        .iter()
        .map(|&v| scale_to_u8(v.max(0.0) / max))
        .collect();

    NormalizedArray::from_parts(dimensions, data)
}

/// Rescale using a caller-controlled window.
///
/// Open bounds fall back to the array's own minimum/maximum. Samples outside
/// the window are clipped to it. The caller's array is left untouched.
///
/// # Errors
///
/// Returns [`NormalizeError::InvalidWindow`] if the resolved upper bound is
/// below the resolved lower bound
pub fn normalize_dynamic(
    raw: &RawPixelArray,
    window: &IntensityWindow,
) -> Result<NormalizedArray, NormalizeError> {
    let dimensions = raw.dimensions();
    if raw.samples().is_empty() {
        return Ok(NormalizedArray::zeros(dimensions));
    }

    let values = raw.samples().to_f64();
    let (observed_min, observed_max) = find_min_max(&values).unwrap_or((0.0, 0.0));
    let resolved = window.resolve(observed_min, observed_max);

    if resolved.is_inverted() {
        return Err(NormalizeError::InvalidWindow {
            low: resolved.low,
            high: resolved.high,
        });
    }

    let range = resolved.range();
    if range.is_nan() || range <= 0.0 {
        return Ok(NormalizedArray::zeros(dimensions));
    }

    let (low, high) = (resolved.low, resolved.high);
    let data = values
        .iter()
        .map(|&v| {
            // max/min instead of clamp: NaN samples land on `low`
            let clipped = v.max(low).min(high);
            scale_to_u8((clipped - low) / range)
        })
        .collect();

    Ok(NormalizedArray::from_parts(dimensions, data))
}

/// Minimum and maximum of the finite samples, ignoring NaN and infinities.
/// `None` when there is nothing to compare.
#[inline]
#[must_use]
pub fn find_min_max(values: &[f64]) -> Option<(f64, f64)> {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &val| {
            (min.min(val), max.max(val))
        });

    (min <= max).then_some((min, max))
}

/// Map a `[0, 1]` value onto `[0, 255]`
#[inline(always)]
#[must_use]
fn scale_to_u8(unit: f64) -> u8 {
    // Saturating cast: NaN becomes 0, overshoot becomes 255
    (unit * 255.0_f64).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimensions;
    use assert_matches::assert_matches;

    fn raw(rows: u16, cols: u16, samples: Vec<i32>) -> RawPixelArray {
        RawPixelArray::new(Dimensions::new(rows, cols), samples).unwrap()
    }

    #[test]
    fn test_static_reference_example() {
        let out = normalize_static(&raw(2, 2, vec![0, 50, 100, 200]));
        assert_eq!(out.as_slice(), &[0, 64, 128, 255]);
        assert_eq!(out.dimensions(), Dimensions::new(2, 2));
    }

    #[test]
    fn test_static_maximum_maps_to_255() {
        let samples = vec![-300, 7, 1200, 13, 999, 0, 1100, 42, 5];
        let out = normalize_static(&raw(3, 3, samples));

        let full_scale = out.as_slice().iter().filter(|&&v| v == 255).count();
        assert_eq!(full_scale, 1);
        // Negative input is background
        assert_eq!(out.get(0, 0), Some(0));
    }

    #[test]
    fn test_static_all_zero_and_all_negative_are_zero() {
        let zeros = normalize_static(&raw(2, 2, vec![0, 0, 0, 0]));
        assert!(zeros.as_slice().iter().all(|&v| v == 0));

        let negative = normalize_static(&raw(2, 2, vec![-1, -50, -1024, -3]));
        assert!(negative.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_static_float_samples_with_nan() {
        let array = RawPixelArray::new(Dimensions::new(1, 4), vec![f32::NAN, 0.5, 1.0, -2.0]).unwrap();
        let out = normalize_static(&array);
        assert_eq!(out.as_slice(), &[0, 128, 255, 0]);
    }

    #[test]
    fn test_static_infinite_samples_do_not_set_the_maximum() {
        let array = RawPixelArray::new(Dimensions::new(1, 5), vec![f64::INFINITY, 0.0, 1.0, 2.0, f64::NEG_INFINITY])
            .unwrap();
        let out = normalize_static(&array);
        assert_eq!(out.as_slice(), &[255, 0, 128, 255, 0]);
    }

    #[test]
    fn test_dynamic_open_window_ignores_infinities() {
        let array = RawPixelArray::new(Dimensions::new(1, 5), vec![f64::NEG_INFINITY, 0.0, 1.0, 2.0, f64::INFINITY])
            .unwrap();
        let out = normalize_dynamic(&array, &IntensityWindow::open()).unwrap();
        assert_eq!(out.as_slice(), &[0, 0, 128, 255, 255]);
    }

    #[test]
    fn test_static_does_not_clip_upper_end() {
        let array = RawPixelArray::new(Dimensions::new(1, 3), vec![1000u16, 2000, 4095]).unwrap();
        let out = normalize_static(&array);
        assert_eq!(out.as_slice(), &[62, 125, 255]);
    }

    #[test]
    fn test_dynamic_reference_example() {
        let window = IntensityWindow::from_bounds(Some(50), Some(150));
        let out = normalize_dynamic(&raw(2, 2, vec![0, 50, 100, 200]), &window).unwrap();
        assert_eq!(out.as_slice(), &[0, 0, 128, 255]);
    }

    #[test]
    fn test_dynamic_window_bounds_and_monotonicity() {
        let samples: Vec<i32> = (-1100..=1100).step_by(10).collect();
        let cols = u16::try_from(samples.len()).unwrap();
        let array = raw(1, cols, samples.clone());
        let window = IntensityWindow::from_bounds(Some(-160), Some(240));

        let out = normalize_dynamic(&array, &window).unwrap();

        for (&input, &output) in samples.iter().zip(out.as_slice()) {
            if input <= -160 {
                assert_eq!(output, 0, "input {input} is below the window");
            }
            if input >= 240 {
                assert_eq!(output, 255, "input {input} is above the window");
            }
        }
        assert!(out.as_slice().windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_dynamic_caller_override_wins_over_extrema() {
        // With the array's own extrema this would map 100 to 128
        let window = IntensityWindow::from_bounds(Some(100), None);
        let out = normalize_dynamic(&raw(2, 2, vec![0, 50, 100, 200]), &window).unwrap();
        assert_eq!(out.as_slice(), &[0, 0, 0, 255]);

        let window = IntensityWindow::from_bounds(None, Some(100));
        let out = normalize_dynamic(&raw(2, 2, vec![0, 50, 100, 200]), &window).unwrap();
        assert_eq!(out.as_slice(), &[0, 128, 255, 255]);
    }

    #[test]
    fn test_dynamic_open_window_uses_extrema() {
        let out = normalize_dynamic(&raw(1, 3, vec![-1000, 0, 1000]), &IntensityWindow::open()).unwrap();
        assert_eq!(out.as_slice(), &[0, 128, 255]);
    }

    #[test]
    fn test_dynamic_degenerate_window_is_zero() {
        let window = IntensityWindow::from_bounds(Some(80), Some(80));
        let out = normalize_dynamic(&raw(2, 2, vec![0, 80, 100, 200]), &window).unwrap();
        assert!(out.as_slice().iter().all(|&v| v == 0));

        // Constant array with an open window collapses the same way
        let out = normalize_dynamic(&raw(2, 2, vec![7, 7, 7, 7]), &IntensityWindow::open()).unwrap();
        assert!(out.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_dynamic_inverted_window_is_rejected() {
        let window = IntensityWindow::from_bounds(Some(150), Some(50));
        let result = normalize_dynamic(&raw(2, 2, vec![0, 50, 100, 200]), &window);
        assert_matches!(result, Err(NormalizeError::InvalidWindow { low, high }) if low == 150.0 && high == 50.0);

        // A lower bound above the array maximum inverts the resolved window too
        let window = IntensityWindow::from_bounds(Some(500), None);
        let result = normalize_dynamic(&raw(2, 2, vec![0, 50, 100, 200]), &window);
        assert_matches!(result, Err(NormalizeError::InvalidWindow { .. }));
    }

    #[test]
    fn test_dynamic_leaves_input_untouched() {
        let array = raw(2, 2, vec![0, 50, 100, 200]);
        let before = array.clone();
        let window = IntensityWindow::from_bounds(Some(50), Some(150));
        let _ = normalize_dynamic(&array, &window).unwrap();
        assert_eq!(array, before);
    }

    #[test]
    fn test_empty_arrays() {
        let empty = RawPixelArray::new(Dimensions::new(0, 0), Vec::<u16>::new()).unwrap();
        assert!(normalize_static(&empty).as_slice().is_empty());
        let window = IntensityWindow::from_bounds(Some(10), Some(5));
        assert!(normalize_dynamic(&empty, &window).unwrap().as_slice().is_empty());
    }

    #[test]
    fn test_normalization_dispatch() {
        let array = raw(2, 2, vec![0, 50, 100, 200]);
        assert_eq!(Normalization::Static.apply(&array).unwrap().as_slice(), &[0, 64, 128, 255]);

        let dynamic = Normalization::Dynamic(IntensityWindow::from_bounds(Some(50), Some(150)));
        assert_eq!(dynamic.apply(&array).unwrap().as_slice(), &[0, 0, 128, 255]);
        assert_eq!(dynamic.to_string(), "dynamic [50, 150]");
    }

    #[test]
    fn test_find_min_max_ignores_nan() {
        assert_eq!(find_min_max(&[3.0, f64::NAN, -2.0, 8.0]), Some((-2.0, 8.0)));
        assert_eq!(find_min_max(&[f64::NAN]), None);
        assert_eq!(find_min_max(&[f64::INFINITY, 1.0, f64::NEG_INFINITY]), Some((1.0, 1.0)));
        assert_eq!(find_min_max(&[]), None);
    }
}
