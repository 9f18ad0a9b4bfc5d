//! Domain-specific value types shared by the reader, normalizers and exporter

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub rows: u16,
    pub cols: u16,
}

impl Dimensions {
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    #[inline]
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        usize::from(self.rows) * usize::from(self.cols)
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.rows > 0 && self.cols > 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{cols}x{rows}", cols = self.cols, rows = self.rows)
    }
}

/// Rescale parameters for converting stored pixel values to real units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RescaleParams {
    pub slope: f64,
    pub intercept: f64,
}

impl RescaleParams {
    #[must_use]
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    #[must_use]
    pub const fn identity() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.slope == 1.0 && self.intercept == 0.0
    }

    #[inline(always)]
    #[must_use]
    // Hot path: called for every pixel when rescaling is enabled
    pub fn apply(&self, stored: f64) -> f64 {
        stored.mul_add(self.slope, self.intercept)
    }
}

impl Default for RescaleParams {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for RescaleParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slope={slope}, intercept={intercept}",
            slope = self.slope,
            intercept = self.intercept
        )
    }
}

/// Bit depth information for pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitDepth {
    pub allocated: u16,
    pub stored: u16,
}

impl BitDepth {
    #[must_use]
    pub fn new(allocated: u16, stored: u16) -> Self {
        Self { allocated, stored }
    }

    #[inline]
    #[must_use]
    pub fn bytes_per_pixel(&self) -> usize {
        usize::from(self.allocated / 8)
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self.allocated, 8 | 16 | 32) && self.stored > 0 && self.stored <= self.allocated
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{stored}/{allocated} bits",
            stored = self.stored,
            allocated = self.allocated
        )
    }
}

/// Caller-controlled intensity window.
///
/// Either bound may be left open, in which case the normalizer falls back to
/// the corresponding extremum of the array being normalized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntensityWindow {
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl IntensityWindow {
    #[must_use]
    pub fn new(low: Option<f64>, high: Option<f64>) -> Self {
        Self { low, high }
    }

    /// Window with both bounds taken from the array
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_bounds(low: Option<i32>, high: Option<i32>) -> Self {
        Self {
            low: low.map(f64::from),
            high: high.map(f64::from),
        }
    }

    /// Fill in missing bounds from the observed extrema of an array
    #[inline]
    #[must_use]
    pub fn resolve(&self, observed_min: f64, observed_max: f64) -> ResolvedWindow {
        ResolvedWindow {
            low: self.low.unwrap_or(observed_min),
            high: self.high.unwrap_or(observed_max),
        }
    }
}

impl fmt::Display for IntensityWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<f64>| b.map_or_else(|| "auto".to_string(), |v| v.to_string());
        write!(f, "[{}, {}]", bound(self.low), bound(self.high))
    }
}

/// Effective window after falling back to array extrema
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWindow {
    pub low: f64,
    pub high: f64,
}

impl ResolvedWindow {
    #[inline]
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    #[inline]
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.high < self.low
    }
}

impl fmt::Display for ResolvedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{low}, {high}]", low = self.low, high = self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dimensions_display_is_cols_by_rows() {
        let dims = Dimensions::new(3, 5);
        assert_eq!(dims.to_string(), "5x3");
        assert_eq!(dims.pixel_count(), 15);
        assert!(dims.is_valid());
        assert!(!Dimensions::new(0, 5).is_valid());
    }

    #[test]
    fn test_rescale_to_hounsfield() {
        let rescale = RescaleParams::new(1.0, -1024.0);
        assert_relative_eq!(rescale.apply(0.0), -1024.0);
        assert_relative_eq!(rescale.apply(1024.0), 0.0);
        assert!(!rescale.is_identity());
        assert!(RescaleParams::default().is_identity());
    }

    #[test]
    fn test_bit_depth_validity() {
        assert!(BitDepth::new(16, 12).is_valid());
        assert!(BitDepth::new(8, 8).is_valid());
        assert!(!BitDepth::new(16, 17).is_valid());
        assert!(!BitDepth::new(12, 12).is_valid());
        assert_eq!(BitDepth::new(32, 32).bytes_per_pixel(), 4);
    }

    #[test]
    fn test_window_caller_bounds_win() {
        let window = IntensityWindow::from_bounds(Some(-100), Some(300));
        let resolved = window.resolve(-1024.0, 3071.0);
        assert_relative_eq!(resolved.low, -100.0);
        assert_relative_eq!(resolved.high, 300.0);
        assert_relative_eq!(resolved.range(), 400.0);
    }

    #[test]
    fn test_window_partial_bounds_fall_back_independently() {
        let low_only = IntensityWindow::from_bounds(Some(40), None).resolve(0.0, 200.0);
        assert_relative_eq!(low_only.low, 40.0);
        assert_relative_eq!(low_only.high, 200.0);

        let high_only = IntensityWindow::from_bounds(None, Some(90)).resolve(10.0, 200.0);
        assert_relative_eq!(high_only.low, 10.0);
        assert_relative_eq!(high_only.high, 90.0);
    }

    #[test]
    fn test_window_display() {
        assert_eq!(IntensityWindow::open().to_string(), "[auto, auto]");
        assert_eq!(IntensityWindow::from_bounds(Some(-5), None).to_string(), "[-5, auto]");
        assert!(ResolvedWindow { low: 10.0, high: 5.0 }.is_inverted());
    }
}
