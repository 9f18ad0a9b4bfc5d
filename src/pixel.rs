//! In-memory pixel arrays
//!
//! [`RawPixelArray`] holds the stored samples of one record at their native
//! width. [`NormalizedArray`] is the 8-bit result of normalization and the
//! input of every exporter.

use crate::error::ShapeError;
use crate::types::Dimensions;
use image::GrayImage;

/// Typed, row-major sample buffer
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Samples {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widen every sample to `f64`. Lossless for all variants.
    #[must_use]
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Self::U8(v) => v.iter().map(|&s| f64::from(s)).collect(),
            Self::U16(v) => v.iter().map(|&s| f64::from(s)).collect(),
            Self::I16(v) => v.iter().map(|&s| f64::from(s)).collect(),
            Self::U32(v) => v.iter().map(|&s| f64::from(s)).collect(),
            Self::I32(v) => v.iter().map(|&s| f64::from(s)).collect(),
            Self::F32(v) => v.iter().map(|&s| f64::from(s)).collect(),
            Self::F64(v) => v.clone(),
        }
    }

    /// Short name of the sample type, for log output
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::I16(_) => "i16",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
        }
    }
}

macro_rules! impl_samples_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for Samples {
                fn from(values: Vec<$ty>) -> Self {
                    Self::$variant(values)
                }
            }
        )*
    };
}

impl_samples_from!(
    u8 => U8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    f32 => F32,
    f64 => F64,
);

/// 2-D array of raw intensity samples decoded from one record
#[derive(Debug, Clone, PartialEq)]
pub struct RawPixelArray {
    dimensions: Dimensions,
    samples: Samples,
}

impl RawPixelArray {
    /// # Errors
    ///
    /// Returns [`ShapeError`] if the sample count is not `rows * cols`
    pub fn new(dimensions: Dimensions, samples: impl Into<Samples>) -> Result<Self, ShapeError> {
        let samples = samples.into();
        if samples.len() != dimensions.pixel_count() {
            return Err(ShapeError {
                dimensions,
                len: samples.len(),
            });
        }
        Ok(Self { dimensions, samples })
    }

    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[inline]
    #[must_use]
    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    #[must_use]
    pub fn into_samples(self) -> Samples {
        self.samples
    }
}

/// 2-D array of 8-bit display values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedArray {
    dimensions: Dimensions,
    data: Vec<u8>,
}

impl NormalizedArray {
    /// # Errors
    ///
    /// Returns [`ShapeError`] if the sample count is not `rows * cols`
    pub fn new(dimensions: Dimensions, data: Vec<u8>) -> Result<Self, ShapeError> {
        if data.len() != dimensions.pixel_count() {
            return Err(ShapeError {
                dimensions,
                len: data.len(),
            });
        }
        Ok(Self { dimensions, data })
    }

    /// Caller guarantees one value per pixel
    pub(crate) fn from_parts(dimensions: Dimensions, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), dimensions.pixel_count());
        Self { dimensions, data }
    }

    #[must_use]
    pub fn zeros(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            data: vec![0; dimensions.pixel_count()],
        }
    }

    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[inline(always)]
    #[must_use]
    pub fn rows(&self) -> u16 {
        self.dimensions.rows
    }

    #[inline(always)]
    #[must_use]
    pub fn cols(&self) -> u16 {
        self.dimensions.cols
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    #[must_use]
    pub fn get(&self, row: u16, col: u16) -> Option<u8> {
        if row >= self.dimensions.rows || col >= self.dimensions.cols {
            return None;
        }
        let index = usize::from(row) * usize::from(self.dimensions.cols) + usize::from(col);
        self.data.get(index).copied()
    }

    /// Rows as slices, top to bottom
    pub fn row_slices(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks(usize::from(self.dimensions.cols).max(1))
    }

    /// Copy into a single-channel image buffer for encoding
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] if the buffer cannot back an image of this size
    pub fn to_gray_image(&self) -> Result<GrayImage, ShapeError> {
        GrayImage::from_raw(
            u32::from(self.dimensions.cols),
            u32::from(self.dimensions.rows),
            self.data.clone(),
        )
        .ok_or(ShapeError {
            dimensions: self.dimensions,
            len: self.data.len(),
        })
    }
}
