//! Figure rendering for plot exports
//!
//! A [`Figure`] is a white canvas with a single axes box, in the proportions
//! of a default matplotlib figure. [`Figure::imshow`] draws an 8-bit array
//! through a [`Colormap`] into that box. Each export owns its own figure, so
//! nothing is shared between concurrent exports.

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageResult, Rgb, RgbImage};
use std::path::Path;

use crate::error::ShapeError;
use crate::pixel::NormalizedArray;

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

// Axes box as fractions of the canvas, bottom-left origin
const AXES_LEFT: f64 = 0.125;
const AXES_RIGHT: f64 = 0.9;
const AXES_BOTTOM: f64 = 0.11;
const AXES_TOP: f64 = 0.88;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const SPINE: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    /// Black at the data minimum, white at the data maximum
    #[default]
    Gray,
}

impl Colormap {
    /// Map `value` within `[vmin, vmax]` to a color
    #[inline]
    #[must_use]
    pub fn map(self, value: u8, vmin: u8, vmax: u8) -> Rgb<u8> {
        match self {
            Self::Gray => {
                let level = if vmax > vmin {
                    let unit = f64::from(value.saturating_sub(vmin)) / f64::from(vmax - vmin);
                    (unit.min(1.0) * 255.0).round() as u8
                } else {
                    0
                };
                Rgb([level, level, level])
            }
        }
    }
}

/// Pixel rectangle on the canvas, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub struct Figure {
    canvas: RgbImage,
}

impl Figure {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbImage::from_pixel(width, height, BACKGROUND),
        }
    }

    /// Axes box in canvas pixels
    #[must_use]
    pub fn axes(&self) -> Rect {
        let (w, h) = (f64::from(self.canvas.width()), f64::from(self.canvas.height()));
        let left = (w * AXES_LEFT).round() as u32;
        let right = (w * AXES_RIGHT).round() as u32;
        let top = (h * (1.0 - AXES_TOP)).round() as u32;
        let bottom = (h * (1.0 - AXES_BOTTOM)).round() as u32;

        Rect {
            x: left,
            y: top,
            width: right.saturating_sub(left),
            height: bottom.saturating_sub(top),
        }
    }

    /// Draw `array` into the axes box, keeping square pixels.
    ///
    /// The colormap is scaled to the array's own minimum and maximum.
    /// Returns the rectangle the image occupies.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] if the array cannot be viewed as an image
    pub fn imshow(&mut self, array: &NormalizedArray, colormap: Colormap) -> Result<Rect, ShapeError> {
        let source = array.to_gray_image()?;
        let placement = fit_into(self.axes(), source.width(), source.height());
        if placement.width == 0 || placement.height == 0 {
            return Ok(placement);
        }

        let (vmin, vmax) = array
            .as_slice()
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        let scaled: GrayImage = imageops::resize(&source, placement.width, placement.height, FilterType::Nearest);
        let colored = RgbImage::from_fn(placement.width, placement.height, |x, y| {
            colormap.map(scaled.get_pixel(x, y).0[0], vmin, vmax)
        });

        imageops::replace(&mut self.canvas, &colored, i64::from(placement.x), i64::from(placement.y));
        self.draw_frame(placement);

        Ok(placement)
    }

    fn draw_frame(&mut self, rect: Rect) {
        let left = rect.x.saturating_sub(1);
        let top = rect.y.saturating_sub(1);
        let right = (rect.x + rect.width).min(self.canvas.width() - 1);
        let bottom = (rect.y + rect.height).min(self.canvas.height() - 1);

        for x in left..=right {
            self.canvas.put_pixel(x, top, SPINE);
            self.canvas.put_pixel(x, bottom, SPINE);
        }
        for y in top..=bottom {
            self.canvas.put_pixel(left, y, SPINE);
            self.canvas.put_pixel(right, y, SPINE);
        }
    }

    #[must_use]
    pub fn canvas(&self) -> &RgbImage {
        &self.canvas
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be encoded or written
    pub fn save(&self, path: &Path, format: image::ImageFormat) -> ImageResult<()> {
        self.canvas.save_with_format(path, format)
    }
}

impl Default for Figure {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Largest rectangle with the image's aspect ratio that fits `bounds`,
/// centered in it
fn fit_into(bounds: Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 || bounds.width == 0 || bounds.height == 0 {
        return Rect { width: 0, height: 0, ..bounds };
    }

    let scale = (f64::from(bounds.width) / f64::from(width)).min(f64::from(bounds.height) / f64::from(height));
    let fitted_width = ((f64::from(width) * scale).round() as u32).clamp(1, bounds.width);
    let fitted_height = ((f64::from(height) * scale).round() as u32).clamp(1, bounds.height);

    Rect {
        x: bounds.x + (bounds.width - fitted_width) / 2,
        y: bounds.y + (bounds.height - fitted_height) / 2,
        width: fitted_width,
        height: fitted_height,
    }
}
