//! Pixel normalization and figure rendering

pub mod figure;
mod normalization;

pub use figure::{Colormap, Figure};
pub use normalization::{find_min_max, normalize_dynamic, normalize_static, Normalization};
