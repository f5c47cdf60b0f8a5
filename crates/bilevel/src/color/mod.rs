//! Perceptual lightness from display-referred 8-bit RGB.
//!
//! Both conversions start from 8-bit sRGB codes, decode them to linear light
//! through a compile-time table, and keep only the lightness axis.

mod lab;
mod lut;
mod oklab;

pub use lab::{lab_lightness, lab_lightness_code};
pub use lut::srgb_code_to_linear;
pub use oklab::oklab_lightness;
