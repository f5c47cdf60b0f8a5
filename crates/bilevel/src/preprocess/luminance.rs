//! Perceptual lightness extraction.

use crate::color::{lab_lightness_code, oklab_lightness};
use crate::field::{LinearField, ScalarField};

use super::options::{LuminanceMethod, LuminanceParams};

/// Collapse a linear RGB field to perceptual lightness in `[0, 1]`.
///
/// The field is first re-encoded with `x ^ (1 / gamma)` and truncated to
/// 8-bit display-referred codes, since both lightness transforms are defined
/// on sRGB input. L\* is quantized to an 8-bit code before scaling back.
pub fn extract_luminance(field: &LinearField, params: &LuminanceParams) -> ScalarField {
    let inv_gamma = 1.0 / field.gamma();
    let encode = |v: f32| (v.clamp(0.0, 1.0).powf(inv_gamma) * 255.0) as u8;

    let data = field
        .data()
        .chunks_exact(3)
        .map(|px| {
            let (r, g, b) = (encode(px[0]), encode(px[1]), encode(px[2]));
            match params.method {
                LuminanceMethod::LabL => lab_lightness_code(r, g, b) as f32 / 255.0,
                LuminanceMethod::OklabL => oklab_lightness(r, g, b),
            }
        })
        .collect();

    ScalarField::from_parts(field.width(), field.height(), data)
}
