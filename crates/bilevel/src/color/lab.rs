//! CIE L\*a\*b\* lightness (D65).

use super::lut::srgb_code_to_linear;

const EPSILON: f32 = 0.008856;
const KAPPA: f32 = 903.3;

/// CIE L\* in `0..=100` of an 8-bit sRGB triple.
pub fn lab_lightness(r: u8, g: u8, b: u8) -> f32 {
    let y = 0.212671 * srgb_code_to_linear(r)
        + 0.715160 * srgb_code_to_linear(g)
        + 0.072169 * srgb_code_to_linear(b);
    if y > EPSILON {
        116.0 * y.cbrt() - 16.0
    } else {
        KAPPA * y
    }
}

/// L\* scaled into an 8-bit code, `round(L * 255 / 100)`.
#[inline]
pub fn lab_lightness_code(r: u8, g: u8, b: u8) -> u8 {
    (lab_lightness(r, g, b) * 255.0 / 100.0)
        .round()
        .clamp(0.0, 255.0) as u8
}
