//! Oklab lightness.
//!
//! Björn Ottosson, "A perceptual color space for image processing"
//! <https://bottosson.github.io/posts/oklab/>

use super::lut::srgb_code_to_linear;

/// Oklab `L` of an 8-bit sRGB triple, clamped to `[0, 1]`.
pub fn oklab_lightness(r: u8, g: u8, b: u8) -> f32 {
    let (r, g, b) = (
        srgb_code_to_linear(r),
        srgb_code_to_linear(g),
        srgb_code_to_linear(b),
    );

    let l = 0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b;
    let m = 0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b;
    let s = 0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b;

    let lightness = 0.2104542553 * l.cbrt() + 0.7936177850 * m.cbrt() - 0.0040720468 * s.cbrt();
    lightness.clamp(0.0, 1.0)
}
