//! Raster containers handed from stage to stage.
//!
//! Each stage consumes the previous stage's container by reference and
//! returns a freshly owned one, so no buffer is ever shared mutably between
//! stages.

use crate::error::ParamError;

/// An 8-bit RGB raster, row-major, three samples per pixel.
///
/// This is the caller-owned source photograph. The pipeline only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbImage {
    /// Wrap an interleaved `[R, G, B, R, G, B, ...]` buffer.
    ///
    /// Returns [`ParamError::DimensionMismatch`] if `data.len()` is not
    /// `width * height * 3`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ParamError> {
        let expected = width * height * 3;
        if data.len() != expected {
            return Err(ParamError::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Interleaved sample buffer.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Linear-light RGB samples in `[0, 1]`, interleaved like [`RgbImage`].
///
/// Carries the gamma it was decoded with so luminance extraction can
/// re-encode with the same exponent.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearField {
    width: usize,
    height: usize,
    gamma: f32,
    data: Vec<f32>,
}

impl LinearField {
    pub(crate) fn new(width: usize, height: usize, gamma: f32, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), width * height * 3);
        Self {
            width,
            height,
            gamma,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Decode exponent used to produce this field.
    #[inline]
    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Single-channel float field in `[0, 1]` (luminance or enhanced luminance).
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ScalarField {
    /// Wrap a row-major buffer of `width * height` samples.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, ParamError> {
        if data.len() != width * height {
            return Err(ParamError::DimensionMismatch {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    /// A field with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Quantize to 8-bit codes with truncation, `(v * 255) as u8`.
    ///
    /// Truncation (not rounding) is what every 8-bit stage expects; changing
    /// it shifts thresholds by one code and changes output masks.
    pub fn to_gray8(&self) -> GrayImage {
        let data = self
            .data
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 255.0) as u8)
            .collect();
        GrayImage {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Single-channel 8-bit raster used internally by the histogram and
/// thresholding stages.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImage {
    pub(crate) fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Back to a float field, `code / 255`.
    pub fn to_scalar(&self) -> ScalarField {
        ScalarField {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| v as f32 / 255.0).collect(),
        }
    }
}
