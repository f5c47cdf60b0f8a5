//! Parameter records for the stages ahead of binarization.
//!
//! Every record has a [`Default`] carrying the documented default values and
//! a `validate` method; the stage functions assume validated parameters.

use std::fmt;
use std::str::FromStr;

use crate::error::ParamError;

/// Gamma decode and percentile exposure stretch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeParams {
    /// Decode exponent applied to `code / 255`.
    pub gamma: f32,
    /// Lower stretch anchor, in percent.
    pub percentile_low: f32,
    /// Upper stretch anchor, in percent.
    pub percentile_high: f32,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            gamma: 2.2,
            percentile_low: 1.0,
            percentile_high: 99.0,
        }
    }
}

impl NormalizeParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(ParamError::OutOfRange {
                name: "gamma",
                value: self.gamma as f64,
            });
        }
        for (name, value) in [
            ("percentile_low", self.percentile_low),
            ("percentile_high", self.percentile_high),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ParamError::OutOfRange {
                    name,
                    value: value as f64,
                });
            }
        }
        Ok(())
    }
}

/// Lightness space used to collapse color to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LuminanceMethod {
    /// CIE L\*a\*b\* lightness
    #[default]
    LabL,
    /// Oklab lightness
    OklabL,
}

impl LuminanceMethod {
    pub const TAGS: &'static [&'static str] = &["lab_l", "oklab_l"];

    pub fn as_str(self) -> &'static str {
        match self {
            LuminanceMethod::LabL => "lab_l",
            LuminanceMethod::OklabL => "oklab_l",
        }
    }
}

impl FromStr for LuminanceMethod {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lab_l" => Ok(LuminanceMethod::LabL),
            "oklab_l" => Ok(LuminanceMethod::OklabL),
            other => Err(ParamError::UnknownMethod {
                stage: "luminance",
                value: other.to_string(),
                expected: Self::TAGS,
            }),
        }
    }
}

impl fmt::Display for LuminanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LuminanceParams {
    pub method: LuminanceMethod,
}

/// Local contrast enhancement algorithm. Only CLAHE exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContrastMethod {
    #[default]
    Clahe,
}

impl ContrastMethod {
    pub const TAGS: &'static [&'static str] = &["clahe"];

    pub fn as_str(self) -> &'static str {
        "clahe"
    }
}

impl FromStr for ContrastMethod {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clahe" => Ok(ContrastMethod::Clahe),
            other => Err(ParamError::UnknownMethod {
                stage: "contrast",
                value: other.to_string(),
                expected: Self::TAGS,
            }),
        }
    }
}

/// Contrast-limited adaptive histogram equalization settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastParams {
    pub method: ContrastMethod,
    /// Histogram clip limit relative to a flat histogram. `0` disables
    /// clipping.
    pub clip_limit: f32,
    /// Number of tiles along each axis.
    pub tile_size: usize,
}

impl Default for ContrastParams {
    fn default() -> Self {
        Self {
            method: ContrastMethod::Clahe,
            clip_limit: 2.0,
            tile_size: 8,
        }
    }
}

impl ContrastParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.clip_limit.is_finite() && self.clip_limit >= 0.0) {
            return Err(ParamError::OutOfRange {
                name: "clip_limit",
                value: self.clip_limit as f64,
            });
        }
        if self.tile_size == 0 {
            return Err(ParamError::OutOfRange {
                name: "tile_size",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Resampling kernel. Only area averaging exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownscaleMethod {
    #[default]
    Area,
}

impl DownscaleMethod {
    pub const TAGS: &'static [&'static str] = &["area"];

    pub fn as_str(self) -> &'static str {
        "area"
    }
}

impl FromStr for DownscaleMethod {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "area" => Ok(DownscaleMethod::Area),
            other => Err(ParamError::UnknownMethod {
                stage: "downscale",
                value: other.to_string(),
                expected: Self::TAGS,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownscaleParams {
    pub method: DownscaleMethod,
}
