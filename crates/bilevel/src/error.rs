//! Error type for stage parameter validation.
//!
//! The stages themselves are total functions. The only failures in this crate
//! are caller errors: an unknown method tag, an out-of-range parameter, or a
//! raster buffer whose length does not match its dimensions.

use std::fmt;

/// Error returned when stage parameters or raster buffers are invalid.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// A method/enum tag was not recognized
    UnknownMethod {
        /// Stage or parameter that carried the tag
        stage: &'static str,
        /// The rejected tag
        value: String,
        /// Accepted tags
        expected: &'static [&'static str],
    },
    /// Adaptive threshold block size must be odd and at least 3
    InvalidBlockSize(usize),
    /// A numeric parameter is outside its valid range
    OutOfRange {
        /// Parameter name
        name: &'static str,
        /// Rejected value
        value: f64,
    },
    /// Edge detection before downscaling without post-dilation
    UndilatedEdgeDown,
    /// Raster buffer length does not match `width * height * channels`
    DimensionMismatch {
        /// Expected number of samples
        expected: usize,
        /// Actual number of samples
        actual: usize,
    },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::UnknownMethod {
                stage,
                value,
                expected,
            } => {
                write!(
                    f,
                    "unknown {} method '{}' (expected one of: {})",
                    stage,
                    value,
                    expected.join(", ")
                )
            }
            ParamError::InvalidBlockSize(size) => {
                write!(f, "block size {} must be odd and at least 3", size)
            }
            ParamError::OutOfRange { name, value } => {
                write!(f, "parameter {} is out of range: {}", name, value)
            }
            ParamError::UndilatedEdgeDown => {
                write!(f, "edge_down order requires dilate_iterations of at least 1")
            }
            ParamError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "buffer length mismatch: expected {} samples, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for ParamError {}
