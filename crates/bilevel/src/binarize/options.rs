//! Binarization parameters.
//!
//! [`BinarizeMethod`] is a tagged union: each algorithm family carries only
//! the parameters it reads, and the constructors reject values the
//! algorithms cannot honor.

use std::fmt;
use std::str::FromStr;

use crate::error::ParamError;

/// Whether edge detection runs before or after downscaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeOrder {
    /// Downscale the field, then detect edges at target size.
    #[default]
    DownEdge,
    /// Detect at full resolution, downscale the edge mask, and re-threshold
    /// at [`EDGE_COVERAGE_THRESHOLD`](super::EDGE_COVERAGE_THRESHOLD).
    EdgeDown,
}

impl EdgeOrder {
    pub const TAGS: &'static [&'static str] = &["down_edge", "edge_down"];

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeOrder::DownEdge => "down_edge",
            EdgeOrder::EdgeDown => "edge_down",
        }
    }
}

impl FromStr for EdgeOrder {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "down_edge" => Ok(EdgeOrder::DownEdge),
            "edge_down" => Ok(EdgeOrder::EdgeDown),
            other => Err(ParamError::UnknownMethod {
                stage: "edge order",
                value: other.to_string(),
                expected: Self::TAGS,
            }),
        }
    }
}

/// Gradient edge detection with hysteresis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CannyParams {
    low_threshold: f32,
    high_threshold: f32,
    dilate_kernel: usize,
    dilate_iterations: usize,
    order: EdgeOrder,
}

impl Default for CannyParams {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
            dilate_kernel: 3,
            dilate_iterations: 0,
            order: EdgeOrder::DownEdge,
        }
    }
}

impl CannyParams {
    /// Hysteresis thresholds on L1 gradient magnitude.
    ///
    /// Both must be non-negative and `low <= high`.
    pub fn new(low_threshold: f32, high_threshold: f32) -> Result<Self, ParamError> {
        for (name, value) in [
            ("low_threshold", low_threshold),
            ("high_threshold", high_threshold),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ParamError::OutOfRange {
                    name,
                    value: value as f64,
                });
            }
        }
        if low_threshold > high_threshold {
            return Err(ParamError::OutOfRange {
                name: "low_threshold",
                value: low_threshold as f64,
            });
        }
        Ok(Self {
            low_threshold,
            high_threshold,
            ..Self::default()
        })
    }

    /// Post-dilate detected edges with an elliptical kernel.
    ///
    /// `iterations == 0` disables dilation and the kernel is then ignored.
    pub fn dilate(mut self, kernel: usize, iterations: usize) -> Result<Self, ParamError> {
        if kernel == 0 && iterations > 0 {
            return Err(ParamError::OutOfRange {
                name: "dilate_kernel",
                value: 0.0,
            });
        }
        self.dilate_kernel = kernel;
        self.dilate_iterations = iterations;
        self.check_order()?;
        Ok(self)
    }

    /// Detection order. [`EdgeOrder::EdgeDown`] needs post-dilation, so set
    /// it after [`dilate`](Self::dilate).
    pub fn order(mut self, order: EdgeOrder) -> Result<Self, ParamError> {
        self.order = order;
        self.check_order()?;
        Ok(self)
    }

    fn check_order(&self) -> Result<(), ParamError> {
        if self.order == EdgeOrder::EdgeDown && self.dilate_iterations == 0 {
            return Err(ParamError::UndilatedEdgeDown);
        }
        Ok(())
    }

    pub fn low_threshold(&self) -> f32 {
        self.low_threshold
    }

    pub fn high_threshold(&self) -> f32 {
        self.high_threshold
    }

    pub fn dilate_kernel(&self) -> usize {
        self.dilate_kernel
    }

    pub fn dilate_iterations(&self) -> usize {
        self.dilate_iterations
    }

    pub fn edge_order(&self) -> EdgeOrder {
        self.order
    }
}

/// Local threshold window and offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveParams {
    block_size: usize,
    c: i32,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            block_size: 15,
            c: 5,
        }
    }
}

impl AdaptiveParams {
    /// `block_size` must be odd and at least 3.
    pub fn new(block_size: usize, c: i32) -> Result<Self, ParamError> {
        if block_size < 3 || block_size % 2 == 0 {
            return Err(ParamError::InvalidBlockSize(block_size));
        }
        Ok(Self { block_size, c })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Offset subtracted from the local mean.
    pub fn c(&self) -> i32 {
        self.c
    }
}

/// Binarization algorithm and its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinarizeMethod {
    /// Sparse outline edges
    Canny(CannyParams),
    /// Local threshold against a Gaussian-weighted mean
    AdaptiveGaussian(AdaptiveParams),
    /// Local threshold against a box mean
    AdaptiveMean(AdaptiveParams),
}

impl Default for BinarizeMethod {
    fn default() -> Self {
        BinarizeMethod::Canny(CannyParams::default())
    }
}

impl BinarizeMethod {
    pub const TAGS: &'static [&'static str] = &["canny", "adaptive_gaussian", "adaptive_mean"];

    pub fn tag(&self) -> &'static str {
        match self {
            BinarizeMethod::Canny(_) => "canny",
            BinarizeMethod::AdaptiveGaussian(_) => "adaptive_gaussian",
            BinarizeMethod::AdaptiveMean(_) => "adaptive_mean",
        }
    }

    /// Reject anything but a known method tag.
    pub fn check_tag(tag: &str) -> Result<&'static str, ParamError> {
        Self::TAGS
            .iter()
            .copied()
            .find(|&t| t == tag)
            .ok_or_else(|| ParamError::UnknownMethod {
                stage: "binarize",
                value: tag.to_string(),
                expected: Self::TAGS,
            })
    }
}

impl fmt::Display for BinarizeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Full binarizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BinarizeParams {
    /// Gaussian pre-blur sigma; `0` skips the blur.
    pub pre_blur_sigma: f32,
    pub method: BinarizeMethod,
}

impl BinarizeParams {
    pub fn new(method: BinarizeMethod) -> Self {
        Self {
            pre_blur_sigma: 0.0,
            method,
        }
    }

    pub fn pre_blur(mut self, sigma: f32) -> Result<Self, ParamError> {
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(ParamError::OutOfRange {
                name: "pre_blur_sigma",
                value: sigma as f64,
            });
        }
        self.pre_blur_sigma = sigma;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canny_defaults() {
        let p = CannyParams::default();
        assert_eq!((p.low_threshold(), p.high_threshold()), (50.0, 150.0));
        assert_eq!((p.dilate_kernel(), p.dilate_iterations()), (3, 0));
        assert_eq!(p.edge_order(), EdgeOrder::DownEdge);
    }

    #[test]
    fn test_canny_rejects_inverted_thresholds() {
        assert!(CannyParams::new(200.0, 100.0).is_err());
        assert!(CannyParams::new(-1.0, 100.0).is_err());
        assert!(CannyParams::new(100.0, 100.0).is_ok());
    }

    #[test]
    fn test_block_size_must_be_odd() {
        assert_eq!(AdaptiveParams::new(4, 2), Err(ParamError::InvalidBlockSize(4)));
        assert_eq!(AdaptiveParams::new(1, 2), Err(ParamError::InvalidBlockSize(1)));
        assert_eq!(AdaptiveParams::new(9, -3).map(|p| p.c()), Ok(-3));
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        assert_eq!(BinarizeMethod::check_tag("adaptive_mean"), Ok("adaptive_mean"));
        let err = BinarizeMethod::check_tag("otsu").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown binarize method 'otsu' (expected one of: canny, adaptive_gaussian, adaptive_mean)"
        );
    }

    #[test]
    fn test_edge_down_requires_dilation() {
        let err = CannyParams::default()
            .order(EdgeOrder::EdgeDown)
            .unwrap_err();
        assert_eq!(err, ParamError::UndilatedEdgeDown);

        let edge_down = CannyParams::default()
            .dilate(3, 1)
            .and_then(|p| p.order(EdgeOrder::EdgeDown))
            .unwrap();
        assert_eq!(edge_down.dilate(3, 0), Err(ParamError::UndilatedEdgeDown));
        assert!(CannyParams::default().order(EdgeOrder::DownEdge).is_ok());
    }

    #[test]
    fn test_zero_kernel_means_no_dilation() {
        let p = CannyParams::default().dilate(0, 0).unwrap();
        assert_eq!((p.dilate_kernel(), p.dilate_iterations()), (0, 0));
        assert!(CannyParams::default().dilate(0, 2).is_err());
    }

    #[test]
    fn test_edge_order_tags() {
        assert_eq!("edge_down".parse::<EdgeOrder>(), Ok(EdgeOrder::EdgeDown));
        assert!("sideways".parse::<EdgeOrder>().is_err());
    }
}
