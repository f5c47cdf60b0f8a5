//! Stages ahead of binarization.
//!
//! - [`normalize`]: gamma decode and percentile exposure stretch
//! - [`extract_luminance`]: perceptual lightness field
//! - [`enhance_contrast`]: optional CLAHE
//! - [`downscale`]: area resample to the target square

mod contrast;
mod downscale;
mod luminance;
mod normalize;
mod options;

pub use contrast::enhance_contrast;
pub use downscale::downscale;
pub use luminance::extract_luminance;
pub use normalize::normalize;
pub use options::{
    ContrastMethod, ContrastParams, DownscaleMethod, DownscaleParams, LuminanceMethod,
    LuminanceParams, NormalizeParams,
};
