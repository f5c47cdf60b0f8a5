#![allow(clippy::needless_range_loop, clippy::excessive_precision)]

//! bilevel: photo to 1-bit mask image stages
//!
//! Every stage is a total function from one owned raster to the next:
//!
//! ```text
//! RgbImage --normalize--> LinearField --extract_luminance--> ScalarField
//!     --enhance_contrast (optional)--> ScalarField
//!     --downscale / binarize_to_size--> BinaryMask --correct--> BinaryMask
//! ```
//!
//! Parameters are validated up front (see [`ParamError`]); once a parameter
//! record exists the stages cannot fail.
//!
//! # Example
//!
//! ```
//! use bilevel::{
//!     binarize_to_size, correct, extract_luminance, normalize, AdaptiveParams,
//!     BinarizeMethod, BinarizeParams, DownscaleParams, LuminanceParams, MorphologyParams,
//!     NormalizeParams, RgbImage,
//! };
//!
//! let photo = RgbImage::from_fn(300, 200, |x, y| {
//!     let v = ((x ^ y) & 0xff) as u8;
//!     [v, v / 2, 255 - v]
//! });
//!
//! let linear = normalize(&photo, &NormalizeParams::default());
//! let luma = extract_luminance(&linear, &LuminanceParams::default());
//! let params = BinarizeParams::new(BinarizeMethod::AdaptiveGaussian(
//!     AdaptiveParams::new(15, 5).unwrap(),
//! ));
//! let mask = binarize_to_size(&luma, 128, &DownscaleParams::default(), &params);
//! let mask = correct(&mask, &MorphologyParams::default());
//!
//! assert_eq!((mask.width(), mask.height()), (128, 128));
//! ```
//!
//! # Polarity
//!
//! Set mask samples ([`FOREGROUND`]) are the detected structure. Whether
//! they end up as ink is decided at export time by the `invert` flag of
//! [`BinaryMask::foreground`] and [`pack_bits`].

pub mod binarize;
pub mod border;
pub mod color;
mod error;
mod field;
mod mask;
pub mod morphology;
mod pack;
pub mod preprocess;


pub use binarize::{
    binarize, binarize_to_size, AdaptiveParams, BinarizeMethod, BinarizeParams, CannyParams,
    EdgeOrder, EDGE_COVERAGE_THRESHOLD,
};
pub use error::ParamError;
pub use field::{GrayImage, LinearField, RgbImage, ScalarField};
pub use mask::{BinaryMask, BACKGROUND, FOREGROUND};
pub use morphology::{correct, KernelShape, MorphologyParams};
pub use pack::{pack_bits, unpack_bits};
pub use preprocess::{
    downscale, enhance_contrast, extract_luminance, normalize, ContrastMethod, ContrastParams,
    DownscaleMethod, DownscaleParams, LuminanceMethod, LuminanceParams, NormalizeParams,
};
