//! Binarization: scalar field to two-valued mask.
//!
//! The field is quantized to 8-bit codes (truncating), optionally
//! Gaussian-blurred, then handed to one of the [`BinarizeMethod`] families.
//! Set samples in the result are the detected structure: edge pixels for
//! Canny, dark-relative-to-surroundings pixels for the adaptive methods.

mod adaptive;
mod blur;
mod canny;
mod options;

pub use adaptive::{adaptive_threshold, LocalMean};
pub use blur::{gaussian_kernel, kernel_size_for_sigma, sigma_for_kernel_size};
pub use canny::canny;
pub use options::{AdaptiveParams, BinarizeMethod, BinarizeParams, CannyParams, EdgeOrder};

use crate::field::ScalarField;
use crate::mask::BinaryMask;
use crate::morphology::{dilate, StructuringElement};
use crate::preprocess::{downscale, DownscaleParams};

/// Coverage above which a downscaled edge mask sample counts as an edge.
pub const EDGE_COVERAGE_THRESHOLD: f32 = 0.1;

/// Binarize `field` at its own resolution.
pub fn binarize(field: &ScalarField, params: &BinarizeParams) -> BinaryMask {
    let mut gray = field.to_gray8();
    if params.pre_blur_sigma > 0.0 {
        gray = blur::gaussian_blur(&gray, params.pre_blur_sigma);
    }

    match &params.method {
        BinarizeMethod::Canny(p) => {
            let edges = canny(&gray, p.low_threshold(), p.high_threshold());
            if p.dilate_iterations() > 0 {
                let element = StructuringElement::ellipse(p.dilate_kernel());
                dilate(&edges, &element, p.dilate_iterations())
            } else {
                edges
            }
        }
        BinarizeMethod::AdaptiveGaussian(p) => adaptive_threshold(&gray, p, LocalMean::Gaussian),
        BinarizeMethod::AdaptiveMean(p) => adaptive_threshold(&gray, p, LocalMean::Box),
    }
}

/// Downscale and binarize in the order the method asks for.
///
/// Everything except Canny with [`EdgeOrder::EdgeDown`] downscales the field
/// first. `EdgeDown` detects at full resolution, area-averages the edge
/// mask, and keeps samples whose coverage exceeds
/// [`EDGE_COVERAGE_THRESHOLD`]. [`CannyParams`] only builds `EdgeDown`
/// with post-dilation, since single-pixel edges mostly fall below that
/// coverage.
pub fn binarize_to_size(
    field: &ScalarField,
    target: usize,
    downscale_params: &DownscaleParams,
    params: &BinarizeParams,
) -> BinaryMask {
    match &params.method {
        BinarizeMethod::Canny(p) if p.edge_order() == EdgeOrder::EdgeDown => {
            let edges = binarize(field, params);
            let coverage = downscale(&edges.coverage(), target, downscale_params);
            BinaryMask::from_fn(target, target, |x, y| {
                coverage.get(x, y) > EDGE_COVERAGE_THRESHOLD
            })
        }
        _ => binarize(&downscale(field, target, downscale_params), params),
    }
}
