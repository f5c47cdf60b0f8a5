//! Local-mean thresholding with inverted polarity.

use crate::border::Border;
use crate::field::GrayImage;
use crate::mask::BinaryMask;

use super::blur::{box_kernel, convolve_separable, gaussian_kernel};
use super::options::AdaptiveParams;

/// Local statistic the threshold is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalMean {
    Gaussian,
    Box,
}

/// Set every sample that is at least `C` codes darker than its local mean,
/// i.e. `pixel - mean <= -C`.
///
/// The mean is an 8-bit `block_size x block_size` window with replicated
/// borders, so a uniform image is all background for any `C > 0`.
pub fn adaptive_threshold(src: &GrayImage, params: &AdaptiveParams, stat: LocalMean) -> BinaryMask {
    let kernel = match stat {
        LocalMean::Gaussian => gaussian_kernel(params.block_size(), 0.0),
        LocalMean::Box => box_kernel(params.block_size()),
    };
    let mean = convolve_separable(src, &kernel, Border::Replicate);
    let c = params.c();

    BinaryMask::from_fn(src.width(), src.height(), |x, y| {
        src.get(x, y) as i32 - mean.get(x, y) as i32 <= -c
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_gray_is_background() {
        let src = GrayImage::from_vec(32, 32, vec![128; 32 * 32]);
        let params = AdaptiveParams::new(15, 5).unwrap();
        for stat in [LocalMean::Gaussian, LocalMean::Box] {
            assert_eq!(adaptive_threshold(&src, &params, stat).count_set(), 0);
        }
    }

    #[test]
    fn test_dark_stroke_on_light_ground() {
        let mut data = vec![220u8; 21 * 21];
        for y in 0..21 {
            data[y * 21 + 10] = 40;
        }
        let src = GrayImage::from_vec(21, 21, data);
        let params = AdaptiveParams::new(9, 3).unwrap();
        for stat in [LocalMean::Gaussian, LocalMean::Box] {
            let mask = adaptive_threshold(&src, &params, stat);
            assert!((0..21).all(|y| mask.is_set(10, y)));
            assert!(!mask.is_set(0, 0));
            assert!(!mask.is_set(9, 5));
        }
    }

    #[test]
    fn test_negative_c_sets_flat_regions() {
        let src = GrayImage::from_vec(8, 8, vec![90; 64]);
        let params = AdaptiveParams::new(3, -1).unwrap();
        assert_eq!(adaptive_threshold(&src, &params, LocalMean::Box).count_set(), 64);
    }
}
