//! Separable 8-bit smoothing filters.

use crate::border::Border;
use crate::field::GrayImage;

/// Kernel size for a Gaussian pre-blur of `sigma`:
/// `max(3, round(6 * sigma) | 1)`.
///
/// This decides how much fine detail reaches edge detection, so masks from
/// different runs only match if it is reproduced exactly.
pub fn kernel_size_for_sigma(sigma: f32) -> usize {
    let k = (6.0 * sigma).round().max(0.0) as usize | 1;
    k.max(3)
}

/// Sigma used when a Gaussian window is specified by size alone.
pub fn sigma_for_kernel_size(ksize: usize) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian taps.
///
/// A non-positive `sigma` derives it from the size; small odd sizes then use
/// the binomial tables.
pub fn gaussian_kernel(ksize: usize, sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        match ksize {
            1 => return vec![1.0],
            3 => return vec![0.25, 0.5, 0.25],
            5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
            7 => {
                return vec![
                    0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
                ]
            }
            _ => {}
        }
    }
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        sigma_for_kernel_size(ksize)
    };
    let center = (ksize as f64 - 1.0) / 2.0;
    let scale = -0.5 / (sigma * sigma);
    let taps: Vec<f64> = (0..ksize)
        .map(|i| {
            let d = i as f64 - center;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f64 = taps.iter().sum();
    taps.into_iter().map(|t| t / sum).collect()
}

/// Uniform taps of a box mean.
pub fn box_kernel(ksize: usize) -> Vec<f64> {
    vec![1.0 / ksize as f64; ksize]
}

/// Gaussian blur with reflect-101 borders.
pub fn gaussian_blur(src: &GrayImage, sigma: f32) -> GrayImage {
    let ksize = kernel_size_for_sigma(sigma);
    let kernel = gaussian_kernel(ksize, sigma as f64);
    convolve_separable(src, &kernel, Border::Reflect101)
}

/// Apply the same 1-D kernel horizontally then vertically, rounding the
/// result back to 8 bits.
pub fn convolve_separable(src: &GrayImage, kernel: &[f64], border: Border) -> GrayImage {
    let (width, height) = (src.width(), src.height());
    if width == 0 || height == 0 {
        return src.clone();
    }
    let radius = (kernel.len() / 2) as isize;

    let mut rows = vec![0.0f64; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, &w) in kernel.iter().enumerate() {
                let sx = border.map(x as isize + k as isize - radius, width);
                acc += w * src.get(sx, y) as f64;
            }
            rows[y * width + x] = acc;
        }
    }

    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, &w) in kernel.iter().enumerate() {
                let sy = border.map(y as isize + k as isize - radius, height);
                acc += w * rows[sy * width + x];
            }
            out.push(acc.round().clamp(0.0, 255.0) as u8);
        }
    }

    GrayImage::from_vec(width, height, out)
}
