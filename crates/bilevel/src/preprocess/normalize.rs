//! Gamma decode plus percentile exposure stretch.

use crate::field::{LinearField, RgbImage};

use super::options::NormalizeParams;

/// Ranges narrower than this are treated as flat and left unstretched.
const MIN_STRETCH_RANGE: f32 = 1e-6;

/// Decode `image` to linear light and stretch its exposure.
///
/// Every sample becomes `(code / 255) ^ gamma`. The low and high percentiles
/// are taken over all samples of all channels together (linear
/// interpolation between closest ranks). If they are further apart than
/// 1e-6 the field is rescaled so they map to 0 and 1 and clamped; otherwise
/// the decoded field is returned as is.
pub fn normalize(image: &RgbImage, params: &NormalizeParams) -> LinearField {
    let decode: Vec<f32> = (0..256u32)
        .map(|code| (code as f32 / 255.0).powf(params.gamma))
        .collect();

    let mut histogram = [0usize; 256];
    for &code in image.data() {
        histogram[code as usize] += 1;
    }

    let mut data: Vec<f32> = image.data().iter().map(|&c| decode[c as usize]).collect();

    let count = data.len();
    if count > 0 {
        let low = percentile(&histogram, &decode, count, params.percentile_low);
        let high = percentile(&histogram, &decode, count, params.percentile_high);
        if high - low > MIN_STRETCH_RANGE {
            let scale = 1.0 / (high - low);
            for v in &mut data {
                *v = ((*v - low) * scale).clamp(0.0, 1.0);
            }
        }
    }

    LinearField::new(image.width(), image.height(), params.gamma, data)
}

/// Percentile of decoded samples, read off the 8-bit code histogram.
///
/// Decoding is monotonic in the code, so the k-th smallest decoded sample is
/// the decoded value of the k-th smallest code.
fn percentile(histogram: &[usize; 256], decode: &[f32], count: usize, percent: f32) -> f32 {
    let rank = (percent.clamp(0.0, 100.0) as f64 / 100.0) * (count - 1) as f64;
    let lower = rank.floor() as usize;
    let frac = (rank - lower as f64) as f32;

    let a = nth_smallest(histogram, decode, lower);
    if frac == 0.0 || lower + 1 >= count {
        return a;
    }
    let b = nth_smallest(histogram, decode, lower + 1);
    a + (b - a) * frac
}

fn nth_smallest(histogram: &[usize; 256], decode: &[f32], n: usize) -> f32 {
    let mut seen = 0;
    for (code, &bin) in histogram.iter().enumerate() {
        seen += bin;
        if seen > n {
            return decode[code];
        }
    }
    decode[255]
}
