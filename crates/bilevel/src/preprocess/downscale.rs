//! Area-average resampling to a square target.

use crate::field::ScalarField;

use super::options::{DownscaleMethod, DownscaleParams};

/// Resample `field` to exactly `target x target`.
///
/// Each output sample is the mean of the source area its footprint covers,
/// with partially covered source samples weighted by the overlap. For
/// integer ratios this is an exact box mean.
pub fn downscale(field: &ScalarField, target: usize, params: &DownscaleParams) -> ScalarField {
    match params.method {
        DownscaleMethod::Area => area_resample(field, target, target),
    }
}

/// Normalized overlap weights of every source sample feeding each output
/// sample along one axis.
fn area_weights(src: usize, dst: usize) -> Vec<Vec<(usize, f64)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|o| {
            let start = o as f64 * scale;
            let end = ((o + 1) as f64 * scale).min(src as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).clamp(first + 1, src);
            let mut taps: Vec<(usize, f64)> = (first..last)
                .map(|j| {
                    let overlap = end.min(j as f64 + 1.0) - start.max(j as f64);
                    (j, overlap.max(0.0))
                })
                .filter(|&(_, w)| w > 0.0)
                .collect();
            let total: f64 = taps.iter().map(|&(_, w)| w).sum();
            if total > 0.0 {
                for tap in &mut taps {
                    tap.1 /= total;
                }
            } else {
                taps = vec![(first.min(src - 1), 1.0)];
            }
            taps
        })
        .collect()
}

fn area_resample(field: &ScalarField, out_w: usize, out_h: usize) -> ScalarField {
    let (width, height) = (field.width(), field.height());
    if width == 0 || height == 0 {
        return ScalarField::filled(out_w, out_h, 0.0);
    }

    let wx = area_weights(width, out_w);
    let wy = area_weights(height, out_h);

    // horizontal pass: height x out_w
    let mut rows = vec![0.0f64; height * out_w];
    for y in 0..height {
        let src = &field.data()[y * width..(y + 1) * width];
        for (ox, taps) in wx.iter().enumerate() {
            rows[y * out_w + ox] = taps.iter().map(|&(j, w)| src[j] as f64 * w).sum();
        }
    }

    let mut data = Vec::with_capacity(out_w * out_h);
    for taps in &wy {
        for ox in 0..out_w {
            let v: f64 = taps.iter().map(|&(j, w)| rows[j * out_w + ox] * w).sum();
            data.push(v as f32);
        }
    }

    ScalarField::from_parts(out_w, out_h, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_ratio_is_box_mean() {
        let field = ScalarField::from_fn(4, 4, |x, y| (y * 4 + x) as f32);
        let out = downscale(&field, 2, &DownscaleParams::default());
        // top-left block: 0, 1, 4, 5
        assert_eq!(out.data(), &[2.5, 4.5, 10.5, 12.5]);
    }

    #[test]
    fn test_fractional_ratio_weights_overlap() {
        // 3 -> 2: outputs cover [0, 1.5) and [1.5, 3)
        let field = ScalarField::from_fn(3, 1, |x, _| [0.0, 3.0, 6.0][x]);
        let out = area_resample(&field, 2, 1);
        assert!((out.get(0, 0) - 1.0).abs() < 1e-6);
        assert!((out.get(1, 0) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_stays_uniform() {
        let field = ScalarField::filled(300, 217, 0.25);
        let out = downscale(&field, 128, &DownscaleParams::default());
        assert!(out.data().iter().all(|&v| (v - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_upscale_replicates() {
        let field = ScalarField::from_fn(2, 1, |x, _| x as f32);
        let out = area_resample(&field, 4, 1);
        assert_eq!(out.data(), &[0.0, 0.0, 1.0, 1.0]);
    }
}
