//! Canny edge detection on 8-bit input.
//!
//! 3x3 Sobel gradients with replicated borders, L1 magnitude, non-maximum
//! suppression along the gradient direction quantized to four sectors, then
//! two-threshold hysteresis with 8-connected linking.

use crate::border::replicate;
use crate::field::GrayImage;
use crate::mask::BinaryMask;

/// tan(22.5°)
const TG22: f32 = 0.414_213_56;
/// tan(67.5°)
const TG67: f32 = 2.414_213_6;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Edge {
    None,
    Weak,
    Strong,
}

/// Detect edges in `src`. Set mask samples are edge pixels.
///
/// If `low > high` the thresholds are swapped.
pub fn canny(src: &GrayImage, low: f32, high: f32) -> BinaryMask {
    let (width, height) = (src.width(), src.height());
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    if width == 0 || height == 0 {
        return BinaryMask::empty(width, height);
    }

    let (gx, gy) = sobel(src);
    let mag: Vec<i32> = gx.iter().zip(&gy).map(|(a, b)| a.abs() + b.abs()).collect();
    let mag_at = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
            0
        } else {
            mag[y as usize * width + x as usize]
        }
    };

    let mut state = vec![Edge::None; width * height];
    let mut stack = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let m = mag[i];
            if m as f32 <= low {
                continue;
            }
            let (xi, yi) = (x as isize, y as isize);
            let xs = gx[i].abs() as f32;
            let ys = gy[i].abs() as f32;

            // Ties go to the left/top neighbor so a two-pixel ridge keeps one
            let is_max = if ys < xs * TG22 {
                m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
            } else if ys > xs * TG67 {
                m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
            } else {
                let s = if (gx[i] ^ gy[i]) < 0 { -1 } else { 1 };
                m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
            };
            if !is_max {
                continue;
            }

            if m as f32 > high {
                state[i] = Edge::Strong;
                stack.push(i);
            } else {
                state[i] = Edge::Weak;
            }
        }
    }

    while let Some(i) = stack.pop() {
        let (x, y) = ((i % width) as isize, (i / width) as isize);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let n = ny as usize * width + nx as usize;
                if state[n] == Edge::Weak {
                    state[n] = Edge::Strong;
                    stack.push(n);
                }
            }
        }
    }

    BinaryMask::from_fn(width, height, |x, y| state[y * width + x] == Edge::Strong)
}

/// Sobel x/y derivatives with replicated borders.
fn sobel(src: &GrayImage) -> (Vec<i32>, Vec<i32>) {
    let (width, height) = (src.width(), src.height());
    let px = |x: isize, y: isize| src.get(replicate(x, width), replicate(y, height)) as i32;

    let mut gx = Vec::with_capacity(width * height);
    let mut gy = Vec::with_capacity(width * height);
    for y in 0..height as isize {
        for x in 0..width as isize {
            gx.push(
                px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1)
                    - px(x - 1, y - 1)
                    - 2 * px(x - 1, y)
                    - px(x - 1, y + 1),
            );
            gy.push(
                px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1)
                    - px(x - 1, y - 1)
                    - 2 * px(x, y - 1)
                    - px(x + 1, y - 1),
            );
        }
    }
    (gx, gy)
}
