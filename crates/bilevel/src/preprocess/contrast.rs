//! Contrast-limited adaptive histogram equalization (CLAHE).
//!
//! The field is quantized to 8-bit codes and split into a
//! `tile_size x tile_size` grid. Each tile gets a clipped, equalized
//! histogram LUT; every pixel is then mapped through the four nearest tile
//! LUTs and blended bilinearly so tile seams do not show.
//!
//! Sides that are not a multiple of the grid are padded with reflect-101
//! before tiling. Only the LUTs see the padding; the output keeps the input
//! dimensions.

use crate::border::reflect101;
use crate::field::{GrayImage, ScalarField};

use super::options::{ContrastMethod, ContrastParams};

const BINS: usize = 256;

/// Apply local contrast enhancement to `field`.
pub fn enhance_contrast(field: &ScalarField, params: &ContrastParams) -> ScalarField {
    match params.method {
        ContrastMethod::Clahe => clahe(&field.to_gray8(), params.clip_limit, params.tile_size).to_scalar(),
    }
}

fn clahe(src: &GrayImage, clip_limit: f32, tiles: usize) -> GrayImage {
    let (width, height) = (src.width(), src.height());
    if width == 0 || height == 0 {
        return src.clone();
    }
    let tiles = tiles.max(1);

    let tile_w = width.div_ceil(tiles);
    let tile_h = height.div_ceil(tiles);
    let tile_area = tile_w * tile_h;

    let clip = if clip_limit > 0.0 {
        ((clip_limit * tile_area as f32 / BINS as f32) as usize).max(1)
    } else {
        0
    };

    let mut luts = vec![[0u8; BINS]; tiles * tiles];
    for ty in 0..tiles {
        for tx in 0..tiles {
            let mut hist = [0usize; BINS];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect101(y as isize, height);
                for x in tx * tile_w..(tx + 1) * tile_w {
                    let sx = reflect101(x as isize, width);
                    hist[src.get(sx, sy) as usize] += 1;
                }
            }
            if clip > 0 {
                clip_histogram(&mut hist, clip);
            }
            luts[ty * tiles + tx] = equalize(&hist, tile_area);
        }
    }

    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;
    let last = tiles as isize - 1;

    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let tyf = y as f32 * inv_th - 0.5;
        let ty1 = tyf.floor() as isize;
        let ya = tyf - ty1 as f32;
        let ty2 = (ty1 + 1).min(last) as usize;
        let ty1 = ty1.max(0) as usize;

        for x in 0..width {
            let txf = x as f32 * inv_tw - 0.5;
            let tx1 = txf.floor() as isize;
            let xa = txf - tx1 as f32;
            let tx2 = (tx1 + 1).min(last) as usize;
            let tx1 = tx1.max(0) as usize;

            let v = src.get(x, y) as usize;
            let lut = |tx: usize, ty: usize| luts[ty * tiles + tx][v] as f32;
            let top = lut(tx1, ty1) * (1.0 - xa) + lut(tx2, ty1) * xa;
            let bottom = lut(tx1, ty2) * (1.0 - xa) + lut(tx2, ty2) * xa;
            let res = top * (1.0 - ya) + bottom * ya;
            out.push(res.round().clamp(0.0, 255.0) as u8);
        }
    }

    GrayImage::from_vec(width, height, out)
}

/// Clip every bin at `clip` and hand the excess back evenly, with the
/// remainder spread one count at a time across evenly spaced bins.
fn clip_histogram(hist: &mut [usize; BINS], clip: usize) {
    let mut excess = 0;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }

    let batch = excess / BINS;
    let mut residual = excess - batch * BINS;
    for bin in hist.iter_mut() {
        *bin += batch;
    }
    if residual > 0 {
        let step = (BINS / residual).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

fn equalize(hist: &[usize; BINS], area: usize) -> [u8; BINS] {
    let scale = (BINS - 1) as f32 / area as f32;
    let mut lut = [0u8; BINS];
    let mut sum = 0;
    for (entry, &bin) in lut.iter_mut().zip(hist.iter()) {
        sum += bin;
        *entry = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}
