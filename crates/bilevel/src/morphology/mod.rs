//! Structural cleanup of binary masks.
//!
//! [`correct`] always applies the operators in the same order: close, open,
//! erode, skeletonize. Closing first bridges one-pixel gaps before opening
//! removes specks; erosion and thinning come last because they destroy
//! structure the first two are meant to keep.
//!
//! Erosion reads pixels off the mask as set and dilation reads them as
//! clear, so neither operator eats into structure touching the border.

mod kernel;
mod skeleton;

pub use kernel::{KernelShape, StructuringElement};
pub use skeleton::skeletonize;

use crate::error::ParamError;
use crate::mask::BinaryMask;

/// Cleanup operators and their repeat counts. A count of 0 skips the
/// operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorphologyParams {
    pub kernel_shape: KernelShape,
    pub kernel_size: usize,
    pub close_iterations: usize,
    pub open_iterations: usize,
    pub erode_iterations: usize,
    pub skeletonize: bool,
}

impl Default for MorphologyParams {
    fn default() -> Self {
        Self {
            kernel_shape: KernelShape::Ellipse,
            kernel_size: 3,
            close_iterations: 1,
            open_iterations: 1,
            erode_iterations: 0,
            skeletonize: false,
        }
    }
}

impl MorphologyParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.kernel_size == 0 {
            return Err(ParamError::OutOfRange {
                name: "kernel_size",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Run close, open, erode and skeletonize as configured.
pub fn correct(mask: &BinaryMask, params: &MorphologyParams) -> BinaryMask {
    let element = StructuringElement::new(params.kernel_shape, params.kernel_size);
    let mut out = mask.clone();
    if params.close_iterations > 0 {
        out = close(&out, &element, params.close_iterations);
    }
    if params.open_iterations > 0 {
        out = open(&out, &element, params.open_iterations);
    }
    if params.erode_iterations > 0 {
        out = erode(&out, &element, params.erode_iterations);
    }
    if params.skeletonize {
        out = skeletonize(&out);
    }
    out
}

/// Set a pixel if any pixel under the element is set, `iterations` times.
pub fn dilate(mask: &BinaryMask, element: &StructuringElement, iterations: usize) -> BinaryMask {
    let mut out = mask.clone();
    for _ in 0..iterations {
        out = apply(&out, element, Op::Dilate);
    }
    out
}

/// Keep a pixel only if every pixel under the element is set,
/// `iterations` times.
pub fn erode(mask: &BinaryMask, element: &StructuringElement, iterations: usize) -> BinaryMask {
    let mut out = mask.clone();
    for _ in 0..iterations {
        out = apply(&out, element, Op::Erode);
    }
    out
}

/// `iterations` dilations followed by as many erosions.
pub fn close(mask: &BinaryMask, element: &StructuringElement, iterations: usize) -> BinaryMask {
    erode(&dilate(mask, element, iterations), element, iterations)
}

/// `iterations` erosions followed by as many dilations.
pub fn open(mask: &BinaryMask, element: &StructuringElement, iterations: usize) -> BinaryMask {
    dilate(&erode(mask, element, iterations), element, iterations)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Op {
    Dilate,
    Erode,
}

fn apply(mask: &BinaryMask, element: &StructuringElement, op: Op) -> BinaryMask {
    let offsets = element.offsets();
    BinaryMask::from_fn(mask.width(), mask.height(), |x, y| {
        let (x, y) = (x as isize, y as isize);
        match op {
            Op::Dilate => offsets
                .iter()
                .any(|&(dx, dy)| mask.is_set_or(x + dx, y + dy, false)),
            Op::Erode => offsets
                .iter()
                .all(|&(dx, dy)| mask.is_set_or(x + dx, y + dy, true)),
        }
    })
}
