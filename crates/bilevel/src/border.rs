//! Out-of-bounds index mapping for neighborhood filters.

/// How a filter reads samples past the image edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    /// Mirror without repeating the edge sample.
    Reflect101,
    /// Repeat the edge sample.
    Replicate,
}

impl Border {
    /// Map a possibly out-of-range index into `0..len`.
    #[inline]
    pub fn map(self, i: isize, len: usize) -> usize {
        match self {
            Border::Reflect101 => reflect101(i, len),
            Border::Replicate => replicate(i, len),
        }
    }
}

/// Reflect-101 mapping (`gfedcb|abcdefgh|gfedcba`): the edge sample is not
/// repeated.
///
/// `len` must be non-zero. A length-1 axis maps everything to 0.
#[inline]
pub fn reflect101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let n = len as isize;
    let period = 2 * (n - 1);
    let mut i = i.rem_euclid(period);
    if i >= n {
        i = period - i;
    }
    i as usize
}

/// Replicate mapping (`aaaaaa|abcdefgh|hhhhhhh`).
#[inline]
pub fn replicate(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}
