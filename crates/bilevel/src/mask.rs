//! Two-valued masks.

use crate::field::ScalarField;

/// Sample value for set (foreground) mask pixels.
pub const FOREGROUND: u8 = 255;
/// Sample value for clear (background) mask pixels.
pub const BACKGROUND: u8 = 0;

/// A square or rectangular mask whose samples are exactly [`FOREGROUND`] or
/// [`BACKGROUND`].
///
/// There is no constructor taking arbitrary bytes, so a third value can never
/// appear downstream of binarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryMask {
    /// All-background mask.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![BACKGROUND; width * height],
        }
    }

    /// Build a mask from a predicate; `true` is foreground.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(if f(x, y) { FOREGROUND } else { BACKGROUND });
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Build a mask from row-major booleans.
    ///
    /// # Panics
    ///
    /// Panics if `bits.len() != width * height`.
    pub fn from_bools(width: usize, height: usize, bits: &[bool]) -> Self {
        assert_eq!(bits.len(), width * height, "mask buffer length mismatch");
        Self {
            width,
            height,
            data: bits
                .iter()
                .map(|&b| if b { FOREGROUND } else { BACKGROUND })
                .collect(),
        }
    }

    /// Parse rows of `#` (foreground) and `.` (background). Handy for tests
    /// and fixtures.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        Self::from_fn(width, height, |x, y| rows[y].as_bytes()[x] == b'#')
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total sample count.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw samples, each either [`FOREGROUND`] or [`BACKGROUND`].
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x] == FOREGROUND
    }

    /// Bounds-checked lookup; `outside` is returned for coordinates off the
    /// mask.
    #[inline]
    pub fn is_set_or(&self, x: isize, y: isize, outside: bool) -> bool {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            outside
        } else {
            self.is_set(x as usize, y as usize)
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        self.data[y * self.width + x] = if on { FOREGROUND } else { BACKGROUND };
    }

    /// Number of [`FOREGROUND`] samples.
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&v| v == FOREGROUND).count()
    }

    /// Whether the sample at `index` is exported as foreground.
    ///
    /// With `invert` the set samples (`> 127`) are foreground, otherwise the
    /// clear samples (`< 128`) are.
    #[inline]
    pub fn is_exported_foreground(&self, index: usize, invert: bool) -> bool {
        if invert {
            self.data[index] > 127
        } else {
            self.data[index] < 128
        }
    }

    /// Exported foreground pattern, row-major.
    pub fn foreground(&self, invert: bool) -> Vec<bool> {
        (0..self.data.len())
            .map(|i| self.is_exported_foreground(i, invert))
            .collect()
    }

    /// Fractional coverage field, 1.0 for set samples and 0.0 otherwise.
    pub fn coverage(&self) -> ScalarField {
        ScalarField::from_fn(self.width, self.height, |x, y| {
            if self.is_set(x, y) {
                1.0
            } else {
                0.0
            }
        })
    }

    /// Count of exported foreground samples.
    pub fn opaque_count(&self, invert: bool) -> usize {
        (0..self.data.len())
            .filter(|&i| self.is_exported_foreground(i, invert))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ascii() {
        let mask = BinaryMask::from_ascii(&["#..", ".#."]);
        assert_eq!(mask.width(), 3);
        assert_eq!(mask.height(), 2);
        assert_eq!(mask.data(), &[255, 0, 0, 0, 255, 0]);
        assert_eq!(mask.count_set(), 2);
    }

    #[test]
    fn test_invert_selects_polarity() {
        let mask = BinaryMask::from_ascii(&["##.."]);
        assert_eq!(mask.foreground(true), vec![true, true, false, false]);
        assert_eq!(mask.foreground(false), vec![false, false, true, true]);
        assert_eq!(mask.opaque_count(true) + mask.opaque_count(false), 4);
    }

    #[test]
    fn test_out_of_bounds_lookup() {
        let mask = BinaryMask::from_ascii(&["#"]);
        assert!(mask.is_set_or(0, 0, false));
        assert!(mask.is_set_or(-1, 0, true));
        assert!(!mask.is_set_or(1, 0, false));
    }
}
