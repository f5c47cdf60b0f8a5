//! Structuring elements.

use std::fmt;
use std::str::FromStr;

use crate::error::ParamError;

/// Shape of the structuring element. Only ellipses are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelShape {
    #[default]
    Ellipse,
}

impl KernelShape {
    pub const TAGS: &'static [&'static str] = &["ellipse"];

    pub fn as_str(self) -> &'static str {
        "ellipse"
    }
}

impl FromStr for KernelShape {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ellipse" => Ok(KernelShape::Ellipse),
            other => Err(ParamError::UnknownMethod {
                stage: "kernel shape",
                value: other.to_string(),
                expected: Self::TAGS,
            }),
        }
    }
}

impl fmt::Display for KernelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offsets of the active cells of a structuring element, relative to its
/// center anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    size: usize,
    offsets: Vec<(isize, isize)>,
}

impl StructuringElement {
    pub fn new(shape: KernelShape, size: usize) -> Self {
        match shape {
            KernelShape::Ellipse => Self::ellipse(size),
        }
    }

    /// Ellipse inscribed in a `size x size` box.
    ///
    /// Row `i` spans `c - dx ..= c + dx` with
    /// `dx = round(c * sqrt((r² - dy²) / r²))`, `r = c = size / 2`. A size
    /// of 3 yields the 4-connected cross.
    pub fn ellipse(size: usize) -> Self {
        let size = size.max(1);
        let r = (size / 2) as isize;
        let c = r;
        let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

        let mut offsets = Vec::new();
        for i in 0..size as isize {
            let dy = i - r;
            if dy.abs() > r {
                continue;
            }
            let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as isize;
            let j1 = (c - dx).max(0);
            let j2 = (c + dx + 1).min(size as isize);
            for j in j1..j2 {
                offsets.push((j - c, dy));
            }
        }
        Self { size, offsets }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// `(dx, dy)` of every active cell.
    pub fn offsets(&self) -> &[(isize, isize)] {
        &self.offsets
    }

    /// Render as rows of `#`/`.`, for diagnostics and tests.
    pub fn to_ascii(&self) -> Vec<String> {
        let half = (self.size / 2) as isize;
        (0..self.size as isize)
            .map(|y| {
                (0..self.size as isize)
                    .map(|x| {
                        if self.offsets.contains(&(x - half, y - half)) {
                            '#'
                        } else {
                            '.'
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_three_is_cross() {
        let se = StructuringElement::ellipse(3);
        assert_eq!(se.to_ascii(), vec![".#.", "###", ".#."]);
    }

    #[test]
    fn test_size_five() {
        let se = StructuringElement::ellipse(5);
        assert_eq!(
            se.to_ascii(),
            vec!["..#..", "#####", "#####", "#####", "..#.."]
        );
    }

    #[test]
    fn test_size_one_is_single_cell() {
        assert_eq!(StructuringElement::ellipse(1).offsets(), &[(0, 0)]);
    }
}
