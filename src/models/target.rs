use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

/// Output resolution. Only square 128 and 256 pixel targets exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSize {
    S128,
    S256,
}

impl TargetSize {
    pub const ALL: [TargetSize; 2] = [TargetSize::S128, TargetSize::S256];

    /// Side length in pixels
    pub fn pixels(self) -> u32 {
        match self {
            TargetSize::S128 => 128,
            TargetSize::S256 => 256,
        }
    }

    /// Number of samples in a target-sized mask
    pub fn total_pixels(self) -> usize {
        let side = self.pixels() as usize;
        side * side
    }
}

impl TryFrom<u32> for TargetSize {
    type Error = PipelineError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            128 => Ok(TargetSize::S128),
            256 => Ok(TargetSize::S256),
            other => Err(PipelineError::InvalidSize(other)),
        }
    }
}

impl FromStr for TargetSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{s}' is not a number"))?;
        TargetSize::try_from(value).map_err(|e| e.to_string())
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pixels())
    }
}
