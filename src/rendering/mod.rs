mod svg_to_png;

pub use svg_to_png::SvgRasterizer;

use crate::error::RenderError;
use crate::models::TargetSize;

/// Renders an SVG document to a square 1-bit PNG preview.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, svg: &str, size: TargetSize) -> Result<Vec<u8>, RenderError>;
}
