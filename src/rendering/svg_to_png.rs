use resvg::usvg::{self, Transform};
use std::io::Cursor;
use tiny_skia::Pixmap;

use super::Rasterizer;
use crate::error::RenderError;
use crate::models::TargetSize;

/// Pixels darker than this (0-255 luma, after compositing on white) are ink.
const INK_THRESHOLD: u32 = 128;

/// Renders SVG previews with resvg and encodes them as 1-bit grayscale PNG.
///
/// The SVG is scaled to fit the square target, centered, and flattened onto
/// white. Every pixel is then snapped to black or white so the preview has
/// the same two levels as the bitmap.
#[derive(Debug, Clone)]
pub struct SvgRasterizer {
    optimize: bool,
}

impl SvgRasterizer {
    pub fn new() -> Self {
        Self { optimize: true }
    }

    /// Skip the oxipng pass. Output stays a plain 1-bit grayscale PNG.
    pub fn without_optimization() -> Self {
        Self { optimize: false }
    }

    /// Parse and rasterize SVG to an RGBA pixmap on white
    fn rasterize_svg(&self, svg: &str, side: u32) -> Result<Pixmap, RenderError> {
        let options = usvg::Options::default();
        let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
            .map_err(|e| RenderError::SvgParse(e.to_string()))?;

        let svg_size = tree.size();
        let scale = (side as f32 / svg_size.width()).min(side as f32 / svg_size.height());
        let offset_x = (side as f32 - svg_size.width() * scale) / 2.0;
        let offset_y = (side as f32 - svg_size.height() * scale) / 2.0;

        let mut pixmap = Pixmap::new(side, side).ok_or(RenderError::PixmapAllocation)?;
        pixmap.fill(tiny_skia::Color::WHITE);

        let transform = Transform::from_scale(scale, scale).post_translate(offset_x, offset_y);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for SvgRasterizer {
    fn rasterize(&self, svg: &str, size: TargetSize) -> Result<Vec<u8>, RenderError> {
        let side = size.pixels();
        let pixmap = self.rasterize_svg(svg, side)?;
        let levels = threshold_to_white(pixmap.data());
        let packed = pack_rows(&levels, side as usize);

        // Fast settings; oxipng re-compresses below
        let png_bytes = encode_png(side, &packed)?;
        if !self.optimize {
            return Ok(png_bytes);
        }

        let optimized = oxipng::optimize_from_memory(
            &png_bytes,
            &oxipng::Options {
                strip: oxipng::StripChunks::Safe,
                optimize_alpha: false,
                ..Default::default()
            },
        )
        .unwrap_or(png_bytes);
        tracing::trace!(bytes = optimized.len(), "Encoded preview PNG");
        Ok(optimized)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// One `bool` per pixel, `true` for white.
///
/// The pixmap was filled with opaque white first, so every pixel is opaque
/// and premultiplication does not matter.
fn threshold_to_white(rgba: &[u8]) -> Vec<bool> {
    rgba.chunks_exact(4)
        .map(|px| {
            let luma = (299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32) / 1000;
            luma >= INK_THRESHOLD
        })
        .collect()
}

/// Pack 1-bit rows, MSB first, each row padded to a whole byte.
fn pack_rows(levels: &[bool], width: usize) -> Vec<u8> {
    let bytes_per_row = width.div_ceil(8);
    let mut packed = Vec::with_capacity(bytes_per_row * levels.len() / width.max(1));
    for row in levels.chunks(width) {
        let mut bytes = vec![0u8; bytes_per_row];
        for (i, &white) in row.iter().enumerate() {
            if white {
                bytes[i / 8] |= 0x80 >> (i % 8);
            }
        }
        packed.extend_from_slice(&bytes);
    }
    packed
}

fn encode_png(side: u32, packed: &[u8]) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, side, side);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::One);
        encoder.set_compression(png::Compression::Fast);
        encoder.set_filter(png::FilterType::NoFilter);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(packed)
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}
