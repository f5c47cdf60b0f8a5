//! Synthetic input images and profiles written to temporary directories.

use pbsep::rendering::Rasterizer;
use pbsep::services::{Exporter, PipelineRequest, Tracer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A 320x240 "photo": dark disc with a bright rim on a diagonal gradient,
/// plus a high-frequency stripe band so every binarizer finds structure.
pub fn portrait_image() -> image::RgbImage {
    image::RgbImage::from_fn(320, 240, |x, y| {
        let dx = x as f32 - 160.0;
        let dy = y as f32 - 120.0;
        let r = (dx * dx + dy * dy).sqrt();
        let base = ((x + y) * 255 / (320 + 240)) as u8;
        if r < 70.0 {
            image::Rgb([40, 30, 35])
        } else if r < 78.0 {
            image::Rgb([240, 230, 220])
        } else if y > 200 && (x / 6) % 2 == 0 {
            image::Rgb([20, 20, 20])
        } else {
            image::Rgb([base, base / 2 + 60, 200 - base / 2])
        }
    })
}

/// Save [`portrait_image`] as PNG and return its path.
pub fn write_portrait(dir: &Path) -> PathBuf {
    let path = dir.join("portrait.png");
    portrait_image().save(&path).unwrap();
    path
}

pub fn write_profile(dir: &Path, file_name: &str, yaml: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, yaml).unwrap();
    path
}

pub fn exporter_with(tracer: Arc<dyn Tracer>) -> Exporter {
    Exporter::new(tracer, Arc::new(super::FakeRasterizer) as Arc<dyn Rasterizer>)
}

pub fn request(input: &Path, output_dir: &Path, size: u32, profile: &str) -> PipelineRequest {
    PipelineRequest {
        input: input.to_path_buf(),
        output_name: "portrait".to_string(),
        output_dir: output_dir.to_path_buf(),
        size,
        profile: profile.to_string(),
        invert: true,
    }
}

/// Workspace with an input image and an empty output directory
pub struct Workspace {
    pub dir: TempDir,
    pub input: PathBuf,
    pub out: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let input = write_portrait(dir.path());
        let out = dir.path().join("out");
        Self { dir, input, out }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
