//! Artifact export: packed bitmap, SVG outline, PNG preview and metadata.
//!
//! Everything is built in memory first. Files are written only once every
//! artifact exists, and a failed write removes whatever this export already
//! wrote.

use bilevel::{pack_bits, BinaryMask};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::PipelineError;
use crate::models::{ExportFormat, ExportParams, TargetSize};
use crate::rendering::Rasterizer;
use crate::services::tracer::Tracer;

pub const FORMAT_TAG: &str = "1-bit monochrome (outline)";

/// Metadata written next to the bitmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub source: String,
    pub size: u32,
    pub format: String,
    pub profile: String,
    pub opaque_pixels: usize,
    pub total_pixels: usize,
    pub bytes: usize,
    /// Run-specific fields (echoed profile or matrix configuration)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Metadata {
    pub fn new(source: &Path, size: TargetSize, profile: &str, opaque_pixels: usize) -> Self {
        let total_pixels = size.total_pixels();
        Self {
            source: source.display().to_string(),
            size: size.pixels(),
            format: FORMAT_TAG.to_string(),
            profile: profile.to_string(),
            opaque_pixels,
            total_pixels,
            bytes: total_pixels / 8,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// In-memory export products
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub bitmap: Vec<u8>,
    pub svg: String,
    pub png: Vec<u8>,
    pub metadata: Metadata,
    pub metadata_json: String,
}

/// Where an export was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub bitmap: PathBuf,
    pub svg: PathBuf,
    pub png: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    /// `<name>_<N>x<N>.bin`, `_1bit.svg`, `_1bit.png`, `_metadata.json`
    pub fn new(output_dir: &Path, output_name: &str, size: TargetSize) -> Self {
        let stem = format!("{output_name}_{size}x{size}");
        Self {
            bitmap: output_dir.join(format!("{stem}.bin")),
            svg: output_dir.join(format!("{stem}_1bit.svg")),
            png: output_dir.join(format!("{stem}_1bit.png")),
            metadata: output_dir.join(format!("{stem}_metadata.json")),
        }
    }
}

/// Produces export artifacts with injected tracing and preview backends.
#[derive(Clone)]
pub struct Exporter {
    tracer: Arc<dyn Tracer>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl Exporter {
    pub fn new(tracer: Arc<dyn Tracer>, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self { tracer, rasterizer }
    }

    /// Build every artifact in memory. Nothing touches the filesystem.
    pub fn render(
        &self,
        mask: &BinaryMask,
        invert: bool,
        size: TargetSize,
        params: &ExportParams,
        metadata: Metadata,
    ) -> Result<Artifacts, PipelineError> {
        let bitmap = pack_bits(mask, invert);
        let svg = if params.vectorize {
            self.tracer.trace(mask, invert, size, &params.trace)?
        } else {
            rect_svg(mask, invert, size, &params.foreground_color)
        };
        let png = match params.format {
            ExportFormat::OneBitPng => self.rasterizer.rasterize(&svg, size)?,
        };
        let metadata_json = serde_json::to_string_pretty(&metadata)?;

        Ok(Artifacts {
            bitmap,
            svg,
            png,
            metadata,
            metadata_json,
        })
    }

    /// Render and write all four files.
    #[allow(clippy::too_many_arguments)]
    pub fn export(
        &self,
        mask: &BinaryMask,
        invert: bool,
        size: TargetSize,
        params: &ExportParams,
        metadata: Metadata,
        output_dir: &Path,
        output_name: &str,
    ) -> Result<(Artifacts, ArtifactPaths), PipelineError> {
        let artifacts = self.render(mask, invert, size, params, metadata)?;
        let paths = ArtifactPaths::new(output_dir, output_name, size);
        write_all(&artifacts, &paths, output_dir)?;
        tracing::debug!(bitmap = %paths.bitmap.display(), "Wrote artifacts");
        Ok((artifacts, paths))
    }
}

/// Write artifacts, removing already-written files if any write fails.
pub fn write_all(
    artifacts: &Artifacts,
    paths: &ArtifactPaths,
    output_dir: &Path,
) -> Result<(), PipelineError> {
    fs::create_dir_all(output_dir)?;

    let files: [(&Path, &[u8]); 4] = [
        (paths.bitmap.as_path(), artifacts.bitmap.as_slice()),
        (paths.svg.as_path(), artifacts.svg.as_bytes()),
        (paths.png.as_path(), artifacts.png.as_slice()),
        (paths.metadata.as_path(), artifacts.metadata_json.as_bytes()),
    ];

    let mut written: Vec<&Path> = Vec::with_capacity(files.len());
    for (path, bytes) in files {
        if let Err(e) = fs::write(path, bytes) {
            for done in &written {
                if let Err(cleanup) = fs::remove_file(done) {
                    tracing::warn!(path = %done.display(), %cleanup, "Failed to remove partial artifact");
                }
            }
            return Err(e.into());
        }
        written.push(path);
    }
    Ok(())
}

/// One unit square per foreground pixel, for when tracing is turned off.
pub fn rect_svg(mask: &BinaryMask, invert: bool, size: TargetSize, color: &str) -> String {
    let side = size.pixels();
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {side} {side}\" shape-rendering=\"crispEdges\">\n"
    );
    let width = mask.width();
    for (i, on) in mask.foreground(invert).into_iter().enumerate() {
        if on {
            let _ = writeln!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"1\" height=\"1\" fill=\"#{color}\"/>",
                i % width,
                i / width
            );
        }
    }
    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RenderError, TraceError};
    use crate::models::TraceParams;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingTracer(AtomicUsize);

    impl Tracer for CountingTracer {
        fn trace(
            &self,
            _mask: &BinaryMask,
            _invert: bool,
            size: TargetSize,
            _params: &TraceParams,
        ) -> Result<String, TraceError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(format!("<svg viewBox=\"0 0 {size} {size}\"/>"))
        }
    }

    struct StubRasterizer;

    impl Rasterizer for StubRasterizer {
        fn rasterize(&self, _svg: &str, _size: TargetSize) -> Result<Vec<u8>, RenderError> {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
    }

    struct BrokenRasterizer;

    impl Rasterizer for BrokenRasterizer {
        fn rasterize(&self, _svg: &str, _size: TargetSize) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::PixmapAllocation)
        }
    }

    fn exporter(rasterizer: Arc<dyn Rasterizer>) -> (Exporter, Arc<CountingTracer>) {
        let tracer = Arc::new(CountingTracer(AtomicUsize::new(0)));
        (Exporter::new(tracer.clone(), rasterizer), tracer)
    }

    fn mask_128() -> BinaryMask {
        BinaryMask::from_fn(128, 128, |x, y| x < 4 && y < 2)
    }

    #[test]
    fn test_paths_follow_naming_scheme() {
        let paths = ArtifactPaths::new(Path::new("/out"), "owl", TargetSize::S256);
        assert_eq!(paths.bitmap, PathBuf::from("/out/owl_256x256.bin"));
        assert_eq!(paths.svg, PathBuf::from("/out/owl_256x256_1bit.svg"));
        assert_eq!(paths.png, PathBuf::from("/out/owl_256x256_1bit.png"));
        assert_eq!(paths.metadata, PathBuf::from("/out/owl_256x256_metadata.json"));
    }

    #[test]
    fn test_metadata_json_keys() {
        let metadata = Metadata::new(Path::new("in.jpg"), TargetSize::S128, "medallion", 8);
        let json: serde_json::Value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["source"], "in.jpg");
        assert_eq!(json["size"], 128);
        assert_eq!(json["format"], FORMAT_TAG);
        assert_eq!(json["opaquePixels"], 8);
        assert_eq!(json["totalPixels"], 16384);
        assert_eq!(json["bytes"], 2048);
        assert!(json.get("config").is_none());

        let json = serde_json::to_value(metadata.with_field("config_id", 3)).unwrap();
        assert_eq!(json["config_id"], 3);
    }

    #[test]
    fn test_export_writes_four_files() {
        let dir = TempDir::new().unwrap();
        let (exporter, tracer) = exporter(Arc::new(StubRasterizer));
        let mask = mask_128();
        let metadata = Metadata::new(Path::new("in.jpg"), TargetSize::S128, "p", 8);

        let (artifacts, paths) = exporter
            .export(
                &mask,
                true,
                TargetSize::S128,
                &ExportParams::default(),
                metadata,
                dir.path(),
                "owl",
            )
            .unwrap();

        assert_eq!(tracer.0.load(Ordering::SeqCst), 1);
        assert_eq!(artifacts.bitmap.len(), 2048);
        assert_eq!(artifacts.bitmap[0], 0xf0);
        assert_eq!(fs::read(&paths.bitmap).unwrap(), artifacts.bitmap);
        assert!(paths.svg.exists() && paths.png.exists() && paths.metadata.exists());
    }

    #[test]
    fn test_rect_svg_when_not_vectorizing() {
        let (exporter, tracer) = exporter(Arc::new(StubRasterizer));
        let params = ExportParams {
            vectorize: false,
            ..ExportParams::default()
        };
        let metadata = Metadata::new(Path::new("in.jpg"), TargetSize::S128, "p", 8);
        let artifacts = exporter
            .render(&mask_128(), true, TargetSize::S128, &params, metadata)
            .unwrap();

        assert_eq!(tracer.0.load(Ordering::SeqCst), 0);
        assert_eq!(artifacts.svg.matches("<rect ").count(), 8);
        assert!(artifacts
            .svg
            .contains(r##"<rect x="3" y="1" width="1" height="1" fill="#000000"/>"##));
        assert!(artifacts.svg.contains(r#"viewBox="0 0 128 128""#));
    }

    #[test]
    fn test_render_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let (exporter, _) = exporter(Arc::new(BrokenRasterizer));
        let metadata = Metadata::new(Path::new("in.jpg"), TargetSize::S128, "p", 8);

        let err = exporter
            .export(
                &mask_128(),
                true,
                TargetSize::S128,
                &ExportParams::default(),
                metadata,
                dir.path(),
                "owl",
            )
            .unwrap_err();

        assert!(matches!(err, PipelineError::Render(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_write_removes_earlier_files() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "owl", TargetSize::S128);
        // A directory where the PNG should go makes the third write fail
        fs::create_dir(&paths.png).unwrap();

        let (exporter, _) = exporter(Arc::new(StubRasterizer));
        let metadata = Metadata::new(Path::new("in.jpg"), TargetSize::S128, "p", 8);
        let artifacts = exporter
            .render(&mask_128(), true, TargetSize::S128, &ExportParams::default(), metadata)
            .unwrap();

        let err = write_all(&artifacts, &paths, dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
        assert!(!paths.bitmap.exists());
        assert!(!paths.svg.exists());
        assert!(!paths.metadata.exists());
    }
}
