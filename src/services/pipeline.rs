//! Single-image pipeline.
//!
//! ```text
//! load -> normalize -> luminance -> [contrast] -> downscale + binarize
//!      -> morphology -> export
//! ```
//!
//! [`luminance_field`] and [`bilevel_mask`] are shared with the matrix
//! runner, so a matrix configuration and an equivalent profile produce the
//! same mask.

use bilevel::{
    binarize_to_size, correct, enhance_contrast, extract_luminance, normalize, BinaryMask,
    LuminanceParams, NormalizeParams, RgbImage, ScalarField,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::assets::ProfileLoader;
use crate::error::PipelineError;
use crate::models::{MaskStages, Profile, TargetSize};
use crate::services::exporter::{ArtifactPaths, Exporter, Metadata};

/// One pipeline invocation
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub input: PathBuf,
    pub output_name: String,
    pub output_dir: PathBuf,
    /// Side length; only 128 and 256 are accepted
    pub size: u32,
    /// Built-in profile name or path to a profile file
    pub profile: String,
    /// Export set mask samples as ink; otherwise clear samples are ink
    pub invert: bool,
}

#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub bitmap: Vec<u8>,
    pub svg: String,
    pub opaque_count: usize,
    pub total_pixels: usize,
    pub processing_time_ms: f64,
    pub metadata: Metadata,
    pub paths: ArtifactPaths,
}

impl PipelineResult {
    pub fn opacity_pct(&self) -> f64 {
        opacity_pct(self.opaque_count, self.total_pixels)
    }
}

/// Runs profiles against single images
#[derive(Clone)]
pub struct Pipeline {
    profiles: ProfileLoader,
    exporter: Exporter,
}

impl Pipeline {
    pub fn new(profiles: ProfileLoader, exporter: Exporter) -> Self {
        Self { profiles, exporter }
    }

    /// Validate the request, load its profile and run it.
    pub fn run(&self, request: &PipelineRequest) -> Result<PipelineResult, PipelineError> {
        validate(request)?;
        let profile = self.profiles.load(&request.profile)?;
        self.run_with_profile(request, &profile)
    }

    /// Run an already loaded profile. `request.profile` is ignored.
    pub fn run_with_profile(
        &self,
        request: &PipelineRequest,
        profile: &Profile,
    ) -> Result<PipelineResult, PipelineError> {
        let size = validate(request)?;
        let span = tracing::info_span!(
            "pipeline",
            name = %request.output_name,
            size = %size,
            profile = %profile.name
        );
        let _guard = span.enter();
        let start = Instant::now();

        let image = load_image(&request.input)?;
        let luma = luminance_field(&image, &profile.normalize, &profile.luminance);
        let mask = bilevel_mask(&luma, &profile.mask, size);

        let opaque_count = mask.opaque_count(request.invert);
        let total_pixels = size.total_pixels();
        let metadata = Metadata::new(&request.input, size, &profile.name, opaque_count)
            .with_field("config", profile.config_json());

        let (artifacts, paths) = self.exporter.export(
            &mask,
            request.invert,
            size,
            &profile.export,
            metadata,
            &request.output_dir,
            &request.output_name,
        )?;

        let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            opaque_count,
            total_pixels,
            elapsed_ms = processing_time_ms,
            "Pipeline complete"
        );

        Ok(PipelineResult {
            bitmap: artifacts.bitmap,
            svg: artifacts.svg,
            opaque_count,
            total_pixels,
            processing_time_ms,
            metadata: artifacts.metadata,
            paths,
        })
    }
}

fn validate(request: &PipelineRequest) -> Result<TargetSize, PipelineError> {
    let size = TargetSize::try_from(request.size)?;
    if !request.input.exists() {
        return Err(PipelineError::InputNotFound(request.input.clone()));
    }
    Ok(size)
}

/// Decode any format the `image` crate reads into 8-bit RGB.
pub fn load_image(path: &Path) -> Result<RgbImage, PipelineError> {
    let decoded = image::open(path)
        .map_err(|source| PipelineError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    let (width, height) = decoded.dimensions();
    tracing::debug!(width, height, "Loaded image");
    Ok(RgbImage::new(
        width as usize,
        height as usize,
        decoded.into_raw(),
    )?)
}

/// Normalize and extract luminance at full resolution.
pub fn luminance_field(
    image: &RgbImage,
    normalize_params: &NormalizeParams,
    luminance_params: &LuminanceParams,
) -> ScalarField {
    let linear = normalize(image, normalize_params);
    tracing::debug!(gamma = linear.gamma(), "Normalized");
    let luma = extract_luminance(&linear, luminance_params);
    tracing::debug!(method = %luminance_params.method, "Extracted luminance");
    luma
}

/// Everything from optional contrast enhancement through morphology.
pub fn bilevel_mask(luma: &ScalarField, stages: &MaskStages, size: TargetSize) -> BinaryMask {
    let enhanced;
    let field = match &stages.contrast {
        Some(contrast) => {
            enhanced = enhance_contrast(luma, contrast);
            tracing::debug!(clip_limit = contrast.clip_limit, "Enhanced contrast");
            &enhanced
        }
        None => luma,
    };

    let mask = binarize_to_size(
        field,
        size.pixels() as usize,
        &stages.downscale,
        &stages.binarize,
    );
    tracing::debug!(method = %stages.binarize.method, set = mask.count_set(), "Binarized");

    let corrected = correct(&mask, &stages.morphology);
    tracing::debug!(set = corrected.count_set(), "Morphology applied");
    corrected
}

pub fn opacity_pct(opaque_count: usize, total_pixels: usize) -> f64 {
    if total_pixels == 0 {
        return 0.0;
    }
    opaque_count as f64 / total_pixels as f64 * 100.0
}
