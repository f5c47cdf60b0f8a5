//! Batch evaluation of binarization configurations.
//!
//! Normalization and luminance extraction run once into a [`SharedPrefix`].
//! Each [`MatrixConfig`] then runs the remaining stages against that
//! read-only snapshot on the rayon pool. A configuration that fails is
//! logged and reported without stopping the others.

use bilevel::{
    AdaptiveParams, BinarizeMethod, BinarizeParams, CannyParams, ContrastParams, DownscaleParams,
    EdgeOrder, LuminanceParams, MorphologyParams, NormalizeParams, ParamError, RgbImage,
    ScalarField,
};
use rayon::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::models::{ExportParams, MaskStages, TargetSize};
use crate::services::exporter::{ArtifactPaths, Exporter, Metadata};
use crate::services::gallery;
use crate::services::pipeline::{bilevel_mask, load_image, luminance_field, opacity_pct};

/// Profile name recorded in matrix metadata
pub const MATRIX_PROFILE: &str = "matrix";

/// One binarization variant to evaluate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixConfig {
    pub id: u32,
    pub binarize: BinarizeParams,
    pub use_clahe: bool,
    pub erode_iterations: usize,
    pub skeletonize: bool,
}

impl MatrixConfig {
    /// Adaptive Gaussian threshold without pre-blur
    pub fn adaptive_gaussian(
        id: u32,
        block_size: usize,
        c: i32,
        use_clahe: bool,
    ) -> Result<Self, ParamError> {
        let method = BinarizeMethod::AdaptiveGaussian(AdaptiveParams::new(block_size, c)?);
        Ok(Self {
            id,
            binarize: BinarizeParams::new(method),
            use_clahe,
            erode_iterations: 0,
            skeletonize: false,
        })
    }

    pub fn canny(id: u32, params: CannyParams, pre_blur_sigma: f32) -> Result<Self, ParamError> {
        Ok(Self {
            id,
            binarize: BinarizeParams::new(BinarizeMethod::Canny(params)).pre_blur(pre_blur_sigma)?,
            use_clahe: false,
            erode_iterations: 0,
            skeletonize: false,
        })
    }

    pub fn erode(mut self, iterations: usize) -> Self {
        self.erode_iterations = iterations;
        self
    }

    pub fn skeleton(mut self) -> Self {
        self.skeletonize = true;
        self
    }

    pub fn method(&self) -> &'static str {
        self.binarize.method.tag()
    }

    /// Stage parameters: CLAHE if requested, then close 1 and open 1 plus
    /// this configuration's erosion and thinning.
    pub fn stages(&self) -> MaskStages {
        MaskStages {
            contrast: self.use_clahe.then(ContrastParams::default),
            downscale: DownscaleParams::default(),
            binarize: self.binarize,
            morphology: MorphologyParams {
                erode_iterations: self.erode_iterations,
                skeletonize: self.skeletonize,
                ..MorphologyParams::default()
            },
        }
    }

    /// Output base name, e.g. `owl_003_adaptive_block9_c3` or
    /// `owl_012_canny_low50_high150_blur0.5_erode1`.
    pub fn file_stem(&self, output_name: &str) -> String {
        let id = self.id;
        match &self.binarize.method {
            BinarizeMethod::Canny(canny) => {
                let mut stem = format!(
                    "{output_name}_{id:03}_canny_low{}_high{}_blur{}",
                    canny.low_threshold(),
                    canny.high_threshold(),
                    self.binarize.pre_blur_sigma
                );
                if canny.edge_order() == EdgeOrder::EdgeDown {
                    stem.push_str(&format!("_dilate{}", canny.dilate_kernel()));
                }
                if self.erode_iterations > 0 {
                    stem.push_str(&format!("_erode{}", self.erode_iterations));
                }
                if self.skeletonize {
                    stem.push_str("_skel");
                }
                stem
            }
            BinarizeMethod::AdaptiveGaussian(adaptive) | BinarizeMethod::AdaptiveMean(adaptive) => {
                let mut stem = format!(
                    "{output_name}_{id:03}_adaptive_block{}_c{}",
                    adaptive.block_size(),
                    adaptive.c()
                );
                if self.use_clahe {
                    stem.push_str("_clahe");
                }
                stem
            }
        }
    }

    /// Method-specific fields for metadata and `matrix.json`.
    pub fn fields(&self) -> serde_json::Map<String, Value> {
        let mut fields = serde_json::Map::new();
        fields.insert("id".to_string(), json!(self.id));
        fields.insert("method".to_string(), json!(self.method()));
        fields.insert(
            "pre_blur_sigma".to_string(),
            json!(self.binarize.pre_blur_sigma),
        );
        match &self.binarize.method {
            BinarizeMethod::Canny(canny) => {
                fields.insert("low_threshold".to_string(), json!(canny.low_threshold()));
                fields.insert("high_threshold".to_string(), json!(canny.high_threshold()));
                fields.insert(
                    "pipeline_order".to_string(),
                    json!(canny.edge_order().as_str()),
                );
                fields.insert("dilate_kernel".to_string(), json!(canny.dilate_kernel()));
                fields.insert(
                    "dilate_iterations".to_string(),
                    json!(canny.dilate_iterations()),
                );
                fields.insert(
                    "erode_iterations".to_string(),
                    json!(self.erode_iterations),
                );
                fields.insert("skeletonize".to_string(), json!(self.skeletonize));
            }
            BinarizeMethod::AdaptiveGaussian(adaptive) | BinarizeMethod::AdaptiveMean(adaptive) => {
                fields.insert("block_size".to_string(), json!(adaptive.block_size()));
                fields.insert("c_constant".to_string(), json!(adaptive.c()));
                fields.insert("use_clahe".to_string(), json!(self.use_clahe));
            }
        }
        fields
    }
}

/// The ten adaptive Gaussian presets: block 9 and 11 with C 2 and 3, each
/// with and without CLAHE, then block 15 with C 2 and 3 and CLAHE.
pub fn default_presets() -> Result<Vec<MatrixConfig>, ParamError> {
    let grid: [(usize, i32, bool); 10] = [
        (9, 2, false),
        (9, 2, true),
        (9, 3, false),
        (9, 3, true),
        (11, 2, false),
        (11, 2, true),
        (11, 3, false),
        (11, 3, true),
        (15, 2, true),
        (15, 3, true),
    ];
    grid.iter()
        .zip(1u32..)
        .map(|(&(block, c, clahe), id)| MatrixConfig::adaptive_gaussian(id, block, c, clahe))
        .collect()
}

/// Full-resolution luminance shared by every configuration.
#[derive(Debug, Clone)]
pub struct SharedPrefix {
    pub source: PathBuf,
    pub luminance: ScalarField,
}

impl SharedPrefix {
    /// Default normalization (gamma 2.2, percentiles 1/99) and CIE L*.
    pub fn compute(image: &RgbImage, source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            luminance: luminance_field(
                image,
                &NormalizeParams::default(),
                &LuminanceParams::default(),
            ),
        }
    }
}

/// Outcome of one configuration
#[derive(Debug, Clone)]
pub struct MatrixResult {
    pub config: MatrixConfig,
    pub opaque_count: usize,
    pub total_pixels: usize,
    pub opacity_pct: f64,
    pub paths: ArtifactPaths,
}

impl MatrixResult {
    pub fn png_file_name(&self) -> String {
        self.paths
            .png
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A configuration that failed, with its rendered error
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixFailure {
    pub config_id: u32,
    pub error: String,
}

/// Matrix invocation
#[derive(Debug, Clone)]
pub struct MatrixRequest {
    pub input: PathBuf,
    pub output_name: String,
    /// Parent directory; results go to `<output_dir>/<output_name>_matrix`
    pub output_dir: PathBuf,
    pub size: u32,
    /// Image copied next to the results and shown first in the gallery
    pub reference: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct MatrixReport {
    /// Sorted by ascending opacity, ties by id
    pub results: Vec<MatrixResult>,
    pub failures: Vec<MatrixFailure>,
    pub matrix_dir: PathBuf,
    pub json_path: PathBuf,
    pub gallery_path: PathBuf,
}

impl MatrixReport {
    /// Results ordered by distance from a target opacity.
    pub fn closest_to(&self, target_pct: f64) -> Vec<&MatrixResult> {
        let mut ranked: Vec<&MatrixResult> = self.results.iter().collect();
        ranked.sort_by(|a, b| {
            (a.opacity_pct - target_pct)
                .abs()
                .total_cmp(&(b.opacity_pct - target_pct).abs())
                .then(a.config.id.cmp(&b.config.id))
        });
        ranked
    }
}

/// Runs a list of configurations against one image
#[derive(Clone)]
pub struct MatrixRunner {
    exporter: Exporter,
    configs: Vec<MatrixConfig>,
}

impl MatrixRunner {
    pub fn new(exporter: Exporter, configs: Vec<MatrixConfig>) -> Self {
        Self { exporter, configs }
    }

    pub fn with_default_presets(exporter: Exporter) -> Result<Self, PipelineError> {
        Ok(Self::new(exporter, default_presets()?))
    }

    pub fn configs(&self) -> &[MatrixConfig] {
        &self.configs
    }

    /// Run every configuration and write `matrix.json` and `gallery.html`.
    pub fn run(&self, request: &MatrixRequest) -> Result<MatrixReport, PipelineError> {
        let size = TargetSize::try_from(request.size)?;
        if !request.input.exists() {
            return Err(PipelineError::InputNotFound(request.input.clone()));
        }
        if let Some(reference) = &request.reference {
            if reference.file_name().is_none() || !reference.exists() {
                return Err(PipelineError::InputNotFound(reference.clone()));
            }
        }
        let span = tracing::info_span!("matrix", name = %request.output_name, size = %size);
        let _guard = span.enter();

        let matrix_dir = request
            .output_dir
            .join(format!("{}_matrix", request.output_name));
        fs::create_dir_all(&matrix_dir)?;

        let image = load_image(&request.input)?;
        let prefix = SharedPrefix::compute(&image, &request.input);
        let (results, failures) = self.evaluate(&prefix, size, &matrix_dir, &request.output_name);
        if results.is_empty() && !self.configs.is_empty() {
            return Err(PipelineError::AllConfigurationsFailed(failures.len()));
        }

        let reference = match &request.reference {
            Some(path) => Some(copy_reference(path, &matrix_dir)?),
            None => None,
        };

        let json_path = gallery::write_matrix_json(&results, &matrix_dir)?;
        let gallery_path = gallery::write_gallery(&results, reference.as_deref(), &matrix_dir)?;

        tracing::info!(
            succeeded = results.len(),
            failed = failures.len(),
            gallery = %gallery_path.display(),
            "Matrix complete"
        );

        Ok(MatrixReport {
            results,
            failures,
            matrix_dir,
            json_path,
            gallery_path,
        })
    }

    /// Run all configurations in parallel against `prefix`, writing each
    /// one's artifacts to `output_dir`. Results come back sorted.
    pub fn evaluate(
        &self,
        prefix: &SharedPrefix,
        size: TargetSize,
        output_dir: &Path,
        output_name: &str,
    ) -> (Vec<MatrixResult>, Vec<MatrixFailure>) {
        let outcomes: Vec<(u32, Result<MatrixResult, PipelineError>)> = self
            .configs
            .par_iter()
            .map(|config| {
                (
                    config.id,
                    self.run_config(prefix, config, size, output_dir, output_name),
                )
            })
            .collect();

        let mut results = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (config_id, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    tracing::info!(
                        id = config_id,
                        opacity_pct = result.opacity_pct,
                        png = %result.png_file_name(),
                        "Configuration done"
                    );
                    results.push(result);
                }
                Err(e) => {
                    tracing::warn!(id = config_id, error = %e, "Configuration failed");
                    failures.push(MatrixFailure {
                        config_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        sort_results(&mut results);
        (results, failures)
    }

    fn run_config(
        &self,
        prefix: &SharedPrefix,
        config: &MatrixConfig,
        size: TargetSize,
        output_dir: &Path,
        output_name: &str,
    ) -> Result<MatrixResult, PipelineError> {
        let mask = bilevel_mask(&prefix.luminance, &config.stages(), size);

        let invert = true;
        let opaque_count = mask.opaque_count(invert);
        let total_pixels = size.total_pixels();
        let opacity = opacity_pct(opaque_count, total_pixels);

        let mut metadata = Metadata::new(&prefix.source, size, MATRIX_PROFILE, opaque_count)
            .with_field("opacity_pct", (opacity * 100.0).round() / 100.0);
        for (key, value) in config.fields() {
            let key = if key == "id" { "config_id".to_string() } else { key };
            metadata.extra.insert(key, value);
        }

        let (_, paths) = self.exporter.export(
            &mask,
            invert,
            size,
            &ExportParams::default(),
            metadata,
            output_dir,
            &config.file_stem(output_name),
        )?;

        Ok(MatrixResult {
            config: *config,
            opaque_count,
            total_pixels,
            opacity_pct: opacity,
            paths,
        })
    }
}

/// Ascending opacity, ties broken by id.
pub fn sort_results(results: &mut [MatrixResult]) {
    results.sort_by(|a, b| {
        a.opacity_pct
            .total_cmp(&b.opacity_pct)
            .then(a.config.id.cmp(&b.config.id))
    });
}

fn copy_reference(reference: &Path, matrix_dir: &Path) -> Result<PathBuf, PipelineError> {
    let file_name = reference
        .file_name()
        .ok_or_else(|| PipelineError::InputNotFound(reference.to_path_buf()))?;
    let target = matrix_dir.join(file_name);
    fs::copy(reference, &target)?;
    Ok(target)
}
