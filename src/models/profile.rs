//! Processing profiles.
//!
//! A profile is a YAML document naming every stage's parameters. The document
//! is parsed with serde (every field has a default except `name`) and then
//! converted into validated stage records, so an invalid tag or value is
//! reported while loading rather than halfway through a run.

use bilevel::{
    AdaptiveParams, BinarizeMethod, BinarizeParams, CannyParams, ContrastMethod, ContrastParams,
    DownscaleMethod, DownscaleParams, EdgeOrder, KernelShape, LuminanceMethod, LuminanceParams,
    MorphologyParams, NormalizeParams, ParamError,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ProfileError;

/// Stages that run after luminance extraction.
///
/// Shared by single runs and matrix configurations so both paths apply the
/// exact same sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskStages {
    pub contrast: Option<ContrastParams>,
    pub downscale: DownscaleParams,
    pub binarize: BinarizeParams,
    pub morphology: MorphologyParams,
}

/// Options handed to the vector tracer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceParams {
    /// Speckles up to this many pixels are suppressed
    pub turd_size: u32,
    /// Corner threshold; higher values give rounder curves
    pub alpha_max: f64,
    /// Curve optimization tolerance
    pub opt_tolerance: f64,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            turd_size: 2,
            alpha_max: 1.0,
            opt_tolerance: 0.2,
        }
    }
}

/// Preview raster format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// 1-bit grayscale PNG
    #[default]
    OneBitPng,
}

impl ExportFormat {
    pub const TAGS: &'static [&'static str] = &["1bit_png"];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::OneBitPng => "1bit_png",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1bit_png" => Ok(ExportFormat::OneBitPng),
            other => Err(ParamError::UnknownMethod {
                stage: "export",
                value: other.to_string(),
                expected: Self::TAGS,
            }),
        }
    }
}

/// Export settings
#[derive(Debug, Clone, PartialEq)]
pub struct ExportParams {
    pub format: ExportFormat,
    /// Six hex digits, without `#`
    pub foreground_color: String,
    /// Trace smooth outlines; when false the SVG is one square per pixel
    pub vectorize: bool,
    pub trace: TraceParams,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            foreground_color: "000000".to_string(),
            vectorize: true,
            trace: TraceParams::default(),
        }
    }
}

/// A loaded, validated profile. Never mutated after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub normalize: NormalizeParams,
    pub luminance: LuminanceParams,
    pub mask: MaskStages,
    pub export: ExportParams,
    /// Document the profile was built from, echoed into metadata
    pub document: ProfileDocument,
}

impl Profile {
    /// Parse a YAML profile. `origin` names the source in error messages.
    pub fn from_yaml(text: &str, origin: &str) -> Result<Self, ProfileError> {
        let document: ProfileDocument =
            serde_yaml::from_str(text).map_err(|error| ProfileError::Parse {
                origin: origin.to_string(),
                error,
            })?;
        Self::from_document(document)
    }

    pub fn from_document(document: ProfileDocument) -> Result<Self, ProfileError> {
        let invalid = |error: ParamError| ProfileError::Invalid {
            name: document.name.clone(),
            error,
        };
        let stages = &document.stages;

        let normalize = stages.normalize.to_params().map_err(invalid)?;
        let luminance = LuminanceParams {
            method: stages.luminance.method.parse().map_err(invalid)?,
        };
        let contrast = match &stages.contrast {
            Some(doc) => Some(doc.to_params().map_err(invalid)?),
            None => None,
        };
        let downscale = DownscaleParams {
            method: stages
                .downscale
                .interpolation
                .parse::<DownscaleMethod>()
                .map_err(invalid)?,
        };
        let binarize = stages.binarize().to_params().map_err(invalid)?;
        let morphology = stages.morphology.to_params().map_err(invalid)?;

        let export = &stages.export;
        if !is_hex_color(&export.foreground_color) {
            return Err(ProfileError::InvalidColor {
                name: document.name.clone(),
                value: export.foreground_color.clone(),
            });
        }
        let export = ExportParams {
            format: export.format.parse().map_err(invalid)?,
            foreground_color: export.foreground_color.to_ascii_lowercase(),
            vectorize: export.vectorize,
            trace: export.trace,
        };

        Ok(Self {
            name: document.name.clone(),
            normalize,
            luminance,
            mask: MaskStages {
                contrast,
                downscale,
                binarize,
                morphology,
            },
            export,
            document,
        })
    }

    /// The document as JSON, for the metadata `config` field
    pub fn config_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.document).unwrap_or(serde_json::Value::Null)
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 6 && value.chars().all(|c| c.is_ascii_hexdigit())
}

// ---------------------------------------------------------------------------
// YAML document
// ---------------------------------------------------------------------------

/// Profile file as written on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub name: String,
    #[serde(default)]
    pub stages: StagesDocument,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagesDocument {
    pub normalize: NormalizeDocument,
    pub luminance: LuminanceDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<ContrastDocument>,
    pub downscale: DownscaleDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binarize: Option<BinarizeDocument>,
    /// Older profiles name the binarize stage `edges`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<BinarizeDocument>,
    pub morphology: MorphologyDocument,
    pub export: ExportDocument,
}

impl StagesDocument {
    /// `binarize` wins over `edges`; neither means all defaults.
    pub fn binarize(&self) -> BinarizeDocument {
        self.binarize
            .clone()
            .or_else(|| self.edges.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeDocument {
    pub gamma: f32,
    pub percentile_low: f32,
    pub percentile_high: f32,
}

impl Default for NormalizeDocument {
    fn default() -> Self {
        let params = NormalizeParams::default();
        Self {
            gamma: params.gamma,
            percentile_low: params.percentile_low,
            percentile_high: params.percentile_high,
        }
    }
}

impl NormalizeDocument {
    fn to_params(&self) -> Result<NormalizeParams, ParamError> {
        let params = NormalizeParams {
            gamma: self.gamma,
            percentile_low: self.percentile_low,
            percentile_high: self.percentile_high,
        };
        params.validate()?;
        Ok(params)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LuminanceDocument {
    pub method: String,
}

impl Default for LuminanceDocument {
    fn default() -> Self {
        Self {
            method: LuminanceMethod::default().as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastDocument {
    pub method: String,
    pub clip_limit: f32,
    pub tile_size: usize,
}

impl Default for ContrastDocument {
    fn default() -> Self {
        let params = ContrastParams::default();
        Self {
            method: params.method.as_str().to_string(),
            clip_limit: params.clip_limit,
            tile_size: params.tile_size,
        }
    }
}

impl ContrastDocument {
    fn to_params(&self) -> Result<ContrastParams, ParamError> {
        let params = ContrastParams {
            method: self.method.parse::<ContrastMethod>()?,
            clip_limit: self.clip_limit,
            tile_size: self.tile_size,
        };
        params.validate()?;
        Ok(params)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownscaleDocument {
    pub interpolation: String,
}

impl Default for DownscaleDocument {
    fn default() -> Self {
        Self {
            interpolation: DownscaleMethod::default().as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeDocument {
    pub method: String,
    pub pre_blur_sigma: f32,
    pub low_threshold: f32,
    pub high_threshold: f32,
    pub dilate_kernel: usize,
    pub dilate_iterations: usize,
    pub order: String,
    pub block_size: usize,
    pub c_constant: i32,
}

impl Default for BinarizeDocument {
    fn default() -> Self {
        let canny = CannyParams::default();
        let adaptive = AdaptiveParams::default();
        Self {
            method: "canny".to_string(),
            pre_blur_sigma: 0.5,
            low_threshold: canny.low_threshold(),
            high_threshold: canny.high_threshold(),
            dilate_kernel: canny.dilate_kernel(),
            dilate_iterations: canny.dilate_iterations(),
            order: canny.edge_order().as_str().to_string(),
            block_size: adaptive.block_size(),
            c_constant: adaptive.c(),
        }
    }
}

impl BinarizeDocument {
    /// Only the fields of the selected method are validated.
    fn to_params(&self) -> Result<BinarizeParams, ParamError> {
        let method = match BinarizeMethod::check_tag(&self.method)? {
            "canny" => BinarizeMethod::Canny(
                CannyParams::new(self.low_threshold, self.high_threshold)?
                    .dilate(self.dilate_kernel, self.dilate_iterations)?
                    .order(self.order.parse::<EdgeOrder>()?)?,
            ),
            "adaptive_gaussian" => BinarizeMethod::AdaptiveGaussian(AdaptiveParams::new(
                self.block_size,
                self.c_constant,
            )?),
            _ => BinarizeMethod::AdaptiveMean(AdaptiveParams::new(
                self.block_size,
                self.c_constant,
            )?),
        };
        BinarizeParams::new(method).pre_blur(self.pre_blur_sigma)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyDocument {
    pub kernel_shape: String,
    pub kernel_size: usize,
    pub close_iterations: usize,
    pub open_iterations: usize,
    pub erode_iterations: usize,
    pub skeletonize: bool,
}

impl Default for MorphologyDocument {
    fn default() -> Self {
        let params = MorphologyParams::default();
        Self {
            kernel_shape: "ellipse".to_string(),
            kernel_size: params.kernel_size,
            close_iterations: params.close_iterations,
            open_iterations: params.open_iterations,
            erode_iterations: params.erode_iterations,
            skeletonize: params.skeletonize,
        }
    }
}

impl MorphologyDocument {
    fn to_params(&self) -> Result<MorphologyParams, ParamError> {
        let params = MorphologyParams {
            kernel_shape: self.kernel_shape.parse::<KernelShape>()?,
            kernel_size: self.kernel_size,
            close_iterations: self.close_iterations,
            open_iterations: self.open_iterations,
            erode_iterations: self.erode_iterations,
            skeletonize: self.skeletonize,
        };
        params.validate()?;
        Ok(params)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDocument {
    pub format: String,
    pub foreground_color: String,
    pub vectorize: bool,
    pub trace: TraceParams,
}

impl Default for ExportDocument {
    fn default() -> Self {
        let params = ExportParams::default();
        Self {
            format: params.format.as_str().to_string(),
            foreground_color: params.foreground_color,
            vectorize: params.vectorize,
            trace: params.trace,
        }
    }
}
