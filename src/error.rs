use std::path::PathBuf;

use bilevel::ParamError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid size: {0}. Must be 128 or 256.")]
    InvalidSize(u32),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to load image {}: {source}", .path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("Invalid parameters: {0}")]
    Params(#[from] ParamError),

    #[error("Vector tracing failed: {0}")]
    Trace(#[from] TraceError),

    #[error("Preview rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Gallery error: {0}")]
    Gallery(#[from] tera::Error),

    #[error("All {0} matrix configurations failed")]
    AllConfigurationsFailed(usize),
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Unknown profile '{name}'. Available: {}", .available.join(", "))]
    NotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("Profile file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to parse profile {origin}: {error}")]
    Parse {
        origin: String,
        #[source]
        error: serde_yaml::Error,
    },

    #[error("Invalid profile '{name}': {error}")]
    Invalid {
        name: String,
        #[source]
        error: ParamError,
    },

    #[error("Invalid profile '{name}': foreground_color '{value}' is not a 6-digit hex color")]
    InvalidColor { name: String, value: String },

    #[error("Failed to read profile: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("{program} not found. Install potrace or set POTRACE_BIN")]
    ToolMissing { program: String },

    #[error("potrace exited with {status}: {stderr}")]
    ToolFailed { status: String, stderr: String },

    #[error("potrace produced invalid output: {0}")]
    InvalidOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("SVG parse error: {0}")]
    SvgParse(String),

    #[error("Failed to allocate pixmap")]
    PixmapAllocation,

    #[error("PNG encode error: {0}")]
    PngEncode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_size() {
        let error = PipelineError::InvalidSize(512);
        assert_eq!(error.to_string(), "Invalid size: 512. Must be 128 or 256.");
    }

    #[test]
    fn test_input_not_found() {
        let error = PipelineError::InputNotFound(PathBuf::from("/tmp/missing.jpg"));
        assert_eq!(error.to_string(), "Input file not found: /tmp/missing.jpg");
    }

    #[test]
    fn test_profile_not_found_lists_available() {
        let error = ProfileError::NotFound {
            name: "poster".to_string(),
            available: vec!["filled".to_string(), "medallion".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Unknown profile 'poster'. Available: filled, medallion"
        );
    }

    #[test]
    fn test_profile_error_is_transparent() {
        let error: PipelineError = ProfileError::FileNotFound(PathBuf::from("x.yaml")).into();
        assert_eq!(error.to_string(), "Profile file not found: x.yaml");
    }

    #[test]
    fn test_trace_error_carries_stderr() {
        let error = TraceError::ToolFailed {
            status: "exit status: 2".to_string(),
            stderr: "potrace: unrecognized option".to_string(),
        };
        let error: PipelineError = error.into();
        assert_eq!(
            error.to_string(),
            "Vector tracing failed: potrace exited with exit status: 2: potrace: unrecognized option"
        );
    }

    #[test]
    fn test_tool_missing() {
        let error = TraceError::ToolMissing {
            program: "potrace".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "potrace not found. Install potrace or set POTRACE_BIN"
        );
    }

    #[test]
    fn test_render_error_pixmap_allocation() {
        let error = RenderError::PixmapAllocation;
        assert_eq!(error.to_string(), "Failed to allocate pixmap");
    }

    #[test]
    fn test_params_error_from_bilevel() {
        let error: PipelineError = ParamError::InvalidBlockSize(8).into();
        assert_eq!(
            error.to_string(),
            "Invalid parameters: block size 8 must be odd and at least 3"
        );
    }
}
