pub mod exporter;
pub mod gallery;
pub mod matrix;
pub mod pipeline;
pub mod tracer;

pub use exporter::{ArtifactPaths, Artifacts, Exporter, Metadata};
pub use matrix::{
    default_presets, MatrixConfig, MatrixFailure, MatrixReport, MatrixRequest, MatrixResult,
    MatrixRunner, SharedPrefix,
};
pub use pipeline::{Pipeline, PipelineRequest, PipelineResult};
pub use tracer::{PotraceTracer, Tracer};
