pub mod profile;
pub mod target;

pub use profile::{ExportFormat, ExportParams, MaskStages, Profile, ProfileDocument, TraceParams};
pub use target::TargetSize;
