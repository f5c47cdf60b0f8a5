//! In-process stand-ins for the tracing and preview backends.

use bilevel::BinaryMask;
use pbsep::error::{RenderError, TraceError};
use pbsep::models::{TargetSize, TraceParams};
use pbsep::rendering::Rasterizer;
use pbsep::services::Tracer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Records every call and returns a minimal square SVG.
#[derive(Default)]
pub struct FakeTracer {
    calls: Mutex<Vec<(bool, TargetSize, usize)>>,
}

impl FakeTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(invert, size, exported foreground count)` per call
    pub fn calls(&self) -> Vec<(bool, TargetSize, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Tracer for FakeTracer {
    fn trace(
        &self,
        mask: &BinaryMask,
        invert: bool,
        size: TargetSize,
        _params: &TraceParams,
    ) -> Result<String, TraceError> {
        self.calls
            .lock()
            .unwrap()
            .push((invert, size, mask.opaque_count(invert)));
        Ok(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}"><path d="M0 0h1v1h-1z"/></svg>"#
        ))
    }
}

/// Fails every call the way a crashing potrace would.
pub struct FailingTracer;

impl Tracer for FailingTracer {
    fn trace(
        &self,
        _mask: &BinaryMask,
        _invert: bool,
        _size: TargetSize,
        _params: &TraceParams,
    ) -> Result<String, TraceError> {
        Err(TraceError::ToolFailed {
            status: "exit status: 1".to_string(),
            stderr: "potrace: broken".to_string(),
        })
    }
}

/// Fails every second call.
#[derive(Default)]
pub struct FlakyTracer {
    calls: AtomicUsize,
}

impl Tracer for FlakyTracer {
    fn trace(
        &self,
        mask: &BinaryMask,
        invert: bool,
        size: TargetSize,
        params: &TraceParams,
    ) -> Result<String, TraceError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 1 {
            return FailingTracer.trace(mask, invert, size, params);
        }
        FakeTracer::new().trace(mask, invert, size, params)
    }
}

/// Returns a PNG signature instead of rendering.
pub struct FakeRasterizer;

pub const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

impl Rasterizer for FakeRasterizer {
    fn rasterize(&self, _svg: &str, _size: TargetSize) -> Result<Vec<u8>, RenderError> {
        Ok(FAKE_PNG.to_vec())
    }
}
