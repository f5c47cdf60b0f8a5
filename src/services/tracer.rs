//! Vector outline tracing.
//!
//! The production tracer pipes the mask to the `potrace` binary as a P4 PBM
//! and reads the SVG back from its stdout.

use bilevel::BinaryMask;
use regex::{Captures, Regex};
use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use crate::error::TraceError;
use crate::models::{TargetSize, TraceParams};

/// Turns a mask into an SVG document whose outlines cover the exported
/// foreground.
pub trait Tracer: Send + Sync {
    fn trace(
        &self,
        mask: &BinaryMask,
        invert: bool,
        size: TargetSize,
        params: &TraceParams,
    ) -> Result<String, TraceError>;
}

/// Runs `potrace` as a child process. Blocking, no timeout.
#[derive(Debug, Clone)]
pub struct PotraceTracer {
    program: OsString,
}

impl PotraceTracer {
    pub fn new() -> Self {
        Self::with_program("potrace")
    }

    /// Honors `POTRACE_BIN`, falling back to `potrace` on the PATH.
    pub fn from_env() -> Self {
        match std::env::var_os("POTRACE_BIN") {
            Some(program) => Self::with_program(program),
            None => Self::new(),
        }
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(size: TargetSize, params: &TraceParams) -> Vec<String> {
        let side = size.pixels();
        vec![
            "-s".to_string(),
            "-t".to_string(),
            params.turd_size.to_string(),
            "-a".to_string(),
            params.alpha_max.to_string(),
            "-O".to_string(),
            params.opt_tolerance.to_string(),
            "-W".to_string(),
            format!("{side}pt"),
            "-H".to_string(),
            format!("{side}pt"),
            "-o".to_string(),
            "-".to_string(),
        ]
    }
}

impl Default for PotraceTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer for PotraceTracer {
    fn trace(
        &self,
        mask: &BinaryMask,
        invert: bool,
        size: TargetSize,
        params: &TraceParams,
    ) -> Result<String, TraceError> {
        let pbm = encode_pbm(mask, invert);
        let program = self.program.to_string_lossy().into_owned();

        let mut child = Command::new(&self.program)
            .args(Self::args(size, params))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => TraceError::ToolMissing {
                    program: program.clone(),
                },
                _ => TraceError::Io(e),
            })?;

        // Feed stdin from a separate thread so a full stdout pipe cannot
        // deadlock the child.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TraceError::InvalidOutput("stdin was not captured".to_string()))?;
        let writer = std::thread::spawn(move || stdin.write_all(&pbm));

        let output = child.wait_with_output()?;
        let written = writer
            .join()
            .map_err(|_| TraceError::InvalidOutput("stdin writer panicked".to_string()))?;

        if !output.status.success() {
            return Err(TraceError::ToolFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        let svg = String::from_utf8(output.stdout)
            .map_err(|_| TraceError::InvalidOutput("output is not UTF-8".to_string()))?;
        if !svg.contains("<svg") {
            return Err(TraceError::InvalidOutput("no <svg> element".to_string()));
        }

        tracing::debug!(program = %program, bytes = svg.len(), "Traced outline");
        Ok(normalize_svg(&svg, size))
    }
}

/// Binary PBM (P4) of the exported foreground. Set bits are black, rows are
/// packed MSB first and padded to a whole byte.
pub fn encode_pbm(mask: &BinaryMask, invert: bool) -> Vec<u8> {
    let width = mask.width();
    let height = mask.height();
    let bytes_per_row = width.div_ceil(8);
    let foreground = mask.foreground(invert);

    let mut pbm = format!("P4\n{width} {height}\n").into_bytes();
    pbm.reserve(bytes_per_row * height);
    for row in foreground.chunks(width.max(1)) {
        let mut bytes = vec![0u8; bytes_per_row];
        for (x, &on) in row.iter().enumerate() {
            if on {
                bytes[x / 8] |= 0x80 >> (x % 8);
            }
        }
        pbm.extend_from_slice(&bytes);
    }
    pbm
}

fn size_attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(\s)(viewBox|width|height)="[^"]*""#).expect("attribute pattern is valid")
    })
}

/// Rewrite the root element's `viewBox`, `width` and `height` so the
/// document is exactly `size` units square. Only the first occurrence of
/// each attribute is touched.
pub fn normalize_svg(svg: &str, size: TargetSize) -> String {
    let side = size.pixels();
    let mut seen = [false; 3];
    size_attribute_pattern()
        .replace_all(svg, |caps: &Captures| {
            let slot = match &caps[2] {
                "viewBox" => 0,
                "width" => 1,
                _ => 2,
            };
            if seen[slot] {
                return caps[0].to_string();
            }
            seen[slot] = true;
            let value = match slot {
                0 => format!("0 0 {side} {side}"),
                _ => side.to_string(),
            };
            format!(r#"{}{}="{}""#, &caps[1], &caps[2], value)
        })
        .into_owned()
}
