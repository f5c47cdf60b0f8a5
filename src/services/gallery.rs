//! Matrix comparison outputs: `matrix.json` and a static HTML gallery.

use bilevel::{BinarizeMethod, EdgeOrder};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

use crate::error::PipelineError;
use crate::services::matrix::MatrixResult;

const GALLERY_TEMPLATE: &str = include_str!("../../templates/gallery.html");

#[derive(Debug, Serialize)]
struct GalleryPage {
    reference: Option<String>,
    cards: Vec<Card>,
}

#[derive(Debug, Serialize)]
struct Card {
    id: u32,
    class: &'static str,
    badge: &'static str,
    opacity: String,
    image: String,
    detail_line1: String,
    detail_line2: String,
}

impl Card {
    fn from_result(result: &MatrixResult) -> Self {
        let config = &result.config;
        let blur = config.binarize.pre_blur_sigma;
        let (class, badge, detail_line1, detail_line2) = match &config.binarize.method {
            BinarizeMethod::Canny(canny) => {
                let order = match canny.edge_order() {
                    EdgeOrder::DownEdge => "down\u{2192}edge",
                    EdgeOrder::EdgeDown => "edge\u{2192}down",
                };
                let mut extra = String::new();
                if canny.dilate_iterations() > 0 {
                    extra.push_str(&format!(", dilate={}", canny.dilate_kernel()));
                }
                if config.erode_iterations > 0 {
                    extra.push_str(&format!(", erode={}", config.erode_iterations));
                }
                if config.skeletonize {
                    extra.push_str(", skel");
                }
                (
                    "canny",
                    "CANNY",
                    format!(
                        "low={}, high={}",
                        canny.low_threshold(),
                        canny.high_threshold()
                    ),
                    format!("blur={blur}, {order}{extra}"),
                )
            }
            BinarizeMethod::AdaptiveGaussian(adaptive) | BinarizeMethod::AdaptiveMean(adaptive) => {
                let mut line2 = format!("blur={blur}");
                if config.use_clahe {
                    line2.push_str(", CLAHE");
                }
                (
                    "adaptive",
                    "ADAPTIVE",
                    format!("block={}, C={}", adaptive.block_size(), adaptive.c()),
                    line2,
                )
            }
        };

        Self {
            id: config.id,
            class,
            badge,
            opacity: format!("{:.1}", result.opacity_pct),
            image: result.png_file_name(),
            detail_line1,
            detail_line2,
        }
    }
}

/// `{"results": [...]}` in the order given, one entry per result.
pub fn matrix_json(results: &[MatrixResult]) -> Value {
    let entries: Vec<Value> = results
        .iter()
        .map(|result| {
            let mut entry = result.config.fields();
            entry.insert("opaque_count".to_string(), json!(result.opaque_count));
            entry.insert("total_pixels".to_string(), json!(result.total_pixels));
            entry.insert("opacity_pct".to_string(), json!(result.opacity_pct));
            entry.insert("png_path".to_string(), json!(result.png_file_name()));
            Value::Object(entry)
        })
        .collect();
    json!({ "results": entries })
}

pub fn write_matrix_json(results: &[MatrixResult], dir: &Path) -> Result<PathBuf, PipelineError> {
    let path = dir.join("matrix.json");
    fs::write(&path, serde_json::to_string_pretty(&matrix_json(results))?)?;
    Ok(path)
}

/// Render the gallery page. Image sources are file names relative to the
/// gallery itself.
pub fn render_gallery(
    results: &[MatrixResult],
    reference: Option<&Path>,
) -> Result<String, PipelineError> {
    let page = GalleryPage {
        reference: reference
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned()),
        cards: results.iter().map(Card::from_result).collect(),
    };

    let mut tera = Tera::default();
    tera.add_raw_template("gallery.html", GALLERY_TEMPLATE)?;
    let context = Context::from_serialize(&page)?;
    Ok(tera.render("gallery.html", &context)?)
}

pub fn write_gallery(
    results: &[MatrixResult],
    reference: Option<&Path>,
    dir: &Path,
) -> Result<PathBuf, PipelineError> {
    let path = dir.join("gallery.html");
    fs::write(&path, render_gallery(results, reference)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TargetSize;
    use crate::services::exporter::ArtifactPaths;
    use crate::services::matrix::MatrixConfig;
    use bilevel::CannyParams;

    fn result(config: MatrixConfig, opaque_count: usize) -> MatrixResult {
        let total_pixels = 128 * 128;
        MatrixResult {
            config,
            opaque_count,
            total_pixels,
            opacity_pct: opaque_count as f64 / total_pixels as f64 * 100.0,
            paths: ArtifactPaths::new(
                Path::new("/out"),
                &config.file_stem("owl"),
                TargetSize::S128,
            ),
        }
    }

    #[test]
    fn test_matrix_json_entries() {
        let adaptive = MatrixConfig::adaptive_gaussian(4, 9, 3, true).unwrap();
        let json = matrix_json(&[result(adaptive, 4096)]);
        let entry = &json["results"][0];
        assert_eq!(entry["id"], 4);
        assert_eq!(entry["method"], "adaptive_gaussian");
        assert_eq!(entry["opaque_count"], 4096);
        assert_eq!(entry["total_pixels"], 16384);
        assert_eq!(entry["opacity_pct"], 25.0);
        assert_eq!(entry["png_path"], "owl_004_adaptive_block9_c3_clahe_128x128_1bit.png");
        assert_eq!(entry["use_clahe"], true);
    }

    #[test]
    fn test_gallery_cards() {
        let adaptive = MatrixConfig::adaptive_gaussian(2, 9, 2, true).unwrap();
        let canny = MatrixConfig::canny(7, CannyParams::default(), 0.5)
            .unwrap()
            .erode(1);
        let html = render_gallery(
            &[result(adaptive, 1638), result(canny, 3277)],
            Some(Path::new("/refs/target.png")),
        )
        .unwrap();

        assert!(html.contains(r#"<img src="target.png" alt="Reference""#));
        assert!(html.contains(r#"<div class="card adaptive">"#));
        assert!(html.contains(r#"<span class="method-badge">ADAPTIVE</span> - 10.0%"#));
        assert!(html.contains("block=9, C=2<br>"));
        assert!(html.contains("blur=0, CLAHE"));
        assert!(html.contains(r#"<span class="method-badge">CANNY</span> - 20.0%"#));
        assert!(html.contains("low=50, high=150<br>"));
        assert!(html.contains("blur=0.5, down\u{2192}edge, erode=1"));
        assert!(html.contains("owl_007_canny_low50_high150_blur0.5_erode1_128x128_1bit.png"));
    }

    #[test]
    fn test_gallery_without_reference() {
        let html = render_gallery(&[], None).unwrap();
        assert!(!html.contains("card reference"));
        assert!(html.contains("PBSEP Matrix Comparison"));
    }
}
