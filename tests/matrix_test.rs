//! Matrix runner tests: presets, ordering, failure isolation and agreement
//! with the single-image pipeline.

mod common;

use common::*;
use pbsep::assets::ProfileLoader;
use pbsep::error::PipelineError;
use pbsep::models::TargetSize;
use pbsep::services::pipeline::load_image;
use pbsep::services::{
    default_presets, MatrixRequest, MatrixResult, MatrixRunner, Pipeline, SharedPrefix,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;

fn matrix_request(ws: &Workspace, size: u32) -> MatrixRequest {
    MatrixRequest {
        input: ws.input.clone(),
        output_name: "portrait".to_string(),
        output_dir: ws.out.clone(),
        size,
        reference: None,
    }
}

fn runner() -> MatrixRunner {
    MatrixRunner::with_default_presets(exporter_with(Arc::new(FakeTracer::new()))).unwrap()
}

#[test]
fn test_default_matrix_yields_ten_sorted_results() {
    let ws = Workspace::new();
    let report = runner().run(&matrix_request(&ws, 128)).unwrap();

    assert_eq!(report.results.len(), 10);
    assert!(report.failures.is_empty());
    assert!(report
        .results
        .iter()
        .all(|r| r.total_pixels == 128 * 128));
    assert!(report.results.windows(2).all(|w| {
        w[0].opacity_pct < w[1].opacity_pct
            || (w[0].opacity_pct == w[1].opacity_pct && w[0].config.id < w[1].config.id)
    }));

    let mut ids: Vec<u32> = report.results.iter().map(|r| r.config.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());

    assert_eq!(report.matrix_dir, ws.out.join("portrait_matrix"));
    for result in &report.results {
        assert!(result.paths.png.exists());
        assert!(result.paths.bitmap.exists());
        let expected = result.opaque_count as f64 / result.total_pixels as f64 * 100.0;
        assert_eq!(result.opacity_pct, expected);
    }
}

#[test]
fn test_matrix_json_and_gallery() {
    let ws = Workspace::new();
    let report = runner().run(&matrix_request(&ws, 128)).unwrap();

    assert_eq!(report.json_path, report.matrix_dir.join("matrix.json"));
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report.json_path).unwrap()).unwrap();
    let entries = json["results"].as_array().unwrap();
    assert_eq!(entries.len(), 10);
    for (entry, result) in entries.iter().zip(&report.results) {
        assert_eq!(entry["id"], result.config.id);
        assert_eq!(entry["png_path"], result.png_file_name());
        assert_eq!(entry["method"], "adaptive_gaussian");
    }

    let html = fs::read_to_string(&report.gallery_path).unwrap();
    assert_eq!(html.matches("method-badge\">ADAPTIVE").count(), 10);
    assert!(html.contains("portrait_001_adaptive_block9_c2_128x128_1bit.png"));
    assert!(html.contains("portrait_010_adaptive_block15_c3_clahe_128x128_1bit.png"));
}

#[test]
fn test_matrix_metadata_records_config() {
    let ws = Workspace::new();
    let report = runner().run(&matrix_request(&ws, 128)).unwrap();
    let fourth = report
        .results
        .iter()
        .find(|r| r.config.id == 4)
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&fourth.paths.metadata).unwrap()).unwrap();
    assert_eq!(json["profile"], "matrix");
    assert_eq!(json["config_id"], 4);
    assert_eq!(json["block_size"], 9);
    assert_eq!(json["c_constant"], 3);
    assert_eq!(json["use_clahe"], true);
    assert_eq!(json["opaquePixels"], fourth.opaque_count);
}

#[test]
fn test_pipeline_and_matrix_agree() {
    let ws = Workspace::new();
    let report = runner().run(&matrix_request(&ws, 256)).unwrap();

    let plain = write_profile(
        ws.path(),
        "m1.yaml",
        "name: m1\nstages:\n  binarize:\n    method: adaptive_gaussian\n    pre_blur_sigma: 0\n    block_size: 9\n    c_constant: 2\n",
    );
    let clahe = write_profile(
        ws.path(),
        "m2.yaml",
        "name: m2\nstages:\n  contrast: {}\n  binarize:\n    method: adaptive_gaussian\n    pre_blur_sigma: 0\n    block_size: 9\n    c_constant: 2\n",
    );

    let pipeline = Pipeline::new(
        ProfileLoader::embedded(),
        exporter_with(Arc::new(FakeTracer::new())),
    );
    for (id, profile) in [(1, plain), (2, clahe)] {
        let single = pipeline
            .run(&request(
                &ws.input,
                &ws.path().join(format!("single{id}")),
                256,
                profile.to_str().unwrap(),
            ))
            .unwrap();
        let batch = report
            .results
            .iter()
            .find(|r| r.config.id == id)
            .unwrap();
        assert_eq!(single.opaque_count, batch.opaque_count, "config {id}");
        assert_eq!(
            fs::read(&batch.paths.bitmap).unwrap(),
            single.bitmap,
            "config {id}"
        );
    }
}

#[test]
fn test_failures_are_isolated() {
    let ws = Workspace::new();
    let runner =
        MatrixRunner::with_default_presets(exporter_with(Arc::new(FlakyTracer::default())))
            .unwrap();
    let report = runner.run(&matrix_request(&ws, 128)).unwrap();

    assert_eq!(report.results.len(), 5);
    assert_eq!(report.failures.len(), 5);
    assert!(report
        .failures
        .iter()
        .all(|f| f.error.contains("potrace: broken")));
    assert!(report.gallery_path.exists());
}

#[test]
fn test_all_failures_is_an_error() {
    let ws = Workspace::new();
    let runner =
        MatrixRunner::with_default_presets(exporter_with(Arc::new(FailingTracer))).unwrap();
    let err = runner.run(&matrix_request(&ws, 128)).unwrap_err();
    assert!(matches!(err, PipelineError::AllConfigurationsFailed(10)));
}

#[test]
fn test_reference_is_copied_into_gallery() {
    let ws = Workspace::new();
    let reference = ws.path().join("target.png");
    portrait_image().save(&reference).unwrap();

    let request = MatrixRequest {
        reference: Some(reference),
        ..matrix_request(&ws, 128)
    };
    let report = runner().run(&request).unwrap();

    assert!(report.matrix_dir.join("target.png").exists());
    let html = fs::read_to_string(&report.gallery_path).unwrap();
    assert!(html.contains(r#"<img src="target.png" alt="Reference""#));
}

#[test]
fn test_missing_reference_is_rejected_before_work() {
    let ws = Workspace::new();
    let tracer = Arc::new(FakeTracer::new());
    let runner = MatrixRunner::with_default_presets(exporter_with(tracer.clone())).unwrap();
    let request = MatrixRequest {
        reference: Some(ws.path().join("missing.png")),
        ..matrix_request(&ws, 128)
    };

    let err = runner.run(&request).unwrap_err();
    assert!(matches!(err, PipelineError::InputNotFound(ref p) if p.ends_with("missing.png")));
    assert!(tracer.calls().is_empty());
    assert!(!ws.out.exists());
}

#[test]
fn test_invalid_size_is_rejected() {
    let ws = Workspace::new();
    let err = runner().run(&matrix_request(&ws, 64)).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidSize(64)));
    assert!(!ws.out.exists());
}

#[test]
fn test_evaluate_against_shared_prefix() {
    let ws = Workspace::new();
    let image = load_image(&ws.input).unwrap();
    let prefix = SharedPrefix::compute(&image, &ws.input);
    assert_eq!(prefix.luminance.width(), 320);
    assert_eq!(prefix.luminance.height(), 240);

    let (results, failures) =
        runner().evaluate(&prefix, TargetSize::S256, ws.path(), "direct");
    assert!(failures.is_empty());
    assert_eq!(results.len(), 10);
    assert!(results
        .windows(2)
        .all(|w| w[0].opacity_pct <= w[1].opacity_pct));
    assert!(results.iter().all(|r| r.total_pixels == 65536));
}

#[test]
fn test_config_order_and_snapshot_are_independent() {
    let ws = Workspace::new();
    let image = load_image(&ws.input).unwrap();
    let prefix = SharedPrefix::compute(&image, &ws.input);
    let snapshot = prefix.luminance.clone();

    let forward_configs = default_presets().unwrap();
    let mut reversed_configs = forward_configs.clone();
    reversed_configs.reverse();

    let forward_dir = ws.path().join("forward");
    let reversed_dir = ws.path().join("reversed");
    let (forward, _) = MatrixRunner::new(
        exporter_with(Arc::new(FakeTracer::new())),
        forward_configs,
    )
    .evaluate(&prefix, TargetSize::S128, &forward_dir, "portrait");
    let (reversed, _) = MatrixRunner::new(
        exporter_with(Arc::new(FakeTracer::new())),
        reversed_configs,
    )
    .evaluate(&prefix, TargetSize::S128, &reversed_dir, "portrait");

    assert_eq!(prefix.luminance, snapshot);
    assert_eq!(forward.len(), 10);
    assert_eq!(reversed.len(), 10);

    let by_id = |results: &[MatrixResult], id: u32| -> (usize, Vec<u8>) {
        let result = results.iter().find(|r| r.config.id == id).unwrap();
        (result.opaque_count, fs::read(&result.paths.bitmap).unwrap())
    };
    for id in 1..=10 {
        assert_eq!(by_id(&forward, id), by_id(&reversed, id), "config {id}");
    }
    let forward_ids: Vec<u32> = forward.iter().map(|r| r.config.id).collect();
    let reversed_ids: Vec<u32> = reversed.iter().map(|r| r.config.id).collect();
    assert_eq!(forward_ids, reversed_ids);
}
