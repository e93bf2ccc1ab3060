//! Tests for HTML report assembly

use chat_report::error::ChatReportError;
use chat_report::report::{assemble_report, default_charts, ReportTemplate};
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_builtin_report_lists_every_chart() {
    let dir = tempdir().expect("Failed to create temp directory");
    let report_path = dir.path().join("report.html");
    let template = ReportTemplate::builtin().expect("Failed to load template");

    let written = assemble_report(&default_charts(), Path::new("charts"), &template, &report_path)
        .expect("Failed to assemble report");
    assert_eq!(written, report_path);

    let html = std::fs::read_to_string(&report_path).expect("Failed to read report");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(!html.contains("$charts"));
    assert_eq!(html.matches(r#"<div class="chart">"#).count(), 8);
    for chart in default_charts() {
        assert!(html.contains(&format!(r#"src="charts/{}""#, chart.file)), "{}", chart.file);
        assert!(html.contains(chart.description));
    }

    // sections keep the fixed order
    let comparison = html.find("Chat Comparison").expect("comparison section");
    let words = html.find("Word Frequency").expect("word section");
    assert!(comparison < words);
}

#[test]
fn test_missing_images_are_not_checked() {
    let dir = tempdir().expect("Failed to create temp directory");
    let report_path = dir.path().join("report.html");
    let template = ReportTemplate::new("<body>${charts}</body>").expect("Failed to load template");

    assemble_report(&default_charts(), &dir.path().join("nowhere"), &template, &report_path)
        .expect("Failed to assemble report");
    assert!(report_path.exists());
}

#[test]
fn test_custom_template_from_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    let template_path = dir.path().join("template.html");
    std::fs::write(&template_path, "<h1>Costs $$0</h1>\n$charts\n").expect("Failed to write template");

    let template = ReportTemplate::from_file(&template_path).expect("Failed to load template");
    let report_path = dir.path().join("out.html");
    assemble_report(&default_charts()[..2], Path::new("img"), &template, &report_path)
        .expect("Failed to assemble report");

    let html = std::fs::read_to_string(&report_path).expect("Failed to read report");
    assert!(html.starts_with("<h1>Costs $0</h1>"));
    assert_eq!(html.matches("<img").count(), 2);
}

#[test]
fn test_unknown_placeholder_writes_nothing() {
    let dir = tempdir().expect("Failed to create temp directory");
    let report_path = dir.path().join("report.html");
    let template = ReportTemplate::new("$title $charts").expect("Failed to load template");

    let err = assemble_report(&default_charts(), Path::new("charts"), &template, &report_path).unwrap_err();
    assert!(matches!(err, ChatReportError::Template(_)));
    assert!(!report_path.exists());
}

#[test]
fn test_missing_template_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    let err = ReportTemplate::from_file(&dir.path().join("absent.html")).unwrap_err();
    assert!(matches!(err, ChatReportError::Io(_)));
}

#[test]
fn test_image_paths_are_relative_to_report() {
    let dir = tempdir().expect("Failed to create temp directory");
    let out = dir.path().join("out");
    std::fs::create_dir(&out).expect("Failed to create output directory");
    let template = ReportTemplate::builtin().expect("Failed to load template");

    let report_path = out.join("r.html");
    assemble_report(&default_charts(), &out.join("charts"), &template, &report_path)
        .expect("Failed to assemble report");

    let html = std::fs::read_to_string(&report_path).expect("Failed to read report");
    assert!(html.contains(r#"src="charts/chat_comparison.png""#));
    assert!(!html.contains(&*out.to_string_lossy()));
}
