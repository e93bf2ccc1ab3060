//! Tests for pipeline metric names and recording

use chat_report::metrics::PipelineMetrics;
use std::collections::HashSet;
use std::time::Duration;

#[test]
fn test_metric_names_are_distinct_and_prefixed() {
    let metrics = PipelineMetrics::default();
    let names = [
        metrics.rows_read_total,
        metrics.messages_loaded_total,
        metrics.classifier_failures_total,
        metrics.charts_rendered_total,
        metrics.stage_duration,
        metrics.conversation_blocks,
    ];

    let unique: HashSet<&str> = names.iter().copied().collect();
    assert_eq!(unique.len(), names.len());
    assert!(names.iter().all(|n| n.starts_with("chat_report_")));
}

#[test]
fn test_recording_without_recorder() {
    let metrics = PipelineMetrics::default();
    metrics.record_load(0, 0);
    metrics.record_classifier_failures(0);
    metrics.record_chart("chat_comparison.png");
    metrics.record_blocks(0);
    metrics.record_stage("render", Duration::ZERO);
}
