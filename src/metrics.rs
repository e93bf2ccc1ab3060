use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Metric names recorded by the pipeline.
///
/// No recorder is installed by default, so recording is a no-op unless the
/// embedding application sets a global recorder.
#[derive(Debug, Clone, Copy)]
pub struct PipelineMetrics {
    /// Rows read from the export
    pub rows_read_total: &'static str,
    /// Messages kept after the type filter
    pub messages_loaded_total: &'static str,
    /// Messages whose sentiment scoring failed
    pub classifier_failures_total: &'static str,
    /// Chart images written
    pub charts_rendered_total: &'static str,
    /// Stage durations
    pub stage_duration: &'static str,
    /// Number of conversation blocks in the last run
    pub conversation_blocks: &'static str,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self {
            rows_read_total: "chat_report_rows_read_total",
            messages_loaded_total: "chat_report_messages_loaded_total",
            classifier_failures_total: "chat_report_classifier_failures_total",
            charts_rendered_total: "chat_report_charts_rendered_total",
            stage_duration: "chat_report_stage_duration_seconds",
            conversation_blocks: "chat_report_conversation_blocks",
        }
    }
}

impl PipelineMetrics {
    /// Record the outcome of the load stage
    pub fn record_load(&self, read: usize, kept: usize) {
        counter!(self.rows_read_total).increment(read as u64);
        counter!(self.messages_loaded_total).increment(kept as u64);
    }

    /// Record sentiment failures replaced by the default score
    pub fn record_classifier_failures(&self, failures: usize) {
        if failures > 0 {
            counter!(self.classifier_failures_total).increment(failures as u64);
        }
    }

    /// Record one rendered chart
    pub fn record_chart(&self, file: &'static str) {
        counter!(self.charts_rendered_total, "chart" => file).increment(1);
    }

    /// Record the number of conversation blocks found
    pub fn record_blocks(&self, blocks: u64) {
        gauge!(self.conversation_blocks).set(blocks as f64);
    }

    /// Record how long a stage took
    pub fn record_stage(&self, stage: &'static str, duration: Duration) {
        histogram!(self.stage_duration, "stage" => stage).record(duration.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_names() {
        let metrics = PipelineMetrics::default();
        assert_eq!(metrics.messages_loaded_total, "chat_report_messages_loaded_total");
        assert_eq!(metrics.stage_duration, "chat_report_stage_duration_seconds");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let metrics = PipelineMetrics::default();
        metrics.record_load(12, 10);
        metrics.record_classifier_failures(2);
        metrics.record_chart("word_frequency.png");
        metrics.record_stage("derive", Duration::from_millis(5));
        metrics.record_blocks(3);
    }
}
