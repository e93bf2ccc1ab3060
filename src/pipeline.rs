//! End-to-end driver: load, derive, score, aggregate, render, report.
//!
//! Each stage takes the previous stage's output by value or reference and
//! returns a new value; nothing is shared or mutated across stages.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::aggregate::Summary;
use crate::config::AppConfig;
use crate::derive::derive_conversation;
use crate::error::Result;
use crate::file_writer::{write_derived_csv, write_summary_json, DERIVED_CSV_FILE, SUMMARY_JSON_FILE};
use crate::loader::load_messages;
use crate::logging::OperationTimer;
use crate::metrics::PipelineMetrics;
use crate::models::ScoredMessage;
use crate::render::ChartRenderer;
use crate::report::{assemble_report, default_charts, ReportTemplate};
use crate::sentiment::{score_messages, LexiconClassifier, SentimentClassifier};

/// Scored rows plus their aggregates
#[derive(Debug, Clone)]
pub struct Analysis {
    /// One row per kept message, in timestamp order
    pub rows: Vec<ScoredMessage>,
    /// Aggregates over `rows`
    pub summary: Summary,
}

/// Runs the chat analysis described by an [`AppConfig`]
pub struct ChatAnalysis {
    config: AppConfig,
    classifier: Box<dyn SentimentClassifier>,
    metrics: PipelineMetrics,
}

impl ChatAnalysis {
    /// Build an analysis using the lexicon classifier
    pub fn new(config: AppConfig) -> Result<Self> {
        let classifier = LexiconClassifier::new(config.analysis.max_text_length)?;
        Ok(Self::with_classifier(config, Box::new(classifier)))
    }

    /// Build an analysis with a custom sentiment classifier
    #[must_use]
    pub fn with_classifier(config: AppConfig, classifier: Box<dyn SentimentClassifier>) -> Self {
        Self {
            config,
            classifier,
            metrics: PipelineMetrics::default(),
        }
    }

    /// Configuration this analysis runs with
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    fn timed<T>(&self, stage: &'static str, run: impl FnOnce() -> Result<T>) -> Result<T> {
        let timer = OperationTimer::new(stage);
        let started = Instant::now();
        let output = run()?;
        timer.finish();
        self.metrics.record_stage(stage, started.elapsed());
        Ok(output)
    }

    /// Load, derive, score and aggregate without writing anything
    pub fn analyze(&self) -> Result<Analysis> {
        let loaded = self.timed("load", || {
            load_messages(&self.config.input_path(), &self.config.load_options())
        })?;
        self.metrics.record_load(loaded.rows_read, loaded.messages.len());
        if loaded.messages.is_empty() {
            warn!(
                message_type = self.config.input.message_type,
                "No messages of the requested type; charts will be empty"
            );
        }

        let derive_options = self.config.derive_options();
        let derived = self.timed("derive", || Ok(derive_conversation(loaded.messages, &derive_options)))?;

        let rows = self.timed("score", || {
            Ok(score_messages(
                derived,
                self.classifier.as_ref(),
                self.config.analysis.default_sentiment_score,
                &self.metrics,
            ))
        })?;

        let summary = self.timed("aggregate", || Ok(Summary::from_rows(&rows, self.config.analysis.top_n)))?;
        self.metrics.record_blocks(summary.total_blocks);

        info!(
            messages = summary.total_messages,
            blocks = summary.total_blocks,
            "Analysis complete"
        );
        Ok(Analysis { rows, summary })
    }

    /// Aggregates only
    pub fn summarize(&self) -> Result<Summary> {
        Ok(self.analyze()?.summary)
    }

    /// Run the whole pipeline and return the report path
    pub fn run(&self) -> Result<PathBuf> {
        let analysis = self.analyze()?;

        let chart_dir = self.config.chart_directory();
        if !chart_dir.is_dir() && self.config.output.create_chart_directory {
            info!("Creating chart directory {}", chart_dir.display());
            std::fs::create_dir_all(&chart_dir)?;
        }

        let renderer = ChartRenderer::new(&chart_dir, &self.config.render, self.config.participants())?;
        self.timed("render", || renderer.render_all(&analysis.summary, &self.metrics))?;

        if self.config.output.write_derived_csv {
            write_derived_csv(&analysis.rows, &chart_dir.join(DERIVED_CSV_FILE))?;
        }
        if self.config.output.write_summary {
            write_summary_json(&analysis.summary, &chart_dir.join(SUMMARY_JSON_FILE))?;
        }

        let template = match &self.config.output.template_path {
            Some(path) => ReportTemplate::from_file(Path::new(path))?,
            None => ReportTemplate::builtin()?,
        };

        self.timed("report", || {
            assemble_report(&default_charts(), &chart_dir, &template, &self.config.report_path())
        })
    }
}
