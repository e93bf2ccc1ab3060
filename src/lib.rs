//! Chat Report - Chat Log Analysis and Reporting
//!
//! A Rust library that turns an exported two-party chat log into charts and
//! a static HTML report.
//!
//! # Features
//!
//! - Load CSV exports and filter by message type
//! - Derive conversation structure (blocks, reply times, initiations)
//! - Lexicon-based sentiment scoring behind a pluggable classifier trait
//! - Daily, hourly, monthly, weekly and per-word aggregates
//! - PNG charts and an HTML report from a template

/// Aggregations over derived messages
pub mod aggregate;
/// Configuration management
pub mod config;
/// Conversation structure derivation
pub mod derive;
/// Error types
pub mod error;
/// Side outputs (CSV and JSON)
pub mod file_writer;
/// CSV export loading
pub mod loader;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// End-to-end driver
pub mod pipeline;
/// Chart rendering
pub mod render;
/// HTML report assembly
pub mod report;
/// Sentiment classification
pub mod sentiment;
/// Input validation
pub mod validation;

// Re-export key components for easier access
pub use aggregate::Summary;
pub use config::AppConfig;
pub use error::{ChatReportError, Result};
pub use models::{DerivedMessage, EmotionClass, Message, Participants, ScoredMessage, Side};
pub use pipeline::{Analysis, ChatAnalysis};
pub use sentiment::{LexiconClassifier, SentimentClassifier};
