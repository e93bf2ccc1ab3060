use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::derive::{DeriveOptions, DEFAULT_INITIATION_GAP_MINUTES};
use crate::loader::{LoadOptions, CONTENT_COLUMN, IS_SENDER_COLUMN, TIME_COLUMN};
use crate::models::Participants;
use crate::sentiment::{DEFAULT_MAX_TEXT_LENGTH, NEUTRAL_SCORE};
use crate::validation::InputValidator;

/// Prefix for environment overrides, e.g. `CHAT_REPORT_ANALYSIS__TOP_N=10`
pub const ENV_PREFIX: &str = "CHAT_REPORT";

/// Application configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source export
    pub input: InputConfig,
    /// Chart, report and side-output locations
    pub output: OutputConfig,
    /// Display names
    pub participants: ParticipantsConfig,
    /// Derivation and scoring parameters
    pub analysis: AnalysisConfig,
    /// Chart appearance
    pub render: RenderConfig,
    /// Logging setup
    pub logging: LoggingConfig,
}

/// Where the export comes from and which rows to keep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// CSV export to analyze
    pub path: String,
    /// Value of the `Type` column to keep
    pub message_type: i64,
    /// Columns that must be present
    pub columns: Vec<String>,
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the PNG charts are written to
    pub chart_directory: String,
    /// HTML report file
    pub report_path: String,
    /// Custom HTML template; the built-in template is used when unset
    pub template_path: Option<String>,
    /// Create the chart directory when it is missing
    pub create_chart_directory: bool,
    /// Write `summary.json` next to the charts
    pub write_summary: bool,
    /// Write `derived_messages.csv` next to the charts
    pub write_derived_csv: bool,
}

/// Names shown for the two sides of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantsConfig {
    /// Name for `IsSender == 1`
    pub sender_name: String,
    /// Name for `IsSender == 0`
    pub receiver_name: String,
}

/// Analysis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Words kept per side in the word frequency chart
    pub top_n: usize,
    /// Silence after which a message starts a new conversation
    pub initiation_gap_minutes: f64,
    /// Score substituted when the classifier fails on a message
    pub default_sentiment_score: f64,
    /// Longest text the classifier accepts, in characters
    pub max_text_length: usize,
}

/// Image and font settings for the chart renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Name the font is registered under
    pub font_family: String,
    /// TrueType/OpenType font file. When unset an installed CJK font is
    /// looked up, falling back to the bundled DejaVu Sans (no Chinese glyphs).
    pub font_path: Option<String>,
    /// Chart title size in points
    pub title_font_size: u32,
    /// Axis and legend label size in points
    pub label_font_size: u32,
}

/// Logging setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level, overridden by `RUST_LOG`
    pub level: String,
    /// Daily-rotated JSON log file
    pub file_path: Option<String>,
    /// Console format, "json" or "text"
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input: InputConfig {
                path: "demo_utf8.csv".to_string(),
                message_type: 1,
                columns: vec![
                    IS_SENDER_COLUMN.to_string(),
                    CONTENT_COLUMN.to_string(),
                    TIME_COLUMN.to_string(),
                ],
            },
            output: OutputConfig {
                chart_directory: "charts".to_string(),
                report_path: "chat_analysis_report.html".to_string(),
                template_path: None,
                create_chart_directory: true,
                write_summary: true,
                write_derived_csv: true,
            },
            participants: ParticipantsConfig {
                sender_name: "Sender 1".to_string(),
                receiver_name: "Sender 0".to_string(),
            },
            analysis: AnalysisConfig {
                top_n: 20,
                initiation_gap_minutes: DEFAULT_INITIATION_GAP_MINUTES,
                default_sentiment_score: NEUTRAL_SCORE,
                max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            },
            render: RenderConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            font_family: "sans-serif".to_string(),
            font_path: None,
            title_font_size: 24,
            label_font_size: 14,
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence.
    ///
    /// Later sources win: built-in defaults, `config/default.*`,
    /// `config/local.*`, the explicit file, then `CHAT_REPORT_*` variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(
                Config::try_from(&Self::default())
                    .map_err(|e| anyhow::anyhow!("Failed to serialize default configuration: {}", e))?,
            )
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(anyhow::anyhow!("Configuration file not found: {}", path.display()));
            }
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        InputValidator::validate_file_path(Path::new(&self.input.path))?;
        InputValidator::validate_columns(&self.input.columns)?;

        InputValidator::validate_file_path(Path::new(&self.output.chart_directory))?;
        InputValidator::validate_file_path(Path::new(&self.output.report_path))?;
        if let Some(template) = &self.output.template_path {
            InputValidator::validate_file_path(Path::new(template))?;
        }

        InputValidator::validate_participant_name(&self.participants.sender_name)?;
        InputValidator::validate_participant_name(&self.participants.receiver_name)?;

        InputValidator::validate_top_n(self.analysis.top_n)?;
        InputValidator::validate_gap_minutes(self.analysis.initiation_gap_minutes)?;
        InputValidator::validate_sentiment_score(self.analysis.default_sentiment_score)?;
        if self.analysis.max_text_length == 0 {
            return Err(anyhow::anyhow!("max_text_length must be greater than 0"));
        }

        InputValidator::validate_image_size(self.render.width, self.render.height)?;
        if self.render.font_family.trim().is_empty() {
            return Err(anyhow::anyhow!("font_family cannot be empty"));
        }
        if self.render.title_font_size == 0 || self.render.label_font_size == 0 {
            return Err(anyhow::anyhow!("font sizes must be greater than 0"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        Ok(())
    }

    /// Display names for the renderer
    #[must_use]
    pub fn participants(&self) -> Participants {
        Participants {
            sender_name: self.participants.sender_name.clone(),
            receiver_name: self.participants.receiver_name.clone(),
        }
    }

    /// Loader settings
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            message_type: self.input.message_type,
            columns: self.input.columns.clone(),
        }
    }

    /// Derivation settings
    #[must_use]
    pub fn derive_options(&self) -> DeriveOptions {
        DeriveOptions {
            initiation_gap_minutes: self.analysis.initiation_gap_minutes,
        }
    }

    /// Export file path
    #[must_use]
    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(&self.input.path)
    }

    /// Directory charts and side outputs go to
    #[must_use]
    pub fn chart_directory(&self) -> PathBuf {
        PathBuf::from(&self.output.chart_directory)
    }

    /// HTML report path
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        PathBuf::from(&self.output.report_path)
    }

    /// Log level from `RUST_LOG` or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}
