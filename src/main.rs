use anyhow::{Context, Result};
use chat_report::config::AppConfig;
use chat_report::logging::init_logging;
use chat_report::validation::InputValidator;
use chat_report::ChatAnalysis;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(author, version, about = "Charts and an HTML report from an exported chat log", long_about = None)]
struct Cli {
    /// Configuration file layered over config/default and config/local
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and write charts plus the HTML report
    Report {
        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Directory for chart images and side outputs
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Path of the HTML report
        #[arg(short, long)]
        report: Option<String>,

        /// HTML template with a $charts placeholder
        #[arg(long)]
        template: Option<String>,

        /// TrueType font for chart text
        #[arg(long)]
        font: Option<String>,
    },
    /// Print the aggregates as JSON without rendering anything
    Summary {
        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
}

/// Overrides shared by every subcommand
#[derive(Args)]
struct AnalysisArgs {
    /// CSV export to analyze
    #[arg(short, long)]
    input: Option<String>,

    /// Display name for IsSender = 1
    #[arg(long)]
    sender_name: Option<String>,

    /// Display name for IsSender = 0
    #[arg(long)]
    receiver_name: Option<String>,

    /// Value of the Type column to keep
    #[arg(long)]
    message_type: Option<i64>,

    /// Words kept per side in the word frequency chart
    #[arg(long)]
    top_n: Option<usize>,
}

impl AnalysisArgs {
    fn apply(self, config: &mut AppConfig) -> Result<()> {
        if let Some(input) = self.input {
            InputValidator::validate_file_path(input.as_ref())?;
            config.input.path = input;
        }
        if let Some(name) = self.sender_name {
            config.participants.sender_name = name;
        }
        if let Some(name) = self.receiver_name {
            config.participants.receiver_name = name;
        }
        if let Some(message_type) = self.message_type {
            config.input.message_type = message_type;
        }
        if let Some(top_n) = self.top_n {
            config.analysis.top_n = top_n;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    match cli.command {
        Commands::Report {
            analysis,
            output_dir,
            report,
            template,
            font,
        } => {
            analysis.apply(&mut config)?;
            if let Some(dir) = output_dir {
                config.output.chart_directory = dir;
            }
            if let Some(report) = report {
                config.output.report_path = report;
            }
            if template.is_some() {
                config.output.template_path = template;
            }
            if font.is_some() {
                config.render.font_path = font;
            }
            config.validate()?;

            let _guard = start_logging(&config)?;
            info!("Starting chat-report");
            debug!(?config, "Effective configuration");

            let report_path = ChatAnalysis::new(config)?
                .run()
                .context("Failed to generate report")?;
            println!("Report generated: {}", report_path.display());
        }
        Commands::Summary { analysis, compact } => {
            analysis.apply(&mut config)?;
            config.validate()?;

            let _guard = start_logging(&config)?;
            let summary = ChatAnalysis::new(config)?
                .summarize()
                .context("Failed to summarize chat export")?;

            let json = if compact {
                serde_json::to_string(&summary)?
            } else {
                serde_json::to_string_pretty(&summary)?
            };
            println!("{json}");
        }
    }

    Ok(())
}

fn start_logging(config: &AppConfig) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let log_file = config.logging.file_path.as_ref().map(PathBuf::from);
    init_logging(
        Some(&config.get_log_level()),
        log_file.as_deref(),
        &config.logging.format,
    )
}
