//! Tests for the layered configuration

use chat_report::config::{AppConfig, RenderConfig};
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_default_output_config() {
    let config = AppConfig::default();

    assert_eq!(config.output.chart_directory, "charts");
    assert_eq!(config.output.report_path, "chat_analysis_report.html");
    assert_eq!(config.output.template_path, None);
    assert!(config.output.create_chart_directory);
    assert!(config.output.write_summary);
    assert!(config.output.write_derived_csv);
}

#[test]
fn test_default_input_and_analysis_config() {
    let config = AppConfig::default();

    assert_eq!(config.input.message_type, 1);
    assert_eq!(config.input.columns, vec!["IsSender", "StrContent", "StrTime"]);
    assert_eq!(config.analysis.top_n, 20);
    assert_eq!(config.analysis.initiation_gap_minutes, 60.0);
    assert_eq!(config.analysis.default_sentiment_score, 0.5);
}

#[test]
fn test_default_render_and_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.render, RenderConfig::default());
    assert_eq!(config.render.font_family, "sans-serif");
    assert_eq!(config.render.font_path, None);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_validation_rejects_bad_values() {
    let cases: Vec<fn(&mut AppConfig)> = vec![
        |c| c.analysis.top_n = 0,
        |c| c.analysis.initiation_gap_minutes = 0.0,
        |c| c.analysis.default_sentiment_score = 1.5,
        |c| c.analysis.max_text_length = 0,
        |c| c.participants.sender_name = String::new(),
        |c| c.participants.receiver_name = "a\u{0}b".to_string(),
        |c| c.render.height = 9000,
        |c| c.render.label_font_size = 0,
        |c| c.logging.level = "verbose".to_string(),
        |c| c.logging.format = "xml".to_string(),
        |c| c.input.columns = Vec::new(),
        |c| c.output.report_path = String::new(),
    ];

    for (i, mutate) in cases.into_iter().enumerate() {
        let mut config = AppConfig::default();
        mutate(&mut config);
        assert!(config.validate().is_err(), "case {i} should be rejected");
    }
}

#[test]
fn test_load_explicit_file_overrides_defaults() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("report.toml");
    let mut file = std::fs::File::create(&path).expect("Failed to create config file");
    writeln!(
        file,
        "[participants]\nreceiver_name = \"Alex\"\n\n[analysis]\ntop_n = 7\n\n[render]\nwidth = 800"
    )
    .expect("Failed to write config file");

    let config = AppConfig::load(Some(path.as_path())).expect("Failed to load config");
    assert_eq!(config.participants.receiver_name, "Alex");
    assert_eq!(config.analysis.top_n, 7);
    assert_eq!(config.render.width, 800);
    // untouched keys keep their defaults
    assert_eq!(config.render.height, 600);
    assert_eq!(config.participants.sender_name, "Sender 1");
}

#[test]
fn test_load_rejects_invalid_file_values() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[logging]\nlevel = \"loud\"\n").expect("Failed to write config file");

    assert!(AppConfig::load(Some(path.as_path())).is_err());
}

#[test]
fn test_load_missing_explicit_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    assert!(AppConfig::load(Some(dir.path().join("absent.toml").as_path())).is_err());
}

#[test]
fn test_environment_override() {
    std::env::set_var("CHAT_REPORT_OUTPUT__CHART_DIRECTORY", "env_charts");
    let config = AppConfig::load(None);
    std::env::remove_var("CHAT_REPORT_OUTPUT__CHART_DIRECTORY");

    let config = config.expect("Failed to load config");
    assert_eq!(config.output.chart_directory, "env_charts");
}
