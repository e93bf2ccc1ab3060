use anyhow::{anyhow, Result};
use std::path::Path;

/// Smallest and largest accepted chart dimension, in pixels
pub const IMAGE_SIZE_RANGE: std::ops::RangeInclusive<u32> = 200..=8000;

/// Validation helpers for configuration and command-line input
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a participant display name
    pub fn validate_participant_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow!("Participant name cannot be empty"));
        }

        if name.chars().count() > 100 {
            return Err(anyhow!("Participant name too long (max 100 characters)"));
        }

        if name.chars().any(char::is_control) {
            return Err(anyhow!("Participant name contains control characters"));
        }

        Ok(())
    }

    /// Validate a file or directory path given by the user
    pub fn validate_file_path(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.trim().is_empty() {
            return Err(anyhow!("File path cannot be empty"));
        }

        if path_str.contains('\0') {
            return Err(anyhow!("File path contains a NUL byte"));
        }

        if path_str.len() > 4096 {
            return Err(anyhow!("File path too long (max 4096 characters)"));
        }

        Ok(())
    }

    /// Validate the number of words kept per side
    pub fn validate_top_n(top_n: usize) -> Result<()> {
        if top_n == 0 {
            return Err(anyhow!("top_n must be greater than 0"));
        }

        if top_n > 200 {
            tracing::warn!("top_n of {} will produce an unreadable word chart", top_n);
        }

        Ok(())
    }

    /// Validate chart dimensions
    pub fn validate_image_size(width: u32, height: u32) -> Result<()> {
        for (name, value) in [("width", width), ("height", height)] {
            if !IMAGE_SIZE_RANGE.contains(&value) {
                return Err(anyhow!(
                    "Image {name} {value} out of range ({}..={})",
                    IMAGE_SIZE_RANGE.start(),
                    IMAGE_SIZE_RANGE.end()
                ));
            }
        }
        Ok(())
    }

    /// Validate a sentiment score used as a fallback
    pub fn validate_sentiment_score(score: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&score) {
            return Err(anyhow!("Sentiment score must be within [0, 1], got {score}"));
        }
        Ok(())
    }

    /// Validate the idle gap that starts a new conversation
    pub fn validate_gap_minutes(minutes: f64) -> Result<()> {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(anyhow!("Initiation gap must be a positive number of minutes, got {minutes}"));
        }
        Ok(())
    }

    /// Validate the list of projected CSV columns
    pub fn validate_columns(columns: &[String]) -> Result<()> {
        if columns.is_empty() {
            return Err(anyhow!("Column list cannot be empty"));
        }

        if let Some(blank) = columns.iter().position(|c| c.trim().is_empty()) {
            return Err(anyhow!("Column {} has an empty name", blank + 1));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_name() {
        assert!(InputValidator::validate_participant_name("Sender 1").is_ok());
        assert!(InputValidator::validate_participant_name("小明").is_ok());
        assert!(InputValidator::validate_participant_name("  ").is_err());
        assert!(InputValidator::validate_participant_name("a\nb").is_err());
        assert!(InputValidator::validate_participant_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_sentiment_score() {
        assert!(InputValidator::validate_sentiment_score(0.0).is_ok());
        assert!(InputValidator::validate_sentiment_score(1.0).is_ok());
        assert!(InputValidator::validate_sentiment_score(1.01).is_err());
        assert!(InputValidator::validate_sentiment_score(f64::NAN).is_err());
    }
}
