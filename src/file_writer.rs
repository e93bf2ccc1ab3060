//! Side outputs written next to the charts.
//!
//! `derived_messages.csv` holds one row per scored message with every derived
//! column; `summary.json` holds the aggregated [`Summary`].

use crate::aggregate::Summary;
use crate::error::Result;
use crate::models::ScoredMessage;
use csv::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// File name of the per-message table
pub const DERIVED_CSV_FILE: &str = "derived_messages.csv";
/// File name of the aggregate dump
pub const SUMMARY_JSON_FILE: &str = "summary.json";

const DERIVED_HEADER: [&str; 13] = [
    "IsSender",
    "StrContent",
    "StrTime",
    "Date",
    "Month",
    "Hour",
    "TimeDiffMinutes",
    "IsBlockStart",
    "BlockId",
    "ReplyTimeMinutes",
    "Initiates",
    "SentimentScore",
    "Emotion",
];

fn optional_minutes(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_default()
}

/// Write scored messages as CSV.
///
/// Absent values (time difference, reply time) are written as empty fields.
/// An `Emotion` column follows the score and is empty for unclassified rows.
pub fn write_derived_csv(rows: &[ScoredMessage], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = Writer::from_writer(BufWriter::new(file));

    writer.write_record(DERIVED_HEADER)?;

    for row in rows {
        let derived = &row.derived;
        writer.write_record([
            u8::from(derived.message.is_sender).to_string(),
            derived.message.content.clone(),
            derived.message.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            derived.date.to_string(),
            derived.month.clone(),
            derived.hour.to_string(),
            optional_minutes(derived.time_diff_minutes),
            derived.is_block_start.to_string(),
            derived.block_id.to_string(),
            optional_minutes(derived.reply_time_minutes),
            derived.initiates.to_string(),
            format!("{:.4}", row.sentiment_score),
            row.emotion.map(|e| e.label().to_string()).unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    debug!(rows = rows.len(), "Wrote {}", file_path.display());
    Ok(())
}

/// Write the aggregate summary as pretty-printed JSON
pub fn write_summary_json(summary: &Summary, file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    debug!("Wrote {}", file_path.display());
    Ok(())
}
