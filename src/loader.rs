//! Loading of exported chat tables.
//!
//! Reads a CSV export (one row per message), keeps the rows of one message
//! type and converts them into [`Message`] values.

use crate::error::{ChatReportError, Result};
use crate::models::Message;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Discriminator column used for the type filter
pub const TYPE_COLUMN: &str = "Type";
/// Sender flag column
pub const IS_SENDER_COLUMN: &str = "IsSender";
/// Message text column
pub const CONTENT_COLUMN: &str = "StrContent";
/// Timestamp column
pub const TIME_COLUMN: &str = "StrTime";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Which rows and columns to keep from the export
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Value of the `Type` column to keep
    pub message_type: i64,
    /// Columns to project; must include the sender, content and time columns
    pub columns: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            message_type: 1,
            columns: vec![
                IS_SENDER_COLUMN.to_string(),
                CONTENT_COLUMN.to_string(),
                TIME_COLUMN.to_string(),
            ],
        }
    }
}

/// Messages kept by the loader
#[derive(Debug, Clone, Default)]
pub struct LoadedMessages {
    /// Rows of the requested type, in file order
    pub messages: Vec<Message>,
    /// Data rows read, before filtering
    pub rows_read: usize,
}

/// Column positions resolved against the header row
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    kind: usize,
    is_sender: usize,
    content: usize,
    time: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, options: &LoadOptions) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<&str> = std::iter::once(TYPE_COLUMN)
            .chain(options.columns.iter().map(String::as_str))
            .filter(|name| position(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ChatReportError::DataFormat(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        for required in [IS_SENDER_COLUMN, CONTENT_COLUMN, TIME_COLUMN] {
            if !options.columns.iter().any(|c| c == required) {
                return Err(ChatReportError::DataFormat(format!(
                    "column projection must include {required}"
                )));
            }
        }

        let index = |name: &str| {
            position(name).ok_or_else(|| {
                ChatReportError::DataFormat(format!("missing required columns: {name}"))
            })
        };

        Ok(Self {
            kind: index(TYPE_COLUMN)?,
            is_sender: index(IS_SENDER_COLUMN)?,
            content: index(CONTENT_COLUMN)?,
            time: index(TIME_COLUMN)?,
        })
    }
}

/// Load messages from a CSV file on disk
pub fn load_messages(path: &Path, options: &LoadOptions) -> Result<LoadedMessages> {
    info!("Loading chat export from {}", path.display());
    let file = std::fs::File::open(path)?;
    load_messages_from_reader(file, options)
}

/// Load messages from any CSV source
pub fn load_messages_from_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<LoadedMessages> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers, options)?;

    let mut messages = Vec::new();
    let mut total_rows = 0usize;

    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        total_rows += 1;
        // header is line 1
        let line = row + 2;

        let kind = parse_type(field(&record, columns.kind, TYPE_COLUMN, line)?, line)?;
        if kind != options.message_type {
            continue;
        }

        let is_sender = parse_flag(field(&record, columns.is_sender, IS_SENDER_COLUMN, line)?, line)?;
        let content = field(&record, columns.content, CONTENT_COLUMN, line)?.to_string();
        let raw_time = field(&record, columns.time, TIME_COLUMN, line)?;
        let timestamp = parse_timestamp(raw_time).ok_or_else(|| {
            ChatReportError::DataFormat(format!("line {line}: unparseable timestamp '{raw_time}'"))
        })?;

        messages.push(Message {
            is_sender,
            content,
            timestamp,
        });
    }

    info!(
        rows = total_rows,
        kept = messages.len(),
        message_type = options.message_type,
        "Loaded chat export"
    );
    Ok(LoadedMessages {
        messages,
        rows_read: total_rows,
    })
}

fn field<'r>(record: &'r StringRecord, index: usize, name: &str, line: usize) -> Result<&'r str> {
    record
        .get(index)
        .ok_or_else(|| ChatReportError::DataFormat(format!("line {line}: missing value for {name}")))
}

fn parse_type(raw: &str, line: usize) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        ChatReportError::DataFormat(format!("line {line}: invalid {TYPE_COLUMN} value '{raw}'"))
    })
}

fn parse_flag(raw: &str, line: usize) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ChatReportError::DataFormat(format!(
            "line {line}: invalid {IS_SENDER_COLUMN} value '{raw}'"
        ))),
    }
}

/// Parse a timestamp in any of the supported export formats.
///
/// Everything is wall-clock time: unix seconds are converted through the
/// local time zone, RFC 3339 values keep their own offset's clock time.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }

    if raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(secs) = raw.parse::<i64>() {
            debug!("Interpreting '{}' as unix seconds in local time", raw);
            return Local.timestamp_opt(secs, 0).earliest().map(|dt| dt.naive_local());
        }
    }

    None
}
