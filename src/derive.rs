//! Conversation-structure derivation.
//!
//! Turns loaded messages into [`DerivedMessage`] rows in a single pass with
//! one row of lookback and one row of lookahead:
//!
//! - `time_diff_minutes` is the gap to the previous message on the same date
//! - block detection runs across dates: a block starts whenever the side changes
//! - `reply_time_minutes` is the gap to the next message, at block starts only
//! - `initiates` marks the first message of a date or one after a long silence

use crate::models::{DerivedMessage, Message};
use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::{debug, warn};

/// Default silence (in minutes) after which a message opens a new conversation
pub const DEFAULT_INITIATION_GAP_MINUTES: f64 = 60.0;

/// Tunables for the derivation pass
#[derive(Debug, Clone, Copy)]
pub struct DeriveOptions {
    /// A message initiates when the gap to its same-date predecessor exceeds this
    pub initiation_gap_minutes: f64,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            initiation_gap_minutes: DEFAULT_INITIATION_GAP_MINUTES,
        }
    }
}

/// Minutes between two timestamps, with millisecond precision
#[must_use]
pub fn minutes_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}

/// Format the month bucket of a timestamp
#[must_use]
pub fn month_key(ts: &NaiveDateTime) -> String {
    format!("{:04}-{:02}", ts.year(), ts.month())
}

/// Derive conversation features for every message.
///
/// Messages are stably sorted by timestamp first; rows are never dropped.
#[must_use]
pub fn derive_conversation(mut messages: Vec<Message>, options: &DeriveOptions) -> Vec<DerivedMessage> {
    if !messages.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
        warn!("Input messages are not in timestamp order; sorting");
        messages.sort_by_key(|m| m.timestamp);
    }

    let next_times: Vec<Option<NaiveDateTime>> = messages
        .iter()
        .skip(1)
        .map(|m| Some(m.timestamp))
        .chain(std::iter::once(None))
        .collect();

    let mut derived = Vec::with_capacity(messages.len());
    let mut previous: Option<(bool, NaiveDateTime)> = None;
    let mut block_id = 0u64;

    for (message, next_time) in messages.into_iter().zip(next_times) {
        let date = message.timestamp.date();

        let time_diff_minutes = previous
            .filter(|(_, prev_ts)| prev_ts.date() == date)
            .map(|(_, prev_ts)| minutes_between(prev_ts, message.timestamp));

        let is_block_start = previous.map_or(true, |(prev_sender, _)| prev_sender != message.is_sender);
        if is_block_start {
            block_id += 1;
        }

        let reply_time_minutes = if is_block_start {
            next_time.map(|next| minutes_between(message.timestamp, next))
        } else {
            None
        };

        let initiates = time_diff_minutes.map_or(true, |gap| gap > options.initiation_gap_minutes);

        previous = Some((message.is_sender, message.timestamp));
        derived.push(DerivedMessage {
            date,
            month: month_key(&message.timestamp),
            hour: message.timestamp.hour(),
            time_diff_minutes,
            is_block_start,
            block_id,
            reply_time_minutes,
            initiates,
            message,
        });
    }

    debug!(rows = derived.len(), blocks = block_id, "Derived conversation features");
    derived
}
