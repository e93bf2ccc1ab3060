//! Data models for chat analysis
//!
//! This module contains the data structures that flow through the pipeline:
//! raw messages from the loader, derived rows from the derivation engine,
//! and scored rows from the sentiment stage.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two sides of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Rows with `IsSender == 1`
    Sender,
    /// Rows with `IsSender == 0`
    Receiver,
}

impl Side {
    /// Map the raw sender flag to a side
    #[must_use]
    pub const fn from_flag(is_sender: bool) -> Self {
        if is_sender {
            Self::Sender
        } else {
            Self::Receiver
        }
    }

    /// Both sides, sender first
    pub const ALL: [Self; 2] = [Self::Sender, Self::Receiver];
}

/// A value tracked separately for each side of the conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerSide<T> {
    /// Value for the sender side
    pub sender: T,
    /// Value for the receiver side
    pub receiver: T,
}

impl<T> PerSide<T> {
    /// Borrow the value for `side`
    pub const fn get(&self, side: Side) -> &T {
        match side {
            Side::Sender => &self.sender,
            Side::Receiver => &self.receiver,
        }
    }

    /// Mutably borrow the value for `side`
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Sender => &mut self.sender,
            Side::Receiver => &mut self.receiver,
        }
    }

    /// Apply `f` to both values
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> PerSide<U> {
        PerSide {
            sender: f(self.sender),
            receiver: f(self.receiver),
        }
    }
}

/// Display names for the two sides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    /// Name shown for `IsSender == 1`
    pub sender_name: String,
    /// Name shown for `IsSender == 0`
    pub receiver_name: String,
}

impl Participants {
    /// Display name for `side`
    #[must_use]
    pub fn name(&self, side: Side) -> &str {
        match side {
            Side::Sender => &self.sender_name,
            Side::Receiver => &self.receiver_name,
        }
    }
}

/// A single chat message as loaded from the export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// True if the message was written by the sender side
    pub is_sender: bool,
    /// Message text content
    pub content: String,
    /// Local wall-clock time the message was sent
    pub timestamp: NaiveDateTime,
}

impl Message {
    /// Side of the conversation that wrote this message
    #[must_use]
    pub const fn side(&self) -> Side {
        Side::from_flag(self.is_sender)
    }
}

/// A message augmented with conversation-structure features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMessage {
    /// The source message
    pub message: Message,
    /// Calendar date of the timestamp
    pub date: NaiveDate,
    /// Calendar month bucket, formatted `YYYY-MM`
    pub month: String,
    /// Hour of day (0-23)
    pub hour: u32,
    /// Minutes since the previous message on the same date
    pub time_diff_minutes: Option<f64>,
    /// True when the side changes relative to the previous message
    pub is_block_start: bool,
    /// Running count of block starts, 1-based
    pub block_id: u64,
    /// Minutes until the next message, only at block starts
    pub reply_time_minutes: Option<f64>,
    /// True when this message opens a new conversation
    pub initiates: bool,
}

impl DerivedMessage {
    /// Side of the conversation that wrote this message
    #[must_use]
    pub const fn side(&self) -> Side {
        self.message.side()
    }
}

impl AsRef<DerivedMessage> for DerivedMessage {
    fn as_ref(&self) -> &DerivedMessage {
        self
    }
}

/// Emotion bucket of a sentiment score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EmotionClass {
    /// Score in [0, 0.4]
    Negative,
    /// Score in (0.4, 0.6]
    Neutral,
    /// Score in (0.6, 1]
    Positive,
}

impl EmotionClass {
    /// Upper bound (inclusive) of the negative bucket
    pub const NEGATIVE_MAX: f64 = 0.4;
    /// Upper bound (inclusive) of the neutral bucket
    pub const NEUTRAL_MAX: f64 = 0.6;

    /// All classes in stacking order, bottom first
    pub const ALL: [Self; 3] = [Self::Negative, Self::Neutral, Self::Positive];

    /// Bucket a score. Exactly 0 counts as negative; NaN and values
    /// outside [0, 1] are unclassified.
    #[must_use]
    pub fn from_score(score: f64) -> Option<Self> {
        if !(0.0..=1.0).contains(&score) {
            return None;
        }
        if score <= Self::NEGATIVE_MAX {
            Some(Self::Negative)
        } else if score <= Self::NEUTRAL_MAX {
            Some(Self::Neutral)
        } else {
            Some(Self::Positive)
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Positive => "Positive",
        }
    }
}

impl fmt::Display for EmotionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A derived message with its sentiment annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMessage {
    /// Structural features
    pub derived: DerivedMessage,
    /// Sentiment score in [0, 1]
    pub sentiment_score: f64,
    /// Bucketed emotion, `None` when the score is unclassifiable
    pub emotion: Option<EmotionClass>,
}

impl AsRef<DerivedMessage> for ScoredMessage {
    fn as_ref(&self) -> &DerivedMessage {
        &self.derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emotion_boundaries() {
        assert_eq!(EmotionClass::from_score(0.0), Some(EmotionClass::Negative));
        assert_eq!(EmotionClass::from_score(0.4), Some(EmotionClass::Negative));
        assert_eq!(EmotionClass::from_score(0.41), Some(EmotionClass::Neutral));
        assert_eq!(EmotionClass::from_score(0.6), Some(EmotionClass::Neutral));
        assert_eq!(EmotionClass::from_score(0.61), Some(EmotionClass::Positive));
        assert_eq!(EmotionClass::from_score(1.0), Some(EmotionClass::Positive));
    }

    #[test]
    fn test_emotion_out_of_range() {
        assert_eq!(EmotionClass::from_score(-0.1), None);
        assert_eq!(EmotionClass::from_score(1.5), None);
        assert_eq!(EmotionClass::from_score(f64::NAN), None);
    }

    #[test]
    fn test_per_side_access() {
        let mut counts = PerSide::<usize>::default();
        *counts.get_mut(Side::Sender) += 2;
        *counts.get_mut(Side::Receiver) += 1;
        assert_eq!(*counts.get(Side::Sender), 2);
        assert_eq!(counts.map(|c| c * 10).receiver, 10);
    }
}
