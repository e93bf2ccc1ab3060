//! Sentiment scoring of message text.
//!
//! The pipeline only needs a `text -> score` function, expressed as the
//! [`SentimentClassifier`] trait. [`LexiconClassifier`] is the built-in
//! implementation: a weighted word lexicon with intensifiers and negations,
//! plus a short list of Chinese phrases matched by substring.

use regex::Regex;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::error::{ClassifierError, Result};
use crate::metrics::PipelineMetrics;
use crate::models::{DerivedMessage, EmotionClass, ScoredMessage};

/// Score returned for text that carries no sentiment signal
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Default maximum number of characters scored per message
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 10_000;

/// Maps message text to a sentiment score in [0, 1], higher = more positive.
///
/// Implementations must not fail on empty or symbol-only text.
pub trait SentimentClassifier {
    /// Score a single text
    fn score(&self, text: &str) -> std::result::Result<f64, ClassifierError>;
}

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("good", 1.0),
    ("great", 1.5),
    ("excellent", 2.0),
    ("amazing", 2.0),
    ("wonderful", 1.8),
    ("fantastic", 1.8),
    ("happy", 1.2),
    ("joy", 1.5),
    ("love", 2.0),
    ("like", 1.0),
    ("best", 1.5),
    ("better", 1.2),
    ("awesome", 1.8),
    ("perfect", 2.0),
    ("nice", 1.0),
    ("cool", 0.8),
    ("fun", 1.0),
    ("glad", 1.2),
    ("thanks", 1.0),
    ("thank", 1.0),
    ("haha", 1.0),
    ("lol", 0.8),
    ("pleased", 1.2),
    ("excited", 1.5),
    ("grateful", 1.5),
    ("lucky", 1.0),
    ("miss", 0.8),
    ("cute", 1.2),
    ("beautiful", 1.5),
    ("yay", 1.2),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("bad", -1.0),
    ("terrible", -2.0),
    ("awful", -2.0),
    ("horrible", -2.0),
    ("worst", -2.0),
    ("hate", -2.0),
    ("dislike", -1.0),
    ("poor", -1.2),
    ("sad", -1.2),
    ("angry", -1.5),
    ("upset", -1.2),
    ("frustrated", -1.5),
    ("annoyed", -1.2),
    ("tired", -0.8),
    ("sick", -1.0),
    ("sorry", -0.6),
    ("worried", -1.2),
    ("anxious", -1.2),
    ("scared", -1.5),
    ("afraid", -1.2),
    ("boring", -1.0),
    ("ugh", -1.0),
    ("cry", -1.2),
    ("lonely", -1.5),
    ("hurt", -1.5),
    ("stupid", -1.5),
    ("useless", -1.5),
    ("miserable", -1.8),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("extremely", 2.0),
    ("incredibly", 2.0),
    ("absolutely", 2.0),
    ("totally", 1.8),
    ("really", 1.3),
    ("so", 1.2),
    ("quite", 1.2),
    ("somewhat", 0.8),
    ("slightly", 0.7),
    ("barely", 0.5),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "nobody", "neither", "nor", "dont", "don't",
    "isnt", "isn't", "cant", "can't", "wont", "won't",
];

const CJK_PHRASES: &[(&str, f64)] = &[
    ("喜欢", 1.8),
    ("爱你", 2.0),
    ("开心", 1.5),
    ("高兴", 1.5),
    ("快乐", 1.5),
    ("哈哈", 1.0),
    ("谢谢", 1.0),
    ("可爱", 1.2),
    ("好吃", 1.2),
    ("好的", 0.6),
    ("棒", 1.5),
    ("想你", 1.0),
    ("难过", -1.5),
    ("伤心", -1.8),
    ("讨厌", -1.8),
    ("生气", -1.5),
    ("烦", -1.2),
    ("累", -0.8),
    ("无聊", -1.0),
    ("害怕", -1.5),
    ("难受", -1.5),
    ("哭", -1.2),
];

const CJK_NEGATIONS: &[char] = &['不', '没'];

/// Weighted lexicon sentiment scorer
pub struct LexiconClassifier {
    max_text_length: usize,
    url_regex: Regex,
    special_chars_regex: Regex,
    extra_spaces_regex: Regex,
}

impl LexiconClassifier {
    /// Create a classifier rejecting texts longer than `max_text_length` characters
    pub fn new(max_text_length: usize) -> Result<Self> {
        // Initialize regular expressions for text cleaning
        let url_regex = Regex::new(r"https?://\S+|www\.\S+")
            .map_err(|e| anyhow::anyhow!("Failed to compile URL regex: {e}"))?;
        let special_chars_regex = Regex::new(r"[^\w\s']")
            .map_err(|e| anyhow::anyhow!("Failed to compile special chars regex: {e}"))?;
        let extra_spaces_regex = Regex::new(r"\s+")
            .map_err(|e| anyhow::anyhow!("Failed to compile spaces regex: {e}"))?;

        Ok(Self {
            max_text_length,
            url_regex,
            special_chars_regex,
            extra_spaces_regex,
        })
    }

    /// Normalize, strip URLs and punctuation, collapse whitespace, lowercase
    #[must_use]
    pub fn clean_text(&self, text: &str) -> String {
        let normalized = text.nfc().collect::<String>();
        let no_urls = self.url_regex.replace_all(&normalized, " ");
        let no_special = self.special_chars_regex.replace_all(&no_urls, " ");
        let normalized_spaces = self.extra_spaces_regex.replace_all(&no_special, " ");
        normalized_spaces.trim().to_lowercase()
    }

    /// Raw polarity of cleaned text in [-1, 1]; `None` when nothing matched
    #[must_use]
    pub fn polarity(&self, cleaned: &str) -> Option<f64> {
        let mut total = 0.0;
        let mut hits = 0.0;

        let words: Vec<&str> = cleaned.split_whitespace().collect();
        for (i, word) in words.iter().enumerate() {
            let Some(weight) = lookup(POSITIVE_WORDS, word).or_else(|| lookup(NEGATIVE_WORDS, word))
            else {
                continue;
            };
            let mut sentiment = weight;

            if i > 0 {
                if let Some(intensity) = lookup(INTENSIFIERS, words[i - 1]) {
                    sentiment *= intensity;
                }
            }

            let negated = (i >= 1 && NEGATIONS.contains(&words[i - 1]))
                || (i >= 2 && NEGATIONS.contains(&words[i - 2]));
            if negated {
                sentiment = -sentiment * 0.8;
            }

            total += sentiment;
            hits += 1.0;
        }

        for (phrase, weight) in CJK_PHRASES {
            for (at, _) in cleaned.match_indices(phrase) {
                let negated = cleaned[..at]
                    .chars()
                    .next_back()
                    .is_some_and(|c| CJK_NEGATIONS.contains(&c));
                total += if negated { -weight * 0.8 } else { *weight };
                hits += 1.0;
            }
        }

        if hits == 0.0 {
            None
        } else {
            // weights top out around 2.0 before intensifiers
            Some((total / hits / 2.0).clamp(-1.0, 1.0))
        }
    }
}

fn lookup(table: &[(&str, f64)], word: &str) -> Option<f64> {
    table.iter().find(|(w, _)| *w == word).map(|(_, weight)| *weight)
}

impl SentimentClassifier for LexiconClassifier {
    fn score(&self, text: &str) -> std::result::Result<f64, ClassifierError> {
        let len = text.chars().count();
        if len > self.max_text_length {
            return Err(ClassifierError::TextTooLong {
                len,
                max: self.max_text_length,
            });
        }

        let cleaned = self.clean_text(text);
        if cleaned.is_empty() {
            return Ok(NEUTRAL_SCORE);
        }

        Ok(self
            .polarity(&cleaned)
            .map_or(NEUTRAL_SCORE, |raw| (raw + 1.0) / 2.0))
    }
}

/// Score every row, substituting `default_score` when the classifier fails.
///
/// A failure on one message never aborts the run.
pub fn score_messages(
    rows: Vec<DerivedMessage>,
    classifier: &dyn SentimentClassifier,
    default_score: f64,
    metrics: &PipelineMetrics,
) -> Vec<ScoredMessage> {
    let mut failures = 0usize;

    let scored: Vec<ScoredMessage> = rows
        .into_iter()
        .map(|derived| {
            let sentiment_score = match classifier.score(&derived.message.content) {
                Ok(score) if (0.0..=1.0).contains(&score) => score,
                Ok(score) => {
                    warn!(block_id = derived.block_id, "{}", ClassifierError::InvalidScore(score));
                    failures += 1;
                    default_score
                }
                Err(e) => {
                    warn!(block_id = derived.block_id, "Sentiment scoring failed: {}", e);
                    failures += 1;
                    default_score
                }
            };
            ScoredMessage {
                emotion: EmotionClass::from_score(sentiment_score),
                sentiment_score,
                derived,
            }
        })
        .collect();

    metrics.record_classifier_failures(failures);
    debug!(rows = scored.len(), failures, "Scored messages");
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{derive_conversation, DeriveOptions};
    use crate::models::Message;
    use chrono::NaiveDate;
    use mockall::mock;

    mock! {
        Classifier {}
        impl SentimentClassifier for Classifier {
            fn score(&self, text: &str) -> std::result::Result<f64, ClassifierError>;
        }
    }

    fn rows(texts: &[&str]) -> Vec<DerivedMessage> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap();
        let messages = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Message {
                is_sender: i % 2 == 0,
                content: (*text).to_string(),
                timestamp: start + chrono::Duration::minutes(i as i64),
            })
            .collect();
        derive_conversation(messages, &DeriveOptions::default())
    }

    #[test]
    fn test_clean_text() {
        let classifier = LexiconClassifier::new(100).expect("Failed to create classifier");

        let cleaned = classifier.clean_text("Check out https://example.com for more info");
        assert!(!cleaned.contains("https://"));

        let cleaned = classifier.clean_text("Hello, world! How are you?");
        assert!(!cleaned.contains(','));
        assert!(!cleaned.contains('!'));

        let cleaned = classifier.clean_text("  Too   many    spaces   ");
        assert_eq!(cleaned, "too many spaces");
    }

    #[test]
    fn test_polarity_direction() {
        let classifier = LexiconClassifier::new(100).expect("Failed to create classifier");
        assert!(classifier.score("I love this, it's amazing").unwrap() > 0.6);
        assert!(classifier.score("this is terrible and I hate it").unwrap() < 0.4);
        assert!(classifier.score("not good").unwrap() < NEUTRAL_SCORE);
        assert!(classifier.score("今天好开心").unwrap() > NEUTRAL_SCORE);
        assert!(classifier.score("不开心").unwrap() < NEUTRAL_SCORE);
    }

    #[test]
    fn test_empty_and_symbols_are_neutral() {
        let classifier = LexiconClassifier::new(100).expect("Failed to create classifier");
        assert_eq!(classifier.score("").unwrap(), NEUTRAL_SCORE);
        assert_eq!(classifier.score("?!...").unwrap(), NEUTRAL_SCORE);
        assert_eq!(classifier.score("the sky is blue").unwrap(), NEUTRAL_SCORE);
    }

    #[test]
    fn test_text_too_long() {
        let classifier = LexiconClassifier::new(5).expect("Failed to create classifier");
        let err = classifier.score("abcdefgh").unwrap_err();
        assert_eq!(err, ClassifierError::TextTooLong { len: 8, max: 5 });
    }

    #[test]
    fn test_failures_use_default_score() {
        let mut classifier = MockClassifier::new();
        classifier.expect_score().returning(|text| {
            if text == "boom" {
                Err(ClassifierError::Backend("model crashed".to_string()))
            } else {
                Ok(0.9)
            }
        });

        let scored = score_messages(
            rows(&["fine", "boom", "fine"]),
            &classifier,
            0.5,
            &PipelineMetrics::default(),
        );
        assert_eq!(scored.len(), 3);
        assert_eq!(scored[0].emotion, Some(EmotionClass::Positive));
        assert_eq!(scored[1].sentiment_score, 0.5);
        assert_eq!(scored[1].emotion, Some(EmotionClass::Neutral));
    }

    #[test]
    fn test_out_of_range_score_is_replaced() {
        let mut classifier = MockClassifier::new();
        classifier.expect_score().returning(|_| Ok(3.0));

        let scored = score_messages(rows(&["x"]), &classifier, 0.5, &PipelineMetrics::default());
        assert_eq!(scored[0].sentiment_score, 0.5);
    }
}
