use chat_report::derive::{derive_conversation, DeriveOptions};
use chat_report::error::ClassifierError;
use chat_report::metrics::PipelineMetrics;
use chat_report::models::{EmotionClass, Message};
use chat_report::sentiment::{score_messages, LexiconClassifier, SentimentClassifier, NEUTRAL_SCORE};
use chrono::NaiveDate;

fn classifier() -> LexiconClassifier {
    LexiconClassifier::new(200).expect("Failed to create classifier")
}

#[test]
fn test_text_cleaning() {
    let classifier = classifier();

    let cleaned = classifier.clean_text("Check out https://example.com for more info");
    assert!(!cleaned.contains("https://"));
    assert!(cleaned.contains("check"));

    let cleaned = classifier.clean_text("Hello!!!   How are you???");
    assert_eq!(cleaned, "hello how are you");
}

#[test]
fn test_positive_and_negative_text() {
    let classifier = classifier();

    let positive = classifier.score("This is a great day, I love it").expect("Failed to score");
    assert!(positive > 0.6, "{positive}");
    assert_eq!(EmotionClass::from_score(positive), Some(EmotionClass::Positive));

    let negative = classifier.score("terrible, awful day").expect("Failed to score");
    assert!(negative < 0.4, "{negative}");
    assert_eq!(EmotionClass::from_score(negative), Some(EmotionClass::Negative));
}

#[test]
fn test_negation_flips_polarity() {
    let classifier = classifier();
    let plain = classifier.score("good").expect("Failed to score");
    let negated = classifier.score("not good").expect("Failed to score");
    assert!(plain > NEUTRAL_SCORE);
    assert!(negated < NEUTRAL_SCORE);
}

#[test]
fn test_chinese_phrases() {
    let classifier = classifier();
    assert!(classifier.score("今天好开心").expect("Failed to score") > NEUTRAL_SCORE);
    assert!(classifier.score("好难过").expect("Failed to score") < NEUTRAL_SCORE);
    assert!(classifier.score("不开心").expect("Failed to score") < NEUTRAL_SCORE);
}

#[test]
fn test_empty_and_symbol_only_text_is_neutral() {
    let classifier = classifier();
    for text in ["", "   ", "!!!", "😀😀", "www.example.com"] {
        assert_eq!(classifier.score(text).expect("Failed to score"), NEUTRAL_SCORE, "{text:?}");
    }
}

#[test]
fn test_scores_stay_in_unit_interval() {
    let classifier = classifier();
    for text in [
        "really really amazing excellent love",
        "extremely terrible awful hate",
        "ok",
        "not not not bad",
    ] {
        let score = classifier.score(text).expect("Failed to score");
        assert!((0.0..=1.0).contains(&score), "{text}: {score}");
    }
}

#[test]
fn test_overlong_text_is_rejected() {
    let classifier = LexiconClassifier::new(5).expect("Failed to create classifier");
    assert_eq!(
        classifier.score("abcdefg"),
        Err(ClassifierError::TextTooLong { len: 7, max: 5 })
    );
}

#[test]
fn test_score_messages_replaces_failures() {
    let timestamp = NaiveDate::from_ymd_opt(2025, 1, 6)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid timestamp");
    let messages = vec![
        Message {
            is_sender: true,
            content: "great".to_string(),
            timestamp,
        },
        Message {
            is_sender: false,
            content: "x".repeat(50),
            timestamp,
        },
    ];
    let rows = derive_conversation(messages, &DeriveOptions::default());

    let classifier = LexiconClassifier::new(10).expect("Failed to create classifier");
    let scored = score_messages(rows, &classifier, 0.5, &PipelineMetrics::default());

    assert_eq!(scored.len(), 2);
    assert!(scored[0].sentiment_score > 0.5);
    assert_eq!(scored[1].sentiment_score, 0.5);
    assert_eq!(scored[1].emotion, Some(EmotionClass::Neutral));
}
