use anyhow::Result;
use chat_report::models::EmotionClass;
use chat_report::sentiment::{LexiconClassifier, SentimentClassifier, DEFAULT_MAX_TEXT_LENGTH};
use std::io::BufRead;

/// Score texts given as arguments, or one per line on stdin when none are given.
fn main() -> Result<()> {
    let classifier = LexiconClassifier::new(DEFAULT_MAX_TEXT_LENGTH)?;

    let texts: Vec<String> = std::env::args().skip(1).collect();
    let texts = if texts.is_empty() {
        std::io::stdin().lock().lines().collect::<std::io::Result<Vec<_>>>()?
    } else {
        texts
    };

    println!("Testing sentiment scoring on {} texts...", texts.len());

    for (i, text) in texts.iter().enumerate() {
        println!("\nText {}: {}", i + 1, text);
        println!("Cleaned: {}", classifier.clean_text(text));

        match classifier.score(text) {
            Ok(score) => {
                let class = EmotionClass::from_score(score).map_or("unclassified", EmotionClass::label);
                println!("Score: {score:.3} ({class})");
            }
            Err(e) => println!("Error: {e}"),
        }
    }

    Ok(())
}
