//! Aggregations over derived chat rows.
//!
//! Every function here is a pure function of its input rows. Results are
//! keyed by totally ordered keys (`BTreeMap`, sorted vectors) so identical
//! input always yields identical output.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::models::{DerivedMessage, EmotionClass, PerSide, ScoredMessage, Side};

/// Message counts per side
pub type SideCounts = PerSide<usize>;

/// A word and the number of times it was used
pub type WordCount = (String, usize);

/// Message count per calendar date
pub fn daily_counts<M: AsRef<DerivedMessage>>(rows: &[M]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.as_ref().date).or_insert(0) += 1;
    }
    counts
}

/// Message count per hour of day, only hours that occur
pub fn hourly_counts<M: AsRef<DerivedMessage>>(rows: &[M]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.as_ref().hour).or_insert(0) += 1;
    }
    counts
}

/// Gaussian kernel density of message hours, sampled at `points` positions
/// across [0, 23].
///
/// Uses Scott's rule for the bandwidth. Returns an empty curve for fewer than
/// two messages or when every message falls in the same hour.
pub fn hour_density<M: AsRef<DerivedMessage>>(rows: &[M], points: usize) -> Vec<(f64, f64)> {
    let hours: Vec<f64> = rows.iter().map(|r| f64::from(r.as_ref().hour)).collect();
    let n = hours.len() as f64;
    if hours.len() < 2 || points < 2 {
        return Vec::new();
    }

    let mean = hours.iter().sum::<f64>() / n;
    let variance = hours.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return Vec::new();
    }

    let bandwidth = std_dev * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let step = 23.0 / (points - 1) as f64;

    (0..points)
        .map(|i| {
            let x = i as f64 * step;
            let density = hours
                .iter()
                .map(|h| (-0.5 * ((x - h) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect()
}

/// Total messages per side
pub fn side_totals<M: AsRef<DerivedMessage>>(rows: &[M]) -> SideCounts {
    let mut totals = SideCounts::default();
    for row in rows {
        *totals.get_mut(row.as_ref().side()) += 1;
    }
    totals
}

/// True if the message looks like a media or system placeholder
#[must_use]
pub fn is_placeholder(content: &str) -> bool {
    content.contains('[') || content.contains(']')
}

/// Word usage per side, most frequent first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordFrequencies {
    /// Words used by the sender side
    pub sender: Vec<WordCount>,
    /// Words used by the receiver side
    pub receiver: Vec<WordCount>,
}

impl WordFrequencies {
    /// Words used by `side`
    #[must_use]
    pub fn for_side(&self, side: Side) -> &[WordCount] {
        match side {
            Side::Sender => &self.sender,
            Side::Receiver => &self.receiver,
        }
    }

    /// Keep only the `n` most frequent words per side
    #[must_use]
    pub fn top(&self, n: usize) -> Self {
        Self {
            sender: self.sender.iter().take(n).cloned().collect(),
            receiver: self.receiver.iter().take(n).cloned().collect(),
        }
    }
}

/// Count lower-cased, whitespace-separated words per side.
///
/// Messages containing a bracket are skipped entirely.
pub fn word_frequencies<M: AsRef<DerivedMessage>>(rows: &[M]) -> WordFrequencies {
    let mut counts: PerSide<HashMap<String, usize>> = PerSide::default();

    for row in rows {
        let row = row.as_ref();
        if is_placeholder(&row.message.content) {
            continue;
        }
        let side_counts = counts.get_mut(row.side());
        for word in row.message.content.to_lowercase().split_whitespace() {
            *side_counts.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    let sorted = counts.map(|map| {
        let mut words: Vec<WordCount> = map.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words
    });

    WordFrequencies {
        sender: sorted.sender,
        receiver: sorted.receiver,
    }
}

/// Message count per month and side, zero-filled
pub fn monthly_side_counts<M: AsRef<DerivedMessage>>(rows: &[M]) -> BTreeMap<String, SideCounts> {
    let mut counts: BTreeMap<String, SideCounts> = BTreeMap::new();
    for row in rows {
        let row = row.as_ref();
        *counts.entry(row.month.clone()).or_default().get_mut(row.side()) += 1;
    }
    counts
}

/// An ISO week, ordered by year then week number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IsoWeekKey {
    /// ISO week-numbering year
    pub year: i32,
    /// ISO week number (1-53)
    pub week: u32,
}

impl IsoWeekKey {
    /// Week containing `date`
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Label such as `2024-W07`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}-W{:02}", self.year, self.week)
    }
}

/// One heatmap row: a week and its message counts for Monday..Sunday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekRow {
    /// The ISO week
    pub week: IsoWeekKey,
    /// Counts indexed by ISO weekday - 1
    pub days: [usize; 7],
}

/// Message count per (ISO week, ISO weekday), weeks in ascending order.
///
/// Only weeks with at least one message appear; within a week every
/// weekday has a value.
pub fn weekly_heatmap<M: AsRef<DerivedMessage>>(rows: &[M]) -> Vec<WeekRow> {
    let mut weeks: BTreeMap<IsoWeekKey, [usize; 7]> = BTreeMap::new();
    for row in rows {
        let date = row.as_ref().date;
        let weekday = date.weekday().number_from_monday() as usize;
        weeks.entry(IsoWeekKey::of(date)).or_insert([0; 7])[weekday - 1] += 1;
    }
    weeks
        .into_iter()
        .map(|(week, days)| WeekRow { week, days })
        .collect()
}

/// Emotion counts for one (month, side)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCounts {
    /// Messages scored negative
    pub negative: usize,
    /// Messages scored neutral
    pub neutral: usize,
    /// Messages scored positive
    pub positive: usize,
}

impl EmotionCounts {
    /// Count for one class
    #[must_use]
    pub const fn get(&self, class: EmotionClass) -> usize {
        match class {
            EmotionClass::Negative => self.negative,
            EmotionClass::Neutral => self.neutral,
            EmotionClass::Positive => self.positive,
        }
    }

    fn add(&mut self, class: EmotionClass) {
        match class {
            EmotionClass::Negative => self.negative += 1,
            EmotionClass::Neutral => self.neutral += 1,
            EmotionClass::Positive => self.positive += 1,
        }
    }

    /// Sum over all classes
    #[must_use]
    pub const fn total(&self) -> usize {
        self.negative + self.neutral + self.positive
    }
}

/// Emotion distribution per month and side; unclassified messages are skipped
#[must_use]
pub fn monthly_emotions(rows: &[ScoredMessage]) -> BTreeMap<String, PerSide<EmotionCounts>> {
    let mut counts: BTreeMap<String, PerSide<EmotionCounts>> = BTreeMap::new();
    for row in rows {
        let Some(class) = row.emotion else {
            continue;
        };
        counts
            .entry(row.derived.month.clone())
            .or_default()
            .get_mut(row.derived.side())
            .add(class);
    }
    counts
}

/// Number of initiating messages per month and side
pub fn monthly_initiations<M: AsRef<DerivedMessage>>(rows: &[M]) -> BTreeMap<String, SideCounts> {
    let mut counts: BTreeMap<String, SideCounts> = BTreeMap::new();
    for row in rows {
        let row = row.as_ref();
        let entry = counts.entry(row.month.clone()).or_default();
        if row.initiates {
            *entry.get_mut(row.side()) += 1;
        }
    }
    counts
}

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn finish_means(means: BTreeMap<String, PerSide<Mean>>) -> BTreeMap<String, PerSide<Option<f64>>> {
    means
        .into_iter()
        .map(|(month, per_side)| (month, per_side.map(Mean::value)))
        .collect()
}

/// Average messages per block, by month and side.
///
/// A block that spans midnight is counted once per date it touches.
pub fn monthly_block_sizes<M: AsRef<DerivedMessage>>(
    rows: &[M],
) -> BTreeMap<String, PerSide<Option<f64>>> {
    let mut segments: BTreeMap<(u64, NaiveDate), (String, Side, usize)> = BTreeMap::new();
    for row in rows {
        let row = row.as_ref();
        segments
            .entry((row.block_id, row.date))
            .or_insert_with(|| (row.month.clone(), row.side(), 0))
            .2 += 1;
    }

    let mut means: BTreeMap<String, PerSide<Mean>> = BTreeMap::new();
    for (month, side, size) in segments.into_values() {
        means.entry(month).or_default().get_mut(side).push(size as f64);
    }
    finish_means(means)
}

/// Average reply time in minutes at block starts, by month and side
pub fn monthly_reply_times<M: AsRef<DerivedMessage>>(
    rows: &[M],
) -> BTreeMap<String, PerSide<Option<f64>>> {
    let mut means: BTreeMap<String, PerSide<Mean>> = BTreeMap::new();
    for row in rows {
        let row = row.as_ref();
        let entry = means.entry(row.month.clone()).or_default();
        if let Some(reply) = row.reply_time_minutes {
            entry.get_mut(row.side()).push(reply);
        }
    }
    finish_means(means)
}

/// Initiations, block sizes and reply times over the same month axis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionPatterns {
    /// Initiating messages per month and side
    pub initiations: BTreeMap<String, SideCounts>,
    /// Mean block size per month and side
    pub block_sizes: BTreeMap<String, PerSide<Option<f64>>>,
    /// Mean reply time per month and side
    pub reply_times: BTreeMap<String, PerSide<Option<f64>>>,
}

impl InteractionPatterns {
    /// Compute all three interaction facets
    pub fn from_rows<M: AsRef<DerivedMessage>>(rows: &[M]) -> Self {
        Self {
            initiations: monthly_initiations(rows),
            block_sizes: monthly_block_sizes(rows),
            reply_times: monthly_reply_times(rows),
        }
    }

    /// Months present in any facet, ascending
    #[must_use]
    pub fn months(&self) -> Vec<String> {
        let mut months: Vec<String> = self
            .initiations
            .keys()
            .chain(self.block_sizes.keys())
            .chain(self.reply_times.keys())
            .cloned()
            .collect();
        months.sort();
        months.dedup();
        months
    }
}

/// Every aggregate the report needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of messages analysed
    pub total_messages: usize,
    /// Number of conversation blocks
    pub total_blocks: u64,
    /// Messages per side
    pub side_totals: SideCounts,
    /// Messages per date
    pub daily: BTreeMap<NaiveDate, usize>,
    /// Messages per hour of day
    pub hourly: BTreeMap<u32, usize>,
    /// Density curve over hours
    pub hourly_density: Vec<(f64, f64)>,
    /// Top-N words per side
    pub words: WordFrequencies,
    /// Messages per month and side
    pub monthly: BTreeMap<String, SideCounts>,
    /// Weekly heatmap rows
    pub weekly: Vec<WeekRow>,
    /// Emotion distribution per month and side
    pub emotions: BTreeMap<String, PerSide<EmotionCounts>>,
    /// Interaction facets
    pub interactions: InteractionPatterns,
}

/// Points sampled for the hourly density curve
pub const DENSITY_POINTS: usize = 200;

impl Summary {
    /// Compute every aggregate from scored rows
    #[must_use]
    pub fn from_rows(rows: &[ScoredMessage], top_n: usize) -> Self {
        Self {
            total_messages: rows.len(),
            total_blocks: rows.last().map_or(0, |r| r.derived.block_id),
            side_totals: side_totals(rows),
            daily: daily_counts(rows),
            hourly: hourly_counts(rows),
            hourly_density: hour_density(rows, DENSITY_POINTS),
            words: word_frequencies(rows).top(top_n),
            monthly: monthly_side_counts(rows),
            weekly: weekly_heatmap(rows),
            emotions: monthly_emotions(rows),
            interactions: InteractionPatterns::from_rows(rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty() {
        assert_eq!(Mean::default().value(), None);
        let mut mean = Mean::default();
        mean.push(2.0);
        mean.push(4.0);
        assert_eq!(mean.value(), Some(3.0));
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder("[Photo]"));
        assert!(is_placeholder("look ]"));
        assert!(!is_placeholder("plain text"));
    }

    #[test]
    fn test_iso_week_label() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let key = IsoWeekKey::of(date);
        assert_eq!(key, IsoWeekKey { year: 2025, week: 1 });
        assert_eq!(key.label(), "2025-W01");
    }
}
