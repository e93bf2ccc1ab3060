//! Chart rendering.
//!
//! One method per chart, each taking an aggregate and writing a PNG with a
//! fixed file name into the output directory. Fonts, sizes and image
//! dimensions come from an explicit [`RenderConfig`]; nothing here relies on
//! process-wide plotting defaults other than the font registry, which is
//! populated when the renderer is built.

mod bars;
mod heatmap;
mod pie;

use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontDesc};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing::{debug, info, warn};

use crate::aggregate::{EmotionCounts, InteractionPatterns, SideCounts, Summary, WeekRow, WordFrequencies};
use crate::config::RenderConfig;
use crate::error::{ChatReportError, Result};
use crate::metrics::PipelineMetrics;
use crate::models::{Participants, PerSide};

/// Daily frequency chart
pub const DAILY_FREQUENCY_FILE: &str = "chat_frequency_by_day.png";
/// Hourly frequency chart
pub const HOURLY_FREQUENCY_FILE: &str = "chat_frequency_by_hour.png";
/// Word frequency chart
pub const WORD_FREQUENCY_FILE: &str = "word_frequency.png";
/// Per-side share pie chart
pub const CHAT_COMPARISON_FILE: &str = "chat_comparison.png";
/// Monthly per-side counts chart
pub const MONTHLY_COMPARISON_FILE: &str = "monthly_chat_frequency_comparison.png";
/// Weekly heatmap
pub const WEEKLY_HEATMAP_FILE: &str = "weekly_chat_heatmap.png";
/// Monthly emotion distribution chart
pub const EMOTIONS_FILE: &str = "monthly_emotional_distribution_combined.png";
/// Interaction patterns chart
pub const INTERACTION_PATTERNS_FILE: &str = "interaction_patterns.png";

/// Font shipped with the crate, used unless a font file is configured
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Installed fonts covering Chinese text, tried in order when no font file
/// is configured
pub const CJK_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/wenquanyi/wqy-microhei/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
    "C:\\Windows\\Fonts\\msyh.ttc",
];

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

mod palette {
    use plotters::style::RGBColor;

    pub(super) const DAILY: RGBColor = RGBColor(0xDF, 0x9F, 0x9B);
    pub(super) const HOURLY: RGBColor = RGBColor(0xE6, 0xAA, 0xAA);
    pub(super) const DENSITY: RGBColor = RGBColor(0xC6, 0x4F, 0x4F);
    pub(super) const WORDS_SENDER: RGBColor = RGBColor(0x00, 0x96, 0x88);
    pub(super) const WORDS_RECEIVER: RGBColor = RGBColor(0x6A, 0x04, 0x04);
    pub(super) const PIE_SENDER: RGBColor = RGBColor(0x26, 0x4F, 0x61);
    pub(super) const PIE_RECEIVER: RGBColor = RGBColor(0x95, 0x23, 0xAA);
    pub(super) const SENDER: RGBColor = RGBColor(0x1F, 0x77, 0xB4);
    pub(super) const RECEIVER: RGBColor = RGBColor(0xFF, 0x7F, 0x0E);
    pub(super) const NEGATIVE: RGBColor = RGBColor(0xD6, 0x27, 0x28);
    pub(super) const NEUTRAL: RGBColor = RGBColor(0x80, 0x80, 0x80);
    pub(super) const POSITIVE: RGBColor = RGBColor(0x2C, 0xA0, 0x2C);
}

/// Font and size settings shared by every chart
#[derive(Debug, Clone)]
struct ChartStyle {
    family: String,
    title_size: f64,
    label_size: f64,
}

impl ChartStyle {
    fn title(&self) -> FontDesc<'_> {
        (self.family.as_str(), self.title_size).into()
    }

    fn label(&self) -> FontDesc<'_> {
        (self.family.as_str(), self.label_size).into()
    }

    fn small(&self) -> FontDesc<'_> {
        (self.family.as_str(), (self.label_size * 0.75).max(6.0)).into()
    }
}

/// Font files read so far. The backend keeps `'static` references, so each
/// file is read and leaked at most once per process.
fn font_cache() -> &'static Mutex<HashMap<PathBuf, &'static [u8]>> {
    static CACHE: OnceLock<Mutex<HashMap<PathBuf, &'static [u8]>>> = OnceLock::new();
    CACHE.get_or_init(Mutex::default)
}

fn read_font(path: &Path) -> Result<&'static [u8]> {
    let mut cache = font_cache()
        .lock()
        .map_err(|_| ChatReportError::Other("font cache lock poisoned".to_string()))?;
    if let Some(&bytes) = cache.get(path) {
        return Ok(bytes);
    }

    let bytes: &'static [u8] = Box::leak(std::fs::read(path)?.into_boxed_slice());
    cache.insert(path.to_path_buf(), bytes);
    Ok(bytes)
}

fn register_family(family: &str, bytes: &'static [u8]) -> Result<()> {
    // the backend's font error carries no description
    register_font(family, FontStyle::Normal, bytes).map_err(|_| {
        ChatReportError::InvalidConfig(format!(
            "cannot use font {family}: not a valid TrueType/OpenType font"
        ))
    })
}

/// First candidate that exists as a file
fn find_font(candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().map(PathBuf::from).find(|path| path.is_file())
}

fn register_chart_font(config: &RenderConfig) -> Result<()> {
    if let Some(path) = &config.font_path {
        info!("Loading chart font from {}", path);
        return register_family(&config.font_family, read_font(Path::new(path))?);
    }

    if let Some(path) = find_font(CJK_FONT_CANDIDATES) {
        match read_font(&path).and_then(|bytes| register_family(&config.font_family, bytes)) {
            Ok(()) => {
                info!("Using installed font {}", path.display());
                return Ok(());
            }
            Err(e) => warn!("Skipping font {}: {}", path.display(), e),
        }
    }

    debug!("Using bundled DejaVu Sans; Chinese text needs render.font_path");
    register_family(&config.font_family, BUNDLED_FONT)
}

/// Renders report charts into a directory
pub struct ChartRenderer {
    output_dir: PathBuf,
    size: (u32, u32),
    style: ChartStyle,
    participants: Participants,
}

impl ChartRenderer {
    /// Build a renderer and register its font with the plotting backend.
    ///
    /// Without a configured font file the first installed CJK font from
    /// [`CJK_FONT_CANDIDATES`] is used, then the bundled DejaVu Sans.
    pub fn new(output_dir: impl Into<PathBuf>, config: &RenderConfig, participants: Participants) -> Result<Self> {
        register_chart_font(config)?;

        Ok(Self {
            output_dir: output_dir.into(),
            size: (config.width, config.height),
            style: ChartStyle {
                family: config.font_family.clone(),
                title_size: f64::from(config.title_font_size),
                label_size: f64::from(config.label_font_size),
            },
            participants,
        })
    }

    /// Directory charts are written to
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn draw<F>(&self, file: &'static str, size: (u32, u32), draw_chart: F) -> Result<PathBuf>
    where
        F: FnOnce(&Area<'_>, &ChartStyle) -> DrawResult,
    {
        if !self.output_dir.is_dir() {
            return Err(ChatReportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("output directory {} does not exist", self.output_dir.display()),
            )));
        }

        let path = self.output_dir.join(file);
        let render_error = |message: String| ChatReportError::Render {
            chart: file.to_string(),
            message,
        };

        {
            let root = BitMapBackend::new(&path, size).into_drawing_area();
            root.fill(&WHITE).map_err(|e| render_error(e.to_string()))?;
            draw_chart(&root, &self.style).map_err(|e| render_error(e.to_string()))?;
            root.present().map_err(|e| render_error(e.to_string()))?;
        }

        debug!("Wrote {}", path.display());
        Ok(path)
    }

    fn tall(&self) -> (u32, u32) {
        (self.size.0, self.size.1 * 3)
    }

    fn square(&self) -> (u32, u32) {
        let side = self.size.0.max(self.size.1);
        (side, side)
    }

    /// Bar chart of messages per day
    pub fn render_daily_frequency(&self, daily: &BTreeMap<NaiveDate, usize>) -> Result<PathBuf> {
        self.draw(DAILY_FREQUENCY_FILE, self.size, |root, style| {
            bars::draw_daily(root, style, daily)
        })
    }

    /// Bar chart of messages per hour with a density overlay
    pub fn render_hourly_frequency(
        &self,
        hourly: &BTreeMap<u32, usize>,
        density: &[(f64, f64)],
    ) -> Result<PathBuf> {
        self.draw(HOURLY_FREQUENCY_FILE, self.size, |root, style| {
            bars::draw_hourly(root, style, hourly, density)
        })
    }

    /// Side-by-side horizontal bars of each side's top words
    pub fn render_word_frequency(&self, words: &WordFrequencies) -> Result<PathBuf> {
        self.draw(WORD_FREQUENCY_FILE, self.size, |root, style| {
            bars::draw_words(root, style, &self.participants, words)
        })
    }

    /// Pie chart of each side's share of messages
    pub fn render_chat_comparison(&self, totals: &SideCounts) -> Result<PathBuf> {
        self.draw(CHAT_COMPARISON_FILE, self.size, |root, style| {
            pie::draw_comparison(root, style, &self.participants, totals)
        })
    }

    /// Grouped bars of messages per month and side
    pub fn render_monthly_comparison(&self, monthly: &BTreeMap<String, SideCounts>) -> Result<PathBuf> {
        self.draw(MONTHLY_COMPARISON_FILE, self.size, |root, style| {
            let months: Vec<String> = monthly.keys().cloned().collect();
            let values: Vec<PerSide<f64>> = monthly.values().map(|c| c.map(|v| v as f64)).collect();
            bars::draw_grouped(
                root,
                style,
                &bars::GroupedBars {
                    title: "Monthly Chat Frequency Comparison",
                    x_desc: "Month",
                    y_desc: "Number of Messages",
                    categories: &months,
                    values: &values,
                    participants: &self.participants,
                },
            )
        })
    }

    /// Heatmap of messages per ISO week and weekday
    pub fn render_weekly_heatmap(&self, weeks: &[WeekRow]) -> Result<PathBuf> {
        self.draw(WEEKLY_HEATMAP_FILE, self.square(), |root, style| {
            heatmap::draw_weekly(root, style, weeks)
        })
    }

    /// Stacked emotion bars per month, one bar per side
    pub fn render_emotions(&self, emotions: &BTreeMap<String, PerSide<EmotionCounts>>) -> Result<PathBuf> {
        self.draw(EMOTIONS_FILE, self.size, |root, style| {
            bars::draw_emotions(root, style, &self.participants, emotions)
        })
    }

    /// Three stacked panels: initiations, block sizes, reply times
    pub fn render_interaction_patterns(&self, patterns: &InteractionPatterns) -> Result<PathBuf> {
        self.draw(INTERACTION_PATTERNS_FILE, self.tall(), |root, style| {
            bars::draw_interactions(root, style, &self.participants, patterns)
        })
    }

    /// Render every chart in report order
    pub fn render_all(&self, summary: &Summary, metrics: &PipelineMetrics) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(8);

        written.push(self.render_daily_frequency(&summary.daily)?);
        written.push(self.render_word_frequency(&summary.words)?);
        written.push(self.render_hourly_frequency(&summary.hourly, &summary.hourly_density)?);
        written.push(self.render_chat_comparison(&summary.side_totals)?);
        written.push(self.render_monthly_comparison(&summary.monthly)?);
        written.push(self.render_weekly_heatmap(&summary.weekly)?);
        written.push(self.render_emotions(&summary.emotions)?);
        written.push(self.render_interaction_patterns(&summary.interactions)?);

        for path in &written {
            if let Some(file) = chart_file_name(path) {
                metrics.record_chart(file);
            }
        }
        info!(charts = written.len(), "Rendered charts into {}", self.output_dir.display());
        Ok(written)
    }
}

fn chart_file_name(path: &Path) -> Option<&'static str> {
    let name = path.file_name()?.to_str()?;
    [
        DAILY_FREQUENCY_FILE,
        HOURLY_FREQUENCY_FILE,
        WORD_FREQUENCY_FILE,
        CHAT_COMPARISON_FILE,
        MONTHLY_COMPARISON_FILE,
        WEEKLY_HEATMAP_FILE,
        EMOTIONS_FILE,
        INTERACTION_PATTERNS_FILE,
    ]
    .into_iter()
    .find(|f| *f == name)
}

/// Label for a category axis tick; empty between categories
fn category_label(labels: &[String], value: f64) -> String {
    let index = value.round();
    if (value - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

/// Title plus a centred "No data" note
fn draw_placeholder(root: &Area<'_>, style: &ChartStyle, title: &str) -> DrawResult {
    let area = root.titled(title, style.title())?;
    let (w, h) = area.dim_in_pixel();
    let text_style = TextStyle::from(style.label()).pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new("No data", ((w / 2) as i32, (h / 2) as i32), text_style))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_label() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(category_label(&labels, 0.0), "a");
        assert_eq!(category_label(&labels, 1.0000001), "b");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn test_chart_file_name() {
        let path = Path::new("charts").join(WORD_FREQUENCY_FILE);
        assert_eq!(chart_file_name(&path), Some(WORD_FREQUENCY_FILE));
        assert_eq!(chart_file_name(Path::new("other.png")), None);
    }

    fn participants() -> Participants {
        Participants {
            sender_name: "Me".to_string(),
            receiver_name: "Friend".to_string(),
        }
    }

    #[test]
    fn test_invalid_font_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();

        let config = RenderConfig {
            font_family: "broken-test-font".to_string(),
            font_path: Some(path.to_string_lossy().into_owned()),
            ..RenderConfig::default()
        };
        let result = ChartRenderer::new(dir.path(), &config, participants());
        assert!(matches!(result, Err(ChatReportError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_font_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig {
            font_family: "missing-test-font".to_string(),
            font_path: Some(dir.path().join("absent.ttf").to_string_lossy().into_owned()),
            ..RenderConfig::default()
        };
        let result = ChartRenderer::new(dir.path(), &config, participants());
        assert!(matches!(result, Err(ChatReportError::Io(_))));
    }

    #[test]
    fn test_font_file_is_read_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.bin");
        std::fs::write(&path, BUNDLED_FONT).unwrap();

        let first = read_font(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = read_font(&path).unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_find_font_skips_missing_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.ttf");
        std::fs::write(&present, b"x").unwrap();
        let missing = dir.path().join("missing.ttf");

        let missing = missing.to_string_lossy().into_owned();
        let present_str = present.to_string_lossy().into_owned();
        assert_eq!(find_font(&[missing.as_str(), present_str.as_str()]), Some(present));
        assert_eq!(find_font(&[missing.as_str()]), None);
    }
}
