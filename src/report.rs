//! HTML report assembly.
//!
//! Builds one section per chart and substitutes them into a template with a
//! single `charts` placeholder. Placeholders follow the `$name` / `${name}`
//! convention, with `$$` standing for a literal dollar sign.

use regex::{Captures, Regex};
use std::path::{Component, Path, PathBuf};
use tracing::info;

use crate::error::{ChatReportError, Result};
use crate::render::{
    CHAT_COMPARISON_FILE, DAILY_FREQUENCY_FILE, EMOTIONS_FILE, HOURLY_FREQUENCY_FILE,
    INTERACTION_PATTERNS_FILE, MONTHLY_COMPARISON_FILE, WEEKLY_HEATMAP_FILE, WORD_FREQUENCY_FILE,
};

/// Template used when no template file is configured
pub const BUILTIN_TEMPLATE: &str = include_str!("../templates/chat_analysis_template.html");

/// Name of the placeholder the chart sections are substituted into
pub const CHARTS_PLACEHOLDER: &str = "charts";

/// One chart entry in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartInfo {
    /// Section heading
    pub title: &'static str,
    /// Image file name inside the chart directory
    pub file: &'static str,
    /// Text shown under the heading
    pub description: &'static str,
}

/// Charts in report order
#[must_use]
pub fn default_charts() -> Vec<ChartInfo> {
    vec![
        ChartInfo {
            title: "Chat Comparison",
            file: CHAT_COMPARISON_FILE,
            description: "Comparison of the number of messages sent by each participant.",
        },
        ChartInfo {
            title: "Daily Chat Frequency",
            file: DAILY_FREQUENCY_FILE,
            description: "Frequency of chats for each day.",
        },
        ChartInfo {
            title: "Hourly Chat Frequency",
            file: HOURLY_FREQUENCY_FILE,
            description: "Distribution of chats throughout the day.",
        },
        ChartInfo {
            title: "Interaction Patterns",
            file: INTERACTION_PATTERNS_FILE,
            description: "Patterns of how participants interact in the conversation.",
        },
        ChartInfo {
            title: "Monthly Chat Frequency Comparison",
            file: MONTHLY_COMPARISON_FILE,
            description: "Monthly comparison of the number of messages sent by each participant.",
        },
        ChartInfo {
            title: "Monthly Emotional Distribution",
            file: EMOTIONS_FILE,
            description: "Emotional analysis of messages on a monthly basis.",
        },
        ChartInfo {
            title: "Weekly Chat Heatmap",
            file: WEEKLY_HEATMAP_FILE,
            description: "Heatmap showing the distribution of chats throughout the week.",
        },
        ChartInfo {
            title: "Word Frequency",
            file: WORD_FREQUENCY_FILE,
            description: "Most common words used in the conversation.",
        },
    ]
}

/// Escape text for use in HTML content and attribute values
#[must_use]
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// HTML for all chart sections, images referenced as `<image_dir>/<file>`
#[must_use]
pub fn chart_sections(charts: &[ChartInfo], image_dir: &Path) -> String {
    let dir = image_dir.to_string_lossy();
    let dir = dir.trim_end_matches('/');

    charts
        .iter()
        .map(|chart| {
            let src = if dir.is_empty() {
                chart.file.to_string()
            } else {
                format!("{dir}/{}", chart.file)
            };
            format!(
                r#"
    <div class="chart">
        <h2 class="chart-title">{}</h2>
        <p class="chart-description">{}</p>
        <img src="{}" class="img-fluid">
    </div>
"#,
                html_escape(chart.title),
                html_escape(chart.description),
                html_escape(&src),
            )
        })
        .collect()
}

/// A parsed report template
#[derive(Debug, Clone)]
pub struct ReportTemplate {
    text: String,
    placeholder: Regex,
}

impl ReportTemplate {
    /// Wrap template text
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let placeholder = Regex::new(
            r"\$(?:(?P<escaped>\$)|(?P<named>[_A-Za-z][_A-Za-z0-9]*)|\{(?P<braced>[_A-Za-z][_A-Za-z0-9]*)\}|(?P<invalid>))",
        )
        .map_err(|e| anyhow::anyhow!("Failed to compile placeholder regex: {e}"))?;

        Ok(Self {
            text: text.into(),
            placeholder,
        })
    }

    /// The template shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::new(BUILTIN_TEMPLATE)
    }

    /// Read a template file
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading report template from {}", path.display());
        Self::new(std::fs::read_to_string(path)?)
    }

    /// Replace every placeholder with its value.
    ///
    /// Placeholders without a value and a `$` that starts no placeholder are
    /// errors; nothing is left unsubstituted.
    pub fn substitute(&self, values: &[(&str, &str)]) -> Result<String> {
        let mut output = String::with_capacity(self.text.len());
        let mut last = 0;

        for caps in self.placeholder.captures_iter(&self.text) {
            let Some(whole) = caps.get(0) else { continue };
            output.push_str(&self.text[last..whole.start()]);
            output.push_str(self.replacement(&caps, whole.start(), values)?);
            last = whole.end();
        }
        output.push_str(&self.text[last..]);

        Ok(output)
    }

    fn replacement<'v>(&self, caps: &Captures<'_>, offset: usize, values: &[(&str, &'v str)]) -> Result<&'v str> {
        if caps.name("escaped").is_some() {
            return Ok("$");
        }

        let name = caps
            .name("named")
            .or_else(|| caps.name("braced"))
            .map(|m| m.as_str());

        match name {
            Some(name) => values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| ChatReportError::Template(format!("unknown placeholder '${name}'"))),
            None => {
                let (line, column) = self.position(offset);
                Err(ChatReportError::Template(format!(
                    "invalid placeholder at line {line}, column {column}"
                )))
            }
        }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let before = &self.text[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        (line, column)
    }
}

/// `image_dir` as seen from the directory holding `report_path`.
///
/// Returned unchanged when only one of the two paths is absolute or the
/// report directory climbs with `..`, since no relative path can be derived.
#[must_use]
pub fn image_dir_for_report(image_dir: &Path, report_path: &Path) -> PathBuf {
    fn parts(path: &Path) -> Vec<Component<'_>> {
        path.components().filter(|c| !matches!(c, Component::CurDir)).collect()
    }

    let report_dir = report_path.parent().unwrap_or_else(|| Path::new(""));
    if image_dir.is_absolute() != report_dir.is_absolute() {
        return image_dir.to_path_buf();
    }

    let image = parts(image_dir);
    let base = parts(report_dir);
    if base.iter().any(|c| matches!(c, Component::ParentDir)) {
        return image_dir.to_path_buf();
    }

    let common = image.iter().zip(&base).take_while(|(a, b)| a == b).count();
    let mut relative: PathBuf = std::iter::repeat(Component::ParentDir.as_os_str())
        .take(base.len() - common)
        .collect();
    relative.extend(image[common..].iter().map(|c| c.as_os_str()));
    relative
}

/// Write the HTML report and return its path.
///
/// Image `src` attributes are relative to the report's directory. Image
/// files are referenced, not checked.
pub fn assemble_report(
    charts: &[ChartInfo],
    image_dir: &Path,
    template: &ReportTemplate,
    report_path: &Path,
) -> Result<PathBuf> {
    let sections = chart_sections(charts, &image_dir_for_report(image_dir, report_path));
    let html = template.substitute(&[(CHARTS_PLACEHOLDER, sections.as_str())])?;

    std::fs::write(report_path, html)?;
    info!(charts = charts.len(), "Wrote report to {}", report_path.display());

    Ok(report_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_substitute_forms() {
        let template = ReportTemplate::new("a $charts b ${charts}c $$5").unwrap();
        let out = template.substitute(&[("charts", "X")]).unwrap();
        assert_eq!(out, "a X b Xc $5");
    }

    #[test]
    fn test_unknown_placeholder() {
        let template = ReportTemplate::new("$title").unwrap();
        let err = template.substitute(&[("charts", "X")]).unwrap_err();
        assert!(matches!(err, ChatReportError::Template(_)));
    }

    #[test]
    fn test_invalid_placeholder_position() {
        let template = ReportTemplate::new("ok\ncost: $5").unwrap();
        match template.substitute(&[("charts", "X")]) {
            Err(ChatReportError::Template(message)) => {
                assert!(message.contains("line 2, column 7"), "{message}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_builtin_template_has_charts_placeholder() {
        assert!(BUILTIN_TEMPLATE.contains("$charts"));
        let template = ReportTemplate::builtin().unwrap();
        assert!(template.substitute(&[("charts", "")]).is_ok());
    }

    #[test]
    fn test_default_charts() {
        let charts = default_charts();
        assert_eq!(charts.len(), 8);
        assert_eq!(charts[0].file, "chat_comparison.png");
        assert_eq!(charts[7].title, "Word Frequency");
    }

    #[test]
    fn test_image_dir_for_report() {
        let cases = [
            ("charts", "chat_analysis_report.html", "charts"),
            ("out/charts", "out/r.html", "charts"),
            ("./out/charts", "out/r.html", "charts"),
            ("charts", "out/r.html", "../charts"),
            ("out", "out/r.html", ""),
            ("/data/charts", "/data/site/r.html", "../charts"),
            ("/data/charts", "r.html", "/data/charts"),
            ("charts", "../r.html", "charts"),
        ];
        for (image_dir, report, expected) in cases {
            assert_eq!(
                image_dir_for_report(Path::new(image_dir), Path::new(report)),
                PathBuf::from(expected),
                "{image_dir} from {report}"
            );
        }
    }

    #[test]
    fn test_chart_sections_image_paths() {
        let html = chart_sections(&default_charts()[..1], Path::new("charts"));
        assert!(html.contains(r#"<img src="charts/chat_comparison.png" class="img-fluid">"#));
        assert!(html.contains(r#"<h2 class="chart-title">Chat Comparison</h2>"#));
    }
}
