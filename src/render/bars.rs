use chrono::NaiveDate;
use plotters::prelude::*;
use std::collections::BTreeMap;

use super::{category_label, draw_placeholder, palette, Area, ChartStyle, DrawResult};
use crate::aggregate::{EmotionCounts, InteractionPatterns, WordFrequencies};
use crate::models::{EmotionClass, Participants, PerSide, Side};

const MAX_CATEGORY_LABELS: usize = 31;
const BAR_HALF_WIDTH: f64 = 0.4;
const GROUP_OFFSET: f64 = 0.2;
const GROUP_HALF_WIDTH: f64 = 0.19;

/// Upper bound for a count axis with a little headroom
fn axis_max(max: f64) -> f64 {
    if max <= 0.0 {
        1.0
    } else {
        max * 1.1
    }
}

fn side_color(side: Side) -> RGBColor {
    match side {
        Side::Sender => palette::SENDER,
        Side::Receiver => palette::RECEIVER,
    }
}

fn side_offset(side: Side) -> f64 {
    match side {
        Side::Sender => -GROUP_OFFSET,
        Side::Receiver => GROUP_OFFSET,
    }
}

fn emotion_color(class: EmotionClass) -> RGBColor {
    match class {
        EmotionClass::Negative => palette::NEGATIVE,
        EmotionClass::Neutral => palette::NEUTRAL,
        EmotionClass::Positive => palette::POSITIVE,
    }
}

pub(super) fn draw_daily(root: &Area<'_>, style: &ChartStyle, daily: &BTreeMap<NaiveDate, usize>) -> DrawResult {
    const TITLE: &str = "Daily Chat Frequency";
    if daily.is_empty() {
        return draw_placeholder(root, style, TITLE);
    }

    let labels: Vec<String> = daily.keys().map(|d| d.format("%Y-%m-%d").to_string()).collect();
    let max = daily.values().copied().max().unwrap_or(0) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(TITLE, style.title())
        .margin(15)
        .x_label_area_size(70)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(labels.len() as f64 - 0.5), 0f64..axis_max(max))?;

    let x_fmt = |x: &f64| category_label(&labels, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().min(MAX_CATEGORY_LABELS))
        .x_label_formatter(&x_fmt)
        .x_label_style(style.small())
        .y_label_formatter(&|y: &f64| format!("{y:.0}"))
        .x_desc("Date")
        .y_desc("Frequency")
        .label_style(style.label())
        .axis_desc_style(style.label())
        .draw()?;

    chart.draw_series(daily.values().enumerate().map(|(i, count)| {
        let x = i as f64;
        Rectangle::new(
            [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, *count as f64)],
            palette::DAILY.filled(),
        )
    }))?;

    Ok(())
}

pub(super) fn draw_hourly(
    root: &Area<'_>,
    style: &ChartStyle,
    hourly: &BTreeMap<u32, usize>,
    density: &[(f64, f64)],
) -> DrawResult {
    const TITLE: &str = "Hourly Chat Frequency";
    if hourly.is_empty() {
        return draw_placeholder(root, style, TITLE);
    }

    let max = hourly.values().copied().max().unwrap_or(0) as f64;
    let density_max = density.iter().map(|(_, d)| *d).fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(TITLE, style.title())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .right_y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..23.5f64, 0f64..axis_max(max))?
        .set_secondary_coord(-0.5f64..23.5f64, 0f64..axis_max(density_max));

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(24)
        .x_label_formatter(&|x: &f64| {
            let hour = x.round();
            if (x - hour).abs() < 1e-6 && (0.0..24.0).contains(&hour) {
                format!("{hour:.0}")
            } else {
                String::new()
            }
        })
        .y_label_formatter(&|y: &f64| format!("{y:.0}"))
        .x_desc("Hour")
        .y_desc("Frequency")
        .label_style(style.label())
        .axis_desc_style(style.label())
        .draw()?;

    chart
        .draw_series(hourly.iter().map(|(hour, count)| {
            let x = f64::from(*hour);
            Rectangle::new(
                [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, *count as f64)],
                palette::HOURLY.filled(),
            )
        }))?
        .label("Messages")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], palette::HOURLY.filled()));

    if !density.is_empty() {
        chart
            .configure_secondary_axes()
            .y_desc("Density")
            .y_label_formatter(&|y: &f64| format!("{y:.3}"))
            .label_style(style.label())
            .axis_desc_style(style.label())
            .draw()?;

        chart
            .draw_secondary_series(LineSeries::new(
                density.iter().copied(),
                palette::DENSITY.stroke_width(2),
            ))?
            .label("Density")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], palette::DENSITY.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(style.label())
        .draw()?;

    Ok(())
}

pub(super) fn draw_words(
    root: &Area<'_>,
    style: &ChartStyle,
    participants: &Participants,
    words: &WordFrequencies,
) -> DrawResult {
    let (w, _) = root.dim_in_pixel();
    let (left, right) = root.split_horizontally((w / 2) as i32);

    for (area, side, color) in [
        (left, Side::Sender, palette::WORDS_SENDER),
        (right, Side::Receiver, palette::WORDS_RECEIVER),
    ] {
        let title = format!("Word Frequency (Sent by {})", participants.name(side));
        draw_word_panel(&area, style, &title, words.for_side(side), color)?;
    }

    Ok(())
}

fn draw_word_panel(
    area: &Area<'_>,
    style: &ChartStyle,
    title: &str,
    words: &[(String, usize)],
    color: RGBColor,
) -> DrawResult {
    if words.is_empty() {
        return draw_placeholder(area, style, title);
    }

    // most frequent word on top
    let labels: Vec<String> = words.iter().rev().map(|(word, _)| word.clone()).collect();
    let max = words.iter().map(|(_, count)| *count).max().unwrap_or(0) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(title, style.label())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..axis_max(max), -0.5f64..(labels.len() as f64 - 0.5))?;

    let y_fmt = |y: &f64| category_label(&labels, *y);
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(labels.len())
        .y_label_formatter(&y_fmt)
        .x_label_formatter(&|x: &f64| format!("{x:.0}"))
        .x_desc("Frequency")
        .label_style(style.small())
        .axis_desc_style(style.small())
        .draw()?;

    chart.draw_series(words.iter().rev().enumerate().map(|(i, (_, count))| {
        let y = i as f64;
        Rectangle::new(
            [(0.0, y - BAR_HALF_WIDTH), (*count as f64, y + BAR_HALF_WIDTH)],
            color.filled(),
        )
    }))?;

    Ok(())
}

/// Values for a chart with one sender bar and one receiver bar per category
pub(super) struct GroupedBars<'a> {
    pub(super) title: &'a str,
    pub(super) x_desc: &'a str,
    pub(super) y_desc: &'a str,
    pub(super) categories: &'a [String],
    pub(super) values: &'a [PerSide<f64>],
    pub(super) participants: &'a Participants,
}

pub(super) fn draw_grouped(root: &Area<'_>, style: &ChartStyle, bars: &GroupedBars<'_>) -> DrawResult {
    if bars.categories.is_empty() {
        return draw_placeholder(root, style, bars.title);
    }

    let max = bars
        .values
        .iter()
        .flat_map(|v| [v.sender, v.receiver])
        .fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(bars.title, style.title())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(bars.categories.len() as f64 - 0.5), 0f64..axis_max(max))?;

    let x_fmt = |x: &f64| category_label(bars.categories, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.categories.len().min(MAX_CATEGORY_LABELS))
        .x_label_formatter(&x_fmt)
        .x_desc(bars.x_desc)
        .y_desc(bars.y_desc)
        .label_style(style.label())
        .axis_desc_style(style.label())
        .draw()?;

    for side in Side::ALL {
        let color = side_color(side);
        let offset = side_offset(side);
        chart
            .draw_series(bars.values.iter().enumerate().map(|(i, value)| {
                let x = i as f64 + offset;
                Rectangle::new(
                    [(x - GROUP_HALF_WIDTH, 0.0), (x + GROUP_HALF_WIDTH, *value.get(side))],
                    color.filled(),
                )
            }))?
            .label(bars.participants.name(side))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(style.label())
        .draw()?;

    Ok(())
}

pub(super) fn draw_emotions(
    root: &Area<'_>,
    style: &ChartStyle,
    participants: &Participants,
    emotions: &BTreeMap<String, PerSide<EmotionCounts>>,
) -> DrawResult {
    const TITLE: &str = "Monthly Emotional Distribution by Sender Type";
    if emotions.is_empty() {
        return draw_placeholder(root, style, TITLE);
    }

    let months: Vec<String> = emotions.keys().cloned().collect();
    let max = emotions
        .values()
        .flat_map(|counts| [counts.sender.total(), counts.receiver.total()])
        .max()
        .unwrap_or(0) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(TITLE, style.title())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(months.len() as f64 - 0.5), 0f64..axis_max(max))?;

    let x_fmt = |x: &f64| category_label(&months, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(months.len().min(MAX_CATEGORY_LABELS))
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&|y: &f64| format!("{y:.0}"))
        .x_desc("Month")
        .y_desc("Number of Messages")
        .label_style(style.label())
        .axis_desc_style(style.label())
        .draw()?;

    for side in Side::ALL {
        let offset = side_offset(side);
        // running top of each stack
        let mut base = vec![0.0f64; months.len()];

        for class in EmotionClass::ALL {
            let fill = match side {
                Side::Sender => emotion_color(class).filled(),
                Side::Receiver => emotion_color(class).mix(0.55).filled(),
            };

            let segments: Vec<_> = emotions
                .values()
                .enumerate()
                .map(|(i, counts)| {
                    let bottom = base[i];
                    let top = bottom + counts.get(side).get(class) as f64;
                    base[i] = top;
                    let x = i as f64 + offset;
                    Rectangle::new([(x - GROUP_HALF_WIDTH, bottom), (x + GROUP_HALF_WIDTH, top)], fill)
                })
                .collect();

            chart
                .draw_series(segments)?
                .label(format!("{} ({})", class.label(), participants.name(side)))
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], fill));
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(style.small())
        .draw()?;

    Ok(())
}

pub(super) fn draw_interactions(
    root: &Area<'_>,
    style: &ChartStyle,
    participants: &Participants,
    patterns: &InteractionPatterns,
) -> DrawResult {
    let panels = root.split_evenly((3, 1));
    let months = patterns.months();

    let initiations: Vec<PerSide<f64>> = months
        .iter()
        .map(|m| {
            patterns
                .initiations
                .get(m)
                .map(|c| c.map(|v| v as f64))
                .unwrap_or_default()
        })
        .collect();
    let block_sizes = monthly_means(&months, &patterns.block_sizes);
    let reply_times = monthly_means(&months, &patterns.reply_times);

    let panel_specs = [
        ("Monthly Conversation Initiations", "Initiation Count", &initiations),
        (
            "Average Messages Per Conversation Block Monthly",
            "Average Message Count",
            &block_sizes,
        ),
        ("Average Reply Time Monthly", "Average Reply Time (min)", &reply_times),
    ];

    for (area, (title, y_desc, values)) in panels.iter().zip(panel_specs) {
        draw_grouped(
            area,
            style,
            &GroupedBars {
                title,
                x_desc: "Month",
                y_desc,
                categories: &months,
                values,
                participants,
            },
        )?;
    }

    Ok(())
}

/// Missing months and sides are drawn as zero-height bars
fn monthly_means(months: &[String], means: &BTreeMap<String, PerSide<Option<f64>>>) -> Vec<PerSide<f64>> {
    months
        .iter()
        .map(|m| {
            means
                .get(m)
                .map(|v| v.map(|mean| mean.unwrap_or(0.0)))
                .unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_max() {
        assert_eq!(axis_max(0.0), 1.0);
        assert!((axis_max(10.0) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_means_fill_missing() {
        let months = vec!["2025-01".to_string(), "2025-02".to_string()];
        let mut means = BTreeMap::new();
        means.insert(
            "2025-02".to_string(),
            PerSide {
                sender: Some(2.5),
                receiver: None,
            },
        );

        let filled = monthly_means(&months, &means);
        assert_eq!(filled[0], PerSide { sender: 0.0, receiver: 0.0 });
        assert_eq!(filled[1], PerSide { sender: 2.5, receiver: 0.0 });
    }
}
