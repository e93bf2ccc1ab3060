use plotters::prelude::*;

use super::{category_label, draw_placeholder, Area, ChartStyle, DrawResult};
use crate::aggregate::WeekRow;

const TITLE: &str = "Weekly Chat Heatmap";
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const COLORBAR_WIDTH: u32 = 110;
const COLORBAR_STEPS: usize = 100;

/// Sequential yellow-green-blue scale, light to dark
const YLGNBU: [(u8, u8, u8); 9] = [
    (0xFF, 0xFF, 0xD9),
    (0xED, 0xF8, 0xB1),
    (0xC7, 0xE9, 0xB4),
    (0x7F, 0xCD, 0xBB),
    (0x41, 0xB6, 0xC4),
    (0x1D, 0x91, 0xC0),
    (0x22, 0x5E, 0xA8),
    (0x25, 0x34, 0x94),
    (0x08, 0x1D, 0x58),
];

/// Color for `t` in [0, 1]
fn scale_color(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let position = t * (YLGNBU.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(YLGNBU.len() - 1);
    let frac = position - lower as f64;

    let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8;
    let (a, b) = (YLGNBU[lower], YLGNBU[upper]);
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

pub(super) fn draw_weekly(root: &Area<'_>, style: &ChartStyle, weeks: &[WeekRow]) -> DrawResult {
    if weeks.is_empty() {
        return draw_placeholder(root, style, TITLE);
    }

    let (w, _) = root.dim_in_pixel();
    let (grid, colorbar) = root.split_horizontally(w.saturating_sub(COLORBAR_WIDTH) as i32);

    let max = weeks
        .iter()
        .flat_map(|row| row.days.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    // first week on top: row r is drawn at y = n - 1 - r
    let rows = weeks.len();
    let week_labels: Vec<String> = weeks.iter().rev().map(|row| row.week.label()).collect();
    let day_labels: Vec<String> = WEEKDAYS.iter().map(|d| (*d).to_string()).collect();

    let mut chart = ChartBuilder::on(&grid)
        .caption(TITLE, style.title())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(-0.5f64..6.5f64, -0.5f64..(rows as f64 - 0.5))?;

    let x_fmt = |x: &f64| category_label(&day_labels, *x);
    let y_fmt = |y: &f64| category_label(&week_labels, *y);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(7)
        .x_label_formatter(&x_fmt)
        .y_labels(rows.min(60))
        .y_label_formatter(&y_fmt)
        .x_desc("Day of Week")
        .y_desc("Week")
        .label_style(style.small())
        .axis_desc_style(style.label())
        .draw()?;

    chart.draw_series(weeks.iter().enumerate().flat_map(|(r, row)| {
        let y = (rows - 1 - r) as f64;
        row.days.iter().enumerate().map(move |(day, count)| {
            let x = day as f64;
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                scale_color(*count as f64 / max).filled(),
            )
        })
    }))?;

    let mut bar = ChartBuilder::on(&colorbar)
        .margin_top(60)
        .margin_bottom(50)
        .margin_right(20)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..1f64, 0f64..max)?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(6)
        .y_label_formatter(&|y: &f64| format!("{y:.0}"))
        .label_style(style.small())
        .draw()?;

    bar.draw_series((0..COLORBAR_STEPS).map(|step| {
        let lo = max * step as f64 / COLORBAR_STEPS as f64;
        let hi = max * (step + 1) as f64 / COLORBAR_STEPS as f64;
        Rectangle::new(
            [(0.0, lo), (1.0, hi)],
            scale_color(step as f64 / (COLORBAR_STEPS - 1) as f64).filled(),
        )
    }))?;

    Ok(())
}
