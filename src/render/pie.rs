use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::{FRAC_PI_2, TAU};

use super::{draw_placeholder, palette, Area, ChartStyle, DrawResult};
use crate::aggregate::SideCounts;
use crate::models::{Participants, Side};

const TITLE: &str = "Comparison of the Number of Chats";
/// Radial offset of the receiver slice, as a fraction of the radius
const RECEIVER_EXPLODE: f64 = 0.05;

/// One wedge of the pie, angles in radians counter-clockwise from +x
#[derive(Debug, Clone, Copy, PartialEq)]
struct Slice {
    side: Side,
    fraction: f64,
    start: f64,
    sweep: f64,
}

/// Slices in sender, receiver order starting at twelve o'clock; empty sides are skipped
fn slices(totals: &SideCounts) -> Vec<Slice> {
    let total = totals.sender + totals.receiver;
    if total == 0 {
        return Vec::new();
    }

    let mut start = FRAC_PI_2;
    let mut out = Vec::with_capacity(2);
    for side in Side::ALL {
        let count = *totals.get(side);
        if count == 0 {
            continue;
        }
        let fraction = count as f64 / total as f64;
        let sweep = fraction * TAU;
        out.push(Slice {
            side,
            fraction,
            start,
            sweep,
        });
        start += sweep;
    }
    out
}

pub(super) fn draw_comparison(
    root: &Area<'_>,
    style: &ChartStyle,
    participants: &Participants,
    totals: &SideCounts,
) -> DrawResult {
    let wedges = slices(totals);
    if wedges.is_empty() {
        return draw_placeholder(root, style, TITLE);
    }

    let area = root.titled(TITLE, style.title())?;
    let (w, h) = area.dim_in_pixel();
    let center = (f64::from(w) / 2.0, f64::from(h) / 2.0);
    let radius = f64::from(w.min(h)) * 0.36;
    let centered = Pos::new(HPos::Center, VPos::Center);

    for wedge in &wedges {
        let (color, explode) = match wedge.side {
            Side::Sender => (palette::PIE_SENDER, 0.0),
            Side::Receiver => (palette::PIE_RECEIVER, RECEIVER_EXPLODE),
        };
        let mid = wedge.start + wedge.sweep / 2.0;
        // screen y grows downwards
        let cx = center.0 + radius * explode * mid.cos();
        let cy = center.1 - radius * explode * mid.sin();
        let at = |r: f64, angle: f64| ((cx + r * angle.cos()) as i32, (cy - r * angle.sin()) as i32);

        let steps = ((wedge.sweep / TAU) * 180.0).ceil().max(2.0) as usize;
        let mut outline = Vec::with_capacity(steps + 2);
        if wedge.fraction < 1.0 {
            outline.push((cx as i32, cy as i32));
        }
        outline.extend((0..=steps).map(|s| at(radius, wedge.start + wedge.sweep * s as f64 / steps as f64)));
        area.draw(&Polygon::new(outline, color.filled()))?;

        let percent = format!("{:.1}%", wedge.fraction * 100.0);
        let percent_style = TextStyle::from(style.label()).color(&WHITE).pos(centered);
        area.draw(&Text::new(percent, at(radius * 0.6, mid), percent_style))?;

        let name_style = TextStyle::from(style.label()).pos(centered);
        area.draw(&Text::new(
            participants.name(wedge.side).to_string(),
            at(radius * 1.15, mid),
            name_style,
        ))?;
    }

    draw_legend(&area, style, participants)?;
    Ok(())
}

fn draw_legend(area: &Area<'_>, style: &ChartStyle, participants: &Participants) -> DrawResult {
    let mut y = 20;
    for (side, color) in [(Side::Sender, palette::PIE_SENDER), (Side::Receiver, palette::PIE_RECEIVER)] {
        area.draw(&Rectangle::new([(20, y - 6), (32, y + 6)], color.filled()))?;
        let label_style = TextStyle::from(style.label()).pos(Pos::new(HPos::Left, VPos::Center));
        area.draw(&Text::new(participants.name(side).to_string(), (40, y), label_style))?;
        y += 24;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PerSide;

    #[test]
    fn test_slices_cover_circle() {
        let wedges = slices(&PerSide {
            sender: 3,
            receiver: 1,
        });
        assert_eq!(wedges.len(), 2);
        assert!((wedges[0].fraction - 0.75).abs() < 1e-9);
        assert!((wedges[0].start - FRAC_PI_2).abs() < 1e-9);
        assert!((wedges[1].start - (FRAC_PI_2 + 0.75 * TAU)).abs() < 1e-9);
        let swept: f64 = wedges.iter().map(|w| w.sweep).sum();
        assert!((swept - TAU).abs() < 1e-9);
    }

    #[test]
    fn test_slices_skip_empty_side() {
        let wedges = slices(&PerSide {
            sender: 0,
            receiver: 4,
        });
        assert_eq!(wedges.len(), 1);
        assert_eq!(wedges[0].side, Side::Receiver);
        assert!((wedges[0].fraction - 1.0).abs() < 1e-9);

        assert!(slices(&PerSide::default()).is_empty());
    }
}
