//! Legend band drawn above the plot: one swatch + label per dataset, flowing
//! left to right and wrapping into rows.

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::{estimate_text_width_px, truncate_to_width};
use super::{SurfaceError, draw_err};

pub const LEGEND_FONT_PX: u32 = 13;

// Must match between layout and drawing.
const PAD: i32 = 8;
const LINE_H: i32 = 20;
const SWATCH_W: i32 = 24;
const SWATCH_GAP: i32 = 6;
const ITEM_GAP: i32 = 16;

pub struct LegendEntry {
    pub label: String,
    pub color: RGBAColor,
    pub dashed: bool,
}

/// Positions `(x, row)` of each item plus the fitted labels.
fn layout(labels: &[String], total_w: i32) -> (Vec<(i32, i32)>, Vec<String>) {
    let usable = (total_w - 2 * PAD).max(SWATCH_W + SWATCH_GAP + 20);
    let max_text = (usable - SWATCH_W - SWATCH_GAP).max(20) as u32;

    let mut slots = Vec::with_capacity(labels.len());
    let mut fitted = Vec::with_capacity(labels.len());
    let (mut x, mut row) = (PAD, 0);
    for label in labels {
        let text = truncate_to_width(label, LEGEND_FONT_PX, max_text);
        let w = SWATCH_W + SWATCH_GAP + estimate_text_width_px(&text, LEGEND_FONT_PX) as i32;
        if x > PAD && x + w > PAD + usable {
            row += 1;
            x = PAD;
        }
        slots.push((x, row));
        fitted.push(text);
        x += w + ITEM_GAP;
    }
    (slots, fitted)
}

/// Height in pixels the band needs for `labels` at width `total_w`.
pub fn legend_height_px(labels: &[String], total_w: i32) -> i32 {
    if labels.is_empty() {
        return 0;
    }
    let (slots, _) = layout(labels, total_w);
    let rows = slots.iter().map(|(_, r)| *r).max().unwrap_or(0) + 1;
    rows * LINE_H + 2 * PAD
}

pub fn draw_legend_band<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    entries: &[LegendEntry],
) -> Result<(), SurfaceError> {
    let (w, _) = area.dim_in_pixel();
    let labels: Vec<String> = entries.iter().map(|e| e.label.clone()).collect();
    let (slots, fitted) = layout(&labels, w as i32);

    let font = (FontFamily::SansSerif, LEGEND_FONT_PX)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));

    for ((entry, (x, row)), text) in entries.iter().zip(slots).zip(fitted) {
        let y = PAD + row * LINE_H + LINE_H / 2;
        let segments = if entry.dashed {
            let third = SWATCH_W / 3;
            vec![(x, x + third), (x + 2 * third, x + SWATCH_W)]
        } else {
            vec![(x, x + SWATCH_W)]
        };
        for (x0, x1) in segments {
            area.draw(&PathElement::new(
                vec![(x0, y), (x1, y)],
                entry.color.stroke_width(3),
            ))
            .map_err(draw_err)?;
        }
        area.draw(&Text::new(text, (x + SWATCH_W + SWATCH_GAP, y), font.clone()))
            .map_err(draw_err)?;
    }
    Ok(())
}
