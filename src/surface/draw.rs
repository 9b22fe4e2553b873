//! Paint a [`RenderModel`] onto any Plotters backend.

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::{AreaSeries, DashedLineSeries, LineSeries};
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use num_format::{Locale, ToFormattedString};

use super::legend::{LegendEntry, draw_legend_band, legend_height_px};
use super::{SurfaceCapabilities, SurfaceError, draw_err};
use crate::models::{Axis, VisualKind, XRange};
use crate::render::{Dataset, RenderModel, RenderPoint};
use crate::style::Rgba;

const MARGIN: u32 = 16;
const LEFT_LABEL_PX: u32 = 64;
const RIGHT_LABEL_PX: u32 = 64;
const BOTTOM_LABEL_PX: u32 = 40;
const BAR_GROUP_WIDTH: f64 = 0.8;
const TITLE_PX: u32 = 20;
const SUBTITLE_PX: u32 = 13;
const HEADER_LINE_PX: i32 = 26;

/// Draw into either the primary or the secondary coordinate system.
macro_rules! draw_on {
    ($chart:expr, $secondary:expr, $series:expr) => {
        if $secondary {
            $chart.draw_secondary_series($series).map(|_| ()).map_err(draw_err)
        } else {
            $chart.draw_series($series).map(|_| ()).map_err(draw_err)
        }
    };
}

fn color(c: Rgba) -> RGBAColor {
    RGBAColor(c.r, c.g, c.b, c.a)
}

/// Split a dataset into runs of consecutive drawable points; gaps end a run.
fn runs(points: &[RenderPoint]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut cur: Vec<(f64, f64)> = Vec::new();
    for p in points {
        match p.y {
            Some(y) => cur.push((p.x as f64, y)),
            None if !cur.is_empty() => out.push(std::mem::take(&mut cur)),
            None => {}
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

/// Smallest positive spacing between consecutive x values, used for bar widths.
fn min_spacing(datasets: &[&Dataset], fallback: f64) -> f64 {
    let mut best = f64::INFINITY;
    for d in datasets {
        for w in d.points.windows(2) {
            let dx = (w[1].x - w[0].x) as f64;
            if dx > 0.0 {
                best = best.min(dx);
            }
        }
    }
    if best.is_finite() { best } else { fallback }
}

/// Y tick labels: thousands separators for large values, 2 decimals for small ones.
fn format_value(v: &f64) -> String {
    let a = v.abs();
    if a >= 1000.0 {
        (v.round() as i64).to_formatted_string(&Locale::en)
    } else if a >= 100.0 {
        format!("{v:.0}")
    } else if a >= 10.0 {
        format!("{v:.1}")
    } else {
        format!("{v:.2}")
    }
}

/// Split off a band with the centered title and description lines; returns the rest.
fn draw_header<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<DrawingArea<DB, Shift>, SurfaceError> {
    let lines: Vec<(&str, u32, RGBAColor)> = [
        title.map(|t| (t, TITLE_PX, RGBAColor(33, 33, 33, 1.0))),
        description.map(|d| (d, SUBTITLE_PX, RGBAColor(97, 97, 97, 1.0))),
    ]
    .into_iter()
    .flatten()
    .collect();
    if lines.is_empty() {
        return Ok(root);
    }
    let (w, _) = root.dim_in_pixel();
    let (band, rest) = root.split_vertically(HEADER_LINE_PX * lines.len() as i32 + 4);
    for (i, (line, px, c)) in lines.into_iter().enumerate() {
        let style = (FontFamily::SansSerif, px)
            .into_font()
            .color(&c)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let y = 4 + HEADER_LINE_PX * i as i32 + HEADER_LINE_PX / 2;
        band.draw(&Text::new(line.to_string(), (w as i32 / 2, y), style))
            .map_err(draw_err)?;
    }
    Ok(rest)
}

/// Render `model` restricted to the `view` window (or the model's own X range).
pub fn draw_model<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    model: &RenderModel,
    view: Option<XRange>,
    caps: SurfaceCapabilities,
) -> Result<(), SurfaceError> {
    let text = caps.renders_text();
    root.fill(&WHITE).map_err(draw_err)?;

    // ----------------------------
    // 0) Header: title + description
    // ----------------------------
    let root = if text {
        draw_header(root, model.title.as_deref(), model.description.as_deref())?
    } else {
        root
    };

    // ----------------------------
    // 1) Legend band + plot area
    // ----------------------------
    let legend_entries: Vec<LegendEntry> = model
        .datasets
        .iter()
        .map(|d| LegendEntry {
            label: d.label.clone(),
            color: color(d.border_color),
            dashed: d.border_dash.is_some(),
        })
        .collect();
    let (root_w, _) = root.dim_in_pixel();
    let legend_h = if text && model.show_legend {
        let labels: Vec<String> = legend_entries.iter().map(|e| e.label.clone()).collect();
        legend_height_px(&labels, root_w as i32)
    } else {
        0
    };
    let (legend_area, plot_area) = if legend_h > 0 {
        let (top, rest) = root.split_vertically(legend_h);
        (Some(top), rest)
    } else {
        (None, root)
    };

    // ----------------------------
    // 2) Ranges
    // ----------------------------
    let mut xr = view
        .or_else(|| model.scales.x.range())
        .unwrap_or(XRange::new(0, 1));
    if xr.span() == 0 {
        let pad = model.scales.x.unit.millis() / 2;
        xr = XRange::new(xr.min - pad, xr.max + pad);
    }
    let (x0, x1) = (xr.min as f64, xr.max as f64);
    let primary = &model.scales.primary;
    let secondary = model.scales.secondary.as_ref().unwrap_or(primary);
    let has_secondary = model.scales.secondary.is_some();

    // ----------------------------
    // 3) Chart + axes
    // ----------------------------
    let mut builder = ChartBuilder::on(&plot_area);
    builder.margin(MARGIN);
    if text {
        builder
            .set_label_area_size(LabelAreaPosition::Left, LEFT_LABEL_PX)
            .set_label_area_size(LabelAreaPosition::Bottom, BOTTOM_LABEL_PX);
        if has_secondary {
            builder.set_label_area_size(LabelAreaPosition::Right, RIGHT_LABEL_PX);
        }
    }
    let mut chart = builder
        .build_cartesian_2d(x0..x1, primary.min..primary.max)
        .map_err(draw_err)?
        .set_secondary_coord(x0..x1, secondary.min..secondary.max);

    if text {
        let x_fmt = |x: &f64| model.scales.x.format_tick(x.round() as i64);
        let grid = RGBAColor(224, 224, 224, 1.0);
        {
            let mut mesh = chart.configure_mesh();
            mesh.x_labels(8)
                .y_labels(8)
                .x_label_formatter(&x_fmt)
                .y_label_formatter(&format_value)
                .bold_line_style(grid)
                .light_line_style(grid.mix(0.3))
                .label_style((FontFamily::SansSerif, 12))
                .axis_desc_style((FontFamily::SansSerif, 14));
            if !primary.grid_lines {
                mesh.disable_mesh();
            }
            if let Some(title) = primary.title.as_deref() {
                mesh.y_desc(title);
            }
            mesh.draw().map_err(draw_err)?;
        }

        // Secondary axis: ticks and title only, never gridlines.
        if let Some(sec) = model.scales.secondary.as_ref() {
            let mut axes = chart.configure_secondary_axes();
            axes.y_labels(8)
                .y_label_formatter(&format_value)
                .label_style((FontFamily::SansSerif, 12))
                .axis_desc_style((FontFamily::SansSerif, 14));
            if let Some(title) = sec.title.as_deref() {
                axes.y_desc(title);
            }
            axes.draw().map_err(draw_err)?;
        }
    }

    // ----------------------------
    // 4) Datasets
    // ----------------------------
    let bars: Vec<&Dataset> = model
        .datasets
        .iter()
        .filter(|d| d.kind == VisualKind::Bar)
        .collect();
    let spacing = min_spacing(&bars, model.scales.x.unit.millis() as f64);
    let bar_w = spacing * BAR_GROUP_WIDTH / bars.len().max(1) as f64;

    for d in &model.datasets {
        let on_secondary = has_secondary && d.axis == Axis::Secondary;
        let axis = if on_secondary { secondary } else { primary };
        let line = color(d.border_color);
        let body = color(d.background_color);
        let width = d.line_width.round().max(1.0) as u32;

        match d.kind {
            VisualKind::Line => {
                let baseline = 0.0f64.clamp(axis.min, axis.max);
                for run in runs(&d.points) {
                    if let Some([on, off]) = d.border_dash {
                        draw_on!(
                            chart,
                            on_secondary,
                            DashedLineSeries::new(run, on, off, line.stroke_width(width))
                        )?;
                        continue;
                    }
                    if d.fill {
                        draw_on!(
                            chart,
                            on_secondary,
                            AreaSeries::new(run.clone(), baseline, body.filled())
                                .border_style(line.stroke_width(width))
                        )?;
                    } else {
                        draw_on!(
                            chart,
                            on_secondary,
                            LineSeries::new(run.clone(), line.stroke_width(width))
                        )?;
                    }
                    if d.point_radius > 0.0 {
                        let r = d.point_radius.round() as i32;
                        draw_on!(
                            chart,
                            on_secondary,
                            run.iter().map(|&(x, y)| Circle::new((x, y), r, line.filled()))
                        )?;
                    }
                }
            }
            VisualKind::Bar => {
                let idx = bars.iter().position(|b| b.id == d.id).unwrap_or(0);
                let base = 0.0f64.clamp(axis.min, axis.max);
                let rects = d.points.iter().filter_map(|p| {
                    let y = p.y?;
                    let left = p.x as f64 - spacing * BAR_GROUP_WIDTH / 2.0 + idx as f64 * bar_w;
                    Some(Rectangle::new([(left, base), (left + bar_w, y)], body.filled()))
                });
                draw_on!(chart, on_secondary, rects)?;
            }
            VisualKind::Scatter => {
                let r = d.point_radius.max(2.0).round() as i32;
                let dots = d
                    .points
                    .iter()
                    .filter_map(|p| p.y.map(|y| Circle::new((p.x as f64, y), r, line.filled())));
                draw_on!(chart, on_secondary, dots)?;
            }
        }
    }

    // ----------------------------
    // 5) Thresholds
    // ----------------------------
    for t in &model.thresholds {
        let on_secondary = has_secondary && t.axis == Axis::Secondary;
        let c = color(t.color);
        let width = t.line_width.round().max(1.0) as u32;
        let [on, off] = t.border_dash;
        draw_on!(
            chart,
            on_secondary,
            DashedLineSeries::new(
                vec![(x0, t.value), (x1, t.value)],
                on,
                off,
                c.stroke_width(width)
            )
        )?;
        if text && !t.label.is_empty() {
            let font = (FontFamily::SansSerif, 12)
                .into_font()
                .color(&c)
                .pos(Pos::new(HPos::Right, VPos::Bottom));
            draw_on!(
                chart,
                on_secondary,
                std::iter::once(Text::new(t.label.clone(), (x1, t.value), font))
            )?;
        }
    }

    // ----------------------------
    // 6) Legend + present
    // ----------------------------
    if let Some(area) = legend_area.as_ref() {
        draw_legend_band(area, &legend_entries)?;
    }
    plot_area.present().map_err(draw_err)?;
    Ok(())
}
