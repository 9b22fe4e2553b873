//! Render model builder: turns series, thresholds and the display state into a
//! draw-ready, deterministic structure.

use crate::controller::DisplayState;
use crate::models::{Axis, ChartKind, Series, Threshold, Timestamp, VisualKind, XRange};
use crate::scale::{AxisLabels, ScaleConfig, data_extent, resolve_scales};
use crate::style::{Rgba, StyleTokens};
use crate::trend::trend_points;
use serde::{Deserialize, Serialize};

/// Suffix appended to a series label for its trend overlay.
pub const TREND_SUFFIX: &str = " (Trend)";
/// Dash pattern (on, off) in pixels for trend overlays.
pub const TREND_DASH: [u32; 2] = [5, 5];
/// Dash pattern for threshold lines.
pub const THRESHOLD_DASH: [u32; 2] = [6, 4];

const BAR_FILL_ALPHA: f64 = 0.5;
const AREA_FILL_ALPHA: f64 = 0.125;
const TREND_ALPHA: f64 = 0.5;
const THRESHOLD_LINE_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetRole {
    /// Data of a caller-supplied series.
    Series,
    /// Regression overlay derived from a series.
    Trend,
}

/// A point as drawn: `y == None` is a gap (non-finite input), never zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderPoint {
    pub x: Timestamp,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    /// Id of the series this dataset was built from.
    pub series_id: String,
    pub role: DatasetRole,
    pub label: String,
    pub kind: VisualKind,
    pub points: Vec<RenderPoint>,
    pub border_color: Rgba,
    pub background_color: Rgba,
    pub fill: bool,
    pub axis: Axis,
    pub axis_id: String,
    pub border_dash: Option<[u32; 2]>,
    pub point_radius: f64,
    pub line_tension: f64,
    pub line_width: f64,
}

impl Dataset {
    pub fn has_values(&self) -> bool {
        self.points.iter().any(|p| p.y.is_some())
    }
}

/// Horizontal reference line with an end label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdMarker {
    pub value: f64,
    pub label: String,
    pub color: Rgba,
    pub axis: Axis,
    pub axis_id: String,
    pub border_dash: [u32; 2],
    pub line_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderModel {
    pub title: Option<String>,
    /// Subtitle line drawn under the title.
    pub description: Option<String>,
    pub show_legend: bool,
    /// Hint for surfaces that can transition between models; static
    /// surfaces ignore it.
    pub animate: bool,
    pub datasets: Vec<Dataset>,
    pub thresholds: Vec<ThresholdMarker>,
    pub scales: ScaleConfig,
}

impl RenderModel {
    /// True when no dataset holds a drawable value.
    pub fn is_empty(&self) -> bool {
        !self.datasets.iter().any(Dataset::has_values)
    }

    /// Datasets built directly from series (trend overlays excluded).
    pub fn series_datasets(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets
            .iter()
            .filter(|d| d.role == DatasetRole::Series)
    }

    pub fn dataset(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    /// Full x extent of the data, ignoring any zoom.
    pub fn data_extent(&self) -> Option<XRange> {
        data_extent(&self.datasets)
    }
}

/// Chart-level inputs to the builder that come from configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelOptions {
    pub axes: AxisLabels,
    pub title: Option<String>,
    pub description: Option<String>,
    pub show_legend: bool,
    pub animate: bool,
}

/// Build the render model. Pure and deterministic.
pub fn build_render_model(
    series: &[Series],
    thresholds: &[Threshold],
    state: &DisplayState,
    tokens: &StyleTokens,
    options: &ModelOptions,
) -> RenderModel {
    let visible: Vec<&Series> = series.iter().filter(|s| state.is_visible(&s.id)).collect();

    let mut datasets: Vec<Dataset> = visible
        .iter()
        .map(|s| series_dataset(s, state.chart_kind, tokens, &options.axes))
        .collect();

    if state.trendline_enabled {
        let trends: Vec<Dataset> = visible
            .iter()
            .zip(datasets.iter())
            .filter_map(|(s, parent)| trend_dataset(s, parent))
            .collect();
        datasets.extend(trends);
    }

    let markers: Vec<ThresholdMarker> = thresholds
        .iter()
        .filter_map(|t| threshold_marker(t, tokens, &options.axes))
        .collect();

    let scales = resolve_scales(&options.axes, &datasets, &markers, state.zoomed_range);

    RenderModel {
        title: options.title.clone(),
        description: options.description.clone(),
        show_legend: options.show_legend,
        animate: options.animate,
        datasets,
        thresholds: markers,
        scales,
    }
}

fn series_dataset(
    s: &Series,
    chart_kind: ChartKind,
    tokens: &StyleTokens,
    axes: &AxisLabels,
) -> Dataset {
    let color = tokens.resolve_or_primary(s.color.as_deref());
    let kind = s.resolved_kind(chart_kind);
    let (fill, background_color) = match kind {
        VisualKind::Bar => (true, color.with_alpha(BAR_FILL_ALPHA)),
        VisualKind::Line if s.filled => (true, color.with_alpha(AREA_FILL_ALPHA)),
        VisualKind::Line => (false, color),
        VisualKind::Scatter => (false, color),
    };

    let points: Vec<RenderPoint> = s
        .data
        .iter()
        .map(|p| RenderPoint {
            x: p.x,
            y: p.is_finite().then_some(p.y),
        })
        .collect();
    let gaps = points.iter().filter(|p| p.y.is_none()).count();
    if gaps > 0 {
        log::debug!("series {:?}: {gaps} non-finite point(s) drawn as gaps", s.id);
    }

    let axis = axes.effective_axis(s.axis);
    Dataset {
        id: s.id.clone(),
        series_id: s.id.clone(),
        role: DatasetRole::Series,
        label: s.label.clone(),
        kind,
        points,
        border_color: color,
        background_color,
        fill,
        axis,
        axis_id: axis.id().to_string(),
        border_dash: None,
        point_radius: s.point_radius,
        line_tension: s.line_tension,
        line_width: s.line_width,
    }
}

fn trend_dataset(s: &Series, parent: &Dataset) -> Option<Dataset> {
    let Some(fitted) = trend_points(&s.data) else {
        log::debug!("series {:?}: no trend", s.id);
        return None;
    };
    let color = parent.border_color.with_alpha(TREND_ALPHA);
    Some(Dataset {
        id: format!("{}-trend", s.id),
        series_id: s.id.clone(),
        role: DatasetRole::Trend,
        label: format!("{}{TREND_SUFFIX}", s.label),
        kind: VisualKind::Line,
        points: fitted
            .into_iter()
            .map(|p| RenderPoint { x: p.x, y: Some(p.y) })
            .collect(),
        border_color: color,
        background_color: color,
        fill: false,
        axis: parent.axis,
        axis_id: parent.axis_id.clone(),
        border_dash: Some(TREND_DASH),
        point_radius: 0.0,
        line_tension: 0.0,
        line_width: parent.line_width,
    })
}

fn threshold_marker(
    t: &Threshold,
    tokens: &StyleTokens,
    axes: &AxisLabels,
) -> Option<ThresholdMarker> {
    if !t.value.is_finite() {
        log::warn!("threshold {:?} has non-finite value, skipped", t.label);
        return None;
    }
    let axis = axes.effective_axis(t.axis);
    Some(ThresholdMarker {
        value: t.value,
        label: t.label.clone(),
        color: tokens.resolve_or_primary(Some(&t.color)),
        axis,
        axis_id: axis.id().to_string(),
        border_dash: THRESHOLD_DASH,
        line_width: THRESHOLD_LINE_WIDTH,
    })
}
