use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// X coordinate of a plotted point: epoch milliseconds for time series, or a
/// plain ordinal on the same axis.
pub type Timestamp = i64;

/// One plotted observation.
///
/// `y` is expected to be finite; non-finite values are rendered as gaps.
/// `x` should be non-decreasing within a series (not enforced).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: Timestamp,
    pub y: f64,
}

impl DataPoint {
    pub fn new(x: Timestamp, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a point from a UTC timestamp.
    pub fn at(ts: DateTime<Utc>, y: f64) -> Self {
        Self {
            x: ts.timestamp_millis(),
            y,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.y.is_finite()
    }
}

/// Value axis a series or threshold is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Left axis (always present).
    #[default]
    Primary,
    /// Right axis (only present when configured).
    Secondary,
}

impl Axis {
    /// Stable axis id used by the render model.
    pub fn id(&self) -> &'static str {
        match self {
            Axis::Primary => "y",
            Axis::Secondary => "y1",
        }
    }
}

/// How a single series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualKind {
    Line,
    Bar,
    Scatter,
}

/// Chart-wide kind selectable by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
}

impl From<ChartKind> for VisualKind {
    fn from(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Line => VisualKind::Line,
            ChartKind::Bar => VisualKind::Bar,
        }
    }
}

/// One plotted quantity over time.
///
/// Identity is `id`: two series are the same series across renders iff their
/// ids match, whatever their data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub data: Vec<DataPoint>,
    /// Theme token or CSS-like color (`"primary"`, `"#1976d2"`, `"rgba(…)"`).
    #[serde(default)]
    pub color: Option<String>,
    /// Per-series override; `None` follows the chart kind.
    #[serde(default)]
    pub visual_kind: Option<VisualKind>,
    #[serde(default)]
    pub filled: bool,
    #[serde(default)]
    pub axis: Axis,
    #[serde(default = "default_point_radius")]
    pub point_radius: f64,
    #[serde(default = "default_line_tension")]
    pub line_tension: f64,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Hidden when the chart mounts; the user may still toggle it on.
    #[serde(default)]
    pub visual_hidden: bool,
}

fn default_point_radius() -> f64 {
    3.0
}

fn default_line_tension() -> f64 {
    0.4
}

fn default_line_width() -> f64 {
    2.0
}

impl Series {
    pub fn new(id: impl Into<String>, label: impl Into<String>, data: Vec<DataPoint>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data,
            color: None,
            visual_kind: None,
            filled: false,
            axis: Axis::Primary,
            point_radius: default_point_radius(),
            line_tension: default_line_tension(),
            line_width: default_line_width(),
            visual_hidden: false,
        }
    }

    /// Build a series from station readings, picking `metric` from each record.
    /// Readings without that metric (or with a non-numeric one) contribute no point.
    pub fn from_readings(
        id: impl Into<String>,
        label: impl Into<String>,
        readings: &[Reading],
        metric: &Metric,
    ) -> Self {
        let data = readings
            .iter()
            .filter_map(|r| r.metric(metric).map(|y| DataPoint::at(r.timestamp, y)))
            .collect();
        Self::new(id, label, data)
    }

    pub fn with_color(mut self, token: impl Into<String>) -> Self {
        self.color = Some(token.into());
        self
    }

    pub fn with_kind(mut self, kind: VisualKind) -> Self {
        self.visual_kind = Some(kind);
        self
    }

    pub fn filled(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }

    pub fn on_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.visual_hidden = hidden;
        self
    }

    pub fn with_point_radius(mut self, radius: f64) -> Self {
        self.point_radius = radius;
        self
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    pub fn with_line_tension(mut self, tension: f64) -> Self {
        self.line_tension = tension;
        self
    }

    /// Identity comparison (by id only).
    pub fn is_same_series(&self, other: &Series) -> bool {
        self.id == other.id
    }

    /// Kind actually drawn, given the chart-wide kind.
    pub fn resolved_kind(&self, chart_kind: ChartKind) -> VisualKind {
        self.visual_kind.unwrap_or_else(|| chart_kind.into())
    }
}

/// Fixed horizontal reference line (e.g. critical water depth).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub value: f64,
    pub label: String,
    pub color: String,
    #[serde(default)]
    pub axis: Axis,
}

impl Threshold {
    pub fn new(value: f64, label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            color: color.into(),
            axis: Axis::Primary,
        }
    }

    pub fn on_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }
}

/// Raw station reading as delivered by the data-fetching layer:
/// `{ "timestamp": "...", "value": 1.2, "rainfall": 0.4, ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    /// Optional secondary metrics; non-numeric extras are kept but never plotted.
    #[serde(flatten)]
    pub metrics: BTreeMap<String, serde_json::Value>,
}

/// Which quantity of a `Reading` a series plots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metric {
    Value,
    Named(String),
}

impl Metric {
    /// `"value"` maps to the primary reading value, anything else to a named metric.
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("value") {
            Metric::Value
        } else {
            Metric::Named(name.to_string())
        }
    }
}

impl Reading {
    pub fn metric(&self, metric: &Metric) -> Option<f64> {
        match metric {
            Metric::Value => Some(self.value),
            Metric::Named(name) => self.metrics.get(name).and_then(|v| v.as_f64()),
        }
    }
}

/// Visible X window in axis units (inclusive bounds, `min <= max`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XRange {
    pub min: Timestamp,
    pub max: Timestamp,
}

impl XRange {
    pub fn new(a: Timestamp, b: Timestamp) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn span(&self) -> i64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min as f64 + self.max as f64) / 2.0
    }

    /// Scale the span around the current center. `factor > 1` narrows the
    /// window (zoom in), `factor < 1` widens it. Never collapses below 1 unit.
    pub fn zoomed(&self, factor: f64) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return *self;
        }
        let half = (self.span() as f64 / factor / 2.0).max(0.5);
        let c = self.center();
        Self::new((c - half).round() as i64, (c + half).round() as i64)
    }

    pub fn shifted(&self, delta: i64) -> Self {
        Self {
            min: self.min.saturating_add(delta),
            max: self.max.saturating_add(delta),
        }
    }

    pub fn contains(&self, x: Timestamp) -> bool {
        x >= self.min && x <= self.max
    }
}

/// Payload of a range-change notification. Both bounds are `None` after a
/// zoom reset (full extent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeChange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl RangeChange {
    pub fn full_extent() -> Self {
        Self {
            start: None,
            end: None,
        }
    }
}

impl From<XRange> for RangeChange {
    fn from(r: XRange) -> Self {
        Self {
            start: DateTime::from_timestamp_millis(r.min),
            end: DateTime::from_timestamp_millis(r.max),
        }
    }
}
