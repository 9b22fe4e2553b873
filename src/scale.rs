//! Axis resolution: time X axis plus primary and optional secondary value axes.
//!
//! The time axis uses a fixed policy (day ticks, abbreviated month + day labels)
//! regardless of the visible span. Long spans may label densely; adapting tick
//! density to the window is left for later.

use crate::models::{Axis, Timestamp, XRange};
use crate::render::{Dataset, ThresholdMarker};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Tick label format for the time axis (`Mar 7`).
pub const DAY_TICK_FORMAT: &str = "%b %-d";

/// Fraction of the value span added above and below the data.
const VALUE_PADDING: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Day,
}

impl TimeUnit {
    pub fn millis(&self) -> i64 {
        match self {
            TimeUnit::Day => 86_400_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    pub unit: TimeUnit,
    pub tick_format: String,
    /// `None` means "auto" (no data to bound the axis).
    pub min: Option<Timestamp>,
    pub max: Option<Timestamp>,
}

impl TimeAxis {
    pub fn format_tick(&self, x: Timestamp) -> String {
        match DateTime::from_timestamp_millis(x) {
            Some(dt) => dt.format(&self.tick_format).to_string(),
            None => x.to_string(),
        }
    }

    pub fn range(&self) -> Option<XRange> {
        Some(XRange::new(self.min?, self.max?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAxis {
    pub id: String,
    pub axis: Axis,
    pub position: AxisPosition,
    /// Axis title; `None` hides it.
    pub title: Option<String>,
    pub grid_lines: bool,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    pub x: TimeAxis,
    pub primary: ValueAxis,
    pub secondary: Option<ValueAxis>,
}

impl ScaleConfig {
    /// The axis to draw against; secondary falls back to primary when absent.
    pub fn value_axis(&self, axis: Axis) -> &ValueAxis {
        match (axis, &self.secondary) {
            (Axis::Secondary, Some(s)) => s,
            _ => &self.primary,
        }
    }
}

/// Axis labels and units taken from the chart configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisLabels {
    pub y_label: String,
    pub y_unit: String,
    pub secondary_label: String,
    pub secondary_unit: String,
}

impl AxisLabels {
    pub fn has_secondary(&self) -> bool {
        !self.secondary_label.trim().is_empty()
    }

    /// Axis a series/threshold actually lands on.
    pub fn effective_axis(&self, requested: Axis) -> Axis {
        match requested {
            Axis::Secondary if self.has_secondary() => Axis::Secondary,
            _ => Axis::Primary,
        }
    }
}

/// `"{label} ({unit})"`, just the label without a unit, `None` when the label is empty.
pub fn axis_title(label: &str, unit: &str) -> Option<String> {
    let label = label.trim();
    let unit = unit.trim();
    match (label.is_empty(), unit.is_empty()) {
        (true, _) => None,
        (false, true) => Some(label.to_string()),
        (false, false) => Some(format!("{label} ({unit})")),
    }
}

/// Resolve X and Y axes for the given (already axis-resolved) datasets and thresholds.
pub fn resolve_scales(
    labels: &AxisLabels,
    datasets: &[Dataset],
    thresholds: &[ThresholdMarker],
    zoom: Option<XRange>,
) -> ScaleConfig {
    let extent = zoom.or_else(|| data_extent(datasets));
    let x = TimeAxis {
        unit: TimeUnit::Day,
        tick_format: DAY_TICK_FORMAT.to_string(),
        min: extent.map(|r| r.min),
        max: extent.map(|r| r.max),
    };

    let values_on = |axis: Axis| {
        let series_vals = datasets
            .iter()
            .filter(move |d| d.axis == axis)
            .flat_map(|d| d.points.iter().filter_map(|p| p.y));
        let threshold_vals = thresholds
            .iter()
            .filter(move |t| t.axis == axis)
            .map(|t| t.value);
        series_vals.chain(threshold_vals)
    };

    let (pmin, pmax) = value_domain(values_on(Axis::Primary));
    let primary = ValueAxis {
        id: Axis::Primary.id().to_string(),
        axis: Axis::Primary,
        position: AxisPosition::Left,
        title: axis_title(&labels.y_label, &labels.y_unit),
        grid_lines: true,
        min: pmin,
        max: pmax,
    };

    let secondary = labels.has_secondary().then(|| {
        let (smin, smax) = value_domain(values_on(Axis::Secondary));
        ValueAxis {
            id: Axis::Secondary.id().to_string(),
            axis: Axis::Secondary,
            position: AxisPosition::Right,
            title: axis_title(&labels.secondary_label, &labels.secondary_unit),
            // Independent scale: never share gridlines with the primary axis.
            grid_lines: false,
            min: smin,
            max: smax,
        }
    });

    ScaleConfig {
        x,
        primary,
        secondary,
    }
}

/// Min/max x over every point of every dataset.
pub fn data_extent(datasets: &[Dataset]) -> Option<XRange> {
    let mut xs = datasets.iter().flat_map(|d| d.points.iter().map(|p| p.x));
    let first = xs.next()?;
    let (lo, hi) = xs.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x)));
    Some(XRange::new(lo, hi))
}

fn value_domain(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut lo, mut hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * VALUE_PADDING;
    (lo - pad, hi + pad)
}
