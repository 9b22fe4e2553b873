//! Chart construction options.
//!
//! Every field has a default (`#[serde(default)]`), so a host can supply a
//! partial JSON object. Options are validated once when the chart is created
//! and stay immutable for its lifetime.

use crate::models::{ChartKind, Series};
use crate::render::ModelOptions;
use crate::scale::AxisLabels;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Name used for exports when the chart has no title.
pub const DEFAULT_EXPORT_NAME: &str = "chart";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("chart size must be non-zero, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("invalid {name}: {value} ({reason})")]
    InvalidZoomFactor {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("duplicate series id {0:?}")]
    DuplicateSeriesId(String),
    #[error("invalid chart config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read chart config: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Chart caption; also the export file name stem.
    pub title: Option<String>,
    pub description: Option<String>,
    /// Bitmap width in pixels (default 960).
    pub width: u32,
    /// Height in pixels (default 400).
    pub height: u32,
    /// Data still loading: show a progress placeholder.
    pub loading: bool,
    /// Upstream error message shown instead of the chart.
    pub error: Option<String>,
    pub y_axis_label: String,
    pub y_axis_unit: String,
    /// A secondary (right) axis exists only when this is non-empty.
    pub secondary_y_axis_label: String,
    pub secondary_y_axis_unit: String,
    pub enable_zoom: bool,
    pub enable_export: bool,
    pub enable_trendline: bool,
    pub show_legend: bool,
    pub animate: bool,
    pub default_chart_kind: ChartKind,
    /// Factor passed to the surface on zoom in (must be > 1, default 1.1).
    pub zoom_in_factor: f64,
    /// Factor passed to the surface on zoom out (must be in (0, 1), default 0.9).
    pub zoom_out_factor: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            width: 960,
            height: 400,
            loading: false,
            error: None,
            y_axis_label: String::new(),
            y_axis_unit: String::new(),
            secondary_y_axis_label: String::new(),
            secondary_y_axis_unit: String::new(),
            enable_zoom: true,
            enable_export: true,
            enable_trendline: true,
            show_legend: true,
            animate: true,
            default_chart_kind: ChartKind::Line,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
        }
    }
}

impl ChartConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: ChartConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        let zin = self.zoom_in_factor;
        if !zin.is_finite() || zin <= 1.0 {
            return Err(ConfigError::InvalidZoomFactor {
                name: "zoom_in_factor",
                value: zin,
                reason: "must be a finite number greater than 1",
            });
        }
        let zout = self.zoom_out_factor;
        if !zout.is_finite() || zout <= 0.0 || zout >= 1.0 {
            return Err(ConfigError::InvalidZoomFactor {
                name: "zoom_out_factor",
                value: zout,
                reason: "must be a finite number between 0 and 1",
            });
        }
        Ok(())
    }

    pub fn axis_labels(&self) -> AxisLabels {
        AxisLabels {
            y_label: self.y_axis_label.clone(),
            y_unit: self.y_axis_unit.clone(),
            secondary_label: self.secondary_y_axis_label.clone(),
            secondary_unit: self.secondary_y_axis_unit.clone(),
        }
    }

    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            axes: self.axis_labels(),
            title: self.title.clone().filter(|t| !t.trim().is_empty()),
            description: self.description.clone().filter(|d| !d.trim().is_empty()),
            show_legend: self.show_legend,
            animate: self.animate,
        }
    }

    /// Stem for export file names: the title, or [`DEFAULT_EXPORT_NAME`].
    pub fn export_name(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => DEFAULT_EXPORT_NAME,
        }
    }
}

/// Series ids must be unique within one chart.
pub fn validate_series(series: &[Series]) -> Result<(), ConfigError> {
    let mut seen = AHashSet::new();
    for s in series {
        if !seen.insert(s.id.as_str()) {
            return Err(ConfigError::DuplicateSeriesId(s.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let cfg =
            ChartConfig::from_json_str(r#"{"title":"Well 12","y_axis_label":"Depth"}"#).unwrap();
        assert_eq!(cfg.title.as_deref(), Some("Well 12"));
        assert_eq!(cfg.height, 400);
        assert!(cfg.enable_zoom && cfg.enable_export && cfg.enable_trendline);
        assert_eq!(cfg.default_chart_kind, ChartKind::Line);
        assert_eq!(cfg.export_name(), "Well 12");
    }

    #[test]
    fn rejects_bad_factors_and_sizes() {
        let bad = ChartConfig {
            zoom_in_factor: 0.9,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::InvalidZoomFactor { name: "zoom_in_factor", .. })
        ));
        let bad = ChartConfig {
            zoom_out_factor: 1.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = ChartConfig {
            height: 0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidSize { .. })));
        assert!(ChartConfig::from_json_str(r#"{"zoom_in_factor": -2}"#).is_err());
    }

    #[test]
    fn blank_title_exports_as_default() {
        let cfg = ChartConfig {
            title: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.export_name(), DEFAULT_EXPORT_NAME);
        assert_eq!(cfg.model_options().title, None);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let s = vec![Series::new("a", "A", vec![]), Series::new("a", "B", vec![])];
        assert!(matches!(
            validate_series(&s),
            Err(ConfigError::DuplicateSeriesId(id)) if id == "a"
        ));
    }

    #[test]
    fn description_and_animation_reach_the_model_options() {
        let cfg = ChartConfig::from_json_str(
            r#"{"description":"Daily means, station GW-7","animate":false}"#,
        )
        .unwrap();
        let opts = cfg.model_options();
        assert_eq!(opts.description.as_deref(), Some("Daily means, station GW-7"));
        assert!(!opts.animate);
        assert!(ChartConfig::default().model_options().animate);
    }
}
