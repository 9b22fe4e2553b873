//! aquifer_chart
//!
//! Time-series charting and analytics core for groundwater-monitoring
//! telemetry. Pairs with the `aquifer-chart` CLI.
//!
//! ### Features
//! - Heterogeneous series (line, bar, scatter, filled area) on up to two value axes
//! - Least-squares trend overlays and fixed threshold lines
//! - Zoom / pan state with range-change notifications
//! - PNG snapshot and CSV table export of what is currently visible
//!
//! ### Example
//! ```no_run
//! use aquifer_chart::{
//!     ChartCallbacks, ChartConfig, ChartController, DataPoint, PlottersSurface, Series,
//!     StyleTokens, SurfaceCapabilities, Threshold,
//! };
//!
//! let config = ChartConfig {
//!     title: Some("Well 12".into()),
//!     y_axis_label: "Water level".into(),
//!     y_axis_unit: "m".into(),
//!     ..Default::default()
//! };
//! let level = Series::new(
//!     "waterLevel",
//!     "Water Level",
//!     vec![DataPoint::new(1_709_769_600_000, 12.5), DataPoint::new(1_709_856_000_000, 12.1)],
//! );
//! let surface = PlottersSurface::new(config.width, config.height, SurfaceCapabilities::minimal());
//! let mut chart = ChartController::new(
//!     config,
//!     vec![level],
//!     vec![Threshold::new(10.0, "Critical", "error")],
//!     StyleTokens::default(),
//!     Box::new(surface),
//!     ChartCallbacks::default().on_range_change(|r| println!("{r:?}")),
//! )?;
//! chart.toggle_trendline();
//! chart.zoom_in();
//! if let Some(csv) = chart.export_table() {
//!     std::fs::write(&csv.filename, &csv.bytes)?;
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod controller;
pub mod export;
pub mod models;
pub mod render;
pub mod scale;
pub mod style;
pub mod surface;
pub mod trend;

pub use config::{ChartConfig, ConfigError};
pub use controller::{ChartCallbacks, ChartController, ChartView, DisplayState};
pub use export::{ExportKind, ExportPayload};
pub use models::{
    Axis, ChartKind, DataPoint, Metric, RangeChange, Reading, Series, Threshold, VisualKind,
    XRange,
};
pub use render::{RenderModel, build_render_model};
pub use style::StyleTokens;
pub use surface::{PlottersSurface, RenderSurface, SurfaceCapabilities, SurfaceError};
