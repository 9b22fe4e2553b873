//! Interaction controller: owns the per-chart display state (visibility,
//! trendline, chart kind, zoom) and keeps the render model and surface in sync.
//!
//! Every operation is synchronous: one state transition, then a model rebuild
//! and a repaint request. Range changes are reported through the host's
//! `on_range_change` callback with concrete dates.

use crate::config::{ChartConfig, ConfigError, validate_series};
use crate::export::{self, ExportKind, ExportPayload};
use crate::models::{ChartKind, RangeChange, Series, Threshold, Timestamp, XRange};
use crate::render::{RenderModel, build_render_model};
use crate::style::StyleTokens;
use crate::surface::RenderSurface;
use ahash::AHashSet;
use chrono::Utc;

/// Mutable view state of one chart instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub visible_series_ids: AHashSet<String>,
    pub chart_kind: ChartKind,
    pub trendline_enabled: bool,
    /// `None` = full extent.
    pub zoomed_range: Option<XRange>,
}

impl DisplayState {
    /// Mount state: every series not marked `visual_hidden` is visible.
    pub fn initial(series: &[Series], chart_kind: ChartKind) -> Self {
        Self {
            visible_series_ids: series
                .iter()
                .filter(|s| !s.visual_hidden)
                .map(|s| s.id.clone())
                .collect(),
            chart_kind,
            trendline_enabled: false,
            zoomed_range: None,
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible_series_ids.contains(id)
    }
}

/// Host callbacks.
#[derive(Default)]
pub struct ChartCallbacks {
    pub on_range_change: Option<Box<dyn FnMut(RangeChange)>>,
    pub on_export: Option<Box<dyn FnMut(ExportKind, &ExportPayload)>>,
}

impl ChartCallbacks {
    pub fn on_range_change(mut self, f: impl FnMut(RangeChange) + 'static) -> Self {
        self.on_range_change = Some(Box::new(f));
        self
    }

    pub fn on_export(mut self, f: impl FnMut(ExportKind, &ExportPayload) + 'static) -> Self {
        self.on_export = Some(Box::new(f));
        self
    }
}

/// What the host should display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartView<'a> {
    /// Progress placeholder.
    Loading,
    /// Upstream error banner (no retry affordance).
    Error(&'a str),
    /// "No data" placeholder.
    Empty,
    Chart(&'a RenderModel),
}

pub struct ChartController {
    config: ChartConfig,
    tokens: StyleTokens,
    series: Vec<Series>,
    thresholds: Vec<Threshold>,
    state: DisplayState,
    model: RenderModel,
    surface: Box<dyn RenderSurface>,
    callbacks: ChartCallbacks,
    panning: bool,
}

impl ChartController {
    pub fn new(
        config: ChartConfig,
        series: Vec<Series>,
        thresholds: Vec<Threshold>,
        tokens: StyleTokens,
        surface: Box<dyn RenderSurface>,
        callbacks: ChartCallbacks,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_series(&series)?;
        let state = DisplayState::initial(&series, config.default_chart_kind);
        let model = build_render_model(
            &series,
            &thresholds,
            &state,
            &tokens,
            &config.model_options(),
        );
        let mut ctl = Self {
            config,
            tokens,
            series,
            thresholds,
            state,
            model,
            surface,
            callbacks,
            panning: false,
        };
        ctl.repaint();
        Ok(ctl)
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn render_model(&self) -> &RenderModel {
        &self.model
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn view(&self) -> ChartView<'_> {
        if self.config.loading {
            ChartView::Loading
        } else if let Some(err) = self.config.error.as_deref() {
            ChartView::Error(err)
        } else if self.series.iter().all(|s| s.data.is_empty()) {
            ChartView::Empty
        } else {
            ChartView::Chart(&self.model)
        }
    }

    /// Accept a fresh series input. Known ids keep their visibility, new ids
    /// start visible unless hidden; zoom is kept.
    pub fn set_data(
        &mut self,
        series: Vec<Series>,
        thresholds: Vec<Threshold>,
    ) -> Result<(), ConfigError> {
        validate_series(&series)?;
        let known: AHashSet<&str> = self.series.iter().map(|s| s.id.as_str()).collect();
        let visible: AHashSet<String> = series
            .iter()
            .filter(|s| {
                if known.contains(s.id.as_str()) {
                    self.state.is_visible(&s.id)
                } else {
                    !s.visual_hidden
                }
            })
            .map(|s| s.id.clone())
            .collect();
        self.state.visible_series_ids = visible;
        self.series = series;
        self.thresholds = thresholds;
        self.rebuild();
        Ok(())
    }

    pub fn toggle_series(&mut self, id: &str) {
        if !self.series.iter().any(|s| s.id == id) {
            log::debug!("toggle of unknown series {id:?} ignored");
            return;
        }
        if !self.state.visible_series_ids.remove(id) {
            self.state.visible_series_ids.insert(id.to_string());
        }
        self.rebuild();
    }

    pub fn toggle_trendline(&mut self) {
        if !self.config.enable_trendline {
            log::debug!("trendline disabled by configuration");
            return;
        }
        self.state.trendline_enabled = !self.state.trendline_enabled;
        self.rebuild();
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.state.chart_kind = kind;
        self.rebuild();
    }

    pub fn zoom_in(&mut self) {
        self.zoom(self.config.zoom_in_factor);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(self.config.zoom_out_factor);
    }

    fn zoom(&mut self, factor: f64) {
        if !self.config.enable_zoom {
            return;
        }
        self.surface.zoom_by(factor);
        let Some(range) = self.surface.visible_range() else {
            log::debug!("zoom ignored: nothing to zoom");
            return;
        };
        self.state.zoomed_range = Some(range);
        self.rebuild();
        self.notify_range(RangeChange::from(range));
    }

    /// Drag step: moves the window, no notification until [`Self::end_pan`].
    pub fn pan_by(&mut self, delta: Timestamp) {
        if !self.config.enable_zoom {
            return;
        }
        self.surface.pan_by(delta);
        let Some(range) = self.surface.visible_range() else {
            return;
        };
        self.state.zoomed_range = Some(range);
        self.panning = true;
        self.rebuild();
    }

    /// Gesture completion: reports the final window.
    pub fn end_pan(&mut self) {
        if !std::mem::take(&mut self.panning) {
            return;
        }
        if let Some(range) = self.state.zoomed_range {
            self.notify_range(RangeChange::from(range));
        }
    }

    pub fn can_reset_zoom(&self) -> bool {
        self.state.zoomed_range.is_some()
    }

    /// Back to full extent; no-op (and no notification) when not zoomed.
    pub fn reset_zoom(&mut self) {
        if self.state.zoomed_range.take().is_none() {
            return;
        }
        self.panning = false;
        self.surface.reset_zoom();
        self.rebuild();
        self.notify_range(RangeChange::full_extent());
    }

    /// PNG snapshot of the current view. `None` when export is disabled, there
    /// is nothing visible, or the surface cannot capture.
    pub fn export_snapshot(&mut self) -> Option<ExportPayload> {
        if !self.config.enable_export {
            return None;
        }
        let today = Utc::now().date_naive();
        let payload = export::export_snapshot(
            self.surface.as_mut(),
            &self.model,
            self.config.export_name(),
            today,
        )?;
        self.notify_export(&payload);
        Some(payload)
    }

    /// CSV table of the visible series.
    pub fn export_table(&mut self) -> Option<ExportPayload> {
        if !self.config.enable_export {
            return None;
        }
        let today = Utc::now().date_naive();
        let payload = export::export_table(&self.model, self.config.export_name(), today)?;
        self.notify_export(&payload);
        Some(payload)
    }

    fn rebuild(&mut self) {
        self.model = build_render_model(
            &self.series,
            &self.thresholds,
            &self.state,
            &self.tokens,
            &self.config.model_options(),
        );
        self.repaint();
    }

    fn repaint(&mut self) {
        if let ChartView::Loading | ChartView::Error(_) = self.view() {
            return;
        }
        if let Err(e) = self.surface.paint(&self.model) {
            log::warn!("repaint failed: {e}");
        }
    }

    fn notify_range(&mut self, change: RangeChange) {
        log::debug!("visible range changed: {change:?}");
        if let Some(cb) = self.callbacks.on_range_change.as_mut() {
            cb(change);
        }
    }

    fn notify_export(&mut self, payload: &ExportPayload) {
        if let Some(cb) = self.callbacks.on_export.as_mut() {
            cb(payload.kind, payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataPoint;
    use crate::surface::{SurfaceError, ViewWindow};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Surface that only tracks the view window.
    #[derive(Default)]
    struct WindowOnly {
        window: ViewWindow,
        paints: Rc<RefCell<usize>>,
    }

    impl RenderSurface for WindowOnly {
        fn paint(&mut self, model: &RenderModel) -> Result<(), SurfaceError> {
            self.window.set_full_extent(model.data_extent());
            *self.paints.borrow_mut() += 1;
            Ok(())
        }
        fn zoom_by(&mut self, factor: f64) {
            self.window.zoom_by(factor);
        }
        fn pan_by(&mut self, delta: Timestamp) {
            self.window.pan_by(delta);
        }
        fn reset_zoom(&mut self) {
            self.window.reset();
        }
        fn visible_range(&self) -> Option<XRange> {
            self.window.visible()
        }
        fn capture_image(&mut self) -> Result<Vec<u8>, SurfaceError> {
            Err(SurfaceError::NothingPainted)
        }
    }

    fn series() -> Vec<Series> {
        vec![
            Series::new(
                "waterLevel",
                "Water Level",
                (0..10).map(|i| DataPoint::new(i * 1000, 5.0 + i as f64)).collect(),
            ),
            Series::new("battery", "Battery", vec![DataPoint::new(0, 90.0)]).hidden(true),
        ]
    }

    fn controller(config: ChartConfig) -> (ChartController, Rc<RefCell<Vec<RangeChange>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let callbacks =
            ChartCallbacks::default().on_range_change(move |r| sink.borrow_mut().push(r));
        let ctl = ChartController::new(
            config,
            series(),
            vec![],
            StyleTokens::default(),
            Box::new(WindowOnly::default()),
            callbacks,
        )
        .unwrap();
        (ctl, seen)
    }

    #[test]
    fn initial_state_hides_flagged_series() {
        let (ctl, _) = controller(ChartConfig::default());
        assert!(ctl.state().is_visible("waterLevel"));
        assert!(!ctl.state().is_visible("battery"));
        assert!(!ctl.state().trendline_enabled);
        assert_eq!(ctl.state().zoomed_range, None);
        assert_eq!(ctl.render_model().datasets.len(), 1);
    }

    #[test]
    fn unknown_toggle_is_noop() {
        let (mut ctl, _) = controller(ChartConfig::default());
        let before = ctl.state().clone();
        ctl.toggle_series("nope");
        assert_eq!(ctl.state(), &before);
    }

    #[test]
    fn zoom_in_narrows_and_notifies() {
        let (mut ctl, seen) = controller(ChartConfig::default());
        ctl.zoom_in();
        let r = ctl.state().zoomed_range.unwrap();
        assert!(r.span() < 9000);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0], RangeChange::from(r));
        assert_eq!(ctl.render_model().scales.x.min, Some(r.min));
    }

    #[test]
    fn pan_notifies_only_on_completion() {
        let (mut ctl, seen) = controller(ChartConfig::default());
        ctl.pan_by(500);
        ctl.pan_by(500);
        assert!(seen.borrow().is_empty());
        assert_eq!(ctl.state().zoomed_range, Some(XRange::new(1000, 10000)));
        ctl.end_pan();
        assert_eq!(seen.borrow().len(), 1);
        ctl.end_pan();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn reset_is_idempotent() {
        let (mut ctl, seen) = controller(ChartConfig::default());
        ctl.reset_zoom();
        assert!(seen.borrow().is_empty());

        ctl.zoom_out();
        assert!(ctl.can_reset_zoom());
        ctl.reset_zoom();
        assert_eq!(seen.borrow().last(), Some(&RangeChange::full_extent()));
        assert_eq!(ctl.state().zoomed_range, None);
        let n = seen.borrow().len();
        ctl.reset_zoom();
        assert_eq!(seen.borrow().len(), n);
    }

    #[test]
    fn disabled_features_are_noops() {
        let config = ChartConfig {
            enable_zoom: false,
            enable_trendline: false,
            enable_export: false,
            ..Default::default()
        };
        let (mut ctl, seen) = controller(config);
        ctl.zoom_in();
        ctl.pan_by(10);
        ctl.toggle_trendline();
        assert!(seen.borrow().is_empty());
        assert_eq!(ctl.state().zoomed_range, None);
        assert!(!ctl.state().trendline_enabled);
        assert!(ctl.export_table().is_none());
    }

    #[test]
    fn chart_kind_keeps_zoom_and_visibility() {
        let (mut ctl, _) = controller(ChartConfig::default());
        ctl.zoom_in();
        let zoom = ctl.state().zoomed_range;
        ctl.set_chart_kind(ChartKind::Bar);
        assert_eq!(ctl.state().zoomed_range, zoom);
        assert!(ctl.state().is_visible("waterLevel"));
        assert_eq!(ctl.state().chart_kind, ChartKind::Bar);
    }

    #[test]
    fn set_data_keeps_known_visibility() {
        let (mut ctl, _) = controller(ChartConfig::default());
        ctl.toggle_series("waterLevel");
        let mut next = series();
        next.push(Series::new("rainfall", "Rainfall", vec![DataPoint::new(0, 1.0)]));
        ctl.set_data(next, vec![]).unwrap();
        assert!(!ctl.state().is_visible("waterLevel"));
        assert!(!ctl.state().is_visible("battery"));
        assert!(ctl.state().is_visible("rainfall"));

        let dup = vec![Series::new("a", "A", vec![]), Series::new("a", "A", vec![])];
        assert!(ctl.set_data(dup, vec![]).is_err());
    }

    #[test]
    fn view_precedence() {
        let (ctl, _) = controller(ChartConfig {
            loading: true,
            error: Some("boom".into()),
            ..Default::default()
        });
        assert_eq!(ctl.view(), ChartView::Loading);

        let (ctl, _) = controller(ChartConfig {
            error: Some("boom".into()),
            ..Default::default()
        });
        assert_eq!(ctl.view(), ChartView::Error("boom"));

        let empty = ChartController::new(
            ChartConfig::default(),
            vec![Series::new("a", "A", vec![])],
            vec![],
            StyleTokens::default(),
            Box::new(WindowOnly::default()),
            ChartCallbacks::default(),
        )
        .unwrap();
        assert_eq!(empty.view(), ChartView::Empty);
    }

    #[test]
    fn loading_skips_repaint() {
        let paints = Rc::new(RefCell::new(0));
        let surface = WindowOnly {
            window: ViewWindow::default(),
            paints: paints.clone(),
        };
        let mut ctl = ChartController::new(
            ChartConfig {
                loading: true,
                ..Default::default()
            },
            series(),
            vec![],
            StyleTokens::default(),
            Box::new(surface),
            ChartCallbacks::default(),
        )
        .unwrap();
        ctl.toggle_series("battery");
        assert_eq!(*paints.borrow(), 0);
    }
}
