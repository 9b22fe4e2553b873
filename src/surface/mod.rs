//! Renderable surface abstraction.
//!
//! The controller and export code only talk to [`RenderSurface`]; the graphics
//! library behind it is interchangeable. [`PlottersSurface`] is the bundled
//! implementation (in-memory bitmap via `plotters`, PNG via `image`).
//!
//! Text needs a font. Fonts are registered once by the host through
//! [`SurfaceCapabilities::with_font`] and the resulting capability value is
//! handed to each surface; without it, surfaces draw data and reference lines
//! but no text.

mod draw;
mod legend;
mod plotters_surface;
mod text;

pub use draw::draw_model;
pub use plotters_surface::PlottersSurface;

use crate::models::{Timestamp, XRange};
use crate::render::RenderModel;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("nothing has been painted yet")]
    NothingPainted,
    #[error("image encoding failed: {0}")]
    Encode(String),
    #[error("font registration failed: {0}")]
    Font(String),
}

pub(crate) fn draw_err<E: std::fmt::Debug>(e: E) -> SurfaceError {
    SurfaceError::Draw(format!("{e:?}"))
}

/// Capabilities a drawing surface needs from the graphics library.
pub trait RenderSurface {
    /// Accept a freshly built model (repaint request).
    fn paint(&mut self, model: &RenderModel) -> Result<(), SurfaceError>;
    /// Scale the visible X span around its center; `factor > 1` zooms in.
    fn zoom_by(&mut self, factor: f64);
    /// Shift the visible X window by `delta` axis units.
    fn pan_by(&mut self, delta: Timestamp);
    fn reset_zoom(&mut self);
    /// Currently visible X window, `None` before anything with data was painted.
    fn visible_range(&self) -> Option<XRange>;
    /// Bitmap snapshot (PNG bytes) of the current view.
    fn capture_image(&mut self) -> Result<Vec<u8>, SurfaceError>;
}

/// Result of the one-time graphics initialization performed by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    text: bool,
}

impl SurfaceCapabilities {
    /// No font registered: text is skipped.
    pub fn minimal() -> Self {
        Self { text: false }
    }

    /// Register `font` as the sans-serif face used for all chart text.
    pub fn with_font(font: &'static [u8]) -> Result<Self, SurfaceError> {
        plotters::style::register_font("sans-serif", plotters::style::FontStyle::Normal, font)
            .map_err(|_| SurfaceError::Font("invalid font data".into()))?;
        Ok(Self { text: true })
    }

    pub fn renders_text(&self) -> bool {
        self.text
    }
}

/// Zoom/pan bookkeeping shared by surface implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewWindow {
    full: Option<XRange>,
    view: Option<XRange>,
}

impl ViewWindow {
    /// Update the full data extent. An active zoom window is kept, also while
    /// nothing is visible, so it survives hiding and re-showing every series.
    pub fn set_full_extent(&mut self, full: Option<XRange>) {
        self.full = full;
    }

    pub fn visible(&self) -> Option<XRange> {
        self.view.or(self.full)
    }

    pub fn zoom_by(&mut self, factor: f64) {
        if let Some(cur) = self.visible() {
            self.view = Some(cur.zoomed(factor));
        }
    }

    pub fn pan_by(&mut self, delta: Timestamp) {
        if let Some(cur) = self.visible() {
            self.view = Some(cur.shifted(delta));
        }
    }

    pub fn reset(&mut self) {
        self.view = None;
    }
}
