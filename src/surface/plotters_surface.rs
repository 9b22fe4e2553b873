use std::io::Cursor;

use plotters::prelude::IntoDrawingArea;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use super::draw::draw_model;
use super::{RenderSurface, SurfaceCapabilities, SurfaceError, ViewWindow};
use crate::models::{Timestamp, XRange};
use crate::render::RenderModel;

/// In-memory bitmap surface backed by Plotters.
///
/// `paint` only records the model; pixels are produced on capture, so
/// rebuilding the model after every interaction stays cheap.
#[derive(Debug, Clone)]
pub struct PlottersSurface {
    width: u32,
    height: u32,
    caps: SurfaceCapabilities,
    window: ViewWindow,
    model: Option<RenderModel>,
}

impl PlottersSurface {
    pub fn new(width: u32, height: u32, caps: SurfaceCapabilities) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            caps,
            window: ViewWindow::default(),
            model: None,
        }
    }

    /// Raw RGB pixels of the current view (`width * height * 3` bytes).
    pub fn render_rgb(&self) -> Result<Vec<u8>, SurfaceError> {
        let model = self.model.as_ref().ok_or(SurfaceError::NothingPainted)?;
        let mut buf = vec![0u8; self.width as usize * self.height as usize * 3];
        {
            let root =
                BitMapBackend::with_buffer(&mut buf, (self.width, self.height)).into_drawing_area();
            draw_model(root, model, self.window.visible(), self.caps)?;
        }
        Ok(buf)
    }

    /// PNG-encoded snapshot of the current view.
    pub fn render_png(&self) -> Result<Vec<u8>, SurfaceError> {
        let buf = self.render_rgb()?;
        let img = image::RgbImage::from_raw(self.width, self.height, buf)
            .ok_or_else(|| SurfaceError::Encode("pixel buffer size mismatch".into()))?;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| SurfaceError::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }

    /// SVG document of the current view.
    pub fn render_svg(&self) -> Result<String, SurfaceError> {
        let model = self.model.as_ref().ok_or(SurfaceError::NothingPainted)?;
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            draw_model(root, model, self.window.visible(), self.caps)?;
        }
        Ok(svg)
    }
}

impl RenderSurface for PlottersSurface {
    fn paint(&mut self, model: &RenderModel) -> Result<(), SurfaceError> {
        self.window.set_full_extent(model.data_extent());
        self.model = Some(model.clone());
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
        self.render_png()
    }
}
