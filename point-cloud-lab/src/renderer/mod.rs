/// Rasterises a projected point cloud into an RGB frame
mod canvas;
mod glyphs;

use crate::error::RenderError;
use crate::point::{PointRecord, ScreenPoint};
use crate::projector::{self, DrawArea, DrawingParameters};
use canvas::Canvas;
use constants::render_settings::{
    AXIS_COLOUR, AXIS_LINE_WIDTH, BACKGROUND_COLOUR, MARKER_COLOUR, MARKER_RADIUS,
    POLYLINE_COLOUR, POLYLINE_WIDTH, SURFACE_PADDING, X_LABEL_OFFSET, Y_LABEL_OFFSET,
    Z_LABEL_OFFSET,
};
use image::{ImageFormat, RgbImage};
use log::{debug, warn};
use std::path::Path;

const LABEL_SCALE: i32 = 2;

/// Draws axes, the polyline through consecutive samples and a marker per sample.
#[derive(Debug, Clone)]
pub struct Renderer {
    padding: u32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            padding: SURFACE_PADDING,
        }
    }
}

impl Renderer {
    pub fn with_padding(padding: u32) -> Self {
        Self { padding }
    }

    /// Projection parameters for a `width × height` surface.
    pub fn parameters(&self, points: &[PointRecord], width: u32, height: u32) -> DrawingParameters {
        projector::compute_parameters_in(points, DrawArea::inset(width, height, self.padding))
    }

    /// Render a fresh frame. Pure function of the points and the surface size.
    pub fn render_points(
        &self,
        points: &[PointRecord],
        width: u32,
        height: u32,
    ) -> Result<RgbImage, RenderError> {
        if points.is_empty() {
            return Err(RenderError::NoPoints);
        }
        let margins = self.padding.saturating_mul(2);
        if width <= margins || height <= margins {
            return Err(RenderError::EmptySurface { width, height });
        }

        let params = self.parameters(points, width, height);
        debug!("Drawing parameters: {:?}", params);

        let projected = projector::transform(points, &params);
        if let Some(index) = projected.iter().position(|p| !p.is_finite()) {
            return Err(RenderError::NonFinite { index });
        }
        let axes = params.axes();
        if !axes.is_finite() {
            return Err(RenderError::NonFinite { index: points.len() });
        }

        let mut canvas = Canvas::new(width, height, BACKGROUND_COLOUR);

        for (end, label, offset) in [
            (axes.x_end, "X", X_LABEL_OFFSET),
            (axes.y_end, "Y", Y_LABEL_OFFSET),
            (axes.z_end, "Z", Z_LABEL_OFFSET),
        ] {
            canvas.line(axes.origin, end, AXIS_LINE_WIDTH, AXIS_COLOUR);
            draw_label(&mut canvas, end, label, offset);
        }

        for pair in projected.windows(2) {
            canvas.line(pair[0], pair[1], POLYLINE_WIDTH, POLYLINE_COLOUR);
        }
        for point in &projected {
            canvas.ring(*point, MARKER_RADIUS, 2, MARKER_COLOUR);
        }

        Ok(canvas.into_image())
    }
}

/// Labels whose anchor lies beyond pixel range are not drawn.
fn draw_label(canvas: &mut Canvas, anchor: ScreenPoint, label: &str, offset: (i32, i32)) {
    let x = anchor.x.round() as i64 + i64::from(offset.0);
    let y = anchor.y.round() as i64 + i64::from(offset.1);
    match (i32::try_from(x), i32::try_from(y)) {
        (Ok(x), Ok(y)) => canvas.text(x, y, label, LABEL_SCALE, AXIS_COLOUR),
        _ => debug!("{} label anchor ({}, {}) is off the frame", label, anchor.x, anchor.y),
    }
}

/// Holds the last successfully rendered frame.
#[derive(Debug, Default)]
pub struct FrameSlot {
    current: Option<RgbImage>,
}

impl FrameSlot {
    /// Replace the frame on success; on failure keep the previous frame and
    /// hand the error back.
    pub fn present(
        &mut self,
        result: Result<RgbImage, RenderError>,
    ) -> Result<&RgbImage, RenderError> {
        match result {
            Ok(frame) => Ok(self.current.insert(frame)),
            Err(err) => {
                warn!("Render failed, keeping previous frame: {}", err);
                Err(err)
            }
        }
    }

    pub fn current(&self) -> Option<&RgbImage> {
        self.current.as_ref()
    }
}

pub fn save_png(frame: &RgbImage, path: impl AsRef<Path>) -> Result<(), RenderError> {
    frame.save_with_format(path.as_ref(), ImageFormat::Png)?;
    Ok(())
}
