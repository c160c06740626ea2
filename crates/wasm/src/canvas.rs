use std::f64::consts::TAU;

use meshglow_core::{MeshError, RadialBlob, Surface};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// A [`Surface`] over an HTML canvas's 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Fails with `MeshError::SurfaceUnavailable` when the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, MeshError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| MeshError::SurfaceUnavailable(format!("{e:?}")))?
            .ok_or_else(|| MeshError::SurfaceUnavailable("no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| MeshError::SurfaceUnavailable("context is not 2d".into()))?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn paint(&self, blob: &RadialBlob) -> Result<(), JsValue> {
        let (x, y) = (blob.center.x, blob.center.y);
        let gradient = self.ctx.create_radial_gradient(x, y, 0.0, x, y, blob.radius)?;
        let hex = blob.color.to_hex();
        gradient.add_color_stop(0.0, &hex)?;
        gradient.add_color_stop(1.0, &blob.color.to_hex_alpha(0))?;

        #[allow(deprecated)]
        self.ctx.set_fill_style(&gradient);
        self.ctx.set_shadow_color(&hex);
        self.ctx.set_shadow_blur(blob.glow);
        self.ctx.begin_path();
        self.ctx.arc(x, y, blob.radius, 0.0, TAU)?;
        self.ctx.fill();
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), MeshError> {
        if width == 0 || height == 0 {
            return Err(MeshError::InvalidDimensions);
        }
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        Ok(())
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
    }

    fn fill_blob(&mut self, blob: &RadialBlob) {
        // Non-finite geometry makes the context throw; that blob is skipped.
        if let Err(e) = self.paint(blob) {
            debug!(error = ?e, "blob skipped");
        }
    }
}
