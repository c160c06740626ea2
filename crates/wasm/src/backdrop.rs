//! `wasm-bindgen` exports wrapping [`Orchestrator`] with JS-friendly types.

use meshglow_core::{
    FrameStatus, MeshConfig, MeshError, Orchestrator, Palette, PaletteTicket, Surface,
};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::canvas::CanvasSurface;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Host-driven backdrop: JavaScript owns the event loop and stamps every call
/// with `performance.now()`.
#[wasm_bindgen]
pub struct MeshBackdrop {
    inner: Orchestrator<CanvasSurface>,
}

#[wasm_bindgen]
impl MeshBackdrop {
    /// Binds to `canvas`. `config_json` is an optional partial `MeshConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config_json: Option<String>) -> Result<MeshBackdrop, JsValue> {
        let config = match config_json {
            Some(json) => MeshConfig::from_json(&json).map_err(js_error)?,
            None => MeshConfig::default(),
        };
        let surface = CanvasSurface::new(canvas).map_err(js_error)?;
        let inner = Orchestrator::new(config, surface).map_err(js_error)?;
        Ok(Self { inner })
    }

    pub fn start(&mut self, now: f64) {
        self.inner.start(now);
    }

    /// `requestAnimationFrame` callback. Returns false once the loop has
    /// stopped and no further frames need scheduling.
    pub fn frame(&mut self, now: f64) -> bool {
        self.inner.on_frame(now) != FrameStatus::Stopped
    }

    pub fn tick(&mut self, now: f64) {
        self.inner.tick(now);
    }

    /// Answers palette request `ticket` with hex colors. An empty or invalid
    /// list counts as a failed extraction and the fallback palette is used.
    #[wasm_bindgen(js_name = resolvePalette)]
    pub fn resolve_palette(&mut self, ticket: u32, colors: Vec<String>, now: f64) -> bool {
        let result = if colors.is_empty() {
            Err(MeshError::PaletteExtraction("no colors extracted".into()))
        } else {
            Palette::from_hex(&colors)
        };
        self.inner
            .resolve_palette(PaletteTicket::from_generation(u64::from(ticket)), result, now)
    }

    /// Queued notices as a JSON array, oldest first. Each has a `kind`;
    /// `palette_requested` carries the `ticket` to answer.
    #[wasm_bindgen(js_name = drainNotices)]
    pub fn drain_notices(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.drain_notices()).map_err(js_error)
    }

    /// Number of palette requests still awaiting an answer.
    #[wasm_bindgen(js_name = pendingRequests)]
    pub fn pending_requests(&self) -> usize {
        self.inner.pending_requests()
    }

    #[wasm_bindgen(js_name = setVisible)]
    pub fn set_visible(&mut self, visible: bool, now: f64) {
        self.inner.set_visible(visible, now);
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.inner.resize(width, height).map_err(js_error)
    }

    #[wasm_bindgen(js_name = keyPressed)]
    pub fn key_pressed(&mut self, key: &str, now: f64) -> bool {
        self.inner.key_pressed(key, now)
    }

    /// Class names for the current zoom step (empty when idle).
    #[wasm_bindgen(js_name = zoomClasses)]
    pub fn zoom_classes(&self) -> Vec<String> {
        self.inner.zoom_state().classes()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    pub fn width(&self) -> u32 {
        self.inner.surface().width()
    }

    pub fn height(&self) -> u32 {
        self.inner.surface().height()
    }

    pub fn teardown(&mut self) {
        self.inner.teardown();
    }
}
