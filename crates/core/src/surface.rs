//! The drawing seam between the gradient field and a concrete canvas.

use glam::DVec2;

use crate::color::Rgb;
use crate::error::MeshError;

/// One blob draw call.
///
/// A radial gradient from `color` at full opacity in the center to `color`
/// at zero opacity at `radius`, composited source-over with a glow of
/// `glow` pixels (canvas `shadowBlur` semantics) tinted `color`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialBlob {
    pub center: DVec2,
    pub radius: f64,
    pub color: Rgb,
    pub glow: f64,
}

/// A 2D drawing surface of known pixel dimensions.
///
/// Implementations: the CPU `Pixmap` in `meshglow-raster` and the browser
/// `CanvasSurface` in `meshglow-wasm`.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Changes the pixel dimensions. Contents after a resize are unspecified
    /// until the next full render.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), MeshError>;

    /// Clears every pixel to fully transparent.
    fn clear(&mut self);

    /// Paints one blob over the current contents.
    fn fill_blob(&mut self, blob: &RadialBlob);
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), MeshError> {
        (**self).resize(width, height)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn fill_blob(&mut self, blob: &RadialBlob) {
        (**self).fill_blob(blob)
    }
}

/// A surface that records draw calls instead of painting.
///
/// Used by tests and by headless runs that only care about blob state.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    clears: usize,
    blobs: Vec<RadialBlob>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, MeshError> {
        if width == 0 || height == 0 {
            return Err(MeshError::InvalidDimensions);
        }
        Ok(Self {
            width,
            height,
            ..Self::default()
        })
    }

    /// Number of `clear` calls so far.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Blobs drawn since the last `clear`, in paint order.
    pub fn blobs(&self) -> &[RadialBlob] {
        &self.blobs
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), MeshError> {
        if width == 0 || height == 0 {
            return Err(MeshError::InvalidDimensions);
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.blobs.clear();
    }

    fn fill_blob(&mut self, blob: &RadialBlob) {
        self.blobs.push(*blob);
    }
}
