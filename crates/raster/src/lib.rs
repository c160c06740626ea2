#![deny(unsafe_code)]
//! CPU rendering for the mesh-gradient backdrop.
//!
//! [`Pixmap`] implements [`meshglow_core::Surface`] on a `tiny_skia` pixmap so
//! the field can be rendered headless: radial-gradient blobs with a
//! canvas-style glow, composited source-over into premultiplied RGBA8. The
//! `png` feature (default on) adds PNG snapshots via the `image` crate.

pub mod blur;
pub mod pixel;
pub mod pixmap;

#[cfg(feature = "png")]
pub mod snapshot;

pub use pixel::{to_rgba8, to_rgba8_over};
pub use pixmap::Pixmap;
