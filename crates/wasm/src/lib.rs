#![deny(unsafe_code)]
//! Browser binding for the mesh-gradient backdrop.
//!
//! [`CanvasSurface`] draws blobs through a `CanvasRenderingContext2d`;
//! [`MeshBackdrop`] is the handle exported to JavaScript. The page drives it
//! from `requestAnimationFrame`, a coarse `setInterval`, and its DOM events,
//! and answers palette requests with a JS color extractor.

mod backdrop;
mod canvas;

pub use backdrop::MeshBackdrop;
pub use canvas::CanvasSurface;
