//! Conversion from a [`Pixmap`] to byte buffers.
//!
//! Always available so the PNG path and any other byte consumer share the
//! same quantization.

use meshglow_core::Rgb;
use tiny_skia::{Color, PixmapPaint, Transform};

use crate::pixmap::Pixmap;

/// Straight-alpha RGBA8 bytes, `width * height * 4` long.
///
/// Fully transparent pixels come out as `[0, 0, 0, 0]`.
pub fn to_rgba8(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

/// Opaque RGBA8 bytes with the pixmap composited over `background`.
///
/// This is what the page shows: the canvas sits on a solid backdrop color.
pub fn to_rgba8_over(pixmap: &Pixmap, background: Rgb) -> Vec<u8> {
    let source = pixmap.as_skia();
    let Some(mut flat) = tiny_skia::Pixmap::new(source.width(), source.height()) else {
        return Vec::new();
    };
    flat.fill(Color::from_rgba8(background.r, background.g, background.b, 255));
    flat.draw_pixmap(
        0,
        0,
        source,
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    flat.take()
}
