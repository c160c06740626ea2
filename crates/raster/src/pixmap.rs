//! Software drawing surface for headless rendering.

use meshglow_core::{MeshError, RadialBlob, Rgb, Surface};
use tiny_skia::{
    Color, FillRule, GradientStop, IntSize, Paint, Path, PathBuilder, PixmapPaint, PixmapRef,
    Point, PremultipliedColorU8, RadialGradient, SpreadMode, Transform,
};
use tracing::trace;

use crate::blur::gaussian_blur;

/// Glows narrower than this sigma (in pixels) are skipped.
const MIN_GLOW_SIGMA: f32 = 0.5;

/// A premultiplied RGBA8 raster backed by `tiny_skia`.
///
/// Starts fully transparent. Blobs are composited source-over.
#[derive(Debug, Clone)]
pub struct Pixmap {
    inner: tiny_skia::Pixmap,
}

impl Pixmap {
    /// Creates a transparent pixmap.
    ///
    /// Returns `MeshError::InvalidDimensions` if either dimension is zero or
    /// the buffer size overflows.
    pub fn new(width: u32, height: u32) -> Result<Self, MeshError> {
        let inner = tiny_skia::Pixmap::new(width, height).ok_or(MeshError::InvalidDimensions)?;
        Ok(Self { inner })
    }

    /// Premultiplied RGBA bytes in row-major order.
    pub fn data(&self) -> &[u8] {
        self.inner.data()
    }

    /// Premultiplied pixels in row-major order.
    pub fn pixels(&self) -> &[PremultipliedColorU8] {
        self.inner.pixels()
    }

    /// Premultiplied RGBA at `(x, y)`, or `None` outside the pixmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.inner
            .pixel(x, y)
            .map(|p| [p.red(), p.green(), p.blue(), p.alpha()])
    }

    /// Borrowed view for compositing onto other `tiny_skia` pixmaps.
    pub fn as_skia(&self) -> PixmapRef<'_> {
        self.inner.as_ref()
    }

    /// Paints the blob's coverage blurred with `sigma` underneath where the
    /// gradient will go.
    ///
    /// Coverage is rasterized over the full reach of the blob, including the
    /// parts off the surface, so blobs at the edges glow as strongly as
    /// centered ones.
    fn paint_glow(&mut self, blob: &RadialBlob, circle: &Path, paint: &Paint, sigma: f32) {
        let margin = (3.0 * sigma).ceil() as i64 + 2;
        let Some((x0, y0, x1, y1)) = reach_box(
            blob,
            margin,
            i64::from(self.inner.width()),
            i64::from(self.inner.height()),
        ) else {
            return;
        };
        let (bw, bh) = ((x1 - x0) as u32, (y1 - y0) as u32);
        let Some(mut coverage) = tiny_skia::Pixmap::new(bw, bh) else {
            return;
        };
        coverage.fill_path(
            circle,
            paint,
            FillRule::Winding,
            Transform::from_translate(-x0 as f32, -y0 as f32),
            None,
        );

        let mask: Vec<f32> = coverage
            .pixels()
            .iter()
            .map(|p| f32::from(p.alpha()) / 255.0)
            .collect();
        let glow = gaussian_blur(&mask, bw as usize, bh as usize, sigma);
        let Some(layer) = IntSize::from_wh(bw, bh)
            .and_then(|size| tiny_skia::Pixmap::from_vec(tinted(&glow, blob.color), size))
        else {
            return;
        };
        self.inner.draw_pixmap(
            x0 as i32,
            y0 as i32,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    ((u16::from(channel) * u16::from(alpha) + 127) / 255) as u8
}

/// Premultiplied RGBA8 bytes of `color` at per-pixel `alpha`.
fn tinted(alpha: &[f32], color: Rgb) -> Vec<u8> {
    alpha
        .iter()
        .flat_map(|&a| {
            let a = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
            [
                premultiply(color.r, a),
                premultiply(color.g, a),
                premultiply(color.b, a),
                a,
            ]
        })
        .collect()
}

/// Pixel box around the blob's glow reach, limited to `margin` pixels past
/// the surface on every side. `None` when it misses the surface.
fn reach_box(
    blob: &RadialBlob,
    margin: i64,
    width: i64,
    height: i64,
) -> Option<(i64, i64, i64, i64)> {
    let reach = blob.radius + margin as f64;
    let x0 = ((blob.center.x - reach).floor() as i64).max(-margin);
    let y0 = ((blob.center.y - reach).floor() as i64).max(-margin);
    let x1 = ((blob.center.x + reach).ceil() as i64).min(width + margin);
    let y1 = ((blob.center.y + reach).ceil() as i64).min(height + margin);
    if x1 <= x0.max(0) || y1 <= y0.max(0) || x0 >= width || y0 >= height {
        return None;
    }
    Some((x0, y0, x1, y1))
}

/// Shader fading `color` from opaque at the center to transparent at `radius`.
fn gradient_paint(blob: &RadialBlob) -> Option<Paint<'static>> {
    let Rgb { r, g, b } = blob.color;
    let center = Point::from_xy(blob.center.x as f32, blob.center.y as f32);
    let shader = RadialGradient::new(
        center,
        center,
        blob.radius as f32,
        vec![
            GradientStop::new(0.0, Color::from_rgba8(r, g, b, 255)),
            GradientStop::new(1.0, Color::from_rgba8(r, g, b, 0)),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    )?;
    Some(Paint {
        shader,
        anti_alias: true,
        ..Paint::default()
    })
}

impl Surface for Pixmap {
    fn width(&self) -> u32 {
        self.inner.width()
    }

    fn height(&self) -> u32 {
        self.inner.height()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), MeshError> {
        self.inner = tiny_skia::Pixmap::new(width, height).ok_or(MeshError::InvalidDimensions)?;
        Ok(())
    }

    fn clear(&mut self) {
        self.inner.fill(Color::TRANSPARENT);
    }

    /// The glow is the gradient's coverage blurred with sigma `glow / 2`
    /// (canvas `shadowBlur` semantics), painted before the gradient itself.
    fn fill_blob(&mut self, blob: &RadialBlob) {
        if !(blob.radius.is_finite() && blob.radius > 0.0 && blob.center.is_finite()) {
            return;
        }
        let Some(paint) = gradient_paint(blob) else {
            return;
        };
        let Some(circle) = PathBuilder::from_circle(
            blob.center.x as f32,
            blob.center.y as f32,
            blob.radius as f32,
        ) else {
            return;
        };

        let sigma = (blob.glow.max(0.0) / 2.0) as f32;
        if sigma >= MIN_GLOW_SIGMA {
            self.paint_glow(blob, &circle, &paint, sigma);
        }
        self.inner
            .fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
        trace!(x = blob.center.x, y = blob.center.y, radius = blob.radius, "blob composited");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn blob(x: f64, y: f64, radius: f64, color: Rgb, glow: f64) -> RadialBlob {
        RadialBlob {
            center: DVec2::new(x, y),
            radius,
            color,
            glow,
        }
    }

    fn alpha(p: &Pixmap, x: u32, y: u32) -> u8 {
        p.pixel(x, y).unwrap()[3]
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(matches!(Pixmap::new(0, 4), Err(MeshError::InvalidDimensions)));
        assert!(matches!(Pixmap::new(4, 0), Err(MeshError::InvalidDimensions)));
    }

    #[test]
    fn new_pixmap_is_transparent() {
        let p = Pixmap::new(3, 2).unwrap();
        assert_eq!(p.data().len(), 3 * 2 * 4);
        assert!(p.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn blob_center_is_nearly_opaque_and_edge_untouched() {
        let mut p = Pixmap::new(64, 64).unwrap();
        p.fill_blob(&blob(32.0, 32.0, 20.0, Rgb::new(255, 0, 0), 0.0));
        let [r, g, _, a] = p.pixel(32, 32).unwrap();
        assert!(a > 235, "alpha {a}");
        assert!(r.abs_diff(a) <= 1, "premultiplied red {r} vs alpha {a}");
        assert_eq!(g, 0);
        assert_eq!(p.pixel(0, 0).unwrap(), [0; 4]);
        assert_eq!(alpha(&p, 32, 53), 0);
    }

    #[test]
    fn coverage_falls_off_with_distance() {
        let mut p = Pixmap::new(64, 64).unwrap();
        p.fill_blob(&blob(32.0, 32.0, 20.0, Rgb::WHITE, 0.0));
        assert!(alpha(&p, 32, 32) > alpha(&p, 40, 32));
        assert!(alpha(&p, 40, 32) > alpha(&p, 48, 32));
    }

    #[test]
    fn glow_extends_beyond_radius() {
        let mut plain = Pixmap::new(96, 96).unwrap();
        let mut glowing = Pixmap::new(96, 96).unwrap();
        plain.fill_blob(&blob(48.0, 48.0, 16.0, Rgb::WHITE, 0.0));
        glowing.fill_blob(&blob(48.0, 48.0, 16.0, Rgb::WHITE, 16.0));
        assert_eq!(alpha(&plain, 48, 68), 0);
        assert!(alpha(&glowing, 48, 68) > 0);
    }

    #[test]
    fn glow_counts_coverage_beyond_the_edge() {
        // Center 10 px left of the surface vs. the same blob fully inside a
        // wider surface, sampled at the same offset from the center.
        let mut edge = Pixmap::new(64, 64).unwrap();
        let mut inside = Pixmap::new(128, 64).unwrap();
        edge.fill_blob(&blob(-10.0, 32.0, 16.0, Rgb::WHITE, 16.0));
        inside.fill_blob(&blob(30.0, 32.0, 16.0, Rgb::WHITE, 16.0));
        let (a_edge, a_inside) = (alpha(&edge, 0, 32), alpha(&inside, 40, 32));
        assert!(a_edge.abs_diff(a_inside) <= 3, "edge {a_edge} vs inside {a_inside}");
    }

    #[test]
    fn later_blob_paints_over_earlier() {
        let mut p = Pixmap::new(32, 32).unwrap();
        p.fill_blob(&blob(16.0, 16.0, 12.0, Rgb::new(255, 0, 0), 0.0));
        p.fill_blob(&blob(16.0, 16.0, 12.0, Rgb::new(0, 0, 255), 0.0));
        let [r, _, b, _] = p.pixel(16, 16).unwrap();
        assert!(b > r, "blue should dominate: r {r} b {b}");
    }

    #[test]
    fn offscreen_or_degenerate_blobs_are_ignored() {
        let mut p = Pixmap::new(16, 16).unwrap();
        p.fill_blob(&blob(-100.0, -100.0, 10.0, Rgb::WHITE, 4.0));
        p.fill_blob(&blob(8.0, 8.0, 0.0, Rgb::WHITE, 4.0));
        p.fill_blob(&blob(8.0, 8.0, f64::NAN, Rgb::WHITE, 4.0));
        p.fill_blob(&blob(f64::INFINITY, 8.0, 4.0, Rgb::WHITE, 4.0));
        assert!(p.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn clear_and_resize_reset_pixels() {
        let mut p = Pixmap::new(16, 16).unwrap();
        p.fill_blob(&blob(8.0, 8.0, 6.0, Rgb::WHITE, 0.0));
        p.clear();
        assert!(p.data().iter().all(|&b| b == 0));
        p.resize(8, 4).unwrap();
        assert_eq!((p.width(), p.height(), p.data().len()), (8, 4, 8 * 4 * 4));
        assert!(p.resize(0, 4).is_err());
    }

    #[test]
    fn reach_box_is_limited_to_margin_around_surface() {
        let b = blob(-50.0, 10.0, 100.0, Rgb::WHITE, 0.0);
        assert_eq!(reach_box(&b, 5, 20, 20), Some((-5, -5, 25, 25)));
        let far = blob(-100.0, 10.0, 10.0, Rgb::WHITE, 0.0);
        assert_eq!(reach_box(&far, 5, 20, 20), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn pixels_stay_premultiplied(
                blobs in prop::collection::vec(
                    (-8.0_f64..56.0, -8.0_f64..56.0, 1.0_f64..30.0, any::<u8>(), 0.0_f64..12.0),
                    1..6,
                ),
            ) {
                let mut p = Pixmap::new(48, 48).unwrap();
                for (x, y, r, v, glow) in blobs {
                    p.fill_blob(&blob(x, y, r, Rgb::new(v, 255 - v, v / 2), glow));
                }
                for px in p.data().chunks_exact(4) {
                    prop_assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3]);
                }
            }
        }
    }
}
