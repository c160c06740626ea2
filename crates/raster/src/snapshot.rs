//! PNG snapshots of a [`Pixmap`].
//!
//! Feature-gated behind `png` (default on) so builds that only need the
//! rasterizer skip the `image` crate.

use std::path::Path;

use meshglow_core::{MeshError, Rgb, Surface};
use tracing::debug;

use crate::pixel::{to_rgba8, to_rgba8_over};
use crate::pixmap::Pixmap;

fn save(width: u32, height: u32, rgba: Vec<u8>, path: &Path) -> Result<(), MeshError> {
    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| MeshError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| MeshError::Io(e.to_string()))?;
    debug!(path = %path.display(), width, height, "png written");
    Ok(())
}

/// Writes the pixmap with its transparency preserved.
///
/// Returns `MeshError::Io` on encode or write failure.
pub fn write_png(pixmap: &Pixmap, path: &Path) -> Result<(), MeshError> {
    save(pixmap.width(), pixmap.height(), to_rgba8(pixmap), path)
}

/// Writes the pixmap flattened over a solid `background`.
pub fn write_png_over(pixmap: &Pixmap, background: Rgb, path: &Path) -> Result<(), MeshError> {
    save(pixmap.width(), pixmap.height(), to_rgba8_over(pixmap, background), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use meshglow_core::RadialBlob;

    #[test]
    fn write_png_round_trip() {
        let mut p = Pixmap::new(16, 12).unwrap();
        p.fill_blob(&RadialBlob {
            center: DVec2::new(8.0, 6.0),
            radius: 5.0,
            color: Rgb::new(0, 128, 255),
            glow: 2.0,
        });
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.png");

        write_png(&p, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!((img.width(), img.height()), (16, 12));
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn write_png_over_is_opaque() {
        let p = Pixmap::new(4, 4).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.png");

        write_png_over(&p, Rgb::new(1, 2, 3), &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(3, 3).0, [1, 2, 3, 255]);
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let p = Pixmap::new(2, 2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.png");
        assert!(matches!(write_png(&p, &path), Err(MeshError::Io(_))));
    }
}
