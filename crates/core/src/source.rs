//! The palette-extraction seam.
//!
//! Extracting colors from album art is an external capability. The CLI
//! implements this trait by decoding image files; the browser host answers
//! palette requests from a JS color library instead.

use crate::error::MeshError;
use crate::palette::Palette;

/// Derives an ordered palette of up to `count` colors from an image reference.
///
/// Failures are handed to the orchestrator as-is; it substitutes the fallback
/// palette for any error.
pub trait PaletteSource {
    fn extract(&mut self, image_ref: &str, count: usize) -> Result<Palette, MeshError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    struct Fixed(Palette);

    impl PaletteSource for Fixed {
        fn extract(&mut self, image_ref: &str, _count: usize) -> Result<Palette, MeshError> {
            if image_ref.is_empty() {
                return Err(MeshError::PaletteExtraction("empty image reference".into()));
            }
            Ok(self.0.clone())
        }
    }

    #[test]
    fn sources_are_usable_as_trait_objects() {
        let warm = Palette::from_hex(&["#ff8800", "#ffcc00", "#aa3300"]).unwrap();
        let mut src: Box<dyn PaletteSource> = Box::new(Fixed(warm));
        let p = src.extract("a.png", 7).unwrap();
        assert_eq!(p.colors()[0], Rgb::new(0xff, 0x88, 0));
        assert!(matches!(src.extract("", 2), Err(MeshError::PaletteExtraction(_))));
    }
}
