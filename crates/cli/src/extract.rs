//! Palette extraction from local image files.
//!
//! Pixels are bucketed on a 4-bit-per-channel grid; the most populated
//! buckets, averaged, become the palette (most dominant first).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use meshglow_core::{MeshError, Palette, PaletteSource, Rgb};
use tracing::debug;

/// Longest side the image is reduced to before counting colors.
const SAMPLE_SIDE: u32 = 96;

/// Pixels with less alpha than this are ignored.
const MIN_ALPHA: u8 = 128;

#[derive(Default, Clone, Copy)]
struct Bucket {
    count: u32,
    sum: [u64; 3],
}

/// Reduces `pixels` to at most `count` dominant colors.
pub fn dominant_colors<I>(pixels: I, count: usize) -> Result<Palette, MeshError>
where
    I: IntoIterator<Item = [u8; 4]>,
{
    let mut buckets: HashMap<u16, Bucket> = HashMap::new();
    for [r, g, b, a] in pixels {
        if a < MIN_ALPHA {
            continue;
        }
        let key = (u16::from(r >> 4) << 8) | (u16::from(g >> 4) << 4) | u16::from(b >> 4);
        let bucket = buckets.entry(key).or_default();
        bucket.count += 1;
        bucket.sum[0] += u64::from(r);
        bucket.sum[1] += u64::from(g);
        bucket.sum[2] += u64::from(b);
    }

    let mut ranked: Vec<(u16, Bucket)> = buckets.into_iter().collect();
    ranked.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(&b.0)));

    let colors: Vec<Rgb> = ranked
        .into_iter()
        .take(count.max(1))
        .map(|(_, bucket)| {
            let n = u64::from(bucket.count);
            let mean = |c: usize| ((bucket.sum[c] + n / 2) / n) as u8;
            Rgb::new(mean(0), mean(1), mean(2))
        })
        .collect();

    Palette::new(colors)
        .map_err(|_| MeshError::PaletteExtraction("image has no opaque pixels".into()))
}

/// Reads a palette from an image file on disk.
pub fn palette_from_file(path: &Path, count: usize) -> Result<Palette, MeshError> {
    let img = image::open(path)
        .map_err(|e| MeshError::PaletteExtraction(format!("{}: {e}", path.display())))?;
    let img = if img.width() > SAMPLE_SIDE || img.height() > SAMPLE_SIDE {
        img.thumbnail(SAMPLE_SIDE, SAMPLE_SIDE)
    } else {
        img
    };
    let thumb = img.to_rgba8();
    let palette = dominant_colors(thumb.pixels().map(|p| p.0), count)?;
    debug!(path = %path.display(), colors = palette.len(), "palette extracted");
    Ok(palette)
}

/// Answers palette requests from image files.
///
/// With a covers directory, an image reference (typically a URL) resolves to
/// the file in that directory named after its last path segment. Without
/// one, the reference is used as a path directly.
#[derive(Debug, Clone, Default)]
pub struct ImagePaletteSource {
    covers_dir: Option<PathBuf>,
}

impl ImagePaletteSource {
    pub fn new(covers_dir: Option<PathBuf>) -> Self {
        Self { covers_dir }
    }

    pub fn resolve(&self, image_ref: &str) -> PathBuf {
        match &self.covers_dir {
            Some(dir) => {
                let name = image_ref.rsplit('/').next().unwrap_or(image_ref);
                dir.join(name)
            }
            None => PathBuf::from(image_ref),
        }
    }
}

impl PaletteSource for ImagePaletteSource {
    fn extract(&mut self, image_ref: &str, count: usize) -> Result<Palette, MeshError> {
        palette_from_file(&self.resolve(image_ref), count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque(r: u8, g: u8, b: u8) -> [u8; 4] {
        [r, g, b, 255]
    }

    #[test]
    fn most_common_color_comes_first() {
        let mut pixels = vec![opaque(250, 10, 10); 30];
        pixels.extend(vec![opaque(10, 10, 250); 50]);
        pixels.extend(vec![opaque(10, 250, 10); 5]);
        let p = dominant_colors(pixels, 7).unwrap();
        assert_eq!(
            p.colors(),
            &[
                Rgb::new(10, 10, 250),
                Rgb::new(250, 10, 10),
                Rgb::new(10, 250, 10)
            ]
        );
    }

    #[test]
    fn bucket_color_is_the_mean_of_its_pixels() {
        let p = dominant_colors(vec![opaque(100, 100, 100), opaque(102, 104, 110)], 1).unwrap();
        assert_eq!(p.colors(), &[Rgb::new(101, 102, 105)]);
    }

    #[test]
    fn count_limits_palette_length() {
        let pixels: Vec<[u8; 4]> = (0..16).map(|i| opaque(i * 16, 0, 0)).collect();
        assert_eq!(dominant_colors(pixels, 4).unwrap().len(), 4);
    }

    #[test]
    fn transparent_pixels_are_ignored() {
        let err = dominant_colors(vec![[255, 0, 0, 0]; 10], 3).unwrap_err();
        assert!(matches!(err, MeshError::PaletteExtraction(_)));
    }

    #[test]
    fn resolve_uses_last_url_segment_in_covers_dir() {
        let src = ImagePaletteSource::new(Some(PathBuf::from("/covers")));
        assert_eq!(
            src.resolve("https://upload.wikimedia.org/wikipedia/en/a/a7/ram.jpg"),
            PathBuf::from("/covers/ram.jpg")
        );
        assert_eq!(
            ImagePaletteSource::default().resolve("local/cover.png"),
            PathBuf::from("local/cover.png")
        );
    }

    #[test]
    fn extracts_from_png_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        let img = image::RgbaImage::from_fn(20, 10, |x, _| {
            if x < 15 {
                image::Rgba([200, 40, 40, 255])
            } else {
                image::Rgba([40, 40, 200, 255])
            }
        });
        img.save(&path).unwrap();

        let mut src = ImagePaletteSource::new(Some(dir.path().to_path_buf()));
        let p = src.extract("https://example.org/covers/cover.png", 7).unwrap();
        assert_eq!(p.colors()[0], Rgb::new(200, 40, 40));
        assert_eq!(p.colors()[1], Rgb::new(40, 40, 200));
    }

    #[test]
    fn missing_file_is_extraction_error() {
        let mut src = ImagePaletteSource::default();
        assert!(matches!(
            src.extract("/definitely/not/here.png", 7),
            Err(MeshError::PaletteExtraction(_))
        ));
    }
}
