//! Ordered color palettes that drive blob target colors.
//!
//! A palette maps onto blob points cyclically: point `i` takes
//! `colors[i mod len]`. Palettes are never empty.

use crate::color::Rgb;
use crate::error::MeshError;
use serde::{Deserialize, Deserializer, Serialize};

/// Channel values of the neutral greyscale palette.
const GREYSCALE_LEVELS: [u8; 5] = [0x00, 0x22, 0x33, 0x44, 0x55];

/// A non-empty, ordered sequence of colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Creates a palette from a vector of colors.
    ///
    /// Requires at least one color.
    pub fn new(colors: Vec<Rgb>) -> Result<Self, MeshError> {
        if colors.is_empty() {
            return Err(MeshError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    /// Creates a palette by parsing hex color strings.
    pub fn from_hex<S: AsRef<str>>(hexes: &[S]) -> Result<Self, MeshError> {
        let colors = hexes
            .iter()
            .map(|h| Rgb::from_hex(h.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// The neutral palette of five greys (`#000000` through `#555555`).
    ///
    /// Used as the initial backdrop and as the substitute whenever palette
    /// extraction fails.
    pub fn greyscale() -> Self {
        Self {
            colors: GREYSCALE_LEVELS.iter().map(|&v| Rgb::grey(v)).collect(),
        }
    }

    /// Returns the number of colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Read-only access to the colors in order.
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Color assigned to slot `index`, wrapping cyclically.
    pub fn color_for(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }

    /// Repeats the whole palette until it holds at least `count` colors.
    ///
    /// A palette already at least `count` long is returned unchanged, so the
    /// result may be longer than `count`.
    pub fn expanded(&self, count: usize) -> Palette {
        let mut colors = self.colors.clone();
        while colors.len() < count {
            colors.extend_from_slice(&self.colors);
        }
        Palette { colors }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::greyscale()
    }
}

impl<'de> Deserialize<'de> for Palette {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let colors = Vec::<Rgb>::deserialize(deserializer)?;
        Palette::new(colors).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Vec<Rgb>> for Palette {
    type Error = MeshError;

    fn try_from(colors: Vec<Rgb>) -> Result<Self, Self::Error> {
        Palette::new(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_with_empty_vec_returns_error() {
        assert!(matches!(
            Palette::new(vec![]),
            Err(MeshError::InvalidPalette(_))
        ));
    }

    #[test]
    fn from_hex_parses_every_entry() {
        let p = Palette::from_hex(&["#ff0000", "00ff00"]).unwrap();
        assert_eq!(p.colors(), &[Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)]);
    }

    #[test]
    fn from_hex_with_invalid_entry_returns_error() {
        assert!(Palette::from_hex(&["#ff0000", "nope"]).is_err());
    }

    #[test]
    fn from_hex_with_empty_slice_returns_error() {
        let empty: [&str; 0] = [];
        assert!(Palette::from_hex(&empty).is_err());
    }

    #[test]
    fn greyscale_matches_neutral_levels() {
        let hexes: Vec<String> = Palette::greyscale()
            .colors()
            .iter()
            .map(|c| c.to_hex())
            .collect();
        assert_eq!(
            hexes,
            ["#000000", "#222222", "#333333", "#444444", "#555555"]
        );
    }

    #[test]
    fn color_for_wraps_cyclically() {
        let p = Palette::from_hex(&["#010101", "#020202", "#030303"]).unwrap();
        assert_eq!(p.color_for(0), Rgb::grey(1));
        assert_eq!(p.color_for(3), Rgb::grey(1));
        assert_eq!(p.color_for(7), Rgb::grey(2));
    }

    #[test]
    fn expanded_repeats_whole_palette() {
        let p = Palette::from_hex(&["#010101", "#020202", "#030303", "#040404", "#050505"])
            .unwrap();
        let e = p.expanded(7);
        // 5 colors repeat once to 10, the way the page doubled its list.
        assert_eq!(e.len(), 10);
        assert_eq!(e.colors()[5], Rgb::grey(1));
        assert_eq!(e.colors()[6], Rgb::grey(2));
    }

    #[test]
    fn expanded_leaves_long_palette_untouched() {
        let p = Palette::greyscale();
        assert_eq!(p.expanded(3), p);
    }

    #[test]
    fn serde_round_trip_as_hex_array() {
        let p = Palette::from_hex(&["#ff0000", "#00ff00"]).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r##"["#ff0000","#00ff00"]"##);
        let back: Palette = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn deserialize_rejects_empty_array() {
        assert!(serde_json::from_str::<Palette>("[]").is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn expanded_covers_count_and_preserves_cycle(
                len in 1_usize..12,
                count in 0_usize..40,
            ) {
                let colors: Vec<Rgb> = (0..len).map(|i| Rgb::grey(i as u8)).collect();
                let p = Palette::new(colors).unwrap();
                let e = p.expanded(count);
                prop_assert!(e.len() >= count);
                prop_assert_eq!(e.len() % len, 0);
                for i in 0..e.len() {
                    prop_assert_eq!(e.colors()[i], p.color_for(i));
                }
            }
        }
    }
}
