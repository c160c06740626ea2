//! Track layers and the crossfade retention policy.
//!
//! Every new track pushes a [`TrackLayer`] onto the stack. Older layers stay
//! visible underneath for a short crossfade and are then retired, leaving
//! only the newest. Layers are rendered bottom-to-top (index 0 = oldest).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ease::Millis;

/// An album shown by the backdrop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub image_url: String,
}

impl Track {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            image_url: image_url.into(),
        }
    }

    /// The demo album collection the backdrop rotates through by default.
    pub fn samples() -> Vec<Track> {
        vec![
            Track::new(
                "Currents",
                "Tame Impala",
                "https://upload.wikimedia.org/wikipedia/en/9/9b/Tame_Impala_-_Currents.png",
            ),
            Track::new(
                "Random Access Memories",
                "Daft Punk",
                "https://upload.wikimedia.org/wikipedia/en/a/a7/Random_Access_Memories.jpg",
            ),
            Track::new(
                "DAMN.",
                "Kendrick Lamar",
                "https://upload.wikimedia.org/wikipedia/en/5/51/Kendrick_Lamar_-_Damn.png",
            ),
            Track::new(
                "Blonde",
                "Frank Ocean",
                "https://upload.wikimedia.org/wikipedia/en/a/a0/Blonde_-_Frank_Ocean.jpeg",
            ),
            Track::new(
                "After Hours",
                "The Weeknd",
                "https://upload.wikimedia.org/wikipedia/en/c/c1/The_Weeknd_-_After_Hours.png",
            ),
        ]
    }

    /// Alt text for the album image.
    pub fn caption(&self) -> String {
        format!("{} by {}", self.title, self.artist)
    }
}

/// Stacking role assigned when a layer is pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerRole {
    /// The only layer at push time.
    Top,
    /// Pushed while other layers were still visible; fades in over them.
    Bottom,
}

/// One visible album layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLayer {
    pub track: Track,
    /// Unique key, `"{title}-{artist}-{pushed_at}"`.
    pub key: String,
    pub role: LayerRole,
    pub pushed_at: Millis,
}

/// Ordered set of visible layers with delayed retirement of all but the newest.
#[derive(Debug, Clone)]
pub struct LayerStack {
    layers: Vec<TrackLayer>,
    retire_delay: Millis,
    retire_at: Option<Millis>,
}

impl LayerStack {
    pub fn new(retire_delay: Millis) -> Self {
        Self {
            layers: Vec::new(),
            retire_delay,
            retire_at: None,
        }
    }

    pub fn layers(&self) -> &[TrackLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The most recently pushed layer.
    pub fn newest(&self) -> Option<&TrackLayer> {
        self.layers.last()
    }

    /// True between a push and the retirement that follows it.
    pub fn is_transitioning(&self) -> bool {
        self.retire_at.is_some()
    }

    pub fn retire_at(&self) -> Option<Millis> {
        self.retire_at
    }

    /// Adds `track` on top and (re)arms retirement `retire_delay` from `now`.
    ///
    /// A push during a pending crossfade postpones the retirement, so only
    /// the last push's deadline counts.
    pub fn push(&mut self, track: Track, now: Millis) -> &TrackLayer {
        let role = if self.layers.is_empty() {
            LayerRole::Top
        } else {
            LayerRole::Bottom
        };
        let key = format!("{}-{}-{}", track.title, track.artist, now.round() as i64);
        self.layers.push(TrackLayer {
            track,
            key,
            role,
            pushed_at: now,
        });
        self.retire_at = Some(now + self.retire_delay);
        let layer = &self.layers[self.layers.len() - 1];
        debug!(key = %layer.key, ?role, "layer pushed");
        layer
    }

    /// Once the deadline has passed, removes every layer but the newest and
    /// returns the removed ones (oldest first). Returns nothing before then.
    pub fn retire_due(&mut self, now: Millis) -> Vec<TrackLayer> {
        match self.retire_at {
            Some(at) if at <= now => {
                self.retire_at = None;
                let keep_from = self.layers.len().saturating_sub(1);
                self.layers.drain(..keep_from).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Cancels a pending retirement without removing anything.
    pub fn cancel_retirement(&mut self) {
        self.retire_at = None;
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.retire_at = None;
    }
}
