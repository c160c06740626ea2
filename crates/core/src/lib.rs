#![deny(unsafe_code)]
//! Core of the mesh-gradient backdrop.
//!
//! Provides [`GradientField`] (blurred radial blobs that drift and blend
//! between palettes), the [`Orchestrator`] that paces frames and reacts to
//! track changes, visibility and resize, plus the supporting `Rgb`/`Palette`
//! color types, a seedable PRNG, virtual timers, the crossfade layer stack and
//! the zoom cycle. Drawing goes through the [`Surface`] trait and palette
//! extraction through [`PaletteSource`].

pub mod color;
pub mod config;
pub mod ease;
pub mod error;
pub mod field;
pub mod layers;
pub mod orchestrator;
pub mod pacing;
pub mod palette;
pub mod point;
pub mod prng;
pub mod source;
pub mod surface;
pub mod timers;
pub mod zoom;

pub use color::Rgb;
pub use config::MeshConfig;
pub use ease::{cycle_progress, Ease, Millis};
pub use error::MeshError;
pub use field::{FieldOptions, GradientField};
pub use layers::{LayerRole, LayerStack, Track, TrackLayer};
pub use orchestrator::{FrameStatus, Notice, Orchestrator, PaletteTicket};
pub use pacing::FramePacer;
pub use palette::Palette;
pub use point::BlobPoint;
pub use prng::{RandomSource, SequenceSource, Xorshift64};
pub use source::PaletteSource;
pub use surface::{RadialBlob, RecordingSurface, Surface};
pub use timers::TimerSet;
pub use zoom::{ZoomCycle, ZoomState};
