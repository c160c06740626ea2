//! Drives a [`GradientField`] from frame ticks, timers and track changes.
//!
//! The orchestrator owns everything the backdrop page kept in module-level
//! globals: the animation loop state, the layer stack, the zoom cycle, the
//! rotation timers and the in-flight palette requests. Hosts feed it three
//! kinds of input, all stamped with a monotonic `now`:
//!
//! - [`Orchestrator::on_frame`] from the display refresh callback,
//! - [`Orchestrator::tick`] from a coarse timer,
//! - events: [`Orchestrator::resolve_palette`], [`Orchestrator::set_visible`],
//!   [`Orchestrator::resize`], [`Orchestrator::key_pressed`].
//!
//! Outward effects beyond painting the surface are queued as [`Notice`]s.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::MeshConfig;
use crate::ease::{cycle_progress, Millis};
use crate::error::MeshError;
use crate::field::GradientField;
use crate::layers::{LayerRole, LayerStack, Track};
use crate::pacing::FramePacer;
use crate::palette::Palette;
use crate::prng::{RandomSource, Xorshift64};
use crate::surface::Surface;
use crate::timers::TimerSet;
use crate::zoom::{ZoomCycle, ZoomState};

/// Identifies one palette request. Generations increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PaletteTicket(u64);

impl PaletteTicket {
    /// Rebuilds a ticket from a generation that crossed a host boundary
    /// (e.g. JSON). Unknown generations are ignored by `resolve_palette`.
    pub fn from_generation(generation: u64) -> Self {
        Self(generation)
    }

    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Outward effects for the host to act on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Extract a palette from `image_url` and answer with `resolve_palette`.
    PaletteRequested {
        ticket: PaletteTicket,
        image_url: String,
        count: usize,
    },
    /// Extraction failed or timed out; the fallback palette was used.
    PaletteFallback { ticket: PaletteTicket, reason: String },
    /// A palette arrived after a newer request had been issued and was ignored.
    StalePaletteDropped { ticket: PaletteTicket },
    /// The cover art changed.
    CoverChanged { url: String },
    LayerAdded { key: String, role: LayerRole },
    LayersRetired { keys: Vec<String> },
    ZoomChanged { state: ZoomState },
}

/// Outcome of one frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The field advanced and the surface was repainted.
    Rendered,
    /// Too soon since the last frame; the host should keep scheduling.
    Skipped,
    /// The loop is not running; the host may stop scheduling frames.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    RotateTrack,
    InitialZoom,
    AutoZoom,
    SettleTransition,
}

#[derive(Debug, Clone)]
struct PendingPalette {
    ticket: PaletteTicket,
    track: Track,
    deadline: Millis,
}

/// Frame-loop state: whether the loop runs and its pacing.
#[derive(Debug, Clone)]
struct AnimationState {
    running: bool,
    pacer: FramePacer,
}

/// Owns the field, its surface and all the timing around them.
pub struct Orchestrator<S: Surface> {
    config: MeshConfig,
    surface: S,
    field: GradientField,
    rng: Xorshift64,
    animation: AnimationState,
    visible: bool,
    started: bool,
    torn_down: bool,
    layers: LayerStack,
    zoom: ZoomCycle,
    timers: TimerSet<TimerKind>,
    pending: Vec<PendingPalette>,
    last_generation: u64,
    notices: Vec<Notice>,
}

impl<S: Surface> Orchestrator<S> {
    /// Validates `config` and seeds a field sized to `surface`.
    pub fn new(config: MeshConfig, surface: S) -> Result<Self, MeshError> {
        config.validate()?;
        let mut rng = Xorshift64::new(config.seed);
        let field = GradientField::from_config(
            &config,
            f64::from(surface.width()),
            f64::from(surface.height()),
            &mut rng,
        )?;
        Ok(Self {
            animation: AnimationState {
                running: false,
                pacer: FramePacer::new(config.fps),
            },
            layers: LayerStack::new(config.layer_retire_delay_ms),
            zoom: ZoomCycle::new(config.zoom_step_ms),
            config,
            surface,
            field,
            rng,
            visible: true,
            started: false,
            torn_down: false,
            timers: TimerSet::new(),
            pending: Vec::new(),
            last_generation: 0,
            notices: Vec::new(),
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// The animated field painted each frame.
    pub fn field(&self) -> &GradientField {
        &self.field
    }

    /// The surface the field is painted onto.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Cover-art layers, oldest first.
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Current step of the zoom cycle.
    pub fn zoom_state(&self) -> ZoomState {
        self.zoom.state()
    }

    /// Whether the per-frame loop is active.
    pub fn is_running(&self) -> bool {
        self.animation.running
    }

    /// Whether the page was last reported visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether `teardown` has run.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Number of palette requests still awaiting an answer.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Frames rendered by the loop so far.
    pub fn frames_rendered(&self) -> u64 {
        self.animation.pacer.frames()
    }

    /// Takes every queued notice, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Paints the initial frame, starts the loop (unless reduced motion),
    /// requests a palette for a random first track and arms the rotation
    /// and zoom timers. Later calls do nothing.
    pub fn start(&mut self, now: Millis) {
        if self.started || self.torn_down {
            return;
        }
        self.started = true;
        self.field.render(&mut self.surface);
        self.start_loop(now);

        if let Some(track) = self.random_track() {
            self.add_track(track, now);
        }
        self.timers.schedule_every(
            TimerKind::RotateTrack,
            now + self.config.rotation_interval_ms,
            self.config.rotation_interval_ms,
        );
        self.timers
            .schedule_once(TimerKind::InitialZoom, now + self.config.initial_zoom_delay_ms);
        self.timers.schedule_every(
            TimerKind::AutoZoom,
            now + self.config.auto_zoom_interval_ms,
            self.config.auto_zoom_interval_ms,
        );
        info!(now, reduced_motion = self.config.reduced_motion, "backdrop started");
    }

    /// Display-refresh callback.
    ///
    /// At most `fps` times per second this advances the field with the eased
    /// outer-cycle progress and repaints the surface.
    pub fn on_frame(&mut self, now: Millis) -> FrameStatus {
        if !self.animation.running {
            return FrameStatus::Stopped;
        }
        if !self.animation.pacer.ready(now) {
            return FrameStatus::Skipped;
        }
        self.advance(now);
        FrameStatus::Rendered
    }

    fn advance(&mut self, now: Millis) {
        let progress = cycle_progress(now, self.config.cycle_ms, self.config.cycle_ease);
        self.field.animate(progress, now);
        self.field.render(&mut self.surface);
    }

    /// Coarse timer callback: fires due timers, steps the zoom cycle,
    /// retires crossfaded layers and times out stale palette requests.
    pub fn tick(&mut self, now: Millis) {
        if self.torn_down {
            return;
        }
        for (kind, at) in self.timers.take_due(now) {
            match kind {
                TimerKind::RotateTrack => {
                    if let Some(track) = self.random_track() {
                        self.add_track(track, at);
                    }
                }
                TimerKind::InitialZoom | TimerKind::AutoZoom => {
                    self.start_zoom(at);
                }
                TimerKind::SettleTransition => self.advance(now),
            }
        }

        if let Some(state) = self.zoom.tick(now) {
            info!(?state, "zoom step");
            self.notices.push(Notice::ZoomChanged { state });
        }

        let retired = self.layers.retire_due(now);
        if !retired.is_empty() {
            self.notices.push(Notice::LayersRetired {
                keys: retired.into_iter().map(|l| l.key).collect(),
            });
        }

        let expired: Vec<PaletteTicket> = self
            .pending
            .iter()
            .filter(|p| p.deadline <= now)
            .map(|p| p.ticket)
            .collect();
        for ticket in expired {
            self.resolve_palette(
                ticket,
                Err(MeshError::PaletteExtraction("timed out".into())),
                now,
            );
        }
    }

    /// Starts showing `track`: cancels any pending crossfade retirement and
    /// issues a palette request. The track's layer appears once its palette
    /// resolves.
    pub fn add_track(&mut self, track: Track, now: Millis) -> PaletteTicket {
        self.last_generation += 1;
        let ticket = PaletteTicket(self.last_generation);
        self.layers.cancel_retirement();
        info!(title = %track.title, artist = %track.artist, generation = ticket.0, "track requested");
        self.notices.push(Notice::PaletteRequested {
            ticket,
            image_url: track.image_url.clone(),
            count: self.config.palette_size,
        });
        self.pending.push(PendingPalette {
            ticket,
            track,
            deadline: now + self.config.palette_timeout_ms,
        });
        ticket
    }

    /// Answers a palette request.
    ///
    /// Failures are replaced by the fallback palette. A ticket older than the
    /// most recent request is dropped, so only the newest track's palette is
    /// ever applied. Returns whether the palette was applied.
    pub fn resolve_palette(
        &mut self,
        ticket: PaletteTicket,
        result: Result<Palette, MeshError>,
        now: Millis,
    ) -> bool {
        let Some(idx) = self.pending.iter().position(|p| p.ticket == ticket) else {
            debug!(generation = ticket.0, "palette for unknown or settled request ignored");
            return false;
        };
        let request = self.pending.remove(idx);

        if ticket.0 < self.last_generation {
            warn!(generation = ticket.0, latest = self.last_generation, "stale palette dropped");
            self.notices.push(Notice::StalePaletteDropped { ticket });
            return false;
        }

        let palette = match result {
            Ok(palette) => palette,
            Err(e) => {
                warn!(generation = ticket.0, error = %e, "using fallback palette");
                self.notices.push(Notice::PaletteFallback {
                    ticket,
                    reason: e.to_string(),
                });
                self.config.fallback_palette.clone()
            }
        };

        self.field.update_colors(palette.colors(), now);
        if !self.animation.running && self.config.reduced_motion {
            self.timers
                .schedule_once(TimerKind::SettleTransition, now + self.config.transition_ms);
        }

        self.notices.push(Notice::CoverChanged {
            url: request.track.image_url.clone(),
        });
        let layer = self.layers.push(request.track, now);
        self.notices.push(Notice::LayerAdded {
            key: layer.key.clone(),
            role: layer.role,
        });
        true
    }

    /// Page visibility change: hidden pauses the loop, visible resumes it
    /// unless motion is reduced.
    pub fn set_visible(&mut self, visible: bool, now: Millis) {
        self.visible = visible;
        if visible {
            self.start_loop(now);
        } else {
            self.stop_loop();
        }
    }

    /// Resizes the surface and the field's bounds, then repaints.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), MeshError> {
        self.surface.resize(width, height)?;
        self.field.resize(f64::from(width), f64::from(height))?;
        self.field.render(&mut self.surface);
        Ok(())
    }

    /// Starts a zoom cycle when `key` matches the configured zoom key.
    /// Returns whether a cycle started.
    pub fn key_pressed(&mut self, key: &str, now: Millis) -> bool {
        if self.torn_down || !key.eq_ignore_ascii_case(&self.config.zoom_key) {
            return false;
        }
        self.start_zoom(now)
    }

    fn start_zoom(&mut self, now: Millis) -> bool {
        if !self.zoom.start(now) {
            return false;
        }
        self.notices.push(Notice::ZoomChanged {
            state: self.zoom.state(),
        });
        true
    }

    /// Stops the loop, cancels every timer and pending request, and drops
    /// all layers. The orchestrator ignores input afterwards.
    pub fn teardown(&mut self) {
        self.stop_loop();
        self.timers.cancel_all();
        self.zoom.reset();
        self.pending.clear();
        self.layers.clear();
        self.torn_down = true;
        info!("backdrop torn down");
    }

    fn start_loop(&mut self, now: Millis) {
        if self.config.reduced_motion || self.torn_down || !self.started || !self.visible {
            return;
        }
        if !self.animation.running {
            debug!(now, "frame loop started");
        }
        self.animation.running = true;
        self.animation.pacer.start(now);
    }

    fn stop_loop(&mut self) {
        if self.animation.running {
            debug!("frame loop stopped");
        }
        self.animation.running = false;
    }

    fn random_track(&mut self) -> Option<Track> {
        if self.config.tracks.is_empty() {
            return None;
        }
        let idx = self.rng.next_usize(self.config.tracks.len());
        Some(self.config.tracks[idx].clone())
    }
}
