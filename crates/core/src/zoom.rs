//! The four-quadrant pan/zoom cycle over the album art.
//!
//! `Idle -> Quadrant(1) -> Quadrant(2) -> Quadrant(3) -> Quadrant(4) -> Idle`,
//! one step per `step_ms`. A running cycle cannot be restarted.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ease::Millis;

/// Current pan/zoom step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomState {
    #[default]
    Idle,
    Quadrant(u8),
}

impl ZoomState {
    /// CSS-style class names a page would apply for this state.
    pub fn classes(self) -> Vec<String> {
        match self {
            ZoomState::Idle => Vec::new(),
            ZoomState::Quadrant(q) => vec!["zooming".to_string(), format!("quadrant{q}")],
        }
    }
}

/// State machine for the zoom cycle, advanced by [`ZoomCycle::tick`].
#[derive(Debug, Clone)]
pub struct ZoomCycle {
    state: ZoomState,
    step_ms: Millis,
    next_step_at: Option<Millis>,
}

impl ZoomCycle {
    pub const QUADRANTS: u8 = 4;

    pub fn new(step_ms: Millis) -> Self {
        Self {
            state: ZoomState::Idle,
            step_ms,
            next_step_at: None,
        }
    }

    pub fn state(&self) -> ZoomState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != ZoomState::Idle
    }

    /// When the next step is due, if a cycle is running.
    pub fn next_step_at(&self) -> Option<Millis> {
        self.next_step_at
    }

    /// Enters `Quadrant(1)`. Returns false (and changes nothing) if a cycle
    /// is already running.
    pub fn start(&mut self, now: Millis) -> bool {
        if self.is_active() {
            return false;
        }
        self.state = ZoomState::Quadrant(1);
        self.next_step_at = Some(now + self.step_ms);
        info!(now, "zoom cycle started");
        true
    }

    /// Applies every step due at `now` and returns the new state if it changed.
    pub fn tick(&mut self, now: Millis) -> Option<ZoomState> {
        let before = self.state;
        while let Some(due) = self.next_step_at {
            if due > now {
                break;
            }
            self.state = match self.state {
                ZoomState::Quadrant(q) if q < Self::QUADRANTS => ZoomState::Quadrant(q + 1),
                _ => ZoomState::Idle,
            };
            self.next_step_at = match self.state {
                ZoomState::Idle => None,
                ZoomState::Quadrant(_) => Some(due + self.step_ms),
            };
        }
        (self.state != before).then_some(self.state)
    }

    /// Drops any running cycle back to `Idle`.
    pub fn reset(&mut self) {
        self.state = ZoomState::Idle;
        self.next_step_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_visits_each_quadrant_then_idles() {
        let mut z = ZoomCycle::new(12_000.0);
        assert!(z.start(0.0));
        assert_eq!(z.state(), ZoomState::Quadrant(1));
        assert_eq!(z.tick(11_999.0), None);
        assert_eq!(z.tick(12_000.0), Some(ZoomState::Quadrant(2)));
        assert_eq!(z.tick(24_000.0), Some(ZoomState::Quadrant(3)));
        assert_eq!(z.tick(36_000.0), Some(ZoomState::Quadrant(4)));
        assert_eq!(z.tick(48_000.0), Some(ZoomState::Idle));
        assert!(!z.is_active());
        assert_eq!(z.next_step_at(), None);
    }

    #[test]
    fn start_is_guarded_while_running() {
        let mut z = ZoomCycle::new(12_000.0);
        assert!(z.start(0.0));
        assert!(!z.start(5_000.0));
        assert_eq!(z.next_step_at(), Some(12_000.0));
    }

    #[test]
    fn late_tick_catches_up_multiple_steps() {
        let mut z = ZoomCycle::new(12_000.0);
        z.start(0.0);
        assert_eq!(z.tick(30_000.0), Some(ZoomState::Quadrant(3)));
        assert_eq!(z.next_step_at(), Some(36_000.0));
    }

    #[test]
    fn can_restart_after_cycle_finishes() {
        let mut z = ZoomCycle::new(10.0);
        z.start(0.0);
        z.tick(100.0);
        assert!(z.start(100.0));
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut z = ZoomCycle::new(10.0);
        z.start(0.0);
        z.reset();
        assert_eq!(z.state(), ZoomState::Idle);
        assert_eq!(z.tick(1_000.0), None);
    }

    #[test]
    fn classes_follow_quadrant() {
        assert!(ZoomState::Idle.classes().is_empty());
        assert_eq!(ZoomState::Quadrant(3).classes(), vec!["zooming", "quadrant3"]);
    }
}
