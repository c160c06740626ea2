//! Virtual timers driven by an explicit clock.
//!
//! The orchestrator never sleeps: hosts call `take_due(now)` from whatever
//! tick they have (a browser interval, a test loop, a headless simulation)
//! and get back the timers that fired, in due order.

use crate::ease::Millis;

#[derive(Debug, Clone)]
struct Timer<K> {
    kind: K,
    due: Millis,
    period: Option<Millis>,
}

/// A set of one-shot and repeating timers keyed by `K`.
///
/// At most one timer per key is armed; scheduling a key again replaces it.
#[derive(Debug, Clone)]
pub struct TimerSet<K> {
    timers: Vec<Timer<K>>,
}

impl<K> Default for TimerSet<K> {
    fn default() -> Self {
        Self { timers: Vec::new() }
    }
}

impl<K: Copy + PartialEq> TimerSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `kind` to fire once at `due`.
    pub fn schedule_once(&mut self, kind: K, due: Millis) {
        self.arm(Timer {
            kind,
            due,
            period: None,
        });
    }

    /// Arms `kind` to fire at `first_due` and then every `period` after.
    ///
    /// Non-positive periods degrade to a one-shot timer.
    pub fn schedule_every(&mut self, kind: K, first_due: Millis, period: Millis) {
        let period = (period > 0.0).then_some(period);
        self.arm(Timer {
            kind,
            due: first_due,
            period,
        });
    }

    fn arm(&mut self, timer: Timer<K>) {
        self.cancel(timer.kind);
        self.timers.push(timer);
    }

    /// Disarms `kind`. Returns whether it was armed.
    pub fn cancel(&mut self, kind: K) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.kind != kind);
        self.timers.len() != before
    }

    /// Disarms every timer.
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_armed(&self, kind: K) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    /// When `kind` fires next, if armed.
    pub fn due(&self, kind: K) -> Option<Millis> {
        self.timers.iter().find(|t| t.kind == kind).map(|t| t.due)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Removes and returns every firing with `due <= now`, ordered by due time.
    ///
    /// A repeating timer that missed several periods fires once per period.
    /// One-shot timers are disarmed after firing.
    pub fn take_due(&mut self, now: Millis) -> Vec<(K, Millis)> {
        let mut fired = Vec::new();
        let mut keep = Vec::with_capacity(self.timers.len());
        for mut timer in self.timers.drain(..) {
            match timer.period {
                Some(period) => {
                    while timer.due <= now {
                        fired.push((timer.kind, timer.due));
                        timer.due += period;
                    }
                    keep.push(timer);
                }
                None if timer.due <= now => fired.push((timer.kind, timer.due)),
                None => keep.push(timer),
            }
        }
        self.timers = keep;
        fired.sort_by(|a, b| a.1.total_cmp(&b.1));
        fired
    }
}
