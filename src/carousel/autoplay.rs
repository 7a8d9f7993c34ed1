/// Autoplay timing
///
/// The host feeds wall-clock ticks in; `Autoplay` decides when an advance is
/// due so every surface can share one timer subscription.

use std::time::{Duration, Instant};

/// Fixed-interval trigger
#[derive(Debug, Clone, Copy)]
pub struct Autoplay {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Autoplay {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Start counting a full interval from `now`
    pub fn restart(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Whether an advance fires at `now`. The first call only arms the timer.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_due {
            None => {
                self.restart(now);
                false
            }
            Some(deadline) if now >= deadline => {
                // A stalled event loop fires once, not once per missed interval
                self.restart(now);
                true
            }
            Some(_) => false,
        }
    }
}

/// "Paused by user interaction" flag with an optional resume deadline
#[derive(Debug, Clone, Copy, Default)]
pub struct PauseLatch {
    paused: bool,
    resume_at: Option<Instant>,
}

impl PauseLatch {
    /// Pause until further notice (touch or drag started)
    pub fn pause(&mut self) {
        self.paused = true;
        self.resume_at = None;
    }

    /// Keep pausing for `cooldown` after `now`, then resume
    pub fn resume_after(&mut self, now: Instant, cooldown: Duration) {
        self.paused = true;
        self.resume_at = Some(now + cooldown);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_paused(&self, now: Instant) -> bool {
        self.paused && self.resume_at.map_or(true, |deadline| now < deadline)
    }
}
