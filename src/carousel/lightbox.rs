/// Full-screen lightbox orchestration
///
/// Presents one image of a sequence at a time. Navigation comes from arrow
/// buttons, the keyboard, touch swipes and pointer drags; autoplay advances
/// unless the user has recently interacted.

use std::time::{Duration, Instant};

use super::autoplay::{Autoplay, PauseLatch};
use super::gallery::{Gallery, Snap};
use super::SurfaceConfig;

/// Delay between closing and dropping the image sequence. The backdrop
/// fades out over it.
pub const TEARDOWN_DELAY: Duration = Duration::from_millis(200);

/// Keys the lightbox listens to while open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxKey {
    Escape,
    ArrowLeft,
    ArrowRight,
}

/// Touch swipe tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeConfig {
    /// Horizontal travel needed to count as a swipe
    pub threshold_px: f32,
    /// Autoplay pause after the finger lifts
    pub cooldown: Duration,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            threshold_px: 40.0,
            cooldown: Duration::from_millis(500),
        }
    }
}

#[derive(Debug)]
pub struct Lightbox {
    config: SurfaceConfig,
    swipe: SwipeConfig,
    gallery: Gallery,
    open: bool,
    autoplay: Autoplay,
    pause: PauseLatch,
    touch_start_x: Option<f32>,
    teardown_at: Option<Instant>,
    /// Backdrop opacity while closing, 1.0 down to 0.0
    fade: f32,
}

impl Lightbox {
    pub fn new(config: SurfaceConfig, swipe: SwipeConfig) -> Self {
        Self {
            config,
            swipe,
            gallery: Gallery::new(Vec::new(), &config),
            open: false,
            autoplay: Autoplay::new(config.autoplay_interval),
            pause: PauseLatch::default(),
            touch_start_x: None,
            teardown_at: None,
            fade: 0.0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// While open, the page underneath must not scroll and is drawn dimmed
    pub fn page_suspended(&self) -> bool {
        self.open
    }

    /// Open, or closed with the fade-out still running
    pub fn is_visible(&self) -> bool {
        self.open || !self.gallery.is_empty()
    }

    pub fn opacity(&self) -> f32 {
        if self.open {
            1.0
        } else {
            self.fade
        }
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// One-based position and total, as shown in the counter
    pub fn counter(&self) -> (usize, usize) {
        let total = self.gallery.len();
        ((self.gallery.index() + 1).min(total), total)
    }

    /// Show `slides` starting at `index`. An empty sequence leaves the
    /// lightbox closed.
    pub fn open(&mut self, slides: Vec<String>, index: usize, now: Instant) -> bool {
        if slides.is_empty() {
            log::debug!("Ignoring lightbox open with no images");
            return false;
        }

        log::info!("Opening lightbox at {} of {}", index + 1, slides.len());
        self.gallery = Gallery::new(slides, &self.config).with_index(index);
        self.open = true;
        self.pause.clear();
        self.touch_start_x = None;
        self.teardown_at = None;
        self.autoplay.restart(now);
        true
    }

    /// Close now and schedule the sequence teardown
    pub fn close(&mut self, now: Instant) {
        if !self.open {
            return;
        }
        log::info!("Closing lightbox");
        self.gallery.cancel();
        self.open = false;
        self.fade = 1.0;
        self.teardown_at = Some(now + TEARDOWN_DELAY);
    }

    pub fn prev(&mut self) -> Option<usize> {
        if !self.open {
            return None;
        }
        self.gallery.step_by(-1)
    }

    pub fn next(&mut self) -> Option<usize> {
        if !self.open {
            return None;
        }
        self.gallery.step_by(1)
    }

    pub fn go_to(&mut self, index: usize) -> Option<usize> {
        if !self.open {
            return None;
        }
        self.gallery.go_to(index)
    }

    /// Keyboard binding. Returns whether the key was handled.
    pub fn on_key(&mut self, key: LightboxKey, now: Instant) -> bool {
        if !self.open {
            return false;
        }
        match key {
            LightboxKey::Escape => self.close(now),
            LightboxKey::ArrowLeft => {
                self.prev();
            }
            LightboxKey::ArrowRight => {
                self.next();
            }
        }
        true
    }

    // ========== Touch ==========

    pub fn touch_start(&mut self, x: f32) {
        if !self.open {
            return;
        }
        self.touch_start_x = Some(x);
        self.pause.pause();
    }

    /// Finger lifted at `x` (`None` when the platform lost track of it).
    /// Only horizontal travel is considered.
    pub fn touch_end(&mut self, x: Option<f32>, now: Instant) -> Option<usize> {
        let (Some(start), Some(end)) = (self.touch_start_x.take(), x) else {
            self.pause.clear();
            return None;
        };

        let dx = end - start;
        let moved = if dx > self.swipe.threshold_px {
            self.prev()
        } else if dx < -self.swipe.threshold_px {
            self.next()
        } else {
            None
        };

        self.pause.resume_after(now, self.swipe.cooldown);
        moved
    }

    // ========== Pointer drag ==========

    pub fn press(&mut self, x: f32, width: f32) -> bool {
        if !self.open {
            return false;
        }
        let started = self.gallery.press(x, width);
        if started {
            self.pause.pause();
        }
        started
    }

    pub fn drag_to(&mut self, x: f32, width: f32) -> Option<usize> {
        self.gallery.drag_to(x, width)
    }

    pub fn release(&mut self, now: Instant) -> Option<Snap> {
        let snap = self.gallery.release()?;
        self.pause.resume_after(now, self.config.resume_cooldown);
        Some(snap)
    }

    pub fn cancel(&mut self, now: Instant) -> Option<Snap> {
        let snap = self.gallery.cancel()?;
        self.pause.resume_after(now, self.config.resume_cooldown);
        Some(snap)
    }

    pub fn resize(&mut self) {
        self.gallery.resize();
    }

    /// Step the slide transition and the close fade
    pub fn advance(&mut self, now: Instant) -> bool {
        let fading = match self.teardown_at {
            Some(deadline) => {
                let left = deadline.saturating_duration_since(now);
                self.fade = left.as_secs_f32() / TEARDOWN_DELAY.as_secs_f32();
                !left.is_zero()
            }
            None => false,
        };
        let moving = self.gallery.advance(now);
        moving || fading
    }

    /// Whether per-frame redraws are needed
    pub fn is_active(&self) -> bool {
        self.gallery.is_animating() || self.gallery.is_dragging() || self.teardown_at.is_some()
    }

    /// Timer tick: finishes a pending teardown and runs autoplay.
    /// Returns whether visible state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(deadline) = self.teardown_at {
            if now >= deadline {
                self.teardown_at = None;
                self.fade = 0.0;
                self.gallery = Gallery::new(Vec::new(), &self.config);
                self.touch_start_x = None;
                self.pause.clear();
                return true;
            }
        }

        if !self.open || self.gallery.len() <= 1 {
            return false;
        }
        if !self.autoplay.due(now) || self.pause.is_paused(now) {
            return false;
        }
        self.gallery.autoplay_step().is_some()
    }
}
