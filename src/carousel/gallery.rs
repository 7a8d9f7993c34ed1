/// Slide position model, transform renderer and step navigation
///
/// A `Gallery` owns the committed index and the offset that the view should
/// draw. The committed offset jumps immediately; the rendered offset eases
/// toward it over the surface transition so that a press mid-transition can
/// resume from what is actually on screen.

use std::time::{Duration, Instant};

use super::drag::{self, DragSession};
use super::{EdgePolicy, SurfaceConfig};

/// Rendered and committed offsets closer than this are considered equal
const OFFSET_EPSILON: f32 = 0.01;

/// Outcome of ending a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snap {
    /// Index committed by the snap
    pub index: usize,
    /// The pointer barely moved: the host may treat it as a click
    pub tap: bool,
}

/// Which slides are on screen for the current rendered offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleSlides {
    /// Slide at the left edge, `None` when the track is dragged past its start
    pub leading: Option<usize>,
    /// Slide entering from the right, `None` at rest or past the end
    pub trailing: Option<usize>,
    /// Portion of the leading slide already scrolled out (0.0 to 1.0)
    pub fraction: f32,
}

#[derive(Debug, Clone, Copy)]
struct Motion {
    from: f32,
    to: f32,
    duration: Duration,
    started: Option<Instant>,
}

/// One carousel instance
#[derive(Debug, Clone)]
pub struct Gallery {
    slides: Vec<String>,
    index: usize,
    /// Offset of the committed index, in percent of one slide
    offset: f32,
    /// Offset currently drawn
    rendered: f32,
    motion: Option<Motion>,
    policy: EdgePolicy,
    transition: Duration,
    hovered: bool,
    drag: Option<DragSession>,
}

impl Gallery {
    pub fn new(slides: Vec<String>, config: &SurfaceConfig) -> Self {
        Self {
            slides,
            index: 0,
            offset: 0.0,
            rendered: 0.0,
            motion: None,
            policy: config.policy,
            transition: config.transition,
            hovered: false,
            drag: None,
        }
    }

    /// Start at `index`, clamped into range, without a transition
    pub fn with_index(mut self, index: usize) -> Self {
        if !self.slides.is_empty() {
            self.index = index.min(self.slides.len() - 1);
        }
        self.snap_immediately();
        self
    }

    pub fn slides(&self) -> &[String] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Committed index
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Index for indicator dots: the live preview while dragging, otherwise
    /// the committed index.
    pub fn display_index(&self) -> usize {
        self.preview_index().unwrap_or(self.index)
    }

    /// Nearest slide under the finger during a drag. Never committed.
    pub fn preview_index(&self) -> Option<usize> {
        let session = self.drag.as_ref()?;
        let nearest = drag::nearest_slide(session.live_offset, session.direction());
        self.policy.resolve(nearest, self.slides.len())
    }

    /// Offset currently drawn, in percent of one slide
    pub fn current_offset(&self) -> f32 {
        self.rendered
    }

    pub fn is_animating(&self) -> bool {
        self.motion.is_some()
    }

    /// Commit `index` after applying the edge policy. No-op on an empty gallery.
    pub fn set_active_index(&mut self, index: i64) -> Option<usize> {
        let resolved = self.policy.resolve(index, self.slides.len())?;
        self.commit(resolved);
        Some(resolved)
    }

    pub fn step_by(&mut self, delta: i64) -> Option<usize> {
        if self.slides.is_empty() {
            return None;
        }
        self.set_active_index(self.index as i64 + delta)
    }

    pub fn go_to(&mut self, index: usize) -> Option<usize> {
        self.set_active_index(index as i64)
    }

    /// Autoplay advance. Always wraps, whatever the surface policy, and
    /// refuses while the user hovers or drags.
    pub fn autoplay_step(&mut self) -> Option<usize> {
        if self.hovered || self.drag.is_some() || self.slides.len() <= 1 {
            return None;
        }
        let next = (self.index + 1) % self.slides.len();
        self.commit(next);
        Some(next)
    }

    /// Replace the slide sequence, keeping the committed index in range.
    pub fn set_slides(&mut self, slides: Vec<String>) {
        self.slides = slides;
        if self.slides.is_empty() {
            self.index = 0;
            self.drag = None;
            self.snap_immediately();
            return;
        }

        let last = self.slides.len() - 1;
        self.index = self.index.min(last);
        match self.drag.as_mut() {
            Some(session) => {
                let anchor = session.start_index.min(last);
                self.rendered += session.rebase(anchor, last);
            }
            None => self.snap_immediately(),
        }
    }

    /// Redraw from the committed index after the surface changed size.
    ///
    /// An in-flight drag keeps its session, but the displayed offset goes
    /// back to the committed slide until the pointer moves again.
    pub fn resize(&mut self) {
        self.snap_immediately();
    }

    /// Step the eased transition. Returns whether it is still running.
    pub fn advance(&mut self, now: Instant) -> bool {
        let Some(motion) = self.motion.as_mut() else {
            return false;
        };

        let started = *motion.started.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started);
        if elapsed >= motion.duration {
            self.rendered = motion.to;
            self.motion = None;
            return false;
        }

        let t = elapsed.as_secs_f32() / motion.duration.as_secs_f32();
        self.rendered = motion.from + (motion.to - motion.from) * ease_out(t);
        true
    }

    // ========== Drag ==========

    /// Primary-button press over the gallery surface.
    ///
    /// Returns false when nothing can be dragged or a drag is already running.
    pub fn press(&mut self, x: f32, width: f32) -> bool {
        if self.slides.is_empty() || self.drag.is_some() {
            return false;
        }
        self.motion = None;
        self.drag = Some(DragSession::begin(x, width, self.index, self.rendered));
        true
    }

    /// Pointer moved during a drag; applies the live offset without a
    /// transition and returns the preview index.
    pub fn drag_to(&mut self, x: f32, width: f32) -> Option<usize> {
        let session = self.drag.as_mut()?;
        self.rendered = session.update(x, width);
        self.preview_index()
    }

    /// Pointer released: snap the rendered offset to the nearest slide.
    pub fn release(&mut self) -> Option<Snap> {
        self.finish_drag(true)
    }

    /// Pointer capture lost or surface gone mid-drag. Snaps like a release
    /// using the last known position, but never reports a tap.
    pub fn cancel(&mut self) -> Option<Snap> {
        self.finish_drag(false)
    }

    fn finish_drag(&mut self, allow_tap: bool) -> Option<Snap> {
        let session = self.drag.take()?;
        let direction = self.rendered - session.start_offset;
        let nearest = drag::nearest_slide(self.rendered, direction);
        let index = self.policy.resolve(nearest, self.slides.len())?;
        self.commit(index);
        Some(Snap {
            index,
            tap: allow_tap && session.is_tap(),
        })
    }

    // ========== Transform renderer ==========

    /// Slides intersecting the viewport at the rendered offset.
    pub fn visible_slides(&self) -> Option<VisibleSlides> {
        if self.slides.is_empty() {
            return None;
        }

        let position = self.current_offset() / 100.0;
        let floor = position.floor();
        let mut fraction = position - floor;
        if fraction < OFFSET_EPSILON / 100.0 {
            fraction = 0.0;
        }

        let slot = |i: f32| -> Option<usize> {
            (i >= 0.0 && (i as usize) < self.slides.len()).then_some(i as usize)
        };

        Some(VisibleSlides {
            leading: slot(floor),
            trailing: if fraction > 0.0 { slot(floor + 1.0) } else { None },
            fraction,
        })
    }

    fn commit(&mut self, index: usize) {
        self.index = index;
        self.offset = index as f32 * 100.0;

        if self.transition.is_zero() || (self.rendered - self.offset).abs() < OFFSET_EPSILON {
            self.rendered = self.offset;
            self.motion = None;
        } else {
            self.motion = Some(Motion {
                from: self.rendered,
                to: self.offset,
                duration: self.transition,
                started: None,
            });
        }
    }

    fn snap_immediately(&mut self) {
        self.offset = self.index as f32 * 100.0;
        self.rendered = self.offset;
        self.motion = None;
    }
}

/// Cubic ease-out, close to the CSS `ease` curve
fn ease_out(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}
