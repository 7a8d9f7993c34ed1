/// Pointer drag session and snap arithmetic
///
/// Offsets are expressed in percent of one slide width: slide `n` at rest
/// sits at `n * 100`. A drag moves the offset opposite to the pointer, so
/// dragging left reveals the next slide.

/// Pointer travel below this many pixels counts as a click, not a drag
pub const TAP_SLOP_PX: f32 = 4.0;

/// Offsets this close to a half slide are treated as an exact tie
const TIE_EPSILON: f32 = 1e-4;

/// Transient state between pointer-down and pointer-up on one gallery
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Pointer X at press time, in surface coordinates
    pub start_x: f32,
    /// Committed index when the drag began
    pub start_index: usize,
    /// Rendered offset when the drag began (may be mid-transition)
    pub start_offset: f32,
    /// Offset currently shown while the finger moves
    pub live_offset: f32,
    /// Last pointer X seen
    pub last_x: f32,
    /// Surface width used to turn pixels into percent
    pub width: f32,
}

impl DragSession {
    pub fn begin(x: f32, width: f32, start_index: usize, start_offset: f32) -> Self {
        Self {
            start_x: x,
            start_index,
            start_offset,
            live_offset: start_offset,
            last_x: x,
            width: sanitize_width(width),
        }
    }

    /// Move the pointer to `x` and return the new live offset
    pub fn update(&mut self, x: f32, width: f32) -> f32 {
        self.width = sanitize_width(width);
        self.last_x = x;
        let delta_percent = (x - self.start_x) / self.width * 100.0;
        self.live_offset = self.start_offset - delta_percent;
        self.live_offset
    }

    /// Move the session onto slide `index` of a shorter sequence, keeping the
    /// finger at the same spot relative to its slide. `last` is the highest
    /// valid index. Returns the shift applied to every offset, in percent.
    pub fn rebase(&mut self, index: usize, last: usize) -> f32 {
        let index_shift = (index as f32 - self.start_index as f32) * 100.0;
        let start = (self.start_offset + index_shift).clamp(0.0, last as f32 * 100.0);
        let shift = start - self.start_offset;

        self.start_index = index;
        self.start_offset = start;
        self.live_offset += shift;
        shift
    }

    /// Sign of the offset change since the press: positive when heading
    /// toward higher slide indices
    pub fn direction(&self) -> f32 {
        self.live_offset - self.start_offset
    }

    /// Whether the pointer barely moved, making this a click
    pub fn is_tap(&self) -> bool {
        (self.last_x - self.start_x).abs() < TAP_SLOP_PX
    }
}

/// Widths that are zero, negative or not finite become 1 to keep the
/// percent math defined.
pub fn sanitize_width(width: f32) -> f32 {
    if width.is_finite() && width > 0.0 {
        width
    } else {
        1.0
    }
}

/// Nearest whole slide for an offset given in percent.
///
/// An exact half slide goes toward `direction` (positive means higher
/// indices). The result is unbounded; the caller applies its edge policy.
pub fn nearest_slide(offset_percent: f32, direction: f32) -> i64 {
    let slides = offset_percent / 100.0;
    let floor = slides.floor();
    let remainder = slides - floor;

    let round_up = if (remainder - 0.5).abs() <= TIE_EPSILON {
        direction >= 0.0
    } else {
        remainder > 0.5
    };

    floor as i64 + i64::from(round_up)
}
