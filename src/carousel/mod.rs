/// Carousel engine shared by every gallery surface
///
/// One implementation drives the catalog grid cards, the admin list and the
/// full-screen lightbox. Surfaces differ only by their `SurfaceConfig`.
///
/// - `gallery.rs` - slide position model, transform renderer, step navigation
/// - `drag.rs` - pointer drag session and snap arithmetic
/// - `autoplay.rs` - autoplay timer and the "paused by user" latch
/// - `registry.rs` - instances keyed by stable entry identity
/// - `lightbox.rs` - full-screen single-image orchestrator

pub mod autoplay;
pub mod drag;
pub mod gallery;
pub mod lightbox;
pub mod registry;

pub use gallery::Gallery;
pub use lightbox::{Lightbox, LightboxKey};
pub use registry::{GalleryKey, GalleryRegistry};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Navigation policy at sequence boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Stepping past either end cycles to the opposite end
    #[default]
    Wrap,
    /// Stepping stops at the first and last slide
    Clamp,
}

impl EdgePolicy {
    /// Bring `index` into `[0, count - 1]`.
    ///
    /// Returns `None` for an empty sequence, where every navigation is a no-op.
    pub fn resolve(self, index: i64, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let last = count as i64 - 1;
        let resolved = match self {
            EdgePolicy::Wrap => index.rem_euclid(count as i64),
            EdgePolicy::Clamp => index.clamp(0, last),
        };
        Some(resolved as usize)
    }
}

/// Per-surface tuning of one carousel flavour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    pub policy: EdgePolicy,
    /// Time between autoplay advances
    pub autoplay_interval: Duration,
    /// How long autoplay stays paused after the user lets go of a drag
    pub resume_cooldown: Duration,
    /// Width over height of one slide
    pub aspect_ratio: f32,
    /// Duration of the eased move to a committed slide
    pub transition: Duration,
}

impl SurfaceConfig {
    /// Catalog grid cards
    pub const fn grid() -> Self {
        Self {
            policy: EdgePolicy::Wrap,
            autoplay_interval: Duration::from_millis(1000),
            resume_cooldown: Duration::from_millis(500),
            aspect_ratio: 16.0 / 9.0,
            transition: Duration::from_millis(300),
        }
    }

    /// Full-screen lightbox
    pub const fn lightbox() -> Self {
        Self {
            policy: EdgePolicy::Wrap,
            autoplay_interval: Duration::from_millis(1500),
            resume_cooldown: Duration::from_millis(1200),
            aspect_ratio: 16.0 / 9.0,
            transition: Duration::from_millis(300),
        }
    }

    /// Admin dashboard list
    pub const fn admin() -> Self {
        Self {
            policy: EdgePolicy::Wrap,
            autoplay_interval: Duration::from_millis(1000),
            resume_cooldown: Duration::from_millis(500),
            aspect_ratio: 16.0 / 9.0,
            transition: Duration::from_millis(300),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_cycles_both_directions() {
        for count in [1usize, 2, 5] {
            for start in 0..count as i64 {
                for n in -12i64..=12 {
                    let expected = (start + n).rem_euclid(count as i64) as usize;
                    assert_eq!(EdgePolicy::Wrap.resolve(start + n, count), Some(expected));
                }
            }
        }
    }

    #[test]
    fn test_clamp_stops_at_boundaries() {
        assert_eq!(EdgePolicy::Clamp.resolve(-3, 4), Some(0));
        assert_eq!(EdgePolicy::Clamp.resolve(2, 4), Some(2));
        assert_eq!(EdgePolicy::Clamp.resolve(9, 4), Some(3));
    }

    #[test]
    fn test_empty_sequence_resolves_to_nothing() {
        assert_eq!(EdgePolicy::Wrap.resolve(0, 0), None);
        assert_eq!(EdgePolicy::Clamp.resolve(1, 0), None);
    }
}
