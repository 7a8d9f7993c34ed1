/// Registry of mounted gallery instances for one surface
///
/// Instances are keyed by the identity of the entry they show, never by
/// their position in a filtered list, so reordering or filtering the catalog
/// keeps each card's slide position.

use std::collections::HashMap;
use std::time::Instant;

use super::autoplay::{Autoplay, PauseLatch};
use super::gallery::{Gallery, Snap};
use super::SurfaceConfig;

/// Stable identity of a gallery instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GalleryKey {
    /// Entry with a server-assigned id
    Entry(i64),
    /// Entry without an id, identified by its URL
    Url(String),
}

#[derive(Debug)]
pub struct GalleryRegistry {
    config: SurfaceConfig,
    galleries: HashMap<GalleryKey, Gallery>,
    pauses: HashMap<GalleryKey, PauseLatch>,
    autoplay: Autoplay,
}

impl GalleryRegistry {
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            config,
            galleries: HashMap::new(),
            pauses: HashMap::new(),
            autoplay: Autoplay::new(config.autoplay_interval),
        }
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn is_empty(&self) -> bool {
        self.galleries.is_empty()
    }

    pub fn get(&self, key: &GalleryKey) -> Option<&Gallery> {
        self.galleries.get(key)
    }

    /// Create or refresh the instance for `key`.
    ///
    /// A sequence with no images is not a gallery: any existing instance is
    /// unmounted and `false` is returned.
    pub fn mount(&mut self, key: GalleryKey, slides: Vec<String>) -> bool {
        if slides.is_empty() {
            self.unmount(&key);
            return false;
        }

        match self.galleries.get_mut(&key) {
            Some(gallery) => {
                if gallery.slides() != slides.as_slice() {
                    gallery.set_slides(slides);
                }
            }
            None => {
                log::trace!("Mounting gallery {:?} with {} slides", key, slides.len());
                self.galleries.insert(key, Gallery::new(slides, &self.config));
            }
        }
        true
    }

    /// Drop an instance. Any drag in progress goes with it.
    pub fn unmount(&mut self, key: &GalleryKey) -> Option<Gallery> {
        self.pauses.remove(key);
        self.galleries.remove(key)
    }

    /// Mount exactly the given instances and unmount every other one
    pub fn sync<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = (GalleryKey, Vec<String>)>,
    {
        let mut keep = Vec::new();
        for (key, slides) in items {
            if self.mount(key.clone(), slides) {
                keep.push(key);
            }
        }

        let stale: Vec<GalleryKey> = self
            .galleries
            .keys()
            .filter(|key| !keep.contains(key))
            .cloned()
            .collect();
        for key in stale {
            self.unmount(&key);
        }
    }

    pub fn set_hovered(&mut self, key: &GalleryKey, hovered: bool) {
        if let Some(gallery) = self.galleries.get_mut(key) {
            gallery.set_hovered(hovered);
        }
    }

    pub fn step_by(&mut self, key: &GalleryKey, delta: i64) -> Option<usize> {
        self.galleries.get_mut(key)?.step_by(delta)
    }

    pub fn go_to(&mut self, key: &GalleryKey, index: usize) -> Option<usize> {
        self.galleries.get_mut(key)?.go_to(index)
    }

    pub fn press(&mut self, key: &GalleryKey, x: f32, width: f32) -> bool {
        let Some(gallery) = self.galleries.get_mut(key) else {
            return false;
        };
        let started = gallery.press(x, width);
        if started {
            self.pauses.entry(key.clone()).or_default().pause();
        }
        started
    }

    pub fn drag_to(&mut self, key: &GalleryKey, x: f32, width: f32) -> Option<usize> {
        self.galleries.get_mut(key)?.drag_to(x, width)
    }

    pub fn release(&mut self, key: &GalleryKey, now: Instant) -> Option<Snap> {
        let snap = self.galleries.get_mut(key)?.release()?;
        self.cool_down(key, now);
        Some(snap)
    }

    pub fn cancel(&mut self, key: &GalleryKey, now: Instant) -> Option<Snap> {
        let snap = self.galleries.get_mut(key)?.cancel()?;
        self.cool_down(key, now);
        Some(snap)
    }

    /// End every drag in flight, e.g. when the window loses the pointer
    pub fn cancel_all(&mut self, now: Instant) {
        let dragging: Vec<GalleryKey> = self
            .galleries
            .iter()
            .filter(|(_, gallery)| gallery.is_dragging())
            .map(|(key, _)| key.clone())
            .collect();
        for key in dragging {
            self.cancel(&key, now);
        }
    }

    /// Redraw every instance from its committed index
    pub fn resize_all(&mut self) {
        for gallery in self.galleries.values_mut() {
            gallery.resize();
        }
    }

    /// Step running transitions. Returns whether any is still moving.
    pub fn advance(&mut self, now: Instant) -> bool {
        let mut moving = false;
        for gallery in self.galleries.values_mut() {
            moving |= gallery.advance(now);
        }
        moving
    }

    /// Whether anything needs per-frame redraws
    pub fn is_active(&self) -> bool {
        self.galleries
            .values()
            .any(|gallery| gallery.is_animating() || gallery.is_dragging())
    }

    /// Shared autoplay tick. Returns how many instances advanced.
    pub fn tick(&mut self, now: Instant) -> usize {
        if self.is_empty() || !self.autoplay.due(now) {
            return 0;
        }

        let mut advanced = 0;
        for (key, gallery) in self.galleries.iter_mut() {
            let paused = self
                .pauses
                .get(key)
                .is_some_and(|latch| latch.is_paused(now));
            if paused {
                continue;
            }
            // Checked right before acting: dragging and hovered block the step
            if gallery.autoplay_step().is_some() {
                advanced += 1;
            }
        }
        advanced
    }

    fn cool_down(&mut self, key: &GalleryKey, now: Instant) {
        self.pauses
            .entry(key.clone())
            .or_default()
            .resume_after(now, self.config.resume_cooldown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn slides(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("photo-{i}.png")).collect()
    }

    fn registry() -> GalleryRegistry {
        GalleryRegistry::new(SurfaceConfig::grid())
    }

    #[test]
    fn test_empty_sequence_is_not_mounted() {
        let mut reg = registry();
        assert!(!reg.mount(GalleryKey::Entry(1), Vec::new()));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remount_keeps_position() {
        let mut reg = registry();
        let key = GalleryKey::Url("https://a.test".into());
        reg.mount(key.clone(), slides(4));
        reg.go_to(&key, 3);
        reg.mount(key.clone(), slides(4));
        assert_eq!(reg.get(&key).unwrap().index(), 3);

        reg.mount(key.clone(), slides(2));
        assert_eq!(reg.get(&key).unwrap().index(), 1);
    }

    #[test]
    fn test_sync_unmounts_filtered_out_entries() {
        let mut reg = registry();
        reg.sync(vec![
            (GalleryKey::Entry(1), slides(2)),
            (GalleryKey::Entry(2), slides(3)),
        ]);
        reg.go_to(&GalleryKey::Entry(2), 2);

        reg.sync(vec![(GalleryKey::Entry(2), slides(3))]);
        assert!(reg.get(&GalleryKey::Entry(1)).is_none());
        assert_eq!(reg.get(&GalleryKey::Entry(2)).unwrap().index(), 2);
    }

    #[test]
    fn test_tick_never_advances_a_dragged_gallery() {
        let start = Instant::now();
        let mut reg = registry();
        let dragged = GalleryKey::Entry(1);
        let idle = GalleryKey::Entry(2);
        reg.mount(dragged.clone(), slides(3));
        reg.mount(idle.clone(), slides(3));

        assert_eq!(reg.tick(start), 0);
        assert!(reg.press(&dragged, 50.0, 300.0));

        let advanced = reg.tick(start + Duration::from_millis(1000));
        assert_eq!(advanced, 1);
        assert_eq!(reg.get(&dragged).unwrap().index(), 0);
        assert_eq!(reg.get(&idle).unwrap().index(), 1);
    }

    #[test]
    fn test_cooldown_after_release() {
        let start = Instant::now();
        let mut reg = registry();
        let key = GalleryKey::Entry(7);
        reg.mount(key.clone(), slides(3));
        reg.tick(start);

        reg.press(&key, 10.0, 300.0);
        reg.release(&key, start + Duration::from_millis(800));

        assert_eq!(reg.tick(start + Duration::from_millis(1000)), 0);
        assert_eq!(reg.tick(start + Duration::from_millis(2000)), 1);
    }

    #[test]
    fn test_release_without_drag_keeps_autoplay_running() {
        let start = Instant::now();
        let mut reg = registry();
        let key = GalleryKey::Entry(8);
        reg.mount(key.clone(), slides(3));
        reg.tick(start);

        let released = start + Duration::from_millis(900);
        assert_eq!(reg.release(&key, released), None);
        assert_eq!(reg.cancel(&key, released), None);
        assert_eq!(reg.tick(start + Duration::from_millis(1000)), 1);
        assert_eq!(reg.get(&key).unwrap().index(), 1);
    }

    #[test]
    fn test_hovered_gallery_is_skipped() {
        let start = Instant::now();
        let mut reg = registry();
        let key = GalleryKey::Entry(3);
        reg.mount(key.clone(), slides(2));
        reg.set_hovered(&key, true);
        reg.tick(start);
        assert_eq!(reg.tick(start + Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_resize_all_restores_committed_offsets() {
        let mut reg = registry();
        let key = GalleryKey::Entry(9);
        reg.mount(key.clone(), slides(3));
        reg.press(&key, 300.0, 300.0);
        reg.drag_to(&key, 100.0, 300.0);

        reg.resize_all();
        assert_eq!(reg.get(&key).unwrap().current_offset(), 0.0);
    }

    #[test]
    fn test_cancel_all_ends_drags() {
        let mut reg = registry();
        let key = GalleryKey::Entry(4);
        reg.mount(key.clone(), slides(3));
        reg.press(&key, 300.0, 300.0);
        reg.drag_to(&key, 60.0, 300.0);

        reg.cancel_all(Instant::now());
        let gallery = reg.get(&key).unwrap();
        assert!(!gallery.is_dragging());
        assert_eq!(gallery.index(), 1);
    }
}
