//! Auto-rotation state for the event banner and the curation slider.
//!
//! Each armed timer carries the generation it was armed under. Pausing,
//! manual selection and stopping bump the generation, so a tick or resume
//! that was already in flight is recognised as stale and dropped.

use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carousel {
    len: usize,
    index: usize,
    running: bool,
    paused: bool,
    generation: u64,
}

impl Carousel {
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self {
            len,
            index: 0,
            running: false,
            paused: false,
            generation: 0,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// A single item never rotates.
    #[must_use]
    pub const fn is_rotating(&self) -> bool {
        self.len > 1 && self.running && !self.paused
    }

    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        if self.len == 0 {
            None
        } else {
            Some(self.index)
        }
    }

    /// Returns the generation to arm the first tick with, or `None` when
    /// there is nothing to rotate.
    pub fn start(&mut self) -> Option<u64> {
        if self.len <= 1 {
            return None;
        }
        self.running = true;
        self.paused = false;
        self.bump()
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.paused = false;
        self.generation += 1;
    }

    /// Advances one slot, wrapping. Returns the generation to re-arm with.
    pub fn tick(&mut self, generation: u64) -> Option<u64> {
        if generation != self.generation || !self.is_rotating() {
            trace!(generation, current = self.generation, "Dropped stale carousel tick");
            return None;
        }
        self.index = (self.index + 1) % self.len;
        Some(self.generation)
    }

    /// Manual selection. Restarts the rotation interval when rotating.
    pub fn select(&mut self, index: usize) -> Option<u64> {
        if index >= self.len {
            return None;
        }
        self.index = index;
        self.generation += 1;
        self.is_rotating().then_some(self.generation)
    }

    /// Also cancels a pending resume. Returns false when not running.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.paused = true;
        self.generation += 1;
        true
    }

    /// Generation for the delayed resume timer.
    pub fn schedule_resume(&mut self) -> Option<u64> {
        if !self.running || !self.paused {
            return None;
        }
        self.generation += 1;
        Some(self.generation)
    }

    /// Returns the generation for the next tick.
    pub fn resume(&mut self, generation: u64) -> Option<u64> {
        if generation != self.generation || !self.paused {
            return None;
        }
        self.paused = false;
        self.bump()
    }

    fn bump(&mut self) -> Option<u64> {
        self.generation += 1;
        Some(self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_wrap_around() {
        let mut carousel = Carousel::new(3);
        let gen = carousel.start().unwrap();
        assert_eq!(carousel.tick(gen), Some(gen));
        assert_eq!(carousel.tick(gen), Some(gen));
        assert_eq!(carousel.current(), Some(2));
        carousel.tick(gen);
        assert_eq!(carousel.current(), Some(0));
    }

    #[test]
    fn test_single_item_is_inactive() {
        let mut carousel = Carousel::new(1);
        assert_eq!(carousel.start(), None);
        assert!(!carousel.is_rotating());
        assert_eq!(carousel.current(), Some(0));
        assert_eq!(Carousel::new(0).current(), None);
    }

    #[test]
    fn test_stop_invalidates_pending_tick() {
        let mut carousel = Carousel::new(3);
        let gen = carousel.start().unwrap();
        carousel.stop();
        assert_eq!(carousel.tick(gen), None);
        assert_eq!(carousel.current(), Some(0));
    }

    #[test]
    fn test_manual_select_restarts_interval() {
        let mut carousel = Carousel::new(3);
        let old = carousel.start().unwrap();
        let new = carousel.select(2).unwrap();
        assert_ne!(old, new);
        assert_eq!(carousel.tick(old), None);
        assert_eq!(carousel.current(), Some(2));
        assert_eq!(carousel.tick(new), Some(new));
        assert_eq!(carousel.current(), Some(0));
    }

    #[test]
    fn test_out_of_range_select_is_ignored() {
        let mut carousel = Carousel::new(2);
        carousel.start();
        assert_eq!(carousel.select(5), None);
        assert_eq!(carousel.current(), Some(0));
    }

    #[test]
    fn test_pause_then_resume_after_delay() {
        let mut carousel = Carousel::new(3);
        let gen = carousel.start().unwrap();

        assert!(carousel.pause());
        assert_eq!(carousel.tick(gen), None);

        let resume_gen = carousel.schedule_resume().unwrap();
        let next = carousel.resume(resume_gen).unwrap();
        assert!(carousel.is_rotating());
        assert_eq!(carousel.tick(next), Some(next));
        assert_eq!(carousel.current(), Some(1));
    }

    #[test]
    fn test_touch_during_resume_delay_cancels_resume() {
        let mut carousel = Carousel::new(3);
        carousel.start();
        carousel.pause();
        let first_resume = carousel.schedule_resume().unwrap();

        // second touch before the delay elapsed
        assert!(carousel.pause());
        assert_eq!(carousel.resume(first_resume), None);
        assert!(carousel.is_paused());
    }
}
