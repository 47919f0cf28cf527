//! Platform abstraction layer
//!
//! The game loop never reads a clock. It asks a `FrameScheduler` for "one
//! more frame" and is called back with the handle it was given:
//! - `ManualScheduler`: frames fire only when a test says so
//! - `IntervalScheduler`: fixed wall-clock interval for headless runs
//! - `web::RafScheduler`: `requestAnimationFrame` in the browser

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

use crate::sim::Playfield;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Identifies one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u32);

/// "Run the loop again before the next repaint" and its cancellation
pub trait FrameScheduler {
    /// Request a single frame callback
    fn request_frame(&mut self) -> FrameHandle;
    /// Cancel a frame that has not fired yet
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Reports the playfield extent in entity units
pub trait PlayfieldSource {
    fn measure(&self) -> Playfield;
}

/// A fixed extent, for headless runs and tests
impl PlayfieldSource for Playfield {
    fn measure(&self) -> Playfield {
        *self
    }
}

/// Step-driven scheduler: frames fire when the caller takes them
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u32,
    outstanding: Vec<FrameHandle>,
    pub requested: u32,
    pub cancelled: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the oldest outstanding frame
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        if self.outstanding.is_empty() {
            None
        } else {
            Some(self.outstanding.remove(0))
        }
    }

    /// Frames requested and neither fired nor cancelled
    pub fn outstanding(&self) -> &[FrameHandle] {
        &self.outstanding
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.outstanding.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.cancelled += 1;
        self.outstanding.retain(|h| *h != handle);
    }
}

/// Fixed-interval scheduler for headless play
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct IntervalScheduler {
    interval: Duration,
    next_id: u32,
    pending: Option<FrameHandle>,
    last_fire: Option<Instant>,
}

#[cfg(not(target_arch = "wasm32"))]
impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_id: 0,
            pending: None,
            last_fire: None,
        }
    }

    /// 60 frames per second
    pub fn sixty_hz() -> Self {
        Self::new(Duration::from_micros(16_667))
    }

    /// Block until the pending frame is due and hand it out.
    ///
    /// Returns None when nothing is armed.
    pub fn wait_next(&mut self) -> Option<FrameHandle> {
        let handle = self.pending.take()?;
        if let Some(last) = self.last_fire {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last_fire = Some(Instant::now());
        Some(handle)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl FrameScheduler for IntervalScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_tracks_outstanding() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.request_frame();
        let b = scheduler.request_frame();
        assert_ne!(a, b);
        assert_eq!(scheduler.outstanding().len(), 2);

        scheduler.cancel_frame(a);
        assert_eq!(scheduler.take_pending(), Some(b));
        assert_eq!(scheduler.take_pending(), None);
        assert_eq!(scheduler.requested, 2);
        assert_eq!(scheduler.cancelled, 1);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_interval_scheduler_cancel() {
        let mut scheduler = IntervalScheduler::new(Duration::from_millis(1));
        let handle = scheduler.request_frame();
        scheduler.cancel_frame(handle);
        assert_eq!(scheduler.wait_next(), None);

        let handle = scheduler.request_frame();
        assert_eq!(scheduler.wait_next(), Some(handle));
        assert_eq!(scheduler.wait_next(), None);
    }

    #[test]
    fn test_fixed_playfield_source() {
        let field = Playfield::new(640.0, 480.0);
        assert_eq!(field.measure(), field);
    }
}
