//! Frame timing
//!
//! The scene's `update` walk takes a [`Duration`]; this timer produces one per
//! frame, either from the wall clock or from a fixed step for headless runs.

use std::time::{Duration, Instant};

/// Source of per-frame delta times
#[derive(Debug, Clone, Copy)]
enum Clock {
    Wall { last_frame: Instant },
    Fixed { step: Duration },
}

/// Frame timer producing the `dt` handed to the update walk
#[derive(Debug, Clone)]
pub struct Timer {
    clock: Clock,
    delta: Duration,
    total: Duration,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a wall-clock timer starting now
    pub fn new() -> Self {
        Self::with_clock(Clock::Wall {
            last_frame: Instant::now(),
        })
    }

    /// Create a timer that advances by `step` on every tick
    pub fn fixed(step: Duration) -> Self {
        Self::with_clock(Clock::Fixed { step })
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            delta: Duration::ZERO,
            total: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance one frame and return its delta
    pub fn tick(&mut self) -> Duration {
        self.delta = match &mut self.clock {
            Clock::Wall { last_frame } => {
                let now = Instant::now();
                let elapsed = now.duration_since(*last_frame);
                *last_frame = now;
                elapsed
            }
            Clock::Fixed { step } => *step,
        };
        self.total += self.delta;
        self.frame_count += 1;
        self.delta
    }

    /// Delta of the last tick
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Sum of all deltas so far
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frames per second since creation
    pub fn average_fps(&self) -> f32 {
        let total = self.total.as_secs_f32();
        if total > 0.0 {
            self.frame_count as f32 / total
        } else {
            0.0
        }
    }
}
