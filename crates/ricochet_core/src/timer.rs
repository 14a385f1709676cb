//! One-shot frame timers
//!
//! Timers are advanced by the frame loop rather than a clock callback, so
//! expiry is observed at the start of the next tick.

/// A countdown that reports when it runs out
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTimer {
    duration: f32,
    remaining: f32,
    active: bool,
}

impl FrameTimer {
    /// An idle timer with the given duration in seconds
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: 0.0,
            active: false,
        }
    }

    /// Start (or restart) the countdown
    pub fn start(&mut self) {
        self.remaining = self.duration;
        self.active = self.duration > 0.0;
    }

    /// Advance by `dt`; returns `true` on the tick the timer expires
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.active = false;
            self.remaining = 0.0;
            return true;
        }
        false
    }

    /// Whether the countdown is still running
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}
