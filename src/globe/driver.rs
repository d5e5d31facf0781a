//! Frame pacing and per-tick animation state.

use super::view::{RenderMode, ViewState};
use std::time::{Duration, Instant};

/// Entry fade-in per frame; reaches 1 after about 67 frames.
pub const ENTRY_STEP: f64 = 0.015;
/// Idle spin per frame, radians (sphere) or dots (flat).
pub const AUTO_ROTATE_SPHERE: f64 = 0.002;
pub const AUTO_PAN_FLAT: f64 = 0.5;
/// Marker pulse phase per frame.
pub const PULSE_RATE: f64 = 0.06;
/// 60 frames per second.
pub const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Liveness, entry fade and frame counter for one globe.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    frame: u64,
    entry_progress: f64,
    reduced_motion: bool,
    auto_rotate: bool,
    paused: bool,
    alive: bool,
    rendered_once: bool,
}

impl AnimationDriver {
    pub fn new(reduced_motion: bool, auto_rotate: bool) -> Self {
        Self {
            frame: 0,
            entry_progress: if reduced_motion { 1.0 } else { 0.0 },
            reduced_motion,
            auto_rotate,
            paused: false,
            alive: true,
            rendered_once: false,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn entry_progress(&self) -> f64 {
        self.entry_progress
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Marker animation clock.
    pub fn pulse_time(&self) -> f64 {
        self.frame as f64 * PULSE_RATE
    }

    pub fn auto_step(&self, mode: RenderMode) -> f64 {
        if self.reduced_motion || self.paused || !self.auto_rotate {
            return 0.0;
        }
        match mode {
            RenderMode::Sphere => AUTO_ROTATE_SPHERE,
            RenderMode::Flat => AUTO_PAN_FLAT,
        }
    }

    /// Whether this tick should do any work. Reduced motion gets exactly
    /// one frame; a dead driver gets none.
    pub fn begin_tick(&self) -> bool {
        self.alive && !(self.reduced_motion && self.rendered_once)
    }

    /// Steps 1 and 2 of a tick: idle motion (skipped while dragging) and
    /// the entry fade. Returns whether particles should advance.
    pub fn advance(&mut self, view: &mut ViewState, dragging: bool, map_width: f64) -> bool {
        if !self.reduced_motion && !self.paused {
            self.frame += 1;
        }
        if self.entry_progress < 1.0 {
            self.entry_progress = (self.entry_progress + ENTRY_STEP).min(1.0);
        }
        if !dragging {
            view.coast(self.auto_step(view.mode()), map_width);
        }
        !self.reduced_motion && !self.paused
    }

    /// Record that a frame was painted; true when another tick is wanted.
    pub fn finish_tick(&mut self) -> bool {
        self.rendered_once = true;
        self.alive && !self.reduced_motion
    }
}

/// Fixed-rate frame deadlines for a poll-driven loop.
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    next: Instant,
}

impl FrameClock {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self { interval, next: now }
    }

    /// How long an event poll may block before the next frame is due.
    pub fn timeout(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// True when a frame is due; schedules the following one. A loop that
    /// fell behind skips the missed frames instead of bursting.
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }
}
