//! Mount region and lazy initialization.
//!
//! The globe lives inside a rectangle of terminal cells. Construction is
//! deferred until that rectangle overlaps the visible screen, with a
//! fallback timer so a mount that never scrolls into view still starts.

use std::time::{Duration, Instant};

/// Braille dots per terminal cell.
pub const DOTS_X: u16 = 2;
pub const DOTS_Y: u16 = 4;

/// Fraction of the mount that must be on screen to count as visible.
const VISIBLE_THRESHOLD: f64 = 0.1;

/// A rectangle of terminal cells owned by the globe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mount {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Mount {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// The whole screen minus `margin` cells on each side.
    pub fn full_screen(width: u16, height: u16, margin: u16) -> Self {
        Self {
            x: margin,
            y: margin,
            width: width.saturating_sub(margin * 2),
            height: height.saturating_sub(margin * 2),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        let (column, row) = (column as u32, row as u32);
        column >= self.x as u32
            && column < self.x as u32 + self.width as u32
            && row >= self.y as u32
            && row < self.y as u32 + self.height as u32
    }

    /// Canvas size in dots.
    pub fn dot_size(&self) -> (f64, f64) {
        (
            self.width as f64 * DOTS_X as f64,
            self.height as f64 * DOTS_Y as f64,
        )
    }

    /// Centre of a screen cell, in mount-local dots. Cells left of or above
    /// the mount give negative coordinates.
    pub fn cell_to_dots(&self, column: u16, row: u16) -> (f64, f64) {
        let local_x = column as f64 - self.x as f64;
        let local_y = row as f64 - self.y as f64;
        (
            local_x * DOTS_X as f64 + DOTS_X as f64 / 2.0,
            local_y * DOTS_Y as f64 + DOTS_Y as f64 / 2.0,
        )
    }

    /// Fraction of this mount inside a `screen_w` × `screen_h` screen.
    pub fn visible_fraction(&self, screen_w: u16, screen_h: u16) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let right = (self.x as u32 + self.width as u32).min(screen_w as u32);
        let bottom = (self.y as u32 + self.height as u32).min(screen_h as u32);
        let w = right.saturating_sub(self.x as u32);
        let h = bottom.saturating_sub(self.y as u32);
        (w * h) as f64 / (self.width as u32 * self.height as u32) as f64
    }
}

/// Deferred construction gate: opens when the mount overlaps the screen
/// or when the fallback timer expires.
#[derive(Debug)]
pub struct LazyInit {
    deadline: Instant,
    opened: bool,
}

impl LazyInit {
    pub fn new(now: Instant, fallback: Duration) -> Self {
        Self {
            deadline: now + fallback,
            opened: false,
        }
    }

    /// True exactly once: the first call after either open condition holds.
    pub fn try_open(&mut self, mount: &Mount, screen: (u16, u16), now: Instant) -> bool {
        if self.opened {
            return false;
        }
        let visible = mount.visible_fraction(screen.0, screen.1) >= VISIBLE_THRESHOLD;
        if visible || now >= self.deadline {
            self.opened = true;
            tracing::debug!(visible, "lazy init opened");
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mount_is_never_visible() {
        let mount = Mount::full_screen(4, 4, 2);
        assert!(mount.is_empty());
        assert_eq!(mount.visible_fraction(80, 24), 0.0);
    }

    #[test]
    fn partially_offscreen_mount() {
        let mount = Mount::new(60, 0, 40, 10);
        assert!((mount.visible_fraction(80, 24) - 0.5).abs() < 1e-9);
        assert_eq!(Mount::new(90, 0, 10, 10).visible_fraction(80, 24), 0.0);
    }

    #[test]
    fn cell_centres_map_to_dots() {
        let mount = Mount::new(2, 1, 10, 5);
        assert_eq!(mount.cell_to_dots(2, 1), (1.0, 2.0));
        assert_eq!(mount.cell_to_dots(3, 2), (3.0, 6.0));
        assert_eq!(mount.cell_to_dots(0, 0), (-3.0, -2.0));
    }

    #[test]
    fn lazy_init_opens_once_when_visible() {
        let now = Instant::now();
        let mut lazy = LazyInit::new(now, Duration::from_secs(2));
        let mount = Mount::full_screen(80, 24, 0);
        assert!(lazy.try_open(&mount, (80, 24), now));
        assert!(!lazy.try_open(&mount, (80, 24), now));
    }

    #[test]
    fn lazy_init_falls_back_to_timer() {
        let now = Instant::now();
        let mut lazy = LazyInit::new(now, Duration::from_millis(500));
        let offscreen = Mount::new(200, 200, 10, 10);
        assert!(!lazy.try_open(&offscreen, (80, 24), now));
        assert!(lazy.try_open(&offscreen, (80, 24), now + Duration::from_millis(600)));
    }
}
