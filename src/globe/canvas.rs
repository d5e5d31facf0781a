//! Braille drawing surface.
//!
//! Three layers per mount: a dot layer (2×4 braille dots per cell), a
//! per-cell background colour, and a text layer that overrides dots.
//! Coordinates on the dot layer are `f64` dots relative to the mount.

use crate::mount::{DOTS_X, DOTS_Y};
use crate::palette::Rgb;
use crate::terminal::{columns, Cell, CellGrid};

/// Braille bit for dot `(column, row)` inside a cell.
const DOT_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

/// One lit dot. The heaviest dot in a cell decides the cell's colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ink {
    pub color: Rgb,
    pub weight: u8,
}

impl Ink {
    pub const fn new(color: Rgb, weight: u8) -> Self {
        Self { color, weight }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Clip {
    None,
    Disc { cx: f64, cy: f64, r: f64 },
    Rect { x0: f64, y0: f64, x1: f64, y1: f64 },
}

impl Clip {
    fn allows(&self, x: f64, y: f64) -> bool {
        match *self {
            Clip::None => true,
            Clip::Disc { cx, cy, r } => {
                let (dx, dy) = (x - cx, y - cy);
                dx * dx + dy * dy <= r * r
            }
            Clip::Rect { x0, y0, x1, y1 } => x >= x0 && x < x1 && y >= y0 && y < y1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
    Solid,
    /// Every other dot in a checkerboard.
    Stipple,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Glyph {
    ch: char,
    pair: Option<char>,
    color: Rgb,
    bold: bool,
}

#[derive(Debug, Clone)]
pub struct Canvas {
    cols: usize,
    rows: usize,
    dots: Vec<Option<Ink>>,
    backgrounds: Vec<Option<Rgb>>,
    text: Vec<Option<Glyph>>,
    clip: Clip,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        let (cols, rows) = (cols as usize, rows as usize);
        let dot_count = cols * DOTS_X as usize * rows * DOTS_Y as usize;
        Self {
            cols,
            rows,
            dots: vec![None; dot_count],
            backgrounds: vec![None; cols * rows],
            text: vec![None; cols * rows],
            clip: Clip::None,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        *self = Self::new(cols, rows);
    }

    pub fn cols(&self) -> u16 {
        self.cols as u16
    }

    pub fn rows(&self) -> u16 {
        self.rows as u16
    }

    fn dot_width(&self) -> usize {
        self.cols * DOTS_X as usize
    }

    fn dot_height(&self) -> usize {
        self.rows * DOTS_Y as usize
    }

    pub fn clear(&mut self) {
        self.dots.fill(None);
        self.backgrounds.fill(None);
        self.text.fill(None);
        self.clip = Clip::None;
    }

    pub fn set_clip(&mut self, clip: Clip) {
        self.clip = clip;
    }

    pub fn dot(&self, x: usize, y: usize) -> Option<Ink> {
        if x < self.dot_width() && y < self.dot_height() {
            self.dots[y * self.dot_width() + x]
        } else {
            None
        }
    }

    pub fn lit_count(&self) -> usize {
        self.dots.iter().filter(|d| d.is_some()).count()
    }

    pub fn plot(&mut self, x: f64, y: f64, ink: Ink) {
        if !x.is_finite() || !y.is_finite() || !self.clip.allows(x, y) {
            return;
        }
        let (xi, yi) = (x.floor(), y.floor());
        if xi < 0.0 || yi < 0.0 {
            return;
        }
        let (xi, yi) = (xi as usize, yi as usize);
        if xi >= self.dot_width() || yi >= self.dot_height() {
            return;
        }
        let idx = yi * self.dot_width() + xi;
        let slot = &mut self.dots[idx];
        match slot {
            Some(existing) if existing.weight > ink.weight => {}
            _ => *slot = Some(ink),
        }
    }

    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, ink: Ink) {
        let (dx, dy) = (x1 - x0, y1 - y0);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
        if !steps.is_finite() || steps > 4096.0 {
            return;
        }
        let n = steps as usize;
        for i in 0..=n {
            let t = i as f64 / steps;
            self.plot(x0 + dx * t, y0 + dy * t, ink);
        }
    }

    pub fn disc(&mut self, cx: f64, cy: f64, r: f64, ink: Ink) {
        if r <= 0.0 {
            self.plot(cx, cy, ink);
            return;
        }
        let r2 = r * r;
        let (y0, y1) = ((cy - r).floor() as i64, (cy + r).ceil() as i64);
        let (x0, x1) = ((cx - r).floor() as i64, (cx + r).ceil() as i64);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                let (dx, dy) = (px - cx, py - cy);
                if dx * dx + dy * dy <= r2 {
                    self.plot(px, py, ink);
                }
            }
        }
    }

    pub fn ring(&mut self, cx: f64, cy: f64, r: f64, ink: Ink) {
        if r <= 0.0 {
            return;
        }
        let steps = ((std::f64::consts::TAU * r).ceil() as usize * 2).clamp(12, 2048);
        for i in 0..steps {
            let a = i as f64 / steps as f64 * std::f64::consts::TAU;
            self.plot(cx + r * a.cos(), cy + r * a.sin(), ink);
        }
    }

    /// Even-odd scanline fill of a closed polygon.
    pub fn fill_polygon(&mut self, points: &[(f64, f64)], ink: Ink, fill: Fill) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).max(0.0);
        let max_y = points
            .iter()
            .map(|p| p.1)
            .fold(f64::NEG_INFINITY, f64::max)
            .min(self.dot_height() as f64);
        if !(min_y < max_y) {
            return;
        }

        let mut crossings = Vec::new();
        for row in (min_y.floor() as usize)..(max_y.ceil() as usize) {
            let sy = row as f64 + 0.5;
            crossings.clear();
            for i in 0..points.len() {
                let (ax, ay) = points[i];
                let (bx, by) = points[(i + 1) % points.len()];
                if (ay <= sy && by > sy) || (by <= sy && ay > sy) {
                    crossings.push(ax + (sy - ay) / (by - ay) * (bx - ax));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                let start = span[0].max(0.0).round() as usize;
                let end = span[1].min(self.dot_width() as f64).round() as usize;
                for col in start..end {
                    if fill == Fill::Stipple && (col + row) % 2 == 1 {
                        continue;
                    }
                    self.plot(col as f64 + 0.5, sy, ink);
                }
            }
        }
    }

    /// Background colour for every cell whose centre is within `r` dots.
    pub fn background_disc(&mut self, cx: f64, cy: f64, r: f64, color: Rgb) {
        let r2 = r * r;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let x = (col as f64 + 0.5) * DOTS_X as f64 - cx;
                let y = (row as f64 + 0.5) * DOTS_Y as f64 - cy;
                if x * x + y * y <= r2 {
                    self.backgrounds[row * self.cols + col] = Some(color);
                }
            }
        }
    }

    /// Background colour for cells whose centre lies in the dot rectangle.
    pub fn background_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let x = (col as f64 + 0.5) * DOTS_X as f64;
                let y = (row as f64 + 0.5) * DOTS_Y as f64;
                if x >= x0 && x < x1 && y >= y0 && y < y1 {
                    self.backgrounds[row * self.cols + col] = Some(color);
                }
            }
        }
    }

    pub fn background(&self, col: u16, row: u16) -> Option<Rgb> {
        let (col, row) = (col as usize, row as usize);
        if col < self.cols && row < self.rows {
            self.backgrounds[row * self.cols + col]
        } else {
            None
        }
    }

    /// Write text at a cell position. Text ignores the clip.
    pub fn text(&mut self, col: i32, row: i32, s: &str, color: Rgb, bold: bool) {
        if row < 0 || row as usize >= self.rows {
            return;
        }
        for (i, (ch, pair)) in columns(s).into_iter().enumerate() {
            let c = col + i as i32;
            if c >= 0 && (c as usize) < self.cols {
                self.text[row as usize * self.cols + c as usize] = Some(Glyph { ch, pair, color, bold });
            }
        }
    }

    /// Text centred horizontally on a dot position.
    pub fn text_centered(&mut self, x: f64, y: f64, s: &str, color: Rgb, bold: bool) {
        let width = columns(s).len() as i32;
        let col = (x / DOTS_X as f64).floor() as i32 - width / 2;
        let row = (y / DOTS_Y as f64).floor() as i32;
        self.text(col, row, s, color, bold);
    }

    /// The character a cell will show: text if any, else braille.
    pub fn cell_char(&self, col: u16, row: u16) -> char {
        let (col, row) = (col as usize, row as usize);
        if col >= self.cols || row >= self.rows {
            return ' ';
        }
        if let Some(glyph) = self.text[row * self.cols + col] {
            return glyph.ch;
        }
        self.braille(col, row).map_or(' ', |(ch, _)| ch)
    }

    fn braille(&self, col: usize, row: usize) -> Option<(char, Ink)> {
        let mut bits = 0u8;
        let mut top: Option<Ink> = None;
        for (dy, row_bits) in DOT_BITS.iter().enumerate() {
            for (dx, bit) in row_bits.iter().enumerate() {
                let x = col * DOTS_X as usize + dx;
                let y = row * DOTS_Y as usize + dy;
                if let Some(ink) = self.dots[y * self.dot_width() + x] {
                    bits |= bit;
                    if top.map_or(true, |t| ink.weight > t.weight) {
                        top = Some(ink);
                    }
                }
            }
        }
        let ink = top?;
        char::from_u32(0x2800 + bits as u32).map(|ch| (ch, ink))
    }

    /// Copy the surface into `grid` with its top-left at `(x0, y0)`.
    pub fn compose(&self, grid: &mut CellGrid, x0: u16, y0: u16) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let idx = row * self.cols + col;
                let bg = self.backgrounds[idx].map(Into::into);
                let cell = match self.text[idx] {
                    Some(glyph) => Cell {
                        ch: glyph.ch,
                        pair: glyph.pair,
                        fg: Some(glyph.color.into()),
                        bg,
                        bold: glyph.bold,
                    },
                    None => match self.braille(col, row) {
                        Some((ch, ink)) => Cell {
                            ch,
                            fg: Some(ink.color.into()),
                            bg,
                            ..Cell::default()
                        },
                        None => Cell { bg, ..Cell::default() },
                    },
                };
                grid.put(x0 as i32 + col as i32, y0 as i32 + row as i32, cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{INDIGO, ORANGE, WHITE};

    const A: Ink = Ink::new(INDIGO, 1);
    const B: Ink = Ink::new(ORANGE, 5);

    #[test]
    fn braille_bits_follow_dot_layout() {
        let mut canvas = Canvas::new(1, 1);
        canvas.plot(0.5, 0.5, A);
        assert_eq!(canvas.cell_char(0, 0), '\u{2801}');
        canvas.plot(1.5, 3.5, A);
        assert_eq!(canvas.cell_char(0, 0), '\u{2881}');
    }

    #[test]
    fn heavier_ink_wins_cell_colour() {
        let mut canvas = Canvas::new(1, 1);
        canvas.plot(0.0, 0.0, B);
        canvas.plot(1.0, 1.0, A);
        canvas.plot(0.0, 0.0, A);
        assert_eq!(canvas.dot(0, 0), Some(B));
        let mut grid = CellGrid::new(1, 1);
        canvas.compose(&mut grid, 0, 0);
        assert_eq!(grid.get(0, 0).unwrap().fg, Some(ORANGE.into()));
    }

    #[test]
    fn disc_clip_rejects_outside_dots() {
        let mut canvas = Canvas::new(10, 5);
        canvas.set_clip(Clip::Disc { cx: 10.0, cy: 10.0, r: 3.0 });
        canvas.plot(1.0, 1.0, A);
        canvas.plot(10.0, 10.0, A);
        assert_eq!(canvas.lit_count(), 1);
    }

    #[test]
    fn polygon_fill_covers_interior() {
        let mut canvas = Canvas::new(10, 5);
        let square = [(2.0, 2.0), (12.0, 2.0), (12.0, 12.0), (2.0, 12.0)];
        canvas.fill_polygon(&square, A, Fill::Solid);
        assert_eq!(canvas.lit_count(), 100);
        canvas.clear();
        canvas.fill_polygon(&square, A, Fill::Stipple);
        assert_eq!(canvas.lit_count(), 50);
    }

    #[test]
    fn text_overrides_dots_and_ignores_clip() {
        let mut canvas = Canvas::new(4, 1);
        canvas.set_clip(Clip::Rect { x0: 0.0, y0: 0.0, x1: 1.0, y1: 1.0 });
        canvas.plot(0.0, 0.0, A);
        canvas.text(0, 0, "hi", WHITE, true);
        assert_eq!(canvas.cell_char(0, 0), 'h');
        assert_eq!(canvas.cell_char(1, 0), 'i');
    }

    #[test]
    fn offscreen_and_nan_points_are_dropped() {
        let mut canvas = Canvas::new(2, 2);
        canvas.plot(-0.5, 1.0, A);
        canvas.plot(f64::NAN, 1.0, A);
        canvas.plot(4.0, 1.0, A);
        canvas.line(-100.0, -100.0, -50.0, -50.0, A);
        assert_eq!(canvas.lit_count(), 0);
    }
}
