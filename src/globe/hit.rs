//! Marker hit-testing and the hover tooltip.

use super::canvas::Canvas;
use crate::location::Location;
use crate::mount::{DOTS_X, DOTS_Y};
use crate::palette::{Rgb, INDIGO, ORANGE, SLATE, TEXT, TOOLTIP_BG};
use crate::terminal::display_width;

/// Default hover radius in dots.
pub const HIT_THRESHOLD: f64 = 18.0;

const DETAIL_WRAP: usize = 30;
const SECONDARY_ACCENT: Rgb = Rgb(129, 140, 248);

/// Where a location's marker landed this frame. Flat mode emits one entry
/// per wrapped copy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerProjection {
    pub screen_x: f64,
    pub screen_y: f64,
    pub visible: bool,
    pub location: usize,
}

/// Nearest visible marker strictly closer than `threshold`. On equal
/// distances the first one in `markers` wins.
pub fn find_hovered_location(x: f64, y: f64, markers: &[MarkerProjection], threshold: f64) -> Option<usize> {
    let mut best = None;
    let mut best_dist = threshold;
    for marker in markers.iter().filter(|m| m.visible) {
        let d = (marker.screen_x - x).hypot(marker.screen_y - y);
        if d < best_dist {
            best_dist = d;
            best = Some(marker.location);
        }
    }
    best
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && display_width(&current) + 1 + display_width(word) > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipLine {
    pub text: String,
    pub color: Rgb,
    pub bold: bool,
}

/// A boxed text overlay positioned in cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub lines: Vec<TooltipLine>,
    pub col: i32,
    pub row: i32,
    /// Outer size including the border.
    pub width: i32,
    pub height: i32,
}

impl Tooltip {
    /// Lay out the tooltip for `location` near the pointer (in dots),
    /// kept inside a `cols` × `rows` surface when it fits.
    pub fn new(location: &Location, primary: bool, pointer: (f64, f64), cols: u16, rows: u16) -> Self {
        let accent = if primary { ORANGE } else { SECONDARY_ACCENT };
        let mut lines = vec![TooltipLine {
            text: format!("{} {}", location.flag_glyph, location.country_name).trim().to_string(),
            color: accent,
            bold: true,
        }];
        if !location.city_names.is_empty() {
            lines.push(TooltipLine {
                text: location.city_names.join(" • "),
                color: SLATE,
                bold: false,
            });
        }
        for line in wrap_text(&location.detail_text, DETAIL_WRAP) {
            lines.push(TooltipLine { text: line, color: TEXT, bold: false });
        }
        if !location.years_label.is_empty() {
            lines.push(TooltipLine {
                text: format!("● {} years", location.years_label),
                color: ORANGE,
                bold: true,
            });
        }

        let inner = lines.iter().map(|l| display_width(&l.text)).max().unwrap_or(0) as i32;
        let width = inner + 4;
        let height = lines.len() as i32 + 2;

        let (cols, rows) = (cols as i32, rows as i32);
        let pointer_col = (pointer.0 / DOTS_X as f64).floor() as i32;
        let pointer_row = (pointer.1 / DOTS_Y as f64).floor() as i32;

        let col = (pointer_col - width / 2).min(cols - width).max(0);
        let above = pointer_row - height;
        let row = if above >= 0 { above } else { (pointer_row + 1).min(rows - height).max(0) };

        Self { lines, col, row, width, height }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let (c0, r0) = (self.col, self.row);
        let (c1, r1) = (c0 + self.width - 1, r0 + self.height - 1);
        canvas.background_rect(
            (c0 * DOTS_X as i32) as f64,
            (r0 * DOTS_Y as i32) as f64,
            ((c1 + 1) * DOTS_X as i32) as f64,
            ((r1 + 1) * DOTS_Y as i32) as f64,
            TOOLTIP_BG,
        );

        let horizontal = "─".repeat((self.width - 2).max(0) as usize);
        canvas.text(c0, r0, &format!("╭{}╮", horizontal), INDIGO, false);
        canvas.text(c0, r1, &format!("╰{}╯", horizontal), INDIGO, false);
        let blank = " ".repeat((self.width - 2).max(0) as usize);
        for (i, line) in self.lines.iter().enumerate() {
            let row = r0 + 1 + i as i32;
            canvas.text(c0, row, &format!("│{}│", blank), INDIGO, false);
            canvas.text(c0 + 2, row, &line.text, line.color, line.bold);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::load_locations;
    use pretty_assertions::assert_eq;

    fn marker(x: f64, y: f64, location: usize) -> MarkerProjection {
        MarkerProjection { screen_x: x, screen_y: y, visible: true, location }
    }

    #[test]
    fn exact_position_hits() {
        let markers = [marker(40.0, 30.0, 0), marker(90.0, 30.0, 1)];
        assert_eq!(find_hovered_location(90.0, 30.0, &markers, HIT_THRESHOLD), Some(1));
    }

    #[test]
    fn beyond_threshold_misses() {
        let markers = [marker(40.0, 30.0, 0)];
        assert_eq!(find_hovered_location(40.0, 30.0 + HIT_THRESHOLD + 0.5, &markers, HIT_THRESHOLD), None);
        assert_eq!(find_hovered_location(40.0, 30.0 + HIT_THRESHOLD, &markers, HIT_THRESHOLD), None);
    }

    #[test]
    fn hidden_markers_are_skipped() {
        let mut hidden = marker(10.0, 10.0, 3);
        hidden.visible = false;
        assert_eq!(find_hovered_location(10.0, 10.0, &[hidden], HIT_THRESHOLD), None);
    }

    #[test]
    fn first_encountered_wins_ties() {
        let markers = [marker(10.0, 0.0, 2), marker(-10.0, 0.0, 5)];
        assert_eq!(find_hovered_location(0.0, 0.0, &markers, HIT_THRESHOLD), Some(2));
    }

    #[test]
    fn wrapped_duplicates_resolve_to_one_location() {
        let markers = [marker(5.0, 20.0, 4), marker(205.0, 20.0, 4)];
        assert_eq!(find_hovered_location(200.0, 22.0, &markers, HIT_THRESHOLD), Some(4));
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("Led engineering teams across the region and shipped", 20),
            vec!["Led engineering", "teams across the", "region and shipped"]
        );
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn tooltip_content_and_clamping() {
        let locations = load_locations(None).unwrap();
        let tip = Tooltip::new(&locations[0], true, (0.0, 0.0), 80, 24);
        assert!(tip.lines[0].text.contains("United States"));
        assert_eq!(tip.lines[0].color, ORANGE);
        assert!(tip.lines[1].text.contains(" • "));
        assert!(tip.lines.last().unwrap().text.ends_with(" years"));
        assert_eq!(tip.col, 0);
        // no room above row 0, so it drops below the pointer
        assert_eq!(tip.row, 1);

        let right = Tooltip::new(&locations[1], false, (159.0, 90.0), 80, 24);
        assert!(right.col + right.width <= 80);
        assert!(right.row + right.height <= 22);
    }

    #[test]
    fn tooltip_draws_inside_canvas() {
        let locations = load_locations(None).unwrap();
        let tip = Tooltip::new(&locations[2], false, (80.0, 60.0), 80, 24);
        let mut canvas = Canvas::new(80, 24);
        tip.draw(&mut canvas);
        assert_eq!(canvas.cell_char(tip.col as u16, tip.row as u16), '╭');
        assert_eq!(canvas.background(tip.col as u16 + 1, tip.row as u16 + 1), Some(TOOLTIP_BG));
    }
}
