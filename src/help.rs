use crate::palette::{Rgb, SLATE, TEXT, TOOLTIP_BG};
use crate::terminal::{Cell, CellGrid};
use crossterm::style::Color;

pub const HELP_TEXT: &str = "\
termglobe

drag        spin the globe / pan the map
wheel       spin / tilt
arrows hjkl nudge
m           sphere / flat map
r           reset view
space       pause
?           close this help
q Esc       quit";

/// Draw a centered help box over whatever is already in the grid.
pub fn render_help_overlay(grid: &mut CellGrid, help_text: &str) {
    if help_text.is_empty() {
        return;
    }
    let (width, height) = grid.size();

    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4;
    let box_height = lines.len() + 2;

    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;

    let bg: Color = TOOLTIP_BG.into();
    let put = |grid: &mut CellGrid, x: usize, y: usize, ch: char, fg: Rgb, bold: bool| {
        grid.put(
            x as i32,
            y as i32,
            Cell {
                ch,
                pair: None,
                fg: Some(fg.into()),
                bg: Some(bg),
                bold,
            },
        );
    };

    let bottom_y = start_y + box_height - 1;
    let right_x = start_x + box_width - 1;
    for x in start_x..=right_x {
        let (top, bottom) = match x {
            _ if x == start_x => ('╭', '╰'),
            _ if x == right_x => ('╮', '╯'),
            _ => ('─', '─'),
        };
        put(grid, x, start_y, top, SLATE, false);
        put(grid, x, bottom_y, bottom, SLATE, false);
    }

    for (i, line) in lines.iter().enumerate() {
        let y = start_y + 1 + i;
        put(grid, start_x, y, '│', SLATE, false);
        let padding = max_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));
        for (j, ch) in padded.chars().enumerate() {
            put(grid, start_x + 1 + j, y, ch, TEXT, i == 0);
        }
        put(grid, right_x, y, '│', SLATE, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_is_centered() {
        let mut grid = CellGrid::new(40, 12);
        render_help_overlay(&mut grid, "ab\ncdef");
        // box is 8 wide, 4 tall
        assert_eq!(grid.row_text(4).trim(), "╭──────╮");
        assert_eq!(grid.row_text(5).trim(), "│ ab   │");
        assert_eq!(grid.row_text(7).trim(), "╰──────╯");
    }

    #[test]
    fn empty_text_draws_nothing() {
        let mut grid = CellGrid::new(10, 4);
        render_help_overlay(&mut grid, "");
        assert!(grid.row_text(1).trim().is_empty());
    }
}
