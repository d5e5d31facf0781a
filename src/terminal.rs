use crate::mount::Mount;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, stdout, Write};

/// Marks the right half of a double-width glyph; never printed.
pub const CONTINUATION: char = '\0';

/// A single cell in the terminal buffer
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    /// Second code point of a flag glyph (regional indicator pair).
    pub pair: Option<char>,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            pair: None,
            fg: None,
            bg: None,
            bold: false,
        }
    }
}

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

/// Split `s` into one entry per terminal column. Flag emoji take two
/// columns: the pair in the first, [`CONTINUATION`] in the second.
pub fn columns(s: &str) -> Vec<(char, Option<char>)> {
    let mut out = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if is_regional_indicator(c) {
            if let Some(&next) = chars.peek() {
                if is_regional_indicator(next) {
                    chars.next();
                    out.push((c, Some(next)));
                    out.push((CONTINUATION, None));
                    continue;
                }
            }
        }
        out.push((c, None));
    }
    out
}

/// Display width in columns, counting flags as two.
pub fn display_width(s: &str) -> usize {
    columns(s).len()
}

/// Off-screen cell buffer. Everything draws here; [`Terminal::present`]
/// or [`CellGrid::print_to_stdout`] puts it on screen.
#[derive(Clone, Debug)]
pub struct CellGrid {
    width: u16,
    height: u16,
    cells: Vec<Vec<Cell>>,
}

impl CellGrid {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![Cell::default(); width as usize]; height as usize],
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        for row in &mut self.cells {
            for cell in row {
                *cell = Cell::default();
            }
        }
    }

    /// Reset every cell inside `mount` to blank.
    pub fn clear_region(&mut self, mount: &Mount) {
        for y in mount.y..mount.y.saturating_add(mount.height) {
            for x in mount.x..mount.x.saturating_add(mount.width) {
                self.put(x as i32, y as i32, Cell::default());
            }
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.cells.get(y as usize).and_then(|row| row.get(x as usize))
    }

    pub fn put(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.cells[y as usize][x as usize] = cell;
        }
    }

    /// Text content of one row, for tests and plain output.
    pub fn row_text(&self, y: u16) -> String {
        let Some(row) = self.cells.get(y as usize) else {
            return String::new();
        };
        let mut out = String::new();
        for cell in row {
            if cell.ch == CONTINUATION {
                continue;
            }
            out.push(cell.ch);
            if let Some(pair) = cell.pair {
                out.push(pair);
            }
        }
        out
    }

    /// Print buffer to stdout with ANSI colors (for print mode)
    pub fn print_to_stdout(&self) -> io::Result<()> {
        let mut out = stdout().lock();
        for row in &self.cells {
            let last = row
                .iter()
                .rposition(|c| c.ch != ' ' || c.bg.is_some())
                .map_or(0, |i| i + 1);
            for cell in &row[..last] {
                if cell.ch == CONTINUATION {
                    continue;
                }
                if cell.ch == ' ' && cell.bg.is_none() {
                    write!(out, " ")?;
                    continue;
                }
                if cell.bold {
                    write!(out, "\x1b[1m")?;
                }
                if let Some(Color::Rgb { r, g, b }) = cell.fg {
                    write!(out, "\x1b[38;2;{};{};{}m", r, g, b)?;
                }
                if let Some(Color::Rgb { r, g, b }) = cell.bg {
                    write!(out, "\x1b[48;2;{};{};{}m", r, g, b)?;
                }
                write!(out, "{}", cell.ch)?;
                if let Some(pair) = cell.pair {
                    write!(out, "{}", pair)?;
                }
                write!(out, "\x1b[0m")?;
            }
            writeln!(out)?;
        }
        out.flush()
    }
}

/// Alternate-screen terminal with a [`CellGrid`] back buffer.
pub struct Terminal {
    grid: CellGrid,
    alternate_screen: bool,
}

impl Terminal {
    /// Initialize the terminal for drawing
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
        }

        Ok(Self {
            grid: CellGrid::new(width, height),
            alternate_screen,
        })
    }

    pub fn size(&self) -> (u16, u16) {
        self.grid.size()
    }

    pub fn grid_mut(&mut self) -> &mut CellGrid {
        &mut self.grid
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.grid.resize(width, height);
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Queue the whole buffer and flush once.
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout().lock();
        for (y, row) in self.grid.cells.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;
            let mut fg = None;
            let mut bg = None;
            let mut bold = false;
            for cell in row {
                if cell.ch == CONTINUATION {
                    continue;
                }
                if cell.bold != bold {
                    let attr = if cell.bold { Attribute::Bold } else { Attribute::NormalIntensity };
                    queue!(out, SetAttribute(attr))?;
                    bold = cell.bold;
                }
                if cell.fg != fg {
                    queue!(out, SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
                    fg = cell.fg;
                }
                if cell.bg != bg {
                    queue!(out, SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
                    bg = cell.bg;
                }
                queue!(out, Print(cell.ch))?;
                if let Some(pair) = cell.pair {
                    queue!(out, Print(pair))?;
                }
            }
            queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
        }
        out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

/// Mouse and focus reporting, released on drop or [`InputCapture::release`].
/// Either capability may be missing; failures are logged, not fatal.
pub struct InputCapture {
    mouse: bool,
    focus: bool,
}

impl InputCapture {
    pub fn enable() -> Self {
        let mut out = stdout();
        let mouse = match execute!(out, EnableMouseCapture) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "mouse capture unavailable, keyboard only");
                false
            }
        };
        let focus = match execute!(out, EnableFocusChange) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "focus reporting unavailable");
                false
            }
        };
        Self { mouse, focus }
    }

    pub fn release(&mut self) {
        let mut out = stdout();
        if self.mouse {
            let _ = execute!(out, DisableMouseCapture);
            self.mouse = false;
        }
        if self.focus {
            let _ = execute!(out, DisableFocusChange);
            self.focus = false;
        }
    }
}

impl Drop for InputCapture {
    fn drop(&mut self) {
        self.release();
    }
}
