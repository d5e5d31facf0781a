//! Terminal host: owns the screen, feeds events to the globe and paces
//! frames. Also the non-interactive `print` and `locations` commands.

use crate::config::GlobeConfig;
use crate::globe::driver::{FrameClock, ENTRY_STEP, FRAME_INTERVAL};
use crate::globe::input::{PointerInput, WHEEL_NOTCH};
use crate::globe::texture::load_first;
use crate::globe::{Globe, GlobeOptions};
use crate::help::{render_help_overlay, HELP_TEXT};
use crate::landmass::Landmass;
use crate::location::{load_locations, Location};
use crate::mount::{LazyInit, Mount};
use crate::terminal::{display_width, CellGrid, InputCapture, Terminal};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

/// Blank cells kept around the globe.
const MARGIN: u16 = 1;

/// Frames per simulated second in print mode.
const PRINT_FPS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Quit,
    ToggleHelp,
    Redraw,
    None,
}

fn load_data(config: &GlobeConfig) -> io::Result<(Vec<Location>, Landmass)> {
    let locations = load_locations(config.locations.as_deref())?;
    let landmass = Landmass::load(config.landmass.as_deref())?;
    Ok((locations, landmass))
}

fn handle_key(key: KeyEvent, globe: Option<&mut Globe>, help_open: bool) -> KeyAction {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return KeyAction::Quit,
        KeyCode::Char('?') => return KeyAction::ToggleHelp,
        _ => {}
    }
    let Some(globe) = globe else {
        return KeyAction::None;
    };
    if help_open {
        return KeyAction::None;
    }
    match key.code {
        KeyCode::Char(' ') => globe.toggle_pause(),
        KeyCode::Char('m') => globe.toggle_mode(),
        KeyCode::Char('r') => globe.reset(),
        KeyCode::Left | KeyCode::Char('h') => globe.nudge(-WHEEL_NOTCH, 0.0),
        KeyCode::Right | KeyCode::Char('l') => globe.nudge(WHEEL_NOTCH, 0.0),
        KeyCode::Up | KeyCode::Char('k') => globe.nudge(0.0, -WHEEL_NOTCH),
        KeyCode::Down | KeyCode::Char('j') => globe.nudge(0.0, WHEEL_NOTCH),
        _ => return KeyAction::None,
    }
    KeyAction::Redraw
}

/// Run the interactive globe until the user quits or `--time` runs out.
pub fn run_interactive(config: &GlobeConfig) -> io::Result<()> {
    let mut data = Some(load_data(config)?);
    let mut term = Terminal::new(true)?;
    let mut capture = InputCapture::enable();

    let start = Instant::now();
    let deadline = config.time.map(|secs| start + Duration::from_secs_f64(secs));
    let mut lazy = LazyInit::new(start, config.init_fallback);
    let mut clock = FrameClock::new(FRAME_INTERVAL, start);
    let mut globe: Option<Globe> = None;
    let mut help_open = false;
    let mut dirty = true;

    let elapsed_ms = |now: Instant| now.duration_since(start).as_secs_f64() * 1000.0;

    'main: loop {
        let now = Instant::now();
        if deadline.is_some_and(|d| now >= d) {
            break;
        }

        let (width, height) = term.size();
        let mount = Mount::full_screen(width, height, MARGIN);
        if globe.is_none() && lazy.try_open(&mount, (width, height), now) {
            if let Some((locations, landmass)) = data.take() {
                match Globe::mount(mount, locations, landmass, config.globe_options()) {
                    Some(g) => globe = Some(g),
                    None => {
                        tracing::warn!(width, height, "terminal too small for the globe");
                        break;
                    }
                }
            }
        }

        // Drain input before the frame that shows its effect.
        let mut timeout = clock.timeout(now);
        while event::poll(timeout)? {
            timeout = Duration::ZERO;
            let now_ms = elapsed_ms(Instant::now());
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match handle_key(key, globe.as_mut(), help_open) {
                        KeyAction::Quit => break 'main,
                        KeyAction::ToggleHelp => {
                            help_open = !help_open;
                            dirty = true;
                        }
                        KeyAction::Redraw => dirty = true,
                        KeyAction::None => {}
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(g) = globe.as_mut() {
                        dirty |= g.handle_mouse(&mouse, now_ms);
                    }
                }
                Event::FocusLost => {
                    if let Some(g) = globe.as_mut() {
                        g.handle_pointer(PointerInput::leave(), now_ms);
                        dirty = true;
                    }
                }
                Event::Resize(w, h) => {
                    term.resize(w, h);
                    term.clear_screen()?;
                    if let Some(g) = globe.as_mut() {
                        g.resize(Mount::full_screen(w, h, MARGIN));
                    }
                    dirty = true;
                }
                _ => {}
            }
        }

        if !clock.due(Instant::now()) {
            continue;
        }
        let mut painted = false;
        if let Some(g) = globe.as_mut() {
            painted = g.tick();
            if !painted && dirty {
                g.render();
                painted = true;
            }
        }
        if painted || dirty {
            let grid = term.grid_mut();
            grid.clear();
            if let Some(g) = globe.as_ref() {
                g.compose(grid);
            }
            if help_open {
                render_help_overlay(grid, HELP_TEXT);
            }
            term.present()?;
            dirty = false;
        }
    }

    if let Some(g) = globe.as_mut() {
        g.teardown(term.grid_mut());
    }
    capture.release();
    term.present()?;
    Ok(())
}

/// Number of ticks print mode simulates: enough for the entry fade, plus
/// `time` seconds of animation.
pub fn print_frames(reduced_motion: bool, time: Option<f64>) -> u64 {
    if reduced_motion {
        return 1;
    }
    let entry = (1.0 / ENTRY_STEP).ceil() as u64;
    let extra = (time.unwrap_or(0.0) * PRINT_FPS).round() as u64;
    entry + extra
}

/// Render one frame into a grid of `width` x `height` cells.
pub fn render_static(config: &GlobeConfig, width: u16, height: u16) -> io::Result<CellGrid> {
    let (locations, landmass) = load_data(config)?;
    let texture = load_first(&config.textures, &AtomicBool::new(false));
    let options = GlobeOptions {
        textures: Vec::new(),
        ..config.globe_options()
    };
    let mount = Mount::new(0, 0, width, height);
    let mut globe = Globe::mount(mount, locations, landmass, options)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "print area is empty"))?;
    globe.use_texture(texture);

    for _ in 0..print_frames(config.reduced_motion, config.time) {
        if !globe.tick() {
            break;
        }
    }

    let mut grid = CellGrid::new(width, height);
    globe.compose(&mut grid);
    Ok(grid)
}

pub fn run_print(config: &GlobeConfig, width: Option<u16>, height: Option<u16>) -> io::Result<()> {
    let (term_w, term_h) = crossterm::terminal::size().unwrap_or((80, 24));
    let width = width.unwrap_or(term_w);
    // leave room for the shell prompt
    let height = height.unwrap_or(term_h.saturating_sub(1));
    render_static(config, width, height)?.print_to_stdout()
}

/// Plain-text table of the loaded locations, primary first.
pub fn locations_table(locations: &[Location]) -> String {
    let rows: Vec<[String; 4]> = locations
        .iter()
        .map(|l| {
            [
                format!("{} {}", l.flag_glyph, l.country_name).trim().to_string(),
                l.years_label.clone(),
                format!("{:.2}, {:.2}", l.latitude, l.longitude),
                l.city_names.join(", "),
            ]
        })
        .collect();
    let header = ["COUNTRY", "YEARS", "LAT, LNG", "CITIES"];

    let mut widths = header.map(display_width);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(display_width(cell));
        }
    }

    let line = |cells: [&str; 4]| {
        let mut out = String::new();
        for (i, cell) in cells.iter().enumerate() {
            out.push_str(cell);
            if i + 1 < cells.len() {
                out.push_str(&" ".repeat(widths[i] - display_width(cell) + 2));
            }
        }
        out.trim_end().to_string()
    };

    let mut out = line(header);
    out.push('\n');
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&line([row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()]));
        if i == 0 {
            out.push_str("  (primary)");
        }
        out.push('\n');
    }
    out
}

pub fn run_locations(config: &GlobeConfig) -> io::Result<()> {
    let (locations, _) = load_data(config)?;
    print!("{}", locations_table(&locations));
    Ok(())
}
