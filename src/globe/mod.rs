//! The interactive globe component.
//!
//! A [`Globe`] owns its canvas, view state, input controller and animation
//! driver. The host feeds it events and calls [`Globe::tick`] on every frame
//! deadline; the globe never touches the terminal directly except through
//! [`Globe::compose`] and [`Globe::teardown`].

pub mod canvas;
pub mod driver;
pub mod hit;
pub mod input;
pub mod projection;
pub mod render;
pub mod scene;
pub mod texture;
pub mod view;

use crate::landmass::Landmass;
use crate::location::Location;
use crate::mount::Mount;
use crate::terminal::CellGrid;
use canvas::Canvas;
use crossterm::event::MouseEvent;
use driver::AnimationDriver;
use hit::{find_hovered_location, MarkerProjection, Tooltip, HIT_THRESHOLD};
use input::{from_crossterm, Cursor, InputController, InputOutcome, Normalized, PointerInput, WheelInput, WHEEL_SENSITIVITY};
use projection::Geometry;
use rand::rngs::StdRng;
use rand::SeedableRng;
use render::{project_markers, render, Scene};
use scene::{connection_arcs, spawn_particles, spawn_stars, ArcParticle, ConnectionArc, Star, STAR_COUNT};
use texture::{LandTexture, TextureLoader};
use view::{RenderMode, ViewState, START_ROTATION_Y, START_TILT};

/// Construction options, usually resolved from CLI flags and settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeOptions {
    pub mode: RenderMode,
    pub reduced_motion: bool,
    pub auto_rotate: bool,
    pub start_rotation_y: f64,
    pub start_tilt: f64,
    /// Hover radius in dots.
    pub hit_threshold: f64,
    /// Map texture candidates, tried in order.
    pub textures: Vec<String>,
    pub seed: Option<u64>,
}

impl Default for GlobeOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::Sphere,
            reduced_motion: false,
            auto_rotate: true,
            start_rotation_y: START_ROTATION_Y,
            start_tilt: START_TILT,
            hit_threshold: HIT_THRESHOLD,
            textures: Vec::new(),
            seed: None,
        }
    }
}

pub struct Globe {
    mount: Mount,
    locations: Vec<Location>,
    landmass: Landmass,
    options: GlobeOptions,
    canvas: Canvas,
    geometry: Geometry,
    view: ViewState,
    input: InputController,
    driver: AnimationDriver,
    arcs: Vec<ConnectionArc>,
    particles: Vec<ArcParticle>,
    stars: Vec<Star>,
    markers: Vec<MarkerProjection>,
    hovered: Option<usize>,
    tooltip: Option<Tooltip>,
    textures: TextureLoader,
    rng: StdRng,
}

fn geometry_for(mount: &Mount) -> Geometry {
    let (w, h) = mount.dot_size();
    Geometry::new(w, h)
}

impl Globe {
    /// Build the component inside `mount`. An empty mount has nothing to
    /// draw into and yields `None`.
    pub fn mount(mount: Mount, locations: Vec<Location>, landmass: Landmass, options: GlobeOptions) -> Option<Self> {
        if mount.is_empty() {
            tracing::warn!(?mount, "globe mount region is empty");
            return None;
        }
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let arcs = connection_arcs(&locations);
        let particles = spawn_particles(&arcs, &mut rng);
        let stars = spawn_stars(STAR_COUNT, &mut rng);
        let view = ViewState::new(options.mode, options.start_rotation_y, options.start_tilt);
        let driver = AnimationDriver::new(options.reduced_motion, options.auto_rotate);
        let textures = TextureLoader::spawn(options.textures.clone());

        tracing::info!(
            locations = locations.len(),
            arcs = arcs.len(),
            rings = landmass.rings.len(),
            mode = ?options.mode,
            reduced_motion = options.reduced_motion,
            "globe mounted"
        );

        Some(Self {
            canvas: Canvas::new(mount.width, mount.height),
            geometry: geometry_for(&mount),
            mount,
            locations,
            landmass,
            options,
            view,
            input: InputController::new(),
            driver,
            arcs,
            particles,
            stars,
            markers: Vec::new(),
            hovered: None,
            tooltip: None,
            textures,
            rng,
        })
    }

    /// Replace the background loader with an already loaded texture.
    pub fn use_texture(&mut self, texture: Option<LandTexture>) {
        self.textures = TextureLoader::ready(texture);
    }

    pub fn is_alive(&self) -> bool {
        self.driver.is_alive()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn mode(&self) -> RenderMode {
        self.view.mode()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn arcs(&self) -> &[ConnectionArc] {
        &self.arcs
    }

    pub fn particles(&self) -> &[ArcParticle] {
        &self.particles
    }

    pub fn markers(&self) -> &[MarkerProjection] {
        &self.markers
    }

    pub fn hovered_location(&self) -> Option<&Location> {
        self.hovered.and_then(|i| self.locations.get(i))
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn cursor(&self) -> Cursor {
        self.input.cursor()
    }

    pub fn is_dragging(&self) -> bool {
        self.input.is_dragging()
    }

    pub fn entry_progress(&self) -> f64 {
        self.driver.entry_progress()
    }

    pub fn reduced_motion(&self) -> bool {
        self.driver.reduced_motion()
    }

    pub fn is_paused(&self) -> bool {
        self.driver.is_paused()
    }

    pub fn toggle_pause(&mut self) {
        self.driver.toggle_pause();
    }

    /// HUD indicator for the current interaction, if any.
    pub fn status_label(&self) -> Option<&'static str> {
        if self.cursor() == Cursor::Grabbing {
            Some("GRABBING")
        } else if self.is_paused() {
            Some("PAUSED")
        } else {
            None
        }
    }

    /// Feed one normalized pointer sample. `now_ms` is any monotonic clock.
    pub fn handle_pointer(&mut self, input: PointerInput, now_ms: f64) -> InputOutcome {
        if !self.is_alive() {
            return InputOutcome::Ignored;
        }
        self.input.handle(input, now_ms, &mut self.view, &self.geometry)
    }

    pub fn handle_wheel(&mut self, wheel: WheelInput) {
        if self.is_alive() {
            self.input.wheel(wheel, &mut self.view, &self.geometry);
        }
    }

    /// Normalize and apply a terminal mouse event. Returns whether it
    /// changed anything worth repainting.
    pub fn handle_mouse(&mut self, event: &MouseEvent, now_ms: f64) -> bool {
        match from_crossterm(event, &self.mount) {
            Some(Normalized::Pointer(input)) => self.handle_pointer(input, now_ms) != InputOutcome::Ignored,
            Some(Normalized::Wheel(wheel)) => {
                self.handle_wheel(wheel);
                self.is_alive()
            }
            None => false,
        }
    }

    /// Keyboard nudge in wheel units: `dx` spins (or pans), `dy` tilts.
    pub fn nudge(&mut self, dx: f64, dy: f64) {
        if !self.is_alive() {
            return;
        }
        match self.view {
            ViewState::Sphere(_) => self.view.displace(dx * WHEEL_SENSITIVITY, dy * WHEEL_SENSITIVITY, self.geometry.map_width),
            ViewState::Flat(_) => self.view.displace(dx, 0.0, self.geometry.map_width),
        }
        self.view.set_velocity(0.0);
    }

    /// Back to the start orientation in the current mode.
    pub fn reset(&mut self) {
        self.input.reset();
        self.view = ViewState::new(self.view.mode(), self.options.start_rotation_y, self.options.start_tilt);
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        if mode != self.view.mode() {
            tracing::debug!(?mode, "render mode changed");
            self.input.reset();
            self.view = ViewState::new(mode, self.options.start_rotation_y, self.options.start_tilt);
        }
    }

    pub fn toggle_mode(&mut self) {
        let next = match self.view.mode() {
            RenderMode::Sphere => RenderMode::Flat,
            RenderMode::Flat => RenderMode::Sphere,
        };
        self.set_mode(next);
    }

    /// Adopt a new mount region: canvas, geometry and stars are rebuilt.
    pub fn resize(&mut self, mount: Mount) {
        if mount == self.mount {
            return;
        }
        tracing::debug!(?mount, "globe resized");
        self.mount = mount;
        self.canvas.resize(mount.width, mount.height);
        self.geometry = geometry_for(&mount);
        self.stars = spawn_stars(STAR_COUNT, &mut self.rng);
        if let ViewState::Flat(_) = self.view {
            // re-wrap the pan offset into the new map width
            self.view.displace(0.0, 0.0, self.geometry.map_width);
        }
        self.tooltip = None;
    }

    /// One animation frame: motion, entry fade, particles, paint. Returns
    /// whether the host should schedule another tick.
    pub fn tick(&mut self) -> bool {
        if !self.driver.begin_tick() {
            return false;
        }
        let dragging = self.input.is_dragging();
        if self.driver.advance(&mut self.view, dragging, self.geometry.map_width) {
            for particle in &mut self.particles {
                particle.advance();
            }
        }
        self.paint();
        self.driver.finish_tick()
    }

    /// Repaint the current state without advancing any animation.
    pub fn render(&mut self) {
        if self.is_alive() {
            self.paint();
        }
    }

    fn paint(&mut self) {
        self.textures.poll();
        self.markers = project_markers(&self.locations, &self.view, &self.geometry);
        self.hovered = self
            .input
            .hover()
            .and_then(|(x, y)| find_hovered_location(x, y, &self.markers, self.options.hit_threshold));
        self.tooltip = match (self.hovered, self.input.hover()) {
            (Some(index), Some(pointer)) => self
                .locations
                .get(index)
                .map(|location| Tooltip::new(location, index == 0, pointer, self.mount.width, self.mount.height)),
            _ => None,
        };

        self.canvas.clear();
        let status = self.status_label();
        let scene = Scene {
            locations: &self.locations,
            landmass: &self.landmass,
            texture: self.textures.texture(),
            arcs: &self.arcs,
            particles: &self.particles,
            stars: &self.stars,
            markers: &self.markers,
            view: &self.view,
            geometry: &self.geometry,
            frame: self.driver.frame(),
            pulse_time: self.driver.pulse_time(),
            entry: self.driver.entry_progress(),
            reduced_motion: self.driver.reduced_motion(),
            hovered: self.hovered,
            status,
        };
        render(&scene, &mut self.canvas);
        if let Some(tooltip) = &self.tooltip {
            tooltip.draw(&mut self.canvas);
        }
    }

    /// Copy the last painted frame into the host's cell buffer.
    pub fn compose(&self, grid: &mut CellGrid) {
        if self.is_alive() {
            self.canvas.compose(grid, self.mount.x, self.mount.y);
        }
    }

    /// Remove the canvas and tooltip from the screen and stop the loop.
    /// Terminal mouse and focus capture belong to the host's
    /// [`crate::terminal::InputCapture`], released alongside this call.
    pub fn teardown(&mut self, grid: &mut CellGrid) {
        if !self.is_alive() {
            return;
        }
        grid.clear_region(&self.mount);
        self.canvas.clear();
        self.tooltip = None;
        self.hovered = None;
        self.input.reset();
        self.textures.cancel();
        self.driver.kill();
        tracing::info!("globe torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::load_locations;
    use input::PointerPhase;

    fn globe(options: GlobeOptions) -> Globe {
        Globe::mount(
            Mount::new(0, 0, 80, 24),
            load_locations(None).unwrap(),
            Landmass::load(None).unwrap(),
            GlobeOptions { seed: Some(9), ..options },
        )
        .unwrap()
    }

    #[test]
    fn empty_mount_is_rejected() {
        let result = Globe::mount(
            Mount::new(0, 0, 0, 10),
            Vec::new(),
            Landmass::load(None).unwrap(),
            GlobeOptions::default(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn tick_advances_entry_and_rotation() {
        let mut g = globe(GlobeOptions::default());
        assert!(g.tick());
        assert!(g.entry_progress() > 0.0);
        match g.view() {
            ViewState::Sphere(rot) => assert!(rot.rotation_y > START_ROTATION_Y),
            ViewState::Flat(_) => unreachable!(),
        }
        assert!(g.canvas().lit_count() > 0);
    }

    #[test]
    fn teardown_stops_the_loop_and_clears() {
        let mut g = globe(GlobeOptions::default());
        g.tick();
        let mut grid = CellGrid::new(80, 24);
        g.compose(&mut grid);
        g.teardown(&mut grid);
        assert!(!g.is_alive());
        assert!(!g.tick());
        assert!((0..24).all(|y| grid.row_text(y).trim().is_empty()));
    }

    #[test]
    fn hover_over_marker_shows_tooltip() {
        let mut g = globe(GlobeOptions { reduced_motion: true, ..GlobeOptions::default() });
        g.tick();
        let us = g.markers()[0];
        assert!(us.visible);
        g.handle_pointer(PointerInput::mouse(PointerPhase::Move, us.screen_x + 1.0, us.screen_y), 0.0);
        g.render();
        assert_eq!(g.hovered_location().map(|l| l.country_name.as_str()), Some("United States"));
        assert!(g.tooltip().is_some());

        g.handle_pointer(PointerInput::leave(), 1.0);
        g.render();
        assert!(g.hovered_location().is_none());
        assert!(g.tooltip().is_none());
    }

    #[test]
    fn drag_and_pause_show_in_hud() {
        let mut g = globe(GlobeOptions::default());
        let hud_row = |g: &Globe| (0..80).map(|c| g.canvas().cell_char(c, 22)).collect::<String>();

        g.tick();
        assert_eq!(g.status_label(), None);
        assert!(!hud_row(&g).contains("GRABBING"));

        g.handle_pointer(PointerInput::mouse(PointerPhase::Down, 80.0, 48.0), 0.0);
        assert_eq!(g.cursor(), Cursor::Grabbing);
        g.tick();
        assert!(hud_row(&g).contains("GRABBING"), "hud row: {:?}", hud_row(&g));

        g.handle_pointer(PointerInput::mouse(PointerPhase::Up, 80.0, 48.0), 16.0);
        g.toggle_pause();
        g.tick();
        assert_eq!(g.status_label(), Some("PAUSED"));
        assert!(hud_row(&g).contains("PAUSED"));
    }

    #[test]
    fn mode_toggle_and_reset() {
        let mut g = globe(GlobeOptions::default());
        g.toggle_mode();
        assert_eq!(g.mode(), RenderMode::Flat);
        g.nudge(30.0, 0.0);
        g.reset();
        assert_eq!(g.view(), &ViewState::new(RenderMode::Flat, START_ROTATION_Y, START_TILT));
        g.toggle_mode();
        assert_eq!(g.mode(), RenderMode::Sphere);
    }

    #[test]
    fn resize_rebuilds_geometry() {
        let mut g = globe(GlobeOptions::default());
        g.resize(Mount::new(0, 0, 40, 12));
        assert_eq!(g.geometry().width, 80.0);
        assert_eq!(g.canvas().cols(), 40);
        g.resize(Mount::new(0, 0, 0, 0));
        assert!(g.geometry().is_empty());
        g.tick();
    }
}
