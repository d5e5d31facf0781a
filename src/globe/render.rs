//! Scene renderer. Layers are painted back to front:
//! background and stars, grid, land, arcs, particles, markers, border and HUD.
//! Later layers win a braille cell's colour through heavier ink.

use super::canvas::{Canvas, Clip, Fill, Ink};
use super::hit::MarkerProjection;
use super::projection::{
    flat_y, lifted_arc_point, project, project_flat, project_sphere, unproject_sphere, unwrapped_screen_x,
    wrap_offsets, wrap_x, FlatArc, Geometry, Projected, Vec3,
};
use super::scene::{ArcParticle, ConnectionArc, Star, ARC_STEPS};
use super::texture::LandTexture;
use super::view::{PanState, RotationState, ViewState};
use crate::landmass::Landmass;
use crate::location::Location;
use crate::mount::{DOTS_X, DOTS_Y};
use crate::palette::{
    Rgb, ATMOSPHERE, INDIGO, LAND, LAND_EDGE, LAVENDER, OCEAN, ORANGE, PARTICLE, RIPPLE, STAR, WHITE,
};
use std::f64::consts::{PI, TAU};

const W_STAR: u8 = 1;
const W_GRID: u8 = 2;
const W_BORDER: u8 = 3;
const W_LAND: u8 = 4;
const W_COAST: u8 = 5;
const W_ARC: u8 = 6;
const W_ARROW: u8 = 7;
const W_PARTICLE: u8 = 8;
const W_GLOW: u8 = 9;
const W_RIPPLE: u8 = 10;
const W_RIM: u8 = 11;
const W_CORE: u8 = 12;
const W_HOVER: u8 = 13;

/// Marker sizes are given in screen pixels and scaled down to dots.
const MARKER_SCALE: f64 = 0.35;
const ARROW_LENGTH: f64 = 4.0;
const ARROW_HALF_ANGLE: f64 = PI / 7.0;
/// Outer edge of the sphere's starfield, in globe radii.
const STAR_HALO: f64 = 1.22;

/// Everything one frame needs, borrowed from the component.
pub struct Scene<'a> {
    pub locations: &'a [Location],
    pub landmass: &'a Landmass,
    pub texture: Option<&'a LandTexture>,
    pub arcs: &'a [ConnectionArc],
    pub particles: &'a [ArcParticle],
    pub stars: &'a [Star],
    pub markers: &'a [MarkerProjection],
    pub view: &'a ViewState,
    pub geometry: &'a Geometry,
    pub frame: u64,
    pub pulse_time: f64,
    pub entry: f64,
    pub reduced_motion: bool,
    pub hovered: Option<usize>,
    /// Interaction state shown centred in the HUD row, e.g. `GRABBING`.
    pub status: Option<&'a str>,
}

/// Project every location for the current view. Sphere mode yields one
/// entry per location; flat mode one per on-screen wrapped copy.
pub fn project_markers(locations: &[Location], view: &ViewState, geometry: &Geometry) -> Vec<MarkerProjection> {
    let mut markers = Vec::with_capacity(locations.len());
    for (index, location) in locations.iter().enumerate() {
        let (lat, lng) = location.radians();
        let p = project(lat, lng, view, geometry);
        match view {
            ViewState::Sphere(_) => markers.push(MarkerProjection {
                screen_x: p.x,
                screen_y: p.y,
                visible: p.front_facing,
                location: index,
            }),
            ViewState::Flat(_) => {
                for offset in wrap_offsets(p.x, geometry, 0.0) {
                    markers.push(MarkerProjection {
                        screen_x: p.x + offset,
                        screen_y: p.y,
                        visible: true,
                        location: index,
                    });
                }
            }
        }
    }
    markers
}

pub fn render(scene: &Scene, canvas: &mut Canvas) {
    if scene.geometry.is_empty() {
        return;
    }
    match scene.view {
        ViewState::Sphere(rotation) => render_sphere(scene, rotation, canvas),
        ViewState::Flat(pan) => render_flat(scene, pan, canvas),
    }
    canvas.set_clip(Clip::None);
    draw_markers(scene, canvas);
}

fn render_sphere(scene: &Scene, rotation: &RotationState, canvas: &mut Canvas) {
    let g = scene.geometry;
    let entry = scene.entry;

    if entry > 0.0 {
        canvas.background_disc(g.cx, g.cy, g.radius * 1.15, ATMOSPHERE.dim(entry));
        canvas.background_disc(g.cx, g.cy, g.radius, OCEAN.dim(entry));
    }
    // stars only fill a thin halo around the atmosphere
    let t = scene.frame as f64;
    canvas.set_clip(Clip::Disc { cx: g.cx, cy: g.cy, r: g.radius * STAR_HALO });
    for star in scene.stars {
        let (x, y) = (star.x * g.width, star.y * g.height);
        if !g.in_disc(x, y, g.radius * 1.15) {
            canvas.plot(x, y, Ink::new(STAR.dim(star.brightness(t) * 0.6), W_STAR));
        }
    }

    canvas.set_clip(Clip::Disc { cx: g.cx, cy: g.cy, r: g.radius });
    let grid = Ink::new(INDIGO.dim(0.55 * entry), W_GRID);
    for lat in (-60..=60).step_by(30) {
        let samples: Vec<Projected> = (-180..=180)
            .step_by(3)
            .map(|lng| project_sphere((lat as f64).to_radians(), (lng as f64).to_radians(), rotation, g))
            .collect();
        stroke_visible(canvas, &samples, grid);
    }
    for lng in (-180..180).step_by(30) {
        let samples: Vec<Projected> = (-90..=90)
            .step_by(3)
            .map(|lat| project_sphere((lat as f64).to_radians(), (lng as f64).to_radians(), rotation, g))
            .collect();
        stroke_visible(canvas, &samples, grid);
    }

    let land = Ink::new(LAND.dim(entry), W_LAND);
    let coast = Ink::new(LAND_EDGE.dim(entry), W_COAST);
    match scene.texture {
        Some(texture) => {
            for_each_stipple_dot(canvas, g, |x, y| {
                unproject_sphere(x, y, rotation, g).is_some_and(|(lat, lng)| texture.sample(lat, lng))
            }, land);
        }
        None => {
            for ring in &scene.landmass.rings {
                let (clat, clng) = ring.centroid;
                if !project_sphere(clat, clng, rotation, g).front_facing {
                    continue;
                }
                let points: Vec<(f64, f64)> = ring
                    .points
                    .iter()
                    .map(|&(lat, lng)| project_sphere(lat, lng, rotation, g))
                    .filter(|p| p.front_facing)
                    .map(|p| (p.x, p.y))
                    .collect();
                canvas.fill_polygon(&points, land, Fill::Stipple);
                stroke_closed(canvas, &points, coast);
            }
        }
    }

    let arc_ink = Ink::new(INDIGO.mix(LAVENDER, 0.5).dim(entry), W_ARC);
    let arrow_ink = Ink::new(LAVENDER.dim(0.85 * entry), W_ARROW);
    for arc in scene.arcs {
        let Some((a, b)) = arc_vectors(scene.locations, arc) else {
            continue;
        };
        let samples: Vec<Projected> = (0..=ARC_STEPS)
            .map(|i| lifted_arc_point(a, b, i as f64 / ARC_STEPS as f64, arc.lift, rotation, g))
            .collect();
        stroke_visible(canvas, &samples, arc_ink);
        if let Some(last) = samples.iter().rposition(|p| p.front_facing) {
            if last > 0 {
                let (prev, tip) = (samples[last - 1], samples[last]);
                arrowhead(canvas, (prev.x, prev.y), (tip.x, tip.y), arrow_ink);
            }
        }
    }

    canvas.set_clip(Clip::Disc { cx: g.cx, cy: g.cy, r: g.radius * 1.15 });
    for particle in scene.particles {
        let Some(arc) = scene.arcs.get(particle.arc) else {
            continue;
        };
        let Some((a, b)) = arc_vectors(scene.locations, arc) else {
            continue;
        };
        let p = lifted_arc_point(a, b, particle.progress, arc.lift, rotation, g);
        if p.front_facing {
            canvas.disc(p.x, p.y, particle.size_scale * 0.5, Ink::new(PARTICLE, W_PARTICLE));
        }
    }

    canvas.set_clip(Clip::None);
    canvas.ring(g.cx, g.cy, g.radius + 1.0, Ink::new(INDIGO.dim(0.3 + 0.5 * entry), W_BORDER));

    let hud = LAVENDER.dim(0.6 * entry);
    let row = (((g.cy + g.radius) / DOTS_Y as f64).floor() as i32 + 1).min(canvas.rows() as i32 - 1);
    let left = ((g.cx - g.radius) / DOTS_X as f64).floor() as i32;
    let right = ((g.cx + g.radius) / DOTS_X as f64).floor() as i32;
    let connections = format!("CONNECTIONS: {}", scene.locations.len().saturating_sub(1));
    let countries = format!("COUNTRIES: {}", scene.locations.len());
    canvas.text(left, row, &connections, hud, false);
    canvas.text(right - countries.chars().count() as i32 + 1, row, &countries, hud, false);
    if let Some(status) = scene.status {
        let col = (g.cx / DOTS_X as f64).floor() as i32 - status.chars().count() as i32 / 2;
        canvas.text(col, row, status, LAVENDER, true);
    }
}

fn render_flat(scene: &Scene, pan: &PanState, canvas: &mut Canvas) {
    let g = scene.geometry;
    let entry = scene.entry;
    let bottom = g.map_height.min(g.height);

    if entry > 0.0 {
        canvas.background_rect(0.0, 0.0, g.width, bottom, OCEAN.dim(entry));
    }
    canvas.set_clip(Clip::Rect { x0: 0.0, y0: 0.0, x1: g.width, y1: bottom });

    let grid = Ink::new(INDIGO.dim(0.55 * entry), W_GRID);
    for lat in (-60..=60).step_by(30) {
        let y = flat_y((lat as f64).to_radians(), g);
        canvas.line(0.0, y, g.width, y, grid);
    }
    for lng in (-180..180).step_by(30) {
        let x = wrap_x(unwrapped_screen_x((lng as f64).to_radians(), pan, g), g.map_width);
        for offset in wrap_offsets(x, g, 0.0) {
            canvas.line(x + offset, 0.0, x + offset, bottom, grid);
        }
    }

    let land = Ink::new(LAND.dim(entry), W_LAND);
    let coast = Ink::new(LAND_EDGE.dim(entry), W_COAST);
    match scene.texture {
        Some(texture) => {
            for_each_stipple_dot(canvas, g, |x, y| {
                let lng = ((x + pan.pan_offset_x) / g.map_width * 360.0 - 180.0).to_radians();
                let lat = (90.0 - y / g.map_height * 180.0).to_radians();
                y < bottom && texture.sample(lat, lng)
            }, land);
        }
        None => {
            for ring in &scene.landmass.rings {
                let points: Vec<(f64, f64)> = ring
                    .points
                    .iter()
                    .map(|&(lat, lng)| (unwrapped_screen_x(lng, pan, g), flat_y(lat, g)))
                    .collect();
                let min_x = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
                let max_x = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
                let start = wrap_x(min_x, g.map_width);
                for offset in wrap_offsets(start, g, max_x - min_x) {
                    let shift = start - min_x + offset;
                    let copy: Vec<(f64, f64)> = points.iter().map(|&(x, y)| (x + shift, y)).collect();
                    canvas.fill_polygon(&copy, land, Fill::Stipple);
                    stroke_closed(canvas, &copy, coast);
                }
            }
        }
    }

    let arc_ink = Ink::new(INDIGO.mix(LAVENDER, 0.5).dim(entry), W_ARC);
    let arrow_ink = Ink::new(LAVENDER.dim(0.85 * entry), W_ARROW);
    let flat_arcs: Vec<Option<FlatArc>> = scene.arcs.iter().map(|arc| flat_arc(scene.locations, arc, pan, g)).collect();
    for curve in flat_arcs.iter().flatten() {
        let samples: Vec<(f64, f64)> = (0..=ARC_STEPS).map(|i| curve.point(i as f64 / ARC_STEPS as f64)).collect();
        for offset in wrap_offsets(curve.start.0, g, g.map_width) {
            for pair in samples.windows(2) {
                canvas.line(pair[0].0 + offset, pair[0].1, pair[1].0 + offset, pair[1].1, arc_ink);
            }
            let (prev, tip) = (samples[ARC_STEPS - 1], samples[ARC_STEPS]);
            arrowhead(canvas, (prev.0 + offset, prev.1), (tip.0 + offset, tip.1), arrow_ink);
        }
    }

    for particle in scene.particles {
        let Some(Some(curve)) = flat_arcs.get(particle.arc) else {
            continue;
        };
        let (x, y) = curve.point(particle.progress);
        for offset in wrap_offsets(curve.start.0, g, g.map_width) {
            canvas.disc(x + offset, y, particle.size_scale * 0.5, Ink::new(PARTICLE, W_PARTICLE));
        }
    }

    canvas.set_clip(Clip::None);
    let frame = Ink::new(INDIGO.dim(0.3 + 0.5 * entry), W_BORDER);
    let (right, low) = (g.width - 0.5, bottom - 0.5);
    canvas.line(0.0, 0.0, right, 0.0, frame);
    canvas.line(0.0, low, right, low, frame);

    let hud = LAVENDER.dim(0.6 * entry);
    for lat in (-60..=60).step_by(30) {
        let row = (flat_y((lat as f64).to_radians(), g) / DOTS_Y as f64).floor() as i32;
        canvas.text(0, row, &latitude_label(lat), hud, false);
    }
    let last_row = (bottom / DOTS_Y as f64).ceil() as i32 - 1;
    for lng in (-120..=120).step_by(60) {
        let x = wrap_x(unwrapped_screen_x((lng as f64).to_radians(), pan, g), g.map_width);
        let label = longitude_label(lng);
        for offset in wrap_offsets(x, g, 0.0) {
            let col = ((x + offset) / DOTS_X as f64).floor() as i32 - label.chars().count() as i32 / 2;
            canvas.text(col, last_row, &label, hud, false);
        }
    }
    let connections = format!("CONNECTIONS: {}", scene.locations.len().saturating_sub(1));
    let countries = format!("COUNTRIES: {}", scene.locations.len());
    let cols = canvas.cols() as i32;
    canvas.text(6, 0, &connections, hud, false);
    canvas.text(cols - countries.len() as i32 - 1, 0, &countries, hud, false);
    if let Some(status) = scene.status {
        canvas.text(cols / 2 - status.chars().count() as i32 / 2, 0, status, LAVENDER, true);
    }
}

fn draw_markers(scene: &Scene, canvas: &mut Canvas) {
    let t = scene.pulse_time;
    let entry = scene.entry;
    for marker in scene.markers.iter().filter(|m| m.visible) {
        let Some(location) = scene.locations.get(marker.location) else {
            continue;
        };
        let index = marker.location as f64;
        let primary = marker.location == 0;
        let hovered = scene.hovered == Some(marker.location);
        let (x, y) = (marker.screen_x, marker.screen_y);
        let (glow, ripple) = if primary { (ORANGE, ORANGE) } else { (INDIGO, RIPPLE) };
        let bonus = if primary { 1.0 } else { 0.0 };

        let pulse = 1.0 + (t + index * 1.1).sin() * 0.25;
        let glow_r = (14.0 + 6.0 * bonus) * MARKER_SCALE * pulse * entry;
        canvas.ring(x, y, glow_r, Ink::new(glow.dim(0.45), W_GLOW));

        if !scene.reduced_motion {
            let phase = (t * 0.5 + index * 0.7) % TAU;
            let r = (8.0 + phase.sin() * 4.0 + 4.0 * bonus) * MARKER_SCALE;
            let alpha = 0.25 * (1.0 - phase.sin() * 0.5) * entry;
            canvas.ring(x, y, r, Ink::new(ripple.dim(0.35 + alpha * 2.0), W_RIPPLE));

            let phase = (t * 0.3 + index * 1.2) % TAU;
            let r = (14.0 + phase.sin() * 6.0 + 6.0 * bonus) * MARKER_SCALE;
            let alpha = 0.12 * (1.0 - phase.sin() * 0.5) * entry;
            canvas.ring(x, y, r, Ink::new(ripple.dim(0.25 + alpha * 2.0), W_RIPPLE));
        }

        let core_r = (4.0 + 1.5 * bonus) * MARKER_SCALE * entry;
        let core: Rgb = if primary { ORANGE } else { INDIGO };
        canvas.disc(x, y, core_r, Ink::new(core, W_CORE));
        let rim = if hovered {
            Ink::new(WHITE, W_HOVER)
        } else {
            Ink::new(WHITE.dim(0.7), W_RIM)
        };
        canvas.ring(x, y, core_r + 2.0 * MARKER_SCALE + 0.5, rim);

        if hovered {
            let label_y = y - core_r - 10.0 * MARKER_SCALE - DOTS_Y as f64;
            canvas.text_centered(x, label_y, &location.country_name, WHITE, true);
        }
    }
}

fn arc_vectors(locations: &[Location], arc: &ConnectionArc) -> Option<(Vec3, Vec3)> {
    let (from_lat, from_lng) = locations.get(arc.from)?.radians();
    let (to_lat, to_lng) = locations.get(arc.to)?.radians();
    Some((Vec3::from_lat_lng(from_lat, from_lng), Vec3::from_lat_lng(to_lat, to_lng)))
}

fn flat_arc(locations: &[Location], arc: &ConnectionArc, pan: &PanState, g: &Geometry) -> Option<FlatArc> {
    let (from_lat, from_lng) = locations.get(arc.from)?.radians();
    let (to_lat, to_lng) = locations.get(arc.to)?.radians();
    let from = project_flat(from_lat, from_lng, pan, g);
    let to = project_flat(to_lat, to_lng, pan, g);
    Some(FlatArc::new(from, to, arc.lift, g.map_width))
}

/// Connect consecutive front-facing samples; a hidden sample breaks the line.
fn stroke_visible(canvas: &mut Canvas, samples: &[Projected], ink: Ink) {
    for pair in samples.windows(2) {
        if pair[0].front_facing && pair[1].front_facing {
            canvas.line(pair[0].x, pair[0].y, pair[1].x, pair[1].y, ink);
        }
    }
}

fn stroke_closed(canvas: &mut Canvas, points: &[(f64, f64)], ink: Ink) {
    if points.len() < 2 {
        return;
    }
    for i in 0..points.len() {
        let (a, b) = (points[i], points[(i + 1) % points.len()]);
        canvas.line(a.0, a.1, b.0, b.1, ink);
    }
}

fn arrowhead(canvas: &mut Canvas, from: (f64, f64), tip: (f64, f64), ink: Ink) {
    let (dx, dy) = (tip.0 - from.0, tip.1 - from.1);
    if dx == 0.0 && dy == 0.0 {
        return;
    }
    let angle = dy.atan2(dx);
    let wing = |a: f64| (tip.0 - ARROW_LENGTH * a.cos(), tip.1 - ARROW_LENGTH * a.sin());
    let triangle = [tip, wing(angle - ARROW_HALF_ANGLE), wing(angle + ARROW_HALF_ANGLE)];
    canvas.fill_polygon(&triangle, ink, Fill::Solid);
    stroke_closed(canvas, &triangle, ink);
}

/// Visit every other dot in a checkerboard and plot where `is_land` holds.
fn for_each_stipple_dot(canvas: &mut Canvas, g: &Geometry, is_land: impl Fn(f64, f64) -> bool, ink: Ink) {
    let (w, h) = (g.width as usize, g.height as usize);
    for y in 0..h {
        for x in ((y % 2)..w).step_by(2) {
            let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
            if is_land(px, py) {
                canvas.plot(px, py, ink);
            }
        }
    }
}

fn latitude_label(lat: i32) -> String {
    match lat {
        0 => "0°".to_string(),
        l if l > 0 => format!("{}°N", l),
        l => format!("{}°S", -l),
    }
}

fn longitude_label(lng: i32) -> String {
    match lng {
        0 => "0°".to_string(),
        l if l > 0 => format!("{}°E", l),
        l => format!("{}°W", -l),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::scene::{connection_arcs, spawn_particles, spawn_stars};
    use crate::globe::view::RenderMode;
    use crate::location::load_locations;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        locations: Vec<Location>,
        landmass: Landmass,
        arcs: Vec<ConnectionArc>,
        particles: Vec<ArcParticle>,
        stars: Vec<Star>,
        geometry: Geometry,
    }

    fn fixture() -> Fixture {
        let locations = load_locations(None).unwrap();
        let arcs = connection_arcs(&locations);
        let mut rng = StdRng::seed_from_u64(3);
        Fixture {
            particles: spawn_particles(&arcs, &mut rng),
            stars: spawn_stars(50, &mut rng),
            landmass: Landmass::load(None).unwrap(),
            geometry: Geometry::new(160.0, 96.0),
            locations,
            arcs,
        }
    }

    fn paint(f: &Fixture, view: &ViewState, hovered: Option<usize>) -> (Canvas, Vec<MarkerProjection>) {
        paint_with_status(f, view, hovered, None)
    }

    fn paint_with_status(
        f: &Fixture,
        view: &ViewState,
        hovered: Option<usize>,
        status: Option<&str>,
    ) -> (Canvas, Vec<MarkerProjection>) {
        let markers = project_markers(&f.locations, view, &f.geometry);
        let scene = Scene {
            locations: &f.locations,
            landmass: &f.landmass,
            texture: None,
            arcs: &f.arcs,
            particles: &f.particles,
            stars: &f.stars,
            markers: &markers,
            view,
            geometry: &f.geometry,
            frame: 10,
            pulse_time: 0.6,
            entry: 1.0,
            reduced_motion: false,
            hovered,
            status,
        };
        let mut canvas = Canvas::new(80, 24);
        render(&scene, &mut canvas);
        (canvas, markers)
    }

    #[test]
    fn sphere_markers_follow_front_face() {
        let f = fixture();
        let view = ViewState::new(RenderMode::Sphere, -1.5, 0.35);
        let markers = project_markers(&f.locations, &view, &f.geometry);
        assert_eq!(markers.len(), f.locations.len());
        // centred on the Americas: the US is visible, Thailand is not
        assert!(markers[0].visible);
        assert!(!markers[1].visible);
    }

    #[test]
    fn flat_markers_duplicate_across_wide_viewports() {
        let f = fixture();
        let wide = Geometry::new(400.0, 96.0);
        let view = ViewState::new(RenderMode::Flat, 0.0, 0.0);
        let markers = project_markers(&f.locations, &view, &wide);
        let us: Vec<_> = markers.iter().filter(|m| m.location == 0).collect();
        // x = 48.3 and 240.3; the next copy lands past the right edge
        assert_eq!(us.len(), 2);
        for pair in us.windows(2) {
            assert!((pair[1].screen_x - pair[0].screen_x - wide.map_width).abs() < 1e-9);
        }
    }

    #[test]
    fn sphere_frame_draws_primary_marker_and_hud() {
        let f = fixture();
        let view = ViewState::new(RenderMode::Sphere, -1.5, 0.35);
        let (canvas, markers) = paint(&f, &view, None);
        let us = markers[0];
        let col = (us.screen_x / 2.0) as u16;
        let row = (us.screen_y / 4.0) as u16;
        assert_ne!(canvas.cell_char(col, row), ' ');
        let hud: String = (0..80).map(|c| canvas.cell_char(c, 22)).collect();
        assert!(hud.contains("CONNECTIONS: 6"), "hud row: {:?}", hud);
        assert!(hud.contains("COUNTRIES: 7"));
    }

    #[test]
    fn hovered_marker_gets_label() {
        let f = fixture();
        let view = ViewState::new(RenderMode::Sphere, -1.5, 0.35);
        let (canvas, _) = paint(&f, &view, Some(0));
        let text: String = (0..24)
            .map(|r| (0..80).map(|c| canvas.cell_char(c, r)).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("United States"));
    }

    #[test]
    fn flat_frame_has_scale_labels() {
        let f = fixture();
        let view = ViewState::new(RenderMode::Flat, 0.0, 0.0);
        let (canvas, _) = paint(&f, &view, None);
        let row_of = |lat: f64| (flat_y(lat.to_radians(), &f.geometry) / 4.0).floor() as u16;
        let label: String = (0..3).map(|c| canvas.cell_char(c, row_of(30.0))).collect();
        assert_eq!(label, "30°");
        assert!(canvas.lit_count() > 0);
    }

    #[test]
    fn status_shows_in_hud_row() {
        let f = fixture();
        let row_text = |canvas: &Canvas, row: u16| (0..80).map(|c| canvas.cell_char(c, row)).collect::<String>();

        let sphere = ViewState::new(RenderMode::Sphere, -1.5, 0.35);
        let (canvas, _) = paint_with_status(&f, &sphere, None, Some("GRABBING"));
        let hud = row_text(&canvas, 22);
        assert!(hud.contains("GRABBING"), "hud row: {:?}", hud);
        assert!(hud.contains("CONNECTIONS: 6"));

        let flat = ViewState::new(RenderMode::Flat, 0.0, 0.0);
        let (canvas, _) = paint_with_status(&f, &flat, None, Some("PAUSED"));
        assert!(row_text(&canvas, 0).contains("PAUSED"));

        let (canvas, _) = paint(&f, &flat, None);
        assert!(!row_text(&canvas, 0).contains("PAUSED"));
    }

    #[test]
    fn sphere_stars_stay_inside_the_halo() {
        let f = fixture();
        let g = f.geometry;
        let star = |x: f64, y: f64| Star {
            x: x / g.width,
            y: y / g.height,
            radius: 1.0,
            twinkle_speed: 0.0,
            phase: 0.0,
        };
        let halo_x = g.cx + g.radius * 1.18;
        let stars = [star(1.5, 1.5), star(halo_x, g.cy)];
        let view = ViewState::new(RenderMode::Sphere, -1.5, 0.35);
        let scene = Scene {
            locations: &f.locations,
            landmass: &f.landmass,
            texture: None,
            arcs: &[],
            particles: &[],
            stars: &stars,
            markers: &[],
            view: &view,
            geometry: &g,
            frame: 0,
            pulse_time: 0.0,
            entry: 1.0,
            reduced_motion: true,
            hovered: None,
            status: None,
        };
        let mut canvas = Canvas::new(80, 24);
        render(&scene, &mut canvas);

        assert_eq!(canvas.dot(1, 1), None, "corner star should be clipped");
        let halo = canvas.dot(halo_x.floor() as usize, g.cy.floor() as usize);
        assert_eq!(halo.map(|ink| ink.weight), Some(W_STAR));
        for y in 0..96 {
            for x in 0..160 {
                if canvas.dot(x, y).is_some_and(|ink| ink.weight == W_STAR) {
                    assert!(g.in_disc(x as f64 + 0.5, y as f64 + 0.5, g.radius * STAR_HALO + 1.0));
                }
            }
        }
    }

    #[test]
    fn empty_geometry_renders_nothing() {
        let f = fixture();
        let view = ViewState::new(RenderMode::Sphere, 0.0, 0.0);
        let empty = Geometry::new(0.0, 0.0);
        let scene = Scene {
            locations: &f.locations,
            landmass: &f.landmass,
            texture: None,
            arcs: &f.arcs,
            particles: &f.particles,
            stars: &f.stars,
            markers: &[],
            view: &view,
            geometry: &empty,
            frame: 0,
            pulse_time: 0.0,
            entry: 1.0,
            reduced_motion: true,
            hovered: None,
            status: Some("PAUSED"),
        };
        let mut canvas = Canvas::new(4, 4);
        render(&scene, &mut canvas);
        assert_eq!(canvas.lit_count(), 0);
    }
}
