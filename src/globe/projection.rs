//! Orthographic sphere and equirectangular flat-map projection.
//!
//! All functions here are pure and cheap; they run once per landmass
//! vertex, grid sample and marker every frame.

use super::view::{PanState, RotationState, ViewState};

/// Sphere radius as a fraction of the shorter viewport side.
const SPHERE_SCALE: f64 = 0.4;

/// Great-circle interpolation falls back to the source below this angle.
const MIN_ARC_ANGLE: f64 = 1e-3;

/// Viewport geometry in canvas dots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub map_width: f64,
    pub map_height: f64,
}

impl Geometry {
    pub fn new(width: f64, height: f64) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        Self {
            width,
            height,
            cx: width / 2.0,
            cy: height / 2.0,
            radius: width.min(height) * SPHERE_SCALE,
            map_width: height * 2.0,
            map_height: height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width < 1.0 || self.height < 1.0
    }

    pub fn in_disc(&self, x: f64, y: f64, radius: f64) -> bool {
        let (dx, dy) = (x - self.cx, y - self.cy);
        dx * dx + dy * dy <= radius * radius
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Unit vector for a geographic point (radians), before any rotation.
    pub fn from_lat_lng(lat: f64, lng: f64) -> Self {
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lng, cos_lng) = lng.sin_cos();
        Self {
            x: cos_lat * sin_lng,
            y: sin_lat,
            z: cos_lat * cos_lng,
        }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn scale(self, k: f64) -> Vec3 {
        Vec3 { x: self.x * k, y: self.y * k, z: self.z * k }
    }

    pub fn add(self, other: Vec3) -> Vec3 {
        Vec3 { x: self.x + other.x, y: self.y + other.y, z: self.z + other.z }
    }
}

/// A projected screen point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    /// Always true in flat mode.
    pub front_facing: bool,
    /// Post-rotation depth toward the viewer (sphere), 1.0 in flat mode.
    pub depth: f64,
}

/// Project `(lat, lng)` in radians for whichever mode `view` is in.
/// Flat-mode x is wrapped into `[0, map_width)`.
pub fn project(lat: f64, lng: f64, view: &ViewState, geometry: &Geometry) -> Projected {
    match view {
        ViewState::Sphere(rotation) => project_sphere(lat, lng, rotation, geometry),
        ViewState::Flat(pan) => project_flat(lat, lng, pan, geometry),
    }
}

pub fn project_sphere(lat: f64, lng: f64, rotation: &RotationState, geometry: &Geometry) -> Projected {
    project_vector(Vec3::from_lat_lng(lat, lng), rotation, geometry)
}

/// Rotate a world-space unit vector into view space: spin about the
/// vertical axis by `rotation_y`, then tilt about the horizontal axis.
pub fn rotate(v: Vec3, rotation: &RotationState) -> Vec3 {
    let (sin_y, cos_y) = rotation.rotation_y.sin_cos();
    let (sin_x, cos_x) = rotation.rotation_x.sin_cos();

    // sin(lng - rotY) and cos(lng - rotY) expanded on the unit vector
    let x = v.x * cos_y - v.z * sin_y;
    let z = v.z * cos_y + v.x * sin_y;

    Vec3 {
        x,
        y: v.y * cos_x - z * sin_x,
        z: v.y * sin_x + z * cos_x,
    }
}

pub fn project_vector(v: Vec3, rotation: &RotationState, geometry: &Geometry) -> Projected {
    let r = rotate(v, rotation);
    Projected {
        x: geometry.cx + r.x * geometry.radius,
        y: geometry.cy - r.y * geometry.radius,
        front_facing: r.z > 0.0,
        depth: r.z,
    }
}

/// Inverse of the sphere projection for a screen point inside the disc.
/// Returns `(lat, lng)` in radians, or `None` outside the globe.
pub fn unproject_sphere(x: f64, y: f64, rotation: &RotationState, geometry: &Geometry) -> Option<(f64, f64)> {
    if geometry.radius <= 0.0 {
        return None;
    }
    let sx = (x - geometry.cx) / geometry.radius;
    let sy = (geometry.cy - y) / geometry.radius;
    let r2 = sx * sx + sy * sy;
    if r2 > 1.0 {
        return None;
    }
    let sz = (1.0 - r2).sqrt();

    let (sin_x, cos_x) = rotation.rotation_x.sin_cos();
    let vy = sy * cos_x + sz * sin_x;
    let vz = -sy * sin_x + sz * cos_x;

    let lat = vy.clamp(-1.0, 1.0).asin();
    let lng = sx.atan2(vz) + rotation.rotation_y;
    Some((lat, normalize_longitude(lng)))
}

/// Normalize an angle to `[-PI, PI]`.
pub fn normalize_longitude(lng: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let normalized = lng.rem_euclid(tau);
    if normalized > std::f64::consts::PI {
        normalized - tau
    } else {
        normalized
    }
}

/// Spherical linear interpolation between two unit vectors.
pub fn slerp(a: Vec3, b: Vec3, t: f64) -> Vec3 {
    let d = a.dot(b).clamp(-1.0, 1.0).acos();
    if d < MIN_ARC_ANGLE {
        return a;
    }
    let sin_d = d.sin();
    let wa = ((1.0 - t) * d).sin() / sin_d;
    let wb = (t * d).sin() / sin_d;
    a.scale(wa).add(b.scale(wb))
}

/// Point `t` along the great circle from `a` to `b`, pushed outward from
/// the globe centre by a parabolic factor that peaks at the midpoint.
pub fn lifted_arc_point(a: Vec3, b: Vec3, t: f64, lift: f64, rotation: &RotationState, geometry: &Geometry) -> Projected {
    let p = project_vector(slerp(a, b, t), rotation, geometry);
    let k = 1.0 + lift * 4.0 * t * (1.0 - t);
    Projected {
        x: geometry.cx + (p.x - geometry.cx) * k,
        y: geometry.cy + (p.y - geometry.cy) * k,
        ..p
    }
}

/// Flat-map x before wrapping. Periodic: `x(lng + 2π) == x(lng) + map_width`.
pub fn unwrapped_screen_x(lng: f64, pan: &PanState, geometry: &Geometry) -> f64 {
    ((lng.to_degrees() + 180.0) / 360.0) * geometry.map_width - pan.pan_offset_x
}

pub fn flat_y(lat: f64, geometry: &Geometry) -> f64 {
    ((90.0 - lat.to_degrees()) / 180.0) * geometry.map_height
}

pub fn wrap_x(x: f64, map_width: f64) -> f64 {
    if map_width <= 0.0 {
        return x;
    }
    x.rem_euclid(map_width)
}

pub fn project_flat(lat: f64, lng: f64, pan: &PanState, geometry: &Geometry) -> Projected {
    Projected {
        x: wrap_x(unwrapped_screen_x(lng, pan, geometry), geometry.map_width),
        y: flat_y(lat, geometry),
        front_facing: true,
        depth: 1.0,
    }
}

/// Horizontal offsets (multiples of `map_width`) that place a shape
/// starting at wrapped x `x` somewhere inside the viewport.
pub fn wrap_offsets(x: f64, geometry: &Geometry, margin: f64) -> impl Iterator<Item = f64> {
    let map_width = geometry.map_width;
    let width = geometry.width;
    let copies = if map_width > 0.0 { (width / map_width).ceil() as i32 + 1 } else { 0 };
    (-1..=copies)
        .map(move |k| k as f64 * map_width)
        .filter(move |offset| {
            let shifted = x + offset;
            shifted >= -margin && shifted <= width + margin
        })
}

/// Quadratic Bézier from `from` to the horizontally nearest wrapped copy
/// of `to`, bowed upward in proportion to the endpoint distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatArc {
    pub start: (f64, f64),
    pub control: (f64, f64),
    pub end: (f64, f64),
}

impl FlatArc {
    pub fn new(from: Projected, to: Projected, lift: f64, map_width: f64) -> Self {
        let candidates = [to.x - map_width, to.x, to.x + map_width];
        let end_x = candidates
            .iter()
            .copied()
            .min_by(|a, b| (a - from.x).abs().total_cmp(&(b - from.x).abs()))
            .unwrap_or(to.x);

        let dx = end_x - from.x;
        let dy = to.y - from.y;
        let dist = (dx * dx + dy * dy).sqrt();
        let control = ((from.x + end_x) / 2.0, from.y.min(to.y) - dist * (0.15 + lift));

        Self {
            start: (from.x, from.y),
            control,
            end: (end_x, to.y),
        }
    }

    pub fn point(&self, t: f64) -> (f64, f64) {
        let u = 1.0 - t;
        let x = u * u * self.start.0 + 2.0 * u * t * self.control.0 + t * t * self.end.0;
        let y = u * u * self.start.1 + 2.0 * u * t * self.control.1 + t * t * self.end.1;
        (x, y)
    }
}

/// Point `t` along the flat-map arc from `from` to the nearest wrapped
/// copy of `to`.
pub fn flat_arc_point(from: Projected, to: Projected, lift: f64, t: f64, map_width: f64) -> (f64, f64) {
    FlatArc::new(from, to, lift, map_width).point(t)
}
