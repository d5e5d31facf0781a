//! Rotation (sphere) and pan (flat map) state with inertial decay.

use serde::Deserialize;

/// Latitude tilt limit in radians.
pub const MAX_TILT: f64 = 1.2;

/// Per-frame multiplicative velocity decay.
pub const VELOCITY_DECAY: f64 = 0.94;

/// Below these magnitudes residual velocity snaps to zero.
pub const ANGULAR_EPSILON: f64 = 1e-4;
pub const PAN_EPSILON: f64 = 1e-2;

/// Start orientation: centred on the Americas, slightly tilted.
pub const START_ROTATION_Y: f64 = -1.5;
pub const START_TILT: f64 = 0.35;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Sphere,
    Flat,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationState {
    pub rotation_y: f64,
    pub rotation_x: f64,
    pub angular_velocity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanState {
    pub pan_offset_x: f64,
    pub velocity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewState {
    Sphere(RotationState),
    Flat(PanState),
}

/// One decay step: shrink by [`VELOCITY_DECAY`], snap to zero under `epsilon`.
pub fn decay(velocity: f64, epsilon: f64) -> f64 {
    let next = velocity * VELOCITY_DECAY;
    if next.abs() < epsilon {
        0.0
    } else {
        next
    }
}

pub fn clamp_tilt(tilt: f64) -> f64 {
    tilt.clamp(-MAX_TILT, MAX_TILT)
}

impl ViewState {
    pub fn new(mode: RenderMode, rotation_y: f64, tilt: f64) -> Self {
        match mode {
            RenderMode::Sphere => ViewState::Sphere(RotationState {
                rotation_y,
                rotation_x: clamp_tilt(tilt),
                angular_velocity: 0.0,
            }),
            RenderMode::Flat => ViewState::Flat(PanState { pan_offset_x: 0.0, velocity: 0.0 }),
        }
    }

    pub fn mode(&self) -> RenderMode {
        match self {
            ViewState::Sphere(_) => RenderMode::Sphere,
            ViewState::Flat(_) => RenderMode::Flat,
        }
    }

    pub fn velocity(&self) -> f64 {
        match self {
            ViewState::Sphere(rot) => rot.angular_velocity,
            ViewState::Flat(pan) => pan.velocity,
        }
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        match self {
            ViewState::Sphere(rot) => rot.angular_velocity = velocity,
            ViewState::Flat(pan) => pan.velocity = velocity,
        }
    }

    /// Direct drag/wheel displacement. `dx`/`dy` are already scaled to
    /// radians (sphere) or dots (flat); flat mode ignores `dy`.
    pub fn displace(&mut self, dx: f64, dy: f64, map_width: f64) {
        match self {
            ViewState::Sphere(rot) => {
                rot.rotation_y += dx;
                rot.rotation_x = clamp_tilt(rot.rotation_x - dy);
            }
            ViewState::Flat(pan) => {
                pan.pan_offset_x = wrap_pan(pan.pan_offset_x + dx, map_width);
            }
        }
    }

    /// Idle motion for one frame: auto-rotation plus decaying inertia.
    pub fn coast(&mut self, auto_step: f64, map_width: f64) {
        match self {
            ViewState::Sphere(rot) => {
                rot.rotation_y += auto_step + rot.angular_velocity;
                rot.angular_velocity = decay(rot.angular_velocity, ANGULAR_EPSILON);
            }
            ViewState::Flat(pan) => {
                pan.pan_offset_x = wrap_pan(pan.pan_offset_x + auto_step + pan.velocity, map_width);
                pan.velocity = decay(pan.velocity, PAN_EPSILON);
            }
        }
    }
}

fn wrap_pan(offset: f64, map_width: f64) -> f64 {
    if map_width > 0.0 {
        offset.rem_euclid(map_width)
    } else {
        offset
    }
}
