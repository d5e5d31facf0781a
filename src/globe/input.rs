//! Pointer normalization and the drag/inertia state machine.
//!
//! Mouse, touch and unified pointer input are all reduced to one
//! `PointerInput` stream before reaching [`InputController`]. Only the
//! source (and pointer id) that started a drag can move or end it.

use super::projection::Geometry;
use super::view::ViewState;
use crate::mount::Mount;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

/// Radians of spin per globe radius of horizontal drag.
pub const DRAG_SENSITIVITY: f64 = 1.32;
/// Radians per dot of wheel travel.
pub const WHEEL_SENSITIVITY: f64 = 0.003;
/// Dots of wheel travel per terminal scroll notch.
pub const WHEEL_NOTCH: f64 = 20.0;

const MIN_SAMPLE_MS: f64 = 8.0;
const FRAME_BUDGET_MS: f64 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSource {
    Pointer,
    Mouse,
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
    Leave,
}

/// One normalized pointer sample in canvas dots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    pub x: f64,
    pub y: f64,
    pub phase: PointerPhase,
    pub source: InputSource,
    pub pointer_id: Option<u32>,
    /// Primary button (or the only finger).
    pub primary: bool,
}

impl PointerInput {
    pub fn mouse(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self { x, y, phase, source: InputSource::Mouse, pointer_id: None, primary: true }
    }

    /// A unified pointer event; `button` 0 is the primary button.
    pub fn pointer(phase: PointerPhase, x: f64, y: f64, pointer_id: u32, button: u16) -> Self {
        Self {
            x,
            y,
            phase,
            source: InputSource::Pointer,
            pointer_id: Some(pointer_id),
            primary: button == 0,
        }
    }

    /// The pointer left the window (or the terminal lost focus).
    pub fn leave() -> Self {
        Self::mouse(PointerPhase::Leave, f64::NAN, f64::NAN)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelInput {
    pub dx: f64,
    pub dy: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Normalized {
    Pointer(PointerInput),
    Wheel(WheelInput),
}

/// Normalize a terminal mouse event into mount-local dots.
pub fn from_crossterm(event: &MouseEvent, mount: &Mount) -> Option<Normalized> {
    let (x, y) = mount.cell_to_dots(event.column, event.row);
    let pointer = |phase: PointerPhase, primary: bool| {
        Some(Normalized::Pointer(PointerInput {
            primary,
            ..PointerInput::mouse(phase, x, y)
        }))
    };
    let inside = mount.contains(event.column, event.row);
    // the wheel only acts over the canvas
    let wheel = |dx: f64, dy: f64| inside.then_some(Normalized::Wheel(WheelInput { dx, dy }));

    match event.kind {
        MouseEventKind::Down(button) => pointer(PointerPhase::Down, button == MouseButton::Left),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => pointer(PointerPhase::Move, true),
        MouseEventKind::Up(MouseButton::Left) => pointer(PointerPhase::Up, true),
        MouseEventKind::ScrollUp => wheel(0.0, -WHEEL_NOTCH),
        MouseEventKind::ScrollDown => wheel(0.0, WHEEL_NOTCH),
        MouseEventKind::ScrollLeft => wheel(-WHEEL_NOTCH, 0.0),
        MouseEventKind::ScrollRight => wheel(WHEEL_NOTCH, 0.0),
        _ => None,
    }
}

/// Normalize a touch sample. A gesture only starts with exactly one
/// finger down; moves follow the first finger.
pub fn from_touch(phase: PointerPhase, touches: &[(f64, f64)]) -> Option<PointerInput> {
    if phase == PointerPhase::Down && touches.len() != 1 {
        return None;
    }
    if phase == PointerPhase::Move && touches.is_empty() {
        return None;
    }
    let (x, y) = touches.first().copied().unwrap_or_default();
    Some(PointerInput {
        x,
        y,
        phase,
        source: InputSource::Touch,
        pointer_id: None,
        primary: true,
    })
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub source: InputSource,
    pub pointer_id: Option<u32>,
    pub last_x: f64,
    pub last_y: f64,
    pub last_timestamp_ms: f64,
    pub instantaneous_velocity: f64,
}

impl DragSession {
    fn owns(&self, input: &PointerInput) -> bool {
        self.source == input.source && self.pointer_id == input.pointer_id
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputState {
    Idle,
    Dragging(DragSession),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    Ignored,
    Hover,
    DragStarted,
    Dragged,
    DragEnded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cursor {
    Grab,
    Grabbing,
}

#[derive(Debug)]
pub struct InputController {
    state: InputState,
    hover: Option<(f64, f64)>,
}

impl Default for InputController {
    fn default() -> Self {
        Self::new()
    }
}

impl InputController {
    pub fn new() -> Self {
        Self { state: InputState::Idle, hover: None }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InputState::Dragging(_))
    }

    pub fn cursor(&self) -> Cursor {
        if self.is_dragging() {
            Cursor::Grabbing
        } else {
            Cursor::Grab
        }
    }

    /// Last pointer position inside the canvas, for hit-testing.
    pub fn hover(&self) -> Option<(f64, f64)> {
        self.hover
    }

    /// Drop any drag in progress without leaving velocity behind.
    pub fn reset(&mut self) {
        self.state = InputState::Idle;
        self.hover = None;
    }

    pub fn handle(&mut self, input: PointerInput, now_ms: f64, view: &mut ViewState, geometry: &Geometry) -> InputOutcome {
        let inside = input.x >= 0.0 && input.y >= 0.0 && input.x < geometry.width && input.y < geometry.height;

        match self.state {
            InputState::Idle => match input.phase {
                PointerPhase::Down => {
                    if !input.primary || !inside {
                        return InputOutcome::Ignored;
                    }
                    self.state = InputState::Dragging(DragSession {
                        source: input.source,
                        pointer_id: input.pointer_id,
                        last_x: input.x,
                        last_y: input.y,
                        last_timestamp_ms: now_ms,
                        instantaneous_velocity: 0.0,
                    });
                    view.set_velocity(0.0);
                    self.hover = Some((input.x, input.y));
                    tracing::trace!(source = ?input.source, "drag started");
                    InputOutcome::DragStarted
                }
                PointerPhase::Move => {
                    self.hover = inside.then_some((input.x, input.y));
                    InputOutcome::Hover
                }
                PointerPhase::Leave => {
                    self.hover = None;
                    InputOutcome::Hover
                }
                PointerPhase::Up | PointerPhase::Cancel => InputOutcome::Ignored,
            },
            InputState::Dragging(mut session) => {
                if input.phase == PointerPhase::Leave {
                    self.state = InputState::Idle;
                    self.hover = None;
                    return InputOutcome::DragEnded;
                }
                // A second press while dragging never hijacks the session.
                if !session.owns(&input) || input.phase == PointerPhase::Down {
                    return InputOutcome::Ignored;
                }
                match input.phase {
                    PointerPhase::Move => {
                        let dx = input.x - session.last_x;
                        let dy = input.y - session.last_y;
                        let dt = (now_ms - session.last_timestamp_ms).max(MIN_SAMPLE_MS);

                        let velocity = match view {
                            ViewState::Sphere(_) => {
                                let sensitivity = drag_sensitivity(geometry);
                                view.displace(dx * sensitivity, dy * sensitivity, geometry.map_width);
                                (dx * sensitivity / dt) * FRAME_BUDGET_MS
                            }
                            ViewState::Flat(_) => {
                                view.displace(dx, 0.0, geometry.map_width);
                                (dx / dt) * FRAME_BUDGET_MS
                            }
                        };
                        view.set_velocity(velocity);

                        session.last_x = input.x;
                        session.last_y = input.y;
                        session.last_timestamp_ms = now_ms;
                        session.instantaneous_velocity = velocity;
                        self.state = InputState::Dragging(session);
                        self.hover = inside.then_some((input.x, input.y));
                        InputOutcome::Dragged
                    }
                    _ => {
                        self.state = InputState::Idle;
                        tracing::trace!(velocity = session.instantaneous_velocity, "drag released");
                        InputOutcome::DragEnded
                    }
                }
            }
        }
    }

    /// Stateless wheel nudge; cancels any inertia in flight.
    pub fn wheel(&mut self, wheel: WheelInput, view: &mut ViewState, geometry: &Geometry) {
        let travel = if wheel.dx != 0.0 { wheel.dx } else { wheel.dy };
        match view {
            ViewState::Sphere(_) => {
                let tilt = if wheel.dx != 0.0 && wheel.dy != 0.0 {
                    wheel.dy * WHEEL_SENSITIVITY
                } else {
                    0.0
                };
                view.displace(travel * WHEEL_SENSITIVITY, tilt, geometry.map_width);
            }
            ViewState::Flat(_) => view.displace(travel, 0.0, geometry.map_width),
        }
        view.set_velocity(0.0);
    }
}

fn drag_sensitivity(geometry: &Geometry) -> f64 {
    if geometry.radius > 0.0 {
        DRAG_SENSITIVITY / geometry.radius
    } else {
        0.0
    }
}
