//! Interactive terminal globe of career locations.
//!
//! Locations are drawn as pulsing markers on a braille-dot sphere or a
//! wrapping flat map, joined to the primary location by great-circle arcs.
//! The [`globe::Globe`] component owns all view state; [`host`] drives it
//! from a crossterm event loop.

pub mod config;
pub mod error;
pub mod globe;
pub mod help;
pub mod host;
pub mod landmass;
pub mod location;
pub mod logging;
pub mod mount;
pub mod palette;
pub mod settings;
pub mod terminal;

pub use error::GlobeError;
pub use globe::{Globe, GlobeOptions};
pub use location::Location;
