//! Client-side model for the Ketra N4 module for LED lighting.
//!
//! Basic operations for enumerating and controlling the loads are
//! supported: discover a controller, load its group configuration, and
//! read or set each load's brightness and color.

pub mod color;
pub mod error;
pub mod n4;
pub mod protocols;
pub mod settings;

pub use error::KetraError;
pub use n4::{Ketra, KetraOptions};
