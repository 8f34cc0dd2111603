//! Geometry primitives used by the spatial navigation engine.
//!
//! Coordinates are absolute screen positions with a signed origin, so boxes
//! that have been scrolled off the top or left edge still measure correctly.
//! Centers are exposed in doubled coordinates ([`Rect::center2`]) to keep all
//! scoring arithmetic in integers.

#![warn(missing_docs)]

/// Cardinal directions and axes.
mod direction;
/// Error types for geometry operations.
mod error;
/// Point helpers.
mod point;
/// Rectangle operations.
mod rect;

pub use direction::{Axis, Direction};
pub use error::{Error, Result};
pub use point::Point;
pub use rect::Rect;
