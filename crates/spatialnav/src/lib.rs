//! Spatialnav: directional focus navigation for remote-control interfaces.
//!
//! A host registers each focusable element of its UI with an [`Engine`],
//! forming a containment tree. Directional input (up, down, left, right)
//! moves focus to the geometrically closest node, respecting focus
//! boundaries, preferred children and focus history.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Engine`] - One navigation tree and its focus state
//! - [`NodeConfig`] - Everything supplied when registering a node
//! - [`Handler`] - Callbacks a node receives
//! - [`FocusHandle`] - An observer over one node's focus state
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Rect, Point, Direction)
//! - [`resolve`] - Candidate scoring
//! - `testing` - Grid builders and recording handlers (feature `testing`)

#![warn(missing_docs)]

pub use spatialnav_geom as geom;

/// Debug views of an engine.
mod dump;
/// The public entry point.
mod engine;
/// Error types.
pub mod error;
/// Measurement cache.
mod geometry;
/// Observer handles.
mod handle;
/// Callback interface.
pub mod handler;
/// Focus keys and node ids.
mod key;
/// Node configuration and storage.
mod node;
/// Engine configuration.
mod options;
/// The node arena.
mod registry;
/// Directional resolution.
pub mod resolve;
/// Containment rules.
mod walker;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use dump::{NodeSnapshot, Snapshot};
pub use engine::{Engine, Lifecycle, Navigation};
pub use error::{Error, Result};
pub use geom::{Direction, Rect};
pub use geometry::Element;
pub use handle::{FocusHandle, FocusState};
pub use handler::{
    ArrowEvent, ArrowOutcome, Callbacks, Context, EnterEvent, EventOutcome, FocusDetails,
    FocusOrigin, Handler,
};
pub use key::{FocusKey, NodeId, valid_focus_key};
pub use node::{Boundary, Node, NodeConfig, NodeUpdate};
pub use options::{DistanceMethod, MeasurePolicy, Options};
pub use registry::{ROOT_KEY, Registry};
