//! Helpers for tests, benches and demos. Enabled by the `testing` feature.

/// Grid layout builders.
pub mod grid;
/// A handler that records its callbacks.
pub mod recorder;

pub use grid::Grid;
pub use recorder::{Log, Recorder, new_log};
