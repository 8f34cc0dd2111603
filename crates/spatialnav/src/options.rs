use serde::{Deserialize, Serialize};

use crate::key::FocusKey;

/// How the primary-axis distance between two boxes is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMethod {
    /// Gap between the facing edges, zero when the boxes overlap.
    #[default]
    Edges,
    /// Distance between the box centers.
    Center,
}

/// When cached geometry is re-measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurePolicy {
    /// Measure on first use and after invalidation or layout notification.
    #[default]
    Cached,
    /// Re-measure every box a resolution reads.
    Always,
}

/// Engine-wide configuration, set by [`Engine::init`](crate::Engine::init).
///
/// Missing fields take their defaults when deserialized, so a host can load
/// a partial configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Log every resolution with its scored candidates.
    pub debug: bool,
    /// Right-to-left mode: left and right inputs are swapped.
    pub rtl: bool,
    /// Node to focus after `init` when nothing holds focus. If the key is
    /// not registered yet, it is focused when it registers.
    pub initial_focus: Option<FocusKey>,
    /// Primary distance measure.
    pub distance: DistanceMethod,
    /// Multiplier applied to the primary distance in a candidate's score.
    pub primary_weight: u64,
    /// How far, as a percentage of the origin's perpendicular size, a
    /// candidate may sit outside the origin's row or column and still count
    /// as aligned.
    pub alignment_tolerance: u32,
    /// Geometry re-measurement policy.
    pub measure: MeasurePolicy,
    /// Maximum number of queued handler requests processed per operation.
    pub max_deferred: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            debug: false,
            rtl: false,
            initial_focus: None,
            distance: DistanceMethod::default(),
            primary_weight: 5,
            alignment_tolerance: 20,
            measure: MeasurePolicy::default(),
            max_deferred: 64,
        }
    }
}

impl Options {
    /// Builder: enable or disable debug logging.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builder: set right-to-left mode.
    #[must_use]
    pub fn with_rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    /// Builder: set the initial focus key.
    #[must_use]
    pub fn with_initial_focus(mut self, key: FocusKey) -> Self {
        self.initial_focus = Some(key);
        self
    }

    /// Builder: set the distance method.
    #[must_use]
    pub fn with_distance(mut self, distance: DistanceMethod) -> Self {
        self.distance = distance;
        self
    }

    /// Builder: set the measurement policy.
    #[must_use]
    pub fn with_measure(mut self, measure: MeasurePolicy) -> Self {
        self.measure = measure;
        self
    }
}
