//! Observer handles for registered nodes.
//!
//! A host component that needs to render according to its focus state keeps
//! a [`FocusHandle`] and polls it after input has been processed.

use serde::{Deserialize, Serialize};

use crate::{engine::Engine, error::Result, key::FocusKey};

/// The focus state of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FocusState {
    /// The node holds focus.
    pub focused: bool,
    /// A descendant holds focus.
    pub has_focused_child: bool,
}

/// A registered node as seen by the component that owns it.
#[derive(Debug, Clone)]
pub struct FocusHandle {
    /// The node's key.
    key: FocusKey,
    /// Focus generation at the last `changed` call.
    seen_gen: Option<u64>,
    /// State reported by the last `changed` call.
    last: Option<FocusState>,
}

impl FocusHandle {
    /// Wrap a registered key.
    pub(crate) fn new(key: FocusKey) -> Self {
        Self {
            key,
            seen_gen: None,
            last: None,
        }
    }

    /// The node's key.
    pub fn key(&self) -> &FocusKey {
        &self.key
    }

    /// The node's current focus state. An unregistered node is neither
    /// focused nor holding a focused child.
    pub fn state(&self, engine: &Engine) -> FocusState {
        engine.focus_state(self.key.as_str()).unwrap_or_default()
    }

    /// The node's state if it differs from what the previous call returned.
    /// The first call always reports. Cheap when focus has not moved at all.
    pub fn changed(&mut self, engine: &Engine) -> Option<FocusState> {
        let generation = engine.focus_gen();
        if self.seen_gen == Some(generation) {
            return None;
        }
        self.seen_gen = Some(generation);
        let state = self.state(engine);
        if self.last == Some(state) {
            return None;
        }
        self.last = Some(state);
        Some(state)
    }

    /// Focus this node. Returns `true` if focus changed.
    pub fn focus_self(&self, engine: &mut Engine) -> Result<bool> {
        engine.set_focus(self.key.as_str())
    }

    /// Unregister the node, consuming the handle.
    pub fn unregister(self, engine: &mut Engine) -> Result<()> {
        engine.unregister(self.key.as_str())
    }
}
