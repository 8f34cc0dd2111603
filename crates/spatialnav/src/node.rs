use std::{any::Any, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    geom::{Direction, Rect},
    geometry::Element,
    handler::Handler,
    key::{FocusKey, NodeId},
};

/// The directions in which a focus boundary keeps navigation inside its
/// subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Boundary {
    /// Block exits upward.
    pub up: bool,
    /// Block exits downward.
    pub down: bool,
    /// Block exits leftward.
    pub left: bool,
    /// Block exits rightward.
    pub right: bool,
}

impl Boundary {
    /// No blocked directions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Block every direction.
    pub fn all() -> Self {
        Self {
            up: true,
            down: true,
            left: true,
            right: true,
        }
    }

    /// Block only the listed directions.
    pub fn only(dirs: &[Direction]) -> Self {
        let mut b = Self::none();
        for d in dirs {
            match d {
                Direction::Up => b.up = true,
                Direction::Down => b.down = true,
                Direction::Left => b.left = true,
                Direction::Right => b.right = true,
            }
        }
        b
    }

    /// Does this boundary stop navigation leaving in `dir`?
    pub fn blocks(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Is any direction blocked?
    pub fn is_active(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// The blocked directions, in [`Direction::ALL`] order.
    pub fn directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| self.blocks(*d))
            .collect()
    }
}

/// Everything a host supplies when registering a node.
pub struct NodeConfig {
    /// Requested key. `None` or empty asks the engine to generate one.
    pub(crate) key: Option<String>,
    /// Parent key. `None` attaches the node to the root.
    pub(crate) parent: Option<String>,
    /// Can this node itself take focus?
    pub(crate) focusable: bool,
    /// Excludes the node and its subtree from navigation.
    pub(crate) disabled: bool,
    /// Directions in which navigation may not leave the subtree.
    pub(crate) boundary: Boundary,
    /// Notify the handler when `has_focused_child` flips.
    pub(crate) track_children: bool,
    /// Remember which child last held focus.
    pub(crate) save_last_focused_child: bool,
    /// Restore focus into this node when a focused child is unregistered.
    pub(crate) auto_restore_focus: bool,
    /// Receive enter events bubbled from focused descendants.
    pub(crate) bubble_enter: bool,
    /// Descendant to focus first when focus is redirected into this node.
    pub(crate) preferred_child: Option<String>,
    /// Opaque host data handed back in callbacks.
    pub(crate) payload: Option<Box<dyn Any>>,
    /// Callback set.
    pub(crate) handler: Box<dyn Handler>,
    /// Element handle used to measure the node.
    pub(crate) element: Option<Box<dyn Element>>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            key: None,
            parent: None,
            focusable: true,
            disabled: false,
            boundary: Boundary::none(),
            track_children: false,
            save_last_focused_child: true,
            auto_restore_focus: true,
            bubble_enter: false,
            preferred_child: None,
            payload: None,
            handler: Box::new(()),
            element: None,
        }
    }
}

impl fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeConfig")
            .field("key", &self.key)
            .field("parent", &self.parent)
            .field("focusable", &self.focusable)
            .field("disabled", &self.disabled)
            .field("boundary", &self.boundary)
            .field("preferred_child", &self.preferred_child)
            .finish_non_exhaustive()
    }
}

impl NodeConfig {
    /// A configuration with a generated key.
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration with an explicit key.
    pub fn with_key(key: &str) -> Self {
        Self::default().key(key)
    }

    /// Builder: request a key.
    #[must_use]
    pub fn key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    /// Builder: attach under a parent.
    #[must_use]
    pub fn parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    /// Builder: set whether the node itself can take focus.
    #[must_use]
    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    /// Builder: disable the node and its subtree.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Builder: make the node a focus boundary.
    #[must_use]
    pub fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Builder: notify on `has_focused_child` changes.
    #[must_use]
    pub fn track_children(mut self, track: bool) -> Self {
        self.track_children = track;
        self
    }

    /// Builder: remember the last focused child.
    #[must_use]
    pub fn save_last_focused_child(mut self, save: bool) -> Self {
        self.save_last_focused_child = save;
        self
    }

    /// Builder: restore focus into this node when a focused child goes away.
    #[must_use]
    pub fn auto_restore_focus(mut self, restore: bool) -> Self {
        self.auto_restore_focus = restore;
        self
    }

    /// Builder: receive enter events bubbled from focused descendants.
    #[must_use]
    pub fn bubble_enter(mut self, bubble: bool) -> Self {
        self.bubble_enter = bubble;
        self
    }

    /// Builder: set the preferred child.
    #[must_use]
    pub fn preferred_child(mut self, key: &str) -> Self {
        self.preferred_child = Some(key.to_string());
        self
    }

    /// Builder: attach an opaque payload.
    #[must_use]
    pub fn payload<T: Any>(mut self, payload: T) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }

    /// Builder: set the callback set.
    #[must_use]
    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    /// Builder: set the element handle used for measurement.
    #[must_use]
    pub fn element(mut self, element: impl Element + 'static) -> Self {
        self.element = Some(Box::new(element));
        self
    }

    /// Builder: measure the node as a fixed box.
    #[must_use]
    pub fn rect(self, rect: Rect) -> Self {
        self.element(rect)
    }
}

/// A change to the mutable configuration of a live node. Fields left as
/// `None` are unchanged.
#[derive(Default)]
pub struct NodeUpdate {
    /// New focusable flag.
    pub(crate) focusable: Option<bool>,
    /// New disabled flag.
    pub(crate) disabled: Option<bool>,
    /// New boundary.
    pub(crate) boundary: Option<Boundary>,
    /// New child tracking flag.
    pub(crate) track_children: Option<bool>,
    /// New last-focused-child flag.
    pub(crate) save_last_focused_child: Option<bool>,
    /// New auto-restore flag.
    pub(crate) auto_restore_focus: Option<bool>,
    /// New enter bubbling flag.
    pub(crate) bubble_enter: Option<bool>,
    /// New preferred child; `Some(None)` clears it.
    pub(crate) preferred_child: Option<Option<String>>,
    /// New payload; `Some(None)` clears it.
    pub(crate) payload: Option<Option<Box<dyn Any>>>,
    /// New element handle.
    pub(crate) element: Option<Box<dyn Element>>,
}

impl NodeUpdate {
    /// An empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: change the focusable flag.
    #[must_use]
    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = Some(focusable);
        self
    }

    /// Builder: change the disabled flag.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    /// Builder: change the boundary.
    #[must_use]
    pub fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// Builder: change child tracking.
    #[must_use]
    pub fn track_children(mut self, track: bool) -> Self {
        self.track_children = Some(track);
        self
    }

    /// Builder: change last-focused-child saving.
    #[must_use]
    pub fn save_last_focused_child(mut self, save: bool) -> Self {
        self.save_last_focused_child = Some(save);
        self
    }

    /// Builder: change auto restore.
    #[must_use]
    pub fn auto_restore_focus(mut self, restore: bool) -> Self {
        self.auto_restore_focus = Some(restore);
        self
    }

    /// Builder: change enter bubbling.
    #[must_use]
    pub fn bubble_enter(mut self, bubble: bool) -> Self {
        self.bubble_enter = Some(bubble);
        self
    }

    /// Builder: set or clear the preferred child.
    #[must_use]
    pub fn preferred_child(mut self, key: Option<&str>) -> Self {
        self.preferred_child = Some(key.map(str::to_string));
        self
    }

    /// Builder: replace the payload.
    #[must_use]
    pub fn payload<T: Any>(mut self, payload: T) -> Self {
        self.payload = Some(Some(Box::new(payload)));
        self
    }

    /// Builder: remove the payload.
    #[must_use]
    pub fn clear_payload(mut self) -> Self {
        self.payload = Some(None);
        self
    }

    /// Builder: replace the element handle.
    #[must_use]
    pub fn element(mut self, element: impl Element + 'static) -> Self {
        self.element = Some(Box::new(element));
        self
    }
}

/// A registered node as stored in the registry arena.
pub struct Node {
    /// Public key.
    pub(crate) key: FocusKey,
    /// Registration sequence number, increasing across the engine's life.
    pub(crate) seq: u64,
    /// Parent in the containment tree; `None` only for the root.
    pub(crate) parent: Option<NodeId>,
    /// Children in registration order.
    pub(crate) children: Vec<NodeId>,
    /// Can this node itself take focus?
    pub(crate) focusable: bool,
    /// Excludes the node and its subtree from navigation.
    pub(crate) disabled: bool,
    /// Blocked exit directions.
    pub(crate) boundary: Boundary,
    /// Notify the handler when `has_focused_child` flips.
    pub(crate) track_children: bool,
    /// Remember which child last held focus.
    pub(crate) save_last_focused_child: bool,
    /// Restore focus into this node when a focused child is unregistered.
    pub(crate) auto_restore_focus: bool,
    /// Receive enter events bubbled from focused descendants.
    pub(crate) bubble_enter: bool,
    /// Requested default descendant.
    pub(crate) preferred_child: Option<FocusKey>,
    /// Children that held focus, most recent first.
    pub(crate) recent_children: Vec<NodeId>,
    /// Does a descendant hold focus?
    pub(crate) has_focused_child: bool,
    /// Opaque host data.
    pub(crate) payload: Option<Box<dyn Any>>,
    /// Callback set.
    pub(crate) handler: Box<dyn Handler>,
    /// Element handle used to measure the node.
    pub(crate) element: Option<Box<dyn Element>>,
}

impl Node {
    /// The node's key.
    pub fn key(&self) -> &FocusKey {
        &self.key
    }

    /// Registration sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The node's parent, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The node's children in registration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Can this node itself take focus?
    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    /// Is this node disabled?
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Blocked exit directions.
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Does this node track its children's focus?
    pub fn tracks_children(&self) -> bool {
        self.track_children
    }

    /// Does this node remember its last focused child?
    pub fn saves_last_focused_child(&self) -> bool {
        self.save_last_focused_child
    }

    /// The child that most recently held focus, if remembered.
    pub fn last_focused_child(&self) -> Option<NodeId> {
        self.recent_children.first().copied()
    }

    /// The preferred child key, if set.
    pub fn preferred_child(&self) -> Option<&FocusKey> {
        self.preferred_child.as_ref()
    }

    /// Does a descendant hold focus?
    pub fn has_focused_child(&self) -> bool {
        self.has_focused_child
    }

    /// The node's payload.
    pub fn payload(&self) -> Option<&dyn Any> {
        self.payload.as_deref()
    }

    /// The node's element handle.
    pub fn element(&self) -> Option<&dyn Element> {
        self.element.as_deref()
    }
}
