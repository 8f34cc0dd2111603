use std::collections::HashMap;

use slotmap::SlotMap;
use tracing::debug;

use crate::{
    error::{Error, Result},
    key::{FocusKey, NodeId},
    node::{Node, NodeConfig, NodeUpdate},
};

/// Key of the implicit root container. It is reserved: it cannot be
/// registered, and public lookups treat it as unknown.
pub const ROOT_KEY: &str = "SN:ROOT";

/// Arena of registered nodes, indexed by id and by key.
pub struct Registry {
    /// Node storage arena.
    pub(crate) nodes: SlotMap<NodeId, Node>,
    /// Key index. The root is not in it.
    keys: HashMap<FocusKey, NodeId>,
    /// Root container.
    root: NodeId,
    /// Next registration sequence number.
    next_seq: u64,
    /// Counter for generated keys.
    next_generated: u64,
}

/// Build the root container node.
fn root_node() -> Node {
    Node {
        key: FocusKey::raw(ROOT_KEY),
        seq: 0,
        parent: None,
        children: Vec::new(),
        focusable: false,
        disabled: false,
        boundary: Default::default(),
        track_children: false,
        save_last_focused_child: true,
        auto_restore_focus: true,
        bubble_enter: false,
        preferred_child: None,
        recent_children: Vec::new(),
        has_focused_child: false,
        payload: None,
        handler: Box::new(()),
        element: None,
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry holding only the root container.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(root_node());
        Self {
            nodes,
            keys: HashMap::new(),
            root,
            next_seq: 1,
            next_generated: 0,
        }
    }

    /// The root container.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of registered nodes, not counting the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// True if only the root exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a node by id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Resolve a key to a node id.
    pub fn lookup(&self, key: &str) -> Result<NodeId> {
        self.keys
            .get(key)
            .copied()
            .ok_or_else(|| Error::UnknownKey(FocusKey::raw(key)))
    }

    /// Get a node by key.
    pub fn node(&self, key: &str) -> Result<&Node> {
        let id = self.lookup(key)?;
        self.nodes
            .get(id)
            .ok_or_else(|| Error::Internal(format!("key index points at a dead node: {key}")))
    }

    /// Is the key live?
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// The key for an id.
    pub fn key(&self, id: NodeId) -> Option<&FocusKey> {
        self.nodes.get(id).map(|n| &n.key)
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// The chain from `id` up to and including the root.
    pub fn ancestry(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            out.push(c);
            current = self.parent(c);
        }
        out
    }

    /// Is `ancestor` a strict ancestor of `id`?
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    /// Is `id` equal to `root` or inside its subtree?
    pub fn in_subtree(&self, root: NodeId, id: NodeId) -> bool {
        root == id || self.is_ancestor(root, id)
    }

    /// Node ids in pre-order, children in registration order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Pick the next generated key that is not live.
    fn generate_key(&mut self) -> FocusKey {
        loop {
            let k = FocusKey::generated(self.next_generated);
            self.next_generated += 1;
            if !self.keys.contains_key(k.as_str()) {
                return k;
            }
        }
    }

    /// Register a node. Fails if the requested key is live or malformed, or
    /// if the parent is unknown.
    pub(crate) fn register(&mut self, config: NodeConfig) -> Result<NodeId> {
        let parent = match config.parent.as_deref() {
            Some(p) => self.lookup(p)?,
            None => self.root,
        };
        let key = match config.key.as_deref() {
            None | Some("") => self.generate_key(),
            Some(ROOT_KEY) => return Err(Error::InvalidKey(ROOT_KEY.into())),
            Some(k) => {
                let k = FocusKey::new(k)?;
                if self.keys.contains_key(k.as_str()) {
                    return Err(Error::DuplicateKey(k));
                }
                k
            }
        };
        let preferred_child = config
            .preferred_child
            .as_deref()
            .map(FocusKey::new)
            .transpose()?;

        let seq = self.next_seq;
        self.next_seq += 1;
        let id = self.nodes.insert(Node {
            key: key.clone(),
            seq,
            parent: Some(parent),
            children: Vec::new(),
            focusable: config.focusable,
            disabled: config.disabled,
            boundary: config.boundary,
            track_children: config.track_children,
            save_last_focused_child: config.save_last_focused_child,
            auto_restore_focus: config.auto_restore_focus,
            bubble_enter: config.bubble_enter,
            preferred_child,
            recent_children: Vec::new(),
            has_focused_child: false,
            payload: config.payload,
            handler: config.handler,
            element: config.element,
        });
        self.keys.insert(key.clone(), id);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        debug!(%key, seq, "registered");
        Ok(id)
    }

    /// Remove a node and its subtree. Returns the removed ids, the subtree
    /// root first.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        if id == self.root {
            return Err(Error::InvalidState("the root cannot be unregistered".into()));
        }
        let parent = self.parent(id);
        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(c) = stack.pop() {
            if let Some(node) = self.nodes.remove(c) {
                self.keys.remove(node.key.as_str());
                debug!(key = %node.key, "unregistered");
                stack.extend(node.children);
                removed.push(c);
            }
        }
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p)) {
            p.children.retain(|c| *c != id);
            p.recent_children.retain(|c| *c != id);
        }
        Ok(removed)
    }

    /// Apply a configuration change to a live node.
    pub(crate) fn update(&mut self, id: NodeId, update: NodeUpdate) -> Result<()> {
        let preferred = match update.preferred_child {
            Some(Some(k)) => Some(Some(FocusKey::new(&k)?)),
            Some(None) => Some(None),
            None => None,
        };
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::Internal("update of a dead node".into()))?;
        if let Some(v) = update.focusable {
            node.focusable = v;
        }
        if let Some(v) = update.disabled {
            node.disabled = v;
        }
        if let Some(v) = update.boundary {
            node.boundary = v;
        }
        if let Some(v) = update.track_children {
            node.track_children = v;
        }
        if let Some(v) = update.save_last_focused_child {
            node.save_last_focused_child = v;
            if !v {
                node.recent_children.clear();
            }
        }
        if let Some(v) = update.auto_restore_focus {
            node.auto_restore_focus = v;
        }
        if let Some(v) = update.bubble_enter {
            node.bubble_enter = v;
        }
        if let Some(v) = preferred {
            node.preferred_child = v;
        }
        if let Some(v) = update.payload {
            node.payload = v;
        }
        if let Some(v) = update.element {
            node.element = Some(v);
        }
        Ok(())
    }
}
