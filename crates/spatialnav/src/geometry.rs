//! Lazily measured, cached node geometry.
//!
//! Layout notifications only mark entries stale. Measurement happens when a
//! box is next read, so a burst of notifications costs at most one
//! measurement per node. Precision-sensitive callers invalidate explicitly.

use slotmap::{SecondaryMap, SlotMap};
use tracing::trace;

use crate::{
    geom::Rect,
    key::NodeId,
    node::Node,
    options::MeasurePolicy,
};

/// A handle to the host element behind a node.
///
/// The node owns its element exclusively. Other parties only get `&dyn
/// Element`.
pub trait Element {
    /// The element's absolute box, or `None` if it cannot be measured right
    /// now (detached, not laid out yet).
    fn bounds(&self) -> Option<Rect>;
}

impl Element for Rect {
    fn bounds(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl<F> Element for F
where
    F: Fn() -> Option<Rect>,
{
    fn bounds(&self) -> Option<Rect> {
        self()
    }
}

/// A cached measurement.
#[derive(Debug, Clone, Copy)]
struct Entry {
    /// Measured box, `None` if the node could not be measured.
    rect: Option<Rect>,
    /// Is the measurement current?
    fresh: bool,
}

/// The geometry provider: a measurement cache keyed by node.
#[derive(Default)]
pub(crate) struct Geometry {
    /// Cached entries.
    entries: SecondaryMap<NodeId, Entry>,
    /// Number of measurements taken, for diagnostics.
    measurements: u64,
}

impl Geometry {
    /// Construct an empty cache.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Prepare for a resolution pass.
    pub(crate) fn begin_pass(&mut self, policy: MeasurePolicy) {
        if policy == MeasurePolicy::Always {
            for (_, e) in self.entries.iter_mut() {
                e.fresh = false;
            }
        }
    }

    /// Number of measurements taken so far.
    pub(crate) fn measurements(&self) -> u64 {
        self.measurements
    }

    /// The cached box for a node, if one is current. Never measures.
    pub(crate) fn cached(&self, id: NodeId) -> Option<Rect> {
        self.entries
            .get(id)
            .filter(|e| e.fresh)
            .and_then(|e| e.rect)
    }

    /// The box for a node, measuring it if the cache is stale.
    ///
    /// A node without an element, or whose element reports no bounds, takes
    /// the union of its children's boxes.
    pub(crate) fn rect(&mut self, nodes: &SlotMap<NodeId, Node>, id: NodeId) -> Option<Rect> {
        if let Some(e) = self.entries.get(id)
            && e.fresh
        {
            return e.rect;
        }
        let node = nodes.get(id)?;
        let measured = node.element.as_ref().and_then(|el| el.bounds());
        let rect = match measured {
            Some(r) => Some(r),
            None => {
                let mut acc: Option<Rect> = None;
                for child in &node.children {
                    if let Some(r) = self.rect(nodes, *child) {
                        acc = Some(acc.map_or(r, |a| a.union(r)));
                    }
                }
                acc
            }
        };
        self.measurements += 1;
        trace!(key = %node.key, ?rect, "measured");
        self.entries.insert(id, Entry { rect, fresh: true });
        rect
    }

    /// Mark one entry stale.
    fn mark(&mut self, id: NodeId) {
        if let Some(e) = self.entries.get_mut(id) {
            e.fresh = false;
        }
    }

    /// Mark a node and its ancestors stale. Ancestors may be measured as the
    /// union of their children, so they go stale too.
    pub(crate) fn invalidate(&mut self, nodes: &SlotMap<NodeId, Node>, id: NodeId) {
        let mut current = Some(id);
        while let Some(c) = current {
            self.mark(c);
            current = nodes.get(c).and_then(|n| n.parent);
        }
    }

    /// A layout-affecting change (resize, scroll) happened at `id`: its whole
    /// subtree moves, and its ancestors' unions may change.
    pub(crate) fn layout_changed(&mut self, nodes: &SlotMap<NodeId, Node>, id: NodeId) {
        self.invalidate(nodes, id);
        let mut stack = vec![id];
        while let Some(c) = stack.pop() {
            self.mark(c);
            if let Some(n) = nodes.get(c) {
                stack.extend(n.children.iter().copied());
            }
        }
    }

    /// Mark everything stale.
    pub(crate) fn invalidate_all(&mut self) {
        for (_, e) in self.entries.iter_mut() {
            e.fresh = false;
        }
    }

    /// Drop a node's entry.
    pub(crate) fn remove(&mut self, id: NodeId) {
        self.entries.remove(id);
    }

    /// Drop every entry.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.measurements = 0;
    }
}
