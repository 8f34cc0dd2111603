//! Containment rules: which nodes can be navigated to, where focus lands
//! inside a container, and how the focus path is kept up to date.

use tracing::debug;

use crate::{key::NodeId, registry::Registry};

/// Is `id` or any of its ancestors disabled? Dead ids count as disabled.
pub(crate) fn disabled_in_path(reg: &Registry, id: NodeId) -> bool {
    let mut current = Some(id);
    while let Some(c) = current {
        match reg.get(c) {
            Some(node) if !node.disabled => current = node.parent,
            _ => return true,
        }
    }
    false
}

/// Can navigation land in this node? It must be live, not the root, outside
/// any disabled subtree, and either focusable itself or holding a navigable
/// descendant.
pub(crate) fn is_navigable(reg: &Registry, id: NodeId) -> bool {
    id != reg.root() && !disabled_in_path(reg, id) && reachable(reg, id)
}

/// Navigability below an enabled parent: only the node's own flag and its
/// descendants matter.
fn reachable(reg: &Registry, id: NodeId) -> bool {
    let Some(node) = reg.get(id) else {
        return false;
    };
    !node.disabled && (node.focusable || node.children.iter().any(|c| reachable(reg, *c)))
}

/// Find where focus lands when it is sent to `id`.
///
/// Order: the preferred child, the most recently focused child, the first
/// navigable child in registration order, each followed recursively. A node
/// with no navigable children takes focus itself if it is focusable. Nothing
/// inside a disabled subtree is ever returned.
pub(crate) fn redirect(reg: &Registry, id: NodeId) -> Option<NodeId> {
    if disabled_in_path(reg, id) {
        return None;
    }
    redirect_within(reg, id)
}

/// [`redirect`] for a node already known to sit outside disabled subtrees.
fn redirect_within(reg: &Registry, id: NodeId) -> Option<NodeId> {
    let node = reg.get(id)?;

    if let Some(pk) = &node.preferred_child
        && let Ok(pid) = reg.lookup(pk.as_str())
        && reg.is_ancestor(id, pid)
        && is_navigable(reg, pid)
        && let Some(target) = redirect_within(reg, pid)
    {
        return Some(target);
    }

    if node.save_last_focused_child
        && let Some(target) = redirect_recent(reg, id)
    {
        return Some(target);
    }

    for c in &node.children {
        if reachable(reg, *c)
            && let Some(target) = redirect_within(reg, *c)
        {
            return Some(target);
        }
    }

    (node.focusable && id != reg.root()).then_some(id)
}

/// Redirect into the most recently focused child of `id` that can still
/// take focus.
fn redirect_recent(reg: &Registry, id: NodeId) -> Option<NodeId> {
    reg.get(id)?
        .recent_children
        .iter()
        .filter(|c| reachable(reg, **c))
        .find_map(|c| redirect_within(reg, *c))
}

/// Pick the node to focus after the focused subtree under `parent` was
/// removed: the parent's most recently focused remaining child, then
/// redirection into the parent, then the root. `None` means focus is
/// cleared.
pub(crate) fn restore_target(reg: &Registry, parent: NodeId) -> Option<NodeId> {
    let node = reg.get(parent)?;
    if !node.auto_restore_focus {
        debug!(parent = %node.key, "focus restoration disabled");
        return None;
    }
    let recent = if node.save_last_focused_child && !disabled_in_path(reg, parent) {
        redirect_recent(reg, parent)
    } else {
        None
    };
    recent.or_else(|| redirect(reg, parent)).or_else(|| {
        debug!(parent = %node.key, "nothing to restore into, falling back to root");
        redirect(reg, reg.root())
    })
}

/// Move the focus path from `old_path` (the previously focused node's
/// ancestry, leaf first) to `new`'s ancestry. Ids in `old_path` that are no
/// longer live are skipped.
///
/// Sets `has_focused_child` along the new path, clears it on the part of the
/// old path that is not shared, and records the child on the new path for
/// ancestors that save their last focused child. Returns the nodes that
/// track children and whose flag flipped, with the new value.
pub(crate) fn retarget(
    reg: &mut Registry,
    old_path: &[NodeId],
    new: Option<NodeId>,
) -> Vec<(NodeId, bool)> {
    let new_path = new.map(|n| reg.ancestry(n)).unwrap_or_default();
    let mut flips = Vec::new();

    // Old ancestors that are not on the new path lose the flag. The leaf
    // itself is skipped: it was focused, not holding a focused child.
    for id in old_path.iter().skip(1) {
        if new_path.iter().skip(1).any(|n| n == id) {
            continue;
        }
        if let Some(node) = reg.nodes.get_mut(*id)
            && node.has_focused_child
        {
            node.has_focused_child = false;
            if node.track_children {
                flips.push((*id, false));
            }
        }
    }
    // A node that was an ancestor and is now the focused leaf no longer holds
    // a focused child either.
    if let Some(leaf) = new
        && let Some(node) = reg.nodes.get_mut(leaf)
        && node.has_focused_child
    {
        node.has_focused_child = false;
        if node.track_children {
            flips.push((leaf, false));
        }
    }

    for pair in new_path.windows(2) {
        let (child, ancestor) = (pair[0], pair[1]);
        let Some(node) = reg.nodes.get_mut(ancestor) else {
            continue;
        };
        if !node.has_focused_child {
            node.has_focused_child = true;
            if node.track_children {
                flips.push((ancestor, true));
            }
        }
        if node.save_last_focused_child {
            node.recent_children.retain(|c| *c != child);
            node.recent_children.insert(0, child);
        }
    }
    flips
}
