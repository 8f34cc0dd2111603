//! Debug views of an engine: a colored tree dump, a layout table, and a
//! serializable snapshot.

use std::io::Write;

use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use serde::{Deserialize, Serialize};
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{
    engine::{Engine, Lifecycle},
    error::{Error, Result},
    geom::{Direction, Rect},
    key::{FocusKey, NodeId},
    registry::Registry,
};

/// One node in a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// The node's key.
    pub key: FocusKey,
    /// The parent's key; `None` for top-level nodes.
    pub parent: Option<FocusKey>,
    /// Depth below the root, starting at 0 for top-level nodes.
    pub depth: usize,
    /// Measured box.
    pub rect: Option<Rect>,
    /// Can the node itself take focus?
    pub focusable: bool,
    /// Is the node disabled?
    pub disabled: bool,
    /// Blocked exit directions.
    pub boundary: Vec<Direction>,
    /// Does a descendant hold focus?
    pub has_focused_child: bool,
    /// The child that most recently held focus.
    pub last_focused_child: Option<FocusKey>,
    /// The preferred child key.
    pub preferred_child: Option<FocusKey>,
}

/// A serializable picture of an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Lifecycle state.
    pub lifecycle: Lifecycle,
    /// The focused key.
    pub focused: Option<FocusKey>,
    /// Right-to-left mode.
    pub rtl: bool,
    /// Is input paused?
    pub paused: bool,
    /// Every node except the root, in pre-order.
    pub nodes: Vec<NodeSnapshot>,
}

/// Map a write failure into the crate error.
fn io(e: std::io::Error) -> Error {
    Error::Internal(e.to_string())
}

/// Write `text` in a color.
fn colored(buffer: &mut Buffer, color: Color, bold: bool, text: &str) -> Result<()> {
    buffer
        .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))
        .map_err(io)?;
    write!(buffer, "{text}").map_err(io)?;
    buffer.reset().map_err(io)
}

/// Format a box for display.
fn fmt_rect(rect: Option<Rect>) -> String {
    match rect {
        Some(r) => format!("x: {}, y: {}, w: {}, h: {}", r.tl.x, r.tl.y, r.w, r.h),
        None => "unmeasured".into(),
    }
}

/// Depth of a node below the root.
fn depth(reg: &Registry, id: NodeId) -> usize {
    reg.ancestry(id).len().saturating_sub(2)
}

/// Render the node tree with boxes and focus markers. Every node is
/// measured first.
pub(crate) fn dump(engine: &mut Engine, color: bool) -> Result<String> {
    engine.measure_all();
    let mut buffer = if color {
        Buffer::ansi()
    } else {
        Buffer::no_color()
    };
    let reg = engine.registry();
    for id in reg.preorder() {
        if id == reg.root() {
            continue;
        }
        dump_node(engine, &mut buffer, id)?;
    }
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Write one node of the tree dump.
fn dump_node(engine: &Engine, buffer: &mut Buffer, id: NodeId) -> Result<()> {
    let node = engine
        .registry()
        .get(id)
        .ok_or_else(|| Error::Internal("missing node".into()))?;
    let indent = "    ".repeat(depth(engine.registry(), id));
    write!(buffer, "{indent}").map_err(io)?;
    colored(buffer, Color::Cyan, true, node.key.as_str())?;

    let mut indicators = Vec::new();
    if engine.focused() == Some(id) {
        indicators.push(("FOCUSED", Color::Magenta));
    }
    if node.has_focused_child {
        indicators.push(("has-focused-child", Color::Blue));
    }
    if node.disabled {
        indicators.push(("disabled", Color::Yellow));
    }
    if !node.focusable {
        indicators.push(("container", Color::White));
    }
    if node.boundary.is_active() {
        indicators.push(("boundary", Color::Red));
    }
    for (i, (label, color)) in indicators.into_iter().enumerate() {
        write!(buffer, "{}", if i == 0 { " " } else { ", " }).map_err(io)?;
        colored(buffer, color, false, label)?;
    }
    writeln!(buffer).map_err(io)?;

    write!(buffer, "{indent}  ").map_err(io)?;
    colored(buffer, Color::Green, false, "box:")?;
    writeln!(buffer, " {}", fmt_rect(engine.cached_rect(id))).map_err(io)
}

/// Render a table of every node's box and flags.
pub(crate) fn layout_table(engine: &mut Engine) -> Result<String> {
    engine.measure_all();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["key", "parent", "box", "flags"]);
    for n in snapshot(engine).nodes {
        let mut flags = Vec::new();
        if engine.is_focused(n.key.as_str()) {
            flags.push("focused".to_string());
        }
        if n.has_focused_child {
            flags.push("has-focused-child".into());
        }
        if !n.focusable {
            flags.push("container".into());
        }
        if n.disabled {
            flags.push("disabled".into());
        }
        if !n.boundary.is_empty() {
            let dirs: Vec<&str> = n.boundary.iter().map(|d| d.as_str()).collect();
            flags.push(format!("boundary({})", dirs.join(",")));
        }
        table.add_row(vec![
            Cell::new(n.key.as_str()).fg(comfy_table::Color::Green),
            Cell::new(n.parent.as_ref().map_or("", |p| p.as_str())),
            Cell::new(fmt_rect(n.rect)),
            Cell::new(flags.join(" ")),
        ]);
    }
    Ok(table.to_string())
}

/// A serializable picture of the registry and focus state. Boxes are
/// reported as cached; nothing is measured.
pub(crate) fn snapshot(engine: &Engine) -> Snapshot {
    let reg = engine.registry();
    let key = |id: Option<NodeId>| id.and_then(|i| reg.key(i)).cloned();
    let nodes = reg
        .preorder()
        .into_iter()
        .filter(|id| *id != reg.root())
        .filter_map(|id| {
            let node = reg.get(id)?;
            Some(NodeSnapshot {
                key: node.key.clone(),
                parent: node.parent.filter(|p| *p != reg.root()).and_then(|p| key(Some(p))),
                depth: depth(reg, id),
                rect: engine.cached_rect(id),
                focusable: node.focusable,
                disabled: node.disabled,
                boundary: node.boundary.directions(),
                has_focused_child: node.has_focused_child,
                last_focused_child: key(node.last_focused_child()),
                preferred_child: node.preferred_child.clone(),
            })
        })
        .collect();
    Snapshot {
        lifecycle: engine.lifecycle(),
        focused: engine.current_focus_key().cloned(),
        rtl: engine.rtl(),
        paused: engine.is_paused(),
        nodes,
    }
}
