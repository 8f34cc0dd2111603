//! Grid test utility for registering configurable grid layouts.

use crate::{
    engine::Engine,
    error::Result,
    geom::Rect,
    node::NodeConfig,
};

/// Side length of a grid cell.
pub const CELL: u32 = 10;

/// A registered grid of cells, optionally nested.
///
/// With recursion 0 the grid is a single cell. Each level of recursion
/// splits a container into `divisions` rows of `divisions` children. Cells
/// are named `cell_{x}_{y}` in cell coordinates. Containers are named
/// `container_{level}_{x}_{y}` and rows `row_{level}_{x}_{y}_{r}`, where
/// `level` is the remaining recursion depth.
pub struct Grid {
    /// Key of the outermost node.
    pub root: String,
    /// Recursion depth.
    recursion: usize,
    /// Number of subdivisions per level.
    divisions: usize,
}

impl Grid {
    /// Register a grid at the top level of the engine.
    pub fn install(engine: &mut Engine, recursion: usize, divisions: usize) -> Result<Self> {
        let root = build_node(engine, None, 0, 0, recursion, divisions)?;
        Ok(Self {
            root,
            recursion,
            divisions,
        })
    }

    /// Register a flat `cols` x `rows` grid of cells directly under
    /// `parent`, keyed `{prefix}_{x}_{y}`.
    pub fn flat(
        engine: &mut Engine,
        parent: Option<&str>,
        prefix: &str,
        cols: usize,
        rows: usize,
    ) -> Result<Vec<String>> {
        let mut keys = Vec::with_capacity(cols * rows);
        for y in 0..rows {
            for x in 0..cols {
                let mut config = NodeConfig::with_key(&format!("{prefix}_{x}_{y}"))
                    .rect(cell_rect(x, y));
                if let Some(p) = parent {
                    config = config.parent(p);
                }
                keys.push(engine.register(config)?.to_string());
            }
        }
        Ok(keys)
    }

    /// Number of cells along each side.
    pub fn dimensions(&self) -> (usize, usize) {
        let per_side = self.divisions.pow(self.recursion as u32);
        (per_side, per_side)
    }

    /// The box covering the whole grid.
    pub fn expected_size(&self) -> Rect {
        let (w, h) = self.dimensions();
        Rect::new(0, 0, w as u32 * CELL, h as u32 * CELL)
    }

    /// Key of the cell covering a point, if any.
    pub fn find_leaf_at(&self, x: u32, y: u32) -> Option<String> {
        let (w, h) = self.dimensions();
        let (cx, cy) = ((x / CELL) as usize, (y / CELL) as usize);
        (cx < w && cy < h).then(|| format!("cell_{cx}_{cy}"))
    }
}

/// The box of the cell at grid coordinates.
pub fn cell_rect(x: usize, y: usize) -> Rect {
    Rect::new((x as u32 * CELL) as i32, (y as u32 * CELL) as i32, CELL, CELL)
}

/// Recursively register grid nodes.
fn build_node(
    engine: &mut Engine,
    parent: Option<&str>,
    x: usize,
    y: usize,
    recursion: usize,
    divisions: usize,
) -> Result<String> {
    let attach = |config: NodeConfig| match parent {
        Some(p) => config.parent(p),
        None => config,
    };

    if recursion == 0 {
        let config = NodeConfig::with_key(&format!("cell_{x}_{y}")).rect(cell_rect(x, y));
        return Ok(engine.register(attach(config))?.to_string());
    }

    let name = format!("container_{recursion}_{x}_{y}");
    engine.register(attach(NodeConfig::with_key(&name).focusable(false)))?;

    let child_scale = divisions.pow((recursion - 1) as u32);
    for row in 0..divisions {
        let row_name = format!("row_{recursion}_{x}_{y}_{row}");
        engine.register(
            NodeConfig::with_key(&row_name)
                .parent(&name)
                .focusable(false),
        )?;
        for col in 0..divisions {
            let child_x = x + col * child_scale;
            let child_y = y + row * child_scale;
            build_node(
                engine,
                Some(&row_name),
                child_x,
                child_y,
                recursion - 1,
                divisions,
            )?;
        }
    }
    Ok(name)
}
