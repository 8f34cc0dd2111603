//! Directional resolution: pick the best node to move to from a given node.
//!
//! Resolution works one containment level at a time. The siblings of the
//! origin are scored first; if none lies in the requested direction, the
//! parent becomes the origin and its siblings are tried, and so on towards
//! the root. A boundary that blocks the direction stops the climb.
//!
//! All distances are measured in doubled coordinates (see
//! [`Rect::center2`]) so that mirrored layouts score identically.

use tracing::debug;

use crate::{
    geom::{Axis, Direction, Rect},
    geometry::Geometry,
    key::NodeId,
    options::{DistanceMethod, Options},
    registry::Registry,
    walker::is_navigable,
};

/// Scoring parameters, taken from [`Options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scoring {
    /// Multiplier on the primary distance.
    pub primary_weight: u64,
    /// Alignment tolerance as a percentage of the origin's perpendicular
    /// size.
    pub alignment_tolerance: u32,
    /// Primary distance measure.
    pub distance: DistanceMethod,
}

impl Default for Scoring {
    fn default() -> Self {
        Self::from(&Options::default())
    }
}

impl From<&Options> for Scoring {
    fn from(o: &Options) -> Self {
        Self {
            primary_weight: o.primary_weight,
            alignment_tolerance: o.alignment_tolerance,
            distance: o.distance,
        }
    }
}

/// The score of one candidate. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score {
    /// Weighted primary distance plus perpendicular offset.
    pub total: u64,
    /// Perpendicular center offset, the first tie-break.
    pub perpendicular: u64,
    /// Primary-axis distance.
    pub primary: u64,
}

/// Is the candidate's perpendicular span within reach of the origin's,
/// after widening the origin by the alignment tolerance?
fn aligned(origin: Rect, cand: Rect, cross: Axis, tolerance: u32) -> bool {
    let (olo, ohi) = origin.span(cross);
    let (clo, chi) = cand.span(cross);
    // Full-range extents times full-range tolerances exceed i64.
    let (olo, ohi, clo, chi) = (
        i128::from(olo),
        i128::from(ohi),
        i128::from(clo),
        i128::from(chi),
    );
    let slack = 2 * i128::from(origin.extent(cross)) * i128::from(tolerance) / 100;
    2 * clo < 2 * ohi + slack && 2 * olo - slack < 2 * chi
}

/// Score `cand` as a move from `origin` in `dir`. Returns `None` if the
/// candidate is not in that direction or is out of alignment.
pub fn score(origin: Rect, cand: Rect, dir: Direction, scoring: &Scoring) -> Option<Score> {
    if cand.is_zero() {
        return None;
    }
    let axis = dir.axis();
    let cross = axis.cross();

    let oc = origin.center2_on(axis);
    let cc = cand.center2_on(axis);
    let beyond = if dir.is_forward() { cc > oc } else { cc < oc };
    if !beyond || !aligned(origin, cand, cross, scoring.alignment_tolerance) {
        return None;
    }

    let primary = match scoring.distance {
        DistanceMethod::Edges => {
            let (olo, ohi) = origin.span(axis);
            let (clo, chi) = cand.span(axis);
            let gap = if dir.is_forward() { clo - ohi } else { olo - chi };
            2 * gap.max(0).unsigned_abs()
        }
        DistanceMethod::Center => oc.abs_diff(cc),
    };
    let perpendicular = origin.center2_on(cross).abs_diff(cand.center2_on(cross));
    let total = primary
        .saturating_mul(scoring.primary_weight)
        .saturating_add(perpendicular);
    Some(Score {
        total,
        perpendicular,
        primary,
    })
}

/// The best navigable sibling of `origin` in `dir`, if any.
fn best_sibling(
    reg: &Registry,
    geom: &mut Geometry,
    origin: NodeId,
    origin_rect: Rect,
    dir: Direction,
    scoring: &Scoring,
    debug: bool,
) -> Option<NodeId> {
    let parent = reg.parent(origin)?;
    let mut best: Option<(Score, u64, NodeId)> = None;
    for &id in &reg.get(parent)?.children {
        if id == origin || !is_navigable(reg, id) {
            continue;
        }
        let Some(rect) = geom.rect(&reg.nodes, id) else {
            continue;
        };
        let Some(s) = score(origin_rect, rect, dir, scoring) else {
            continue;
        };
        let seq = reg.get(id).map_or(u64::MAX, |n| n.seq);
        if debug {
            debug!(
                candidate = %reg.key(id).map(|k| k.as_str()).unwrap_or_default(),
                total = s.total,
                primary = s.primary,
                perpendicular = s.perpendicular,
                "scored"
            );
        }
        let rank = (s.total, s.perpendicular, seq);
        if best.is_none_or(|(b, bseq, _)| rank < (b.total, b.perpendicular, bseq)) {
            best = Some((s, seq, id));
        }
    }
    best.map(|(_, _, id)| id)
}

/// Find the node to move to from `from` in `dir`. The direction must
/// already be RTL-adjusted. The result is not redirected: it may be a
/// container.
pub(crate) fn resolve(
    reg: &Registry,
    geom: &mut Geometry,
    from: NodeId,
    dir: Direction,
    scoring: &Scoring,
    debug: bool,
) -> Option<NodeId> {
    let mut origin = from;
    loop {
        let node = reg.get(origin)?;
        if node.boundary.blocks(dir) {
            if debug {
                debug!(boundary = %node.key, %dir, "blocked at boundary");
            }
            return None;
        }
        let parent = node.parent?;

        if let Some(origin_rect) = geom.rect(&reg.nodes, origin)
            && let Some(found) =
                best_sibling(reg, geom, origin, origin_rect, dir, scoring, debug)
        {
            return Some(found);
        }

        if parent == reg.root() {
            return None;
        }
        if debug {
            debug!(from = %node.key, %dir, "no candidate at this level, climbing");
        }
        origin = parent;
    }
}
