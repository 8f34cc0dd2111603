use serde::{Deserialize, Serialize};

use crate::{Axis, Point};

/// A rectangle with a signed origin and unsigned size.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

/// Clamp a wide coordinate back into `i32` range.
fn narrow(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl Rect {
    /// Construct a rectangle from coordinates and size.
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// Does this rect have a zero size?
    pub fn is_zero(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Left edge.
    pub fn left(&self) -> i64 {
        i64::from(self.tl.x)
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i64 {
        i64::from(self.tl.x) + i64::from(self.w)
    }

    /// Top edge.
    pub fn top(&self) -> i64 {
        i64::from(self.tl.y)
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i64 {
        i64::from(self.tl.y) + i64::from(self.h)
    }

    /// Center point in doubled coordinates: `(2x + w, 2y + h)`.
    ///
    /// Doubling keeps odd-sized boxes exact, so comparisons between centers
    /// never depend on rounding.
    pub fn center2(&self) -> (i64, i64) {
        (
            2 * self.left() + i64::from(self.w),
            2 * self.top() + i64::from(self.h),
        )
    }

    /// The doubled center coordinate on one axis.
    pub fn center2_on(&self, axis: Axis) -> i64 {
        let (x, y) = self.center2();
        match axis {
            Axis::Horizontal => x,
            Axis::Vertical => y,
        }
    }

    /// The half-open extent `[lo, hi)` of this rect along an axis.
    pub fn span(&self, axis: Axis) -> (i64, i64) {
        match axis {
            Axis::Horizontal => (self.left(), self.right()),
            Axis::Vertical => (self.top(), self.bottom()),
        }
    }

    /// The size of this rect along an axis.
    pub fn extent(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Horizontal => self.w,
            Axis::Vertical => self.h,
        }
    }

    /// Do the horizontal extents of the two rects overlap?
    pub fn overlaps_horizontal(&self, other: Self) -> bool {
        self.left() < other.right() && other.left() < self.right()
    }

    /// Do the vertical extents of the two rects overlap?
    pub fn overlaps_vertical(&self, other: Self) -> bool {
        self.top() < other.bottom() && other.top() < self.bottom()
    }

    /// Does this rect fully contain `other`?
    pub fn contains_rect(&self, other: Self) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Smallest rect covering both `self` and `other`.
    pub fn union(&self, other: Self) -> Self {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(
            narrow(left),
            narrow(top),
            (right - left).clamp(0, i64::from(u32::MAX)) as u32,
            (bottom - top).clamp(0, i64::from(u32::MAX)) as u32,
        )
    }

    /// Reflect this rect across the vertical line `x = extent / 2`, so a box
    /// at `x` becomes a box at `extent - x - w`.
    pub fn mirror_horizontal(&self, extent: i32) -> Self {
        Self::new(
            narrow(i64::from(extent) - self.right()),
            self.tl.y,
            self.w,
            self.h,
        )
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn edges_and_centers() {
        let r = Rect::new(-5, 10, 11, 4);
        assert_eq!(r.left(), -5);
        assert_eq!(r.right(), 6);
        assert_eq!(r.top(), 10);
        assert_eq!(r.bottom(), 14);
        assert_eq!(r.center2(), (1, 24));
        assert_eq!(r.span(Axis::Vertical), (10, 14));
        assert_eq!(r.extent(Axis::Horizontal), 11);
    }

    #[test]
    fn overlaps() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.overlaps_vertical(Rect::new(20, 5, 10, 10)));
        assert!(!a.overlaps_vertical(Rect::new(20, 10, 10, 10)));
        assert!(a.overlaps_horizontal(Rect::new(9, 40, 10, 10)));
        assert!(!a.overlaps_horizontal(Rect::new(10, 40, 10, 10)));
    }

    #[test]
    fn union() {
        let u = Rect::new(0, 0, 10, 10).union(Rect::new(20, -5, 5, 5));
        assert_eq!(u, Rect::new(0, -5, 25, 15));
    }

    #[test]
    fn mirror() {
        let r = Rect::new(20, 3, 10, 10);
        assert_eq!(r.mirror_horizontal(100), Rect::new(70, 3, 10, 10));
    }

    proptest! {
        #[test]
        fn mirror_is_involution(
            x in -1000i32..1000, y in -1000i32..1000,
            w in 0u32..500, h in 0u32..500, extent in 0i32..4000,
        ) {
            let r = Rect::new(x, y, w, h);
            prop_assert_eq!(r.mirror_horizontal(extent).mirror_horizontal(extent), r);
            let (cx, cy) = r.center2();
            let (mx, my) = r.mirror_horizontal(extent).center2();
            prop_assert_eq!(mx, 2 * i64::from(extent) - cx);
            prop_assert_eq!(my, cy);
        }

        #[test]
        fn union_covers_both(
            ax in -500i32..500, ay in -500i32..500, aw in 0u32..200, ah in 0u32..200,
            bx in -500i32..500, by in -500i32..500, bw in 0u32..200, bh in 0u32..200,
        ) {
            let a = Rect::new(ax, ay, aw, ah);
            let b = Rect::new(bx, by, bw, bh);
            let u = a.union(b);
            prop_assert!(u.contains_rect(a));
            prop_assert!(u.contains_rect(b));
        }
    }
}
