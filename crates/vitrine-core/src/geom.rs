//! Geometry primitives: [`Point`] and [`Range`].
//!
//! Widgets work in relative coordinates inside grid slices, so most of the
//! interesting operations here are about carving sub-rectangles out of a
//! parent rectangle and re-basing positions between the two.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};

use crate::messages::Msg;

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D integer position. X grows right, Y grows down (screen coordinates).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Origin (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The point translated by (dx, dy).
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Whether the point lies inside the half-open rectangle `r`.
    #[inline]
    pub fn in_range(self, r: &Range) -> bool {
        r.contains(self)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open rectangle \[min, max): `min` is inclusive, `max` exclusive.
///
/// Every empty range describes the same (empty) set of points, so all empty
/// ranges compare equal and hash alike regardless of their coordinates.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl PartialEq for Range {
    fn eq(&self, other: &Self) -> bool {
        (self.min == other.min && self.max == other.max) || (self.is_empty() && other.is_empty())
    }
}

impl Eq for Range {}

impl Hash for Range {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.is_empty() {
            Point::ZERO.hash(state);
            Point::ZERO.hash(state);
        } else {
            self.min.hash(state);
            self.max.hash(state);
        }
    }
}

impl Range {
    /// Build a range from two corners, swapping coordinates as needed so
    /// that `min` ≤ `max` on both axes.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// Build a range from an origin and a width/height pair.
    #[inline]
    pub fn with_size(origin: Point, width: i32, height: i32) -> Self {
        Self::new(origin.x, origin.y, origin.x + width, origin.y + height)
    }

    /// Size as a `Point` (x = width, y = height).
    #[inline]
    pub fn size(self) -> Point {
        Point::new(self.max.x - self.min.x, self.max.y - self.min.y)
    }

    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    /// Whether the range covers zero area.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Whether `p` lies inside the range.
    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// The range translated by `+p`. Also spelled `range + point`.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, p: Point) -> Self {
        Self {
            min: self.min + p,
            max: self.max + p,
        }
    }

    /// The range translated by `-p`. Also spelled `range - point`.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn sub(self, p: Point) -> Self {
        Self {
            min: self.min - p,
            max: self.max - p,
        }
    }

    /// Shift the two corners independently: `min` by `(dx0, dy0)` and `max`
    /// by `(dx1, dy1)`. Useful for insetting. A result with zero area
    /// normalizes to the empty range.
    #[inline]
    pub fn shift(self, dx0: i32, dy0: i32, dx1: i32, dy1: i32) -> Self {
        let r = Self {
            min: self.min.shift(dx0, dy0),
            max: self.max.shift(dx1, dy1),
        };
        if r.is_empty() { Self::default() } else { r }
    }

    /// Intersection of two ranges. Non-overlapping ranges intersect to the
    /// zero (empty) range.
    #[inline]
    pub fn intersect(self, other: Range) -> Self {
        let r = Self {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if r.is_empty() { Self::default() } else { r }
    }

    /// Smallest range containing both ranges.
    #[inline]
    pub fn union(self, other: Range) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Restrict the range to its **relative** row `y` (0 = first row), or
    /// the empty range when `y` is out of bounds.
    #[inline]
    pub fn line(self, y: i32) -> Self {
        if self.min.shift(0, y).in_range(&self) {
            Self {
                min: Point::new(self.min.x, self.min.y + y),
                max: Point::new(self.max.x, self.min.y + y + 1),
            }
        } else {
            Self::default()
        }
    }

    /// Restrict the range to its **relative** rows `[y0, y1)`, clamped to
    /// the rows that actually exist.
    #[inline]
    pub fn lines(self, y0: i32, y1: i32) -> Self {
        let rows = Self {
            min: Point::new(self.min.x, self.min.y + y0),
            max: Point::new(self.max.x, self.min.y + y1),
        };
        self.intersect(rows)
    }

    /// Restrict the range to its **relative** column `x` (0 = first column),
    /// or the empty range when `x` is out of bounds.
    #[inline]
    pub fn column(self, x: i32) -> Self {
        self.columns(x, x + 1)
    }

    /// Restrict the range to its **relative** columns `[x0, x1)`, clamped to
    /// the columns that actually exist.
    #[inline]
    pub fn columns(self, x0: i32, x1: i32) -> Self {
        let cols = Self {
            min: Point::new(self.min.x + x0, self.min.y),
            max: Point::new(self.min.x + x1, self.max.y),
        };
        self.intersect(cols)
    }

    /// Re-base a [`Msg`] into this range's coordinate space: mouse positions
    /// get `min` subtracted, every other message passes through unchanged.
    /// Used by hosts when routing messages into a grid slice.
    pub fn rel_msg(self, msg: Msg) -> Msg {
        match msg {
            Msg::Mouse {
                action,
                pos,
                modifiers,
                time,
            } => Msg::Mouse {
                action,
                pos: pos - self.min,
                modifiers,
                time,
            },
            other => other,
        }
    }

    /// Row-major iterator over every point in the range.
    #[inline]
    pub fn iter(self) -> RangeIter {
        RangeIter {
            range: self,
            cur: self.min,
        }
    }
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = RangeIter;
    #[inline]
    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

impl Add<Point> for Range {
    type Output = Range;
    #[inline]
    fn add(self, p: Point) -> Range {
        Range {
            min: self.min + p,
            max: self.max + p,
        }
    }
}

impl Sub<Point> for Range {
    type Output = Range;
    #[inline]
    fn sub(self, p: Point) -> Range {
        Range {
            min: self.min - p,
            max: self.max - p,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{})", self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// RangeIter
// ---------------------------------------------------------------------------

/// Row-major iterator over the points of a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    cur: Point,
}

impl Iterator for RangeIter {
    type Item = Point;

    #[inline]
    fn next(&mut self) -> Option<Point> {
        if self.range.is_empty() || self.cur.y >= self.range.max.y {
            return None;
        }
        let p = self.cur;
        self.cur.x += 1;
        if self.cur.x >= self.range.max.x {
            self.cur.x = self.range.min.x;
            self.cur.y += 1;
        }
        Some(p)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.range.is_empty() || self.cur.y >= self.range.max.y {
            return (0, Some(0));
        }
        let w = self.range.width() as usize;
        let in_row = (self.range.max.x - self.cur.x) as usize;
        let rows_below = (self.range.max.y - self.cur.y - 1) as usize;
        let total = in_row + rows_below * w;
        (total, Some(total))
    }
}

impl ExactSizeIterator for RangeIter {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Key, ModMask, MouseAction};
    use std::collections::HashSet;
    use std::time::Instant;

    #[test]
    fn point_ops() {
        let a = Point::new(2, 5);
        let b = Point::new(1, -2);
        assert_eq!(a + b, Point::new(3, 3));
        assert_eq!(a - b, Point::new(1, 7));
        assert_eq!(a.shift(-2, 0), Point::new(0, 5));
    }

    #[test]
    fn range_construction_canonicalizes() {
        let r = Range::new(5, 4, 1, 0);
        assert_eq!(r.min, Point::new(1, 0));
        assert_eq!(r.max, Point::new(5, 4));
        assert_eq!(r.size(), Point::new(4, 4));
    }

    #[test]
    fn range_with_size() {
        let r = Range::with_size(Point::new(3, 1), 7, 2);
        assert_eq!(r.min, Point::new(3, 1));
        assert_eq!(r.max, Point::new(10, 3));
        assert_eq!(r.width(), 7);
        assert_eq!(r.height(), 2);
    }

    #[test]
    fn range_contains_half_open() {
        let r = Range::new(0, 0, 4, 2);
        assert!(r.contains(Point::new(0, 0)));
        assert!(r.contains(Point::new(3, 1)));
        assert!(!r.contains(Point::new(4, 0)));
        assert!(!r.contains(Point::new(0, 2)));
    }

    #[test]
    fn range_intersect_and_union() {
        let a = Range::new(0, 0, 6, 6);
        let b = Range::new(4, 4, 9, 9);
        assert_eq!(a.intersect(b), Range::new(4, 4, 6, 6));
        assert_eq!(a.union(b), Range::new(0, 0, 9, 9));
        // Disjoint ranges intersect to the normalized empty range.
        let c = Range::new(20, 20, 22, 22);
        assert_eq!(a.intersect(c), Range::default());
    }

    #[test]
    fn range_translation() {
        let r = Range::new(1, 1, 3, 3);
        let p = Point::new(10, -1);
        assert_eq!(r + p, Range::new(11, 0, 13, 2));
        assert_eq!((r + p) - p, r);
    }

    #[test]
    fn range_shift_insets_and_normalizes_empties() {
        let r = Range::new(1, 1, 5, 5);
        assert_eq!(r.shift(1, 1, -1, -1), Range::new(2, 2, 4, 4));
        // Shrinking past zero area yields the normalized empty range.
        let collapsed = r.shift(4, 0, 0, 0);
        assert!(collapsed.is_empty());
        assert_eq!(collapsed, Range::default());
    }

    #[test]
    fn range_line_and_lines() {
        let r = Range::new(2, 3, 8, 7); // 6 wide, 4 tall
        assert_eq!(r.line(0), Range::new(2, 3, 8, 4));
        assert_eq!(r.line(3), Range::new(2, 6, 8, 7));
        assert!(r.line(4).is_empty());
        assert!(r.line(-1).is_empty());
        assert_eq!(r.lines(1, 3), Range::new(2, 4, 8, 6));
        // Clamped to the rows that exist.
        assert_eq!(r.lines(2, 99), Range::new(2, 5, 8, 7));
    }

    #[test]
    fn range_column_and_columns() {
        let r = Range::new(2, 3, 8, 7); // 6 wide, 4 tall
        assert_eq!(r.column(0), Range::new(2, 3, 3, 7));
        assert_eq!(r.column(5), Range::new(7, 3, 8, 7));
        assert!(r.column(6).is_empty());
        assert_eq!(r.columns(1, 4), Range::new(3, 3, 6, 7));
        assert_eq!(r.columns(4, 99), Range::new(6, 3, 8, 7));
    }

    #[test]
    fn empty_ranges_are_equal_and_hash_alike() {
        let a = Range::default();
        let b = Range {
            min: Point::new(7, 7),
            max: Point::new(7, 7),
        };
        assert_eq!(a, b);
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn range_iter_row_major() {
        let r = Range::new(1, 1, 3, 3);
        let pts: Vec<_> = r.iter().collect();
        assert_eq!(
            pts,
            vec![
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(1, 2),
                Point::new(2, 2),
            ]
        );
        assert_eq!(r.iter().len(), 4);
        assert_eq!(Range::default().iter().count(), 0);
    }

    #[test]
    fn rel_msg_rebases_mouse_only() {
        let r = Range::new(10, 5, 30, 9);
        let moved = r.rel_msg(Msg::Mouse {
            action: MouseAction::Move,
            pos: Point::new(14, 6),
            modifiers: ModMask::NONE,
            time: Instant::now(),
        });
        match moved {
            Msg::Mouse { pos, .. } => assert_eq!(pos, Point::new(4, 1)),
            other => panic!("expected Mouse, got {other:?}"),
        }
        match r.rel_msg(Msg::key(Key::Escape)) {
            Msg::KeyDown { key, .. } => assert_eq!(key, Key::Escape),
            other => panic!("expected KeyDown, got {other:?}"),
        }
    }
}
