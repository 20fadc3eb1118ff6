//! [`Cell`] and [`Grid`] — a shared-buffer grid of styled characters.
//!
//! A `Grid` is a *view* into shared backing storage: cloning it, or calling
//! [`slice`](Grid::slice), yields another view over the **same** cells with
//! possibly narrower bounds. Positions passed to [`at`](Grid::at),
//! [`set`](Grid::set) and friends are relative to the view, so a widget
//! handed a slice draws from `(0, 0)` without knowing where on screen the
//! slice sits.
//!
//! Reads and writes outside a view's bounds silently do nothing; a missing
//! target is never an error anywhere in this workspace.

use std::cell::RefCell;
use std::rc::Rc;

use crate::geom::{Point, Range};
use crate::style::Style;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A single styled character.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    #[inline]
    pub const fn with_char(mut self, ch: char) -> Self {
        self.ch = ch;
        self
    }

    #[inline]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Buffer {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
}

impl Buffer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![Cell::default(); width * height],
            width,
            height,
        }
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some((y as usize) * self.width + (x as usize))
        } else {
            None
        }
    }
}

/// A 2D grid of [`Cell`]s with slice semantics and view-relative positions.
#[derive(Debug, Clone)]
pub struct Grid {
    buffer: Rc<RefCell<Buffer>>,
    bounds: Range,
}

impl Grid {
    /// A new grid of the given dimensions, filled with blank cells.
    pub fn new(width: i32, height: i32) -> Self {
        let w = width.max(0);
        let h = height.max(0);
        Self {
            buffer: Rc::new(RefCell::new(Buffer::new(w as usize, h as usize))),
            bounds: Range::new(0, 0, w, h),
        }
    }

    /// Where this view sits within the underlying grid.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// The view's own coordinate range, `(0, 0)` to its size.
    #[inline]
    pub fn range_(&self) -> Range {
        Range::new(0, 0, self.bounds.width(), self.bounds.height())
    }

    #[inline]
    pub fn size(&self) -> Point {
        self.bounds.size()
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// Whether the view-relative position `p` is inside this view.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.range_().contains(p)
    }

    /// A narrower view over the same storage. `r` is relative to this view
    /// and is clipped against it.
    pub fn slice(&self, r: Range) -> Grid {
        let abs = r.add(self.bounds.min);
        Grid {
            buffer: Rc::clone(&self.buffer),
            bounds: self.bounds.intersect(abs),
        }
    }

    /// The cell at view-relative `p`, or a blank cell when out of bounds.
    pub fn at(&self, p: Point) -> Cell {
        if !self.contains(p) {
            return Cell::default();
        }
        let q = p.shift(self.bounds.min.x, self.bounds.min.y);
        let buf = self.buffer.borrow();
        buf.index(q.x, q.y)
            .map(|i| buf.cells[i])
            .unwrap_or_default()
    }

    /// Write the cell at view-relative `p`. Out of bounds: does nothing.
    pub fn set(&self, p: Point, cell: Cell) {
        if !self.contains(p) {
            return;
        }
        let q = p.shift(self.bounds.min.x, self.bounds.min.y);
        let mut buf = self.buffer.borrow_mut();
        if let Some(i) = buf.index(q.x, q.y) {
            buf.cells[i] = cell;
        }
    }

    /// Fill every cell of this view with `cell`.
    pub fn fill(&self, cell: Cell) {
        let mut buf = self.buffer.borrow_mut();
        for p in self.bounds.iter() {
            if let Some(i) = buf.index(p.x, p.y) {
                buf.cells[i] = cell;
            }
        }
    }

    /// Apply `f` to every cell of this view, replacing each with the return
    /// value. Positions handed to `f` are view-relative.
    pub fn map_cells<F: Fn(Point, Cell) -> Cell>(&self, f: F) {
        let mut buf = self.buffer.borrow_mut();
        for p in self.bounds.iter() {
            if let Some(i) = buf.index(p.x, p.y) {
                let rel = p.shift(-self.bounds.min.x, -self.bounds.min.y);
                buf.cells[i] = f(rel, buf.cells[i]);
            }
        }
    }

    /// Copy cells from `src`, aligning the two views' origins. The copied
    /// area is the smaller of the two sizes, which is returned.
    pub fn copy_from(&self, src: &Grid) -> Point {
        let w = src.bounds.width().min(self.bounds.width());
        let h = src.bounds.height().min(self.bounds.height());
        let src_buf = src.buffer.borrow();
        let mut dst_buf = self.buffer.borrow_mut();
        for dy in 0..h {
            for dx in 0..w {
                let sp = Point::new(src.bounds.min.x + dx, src.bounds.min.y + dy);
                let dp = Point::new(self.bounds.min.x + dx, self.bounds.min.y + dy);
                if let (Some(si), Some(di)) = (src_buf.index(sp.x, sp.y), dst_buf.index(dp.x, dp.y))
                {
                    dst_buf.cells[di] = src_buf.cells[si];
                }
            }
        }
        Point::new(w, h)
    }

    /// Grow or shrink the backing storage to the new dimensions, preserving
    /// the overlapping cells. The view's bounds become the full new size.
    pub fn resize(&mut self, width: i32, height: i32) {
        let w = width.max(0) as usize;
        let h = height.max(0) as usize;
        {
            let mut buf = self.buffer.borrow_mut();
            let mut cells = vec![Cell::default(); w * h];
            for y in 0..h.min(buf.height) {
                for x in 0..w.min(buf.width) {
                    cells[y * w + x] = buf.cells[y * buf.width + x];
                }
            }
            buf.cells = cells;
            buf.width = w;
            buf.height = h;
        }
        self.bounds = Range::new(0, 0, w as i32, h as i32);
    }

    /// Row-major iterator over view-relative `(Point, Cell)` pairs.
    pub fn iter(&self) -> GridIter<'_> {
        GridIter {
            grid: self,
            inner: self.range_().iter(),
        }
    }
}

/// Iterator over the `(Point, Cell)` pairs of a [`Grid`] view.
pub struct GridIter<'a> {
    grid: &'a Grid,
    inner: crate::geom::RangeIter,
}

impl Iterator for GridIter<'_> {
    type Item = (Point, Cell);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let p = self.inner.next()?;
        Some((p, self.grid.at(p)))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One changed cell in a [`Frame`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameCell {
    pub cell: Cell,
    pub pos: Point,
}

/// The set of cells that changed between two draws, for the driver to
/// flush.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    pub cells: Vec<FrameCell>,
    pub width: i32,
    pub height: i32,
}

/// Diff `curr` against `prev`, returning only the cells that differ.
pub fn compute_frame(prev: &Grid, curr: &Grid) -> Frame {
    let range = curr.range_();
    let mut cells = Vec::new();
    for p in range.iter() {
        let c = curr.at(p);
        if prev.at(p) != c {
            cells.push(FrameCell { cell: c, pos: p });
        }
    }
    Frame {
        cells,
        width: range.width(),
        height: range.height(),
    }
}
