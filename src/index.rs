//! Dimensional indexes and index ranges.
//!
//! An index addresses one cell of a lattice; a range pairs a start index
//! with an extent and describes a rectangular sub-box. Ranges and extents
//! iterate their indexes in row-major order (outer axis first).

use crate::extent::{Extent1d, Extent2d, Extent3d};

/// A 1-d cell index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Index1d {
    pub value: usize,
}

impl Index1d {
    pub const fn new(value: usize) -> Self {
        Self { value }
    }
}

/// A 2-d cell index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Index2d {
    pub row: usize,
    pub col: usize,
}

impl Index2d {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A 3-d cell index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Index3d {
    pub slice: usize,
    pub row: usize,
    pub col: usize,
}

impl Index3d {
    pub const fn new(slice: usize, row: usize, col: usize) -> Self {
        Self { slice, row, col }
    }
}

// ============================================================================
// Ranges
// ============================================================================

/// A 1-d sub-box: start index plus extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range1d {
    start: Index1d,
    extent: Extent1d,
}

impl Range1d {
    pub const fn new(start: Index1d, extent: Extent1d) -> Self {
        Self { start, extent }
    }

    pub const fn start(&self) -> Index1d {
        self.start
    }

    pub const fn extent(&self) -> Extent1d {
        self.extent
    }
}

impl From<Extent1d> for Range1d {
    fn from(extent: Extent1d) -> Self {
        Self::new(Index1d::new(0), extent)
    }
}

impl IntoIterator for Range1d {
    type Item = usize;
    type IntoIter = std::ops::Range<usize>;

    fn into_iter(self) -> std::ops::Range<usize> {
        self.start.value..self.start.value + self.extent.size()
    }
}

/// A 2-d sub-box: start index plus extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range2d {
    start: Index2d,
    extent: Extent2d,
}

impl Range2d {
    pub const fn new(start: Index2d, extent: Extent2d) -> Self {
        Self { start, extent }
    }

    pub const fn start(&self) -> Index2d {
        self.start
    }

    pub const fn extent(&self) -> Extent2d {
        self.extent
    }
}

impl From<Extent2d> for Range2d {
    fn from(extent: Extent2d) -> Self {
        Self::new(Index2d::new(0, 0), extent)
    }
}

/// A 3-d sub-box: start index plus extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range3d {
    start: Index3d,
    extent: Extent3d,
}

impl Range3d {
    pub const fn new(start: Index3d, extent: Extent3d) -> Self {
        Self { start, extent }
    }

    pub const fn start(&self) -> Index3d {
        self.start
    }

    pub const fn extent(&self) -> Extent3d {
        self.extent
    }
}

impl From<Extent3d> for Range3d {
    fn from(extent: Extent3d) -> Self {
        Self::new(Index3d::new(0, 0, 0), extent)
    }
}

// ============================================================================
// Row-major index iterators
// ============================================================================

/// Row-major iterator over the indexes of a [`Range2d`].
#[derive(Clone, Debug)]
pub struct Index2dIter {
    start_col: usize,
    end_row: usize,
    end_col: usize,
    row: usize,
    col: usize,
}

impl Index2dIter {
    pub fn new(range: Range2d) -> Self {
        let empty = range.extent().rows() == 0 || range.extent().cols() == 0;
        let start = range.start();
        let end_row = start.row + range.extent().rows();

        Self {
            start_col: start.col,
            end_row,
            end_col: start.col + range.extent().cols(),
            row: if empty { end_row } else { start.row },
            col: start.col,
        }
    }
}

impl Iterator for Index2dIter {
    type Item = Index2d;

    fn next(&mut self) -> Option<Index2d> {
        if self.row >= self.end_row {
            return None;
        }

        let index = Index2d::new(self.row, self.col);
        self.col += 1;
        if self.col >= self.end_col {
            self.col = self.start_col;
            self.row += 1;
        }

        Some(index)
    }
}

impl IntoIterator for Range2d {
    type Item = Index2d;
    type IntoIter = Index2dIter;

    fn into_iter(self) -> Index2dIter {
        Index2dIter::new(self)
    }
}

/// Row-major iterator over the indexes of a [`Range3d`], outermost
/// (slice) axis first.
#[derive(Clone, Debug)]
pub struct Index3dIter {
    start_row: usize,
    start_col: usize,
    end_slice: usize,
    end_row: usize,
    end_col: usize,
    slice: usize,
    row: usize,
    col: usize,
}

impl Index3dIter {
    pub fn new(range: Range3d) -> Self {
        let extent = range.extent();
        let empty = extent.slices() == 0 || extent.rows() == 0 || extent.cols() == 0;
        let start = range.start();
        let end_slice = start.slice + extent.slices();

        Self {
            start_row: start.row,
            start_col: start.col,
            end_slice,
            end_row: start.row + extent.rows(),
            end_col: start.col + extent.cols(),
            slice: if empty { end_slice } else { start.slice },
            row: start.row,
            col: start.col,
        }
    }
}

impl Iterator for Index3dIter {
    type Item = Index3d;

    fn next(&mut self) -> Option<Index3d> {
        if self.slice >= self.end_slice {
            return None;
        }

        let index = Index3d::new(self.slice, self.row, self.col);
        self.col += 1;
        if self.col >= self.end_col {
            self.col = self.start_col;
            self.row += 1;
            if self.row >= self.end_row {
                self.row = self.start_row;
                self.slice += 1;
            }
        }

        Some(index)
    }
}

impl IntoIterator for Range3d {
    type Item = Index3d;
    type IntoIter = Index3dIter;

    fn into_iter(self) -> Index3dIter {
        Index3dIter::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range2d_iterates_row_major() {
        let range = Range2d::new(Index2d::new(1, 2), Extent2d::new(2, 3).unwrap());
        let indexes: Vec<_> = range.into_iter().map(|i| (i.row, i.col)).collect();

        assert_eq!(
            indexes,
            vec![(1, 2), (1, 3), (1, 4), (2, 2), (2, 3), (2, 4)]
        );
    }

    #[test]
    fn empty_range2d_yields_nothing() {
        let range = Range2d::new(Index2d::new(0, 0), Extent2d::new(0, 5).unwrap());
        assert_eq!(range.into_iter().count(), 0);

        let range = Range2d::new(Index2d::new(3, 3), Extent2d::new(4, 0).unwrap());
        assert_eq!(range.into_iter().count(), 0);
    }

    #[test]
    fn range3d_iterates_slice_first() {
        let range = Range3d::new(Index3d::new(0, 0, 0), Extent3d::new(2, 1, 2).unwrap());
        let indexes: Vec<_> = range
            .into_iter()
            .map(|i| (i.slice, i.row, i.col))
            .collect();

        assert_eq!(
            indexes,
            vec![(0, 0, 0), (0, 0, 1), (1, 0, 0), (1, 0, 1)]
        );
    }
}
