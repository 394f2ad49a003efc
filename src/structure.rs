//! Structures: extent plus layout, and the view transforms over them.
//!
//! A structure is a value object; every transform returns a *new*
//! structure describing a different window onto the same storage. No
//! transform touches element data, so all of them are O(1).
//!
//! The transforms compose exactly: `range ∘ range` is a `range` with
//! combined starts, `stride ∘ stride` multiplies the steps, and
//! `transpose ∘ transpose` is the identity.

use crate::extent::{Extent1d, Extent2d, Extent3d};
use crate::index::{Range1d, Range2d, Range3d};
use crate::layout::{Layout1d, Layout2d, Layout3d, Stride1d, Stride2d, Stride3d};
use crate::{Error, Result};

/// Extent of a strided view: `(old - 1)/step + 1` elements survive when
/// keeping every `step`-th of `old`.
fn strided_axis(old: usize, step: usize) -> usize {
    if old != 0 {
        (old - 1) / step + 1
    } else {
        0
    }
}

/// A 1-d structure: extent plus layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Structure1d {
    extent: Extent1d,
    layout: Layout1d,
}

impl Structure1d {
    /// A structure with the default contiguous layout.
    pub fn new(extent: Extent1d) -> Self {
        Self {
            extent,
            layout: Layout1d::contiguous(),
        }
    }

    pub const fn with_layout(extent: Extent1d, layout: Layout1d) -> Self {
        Self { extent, layout }
    }

    pub const fn extent(&self) -> Extent1d {
        self.extent
    }

    pub const fn layout(&self) -> Layout1d {
        self.layout
    }

    /// The flat buffer offset of the given index.
    #[inline]
    pub fn offset(&self, index: usize) -> isize {
        self.layout.offset(index)
    }

    /// Restrict the view to the given sub-box.
    pub fn range(&self, range: Range1d) -> Result<Self> {
        let start = range.start().value;
        if start + range.extent().size() > self.extent.size() {
            return Err(Error::IndexOutOfBounds {
                index: vec![start],
                extent: vec![self.extent.size()],
            });
        }

        Ok(Self::with_layout(
            range.extent(),
            Layout1d::new(self.layout.offset(start), self.layout.stride()),
        ))
    }

    /// Keep every `step`-th element. The step must be positive.
    pub fn stride(&self, stride: Stride1d) -> Result<Self> {
        if stride.value < 1 {
            return Err(Error::InvalidArgument("stride steps must be >= 1"));
        }

        let step = stride.value as usize;
        Ok(Self::with_layout(
            Extent1d::new(strided_axis(self.extent.size(), step))?,
            Layout1d::new(
                self.layout.start(),
                Stride1d::new(self.layout.stride().value * stride.value),
            ),
        ))
    }
}

/// A 2-d structure: extent plus layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Structure2d {
    extent: Extent2d,
    layout: Layout2d,
}

impl Structure2d {
    /// A structure with the default row-major layout.
    pub fn new(extent: Extent2d) -> Self {
        Self {
            extent,
            layout: Layout2d::row_major(&extent),
        }
    }

    pub const fn with_layout(extent: Extent2d, layout: Layout2d) -> Self {
        Self { extent, layout }
    }

    pub const fn extent(&self) -> Extent2d {
        self.extent
    }

    pub const fn layout(&self) -> Layout2d {
        self.layout
    }

    /// The flat buffer offset of the given index.
    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> isize {
        self.layout.offset(row, col)
    }

    /// Restrict the view to the given sub-box. The new start offset is
    /// the old offset of the range start; strides are unchanged.
    pub fn range(&self, range: Range2d) -> Result<Self> {
        let start = range.start();
        let extent = range.extent();
        if start.row + extent.rows() > self.extent.rows()
            || start.col + extent.cols() > self.extent.cols()
        {
            return Err(Error::IndexOutOfBounds {
                index: vec![start.row, start.col],
                extent: vec![self.extent.rows(), self.extent.cols()],
            });
        }

        Ok(Self::with_layout(
            Extent2d::derived(extent.rows(), extent.cols(), self.extent.channels()),
            Layout2d::new(
                self.layout.offset(start.row, start.col),
                self.layout.stride(),
            ),
        ))
    }

    /// Keep every `stride.row`-th row and `stride.col`-th column. Both
    /// steps must be positive.
    pub fn stride(&self, stride: Stride2d) -> Result<Self> {
        if stride.row < 1 || stride.col < 1 {
            return Err(Error::InvalidArgument("stride steps must be >= 1"));
        }

        let old = self.layout.stride();
        Ok(Self::with_layout(
            Extent2d::derived(
                strided_axis(self.extent.rows(), stride.row as usize),
                strided_axis(self.extent.cols(), stride.col as usize),
                self.extent.channels(),
            ),
            Layout2d::new(
                self.layout.start(),
                Stride2d::new(old.row * stride.row, old.col * stride.col),
            ),
        ))
    }

    /// Swap the row and column axes. Involutive; no storage is touched.
    pub fn transpose(&self) -> Self {
        let stride = self.layout.stride();
        Self::with_layout(
            Extent2d::derived(
                self.extent.cols(),
                self.extent.rows(),
                self.extent.channels(),
            ),
            Layout2d::new(
                self.layout.start(),
                Stride2d::new(stride.col, stride.row),
            ),
        )
    }

    /// Project onto the given row, reducing the rank to one.
    pub fn row(&self, row: usize) -> Result<Structure1d> {
        if row >= self.extent.rows() {
            return Err(Error::IndexOutOfBounds {
                index: vec![row, 0],
                extent: vec![self.extent.rows(), self.extent.cols()],
            });
        }

        Ok(Structure1d::with_layout(
            Extent1d::new(self.extent.cols())?,
            Layout1d::new(
                self.layout.offset(row, 0),
                Stride1d::new(self.layout.stride().col),
            ),
        ))
    }

    /// Project onto the given column, reducing the rank to one.
    pub fn col(&self, col: usize) -> Result<Structure1d> {
        if col >= self.extent.cols() {
            return Err(Error::IndexOutOfBounds {
                index: vec![0, col],
                extent: vec![self.extent.rows(), self.extent.cols()],
            });
        }

        Ok(Structure1d::with_layout(
            Extent1d::new(self.extent.rows())?,
            Layout1d::new(
                self.layout.offset(0, col),
                Stride1d::new(self.layout.stride().row),
            ),
        ))
    }
}

// ============================================================================
// 3-d structures
// ============================================================================

/// The axes of a 3-d structure, for dicing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis3d {
    Slice,
    Row,
    Col,
}

/// A 3-d structure: extent plus layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Structure3d {
    extent: Extent3d,
    layout: Layout3d,
}

impl Structure3d {
    /// A structure with the default row-major layout.
    pub fn new(extent: Extent3d) -> Self {
        Self {
            extent,
            layout: Layout3d::row_major(&extent),
        }
    }

    pub const fn with_layout(extent: Extent3d, layout: Layout3d) -> Self {
        Self { extent, layout }
    }

    pub const fn extent(&self) -> Extent3d {
        self.extent
    }

    pub const fn layout(&self) -> Layout3d {
        self.layout
    }

    /// The flat buffer offset of the given index.
    #[inline]
    pub fn offset(&self, slice: usize, row: usize, col: usize) -> isize {
        self.layout.offset(slice, row, col)
    }

    /// Restrict the view to the given sub-box.
    pub fn range(&self, range: Range3d) -> Result<Self> {
        let start = range.start();
        let extent = range.extent();
        if start.slice + extent.slices() > self.extent.slices()
            || start.row + extent.rows() > self.extent.rows()
            || start.col + extent.cols() > self.extent.cols()
        {
            return Err(Error::IndexOutOfBounds {
                index: vec![start.slice, start.row, start.col],
                extent: vec![
                    self.extent.slices(),
                    self.extent.rows(),
                    self.extent.cols(),
                ],
            });
        }

        Ok(Self::with_layout(
            extent,
            Layout3d::new(
                self.layout.offset(start.slice, start.row, start.col),
                self.layout.stride(),
            ),
        ))
    }

    /// Keep every `step`-th element along each axis. All steps must be
    /// positive.
    pub fn stride(&self, stride: Stride3d) -> Result<Self> {
        if stride.slice < 1 || stride.row < 1 || stride.col < 1 {
            return Err(Error::InvalidArgument("stride steps must be >= 1"));
        }

        let old = self.layout.stride();
        Ok(Self::with_layout(
            Extent3d::derived(
                strided_axis(self.extent.slices(), stride.slice as usize),
                strided_axis(self.extent.rows(), stride.row as usize),
                strided_axis(self.extent.cols(), stride.col as usize),
            ),
            Layout3d::new(
                self.layout.start(),
                Stride3d::new(
                    old.slice * stride.slice,
                    old.row * stride.row,
                    old.col * stride.col,
                ),
            ),
        ))
    }

    /// Swap two axes. `dice(a, a)` is the identity; applying the same
    /// dice twice restores the original structure.
    pub fn dice(&self, a: Axis3d, b: Axis3d) -> Self {
        let mut extent = [
            self.extent.slices(),
            self.extent.rows(),
            self.extent.cols(),
        ];
        let old = self.layout.stride();
        let mut stride = [old.slice, old.row, old.col];

        let (i, j) = (a as usize, b as usize);
        extent.swap(i, j);
        stride.swap(i, j);

        Self::with_layout(
            Extent3d::derived(extent[0], extent[1], extent[2]),
            Layout3d::new(
                self.layout.start(),
                Stride3d::new(stride[0], stride[1], stride[2]),
            ),
        )
    }

    /// Project onto the given slice, reducing the rank to two.
    pub fn slice(&self, slice: usize) -> Result<Structure2d> {
        if slice >= self.extent.slices() {
            return Err(Error::IndexOutOfBounds {
                index: vec![slice, 0, 0],
                extent: vec![
                    self.extent.slices(),
                    self.extent.rows(),
                    self.extent.cols(),
                ],
            });
        }

        let old = self.layout.stride();
        Ok(Structure2d::with_layout(
            Extent2d::derived(self.extent.rows(), self.extent.cols(), 1),
            Layout2d::new(
                self.layout.offset(slice, 0, 0),
                Stride2d::new(old.row, old.col),
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Index2d;

    fn structure_10x10() -> Structure2d {
        Structure2d::new(Extent2d::new(10, 10).unwrap())
    }

    #[test]
    fn range_then_stride() {
        let view = structure_10x10()
            .range(Range2d::new(
                Index2d::new(2, 3),
                Extent2d::new(5, 5).unwrap(),
            ))
            .unwrap()
            .stride(Stride2d::new(2, 1))
            .unwrap();

        assert_eq!(view.extent().rows(), 3);
        assert_eq!(view.extent().cols(), 5);
        assert_eq!(view.offset(0, 0), 23);
        assert_eq!(view.offset(1, 2), 45);
    }

    #[test]
    fn range_composes_with_range() {
        let base = structure_10x10();
        let twice = base
            .range(Range2d::new(
                Index2d::new(1, 2),
                Extent2d::new(8, 7).unwrap(),
            ))
            .unwrap()
            .range(Range2d::new(
                Index2d::new(2, 3),
                Extent2d::new(4, 4).unwrap(),
            ))
            .unwrap();
        let once = base
            .range(Range2d::new(
                Index2d::new(3, 5),
                Extent2d::new(4, 4).unwrap(),
            ))
            .unwrap();

        assert_eq!(twice, once);
    }

    #[test]
    fn stride_composes_with_stride() {
        let base = structure_10x10();
        let twice = base
            .stride(Stride2d::new(2, 1))
            .unwrap()
            .stride(Stride2d::new(2, 3))
            .unwrap();
        let once = base.stride(Stride2d::new(4, 3)).unwrap();

        assert_eq!(twice, once);
    }

    #[test]
    fn transpose_is_involutive() {
        let base = structure_10x10()
            .range(Range2d::new(
                Index2d::new(1, 1),
                Extent2d::new(4, 6).unwrap(),
            ))
            .unwrap();

        assert_eq!(base.transpose().transpose(), base);
        assert_eq!(base.transpose().offset(2, 3), base.offset(3, 2));
    }

    #[test]
    fn offsets_are_preserved_under_transforms() {
        let base = structure_10x10();
        let range = Range2d::new(Index2d::new(2, 1), Extent2d::new(6, 8).unwrap());
        let view = base.range(range).unwrap();

        for index in view.extent() {
            assert_eq!(
                view.offset(index.row, index.col),
                base.offset(index.row + 2, index.col + 1)
            );
        }

        let strided = view.stride(Stride2d::new(3, 2)).unwrap();
        for index in strided.extent() {
            assert_eq!(
                strided.offset(index.row, index.col),
                view.offset(index.row * 3, index.col * 2)
            );
        }
    }

    #[test]
    fn row_and_col_projections() {
        let base = structure_10x10();

        let row = base.row(4).unwrap();
        assert_eq!(row.extent().size(), 10);
        assert_eq!(row.offset(7), base.offset(4, 7));

        let col = base.col(4).unwrap();
        assert_eq!(col.extent().size(), 10);
        assert_eq!(col.offset(7), base.offset(7, 4));

        assert!(base.row(10).is_err());
        assert!(base.col(10).is_err());
    }

    #[test]
    fn out_of_bounds_range_is_rejected() {
        let result = structure_10x10().range(Range2d::new(
            Index2d::new(6, 0),
            Extent2d::new(5, 5).unwrap(),
        ));
        assert!(matches!(result, Err(crate::Error::IndexOutOfBounds { .. })));
    }

    #[test]
    fn dice_swaps_axes() {
        let base = Structure3d::new(Extent3d::new(2, 3, 4).unwrap());
        let diced = base.dice(Axis3d::Slice, Axis3d::Col);

        assert_eq!(diced.extent().slices(), 4);
        assert_eq!(diced.extent().cols(), 2);
        assert_eq!(diced.offset(3, 1, 1), base.offset(1, 1, 3));
        assert_eq!(diced.dice(Axis3d::Slice, Axis3d::Col), base);
    }

    #[test]
    fn slice_projects_to_2d() {
        let base = Structure3d::new(Extent3d::new(3, 4, 5).unwrap());
        let plane = base.slice(2).unwrap();

        assert_eq!(plane.extent().rows(), 4);
        assert_eq!(plane.extent().cols(), 5);
        for index in plane.extent() {
            assert_eq!(
                plane.offset(index.row, index.col),
                base.offset(2, index.row, index.col)
            );
        }

        assert!(base.slice(3).is_err());
    }

    #[test]
    fn stride_of_empty_extent_stays_empty() {
        let base = Structure2d::new(Extent2d::new(0, 4).unwrap());
        let view = base.stride(Stride2d::new(2, 2)).unwrap();
        assert_eq!(view.extent().rows(), 0);
        assert_eq!(view.extent().cols(), 2);
    }
}
