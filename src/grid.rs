//! Grids: a structure paired with flat storage.
//!
//! A grid is a *window* onto its storage. View methods return new grids
//! sharing the same buffer, so mutation through any view is visible to
//! every other view; [`copy`](Grid2d::copy) detaches into fresh
//! row-major storage. Grids are never resized.
//!
//! The primitive lattice kinds are aliases of the generic grids:
//! [`DoubleGrid2d`] is the dense double matrix all kernels operate on,
//! and the int/long kinds are the same code monomorphized.

use num_traits::{One, Zero};

use crate::array::DenseArray;
use crate::context::NumericalContext;
use crate::extent::{Extent1d, Extent2d, Extent3d};
use crate::index::{Range1d, Range2d, Range3d};
use crate::layout::{Stride1d, Stride2d, Stride3d};
use crate::loops::{
    Backward1d, Backward2d, Backward3d, Forward1d, Loop1d, Loop2d, Loop3d, RowMajor2d, RowMajor3d,
};
use crate::structure::{Axis3d, Structure1d, Structure2d, Structure3d};
use crate::{Error, Result};

/// 1-d lattice of doubles.
pub type DoubleGrid1d = Grid1d<f64>;
/// 2-d lattice of doubles; the dense double matrix.
pub type DoubleGrid2d = Grid2d<f64>;
/// 3-d lattice of doubles.
pub type DoubleGrid3d = Grid3d<f64>;
/// 1-d lattice of 32-bit integers.
pub type IntGrid1d = Grid1d<i32>;
/// 2-d lattice of 32-bit integers.
pub type IntGrid2d = Grid2d<i32>;
/// 1-d lattice of 64-bit integers.
pub type LongGrid1d = Grid1d<i64>;
/// 2-d lattice of 64-bit integers.
pub type LongGrid2d = Grid2d<i64>;

// ============================================================================
// 1-d grids
// ============================================================================

/// A 1-d lattice: structure plus storage.
#[derive(Debug)]
pub struct Grid1d<T> {
    structure: Structure1d,
    array: DenseArray<T>,
}

impl<T> Clone for Grid1d<T> {
    /// Shares the storage; use [`Grid1d::copy`] for a deep copy.
    fn clone(&self) -> Self {
        Self {
            structure: self.structure,
            array: self.array.clone(),
        }
    }
}

impl<T: Clone> Grid1d<T> {
    /// Wrap existing storage in the given structure.
    pub fn new(structure: Structure1d, array: DenseArray<T>) -> Result<Self> {
        if structure.extent().length() > array.len() {
            return Err(Error::InvalidArgument(
                "storage holds fewer elements than the structure requires",
            ));
        }
        Ok(Self { structure, array })
    }

    fn view(&self, structure: Structure1d) -> Self {
        Self {
            structure,
            array: self.array.clone(),
        }
    }

    pub fn from_vec(values: Vec<T>) -> Result<Self> {
        let extent = Extent1d::new(values.len())?;
        Ok(Self {
            structure: Structure1d::new(extent),
            array: DenseArray::from_vec(values),
        })
    }

    pub fn from_fn(extent: Extent1d, f: impl FnMut(usize) -> T) -> Self {
        Self {
            structure: Structure1d::new(extent),
            array: DenseArray::from_vec((0..extent.size()).map(f).collect()),
        }
    }

    pub const fn structure(&self) -> &Structure1d {
        &self.structure
    }

    pub const fn extent(&self) -> Extent1d {
        self.structure.extent()
    }

    pub fn array(&self) -> &DenseArray<T> {
        &self.array
    }

    pub const fn size(&self) -> usize {
        self.extent().size()
    }

    #[inline]
    fn index_of(&self, index: usize) -> usize {
        self.structure.offset(index) as usize
    }

    /// The element at `index`.
    ///
    /// # Panics
    /// Panics if the computed storage offset is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> T {
        self.array.get(self.index_of(index))
    }

    /// Store `value` at `index`.
    ///
    /// # Panics
    /// Panics if the computed storage offset is out of bounds.
    #[inline]
    pub fn set(&mut self, index: usize, value: T) {
        self.array.set(self.index_of(index), value);
    }

    fn check_same_extent(&self, other: &Self) -> Result<()> {
        if self.extent() != other.extent() {
            return Err(Error::ExtentMismatch {
                left: vec![self.size()],
                right: vec![other.size()],
            });
        }
        Ok(())
    }

    fn is_contiguous(&self) -> bool {
        self.structure.layout().stride().value == 1 && self.structure.layout().start() >= 0
    }

    pub fn fill(&mut self, value: T) {
        Forward1d(Range1d::from(self.extent())).for_each(|i| self.set(i, value.clone()));
    }

    /// Copy `other` element-wise into `self`.
    pub fn assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_extent(other)?;

        // Fast track assign.
        if self.is_contiguous() && other.is_contiguous() {
            self.array.copy_from(
                &other.array,
                other.structure.layout().start() as usize,
                self.structure.layout().start() as usize,
                self.size(),
            );
        } else {
            Forward1d(Range1d::from(self.extent())).for_each(|i| self.set(i, other.get(i)));
        }
        Ok(())
    }

    /// Copy the first `min(values.len(), size())` elements of the slice
    /// into `self`.
    pub fn assign_slice(&mut self, values: &[T]) {
        let size = values.len().min(self.size());
        for (i, value) in values.iter().take(size).enumerate() {
            self.set(i, value.clone());
        }
    }

    /// Transform every element in place.
    pub fn apply(&mut self, mut f: impl FnMut(T) -> T) {
        Forward1d(Range1d::from(self.extent())).for_each(|i| self.set(i, f(self.get(i))));
    }

    /// Combine element-wise with `other` into `self`.
    pub fn zip_apply(&mut self, other: &Self, mut f: impl FnMut(T, T) -> T) -> Result<()> {
        self.check_same_extent(other)?;
        Forward1d(Range1d::from(self.extent()))
            .for_each(|i| self.set(i, f(self.get(i), other.get(i))));
        Ok(())
    }

    /// Exchange contents with `other`.
    pub fn swap(&mut self, other: &mut Self) -> Result<()> {
        self.check_same_extent(other)?;

        // Fast track swap.
        if self.is_contiguous() && other.is_contiguous() {
            self.array.swap_range(
                &other.array,
                self.structure.layout().start() as usize,
                other.structure.layout().start() as usize,
                self.size(),
            );
        } else {
            Forward1d(Range1d::from(self.extent())).for_each(|i| {
                let tmp = self.get(i);
                self.set(i, other.get(i));
                other.set(i, tmp);
            });
        }
        Ok(())
    }

    /// Right fold in descending index order: the aggregate starts at
    /// `f(x[n-1])` and combines towards index zero. Returns `None` for
    /// an empty lattice.
    pub fn reduce(&self, mut reducer: impl FnMut(T, T) -> T, mut f: impl FnMut(T) -> T) -> Option<T> {
        let mut acc: Option<T> = None;
        Backward1d(Range1d::from(self.extent())).for_each(|i| {
            let value = f(self.get(i));
            acc = Some(match acc.take() {
                None => value,
                Some(aggregate) => reducer(aggregate, value),
            });
        });
        acc
    }

    pub fn any_match(&self, mut predicate: impl FnMut(&T) -> bool) -> bool {
        Forward1d(Range1d::from(self.extent())).any_match(|i| predicate(&self.get(i)))
    }

    pub fn all_match(&self, mut predicate: impl FnMut(&T) -> bool) -> bool {
        Forward1d(Range1d::from(self.extent())).all_match(|i| predicate(&self.get(i)))
    }

    pub fn non_match(&self, predicate: impl FnMut(&T) -> bool) -> bool {
        !self.any_match(predicate)
    }

    /// A deep copy with fresh contiguous storage.
    pub fn copy(&self) -> Self {
        Self {
            structure: Structure1d::new(self.extent()),
            array: DenseArray::from_vec(self.to_vec()),
        }
    }

    /// The elements in index order.
    pub fn to_vec(&self) -> Vec<T> {
        (0..self.size()).map(|i| self.get(i)).collect()
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Restrict the view to a sub-box of the lattice.
    pub fn range_view(&self, range: Range1d) -> Result<Self> {
        Ok(self.view(self.structure.range(range)?))
    }

    /// Keep every `stride`-th element.
    pub fn stride_view(&self, stride: Stride1d) -> Result<Self> {
        Ok(self.view(self.structure.stride(stride)?))
    }
}

impl<T: Zero + Clone> Grid1d<T> {
    /// A fresh zero-filled lattice of the given extent.
    pub fn dense(extent: Extent1d) -> Self {
        Self {
            structure: Structure1d::new(extent),
            array: DenseArray::zeros(extent.length()),
        }
    }

    /// A fresh zero-filled lattice with the same extent as `self`.
    pub fn like(&self) -> Self {
        Self::dense(self.extent())
    }
}

impl<T: Clone + PartialEq> PartialEq for Grid1d<T> {
    fn eq(&self, other: &Self) -> bool {
        self.extent() == other.extent()
            && Forward1d(Range1d::from(self.extent())).all_match(|i| self.get(i) == other.get(i))
    }
}

impl Grid1d<f64> {
    /// Element-wise equality under the process-wide numerical context.
    pub fn equals(&self, other: &Self) -> bool {
        self.equals_with(other, &NumericalContext::get())
    }

    /// Element-wise equality under an explicit numerical context.
    pub fn equals_with(&self, other: &Self, context: &NumericalContext) -> bool {
        self.extent() == other.extent()
            && Forward1d(Range1d::from(self.extent()))
                .all_match(|i| context.equals(self.get(i), other.get(i)))
    }
}

// ============================================================================
// 2-d grids
// ============================================================================

/// A 2-d lattice: structure plus storage.
#[derive(Debug)]
pub struct Grid2d<T> {
    structure: Structure2d,
    array: DenseArray<T>,
}

impl<T> Clone for Grid2d<T> {
    /// Shares the storage; use [`Grid2d::copy`] for a deep copy.
    fn clone(&self) -> Self {
        Self {
            structure: self.structure,
            array: self.array.clone(),
        }
    }
}

impl<T: Clone> Grid2d<T> {
    /// Wrap existing storage in the given structure.
    pub fn new(structure: Structure2d, array: DenseArray<T>) -> Result<Self> {
        if structure.extent().length() > array.len() {
            return Err(Error::InvalidArgument(
                "storage holds fewer elements than the structure requires",
            ));
        }
        Ok(Self { structure, array })
    }

    fn view(&self, structure: Structure2d) -> Self {
        Self {
            structure,
            array: self.array.clone(),
        }
    }

    /// Build a grid from row-major element data. The vector length must
    /// equal `extent.length()`.
    pub fn from_row_major(extent: Extent2d, values: Vec<T>) -> Result<Self> {
        if values.len() != extent.length() {
            return Err(Error::InvalidArgument(
                "element count does not match the extent",
            ));
        }
        Ok(Self {
            structure: Structure2d::new(extent),
            array: DenseArray::from_vec(values),
        })
    }

    pub fn from_fn(extent: Extent2d, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut values = Vec::with_capacity(extent.size());
        RowMajor2d(Range2d::from(extent)).for_each(|row, col| values.push(f(row, col)));
        Self {
            structure: Structure2d::new(Extent2d::derived(extent.rows(), extent.cols(), 1)),
            array: DenseArray::from_vec(values),
        }
    }

    pub const fn structure(&self) -> &Structure2d {
        &self.structure
    }

    pub const fn extent(&self) -> Extent2d {
        self.structure.extent()
    }

    pub fn array(&self) -> &DenseArray<T> {
        &self.array
    }

    pub const fn rows(&self) -> usize {
        self.extent().rows()
    }

    pub const fn cols(&self) -> usize {
        self.extent().cols()
    }

    pub const fn size(&self) -> usize {
        self.extent().size()
    }

    #[inline]
    fn index_of(&self, row: usize, col: usize) -> usize {
        self.structure.offset(row, col) as usize
    }

    /// The element at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the computed storage offset is out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.array.get(self.index_of(row, col))
    }

    /// Store `value` at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the computed storage offset is out of bounds.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.array.set(self.index_of(row, col), value);
    }

    fn check_same_extent(&self, other: &Self) -> Result<()> {
        if self.extent() != other.extent() {
            return Err(Error::ExtentMismatch {
                left: vec![self.rows(), self.cols()],
                right: vec![other.rows(), other.cols()],
            });
        }
        Ok(())
    }

    /// Whether the view is a dense row-major window with unit column
    /// stride, so a block copy over `size()` elements is valid.
    fn is_contiguous(&self) -> bool {
        let layout = self.structure.layout();
        layout.stride().col == 1
            && layout.stride().row == self.cols() as isize
            && layout.start() >= 0
    }

    pub fn fill(&mut self, value: T) {
        RowMajor2d(Range2d::from(self.extent()))
            .for_each(|row, col| self.set(row, col, value.clone()));
    }

    /// Copy `other` element-wise into `self`.
    pub fn assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_extent(other)?;

        // Fast track assign.
        if self.is_contiguous() && other.is_contiguous() {
            self.array.copy_from(
                &other.array,
                other.structure.layout().start() as usize,
                self.structure.layout().start() as usize,
                self.size(),
            );
        } else {
            RowMajor2d(Range2d::from(self.extent()))
                .for_each(|row, col| self.set(row, col, other.get(row, col)));
        }
        Ok(())
    }

    /// Transform every element in place.
    pub fn apply(&mut self, mut f: impl FnMut(T) -> T) {
        RowMajor2d(Range2d::from(self.extent()))
            .for_each(|row, col| self.set(row, col, f(self.get(row, col))));
    }

    /// Combine element-wise with `other` into `self`.
    pub fn zip_apply(&mut self, other: &Self, mut f: impl FnMut(T, T) -> T) -> Result<()> {
        self.check_same_extent(other)?;
        RowMajor2d(Range2d::from(self.extent()))
            .for_each(|row, col| self.set(row, col, f(self.get(row, col), other.get(row, col))));
        Ok(())
    }

    /// Exchange contents with `other`.
    pub fn swap(&mut self, other: &mut Self) -> Result<()> {
        self.check_same_extent(other)?;

        // Fast track swap.
        if self.is_contiguous() && other.is_contiguous() {
            self.array.swap_range(
                &other.array,
                self.structure.layout().start() as usize,
                other.structure.layout().start() as usize,
                self.size(),
            );
        } else {
            RowMajor2d(Range2d::from(self.extent())).for_each(|row, col| {
                let tmp = self.get(row, col);
                self.set(row, col, other.get(row, col));
                other.set(row, col, tmp);
            });
        }
        Ok(())
    }

    /// Right fold in descending row-major order: the aggregate starts at
    /// `f(x[rows-1, cols-1])` and combines towards `(0, 0)`. Returns
    /// `None` for an empty lattice.
    pub fn reduce(&self, mut reducer: impl FnMut(T, T) -> T, mut f: impl FnMut(T) -> T) -> Option<T> {
        let mut acc: Option<T> = None;
        Backward2d(Range2d::from(self.extent())).for_each(|row, col| {
            let value = f(self.get(row, col));
            acc = Some(match acc.take() {
                None => value,
                Some(aggregate) => reducer(aggregate, value),
            });
        });
        acc
    }

    pub fn any_match(&self, mut predicate: impl FnMut(&T) -> bool) -> bool {
        RowMajor2d(Range2d::from(self.extent()))
            .any_match(|row, col| predicate(&self.get(row, col)))
    }

    pub fn all_match(&self, mut predicate: impl FnMut(&T) -> bool) -> bool {
        RowMajor2d(Range2d::from(self.extent()))
            .all_match(|row, col| predicate(&self.get(row, col)))
    }

    pub fn non_match(&self, predicate: impl FnMut(&T) -> bool) -> bool {
        !self.any_match(predicate)
    }

    /// A deep copy with fresh row-major storage. All channels of every
    /// cell are carried over.
    pub fn copy(&self) -> Self {
        let extent = self.extent();
        let mut values = Vec::with_capacity(extent.length());
        RowMajor2d(Range2d::from(extent)).for_each(|row, col| {
            let base = self.index_of(row, col);
            for channel in 0..extent.channels() {
                values.push(self.array.get(base + channel));
            }
        });
        Self {
            structure: Structure2d::new(extent),
            array: DenseArray::from_vec(values),
        }
    }

    /// The cell elements in row-major order.
    pub fn to_row_major(&self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.size());
        RowMajor2d(Range2d::from(self.extent()))
            .for_each(|row, col| values.push(self.get(row, col)));
        values
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Restrict the view to a sub-box of the lattice.
    pub fn range_view(&self, range: Range2d) -> Result<Self> {
        Ok(self.view(self.structure.range(range)?))
    }

    /// Keep every `stride.row`-th row and `stride.col`-th column.
    pub fn stride_view(&self, stride: Stride2d) -> Result<Self> {
        Ok(self.view(self.structure.stride(stride)?))
    }

    /// The transposed view: rows and columns swapped, same storage.
    pub fn transposed(&self) -> Self {
        self.view(self.structure.transpose())
    }

    /// The given row as a 1-d view.
    pub fn row_view(&self, row: usize) -> Result<Grid1d<T>> {
        Ok(Grid1d {
            structure: self.structure.row(row)?,
            array: self.array.clone(),
        })
    }

    /// The given column as a 1-d view.
    pub fn col_view(&self, col: usize) -> Result<Grid1d<T>> {
        Ok(Grid1d {
            structure: self.structure.col(col)?,
            array: self.array.clone(),
        })
    }
}

impl<T: Zero + Clone> Grid2d<T> {
    /// A fresh zero-filled lattice of the given extent.
    pub fn dense(extent: Extent2d) -> Self {
        Self {
            structure: Structure2d::new(extent),
            array: DenseArray::zeros(extent.length()),
        }
    }

    /// A fresh zero-filled lattice with the same extent as `self`.
    pub fn like(&self) -> Self {
        Self::dense(self.extent())
    }
}

impl<T: Zero + One + Clone> Grid2d<T> {
    /// The `n × n` identity matrix.
    pub fn identity(n: usize) -> Result<Self> {
        let mut grid = Self::dense(Extent2d::new(n, n)?);
        for i in 0..n {
            grid.set(i, i, T::one());
        }
        Ok(grid)
    }
}

impl<T: Clone + PartialEq> PartialEq for Grid2d<T> {
    fn eq(&self, other: &Self) -> bool {
        self.extent() == other.extent()
            && RowMajor2d(Range2d::from(self.extent()))
                .all_match(|row, col| self.get(row, col) == other.get(row, col))
    }
}

impl Grid2d<f64> {
    /// Element-wise equality under the process-wide numerical context.
    pub fn equals(&self, other: &Self) -> bool {
        self.equals_with(other, &NumericalContext::get())
    }

    /// Element-wise equality under an explicit numerical context.
    pub fn equals_with(&self, other: &Self, context: &NumericalContext) -> bool {
        self.extent() == other.extent()
            && RowMajor2d(Range2d::from(self.extent()))
                .all_match(|row, col| context.equals(self.get(row, col), other.get(row, col)))
    }
}

// ============================================================================
// 3-d grids
// ============================================================================

/// A 3-d lattice: structure plus storage.
#[derive(Debug)]
pub struct Grid3d<T> {
    structure: Structure3d,
    array: DenseArray<T>,
}

impl<T> Clone for Grid3d<T> {
    /// Shares the storage; use [`Grid3d::copy`] for a deep copy.
    fn clone(&self) -> Self {
        Self {
            structure: self.structure,
            array: self.array.clone(),
        }
    }
}

impl<T: Clone> Grid3d<T> {
    /// Wrap existing storage in the given structure.
    pub fn new(structure: Structure3d, array: DenseArray<T>) -> Result<Self> {
        if structure.extent().length() > array.len() {
            return Err(Error::InvalidArgument(
                "storage holds fewer elements than the structure requires",
            ));
        }
        Ok(Self { structure, array })
    }

    fn view(&self, structure: Structure3d) -> Self {
        Self {
            structure,
            array: self.array.clone(),
        }
    }

    pub fn from_fn(extent: Extent3d, mut f: impl FnMut(usize, usize, usize) -> T) -> Self {
        let mut values = Vec::with_capacity(extent.size());
        RowMajor3d(Range3d::from(extent))
            .for_each(|slice, row, col| values.push(f(slice, row, col)));
        Self {
            structure: Structure3d::new(extent),
            array: DenseArray::from_vec(values),
        }
    }

    pub const fn structure(&self) -> &Structure3d {
        &self.structure
    }

    pub const fn extent(&self) -> Extent3d {
        self.structure.extent()
    }

    pub fn array(&self) -> &DenseArray<T> {
        &self.array
    }

    pub const fn slices(&self) -> usize {
        self.extent().slices()
    }

    pub const fn rows(&self) -> usize {
        self.extent().rows()
    }

    pub const fn cols(&self) -> usize {
        self.extent().cols()
    }

    pub const fn size(&self) -> usize {
        self.extent().size()
    }

    #[inline]
    fn index_of(&self, slice: usize, row: usize, col: usize) -> usize {
        self.structure.offset(slice, row, col) as usize
    }

    /// The element at `(slice, row, col)`.
    ///
    /// # Panics
    /// Panics if the computed storage offset is out of bounds.
    #[inline]
    pub fn get(&self, slice: usize, row: usize, col: usize) -> T {
        self.array.get(self.index_of(slice, row, col))
    }

    /// Store `value` at `(slice, row, col)`.
    ///
    /// # Panics
    /// Panics if the computed storage offset is out of bounds.
    #[inline]
    pub fn set(&mut self, slice: usize, row: usize, col: usize, value: T) {
        self.array.set(self.index_of(slice, row, col), value);
    }

    fn check_same_extent(&self, other: &Self) -> Result<()> {
        if self.extent() != other.extent() {
            return Err(Error::ExtentMismatch {
                left: vec![self.slices(), self.rows(), self.cols()],
                right: vec![other.slices(), other.rows(), other.cols()],
            });
        }
        Ok(())
    }

    fn is_contiguous(&self) -> bool {
        let layout = self.structure.layout();
        layout.stride().col == 1
            && layout.stride().row == self.cols() as isize
            && layout.stride().slice == (self.rows() * self.cols()) as isize
            && layout.start() >= 0
    }

    pub fn fill(&mut self, value: T) {
        RowMajor3d(Range3d::from(self.extent()))
            .for_each(|slice, row, col| self.set(slice, row, col, value.clone()));
    }

    /// Copy `other` element-wise into `self`.
    pub fn assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_extent(other)?;

        // Fast track assign.
        if self.is_contiguous() && other.is_contiguous() {
            self.array.copy_from(
                &other.array,
                other.structure.layout().start() as usize,
                self.structure.layout().start() as usize,
                self.size(),
            );
        } else {
            RowMajor3d(Range3d::from(self.extent()))
                .for_each(|slice, row, col| self.set(slice, row, col, other.get(slice, row, col)));
        }
        Ok(())
    }

    /// Transform every element in place.
    pub fn apply(&mut self, mut f: impl FnMut(T) -> T) {
        RowMajor3d(Range3d::from(self.extent()))
            .for_each(|slice, row, col| self.set(slice, row, col, f(self.get(slice, row, col))));
    }

    /// Combine element-wise with `other` into `self`.
    pub fn zip_apply(&mut self, other: &Self, mut f: impl FnMut(T, T) -> T) -> Result<()> {
        self.check_same_extent(other)?;
        RowMajor3d(Range3d::from(self.extent())).for_each(|slice, row, col| {
            self.set(
                slice,
                row,
                col,
                f(self.get(slice, row, col), other.get(slice, row, col)),
            )
        });
        Ok(())
    }

    /// Exchange contents with `other`.
    pub fn swap(&mut self, other: &mut Self) -> Result<()> {
        self.check_same_extent(other)?;

        // Fast track swap.
        if self.is_contiguous() && other.is_contiguous() {
            self.array.swap_range(
                &other.array,
                self.structure.layout().start() as usize,
                other.structure.layout().start() as usize,
                self.size(),
            );
        } else {
            RowMajor3d(Range3d::from(self.extent())).for_each(|slice, row, col| {
                let tmp = self.get(slice, row, col);
                self.set(slice, row, col, other.get(slice, row, col));
                other.set(slice, row, col, tmp);
            });
        }
        Ok(())
    }

    /// Right fold in descending row-major order. Returns `None` for an
    /// empty lattice.
    pub fn reduce(&self, mut reducer: impl FnMut(T, T) -> T, mut f: impl FnMut(T) -> T) -> Option<T> {
        let mut acc: Option<T> = None;
        Backward3d(Range3d::from(self.extent())).for_each(|slice, row, col| {
            let value = f(self.get(slice, row, col));
            acc = Some(match acc.take() {
                None => value,
                Some(aggregate) => reducer(aggregate, value),
            });
        });
        acc
    }

    pub fn any_match(&self, mut predicate: impl FnMut(&T) -> bool) -> bool {
        RowMajor3d(Range3d::from(self.extent()))
            .any_match(|slice, row, col| predicate(&self.get(slice, row, col)))
    }

    pub fn all_match(&self, mut predicate: impl FnMut(&T) -> bool) -> bool {
        RowMajor3d(Range3d::from(self.extent()))
            .all_match(|slice, row, col| predicate(&self.get(slice, row, col)))
    }

    pub fn non_match(&self, predicate: impl FnMut(&T) -> bool) -> bool {
        !self.any_match(predicate)
    }

    /// A deep copy with fresh row-major storage.
    pub fn copy(&self) -> Self {
        let mut values = Vec::with_capacity(self.size());
        RowMajor3d(Range3d::from(self.extent()))
            .for_each(|slice, row, col| values.push(self.get(slice, row, col)));
        Self {
            structure: Structure3d::new(self.extent()),
            array: DenseArray::from_vec(values),
        }
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Restrict the view to a sub-box of the lattice.
    pub fn range_view(&self, range: Range3d) -> Result<Self> {
        Ok(self.view(self.structure.range(range)?))
    }

    /// Keep every `step`-th element along each axis.
    pub fn stride_view(&self, stride: Stride3d) -> Result<Self> {
        Ok(self.view(self.structure.stride(stride)?))
    }

    /// Swap two axes without touching storage.
    pub fn dice(&self, a: Axis3d, b: Axis3d) -> Self {
        self.view(self.structure.dice(a, b))
    }

    /// The given slice as a 2-d view.
    pub fn slice_view(&self, slice: usize) -> Result<Grid2d<T>> {
        Ok(Grid2d {
            structure: self.structure.slice(slice)?,
            array: self.array.clone(),
        })
    }
}

impl<T: Zero + Clone> Grid3d<T> {
    /// A fresh zero-filled lattice of the given extent.
    pub fn dense(extent: Extent3d) -> Self {
        Self {
            structure: Structure3d::new(extent),
            array: DenseArray::zeros(extent.length()),
        }
    }

    /// A fresh zero-filled lattice with the same extent as `self`.
    pub fn like(&self) -> Self {
        Self::dense(self.extent())
    }
}

impl<T: Clone + PartialEq> PartialEq for Grid3d<T> {
    fn eq(&self, other: &Self) -> bool {
        self.extent() == other.extent()
            && RowMajor3d(Range3d::from(self.extent()))
                .all_match(|s, r, c| self.get(s, r, c) == other.get(s, r, c))
    }
}

impl Grid3d<f64> {
    /// Element-wise equality under the process-wide numerical context.
    pub fn equals(&self, other: &Self) -> bool {
        self.equals_with(other, &NumericalContext::get())
    }

    /// Element-wise equality under an explicit numerical context.
    pub fn equals_with(&self, other: &Self, context: &NumericalContext) -> bool {
        self.extent() == other.extent()
            && RowMajor3d(Range3d::from(self.extent()))
                .all_match(|s, r, c| context.equals(self.get(s, r, c), other.get(s, r, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Index1d, Index2d};

    fn grid_4x5() -> DoubleGrid2d {
        DoubleGrid2d::from_fn(Extent2d::new(4, 5).unwrap(), |r, c| (r * 5 + c) as f64)
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut grid = DoubleGrid2d::dense(Extent2d::new(3, 3).unwrap());
        grid.set(1, 2, 7.5);
        assert_eq!(grid.get(1, 2), 7.5);
    }

    #[test]
    fn views_share_storage() {
        let grid = grid_4x5();
        let mut transposed = grid.transposed();

        transposed.set(2, 3, -1.0);
        assert_eq!(grid.get(3, 2), -1.0);

        let mut row = grid.row_view(1).unwrap();
        row.fill(9.0);
        assert!((0..5).all(|c| grid.get(1, c) == 9.0));
    }

    #[test]
    fn copy_detaches_storage() {
        let grid = grid_4x5();
        let mut copy = grid.copy();
        copy.set(0, 0, 100.0);

        assert_eq!(grid.get(0, 0), 0.0);
        assert!(copy != grid);
        assert_eq!(grid.copy(), grid);
    }

    #[test]
    fn assign_fast_path_matches_loop_path() {
        let src = grid_4x5();

        let mut dense_dst = DoubleGrid2d::dense(Extent2d::new(4, 5).unwrap());
        dense_dst.assign(&src).unwrap();
        assert_eq!(dense_dst, src);

        // A transposed destination falls back to the element loop.
        let mut strided_dst = DoubleGrid2d::dense(Extent2d::new(5, 4).unwrap()).transposed();
        strided_dst.assign(&src).unwrap();
        assert_eq!(strided_dst, src);
    }

    #[test]
    fn assign_rejects_extent_mismatch() {
        let mut dst = DoubleGrid2d::dense(Extent2d::new(2, 2).unwrap());
        let src = DoubleGrid2d::dense(Extent2d::new(2, 3).unwrap());
        assert!(matches!(
            dst.assign(&src),
            Err(Error::ExtentMismatch { .. })
        ));
    }

    #[test]
    fn assign_to_self_view_is_a_no_op() {
        let mut grid = grid_4x5();
        let snapshot = grid.copy();
        let alias = grid.clone();
        grid.assign(&alias).unwrap();
        assert_eq!(grid, snapshot);
    }

    #[test]
    fn swap_exchanges_disjoint_views_of_one_buffer() {
        let grid = grid_4x5();
        let mut top = grid.row_view(0).unwrap();
        let mut bottom = grid.row_view(3).unwrap();

        top.swap(&mut bottom).unwrap();

        assert_eq!(grid.get(0, 0), 15.0);
        assert_eq!(grid.get(3, 4), 4.0);
    }

    #[test]
    fn reduce_walks_backward() {
        let grid = Grid1d::from_vec(vec![1.0, 2.0, 3.0]).unwrap();

        // Right fold with subtraction: (3 - 2) - 1.
        let folded = grid.reduce(|a, b| a - b, |x| x).unwrap();
        assert_eq!(folded, 0.0);

        let sum = grid.reduce(|a, b| a + b, |x| x * 2.0).unwrap();
        assert_eq!(sum, 12.0);
    }

    #[test]
    fn empty_grid_behavior() {
        let grid = DoubleGrid2d::dense(Extent2d::new(0, 4).unwrap());
        assert_eq!(grid.size(), 0);
        assert_eq!(grid.reduce(|a, b| a + b, |x| x), None);
        assert!(grid.all_match(|_| false));

        let same = DoubleGrid2d::dense(Extent2d::new(0, 4).unwrap());
        assert_eq!(grid, same);

        let different = DoubleGrid2d::dense(Extent2d::new(0, 5).unwrap());
        assert!(grid != different);
    }

    #[test]
    fn apply_and_zip_apply() {
        let mut grid = grid_4x5();
        grid.apply(|x| x + 1.0);
        assert_eq!(grid.get(0, 0), 1.0);

        let other = grid_4x5();
        grid.zip_apply(&other, |a, b| a - b).unwrap();
        assert!(grid.all_match(|&x| x == 1.0));
    }

    #[test]
    fn context_equality() {
        let a = grid_4x5();
        let mut b = a.copy();
        b.set(2, 2, b.get(2, 2) + 1e-12);

        assert!(a != b);
        assert!(a.equals_with(&b, &NumericalContext::new(1e-9)));
        assert!(!a.equals_with(&b, &NumericalContext::EXACT));
    }

    #[test]
    fn range_and_stride_views_address_expected_cells() {
        let grid = DoubleGrid2d::from_fn(Extent2d::new(10, 10).unwrap(), |r, c| {
            (r * 10 + c) as f64
        });

        let view = grid
            .range_view(Range2d::new(
                Index2d::new(2, 3),
                Extent2d::new(5, 5).unwrap(),
            ))
            .unwrap()
            .stride_view(Stride2d::new(2, 1))
            .unwrap();

        assert_eq!(view.rows(), 3);
        assert_eq!(view.cols(), 5);
        assert_eq!(view.get(0, 0), 23.0);
        assert_eq!(view.get(1, 1), 44.0);
    }

    #[test]
    fn grid1d_range_view() {
        let grid = Grid1d::from_vec((0..10).collect::<Vec<i32>>()).unwrap();
        let view = grid
            .range_view(Range1d::new(
                Index1d::new(3),
                Extent1d::new(4).unwrap(),
            ))
            .unwrap();
        assert_eq!(view.to_vec(), vec![3, 4, 5, 6]);

        let strided = view.stride_view(Stride1d::new(2)).unwrap();
        assert_eq!(strided.to_vec(), vec![3, 5]);
    }

    #[test]
    fn grid3d_slice_and_dice() {
        let grid = Grid3d::from_fn(Extent3d::new(2, 3, 4).unwrap(), |s, r, c| {
            (s * 100 + r * 10 + c) as i64
        });

        let plane = grid.slice_view(1).unwrap();
        assert_eq!(plane.get(2, 3), 123);

        let diced = grid.dice(Axis3d::Row, Axis3d::Col);
        assert_eq!(diced.get(1, 3, 2), grid.get(1, 2, 3));
        assert_eq!(diced.dice(Axis3d::Row, Axis3d::Col), grid);
    }

    #[test]
    fn identity_matrix() {
        let eye = IntGrid2d::identity(3).unwrap();
        assert_eq!(eye.get(0, 0), 1);
        assert_eq!(eye.get(0, 1), 0);
        assert_eq!(eye.get(2, 2), 1);
    }

    #[test]
    fn assign_slice_takes_prefix() {
        let mut grid = Grid1d::from_vec(vec![0; 4]).unwrap();
        grid.assign_slice(&[7, 8]);
        assert_eq!(grid.to_vec(), vec![7, 8, 0, 0]);
    }
}
