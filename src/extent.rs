//! Axis sizes of 1-d, 2-d and 3-d lattices.
//!
//! An extent is a value object describing a rectangular shape. The total
//! element count of every extent must fit [`MAX_LENGTH`]; constructors
//! return [`Error::ExtentOutOfBounds`](crate::Error::ExtentOutOfBounds)
//! otherwise. A 2-d extent additionally carries a `channels` count for
//! multi-valued cells, with `length() = rows·cols·channels`.

use crate::index::{Index2dIter, Index3dIter, Range2d, Range3d};
use crate::{Error, Result};

/// Maximum number of storage elements an extent may describe.
///
/// Flat buffer offsets are computed in signed arithmetic, so the element
/// count is bounded by the signed 32-bit range.
pub const MAX_LENGTH: usize = i32::MAX as usize;

fn checked_length(axes: &[usize]) -> Result<usize> {
    let mut length = 1usize;
    for &axis in axes {
        length = length
            .checked_mul(axis)
            .filter(|&l| l <= MAX_LENGTH)
            .ok_or_else(|| Error::ExtentOutOfBounds {
                axes: axes.to_vec(),
            })?;
    }
    Ok(length)
}

/// The extent of 1-d structures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Extent1d {
    nelements: usize,
}

impl Extent1d {
    pub fn new(nelements: usize) -> Result<Self> {
        checked_length(&[nelements])?;
        Ok(Self { nelements })
    }

    pub const fn nelements(&self) -> usize {
        self.nelements
    }

    /// The number of cells of the structure.
    pub const fn size(&self) -> usize {
        self.nelements
    }

    /// The array length needed for storing all cells.
    pub const fn length(&self) -> usize {
        self.nelements
    }
}

impl IntoIterator for Extent1d {
    type Item = usize;
    type IntoIter = std::ops::Range<usize>;

    fn into_iter(self) -> std::ops::Range<usize> {
        0..self.nelements
    }
}

/// The extent of 2-d structures.
///
/// Besides `rows` and `cols` it carries a `channels` count (≥ 1) for
/// multi-valued cells; plain matrices use one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent2d {
    rows: usize,
    cols: usize,
    channels: usize,
}

impl Extent2d {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Self::with_channels(rows, cols, 1)
    }

    pub fn with_channels(rows: usize, cols: usize, channels: usize) -> Result<Self> {
        if channels < 1 {
            return Err(Error::ExtentOutOfBounds {
                axes: vec![rows, cols, channels],
            });
        }
        checked_length(&[rows, cols, channels])?;
        Ok(Self {
            rows,
            cols,
            channels,
        })
    }

    /// Constructor for extents derived from an already validated one,
    /// whose element count can only have shrunk.
    pub(crate) fn derived(rows: usize, cols: usize, channels: usize) -> Self {
        Self {
            rows,
            cols,
            channels,
        }
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    pub const fn channels(&self) -> usize {
        self.channels
    }

    /// The number of cells of the structure.
    pub const fn size(&self) -> usize {
        self.rows * self.cols
    }

    /// The array length needed for storing all cells: `size()·channels`.
    pub const fn length(&self) -> usize {
        self.size() * self.channels
    }
}

impl IntoIterator for Extent2d {
    type Item = crate::index::Index2d;
    type IntoIter = Index2dIter;

    fn into_iter(self) -> Index2dIter {
        Index2dIter::new(Range2d::from(self))
    }
}

/// The extent of 3-d structures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Extent3d {
    slices: usize,
    rows: usize,
    cols: usize,
}

impl Extent3d {
    pub fn new(slices: usize, rows: usize, cols: usize) -> Result<Self> {
        checked_length(&[slices, rows, cols])?;
        Ok(Self { slices, rows, cols })
    }

    pub(crate) fn derived(slices: usize, rows: usize, cols: usize) -> Self {
        Self { slices, rows, cols }
    }

    pub const fn slices(&self) -> usize {
        self.slices
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// The number of cells of the structure.
    pub const fn size(&self) -> usize {
        self.slices * self.rows * self.cols
    }

    /// The array length needed for storing all cells.
    pub const fn length(&self) -> usize {
        self.size()
    }
}

impl IntoIterator for Extent3d {
    type Item = crate::index::Index3d;
    type IntoIter = Index3dIter;

    fn into_iter(self) -> Index3dIter {
        Index3dIter::new(Range3d::from(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent2d_size_and_length() {
        let extent = Extent2d::new(3, 4).unwrap();
        assert_eq!(extent.size(), 12);
        assert_eq!(extent.length(), 12);
        assert_eq!(extent.channels(), 1);

        let extent = Extent2d::with_channels(3, 4, 2).unwrap();
        assert_eq!(extent.size(), 12);
        assert_eq!(extent.length(), 24);
    }

    #[test]
    fn overflowing_extent_is_rejected() {
        assert!(matches!(
            Extent2d::new(70_000, 70_000),
            Err(Error::ExtentOutOfBounds { .. })
        ));
        assert!(matches!(
            Extent2d::with_channels(1, 1, 0),
            Err(Error::ExtentOutOfBounds { .. })
        ));
        assert!(Extent3d::new(1290, 1290, 1290).is_err());
    }

    #[test]
    fn zero_extents_are_valid() {
        let extent = Extent2d::new(0, 7).unwrap();
        assert_eq!(extent.size(), 0);
        assert_eq!(extent.into_iter().count(), 0);
    }

    #[test]
    fn extent_iteration_is_row_major() {
        let extent = Extent2d::new(2, 2).unwrap();
        let indexes: Vec<_> = extent.into_iter().map(|i| (i.row, i.col)).collect();
        assert_eq!(indexes, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }
}
