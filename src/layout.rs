//! Strides and layouts: the map from dimensional index to flat offset.
//!
//! A layout is `(start, stride)` and maps an index `i` to the buffer
//! offset `start + Σⱼ strideⱼ·iⱼ`. Strides are signed per-axis steps;
//! zero and negative strides are representable.

use crate::extent::{Extent2d, Extent3d};

/// The stride of a 1-d layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stride1d {
    pub value: isize,
}

impl Stride1d {
    pub const fn new(value: isize) -> Self {
        Self { value }
    }
}

/// The strides of a 2-d layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stride2d {
    pub row: isize,
    pub col: isize,
}

impl Stride2d {
    pub const fn new(row: isize, col: isize) -> Self {
        Self { row, col }
    }
}

/// The strides of a 3-d layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stride3d {
    pub slice: isize,
    pub row: isize,
    pub col: isize,
}

impl Stride3d {
    pub const fn new(slice: isize, row: isize, col: isize) -> Self {
        Self { slice, row, col }
    }
}

// ============================================================================
// Layouts
// ============================================================================

/// A 1-d layout: start offset plus stride.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout1d {
    start: isize,
    stride: Stride1d,
}

impl Layout1d {
    pub const fn new(start: isize, stride: Stride1d) -> Self {
        Self { start, stride }
    }

    /// The layout of a freshly allocated 1-d lattice: offset zero,
    /// unit stride.
    pub const fn contiguous() -> Self {
        Self::new(0, Stride1d::new(1))
    }

    pub const fn start(&self) -> isize {
        self.start
    }

    pub const fn stride(&self) -> Stride1d {
        self.stride
    }

    /// The flat buffer offset of the given index.
    #[inline]
    pub fn offset(&self, index: usize) -> isize {
        self.start + self.stride.value * index as isize
    }
}

/// A 2-d layout: start offset plus per-axis strides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout2d {
    start: isize,
    stride: Stride2d,
}

impl Layout2d {
    pub const fn new(start: isize, stride: Stride2d) -> Self {
        Self { start, stride }
    }

    /// The row-major layout of a freshly allocated lattice with the
    /// given extent: consecutive cells of a row are `channels` apart.
    pub fn row_major(extent: &Extent2d) -> Self {
        let channels = extent.channels() as isize;
        Self::new(
            0,
            Stride2d::new(extent.cols() as isize * channels, channels),
        )
    }

    pub const fn start(&self) -> isize {
        self.start
    }

    pub const fn stride(&self) -> Stride2d {
        self.stride
    }

    /// The flat buffer offset of the given index.
    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> isize {
        self.start + self.stride.row * row as isize + self.stride.col * col as isize
    }
}

/// A 3-d layout: start offset plus per-axis strides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout3d {
    start: isize,
    stride: Stride3d,
}

impl Layout3d {
    pub const fn new(start: isize, stride: Stride3d) -> Self {
        Self { start, stride }
    }

    /// The row-major layout of a freshly allocated lattice with the
    /// given extent.
    pub fn row_major(extent: &Extent3d) -> Self {
        Self::new(
            0,
            Stride3d::new(
                (extent.rows() * extent.cols()) as isize,
                extent.cols() as isize,
                1,
            ),
        )
    }

    pub const fn start(&self) -> isize {
        self.start
    }

    pub const fn stride(&self) -> Stride3d {
        self.stride
    }

    /// The flat buffer offset of the given index.
    #[inline]
    pub fn offset(&self, slice: usize, row: usize, col: usize) -> isize {
        self.start
            + self.stride.slice * slice as isize
            + self.stride.row * row as isize
            + self.stride.col * col as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::Extent2d;

    #[test]
    fn row_major_offsets() {
        let layout = Layout2d::row_major(&Extent2d::new(4, 5).unwrap());
        assert_eq!(layout.offset(0, 0), 0);
        assert_eq!(layout.offset(0, 3), 3);
        assert_eq!(layout.offset(2, 3), 13);
    }

    #[test]
    fn channels_scale_strides() {
        let layout = Layout2d::row_major(&Extent2d::with_channels(4, 5, 3).unwrap());
        assert_eq!(layout.stride(), Stride2d::new(15, 3));
        assert_eq!(layout.offset(1, 1), 18);
    }

    #[test]
    fn negative_strides_walk_backwards() {
        let layout = Layout1d::new(9, Stride1d::new(-1));
        assert_eq!(layout.offset(0), 9);
        assert_eq!(layout.offset(9), 0);
    }

    #[test]
    fn layout3d_offsets() {
        let layout = Layout3d::row_major(&Extent3d::new(2, 3, 4).unwrap());
        assert_eq!(layout.offset(0, 0, 0), 0);
        assert_eq!(layout.offset(1, 0, 0), 12);
        assert_eq!(layout.offset(1, 2, 3), 23);
    }
}
