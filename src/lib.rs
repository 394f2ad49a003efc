//! Strided multidimensional lattices and dense linear algebra over flat buffers.
//!
//! The crate is built around a view model that decouples *extent* (axis
//! sizes), *layout* (start offset plus per-axis strides) and *storage* (a
//! flat, shared element buffer). Slicing, transposition, dicing and
//! stride reduction all produce new views into the same buffer in O(1),
//! without copying.
//!
//! # Core Types
//!
//! - [`Extent1d`] / [`Extent2d`] / [`Extent3d`]: axis sizes of a lattice
//! - [`Layout1d`] / [`Layout2d`] / [`Layout3d`]: start offset + strides,
//!   mapping a dimensional index to a flat buffer offset
//! - [`Structure1d`] / [`Structure2d`] / [`Structure3d`]: extent + layout,
//!   with the view transforms `range`, `stride`, `transpose` and slicing
//! - [`DenseArray`]: flat shared storage with `get`/`set`/`copy`/`like`
//! - [`Grid1d`] / [`Grid2d`] / [`Grid3d`]: a structure paired with storage;
//!   [`DoubleGrid2d`] is the dense double matrix the kernels operate on
//!
//! # Lattice Operations
//!
//! - element access, `fill`, `assign`, `apply`, `zip_apply`, `swap`
//! - `reduce` (right fold in descending index order), `any_match` /
//!   `all_match` / `non_match`
//! - tolerance-aware equality through [`NumericalContext`]
//!
//! # Linear Algebra
//!
//! - [`gemm`] / [`gemv`] with α/β scaling and transpose-as-view flags
//! - triangular solves [`trsm_lower`] / [`trsm_upper`] and row permutation
//! - [`LuDecomposition`], [`QrDecomposition`], [`CholeskyDecomposition`],
//!   [`EigenDecomposition`], [`SingularValueDecomposition`]
//! - the [`algebra`] façade: `solve`, `inverse`, `det`, `rank`, `cond`,
//!   norms and `trace`
//!
//! # Example
//!
//! ```rust
//! use lattix::{DoubleGrid2d, Extent2d};
//!
//! let a = DoubleGrid2d::from_fn(Extent2d::new(2, 2).unwrap(), |r, c| {
//!     (r * 2 + c) as f64
//! });
//! let b = a.transposed();
//! // `b` is a view: writing through `a` is visible through `b`.
//! assert_eq!(b.get(1, 0), a.get(0, 1));
//! ```

mod array;
mod blas;
mod cholesky;
mod context;
mod eigen;
mod extent;
mod grid;
mod index;
mod layout;
mod loops;
mod lu;
mod qr;
mod structure;
mod svd;

pub mod algebra;

// ============================================================================
// Structure primitives
// ============================================================================
pub use extent::{Extent1d, Extent2d, Extent3d, MAX_LENGTH};
pub use index::{Index1d, Index2d, Index2dIter, Index3d, Index3dIter, Range1d, Range2d, Range3d};
pub use layout::{Layout1d, Layout2d, Layout3d, Stride1d, Stride2d, Stride3d};
pub use structure::{Axis3d, Structure1d, Structure2d, Structure3d};

// ============================================================================
// Storage and grids
// ============================================================================
pub use array::DenseArray;
pub use grid::{
    DoubleGrid1d, DoubleGrid2d, DoubleGrid3d, Grid1d, Grid2d, Grid3d, IntGrid1d, IntGrid2d,
    LongGrid1d, LongGrid2d,
};

// ============================================================================
// Loop strategies
// ============================================================================
pub use loops::{
    Backward1d, Backward2d, Backward3d, ColMajor2d, Forward1d, Loop1d, Loop2d, Loop3d, RowMajor2d,
    RowMajor3d,
};

// ============================================================================
// Numerical context
// ============================================================================
pub use context::NumericalContext;

// ============================================================================
// Kernels and factorizations
// ============================================================================
pub use blas::{gemm, gemv, permute_rows, trsm_lower, trsm_upper, trsv_lower, trsv_upper};
pub use cholesky::CholeskyDecomposition;
pub use eigen::EigenDecomposition;
pub use lu::LuDecomposition;
pub use qr::QrDecomposition;
pub use svd::SingularValueDecomposition;

// ============================================================================
// Error types
// ============================================================================

/// Errors raised by lattice and matrix operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// An extent constructor received axes whose element count overflows
    /// the storage index range.
    #[error("extent is out of bounds: {axes:?}")]
    ExtentOutOfBounds { axes: Vec<usize> },

    /// A dimensional index lies outside the extent it is used with.
    #[error("index {index:?} is out of bounds for extent {extent:?}")]
    IndexOutOfBounds { index: Vec<usize>, extent: Vec<usize> },

    /// A binary lattice operation received operands with unequal extents.
    #[error("extent mismatch: {left:?} vs {right:?}")]
    ExtentMismatch { left: Vec<usize>, right: Vec<usize> },

    /// A kernel received matrices whose shapes forbid the operation.
    #[error("shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    /// A solve encountered a pivot below the active tolerance.
    #[error("matrix is singular")]
    Singular,

    /// Cholesky found a non-positive pivot.
    #[error("matrix is not symmetric positive definite")]
    NotPositiveDefinite,

    /// An iterative factorization exceeded its iteration cap.
    #[error("no convergence after {iterations} iterations")]
    NoConvergence { iterations: usize },

    /// A documented precondition was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Result type for lattice and matrix operations.
pub type Result<T> = std::result::Result<T, Error>;
