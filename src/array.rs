//! Flat storage arrays shared between lattice views.
//!
//! A [`DenseArray`] owns a contiguous, zero-based element buffer behind a
//! reference-counted cell. Cloning shares the buffer: every grid view
//! holding a clone sees mutations made through any other clone. The
//! library is single-threaded, so interior mutability is plain
//! `RefCell`; all accesses take short borrows.

use std::cell::RefCell;
use std::rc::Rc;

use num_traits::Zero;

/// A flat, contiguous element buffer with shared ownership.
#[derive(Debug)]
pub struct DenseArray<T> {
    elements: Rc<RefCell<Box<[T]>>>,
}

impl<T> Clone for DenseArray<T> {
    /// Shares the underlying buffer; use [`DenseArray::copy`] for a deep
    /// copy.
    fn clone(&self) -> Self {
        Self {
            elements: Rc::clone(&self.elements),
        }
    }
}

impl<T> DenseArray<T> {
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            elements: Rc::new(RefCell::new(values.into_boxed_slice())),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `self` and `other` share one buffer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.elements, &other.elements)
    }
}

impl<T: Zero + Clone> DenseArray<T> {
    /// A zero-filled buffer of the given length.
    pub fn zeros(len: usize) -> Self {
        Self::from_vec(vec![T::zero(); len])
    }

    /// The storage factory hook: a fresh zero-filled buffer of the same
    /// kind as `self`.
    pub fn like(&self, len: usize) -> Self {
        Self::zeros(len)
    }
}

impl<T: Clone> DenseArray<T> {
    /// The element at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> T {
        self.elements.borrow()[index].clone()
    }

    /// Store `value` at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn set(&self, index: usize, value: T) {
        self.elements.borrow_mut()[index] = value;
    }

    /// A deep copy with its own buffer.
    pub fn copy(&self) -> Self {
        Self::from_vec(self.elements.borrow().to_vec())
    }

    /// The buffer contents as a vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.elements.borrow().to_vec()
    }

    /// Block-copy `len` elements from `src` starting at `src_start` into
    /// `self` starting at `dst_start`. The shared-buffer case is handled
    /// like an overlapping memmove.
    pub fn copy_from(&self, src: &Self, src_start: usize, dst_start: usize, len: usize) {
        if self.ptr_eq(src) {
            let snapshot: Vec<T> = {
                let elements = self.elements.borrow();
                elements[src_start..src_start + len].to_vec()
            };
            self.elements.borrow_mut()[dst_start..dst_start + len]
                .clone_from_slice(&snapshot);
        } else {
            let src_elements = src.elements.borrow();
            self.elements.borrow_mut()[dst_start..dst_start + len]
                .clone_from_slice(&src_elements[src_start..src_start + len]);
        }
    }

    /// Block-exchange `len` elements between the two buffers.
    pub fn swap_range(&self, other: &Self, self_start: usize, other_start: usize, len: usize) {
        if self.ptr_eq(other) {
            let mut elements = self.elements.borrow_mut();
            for i in 0..len {
                elements.swap(self_start + i, other_start + i);
            }
        } else {
            let snapshot: Vec<T> = {
                let elements = self.elements.borrow();
                elements[self_start..self_start + len].to_vec()
            };
            {
                let other_elements = other.elements.borrow();
                self.elements.borrow_mut()[self_start..self_start + len]
                    .clone_from_slice(&other_elements[other_start..other_start + len]);
            }
            other.elements.borrow_mut()[other_start..other_start + len]
                .clone_from_slice(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_and_copy_detaches() {
        let a = DenseArray::from_vec(vec![1.0, 2.0, 3.0]);
        let shared = a.clone();
        let deep = a.copy();

        a.set(1, 9.0);
        assert_eq!(shared.get(1), 9.0);
        assert_eq!(deep.get(1), 2.0);
    }

    #[test]
    fn like_is_zero_filled() {
        let a = DenseArray::from_vec(vec![1.0, 2.0]);
        let fresh = a.like(4);
        assert_eq!(fresh.to_vec(), vec![0.0; 4]);
        assert!(!fresh.ptr_eq(&a));
    }

    #[test]
    fn copy_from_handles_shared_buffer() {
        let a = DenseArray::from_vec(vec![1, 2, 3, 4, 5, 6]);
        let alias = a.clone();
        a.copy_from(&alias, 0, 2, 4);
        assert_eq!(a.to_vec(), vec![1, 2, 1, 2, 3, 4]);
    }

    #[test]
    fn swap_range_exchanges_blocks() {
        let a = DenseArray::from_vec(vec![1, 2, 3, 4]);
        let b = DenseArray::from_vec(vec![9, 9, 9, 9]);
        a.swap_range(&b, 0, 2, 2);
        assert_eq!(a.to_vec(), vec![9, 9, 3, 4]);
        assert_eq!(b.to_vec(), vec![9, 9, 1, 2]);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_access_panics() {
        let a = DenseArray::from_vec(vec![1.0]);
        let _ = a.get(1);
    }
}
