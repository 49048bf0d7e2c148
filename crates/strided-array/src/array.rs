//! Owning multidimensional arrays
//!
//! An `Array` allocates `flat_extent()` slots but constructs and destroys
//! only the `size()` in-domain cells its shape addresses; for sparse shapes
//! the remaining slots stay untouched. Moves are plain Rust moves with no
//! per-element work.

use crate::buffer::RawBuffer;
use crate::view::{ArrayView, ArrayViewMut, IndexSpec};
use std::mem::MaybeUninit;
use strided_core::{for_each_index, Index, Interval, Shape};

pub struct Array<T, const R: usize> {
    buffer: RawBuffer<T>,
    shape: Shape<R>,
}

unsafe impl<T: Send, const R: usize> Send for Array<T, R> {}
unsafe impl<T: Sync, const R: usize> Sync for Array<T, R> {}

impl<T, const R: usize> Array<T, R> {
    /// Value-initialized array: one `T::default()` per in-domain cell.
    pub fn new(shape: Shape<R>) -> Self
    where
        T: Default,
    {
        Self::build(shape, T::default)
    }

    /// Fill-constructed array: one clone of `value` per in-domain cell. The
    /// source value is dropped when this returns.
    pub fn with_value(shape: Shape<R>, value: T) -> Self
    where
        T: Clone,
    {
        Self::build(shape, || value.clone())
    }

    fn build(shape: Shape<R>, f: impl FnMut() -> T) -> Self {
        let shape = shape.resolved();
        debug_assert!(shape.is_one_to_one(), "owning arrays need injective shapes");
        let buffer = RawBuffer::allocate(shape.flat_extent() as usize);
        let mut array = Array { buffer, shape: Shape::default() };
        array.init_cells(shape, f);
        array
    }

    /// Write one `f()` into every in-domain cell of `shape`, then adopt it.
    /// The shape stays empty until every cell is live, so a panicking `f`
    /// leaks already-written cells instead of dropping uninitialized ones.
    fn init_cells(&mut self, shape: Shape<R>, mut f: impl FnMut() -> T) {
        let base = self.buffer.as_ptr().wrapping_offset(-shape.flat_min());
        for_each_index(&shape, |idx| unsafe {
            base.wrapping_offset(shape.offset(idx)).write(f());
        });
        self.shape = shape;
    }

    fn drop_cells(&mut self) {
        if !std::mem::needs_drop::<T>() || self.shape.is_empty() {
            self.shape = Shape::default();
            return;
        }
        let base = self.base_ptr();
        let shape = self.shape;
        // Empty the shape first so a panicking destructor cannot re-drop.
        self.shape = Shape::default();
        for_each_index(&shape, |idx| unsafe {
            std::ptr::drop_in_place(base.wrapping_offset(shape.offset(idx)));
        });
    }

    /// Logical address of index zero.
    fn base_ptr(&self) -> *mut T {
        self.buffer.as_ptr().wrapping_offset(-self.shape.flat_min())
    }

    /// Replace the shape and refill every in-domain cell with clones of
    /// `value`. Reallocates only if the new shape needs more slots than the
    /// current allocation; slots outside the new domain are left untouched.
    pub fn assign(&mut self, shape: Shape<R>, value: T)
    where
        T: Clone,
    {
        let shape = shape.resolved();
        debug_assert!(shape.is_one_to_one(), "owning arrays need injective shapes");
        self.drop_cells();
        let needed = shape.flat_extent() as usize;
        if needed > self.buffer.capacity() {
            self.buffer = RawBuffer::allocate(needed);
        }
        self.init_cells(shape, || value.clone());
    }

    /// Drop the in-domain cells, release the storage, and empty the shape.
    pub fn clear(&mut self) {
        self.drop_cells();
        self.buffer = RawBuffer::empty();
    }

    pub fn shape(&self) -> &Shape<R> {
        &self.shape
    }

    pub fn size(&self) -> Index {
        self.shape.size()
    }

    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    pub fn get(&self, indices: [Index; R]) -> Option<&T> {
        // The capacity guard keeps rank-0 default arrays (size 1, no
        // storage) from handing out a dangling reference.
        if self.buffer.capacity() > 0 && self.shape.is_in_range(indices) {
            Some(unsafe { &*self.base_ptr().wrapping_offset(self.shape.offset(indices)) })
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, indices: [Index; R]) -> Option<&mut T> {
        if self.buffer.capacity() > 0 && self.shape.is_in_range(indices) {
            Some(unsafe { &mut *self.base_ptr().wrapping_offset(self.shape.offset(indices)) })
        } else {
            None
        }
    }

    /// # Safety
    ///
    /// `indices` must be in range.
    pub unsafe fn get_unchecked(&self, indices: [Index; R]) -> &T {
        &*self.base_ptr().wrapping_offset(self.shape.offset(indices))
    }

    /// Read-only view of this array.
    pub fn view(&self) -> ArrayView<'_, T, R> {
        unsafe { ArrayView::from_raw_parts(self.base_ptr(), self.shape) }
    }

    /// Mutable view of this array.
    pub fn view_mut(&mut self) -> ArrayViewMut<'_, T, R> {
        unsafe { ArrayViewMut::from_raw_parts(self.base_ptr(), self.shape) }
    }

    /// Reduced- or equal-rank view; see [`ArrayView::view_with`].
    pub fn view_with<const M: usize>(&self, specs: [IndexSpec; R]) -> ArrayView<'_, T, M> {
        self.view().view_with(specs)
    }

    /// Reduced- or equal-rank mutable view.
    pub fn view_with_mut<const M: usize>(
        &mut self,
        specs: [IndexSpec; R],
    ) -> ArrayViewMut<'_, T, M> {
        self.view_mut().into_view_with(specs)
    }

    /// Same-rank view cropped to the given intervals.
    pub fn crop(&self, intervals: [Interval; R]) -> ArrayView<'_, T, R> {
        self.view().crop(intervals)
    }

    /// View of the same storage as elements of `U`.
    ///
    /// # Safety
    ///
    /// Every in-domain cell must hold a valid bit pattern for `U`.
    pub unsafe fn reinterpret<U>(&self) -> ArrayView<'_, U, R> {
        self.view().reinterpret()
    }

    /// The raw allocation, in-domain or not. Slot `k` holds the cell at
    /// flat offset `flat_min + k`; only in-domain slots are initialized.
    pub fn storage(&self) -> &[MaybeUninit<T>] {
        self.buffer.slots()
    }

    pub fn storage_mut(&mut self) -> &mut [MaybeUninit<T>] {
        self.buffer.slots_mut()
    }

    pub(crate) fn from_view(src: &ArrayView<'_, T, R>) -> Self
    where
        T: Clone,
    {
        let shape = src.shape().make_compact();
        let buffer: RawBuffer<T> = RawBuffer::allocate(shape.flat_extent() as usize);
        let mut array = Array { buffer, shape: Shape::default() };
        let base = array.buffer.as_ptr().wrapping_offset(-shape.flat_min());
        for_each_index(&shape, |idx| unsafe {
            base.wrapping_offset(shape.offset(idx)).write(src[idx].clone());
        });
        array.shape = shape;
        array
    }
}

impl<T, const R: usize> Default for Array<T, R> {
    fn default() -> Self {
        Array { buffer: RawBuffer::empty(), shape: Shape::default() }
    }
}

impl<T, const R: usize> Drop for Array<T, R> {
    fn drop(&mut self) {
        self.drop_cells();
    }
}

impl<T: Clone, const R: usize> Clone for Array<T, R> {
    /// Deep copy of the in-domain cells; exactly `size()` clones.
    fn clone(&self) -> Self {
        let shape = self.shape;
        let buffer: RawBuffer<T> = RawBuffer::allocate(shape.flat_extent() as usize);
        let mut array = Array { buffer, shape: Shape::default() };
        let base = array.buffer.as_ptr().wrapping_offset(-shape.flat_min());
        let src = self.view();
        for_each_index(&shape, |idx| unsafe {
            base.wrapping_offset(shape.offset(idx)).write(src[idx].clone());
        });
        array.shape = shape;
        array
    }
}

impl<T: PartialEq, const R: usize> PartialEq for Array<T, R> {
    fn eq(&self, other: &Self) -> bool {
        crate::algorithm::equal(&self.view(), &other.view())
    }
}

impl<T, const R: usize> std::ops::Index<[Index; R]> for Array<T, R> {
    type Output = T;

    fn index(&self, indices: [Index; R]) -> &T {
        self.get(indices).expect("index out of range")
    }
}

impl<T, const R: usize> std::ops::IndexMut<[Index; R]> for Array<T, R> {
    fn index_mut(&mut self, indices: [Index; R]) -> &mut T {
        self.get_mut(indices).expect("index out of range")
    }
}

impl<T: std::fmt::Debug, const R: usize> std::fmt::Debug for Array<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Array").field("shape", &self.shape).finish_non_exhaustive()
    }
}
