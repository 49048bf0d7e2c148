//! Non-owning array views: a base pointer plus a shape
//!
//! A view addresses caller-managed storage through its shape's offsets. The
//! base pointer is the logical address of index zero, which for cropped or
//! negative-stride views may lie outside the storage itself; only in-domain
//! offsets are ever dereferenced.

use crate::array::Array;
use std::marker::PhantomData;
use strided_core::{Dim, Index, Interval, Shape};

/// One axis of a slicing request: fix an index (dropping the axis), keep the
/// whole axis, or crop it to an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSpec {
    At(Index),
    All,
    Span(Interval),
}

impl From<Index> for IndexSpec {
    fn from(i: Index) -> Self {
        IndexSpec::At(i)
    }
}

impl From<Interval> for IndexSpec {
    fn from(r: Interval) -> Self {
        IndexSpec::Span(r)
    }
}

/// Apply specs to a base pointer and shape. `At` folds its offset into the
/// base; `All`/`Span` keep the axis. Returns the new base and the kept dims.
fn select<T, const R: usize, const M: usize>(
    base: *const T,
    shape: &Shape<R>,
    specs: [IndexSpec; R],
) -> (*const T, Shape<M>) {
    let mut base = base;
    let mut dims = [Dim::unit(); M];
    let mut kept = 0;
    for (axis, spec) in specs.into_iter().enumerate() {
        let d = shape.dim(axis);
        match spec {
            IndexSpec::At(i) => {
                assert!(d.is_in_range(i), "index {i} out of range on axis {axis}");
                base = base.wrapping_offset(d.stride() * i);
            }
            IndexSpec::All => {
                assert!(kept < M, "more than {M} kept axes");
                dims[kept] = d;
                kept += 1;
            }
            IndexSpec::Span(r) => {
                assert!(
                    d.contains(r),
                    "interval {}..={} out of range on axis {axis}",
                    r.min(),
                    r.max()
                );
                assert!(kept < M, "more than {M} kept axes");
                let mut cropped = d;
                cropped.set_min(r.min());
                cropped.set_extent(r.extent());
                dims[kept] = cropped;
                kept += 1;
            }
        }
    }
    assert_eq!(kept, M, "specs keep {kept} axes but the view rank is {M}");
    (base, Shape::new(dims))
}

/// Read-only view over borrowed storage.
pub struct ArrayView<'a, T, const R: usize> {
    base: *const T,
    shape: Shape<R>,
    marker: PhantomData<&'a T>,
}

impl<T, const R: usize> Clone for ArrayView<'_, T, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const R: usize> Copy for ArrayView<'_, T, R> {}

unsafe impl<T: Sync, const R: usize> Send for ArrayView<'_, T, R> {}
unsafe impl<T: Sync, const R: usize> Sync for ArrayView<'_, T, R> {}

impl<'a, T, const R: usize> ArrayView<'a, T, R> {
    /// Build a view over caller-managed storage. `base` is the address of
    /// index zero.
    ///
    /// # Safety
    ///
    /// `base + shape.offset(i)` must be readable for every in-domain `i`
    /// for the lifetime `'a`.
    pub unsafe fn from_raw_parts(base: *const T, shape: Shape<R>) -> Self {
        debug_assert!(shape.is_resolved());
        ArrayView { base, shape, marker: PhantomData }
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

    pub fn get(&self, indices: [Index; R]) -> Option<&'a T> {
        if self.shape.is_in_range(indices) {
            Some(unsafe { &*self.base.wrapping_offset(self.shape.offset(indices)) })
        } else {
            None
        }
    }

    /// # Safety
    ///
    /// `indices` must be in range.
    pub unsafe fn get_unchecked(&self, indices: [Index; R]) -> &'a T {
        &*self.base.wrapping_offset(self.shape.offset(indices))
    }

    /// Reduced- or equal-rank view selected by one spec per axis; `At`
    /// drops its axis, so the output rank `M` is the number of kept axes.
    pub fn view_with<const M: usize>(&self, specs: [IndexSpec; R]) -> ArrayView<'a, T, M> {
        let (base, shape) = select(self.base, &self.shape, specs);
        ArrayView { base, shape, marker: PhantomData }
    }

    /// Same-rank view cropped to the given intervals.
    pub fn crop(&self, intervals: [Interval; R]) -> ArrayView<'a, T, R> {
        self.view_with(intervals.map(IndexSpec::Span))
    }

    /// View of the same storage as elements of `U`.
    ///
    /// # Safety
    ///
    /// Every in-domain cell must hold a valid bit pattern for `U`.
    pub unsafe fn reinterpret<U>(&self) -> ArrayView<'a, U, R> {
        assert_eq!(std::mem::size_of::<U>(), std::mem::size_of::<T>());
        assert!(std::mem::align_of::<U>() <= std::mem::align_of::<T>());
        ArrayView { base: self.base.cast(), shape: self.shape, marker: PhantomData }
    }

    /// Deep copy into a freshly allocated compact array with the same mins
    /// and extents.
    pub fn to_dense(&self) -> Array<T, R>
    where
        T: Clone,
    {
        Array::from_view(self)
    }
}

impl<T, const R: usize> std::ops::Index<[Index; R]> for ArrayView<'_, T, R> {
    type Output = T;

    fn index(&self, indices: [Index; R]) -> &T {
        self.get(indices).expect("index out of range")
    }
}

/// Mutable view over borrowed storage.
pub struct ArrayViewMut<'a, T, const R: usize> {
    base: *mut T,
    shape: Shape<R>,
    marker: PhantomData<&'a mut T>,
}

unsafe impl<T: Send, const R: usize> Send for ArrayViewMut<'_, T, R> {}
unsafe impl<T: Sync, const R: usize> Sync for ArrayViewMut<'_, T, R> {}

impl<'a, T, const R: usize> ArrayViewMut<'a, T, R> {
    /// Build a mutable view over caller-managed storage. `base` is the
    /// address of index zero.
    ///
    /// # Safety
    ///
    /// `base + shape.offset(i)` must be readable and writable for every
    /// in-domain `i` for the lifetime `'a`, with no other live alias.
    pub unsafe fn from_raw_parts(base: *mut T, shape: Shape<R>) -> Self {
        debug_assert!(shape.is_resolved());
        ArrayViewMut { base, shape, marker: PhantomData }
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

    /// Read-only rebind of this view.
    pub fn as_view(&self) -> ArrayView<'_, T, R> {
        ArrayView { base: self.base, shape: self.shape, marker: PhantomData }
    }

    pub fn get(&self, indices: [Index; R]) -> Option<&T> {
        if self.shape.is_in_range(indices) {
            Some(unsafe { &*self.base.wrapping_offset(self.shape.offset(indices)) })
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, indices: [Index; R]) -> Option<&mut T> {
        if self.shape.is_in_range(indices) {
            Some(unsafe { &mut *self.base.wrapping_offset(self.shape.offset(indices)) })
        } else {
            None
        }
    }

    /// # Safety
    ///
    /// `indices` must be in range.
    pub unsafe fn get_unchecked_mut(&mut self, indices: [Index; R]) -> &mut T {
        &mut *self.base.wrapping_offset(self.shape.offset(indices))
    }

    /// Reduced- or equal-rank mutable view; see [`ArrayView::view_with`].
    pub fn view_with_mut<const M: usize>(
        &mut self,
        specs: [IndexSpec; R],
    ) -> ArrayViewMut<'_, T, M> {
        let (base, shape) = select(self.base.cast_const(), &self.shape, specs);
        ArrayViewMut { base: base.cast_mut(), shape, marker: PhantomData }
    }

    /// Consuming [`view_with_mut`](Self::view_with_mut) keeping the full
    /// borrow lifetime.
    pub fn into_view_with<const M: usize>(self, specs: [IndexSpec; R]) -> ArrayViewMut<'a, T, M> {
        let (base, shape) = select(self.base.cast_const(), &self.shape, specs);
        ArrayViewMut { base: base.cast_mut(), shape, marker: PhantomData }
    }

    /// Same-rank mutable view cropped to the given intervals.
    pub fn crop_mut(&mut self, intervals: [Interval; R]) -> ArrayViewMut<'_, T, R> {
        self.view_with_mut(intervals.map(IndexSpec::Span))
    }
}

impl<T, const R: usize> std::ops::Index<[Index; R]> for ArrayViewMut<'_, T, R> {
    type Output = T;

    fn index(&self, indices: [Index; R]) -> &T {
        self.get(indices).expect("index out of range")
    }
}

impl<T, const R: usize> std::ops::IndexMut<[Index; R]> for ArrayViewMut<'_, T, R> {
    fn index_mut(&mut self, indices: [Index; R]) -> &mut T {
        self.get_mut(indices).expect("index out of range")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strided_core::{range, shape};

    #[test]
    fn test_view_over_slice() {
        let data: Vec<i32> = (0..100).collect();
        let view = unsafe {
            ArrayView::from_raw_parts(data.as_ptr(), Shape::dense([100]))
        };
        for i in 0..100 {
            assert_eq!(view[[i]], i as i32);
        }
    }

    #[test]
    fn test_2d_view_offsets() {
        let data: Vec<i32> = (0..100).collect();
        let view = unsafe {
            ArrayView::from_raw_parts(data.as_ptr(), Shape::dense([20, 5]).resolved())
        };
        for y in 0..5 {
            for x in 0..20 {
                assert_eq!(view[[x, y]], (y * 20 + x) as i32);
            }
        }
    }

    #[test]
    fn test_strided_view_reads_every_other() {
        let data: Vec<i32> = (0..100).collect();
        let evens = unsafe {
            ArrayView::from_raw_parts(data.as_ptr(), shape![(0, 50, 2)])
        };
        for i in 0..50 {
            assert_eq!(evens[[i]], (i * 2) as i32);
        }
        let copy = evens.to_dense();
        for i in 0..50 {
            assert_eq!(copy[[i]], (i * 2) as i32);
        }
    }

    #[test]
    fn test_slice_drops_axis() {
        let data: Vec<i32> = (0..72).collect();
        let a = unsafe {
            ArrayView::from_raw_parts(data.as_ptr(), Shape::dense([8, 9]).resolved())
        };

        let row: ArrayView<i32, 1> = a.view_with([IndexSpec::At(3), IndexSpec::All]);
        assert_eq!(row.shape().dim(0), a.shape().dim(1));
        for y in 0..9 {
            assert_eq!(row[[y]], a[[3, y]]);
        }

        let col: ArrayView<i32, 1> = a.view_with([IndexSpec::All, IndexSpec::At(2)]);
        assert_eq!(col.shape().dim(0), a.shape().dim(0));
        for x in 0..8 {
            assert_eq!(col[[x]], a[[x, 2]]);
        }
    }

    #[test]
    fn test_crop_keeps_mins_and_strides() {
        let data: Vec<i32> = (0..72).collect();
        let a = unsafe {
            ArrayView::from_raw_parts(data.as_ptr(), Shape::dense([8, 9]).resolved())
        };

        let b = a.crop([range(2, 6), range(3, 4)]);
        assert_eq!(b.shape().dim(0), Dim::dense(2, 6));
        assert_eq!(b.shape().dim(1), Dim::new(3, 4, a.shape().dim(1).stride()));
        for y in 3..7 {
            for x in 2..8 {
                assert_eq!(b[[x, y]], a[[x, y]]);
            }
        }

        // Fixing one axis of a crop still shares the outer stride.
        let line: ArrayView<i32, 1> = a.view_with([IndexSpec::At(6), IndexSpec::Span(range(4, 3))]);
        assert_eq!(line.shape().dim(0), Dim::new(4, 3, a.shape().dim(1).stride()));
        for y in 4..7 {
            assert_eq!(line[[y]], a[[6, y]]);
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_crop_outside_domain_panics() {
        let data: Vec<i32> = (0..10).collect();
        let a = unsafe { ArrayView::from_raw_parts(data.as_ptr(), Shape::dense([10])) };
        let _ = a.crop([range(5, 6)]);
    }

    #[test]
    fn test_get_out_of_range_is_none() {
        let data: Vec<i32> = (0..10).collect();
        let a = unsafe { ArrayView::from_raw_parts(data.as_ptr(), Shape::dense([10])) };
        assert!(a.get([10]).is_none());
        assert!(a.get([-1]).is_none());
    }

    #[test]
    fn test_reinterpret_same_bytes() {
        let bits = 8.0f32.to_bits();
        let data = vec![bits; 24];
        let ints = unsafe {
            ArrayView::from_raw_parts(data.as_ptr(), Shape::dense([4, 3, 2]).resolved())
        };
        let floats = unsafe { ints.reinterpret::<f32>() };
        strided_core::for_all_indices(ints.shape(), |x, y, z| {
            assert_eq!(ints[[x, y, z]], bits);
            assert_eq!(floats[[x, y, z]], 8.0f32);
        });
    }

    #[test]
    fn test_mutable_view_writes_through() {
        let mut data = vec![0i32; 20];
        {
            let mut v = unsafe {
                ArrayViewMut::from_raw_parts(data.as_mut_ptr(), Shape::dense([4, 5]).resolved())
            };
            v[[1, 2]] = 42;
            let mut cropped = v.crop_mut([range(0, 4), range(4, 1)]);
            cropped[[3, 4]] = 7;
        }
        assert_eq!(data[2 * 4 + 1], 42);
        assert_eq!(data[4 * 4 + 3], 7);
    }
}
