//! Raw storage for owning arrays
//!
//! A `RawBuffer` owns uninitialized slots; element lifecycle is driven by
//! the array's shape, so only memory is managed here. Allocation failure is
//! fatal via `handle_alloc_error`.

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::mem::MaybeUninit;
use std::ptr::NonNull;

pub(crate) struct RawBuffer<T> {
    ptr: NonNull<T>,
    capacity: usize,
}

impl<T> RawBuffer<T> {
    pub(crate) fn empty() -> Self {
        RawBuffer { ptr: NonNull::dangling(), capacity: 0 }
    }

    pub(crate) fn allocate(capacity: usize) -> Self {
        if capacity == 0 || std::mem::size_of::<T>() == 0 {
            return RawBuffer { ptr: NonNull::dangling(), capacity };
        }
        let layout = Layout::array::<T>(capacity).expect("buffer layout overflows");
        let ptr = unsafe { alloc(layout) };
        let Some(ptr) = NonNull::new(ptr.cast::<T>()) else {
            handle_alloc_error(layout);
        };
        RawBuffer { ptr, capacity }
    }

    pub(crate) fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn slots(&self) -> &[MaybeUninit<T>] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr().cast(), self.capacity) }
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [MaybeUninit<T>] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr().cast(), self.capacity) }
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        if self.capacity == 0 || std::mem::size_of::<T>() == 0 {
            return;
        }
        let layout = Layout::array::<T>(self.capacity).expect("buffer layout overflows");
        unsafe { dealloc(self.ptr.as_ptr().cast(), layout) };
    }
}
