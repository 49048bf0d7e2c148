//! Whole-array algorithms over views: copy, move, fill, generate, compare

use crate::view::{ArrayView, ArrayViewMut};
use strided_core::{for_each_index, Result, ShapeError};

/// Check that `src` covers every index of `dst`, per axis. Broadcast source
/// axes cover everything.
fn check_covers<T, U, const R: usize>(
    src: &ArrayView<'_, T, R>,
    dst: &ArrayViewMut<'_, U, R>,
) -> Result<()> {
    for axis in 0..R {
        let s = src.shape().dim(axis);
        let d = dst.shape().dim(axis);
        if !s.contains(d.interval()) {
            return Err(ShapeError::SourceTooSmall {
                axis,
                dst_min: d.min(),
                dst_max: d.max(),
                src_min: s.min(),
                src_max: s.max(),
            });
        }
    }
    Ok(())
}

/// Clone-assign `src[i]` into `dst[i]` for every index of `dst`'s domain.
/// Fails without writing anything when `src` does not cover `dst`.
pub fn copy<T: Clone, const R: usize>(
    src: &ArrayView<'_, T, R>,
    dst: &mut ArrayViewMut<'_, T, R>,
) -> Result<()> {
    check_covers(src, dst)?;
    let shape = *dst.shape();
    for_each_index(&shape, |idx| unsafe {
        dst.get_unchecked_mut(idx).clone_from(src.get_unchecked(idx));
    });
    Ok(())
}

/// Move-assign `src[i]` into `dst[i]` for every index of `dst`'s domain,
/// leaving `T::default()` behind. Fails without writing anything when `src`
/// does not cover `dst`.
pub fn move_into<T: Default, const R: usize>(
    src: &mut ArrayViewMut<'_, T, R>,
    dst: &mut ArrayViewMut<'_, T, R>,
) -> Result<()> {
    check_covers(&src.as_view(), dst)?;
    let shape = *dst.shape();
    for_each_index(&shape, |idx| unsafe {
        *dst.get_unchecked_mut(idx) = std::mem::take(src.get_unchecked_mut(idx));
    });
    Ok(())
}

/// Clone `value` into every in-domain cell.
pub fn fill<T: Clone, const R: usize>(dst: &mut ArrayViewMut<'_, T, R>, value: &T) {
    let shape = *dst.shape();
    for_each_index(&shape, |idx| unsafe {
        dst.get_unchecked_mut(idx).clone_from(value);
    });
}

/// Assign `f()` to every in-domain cell, in default traversal order.
pub fn fill_with<T, const R: usize>(dst: &mut ArrayViewMut<'_, T, R>, mut f: impl FnMut() -> T) {
    let shape = *dst.shape();
    for_each_index(&shape, |idx| unsafe {
        *dst.get_unchecked_mut(idx) = f();
    });
}

/// Whether both views cover the same index intervals and hold equal values
/// at every in-domain index.
pub fn equal<T: PartialEq, const R: usize>(
    a: &ArrayView<'_, T, R>,
    b: &ArrayView<'_, T, R>,
) -> bool {
    for axis in 0..R {
        if a.shape().dim(axis).interval() != b.shape().dim(axis).interval() {
            return false;
        }
    }
    let mut same = true;
    for_each_index(a.shape(), |idx| {
        same = same && unsafe { a.get_unchecked(idx) == b.get_unchecked(idx) };
    });
    same
}
