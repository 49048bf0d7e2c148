//! Automatic stride assignment for shapes with unresolved dimensions
//!
//! A dimension with stride `s` and extent `e` occupies the half-open flat
//! interval `[|s|, |s|·max(1, e))`. Each round picks the unresolved
//! dimension whose smallest non-overlapping candidate stride is lowest
//! (ties broken by dimension order) and assigns it, so fully-unknown shapes
//! come out row-major with dimension 0 dense, while partially-pinned shapes
//! pack into the gaps the pinned strides leave open.

use crate::dim::{Dim, Index};

/// Occupied flat interval of a resolved dimension. Extents of 0 or 1 (and
/// broadcast strides of 0) occupy nothing.
fn occupied(stride: Index, extent: Index) -> (Index, Index) {
    let s = stride.abs();
    (s, s.saturating_mul(extent.max(1)))
}

/// Smallest candidate stride `s >= 1` whose interval `[s, s·e)` misses every
/// occupied interval. Bumping `s` to the end of an overlapped interval never
/// un-clears a lower one, so this settles after at most one pass per
/// interval.
fn min_feasible(extent: Index, occupied: &[(Index, Index)]) -> Index {
    let e = extent.max(1);
    let mut s: Index = 1;
    loop {
        let mut bumped = false;
        for &(lo, hi) in occupied {
            if s < hi && lo < s.saturating_mul(e) {
                s = hi;
                bumped = true;
            }
        }
        if !bumped {
            return s;
        }
    }
}

pub(crate) fn resolve_dims(dims: &mut [Dim]) {
    let mut taken: Vec<(Index, Index)> = dims
        .iter()
        .filter(|d| d.is_resolved())
        .map(|d| occupied(d.stride(), d.extent()))
        .collect();

    loop {
        let mut best: Option<(Index, usize)> = None;
        for (axis, d) in dims.iter().enumerate() {
            if d.is_resolved() {
                continue;
            }
            let s = min_feasible(d.extent(), &taken);
            if best.map_or(true, |(bs, _)| s < bs) {
                best = Some((s, axis));
            }
        }
        let Some((stride, axis)) = best else {
            return;
        };
        dims[axis].set_stride(stride);
        taken.push(occupied(stride, dims[axis].extent()));
    }
}
