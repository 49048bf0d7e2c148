//! Shape optimization: sorting, fusing, and the compact/one-to-one tests
//!
//! Optimization rewrites a shape into an equivalent one with the fewest
//! index-varying dimensions. Extent-1 dims contribute only the constant
//! `min·stride`, which is folded into an offset; the rest sort by |stride|,
//! and a dim whose |stride| equals the previous dim's |stride|·extent is the
//! contiguous continuation of it and fuses into a single dim with the
//! product extent. The offset rides back out on the leading dim's min.

use crate::dim::{Dim, Index};

pub(crate) fn optimize_dims<const R: usize>(dims: &[Dim; R]) -> [Dim; R] {
    debug_assert!(dims.iter().all(|d| d.is_resolved()));
    let mut offset: Index = 0;
    let mut work: Vec<Dim> = Vec::with_capacity(R);
    for d in dims {
        if d.extent() == 1 {
            offset += d.min() * d.stride();
        } else {
            work.push(*d);
        }
    }
    // A total order, so permutations of the same dims optimize identically.
    work.sort_by_key(|d| (d.stride().abs(), d.extent(), d.min()));

    let mut fused: Vec<Dim> = Vec::with_capacity(work.len());
    for d in work {
        if let Some(last) = fused.last_mut() {
            // Opposite-sign strides cover the same offsets in mirrored
            // ranges, so only same-sign runs are truly contiguous.
            if last.stride().abs() * last.extent() == d.stride().abs()
                && last.stride().signum() == d.stride().signum()
            {
                offset += last.min() * last.stride() + d.min() * d.stride();
                *last = Dim::new(0, last.extent() * d.extent(), last.stride());
                continue;
            }
        }
        fused.push(d);
    }

    // Re-absorb the constant offset into the leading dim where its stride
    // divides it; otherwise a padding slot carries the residue below.
    if offset != 0 {
        if let Some(first) = fused.first_mut() {
            let stride = first.stride();
            if stride != 0 && offset % stride == 0 {
                *first = Dim::new(first.min() + offset / stride, first.extent(), stride);
                offset = 0;
            }
        }
    }

    let pad_stride = fused.last().map_or(1, |d| d.stride().abs() * d.extent());
    let mut out = [Dim::default(); R];
    for (k, slot) in out.iter_mut().enumerate() {
        *slot = if k < fused.len() {
            fused[k]
        } else if offset != 0 {
            let residue = Dim::new(offset, 1, 1);
            offset = 0;
            residue
        } else {
            Dim::new(0, 1, pad_stride)
        };
    }
    out
}

/// Non-trivial dims of the optimized shape with |strides|, sorted ascending.
/// Sign flips mirror a dim's contribution without changing which offsets
/// collide or which are skipped, so the predicates below work on magnitudes.
fn normalized(dims: &[Dim]) -> Vec<(Index, Index)> {
    debug_assert!(dims.iter().all(|d| d.is_resolved()));
    let mut spans: Vec<(Index, Index)> = dims
        .iter()
        .filter(|d| d.extent() > 1)
        .map(|d| (d.stride().abs(), d.extent()))
        .collect();
    spans.sort_unstable();
    spans
}

pub(crate) fn dims_are_compact(dims: &[Dim]) -> bool {
    if dims.iter().any(|d| d.extent() == 0) {
        return true;
    }
    let mut span: Index = 0;
    for (stride, extent) in normalized(dims) {
        if stride > span + 1 {
            return false;
        }
        span += stride * (extent - 1);
    }
    true
}

pub(crate) fn dims_are_one_to_one(dims: &[Dim]) -> bool {
    if dims.iter().any(|d| d.extent() == 0) {
        return true;
    }
    let mut span: Index = 0;
    for (stride, extent) in normalized(dims) {
        if stride < span + 1 {
            return false;
        }
        span += stride * (extent - 1);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{shape, Shape};

    #[test]
    fn test_optimize_fuses_all_three() {
        let a = shape![(0, 5, 21), (0, 7, 3), (5, 3, 1)];
        assert_eq!(a.optimize(), shape![(5, 105, 1), (0, 1, 105), (0, 1, 105)]);
    }

    #[test]
    fn test_optimize_folds_mins_into_leading_dim() {
        let b = shape![(0, 5, 42), (3, 7, 6), (0, 3, 2)];
        assert_eq!(b.optimize(), shape![(9, 105, 2), (0, 1, 210), (0, 1, 210)]);
    }

    #[test]
    fn test_optimize_sorts_when_nothing_fuses() {
        let c = shape![(0, 5, 40), (0, 7, 3), (0, 2, 1)];
        assert_eq!(c.optimize(), shape![(0, 2, 1), (0, 7, 3), (0, 5, 40)]);
    }

    #[test]
    fn test_optimize_partial_fuse() {
        let d = shape![(0, 5, 28), (0, 7, 4), (0, 3, 1)];
        assert_eq!(d.optimize(), shape![(0, 3, 1), (0, 35, 4), (0, 1, 140)]);
    }

    #[test]
    fn test_optimize_row_major_collapses_to_one_dim() {
        let e = Shape::with_extents([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]).resolved();
        let flat = Dim::new(0, 1, 3628800);
        let expected = Shape::new([
            Dim::new(0, 3628800, 1),
            flat,
            flat,
            flat,
            flat,
            flat,
            flat,
            flat,
            flat,
            flat,
        ]);
        assert_eq!(e.optimize(), expected);

        // Reordering the dims must not change the optimized result.
        let e2 = e.reorder([9, 5, 3, 7, 2, 8, 4, 6, 0, 1]);
        assert_eq!(e2.optimize(), expected);
    }

    #[test]
    fn test_optimize_small_shapes_with_mins() {
        let f = shape![(0, 2), (1, 2)].resolved();
        assert_eq!(f.optimize(), shape![(2, 4, 1), (0, 1, 4)]);

        let g = shape![(1, 2), (1, 2)].resolved();
        assert_eq!(g.optimize(), shape![(3, 4, 1), (0, 1, 4)]);
    }

    #[test]
    fn test_optimize_preserves_observables() {
        let cases = [
            shape![(0, 5, 21), (0, 7, 3), (5, 3, 1)],
            shape![(0, 5, 42), (3, 7, 6), (0, 3, 2)],
            shape![(0, 5, 40), (0, 7, 3), (0, 2, 1)],
            shape![(0, 5, 28), (0, 7, 4), (0, 3, 1)],
        ];
        for s in cases {
            let o = s.optimize();
            assert_eq!(o.size(), s.size());
            assert_eq!(o.flat_min(), s.flat_min());
            assert_eq!(o.flat_max(), s.flat_max());
            assert_eq!(o.flat_extent(), s.flat_extent());
            assert_eq!(o.is_compact(), s.is_compact());
            assert_eq!(o.is_one_to_one(), s.is_one_to_one());
        }
    }

    #[test]
    fn test_make_compact() {
        let s1 = shape![(3, 5, 2)];
        assert_eq!(s1.make_compact(), shape![(3, 5, 1)]);

        let s2 = shape![(3, 5, 8), (1, 4, 1)];
        assert_eq!(s2.make_compact(), shape![(3, 5, 1), (1, 4, 5)]);

        // A pinned dense dim keeps its stride; the rest pack around it.
        let s3 = Shape::new([Dim::new(3, 5, 8), Dim::dense(1, 4)]);
        assert_eq!(s3.make_compact(), Shape::new([Dim::new(3, 5, 4), Dim::dense(1, 4)]));
    }

    fn check_make_compact_is_compact_and_one_to_one<const R: usize>(s: Shape<R>) {
        let c = s.make_compact();
        assert!(c.is_compact());
        assert!(c.is_one_to_one());
        assert_eq!(c.mins(), s.mins());
        assert_eq!(c.extents(), s.extents());
    }

    #[test]
    fn test_make_compact_results_are_compact_and_one_to_one() {
        check_make_compact_is_compact_and_one_to_one(shape![(3, 5, 2)]);
        check_make_compact_is_compact_and_one_to_one(shape![(3, 5, 8), (1, 4, 1)]);
        check_make_compact_is_compact_and_one_to_one(shape![(-2, 10, 6), (3, 5, 11)]);
    }

    #[test]
    fn test_number_theory_predicates() {
        // Dense 2-D block: contiguous and injective.
        let s = shape![(1, 10), (3, 5)].resolved();
        assert!(s.is_compact());
        assert!(s.is_one_to_one());

        // Negative stride mirrors a dense layout.
        let s = shape![(-1, 10), (3, 5, -1)].resolved();
        assert!(s.is_compact());
        assert!(s.is_one_to_one());

        // Stride 6 over rows of 5 leaves a hole every 6 offsets.
        let s = shape![(-2, 10, 6), (3, 5)].resolved();
        assert!(!s.is_compact());
        assert!(s.is_one_to_one());

        // Overlapping strides revisit offsets but leave no holes.
        let s = shape![(0, 4, 4), (0, 4, 2), (0, 4, 1)];
        assert!(s.is_compact());
        assert!(!s.is_one_to_one());
    }
}
