//! Rank-generic shapes: index-tuple to flat-offset mappings

use crate::dim::{Dim, DimKind, Index, Interval};
use crate::error::{Result, ShapeError};
use crate::{optimize, resolve};
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An ordered tuple of `R` [`Dim`]s describing an N-dimensional index space
/// and its mapping to flat offsets.
///
/// The offset of `[i₀, …, i_{R-1}]` is `Σ dₖ.stride() · iₖ`; mins bound the
/// valid index range but do not enter the offset. A rank-0 shape maps `[]`
/// to 0 and has size 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape<const R: usize> {
    dims: [Dim; R],
}

impl<const R: usize> Shape<R> {
    pub fn new(dims: [Dim; R]) -> Self {
        Shape { dims }
    }

    /// Shape of the given extents, all mins 0, all strides unresolved.
    pub fn with_extents(extents: [Index; R]) -> Self {
        Shape { dims: extents.map(Dim::with_extent) }
    }

    /// Shape of the given extents whose innermost dimension is dense.
    /// After [`resolve`](Self::resolve) this is the row-major layout with
    /// dimension 0 varying fastest.
    pub fn dense(extents: [Index; R]) -> Self {
        let mut dims = extents.map(Dim::with_extent);
        if R > 0 {
            dims[0] = Dim::dense(0, extents[0]);
        }
        Shape { dims }
    }

    pub fn rank(&self) -> usize {
        R
    }

    pub fn dims(&self) -> &[Dim; R] {
        &self.dims
    }

    pub fn dim(&self, axis: usize) -> Dim {
        self.dims[axis]
    }

    pub fn dim_mut(&mut self, axis: usize) -> &mut Dim {
        &mut self.dims[axis]
    }

    /// The flat offset of an index tuple.
    pub fn offset(&self, indices: [Index; R]) -> Index {
        debug_assert!(self.is_resolved());
        let mut offset = 0;
        for (d, i) in self.dims.iter().zip(indices) {
            offset += d.stride() * i;
        }
        offset
    }

    /// Number of index tuples in the domain: the product of extents.
    pub fn size(&self) -> Index {
        self.dims.iter().map(|d| d.extent()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Smallest flat offset over the index domain.
    pub fn flat_min(&self) -> Index {
        if self.is_empty() {
            return 0;
        }
        self.dims.iter().map(|d| d.flat_min()).sum()
    }

    /// Largest flat offset over the index domain.
    pub fn flat_max(&self) -> Index {
        if self.is_empty() {
            return 0;
        }
        self.dims.iter().map(|d| d.flat_max()).sum()
    }

    /// Number of flat offsets spanned: `flat_max - flat_min + 1`, or 0 for
    /// an empty domain. Equals `size()` exactly when the shape is both
    /// compact and one-to-one.
    pub fn flat_extent(&self) -> Index {
        if self.is_empty() {
            return 0;
        }
        self.flat_max() - self.flat_min() + 1
    }

    /// Whether every dimension accepts its index.
    pub fn is_in_range(&self, indices: [Index; R]) -> bool {
        self.dims.iter().zip(indices).all(|(d, i)| d.is_in_range(i))
    }

    /// Whether every dimension contains its interval.
    pub fn contains(&self, intervals: [Interval; R]) -> bool {
        self.dims.iter().zip(intervals).all(|(d, r)| d.contains(r))
    }

    pub fn mins(&self) -> [Index; R] {
        self.dims.map(|d| d.min())
    }

    pub fn maxs(&self) -> [Index; R] {
        self.dims.map(|d| d.max())
    }

    pub fn extents(&self) -> [Index; R] {
        self.dims.map(|d| d.extent())
    }

    pub fn kinds(&self) -> [DimKind; R] {
        self.dims.map(|d| d.kind())
    }

    pub fn is_resolved(&self) -> bool {
        self.dims.iter().all(|d| d.is_resolved())
    }

    /// Assign every unresolved stride, packing each new dimension into the
    /// smallest gap the known strides leave open. Fully-unknown shapes come
    /// out row-major with dimension 0 dense. Idempotent.
    pub fn resolve(&mut self) {
        resolve::resolve_dims(&mut self.dims);
    }

    /// Chainable [`resolve`](Self::resolve).
    pub fn resolved(mut self) -> Self {
        self.resolve();
        self
    }

    /// An equivalent shape with the fewest index-varying dimensions:
    /// extent-1 dims are folded into a constant offset, the rest are sorted
    /// by |stride| and contiguous runs are fused. Preserves the reachable
    /// offsets and their multiplicities.
    pub fn optimize(&self) -> Self {
        Shape { dims: optimize::optimize_dims(&self.dims) }
    }

    /// Same mins and extents, strides reassigned to make the shape compact.
    /// Dimensions whose kind pins the stride keep it.
    pub fn make_compact(&self) -> Self {
        let mut dims = self.dims;
        for d in dims.iter_mut() {
            if d.kind() == DimKind::Strided {
                d.clear_stride();
            }
        }
        resolve::resolve_dims(&mut dims);
        Shape { dims }
    }

    /// Whether every offset in `[flat_min, flat_max]` is reachable.
    pub fn is_compact(&self) -> bool {
        optimize::dims_are_compact(&self.dims)
    }

    /// Whether no two distinct index tuples share an offset.
    pub fn is_one_to_one(&self) -> bool {
        optimize::dims_are_one_to_one(&self.dims)
    }

    /// Shape whose dimension `k` is `self.dim(perm[k])`. A pure index
    /// permutation; strides and storage are untouched.
    pub fn transpose(&self, perm: [usize; R]) -> Self {
        debug_assert!(is_permutation(&perm));
        Shape { dims: perm.map(|p| self.dims[p]) }
    }

    /// Rank-`M` shape selecting dimensions `perm[0], …, perm[M-1]`.
    pub fn reorder<const M: usize>(&self, perm: [usize; M]) -> Shape<M> {
        Shape { dims: perm.map(|p| self.dims[p]) }
    }

    /// Whether [`convert`](Self::convert) to the given signature would
    /// succeed.
    pub fn is_compatible<const M: usize>(&self, kinds: [DimKind; M]) -> bool {
        self.convert(kinds).is_ok()
    }

    /// Re-tag this shape with the target dimension kinds.
    ///
    /// Each pinned component of the target must equal the runtime value
    /// (dense requires stride 1, broadcast requires stride 0). Upranking
    /// (`M > R`) pads with unit dimensions; downranking is an error.
    pub fn convert<const M: usize>(&self, kinds: [DimKind; M]) -> Result<Shape<M>> {
        if M < R {
            return Err(ShapeError::RankMismatch { from: R, to: M });
        }
        let mut dims = [Dim::unit(); M];
        for axis in 0..M {
            let src = if axis < R { self.dims[axis] } else { Dim::unit() };
            dims[axis] = match kinds[axis] {
                DimKind::Strided => src,
                DimKind::Dense => {
                    if src.stride() != 1 {
                        return Err(ShapeError::IncompatibleShape {
                            axis,
                            required: 1,
                            actual: src.stride(),
                        });
                    }
                    Dim::dense(src.min(), src.extent())
                }
                DimKind::Broadcast => {
                    if src.stride() != 0 {
                        return Err(ShapeError::IncompatibleShape {
                            axis,
                            required: 0,
                            actual: src.stride(),
                        });
                    }
                    Dim::broadcast()
                }
            };
        }
        Ok(Shape { dims })
    }
}

impl<const R: usize> Default for Shape<R> {
    /// The empty shape: every axis has extent 0.
    fn default() -> Self {
        Shape { dims: [Dim::default(); R] }
    }
}

fn is_permutation<const R: usize>(perm: &[usize; R]) -> bool {
    let mut seen = [false; R];
    for &p in perm {
        if p >= R || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}

/// Build a [`Shape`] from anything convertible to a [`Dim`]: extents,
/// `(min, extent)` pairs, `(min, extent, stride)` triples, intervals, or
/// dims.
///
/// ```
/// use strided_core::{shape, Dim};
/// let s = shape![5, (0, 4, 20), (0, 3, 1)];
/// assert_eq!(s.dim(1), Dim::new(0, 4, 20));
/// ```
#[macro_export]
macro_rules! shape {
    ($($d:expr),* $(,)?) => {
        $crate::Shape::new([$($crate::Dim::from($d)),*])
    };
}

// serde's array support stops at fixed lengths, so shapes serialize as a
// sequence of dims checked against R on the way back in.
impl<const R: usize> Serialize for Shape<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(R))?;
        for d in &self.dims {
            seq.serialize_element(d)?;
        }
        seq.end()
    }
}

impl<'de, const R: usize> Deserialize<'de> for Shape<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DimSeq<const R: usize>;

        impl<'de, const R: usize> Visitor<'de> for DimSeq<R> {
            type Value = Shape<R>;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a sequence of {R} dims")
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> std::result::Result<Shape<R>, A::Error> {
                let mut dims = [Dim::default(); R];
                for (i, slot) in dims.iter_mut().enumerate() {
                    *slot = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                Ok(Shape { dims })
            }
        }

        deserializer.deserialize_seq(DimSeq::<R>)
    }
}
