//! Single-dimension descriptors: position, extent, and stride of one axis

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Signed index type used for mins, extents, strides, and flat offsets.
pub type Index = isize;

/// Sentinel stride meaning "not yet assigned"; never a valid stride.
pub const UNRESOLVED: Index = Index::MIN;

/// Specialization of a dimension.
///
/// The kind records which components are pinned by construction: a dense
/// dimension always has stride 1, a broadcast dimension always has stride 0
/// and accepts every index. `Strided` pins nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimKind {
    Strided,
    Dense,
    Broadcast,
}

/// One axis of a shape: a half-open index interval `[min, min + extent)`
/// and the flat-offset step per unit index.
///
/// The stride may be [`UNRESOLVED`] until [`crate::Shape::resolve`] assigns
/// it. Equality compares the three runtime scalars only, so a dense
/// dimension equals a strided dimension with stride 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Dim {
    min: Index,
    extent: Index,
    stride: Index,
    kind: DimKind,
}

impl PartialEq for Dim {
    fn eq(&self, other: &Self) -> bool {
        self.min == other.min && self.extent == other.extent && self.stride == other.stride
    }
}

impl Eq for Dim {}

impl Dim {
    /// General dimension with an explicit stride.
    pub fn new(min: Index, extent: Index, stride: Index) -> Self {
        Dim { min, extent, stride, kind: DimKind::Strided }
    }

    /// Dimension `[0, extent)` with the stride left unresolved.
    pub fn with_extent(extent: Index) -> Self {
        Dim::new(0, extent, UNRESOLVED)
    }

    /// Dimension `[min, min + extent)` with the stride left unresolved.
    pub fn with_bounds(min: Index, extent: Index) -> Self {
        Dim::new(min, extent, UNRESOLVED)
    }

    /// Dimension whose stride is pinned to 1.
    pub fn dense(min: Index, extent: Index) -> Self {
        Dim { min, extent, stride: 1, kind: DimKind::Dense }
    }

    /// Dimension whose stride is pinned to 0 and which accepts every index.
    ///
    /// The runtime extent is 1 so that broadcast axes contribute a single
    /// iteration to traversal and a factor of one to `size()`.
    pub fn broadcast() -> Self {
        Dim { min: 0, extent: 1, stride: 0, kind: DimKind::Broadcast }
    }

    /// The unit dimension used to pad upranked shapes: one index, offset 0.
    pub fn unit() -> Self {
        Dim::new(0, 1, 0)
    }

    pub fn min(&self) -> Index {
        self.min
    }

    pub fn extent(&self) -> Index {
        self.extent
    }

    pub fn stride(&self) -> Index {
        self.stride
    }

    pub fn kind(&self) -> DimKind {
        self.kind
    }

    /// Largest valid index, `min + extent - 1`.
    pub fn max(&self) -> Index {
        self.min + self.extent - 1
    }

    pub fn set_min(&mut self, min: Index) {
        self.min = min;
    }

    pub fn set_extent(&mut self, extent: Index) {
        self.extent = extent;
    }

    /// Assign a stride. Dense and broadcast dimensions have pinned strides
    /// and reject any other value.
    pub fn set_stride(&mut self, stride: Index) {
        match self.kind {
            DimKind::Dense => debug_assert_eq!(stride, 1, "dense stride is pinned to 1"),
            DimKind::Broadcast => debug_assert_eq!(stride, 0, "broadcast stride is pinned to 0"),
            DimKind::Strided => {}
        }
        self.stride = stride;
    }

    pub(crate) fn clear_stride(&mut self) {
        debug_assert_eq!(self.kind, DimKind::Strided);
        self.stride = UNRESOLVED;
    }

    pub fn is_resolved(&self) -> bool {
        self.stride != UNRESOLVED
    }

    /// Whether `i` is a valid index. Broadcast dimensions accept everything.
    pub fn is_in_range(&self, i: Index) -> bool {
        self.kind == DimKind::Broadcast || (self.min <= i && i <= self.max())
    }

    /// Whether the whole interval `r` is valid.
    pub fn contains(&self, r: Interval) -> bool {
        self.is_in_range(r.min()) && self.is_in_range(r.max())
    }

    /// `i` clamped to `[min, max]`.
    pub fn clamp(&self, i: Index) -> Index {
        i.min(self.max()).max(self.min)
    }

    /// Iterator over the valid indices.
    pub fn indices(&self) -> Range<Index> {
        self.min..self.min + self.extent
    }

    /// Smallest flat offset this axis contributes over its index range.
    pub fn flat_min(&self) -> Index {
        if self.stride >= 0 {
            self.stride * self.min
        } else {
            self.stride * self.max()
        }
    }

    /// Largest flat offset this axis contributes over its index range.
    pub fn flat_max(&self) -> Index {
        if self.stride >= 0 {
            self.stride * self.max()
        } else {
            self.stride * self.min
        }
    }

    /// The interval `[min, min + extent)` of this axis, dropping the stride.
    pub fn interval(&self) -> Interval {
        Interval::new(self.min, self.extent)
    }
}

impl Default for Dim {
    /// An empty axis: no valid indices, stride 1.
    fn default() -> Self {
        Dim::new(0, 0, 1)
    }
}

impl From<Index> for Dim {
    fn from(extent: Index) -> Self {
        Dim::with_extent(extent)
    }
}

impl From<(Index, Index)> for Dim {
    fn from((min, extent): (Index, Index)) -> Self {
        Dim::with_bounds(min, extent)
    }
}

impl From<(Index, Index, Index)> for Dim {
    fn from((min, extent, stride): (Index, Index, Index)) -> Self {
        Dim::new(min, extent, stride)
    }
}

impl From<Interval> for Dim {
    fn from(r: Interval) -> Self {
        Dim::with_bounds(r.min(), r.extent())
    }
}

/// Half-open index interval `[min, min + extent)`: a [`Dim`] without a
/// stride. Used as a cropping argument and for whole-axis queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    min: Index,
    extent: Index,
}

impl Interval {
    pub fn new(min: Index, extent: Index) -> Self {
        Interval { min, extent }
    }

    pub fn min(&self) -> Index {
        self.min
    }

    pub fn extent(&self) -> Index {
        self.extent
    }

    pub fn max(&self) -> Index {
        self.min + self.extent - 1
    }

    pub fn is_in_range(&self, i: Index) -> bool {
        self.min <= i && i <= self.max()
    }

    pub fn indices(&self) -> Range<Index> {
        self.min..self.min + self.extent
    }
}

impl From<Dim> for Interval {
    fn from(d: Dim) -> Self {
        d.interval()
    }
}

/// Shorthand for [`Interval::new`], matching the cropping call sites.
pub fn range(min: Index, extent: Index) -> Interval {
    Interval::new(min, extent)
}

/// Compile-time interval; the bounds are const-folded at each call site.
pub fn srange<const MIN: Index, const EXTENT: Index>() -> Interval {
    Interval::new(MIN, EXTENT)
}

/// `i` clamped to the valid indices of `d`.
pub fn clamp(i: Index, d: Dim) -> Index {
    d.clamp(i)
}
