//! Error types for the strided workspace

use crate::dim::Index;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("destination axis {axis} spans {dst_min}..={dst_max} but source only covers {src_min}..={src_max}")]
    SourceTooSmall {
        axis: usize,
        dst_min: Index,
        dst_max: Index,
        src_min: Index,
        src_max: Index,
    },

    #[error("axis {axis} requires stride {required} but has {actual}")]
    IncompatibleShape {
        axis: usize,
        required: Index,
        actual: Index,
    },

    #[error("cannot convert a rank-{from} shape to rank {to}")]
    RankMismatch { from: usize, to: usize },
}

pub type Result<T> = std::result::Result<T, ShapeError>;
