//! Encodable views over geometry and field data
//!
//! Every type here borrows caller data and implements [`Array`](crate::Array), so it can
//! be handed to the record encoder without copying the underlying buffers. The views only
//! decide the linearization: which element is written first.

mod cells;
mod field_3d;
mod points;
mod vector;

pub use cells::{CellOffsets, CellTypes, Connectivity, LegacyCells};
pub use field_3d::{EntityValues, LatticeValues};
pub use points::{LatticePoints, PointRows};

use crate::Error;
use num_traits::ToPrimitive;

/// narrow an index or count to the 4 byte signed integer stored on disk
#[inline]
pub(crate) fn to_int32(value: usize) -> Result<i32, Error> {
    value.to_i32().ok_or(Error::IndexOverflow(value))
}

/// truncate a value to the 4 byte float stored on disk
#[inline]
pub(crate) fn to_float32(value: f64) -> f32 {
    value as f32
}
