//! Common traits and types that are useful for working with `pvtk`
#![allow(unused_imports)]

pub use crate::field::{Anchor, FieldBundle, FieldData};
pub use crate::mesh::{CellType, Extent, Rectilinear, Structured, Unstructured};
pub use crate::traits::{Array, Domain};
pub use crate::WriteConfig;

pub(crate) use crate::encoder::{ByteOrder, Precision, Record, Section};
pub(crate) use crate::error::ShapeMismatch;
pub(crate) use crate::mesh::{EntityShape, GridKind, PieceBounds};
pub(crate) use crate::Error;
pub(crate) use std::io::Write;

pub(crate) use derive_more::{Constructor, Deref, Into};

pub(crate) use ndarray::{Array2, Array3, Array4, Axis};
