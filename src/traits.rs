//! # Traits
//!
//! The two traits that every file writer in this crate is built on. [`Array`] describes
//! a single block of numbers that can be emitted as raw binary, and [`Domain`] describes a
//! grid: how many points and cells it has and which arrays make up its geometry.
//!

use crate::encoder::{ByteOrder, Precision, Record};
use crate::field::Anchor;
use crate::mesh::{EntityShape, GridKind, PieceBounds};
use crate::Error;
use std::io::Write;

/// A block of numbers that is written as one binary record.
///
/// The number of bytes produced by `write_binary` must always equal
/// [`byte_len`](Array::byte_len); the XML writers compute every header offset from
/// `byte_len` before a single byte of the array is written.
///
/// ```
/// use pvtk::{Array, ByteOrder, Precision};
///
/// let axis = [0.0f64, 0.5, 1.0];
/// let axis = axis.as_slice();
///
/// let mut bytes = Vec::new();
/// axis.write_binary(&mut bytes, ByteOrder::BigEndian).unwrap();
///
/// assert_eq!(axis.precision(), Precision::Float32);
/// assert_eq!(bytes.len(), axis.byte_len());
/// assert_eq!(&bytes[4..8], &0.5f32.to_be_bytes());
/// ```
pub trait Array {
    /// the on-disk type of every element in this array
    fn precision(&self) -> Precision;

    /// total number of scalar elements (entities * components)
    fn length(&self) -> usize;

    fn components(&self) -> usize {
        1
    }

    /// write every element of the array to `writer` in the requested byte order
    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error>;

    fn size_of_elem(&self) -> usize {
        self.precision().size()
    }

    /// number of payload bytes `write_binary` produces
    fn byte_len(&self) -> usize {
        self.length() * self.size_of_elem()
    }
}

/// A grid that can be written to a file.
///
/// Implemented by [`Structured`](crate::Structured), [`Rectilinear`](crate::Rectilinear) and
/// [`Unstructured`](crate::Unstructured).
pub trait Domain {
    fn grid(&self) -> GridKind;

    /// the extent (lattice grids) or the point and cell counts (unstructured grids) of this
    /// piece of the domain
    fn bounds(&self) -> PieceBounds;

    /// the shape a field anchored to `anchor` must have to be attached to this grid
    fn anchored_shape(&self, anchor: Anchor) -> EntityShape;

    /// The arrays describing the geometry in the order they are written to the appended section.
    fn geometry_records(&self) -> Result<Vec<Record<'_>>, Error>;

    fn point_count(&self) -> usize {
        self.anchored_shape(Anchor::Point).count()
    }

    fn cell_count(&self) -> usize {
        self.anchored_shape(Anchor::Cell).count()
    }
}

impl<T: Array + ?Sized> Array for &T {
    fn precision(&self) -> Precision {
        (**self).precision()
    }

    fn length(&self) -> usize {
        (**self).length()
    }

    fn components(&self) -> usize {
        (**self).components()
    }

    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error> {
        (**self).write_binary(writer, order)
    }

    fn size_of_elem(&self) -> usize {
        (**self).size_of_elem()
    }

    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }
}
