//! # pvtk
//!
//! Write simulation grids and the fields attached to them into files that
//! Paraview (or any other VTK reader) can open.
//!
//! Two file families are supported for each of the structured, rectilinear and unstructured
//! grid types:
//!
//! * legacy `.vtk` files: an ascii header with big endian binary blocks ([`legacy`])
//! * XML files (`.vts`, `.vtr`, `.vtu`) with all arrays stored in one appended raw binary
//!   section ([`write_vtk`](crate::write_vtk))
//!
//! For domain decomposed runs every worker writes its own XML piece and the coordinating
//! worker writes a `.pvts` / `.pvtr` / `.pvtu` descriptor that stitches the pieces together
//! (see [`parallel`]).
//!
//! ```no_run
//! use pvtk::{Anchor, FieldBundle, Rectilinear, WriteConfig};
//!
//! let mesh = Rectilinear::new(vec![0., 1., 2.], vec![0., 1.], vec![0.])?;
//! let pressure = ndarray::Array4::from_shape_vec((1, 3, 2, 1), (0..6).map(f64::from).collect())
//!     .unwrap();
//!
//! let mut fields = FieldBundle::new();
//! fields.attach("P", Anchor::Point, pressure)?;
//!
//! let config = WriteConfig::new("output");
//! pvtk::write_rectilinear(&config, "flow", &mesh, &fields)?;
//! # Ok::<(), pvtk::Error>(())
//! ```

pub mod array;
mod config;
pub mod encoder;
mod error;
pub mod field;
pub mod legacy;
pub mod mesh;
pub mod parallel;
pub mod prelude;
mod traits;
pub mod write_vtk;

pub use config::WriteConfig;
pub use encoder::{ByteOrder, Framing, Precision};
pub use error::{Error, InvalidExtent, ShapeKind, ShapeMismatch};
pub use field::{Anchor, Field, FieldBundle, FieldData, FieldSummary};
pub use mesh::{CellType, EntityShape, Extent, GridKind, PieceBounds};
pub use mesh::{Rectilinear, Structured, Unstructured};
pub use traits::{Array, Domain};

pub use legacy::{
    write_legacy, write_legacy_rectilinear, write_legacy_structured, write_legacy_unstructured,
};
pub use write_vtk::{write_rectilinear, write_structured, write_unstructured, write_xml};

pub use ndarray;
pub use quick_xml::writer::Writer;
