//! # Mesh Information
//!
//! Three grid types can be written:
//!
//! * [`Structured`]: a curvilinear lattice, where every lattice point `(i, j, k)` carries its own
//!   `(x, y, z)` location
//! * [`Rectilinear`]: a lattice whose points lie on three independent axes, so that point
//!   `(i, j, k)` sits at `(x[i], y[j], z[k])`
//! * [`Unstructured`]: a list of points and a list of cells, each cell an ordered list of point
//!   indices with a [`CellType`]
//!
//! The two lattice types also carry an [`Extent`]: the inclusive index range they cover in the
//! global lattice. For a single file this is simply `0..=n-1` along each axis; for a piece of a
//! domain decomposed dataset it places the piece within the whole domain.
//!
//! ## Linearization
//!
//! Lattice points and lattice fields are always written with the first index varying fastest:
//! the point `(i, j, k)` is the `i + j*nx + k*nx*ny`-th point in a file. Field arrays attached to a
//! lattice grid must be shaped `(components, nx, ny, nz)` so they line up with this ordering.
//! Cells of a lattice are indexed the same way, with `max(n - 1, 1)` cells along an axis
//! of `n` points.

mod extent;
mod rectilinear;
mod structured;
mod unstructured;

pub use extent::Extent;
pub use rectilinear::Rectilinear;
pub use structured::Structured;
pub use unstructured::{CellType, Unstructured};

/// The three supported grid topologies and the names each uses in the file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Structured,
    Rectilinear,
    Unstructured,
}

impl GridKind {
    /// the `type` attribute of a serial XML file, also the name of its grid element
    pub fn xml_type(&self) -> &'static str {
        match self {
            Self::Structured => "StructuredGrid",
            Self::Rectilinear => "RectilinearGrid",
            Self::Unstructured => "UnstructuredGrid",
        }
    }

    pub fn xml_extension(&self) -> &'static str {
        match self {
            Self::Structured => "vts",
            Self::Rectilinear => "vtr",
            Self::Unstructured => "vtu",
        }
    }

    /// the `type` attribute of a parallel descriptor, also the name of its grid element
    pub fn parallel_type(&self) -> &'static str {
        match self {
            Self::Structured => "PStructuredGrid",
            Self::Rectilinear => "PRectilinearGrid",
            Self::Unstructured => "PUnstructuredGrid",
        }
    }

    pub fn parallel_extension(&self) -> &'static str {
        match self {
            Self::Structured => "pvts",
            Self::Rectilinear => "pvtr",
            Self::Unstructured => "pvtu",
        }
    }

    /// the keyword following `DATASET` in a legacy file
    pub fn legacy_dataset(&self) -> &'static str {
        match self {
            Self::Structured => "STRUCTURED_GRID",
            Self::Rectilinear => "RECTILINEAR_GRID",
            Self::Unstructured => "UNSTRUCTURED_GRID",
        }
    }
}

/// Where a piece sits in the whole dataset
#[derive(Debug, Clone, PartialEq)]
pub enum PieceBounds {
    /// lattice grids are placed by their extent
    Extent(Extent),
    /// unstructured grids only report their sizes
    Counts { points: usize, cells: usize },
}

/// The number (and for lattice grids, the arrangement) of points or cells a field is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityShape {
    Lattice([usize; 3]),
    List(usize),
}

impl EntityShape {
    pub fn count(&self) -> usize {
        match self {
            Self::Lattice([nx, ny, nz]) => nx * ny * nz,
            Self::List(n) => *n,
        }
    }
}

impl std::fmt::Display for EntityShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lattice([nx, ny, nz]) => write!(f, "{nx}x{ny}x{nz} lattice"),
            Self::List(n) => write!(f, "{n} entities"),
        }
    }
}

/// number of cells along a lattice axis with `points` points
pub(crate) fn cells_along(points: usize) -> usize {
    points.saturating_sub(1).max(1)
}

/// point and cell shapes of a lattice with `dims` points
pub(crate) fn lattice_shape(dims: [usize; 3], anchor: crate::Anchor) -> EntityShape {
    match anchor {
        crate::Anchor::Point => EntityShape::Lattice(dims),
        crate::Anchor::Cell => EntityShape::Lattice(dims.map(cells_along)),
    }
}
