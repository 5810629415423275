use crate::array::{self, CellOffsets, CellTypes, Connectivity, PointRows};
use crate::prelude::*;

/// Cell type codes understood by VTK readers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    Vertex = 1,
    PolyVertex = 2,
    Line = 3,
    PolyLine = 4,
    Triangle = 5,
    TriangleStrip = 6,
    Polygon = 7,
    Pixel = 8,
    Quad = 9,
    Tetra = 10,
    Voxel = 11,
    Hexahedron = 12,
    Wedge = 13,
    Pyramid = 14,
    QuadraticEdge = 21,
    QuadraticTriangle = 22,
    QuadraticQuad = 23,
    QuadraticTetra = 24,
    QuadraticHexahedron = 25,
}

impl CellType {
    /// the integer written to the `types` array
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// number of points a cell of this type must have, `None` for variable sized cells
    pub fn point_count(&self) -> Option<usize> {
        match self {
            Self::Vertex => Some(1),
            Self::Line => Some(2),
            Self::Triangle => Some(3),
            Self::Pixel | Self::Quad | Self::Tetra => Some(4),
            Self::Pyramid => Some(5),
            Self::Wedge => Some(6),
            Self::Voxel | Self::Hexahedron => Some(8),
            Self::QuadraticEdge => Some(3),
            Self::QuadraticTriangle => Some(6),
            Self::QuadraticQuad => Some(8),
            Self::QuadraticTetra => Some(10),
            Self::QuadraticHexahedron => Some(20),
            Self::PolyVertex | Self::PolyLine | Self::TriangleStrip | Self::Polygon => None,
        }
    }
}

/// A list of points and a list of cells connecting them.
///
/// `points` has the shape `(n, 3)`, one `(x, y, z)` row per point. Every cell is an ordered list
/// of row indices into `points` and has exactly one [`CellType`].
#[derive(Debug, Clone, PartialEq)]
pub struct Unstructured {
    points: Array2<f64>,
    cells: Vec<Vec<usize>>,
    cell_types: Vec<CellType>,
}

impl Unstructured {
    pub fn new(
        points: Array2<f64>,
        cells: Vec<Vec<usize>>,
        cell_types: Vec<CellType>,
    ) -> Result<Self, Error> {
        let (num_points, dim) = points.dim();

        if dim != 3 {
            return Err(ShapeMismatch::geometry(
                "points",
                format!("({num_points}, 3)"),
                format!("({num_points}, {dim})"),
            )
            .into());
        }

        if cells.len() != cell_types.len() {
            return Err(ShapeMismatch::geometry(
                "types",
                format!("{} cell types (one per cell)", cells.len()),
                format!("{} cell types", cell_types.len()),
            )
            .into());
        }

        for (idx, (cell, cell_type)) in cells.iter().zip(cell_types.iter()).enumerate() {
            if let Some(expected) = cell_type.point_count() {
                if cell.len() != expected {
                    return Err(ShapeMismatch::geometry(
                        format!("cell {idx}"),
                        format!("{expected} points for a {cell_type:?}"),
                        format!("{} points", cell.len()),
                    )
                    .into());
                }
            }

            if let Some(&index) = cell.iter().find(|&&index| index >= num_points) {
                return Err(Error::PointIndexOutOfRange {
                    cell: idx,
                    index,
                    points: num_points,
                });
            }
        }

        // every count and index written to the file must fit in an Int32
        let connectivity_len: usize = cells.iter().map(Vec::len).sum();
        array::to_int32(num_points)?;
        array::to_int32(connectivity_len + cells.len())?;

        Ok(Self {
            points,
            cells,
            cell_types,
        })
    }

    pub fn points(&self) -> &Array2<f64> {
        &self.points
    }

    pub fn cells(&self) -> &[Vec<usize>] {
        &self.cells
    }

    pub fn cell_types(&self) -> &[CellType] {
        &self.cell_types
    }

    /// total number of point indices over all cells
    pub fn connectivity_len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }
}

impl Domain for Unstructured {
    fn grid(&self) -> GridKind {
        GridKind::Unstructured
    }

    fn bounds(&self) -> PieceBounds {
        PieceBounds::Counts {
            points: self.points.nrows(),
            cells: self.cells.len(),
        }
    }

    fn anchored_shape(&self, anchor: Anchor) -> EntityShape {
        match anchor {
            Anchor::Point => EntityShape::List(self.points.nrows()),
            Anchor::Cell => EntityShape::List(self.cells.len()),
        }
    }

    fn geometry_records(&self) -> Result<Vec<Record<'_>>, Error> {
        Ok(vec![
            Record::new(Section::Points, "Points", PointRows::new(self.points.view())),
            Record::new(Section::Cells, "connectivity", Connectivity::new(&self.cells)),
            Record::new(Section::Cells, "offsets", CellOffsets::new(&self.cells)),
            Record::new(Section::Cells, "types", CellTypes::new(&self.cell_types)),
        ])
    }
}
