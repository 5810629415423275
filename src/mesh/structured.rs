use super::{lattice_shape, Extent};
use crate::array::LatticePoints;
use crate::prelude::*;

/// A curvilinear lattice: the location of every lattice point is given explicitly.
///
/// `x`, `y` and `z` all have the shape `(nx, ny, nz)` and are indexed `[i, j, k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Structured {
    extent: Extent,
    x: Array3<f64>,
    y: Array3<f64>,
    z: Array3<f64>,
}

impl Structured {
    /// Construct a structured grid whose extent starts at the origin.
    ///
    /// Fails if the three coordinate arrays do not share one shape.
    pub fn new(x: Array3<f64>, y: Array3<f64>, z: Array3<f64>) -> Result<Self, Error> {
        for (name, other) in [("y", &y), ("z", &z)] {
            if other.dim() != x.dim() {
                return Err(ShapeMismatch::geometry(
                    name,
                    format!("{:?} (the shape of x)", x.dim()),
                    format!("{:?}", other.dim()),
                )
                .into());
            }
        }

        let (nx, ny, nz) = x.dim();
        let extent = Extent::from_dims(nx, ny, nz)?;

        Ok(Self { extent, x, y, z })
    }

    /// Place the grid within a larger domain. The extent must hold exactly as many points
    /// along each axis as the coordinate arrays.
    pub fn with_extent(mut self, extent: Extent) -> Result<Self, Error> {
        if extent.dims() != self.dims() {
            return Err(ShapeMismatch::geometry(
                "extent",
                format!("{:?} points", self.dims()),
                format!("{:?} points in extent `{extent}`", extent.dims()),
            )
            .into());
        }

        self.extent = extent;
        Ok(self)
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    pub fn dims(&self) -> [usize; 3] {
        let (nx, ny, nz) = self.x.dim();
        [nx, ny, nz]
    }

    /// interleaved `(x, y, z)` triples in file order
    pub fn points(&self) -> LatticePoints<'_> {
        LatticePoints::new(self.x.view(), self.y.view(), self.z.view())
    }
}

impl Domain for Structured {
    fn grid(&self) -> GridKind {
        GridKind::Structured
    }

    fn bounds(&self) -> PieceBounds {
        PieceBounds::Extent(self.extent)
    }

    fn anchored_shape(&self, anchor: Anchor) -> EntityShape {
        lattice_shape(self.dims(), anchor)
    }

    fn geometry_records(&self) -> Result<Vec<Record<'_>>, Error> {
        Ok(vec![Record::new(Section::Points, "Points", self.points())])
    }
}

#[test]
fn mismatched_coordinates_are_rejected() {
    let x = Array3::<f64>::zeros((2, 2, 1));
    let y = Array3::<f64>::zeros((2, 2, 1));
    let z = Array3::<f64>::zeros((2, 1, 2));

    let err = Structured::new(x, y, z).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch(_)));
}
