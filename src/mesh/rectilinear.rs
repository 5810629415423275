use super::{lattice_shape, Extent};
use crate::prelude::*;

/// Full information on a 3D rectilinear domain: the location of the lattice points along each
/// axis and the extent the lattice covers in the global domain.
///
/// The point `(i, j, k)` of the lattice sits at `(x[i], y[j], z[k])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectilinear {
    extent: Extent,
    x_locations: Vec<f64>,
    y_locations: Vec<f64>,
    z_locations: Vec<f64>,
}

impl Rectilinear {
    /// Construct a rectilinear grid whose extent starts at the origin.
    ///
    /// Every axis needs at least one location.
    pub fn new(
        x_locations: Vec<f64>,
        y_locations: Vec<f64>,
        z_locations: Vec<f64>,
    ) -> Result<Self, Error> {
        let extent = Extent::from_dims(
            x_locations.len(),
            y_locations.len(),
            z_locations.len(),
        )?;

        Ok(Self {
            extent,
            x_locations,
            y_locations,
            z_locations,
        })
    }

    /// Place the grid within a larger domain. The extent must hold exactly as many points
    /// along each axis as there are locations.
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
        [
            self.x_locations.len(),
            self.y_locations.len(),
            self.z_locations.len(),
        ]
    }

    pub fn x_locations(&self) -> &[f64] {
        &self.x_locations
    }

    pub fn y_locations(&self) -> &[f64] {
        &self.y_locations
    }

    pub fn z_locations(&self) -> &[f64] {
        &self.z_locations
    }
}

impl Domain for Rectilinear {
    fn grid(&self) -> GridKind {
        GridKind::Rectilinear
    }

    fn bounds(&self) -> PieceBounds {
        PieceBounds::Extent(self.extent)
    }

    fn anchored_shape(&self, anchor: Anchor) -> EntityShape {
        lattice_shape(self.dims(), anchor)
    }

    fn geometry_records(&self) -> Result<Vec<Record<'_>>, Error> {
        Ok(vec![
            Record::new(Section::Coordinates, "x", self.x_locations.as_slice()),
            Record::new(Section::Coordinates, "y", self.y_locations.as_slice()),
            Record::new(Section::Coordinates, "z", self.z_locations.as_slice()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_axis_is_rejected() {
        assert!(Rectilinear::new(vec![0.], vec![], vec![0.]).is_err());
    }

    #[test]
    fn extent_must_match_locations() {
        let mesh = Rectilinear::new(vec![0., 1., 2.], vec![0., 1.], vec![0.]).unwrap();

        let shifted = Extent::new([4, 6], [0, 1], [0, 0]).unwrap();
        let mesh = mesh.with_extent(shifted).unwrap();
        assert_eq!(mesh.extent(), &shifted);

        let wrong = Extent::new([4, 7], [0, 1], [0, 0]).unwrap();
        assert!(matches!(
            mesh.with_extent(wrong),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn cell_shape_of_flat_lattice() {
        let mesh = Rectilinear::new(vec![0., 1., 2.], vec![0., 1.], vec![0.]).unwrap();
        assert_eq!(mesh.point_count(), 6);
        assert_eq!(
            mesh.anchored_shape(Anchor::Cell),
            EntityShape::Lattice([2, 1, 1])
        );
    }
}
