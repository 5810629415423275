use crate::error::InvalidExtent;
use crate::Error;

/// Describes the area of the global lattice that a piece covers.
///
/// All indices are 0-based and inclusive, so a piece with `i_start = 0` and `i_end = 4` holds
/// five points along the first axis. Most often you want to use the [`Extent::from_dims`]
/// constructor if you are not writing multiple files to describe parts of the same domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent {
    i_start: usize,
    i_end: usize,
    j_start: usize,
    j_end: usize,
    k_start: usize,
    k_end: usize,
}

impl Extent {
    /// construct an extent from inclusive `[start, end]` pairs along each axis
    ///
    /// ```
    /// let extent = pvtk::Extent::new([0, 10], [0, 20], [3, 3]).unwrap();
    /// assert_eq!(extent.dims(), [11, 21, 1]);
    /// assert_eq!(extent.to_string(), "0 10 0 20 3 3");
    ///
    /// assert!(pvtk::Extent::new([4, 3], [0, 1], [0, 1]).is_err());
    /// ```
    pub fn new(i: [usize; 2], j: [usize; 2], k: [usize; 2]) -> Result<Self, Error> {
        let extent = Self {
            i_start: i[0],
            i_end: i[1],
            j_start: j[0],
            j_end: j[1],
            k_start: k[0],
            k_end: k[1],
        };

        if extent.i_start > extent.i_end
            || extent.j_start > extent.j_end
            || extent.k_start > extent.k_end
        {
            return Err(InvalidExtent::from(extent).into());
        }

        Ok(extent)
    }

    /// create a simple extent starting at the origin from some known point counts.
    /// A point count of zero along any axis is rejected.
    pub fn from_dims(nx: usize, ny: usize, nz: usize) -> Result<Self, Error> {
        let end = |n: usize| n.checked_sub(1);

        match (end(nx), end(ny), end(nz)) {
            (Some(i), Some(j), Some(k)) => Self::new([0, i], [0, j], [0, k]),
            _ => Err(crate::ShapeMismatch::geometry(
                "extent",
                "at least one point along every axis".into(),
                format!("{nx}x{ny}x{nz} points"),
            )
            .into()),
        }
    }

    pub fn i_range(&self) -> [usize; 2] {
        [self.i_start, self.i_end]
    }

    pub fn j_range(&self) -> [usize; 2] {
        [self.j_start, self.j_end]
    }

    pub fn k_range(&self) -> [usize; 2] {
        [self.k_start, self.k_end]
    }

    /// Get the total number of points in the first direction for this
    /// local segment as paraview would interpret it
    pub fn x_len(&self) -> usize {
        self.i_end - self.i_start + 1
    }

    pub fn y_len(&self) -> usize {
        self.j_end - self.j_start + 1
    }

    pub fn z_len(&self) -> usize {
        self.k_end - self.k_start + 1
    }

    pub fn dims(&self) -> [usize; 3] {
        [self.x_len(), self.y_len(), self.z_len()]
    }

    pub fn num_points(&self) -> usize {
        self.x_len() * self.y_len() * self.z_len()
    }

    /// the same extent with the first axis replaced by `[start, end]`
    pub fn with_i_range(&self, i: [usize; 2]) -> Result<Self, Error> {
        Self::new(i, self.j_range(), self.k_range())
    }
}

/// Format the extent into a string that would be written to a vtk file:
/// `"i_start i_end j_start j_end k_start k_end"`
impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.i_start, self.i_end, self.j_start, self.j_end, self.k_start, self.k_end
        )
    }
}
