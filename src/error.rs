use crate::mesh::Extent;

use derive_more::{Constructor, Display, From};

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Could not write XML data to file: `{0}`")]
    XmlWrite(#[from] quick_xml::Error),
    #[error("a field named `{0}` is already present in the bundle")]
    DuplicateFieldName(String),
    #[error("{0}")]
    ShapeMismatch(#[from] ShapeMismatch),
    #[error("{0}")]
    InvalidExtent(#[from] InvalidExtent),
    #[error("`{0}` is not a legacy field name: names must be non-empty without whitespace")]
    InvalidFieldName(String),
    #[error("cannot split {len} intervals evenly across {workers} workers")]
    UninvertibleDecomposition { len: usize, workers: usize },
    #[error("cell {cell} references point {index}, but the geometry only has {points} points")]
    PointIndexOutOfRange {
        cell: usize,
        index: usize,
        points: usize,
    },
    #[error("integer value {0} does not fit in a 4 byte signed integer")]
    IndexOverflow(usize),
    #[error("array `{name}` holds {bytes} bytes which exceeds the 4 byte record header")]
    RecordTooLarge { name: String, bytes: usize },
}

/// What kind of object disagreed with the shape it was checked against
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    #[display(fmt = "field")]
    Field,
    #[display(fmt = "geometry")]
    Geometry,
    #[display(fmt = "decomposition")]
    Decomposition,
}

#[derive(Display, Debug, Constructor, Clone, PartialEq)]
#[display(fmt = "{kind} shape mismatch for `{name}`: expected {expected}, got {actual}")]
pub struct ShapeMismatch {
    pub kind: ShapeKind,
    pub name: String,
    pub expected: String,
    pub actual: String,
}

impl std::error::Error for ShapeMismatch {}

impl ShapeMismatch {
    pub(crate) fn field<T: Into<String>>(name: T, expected: String, actual: String) -> Self {
        Self::new(ShapeKind::Field, name.into(), expected, actual)
    }

    pub(crate) fn geometry<T: Into<String>>(name: T, expected: String, actual: String) -> Self {
        Self::new(ShapeKind::Geometry, name.into(), expected, actual)
    }

    pub(crate) fn decomposition<T: Into<String>>(
        name: T,
        expected: String,
        actual: String,
    ) -> Self {
        Self::new(ShapeKind::Decomposition, name.into(), expected, actual)
    }
}

#[derive(From, Display, Debug, Clone, PartialEq)]
#[display(fmt = "extent `{extent}` has a start index past its end index")]
pub struct InvalidExtent {
    extent: Extent,
}

impl InvalidExtent {
    pub fn extent(&self) -> &Extent {
        &self.extent
    }
}

impl std::error::Error for InvalidExtent {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn shape_mismatch_converts_with_source() {
        let detail = ShapeMismatch::field("P", "6 entities".into(), "5 entities".into());
        let err: Error = detail.clone().into();

        assert!(matches!(&err, Error::ShapeMismatch(inner) if *inner == detail));
        assert_eq!(
            err.to_string(),
            "field shape mismatch for `P`: expected 6 entities, got 5 entities"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn invalid_extent_converts_with_source() {
        let err = Extent::new([4, 3], [0, 1], [0, 1]).unwrap_err();

        match &err {
            Error::InvalidExtent(inner) => assert_eq!(inner.extent().to_string(), "4 3 0 1 0 1"),
            other => panic!("unexpected error {other}"),
        }
        assert!(err.source().is_some());
    }
}
