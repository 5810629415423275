//! Named arrays attached to the points or cells of a grid
//!
//! A [`FieldBundle`] is the ordered set of fields written alongside one grid. Insertion order
//! is significant: it is the order of the arrays in the file header and, for each anchor, the
//! order of their payloads in the binary section.

use crate::array::{EntityValues, LatticeValues};
use crate::prelude::*;

/// Which entities of a grid a field holds values for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Point,
    Cell,
}

impl Anchor {
    pub(crate) fn section(&self) -> Section {
        match self {
            Self::Point => Section::PointData,
            Self::Cell => Section::CellData,
        }
    }

    /// keyword introducing the field block of a legacy file
    pub(crate) fn legacy_keyword(&self) -> &'static str {
        match self {
            Self::Point => "POINT_DATA",
            Self::Cell => "CELL_DATA",
        }
    }
}

/// The values of a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    /// values on a lattice, shaped `(components, nx, ny, nz)`
    Lattice(Array4<f64>),
    /// values per point or cell, shaped `[entity, component]`. Also accepted on lattice grids,
    /// where the entities are taken in file order (first index fastest).
    List(Array2<f64>),
}

impl FieldData {
    pub fn components(&self) -> usize {
        match self {
            Self::Lattice(arr) => arr.len_of(Axis(0)),
            Self::List(arr) => arr.len_of(Axis(1)),
        }
    }

    /// the arrangement of entities this data covers
    pub fn shape(&self) -> EntityShape {
        match self {
            Self::Lattice(arr) => {
                let (_, nx, ny, nz) = arr.dim();
                EntityShape::Lattice([nx, ny, nz])
            }
            Self::List(arr) => EntityShape::List(arr.len_of(Axis(0))),
        }
    }

    /// the values in file order: entity index fastest, then component
    pub fn values(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        match self {
            Self::Lattice(arr) => Box::new(LatticeValues::new(arr.view()).iter()),
            Self::List(arr) => Box::new(EntityValues::new(arr.view()).iter()),
        }
    }

    fn fits(&self, expected: EntityShape) -> bool {
        match (self.shape(), expected) {
            (EntityShape::Lattice(dims), EntityShape::Lattice(expected)) => dims == expected,
            // a lattice array cannot be attached to an unstructured grid
            (EntityShape::Lattice(_), EntityShape::List(_)) => false,
            (EntityShape::List(n), expected) => n == expected.count(),
        }
    }
}

impl From<Array4<f64>> for FieldData {
    fn from(arr: Array4<f64>) -> Self {
        Self::Lattice(arr)
    }
}

impl From<Array2<f64>> for FieldData {
    fn from(arr: Array2<f64>) -> Self {
        Self::List(arr)
    }
}

impl Array for FieldData {
    fn precision(&self) -> Precision {
        Precision::Float32
    }

    fn length(&self) -> usize {
        match self {
            Self::Lattice(arr) => arr.len(),
            Self::List(arr) => arr.len(),
        }
    }

    fn components(&self) -> usize {
        FieldData::components(self)
    }

    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error> {
        match self {
            Self::Lattice(arr) => LatticeValues::new(arr.view()).write_binary(writer, order),
            Self::List(arr) => EntityValues::new(arr.view()).write_binary(writer, order),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    anchor: Anchor,
    data: FieldData,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn data(&self) -> &FieldData {
        &self.data
    }

    pub fn components(&self) -> usize {
        self.data.components()
    }

    pub(crate) fn record(&self) -> Record<'_> {
        Record::new(self.anchor.section(), self.name.as_str(), &self.data)
    }

    pub fn summary(&self) -> FieldSummary {
        FieldSummary {
            name: self.name.clone(),
            anchor: self.anchor,
            components: self.components(),
        }
    }
}

/// The name, anchor and component count of a field, without its values. This is all a
/// parallel descriptor needs to declare the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSummary {
    pub name: String,
    pub anchor: Anchor,
    pub components: usize,
}

/// Ordered collection of uniquely named fields
///
/// ```
/// use pvtk::{Anchor, FieldBundle};
/// use ndarray::{Array2, Array4};
///
/// let mut fields = FieldBundle::new();
/// fields.attach("pressure", Anchor::Point, Array4::<f64>::zeros((1, 3, 2, 1)))?;
/// fields.attach("velocity", Anchor::Point, Array4::<f64>::zeros((3, 3, 2, 1)))?;
///
/// // names must be unique within a bundle
/// assert!(fields.attach("pressure", Anchor::Cell, Array2::<f64>::zeros((2, 1))).is_err());
///
/// let names: Vec<_> = fields.iter().map(|field| field.name()).collect();
/// assert_eq!(names, ["pressure", "velocity"]);
/// # Ok::<(), pvtk::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldBundle {
    fields: Vec<Field>,
}

impl FieldBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field at the end of the bundle.
    ///
    /// Fails with [`Error::DuplicateFieldName`] if a field of the same name is already
    /// present, or with a shape mismatch if the data has no components.
    pub fn attach<N, D>(&mut self, name: N, anchor: Anchor, data: D) -> Result<&mut Self, Error>
    where
        N: Into<String>,
        D: Into<FieldData>,
    {
        let name = name.into();
        let data = data.into();

        if self.get(&name).is_some() {
            return Err(Error::DuplicateFieldName(name));
        }

        if data.components() == 0 {
            return Err(ShapeMismatch::field(
                name,
                "at least one component".into(),
                "0 components".into(),
            )
            .into());
        }

        self.fields.push(Field { name, anchor, data });

        Ok(self)
    }

    /// Check every field against the grid it is about to be written with.
    pub fn validate<D: Domain + ?Sized>(&self, domain: &D) -> Result<(), Error> {
        for field in &self.fields {
            let expected = domain.anchored_shape(field.anchor);

            if !field.data.fits(expected) {
                return Err(ShapeMismatch::field(
                    field.name.as_str(),
                    format!("{expected} ({:?} anchored)", field.anchor),
                    field.data.shape().to_string(),
                )
                .into());
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// fields in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// fields with a given anchor, in insertion order
    pub fn anchored(&self, anchor: Anchor) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |field| field.anchor == anchor)
    }

    pub fn point_fields(&self) -> impl Iterator<Item = &Field> {
        self.anchored(Anchor::Point)
    }

    pub fn cell_fields(&self) -> impl Iterator<Item = &Field> {
        self.anchored(Anchor::Cell)
    }

    /// the order fields are written in: point fields, then cell fields, each in insertion order
    pub fn emission_order(&self) -> impl Iterator<Item = &Field> {
        self.point_fields().chain(self.cell_fields())
    }

    pub fn summaries(&self) -> Vec<FieldSummary> {
        self.emission_order().map(Field::summary).collect()
    }
}

impl<'a> IntoIterator for &'a FieldBundle {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rectilinear;

    fn mesh() -> Rectilinear {
        Rectilinear::new(vec![0., 1., 2.], vec![0., 1.], vec![0.]).unwrap()
    }

    #[test]
    fn duplicate_name() {
        let mut fields = FieldBundle::new();
        fields
            .attach("u", Anchor::Point, Array4::<f64>::zeros((1, 3, 2, 1)))
            .unwrap();

        let err = fields
            .attach("u", Anchor::Point, Array4::<f64>::zeros((1, 3, 2, 1)))
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateFieldName(name) if name == "u"));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn zero_components() {
        let mut fields = FieldBundle::new();
        let err = fields
            .attach("u", Anchor::Point, Array2::<f64>::zeros((6, 0)))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn lattice_shape_must_match() {
        let mut fields = FieldBundle::new();
        // same number of points, transposed lattice
        fields
            .attach("u", Anchor::Point, Array4::<f64>::zeros((1, 2, 3, 1)))
            .unwrap();

        assert!(matches!(
            fields.validate(&mesh()),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn flattened_list_on_lattice() {
        let mut fields = FieldBundle::new();
        fields
            .attach("p", Anchor::Point, Array2::<f64>::zeros((6, 1)))
            .unwrap()
            .attach("q", Anchor::Cell, Array2::<f64>::zeros((2, 3)))
            .unwrap();

        fields.validate(&mesh()).unwrap();
    }

    #[test]
    fn cell_count_mismatch() {
        let mut fields = FieldBundle::new();
        fields
            .attach("q", Anchor::Cell, Array4::<f64>::zeros((1, 3, 2, 1)))
            .unwrap();

        assert!(fields.validate(&mesh()).is_err());
    }

    #[test]
    fn emission_order_groups_anchors() {
        let mut fields = FieldBundle::new();
        fields
            .attach("a", Anchor::Point, Array2::<f64>::zeros((6, 1)))
            .unwrap()
            .attach("b", Anchor::Cell, Array2::<f64>::zeros((2, 1)))
            .unwrap()
            .attach("c", Anchor::Point, Array2::<f64>::zeros((6, 1)))
            .unwrap();

        let names = fields
            .emission_order()
            .map(Field::name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "c", "b"]);

        let inserted = fields.iter().map(Field::name).collect::<Vec<_>>();
        assert_eq!(inserted, vec!["a", "b", "c"]);
    }
}
