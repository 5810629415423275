mod common;

use common::XmlFile;
use ndarray::{arr2, Array2, Array4};
use pvtk::{Anchor, CellType, FieldBundle, Rectilinear, Structured, Unstructured, WriteConfig};

fn mixed_mesh() -> Unstructured {
    let points = arr2(&[
        [0., 0., 0.],
        [1., 0., 0.],
        [2., 0., 0.],
        [0., 1., 0.],
        [1., 1., 0.],
        [2., 1., 0.],
        [0.5, 0.5, 1.],
    ]);

    Unstructured::new(
        points,
        vec![
            vec![0, 1, 4, 3],
            vec![1, 2, 5],
            vec![1, 5, 4],
            vec![0, 1, 4, 3, 6],
        ],
        vec![
            CellType::Quad,
            CellType::Triangle,
            CellType::Triangle,
            CellType::Pyramid,
        ],
    )
    .unwrap()
}

fn assert_offsets_consistent(file: &XmlFile) {
    let mut expected_offset = 0;

    for array in &file.arrays {
        assert_eq!(array.offset, expected_offset, "offset of `{}`", array.name);

        let len = file.record(&array.name).len();
        expected_offset += 4 + len;
    }

    // the last record ends exactly where the appended section does
    assert_eq!(expected_offset, file.appended.len());
}

#[test]
fn unstructured_offsets_locate_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = WriteConfig::new(dir.path());
    let mesh = mixed_mesh();

    let mut fields = FieldBundle::new();
    fields
        .attach("pressure", Anchor::Point, Array2::from_elem((7, 1), 1.5))
        .unwrap()
        .attach("area", Anchor::Cell, Array2::from_elem((4, 1), 2.0))
        .unwrap()
        .attach(
            "velocity",
            Anchor::Point,
            Array2::from_shape_fn((7, 3), |(p, c)| (p * 3 + c) as f64),
        )
        .unwrap();

    let path = pvtk::write_unstructured(&config, "mixed", &mesh, &fields).unwrap();
    assert_eq!(path, dir.path().join("mixed.vtu"));

    let file = XmlFile::read(&path);

    let names = file
        .arrays
        .iter()
        .map(|array| array.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["Points", "connectivity", "offsets", "types", "pressure", "velocity", "area"]
    );

    assert_offsets_consistent(&file);

    assert!(file
        .header
        .contains("<Piece NumberOfPoints=\"7\" NumberOfCells=\"4\">"));
    assert_eq!(file.array("velocity").components, 3);
    assert_eq!(file.array("velocity").section, "PointData");
    assert_eq!(file.array("area").section, "CellData");
    assert_eq!(file.array("types").section, "Cells");

    let velocity = file.floats("velocity");
    assert_eq!(velocity.len(), 21);
    // entity index fastest, then component
    assert_eq!(&velocity[0..4], &[0., 3., 6., 9.]);
    assert_eq!(velocity[7], 1.);
    assert_eq!(
        &file.floats("Points")[18..21],
        &[0.5, 0.5, 1.]
    );
}

#[test]
fn cell_offsets_are_running_point_counts() {
    let dir = tempfile::tempdir().unwrap();
    let config = WriteConfig::new(dir.path());
    let mesh = mixed_mesh();

    let path = pvtk::write_unstructured(&config, "mixed", &mesh, &FieldBundle::new()).unwrap();
    let file = XmlFile::read(&path);

    let offsets = file.ints("offsets");
    let connectivity = file.ints("connectivity");

    assert_eq!(offsets.len(), mesh.cells().len());

    let mut previous = 0;
    for (offset, cell) in offsets.iter().zip(mesh.cells()) {
        assert!(*offset > previous);
        assert_eq!((offset - previous) as usize, cell.len());
        previous = *offset;
    }

    assert_eq!(*offsets.last().unwrap() as usize, connectivity.len());
    assert_eq!(connectivity, vec![0, 1, 4, 3, 1, 2, 5, 1, 5, 4, 0, 1, 4, 3, 6]);
    assert_eq!(file.ints("types"), vec![9, 5, 5, 14]);
}

#[test]
fn structured_points_are_interleaved() {
    let dir = tempfile::tempdir().unwrap();
    let config = WriteConfig::new(dir.path());

    let x = ndarray::Array3::from_shape_fn((2, 2, 1), |(i, _, _)| i as f64);
    let y = ndarray::Array3::from_shape_fn((2, 2, 1), |(_, j, _)| 10. + j as f64);
    let z = ndarray::Array3::from_elem((2, 2, 1), 0.25);
    let mesh = Structured::new(x, y, z).unwrap();

    let mut fields = FieldBundle::new();
    fields
        .attach("cell", Anchor::Cell, Array4::from_elem((1, 1, 1, 1), 4.0))
        .unwrap();

    let path = pvtk::write_structured(&config, "surface", &mesh, &fields).unwrap();
    let file = XmlFile::read(&path);

    assert_offsets_consistent(&file);
    assert!(file
        .header
        .contains("<StructuredGrid WholeExtent=\"0 1 0 1 0 0\">"));

    assert_eq!(
        file.floats("Points"),
        vec![0., 10., 0.25, 1., 10., 0.25, 0., 11., 0.25, 1., 11., 0.25]
    );
    assert_eq!(file.floats("cell"), vec![4.0]);
}

#[test]
fn values_truncate_to_single_precision() {
    let dir = tempfile::tempdir().unwrap();
    let config = WriteConfig::new(dir.path());

    let mesh = Rectilinear::new(vec![0.1, 0.2], vec![1.0 / 3.0], vec![1e-40]).unwrap();
    let path = pvtk::write_rectilinear(&config, "axes", &mesh, &FieldBundle::new()).unwrap();
    let file = XmlFile::read(&path);

    assert_offsets_consistent(&file);
    assert_eq!(file.floats("x"), vec![0.1f64 as f32, 0.2f64 as f32]);
    assert_eq!(file.floats("y"), vec![(1.0f64 / 3.0) as f32]);
    assert_eq!(file.floats("z"), vec![1e-40f64 as f32]);
}
