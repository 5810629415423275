//! Legacy binary `.vtk` files
//!
//! A legacy file is a sequence of ascii keyword lines, each followed by a block of big endian
//! binary values and a newline. There is no offset table: a reader walks the file front to back
//! and uses the counts declared on each keyword line to find the end of the following block.
//!
//! ```text
//! # vtk DataFile Version 2.0
//! Visualization output file
//! BINARY
//! DATASET RECTILINEAR_GRID
//! DIMENSIONS 3 2 1
//! X_COORDINATES 3 float
//! <12 bytes>
//! Y_COORDINATES 2 float
//! <8 bytes>
//! Z_COORDINATES 1 float
//! <4 bytes>
//! POINT_DATA 6
//! SCALARS P float 1
//! LOOKUP_TABLE default
//! <24 bytes>
//! ```

use crate::array::{CellTypes, LegacyCells, PointRows};
use crate::encoder::{Framing, RecordEncoder};
use crate::field::Field;
use crate::prelude::*;
use crate::write_vtk::create_file;

use std::path::{Path, PathBuf};

const LEGACY_EXTENSION: &str = "vtk";
const LEGACY_VERSION_LINE: &str = "# vtk DataFile Version 2.0";
const MAX_SCALARS_COMPONENTS: usize = 4;

/// A grid that knows how to lay out its geometry in a legacy file
pub trait LegacyGeometry: Domain {
    /// write every keyword line and binary block describing the geometry, starting with
    /// `DIMENSIONS` for lattice grids
    fn write_legacy_geometry<W: Write>(&self, encoder: &mut RecordEncoder<W>)
        -> Result<(), Error>;
}

/// Write a structured grid and its fields to `output_dir/name.vtk`, returning the path written.
pub fn write_legacy_structured<P: AsRef<Path>>(
    config: &WriteConfig,
    name: P,
    mesh: &Structured,
    fields: &FieldBundle,
) -> Result<PathBuf, Error> {
    write_legacy_file(config, name.as_ref(), mesh, fields)
}

/// Write a rectilinear grid and its fields to `output_dir/name.vtk`, returning the path written.
pub fn write_legacy_rectilinear<P: AsRef<Path>>(
    config: &WriteConfig,
    name: P,
    mesh: &Rectilinear,
    fields: &FieldBundle,
) -> Result<PathBuf, Error> {
    write_legacy_file(config, name.as_ref(), mesh, fields)
}

/// Write an unstructured grid and its fields to `output_dir/name.vtk`, returning the path
/// written.
pub fn write_legacy_unstructured<P: AsRef<Path>>(
    config: &WriteConfig,
    name: P,
    mesh: &Unstructured,
    fields: &FieldBundle,
) -> Result<PathBuf, Error> {
    write_legacy_file(config, name.as_ref(), mesh, fields)
}

/// Write a grid and its fields as a legacy binary file to any writer, returning the number of
/// bytes written.
pub fn write_legacy<W, D>(
    writer: W,
    config: &WriteConfig,
    domain: &D,
    fields: &FieldBundle,
) -> Result<u64, Error>
where
    W: Write,
    D: LegacyGeometry + ?Sized,
{
    validate_legacy(domain, fields)?;
    write_validated(writer, config, domain, fields)
}

fn write_legacy_file<D: LegacyGeometry + ?Sized>(
    config: &WriteConfig,
    name: &Path,
    domain: &D,
    fields: &FieldBundle,
) -> Result<PathBuf, Error> {
    validate_legacy(domain, fields)?;

    let path = config.resolve(name, LEGACY_EXTENSION);
    let bytes = write_validated(create_file(&path)?, config, domain, fields)?;

    tracing::info!(
        path = %path.display(),
        bytes,
        "wrote legacy {}",
        domain.grid().legacy_dataset()
    );

    Ok(path)
}

/// shape checks shared with the XML writers, plus the limits of a `SCALARS` keyword line: the
/// name is a single whitespace free token and the component count is between 1 and 4
fn validate_legacy<D: Domain + ?Sized>(domain: &D, fields: &FieldBundle) -> Result<(), Error> {
    fields.validate(domain)?;

    for field in fields.emission_order() {
        let name = field.name();

        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidFieldName(name.to_string()));
        }

        if field.components() > MAX_SCALARS_COMPONENTS {
            return Err(ShapeMismatch::field(
                name,
                format!("at most {MAX_SCALARS_COMPONENTS} components"),
                format!("{} components", field.components()),
            )
            .into());
        }
    }

    Ok(())
}

fn write_validated<W, D>(
    writer: W,
    config: &WriteConfig,
    domain: &D,
    fields: &FieldBundle,
) -> Result<u64, Error>
where
    W: Write,
    D: LegacyGeometry + ?Sized,
{
    let mut encoder = RecordEncoder::new(writer, Framing::Bare);

    encoder.write_text(&format!(
        "{LEGACY_VERSION_LINE}\n{}\nBINARY\nDATASET {}\n",
        config.legacy_title(),
        domain.grid().legacy_dataset()
    ))?;

    domain.write_legacy_geometry(&mut encoder)?;

    for anchor in [Anchor::Point, Anchor::Cell] {
        let mut anchored = fields.anchored(anchor).peekable();

        if anchored.peek().is_none() {
            continue;
        }

        let count = domain.anchored_shape(anchor).count();
        encoder.write_text(&format!("{} {count}\n", anchor.legacy_keyword()))?;

        for field in anchored {
            write_field(&mut encoder, field)?;
        }
    }

    encoder.flush()?;
    Ok(encoder.bytes_written())
}

fn write_field<W: Write>(encoder: &mut RecordEncoder<W>, field: &Field) -> Result<(), Error> {
    let header = format!(
        "SCALARS {} {} {}\nLOOKUP_TABLE default\n",
        field.name(),
        field.data().precision().legacy_name(),
        field.components()
    );
    write_block(encoder, &header, field.name(), field.data())
}

/// a keyword line, the binary payload it announces and the trailing newline
fn write_block<W: Write>(
    encoder: &mut RecordEncoder<W>,
    header: &str,
    name: &str,
    array: &dyn Array,
) -> Result<(), Error> {
    encoder.write_text(header)?;
    encoder.write_record(name, array)?;
    encoder.write_text("\n")
}

fn write_dimensions<W: Write>(
    encoder: &mut RecordEncoder<W>,
    [nx, ny, nz]: [usize; 3],
) -> Result<(), Error> {
    encoder.write_text(&format!("DIMENSIONS {nx} {ny} {nz}\n"))
}

impl LegacyGeometry for Rectilinear {
    fn write_legacy_geometry<W: Write>(
        &self,
        encoder: &mut RecordEncoder<W>,
    ) -> Result<(), Error> {
        write_dimensions(encoder, self.dims())?;

        let axes = [
            ("X_COORDINATES", "x", self.x_locations()),
            ("Y_COORDINATES", "y", self.y_locations()),
            ("Z_COORDINATES", "z", self.z_locations()),
        ];

        for (keyword, name, locations) in axes {
            let header = format!(
                "{keyword} {} {}\n",
                locations.len(),
                locations.precision().legacy_name()
            );
            write_block(encoder, &header, name, &locations)?;
        }

        Ok(())
    }
}

impl LegacyGeometry for Structured {
    fn write_legacy_geometry<W: Write>(
        &self,
        encoder: &mut RecordEncoder<W>,
    ) -> Result<(), Error> {
        write_dimensions(encoder, self.dims())?;

        let points = self.points();
        let header = format!(
            "POINTS {} {}\n",
            self.point_count(),
            points.precision().legacy_name()
        );
        write_block(encoder, &header, "Points", &points)
    }
}

impl LegacyGeometry for Unstructured {
    fn write_legacy_geometry<W: Write>(
        &self,
        encoder: &mut RecordEncoder<W>,
    ) -> Result<(), Error> {
        let points = PointRows::new(self.points().view());
        let header = format!(
            "POINTS {} {}\n",
            self.point_count(),
            points.precision().legacy_name()
        );
        write_block(encoder, &header, "Points", &points)?;

        let cells = LegacyCells::new(self.cells());
        let header = format!("CELLS {} {}\n", self.cell_count(), cells.length());
        write_block(encoder, &header, "cells", &cells)?;

        let header = format!("CELL_TYPES {}\n", self.cell_count());
        write_block(encoder, &header, "types", &CellTypes::new(self.cell_types()))
    }
}
