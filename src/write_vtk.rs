//! Serial XML files (`.vts`, `.vtr`, `.vtu`) with a raw appended binary section
//!
//! Every file written here has the same layout:
//!
//! ```text
//! <?xml version="1.0"?>
//! <VTKFile type="RectilinearGrid" version="0.1" byte_order="LittleEndian" header_type="UInt32">
//!   <RectilinearGrid WholeExtent="0 2 0 1 0 0">
//!     <Piece Extent="0 2 0 1 0 0">
//!       <Coordinates>
//!         <DataArray type="Float32" ... Name="x" format="appended" offset="0"/>
//!         <DataArray type="Float32" ... Name="y" format="appended" offset="16"/>
//!         <DataArray type="Float32" ... Name="z" format="appended" offset="28"/>
//!       </Coordinates>
//!       <PointData>
//!         <DataArray type="Float32" ... Name="P" format="appended" offset="36"/>
//!       </PointData>
//!     </Piece>
//!   </RectilinearGrid>
//!   <AppendedData encoding="raw">_binary records here
//!   </AppendedData>
//! </VTKFile>
//! ```
//!
//! The header only declares offsets; every array lives in the appended section as a
//! `u32` little endian byte count followed by the little endian payload. Offsets count from the
//! byte after the `_`.

use crate::encoder::{AppendedLayout, CountingWriter};
use crate::field::Field;
use crate::prelude::*;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::writer::Writer;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub(crate) const VTK_FILE_VERSION: &str = "0.1";
pub(crate) const INDENT: usize = 2;

/// Write a structured grid and its fields to `output_dir/name.vts`, returning the path written.
///
/// The extent declared in the file is the one carried by `mesh`.
pub fn write_structured<P: AsRef<Path>>(
    config: &WriteConfig,
    name: P,
    mesh: &Structured,
    fields: &FieldBundle,
) -> Result<PathBuf, Error> {
    write_xml_file(config, name.as_ref(), mesh, fields)
}

/// Write a rectilinear grid and its fields to `output_dir/name.vtr`, returning the path written.
///
/// The extent declared in the file is the one carried by `mesh`.
pub fn write_rectilinear<P: AsRef<Path>>(
    config: &WriteConfig,
    name: P,
    mesh: &Rectilinear,
    fields: &FieldBundle,
) -> Result<PathBuf, Error> {
    write_xml_file(config, name.as_ref(), mesh, fields)
}

/// Write an unstructured grid and its fields to `output_dir/name.vtu`, returning the path written.
pub fn write_unstructured<P: AsRef<Path>>(
    config: &WriteConfig,
    name: P,
    mesh: &Unstructured,
    fields: &FieldBundle,
) -> Result<PathBuf, Error> {
    write_xml_file(config, name.as_ref(), mesh, fields)
}

/// Write a given grid and its fields as one XML document to a `Writer`
pub fn write_xml<W, D>(writer: W, domain: &D, fields: &FieldBundle) -> Result<(), Error>
where
    W: Write,
    D: Domain + ?Sized,
{
    let layout = plan_appended(domain, fields)?;
    write_planned(writer, domain, &layout)
}

pub(crate) fn write_xml_file<D: Domain + ?Sized>(
    config: &WriteConfig,
    name: &Path,
    domain: &D,
    fields: &FieldBundle,
) -> Result<PathBuf, Error> {
    // validation happens before the file is created
    let layout = plan_appended(domain, fields)?;

    let path = config.resolve(name, domain.grid().xml_extension());
    let mut writer = CountingWriter::new(create_file(&path)?);
    write_planned(&mut writer, domain, &layout)?;

    tracing::info!(
        path = %path.display(),
        bytes = writer.count(),
        "wrote {}",
        domain.grid().xml_type()
    );

    Ok(path)
}

/// List every record of the file in emission order: the geometry arrays followed by the
/// fields, then compute their offsets.
pub(crate) fn plan_appended<'a, D: Domain + ?Sized>(
    domain: &'a D,
    fields: &'a FieldBundle,
) -> Result<AppendedLayout<'a>, Error> {
    fields.validate(domain)?;

    let mut records = domain.geometry_records()?;
    records.extend(fields.emission_order().map(Field::record));

    AppendedLayout::plan(records)
}

fn write_planned<W, D>(writer: W, domain: &D, layout: &AppendedLayout<'_>) -> Result<(), Error>
where
    W: Write,
    D: Domain + ?Sized,
{
    let grid = domain.grid();
    let mut writer = Writer::new_with_indent(writer, b' ', INDENT);

    write_declaration(&mut writer)?;
    start_element(
        &mut writer,
        "VTKFile",
        &[
            ("type", grid.xml_type()),
            ("version", VTK_FILE_VERSION),
            ("byte_order", "LittleEndian"),
            ("header_type", "UInt32"),
        ],
    )?;

    match domain.bounds() {
        PieceBounds::Extent(extent) => {
            let extent = extent.to_string();
            start_element(&mut writer, grid.xml_type(), &[("WholeExtent", extent.as_str())])?;
            start_element(&mut writer, "Piece", &[("Extent", extent.as_str())])?;
        }
        PieceBounds::Counts { points, cells } => {
            start_element(&mut writer, grid.xml_type(), &[])?;
            start_element(
                &mut writer,
                "Piece",
                &[
                    ("NumberOfPoints", points.to_string().as_str()),
                    ("NumberOfCells", cells.to_string().as_str()),
                ],
            )?;
        }
    }

    // records of one section are always contiguous
    let mut open_section: Option<Section> = None;

    for (record, offset) in layout.entries() {
        if open_section != Some(record.section) {
            if let Some(section) = open_section {
                end_element(&mut writer, section.element_name())?;
            }
            start_element(&mut writer, record.section.element_name(), &[])?;
            open_section = Some(record.section);
        }

        write_appended_dataarray_header(
            &mut writer,
            &record.name,
            offset,
            record.array.components(),
            record.array.precision(),
        )?;
    }

    if let Some(section) = open_section {
        end_element(&mut writer, section.element_name())?;
    }

    end_element(&mut writer, "Piece")?;
    end_element(&mut writer, grid.xml_type())?;

    appended_binary_header_start(&mut writer)?;
    let written = layout.write_payload(writer.inner())?;
    debug_assert_eq!(written, layout.section_len());
    appended_binary_header_end(&mut writer)?;

    end_element(&mut writer, "VTKFile")?;
    writer.inner().write_all(b"\n")?;
    writer.inner().flush()?;

    tracing::debug!(
        grid = grid.xml_type(),
        records = layout.records().len(),
        appended_bytes = written,
        "wrote xml document"
    );

    Ok(())
}

/// write the header for an appended data array that will later be written in the appended
/// section of the vtk.
///
/// if you call this function you are also responsible for writing the array at `offset`
/// within the appended section
#[inline]
pub fn write_appended_dataarray_header<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    offset: u64,
    components: usize,
    precision: Precision,
) -> Result<(), Error> {
    empty_element(
        writer,
        "DataArray",
        &[
            ("type", precision.xml_name()),
            ("NumberOfComponents", components.to_string().as_str()),
            ("Name", name),
            ("format", "appended"),
            ("offset", offset.to_string().as_str()),
        ],
    )
}

pub(crate) fn write_declaration<W: Write>(writer: &mut Writer<W>) -> Result<(), Error> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    Ok(())
}

pub(crate) fn start_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, &str)],
) -> Result<(), Error> {
    let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
    writer.write_event(Event::Start(element))?;
    Ok(())
}

pub(crate) fn empty_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, &str)],
) -> Result<(), Error> {
    let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

pub(crate) fn end_element<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// open the appended data element and write the `_` marking the start of the binary section
pub(crate) fn appended_binary_header_start<W: Write>(
    writer: &mut Writer<W>,
) -> Result<(), Error> {
    start_element(writer, "AppendedData", &[("encoding", "raw")])?;
    writer.inner().write_all(b"_")?;
    Ok(())
}

pub(crate) fn appended_binary_header_end<W: Write>(writer: &mut Writer<W>) -> Result<(), Error> {
    end_element(writer, "AppendedData")
}

pub(crate) fn create_file(path: &Path) -> Result<BufWriter<File>, Error> {
    tracing::debug!(path = %path.display(), "creating output file");
    let file = File::create(path)?;
    Ok(BufWriter::new(file))
}
