//! Domain decomposed output: one XML piece per worker plus a descriptor naming every piece
//!
//! Every worker calls one of the `write_*_piece` functions exactly once. The returned
//! [`WrittenPiece`] only carries a [`Descriptor`] on the coordinating worker, which then writes
//! the `.pvts` / `.pvtr` / `.pvtu` file with [`Descriptor::write`]:
//!
//! ```no_run
//! use pvtk::parallel::{self, LatticeDecomposition, ParallelTarget};
//! use pvtk::{FieldBundle, Rectilinear, WriteConfig};
//!
//! # let (rank, workers) = (0, 2);
//! let whole = pvtk::Extent::new([0, 4], [0, 1], [0, 0])?;
//! let decomposition = LatticeDecomposition::first_axis(rank, workers, whole)?;
//! let extent = decomposition.piece_extent();
//!
//! let [i_start, i_end] = extent.i_range();
//! let x = (i_start..=i_end).map(|i| i as f64).collect();
//! let mesh = Rectilinear::new(x, vec![0., 1.], vec![0.])?.with_extent(extent)?;
//!
//! let config = WriteConfig::new("output");
//! let target = ParallelTarget::in_place("flow");
//!
//! let fields = FieldBundle::new();
//! let piece =
//!     parallel::write_rectilinear_piece(&config, &target, &decomposition, &mesh, &fields)?;
//!
//! // every piece must be on disk before the descriptor is read, synchronize here if needed
//! if let Some(descriptor) = piece.into_descriptor() {
//!     descriptor.write()?;
//! }
//! # Ok::<(), pvtk::Error>(())
//! ```
//!
//! Piece files are named `<piece>.x<i>x<j>x<k>.vts|vtr` after their coordinate in the processor
//! grid, or `<piece>.x<rank>.vtu` for unstructured grids.

use crate::encoder::Precision;
use crate::field::FieldSummary;
use crate::prelude::*;
use crate::write_vtk::{
    create_file, empty_element, end_element, start_element, write_declaration, write_xml_file,
    INDENT, VTK_FILE_VERSION,
};

use quick_xml::writer::Writer;

use std::ffi::OsString;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Whether a worker is responsible for the descriptor file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Coordinator,
    Worker,
}

impl Role {
    /// rank zero coordinates
    pub fn from_rank(rank: usize) -> Self {
        if rank == 0 {
            Self::Coordinator
        } else {
            Self::Worker
        }
    }

    pub fn is_coordinator(&self) -> bool {
        matches!(self, Self::Coordinator)
    }
}

/// Base paths of a parallel dataset
///
/// `descriptor` and `piece` are resolved against [`WriteConfig::output_dir`] and carry no
/// extension. `relative_piece` is the piece base as seen from the directory holding the
/// descriptor: it is what the `Source` attributes of the descriptor are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelTarget {
    pub descriptor: PathBuf,
    pub piece: PathBuf,
    pub relative_piece: String,
}

impl ParallelTarget {
    pub fn new<D, P, R>(descriptor: D, piece: P, relative_piece: R) -> Self
    where
        D: Into<PathBuf>,
        P: Into<PathBuf>,
        R: Into<String>,
    {
        Self {
            descriptor: descriptor.into(),
            piece: piece.into(),
            relative_piece: relative_piece.into(),
        }
    }

    /// descriptor and pieces side by side in one directory, sharing one base name
    pub fn in_place<P: Into<PathBuf>>(base: P) -> Self {
        let base = base.into();
        let relative_piece = base
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            descriptor: base.clone(),
            piece: base,
            relative_piece,
        }
    }

    fn piece_base(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.piece.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }
}

/// Split `len` intervals into `workers` contiguous ranges of equal size.
///
/// An uneven split is refused rather than silently dropping the remainder.
///
/// ```
/// let ranges = pvtk::parallel::split_evenly(6, 3)?;
/// assert_eq!(ranges, vec![0..2, 2..4, 4..6]);
///
/// assert!(pvtk::parallel::split_evenly(7, 3).is_err());
/// # Ok::<(), pvtk::Error>(())
/// ```
pub fn split_evenly(len: usize, workers: usize) -> Result<Vec<Range<usize>>, Error> {
    let uninvertible = Error::UninvertibleDecomposition { len, workers };

    if workers == 0 || len % workers != 0 {
        return Err(uninvertible);
    }

    let chunk = len / workers;

    if chunk == 0 && workers > 1 {
        return Err(uninvertible);
    }

    Ok((0..workers)
        .map(|rank| rank * chunk..(rank + 1) * chunk)
        .collect())
}

/// Split the point extent `whole` along its first axis into `workers` pieces.
///
/// The intervals between points are divided evenly, so neighbouring pieces share exactly one
/// layer of points.
pub fn split_first_axis(whole: Extent, workers: usize) -> Result<Vec<Extent>, Error> {
    let [i_start, i_end] = whole.i_range();

    split_evenly(i_end - i_start, workers)?
        .into_iter()
        .map(|range| whole.with_i_range([i_start + range.start, i_start + range.end]))
        .collect()
}

/// The position of one lattice piece in a grid of processors, along with the extent of every
/// piece of the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeDecomposition {
    processors: [usize; 3],
    coords: [usize; 3],
    whole: Extent,
    pieces: Vec<Extent>,
}

impl LatticeDecomposition {
    /// `pieces` lists the extent of every piece with the first processor coordinate varying
    /// fastest: the piece at `(i, j, k)` is `pieces[i + j*n1 + k*n1*n2]`.
    pub fn new(
        processors: [usize; 3],
        coords: [usize; 3],
        whole: Extent,
        pieces: Vec<Extent>,
    ) -> Result<Self, Error> {
        if processors.contains(&0) {
            return Err(ShapeMismatch::decomposition(
                "processors",
                "at least one processor along every axis".into(),
                format!("{processors:?}"),
            )
            .into());
        }

        if coords.iter().zip(processors.iter()).any(|(c, n)| c >= n) {
            return Err(ShapeMismatch::decomposition(
                "coords",
                format!("a coordinate inside the {processors:?} processor grid"),
                format!("{coords:?}"),
            )
            .into());
        }

        let count: usize = processors.iter().product();

        if pieces.len() != count {
            return Err(ShapeMismatch::decomposition(
                "pieces",
                format!("{count} piece extents"),
                format!("{} piece extents", pieces.len()),
            )
            .into());
        }

        Ok(Self {
            processors,
            coords,
            whole,
            pieces,
        })
    }

    /// The decomposition produced by [`split_first_axis`] for the worker `rank` of `workers`
    pub fn first_axis(rank: usize, workers: usize, whole: Extent) -> Result<Self, Error> {
        let pieces = split_first_axis(whole, workers)?;
        Self::new([workers, 1, 1], [rank, 0, 0], whole, pieces)
    }

    pub fn processors(&self) -> [usize; 3] {
        self.processors
    }

    pub fn coords(&self) -> [usize; 3] {
        self.coords
    }

    pub fn whole(&self) -> &Extent {
        &self.whole
    }

    pub fn pieces(&self) -> &[Extent] {
        &self.pieces
    }

    /// the extent this worker's piece must have
    pub fn piece_extent(&self) -> Extent {
        self.pieces[self.linear_index(self.coords)]
    }

    pub fn role(&self) -> Role {
        if self.coords == [0, 0, 0] {
            Role::Coordinator
        } else {
            Role::Worker
        }
    }

    fn linear_index(&self, [i, j, k]: [usize; 3]) -> usize {
        let [n1, n2, _] = self.processors;
        i + j * n1 + k * n1 * n2
    }

    /// every processor coordinate, first coordinate fastest
    fn coordinates(&self) -> impl Iterator<Item = [usize; 3]> {
        let [n1, n2, n3] = self.processors;
        (0..n3).flat_map(move |k| (0..n2).flat_map(move |j| (0..n1).map(move |i| [i, j, k])))
    }
}

/// The rank of one unstructured piece among all workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankDecomposition {
    rank: usize,
    workers: usize,
}

impl RankDecomposition {
    pub fn new(rank: usize, workers: usize) -> Result<Self, Error> {
        if rank >= workers {
            return Err(ShapeMismatch::decomposition(
                "rank",
                format!("a rank below the worker count {workers}"),
                rank.to_string(),
            )
            .into());
        }

        Ok(Self { rank, workers })
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn role(&self) -> Role {
        Role::from_rank(self.rank)
    }
}

/// A piece file that has been written. The coordinator's piece also carries the descriptor
/// that still has to be written.
#[derive(Debug)]
pub struct WrittenPiece {
    path: PathBuf,
    descriptor: Option<Descriptor>,
}

impl WrittenPiece {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn role(&self) -> Role {
        if self.descriptor.is_some() {
            Role::Coordinator
        } else {
            Role::Worker
        }
    }

    /// the pending descriptor, `None` on every worker but the coordinator
    pub fn into_descriptor(self) -> Option<Descriptor> {
        self.descriptor
    }

    /// Write the descriptor if this is the coordinator's piece. Returns every path written.
    ///
    /// The descriptor refers to the pieces of all other workers, which are expected to be
    /// written by the time it is read.
    pub fn finish(self) -> Result<Vec<PathBuf>, Error> {
        let mut paths = vec![self.path];

        if let Some(descriptor) = self.descriptor {
            paths.push(descriptor.write()?);
        }

        Ok(paths)
    }
}

/// name, type and component count of an array as declared in a descriptor
#[derive(Debug, Clone, PartialEq)]
struct Declaration {
    section: Section,
    name: String,
    precision: Precision,
    components: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct PieceEntry {
    extent: Option<Extent>,
    source: String,
}

/// The contents of a `.pvts` / `.pvtr` / `.pvtu` file
///
/// Only obtainable from the coordinator's [`WrittenPiece`].
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    path: PathBuf,
    grid: GridKind,
    whole: Option<Extent>,
    declarations: Vec<Declaration>,
    pieces: Vec<PieceEntry>,
}

impl Descriptor {
    fn new<D: Domain + ?Sized>(
        config: &WriteConfig,
        target: &ParallelTarget,
        domain: &D,
        fields: &FieldBundle,
        whole: Option<Extent>,
        pieces: Vec<PieceEntry>,
    ) -> Result<Self, Error> {
        let grid = domain.grid();

        let mut declarations = domain
            .geometry_records()?
            .into_iter()
            .filter(|record| record.section.parallel_element_name().is_some())
            .map(|record| Declaration {
                section: record.section,
                name: record.name.into_owned(),
                precision: record.array.precision(),
                components: record.array.components(),
            })
            .collect::<Vec<_>>();

        declarations.extend(fields.summaries().into_iter().map(
            |FieldSummary {
                 name,
                 anchor,
                 components,
             }| Declaration {
                section: anchor.section(),
                name,
                precision: Precision::Float32,
                components,
            },
        ));

        Ok(Self {
            path: config.resolve(&target.descriptor, grid.parallel_extension()),
            grid,
            whole,
            declarations,
            pieces,
        })
    }

    /// the file this descriptor is written to
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// the `Source` attribute of every piece, in the order they are listed
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().map(|piece| piece.source.as_str())
    }

    /// Write the descriptor file and return its path
    pub fn write(self) -> Result<PathBuf, Error> {
        let mut writer = create_file(&self.path)?;
        self.write_to(&mut writer)?;

        tracing::info!(
            path = %self.path.display(),
            pieces = self.pieces.len(),
            "wrote {}",
            self.grid.parallel_type()
        );

        Ok(self.path)
    }

    /// Write the descriptor document to any writer
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), Error> {
        let grid_element = self.grid.parallel_type();
        let mut writer = Writer::new_with_indent(writer, b' ', INDENT);

        write_declaration(&mut writer)?;
        start_element(
            &mut writer,
            "VTKFile",
            &[
                ("type", grid_element),
                ("version", VTK_FILE_VERSION),
                ("byte_order", "LittleEndian"),
                ("header_type", "UInt32"),
            ],
        )?;

        match &self.whole {
            Some(whole) => start_element(
                &mut writer,
                grid_element,
                &[("WholeExtent", whole.to_string().as_str()), ("GhostLevel", "0")],
            )?,
            None => start_element(&mut writer, grid_element, &[("GhostLevel", "0")])?,
        }

        let mut open_section: Option<&'static str> = None;

        for declaration in &self.declarations {
            let element = match declaration.section.parallel_element_name() {
                Some(element) => element,
                None => continue,
            };

            if open_section != Some(element) {
                if let Some(previous) = open_section {
                    end_element(&mut writer, previous)?;
                }
                start_element(&mut writer, element, &[])?;
                open_section = Some(element);
            }

            empty_element(
                &mut writer,
                "DataArray",
                &[
                    ("type", declaration.precision.xml_name()),
                    ("Name", declaration.name.as_str()),
                    ("NumberOfComponents", declaration.components.to_string().as_str()),
                ],
            )?;
        }

        if let Some(previous) = open_section {
            end_element(&mut writer, previous)?;
        }

        for piece in &self.pieces {
            match &piece.extent {
                Some(extent) => empty_element(
                    &mut writer,
                    "Piece",
                    &[("Extent", extent.to_string().as_str()), ("Source", piece.source.as_str())],
                )?,
                None => empty_element(&mut writer, "Piece", &[("Source", piece.source.as_str())])?,
            }
        }

        end_element(&mut writer, grid_element)?;
        end_element(&mut writer, "VTKFile")?;
        writer.inner().write_all(b"\n")?;
        writer.inner().flush()?;

        Ok(())
    }
}

fn lattice_suffix([i, j, k]: [usize; 3]) -> String {
    format!(".x{i}x{j}x{k}")
}

fn rank_suffix(rank: usize) -> String {
    format!(".x{rank}")
}

/// Write this worker's piece of a decomposed structured grid
pub fn write_structured_piece(
    config: &WriteConfig,
    target: &ParallelTarget,
    decomposition: &LatticeDecomposition,
    mesh: &Structured,
    fields: &FieldBundle,
) -> Result<WrittenPiece, Error> {
    write_lattice_piece(config, target, decomposition, mesh, *mesh.extent(), fields)
}

/// Write this worker's piece of a decomposed rectilinear grid
pub fn write_rectilinear_piece(
    config: &WriteConfig,
    target: &ParallelTarget,
    decomposition: &LatticeDecomposition,
    mesh: &Rectilinear,
    fields: &FieldBundle,
) -> Result<WrittenPiece, Error> {
    write_lattice_piece(config, target, decomposition, mesh, *mesh.extent(), fields)
}

/// Write this worker's piece of a decomposed unstructured grid
pub fn write_unstructured_piece(
    config: &WriteConfig,
    target: &ParallelTarget,
    decomposition: &RankDecomposition,
    mesh: &Unstructured,
    fields: &FieldBundle,
) -> Result<WrittenPiece, Error> {
    let _span = tracing::debug_span!(
        "write_piece",
        grid = mesh.grid().xml_type(),
        rank = decomposition.rank,
        workers = decomposition.workers
    )
    .entered();

    let piece_base = target.piece_base(&rank_suffix(decomposition.rank));
    let path = write_xml_file(config, &piece_base, mesh, fields)?;

    let descriptor = if decomposition.role().is_coordinator() {
        let extension = mesh.grid().xml_extension();
        let pieces = (0..decomposition.workers)
            .map(|rank| PieceEntry {
                extent: None,
                source: format!("{}{}.{extension}", target.relative_piece, rank_suffix(rank)),
            })
            .collect();

        Some(Descriptor::new(config, target, mesh, fields, None, pieces)?)
    } else {
        None
    };

    Ok(WrittenPiece { path, descriptor })
}

fn write_lattice_piece<D: Domain + ?Sized>(
    config: &WriteConfig,
    target: &ParallelTarget,
    decomposition: &LatticeDecomposition,
    mesh: &D,
    extent: Extent,
    fields: &FieldBundle,
) -> Result<WrittenPiece, Error> {
    let _span = tracing::debug_span!(
        "write_piece",
        grid = mesh.grid().xml_type(),
        coords = ?decomposition.coords,
        processors = ?decomposition.processors
    )
    .entered();

    let expected = decomposition.piece_extent();

    if extent != expected {
        return Err(ShapeMismatch::decomposition(
            "extent",
            format!("`{expected}` for the piece at {:?}", decomposition.coords),
            format!("`{extent}`"),
        )
        .into());
    }

    let piece_base = target.piece_base(&lattice_suffix(decomposition.coords));
    let path = write_xml_file(config, &piece_base, mesh, fields)?;

    let descriptor = if decomposition.role().is_coordinator() {
        let extension = mesh.grid().xml_extension();
        let pieces = decomposition
            .coordinates()
            .map(|coords| PieceEntry {
                extent: Some(decomposition.pieces[decomposition.linear_index(coords)]),
                source: format!(
                    "{}{}.{extension}",
                    target.relative_piece,
                    lattice_suffix(coords)
                ),
            })
            .collect();

        Some(Descriptor::new(
            config,
            target,
            mesh,
            fields,
            Some(decomposition.whole),
            pieces,
        )?)
    } else {
        None
    };

    Ok(WrittenPiece { path, descriptor })
}

/// Write a structured piece and, on the coordinator, the descriptor. Returns every path written.
pub fn compose_structured(
    config: &WriteConfig,
    target: &ParallelTarget,
    decomposition: &LatticeDecomposition,
    mesh: &Structured,
    fields: &FieldBundle,
) -> Result<Vec<PathBuf>, Error> {
    write_structured_piece(config, target, decomposition, mesh, fields)?.finish()
}

/// Write a rectilinear piece and, on the coordinator, the descriptor. Returns every path written.
pub fn compose_rectilinear(
    config: &WriteConfig,
    target: &ParallelTarget,
    decomposition: &LatticeDecomposition,
    mesh: &Rectilinear,
    fields: &FieldBundle,
) -> Result<Vec<PathBuf>, Error> {
    write_rectilinear_piece(config, target, decomposition, mesh, fields)?.finish()
}

/// Write an unstructured piece and, on the coordinator, the descriptor. Returns every path
/// written.
pub fn compose_unstructured(
    config: &WriteConfig,
    target: &ParallelTarget,
    decomposition: &RankDecomposition,
    mesh: &Unstructured,
    fields: &FieldBundle,
) -> Result<Vec<PathBuf>, Error> {
    write_unstructured_piece(config, target, decomposition, mesh, fields)?.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_point_layer() {
        let whole = Extent::new([0, 2], [0, 1], [0, 0]).unwrap();
        let pieces = split_first_axis(whole, 2).unwrap();

        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].i_range(), [0, 1]);
        assert_eq!(pieces[1].i_range(), [1, 2]);
        assert_eq!(pieces[1].j_range(), [0, 1]);
    }

    #[test]
    fn offset_whole_extent() {
        let whole = Extent::new([10, 16], [0, 0], [0, 0]).unwrap();
        let pieces = split_first_axis(whole, 3).unwrap();

        let ranges = pieces.iter().map(Extent::i_range).collect::<Vec<_>>();
        assert_eq!(ranges, vec![[10, 12], [12, 14], [14, 16]]);
    }

    #[test]
    fn uneven_split_is_refused() {
        assert!(matches!(
            split_evenly(5, 2),
            Err(Error::UninvertibleDecomposition { len: 5, workers: 2 })
        ));
        assert!(split_evenly(4, 0).is_err());
        assert!(split_evenly(0, 2).is_err());
        assert_eq!(split_evenly(0, 1).unwrap(), vec![0..0]);
    }

    #[test]
    fn decomposition_validation() {
        let whole = Extent::new([0, 4], [0, 0], [0, 0]).unwrap();
        let pieces = split_first_axis(whole, 2).unwrap();

        let outside = LatticeDecomposition::new([2, 1, 1], [2, 0, 0], whole, pieces.clone());
        assert!(matches!(outside, Err(Error::ShapeMismatch(_))));

        let missing = LatticeDecomposition::new([2, 2, 1], [0, 1, 0], whole, pieces.clone());
        assert!(matches!(missing, Err(Error::ShapeMismatch(_))));

        let ok = LatticeDecomposition::new([2, 1, 1], [1, 0, 0], whole, pieces).unwrap();
        assert_eq!(ok.piece_extent().i_range(), [2, 4]);
        assert_eq!(ok.role(), Role::Worker);
        assert_eq!(ok.processors(), [2, 1, 1]);
        assert_eq!(ok.coords(), [1, 0, 0]);
        assert_eq!(ok.whole(), &whole);

        assert!(matches!(
            RankDecomposition::new(3, 3),
            Err(Error::ShapeMismatch(_))
        ));
        assert_eq!(RankDecomposition::new(0, 3).unwrap().role(), Role::Coordinator);
    }

    #[test]
    fn coordinates_first_axis_fastest() {
        let whole = Extent::new([0, 1], [0, 1], [0, 1]).unwrap();
        let pieces = vec![whole; 4];
        let decomposition =
            LatticeDecomposition::new([2, 2, 1], [0, 0, 0], whole, pieces).unwrap();

        let coords = decomposition.coordinates().collect::<Vec<_>>();
        assert_eq!(coords, vec![[0, 0, 0], [1, 0, 0], [0, 1, 0], [1, 1, 0]]);

        for (index, coords) in coords.into_iter().enumerate() {
            assert_eq!(decomposition.linear_index(coords), index);
        }
    }

    #[test]
    fn target_suffixes() {
        let target = ParallelTarget::in_place("out/flow");
        assert_eq!(target.relative_piece, "flow");
        assert_eq!(
            target.piece_base(&lattice_suffix([1, 0, 2])),
            PathBuf::from("out/flow.x1x0x2")
        );
        assert_eq!(target.piece_base(&rank_suffix(3)), PathBuf::from("out/flow.x3"));
    }
}
