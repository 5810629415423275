use super::to_int32;
use crate::encoder::Element;
use crate::mesh::CellType;
use crate::prelude::*;

/// every cell's point indices concatenated in cell order
#[derive(Constructor, Clone, Copy, Debug)]
pub struct Connectivity<'a> {
    cells: &'a [Vec<usize>],
}

impl Array for Connectivity<'_> {
    fn precision(&self) -> Precision {
        Precision::Int32
    }

    fn length(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error> {
        for index in self.cells.iter().flatten() {
            to_int32(*index)?.write_bytes(writer, order)?;
        }
        Ok(())
    }
}

/// the running total of connectivity entries after each cell, i.e. the position in
/// [`Connectivity`] one past the last point of that cell
#[derive(Constructor, Clone, Copy, Debug)]
pub struct CellOffsets<'a> {
    cells: &'a [Vec<usize>],
}

impl<'a> CellOffsets<'a> {
    pub fn iter(&self) -> impl Iterator<Item = usize> + 'a {
        self.cells.iter().scan(0, |running, cell| {
            *running += cell.len();
            Some(*running)
        })
    }
}

impl Array for CellOffsets<'_> {
    fn precision(&self) -> Precision {
        Precision::Int32
    }

    fn length(&self) -> usize {
        self.cells.len()
    }

    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error> {
        for offset in self.iter() {
            to_int32(offset)?.write_bytes(writer, order)?;
        }
        Ok(())
    }
}

#[derive(Constructor, Clone, Copy, Debug)]
pub struct CellTypes<'a> {
    types: &'a [CellType],
}

impl Array for CellTypes<'_> {
    fn precision(&self) -> Precision {
        Precision::Int32
    }

    fn length(&self) -> usize {
        self.types.len()
    }

    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error> {
        for cell_type in self.types {
            cell_type.code().write_bytes(writer, order)?;
        }
        Ok(())
    }
}

/// The legacy `CELLS` block: every cell written as its point count followed by its
/// point indices
#[derive(Constructor, Clone, Copy, Debug)]
pub struct LegacyCells<'a> {
    cells: &'a [Vec<usize>],
}

impl Array for LegacyCells<'_> {
    fn precision(&self) -> Precision {
        Precision::Int32
    }

    fn length(&self) -> usize {
        self.cells.len() + Connectivity::new(self.cells).length()
    }

    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error> {
        for cell in self.cells {
            to_int32(cell.len())?.write_bytes(writer, order)?;
            for index in cell {
                to_int32(*index)?.write_bytes(writer, order)?;
            }
        }
        Ok(())
    }
}
