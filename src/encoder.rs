//! Binary record encoding and appended-section offset bookkeeping
//!
//! Both file families store their arrays as a sequence of binary records. The XML
//! formats prefix every record with a 4 byte little endian payload length and locate
//! each record by its `offset` attribute, while the legacy format writes bare big endian
//! payloads whose boundaries are implied by the ascii header in front of them.
//!
//! The XML writers never interleave header and offset computation. They first list
//! every record in emission order ([`AppendedLayout::plan`]), take a prefix sum over
//! the record sizes ([`record_offsets`]), write the header from those offsets and only
//! then write the payloads, in the same order they were listed.

use crate::traits::Array;
use crate::Error;

use std::borrow::Cow;
use std::io::Write;

/// size of the length field in front of every XML record
pub const LENGTH_FIELD_BYTES: usize = std::mem::size_of::<u32>();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

/// How records are delimited in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// XML appended data: `u32` little endian payload length, then the little endian payload
    LengthPrefixed,
    /// legacy files: big endian payload with no delimiter
    Bare,
}

impl Framing {
    pub fn byte_order(&self) -> ByteOrder {
        match self {
            Self::LengthPrefixed => ByteOrder::LittleEndian,
            Self::Bare => ByteOrder::BigEndian,
        }
    }

    /// number of bytes a record with `payload` bytes occupies
    pub fn record_len(&self, payload: usize) -> usize {
        match self {
            Self::LengthPrefixed => LENGTH_FIELD_BYTES + payload,
            Self::Bare => payload,
        }
    }
}

/// The on-disk type of the elements of an array. Every floating point value is
/// truncated to 4 bytes and every index to a 4 byte signed integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Float32,
    Int32,
}

impl Precision {
    pub fn size(&self) -> usize {
        match self {
            Self::Float32 => std::mem::size_of::<f32>(),
            Self::Int32 => std::mem::size_of::<i32>(),
        }
    }

    /// name of the type in XML `type` attributes
    pub fn xml_name(&self) -> &'static str {
        match self {
            Self::Float32 => "Float32",
            Self::Int32 => "Int32",
        }
    }

    /// name of the type in legacy headers
    pub fn legacy_name(&self) -> &'static str {
        match self {
            Self::Float32 => "float",
            Self::Int32 => "int",
        }
    }
}

/// A scalar that has a fixed 4 byte binary representation
pub trait Element: Copy {
    fn write_bytes(self, writer: &mut dyn Write, order: ByteOrder) -> std::io::Result<()>;
}

impl Element for f32 {
    #[inline]
    fn write_bytes(self, writer: &mut dyn Write, order: ByteOrder) -> std::io::Result<()> {
        match order {
            ByteOrder::LittleEndian => writer.write_all(&self.to_le_bytes()),
            ByteOrder::BigEndian => writer.write_all(&self.to_be_bytes()),
        }
    }
}

impl Element for i32 {
    #[inline]
    fn write_bytes(self, writer: &mut dyn Write, order: ByteOrder) -> std::io::Result<()> {
        match order {
            ByteOrder::LittleEndian => writer.write_all(&self.to_le_bytes()),
            ByteOrder::BigEndian => writer.write_all(&self.to_be_bytes()),
        }
    }
}

/// Which element of the XML header a record is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Points,
    Coordinates,
    Cells,
    PointData,
    CellData,
}

impl Section {
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Points => "Points",
            Self::Coordinates => "Coordinates",
            Self::Cells => "Cells",
            Self::PointData => "PointData",
            Self::CellData => "CellData",
        }
    }

    /// element name used for this section in a parallel descriptor, if it is declared there
    pub fn parallel_element_name(&self) -> Option<&'static str> {
        match self {
            Self::Points => Some("PPoints"),
            Self::Coordinates => Some("PCoordinates"),
            Self::Cells => None,
            Self::PointData => Some("PPointData"),
            Self::CellData => Some("PCellData"),
        }
    }
}

/// One named array of the appended section
pub struct Record<'a> {
    pub section: Section,
    pub name: Cow<'a, str>,
    pub array: Box<dyn Array + 'a>,
}

impl<'a> Record<'a> {
    pub fn new<N, A>(section: Section, name: N, array: A) -> Self
    where
        N: Into<Cow<'a, str>>,
        A: Array + 'a,
    {
        Self {
            section,
            name: name.into(),
            array: Box::new(array),
        }
    }

    pub fn payload_len(&self) -> usize {
        self.array.byte_len()
    }
}

impl std::fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("section", &self.section)
            .field("name", &self.name)
            .field("precision", &self.array.precision())
            .field("components", &self.array.components())
            .field("bytes", &self.payload_len())
            .finish()
    }
}

/// Offsets of length-prefixed records laid out back to back: the first record starts at
/// zero and every following record starts after the length field and payload of all the
/// records before it.
///
/// ```
/// assert_eq!(pvtk::encoder::record_offsets([12, 8, 4]), vec![0, 16, 28]);
/// ```
pub fn record_offsets<I: IntoIterator<Item = usize>>(payload_sizes: I) -> Vec<u64> {
    payload_sizes
        .into_iter()
        .scan(0u64, |running, size| {
            let offset = *running;
            *running += Framing::LengthPrefixed.record_len(size) as u64;
            Some(offset)
        })
        .collect()
}

/// The fully planned content of an XML appended section
#[derive(Debug)]
pub struct AppendedLayout<'a> {
    records: Vec<Record<'a>>,
    offsets: Vec<u64>,
    section_len: u64,
}

impl<'a> AppendedLayout<'a> {
    /// Plan the appended section for `records`, which must already be in emission order
    pub fn plan(records: Vec<Record<'a>>) -> Result<Self, Error> {
        for record in &records {
            let bytes = record.payload_len();
            if u32::try_from(bytes).is_err() {
                return Err(Error::RecordTooLarge {
                    name: record.name.to_string(),
                    bytes,
                });
            }
        }

        let offsets = record_offsets(records.iter().map(Record::payload_len));
        let section_len = records
            .iter()
            .map(|record| Framing::LengthPrefixed.record_len(record.payload_len()) as u64)
            .sum();

        tracing::debug!(
            records = records.len(),
            section_len,
            "planned appended section layout"
        );

        Ok(Self {
            records,
            offsets,
            section_len,
        })
    }

    /// records in emission order, each paired with its declared offset
    pub fn entries(&self) -> impl Iterator<Item = (&Record<'a>, u64)> {
        self.records.iter().zip(self.offsets.iter().copied())
    }

    pub fn records(&self) -> &[Record<'a>] {
        &self.records
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// total number of bytes the records occupy in the appended section (not counting the
    /// leading `_`)
    pub fn section_len(&self) -> u64 {
        self.section_len
    }

    /// Write every record in planned order
    pub fn write_payload<W: Write>(&self, writer: W) -> Result<u64, Error> {
        let mut encoder = RecordEncoder::new(writer, Framing::LengthPrefixed);

        for (record, offset) in self.entries() {
            debug_assert_eq!(
                encoder.bytes_written(),
                offset,
                "record `{}` written at an offset other than the one declared",
                record.name
            );
            encoder.write_record(&record.name, record.array.as_ref())?;
        }

        Ok(encoder.bytes_written())
    }
}

/// Emits binary records in one fixed framing and keeps a running byte count
pub struct RecordEncoder<W> {
    writer: W,
    framing: Framing,
    written: u64,
}

impl<W: Write> RecordEncoder<W> {
    pub fn new(writer: W, framing: Framing) -> Self {
        Self {
            writer,
            framing,
            written: 0,
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// write ascii text between binary records (legacy headers)
    pub fn write_text(&mut self, text: &str) -> Result<(), Error> {
        self.writer.write_all(text.as_bytes())?;
        self.written += text.len() as u64;
        Ok(())
    }

    pub fn write_record(&mut self, name: &str, array: &dyn Array) -> Result<(), Error> {
        let payload = array.byte_len();

        if let Framing::LengthPrefixed = self.framing {
            let header = u32::try_from(payload).map_err(|_| Error::RecordTooLarge {
                name: name.to_string(),
                bytes: payload,
            })?;
            self.writer.write_all(&header.to_le_bytes())?;
        }

        let mut counted = CountingWriter::new(&mut self.writer);
        array.write_binary(&mut counted, self.framing.byte_order())?;
        debug_assert_eq!(
            counted.count,
            payload as u64,
            "array `{}` wrote a different number of bytes than it reported",
            name
        );

        self.written += self.framing.record_len(payload) as u64;
        tracing::trace!(name, payload, written = self.written, "wrote record");

        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// passes writes through while counting the bytes accepted
pub(crate) struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W> CountingWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    pub(crate) fn count(&self) -> u64 {
        self.count
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.count += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_accumulate_length_field_and_payload() {
        let offsets = record_offsets([24, 8, 8, 4]);
        assert_eq!(offsets, vec![0, 28, 40, 52]);
    }

    #[test]
    fn empty_layout_has_no_offsets() {
        assert!(record_offsets(std::iter::empty()).is_empty());
    }

    #[test]
    fn length_prefixed_record() {
        let values = [1.0f64, -2.5];
        let mut encoder = RecordEncoder::new(Vec::new(), Framing::LengthPrefixed);
        encoder.write_record("x", &values.as_slice()).unwrap();

        assert_eq!(encoder.bytes_written(), 12);

        let bytes = encoder.into_inner();
        assert_eq!(&bytes[0..4], &8u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[8..12], &(-2.5f32).to_le_bytes());
    }

    #[test]
    fn bare_record_is_big_endian() {
        let values = [3.0f64];
        let mut encoder = RecordEncoder::new(Vec::new(), Framing::Bare);
        encoder.write_text("X_COORDINATES 1 float\n").unwrap();
        encoder.write_record("x", &values.as_slice()).unwrap();

        let bytes = encoder.into_inner();
        let header_len = "X_COORDINATES 1 float\n".len();
        assert_eq!(bytes.len(), header_len + 4);
        assert_eq!(&bytes[header_len..], &3.0f32.to_be_bytes());
    }

    #[test]
    fn layout_payload_matches_declared_offsets() {
        let x = [0.0f64, 1.0, 2.0];
        let y = [5.0f64];
        let records = vec![
            Record::new(Section::Coordinates, "x", x.as_slice()),
            Record::new(Section::Coordinates, "y", y.as_slice()),
        ];

        let layout = AppendedLayout::plan(records).unwrap();
        assert_eq!(layout.offsets(), &[0, 16]);
        assert_eq!(layout.section_len(), 24);

        let mut bytes = Vec::new();
        let written = layout.write_payload(&mut bytes).unwrap();
        assert_eq!(written, 24);
        assert_eq!(bytes.len(), 24);

        // the second length field sits exactly at the second offset
        assert_eq!(&bytes[16..20], &4u32.to_le_bytes());
        assert_eq!(&bytes[20..24], &5.0f32.to_le_bytes());
    }

    /// reports a payload one element past what a `u32` header can describe
    struct Oversized;

    impl Array for Oversized {
        fn precision(&self) -> Precision {
            Precision::Float32
        }

        fn length(&self) -> usize {
            u32::MAX as usize / 4 + 1
        }

        fn write_binary(&self, _: &mut dyn Write, _: ByteOrder) -> Result<(), Error> {
            unreachable!("oversized arrays are rejected before their payload is written")
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_record_is_rejected_by_the_plan() {
        let records = vec![Record::new(Section::PointData, "oversized", Oversized)];

        match AppendedLayout::plan(records) {
            Err(Error::RecordTooLarge { name, bytes }) => {
                assert_eq!(name, "oversized");
                assert_eq!(bytes, u32::MAX as usize + 1);
            }
            other => panic!("expected RecordTooLarge, got {other:?}"),
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_record_writes_nothing() {
        let mut encoder = RecordEncoder::new(Vec::new(), Framing::LengthPrefixed);
        assert_eq!(encoder.framing(), Framing::LengthPrefixed);

        let err = encoder.write_record("oversized", &Oversized).unwrap_err();
        assert!(matches!(err, Error::RecordTooLarge { .. }));

        assert_eq!(encoder.bytes_written(), 0);
        assert!(encoder.into_inner().is_empty());
    }
}
