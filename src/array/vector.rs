use super::to_float32;
use crate::encoder::Element;
use crate::prelude::*;

impl Array for Vec<f64> {
    fn precision(&self) -> Precision {
        Precision::Float32
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error> {
        self.as_slice().write_binary(writer, order)
    }
}

impl Array for [f64] {
    fn precision(&self) -> Precision {
        Precision::Float32
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error> {
        for value in self.iter() {
            to_float32(*value).write_bytes(writer, order)?;
        }

        Ok(())
    }
}

#[test]
fn slice_truncates_to_f32() {
    let values = vec![0.1f64, 1e10];
    let mut bytes = Vec::new();
    values
        .write_binary(&mut bytes, ByteOrder::LittleEndian)
        .unwrap();

    assert_eq!(bytes.len(), values.byte_len());
    assert_eq!(&bytes[0..4], &0.1f32.to_le_bytes());
    assert_eq!(&bytes[4..8], &1e10f32.to_le_bytes());
}
