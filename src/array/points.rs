use super::to_float32;
use crate::encoder::Element;
use crate::prelude::*;
use ndarray::{ArrayView2, ArrayView3};

/// Point coordinates of a curvilinear lattice written as interleaved `(x, y, z)` triples
/// with the first lattice index varying fastest.
#[derive(Clone, Debug)]
pub struct LatticePoints<'a> {
    x: ArrayView3<'a, f64>,
    y: ArrayView3<'a, f64>,
    z: ArrayView3<'a, f64>,
}

impl<'a> LatticePoints<'a> {
    /// the three views must share one shape, which [`Structured`](crate::Structured) guarantees
    pub fn new(x: ArrayView3<'a, f64>, y: ArrayView3<'a, f64>, z: ArrayView3<'a, f64>) -> Self {
        debug_assert_eq!(x.dim(), y.dim());
        debug_assert_eq!(x.dim(), z.dim());
        Self { x, y, z }
    }

    pub fn iter(&self) -> impl Iterator<Item = [f64; 3]> + 'a {
        let x = self.x.clone().reversed_axes().into_iter();
        let y = self.y.clone().reversed_axes().into_iter();
        let z = self.z.clone().reversed_axes().into_iter();

        x.zip(y).zip(z).map(|((x, y), z)| [*x, *y, *z])
    }
}

impl Array for LatticePoints<'_> {
    fn precision(&self) -> Precision {
        Precision::Float32
    }

    fn length(&self) -> usize {
        self.x.len() * 3
    }

    fn components(&self) -> usize {
        3
    }

    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error> {
        for point in self.iter() {
            for coordinate in point {
                to_float32(coordinate).write_bytes(writer, order)?;
            }
        }
        Ok(())
    }
}

/// Point coordinates stored as rows of an `(n, 3)` array, written in row order
#[derive(Constructor, Clone, Debug)]
pub struct PointRows<'a> {
    points: ArrayView2<'a, f64>,
}

impl Array for PointRows<'_> {
    fn precision(&self) -> Precision {
        Precision::Float32
    }

    fn length(&self) -> usize {
        self.points.len()
    }

    fn components(&self) -> usize {
        3
    }

    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error> {
        // logical iteration order is row major regardless of memory layout
        for coordinate in self.points.iter() {
            to_float32(*coordinate).write_bytes(writer, order)?;
        }
        Ok(())
    }
}

#[test]
fn lattice_points_interleave_i_fastest() {
    let x = Array3::from_shape_fn((2, 2, 1), |(i, _, _)| i as f64);
    let y = Array3::from_shape_fn((2, 2, 1), |(_, j, _)| j as f64 * 10.);
    let z = Array3::zeros((2, 2, 1));

    let points = LatticePoints::new(x.view(), y.view(), z.view())
        .iter()
        .collect::<Vec<_>>();

    assert_eq!(
        points,
        vec![
            [0., 0., 0.],
            [1., 0., 0.],
            [0., 10., 0.],
            [1., 10., 0.]
        ]
    );
}
