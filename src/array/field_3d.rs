use super::to_float32;
use crate::encoder::Element;
use crate::prelude::*;
use ndarray::{ArrayView2, ArrayView4};

/// Field values stored on a 3D lattice.
///
/// The wrapped array has the shape `(components, nx, ny, nz)`. Values are written with the
/// first spatial index varying fastest and the component slowest, so the element at
/// `[n, i, j, k]` is written at position `i + j*nx + k*nx*ny + n*nx*ny*nz`.
#[derive(Constructor, Deref, Into, Clone, Debug)]
pub struct LatticeValues<'a>(ArrayView4<'a, f64>);

impl<'a> LatticeValues<'a> {
    pub fn iter(&self) -> impl Iterator<Item = f64> + 'a {
        let arr = self.0.clone();
        let components = arr.len_of(Axis(0));

        (0..components).flat_map(move |n| {
            arr.clone()
                .index_axis_move(Axis(0), n)
                // (nx, ny, nz) -> (nz, ny, nx) so that logical order runs over i first
                .reversed_axes()
                .into_iter()
                .copied()
        })
    }
}

impl Array for LatticeValues<'_> {
    fn precision(&self) -> Precision {
        Precision::Float32
    }

    fn length(&self) -> usize {
        self.0.len()
    }

    fn components(&self) -> usize {
        self.0.len_of(Axis(0))
    }

    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error> {
        for value in self.iter() {
            to_float32(value).write_bytes(writer, order)?;
        }
        Ok(())
    }
}

/// Field values stored per entity (point or cell) with the shape `[entity, component]`.
///
/// Written entity-index fastest, then component.
#[derive(Constructor, Deref, Into, Clone, Debug)]
pub struct EntityValues<'a>(ArrayView2<'a, f64>);

impl<'a> EntityValues<'a> {
    pub fn iter(&self) -> impl Iterator<Item = f64> + 'a {
        self.0.clone().reversed_axes().into_iter().copied()
    }
}

impl Array for EntityValues<'_> {
    fn precision(&self) -> Precision {
        Precision::Float32
    }

    fn length(&self) -> usize {
        self.0.len()
    }

    fn components(&self) -> usize {
        self.0.len_of(Axis(1))
    }

    fn write_binary(&self, writer: &mut dyn Write, order: ByteOrder) -> Result<(), Error> {
        for value in self.iter() {
            to_float32(value).write_bytes(writer, order)?;
        }
        Ok(())
    }
}

#[test]
fn iter_order() {
    let nx = 3;
    let ny = 2;
    let nz = 4;
    let nc = 2;

    let arr = ndarray::Array1::range(0., (nc * nx * ny * nz) as f64, 1.)
        .into_shape((nc, nx, ny, nz))
        .unwrap();

    let mut expected = Vec::new();

    for n in 0..nc {
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    expected.push(arr[[n, i, j, k]]);
                }
            }
        }
    }

    let actual = LatticeValues::new(arr.view()).iter().collect::<Vec<_>>();

    assert_eq!(expected, actual)
}

#[test]
fn entity_iter_order() {
    // three entities with two components each
    let arr = ndarray::arr2(&[[0., 10.], [1., 11.], [2., 12.]]);
    let actual = EntityValues::new(arr.view()).iter().collect::<Vec<_>>();

    assert_eq!(actual, vec![0., 1., 2., 10., 11., 12.]);
}
