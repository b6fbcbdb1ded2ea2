use num_complex::Complex64;
use rayon::prelude::*;
use std::ops::{Div, Sub};
use tracing::debug;

use crate::grid::{CellBlock, CellId, Interpolation};
use crate::parameter::SimulationParameter;
use crate::transducer::Transducer;
use crate::vec3::Vec3;

/// Centered difference `(rhs - lhs) / (2·dist)`, second-order accurate.
/// `lhs` and `rhs` are the samples one cell below and above the midpoint.
fn central_difference<T>(lhs: T, rhs: T, dist: f64) -> T
where
    T: Sub<Output = T> + Div<f64, Output = T>,
{
    (rhs - lhs) / (dist * 2.0)
}

/// The three nested sampling lattices of one job.
///
/// The potential stage takes centered differences on the pressure grid and
/// the force stage takes centered differences on the potential grid, so each
/// upstream grid carries one extra cell of halo on every face:
///
/// - force:     `N + 1` cells per axis over the user's sampling region
/// - potential: force + 2, shifted out by one cell
/// - pressure:  potential + 2, shifted out by one more cell
///
/// where `N = ceil(|end - begin| / cell_size)` componentwise. All three
/// grids share `cell_size` and sit on a common lattice; a point with index
/// `v` on one grid has index `v + 1` on the grid enclosing it.
pub struct GridLayout {
    pub pressure: Interpolation,
    pub potential: Interpolation,
    pub force: Interpolation,
}

impl GridLayout {
    pub fn from_parameter(parameter: &SimulationParameter) -> Self {
        let cell_size = parameter.cell_size;

        let span = (parameter.end - parameter.begin).elem_abs() / cell_size;
        let force_count = span.elem_ceil().cast_usize() + 1;
        let force_begin = parameter.begin;
        let force_end = force_begin + force_count.cast_f64() * cell_size;

        let potential_count = force_count + 2;
        let potential_begin = force_begin - cell_size;
        let potential_end = force_end + cell_size;

        let pressure_count = potential_count + 2;
        let pressure_begin = potential_begin - cell_size;
        let pressure_end = potential_end + cell_size;

        Self {
            pressure: Interpolation::new(pressure_count, pressure_begin, pressure_end),
            potential: Interpolation::new(potential_count, potential_begin, potential_end),
            force: Interpolation::new(force_count, force_begin, force_end),
        }
    }
}

/// Superpose the complex pressure of every transducer at every pressure-grid
/// cell.
///
/// Cells are evaluated data-parallel; within one cell the transducer
/// contributions are summed in list order. Floating-point addition is not
/// associative, so the summation order is part of the contract and parallel
/// runs stay bit-identical to a sequential reference.
pub fn compute_pressure(
    transducers: &[Transducer],
    parameter: &SimulationParameter,
    interpolation: &Interpolation,
) -> CellBlock<Complex64> {
    debug!(cells = interpolation.get_cell_count(), "pressure stage");

    let mut block = CellBlock::new(interpolation.dimension_size());
    block
        .as_mut_slice()
        .par_iter_mut()
        .enumerate()
        .for_each(|(id, cell)| {
            let point = interpolation.get_real_vec(CellId(id));
            *cell = transducers
                .iter()
                .fold(Complex64::new(0.0, 0.0), |sum, transducer| {
                    sum + transducer.pressure_at(point, parameter)
                });
        });
    block
}

/// Derive the Gor'kov potential from the pressure field:
/// `U = 2·k1·|p|² − 2·k2·(|∂x p|² + |∂y p|² + |∂z p|²)`.
///
/// The potential grid is inset by one cell, so potential index `v` sits at
/// pressure index `v + 1` and its axis neighbors at `v` and `v + 2`.
pub fn compute_potential(
    pressure: &CellBlock<Complex64>,
    pressure_interpolation: &Interpolation,
    potential_interpolation: &Interpolation,
    parameter: &SimulationParameter,
) -> CellBlock<f64> {
    debug!(
        cells = potential_interpolation.get_cell_count(),
        "potential stage"
    );

    let cell_size = parameter.cell_size;
    let k1 = parameter.k1();
    let k2 = parameter.k2();

    let at = |vec: Vec3<usize>| pressure.get_cell(pressure_interpolation.get_id(vec));

    let mut block = CellBlock::new(potential_interpolation.dimension_size());
    block
        .as_mut_slice()
        .par_iter_mut()
        .enumerate()
        .for_each(|(id, cell)| {
            let lhs = potential_interpolation.get_int_vec(CellId(id));
            let mid = lhs + 1;
            let rhs = lhs + 2;

            let p = at(mid).norm_sqr();

            let p_x = central_difference(
                at(Vec3::new(lhs.x, mid.y, mid.z)),
                at(Vec3::new(rhs.x, mid.y, mid.z)),
                cell_size,
            )
            .norm_sqr();
            let p_y = central_difference(
                at(Vec3::new(mid.x, lhs.y, mid.z)),
                at(Vec3::new(mid.x, rhs.y, mid.z)),
                cell_size,
            )
            .norm_sqr();
            let p_z = central_difference(
                at(Vec3::new(mid.x, mid.y, lhs.z)),
                at(Vec3::new(mid.x, mid.y, rhs.z)),
                cell_size,
            )
            .norm_sqr();

            *cell = 2.0 * k1 * p - 2.0 * k2 * (p_x + p_y + p_z);
        });
    block
}

/// The three cartesian components of the radiation force, each on the force
/// grid.
pub struct ForceField {
    pub x: CellBlock<f64>,
    pub y: CellBlock<f64>,
    pub z: CellBlock<f64>,
}

/// Derive the radiation force `F = −∇U` from the potential field by
/// centered differences, one cell further in than the potential grid.
pub fn compute_force(
    potential: &CellBlock<f64>,
    potential_interpolation: &Interpolation,
    force_interpolation: &Interpolation,
    parameter: &SimulationParameter,
) -> ForceField {
    debug!(cells = force_interpolation.get_cell_count(), "force stage");

    let cell_size = parameter.cell_size;
    let at = |vec: Vec3<usize>| potential.get_cell(potential_interpolation.get_id(vec));

    let dimension_size = force_interpolation.dimension_size();
    let mut x_block = CellBlock::new(dimension_size);
    let mut y_block = CellBlock::new(dimension_size);
    let mut z_block = CellBlock::new(dimension_size);

    x_block
        .as_mut_slice()
        .par_iter_mut()
        .zip_eq(y_block.as_mut_slice().par_iter_mut())
        .zip_eq(z_block.as_mut_slice().par_iter_mut())
        .enumerate()
        .for_each(|(id, ((f_x, f_y), f_z))| {
            let lhs = force_interpolation.get_int_vec(CellId(id));
            let mid = lhs + 1;
            let rhs = lhs + 2;

            *f_x = -central_difference(
                at(Vec3::new(lhs.x, mid.y, mid.z)),
                at(Vec3::new(rhs.x, mid.y, mid.z)),
                cell_size,
            );
            *f_y = -central_difference(
                at(Vec3::new(mid.x, lhs.y, mid.z)),
                at(Vec3::new(mid.x, rhs.y, mid.z)),
                cell_size,
            );
            *f_z = -central_difference(
                at(Vec3::new(mid.x, mid.y, lhs.z)),
                at(Vec3::new(mid.x, mid.y, rhs.z)),
                cell_size,
            );
        });

    ForceField {
        x: x_block,
        y: y_block,
        z: z_block,
    }
}
