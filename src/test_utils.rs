use ndarray::{Array1, Array2};

use crate::GasConcs;

/// A CO2 field whose values encode their column and level, so slices taken from
/// the wrong columns show up as mismatches.
pub(crate) fn co2_field(ncol: usize, nlev: usize) -> Array2<f64> {
    Array2::from_shape_fn((ncol, nlev), |(icol, ilev)| 4.0e-4 + 1e-6 * icol as f64 + 1e-9 * ilev as f64)
}

pub(crate) fn ch4_per_column(ncol: usize) -> Array1<f64> {
    Array1::from_shape_fn(ncol, |icol| 1.8e-6 + 1e-8 * icol as f64)
}

/// Ten columns and 50 levels holding one gas of each granularity:
/// "co2" as a full field, "n2" as a scalar, and "ch4" per column.
pub(crate) fn sample_concs() -> GasConcs<f64> {
    let mut concs = GasConcs::<f64>::new();
    concs.set_vmr("co2", co2_field(10, 50)).expect("co2 field should be accepted");
    concs.set_vmr("n2", 3.5e-4).expect("n2 scalar should be accepted");
    concs.set_vmr("ch4", ch4_per_column(10)).expect("ch4 per-column VMR should be accepted");
    concs
}
