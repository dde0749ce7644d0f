//! Volume mixing ratio inputs at the three supported granularities.
//!
//! A gas's VMR can be given as one value for the whole domain, one value per
//! column (constant in the vertical), or a full column-by-level field. The
//! [`VmrInput`] enum carries whichever of these the caller has, and
//! [`GasConcs::set_vmr`](crate::GasConcs::set_vmr) accepts anything that
//! converts into it, so the call site reads the same for all three:
//!
//! ```
//! use gas_concs::GasConcs;
//! use ndarray::{array, Array2};
//!
//! let mut concs = GasConcs::<f64>::new();
//! concs.set_vmr("n2", 0.781).unwrap();
//! concs.set_vmr("co2", array![4.1e-4, 4.2e-4, 4.0e-4]).unwrap();
//! concs.set_vmr("h2o", Array2::from_elem((3, 5), 1e-3)).unwrap();
//! ```
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::fmt::Display;

use crate::error::GasConcsError;

/// Which granularity a gas's VMR was supplied at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VmrKind {
    /// One value for every column and level
    Scalar,
    /// One value per column, constant across levels
    PerColumn,
    /// A value for every column and level
    Field,
}

impl Display for VmrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VmrKind::Scalar => "scalar",
            VmrKind::PerColumn => "per-column",
            VmrKind::Field => "full field",
        };
        write!(f, "{s}")
    }
}

/// VMR data for one gas, in one of the three accepted shapes.
///
/// Per-column data is indexed by column; a full field has shape
/// `(ncol, nlev)`, i.e. rows are columns and the second axis is the level.
#[derive(Debug, Clone, PartialEq)]
pub enum VmrInput<F> {
    Scalar(F),
    PerColumn(Array1<F>),
    Field(Array2<F>),
}

impl<F> VmrInput<F> {
    pub fn kind(&self) -> VmrKind {
        match self {
            VmrInput::Scalar(_) => VmrKind::Scalar,
            VmrInput::PerColumn(_) => VmrKind::PerColumn,
            VmrInput::Field(_) => VmrKind::Field,
        }
    }

    /// The (columns, levels) extent this input pins down. `None` means the
    /// input says nothing about that dimension.
    pub fn extent(&self) -> (Option<usize>, Option<usize>) {
        match self {
            VmrInput::Scalar(_) => (None, None),
            VmrInput::PerColumn(v) => (Some(v.len()), None),
            VmrInput::Field(a) => (Some(a.nrows()), Some(a.ncols())),
        }
    }

    /// Reject inputs with a zero-length dimension.
    pub(crate) fn check_nonempty(&self) -> Result<(), GasConcsError> {
        match self {
            VmrInput::Scalar(_) => Ok(()),
            VmrInput::PerColumn(v) if v.is_empty() => {
                Err(GasConcsError::invalid_shape("per-column VMR must have at least one column"))
            }
            VmrInput::Field(a) if a.nrows() == 0 || a.ncols() == 0 => Err(GasConcsError::invalid_shape(format!(
                "VMR field must have at least one column and level, got shape ({}, {})",
                a.nrows(),
                a.ncols()
            ))),
            _ => Ok(()),
        }
    }
}

impl<F: Clone> VmrInput<F> {
    /// Convert into the compact 2D storage form: scalars become `(1, 1)` and
    /// per-column vectors `(ncol, 1)`, so that both broadcast to the full shape.
    pub(crate) fn into_compact(self) -> (VmrKind, Array2<F>) {
        let kind = self.kind();
        let arr = match self {
            VmrInput::Scalar(v) => Array2::from_elem((1, 1), v),
            VmrInput::PerColumn(v) => v.insert_axis(Axis(1)),
            VmrInput::Field(a) => a,
        };
        (kind, arr)
    }

    /// Build a full field from nested rows, one inner `Vec` per column.
    ///
    /// # Returns
    /// An `Err` with [`GasConcsError::InvalidShape`] if there are no rows, the
    /// rows are empty, or the rows have different lengths.
    pub fn from_rows(rows: Vec<Vec<F>>) -> Result<Self, GasConcsError> {
        let ncol = rows.len();
        let nlev = rows.first().map(|r| r.len()).unwrap_or(0);
        if ncol == 0 || nlev == 0 {
            return Err(GasConcsError::invalid_shape("VMR rows must contain at least one column and level"));
        }

        if let Some((icol, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != nlev) {
            return Err(GasConcsError::invalid_shape(format!(
                "ragged VMR rows: column {icol} has {} levels, column 0 has {nlev}",
                row.len()
            )));
        }

        let flat: Vec<F> = rows.into_iter().flatten().collect();
        let arr = Array2::from_shape_vec((ncol, nlev), flat)
            .map_err(|e| GasConcsError::invalid_shape(e.to_string()))?;
        Ok(Self::Field(arr))
    }
}

macro_rules! scalar_vmr_input {
    ($($t:ty),*) => {
        $(
            impl From<$t> for VmrInput<$t> {
                fn from(value: $t) -> Self {
                    Self::Scalar(value)
                }
            }
        )*
    };
}

scalar_vmr_input!(f32, f64);

impl<F> From<Array1<F>> for VmrInput<F> {
    fn from(value: Array1<F>) -> Self {
        Self::PerColumn(value)
    }
}

impl<F: Clone> From<ArrayView1<'_, F>> for VmrInput<F> {
    fn from(value: ArrayView1<'_, F>) -> Self {
        Self::PerColumn(value.to_owned())
    }
}

impl<F> From<Vec<F>> for VmrInput<F> {
    fn from(value: Vec<F>) -> Self {
        Self::PerColumn(Array1::from_vec(value))
    }
}

impl<F: Clone> From<&[F]> for VmrInput<F> {
    fn from(value: &[F]) -> Self {
        Self::PerColumn(Array1::from_vec(value.to_vec()))
    }
}

impl<F> From<Array2<F>> for VmrInput<F> {
    fn from(value: Array2<F>) -> Self {
        Self::Field(value)
    }
}

impl<F: Clone> From<ArrayView2<'_, F>> for VmrInput<F> {
    fn from(value: ArrayView2<'_, F>) -> Self {
        Self::Field(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_conversions_pick_kind() {
        assert_eq!(VmrInput::from(3.5e-4_f64).kind(), VmrKind::Scalar);
        assert_eq!(VmrInput::from(vec![1.0_f32, 2.0]).kind(), VmrKind::PerColumn);
        assert_eq!(VmrInput::from(array![1.0, 2.0, 3.0]).kind(), VmrKind::PerColumn);
        assert_eq!(VmrInput::from(array![[1.0, 2.0], [3.0, 4.0]]).kind(), VmrKind::Field);

        let field = array![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(VmrInput::from(field.view()).kind(), VmrKind::Field);
        assert_eq!(VmrInput::from(field.row(0)).kind(), VmrKind::PerColumn);
    }

    #[test]
    fn test_compact_shapes() {
        let (kind, arr) = VmrInput::from(2.0_f64).into_compact();
        assert_eq!(kind, VmrKind::Scalar);
        assert_eq!(arr.dim(), (1, 1));

        let (kind, arr) = VmrInput::from(array![1.0, 2.0, 3.0]).into_compact();
        assert_eq!(kind, VmrKind::PerColumn);
        assert_eq!(arr, array![[1.0], [2.0], [3.0]]);

        let (_, arr) = VmrInput::from(array![[1.0, 2.0, 3.0]]).into_compact();
        assert_eq!(arr.dim(), (1, 3));
    }

    #[test]
    fn test_from_rows() {
        let inp = VmrInput::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(inp, VmrInput::Field(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]));
    }

    #[test]
    fn test_from_rows_rejects_bad_shapes() {
        let err = VmrInput::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, GasConcsError::InvalidShape(_)), "expected InvalidShape, got {err:?}");

        let err = VmrInput::<f64>::from_rows(vec![]).unwrap_err();
        assert!(matches!(err, GasConcsError::InvalidShape(_)), "expected InvalidShape, got {err:?}");

        let err = VmrInput::<f64>::from_rows(vec![vec![], vec![]]).unwrap_err();
        assert!(matches!(err, GasConcsError::InvalidShape(_)), "expected InvalidShape, got {err:?}");
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(VmrInput::PerColumn(Array1::<f64>::zeros(0)).check_nonempty().is_err());
        assert!(VmrInput::Field(Array2::<f64>::zeros((3, 0))).check_nonempty().is_err());
        assert!(VmrInput::Field(Array2::<f64>::zeros((0, 3))).check_nonempty().is_err());
        assert!(VmrInput::Scalar(0.0_f64).check_nonempty().is_ok());
    }

    #[test]
    fn test_extent() {
        assert_eq!(VmrInput::from(1.0_f64).extent(), (None, None));
        assert_eq!(VmrInput::from(vec![1.0_f64; 4]).extent(), (Some(4), None));
        assert_eq!(VmrInput::Field(Array2::<f64>::zeros((4, 7))).extent(), (Some(4), Some(7)));
    }
}
