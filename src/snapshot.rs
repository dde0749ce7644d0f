//! Read-only, fully materialized copies of gas concentrations.
//!
//! A [`GasConcsSnapshot`] is what gets handed to code that needs every gas as a
//! dense, contiguous `(ncol, nlev)` buffer, e.g. to upload to an accelerator.
//! It is built once from a populated [`GasConcs`] and cannot be modified
//! afterwards, only subset by column range.
use approx::AbsDiffEq;
use indexmap::IndexMap;
use log::debug;
use ndarray::{s, Array2};
use num_traits::Float;

use crate::error::{check_column_range, GasConcsError};
use crate::gas_concs::GasConcs;

#[derive(Debug, Clone, PartialEq)]
pub struct GasConcsSnapshot<F> {
    ncol: usize,
    nlev: usize,
    concs: IndexMap<String, Array2<F>>,
}

impl<F: Float> GasConcsSnapshot<F> {
    /// Materialize every gas in `source` to a standard-layout `(ncol, nlev)` array.
    ///
    /// # Returns
    /// An `Err` with [`GasConcsError::UnknownExtent`] if `source` has not established
    /// both its column and level counts.
    pub fn from_gas_concs(source: &GasConcs<F>) -> Result<Self, GasConcsError> {
        let ncol = source.ncol().ok_or(GasConcsError::UnknownExtent("column"))?;
        let nlev = source.nlev().ok_or(GasConcsError::UnknownExtent("level"))?;
        let concs = source
            .iter()
            .map(|(name, vmr)| (name.to_string(), vmr.as_standard_layout().into_owned()))
            .collect();
        Ok(Self { ncol, nlev, concs })
    }

    /// Construct a snapshot of columns `[start, start+size)` of `source`, with the
    /// same rules as [`GasConcs::from_column_range`].
    pub fn from_column_range(source: &Self, start: usize, size: usize) -> Result<Self, GasConcsError> {
        let end = check_column_range(start, size, source.ncol)?;
        let concs = source
            .concs
            .iter()
            .map(|(name, arr)| (name.clone(), arr.slice(s![start..end, ..]).to_owned()))
            .collect();
        Ok(Self { ncol: size, nlev: source.nlev, concs })
    }

    pub fn get_vmr(&self, name: &str) -> Result<&Array2<F>, GasConcsError> {
        self.concs.get(name).ok_or_else(|| GasConcsError::not_found(name))
    }

    /// The VMR for gas `name` as a flat, row-major slice of `ncol * nlev` values.
    pub fn as_slice(&self, name: &str) -> Result<&[F], GasConcsError> {
        self.get_vmr(name)?
            .as_slice()
            .ok_or_else(|| GasConcsError::invalid_shape(format!("VMR for '{name}' is not contiguous")))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.concs.contains_key(name)
    }

    pub fn ncol(&self) -> usize {
        self.ncol
    }

    pub fn nlev(&self) -> usize {
        self.nlev
    }

    pub fn len(&self) -> usize {
        self.concs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concs.is_empty()
    }

    pub fn gas_names(&self) -> impl Iterator<Item = &str> {
        self.concs.keys().map(|k| k.as_str())
    }
}

impl<F: Float> TryFrom<&GasConcs<F>> for GasConcsSnapshot<F> {
    type Error = GasConcsError;

    fn try_from(value: &GasConcs<F>) -> Result<Self, Self::Error> {
        Self::from_gas_concs(value)
    }
}

impl<F> AbsDiffEq for GasConcsSnapshot<F>
where
    F: Float + AbsDiffEq<Epsilon = F>,
{
    type Epsilon = F;

    fn default_epsilon() -> Self::Epsilon {
        F::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        if self.ncol != other.ncol || self.nlev != other.nlev {
            debug!("snapshot shapes differ");
            return false;
        }
        if self.concs.len() != other.concs.len() {
            debug!("snapshots have different numbers of gases");
            return false;
        }

        for (name, arr) in self.concs.iter() {
            let Some(other_arr) = other.concs.get(name) else {
                debug!("RHS is missing gas {name}");
                return false;
            };
            if !arr.abs_diff_eq(other_arr, epsilon) {
                debug!("VMRs for {name} differ");
                return false;
            }
        }
        true
    }
}
