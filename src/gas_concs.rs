//! The gas concentration container consumed by the radiative transfer code.
//!
//! [`GasConcs`] maps gas names to volume mixing ratios on a grid of atmospheric
//! columns and vertical levels. Each gas keeps the granularity it was given
//! (see [`VmrKind`]), and lookups always present a `(ncol, nlev)` view, so
//! a gas that is uniform in practice costs one value of storage while the
//! optics code still sees a full field.
use indexmap::IndexMap;
use ndarray::{s, Array2, ArrayView2};
use num_traits::Float;

use crate::error::{check_column_range, GasConcsError};
use crate::vmr::{VmrInput, VmrKind};

/// One stored gas. `data` is `(1, 1)` for scalars, `(ncol, 1)` for per-column
/// VMRs and `(ncol, nlev)` for full fields.
#[derive(Debug, Clone, PartialEq)]
struct StoredVmr<F> {
    kind: VmrKind,
    data: Array2<F>,
}

/// Volume mixing ratios for a set of gases over `ncol` columns and `nlev` levels.
///
/// The column and level counts are either given up front with [`GasConcs::with_dims`]
/// or learned from the first per-column or full-field insertion. Once known, they are
/// fixed: later insertions that disagree are rejected with [`GasConcsError::InvalidShape`].
///
/// Gas names are case-sensitive. Inserting a gas under a name that already exists
/// replaces the earlier VMR (last write wins), even if the granularity differs.
#[derive(Debug, Clone, PartialEq)]
pub struct GasConcs<F> {
    ncol: Option<usize>,
    nlev: Option<usize>,
    concs: IndexMap<String, StoredVmr<F>>,
}

impl<F> Default for GasConcs<F> {
    fn default() -> Self {
        Self { ncol: None, nlev: None, concs: IndexMap::new() }
    }
}

impl<F: Float> GasConcs<F> {
    /// Create an empty set with no column or level extent established yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set for `ncol` columns and `nlev` levels.
    ///
    /// # Returns
    /// An `Err` with [`GasConcsError::InvalidShape`] if either dimension is zero.
    pub fn with_dims(ncol: usize, nlev: usize) -> Result<Self, GasConcsError> {
        if ncol == 0 || nlev == 0 {
            return Err(GasConcsError::invalid_shape(format!(
                "gas concentrations need at least one column and level, got ({ncol}, {nlev})"
            )));
        }
        Ok(Self { ncol: Some(ncol), nlev: Some(nlev), concs: IndexMap::new() })
    }

    /// Construct a new set holding columns `[start, start+size)` of every gas in `source`.
    ///
    /// Full fields and per-column VMRs are sliced along the column axis; scalars are
    /// copied as-is since they do not depend on the column. The new set keeps the
    /// source's level count and gas order, and has `size` columns.
    ///
    /// If `source` never established a column count (it only holds scalars), any
    /// non-empty range is accepted and `start` is ignored.
    ///
    /// # Returns
    /// An `Err` with [`GasConcsError::OutOfRange`] if `size` is 0 or the range extends
    /// past the source's columns.
    pub fn from_column_range(source: &Self, start: usize, size: usize) -> Result<Self, GasConcsError> {
        let end = match source.ncol {
            Some(ncol) => check_column_range(start, size, ncol)?,
            // Only scalars so far, and those ignore the column range.
            None if size > 0 => start.saturating_add(size),
            None => return Err(GasConcsError::out_of_range(start, size, 0)),
        };

        let concs = source
            .concs
            .iter()
            .map(|(name, stored)| {
                let data = match stored.kind {
                    VmrKind::Scalar => stored.data.clone(),
                    VmrKind::PerColumn | VmrKind::Field => stored.data.slice(s![start..end, ..]).to_owned(),
                };
                (name.clone(), StoredVmr { kind: stored.kind, data })
            })
            .collect();

        Ok(Self { ncol: Some(size), nlev: source.nlev, concs })
    }

    /// Insert or replace the VMR for gas `name`.
    ///
    /// `data` may be a scalar, a per-column vector (`Array1`, `Vec` or slice), or a
    /// `(ncol, nlev)` field (`Array2`); see [`VmrInput`]. The data is copied into
    /// the set in its compact form.
    ///
    /// # Returns
    /// An `Err` if `name` is empty ([`GasConcsError::InvalidName`]) or if the data has
    /// a zero-length dimension or disagrees with the set's established column/level
    /// counts ([`GasConcsError::InvalidShape`]). On error the set is unchanged.
    pub fn set_vmr<S: Into<String>, V: Into<VmrInput<F>>>(&mut self, name: S, data: V) -> Result<(), GasConcsError> {
        let name = name.into();
        if name.is_empty() {
            return Err(GasConcsError::InvalidName);
        }

        let data = data.into();
        data.check_nonempty()?;
        let (ncol, nlev) = data.extent();
        let ncol = Self::reconcile_dim(&name, "columns", self.ncol, ncol)?;
        let nlev = Self::reconcile_dim(&name, "levels", self.nlev, nlev)?;

        let (kind, data) = data.into_compact();
        self.ncol = ncol;
        self.nlev = nlev;
        self.concs.insert(name, StoredVmr { kind, data });
        Ok(())
    }

    fn reconcile_dim(
        name: &str,
        dim: &str,
        current: Option<usize>,
        given: Option<usize>,
    ) -> Result<Option<usize>, GasConcsError> {
        match (current, given) {
            (Some(c), Some(g)) if c != g => Err(GasConcsError::invalid_shape(format!(
                "VMR for '{name}' has {g} {dim}, but the gas concentrations have {c}"
            ))),
            (Some(c), _) => Ok(Some(c)),
            (None, g) => Ok(g),
        }
    }

    /// Get the VMR for gas `name` as a `(ncol, nlev)` view.
    ///
    /// Scalar and per-column VMRs are broadcast without copying. If the set has not
    /// established its column or level count, that dimension has the length the
    /// gas was stored with (1 for a scalar). The view borrows the set, so it must be
    /// dropped before the set is modified again.
    ///
    /// # Returns
    /// An `Err` with [`GasConcsError::NotFound`] if no such gas was inserted.
    pub fn get_vmr(&self, name: &str) -> Result<ArrayView2<'_, F>, GasConcsError> {
        let stored = self.stored(name)?;
        let ncol = self.ncol.unwrap_or(stored.data.nrows());
        let nlev = self.nlev.unwrap_or(stored.data.ncols());
        Self::broadcast_stored(name, stored, ncol, nlev)
    }

    /// Get the VMR for gas `name` broadcast to an explicit `(ncol, nlev)` shape.
    ///
    /// This is how a caller that knows the level count can view a set that was
    /// only ever given scalars or per-column VMRs.
    ///
    /// # Returns
    /// An `Err` with [`GasConcsError::NotFound`] if no such gas was inserted, or
    /// [`GasConcsError::InvalidShape`] if the stored VMR cannot broadcast to that shape.
    pub fn broadcast_vmr(&self, name: &str, ncol: usize, nlev: usize) -> Result<ArrayView2<'_, F>, GasConcsError> {
        let stored = self.stored(name)?;
        Self::broadcast_stored(name, stored, ncol, nlev)
    }

    /// Like [`GasConcs::get_vmr`], but return an owned, fully materialized copy.
    pub fn vmr_owned(&self, name: &str) -> Result<Array2<F>, GasConcsError> {
        Ok(self.get_vmr(name)?.to_owned())
    }

    fn stored(&self, name: &str) -> Result<&StoredVmr<F>, GasConcsError> {
        self.concs.get(name).ok_or_else(|| GasConcsError::not_found(name))
    }

    fn broadcast_stored<'a>(
        name: &str,
        stored: &'a StoredVmr<F>,
        ncol: usize,
        nlev: usize,
    ) -> Result<ArrayView2<'a, F>, GasConcsError> {
        stored.data.broadcast((ncol, nlev)).ok_or_else(|| {
            GasConcsError::invalid_shape(format!(
                "{} VMR for '{name}' with stored shape {:?} cannot broadcast to ({ncol}, {nlev})",
                stored.kind,
                stored.data.dim()
            ))
        })
    }

    /// Check whether gas `name` has been inserted.
    pub fn exists(&self, name: &str) -> bool {
        self.concs.contains_key(name)
    }

    /// The granularity gas `name` was supplied at, or `None` if it is absent.
    pub fn kind(&self, name: &str) -> Option<VmrKind> {
        self.concs.get(name).map(|stored| stored.kind)
    }

    /// Number of columns, if established.
    pub fn ncol(&self) -> Option<usize> {
        self.ncol
    }

    /// Number of levels, if established.
    pub fn nlev(&self) -> Option<usize> {
        self.nlev
    }

    /// Number of gases in the set.
    pub fn len(&self) -> usize {
        self.concs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concs.is_empty()
    }

    /// Iterate over the gas names in insertion order.
    pub fn gas_names(&self) -> impl Iterator<Item = &str> {
        self.concs.keys().map(|k| k.as_str())
    }

    /// Iterate over each gas name and its VMR view (as from [`GasConcs::get_vmr`])
    /// in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ArrayView2<'_, F>)> {
        self.concs.iter().map(move |(name, stored)| {
            let ncol = self.ncol.unwrap_or(stored.data.nrows());
            let nlev = self.nlev.unwrap_or(stored.data.ncols());
            let vmr = stored
                .data
                .broadcast((ncol, nlev))
                .expect("set_vmr checks every gas against the set's extent, so stored VMRs always broadcast");
            (name.as_str(), vmr)
        })
    }

    /// Number of values actually stored for gas `name`, or `None` if it is absent.
    pub fn stored_len(&self, name: &str) -> Option<usize> {
        self.concs.get(name).map(|stored| stored.data.len())
    }
}
