//! Splitting gas concentrations into contiguous column tiles.
//!
//! Large domains are processed in chunks of columns, either to bound memory or to
//! spread the work over threads. The [`ColumnSubset`] trait lets the same
//! decomposition code run on a [`GasConcs`] or a [`GasConcsSnapshot`].
use std::fmt::Display;

use error_stack::ResultExt;
use num_traits::Float;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::GasConcsError;
use crate::gas_concs::GasConcs;
use crate::snapshot::GasConcsSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum TilingError {
    #[error("Tile size must be at least 1 column")]
    ZeroTileSize,
    #[error("Cannot tile gas concentrations without a known number of columns")]
    UnknownColumns,
    #[error("Could not extract columns {0}")]
    Extraction(ColumnRange),
    #[error("Processing columns {0} failed")]
    TileFailed(ColumnRange),
}

/// A contiguous range of `size` columns beginning at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRange {
    pub start: usize,
    pub size: usize,
}

impl ColumnRange {
    pub fn new(start: usize, size: usize) -> Self {
        Self { start, size }
    }

    /// One past the last column in the range, saturating at `usize::MAX`.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.size)
    }
}

impl Display for ColumnRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// Containers that can be restricted to a range of their columns.
pub trait ColumnSubset: Sized {
    /// Number of columns, if known.
    fn column_extent(&self) -> Option<usize>;

    /// A new container holding only the columns in `range`.
    fn column_subset(&self, range: ColumnRange) -> Result<Self, GasConcsError>;
}

impl<F: Float> ColumnSubset for GasConcs<F> {
    fn column_extent(&self) -> Option<usize> {
        self.ncol()
    }

    fn column_subset(&self, range: ColumnRange) -> Result<Self, GasConcsError> {
        GasConcs::from_column_range(self, range.start, range.size)
    }
}

impl<F: Float> ColumnSubset for GasConcsSnapshot<F> {
    fn column_extent(&self) -> Option<usize> {
        Some(self.ncol())
    }

    fn column_subset(&self, range: ColumnRange) -> Result<Self, GasConcsError> {
        GasConcsSnapshot::from_column_range(self, range.start, range.size)
    }
}

/// Iterator over the tiles produced by [`column_tiles`].
#[derive(Debug, Clone)]
pub struct ColumnTiles {
    ncol: usize,
    tile_size: usize,
    next_start: usize,
}

impl Iterator for ColumnTiles {
    type Item = ColumnRange;

    fn next(&mut self) -> Option<Self::Item> {
        if self.tile_size == 0 || self.next_start >= self.ncol {
            return None;
        }
        let size = self.tile_size.min(self.ncol - self.next_start);
        let range = ColumnRange::new(self.next_start, size);
        self.next_start += size;
        Some(range)
    }
}

/// Cover columns `[0, ncol)` with consecutive tiles of `tile_size` columns.
///
/// The last tile is shorter if `tile_size` does not divide `ncol`. A `tile_size`
/// of 0 yields no tiles.
pub fn column_tiles(ncol: usize, tile_size: usize) -> ColumnTiles {
    ColumnTiles { ncol, tile_size, next_start: 0 }
}

fn tile_ranges<S: ColumnSubset>(source: &S, tile_size: usize) -> error_stack::Result<Vec<ColumnRange>, TilingError> {
    if tile_size == 0 {
        return Err(TilingError::ZeroTileSize.into());
    }
    let ncol = source.column_extent().ok_or(TilingError::UnknownColumns)?;
    let ranges: Vec<_> = column_tiles(ncol, tile_size).collect();
    log::debug!("Splitting {ncol} columns into {} tiles of up to {tile_size} columns", ranges.len());
    Ok(ranges)
}

/// Extract every tile of `source`, in column order.
pub fn split_columns<S: ColumnSubset>(
    source: &S,
    tile_size: usize,
) -> error_stack::Result<Vec<(ColumnRange, S)>, TilingError> {
    tile_ranges(source, tile_size)?
        .into_iter()
        .map(|range| -> error_stack::Result<_, TilingError> {
            let tile = source.column_subset(range).change_context(TilingError::Extraction(range))?;
            Ok((range, tile))
        })
        .collect()
}

/// Extract each tile of `source` and run `f` on it in parallel.
///
/// Results come back in column order. If any tile fails, one of the failures is
/// returned with the tile's column range attached.
pub fn par_map_tiles<S, T, C, Func>(
    source: &S,
    tile_size: usize,
    f: Func,
) -> error_stack::Result<Vec<T>, TilingError>
where
    S: ColumnSubset + Sync,
    T: Send,
    C: error_stack::Context,
    Func: Fn(ColumnRange, S) -> error_stack::Result<T, C> + Sync,
{
    let ranges = tile_ranges(source, tile_size)?;
    ranges
        .into_par_iter()
        .map(|range| {
            let tile = source.column_subset(range).change_context(TilingError::Extraction(range))?;
            f(range, tile).change_context(TilingError::TileFailed(range))
        })
        .collect()
}
