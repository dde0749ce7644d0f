//! Gas concentration storage for radiative transfer calculations.
//!
//! The central type is [`GasConcs`], which stores each gas's volume mixing ratio
//! as a scalar, per-column vector, or full column-by-level field and always hands
//! back a full `(ncol, nlev)` view. See [`tiling`] for splitting a domain into
//! column chunks and [`snapshot`] for dense read-only copies.
pub mod error;
pub mod vmr;
pub mod gas_concs;
pub mod snapshot;
pub mod tiling;
pub mod config;
#[cfg(test)]
pub(crate) mod test_utils;

pub use error::GasConcsError;
pub use gas_concs::GasConcs;
pub use snapshot::GasConcsSnapshot;
pub use vmr::{VmrInput, VmrKind};

/// Floating point type used throughout a build, selected with the
/// `single-precision` feature.
#[cfg(feature = "single-precision")]
pub type Real = f32;
#[cfg(not(feature = "single-precision"))]
pub type Real = f64;

pub type DefaultGasConcs = GasConcs<Real>;
