//! Common errors across the gas-concs crate

/// Errors from inserting, looking up, or subsetting gas concentrations.
///
/// All of these indicate the caller broke the container's contract; none are
/// transient and the operation that returned one left its target unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GasConcsError {
    /// No gas with this name has been inserted.
    #[error("Gas '{0}' is not present in the gas concentrations")]
    NotFound(String),
    /// Gas names must be non-empty.
    #[error("Gas names must be non-empty strings")]
    InvalidName,
    /// The VMR data was ragged, had a zero-length dimension, or disagreed with
    /// the column/level extent already established for the set.
    #[error("Invalid VMR shape: {0}")]
    InvalidShape(String),
    /// A column range was empty or extended past the source's columns.
    #[error("Column range starting at {start} with size {size} is outside the {ncol} available columns")]
    OutOfRange { start: usize, size: usize, ncol: usize },
    /// The number of columns or levels was never established for this set.
    #[error("The {0} extent of the gas concentrations is unknown")]
    UnknownExtent(&'static str),
}

impl GasConcsError {
    pub(crate) fn not_found<S: ToString>(gas: S) -> Self {
        Self::NotFound(gas.to_string())
    }

    pub(crate) fn invalid_shape<S: ToString>(cause: S) -> Self {
        Self::InvalidShape(cause.to_string())
    }

    pub(crate) fn out_of_range(start: usize, size: usize, ncol: usize) -> Self {
        Self::OutOfRange { start, size, ncol }
    }
}

/// Check that `[start, start+size)` is a non-empty range inside `ncol` columns.
pub(crate) fn check_column_range(start: usize, size: usize, ncol: usize) -> Result<usize, GasConcsError> {
    match start.checked_add(size) {
        Some(end) if size > 0 && end <= ncol => Ok(end),
        _ => Err(GasConcsError::out_of_range(start, size, ncol)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_range_checks() {
        assert_eq!(check_column_range(3, 4, 10), Ok(7));
        assert_eq!(check_column_range(0, 10, 10), Ok(10));
        assert_eq!(check_column_range(8, 5, 10), Err(GasConcsError::out_of_range(8, 5, 10)));
        assert_eq!(check_column_range(2, 0, 10), Err(GasConcsError::out_of_range(2, 0, 10)));
        assert!(check_column_range(usize::MAX, 2, 10).is_err());
    }

    #[test]
    fn test_error_messages() {
        let msg = GasConcsError::not_found("o3").to_string();
        assert!(msg.contains("'o3'"), "message should name the missing gas: {msg}");
        let msg = GasConcsError::out_of_range(8, 5, 10).to_string();
        assert!(msg.contains("10 available columns"), "message should give the column count: {msg}");
    }
}
