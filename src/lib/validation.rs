//! Input validation utilities
//!
//! Checks for command-line parameters and input paths, reporting failures as
//! [`PipelineError::InvalidParameter`] with consistent messages.

use std::fmt::Display;
use std::path::Path;

use crate::errors::{PipelineError, Result};

/// Validate that a file exists
///
/// # Errors
/// Returns an error if the path does not exist
///
/// # Example
/// ```
/// use fqpipe_lib::validation::validate_file_exists;
///
/// let result = validate_file_exists("/nonexistent/reads.fq.gz", "Input file");
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(PipelineError::invalid_parameter(
            description,
            format!("File does not exist: {}", path_ref.display()),
        ));
    }
    Ok(())
}

/// Validate that a value is positive (> 0)
///
/// # Errors
/// Returns an error if the value is not positive
///
/// # Example
/// ```
/// use fqpipe_lib::validation::validate_positive;
///
/// validate_positive(32, "batch-size").unwrap();
/// assert!(validate_positive(0, "batch-size").is_err());
/// ```
#[allow(clippy::needless_pass_by_value)]
pub fn validate_positive<T: Ord + Display + Default>(value: T, name: &str) -> Result<()> {
    if value <= T::default() {
        return Err(PipelineError::invalid_parameter(name, format!("Must be positive (> 0), got: {value}")));
    }
    Ok(())
}

/// Validate that a value is at least `min`
///
/// # Errors
/// Returns an error if `value < min`
#[allow(clippy::needless_pass_by_value)]
pub fn validate_at_least<T: Ord + Display>(value: T, min: T, name: &str) -> Result<()> {
    if value < min {
        return Err(PipelineError::invalid_parameter(name, format!("Must be >= {min}, got: {value}")));
    }
    Ok(())
}

/// Multiply slot-count factors, failing instead of overflowing.
///
/// # Errors
/// Returns an error naming `name` if the product does not fit in `usize`
pub fn checked_product(factors: &[usize], name: &str) -> Result<usize> {
    factors.iter().try_fold(1_usize, |acc, &f| acc.checked_mul(f)).ok_or_else(|| {
        PipelineError::invalid_parameter(name, format!("Product of {factors:?} overflows"))
    })
}
