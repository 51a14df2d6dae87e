//! Geometric utility functions.
//!
//! Circumsphere computations live in [`circumsphere`]; this module re-exports them
//! together with their error type.

use thiserror::Error;

pub mod circumsphere;

pub use circumsphere::{circumcenter, circumradius, circumradius_with_center};

/// Errors that can occur while computing a circumsphere.
///
/// # Examples
///
/// ```rust
/// use tetmesh::geometry::util::CircumcenterError;
///
/// let err = CircumcenterError::MatrixInversionFailed {
///     details: "singular".to_string(),
/// };
/// assert!(err.to_string().contains("singular"));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CircumcenterError {
    /// The bisector system is singular: the points are coplanar or coincident.
    #[error("Matrix inversion failed: {details}")]
    MatrixInversionFailed {
        /// Description of the failure.
        details: String,
    },
    /// The computation produced NaN or infinite values.
    #[error("Circumsphere computation produced non-finite values")]
    NonFiniteResult,
}
