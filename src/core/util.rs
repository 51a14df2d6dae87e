//! General helper utilities: simplex hashing and Delaunay validation.

pub mod delaunay_validation;
pub mod hashing;

pub use delaunay_validation::{DelaunayValidationError, find_delaunay_violations, validate_delaunay};
pub use hashing::{oriented_hash, stable_hash_u64_slice, vertex_hash};
