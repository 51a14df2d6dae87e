//! Vertex reference trait for tetrahedral meshes.
//!
//! The mesh never stores coordinates. It only stores opaque vertex references, so
//! the same topology code works for indices into a point array, generational keys or any
//! other comparable, hashable token.

use std::{fmt::Debug, hash::Hash};

/// Trait alias for types usable as vertex references in a
/// [`TetrahedralMesh`](crate::core::tetrahedral_mesh::TetrahedralMesh).
///
/// # Required Traits
///
/// - `Copy`: references are passed and stored by value
/// - `Eq`: rotation-aware face equality compares references
/// - `Hash`: faces and tetrahedra are keys of hash-based registries
/// - `Debug`: used in validation error messages
///
/// # Usage
///
/// ```rust
/// use tetmesh::core::traits::VertexRef;
///
/// fn takes_vertex<V: VertexRef>(v: V) -> V {
///     v
/// }
///
/// assert_eq!(takes_vertex(3usize), 3);
/// assert_eq!(takes_vertex('x'), 'x');
/// ```
pub trait VertexRef: Copy + Eq + Hash + Debug {}

// Blanket implementation for all types that satisfy the bounds
impl<T> VertexRef for T where T: Copy + Eq + Hash + Debug {}
