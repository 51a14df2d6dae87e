use crate::core::tetrahedron::Tetrahedron;
use crate::core::triangle::Triangle;

use super::SmallBuffer;

// =============================================================================
// ALGORITHM-SPECIFIC BUFFER TYPES
// =============================================================================

/// Size constant for the tetrahedra touched by a single pentahedron flip.
/// A 2↔3 flip removes at most 3 and inserts at most 3 tetrahedra.
pub const FLIP_TETRAHEDRA_BUFFER_SIZE: usize = 3;

/// Size constant for the faces of the tetrahedra produced by one flip (3 × 4).
pub const FLIP_FACES_BUFFER_SIZE: usize = 12;

/// Size constant for the hull faces visible from a newly inserted point.
/// Lexicographically ordered input usually sees a handful of faces.
pub const VISIBLE_FACES_BUFFER_SIZE: usize = 16;

/// Tetrahedra removed or inserted by a pentahedron flip.
pub type FlipTetrahedraBuffer<V> = SmallBuffer<Tetrahedron<V>, FLIP_TETRAHEDRA_BUFFER_SIZE>;

/// Faces of the tetrahedra inserted by a pentahedron flip.
pub type FlipFacesBuffer<V> = SmallBuffer<Triangle<V>, FLIP_FACES_BUFFER_SIZE>;

/// Boundary faces visible from a point during hull extension.
///
/// # Optimization Rationale
///
/// - **Stack Allocation**: Up to 16 faces
/// - **Use Case**: Visibility scan of the incremental insertion
/// - **Typical Size**: 1-8 faces for sorted input
pub type VisibleFacesBuffer<V> = SmallBuffer<Triangle<V>, VISIBLE_FACES_BUFFER_SIZE>;
