//! # tetmesh
//!
//! Incremental 3D Delaunay tetrahedralization built on a tetrahedral mesh that keeps every
//! face classified as *boundary* (one owner) or *interior* (two owners), maintained by
//! local 2→3 and 3→2 bistellar flips.
//!
//! # Features
//!
//! - [`TetrahedralMesh`](core::tetrahedral_mesh::TetrahedralMesh): a set of oriented
//!   tetrahedra over arbitrary vertex handles with O(1) face-to-owner lookup, transactional
//!   pentahedron split / merge, and a structural validator
//! - Orientation-aware [`Triangle`](core::triangle::Triangle) and
//!   [`Tetrahedron`](core::tetrahedron::Tetrahedron) value types: equal under rotations and
//!   even permutations, distinct from their reflections
//! - [`DelaunayIncrementer`](core::algorithms::incremental_insertion::DelaunayIncrementer):
//!   point-by-point insertion with a bounded flip worklist and insertion statistics
//! - [`DelaunayTriangulation`](core::delaunay_triangulation::DelaunayTriangulation): sorts
//!   arbitrary input, tetrahedralizes it and validates the empty-circumsphere property
//! - Serialization/Deserialization of meshes with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use tetmesh::prelude::*;
//!
//! let points = vec![
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0],
//!     [1.0, 1.0, 1.0],
//!     [0.3, 0.2, 0.25],
//! ];
//!
//! let dt = DelaunayTriangulation::new(&points).unwrap();
//! assert_eq!(dt.number_of_vertices(), 6);
//! assert!(dt.is_valid());
//! assert!(dt.validate_delaunay().is_ok());
//! ```
//!
//! Points are inserted in lexicographic order, so every new point lies outside the hull
//! built so far and is glued onto the hull faces it sees. Coincident points are skipped
//! and reported in [`InsertionStatistics::points_skipped`](core::algorithms::incremental_insertion::InsertionStatistics::points_skipped).
//!
//! # Working with the mesh directly
//!
//! ```rust
//! use tetmesh::prelude::*;
//!
//! let base = Triangle::new(0, 1, 2);
//! let lower = Tetrahedron::from_apex_and_base(3, base);
//! let upper = Tetrahedron::from_apex_and_base(4, base.flip());
//!
//! let mut mesh = TetrahedralMesh::new();
//! assert!(mesh.add(lower));
//! assert!(mesh.add(upper));
//! assert_eq!(mesh.interior_face_count(), 1);
//!
//! // 2 tetrahedra sharing a face -> 3 tetrahedra sharing the edge (3, 4)
//! assert!(mesh.split_pentahedron(lower, upper));
//! assert_eq!(mesh.len(), 3);
//! assert!(mesh.is_valid());
//! ```
//!
//! # Numerical model
//!
//! All predicates evaluate in `f64`. The in-sphere test uses a relative tolerance, so
//! cospherical configurations (for example the corners of a cube) never flip. There is no
//! exact-arithmetic fallback.

#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module contains the mesh, its simplices and the Delaunay algorithms.
pub mod core {
    /// Mesh construction and maintenance algorithms
    pub mod algorithms {
        /// Pentahedron flips and the repair worklist
        pub mod flips;
        /// Point-by-point Delaunay insertion
        pub mod incremental_insertion;
    }
    /// Hash collection aliases and stack buffers
    pub mod collections;
    /// Sorting facade over the incrementer
    pub mod delaunay_triangulation;
    pub mod tetrahedral_mesh;
    pub mod tetrahedron;
    pub mod triangle;
    pub mod util;
    /// Traits for vertex handles.
    pub mod traits {
        pub mod vertex_ref;
        pub use vertex_ref::*;
    }
    // Re-export the `core` modules.
    pub use delaunay_triangulation::*;
    pub use tetrahedral_mesh::*;
    pub use tetrahedron::*;
    pub use traits::*;
    pub use triangle::*;
    pub use util::*;
    // Note: collections module not re-exported here to avoid namespace pollution
}

/// Contains point storage, orientation / in-sphere predicates and circumsphere helpers.
pub mod geometry {
    pub mod point;
    pub mod predicates;
    /// Circumsphere computations
    pub mod util;
    pub use point::*;
    pub use predicates::*;
    pub use util::*;
}

/// A prelude module that re-exports commonly used types.
pub mod prelude {
    pub use crate::core::algorithms::flips::{FlipKind, RepairQueueOrder};
    pub use crate::core::algorithms::incremental_insertion::{
        DelaunayError, DelaunayIncrementer, IncrementerConfig, IncrementerConfigBuilder,
        InsertionStatistics, tetrahedralize,
    };
    pub use crate::core::{
        delaunay_triangulation::*, tetrahedral_mesh::*, tetrahedron::*, traits::*, triangle::*,
        util::*,
    };

    // Re-export commonly used collection types from core::collections
    pub use crate::core::collections::{
        FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };

    pub use crate::geometry::{point::*, predicates::*, util::*};
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
