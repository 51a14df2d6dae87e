//! A face-classifying container of oriented tetrahedra.
//!
//! [`TetrahedralMesh`] stores a set of [`Tetrahedron`]s over opaque vertex references and
//! classifies every face of every tetrahedron as either
//!
//! - **boundary**: the face appears on exactly one tetrahedron and nobody owns its flip, or
//! - **interior**: the face and its flip appear on two different tetrahedra.
//!
//! Interior faces are registered under *both* windings, each entry pointing at the
//! tetrahedron on that winding side, so the neighbor across any face is a single O(1)
//! lookup of the flipped face.
//!
//! # Invariant
//!
//! After every public operation (other than [`TetrahedralMesh::add_unchecked`] misuse and
//! non-injective [`TetrahedralMesh::map`] closures), for every tetrahedron `T` and every
//! face `F` of `T` exactly one of the following holds:
//!
//! - `F` is a boundary face owned by `T`;
//! - `F` is an interior face mapped to `T`, and `F.flip()` is mapped to another tetrahedron.
//!
//! [`TetrahedralMesh::validate`] checks this invariant.
//!
//! # Transformations
//!
//! [`TetrahedralMesh::split_pentahedron`] (2→3) and [`TetrahedralMesh::merge_pentahedron`]
//! (3→2) exchange the triangulation of a five-vertex pentahedron. Both plan the exchange
//! against the current face registries first and only touch the mesh when the whole plan
//! is feasible, so a failed transformation never leaves partial state behind.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::core::collections::{
    FastHashMap, FastHashSet, FlipFacesBuffer, FlipTetrahedraBuffer, fast_hash_map_with_capacity,
    fast_hash_set_with_capacity,
};
use crate::core::tetrahedron::Tetrahedron;
use crate::core::traits::VertexRef;
use crate::core::triangle::Triangle;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Violations of the mesh invariant reported by [`TetrahedralMesh::validate`].
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::tetrahedral_mesh::MeshValidationError;
///
/// let err = MeshValidationError::UnregisteredFace { face: "(0, 1, 2)".to_string() };
/// assert!(err.to_string().contains("(0, 1, 2)"));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MeshValidationError {
    /// A stored tetrahedron repeats a vertex reference.
    #[error("Tetrahedron {tetrahedron} repeats a vertex reference")]
    DegenerateTetrahedron {
        /// Debug rendering of the tetrahedron.
        tetrahedron: String,
    },
    /// A face is registered both as boundary and as interior.
    #[error("Face {face} is registered both as boundary and as interior")]
    FaceBothBoundaryAndInterior {
        /// Debug rendering of the face.
        face: String,
    },
    /// A face of a stored tetrahedron is not registered at all.
    #[error("Face {face} of a stored tetrahedron is not registered")]
    UnregisteredFace {
        /// Debug rendering of the face.
        face: String,
    },
    /// A face registry entry points at a different tetrahedron than the one carrying the face.
    #[error("Face {face} is registered to {found}, expected {expected}")]
    OwnerMismatch {
        /// Debug rendering of the face.
        face: String,
        /// Tetrahedron carrying the face.
        expected: String,
        /// Tetrahedron recorded in the registry.
        found: String,
    },
    /// A boundary face whose flip is also registered.
    #[error("Boundary face {face} has a registered flip")]
    BoundaryFlipRegistered {
        /// Debug rendering of the face.
        face: String,
    },
    /// An interior face whose flip has no registry entry.
    #[error("Interior face {face} has no registered flip")]
    MissingInteriorPartner {
        /// Debug rendering of the face.
        face: String,
    },
    /// The neighbor recorded across an interior face is not stored in the mesh.
    #[error("Neighbor {neighbor} across face {face} is not in the mesh")]
    DanglingNeighbor {
        /// Debug rendering of the face.
        face: String,
        /// Debug rendering of the missing neighbor.
        neighbor: String,
    },
    /// The registries hold a different number of entries than the tetrahedra have faces.
    #[error("Face registries hold {found} entries, expected {expected}")]
    RegistrationCountMismatch {
        /// Four entries per tetrahedron.
        expected: usize,
        /// Boundary plus interior entries.
        found: usize,
    },
}

// =============================================================================
// MESH
// =============================================================================

/// A set of oriented tetrahedra with boundary / interior face bookkeeping.
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::tetrahedral_mesh::TetrahedralMesh;
/// use tetmesh::core::tetrahedron::Tetrahedron;
/// use tetmesh::core::triangle::Triangle;
///
/// let mut mesh = TetrahedralMesh::new();
/// let a = Tetrahedron::new(0, 1, 2, 3);
/// assert!(mesh.add(a));
/// assert_eq!(mesh.boundary_len(), 4);
///
/// // Glue a second tetrahedron onto the face (0, 1, 2).
/// let b = Tetrahedron::from_apex_and_base(4, Triangle::new(0, 1, 2).flip());
/// assert!(mesh.add(b));
/// assert_eq!(mesh.boundary_len(), 6);
/// assert_eq!(mesh.interior_face_count(), 1);
/// assert_eq!(mesh.get_interior(Triangle::new(0, 1, 2)), Some(a));
/// assert!(mesh.is_valid());
/// ```
#[derive(Clone)]
pub struct TetrahedralMesh<V> {
    tetrahedra: FastHashSet<Tetrahedron<V>>,
    boundaries: FastHashMap<Triangle<V>, Tetrahedron<V>>,
    interiors: FastHashMap<Triangle<V>, Tetrahedron<V>>,
}

impl<V: VertexRef> Default for TetrahedralMesh<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: VertexRef> TetrahedralMesh<V> {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tetrahedra: FastHashSet::default(),
            boundaries: FastHashMap::default(),
            interiors: FastHashMap::default(),
        }
    }

    /// Creates an empty mesh with room for `tetrahedra` tetrahedra.
    #[must_use]
    pub fn with_capacity(tetrahedra: usize) -> Self {
        Self {
            tetrahedra: fast_hash_set_with_capacity(tetrahedra),
            boundaries: fast_hash_map_with_capacity(tetrahedra),
            interiors: fast_hash_map_with_capacity(tetrahedra.saturating_mul(4)),
        }
    }

    /// Number of tetrahedra.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tetrahedra.len()
    }

    /// Returns `true` if the mesh holds no tetrahedra.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tetrahedra.is_empty()
    }

    /// Returns `true` if the mesh contains `tetrahedron` (up to even relabelling).
    #[inline]
    #[must_use]
    pub fn contains(&self, tetrahedron: &Tetrahedron<V>) -> bool {
        self.tetrahedra.contains(tetrahedron)
    }

    /// Iterates over the tetrahedra.
    pub fn tetrahedra(&self) -> impl Iterator<Item = &Tetrahedron<V>> {
        self.tetrahedra.iter()
    }

    /// Iterates over the boundary faces (the outer surface of the mesh).
    pub fn boundary(&self) -> impl Iterator<Item = &Triangle<V>> {
        self.boundaries.keys()
    }

    /// Iterates over the boundary faces together with the tetrahedron carrying each one.
    pub fn boundary_with_owners(&self) -> impl Iterator<Item = (&Triangle<V>, &Tetrahedron<V>)> {
        self.boundaries.iter()
    }

    /// Iterates over interior faces, once per winding.
    pub fn interior_faces(&self) -> impl Iterator<Item = &Triangle<V>> {
        self.interiors.keys()
    }

    /// Number of boundary faces.
    #[inline]
    #[must_use]
    pub fn boundary_len(&self) -> usize {
        self.boundaries.len()
    }

    /// Number of interior faces, each counted once regardless of winding.
    #[inline]
    #[must_use]
    pub fn interior_face_count(&self) -> usize {
        self.interiors.len() / 2
    }

    /// The distinct vertex references used by the mesh.
    #[must_use]
    pub fn vertices(&self) -> FastHashSet<V> {
        self.tetrahedra
            .iter()
            .flat_map(Tetrahedron::vertices)
            .collect()
    }

    /// Returns `true` if `tetrahedron` can be added without reusing an already registered
    /// face. Degenerate tetrahedra (a repeated vertex reference) are never addable.
    #[must_use]
    pub fn can_add(&self, tetrahedron: &Tetrahedron<V>) -> bool {
        !tetrahedron.is_degenerate()
            && tetrahedron.faces().iter().all(|face| !self.is_registered(face))
    }

    /// Adds `tetrahedron` if [`Self::can_add`] allows it.
    ///
    /// Returns `false` and leaves the mesh untouched otherwise.
    pub fn add(&mut self, tetrahedron: Tetrahedron<V>) -> bool {
        if !self.can_add(&tetrahedron) {
            return false;
        }
        self.add_unchecked(tetrahedron);
        true
    }

    /// Adds `tetrahedron` without checking for face conflicts.
    ///
    /// Each face whose flip is currently a boundary face is promoted (together with the
    /// flip) to an interior face; every other face becomes a boundary face owned by
    /// `tetrahedron`. The caller is responsible for having checked [`Self::can_add`];
    /// adding a conflicting tetrahedron leaves the mesh invalid.
    pub fn add_unchecked(&mut self, tetrahedron: Tetrahedron<V>) {
        for face in tetrahedron.faces() {
            let flip = face.flip();
            if let Some(owner) = self.boundaries.remove(&flip) {
                self.interiors.insert(flip, owner);
                self.interiors.insert(face, tetrahedron);
            } else {
                self.boundaries.insert(face, tetrahedron);
            }
        }
        self.tetrahedra.insert(tetrahedron);
    }

    /// Removes `tetrahedron`.
    ///
    /// Interior faces of the removed tetrahedron become boundary faces of the neighbor on
    /// the other side. Returns `false` if the tetrahedron is not in the mesh.
    pub fn remove(&mut self, tetrahedron: &Tetrahedron<V>) -> bool {
        let Some(stored) = self.tetrahedra.take(tetrahedron) else {
            return false;
        };
        for face in stored.faces() {
            if self.interiors.remove(&face).is_some() {
                let flip = face.flip();
                if let Some(neighbor) = self.interiors.remove(&flip) {
                    self.boundaries.insert(flip, neighbor);
                }
            } else {
                self.boundaries.remove(&face);
            }
        }
        true
    }

    /// The tetrahedron carrying the interior face `face` (with this exact winding), or
    /// `None` if the face is a boundary face or not in the mesh.
    #[inline]
    #[must_use]
    pub fn get_interior(&self, face: Triangle<V>) -> Option<Tetrahedron<V>> {
        self.interiors.get(&face).copied()
    }

    /// The tetrahedron owning the boundary face `face`, if it is one.
    #[inline]
    #[must_use]
    pub fn get_boundary(&self, face: Triangle<V>) -> Option<Tetrahedron<V>> {
        self.boundaries.get(&face).copied()
    }

    /// The tetrahedron on the other side of `face`, or `None` on the boundary.
    #[inline]
    #[must_use]
    pub fn neighbor(&self, face: Triangle<V>) -> Option<Tetrahedron<V>> {
        self.interiors.get(&face.flip()).copied()
    }

    /// Replaces the three tetrahedra filling the pentahedron spanned by `a` and `b` with
    /// `a` and `b` themselves (3→2 flip).
    ///
    /// `a` and `b` must share a base with opposite windings (`b.base() == a.base().flip()`).
    /// The mesh must currently contain the three tetrahedra `(b.apex, a.apex, e.0, e.1)`
    /// for every directed edge `e` of `a`'s base. Returns `false` and leaves the mesh
    /// untouched if any precondition fails or if `a`/`b` would conflict with the rest of
    /// the mesh.
    pub fn merge_pentahedron(&mut self, a: Tetrahedron<V>, b: Tetrahedron<V>) -> bool {
        let base = a.base();
        if b.base() != base.flip() {
            return false;
        }
        let removed: FlipTetrahedraBuffer<V> = base
            .edges()
            .into_iter()
            .map(|(p, q)| Tetrahedron::new(b.apex(), a.apex(), p, q))
            .collect();
        self.replace(&removed, &[a, b])
    }

    /// Replaces the two tetrahedra `a` and `b` sharing a base with three tetrahedra, one
    /// per base edge, each containing both apexes (2→3 flip).
    ///
    /// `b.base()` must equal `a.base().flip()` and both must be in the mesh. Returns
    /// `false` and leaves the mesh untouched if a precondition fails or if the new
    /// tetrahedra would conflict with the rest of the mesh.
    pub fn split_pentahedron(&mut self, a: Tetrahedron<V>, b: Tetrahedron<V>) -> bool {
        let base = a.base();
        if b.base() != base.flip() {
            return false;
        }
        let inserted: FlipTetrahedraBuffer<V> = base
            .edges()
            .into_iter()
            .map(|(p, q)| Tetrahedron::new(p, q, b.apex(), a.apex()))
            .collect();
        self.replace(&[a, b], &inserted)
    }

    /// Creates an independent mesh with every vertex reference rewritten by `mapping`.
    ///
    /// `mapping` must be injective over the references used by the mesh; otherwise the
    /// resulting registries are unspecified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tetmesh::core::tetrahedral_mesh::TetrahedralMesh;
    /// use tetmesh::core::tetrahedron::Tetrahedron;
    ///
    /// let mut mesh = TetrahedralMesh::new();
    /// mesh.add(Tetrahedron::new(0usize, 1, 2, 3));
    /// let names = ['a', 'b', 'c', 'd'];
    /// let relabelled = mesh.map(|v| names[v]);
    /// assert!(relabelled.contains(&Tetrahedron::new('a', 'b', 'c', 'd')));
    /// assert!(relabelled.is_valid());
    /// ```
    #[must_use]
    pub fn map<W, F>(&self, mut mapping: F) -> TetrahedralMesh<W>
    where
        W: VertexRef,
        F: FnMut(V) -> W,
    {
        let tetrahedra = self
            .tetrahedra
            .iter()
            .map(|t| t.map(&mut mapping))
            .collect();
        let boundaries = self
            .boundaries
            .iter()
            .map(|(face, t)| (face.map(&mut mapping), t.map(&mut mapping)))
            .collect();
        let interiors = self
            .interiors
            .iter()
            .map(|(face, t)| (face.map(&mut mapping), t.map(&mut mapping)))
            .collect();
        TetrahedralMesh {
            tetrahedra,
            boundaries,
            interiors,
        }
    }

    /// Checks the full mesh invariant.
    ///
    /// # Errors
    ///
    /// Returns the first [`MeshValidationError`] found.
    pub fn validate(&self) -> Result<(), MeshValidationError> {
        for tetrahedron in &self.tetrahedra {
            if tetrahedron.is_degenerate() {
                return Err(MeshValidationError::DegenerateTetrahedron {
                    tetrahedron: format!("{tetrahedron:?}"),
                });
            }
            for face in tetrahedron.faces() {
                self.validate_face(tetrahedron, face)?;
            }
        }

        let expected = self.tetrahedra.len().saturating_mul(4);
        let found = self.boundaries.len() + self.interiors.len();
        if expected != found {
            return Err(MeshValidationError::RegistrationCountMismatch { expected, found });
        }
        Ok(())
    }

    /// Returns `true` if [`Self::validate`] succeeds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    #[inline]
    fn is_registered(&self, face: &Triangle<V>) -> bool {
        self.boundaries.contains_key(face) || self.interiors.contains_key(face)
    }

    fn validate_face(
        &self,
        tetrahedron: &Tetrahedron<V>,
        face: Triangle<V>,
    ) -> Result<(), MeshValidationError> {
        let owner_mismatch = |found: &Tetrahedron<V>| MeshValidationError::OwnerMismatch {
            face: format!("{face:?}"),
            expected: format!("{tetrahedron:?}"),
            found: format!("{found:?}"),
        };
        let flip = face.flip();

        match (self.boundaries.get(&face), self.interiors.get(&face)) {
            (Some(_), Some(_)) => Err(MeshValidationError::FaceBothBoundaryAndInterior {
                face: format!("{face:?}"),
            }),
            (None, None) => Err(MeshValidationError::UnregisteredFace {
                face: format!("{face:?}"),
            }),
            (Some(owner), None) => {
                if owner != tetrahedron {
                    return Err(owner_mismatch(owner));
                }
                if self.is_registered(&flip) {
                    return Err(MeshValidationError::BoundaryFlipRegistered {
                        face: format!("{face:?}"),
                    });
                }
                Ok(())
            }
            (None, Some(owner)) => {
                if owner != tetrahedron {
                    return Err(owner_mismatch(owner));
                }
                let Some(neighbor) = self.interiors.get(&flip) else {
                    return Err(MeshValidationError::MissingInteriorPartner {
                        face: format!("{face:?}"),
                    });
                };
                if neighbor == tetrahedron || !self.tetrahedra.contains(neighbor) {
                    return Err(MeshValidationError::DanglingNeighbor {
                        face: format!("{face:?}"),
                        neighbor: format!("{neighbor:?}"),
                    });
                }
                Ok(())
            }
        }
    }

    /// Plans the exchange of `removed` for `inserted` without mutating the mesh.
    ///
    /// The plan is feasible when every removed tetrahedron is present and every face of
    /// the inserted tetrahedra is free once the removed tetrahedra are gone: a face
    /// registered now stays registered after the removal unless it is a face of a
    /// removed tetrahedron.
    fn can_replace(&self, removed: &[Tetrahedron<V>], inserted: &[Tetrahedron<V>]) -> bool {
        if removed.iter().any(|t| !self.tetrahedra.contains(t)) {
            return false;
        }
        let freed: FlipFacesBuffer<V> = removed.iter().flat_map(Tetrahedron::faces).collect();
        let mut claimed: FlipFacesBuffer<V> = FlipFacesBuffer::new();
        for tetrahedron in inserted {
            if tetrahedron.is_degenerate() {
                return false;
            }
            for face in tetrahedron.faces() {
                if self.is_registered(&face) && !freed.contains(&face) {
                    return false;
                }
                if claimed.contains(&face) {
                    return false;
                }
                claimed.push(face);
            }
        }
        true
    }

    /// Commits the exchange planned by [`Self::can_replace`], or does nothing.
    fn replace(&mut self, removed: &[Tetrahedron<V>], inserted: &[Tetrahedron<V>]) -> bool {
        if !self.can_replace(removed, inserted) {
            return false;
        }
        for tetrahedron in removed {
            self.remove(tetrahedron);
        }
        for tetrahedron in inserted {
            self.add_unchecked(*tetrahedron);
        }
        true
    }
}

impl<V: VertexRef> PartialEq for TetrahedralMesh<V> {
    /// Two meshes are equal when they hold the same tetrahedra; the face registries are
    /// derived from the tetrahedron set.
    fn eq(&self, other: &Self) -> bool {
        self.tetrahedra == other.tetrahedra
    }
}

impl<V: VertexRef> Eq for TetrahedralMesh<V> {}

impl<V: VertexRef> fmt::Debug for TetrahedralMesh<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TetrahedralMesh")
            .field("tetrahedra", &self.tetrahedra.len())
            .field("boundary_faces", &self.boundaries.len())
            .field("interior_faces", &self.interior_face_count())
            .finish()
    }
}

/// Serializes the mesh as its sequence of tetrahedra; the face registries are rebuilt on
/// deserialization.
impl<V> Serialize for TetrahedralMesh<V>
where
    V: VertexRef + Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tetrahedra.iter())
    }
}

impl<'de, V> Deserialize<'de> for TetrahedralMesh<V>
where
    V: VertexRef + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tetrahedra = Vec::<Tetrahedron<V>>::deserialize(deserializer)?;
        let mut mesh = Self::with_capacity(tetrahedra.len());
        for tetrahedron in tetrahedra {
            if !mesh.add(tetrahedron) {
                return Err(D::Error::custom(format!(
                    "tetrahedron {tetrahedron:?} conflicts with earlier tetrahedra"
                )));
            }
        }
        Ok(mesh)
    }
}

/// Boundary faces of an arbitrary collection of tetrahedra: the faces whose flip is not a
/// face of any other tetrahedron in the collection. Runs in linear time.
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::tetrahedral_mesh::boundary_of;
/// use tetmesh::core::tetrahedron::Tetrahedron;
/// use tetmesh::core::triangle::Triangle;
///
/// let a = Tetrahedron::new(0, 1, 2, 3);
/// let b = Tetrahedron::from_apex_and_base(4, Triangle::new(0, 1, 2).flip());
/// let boundary = boundary_of([a, b].iter());
/// assert_eq!(boundary.len(), 6);
/// assert!(!boundary.contains(&Triangle::new(0, 1, 2)));
/// ```
pub fn boundary_of<'a, V, I>(tetrahedra: I) -> FastHashSet<Triangle<V>>
where
    V: VertexRef + 'a,
    I: IntoIterator<Item = &'a Tetrahedron<V>>,
{
    let mut current = FastHashSet::default();
    for tetrahedron in tetrahedra {
        for face in tetrahedron.faces() {
            if !current.remove(&face.flip()) {
                current.insert(face);
            }
        }
    }
    current
}
