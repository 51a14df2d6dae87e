//! Oriented tetrahedra.
//!
//! A [`Tetrahedron`] is an ordered quadruple `(a, b, c, d)` where `a` is the *apex*
//! and `(d, c, b)` is its *base*. Its four faces are
//!
//! ```text
//! (a, b, c)   (b, a, d)   (c, d, a)   (d, c, b)
//! ```
//!
//! which all carry the same orientation: for a positively oriented tetrahedron the
//! vertex opposite each face lies behind it, so every face's front side points
//! outwards.
//!
//! Two tetrahedra are equal when one is an *even* permutation of the other (the 12
//! orientation-preserving relabellings). Odd permutations describe the same vertex set
//! with the opposite orientation and compare unequal.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::triangle::Triangle;
use crate::core::util::{oriented_hash, vertex_hash};

/// The 12 even permutations of four positions.
const EVEN_PERMUTATIONS: [[usize; 4]; 12] = [
    [0, 1, 2, 3],
    [0, 2, 3, 1],
    [0, 3, 1, 2],
    [1, 0, 3, 2],
    [1, 2, 0, 3],
    [1, 3, 2, 0],
    [2, 0, 1, 3],
    [2, 1, 3, 0],
    [2, 3, 0, 1],
    [3, 0, 2, 1],
    [3, 1, 0, 2],
    [3, 2, 1, 0],
];

/// An oriented tetrahedron over vertex references of type `V`.
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::tetrahedron::Tetrahedron;
/// use tetmesh::core::triangle::Triangle;
///
/// let t = Tetrahedron::new(0, 1, 2, 3);
/// assert_eq!(t.apex(), 0);
/// assert_eq!(t.base(), Triangle::new(3, 2, 1));
///
/// // Even relabelling: same tetrahedron.
/// assert_eq!(t, Tetrahedron::new(1, 0, 3, 2));
/// // Odd relabelling: opposite orientation.
/// assert_ne!(t, Tetrahedron::new(1, 0, 2, 3));
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Tetrahedron<V> {
    a: V,
    b: V,
    c: V,
    d: V,
}

impl<V: Copy> Tetrahedron<V> {
    /// Creates the tetrahedron `(a, b, c, d)`.
    #[inline]
    #[must_use]
    pub const fn new(a: V, b: V, c: V, d: V) -> Self {
        Self { a, b, c, d }
    }

    /// Creates a tetrahedron whose apex is `apex` and whose base is exactly `base`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tetmesh::core::tetrahedron::Tetrahedron;
    /// use tetmesh::core::triangle::Triangle;
    ///
    /// let base = Triangle::new(1, 2, 3);
    /// let t = Tetrahedron::from_apex_and_base(0, base);
    /// assert_eq!(t.vertices(), [0, 3, 2, 1]);
    /// assert_eq!(t.base().vertices(), base.vertices());
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_apex_and_base(apex: V, base: Triangle<V>) -> Self {
        Self::new(apex, base.c(), base.b(), base.a())
    }

    /// The apex (`a`).
    #[inline]
    #[must_use]
    pub const fn apex(&self) -> V {
        self.a
    }

    /// The base face `(d, c, b)`.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> Triangle<V> {
        Triangle::new(self.d, self.c, self.b)
    }

    /// The vertices in their stored order.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> [V; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// The four faces, each paired positionally with [`Self::opposite_vertices`].
    #[inline]
    #[must_use]
    pub const fn faces(&self) -> [Triangle<V>; 4] {
        [
            Triangle::new(self.a, self.b, self.c),
            Triangle::new(self.b, self.a, self.d),
            Triangle::new(self.c, self.d, self.a),
            Triangle::new(self.d, self.c, self.b),
        ]
    }

    /// The vertex opposite each entry of [`Self::faces`].
    #[inline]
    #[must_use]
    pub const fn opposite_vertices(&self) -> [V; 4] {
        [self.d, self.c, self.b, self.a]
    }

    /// The three faces that contain the apex.
    #[inline]
    #[must_use]
    pub const fn apex_faces(&self) -> [Triangle<V>; 3] {
        [
            Triangle::new(self.a, self.b, self.c),
            Triangle::new(self.b, self.a, self.d),
            Triangle::new(self.c, self.d, self.a),
        ]
    }

    /// The same vertices with the opposite orientation.
    #[inline]
    #[must_use]
    pub const fn flip(&self) -> Self {
        Self::new(self.a, self.c, self.b, self.d)
    }

    /// Splits the tetrahedron into four tetrahedra that share `mid` as their apex, one per
    /// face. Each piece keeps the parent's orientation when `mid` lies inside the parent.
    #[must_use]
    pub fn split(&self, mid: V) -> [Self; 4] {
        self.faces().map(|face| Self::from_apex_and_base(mid, face))
    }

    /// Relabels every vertex reference.
    #[inline]
    #[must_use]
    pub fn map<W: Copy, F: FnMut(V) -> W>(&self, mut f: F) -> Tetrahedron<W> {
        Tetrahedron::new(f(self.a), f(self.b), f(self.c), f(self.d))
    }
}

impl<V: Copy + Eq> Tetrahedron<V> {
    /// Returns `true` if `v` is one of the vertices.
    #[inline]
    #[must_use]
    pub fn contains(&self, v: V) -> bool {
        self.vertices().contains(&v)
    }

    /// Returns `true` if two vertices share a reference.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let v = self.vertices();
        (0..4).any(|i| (i + 1..4).any(|j| v[i] == v[j]))
    }

    /// The vertex opposite `face`, if `face` is one of this tetrahedron's faces
    /// (with matching winding).
    #[must_use]
    pub fn opposite(&self, face: Triangle<V>) -> Option<V> {
        self.faces()
            .iter()
            .zip(self.opposite_vertices())
            .find_map(|(f, v)| (*f == face).then_some(v))
    }

    /// Relabels the tetrahedron so that its base is exactly `face`.
    ///
    /// Returns `None` if `face` is not a face of this tetrahedron with the same winding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tetmesh::core::tetrahedron::Tetrahedron;
    /// use tetmesh::core::triangle::Triangle;
    ///
    /// let t = Tetrahedron::new(0, 1, 2, 3);
    /// let face = Triangle::new(1, 0, 3);
    /// let aligned = t.align(face).unwrap();
    /// assert_eq!(aligned, t);
    /// assert_eq!(aligned.apex(), 2);
    /// assert_eq!(aligned.base().vertices(), face.vertices());
    /// assert!(t.align(face.flip()).is_none());
    /// ```
    #[must_use]
    pub fn align(&self, face: Triangle<V>) -> Option<Self> {
        self.opposite(face)
            .map(|apex| Self::from_apex_and_base(apex, face))
    }
}

impl<V: Copy + Eq> PartialEq for Tetrahedron<V> {
    fn eq(&self, other: &Self) -> bool {
        let v = self.vertices();
        let target = other.vertices();
        EVEN_PERMUTATIONS
            .iter()
            .any(|p| [v[p[0]], v[p[1]], v[p[2]], v[p[3]]] == target)
    }
}

impl<V: Copy + Eq> Eq for Tetrahedron<V> {}

impl<V: Copy + Eq + Hash> Hash for Tetrahedron<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(oriented_hash(self.vertices().map(|v| vertex_hash(&v))));
    }
}

impl<V: fmt::Display> fmt::Display for Tetrahedron<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.a, self.b, self.c, self.d)
    }
}

impl<V: Copy> From<[V; 4]> for Tetrahedron<V> {
    #[inline]
    fn from([a, b, c, d]: [V; 4]) -> Self {
        Self::new(a, b, c, d)
    }
}
