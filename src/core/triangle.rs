//! Oriented triangular faces.
//!
//! A [`Triangle`] is an ordered triple of vertex references. Two triangles are the
//! *same* face only when one is a cyclic rotation of the other:
//!
//! - `(a, b, c) == (b, c, a) == (c, a, b)`
//! - `(a, b, c) != (a, c, b)`: the reflected triangle is the [`flip`](Triangle::flip)
//!   of the face, i.e. the same geometric triangle seen from its back side.
//!
//! Equality and hashing are implemented by hand so that rotation is respected while
//! reflection is not; the field-wise derived versions would be wrong for mesh lookups.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::util::{oriented_hash, vertex_hash};

/// An oriented triangle over vertex references of type `V`.
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::triangle::Triangle;
///
/// let t = Triangle::new(0, 1, 2);
/// assert_eq!(t, Triangle::new(1, 2, 0));
/// assert_eq!(t, Triangle::new(2, 0, 1));
/// assert_ne!(t, Triangle::new(0, 2, 1));
/// assert_eq!(t.flip(), Triangle::new(0, 2, 1));
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Triangle<V> {
    a: V,
    b: V,
    c: V,
}

impl<V: Copy> Triangle<V> {
    /// Creates the triangle `(a, b, c)`.
    #[inline]
    #[must_use]
    pub const fn new(a: V, b: V, c: V) -> Self {
        Self { a, b, c }
    }

    /// Creates the triangle `(vertex, base.0, base.1)`.
    #[inline]
    #[must_use]
    pub const fn from_vertex_and_base(vertex: V, base: (V, V)) -> Self {
        Self::new(vertex, base.0, base.1)
    }

    /// First corner.
    #[inline]
    #[must_use]
    pub const fn a(&self) -> V {
        self.a
    }

    /// Second corner.
    #[inline]
    #[must_use]
    pub const fn b(&self) -> V {
        self.b
    }

    /// Third corner.
    #[inline]
    #[must_use]
    pub const fn c(&self) -> V {
        self.c
    }

    /// The primary vertex of the triangle (`a`).
    #[inline]
    #[must_use]
    pub const fn vertex(&self) -> V {
        self.a
    }

    /// The primary base of the triangle, the directed edge `(b, c)`.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> (V, V) {
        (self.b, self.c)
    }

    /// The corners in their stored order.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> [V; 3] {
        [self.a, self.b, self.c]
    }

    /// The three directed edges `(a, b)`, `(b, c)`, `(c, a)`.
    #[inline]
    #[must_use]
    pub const fn edges(&self) -> [(V, V); 3] {
        [(self.a, self.b), (self.b, self.c), (self.c, self.a)]
    }

    /// The reverse-wound triangle `(a, c, b)`.
    #[inline]
    #[must_use]
    pub const fn flip(&self) -> Self {
        Self::new(self.a, self.c, self.b)
    }

    /// Relabels every vertex reference.
    #[inline]
    #[must_use]
    pub fn map<W: Copy, F: FnMut(V) -> W>(&self, mut f: F) -> Triangle<W> {
        Triangle::new(f(self.a), f(self.b), f(self.c))
    }
}

impl<V: Copy + Eq> Triangle<V> {
    /// Returns `true` if `v` is one of the corners.
    #[inline]
    #[must_use]
    pub fn contains(&self, v: V) -> bool {
        self.a == v || self.b == v || self.c == v
    }

    /// Returns `true` if two corners share a vertex reference.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b || self.b == self.c || self.c == self.a
    }

    /// Rotates the triangle so that its base `(b, c)` equals the given directed edge.
    ///
    /// Returns `None` if the edge is not one of the triangle's directed edges.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tetmesh::core::triangle::Triangle;
    ///
    /// let t = Triangle::new(0, 1, 2);
    /// let aligned = t.align((0, 1)).unwrap();
    /// assert_eq!(aligned.vertices(), [2, 0, 1]);
    /// assert!(t.align((1, 0)).is_none());
    /// ```
    #[must_use]
    pub fn align(&self, base: (V, V)) -> Option<Self> {
        if (self.a, self.b) == base {
            return Some(Self::from_vertex_and_base(self.c, base));
        }
        if (self.b, self.c) == base {
            return Some(Self::from_vertex_and_base(self.a, base));
        }
        if (self.c, self.a) == base {
            return Some(Self::from_vertex_and_base(self.b, base));
        }
        None
    }

    /// The three rotations of this triangle, starting with itself.
    #[inline]
    fn rotations(&self) -> [[V; 3]; 3] {
        [
            [self.a, self.b, self.c],
            [self.b, self.c, self.a],
            [self.c, self.a, self.b],
        ]
    }
}

impl<V: Copy + Eq> PartialEq for Triangle<V> {
    fn eq(&self, other: &Self) -> bool {
        let target = other.vertices();
        self.rotations().iter().any(|rotation| *rotation == target)
    }
}

impl<V: Copy + Eq> Eq for Triangle<V> {}

impl<V: Copy + Eq + Hash> Hash for Triangle<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(oriented_hash([
            vertex_hash(&self.a),
            vertex_hash(&self.b),
            vertex_hash(&self.c),
        ]));
    }
}

impl<V: fmt::Display> fmt::Display for Triangle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.a, self.b, self.c)
    }
}

impl<V: Copy> From<[V; 3]> for Triangle<V> {
    #[inline]
    fn from([a, b, c]: [V; 3]) -> Self {
        Self::new(a, b, c)
    }
}
