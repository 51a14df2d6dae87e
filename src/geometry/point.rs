//! Indexable point storage.
//!
//! The mesh layer only ever sees vertex indices; geometric code resolves them through a
//! [`PointSource`]. Positions are always evaluated in `f64` as [`nalgebra::Point3`].

pub use nalgebra::Point3;

/// Read-only, indexable access to 3D positions.
///
/// # Examples
///
/// ```rust
/// use tetmesh::geometry::point::{Point3, PointSource};
///
/// let points = vec![[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]];
/// assert_eq!(points.len(), 2);
/// assert_eq!(PointSource::position(&points, 1), Some(Point3::new(1.0, 2.0, 3.0)));
/// assert_eq!(PointSource::position(&points, 2), None);
/// ```
pub trait PointSource {
    /// Number of points.
    fn len(&self) -> usize;

    /// Position of the point at `index`, or `None` if the index is out of range.
    fn position(&self, index: usize) -> Option<Point3<f64>>;

    /// Returns `true` if there are no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if every coordinate of every point is finite.
    fn all_finite(&self) -> bool {
        (0..self.len()).all(|i| {
            self.position(i)
                .is_some_and(|p| p.coords.iter().all(|c| c.is_finite()))
        })
    }
}

impl PointSource for [Point3<f64>] {
    #[inline]
    fn len(&self) -> usize {
        <[Point3<f64>]>::len(self)
    }

    #[inline]
    fn position(&self, index: usize) -> Option<Point3<f64>> {
        self.get(index).copied()
    }
}

impl PointSource for [[f64; 3]] {
    #[inline]
    fn len(&self) -> usize {
        <[[f64; 3]]>::len(self)
    }

    #[inline]
    fn position(&self, index: usize) -> Option<Point3<f64>> {
        self.get(index).map(|&[x, y, z]| Point3::new(x, y, z))
    }
}

impl<T> PointSource for Vec<T>
where
    [T]: PointSource,
{
    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    fn position(&self, index: usize) -> Option<Point3<f64>> {
        self.as_slice().position(index)
    }
}

impl<T, const N: usize> PointSource for [T; N]
where
    [T]: PointSource,
{
    #[inline]
    fn len(&self) -> usize {
        N
    }

    #[inline]
    fn position(&self, index: usize) -> Option<Point3<f64>> {
        self.as_slice().position(index)
    }
}

/// A view of another [`PointSource`] through an index permutation.
///
/// `IndexedPoints::new(points, order).position(i)` is `points.position(order[i])`. The
/// Delaunay facade uses it to feed a lexicographically sorted view to the incrementer
/// without copying coordinates.
#[derive(Clone, Copy, Debug)]
pub struct IndexedPoints<'a, P: ?Sized> {
    points: &'a P,
    order: &'a [usize],
}

impl<'a, P: PointSource + ?Sized> IndexedPoints<'a, P> {
    /// Creates the permuted view.
    #[must_use]
    pub const fn new(points: &'a P, order: &'a [usize]) -> Self {
        Self { points, order }
    }

    /// Index into the underlying source for view index `index`.
    #[must_use]
    pub fn source_index(&self, index: usize) -> Option<usize> {
        self.order.get(index).copied()
    }
}

impl<P: PointSource + ?Sized> PointSource for IndexedPoints<'_, P> {
    #[inline]
    fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    fn position(&self, index: usize) -> Option<Point3<f64>> {
        self.source_index(index)
            .and_then(|source| self.points.position(source))
    }
}
