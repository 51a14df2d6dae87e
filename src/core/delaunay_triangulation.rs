//! Delaunay tetrahedralization of arbitrary point sets.
//!
//! [`DelaunayTriangulation`] wraps the index-order [`DelaunayIncrementer`]: it copies the
//! input positions, sorts the indices lexicographically by position so the hull grows
//! outwards, runs the incrementer on the sorted view and maps the resulting mesh back to
//! the caller's indices with [`TetrahedralMesh::map`].
//!
//! [`DelaunayIncrementer`]: crate::core::algorithms::incremental_insertion::DelaunayIncrementer

use ordered_float::OrderedFloat;

use crate::core::algorithms::incremental_insertion::{
    DelaunayError, IncrementerConfig, InsertionStatistics, tetrahedralize,
};
use crate::core::tetrahedral_mesh::{MeshValidationError, TetrahedralMesh};
use crate::core::tetrahedron::Tetrahedron;
use crate::core::triangle::Triangle;
use crate::core::util::{DelaunayValidationError, find_delaunay_violations, validate_delaunay};
use crate::geometry::point::{IndexedPoints, Point3, PointSource};
use crate::geometry::predicates::signed_volume;

/// A Delaunay tetrahedralization together with the points it was built from.
///
/// # Delaunay Property Note
///
/// For points in general position the result satisfies the empty-circumsphere property
/// and its boundary is the convex hull. Cospherical ties (within
/// [`IncrementerConfig::insphere_tolerance`]) are left as they are; coincident points
/// are skipped and reported in [`InsertionStatistics::points_skipped`].
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::delaunay_triangulation::DelaunayTriangulation;
///
/// let points = vec![
///     [1.0, 1.0, 1.0],
///     [0.0, 0.0, 0.0],
///     [1.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0],
///     [0.0, 0.0, 1.0],
/// ];
/// let dt = DelaunayTriangulation::new(&points).unwrap();
/// assert_eq!(dt.number_of_vertices(), 5);
/// assert!(dt.is_valid());
/// assert!(dt.validate_delaunay().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct DelaunayTriangulation {
    points: Vec<Point3<f64>>,
    mesh: TetrahedralMesh<usize>,
    statistics: InsertionStatistics,
    config: IncrementerConfig,
}

impl DelaunayTriangulation {
    /// Tetrahedralizes `points` with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::with_config`].
    pub fn new<P: PointSource + ?Sized>(points: &P) -> Result<Self, DelaunayError> {
        Self::with_config(points, IncrementerConfig::default())
    }

    /// Tetrahedralizes `points` after sorting them lexicographically.
    ///
    /// The mesh refers to the caller's indices.
    ///
    /// # Errors
    ///
    /// Returns [`DelaunayError::NonFiniteCoordinate`] (with the caller's index) for
    /// NaN / infinite coordinates, and the errors of the incrementer otherwise.
    pub fn with_config<P: PointSource + ?Sized>(
        points: &P,
        config: IncrementerConfig,
    ) -> Result<Self, DelaunayError> {
        let points = collect_finite(points)?;

        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by_key(|&index| {
            let p = points[index];
            (OrderedFloat(p.x), OrderedFloat(p.y), OrderedFloat(p.z))
        });

        let view = IndexedPoints::new(points.as_slice(), &order);
        let (sorted_mesh, statistics) =
            tetrahedralize(&view, config).map_err(|err| remap_error(err, &order))?;
        let mesh = sorted_mesh.map(|index| order[index]);
        tracing::debug!(
            "[delaunay] {} points -> {} tetrahedra, {} boundary faces",
            points.len(),
            mesh.len(),
            mesh.boundary_len()
        );

        Ok(Self {
            points,
            mesh,
            statistics,
            config,
        })
    }

    /// Tetrahedralizes `points` in the given order, without sorting.
    ///
    /// Points that do not see the hull built so far are skipped, so the caller is
    /// responsible for an order that grows the hull outwards.
    ///
    /// # Errors
    ///
    /// See [`DelaunayIncrementer::new`](crate::core::algorithms::incremental_insertion::DelaunayIncrementer::new).
    pub fn from_ordered<P: PointSource + ?Sized>(
        points: &P,
        config: IncrementerConfig,
    ) -> Result<Self, DelaunayError> {
        let points = collect_finite(points)?;
        let (mesh, statistics) = tetrahedralize(points.as_slice(), config)?;
        Ok(Self {
            points,
            mesh,
            statistics,
            config,
        })
    }

    /// The tetrahedral mesh over input indices.
    #[must_use]
    pub const fn mesh(&self) -> &TetrahedralMesh<usize> {
        &self.mesh
    }

    /// Consumes the triangulation and returns the mesh.
    #[must_use]
    pub fn into_mesh(self) -> TetrahedralMesh<usize> {
        self.mesh
    }

    /// The input positions.
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Number of tetrahedra.
    #[must_use]
    pub fn number_of_tetrahedra(&self) -> usize {
        self.mesh.len()
    }

    /// Number of input points that are mesh vertices.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.mesh.vertices().len()
    }

    /// The tetrahedra.
    pub fn tetrahedra(&self) -> impl Iterator<Item = &Tetrahedron<usize>> {
        self.mesh.tetrahedra()
    }

    /// The boundary faces, i.e. the triangulated convex hull.
    pub fn boundary(&self) -> impl Iterator<Item = &Triangle<usize>> {
        self.mesh.boundary()
    }

    /// Counters collected while building.
    #[must_use]
    pub const fn statistics(&self) -> &InsertionStatistics {
        &self.statistics
    }

    /// The configuration used to build.
    #[must_use]
    pub const fn config(&self) -> &IncrementerConfig {
        &self.config
    }

    /// Sum of the signed tetrahedron volumes.
    ///
    /// Every mesh vertex indexes `points`; the mesh is only ever built from them.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let p = &self.points;
        self.mesh
            .tetrahedra()
            .map(|t| {
                let [a, b, c, d] = t.vertices();
                signed_volume(&[p[a], p[b], p[c], p[d]])
            })
            .sum()
    }

    /// Structural check of the mesh invariant.
    ///
    /// # Errors
    ///
    /// Returns the first [`MeshValidationError`].
    pub fn validate(&self) -> Result<(), MeshValidationError> {
        self.mesh.validate()
    }

    /// Returns `true` if [`Self::validate`] succeeds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.mesh.is_valid()
    }

    /// Structural check followed by the empty-circumsphere check, with the configured
    /// in-sphere tolerance.
    ///
    /// # Errors
    ///
    /// Returns the first [`DelaunayValidationError`].
    pub fn validate_delaunay(&self) -> Result<(), DelaunayValidationError> {
        validate_delaunay(&self.mesh, &self.points, self.config.insphere_tolerance)
    }

    /// All tetrahedra with a mesh vertex strictly inside their circumsphere.
    ///
    /// # Errors
    ///
    /// See [`find_delaunay_violations`].
    pub fn find_delaunay_violations(&self) -> Result<Vec<Tetrahedron<usize>>, DelaunayValidationError> {
        find_delaunay_violations(&self.mesh, &self.points, self.config.insphere_tolerance)
    }
}

fn collect_finite<P: PointSource + ?Sized>(points: &P) -> Result<Vec<Point3<f64>>, DelaunayError> {
    let len = points.len();
    let mut collected = Vec::with_capacity(len);
    for index in 0..len {
        let p = points
            .position(index)
            .ok_or(DelaunayError::IndexOutOfBounds { index, len })?;
        if !p.coords.iter().all(|c| c.is_finite()) {
            return Err(DelaunayError::NonFiniteCoordinate { index });
        }
        collected.push(p);
    }
    Ok(collected)
}

/// Rewrites sorted-view indices in `err` to the caller's indices.
fn remap_error(err: DelaunayError, order: &[usize]) -> DelaunayError {
    let original = |index: usize| order.get(index).copied().unwrap_or(index);
    match err {
        DelaunayError::NonFiniteCoordinate { index } => DelaunayError::NonFiniteCoordinate {
            index: original(index),
        },
        DelaunayError::VertexAlreadyInserted { index } => DelaunayError::VertexAlreadyInserted {
            index: original(index),
        },
        DelaunayError::AmbiguousPentahedron { face, apexes } => {
            DelaunayError::AmbiguousPentahedron {
                face,
                apexes: (original(apexes.0), original(apexes.1)),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unsorted_cube_maps_back_to_input_indices() {
        let cube = vec![
            [1.0, 1.0, 1.0],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 1.0],
        ];
        let dt = DelaunayTriangulation::new(&cube).unwrap();
        assert!(dt.is_valid());
        assert_eq!(dt.number_of_vertices(), 8);
        assert_eq!(dt.boundary().count(), 12);
        assert_relative_eq!(dt.volume(), 1.0, epsilon = 1e-12);
        assert!(dt.validate_delaunay().is_ok());
    }

    #[test]
    fn non_finite_error_uses_input_index() {
        let points = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [f64::INFINITY, 0.0, 0.0],
        ];
        assert_eq!(
            DelaunayTriangulation::new(&points).err(),
            Some(DelaunayError::NonFiniteCoordinate { index: 4 })
        );
    }

    #[test]
    fn from_ordered_keeps_indices() {
        let points = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let dt = DelaunayTriangulation::from_ordered(&points, IncrementerConfig::default()).unwrap();
        assert_eq!(dt.number_of_tetrahedra(), 1);
        let t = dt.tetrahedra().next().copied().unwrap();
        let mut vertices = t.vertices();
        vertices.sort_unstable();
        assert_eq!(vertices, [0, 1, 2, 3]);
        assert_relative_eq!(dt.volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn remap_error_translates_indices() {
        let order = [3, 0, 2, 1];
        assert_eq!(
            remap_error(DelaunayError::VertexAlreadyInserted { index: 0 }, &order),
            DelaunayError::VertexAlreadyInserted { index: 3 }
        );
        assert_eq!(
            remap_error(DelaunayError::InsufficientVertices { found: 2 }, &order),
            DelaunayError::InsufficientVertices { found: 2 }
        );
    }
}
