//! Delaunay empty-circumsphere property validation utilities.

#![forbid(unsafe_code)]

use thiserror::Error;

use crate::core::tetrahedral_mesh::{MeshValidationError, TetrahedralMesh};
use crate::core::tetrahedron::Tetrahedron;
use crate::geometry::point::{Point3, PointSource};
use crate::geometry::predicates::{InSphere, insphere_with_center};
use crate::geometry::util::{CircumcenterError, circumcenter};

/// Errors that can occur during Delaunay property validation.
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::tetrahedron::Tetrahedron;
/// use tetmesh::core::util::DelaunayValidationError;
///
/// let err = DelaunayValidationError::DelaunayViolation {
///     tetrahedron: Tetrahedron::new(0, 1, 2, 3),
///     vertex: 4,
/// };
/// assert!(matches!(err, DelaunayValidationError::DelaunayViolation { vertex: 4, .. }));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DelaunayValidationError {
    /// A vertex lies strictly inside the circumsphere of a tetrahedron.
    #[error("Tetrahedron {tetrahedron:?} violates Delaunay property: vertex {vertex} is inside its circumsphere")]
    DelaunayViolation {
        /// The violating tetrahedron.
        tetrahedron: Tetrahedron<usize>,
        /// A vertex strictly inside its circumsphere.
        vertex: usize,
    },
    /// The mesh itself is structurally invalid.
    #[error("Mesh corruption: {source}")]
    InvalidMesh {
        /// The underlying structural error.
        #[source]
        source: MeshValidationError,
    },
    /// The mesh references a point index the source does not have.
    #[error("Mesh references missing point {index}")]
    MissingPoint {
        /// The missing index.
        index: usize,
    },
    /// Numeric predicate failure during Delaunay validation.
    #[error("Numeric predicate failure while validating tetrahedron {tetrahedron:?}: {source}")]
    NumericPredicateError {
        /// The tetrahedron whose circumsphere was being evaluated.
        tetrahedron: Tetrahedron<usize>,
        /// Underlying circumsphere error.
        #[source]
        source: CircumcenterError,
    },
}

// =============================================================================
// DELAUNAY PROPERTY VALIDATION
// =============================================================================

/// Returns the first mesh vertex strictly inside the circumsphere of `tetrahedron`.
fn first_vertex_inside<P: PointSource + ?Sized>(
    tetrahedron: &Tetrahedron<usize>,
    points: &P,
    vertices: &[usize],
    tolerance: f64,
) -> Result<Option<usize>, DelaunayValidationError> {
    let corners = tetrahedron.vertices();
    let mut positions = [Point3::origin(); 4];
    for (slot, &index) in positions.iter_mut().zip(&corners) {
        *slot = points
            .position(index)
            .ok_or(DelaunayValidationError::MissingPoint { index })?;
    }

    let center = circumcenter(&positions).map_err(|source| {
        DelaunayValidationError::NumericPredicateError {
            tetrahedron: *tetrahedron,
            source,
        }
    })?;
    let radius_squared = (positions[0] - center).norm_squared();

    for &vertex in vertices {
        if corners.contains(&vertex) {
            continue;
        }
        let test = points
            .position(vertex)
            .ok_or(DelaunayValidationError::MissingPoint { index: vertex })?;
        match insphere_with_center(&center, radius_squared, &test, tolerance) {
            Ok(InSphere::INSIDE) => return Ok(Some(vertex)),
            Ok(InSphere::BOUNDARY | InSphere::OUTSIDE) => {}
            Err(source) => {
                return Err(DelaunayValidationError::NumericPredicateError {
                    tetrahedron: *tetrahedron,
                    source,
                });
            }
        }
    }
    Ok(None)
}

fn sorted_vertices(mesh: &TetrahedralMesh<usize>) -> Vec<usize> {
    let mut vertices: Vec<usize> = mesh.vertices().into_iter().collect();
    vertices.sort_unstable();
    vertices
}

/// Find tetrahedra that violate the Delaunay property.
///
/// Every tetrahedron is tested against every vertex used by the mesh. `tolerance` has
/// the meaning of [`insphere`](crate::geometry::predicates::insphere): vertices within
/// `tolerance · r²` of the sphere count as on it, not inside.
///
/// # Errors
///
/// Returns [`DelaunayValidationError`] if the mesh references a missing point or a
/// circumsphere cannot be computed (flat tetrahedron).
///
/// # Examples
///
/// ```
/// use tetmesh::core::algorithms::incremental_insertion::{IncrementerConfig, tetrahedralize};
/// use tetmesh::core::util::find_delaunay_violations;
///
/// let points = vec![
///     [0.0, 0.0, 0.0],
///     [0.0, 0.0, 1.0],
///     [0.0, 1.0, 0.0],
///     [1.0, 0.0, 0.0],
///     [1.0, 1.0, 1.0],
/// ];
/// let (mesh, _) = tetrahedralize(&points, IncrementerConfig::default()).unwrap();
/// let violations = find_delaunay_violations(&mesh, &points, 1e-10).unwrap();
/// assert!(violations.is_empty());
/// ```
pub fn find_delaunay_violations<P: PointSource + ?Sized>(
    mesh: &TetrahedralMesh<usize>,
    points: &P,
    tolerance: f64,
) -> Result<Vec<Tetrahedron<usize>>, DelaunayValidationError> {
    let vertices = sorted_vertices(mesh);
    let mut violating = Vec::new();
    for tetrahedron in mesh.tetrahedra() {
        if first_vertex_inside(tetrahedron, points, &vertices, tolerance)?.is_some() {
            violating.push(*tetrahedron);
        }
    }

    tracing::debug!(
        "[Delaunay debug] find_delaunay_violations: checked {} tetrahedra against {} vertices, found {} violating",
        mesh.len(),
        vertices.len(),
        violating.len()
    );
    Ok(violating)
}

/// Validate the mesh structure and then the empty-circumsphere property, stopping at
/// the first violation.
///
/// # Errors
///
/// Returns [`DelaunayValidationError::InvalidMesh`] if the mesh invariant is broken,
/// [`DelaunayValidationError::DelaunayViolation`] for the first violating tetrahedron,
/// or the errors of [`find_delaunay_violations`].
pub fn validate_delaunay<P: PointSource + ?Sized>(
    mesh: &TetrahedralMesh<usize>,
    points: &P,
    tolerance: f64,
) -> Result<(), DelaunayValidationError> {
    mesh.validate()
        .map_err(|source| DelaunayValidationError::InvalidMesh { source })?;

    let vertices = sorted_vertices(mesh);
    for tetrahedron in mesh.tetrahedra() {
        if let Some(vertex) = first_vertex_inside(tetrahedron, points, &vertices, tolerance)? {
            return Err(DelaunayValidationError::DelaunayViolation {
                tetrahedron: *tetrahedron,
                vertex,
            });
        }
    }
    Ok(())
}
