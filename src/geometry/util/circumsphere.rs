//! Circumsphere calculations for tetrahedra.

use nalgebra::{Matrix3, Vector3};

use crate::geometry::point::Point3;

pub use super::CircumcenterError;

/// Relative threshold on the bisector-system determinant.
const SINGULARITY_RELATIVE_EPSILON: f64 = 1e-12;

/// Calculate the circumcenter of a tetrahedron.
///
/// The circumcenter `C` of `x_0 .. x_3` solves the perpendicular-bisector system
///
/// ```text
/// (x_i - x_0) · (C - x_0) = |x_i - x_0|² / 2    for i = 1, 2, 3
/// ```
///
/// which is solved with an LU decomposition of the 3×3 edge matrix.
///
/// # Errors
///
/// Returns [`CircumcenterError::MatrixInversionFailed`] if the four points are
/// (numerically) coplanar, and [`CircumcenterError::NonFiniteResult`] if the solution is
/// not finite.
///
/// # Example
///
/// ```
/// use tetmesh::geometry::point::Point3;
/// use tetmesh::geometry::util::circumcenter;
///
/// let points = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// let center = circumcenter(&points).unwrap();
/// assert!((center - Point3::new(0.5, 0.5, 0.5)).norm() < 1e-12);
/// ```
pub fn circumcenter(points: &[Point3<f64>; 4]) -> Result<Point3<f64>, CircumcenterError> {
    let origin = points[0];
    let edges: [Vector3<f64>; 3] = [points[1] - origin, points[2] - origin, points[3] - origin];

    let matrix = Matrix3::from_rows(&[
        edges[0].transpose(),
        edges[1].transpose(),
        edges[2].transpose(),
    ]);
    let rhs = Vector3::new(
        edges[0].norm_squared() / 2.0,
        edges[1].norm_squared() / 2.0,
        edges[2].norm_squared() / 2.0,
    );

    let det = matrix.determinant();
    let scale = edges[0].norm() * edges[1].norm() * edges[2].norm();
    if !det.is_finite() || det.abs() <= SINGULARITY_RELATIVE_EPSILON * scale {
        return Err(CircumcenterError::MatrixInversionFailed {
            details: format!("bisector matrix is singular (det = {det:e}, scale = {scale:e})"),
        });
    }

    let offset = matrix
        .lu()
        .solve(&rhs)
        .ok_or_else(|| CircumcenterError::MatrixInversionFailed {
            details: "LU decomposition could not solve the bisector system".to_string(),
        })?;

    let center = origin + offset;
    if center.coords.iter().all(|c| c.is_finite()) {
        Ok(center)
    } else {
        Err(CircumcenterError::NonFiniteResult)
    }
}

/// Calculate the circumradius of a tetrahedron.
///
/// # Errors
///
/// Returns an error if the circumcenter cannot be computed.
///
/// # Example
///
/// ```
/// use approx::assert_relative_eq;
/// use tetmesh::geometry::point::Point3;
/// use tetmesh::geometry::util::circumradius;
///
/// let points = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// assert_relative_eq!(circumradius(&points).unwrap(), 0.75_f64.sqrt(), epsilon = 1e-12);
/// ```
pub fn circumradius(points: &[Point3<f64>; 4]) -> Result<f64, CircumcenterError> {
    let center = circumcenter(points)?;
    Ok(circumradius_with_center(points, &center))
}

/// Circumradius given a precomputed circumcenter.
#[inline]
#[must_use]
pub fn circumradius_with_center(points: &[Point3<f64>; 4], center: &Point3<f64>) -> f64 {
    (points[0] - center).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn circumcenter_is_equidistant() {
        let points = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-0.5, 0.866, 0.0),
            Point3::new(-0.5, -0.866, 0.0),
            Point3::new(0.0, 0.0, -0.5),
        ];
        let center = circumcenter(&points).unwrap();
        let r = circumradius_with_center(&points, &center);
        for p in &points {
            assert_relative_eq!((p - center).norm(), r, epsilon = 1e-9);
        }
    }

    #[test]
    fn coplanar_points_fail() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        assert!(matches!(
            circumcenter(&points),
            Err(CircumcenterError::MatrixInversionFailed { .. })
        ));
    }

    #[test]
    fn coincident_points_fail() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!(circumradius(&[p, p, p, p]).is_err());
    }

    #[test]
    fn non_finite_input_fails() {
        let points = [
            Point3::new(f64::NAN, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        assert!(circumcenter(&points).is_err());
    }
}
