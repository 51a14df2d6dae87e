//! Geometric predicates for tetrahedral meshes.
//!
//! All predicates work on `f64` [`Point3`]s. The sign conventions match the
//! [`Tetrahedron`](crate::core::tetrahedron::Tetrahedron) face layout:
//!
//! - a point is *in front of* the triangle `(a, b, c)` when
//!   `dot(p - a, cross(b - a, c - a)) > 0`;
//! - a tetrahedron `(a, b, c, d)` is *positively oriented* when its apex `a` lies behind
//!   its base `(d, c, b)`. Every face of a positive tetrahedron then has the opposite
//!   vertex behind it, so boundary faces of a positively oriented mesh face outwards.

use std::fmt;

use crate::geometry::point::Point3;
use crate::geometry::util::{CircumcenterError, circumcenter};

/// Relative threshold below which an orientation determinant counts as zero.
const ORIENTATION_RELATIVE_EPSILON: f64 = 1e-12;

/// Represents the position of a point relative to a circumsphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InSphere {
    /// The point is outside the circumsphere
    OUTSIDE,
    /// The point is on the boundary of the circumsphere (within numerical tolerance)
    BOUNDARY,
    /// The point is inside the circumsphere
    INSIDE,
}

impl fmt::Display for InSphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// Represents the orientation of a tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The apex lies in front of the base
    NEGATIVE,
    /// The four points are coplanar (within numerical tolerance)
    DEGENERATE,
    /// The apex lies behind the base
    POSITIVE,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

/// Signed triple product `dot(p - a, cross(b - a, c - a))`.
///
/// Positive when `p` is in front of the triangle `(a, b, c)`, negative behind it and
/// zero when the four points are coplanar. Its magnitude is six times the volume of the
/// tetrahedron spanned by the four points.
#[inline]
#[must_use]
pub fn orient3d(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, p: &Point3<f64>) -> f64 {
    (p - a).dot(&(b - a).cross(&(c - a)))
}

/// Returns `true` if `p` lies strictly in front of the triangle `(a, b, c)`.
///
/// # Examples
///
/// ```rust
/// use tetmesh::geometry::point::Point3;
/// use tetmesh::geometry::predicates::is_front;
///
/// let a = Point3::new(0.0, 0.0, 0.0);
/// let b = Point3::new(1.0, 0.0, 0.0);
/// let c = Point3::new(0.0, 1.0, 0.0);
/// assert!(is_front(&Point3::new(0.2, 0.2, 1.0), &a, &b, &c));
/// assert!(!is_front(&Point3::new(0.2, 0.2, -1.0), &a, &b, &c));
/// // Coplanar points are not in front.
/// assert!(!is_front(&Point3::new(5.0, 5.0, 0.0), &a, &b, &c));
/// ```
#[inline]
#[must_use]
pub fn is_front(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> bool {
    orient3d(a, b, c, p) > 0.0
}

/// Orientation of the tetrahedron whose vertices, in `(a, b, c, d)` order, sit at
/// `points`.
///
/// The determinant is compared against a threshold relative to the product of the edge
/// lengths from `d`, so scaling the input does not change the classification.
///
/// # Examples
///
/// ```rust
/// use tetmesh::geometry::point::Point3;
/// use tetmesh::geometry::predicates::{Orientation, tetrahedron_orientation};
///
/// let base = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
/// ];
/// // Apex below the base (d, c, b) = (origin, x, y), whose front side is +z.
/// let positive = [Point3::new(0.0, 0.0, -1.0), base[1], base[2], base[0]];
/// assert_eq!(tetrahedron_orientation(&positive), Orientation::POSITIVE);
///
/// let flat = [Point3::new(0.3, 0.3, 0.0), base[1], base[2], base[0]];
/// assert_eq!(tetrahedron_orientation(&flat), Orientation::DEGENERATE);
/// ```
#[must_use]
pub fn tetrahedron_orientation(points: &[Point3<f64>; 4]) -> Orientation {
    let [a, b, c, d] = points;
    let det = orient3d(d, c, b, a);
    let scale = (c - d).norm() * (b - d).norm() * (a - d).norm();
    if !det.is_finite() || det.abs() <= ORIENTATION_RELATIVE_EPSILON * scale {
        Orientation::DEGENERATE
    } else if det < 0.0 {
        Orientation::POSITIVE
    } else {
        Orientation::NEGATIVE
    }
}

/// Signed volume of the tetrahedron at `points`; positive for positive orientation.
///
/// # Examples
///
/// ```rust
/// use approx::assert_relative_eq;
/// use tetmesh::geometry::point::Point3;
/// use tetmesh::geometry::predicates::signed_volume;
///
/// let points = [
///     Point3::new(0.0, 0.0, -1.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 0.0, 0.0),
/// ];
/// assert_relative_eq!(signed_volume(&points), 1.0 / 6.0);
/// ```
#[inline]
#[must_use]
pub fn signed_volume(points: &[Point3<f64>; 4]) -> f64 {
    let [a, b, c, d] = points;
    -orient3d(d, c, b, a) / 6.0
}

/// Classifies `test` against the circumsphere of the tetrahedron at `points`.
///
/// `tolerance` is relative to the squared circumradius: `test` is [`InSphere::BOUNDARY`]
/// when `|dist² - r²| <= tolerance · r²`. A tolerance of zero gives the raw
/// floating-point classification.
///
/// # Errors
///
/// Returns a [`CircumcenterError`] if the four points are (numerically) coplanar or the
/// computation produces non-finite values.
///
/// # Examples
///
/// ```rust
/// use tetmesh::geometry::point::Point3;
/// use tetmesh::geometry::predicates::{InSphere, insphere};
///
/// let points = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// assert_eq!(insphere(&points, &Point3::new(0.5, 0.5, 0.5), 1e-10).unwrap(), InSphere::INSIDE);
/// assert_eq!(insphere(&points, &Point3::new(1.0, 1.0, 0.0), 1e-10).unwrap(), InSphere::BOUNDARY);
/// assert_eq!(insphere(&points, &Point3::new(3.0, 3.0, 3.0), 1e-10).unwrap(), InSphere::OUTSIDE);
/// ```
pub fn insphere(
    points: &[Point3<f64>; 4],
    test: &Point3<f64>,
    tolerance: f64,
) -> Result<InSphere, CircumcenterError> {
    let center = circumcenter(points)?;
    let radius_squared = (points[0] - center).norm_squared();
    insphere_with_center(&center, radius_squared, test, tolerance)
}

/// Classifies `test` against a precomputed circumsphere, with the same tolerance rule
/// as [`insphere`].
///
/// # Errors
///
/// Returns [`CircumcenterError::NonFiniteResult`] if the distance comparison is not
/// finite.
pub fn insphere_with_center(
    center: &Point3<f64>,
    radius_squared: f64,
    test: &Point3<f64>,
    tolerance: f64,
) -> Result<InSphere, CircumcenterError> {
    let distance_squared = (test - center).norm_squared();
    let slack = tolerance.abs() * radius_squared;
    let difference = distance_squared - radius_squared;

    if !difference.is_finite() {
        return Err(CircumcenterError::NonFiniteResult);
    }
    Ok(if difference < -slack {
        InSphere::INSIDE
    } else if difference > slack {
        InSphere::OUTSIDE
    } else {
        InSphere::BOUNDARY
    })
}

/// Returns `true` if the segment `start → end` passes strictly through the interior of
/// the triangle `(a, b, c)`.
///
/// Touching an edge, a vertex, or the plane of the triangle at an endpoint does not
/// count as a crossing.
///
/// # Examples
///
/// ```rust
/// use tetmesh::geometry::point::Point3;
/// use tetmesh::geometry::predicates::segment_crosses_triangle;
///
/// let a = Point3::new(0.0, 0.0, 0.0);
/// let b = Point3::new(1.0, 0.0, 0.0);
/// let c = Point3::new(0.0, 1.0, 0.0);
/// let above = Point3::new(0.2, 0.2, 1.0);
/// let below = Point3::new(0.2, 0.2, -1.0);
/// assert!(segment_crosses_triangle(&above, &below, &a, &b, &c));
/// assert!(!segment_crosses_triangle(&above, &Point3::new(3.0, 3.0, -1.0), &a, &b, &c));
/// ```
#[must_use]
pub fn segment_crosses_triangle(
    start: &Point3<f64>,
    end: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> bool {
    let side_start = orient3d(a, b, c, start);
    let side_end = orient3d(a, b, c, end);
    if !(side_start > 0.0 && side_end < 0.0 || side_start < 0.0 && side_end > 0.0) {
        return false;
    }

    let edge_ab = orient3d(start, end, a, b);
    let edge_bc = orient3d(start, end, b, c);
    let edge_ca = orient3d(start, end, c, a);
    edge_ab > 0.0 && edge_bc > 0.0 && edge_ca > 0.0
        || edge_ab < 0.0 && edge_bc < 0.0 && edge_ca < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_tetrahedron() -> [Point3<f64>; 4] {
        // Apex below the xy base (d, c, b) = (origin, x, y).
        [
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn orientation_and_volume_agree() {
        let t = unit_tetrahedron();
        assert_eq!(tetrahedron_orientation(&t), Orientation::POSITIVE);
        assert_relative_eq!(signed_volume(&t), 1.0 / 6.0);

        let flipped = [t[0], t[2], t[1], t[3]];
        assert_eq!(tetrahedron_orientation(&flipped), Orientation::NEGATIVE);
        assert_relative_eq!(signed_volume(&flipped), -1.0 / 6.0);
    }

    #[test]
    fn positive_tetrahedron_has_opposite_vertices_behind_every_face() {
        let p = unit_tetrahedron();
        // Faces (a, b, c), (b, a, d), (c, d, a), (d, c, b) with opposite d, c, b, a.
        let faces = [
            ([0, 1, 2], 3),
            ([1, 0, 3], 2),
            ([2, 3, 0], 1),
            ([3, 2, 1], 0),
        ];
        for ([i, j, k], opposite) in faces {
            assert!(
                orient3d(&p[i], &p[j], &p[k], &p[opposite]) < 0.0,
                "face ({i}, {j}, {k})"
            );
        }
    }

    #[test]
    fn orientation_is_scale_invariant() {
        let t = unit_tetrahedron().map(|p| Point3::from(p.coords * 1e-6));
        assert_eq!(tetrahedron_orientation(&t), Orientation::POSITIVE);
        let t = unit_tetrahedron().map(|p| Point3::from(p.coords * 1e6));
        assert_eq!(tetrahedron_orientation(&t), Orientation::POSITIVE);
    }

    #[test]
    fn insphere_tolerance_classifies_cube_corners_as_boundary() {
        let cube = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let corner = Point3::new(1.0, 1.0, 1.0);
        assert_eq!(insphere(&cube, &corner, 1e-10).unwrap(), InSphere::BOUNDARY);
    }

    #[test]
    fn insphere_rejects_flat_tetrahedra() {
        let flat = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        assert!(insphere(&flat, &Point3::origin(), 1e-10).is_err());
    }

    #[test]
    fn segment_crossing_is_strict() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let up = Point3::new(0.25, 0.25, 1.0);
        let down = Point3::new(0.25, 0.25, -1.0);
        assert!(segment_crosses_triangle(&up, &down, &a, &b, &c));
        assert!(segment_crosses_triangle(&down, &up, &a, &b, &c));
        // Through a vertex.
        assert!(!segment_crosses_triangle(
            &Point3::new(0.0, 0.0, 1.0),
            &Point3::new(0.0, 0.0, -1.0),
            &a,
            &b,
            &c
        ));
        // Ends on the plane.
        assert!(!segment_crosses_triangle(&up, &Point3::new(0.25, 0.25, 0.0), &a, &b, &c));
        // Both ends on one side.
        assert!(!segment_crosses_triangle(&up, &Point3::new(0.1, 0.1, 2.0), &a, &b, &c));
    }

    #[test]
    fn display_impls() {
        assert_eq!(InSphere::INSIDE.to_string(), "INSIDE");
        assert_eq!(Orientation::DEGENERATE.to_string(), "DEGENERATE");
    }
}
