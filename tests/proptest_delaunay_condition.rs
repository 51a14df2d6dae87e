//! Property-based tests for the empty-circumsphere condition.
//!
//! ## Invariants Tested
//!
//! - **Structural validity** - every boundary / interior registration is consistent
//! - **Empty circumsphere** - no vertex lies strictly inside any tetrahedron's circumsphere
//! - **Positive orientation** - every tetrahedron has positive signed volume
//! - **Completeness** - sorted input in general position inserts every point

use proptest::prelude::*;
use tetmesh::prelude::*;

// =============================================================================
// TEST CONFIGURATION
// =============================================================================

const PROPTEST_COORD_NONZERO_EPS: f64 = 1e-6;

/// Strategy for generating finite `f64` coordinates in a reasonable range.
///
/// Near-zero values are excluded as a shrink guard: shrinking drives floats towards `0.0`,
/// where inputs collapse onto coordinate planes and every failure turns into a
/// degeneracy report.
fn finite_coordinate() -> impl Strategy<Value = f64> {
    (-100.0..100.0).prop_filter("must be finite and away from zero", |x: &f64| {
        x.is_finite() && x.abs() > PROPTEST_COORD_NONZERO_EPS
    })
}

fn point() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(finite_coordinate())
}

fn cloud() -> impl Strategy<Value = Vec<[f64; 3]>> {
    prop::collection::vec(point(), 5..24)
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_triangulation_is_valid_and_delaunay(points in cloud()) {
        let dt = match DelaunayTriangulation::new(&points) {
            Ok(dt) => dt,
            Err(DelaunayError::DegenerateInput { .. }) => return Ok(()),
            Err(err) => return Err(TestCaseError::fail(format!("{err}"))),
        };

        prop_assert!(dt.validate().is_ok(), "{:?}", dt.validate());
        let violations = dt.find_delaunay_violations().expect("circumspheres are computable");
        prop_assert!(violations.is_empty(), "violations: {:?}", violations);

        for t in dt.tetrahedra() {
            let [a, b, c, d] = t.vertices();
            let p = dt.points();
            prop_assert_eq!(
                tetrahedron_orientation(&[p[a], p[b], p[c], p[d]]),
                Orientation::POSITIVE,
                "{:?}", t
            );
        }
    }

    #[test]
    fn prop_sorted_input_inserts_every_distinct_point(points in cloud()) {
        let Ok(dt) = DelaunayTriangulation::new(&points) else {
            return Ok(());
        };
        let mut distinct = points.clone();
        distinct.sort_by(|p, q| p.partial_cmp(q).expect("finite coordinates"));
        distinct.dedup();

        prop_assert_eq!(dt.number_of_vertices(), distinct.len());
        prop_assert_eq!(
            dt.statistics().points_inserted + dt.statistics().points_skipped,
            points.len()
        );
    }

    #[test]
    fn prop_boundary_faces_look_outwards(points in cloud()) {
        let Ok(dt) = DelaunayTriangulation::new(&points) else {
            return Ok(());
        };
        let vertices = dt.mesh().vertices();
        let p = dt.points();
        for face in dt.boundary() {
            let [a, b, c] = face.vertices();
            for &v in vertices.iter().filter(|&&v| !face.contains(v)) {
                prop_assert!(
                    !is_front(&p[v], &p[a], &p[b], &p[c]),
                    "vertex {} is in front of hull face {:?}", v, face
                );
            }
        }
    }
}
