//! End-to-end Delaunay tetrahedralization scenarios.
//!
//! Known configurations with hand-checked results, followed by seeded random clouds
//! that are validated against the empty-circumsphere property and Euler's formula.

use approx::assert_relative_eq;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tetmesh::prelude::*;

// =============================================================================
// HELPERS
// =============================================================================

/// A triangle of circumradius 1 in the `z = 0` plane, an apex slightly below it and one
/// well above it. The lower sphere contains the upper apex, so the two initial
/// tetrahedra must be replaced by three around the axis.
fn triangular_bipyramid() -> Vec<[f64; 3]> {
    let h = 3.0_f64.sqrt() / 2.0;
    vec![
        [1.0, 0.0, 0.0],
        [-0.5, h, 0.0],
        [-0.5, -h, 0.0],
        [0.0, 0.0, -0.5],
        [0.0, 0.0, 1.0],
    ]
}

fn unit_cube() -> Vec<[f64; 3]> {
    let mut corners = Vec::with_capacity(8);
    for x in [0.0, 1.0] {
        for y in [0.0, 1.0] {
            for z in [0.0, 1.0] {
                corners.push([x, y, z]);
            }
        }
    }
    corners
}

fn random_cloud(seed: u64, count: usize, extent: f64) -> Vec<[f64; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            [
                rng.random_range(-extent..extent),
                rng.random_range(-extent..extent),
                rng.random_range(-extent..extent),
            ]
        })
        .collect()
}

/// V - E + F - T for the mesh; 1 for any triangulated 3-ball.
#[allow(clippy::cast_possible_wrap)]
fn euler_characteristic(mesh: &TetrahedralMesh<usize>) -> isize {
    let mut edges: FastHashSet<(usize, usize)> = FastHashSet::default();
    for t in mesh.tetrahedra() {
        let v = t.vertices();
        for i in 0..4 {
            for j in (i + 1)..4 {
                edges.insert((v[i].min(v[j]), v[i].max(v[j])));
            }
        }
    }
    let vertices = mesh.vertices().len() as isize;
    let faces = (mesh.boundary_len() + mesh.interior_face_count()) as isize;
    vertices - edges.len() as isize + faces - mesh.len() as isize
}

fn positive_volumes(dt: &DelaunayTriangulation) -> bool {
    dt.tetrahedra().all(|t| {
        let [a, b, c, d] = t.vertices();
        let p = dt.points();
        signed_volume(&[p[a], p[b], p[c], p[d]]) > 0.0
    })
}

// =============================================================================
// KNOWN CONFIGURATIONS
// =============================================================================

#[test]
fn bipyramid_needs_one_two_to_three_flip() {
    let points = triangular_bipyramid();
    let dt = DelaunayTriangulation::from_ordered(&points, IncrementerConfig::default()).unwrap();

    assert_eq!(dt.number_of_tetrahedra(), 3);
    assert_eq!(dt.statistics().flips_two_to_three, 1);
    assert_eq!(dt.statistics().flips_three_to_two, 0);
    assert!(dt.is_valid());
    assert!(dt.find_delaunay_violations().unwrap().is_empty());

    // Every tetrahedron contains the axis (3, 4).
    for t in dt.tetrahedra() {
        assert!(t.contains(3) && t.contains(4), "{t:?}");
    }
    assert_eq!(dt.boundary().count(), 6);
    assert!(positive_volumes(&dt));

    let base_area = 3.0 * 3.0_f64.sqrt() / 4.0;
    assert_relative_eq!(dt.volume(), base_area * 1.5 / 3.0, epsilon = 1e-12);
}

#[test]
fn bipyramid_result_does_not_depend_on_order() {
    let points = triangular_bipyramid();
    let ordered = DelaunayTriangulation::from_ordered(&points, IncrementerConfig::default()).unwrap();
    let sorted = DelaunayTriangulation::new(&points).unwrap();
    assert_eq!(sorted.mesh(), ordered.mesh());
}

#[test]
fn cube_is_split_without_flips() {
    let dt = DelaunayTriangulation::new(&unit_cube()).unwrap();

    assert!(dt.is_valid());
    assert_eq!(dt.number_of_vertices(), 8);
    assert_eq!(dt.boundary().count(), 12);
    assert_eq!(dt.statistics().flips(), 0);
    assert_relative_eq!(dt.volume(), 1.0, epsilon = 1e-12);
    assert!(positive_volumes(&dt));
    assert!(dt.validate_delaunay().is_ok());
    assert_eq!(euler_characteristic(dt.mesh()), 1);

    // Every hull face lies in one of the six cube planes.
    for face in dt.boundary() {
        let [a, b, c] = face.vertices();
        let p = dt.points();
        let on_common_plane = (0..3).any(|axis| p[a][axis] == p[b][axis] && p[b][axis] == p[c][axis]);
        assert!(on_common_plane, "{face:?}");
    }
}

#[test]
fn duplicate_points_are_skipped() {
    let mut points = unit_cube();
    points.push([1.0, 1.0, 1.0]);
    points.push([0.0, 0.0, 0.0]);
    let dt = DelaunayTriangulation::new(&points).unwrap();

    assert_eq!(dt.number_of_vertices(), 8);
    assert_eq!(dt.statistics().points_skipped, 2);
    assert_relative_eq!(dt.volume(), 1.0, epsilon = 1e-12);
    assert!(dt.validate_delaunay().is_ok());
}

#[test]
fn degenerate_inputs_are_rejected() {
    let planar = vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
        [2.0, 3.0, 0.0],
    ];
    assert!(matches!(
        DelaunayTriangulation::new(&planar),
        Err(DelaunayError::DegenerateInput { .. })
    ));

    let too_few = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    assert_eq!(
        DelaunayTriangulation::new(&too_few).err(),
        Some(DelaunayError::InsufficientVertices { found: 3 })
    );

    let nan = vec![
        [0.0, 0.0, 0.0],
        [f64::NAN, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    assert_eq!(
        DelaunayTriangulation::new(&nan).err(),
        Some(DelaunayError::NonFiniteCoordinate { index: 1 })
    );
}

#[test]
fn incremental_api_matches_batch() {
    let points = random_cloud(7, 24, 5.0);
    let mut sorted = points.clone();
    sorted.sort_by(|p, q| p.partial_cmp(q).expect("finite coordinates"));

    let mut incrementer = DelaunayIncrementer::new(&sorted, IncrementerConfig::default()).unwrap();
    for index in 0..sorted.len() {
        if !incrementer.is_inserted(index) {
            assert!(incrementer.insert(index).unwrap());
        }
        assert!(incrementer.mesh().is_valid());
    }
    assert_eq!(
        incrementer.insert(0),
        Err(DelaunayError::VertexAlreadyInserted { index: 0 })
    );

    let (batch, _) = tetrahedralize(&sorted, IncrementerConfig::default()).unwrap();
    assert_eq!(incrementer.mesh(), &batch);
}

// =============================================================================
// RANDOM CLOUDS
// =============================================================================

#[test]
fn random_clouds_are_delaunay() {
    for (seed, count) in [(1_u64, 10_usize), (2, 25), (3, 50), (42, 80)] {
        let points = random_cloud(seed, count, 10.0);
        let dt = DelaunayTriangulation::new(&points).unwrap();

        assert!(dt.validate().is_ok(), "seed {seed}: {:?}", dt.validate());
        assert_eq!(dt.number_of_vertices(), count, "seed {seed}");
        assert_eq!(dt.statistics().points_skipped, 0, "seed {seed}");
        assert_eq!(dt.statistics().budget_exhaustions, 0, "seed {seed}");
        assert!(positive_volumes(&dt), "seed {seed}");
        assert_eq!(euler_characteristic(dt.mesh()), 1, "seed {seed}");
        assert!(
            dt.find_delaunay_violations().unwrap().is_empty(),
            "seed {seed}: {}",
            dt.statistics()
        );
    }
}

#[test]
fn fifo_and_lifo_worklists_agree() {
    let points = random_cloud(11, 40, 3.0);
    let fifo = IncrementerConfigBuilder::default()
        .queue_order(RepairQueueOrder::Fifo)
        .build()
        .unwrap();
    let lifo = IncrementerConfigBuilder::default()
        .queue_order(RepairQueueOrder::Lifo)
        .build()
        .unwrap();

    let a = DelaunayTriangulation::with_config(&points, fifo).unwrap();
    let b = DelaunayTriangulation::with_config(&points, lifo).unwrap();
    assert!(a.validate_delaunay().is_ok());
    assert!(b.validate_delaunay().is_ok());
    // Points in general position have a unique Delaunay tetrahedralization.
    assert_eq!(a.mesh(), b.mesh());
}

#[test]
fn translated_and_scaled_clouds_keep_their_combinatorics() {
    let points = random_cloud(5, 30, 1.0);
    let moved: Vec<[f64; 3]> = points
        .iter()
        .map(|&[x, y, z]| [x * 1000.0 + 50.0, y * 1000.0 - 20.0, z * 1000.0 + 7.0])
        .collect();

    let a = DelaunayTriangulation::new(&points).unwrap();
    let b = DelaunayTriangulation::new(&moved).unwrap();
    assert!(b.validate_delaunay().is_ok());
    assert_eq!(a.mesh(), b.mesh());
}
