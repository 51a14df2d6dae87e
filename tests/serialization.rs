//! Serialization/deserialization of meshes and simplices with `serde_json`.
//!
//! A mesh serializes as the sequence of its tetrahedra; deserialization rebuilds the face
//! registries through `add`, so conflicting input is rejected instead of producing an
//! invalid mesh.

use tetmesh::prelude::*;

#[test]
fn delaunay_mesh_roundtrip() {
    let points = vec![
        [0.0, 0.0, 0.0],
        [2.0, 0.1, 0.0],
        [0.3, 1.9, 0.2],
        [0.1, 0.2, 2.1],
        [1.7, 1.8, 1.6],
        [2.2, -0.4, 1.3],
        [-0.6, 1.1, 1.4],
    ];
    let dt = DelaunayTriangulation::new(&points).unwrap();
    let mesh = dt.mesh();

    let json = serde_json::to_string(mesh).unwrap();
    let restored: TetrahedralMesh<usize> = serde_json::from_str(&json).unwrap();

    assert_eq!(&restored, mesh);
    assert!(restored.is_valid());
    assert_eq!(restored.boundary_len(), mesh.boundary_len());
    assert_eq!(restored.interior_face_count(), mesh.interior_face_count());
    assert!(validate_delaunay(&restored, dt.points(), 1e-10).is_ok());
}

#[test]
fn empty_mesh_roundtrip() {
    let mesh: TetrahedralMesh<u32> = TetrahedralMesh::new();
    let json = serde_json::to_string(&mesh).unwrap();
    assert_eq!(json, "[]");
    let restored: TetrahedralMesh<u32> = serde_json::from_str(&json).unwrap();
    assert!(restored.is_empty());
}

#[test]
fn conflicting_tetrahedra_are_rejected() {
    let t = Tetrahedron::new(0u32, 1, 2, 3);
    // The same tetrahedron twice, once as an even permutation.
    let json = serde_json::to_string(&vec![t, Tetrahedron::new(1, 0, 3, 2)]).unwrap();
    assert!(serde_json::from_str::<TetrahedralMesh<u32>>(&json).is_err());

    let degenerate = serde_json::to_string(&vec![Tetrahedron::new(0u32, 0, 2, 3)]).unwrap();
    assert!(serde_json::from_str::<TetrahedralMesh<u32>>(&degenerate).is_err());
}

#[test]
fn simplices_keep_their_orientation() {
    let face = Triangle::new(4u32, 5, 6);
    let restored: Triangle<u32> = serde_json::from_str(&serde_json::to_string(&face).unwrap()).unwrap();
    assert_eq!(restored, face);
    assert_ne!(restored, face.flip());

    let t = Tetrahedron::new(1u32, 2, 3, 4);
    let restored: Tetrahedron<u32> = serde_json::from_str(&serde_json::to_string(&t).unwrap()).unwrap();
    assert_eq!(restored.vertices(), t.vertices());
    assert_ne!(restored, t.flip());
}

#[test]
fn queue_order_roundtrip() {
    for order in [RepairQueueOrder::Fifo, RepairQueueOrder::Lifo] {
        let json = serde_json::to_string(&order).unwrap();
        let restored: RepairQueueOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, order);
    }
}
