//! Pentahedron flips for Delaunay repair.
//!
//! A *pentahedron* is the five-vertex volume formed by two tetrahedra sharing a
//! triangular face plus their two apexes. It can be triangulated either by two
//! tetrahedra glued along the shared face or by three tetrahedra glued around the
//! segment joining the apexes. Exchanging one triangulation for the other is a 2→3 or
//! 3→2 flip:
//!
//! - **2→3** when the apex-to-apex segment crosses the shared face (convex case),
//!   via [`TetrahedralMesh::split_pentahedron`];
//! - **3→2** otherwise, when a third tetrahedron containing both apexes and one edge of
//!   the shared face already fills the concave notch, via
//!   [`TetrahedralMesh::merge_pentahedron`].
//!
//! The repair loop lives in [`crate::core::algorithms::incremental_insertion`]; this
//! module provides the worklist and the single-face repair step.
//!
//! # References
//! - Barry Joe (1991) - "Construction of three-dimensional Delaunay triangulations using
//!   local transformations"

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::algorithms::incremental_insertion::{DelaunayError, lookup};
use crate::core::collections::FastHashSet;
use crate::core::tetrahedral_mesh::TetrahedralMesh;
use crate::core::tetrahedron::Tetrahedron;
use crate::core::triangle::Triangle;
use crate::geometry::point::PointSource;
use crate::geometry::predicates::{InSphere, insphere, segment_crosses_triangle};

/// Lower bound of the per-point flip budget.
pub const MIN_FLIPS_PER_POINT: usize = 128;

/// Default per-point flip budget for a mesh with `tetrahedra` tetrahedra.
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::algorithms::flips::default_max_flips;
///
/// assert_eq!(default_max_flips(0), 128);
/// assert_eq!(default_max_flips(100), 1600);
/// ```
#[must_use]
pub const fn default_max_flips(tetrahedra: usize) -> usize {
    let scaled = tetrahedra.saturating_mul(16);
    if scaled > MIN_FLIPS_PER_POINT {
        scaled
    } else {
        MIN_FLIPS_PER_POINT
    }
}

/// Queue ordering for the Delaunay repair worklist.
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::algorithms::flips::RepairQueueOrder;
///
/// assert_eq!(RepairQueueOrder::default(), RepairQueueOrder::Lifo);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairQueueOrder {
    /// FIFO (breadth-like) ordering.
    Fifo,
    /// LIFO (depth-like) ordering; faces created by a flip are examined first.
    #[default]
    Lifo,
}

/// Kind of pentahedron flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipKind {
    /// Two tetrahedra sharing a face become three sharing an edge.
    TwoToThree,
    /// Three tetrahedra sharing an edge become two sharing a face.
    ThreeToTwo,
}

impl fmt::Display for FlipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoToThree => write!(f, "2->3"),
            Self::ThreeToTwo => write!(f, "3->2"),
        }
    }
}

/// Result of examining one queued face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FaceRepair {
    /// The face is no longer interior; an earlier flip removed it.
    Stale,
    /// The opposite apex is not strictly inside the circumsphere.
    LocallyDelaunay,
    /// A flip restored the local property; the link faces need re-examination.
    Flipped {
        kind: FlipKind,
        link: [Triangle<usize>; 6],
    },
    /// The face violates the property but no flip applies right now.
    Unflippable,
    /// The circumsphere could not be evaluated (flat tetrahedron).
    PredicateFailure,
}

/// Deduplicating worklist of interior faces.
///
/// A face is queued at most once regardless of winding. Violations that cannot be
/// flipped yet are parked in a deferred list and re-queued in bulk.
#[derive(Debug)]
pub(crate) struct RepairQueue {
    order: RepairQueueOrder,
    pending: VecDeque<Triangle<usize>>,
    queued: FastHashSet<Triangle<usize>>,
    deferred: Vec<Triangle<usize>>,
    max_len: usize,
}

impl RepairQueue {
    pub(crate) fn new(order: RepairQueueOrder) -> Self {
        Self {
            order,
            pending: VecDeque::new(),
            queued: FastHashSet::default(),
            deferred: Vec::new(),
            max_len: 0,
        }
    }

    /// Queues `face` unless it (or its flip) is already queued.
    pub(crate) fn push(&mut self, face: Triangle<usize>) -> bool {
        if self.queued.contains(&face) || self.queued.contains(&face.flip()) {
            return false;
        }
        self.queued.insert(face);
        self.pending.push_back(face);
        self.max_len = self.max_len.max(self.pending.len());
        true
    }

    pub(crate) fn pop(&mut self) -> Option<Triangle<usize>> {
        let face = match self.order {
            RepairQueueOrder::Fifo => self.pending.pop_front(),
            RepairQueueOrder::Lifo => self.pending.pop_back(),
        }?;
        self.queued.remove(&face);
        Some(face)
    }

    pub(crate) fn defer(&mut self, face: Triangle<usize>) {
        self.deferred.push(face);
    }

    /// Moves the deferred faces back into the worklist; returns how many were queued.
    pub(crate) fn requeue_deferred(&mut self) -> usize {
        let deferred = std::mem::take(&mut self.deferred);
        deferred.into_iter().filter(|&face| self.push(face)).count()
    }

    pub(crate) fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    pub(crate) const fn max_len(&self) -> usize {
        self.max_len
    }
}

/// The six outer faces of the pentahedron spanned by `bound` and the apexes `pa`
/// (behind `bound`) and `pb` (in front of it).
pub(crate) const fn link_faces(
    bound: Triangle<usize>,
    pa: usize,
    pb: usize,
) -> [Triangle<usize>; 6] {
    let (a, b, c) = (bound.a(), bound.b(), bound.c());
    [
        Triangle::new(pb, a, b),
        Triangle::new(pb, b, c),
        Triangle::new(pb, c, a),
        Triangle::new(pa, b, a),
        Triangle::new(pa, c, b),
        Triangle::new(pa, a, c),
    ]
}

/// Examines the interior face `bound` and flips its pentahedron if the apex on the
/// front side lies strictly inside the circumsphere of the tetrahedron behind it.
///
/// # Errors
///
/// Returns [`DelaunayError::AmbiguousPentahedron`] if more than one edge of `bound`
/// identifies a third tetrahedron for a 3→2 flip, and
/// [`DelaunayError::IndexOutOfBounds`] if the mesh references a point the source does
/// not have.
pub(crate) fn repair_face<P: PointSource + ?Sized>(
    mesh: &mut TetrahedralMesh<usize>,
    points: &P,
    bound: Triangle<usize>,
    tolerance: f64,
) -> Result<FaceRepair, DelaunayError> {
    let hulla = mesh.get_interior(bound).and_then(|t| t.align(bound));
    let hullb = mesh
        .get_interior(bound.flip())
        .and_then(|t| t.align(bound.flip()));
    let (Some(hulla), Some(hullb)) = (hulla, hullb) else {
        return Ok(FaceRepair::Stale);
    };

    let [v0, v1, v2, v3] = hulla.vertices();
    let sphere = [
        lookup(points, v0)?,
        lookup(points, v1)?,
        lookup(points, v2)?,
        lookup(points, v3)?,
    ];
    let pa = hulla.apex();
    let pb = hullb.apex();
    let pb_position = lookup(points, pb)?;

    match insphere(&sphere, &pb_position, tolerance) {
        Ok(InSphere::INSIDE) => {}
        Ok(InSphere::BOUNDARY | InSphere::OUTSIDE) => return Ok(FaceRepair::LocallyDelaunay),
        Err(err) => {
            tracing::debug!("[repair] circumsphere failed for {hulla:?}: {err}");
            return Ok(FaceRepair::PredicateFailure);
        }
    }

    let [a, b, c] = bound.vertices();
    let crosses = segment_crosses_triangle(
        &pb_position,
        &sphere[0],
        &lookup(points, a)?,
        &lookup(points, b)?,
        &lookup(points, c)?,
    );

    if crosses {
        if mesh.split_pentahedron(hulla, hullb) {
            tracing::trace!("[repair] 2->3 flip across {bound:?} (apexes {pa}, {pb})");
            return Ok(FaceRepair::Flipped {
                kind: FlipKind::TwoToThree,
                link: link_faces(bound, pa, pb),
            });
        }
        return Ok(FaceRepair::Unflippable);
    }

    let mut third = None;
    for ((e0, e1), key) in [((a, b), c), ((b, c), a), ((c, a), b)] {
        if mesh.contains(&Tetrahedron::new(pa, pb, e0, e1)) {
            if third.is_some() {
                return Err(DelaunayError::AmbiguousPentahedron {
                    face: format!("{bound:?}"),
                    apexes: (pa, pb),
                });
            }
            third = Some((e0, e1, key));
        }
    }
    let Some((e0, e1, key)) = third else {
        return Ok(FaceRepair::Unflippable);
    };

    let shared = Triangle::new(pa, pb, key);
    let merged_a = Tetrahedron::from_apex_and_base(e1, shared);
    let merged_b = Tetrahedron::from_apex_and_base(e0, shared.flip());
    if mesh.merge_pentahedron(merged_a, merged_b) {
        tracing::trace!("[repair] 3->2 flip around edge ({e0}, {e1}) onto {shared:?}");
        return Ok(FaceRepair::Flipped {
            kind: FlipKind::ThreeToTwo,
            link: link_faces(shared, e1, e0),
        });
    }
    Ok(FaceRepair::Unflippable)
}
