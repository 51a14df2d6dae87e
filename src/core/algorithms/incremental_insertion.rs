//! Incremental Delaunay insertion with pentahedron flips.
//!
//! [`DelaunayIncrementer`] builds a [`TetrahedralMesh`] over point indices:
//!
//! 1. **Seed** with the first four non-degenerate points, oriented positively.
//! 2. For each further point `P`, in input order:
//!    - find every boundary face that has `P` strictly in front of it;
//!    - glue a tetrahedron `(P, x, y, z)` onto each such face `(x, y, z)`;
//!    - push the faces that just became interior onto the repair worklist;
//!    - pop faces and apply 2→3 / 3→2 flips (see [`crate::core::algorithms::flips`])
//!      until no queued face violates the empty-circumsphere property.
//!
//! Points are expected in an order that grows the hull outwards (for instance
//! lexicographic order); the incrementer does not sort. A point that sees no boundary
//! face is inside the current hull or coincides with an inserted point, and is skipped
//! with a warning. Use
//! [`DelaunayTriangulation`](crate::core::delaunay_triangulation::DelaunayTriangulation)
//! to sort arbitrary input first.
//!
//! # Termination
//!
//! The worklist never holds a face twice. Violations that cannot be flipped yet are
//! deferred and re-examined only after a pass that flipped something, and each point
//! has a flip budget ([`IncrementerConfig::max_flips_per_point`]). Cospherical input
//! (exact ties within [`IncrementerConfig::insphere_tolerance`]) never flips.

use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

use crate::core::algorithms::flips::{
    FaceRepair, FlipKind, RepairQueue, RepairQueueOrder, default_max_flips, repair_face,
};
use crate::core::collections::VisibleFacesBuffer;
use crate::core::tetrahedral_mesh::TetrahedralMesh;
use crate::core::tetrahedron::Tetrahedron;
use crate::core::triangle::Triangle;
use crate::geometry::point::{Point3, PointSource};
use crate::geometry::predicates::{Orientation, is_front, tetrahedron_orientation};

/// Default relative tolerance of the in-sphere test.
pub const DEFAULT_INSPHERE_TOLERANCE: f64 = 1e-10;

/// Index skipped by [`IncrementerConfig::skip_reserved_index`].
pub const RESERVED_INDEX: usize = 4;

/// Relative threshold for collinearity during seed selection.
const COLLINEAR_RELATIVE_EPSILON: f64 = 1e-12;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised while building a Delaunay tetrahedralization.
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::algorithms::incremental_insertion::DelaunayError;
///
/// let err = DelaunayError::InsufficientVertices { found: 3 };
/// assert!(err.to_string().contains('3'));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DelaunayError {
    /// Fewer than four points were supplied.
    #[error("At least 4 points are required, found {found}")]
    InsufficientVertices {
        /// Number of points supplied.
        found: usize,
    },
    /// A point has a NaN or infinite coordinate.
    #[error("Point {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        index: usize,
    },
    /// No four points span a tetrahedron.
    #[error("Degenerate input: {reason}")]
    DegenerateInput {
        /// Which seed condition failed.
        reason: String,
    },
    /// A vertex index does not address a point.
    #[error("Point index {index} out of bounds (len = {len})")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of points.
        len: usize,
    },
    /// The point is already part of the mesh.
    #[error("Point {index} has already been inserted")]
    VertexAlreadyInserted {
        /// Index of the point.
        index: usize,
    },
    /// More than one edge of a violating face identifies a third tetrahedron.
    #[error("Ambiguous 3->2 flip across face {face} with apexes {apexes:?}")]
    AmbiguousPentahedron {
        /// Debug rendering of the face.
        face: String,
        /// Apex behind and in front of the face.
        apexes: (usize, usize),
    },
}

/// Resolves `index` through `points`.
///
/// # Errors
///
/// Returns [`DelaunayError::IndexOutOfBounds`] if the index is out of range.
pub(crate) fn lookup<P: PointSource + ?Sized>(
    points: &P,
    index: usize,
) -> Result<Point3<f64>, DelaunayError> {
    points
        .position(index)
        .ok_or(DelaunayError::IndexOutOfBounds {
            index,
            len: points.len(),
        })
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Tuning knobs for [`DelaunayIncrementer`].
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::algorithms::flips::RepairQueueOrder;
/// use tetmesh::core::algorithms::incremental_insertion::{
///     IncrementerConfig, IncrementerConfigBuilder,
/// };
///
/// let config = IncrementerConfigBuilder::default()
///     .queue_order(RepairQueueOrder::Fifo)
///     .max_flips_per_point(64)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_flips_per_point, Some(64));
/// assert!(!config.skip_reserved_index);
///
/// assert!(IncrementerConfigBuilder::default().insphere_tolerance(-1.0).build().is_err());
/// assert_eq!(IncrementerConfig::default().queue_order, RepairQueueOrder::Lifo);
/// ```
#[derive(Builder, Clone, Copy, Debug, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct IncrementerConfig {
    /// Do not insert index [`RESERVED_INDEX`] unless it is part of the seed.
    #[builder(default = "false")]
    pub skip_reserved_index: bool,
    /// Flip budget per inserted point; `None` derives it from the mesh size.
    #[builder(default, setter(strip_option))]
    pub max_flips_per_point: Option<usize>,
    /// Relative tolerance of the in-sphere test (fraction of the squared radius).
    #[builder(default = "DEFAULT_INSPHERE_TOLERANCE")]
    pub insphere_tolerance: f64,
    /// Order in which the repair worklist is drained.
    #[builder(default)]
    pub queue_order: RepairQueueOrder,
}

impl Default for IncrementerConfig {
    fn default() -> Self {
        Self {
            skip_reserved_index: false,
            max_flips_per_point: None,
            insphere_tolerance: DEFAULT_INSPHERE_TOLERANCE,
            queue_order: RepairQueueOrder::default(),
        }
    }
}

impl IncrementerConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(tolerance) = self.insphere_tolerance {
            if !(tolerance.is_finite() && tolerance >= 0.0) {
                return Err(format!(
                    "insphere_tolerance must be finite and non-negative, got {tolerance}"
                ));
            }
        }
        if let Some(Some(0)) = self.max_flips_per_point {
            return Err("max_flips_per_point must be positive".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Counters collected during insertion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertionStatistics {
    /// Points that became mesh vertices (seed included).
    pub points_inserted: usize,
    /// Points skipped because no boundary face was visible.
    pub points_skipped: usize,
    /// Tetrahedra added by the seed, hull extension and flips.
    pub tetrahedra_created: usize,
    /// Faces popped from the repair worklist.
    pub faces_checked: usize,
    /// 2→3 flips performed.
    pub flips_two_to_three: usize,
    /// 3→2 flips performed.
    pub flips_three_to_two: usize,
    /// Violations that could not be flipped when examined.
    pub faces_deferred: usize,
    /// Points whose flip budget ran out.
    pub budget_exhaustions: usize,
    /// Circumsphere evaluations that failed on flat tetrahedra.
    pub predicate_failures: usize,
    /// Largest worklist length observed.
    pub max_queue_len: usize,
}

impl InsertionStatistics {
    /// Total number of flips.
    #[must_use]
    pub const fn flips(&self) -> usize {
        self.flips_two_to_three + self.flips_three_to_two
    }
}

impl fmt::Display for InsertionStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inserted={} skipped={} created={} checked={} flips(2->3={}, 3->2={}) deferred={} budget_exhausted={} predicate_failures={} max_queue={}",
            self.points_inserted,
            self.points_skipped,
            self.tetrahedra_created,
            self.faces_checked,
            self.flips_two_to_three,
            self.flips_three_to_two,
            self.faces_deferred,
            self.budget_exhaustions,
            self.predicate_failures,
            self.max_queue_len,
        )
    }
}

// =============================================================================
// INCREMENTER
// =============================================================================

/// Incremental Delaunay tetrahedralization over the indices of a [`PointSource`].
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::algorithms::incremental_insertion::{
///     DelaunayIncrementer, IncrementerConfig,
/// };
///
/// let points = vec![
///     [0.0, 0.0, 0.0],
///     [0.0, 0.0, 1.0],
///     [0.0, 1.0, 0.0],
///     [1.0, 0.0, 0.0],
///     [1.0, 1.0, 1.0],
/// ];
/// let mut incrementer = DelaunayIncrementer::new(&points, IncrementerConfig::default()).unwrap();
/// assert_eq!(incrementer.mesh().len(), 1);
/// incrementer.insert_remaining().unwrap();
/// assert_eq!(incrementer.statistics().points_inserted, 5);
/// assert!(incrementer.mesh().is_valid());
/// ```
pub struct DelaunayIncrementer<'a, P: ?Sized> {
    points: &'a P,
    config: IncrementerConfig,
    mesh: TetrahedralMesh<usize>,
    seed: Tetrahedron<usize>,
    inserted: Vec<bool>,
    statistics: InsertionStatistics,
}

impl<'a, P: PointSource + ?Sized> DelaunayIncrementer<'a, P> {
    /// Validates the input and adds the positively oriented seed tetrahedron.
    ///
    /// # Errors
    ///
    /// Returns [`DelaunayError::InsufficientVertices`] for fewer than four points,
    /// [`DelaunayError::NonFiniteCoordinate`] for NaN / infinite coordinates and
    /// [`DelaunayError::DegenerateInput`] if no four points span a tetrahedron.
    pub fn new(points: &'a P, config: IncrementerConfig) -> Result<Self, DelaunayError> {
        let len = points.len();
        if len < 4 {
            return Err(DelaunayError::InsufficientVertices { found: len });
        }
        for index in 0..len {
            let position = lookup(points, index)?;
            if !position.coords.iter().all(|c| c.is_finite()) {
                return Err(DelaunayError::NonFiniteCoordinate { index });
            }
        }

        let seed = find_seed(points)?;
        let mut mesh = TetrahedralMesh::with_capacity(len.saturating_mul(6));
        mesh.add_unchecked(seed);

        let mut inserted = vec![false; len];
        for index in seed.vertices() {
            inserted[index] = true;
        }
        tracing::debug!("[insert] seed {seed:?} from {len} points");

        Ok(Self {
            points,
            config,
            mesh,
            seed,
            inserted,
            statistics: InsertionStatistics {
                points_inserted: 4,
                tetrahedra_created: 1,
                ..InsertionStatistics::default()
            },
        })
    }

    /// The mesh built so far.
    #[must_use]
    pub const fn mesh(&self) -> &TetrahedralMesh<usize> {
        &self.mesh
    }

    /// Consumes the incrementer and returns the mesh.
    #[must_use]
    pub fn into_mesh(self) -> TetrahedralMesh<usize> {
        self.mesh
    }

    /// The seed tetrahedron.
    #[must_use]
    pub const fn seed(&self) -> Tetrahedron<usize> {
        self.seed
    }

    /// Counters collected so far.
    #[must_use]
    pub const fn statistics(&self) -> &InsertionStatistics {
        &self.statistics
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &IncrementerConfig {
        &self.config
    }

    /// Returns `true` if `index` is a vertex of the mesh.
    #[must_use]
    pub fn is_inserted(&self, index: usize) -> bool {
        self.inserted.get(index).copied().unwrap_or(false)
    }

    /// Inserts every point not inserted yet, in index order.
    ///
    /// # Errors
    ///
    /// Propagates the first error of [`Self::insert`].
    pub fn insert_remaining(&mut self) -> Result<(), DelaunayError> {
        for index in 0..self.inserted.len() {
            if self.inserted[index]
                || (self.config.skip_reserved_index && index == RESERVED_INDEX)
            {
                continue;
            }
            self.insert(index)?;
        }
        tracing::debug!("[insert] finished: {}", self.statistics);
        Ok(())
    }

    /// Inserts the point at `index` and restores the Delaunay property around it.
    ///
    /// Returns `Ok(false)` if the point sees no boundary face (it lies inside the
    /// current hull or on top of an inserted point) and was skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DelaunayError::IndexOutOfBounds`], [`DelaunayError::VertexAlreadyInserted`]
    /// or [`DelaunayError::AmbiguousPentahedron`].
    pub fn insert(&mut self, index: usize) -> Result<bool, DelaunayError> {
        let position = lookup(self.points, index)?;
        if self.is_inserted(index) {
            return Err(DelaunayError::VertexAlreadyInserted { index });
        }

        let mut visible: VisibleFacesBuffer<usize> = SmallVec::new();
        for face in self.mesh.boundary() {
            let [a, b, c] = face.vertices();
            let (a, b, c) = (
                lookup(self.points, a)?,
                lookup(self.points, b)?,
                lookup(self.points, c)?,
            );
            if is_front(&position, &a, &b, &c) {
                visible.push(*face);
            }
        }

        if visible.is_empty() {
            tracing::warn!("[insert] point {index} sees no boundary face; skipped");
            self.statistics.points_skipped += 1;
            return Ok(false);
        }

        for face in &visible {
            let [x, y, z] = face.vertices();
            if self.mesh.add(Tetrahedron::new(index, x, y, z)) {
                self.statistics.tetrahedra_created += 1;
            } else {
                tracing::warn!("[insert] hull extension of point {index} over {face:?} conflicts");
            }
        }
        self.inserted[index] = true;
        self.statistics.points_inserted += 1;

        self.repair(&visible)?;
        Ok(true)
    }

    /// Drains the flip worklist seeded with `faces`.
    fn repair(&mut self, faces: &[Triangle<usize>]) -> Result<(), DelaunayError> {
        let budget = self
            .config
            .max_flips_per_point
            .unwrap_or_else(|| default_max_flips(self.mesh.len()));
        let mut queue = RepairQueue::new(self.config.queue_order);
        for &face in faces {
            queue.push(face);
        }

        let mut flips = 0usize;
        'repair: loop {
            let mut flipped = false;
            while let Some(bound) = queue.pop() {
                self.statistics.faces_checked += 1;
                match repair_face(
                    &mut self.mesh,
                    self.points,
                    bound,
                    self.config.insphere_tolerance,
                )? {
                    FaceRepair::Stale | FaceRepair::LocallyDelaunay => {}
                    FaceRepair::PredicateFailure => self.statistics.predicate_failures += 1,
                    FaceRepair::Unflippable => {
                        self.statistics.faces_deferred += 1;
                        queue.defer(bound);
                    }
                    FaceRepair::Flipped { kind, link } => {
                        match kind {
                            FlipKind::TwoToThree => {
                                self.statistics.flips_two_to_three += 1;
                                self.statistics.tetrahedra_created += 3;
                            }
                            FlipKind::ThreeToTwo => {
                                self.statistics.flips_three_to_two += 1;
                                self.statistics.tetrahedra_created += 2;
                            }
                        }
                        flipped = true;
                        flips += 1;
                        for face in link {
                            if self.mesh.get_interior(face).is_some() {
                                queue.push(face);
                            }
                        }
                        if flips >= budget {
                            tracing::warn!(
                                "[repair] flip budget of {budget} exhausted; Delaunay repair stopped early"
                            );
                            self.statistics.budget_exhaustions += 1;
                            break 'repair;
                        }
                    }
                }
            }
            if !flipped || queue.requeue_deferred() == 0 {
                break;
            }
        }

        self.statistics.max_queue_len = self.statistics.max_queue_len.max(queue.max_len());
        if queue.deferred_len() > 0 {
            tracing::warn!(
                "[repair] {} violating faces could not be flipped",
                queue.deferred_len()
            );
        }
        Ok(())
    }
}

/// Builds a Delaunay tetrahedralization of `points` in index order.
///
/// # Errors
///
/// See [`DelaunayIncrementer::new`] and [`DelaunayIncrementer::insert`].
///
/// # Examples
///
/// ```rust
/// use tetmesh::core::algorithms::incremental_insertion::{IncrementerConfig, tetrahedralize};
///
/// let points = vec![
///     [0.0, 0.0, 0.0],
///     [0.0, 0.0, 1.0],
///     [0.0, 1.0, 0.0],
///     [1.0, 0.0, 0.0],
/// ];
/// let (mesh, stats) = tetrahedralize(&points, IncrementerConfig::default()).unwrap();
/// assert_eq!(mesh.len(), 1);
/// assert_eq!(stats.flips(), 0);
/// ```
pub fn tetrahedralize<P: PointSource + ?Sized>(
    points: &P,
    config: IncrementerConfig,
) -> Result<(TetrahedralMesh<usize>, InsertionStatistics), DelaunayError> {
    let mut incrementer = DelaunayIncrementer::new(points, config)?;
    incrementer.insert_remaining()?;
    let statistics = incrementer.statistics;
    Ok((incrementer.into_mesh(), statistics))
}

/// Picks index 0, the first point distinct from it, the first point off their line and
/// the first point off their plane, and orients the result positively.
fn find_seed<P: PointSource + ?Sized>(points: &P) -> Result<Tetrahedron<usize>, DelaunayError> {
    let len = points.len();
    let p0 = lookup(points, 0)?;

    let mut second = None;
    for index in 1..len {
        if lookup(points, index)? != p0 {
            second = Some(index);
            break;
        }
    }
    let Some(i1) = second else {
        return Err(DelaunayError::DegenerateInput {
            reason: "all points coincide".to_string(),
        });
    };
    let axis = lookup(points, i1)? - p0;

    let mut third = None;
    for index in i1 + 1..len {
        let offset = lookup(points, index)? - p0;
        let area = axis.cross(&offset).norm();
        if area > COLLINEAR_RELATIVE_EPSILON * axis.norm() * offset.norm() {
            third = Some(index);
            break;
        }
    }
    let Some(i2) = third else {
        return Err(DelaunayError::DegenerateInput {
            reason: "all points are collinear".to_string(),
        });
    };
    let p1 = lookup(points, i1)?;
    let p2 = lookup(points, i2)?;

    for index in i2 + 1..len {
        let p3 = lookup(points, index)?;
        let candidate = Tetrahedron::new(0, i1, i2, index);
        match tetrahedron_orientation(&[p0, p1, p2, p3]) {
            Orientation::POSITIVE => return Ok(candidate),
            Orientation::NEGATIVE => return Ok(candidate.flip()),
            Orientation::DEGENERATE => {}
        }
    }
    Err(DelaunayError::DegenerateInput {
        reason: "all points are coplanar".to_string(),
    })
}
