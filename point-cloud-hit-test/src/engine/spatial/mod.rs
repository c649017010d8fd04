//! Spatial index over point cloud positions.
//!
//! The index is an octree built once per `PointSet` snapshot. Each leaf owns a
//! contiguous run of a reordered index array, so a ray query only walks the
//! cells its (pick-radius expanded) bounds actually cross:
//!
//! ```text
//! PointSet ──build──> PointOctree
//!                        ├─ nodes: Branch { children[8] } | Leaf { start..end }
//!                        └─ order: point indices grouped by leaf
//! ```
//!
//! Builds can run on a worker thread (`OctreeBuild`) and report progress and
//! completion over separate channels. A coordinate change means a new
//! snapshot and a full rebuild; trees are never patched in place.

/// Cell bounds, octant arithmetic and parallel extent computation.
pub mod bounds;

/// Background or inline index builds with progress and cancellation.
pub mod builder;

/// The octree and its ray and sphere queries.
pub mod octree;

/// Ray/box and ray/point primitives.
pub mod ray;

pub use bounds::CellBounds;
pub use builder::{BuildMode, BuildUpdate, OctreeBuild};
pub use octree::{OctreeConfig, PointOctree, RayHit};
