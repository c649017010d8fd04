//! Mesh generation for point cloud rendering in the viewer.

/// Point list mesh built from a `PointSet`.
pub mod point_mesh;
