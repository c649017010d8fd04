//! Viewer scene: demo geometry and pick feedback.

/// Synthetic terrain cloud published through `SharedPointCloud`.
pub mod demo_cloud;

/// Hover and selection highlights driven by hit test results.
pub mod gizmos;
