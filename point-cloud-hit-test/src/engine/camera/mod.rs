//! Camera handling: pointer-to-world rays for picking and the viewer's orbit
//! controls.

/// Orbit camera resource and controller system for the viewer.
pub mod orbit_camera;

/// Camera adapters and the `pick` query.
pub mod pick_ray;

pub use pick_ray::{BevyCamera, CameraProjection, Pick, PickCamera, pick};
