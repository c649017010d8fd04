//! Shared tuning values for hit testing, interaction timing and point cloud input.

pub mod coordinate_system;
pub mod interaction;
