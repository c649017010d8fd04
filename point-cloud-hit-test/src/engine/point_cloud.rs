use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use bevy::log::{debug, warn};
use bevy::prelude::*;

use crate::engine::point_set::PointSet;
use crate::errors::{HitTestError, Result};

/// Supplies the geometry to hit test against.
///
/// A different `PointSet` snapshot than last frame means new geometry.
pub trait PointSource: Send + Sync {
    fn points(&self) -> Option<PointSet>;
}

/// Reports whether the camera controller is moving the view.
pub trait CameraMotion: Send + Sync {
    fn is_moving(&self) -> bool;
}

impl<F> CameraMotion for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_moving(&self) -> bool {
        self()
    }
}

/// Shared moving flag, written by whatever drives the camera.
#[derive(Resource, Debug, Clone, Default)]
pub struct CameraMotionFlag(Arc<AtomicBool>);

impl CameraMotionFlag {
    pub fn set_moving(&self, moving: bool) {
        self.0.store(moving, Ordering::Relaxed);
    }
}

impl CameraMotion for CameraMotionFlag {
    fn is_moving(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Current point positions of the rendered cloud.
#[derive(Debug, Default)]
pub struct PointCloudView {
    points: Option<PointSet>,
}

impl PointCloudView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> Option<&PointSet> {
        self.points.as_ref()
    }

    /// Replace the geometry with a buffer of any size.
    pub fn init_with_new_coordinates(&mut self, coordinates: Vec<f32>) -> Result<()> {
        let points = PointSet::new(coordinates)?;
        debug!("Point cloud replaced with {} points", points.len());
        self.points = Some(points);
        Ok(())
    }

    /// Move existing points. The buffer length must match the current cloud.
    pub fn set_coordinates(&mut self, coordinates: Vec<f32>) -> Result<()> {
        let expected = self.points.as_ref().map_or(0, |p| p.coordinates().len());
        if coordinates.len() != expected {
            warn!(
                "Rejected coordinate update: {} values for a cloud of {}",
                coordinates.len(),
                expected
            );
            return Err(HitTestError::CoordinateCountMismatch {
                expected,
                actual: coordinates.len(),
            });
        }
        self.points = Some(PointSet::new(coordinates)?);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.points = None;
    }
}

/// Thread-safe handle to a `PointCloudView`, shared between the app and the
/// hit test.
#[derive(Resource, Debug, Clone, Default)]
pub struct SharedPointCloud(Arc<RwLock<PointCloudView>>);

impl SharedPointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_with_new_coordinates(&self, coordinates: Vec<f32>) -> Result<()> {
        self.write(|view| view.init_with_new_coordinates(coordinates))
    }

    pub fn set_coordinates(&self, coordinates: Vec<f32>) -> Result<()> {
        self.write(|view| view.set_coordinates(coordinates))
    }

    pub fn clear(&self) {
        self.write(|view| {
            view.clear();
            Ok(())
        })
        .ok();
    }

    fn write(&self, f: impl FnOnce(&mut PointCloudView) -> Result<()>) -> Result<()> {
        // A poisoned lock only means a writer panicked; the view itself is
        // always either the old or the new snapshot.
        let mut view = self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut view)
    }
}

impl PointSource for SharedPointCloud {
    fn points(&self) -> Option<PointSet> {
        let view = self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        view.points().cloned()
    }
}
