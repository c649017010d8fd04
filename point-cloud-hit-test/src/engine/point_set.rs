use std::sync::Arc;

use bevy::math::Vec3;

use crate::errors::{HitTestError, Result};

/// Immutable snapshot of a flat `[x, y, z, x, y, z, ...]` position buffer.
///
/// Clones share the same buffer. Two values are the same snapshot only when
/// they share storage, which is how index consumers detect a new generation
/// of geometry.
#[derive(Debug, Clone)]
pub struct PointSet {
    coordinates: Arc<[f32]>,
}

impl PointSet {
    /// Validate and wrap a coordinate buffer. Empty buffers are valid.
    pub fn new(coordinates: impl Into<Arc<[f32]>>) -> Result<Self> {
        let coordinates = coordinates.into();
        if coordinates.len() % 3 != 0 {
            return Err(HitTestError::MalformedPointSet {
                len: coordinates.len(),
            });
        }
        let count = coordinates.len() / 3;
        if u32::try_from(count).is_err() {
            return Err(HitTestError::TooManyPoints { count });
        }
        Ok(Self { coordinates })
    }

    pub fn from_points(points: &[Vec3]) -> Result<Self> {
        let flat: Vec<f32> = points.iter().flat_map(|p| p.to_array()).collect();
        Self::new(flat)
    }

    /// Number of points (not coordinates).
    pub fn len(&self) -> usize {
        self.coordinates.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn coordinates(&self) -> &[f32] {
        &self.coordinates
    }

    /// Position of point `index`. Panics when out of range, like slice indexing.
    pub fn point(&self, index: usize) -> Vec3 {
        let base = index * 3;
        Vec3::new(
            self.coordinates[base],
            self.coordinates[base + 1],
            self.coordinates[base + 2],
        )
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.coordinates
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
    }

    /// True when both values share the same underlying buffer.
    pub fn same_snapshot(&self, other: &PointSet) -> bool {
        Arc::ptr_eq(&self.coordinates, &other.coordinates)
    }
}
