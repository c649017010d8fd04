use std::time::Duration;

use bevy::prelude::*;
use constants::hit_test::{
    DEFAULT_PICK_RADIUS, MAX_RAYCAST_DISTANCE, OCTREE_LEAF_CAPACITY, OCTREE_MAX_DEPTH,
};
use constants::interaction::{
    CLICK_DISAMBIGUATION_MS, INTERACTION_QUIESCENCE_MS, TOUCH_CLICK_DELAY_MS,
};
use serde::{Deserialize, Serialize};

use crate::engine::interaction::InteractionTimings;
use crate::engine::spatial::{BuildMode, OctreeConfig};
use crate::errors::{HitTestError, Result};

/// Runtime tuning for hit testing. Every field falls back to the shared
/// constants when absent from the JSON.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Asset, TypePath)]
#[serde(default)]
pub struct HitTestSettings {
    /// Raycasting stops this long after the last pointer motion.
    pub quiescence_ms: u64,
    /// Second press within this window turns a click into a double click.
    pub click_window_ms: u64,
    pub touch_click_delay_ms: u64,
    pub max_distance: f32,
    pub pick_radius: f32,
    pub leaf_capacity: usize,
    pub max_depth: u8,
    /// Build the index on a worker thread. Ignored on wasm32.
    pub background_build: bool,
}

impl Default for HitTestSettings {
    fn default() -> Self {
        Self {
            quiescence_ms: INTERACTION_QUIESCENCE_MS,
            click_window_ms: CLICK_DISAMBIGUATION_MS,
            touch_click_delay_ms: TOUCH_CLICK_DELAY_MS,
            max_distance: MAX_RAYCAST_DISTANCE,
            pick_radius: DEFAULT_PICK_RADIUS,
            leaf_capacity: OCTREE_LEAF_CAPACITY,
            max_depth: OCTREE_MAX_DEPTH,
            background_build: true,
        }
    }
}

impl HitTestSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(HitTestError::InvalidSettings(format!(
                "max_distance must be positive, got {}",
                self.max_distance
            )));
        }
        if !self.pick_radius.is_finite() || self.pick_radius < 0.0 {
            return Err(HitTestError::InvalidSettings(format!(
                "pick_radius must be non-negative, got {}",
                self.pick_radius
            )));
        }
        if self.leaf_capacity == 0 {
            return Err(HitTestError::InvalidSettings(
                "leaf_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn octree_config(&self) -> OctreeConfig {
        OctreeConfig {
            leaf_capacity: self.leaf_capacity,
            max_depth: self.max_depth,
            pick_radius: self.pick_radius,
        }
    }

    pub fn interaction_timings(&self) -> InteractionTimings {
        InteractionTimings {
            quiescence: Duration::from_millis(self.quiescence_ms),
            click_window: Duration::from_millis(self.click_window_ms),
            touch_click_delay: Duration::from_millis(self.touch_click_delay_ms),
        }
    }

    pub fn build_mode(&self) -> BuildMode {
        if self.background_build {
            BuildMode::Background
        } else {
            BuildMode::Inline
        }
    }
}
