use std::sync::Arc;

use bevy::math::Ray3d;

use super::bus::BusEvent;
use crate::engine::spatial::PointOctree;

/// Pointer record handed to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerSnapshot {
    /// Primary button is held.
    pub down: bool,
    /// Screen position in logical pixels.
    pub x: f32,
    pub y: f32,
    /// Points under the pointer from the latest frame query, nearest first.
    /// For clicks this is whatever the last `Over` computed.
    pub indexes: Option<Arc<[u32]>>,
    pub ray: Option<Ray3d>,
}

impl PointerSnapshot {
    /// Nearest point under the pointer, if any.
    pub fn nearest(&self) -> Option<u32> {
        self.indexes.as_ref().and_then(|indexes| indexes.first().copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitTestEventKind {
    Over,
    Click,
    DoubleClick,
    Progress,
    Ready,
    Failed,
}

impl HitTestEventKind {
    pub const ALL: [Self; 6] = [
        Self::Over,
        Self::Click,
        Self::DoubleClick,
        Self::Progress,
        Self::Ready,
        Self::Failed,
    ];

    /// Wire name used for frontend notifications.
    pub fn notification_method(&self) -> &'static str {
        match self {
            Self::Over => "hit_test_over",
            Self::Click => "hit_test_click",
            Self::DoubleClick => "hit_test_dblclick",
            Self::Progress => "hit_test_progress",
            Self::Ready => "hit_test_ready",
            Self::Failed => "hit_test_failed",
        }
    }
}

/// Everything the hit test publishes.
#[derive(Debug, Clone)]
pub enum HitTestEvent {
    /// Per-frame query result.
    Over(PointerSnapshot),
    Click(PointerSnapshot),
    DoubleClick(PointerSnapshot),
    /// Index build progress in `[0, 1]`.
    Progress(f32),
    Ready(Arc<PointOctree>),
    /// Index build failed; no index exists for the current geometry.
    Failed(String),
}

impl BusEvent for HitTestEvent {
    type Kind = HitTestEventKind;

    fn kind(&self) -> HitTestEventKind {
        match self {
            Self::Over(_) => HitTestEventKind::Over,
            Self::Click(_) => HitTestEventKind::Click,
            Self::DoubleClick(_) => HitTestEventKind::DoubleClick,
            Self::Progress(_) => HitTestEventKind::Progress,
            Self::Ready(_) => HitTestEventKind::Ready,
            Self::Failed(_) => HitTestEventKind::Failed,
        }
    }
}

impl HitTestEvent {
    /// JSON payload for frontend notifications.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Over(pointer) | Self::Click(pointer) | Self::DoubleClick(pointer) => {
                pointer_json(pointer)
            }
            Self::Progress(fraction) => serde_json::json!({ "progress": fraction }),
            Self::Ready(tree) => serde_json::json!({
                "points": tree.len(),
                "nodes": tree.node_count(),
            }),
            Self::Failed(reason) => serde_json::json!({ "reason": reason }),
        }
    }
}

fn pointer_json(pointer: &PointerSnapshot) -> serde_json::Value {
    let ray = pointer.ray.map(|ray| {
        serde_json::json!({
            "origin": ray.origin.to_array(),
            "direction": ray.direction.as_vec3().to_array(),
        })
    });
    serde_json::json!({
        "down": pointer.down,
        "x": pointer.x,
        "y": pointer.y,
        "indexes": pointer.indexes.as_deref(),
        "ray": ray,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::{Dir3, Vec3};

    #[test]
    fn pointer_payload_carries_indexes_and_ray() {
        let snapshot = PointerSnapshot {
            down: false,
            x: 10.0,
            y: 20.0,
            indexes: Some(Arc::from(vec![4u32, 2])),
            ray: Some(Ray3d::new(Vec3::ZERO, Dir3::NEG_Z)),
        };
        assert_eq!(snapshot.nearest(), Some(4));

        let json = HitTestEvent::Over(snapshot).to_json();
        assert_eq!(json["indexes"], serde_json::json!([4, 2]));
        assert_eq!(json["ray"]["direction"], serde_json::json!([0.0, 0.0, -1.0]));
        assert_eq!(json["x"], serde_json::json!(10.0));
    }

    #[test]
    fn kinds_map_to_notification_methods() {
        assert_eq!(HitTestEvent::Progress(0.5).kind(), HitTestEventKind::Progress);
        assert_eq!(
            HitTestEventKind::DoubleClick.notification_method(),
            "hit_test_dblclick"
        );
    }
}
