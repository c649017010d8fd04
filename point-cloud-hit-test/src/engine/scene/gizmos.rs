use std::sync::{Arc, Mutex};

use bevy::prelude::*;

use crate::engine::events::{HitTestEvent, HitTestEventKind};
use crate::engine::hit_test::HitTest;

/// Index of the point picked by the last click or double click.
#[derive(Resource, Default, Clone)]
pub struct SelectedPoint(Arc<Mutex<Option<u32>>>);

impl SelectedPoint {
    pub fn get(&self) -> Option<u32> {
        self.0.lock().ok().and_then(|selected| *selected)
    }

    fn set(&self, index: Option<u32>) {
        if let Ok(mut selected) = self.0.lock() {
            *selected = index;
        }
    }
}

/// Log picks and remember the clicked point.
pub fn subscribe_selection(mut hit_test: ResMut<HitTest>, selected: Res<SelectedPoint>) {
    for kind in [HitTestEventKind::Click, HitTestEventKind::DoubleClick] {
        let selected = selected.clone();
        hit_test.on(kind, move |event| {
            let (HitTestEvent::Click(pointer) | HitTestEvent::DoubleClick(pointer)) = event else {
                return;
            };
            info!(
                "{:?} at ({}, {}) picked {:?}",
                kind,
                pointer.x,
                pointer.y,
                pointer.nearest()
            );
            selected.set(pointer.nearest());
        });
    }

    hit_test.on(HitTestEventKind::Ready, |event| {
        if let HitTestEvent::Ready(tree) = event {
            info!("Hit testing ready over {} points", tree.len());
        }
    });
}

/// Highlight the point under the pointer and the last selection.
pub fn draw_pick_gizmos(hit_test: Res<HitTest>, selected: Res<SelectedPoint>, mut gizmos: Gizmos) {
    let Some(tree) = hit_test.index() else {
        return;
    };
    let radius = tree.config().pick_radius;

    if let Some(&nearest) = hit_test.pointer().indexes.as_ref().and_then(|i| i.first()) {
        let point = tree.points().point(nearest as usize);
        gizmos.sphere(Isometry3d::from_translation(point), radius, Color::srgb(1.0, 0.8, 0.0));
    }
    if let Some(index) = selected.get().filter(|&index| (index as usize) < tree.len()) {
        let point = tree.points().point(index as usize);
        gizmos.sphere(
            Isometry3d::from_translation(point),
            radius * 1.5,
            Color::srgb(0.1, 0.9, 0.3),
        );
    }
}
