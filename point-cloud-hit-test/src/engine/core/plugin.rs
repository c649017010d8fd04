use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::hit_test::HitTest;
use crate::engine::loading::settings_loader::{
    SettingsLoader, apply_loaded_settings, start_settings_loading,
};
use crate::engine::point_cloud::{CameraMotionFlag, SharedPointCloud};
use crate::engine::settings::HitTestSettings;
use crate::engine::systems::hit_test_input::{
    advance_hit_test_timers, forward_window_events, forward_window_size, track_camera_motion,
    update_hit_test,
};

/// Systems that feed input into the hit test and run the per-frame query.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct HitTestSystems;

/// Registers point cloud hit testing against the primary window and the
/// single 3D camera.
///
/// Applications publish geometry through the `SharedPointCloud` resource and
/// subscribe on the `HitTest` resource.
#[derive(Default)]
pub struct HitTestPlugin {
    pub settings: HitTestSettings,
    /// JSON settings asset (`*.hit_test.json`) applied once loaded.
    pub settings_path: Option<String>,
}

impl Plugin for HitTestPlugin {
    fn build(&self, app: &mut App) {
        let cloud = SharedPointCloud::new();
        let motion = CameraMotionFlag::default();

        let hit_test = match HitTest::builder()
            .source(cloud.clone())
            .camera_motion(motion.clone())
            .settings(self.settings.clone())
            .build()
        {
            Ok(hit_test) => hit_test,
            Err(e) => {
                error!("Hit testing disabled: {}", e);
                return;
            }
        };

        app.insert_resource(hit_test)
            .insert_resource(cloud)
            .insert_resource(motion)
            .insert_resource(self.settings.clone())
            .add_systems(
                Update,
                (
                    advance_hit_test_timers,
                    forward_window_size,
                    forward_window_events,
                    track_camera_motion,
                    update_hit_test,
                )
                    .chain()
                    .in_set(HitTestSystems),
            );

        if self.settings_path.is_some() {
            app.add_plugins(JsonAssetPlugin::<HitTestSettings>::new(&["hit_test.json"]))
                .insert_resource(SettingsLoader::new(self.settings_path.clone()))
                .add_systems(Startup, start_settings_loading)
                .add_systems(Update, apply_loaded_settings.before(HitTestSystems));
        }
    }
}
