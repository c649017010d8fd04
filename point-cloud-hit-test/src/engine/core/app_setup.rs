use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::window::PresentMode;

use crate::engine::camera::orbit_camera::{OrbitCamera, orbit_camera_controller};
use crate::engine::core::plugin::{HitTestPlugin, HitTestSystems};
use crate::engine::scene::demo_cloud::spawn_demo_cloud;
use crate::engine::scene::gizmos::{SelectedPoint, draw_pick_gizmos, subscribe_selection};
use crate::engine::settings::HitTestSettings;
use crate::rpc::HitTestRpcPlugin;

/// Viewer over a synthetic point cloud with hover and click picking.
///
/// `settings_path` names an optional `*.hit_test.json` asset.
pub fn create_app(settings_path: Option<String>) -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(HitTestPlugin {
            settings: HitTestSettings::default(),
            settings_path,
        })
        .add_plugins(HitTestRpcPlugin)
        .insert_resource(OrbitCamera::looking_at(Vec3::ZERO, 120.0))
        .init_resource::<SelectedPoint>()
        .add_systems(Startup, (setup, spawn_demo_cloud, subscribe_selection))
        .add_systems(
            Update,
            (
                orbit_camera_controller.before(HitTestSystems),
                draw_pick_gizmos.after(HitTestSystems),
            ),
        );

    app
}

fn setup(mut commands: Commands, orbit: Res<OrbitCamera>) {
    commands.spawn((Camera3d::default(), orbit.transform()));
}

fn create_default_plugins() -> impl PluginGroup {
    DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(Window {
                title: "Point Cloud Hit Test".into(),
                present_mode: PresentMode::AutoVsync,
                #[cfg(target_arch = "wasm32")]
                canvas: Some("#bevy-canvas".into()),
                #[cfg(target_arch = "wasm32")]
                fit_canvas_to_parent: true,
                ..default()
            }),
            ..default()
        })
        .set(AssetPlugin {
            meta_check: AssetMetaCheck::Never,
            ..default()
        })
}
