use bevy::prelude::*;

use crate::engine::hit_test::HitTest;
use crate::engine::settings::HitTestSettings;

/// Settings asset requested at startup, applied once it finishes loading.
#[derive(Resource, Default)]
pub struct SettingsLoader {
    pub path: Option<String>,
    handle: Option<Handle<HitTestSettings>>,
    applied: bool,
}

impl SettingsLoader {
    pub fn new(path: Option<String>) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }
}

pub fn start_settings_loading(mut loader: ResMut<SettingsLoader>, asset_server: Res<AssetServer>) {
    if let Some(path) = loader.path.clone() {
        info!("Loading hit test settings from {}", path);
        loader.handle = Some(asset_server.load(path));
    }
}

pub fn apply_loaded_settings(
    mut loader: ResMut<SettingsLoader>,
    loaded: Res<Assets<HitTestSettings>>,
    mut settings: ResMut<HitTestSettings>,
    mut hit_test: ResMut<HitTest>,
) {
    if loader.applied {
        return;
    }
    let Some(new_settings) = loader.handle.as_ref().and_then(|handle| loaded.get(handle)) else {
        return;
    };
    loader.applied = true;

    match hit_test.set_settings(new_settings.clone()) {
        Ok(()) => {
            info!("✓ Hit test settings applied");
            *settings = new_settings.clone();
        }
        Err(e) => error!("Keeping current hit test settings: {}", e),
    }
}
