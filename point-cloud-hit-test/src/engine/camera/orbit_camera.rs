use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;

/// Orbit controls for the viewer: right drag rotates, middle drag pans,
/// scroll zooms, A/D yaw.
#[derive(Resource, Debug, Clone)]
pub struct OrbitCamera {
    pub focus_point: Vec3,
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl OrbitCamera {
    pub fn looking_at(focus_point: Vec3, distance: f32) -> Self {
        Self {
            focus_point,
            distance,
            ..Default::default()
        }
    }

    pub fn transform(&self) -> Transform {
        let rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);
        let position = self.focus_point + rotation * Vec3::new(0.0, 0.0, self.distance);
        Transform::from_translation(position).looking_at(self.focus_point, Vec3::Y)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus_point: Vec3::ZERO,
            distance: 100.0,
            pitch: -0.6,
            yaw: 0.0,
        }
    }
}

pub fn orbit_camera_controller(
    mut cameras: Query<&mut Transform, With<Camera3d>>,
    mut orbit: ResMut<OrbitCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = cameras.single_mut() else {
        return;
    };

    for scroll in scroll_events.read() {
        let zoom_factor = if scroll.y > 0.0 { 0.9 } else { 1.1 };
        orbit.distance = (orbit.distance * zoom_factor).clamp(1.0, 5000.0);
    }

    let total_motion: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();

    if mouse_button.pressed(MouseButton::Right) && total_motion != Vec2::ZERO {
        orbit.yaw -= total_motion.x * 0.005;
        orbit.pitch = (orbit.pitch - total_motion.y * 0.005).clamp(-1.5, -0.05);
    }

    if mouse_button.pressed(MouseButton::Middle) && total_motion != Vec2::ZERO {
        let sensitivity = orbit.distance * 0.002;
        let yaw_rot = Quat::from_rotation_y(orbit.yaw);
        let right = yaw_rot * Vec3::X;
        let forward = yaw_rot * Vec3::Z;
        orbit.focus_point += right * -total_motion.x * sensitivity;
        orbit.focus_point += forward * -total_motion.y * sensitivity;
    }

    let mut rotation_input = 0.0;
    if keyboard.pressed(KeyCode::KeyA) {
        rotation_input -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        rotation_input += 1.0;
    }
    if rotation_input != 0.0 {
        orbit.yaw += rotation_input * time.delta_secs();
    }

    // Only write when something changed so change detection reflects motion.
    let target = orbit.transform();
    if *camera_transform != target {
        *camera_transform = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_sits_at_distance_and_faces_focus() {
        let orbit = OrbitCamera::looking_at(Vec3::new(10.0, 0.0, 0.0), 50.0);
        let transform = orbit.transform();
        let offset = transform.translation - orbit.focus_point;
        assert!((offset.length() - 50.0).abs() < 1e-3);
        assert!(transform.forward().as_vec3().dot(-offset.normalize()) > 0.999);
    }
}
