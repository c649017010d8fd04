use bevy::input::ButtonState;
use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowEvent};

use crate::engine::camera::BevyCamera;
use crate::engine::hit_test::HitTest;
use crate::engine::point_cloud::CameraMotionFlag;

/// Keep the interaction viewport in sync with the primary window.
pub fn forward_window_size(
    windows: Query<&Window, (With<PrimaryWindow>, Changed<Window>)>,
    mut hit_test: ResMut<HitTest>,
) {
    if let Ok(window) = windows.single() {
        hit_test.resize(window.width(), window.height());
    }
}

/// Pointer and touch input in the order the window delivered it, so a press,
/// drag and release inside one frame still reads as a drag.
pub fn forward_window_events(
    mut window_events: EventReader<WindowEvent>,
    mut touches: Local<Vec<(u64, Vec2)>>,
    mut hit_test: ResMut<HitTest>,
) {
    for event in window_events.read() {
        match event {
            WindowEvent::CursorMoved(cursor) => hit_test.pointer_moved(cursor.position),
            WindowEvent::MouseButtonInput(input) => match input.state {
                ButtonState::Pressed => hit_test.pointer_pressed(input.button),
                ButtonState::Released => hit_test.pointer_released(input.button),
            },
            WindowEvent::TouchInput(touch) => {
                forward_touch(touch, &mut touches, &mut hit_test);
            }
            _ => {}
        }
    }
}

fn forward_touch(touch: &TouchInput, on_surface: &mut Vec<(u64, Vec2)>, hit_test: &mut HitTest) {
    match touch.phase {
        TouchPhase::Started => {
            on_surface.retain(|(id, _)| *id != touch.id);
            on_surface.push((touch.id, touch.position));
            hit_test.touch_started(&positions(on_surface));
        }
        TouchPhase::Moved => {
            if let Some(entry) = on_surface.iter_mut().find(|(id, _)| *id == touch.id) {
                entry.1 = touch.position;
            }
        }
        TouchPhase::Ended => {
            on_surface.retain(|(id, _)| *id != touch.id);
            hit_test.touch_ended(&positions(on_surface));
        }
        TouchPhase::Canceled => on_surface.retain(|(id, _)| *id != touch.id),
    }
}

fn positions(on_surface: &[(u64, Vec2)]) -> Vec<Vec2> {
    on_surface.iter().map(|(_, position)| *position).collect()
}

/// Runs before input is forwarded so new timers start from this frame's clock.
pub fn advance_hit_test_timers(time: Res<Time>, mut hit_test: ResMut<HitTest>) {
    hit_test.advance_timers(time.delta());
}

/// The camera counts as moving whenever its transform changed since last frame.
pub fn track_camera_motion(
    cameras: Query<(), (With<Camera3d>, Changed<GlobalTransform>)>,
    motion: Res<CameraMotionFlag>,
) {
    motion.set_moving(!cameras.is_empty());
}

pub fn update_hit_test(
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut hit_test: ResMut<HitTest>,
) {
    let Ok((camera, transform)) = cameras.single() else {
        return;
    };
    hit_test.update(&BevyCamera { camera, transform });
}
