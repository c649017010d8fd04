/// Survey (Z-up) to scene (Y-up) axis mapping, row-major: [x_scene, y_scene, z_scene].
pub const SURVEY_TO_SCENE: [[f64; 3]; 3] = [
    [1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, -1.0, 0.0],
];

/// Rotate a survey coordinate into scene axes.
pub fn survey_to_scene(x: f64, y: f64, z: f64) -> [f64; 3] {
    let input = [x, y, z];
    SURVEY_TO_SCENE.map(|row| row[0] * input[0] + row[1] * input[1] + row[2] * input[2])
}

/// Rotate a survey coordinate into scene axes and express it relative to `origin`.
///
/// Survey coordinates are large (projected metres); subtracting the origin in
/// f64 before narrowing keeps f32 positions precise near the cloud.
pub fn survey_to_local(x: f64, y: f64, z: f64, origin: [f64; 3]) -> [f32; 3] {
    let scene = survey_to_scene(x, y, z);
    [
        (scene[0] - origin[0]) as f32,
        (scene[1] - origin[1]) as f32,
        (scene[2] - origin[2]) as f32,
    ]
}
