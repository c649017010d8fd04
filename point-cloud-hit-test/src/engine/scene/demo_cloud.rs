use bevy::prelude::*;

use crate::engine::mesh::point_mesh::{PointCloud, create_point_mesh};
use crate::engine::point_cloud::{PointSource, SharedPointCloud};

/// Undulating sheet of points on the XZ plane, `side * side` points spaced
/// `spacing` apart and centered on the origin.
pub fn terrain_coordinates(side: usize, spacing: f32) -> Vec<f32> {
    let half = (side as f32 - 1.0) * spacing * 0.5;
    let mut coordinates = Vec::with_capacity(side * side * 3);
    for row in 0..side {
        for col in 0..side {
            let x = col as f32 * spacing - half;
            let z = row as f32 * spacing - half;
            let y = (x * 0.05).sin() * 4.0 + (z * 0.08).cos() * 3.0;
            coordinates.extend_from_slice(&[x, y, z]);
        }
    }
    coordinates
}

/// Publish the demo geometry and spawn a renderable mesh for it.
pub fn spawn_demo_cloud(
    mut commands: Commands,
    cloud: Res<SharedPointCloud>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if let Err(e) = cloud.init_with_new_coordinates(terrain_coordinates(300, 0.5)) {
        error!("Demo point cloud rejected: {}", e);
        return;
    }
    let Some(points) = cloud.points() else {
        return;
    };
    info!("Demo point cloud with {} points", points.len());

    commands.spawn((
        Mesh3d(meshes.add(create_point_mesh(&points))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.75, 0.8, 0.85),
            unlit: true,
            ..default()
        })),
        PointCloud,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_is_centered_and_complete() {
        let coordinates = terrain_coordinates(3, 2.0);
        assert_eq!(coordinates.len(), 27);
        assert_eq!(&coordinates[0..1], &[-2.0]);
        assert_eq!(coordinates[12], 0.0, "middle point x");
        assert_eq!(coordinates[14], 0.0, "middle point z");
    }
}
