use bevy::prelude::*;
use bevy::{render::mesh::PrimitiveTopology, render::render_asset::RenderAssetUsages};

use crate::engine::point_set::PointSet;

#[derive(Component)]
pub struct PointCloud;

/// One vertex per point, drawn as a point list.
pub fn create_point_mesh(points: &PointSet) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::RENDER_WORLD);
    let positions: Vec<[f32; 3]> = points.iter().map(|point| point.to_array()).collect();
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_has_a_vertex_per_point() {
        let points = PointSet::new(vec![0.0f32; 12]).unwrap();
        let mesh = create_point_mesh(&points);
        assert_eq!(mesh.count_vertices(), 4);
        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::PointList);
    }
}
