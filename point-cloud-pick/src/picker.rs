use std::sync::Arc;
use std::time::Duration;

use bevy::math::{Dir3, Vec3};
use constants::hit_test::MIN_RAYCAST_DISTANCE;
use indicatif::{ProgressBar, ProgressStyle};
use point_cloud_hit_test::engine::point_set::PointSet;
use point_cloud_hit_test::engine::spatial::{
    BuildMode, BuildUpdate, OctreeBuild, OctreeConfig, PointOctree, RayHit,
};
use serde::Serialize;

use crate::laz::LoadedCloud;

/// One query result, in survey coordinates.
#[derive(Debug, Serialize)]
pub struct PickedPoint {
    pub index: u32,
    /// Distance along the ray.
    pub distance: f32,
    pub position: [f64; 3],
}

#[derive(Debug, Serialize)]
pub struct PickReport {
    pub total_points: usize,
    pub octree_nodes: usize,
    pub pick_radius: f32,
    pub max_distance: f32,
    pub hits: Vec<PickedPoint>,
}

/// Build the octree on a worker thread while a progress bar follows it.
pub fn build_index(
    points: PointSet,
    config: OctreeConfig,
) -> Result<Arc<PointOctree>, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.green/blue}] {pos}% {msg}")?
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message("Building octree");

    let mut build = OctreeBuild::start(points, config, BuildMode::Background);
    loop {
        for update in build.poll() {
            match update {
                BuildUpdate::Progress(fraction) => pb.set_position((fraction * 100.0) as u64),
                BuildUpdate::Ready(tree) => {
                    pb.finish_with_message(format!("Octree built ({} nodes)", tree.node_count()));
                    return Ok(tree);
                }
                BuildUpdate::Failed(e) => {
                    pb.abandon_with_message("Octree build failed");
                    return Err(e.into());
                }
            }
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

/// Cast a survey-space ray into the index.
pub fn pick_along(
    cloud: &LoadedCloud,
    tree: &PointOctree,
    origin: [f64; 3],
    direction: [f64; 3],
    max_distance: f32,
) -> Result<PickReport, Box<dyn std::error::Error>> {
    let local_origin = Vec3::from_array(cloud.to_local(origin));
    let local_direction = Dir3::new(Vec3::from_array(cloud.direction_to_local(direction)))
        .map_err(|e| format!("invalid ray direction: {e}"))?;

    let hits = tree.query_hits(local_origin, local_direction, MIN_RAYCAST_DISTANCE, max_distance);
    Ok(PickReport {
        total_points: tree.len(),
        octree_nodes: tree.node_count(),
        pick_radius: tree.config().pick_radius,
        max_distance,
        hits: hits.iter().map(|hit| to_picked(cloud, hit)).collect(),
    })
}

fn to_picked(cloud: &LoadedCloud, hit: &RayHit) -> PickedPoint {
    PickedPoint {
        index: hit.index,
        distance: hit.distance,
        position: cloud.survey[hit.index as usize],
    }
}
