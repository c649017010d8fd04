use std::sync::atomic::{AtomicBool, Ordering};

use bevy::math::{Dir3, Ray3d, Vec3};
use constants::hit_test::{
    BUILD_PROGRESS_STEPS, DEFAULT_PICK_RADIUS, OCTREE_LEAF_CAPACITY, OCTREE_MAX_DEPTH,
};

use super::bounds::CellBounds;
use super::ray::{project_onto_ray, ray_cell_span};
use crate::engine::point_set::PointSet;
use crate::errors::{HitTestError, Result};

/// Tuning for octree construction and ray hit tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeConfig {
    /// Cells with more points than this are split.
    pub leaf_capacity: usize,
    /// Cells at this depth are never split.
    pub max_depth: u8,
    /// Points within this perpendicular distance of a ray are hits.
    pub pick_radius: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            leaf_capacity: OCTREE_LEAF_CAPACITY,
            max_depth: OCTREE_MAX_DEPTH,
            pick_radius: DEFAULT_PICK_RADIUS,
        }
    }
}

type NodeId = u32;

#[derive(Debug, Clone)]
enum NodeKind {
    Branch { children: [Option<NodeId>; 8] },
    /// Range into `PointOctree::order`.
    Leaf { start: u32, end: u32 },
}

#[derive(Debug, Clone)]
struct OctreeNode {
    bounds: CellBounds,
    kind: NodeKind,
}

/// A point hit by a ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub index: u32,
    /// Ray parameter of the point's projection onto the ray.
    pub distance: f32,
}

/// Immutable octree over a `PointSet` snapshot.
#[derive(Debug)]
pub struct PointOctree {
    points: PointSet,
    config: OctreeConfig,
    nodes: Vec<OctreeNode>,
    /// Point indices grouped so every leaf owns a contiguous range.
    order: Vec<u32>,
}

/// Progress reporter shared by the recursive build.
struct BuildProgress<'a> {
    placed: usize,
    total: usize,
    step: usize,
    next_report: usize,
    report: &'a mut dyn FnMut(f32),
    cancel: Option<&'a AtomicBool>,
}

impl BuildProgress<'_> {
    fn leaf_placed(&mut self, count: usize) -> Result<()> {
        if self
            .cancel
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Err(HitTestError::BuildCancelled);
        }
        self.placed += count;
        if self.placed >= self.next_report && self.placed < self.total {
            (self.report)(self.placed as f32 / self.total as f32);
            self.next_report = self.placed + self.step;
        }
        Ok(())
    }
}

impl PointOctree {
    /// Build synchronously without progress reporting.
    pub fn build(points: PointSet, config: OctreeConfig) -> Result<Self> {
        Self::build_with_progress(points, config, &mut |_| {}, None)
    }

    /// Build, reporting monotonically non-decreasing progress fractions ending
    /// with exactly `1.0`. Returns `BuildCancelled` as soon as `cancel` is set,
    /// and `BuildFailed` when any coordinate is NaN or infinite.
    pub fn build_with_progress(
        points: PointSet,
        config: OctreeConfig,
        report: &mut dyn FnMut(f32),
        cancel: Option<&AtomicBool>,
    ) -> Result<Self> {
        if let Some(index) = points.iter().position(|point| !point.is_finite()) {
            return Err(HitTestError::BuildFailed(format!(
                "point {index} has a non-finite coordinate"
            )));
        }

        let total = points.len();
        let mut tree = Self {
            order: (0..total as u32).collect(),
            nodes: Vec::new(),
            points,
            config: OctreeConfig {
                leaf_capacity: config.leaf_capacity.max(1),
                ..config
            },
        };

        if total > 0 {
            let root_bounds = CellBounds::of_points(&tree.points).cubed();
            let step = (total / BUILD_PROGRESS_STEPS).max(1);
            let mut progress = BuildProgress {
                placed: 0,
                total,
                step,
                next_report: step,
                report: &mut *report,
                cancel,
            };
            let mut order = std::mem::take(&mut tree.order);
            tree.split(root_bounds, &mut order, 0, 0, &mut progress)?;
            tree.order = order;
        }

        report(1.0);
        Ok(tree)
    }

    /// Recursively partition `slice` (which starts at `offset` in `order`) and
    /// return the id of the created node.
    fn split(
        &mut self,
        bounds: CellBounds,
        slice: &mut [u32],
        offset: usize,
        depth: u8,
        progress: &mut BuildProgress<'_>,
    ) -> Result<NodeId> {
        let id = self.nodes.len() as NodeId;

        if slice.len() <= self.config.leaf_capacity || depth >= self.config.max_depth {
            self.nodes.push(OctreeNode {
                bounds,
                kind: NodeKind::Leaf {
                    start: offset as u32,
                    end: (offset + slice.len()) as u32,
                },
            });
            progress.leaf_placed(slice.len())?;
            return Ok(id);
        }

        self.nodes.push(OctreeNode {
            bounds,
            kind: NodeKind::Branch {
                children: [None; 8],
            },
        });

        // Stable bucket sort by octant so children own contiguous ranges.
        let points = &self.points;
        slice.sort_by_key(|&index| bounds.octant_of(points.point(index as usize)));

        let mut children = [None; 8];
        let mut start = 0;
        for (octant, child) in children.iter_mut().enumerate() {
            let len = slice[start..]
                .iter()
                .take_while(|&&index| bounds.octant_of(self.points.point(index as usize)) == octant)
                .count();
            if len > 0 {
                let range = start..start + len;
                *child = Some(self.split(
                    bounds.octant(octant),
                    &mut slice[range],
                    offset + start,
                    depth + 1,
                    progress,
                )?);
            }
            start += len;
        }

        self.nodes[id as usize].kind = NodeKind::Branch { children };
        Ok(id)
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Indices of points near the ray with `min_distance <= t <= max_distance`,
    /// ordered by ascending `t` (ties by index).
    pub fn query(
        &self,
        origin: Vec3,
        direction: Dir3,
        min_distance: f32,
        max_distance: f32,
    ) -> Vec<u32> {
        self.query_hits(origin, direction, min_distance, max_distance)
            .into_iter()
            .map(|hit| hit.index)
            .collect()
    }

    pub fn query_ray(&self, ray: &Ray3d, min_distance: f32, max_distance: f32) -> Vec<u32> {
        self.query(ray.origin, ray.direction, min_distance, max_distance)
    }

    /// Like `query`, keeping the distance of every hit.
    pub fn query_hits(
        &self,
        origin: Vec3,
        direction: Dir3,
        min_distance: f32,
        max_distance: f32,
    ) -> Vec<RayHit> {
        let min_distance = min_distance.max(0.0);
        let mut hits = Vec::new();
        if self.nodes.is_empty() || max_distance < min_distance {
            return hits;
        }

        let direction = direction.as_vec3();
        let radius = self.config.pick_radius;
        let radius_sq = radius * radius;
        let mut stack = vec![0 as NodeId];

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            let Some((t_enter, t_exit)) =
                ray_cell_span(origin, direction, &node.bounds.expanded(radius))
            else {
                continue;
            };
            if t_exit < min_distance || t_enter > max_distance {
                continue;
            }

            match &node.kind {
                NodeKind::Branch { children } => stack.extend(children.iter().flatten()),
                NodeKind::Leaf { start, end } => {
                    for &index in &self.order[*start as usize..*end as usize] {
                        let point = self.points.point(index as usize);
                        let (t, dist_sq) = project_onto_ray(origin, direction, point);
                        if t >= min_distance && t <= max_distance && dist_sq <= radius_sq {
                            hits.push(RayHit { index, distance: t });
                        }
                    }
                }
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.index.cmp(&b.index)));
        hits
    }

    /// Indices of points inside the sphere, ordered by distance from `center`.
    pub fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<u32> {
        let mut found: Vec<(f32, u32)> = Vec::new();
        if self.nodes.is_empty() || radius < 0.0 {
            return Vec::new();
        }

        let radius_sq = radius * radius;
        let mut stack = vec![0 as NodeId];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            let nearest = center.clamp(node.bounds.min, node.bounds.max);
            if nearest.distance_squared(center) > radius_sq {
                continue;
            }
            match &node.kind {
                NodeKind::Branch { children } => stack.extend(children.iter().flatten()),
                NodeKind::Leaf { start, end } => {
                    for &index in &self.order[*start as usize..*end as usize] {
                        let d2 = self.points.point(index as usize).distance_squared(center);
                        if d2 <= radius_sq {
                            found.push((d2, index));
                        }
                    }
                }
            }
        }

        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found.into_iter().map(|(_, index)| index).collect()
    }
}
