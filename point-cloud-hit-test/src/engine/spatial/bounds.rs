/// Axis-aligned cell bounds used by the octree.
use bevy::math::Vec3;
use rayon::prelude::*;

use crate::engine::point_set::PointSet;

/// Points per rayon task when scanning a cloud for its extent.
const BOUNDS_CHUNK_POINTS: usize = 25_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl CellBounds {
    /// Empty bounds; the first `update` snaps them to a point.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn update(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn merge(mut self, other: CellBounds) -> Self {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self
    }

    /// Extent of a whole point set, computed over parallel chunks.
    pub fn of_points(points: &PointSet) -> Self {
        points
            .coordinates()
            .par_chunks(BOUNDS_CHUNK_POINTS * 3)
            .map(|chunk| {
                let mut local = CellBounds::empty();
                for c in chunk.chunks_exact(3) {
                    local.update(Vec3::new(c[0], c[1], c[2]));
                }
                local
            })
            .reduce_with(CellBounds::merge)
            .unwrap_or_else(CellBounds::empty)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Smallest cube sharing this box's center that encloses it.
    /// Degenerate (flat or single point) boxes get a unit extent.
    pub fn cubed(&self) -> Self {
        let half = (self.size().max_element() * 0.5).max(0.5);
        let center = self.center();
        Self::new(center - Vec3::splat(half), center + Vec3::splat(half))
    }

    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(self.min - Vec3::splat(margin), self.max + Vec3::splat(margin))
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Octant of `point` relative to the center: bit 0 = +x, bit 1 = +y, bit 2 = +z.
    /// Points on a splitting plane belong to the upper octant.
    pub fn octant_of(&self, point: Vec3) -> usize {
        let center = self.center();
        (point.x >= center.x) as usize
            | ((point.y >= center.y) as usize) << 1
            | ((point.z >= center.z) as usize) << 2
    }

    /// Bounds of child `octant` as numbered by `octant_of`.
    pub fn octant(&self, octant: usize) -> Self {
        let center = self.center();
        let pick = |bit: usize, lo: f32, mid: f32, hi: f32| {
            if octant & bit != 0 { (mid, hi) } else { (lo, mid) }
        };
        let (min_x, max_x) = pick(1, self.min.x, center.x, self.max.x);
        let (min_y, max_y) = pick(2, self.min.y, center.y, self.max.y);
        let (min_z, max_z) = pick(4, self.min.z, center.z, self.max.z);
        Self::new(
            Vec3::new(min_x, min_y, min_z),
            Vec3::new(max_x, max_y, max_z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_every_point() {
        let points = PointSet::from_points(&[
            Vec3::new(-1.0, 2.0, 0.5),
            Vec3::new(3.0, -4.0, 1.0),
            Vec3::new(0.0, 0.0, -7.0),
        ])
        .unwrap();
        let bounds = CellBounds::of_points(&points);
        assert_eq!(bounds.min, Vec3::new(-1.0, -4.0, -7.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 2.0, 1.0));
        assert!(points.iter().all(|p| bounds.contains(p)));
    }

    #[test]
    fn empty_point_set_has_empty_bounds() {
        let points = PointSet::new(Vec::<f32>::new()).unwrap();
        assert!(CellBounds::of_points(&points).is_empty());
    }

    #[test]
    fn octants_partition_the_cell() {
        let cell = CellBounds::new(Vec3::ZERO, Vec3::splat(2.0));
        let p = Vec3::new(1.5, 0.5, 1.0);
        let octant = cell.octant_of(p);
        assert_eq!(octant, 0b101);
        assert!(cell.octant(octant).contains(p));
        assert_eq!(cell.octant(0), CellBounds::new(Vec3::ZERO, Vec3::ONE));
    }

    #[test]
    fn cubed_keeps_center_and_grows_short_axes() {
        let cell = CellBounds::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 2.0, 0.0)).cubed();
        assert_eq!(cell.center(), Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(cell.size(), Vec3::splat(4.0));
    }
}
