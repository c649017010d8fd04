use bevy::prelude::*;
use constants::hit_test::MIN_RAYCAST_DISTANCE;

use crate::engine::spatial::PointOctree;

/// Anything that can turn a normalized pointer position into a world ray.
pub trait PickCamera {
    /// `ndc` is in `[-1, 1]` with +y up. `None` for degenerate projections.
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d>;
}

/// Camera described by plain matrices, using reverse-Z (near plane at
/// NDC z = 1, far plane towards z = 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraProjection {
    pub world_from_view: Mat4,
    pub clip_from_view: Mat4,
}

impl CameraProjection {
    pub fn new(world_from_view: Mat4, clip_from_view: Mat4) -> Self {
        Self {
            world_from_view,
            clip_from_view,
        }
    }

    /// Perspective camera at `transform` with an infinite reverse-Z projection.
    pub fn perspective(transform: &Transform, fov_y: f32, aspect_ratio: f32, near: f32) -> Self {
        Self::new(
            transform.compute_matrix(),
            Mat4::perspective_infinite_reverse_rh(fov_y, aspect_ratio, near),
        )
    }
}

impl PickCamera for CameraProjection {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d> {
        let view_from_clip = self.clip_from_view.inverse();
        if !view_from_clip.is_finite() {
            return None;
        }
        let world_from_ndc = self.world_from_view * view_from_clip;
        let near = world_from_ndc.project_point3(ndc.extend(1.0));
        let far = world_from_ndc.project_point3(ndc.extend(f32::EPSILON));
        let eye = self.world_from_view.w_axis.truncate();
        pointer_ray(&self.clip_from_view, eye, near, far)
    }
}

/// A Bevy camera entity's render camera and placement.
pub struct BevyCamera<'a> {
    pub camera: &'a Camera,
    pub transform: &'a GlobalTransform,
}

impl PickCamera for BevyCamera<'_> {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d> {
        let near = self.camera.ndc_to_world(self.transform, ndc.extend(1.0))?;
        let far = self
            .camera
            .ndc_to_world(self.transform, ndc.extend(f32::EPSILON))?;
        pointer_ray(
            &self.camera.clip_from_view(),
            self.transform.translation(),
            near,
            far,
        )
    }
}

/// Perspective rays start at the eye, so query distances are measured from
/// the camera. Orthographic rays start on the near plane.
fn pointer_ray(clip_from_view: &Mat4, eye: Vec3, near: Vec3, far: Vec3) -> Option<Ray3d> {
    if !near.is_finite() || !far.is_finite() || !eye.is_finite() {
        return None;
    }
    let direction = Dir3::new(far - near).ok()?;
    let perspective = clip_from_view.w_axis.w == 0.0;
    let origin = if perspective { eye } else { near };
    Some(Ray3d::new(origin, direction))
}

/// Result of one pointer query.
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub ray: Ray3d,
    /// Point indices near the ray, nearest first.
    pub indexes: Vec<u32>,
}

/// Cast the pointer ray into `index`, up to `max_distance` along the ray.
pub fn pick(
    pointer_ndc: Vec2,
    camera: &dyn PickCamera,
    index: &PointOctree,
    max_distance: f32,
) -> Option<Pick> {
    let ray = camera.ray_from_ndc(pointer_ndc)?;
    let indexes = index.query_ray(&ray, MIN_RAYCAST_DISTANCE, max_distance);
    Some(Pick { ray, indexes })
}
