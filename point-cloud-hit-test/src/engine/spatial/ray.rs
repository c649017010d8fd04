use bevy::math::Vec3;

use super::bounds::CellBounds;

/// Slab-method ray–AABB intersection.
/// Returns the parametric entry and exit distances `(t_enter, t_exit)` along the
/// ray, or `None` when the ray misses the box or the box lies entirely behind
/// the origin. `t_enter` is negative when the origin is inside the box.
pub fn ray_cell_span(origin: Vec3, direction: Vec3, cell: &CellBounds) -> Option<(f32, f32)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let (lo, hi) = (cell.min[axis], cell.max[axis]);

        if d == 0.0 {
            // Parallel to this slab: inside it or never.
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }
    Some((t_enter, t_exit))
}

/// Ray parameter of the point's projection and its squared distance from the ray.
/// `direction` must be normalized.
pub fn project_onto_ray(origin: Vec3, direction: Vec3, point: Vec3) -> (f32, f32) {
    let to_point = point - origin;
    let t = to_point.dot(direction);
    let closest = origin + direction * t;
    (t, point.distance_squared(closest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cell() -> CellBounds {
        CellBounds::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn ray_through_cell_reports_entry_and_exit() {
        let span = ray_cell_span(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, &unit_cell());
        assert_eq!(span, Some((4.0, 6.0)));
    }

    #[test]
    fn ray_from_inside_enters_behind_origin() {
        let (t_enter, t_exit) = ray_cell_span(Vec3::ZERO, Vec3::X, &unit_cell()).unwrap();
        assert!(t_enter < 0.0);
        assert_eq!(t_exit, 1.0);
    }

    #[test]
    fn cell_behind_origin_is_missed() {
        assert!(ray_cell_span(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, &unit_cell()).is_none());
    }

    #[test]
    fn parallel_ray_outside_slab_is_missed() {
        assert!(ray_cell_span(Vec3::new(0.0, 2.0, -5.0), Vec3::Z, &unit_cell()).is_none());
    }

    #[test]
    fn projection_measures_perpendicular_distance() {
        let (t, d2) = project_onto_ray(Vec3::ZERO, Vec3::X, Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(t, 3.0);
        assert_eq!(d2, 16.0);
    }
}
