//! Downward ray queries against the walkable AABB set.
//!
//! The ray starts slightly above the query point so a character that sank a
//! little below a surface this frame still finds it. Hits are folded to the
//! nearest one, which matches scanning an ordered intersection list and
//! taking the first acceptable entry.

use parry3d::query::{Ray, RayCast};

use crate::settings::GROUND_RAY_LIFT;
use crate::types::{Aabb, MeshId, Point3, Vec3};

/// Distance from `origin` straight down to the nearest AABB in `targets`,
/// or `None` if the ray hits nothing.
#[inline]
pub fn nearest_hit_below(targets: &[(MeshId, Aabb)], origin: Point3) -> Option<f32> {
    let ray = Ray::new(origin, -Vec3::y());
    let mut best: Option<f32> = None;
    for (_, aabb) in targets {
        if let Some(toi) = aabb.cast_local_ray(&ray, f32::MAX, true) {
            if best.map_or(true, |b| toi < b) {
                best = Some(toi);
            }
        }
    }
    best
}

/// Ground height below `position`, searching down `max_distance` meters.
///
/// The ray starts [`GROUND_RAY_LIFT`] above the position, so the accepted
/// window is `[0, max_distance + GROUND_RAY_LIFT]` below the ray origin.
pub fn ground_height(
    walkables: &[(MeshId, Aabb)],
    position: Point3,
    max_distance: f32,
) -> Option<f32> {
    let origin = Point3::new(position.x, position.y + GROUND_RAY_LIFT, position.z);
    let toi = nearest_hit_below(walkables, origin)?;
    if toi <= max_distance + GROUND_RAY_LIFT {
        Some(origin.y - toi)
    } else {
        None
    }
}

/// Height of the top of `target` at `(x, z)`, probing from above its top face.
///
/// Used to settle spawn candidates and decor onto a specific shelf. Returns
/// `None` when `(x, z)` is outside the target's footprint.
pub fn snap_onto(target: &Aabb, x: f32, z: f32) -> Option<f32> {
    let origin = Point3::new(x, target.maxs.y + GROUND_RAY_LIFT, z);
    let ray = Ray::new(origin, -Vec3::y());
    target
        .cast_local_ray(&ray, f32::MAX, true)
        .map(|toi| origin.y - toi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab(id: u32, top_y: f32) -> (MeshId, Aabb) {
        (
            MeshId(id),
            Aabb::new(
                Point3::new(-5.0, top_y - 0.2, -5.0),
                Point3::new(5.0, top_y, 5.0),
            ),
        )
    }

    #[test]
    fn finds_the_nearest_surface_below() {
        let walkables = vec![slab(0, 1.0), slab(1, 4.0)];
        // Standing above both slabs: the upper one wins.
        let h = ground_height(&walkables, Point3::new(0.0, 4.5, 0.0), 6.0).unwrap();
        assert!((h - 4.0).abs() < 1.0e-5);
        // Standing between them: the upper slab is above the lifted ray
        // origin, so only the lower one is found.
        let h = ground_height(&walkables, Point3::new(0.0, 1.4, 0.0), 6.0).unwrap();
        assert!((h - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn respects_the_search_window() {
        let walkables = vec![slab(0, 0.0)];
        assert!(ground_height(&walkables, Point3::new(0.0, 20.0, 0.0), 6.0).is_none());
        assert!(ground_height(&walkables, Point3::new(0.0, 5.0, 0.0), 6.0).is_some());
    }

    #[test]
    fn misses_to_the_side() {
        let walkables = vec![slab(0, 1.0)];
        assert!(ground_height(&walkables, Point3::new(50.0, 3.0, 0.0), 6.0).is_none());
    }

    #[test]
    fn snap_onto_lands_on_the_top_face() {
        let (_, aabb) = slab(0, 2.0);
        let y = snap_onto(&aabb, 1.0, -2.0).unwrap();
        assert!((y - 2.0).abs() < 1.0e-5);
        assert!(snap_onto(&aabb, 50.0, 0.0).is_none());
    }
}
