//! Axis-separated collision resolution against the blocking volume set.
//!
//! The character is treated as a vertical line with a horizontal radius;
//! every blocking volume is an AABB inflated by that radius in X/Z, with a
//! fixed vertical slack so a move is only blocked by volumes near the
//! character's height.

use crate::types::{Aabb, MeshId, Point3};

/// An immutable world-space volume that blocks horizontal movement.
#[derive(Clone, Copy, Debug)]
pub struct BlockingVolume {
    pub aabb: Aabb,
    pub source: MeshId,
}

/// Point-vs-volume test on the X/Z plane.
///
/// The volume is inflated by `radius` horizontally; vertically the point must
/// fall within the volume's span extended by `y_tolerance` on both ends.
#[inline]
pub fn overlaps(volume: &Aabb, x: f32, z: f32, y: f32, radius: f32, y_tolerance: f32) -> bool {
    x >= volume.mins.x - radius
        && x <= volume.maxs.x + radius
        && z >= volume.mins.z - radius
        && z <= volume.maxs.z + radius
        && y >= volume.mins.y - y_tolerance
        && y <= volume.maxs.y + y_tolerance
}

/// True if the point collides with any volume in the set.
#[inline]
pub fn blocked_at(
    blockers: &[BlockingVolume],
    x: f32,
    z: f32,
    y: f32,
    radius: f32,
    y_tolerance: f32,
) -> bool {
    blockers
        .iter()
        .any(|b| overlaps(&b.aabb, x, z, y, radius, y_tolerance))
}

/// Resolve a desired horizontal move against the blocking set.
///
/// Tries, in order: the full move, the X component alone, the Z component
/// alone, and finally no horizontal move at all. The order is load-bearing —
/// it is what makes the character slide along whichever wall axis is
/// unobstructed instead of sticking to corners. The vertical component of
/// `desired` always survives.
pub fn resolve(
    blockers: &[BlockingVolume],
    current: Point3,
    desired: Point3,
    radius: f32,
    y_tolerance: f32,
) -> Point3 {
    let y = desired.y;

    if !blocked_at(blockers, desired.x, desired.z, y, radius, y_tolerance) {
        return desired;
    }

    if !blocked_at(blockers, desired.x, current.z, y, radius, y_tolerance) {
        return Point3::new(desired.x, y, current.z);
    }

    if !blocked_at(blockers, current.x, desired.z, y, radius, y_tolerance) {
        return Point3::new(current.x, y, desired.z);
    }

    Point3::new(current.x, y, current.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BLOCKER_VERTICAL_TOLERANCE;

    const RADIUS: f32 = 0.25;

    fn volume(mins: [f32; 3], maxs: [f32; 3]) -> BlockingVolume {
        BlockingVolume {
            aabb: Aabb::new(
                Point3::new(mins[0], mins[1], mins[2]),
                Point3::new(maxs[0], maxs[1], maxs[2]),
            ),
            source: MeshId(0),
        }
    }

    fn resolve_one(block: BlockingVolume, current: Point3, desired: Point3) -> Point3 {
        resolve(
            &[block],
            current,
            desired,
            RADIUS,
            BLOCKER_VERTICAL_TOLERANCE,
        )
    }

    #[test]
    fn clear_move_is_accepted_unchanged() {
        let block = volume([10.0, 0.0, 10.0], [11.0, 2.0, 11.0]);
        let current = Point3::new(0.0, 0.0, 0.0);
        let desired = Point3::new(0.5, 0.0, 0.5);
        assert_eq!(resolve_one(block, current, desired), desired);
    }

    #[test]
    fn z_blocked_move_slides_along_x() {
        // Wall ahead in +Z; moving diagonally should keep the X component.
        let block = volume([-5.0, 0.0, 0.5], [5.0, 2.0, 1.5]);
        let current = Point3::new(0.0, 0.0, 0.0);
        let desired = Point3::new(0.4, 0.0, 0.4);
        let resolved = resolve_one(block, current, desired);
        assert_eq!(resolved, Point3::new(0.4, 0.0, 0.0));
    }

    #[test]
    fn x_blocked_move_slides_along_z() {
        // Wall ahead in +X; moving diagonally should keep the Z component.
        let block = volume([0.5, 0.0, -5.0], [1.5, 2.0, 5.0]);
        let current = Point3::new(0.0, 0.0, 0.0);
        let desired = Point3::new(0.4, 0.0, 0.4);
        let resolved = resolve_one(block, current, desired);
        assert_eq!(resolved, Point3::new(0.0, 0.0, 0.4));
    }

    #[test]
    fn corner_rejects_both_axes() {
        // Hugging the corner of the inflated box: the full move and both
        // axis-isolated moves all land inside, so the character stops.
        let block = volume([-1.0, 0.0, -1.0], [1.0, 2.0, 1.0]);
        let current = Point3::new(-1.2, 0.0, -1.2);
        let desired = Point3::new(-1.0, 0.0, -1.0);
        let resolved = resolve_one(block, current, desired);
        assert_eq!(resolved, Point3::new(current.x, desired.y, current.z));
    }

    #[test]
    fn vertical_tolerance_limits_blocking_height() {
        // A volume spanning y in [0, 2] with ±1 tolerance blocks at y = 2.9
        // but not at y = 3.1.
        let block = volume([-1.0, 0.0, -1.0], [1.0, 2.0, 1.0]);
        let current = Point3::new(-2.0, 0.0, 0.0);

        let low = Point3::new(0.0, 2.9, 0.0);
        assert_eq!(
            resolve_one(block, Point3::new(current.x, low.y, current.z), low),
            Point3::new(current.x, low.y, current.z)
        );

        let high = Point3::new(0.0, 3.1, 0.0);
        assert_eq!(
            resolve_one(block, Point3::new(current.x, high.y, current.z), high),
            high
        );
    }

    #[test]
    fn radius_inflates_the_volume() {
        let block = volume([1.0, 0.0, -1.0], [2.0, 2.0, 1.0]);
        let current = Point3::new(0.0, 0.0, 0.0);
        // 0.8 is outside the box itself but inside the radius-inflated box.
        let desired = Point3::new(0.8, 0.0, 0.0);
        let resolved = resolve_one(block, current, desired);
        assert_eq!(resolved, Point3::new(0.0, 0.0, 0.0));
    }
}
