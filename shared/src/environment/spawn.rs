//! Spawn point selection.
//!
//! The simple spawn point aims for the container center at the lowest shelf
//! height. Once decor has been placed, shelf occupancy is unknown
//! analytically, so the safe variant rejection-samples random points on a
//! mid-ranked shelf against the blocking set and falls back to the shelf
//! center when the budget runs out. The fallback may itself be occupied;
//! that is accepted degraded behavior, not an error.

use rand::Rng;

use crate::settings::{SAFE_SPAWN_TRIES, SPAWN_VERTICAL_TOLERANCE};
use crate::types::Point3;

use super::{Environment, classify::ShelfLayer, collide, ground};

/// Spawn candidates must land on shelves at least this wide/deep.
const MIN_SHELF_WIDTH: f32 = 0.2;
const MIN_SHELF_DEPTH: f32 = 0.1;

/// Lift applied above the resolved surface so the ground clamp settles the
/// character instead of starting it intersecting.
const SPAWN_LIFT: f32 = 0.05;

pub(super) fn spawn_point(env: &Environment, rng: &mut impl Rng) -> Point3 {
    let fallback = Point3::new(0.0, 1.0, 0.0);
    if !env.is_loaded() {
        return fallback;
    }
    let Some(bounds) = env.bounds() else {
        return fallback;
    };

    let center = bounds.center();
    let mut pos = Point3::new(center.x, center.y, center.z);

    // Bias to the lowest shelf, else just above the container floor.
    let mut y = bounds.mins.y + 0.5;
    if let Some(&lowest) = env.shelf_heights().first() {
        y = lowest + SPAWN_LIFT;
    }
    pos.y = y + 0.1;

    if env.is_ready() && !env.shelves().is_empty() {
        if let Some(safe) = safe_spawn_point(env, crate::settings::SAFE_SPAWN_RADIUS, rng) {
            return safe;
        }
    }

    // Snap to whatever surface is actually below the biased point.
    let info = env.ground_info(pos, crate::settings::GROUND_MAX_DISTANCE);
    pos.y = info.height + SPAWN_LIFT;
    pos
}

pub(super) fn safe_spawn_point(
    env: &Environment,
    radius: f32,
    rng: &mut impl Rng,
) -> Option<Point3> {
    let shelves = env.shelves();
    if shelves.is_empty() {
        return None;
    }

    let candidates: Vec<&ShelfLayer> = shelves
        .iter()
        .filter(|s| s.usable_width() > MIN_SHELF_WIDTH && s.usable_depth() > MIN_SHELF_DEPTH)
        .collect();
    // Prefer the second-lowest viable shelf; fall back to the middle shelf.
    let shelf = if candidates.is_empty() {
        &shelves[shelves.len() / 2]
    } else {
        candidates[1.min(candidates.len() - 1)]
    };
    if shelf.usable_width() <= 0.0 || shelf.usable_depth() <= 0.0 {
        return None;
    }

    // The sampled shelf's own volume is the thing being stood on; testing
    // against it would reject every candidate.
    let blocked = |x: f32, z: f32| {
        env.blockers().iter().any(|b| {
            b.source != shelf.source
                && collide::overlaps(&b.aabb, x, z, shelf.top_y, radius, SPAWN_VERTICAL_TOLERANCE)
        })
    };

    for _ in 0..SAFE_SPAWN_TRIES {
        let x = rng.gen_range(shelf.x_min..=shelf.x_max);
        let z = rng.gen_range(shelf.z_min..=shelf.z_max);
        if let Some(y) = ground::snap_onto(&shelf.aabb, x, z) {
            if !blocked(x, z) {
                return Some(Point3::new(x, y + SPAWN_LIFT, z));
            }
        }
    }

    // Budget exhausted: settle for the shelf center.
    let (cx, cz) = shelf.center_xz();
    ground::snap_onto(&shelf.aabb, cx, cz).map(|y| Point3::new(cx, y + SPAWN_LIFT, cz))
}
