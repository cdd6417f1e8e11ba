//! One-shot classification of loaded scene meshes into typed collections.
//!
//! Roles are inferred from node names and bounding-box geometry exactly once
//! at load time; query code only ever sees the typed results (blockers,
//! surface zones, shelves, interactables), never the name strings.

use crate::settings::{
    SHELF_DEPTH_FRACTION, SHELF_MARGIN_FRACTION, SHELF_MARGIN_MIN, SHELF_THICKNESS_MIN,
    SHELF_THIN_FRACTION, SHELF_WIDTH_FRACTION,
};
use crate::types::{Aabb, MeshId, MeshRecord, SurfaceKind, Vec3};

use super::collide::BlockingVolume;

const SLIPPERY_KEYWORDS: &[&str] = &["ice", "butter", "slipper"];
const STICKY_KEYWORDS: &[&str] = &["jam", "jelly", "honey", "sticky"];
const DOOR_KEYWORDS: &[&str] = &["door"];
const BUTTON_KEYWORDS: &[&str] = &["button", "switch"];
/// Small fixtures that never block movement.
const FIXTURE_KEYWORDS: &[&str] = &["light", "bulb", "vent_fan"];
const SHELF_KEYWORDS: &[&str] = &["shelf", "tray", "rack", "drawer"];
/// Names whose top faces seed the simple spawn-height list.
const SHELF_HEIGHT_KEYWORDS: &[&str] = &["shelf", "tray", "rack", "drawer", "floor"];

/// Case-insensitive substring match against a keyword set.
#[inline]
pub fn name_matches(name: &str, keywords: &[&str]) -> bool {
    let lower = name.to_ascii_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// Surface-effect tag implied by a mesh name, if any.
#[inline]
pub fn surface_kind_for_name(name: &str) -> Option<SurfaceKind> {
    if name_matches(name, SLIPPERY_KEYWORDS) {
        Some(SurfaceKind::Slippery)
    } else if name_matches(name, STICKY_KEYWORDS) {
        Some(SurfaceKind::Sticky)
    } else {
        None
    }
}

/// True for small fixtures that are excluded from the blocking set.
#[inline]
pub fn is_fixture(name: &str) -> bool {
    name_matches(name, FIXTURE_KEYWORDS)
}

/// An axis-aligned volume with a surface-effect tag.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceZone {
    pub aabb: Aabb,
    pub kind: SurfaceKind,
}

/// A walkable layer derived from shelf-like geometry, with edge margins
/// subtracted from its usable rectangle.
#[derive(Clone, Copy, Debug)]
pub struct ShelfLayer {
    pub source: MeshId,
    pub aabb: Aabb,
    /// World height of the shelf's top face.
    pub top_y: f32,
    pub x_min: f32,
    pub x_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl ShelfLayer {
    #[inline]
    pub fn usable_width(&self) -> f32 {
        self.x_max - self.x_min
    }

    #[inline]
    pub fn usable_depth(&self) -> f32 {
        self.z_max - self.z_min
    }

    /// Center of the usable rectangle.
    #[inline]
    pub fn center_xz(&self) -> (f32, f32) {
        (
            (self.x_min + self.x_max) * 0.5,
            (self.z_min + self.z_max) * 0.5,
        )
    }
}

/// Seed data for the door state machine.
#[derive(Clone, Copy, Debug)]
pub struct DoorSeed {
    pub source: MeshId,
    pub closed_yaw: f32,
}

/// The typed collections produced by a structure-load classification pass.
#[derive(Debug, Default)]
pub struct Classified {
    pub blockers: Vec<BlockingVolume>,
    pub zones: Vec<SurfaceZone>,
    /// Downward-ray targets: every structural mesh is walkable by default.
    pub walkables: Vec<(MeshId, Aabb)>,
    /// Shelf layers, sorted ascending by top height.
    pub shelves: Vec<ShelfLayer>,
    /// Candidate spawn heights, sorted ascending.
    pub shelf_heights: Vec<f32>,
    pub door: Option<DoorSeed>,
    pub button: Option<Aabb>,
    /// Union of all mesh bounds (the container box).
    pub bounds: Option<Aabb>,
}

/// Classify a loaded static mesh set.
///
/// - Surface zones by keyword (slippery/sticky), first-declared wins at query time.
/// - The first door-named mesh becomes the door; the first button/switch-named
///   mesh becomes the exit button.
/// - Everything except small fixtures blocks movement.
/// - Shelf layers come from shelf-like names or from geometry: thin relative
///   to the container, and wide and deep enough to stand on.
pub fn classify(records: &[MeshRecord]) -> Classified {
    let mut out = Classified::default();

    let bounds = union_bounds(records);
    let container_size = bounds.map(|b| b.extents()).unwrap_or_else(Vec3::zeros);
    out.bounds = bounds;

    let mut named_heights = Vec::new();

    for rec in records {
        out.walkables.push((rec.id, rec.aabb));

        if let Some(kind) = surface_kind_for_name(&rec.name) {
            out.zones.push(SurfaceZone {
                aabb: rec.aabb,
                kind,
            });
        }

        if out.door.is_none() && name_matches(&rec.name, DOOR_KEYWORDS) {
            out.door = Some(DoorSeed {
                source: rec.id,
                closed_yaw: rec.yaw,
            });
        }
        if out.button.is_none() && name_matches(&rec.name, BUTTON_KEYWORDS) {
            out.button = Some(rec.aabb);
        }

        if !is_fixture(&rec.name) {
            out.blockers.push(BlockingVolume {
                aabb: rec.aabb,
                source: rec.id,
            });
        }

        if name_matches(&rec.name, SHELF_HEIGHT_KEYWORDS) {
            named_heights.push(rec.aabb.maxs.y);
        }

        if is_shelf_like(&rec.name, rec.aabb.extents(), container_size) {
            out.shelves.push(shelf_layer(rec.id, rec.aabb));
        }
    }

    out.shelves
        .sort_by(|a, b| a.top_y.partial_cmp(&b.top_y).unwrap_or(std::cmp::Ordering::Equal));

    let mut heights: Vec<f32> = if out.shelves.is_empty() {
        named_heights
    } else {
        out.shelves.iter().map(|s| s.top_y).collect()
    };
    heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out.shelf_heights = heights;

    out
}

/// Shelf test: shelf-like name, or thin + wide + deep relative to the container.
pub fn is_shelf_like(name: &str, size: Vec3, container_size: Vec3) -> bool {
    if name_matches(name, SHELF_KEYWORDS) {
        return true;
    }
    let thin = size.y <= (container_size.y * SHELF_THIN_FRACTION).max(SHELF_THICKNESS_MIN);
    let wide = size.x >= container_size.x * SHELF_WIDTH_FRACTION;
    let deep = size.z >= container_size.z * SHELF_DEPTH_FRACTION;
    thin && wide && deep
}

/// Build a shelf layer with edge margins subtracted from its usable rectangle.
fn shelf_layer(source: MeshId, aabb: Aabb) -> ShelfLayer {
    let size = aabb.extents();
    let margin_x = (size.x * SHELF_MARGIN_FRACTION).max(SHELF_MARGIN_MIN);
    let margin_z = (size.z * SHELF_MARGIN_FRACTION).max(SHELF_MARGIN_MIN);
    ShelfLayer {
        source,
        aabb,
        top_y: aabb.maxs.y,
        x_min: aabb.mins.x + margin_x,
        x_max: aabb.maxs.x - margin_x,
        z_min: aabb.mins.z + margin_z,
        z_max: aabb.maxs.z - margin_z,
    }
}

fn union_bounds(records: &[MeshRecord]) -> Option<Aabb> {
    let mut iter = records.iter();
    let first = iter.next()?;
    let mut bounds = first.aabb;
    for rec in iter {
        bounds.mins = bounds.mins.inf(&rec.aabb.mins);
        bounds.maxs = bounds.maxs.sup(&rec.aabb.maxs);
    }
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point3;

    fn record(id: u32, name: &str, mins: [f32; 3], maxs: [f32; 3]) -> MeshRecord {
        MeshRecord::new(
            MeshId(id),
            name,
            Aabb::new(
                Point3::new(mins[0], mins[1], mins[2]),
                Point3::new(maxs[0], maxs[1], maxs[2]),
            ),
        )
    }

    #[test]
    fn surface_names_map_to_kinds() {
        assert_eq!(
            surface_kind_for_name("Ice_Cube.003"),
            Some(SurfaceKind::Slippery)
        );
        assert_eq!(
            surface_kind_for_name("jam_spill"),
            Some(SurfaceKind::Sticky)
        );
        assert_eq!(surface_kind_for_name("Shelf_Mid"), None);
    }

    #[test]
    fn first_door_and_button_win() {
        let records = vec![
            record(0, "wall", [0.0, 0.0, 0.0], [1.0, 4.0, 1.0]),
            record(1, "Door_Main", [1.0, 0.0, 0.0], [2.0, 4.0, 0.2]),
            record(2, "door_hinge", [2.0, 0.0, 0.0], [2.1, 4.0, 0.2]),
            record(3, "exit_switch", [0.5, 1.0, 0.5], [0.7, 1.2, 0.7]),
        ];
        let classified = classify(&records);
        assert_eq!(classified.door.unwrap().source, MeshId(1));
        assert!(classified.button.is_some());
    }

    #[test]
    fn fixtures_do_not_block() {
        let records = vec![
            record(0, "wall", [0.0, 0.0, 0.0], [1.0, 4.0, 1.0]),
            record(1, "ceiling_light", [0.4, 3.8, 0.4], [0.6, 4.0, 0.6]),
            record(2, "vent_fan", [0.0, 3.5, 0.0], [0.3, 3.8, 0.3]),
        ];
        let classified = classify(&records);
        let sources: Vec<MeshId> = classified.blockers.iter().map(|b| b.source).collect();
        assert_eq!(sources, vec![MeshId(0)]);
        // Fixtures still count as walkable ray targets.
        assert_eq!(classified.walkables.len(), 3);
    }

    #[test]
    fn thin_wide_deep_geometry_is_a_shelf_even_unnamed() {
        // Container is 10x10x10; the slab is 0.2 thick and spans most of it.
        let records = vec![
            record(0, "fridge_body", [0.0, 0.0, 0.0], [10.0, 10.0, 10.0]),
            record(1, "slab", [1.0, 3.0, 1.0], [9.0, 3.2, 9.0]),
        ];
        let classified = classify(&records);
        assert_eq!(classified.shelves.len(), 1);
        let shelf = &classified.shelves[0];
        assert_eq!(shelf.source, MeshId(1));
        assert!((shelf.top_y - 3.2).abs() < 1.0e-6);
        // Margins pull the usable rectangle in from the slab edges.
        assert!(shelf.x_min > 1.0 && shelf.x_max < 9.0);
        assert!(shelf.z_min > 1.0 && shelf.z_max < 9.0);
    }

    #[test]
    fn tall_or_narrow_geometry_is_not_a_shelf() {
        let records = vec![
            record(0, "fridge_body", [0.0, 0.0, 0.0], [10.0, 10.0, 10.0]),
            // Thin but far too narrow.
            record(1, "sliver", [4.0, 3.0, 4.0], [5.0, 3.1, 5.0]),
            // Wide and deep but a solid block.
            record(2, "crate", [1.0, 0.0, 1.0], [9.0, 4.0, 9.0]),
        ];
        let classified = classify(&records);
        assert!(classified.shelves.is_empty());
    }

    #[test]
    fn shelves_sort_ascending_by_top_height() {
        let records = vec![
            record(0, "shelf_top", [0.0, 6.0, 0.0], [8.0, 6.2, 8.0]),
            record(1, "shelf_bottom", [0.0, 1.0, 0.0], [8.0, 1.2, 8.0]),
            record(2, "shelf_mid", [0.0, 3.0, 0.0], [8.0, 3.2, 8.0]),
        ];
        let classified = classify(&records);
        let tops: Vec<f32> = classified.shelves.iter().map(|s| s.top_y).collect();
        assert_eq!(tops, vec![1.2, 3.2, 6.2]);
        assert_eq!(classified.shelf_heights, vec![1.2, 3.2, 6.2]);
    }
}
