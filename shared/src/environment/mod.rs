/*!
The environment: spatial and collision authority for the fridge interior.

Owns the typed collections classified from the loaded scene (blocking
volumes, surface zones, shelf layers, door, exit button) and answers every
spatial question the character controller asks: ground height, surface tag,
collision resolution, button containment, spawn placement.

Readiness is two-phase. `StructureReady` means the static scene has been
classified; `FullyReady` additionally means decorative population finished.
Each phase drains its subscriber list exactly once, and a subscriber that
registers after the phase fired is invoked immediately.
*/

pub mod classify;
pub mod collide;
pub mod ground;
pub mod placement;
mod spawn;

use log::warn;
use rand::Rng;

use crate::settings::{BLOCKER_VERTICAL_TOLERANCE, DOOR_OPEN_ANGLE, DOOR_OPEN_RATE};
use crate::types::{Aabb, GroundInfo, MeshId, MeshRecord, Point3, SurfaceKind};

pub use classify::{Classified, ShelfLayer, SurfaceZone};
pub use collide::BlockingVolume;
pub use placement::{CatalogEntry, DecorPlacement, PRODUCT_CATALOG};

/// The exit door's swing state. `open_amount` only ever grows.
#[derive(Clone, Copy, Debug)]
pub struct DoorState {
    source: MeshId,
    closed_yaw: f32,
    /// Swing direction around Y. Negative opens away from the interior.
    open_sign: f32,
    opening: bool,
    open_amount: f32,
    blocker_removed: bool,
}

impl DoorState {
    fn new(source: MeshId, closed_yaw: f32) -> Self {
        Self {
            source,
            closed_yaw,
            open_sign: -1.0,
            opening: false,
            open_amount: 0.0,
            blocker_removed: false,
        }
    }

    /// Scene mesh this door animates.
    #[inline]
    pub fn source(&self) -> MeshId {
        self.source
    }

    /// Current swing fraction in `[0, 1]`.
    #[inline]
    pub fn open_amount(&self) -> f32 {
        self.open_amount
    }

    /// World yaw the door mesh should be posed at.
    #[inline]
    pub fn yaw(&self) -> f32 {
        self.closed_yaw + self.open_sign * DOOR_OPEN_ANGLE * self.open_amount
    }

    #[inline]
    pub fn is_opening(&self) -> bool {
        self.opening
    }
}

/// Load progress of the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Pending,
    StructureReady,
    FullyReady,
}

type ReadyCallback = Box<dyn FnOnce() + Send>;

#[derive(Default)]
pub struct Environment {
    readiness: Readiness,
    blockers: Vec<BlockingVolume>,
    zones: Vec<SurfaceZone>,
    walkables: Vec<(MeshId, Aabb)>,
    shelves: Vec<ShelfLayer>,
    shelf_heights: Vec<f32>,
    bounds: Option<Aabb>,
    door: Option<DoorState>,
    button: Option<Aabb>,
}

/// Phase tag plus the subscriber queues it drains.
struct Readiness {
    phase: Phase,
    on_loaded: Vec<ReadyCallback>,
    on_ready: Vec<ReadyCallback>,
}

impl Default for Readiness {
    fn default() -> Self {
        Self {
            phase: Phase::Pending,
            on_loaded: Vec::new(),
            on_ready: Vec::new(),
        }
    }
}

impl Environment {
    /// An environment waiting for its scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an already-structure-ready environment from a mesh set.
    /// Convenience for synchronous callers and tests.
    pub fn from_meshes(records: Vec<MeshRecord>) -> Self {
        let mut env = Self::new();
        env.load_structure(records);
        env
    }

    // --- loading & readiness -------------------------------------------------

    /// Classify the loaded static scene and enter `StructureReady`.
    /// A second call is ignored: the structural mesh set loads once.
    pub fn load_structure(&mut self, records: Vec<MeshRecord>) {
        if self.readiness.phase != Phase::Pending {
            warn!("environment structure loaded twice; ignoring");
            return;
        }
        let classified = classify::classify(&records);
        self.blockers = classified.blockers;
        self.zones = classified.zones;
        self.walkables = classified.walkables;
        self.shelves = classified.shelves;
        self.shelf_heights = classified.shelf_heights;
        self.bounds = classified.bounds;
        self.door = classified
            .door
            .map(|seed| DoorState::new(seed.source, seed.closed_yaw));
        self.button = classified.button;

        self.readiness.phase = Phase::StructureReady;
        for cb in self.readiness.on_loaded.drain(..) {
            cb();
        }
    }

    /// The scene failed to load: enter `StructureReady` with empty collision
    /// and surface data so the rest of the game keeps running in an empty
    /// room.
    pub fn load_structure_failed(&mut self) {
        if self.readiness.phase != Phase::Pending {
            return;
        }
        warn!("environment scene failed to load; continuing with empty collision data");
        self.readiness.phase = Phase::StructureReady;
        for cb in self.readiness.on_loaded.drain(..) {
            cb();
        }
    }

    /// Register a decorative mesh placed after structure load. It becomes a
    /// walkable ray target, a blocking volume, and (by name) a surface zone,
    /// exactly like structural meshes.
    pub fn register_decor_mesh(&mut self, record: &MeshRecord) {
        self.walkables.push((record.id, record.aabb));
        self.blockers.push(BlockingVolume {
            aabb: record.aabb,
            source: record.id,
        });
        if let Some(kind) = classify::surface_kind_for_name(&record.name) {
            self.zones.push(SurfaceZone {
                aabb: record.aabb,
                kind,
            });
        }
    }

    /// Decorative population finished: enter `FullyReady`.
    pub fn finish_decor(&mut self) {
        if self.readiness.phase != Phase::StructureReady {
            return;
        }
        self.readiness.phase = Phase::FullyReady;
        for cb in self.readiness.on_ready.drain(..) {
            cb();
        }
    }

    /// True once the static scene has been classified (or load failed).
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.readiness.phase >= Phase::StructureReady
    }

    /// True once decorative population has also finished.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.readiness.phase == Phase::FullyReady
    }

    /// Run `cb` when the structure is loaded; immediately if it already is.
    pub fn on_loaded<F: FnOnce() + Send + 'static>(&mut self, cb: F) {
        if self.is_loaded() {
            cb();
        } else {
            self.readiness.on_loaded.push(Box::new(cb));
        }
    }

    /// Run `cb` when decor population completes; immediately if it already has.
    pub fn on_ready<F: FnOnce() + Send + 'static>(&mut self, cb: F) {
        if self.is_ready() {
            cb();
        } else {
            self.readiness.on_ready.push(Box::new(cb));
        }
    }

    // --- spatial queries -----------------------------------------------------

    /// Ground height and surface tag below `position`.
    ///
    /// Falls back to a bare floor at height 0 when the environment is not
    /// loaded, has no walkable meshes, or nothing lies within
    /// `max_distance + GROUND_RAY_LIFT` below the ray origin.
    pub fn ground_info(&self, position: Point3, max_distance: f32) -> GroundInfo {
        if !self.is_loaded() || self.walkables.is_empty() {
            return GroundInfo::FLOOR;
        }
        match ground::ground_height(&self.walkables, position, max_distance) {
            Some(height) => {
                let hit = Point3::new(position.x, height, position.z);
                GroundInfo {
                    height,
                    surface: self.surface_at(hit),
                }
            }
            None => GroundInfo::FLOOR,
        }
    }

    /// Surface tag at a point. First declared zone wins on overlap.
    pub fn surface_at(&self, point: Point3) -> Option<SurfaceKind> {
        self.zones
            .iter()
            .find(|z| z.aabb.contains_local_point(&point))
            .map(|z| z.kind)
    }

    /// Resolve a desired horizontal move against the blocking set.
    /// Accepts the move unchanged while the environment is not loaded.
    pub fn resolve_collision(&self, current: Point3, desired: Point3, radius: f32) -> Point3 {
        if !self.is_loaded() {
            return desired;
        }
        collide::resolve(
            &self.blockers,
            current,
            desired,
            radius,
            BLOCKER_VERTICAL_TOLERANCE,
        )
    }

    /// Is the character standing inside the exit button's volume?
    /// Always false when the scene has no button mesh.
    pub fn at_exit_button(&self, position: Point3) -> bool {
        self.button
            .map(|b| b.contains_local_point(&position))
            .unwrap_or(false)
    }

    // --- door ----------------------------------------------------------------

    /// Start opening the exit door. The door's blocking volume is removed on
    /// the first call; repeated calls change nothing further.
    pub fn open_door(&mut self) {
        let Some(door) = self.door.as_mut() else {
            return;
        };
        door.opening = true;
        if !door.blocker_removed {
            let source = door.source;
            self.blockers.retain(|b| b.source != source);
            door.blocker_removed = true;
        }
    }

    /// Advance the door swing. `open_amount` grows at [`DOOR_OPEN_RATE`] per
    /// second, saturating at 1.
    pub fn update(&mut self, dt: f32) {
        if let Some(door) = self.door.as_mut() {
            if door.opening {
                door.open_amount = (door.open_amount + DOOR_OPEN_RATE * dt).min(1.0);
            }
        }
    }

    #[inline]
    pub fn door(&self) -> Option<&DoorState> {
        self.door.as_ref()
    }

    // --- spawn ---------------------------------------------------------------

    /// Suggest a spawn point: container center at the lowest shelf, snapped
    /// to the surface below, preferring a collision-free sample once decor
    /// has been placed.
    pub fn spawn_point(&self, rng: &mut impl Rng) -> Point3 {
        spawn::spawn_point(self, rng)
    }

    /// Rejection-sample a collision-free point on a mid-ranked shelf.
    /// `None` only when the environment has no shelves at all.
    pub fn safe_spawn_point(&self, radius: f32, rng: &mut impl Rng) -> Option<Point3> {
        spawn::safe_spawn_point(self, radius, rng)
    }

    // --- accessors -----------------------------------------------------------

    #[inline]
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    #[inline]
    pub fn shelves(&self) -> &[ShelfLayer] {
        &self.shelves
    }

    #[inline]
    pub fn shelf_heights(&self) -> &[f32] {
        &self.shelf_heights
    }

    #[inline]
    pub fn blockers(&self) -> &[BlockingVolume] {
        &self.blockers
    }

    /// Container size, zero when nothing is loaded. Used by decor placement.
    pub fn container_size(&self) -> crate::types::Vec3 {
        self.bounds
            .map(|b| b.extents())
            .unwrap_or_else(crate::types::Vec3::zeros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{GROUND_MAX_DISTANCE, SAFE_SPAWN_RADIUS};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

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

    /// A minimal fridge: floor slab, two shelves, a door, a button, and an
    /// ice patch on the lower shelf.
    fn fridge() -> Environment {
        Environment::from_meshes(vec![
            record(0, "floor", [-5.0, -0.2, -5.0], [5.0, 0.0, 5.0]),
            record(1, "shelf_low", [-4.0, 2.5, -4.0], [4.0, 2.7, 4.0]),
            record(2, "shelf_high", [-4.0, 6.0, -4.0], [4.0, 6.2, 4.0]),
            record(3, "door_front", [-5.0, 0.0, 5.0], [5.0, 8.0, 5.2]),
            record(4, "exit_button", [4.5, 0.0, -0.5], [5.0, 0.5, 0.5]),
            record(5, "ice_patch", [-3.0, 2.5, -3.0], [-1.0, 2.8, -1.0]),
        ])
    }

    #[test]
    fn unloaded_environment_answers_with_defaults() {
        let env = Environment::new();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            env.ground_info(Point3::new(0.0, 5.0, 0.0), GROUND_MAX_DISTANCE),
            GroundInfo::FLOOR
        );
        let desired = Point3::new(3.0, 0.0, 3.0);
        assert_eq!(
            env.resolve_collision(Point3::origin(), desired, 0.25),
            desired
        );
        assert!(!env.at_exit_button(Point3::origin()));
        assert_eq!(env.spawn_point(&mut rng), Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn ground_info_reports_surface_tags() {
        let env = fridge();
        // On the ice patch atop the lower shelf.
        let info = env.ground_info(Point3::new(-2.0, 3.0, -2.0), GROUND_MAX_DISTANCE);
        assert!((info.height - 2.8).abs() < 1.0e-4);
        assert_eq!(info.surface, Some(SurfaceKind::Slippery));
        // On the bare part of the same shelf.
        let info = env.ground_info(Point3::new(2.0, 3.0, 2.0), GROUND_MAX_DISTANCE);
        assert!((info.height - 2.7).abs() < 1.0e-4);
        assert_eq!(info.surface, None);
    }

    #[test]
    fn surface_lookup_misses_outside_every_zone() {
        let env = fridge();
        assert_eq!(
            env.surface_at(Point3::new(-2.0, 2.6, -2.0)),
            Some(SurfaceKind::Slippery)
        );
        assert_eq!(env.surface_at(Point3::new(3.0, 2.6, 3.0)), None);
    }

    #[test]
    fn exit_button_containment() {
        let env = fridge();
        assert!(env.at_exit_button(Point3::new(4.7, 0.2, 0.0)));
        assert!(!env.at_exit_button(Point3::new(0.0, 0.2, 0.0)));
    }

    #[test]
    fn door_opens_monotonically_and_saturates() {
        let mut env = fridge();
        env.open_door();

        let mut last = 0.0;
        for _ in 0..40 {
            env.update(0.05);
            let amount = env.door().unwrap().open_amount();
            assert!(amount >= last);
            last = amount;
        }
        assert_eq!(last, 1.0);
        env.update(1.0);
        assert_eq!(env.door().unwrap().open_amount(), 1.0);

        // Fully open: yaw swung a quarter turn negative from closed.
        let yaw = env.door().unwrap().yaw();
        assert!((yaw - (-std::f32::consts::FRAC_PI_2)).abs() < 1.0e-5);
    }

    #[test]
    fn door_blocker_is_removed_exactly_once() {
        let mut env = fridge();
        let door_id = env.door().unwrap().source();
        assert!(env.blockers().iter().any(|b| b.source == door_id));

        env.open_door();
        assert!(!env.blockers().iter().any(|b| b.source == door_id));
        let count = env.blockers().len();

        // Repeated calls must not remove anything else.
        env.open_door();
        env.open_door();
        assert_eq!(env.blockers().len(), count);
    }

    #[test]
    fn door_does_not_move_before_open_door() {
        let mut env = fridge();
        env.update(10.0);
        assert_eq!(env.door().unwrap().open_amount(), 0.0);
    }

    #[test]
    fn ready_callbacks_fire_once_and_immediately_for_late_registrants() {
        let mut env = Environment::new();
        let loaded = Arc::new(AtomicUsize::new(0));
        let ready = Arc::new(AtomicUsize::new(0));

        let l = loaded.clone();
        env.on_loaded(move || {
            l.fetch_add(1, Ordering::SeqCst);
        });
        let r = ready.clone();
        env.on_ready(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(loaded.load(Ordering::SeqCst), 0);

        env.load_structure(vec![record(0, "floor", [0.0; 3], [1.0, 0.2, 1.0])]);
        assert_eq!(loaded.load(Ordering::SeqCst), 1);
        assert_eq!(ready.load(Ordering::SeqCst), 0);

        env.finish_decor();
        assert_eq!(ready.load(Ordering::SeqCst), 1);

        // Late registrants run immediately, earlier queues stay drained.
        let l = loaded.clone();
        env.on_loaded(move || {
            l.fetch_add(1, Ordering::SeqCst);
        });
        let r = ready.clone();
        env.on_ready(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(loaded.load(Ordering::SeqCst), 2);
        assert_eq!(ready.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_load_still_reaches_loaded_with_empty_data() {
        let mut env = Environment::new();
        env.load_structure_failed();
        assert!(env.is_loaded());
        assert!(env.blockers().is_empty());
        assert_eq!(
            env.ground_info(Point3::new(0.0, 3.0, 0.0), GROUND_MAX_DISTANCE),
            GroundInfo::FLOOR
        );
    }

    #[test]
    fn decor_meshes_join_blockers_walkables_and_zones() {
        let mut env = fridge();
        let before = env.blockers().len();
        env.register_decor_mesh(&record(10, "honey_jar", [0.0, 2.2, 0.0], [0.6, 2.8, 0.6]));
        assert_eq!(env.blockers().len(), before + 1);
        assert_eq!(
            env.surface_at(Point3::new(0.3, 2.5, 0.3)),
            Some(SurfaceKind::Sticky)
        );
    }

    #[test]
    fn spawn_point_lands_on_the_lowest_shelf() {
        let env = fridge();
        let mut rng = StdRng::seed_from_u64(42);
        let spawn = env.spawn_point(&mut rng);
        // The floor slab is the lowest shelf-like layer; the biased point
        // snaps onto its top face.
        assert!((spawn.y - 0.05).abs() < 1.0e-4);
        // Inside the container footprint.
        assert!(spawn.x.abs() <= 5.0 && spawn.z.abs() <= 5.0);
    }

    #[test]
    fn safe_spawn_avoids_blockers_and_falls_back_deterministically() {
        let mut env = fridge();
        env.finish_decor();
        let mut rng = StdRng::seed_from_u64(9);

        let spawn = env
            .safe_spawn_point(SAFE_SPAWN_RADIUS, &mut rng)
            .expect("shelves exist");
        // The sample must not sit inside the ice patch blocker (the only
        // blocker near the picked shelf's top besides the shelf itself).
        assert!(
            !(spawn.x >= -3.0 - SAFE_SPAWN_RADIUS
                && spawn.x <= -1.0 + SAFE_SPAWN_RADIUS
                && spawn.z >= -3.0 - SAFE_SPAWN_RADIUS
                && spawn.z <= -1.0 + SAFE_SPAWN_RADIUS)
        );
    }

    #[test]
    fn safe_spawn_is_none_without_shelves() {
        let env = Environment::from_meshes(vec![record(
            0,
            "crate",
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
        )]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(env.safe_spawn_point(SAFE_SPAWN_RADIUS, &mut rng).is_none());
    }
}
