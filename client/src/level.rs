//! Fridge level loading.
//!
//! Spawns the fridge scene, waits for its meshes, extracts world-space
//! bounds into the shared environment (which classifies them into blockers,
//! surface zones, shelves, and interactables), then plans and applies
//! decorative placements before marking the environment fully ready.

use bevy::{asset::LoadState, platform::collections::HashMap, prelude::*};
use shared::environment::{DecorPlacement, PRODUCT_CATALOG, placement};
use shared::{Environment, MeshId, MeshRecord};

/// The fridge towers over the tiny character.
const FRIDGE_SCALE: f32 = 10.0;

/// The shared environment, queried by every gameplay system.
#[derive(Resource, Default)]
pub struct LevelEnvironment(pub Environment);

/// Maps core mesh handles back to scene entities (door posing, decor).
#[derive(Resource, Default)]
pub struct MeshEntityMap(pub HashMap<MeshId, Entity>);

#[derive(Resource)]
struct FridgeScene(Handle<Scene>);

#[derive(Component)]
struct FridgeRoot;

/// Decorative product instance awaiting its meshes.
#[derive(Component)]
struct PendingDecor {
    placement: DecorPlacement,
}

/// Decor instances still waiting to register with the environment.
#[derive(Resource, Default)]
struct DecorOutstanding(usize);

/// Mesh extraction needs one extra frame after the scene spawns so global
/// transforms have propagated.
#[derive(Resource, Default, PartialEq, Eq)]
enum ExtractState {
    #[default]
    Waiting,
    Armed,
    Done,
}

/// Ids handed to the environment; decor continues the sequence after the
/// structural meshes.
#[derive(Resource, Default)]
struct MeshIdAlloc(u32);

impl MeshIdAlloc {
    fn next(&mut self) -> MeshId {
        let id = MeshId(self.0);
        self.0 += 1;
        id
    }
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<LevelEnvironment>();
    app.init_resource::<MeshEntityMap>();
    app.init_resource::<ExtractState>();
    app.init_resource::<MeshIdAlloc>();
    app.init_resource::<DecorOutstanding>();
    app.add_systems(Startup, load_level);
    app.add_systems(Update, (extract_structure, settle_decor));
}

fn load_level(mut commands: Commands, asset_server: Res<AssetServer>) {
    let scene: Handle<Scene> = asset_server.load("models/fridge.glb#Scene0");
    commands.spawn((
        SceneRoot(scene.clone()),
        Transform::from_scale(Vec3::splat(FRIDGE_SCALE)),
        FridgeRoot,
    ));
    commands.insert_resource(FridgeScene(scene));

    commands.spawn((
        PointLight {
            color: Color::srgb_u8(0xbf, 0xdc, 0xff),
            intensity: 120_000.0,
            range: 250.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(0.0, 50.0, 0.0),
    ));
}

/// Build the environment from the spawned fridge scene.
fn extract_structure(
    mut env: ResMut<LevelEnvironment>,
    mut state: ResMut<ExtractState>,
    mut mapping: ResMut<MeshEntityMap>,
    mut ids: ResMut<MeshIdAlloc>,
    mut outstanding: ResMut<DecorOutstanding>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    scene: Res<FridgeScene>,
    meshes: Res<Assets<Mesh>>,
    root: Query<Entity, With<FridgeRoot>>,
    child_of: Query<&ChildOf>,
    mesh_q: Query<(Entity, &Mesh3d, &GlobalTransform, Option<&Name>)>,
) {
    if *state == ExtractState::Done {
        return;
    }

    if let Some(LoadState::Failed(_)) = asset_server.get_load_state(scene.0.id()) {
        env.0.load_structure_failed();
        env.0.finish_decor();
        *state = ExtractState::Done;
        return;
    }

    let Ok(root) = root.single() else {
        return;
    };
    let spawned = mesh_q
        .iter()
        .any(|(entity, ..)| is_descendant_of(entity, root, &child_of));
    if !spawned {
        return;
    }
    if *state == ExtractState::Waiting {
        // Transforms propagate at the end of the spawn frame.
        *state = ExtractState::Armed;
        return;
    }

    let mut records = Vec::new();
    for (entity, mesh3d, transform, name) in &mesh_q {
        if !is_descendant_of(entity, root, &child_of) {
            continue;
        }
        let Some(mesh) = meshes.get(&mesh3d.0) else {
            // Mesh assets still streaming in; try again next frame.
            return;
        };
        let Some(aabb) = world_aabb(mesh, transform) else {
            continue;
        };
        let id = ids.next();
        let mut record =
            MeshRecord::new(id, name.map(|n| n.as_str()).unwrap_or_default(), aabb);
        record.yaw = transform.rotation().to_euler(EulerRot::YXZ).0;
        mapping.0.insert(id, entity);
        records.push(record);
    }

    info!("fridge structure: {} meshes", records.len());
    env.0.load_structure(records);

    // Plan decorative placements and spawn their scenes. The environment
    // becomes fully ready once every instance has registered.
    let mut rng = rand::thread_rng();
    let placements = placement::plan_catalog(
        env.0.shelves(),
        env.0.container_size(),
        PRODUCT_CATALOG,
        &mut rng,
    );
    outstanding.0 = placements.len();
    for p in placements {
        let scene: Handle<Scene> = asset_server.load(format!("{}#Scene0", p.file));
        commands.spawn((
            SceneRoot(scene),
            Transform::from_xyz(p.x, p.y, p.z),
            PendingDecor { placement: p },
        ));
    }
    if outstanding.0 == 0 {
        env.0.finish_decor();
    }
    *state = ExtractState::Done;
}

/// Scale each pending decor instance to its planned height, rest its bottom
/// on the shelf, and register its volume with the environment.
fn settle_decor(
    mut env: ResMut<LevelEnvironment>,
    mut mapping: ResMut<MeshEntityMap>,
    mut ids: ResMut<MeshIdAlloc>,
    mut outstanding: ResMut<DecorOutstanding>,
    mut commands: Commands,
    meshes: Res<Assets<Mesh>>,
    mut pending: Query<(Entity, &PendingDecor, &mut Transform)>,
    child_of: Query<&ChildOf>,
    mesh_q: Query<(Entity, &Mesh3d, &GlobalTransform)>,
) {
    for (root, decor, mut transform) in &mut pending {
        let mut union: Option<shared::types::Aabb> = None;
        let mut ready = true;
        for (entity, mesh3d, global) in &mesh_q {
            if !is_descendant_of(entity, root, &child_of) {
                continue;
            }
            let Some(mesh) = meshes.get(&mesh3d.0) else {
                ready = false;
                break;
            };
            if let Some(aabb) = world_aabb(mesh, global) {
                union = Some(match union {
                    Some(u) => shared::types::Aabb::new(
                        u.mins.inf(&aabb.mins),
                        u.maxs.sup(&aabb.maxs),
                    ),
                    None => aabb,
                });
            }
        }
        let (Some(world), true) = (union, ready) else {
            continue;
        };

        // Scale around the root so the model fits the shelf clearance, then
        // shift so its bottom rests at the planned height.
        let height = (world.maxs.y - world.mins.y).max(f32::EPSILON);
        let factor = decor.placement.target_height / height;
        let pivot = transform.translation;
        transform.scale *= factor;
        transform.translation.y = decor.placement.y - factor * (world.mins.y - pivot.y);

        let scaled = shared::types::Aabb::new(
            shared::types::Point3::new(
                pivot.x + factor * (world.mins.x - pivot.x),
                decor.placement.y,
                pivot.z + factor * (world.mins.z - pivot.z),
            ),
            shared::types::Point3::new(
                pivot.x + factor * (world.maxs.x - pivot.x),
                decor.placement.y + decor.placement.target_height,
                pivot.z + factor * (world.maxs.z - pivot.z),
            ),
        );

        let id = ids.next();
        let name = decor
            .placement
            .file
            .rsplit('/')
            .next()
            .and_then(|f| f.split('.').next())
            .unwrap_or_default();
        env.0.register_decor_mesh(&MeshRecord::new(id, name, scaled));
        mapping.0.insert(id, root);
        commands.entity(root).remove::<PendingDecor>();

        outstanding.0 = outstanding.0.saturating_sub(1);
        if outstanding.0 == 0 {
            env.0.finish_decor();
        }
    }
}

/// World-space AABB of a mesh under a global transform, from its vertex
/// positions.
fn world_aabb(mesh: &Mesh, transform: &GlobalTransform) -> Option<shared::types::Aabb> {
    let positions = mesh.attribute(Mesh::ATTRIBUTE_POSITION)?.as_float3()?;
    if positions.is_empty() {
        return None;
    }
    let mut mins = Vec3::splat(f32::INFINITY);
    let mut maxs = Vec3::splat(f32::NEG_INFINITY);
    for p in positions {
        let world = transform.transform_point(Vec3::from_array(*p));
        mins = mins.min(world);
        maxs = maxs.max(world);
    }
    Some(shared::types::Aabb::new(
        shared::types::Point3::new(mins.x, mins.y, mins.z),
        shared::types::Point3::new(maxs.x, maxs.y, maxs.z),
    ))
}

/// Walk the hierarchy upward looking for `root`.
pub(crate) fn is_descendant_of(mut entity: Entity, root: Entity, child_of: &Query<&ChildOf>) -> bool {
    while let Ok(parent) = child_of.get(entity) {
        let parent = parent.parent();
        if parent == root {
            return true;
        }
        entity = parent;
    }
    false
}
