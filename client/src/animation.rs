//! Clip playback over Bevy's animation graph.
//!
//! The character GLB carries named clips (idle/walk/run/jump). Once it and
//! the spawned scene's `AnimationPlayer` are available, a graph is built
//! with one node per clip and the controller's [`shared::AnimationDriver`]
//! seam is implemented on top of `AnimationTransitions`. Missing clips are
//! logged and simply never play.

use std::time::Duration;

use bevy::animation::RepeatAnimation;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use shared::{AnimationDriver, AnimationState};

use crate::level::is_descendant_of;
use crate::player::Player;

#[derive(Resource)]
struct CharacterGltf(Handle<Gltf>);

/// Graph node per animation state; `None` where the asset lacks the clip.
#[derive(Clone, Copy, Default)]
pub struct AnimationNodes {
    idle: Option<AnimationNodeIndex>,
    walk: Option<AnimationNodeIndex>,
    run: Option<AnimationNodeIndex>,
    jump: Option<AnimationNodeIndex>,
}

impl AnimationNodes {
    pub fn get(&self, state: AnimationState) -> Option<AnimationNodeIndex> {
        match state {
            AnimationState::Idle => self.idle,
            AnimationState::Walk => self.walk,
            AnimationState::Run => self.run,
            AnimationState::Jump => self.jump,
        }
    }

    fn set(&mut self, state: AnimationState, node: AnimationNodeIndex) {
        match state {
            AnimationState::Idle => self.idle = Some(node),
            AnimationState::Walk => self.walk = Some(node),
            AnimationState::Run => self.run = Some(node),
            AnimationState::Jump => self.jump = Some(node),
        }
    }
}

/// Ties the character entity to the `AnimationPlayer` inside its scene.
#[derive(Component)]
pub struct AnimationLink {
    pub player_entity: Entity,
    pub nodes: AnimationNodes,
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, load_character_gltf);
    app.add_systems(Update, (attach_animation_graph, start_initial_clip));
}

fn load_character_gltf(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(CharacterGltf(asset_server.load("models/character.glb")));
}

/// Build the animation graph once the GLB and the spawned scene's player
/// exist.
fn attach_animation_graph(
    mut commands: Commands,
    gltf_handle: Res<CharacterGltf>,
    gltfs: Res<Assets<Gltf>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    character: Query<Entity, (With<Player>, Without<AnimationLink>)>,
    players: Query<Entity, With<AnimationPlayer>>,
    child_of: Query<&ChildOf>,
) {
    let Ok(character) = character.single() else {
        return;
    };
    let Some(gltf) = gltfs.get(&gltf_handle.0) else {
        return;
    };
    let Some(player_entity) = players
        .iter()
        .find(|&e| is_descendant_of(e, character, &child_of))
    else {
        return;
    };

    let mut graph = AnimationGraph::new();
    let mut nodes = AnimationNodes::default();
    for state in [
        AnimationState::Idle,
        AnimationState::Walk,
        AnimationState::Run,
        AnimationState::Jump,
    ] {
        match gltf.named_animations.get(state.clip_name()) {
            Some(clip) => {
                let node = graph.add_clip(clip.clone(), 1.0, graph.root);
                nodes.set(state, node);
            }
            None => warn!("character asset has no '{}' clip", state.clip_name()),
        }
    }

    let handle = graphs.add(graph);
    commands
        .entity(player_entity)
        .insert((AnimationGraphHandle(handle), AnimationTransitions::new()));
    commands.entity(character).insert(AnimationLink {
        player_entity,
        nodes,
    });
}

/// Kick off the controller's current clip as soon as the link exists.
fn start_initial_clip(
    new_links: Query<(&AnimationLink, &Player), Added<AnimationLink>>,
    mut players: Query<(&mut AnimationPlayer, &mut AnimationTransitions)>,
) {
    for (link, player) in &new_links {
        let Ok((mut anim_player, mut transitions)) = players.get_mut(link.player_entity) else {
            continue;
        };
        let state = player.controller.animation_state();
        if let Some(node) = link.nodes.get(state) {
            transitions
                .play(&mut anim_player, node, Duration::ZERO)
                .set_repeat(if state.plays_once() {
                    RepeatAnimation::Never
                } else {
                    RepeatAnimation::Forever
                });
        }
    }
}

/// The controller-facing driver, borrowing the player for one update.
pub struct ClipDriver<'a> {
    pub player: &'a mut AnimationPlayer,
    pub transitions: &'a mut AnimationTransitions,
    pub nodes: &'a AnimationNodes,
}

impl AnimationDriver for ClipDriver<'_> {
    fn has_clip(&self, state: AnimationState) -> bool {
        self.nodes.get(state).is_some()
    }

    fn fade_out(&mut self, _state: AnimationState, _duration: f32) {
        // `AnimationTransitions::play` fades the previous clip out itself.
    }

    fn fade_in(&mut self, state: AnimationState, duration: f32, once: bool) {
        let Some(node) = self.nodes.get(state) else {
            return;
        };
        self.transitions
            .play(self.player, node, Duration::from_secs_f32(duration))
            .set_repeat(if once {
                RepeatAnimation::Never
            } else {
                RepeatAnimation::Forever
            });
    }
}
