/*!
The character controller: input-driven locomotion, animation-state
selection, gravity and jump integration, and the camera rig.

Each `update` is a pure function of (state, input snapshot, dt, environment
queries). The controller owns the player transform exclusively; the
presentation layer mirrors it onto render entities after the update.
*/

mod animation;
mod camera;

pub use animation::{AnimationDriver, AnimationState, NullAnimations};
pub use camera::{CameraMode, CameraMount, CameraRig, OrbitPose};

use log::warn;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::environment::Environment;
use crate::input::{PointerState, PressedKeys};
use crate::settings::{
    ANIMATION_FADE_SECS, DIST_EPS, FACING_TURN_STEP, GRAVITY_MPS2, GROUND_MAX_DISTANCE,
    JUMP_SPEED_MPS, PLAYER_RADIUS, RUN_SPEED_MPS, WALK_SPEED_MPS,
};
use crate::types::{Point3, Quat, Vec3};

/// Angle offset a WASD combination adds to the camera-relative walk
/// direction. Eight directions: straight, and the 45/135 degree diagonals.
pub fn direction_offset(keys: &PressedKeys) -> f32 {
    if keys.forward {
        if keys.left {
            FRAC_PI_4
        } else if keys.right {
            -FRAC_PI_4
        } else {
            0.0
        }
    } else if keys.back {
        if keys.left {
            FRAC_PI_4 + FRAC_PI_2
        } else if keys.right {
            -FRAC_PI_4 - FRAC_PI_2
        } else {
            PI
        }
    } else if keys.left {
        FRAC_PI_2
    } else if keys.right {
        -FRAC_PI_2
    } else {
        0.0
    }
}

pub struct CharacterController {
    position: Point3,
    facing: Quat,
    vertical_velocity: f32,
    grounded: bool,
    state: AnimationState,
    run_toggle: bool,
    rig: CameraRig,
}

impl CharacterController {
    /// Spawn a character at `position` with the given camera rig.
    ///
    /// The idle clip is faded in immediately when the driver has it.
    pub fn new(position: Point3, rig: CameraRig, driver: &mut dyn AnimationDriver) -> Self {
        let state = AnimationState::Idle;
        if driver.has_clip(state) {
            driver.fade_in(state, ANIMATION_FADE_SECS, false);
        } else {
            warn!("initial animation clip '{}' missing", state.clip_name());
        }
        Self {
            position,
            facing: Quat::identity(),
            vertical_velocity: 0.0,
            grounded: false,
            state,
            run_toggle: true,
            rig,
        }
    }

    /// Advance one frame.
    ///
    /// Order matters: pointer look first, then animation-state selection
    /// from the previous frame's grounded/velocity, then horizontal movement
    /// (collision-resolved), then vertical integration with the ground
    /// clamp, and finally the camera follow.
    pub fn update(
        &mut self,
        dt: f32,
        keys: &PressedKeys,
        pointer: &PointerState,
        env: Option<&Environment>,
        driver: &mut dyn AnimationDriver,
    ) {
        let dt = dt.max(0.0);

        self.rig.apply_pointer(pointer);

        let next = AnimationState::select(
            self.grounded,
            self.vertical_velocity,
            keys.any_direction(),
            self.run_toggle,
        );
        animation::advance(&mut self.state, next, driver);

        // Horizontal movement.
        let start = self.position;
        if keys.any_direction() && dt > 0.0 {
            let dir = match self.rig.mode() {
                CameraMode::Third => self.third_person_direction(keys),
                CameraMode::First => self.first_person_direction(keys),
            };

            if dir.norm_squared() > DIST_EPS {
                let base = if self.run_toggle {
                    RUN_SPEED_MPS
                } else {
                    WALK_SPEED_MPS
                };
                let surface = env
                    .map(|e| e.ground_info(self.position, GROUND_MAX_DISTANCE))
                    .and_then(|info| info.surface);
                let factor = surface.map(|s| s.speed_factor()).unwrap_or(1.0);

                let step = dir * (base * factor * dt);
                let desired =
                    Point3::new(start.x + step.x, start.y, start.z + step.z);
                let resolved = match env {
                    Some(e) => e.resolve_collision(start, desired, PLAYER_RADIUS),
                    None => desired,
                };
                self.position.x = resolved.x;
                self.position.z = resolved.z;
            }
        }

        // Vertical integration and ground clamp. Grounded is recomputed
        // every frame, never carried stale.
        self.vertical_velocity -= GRAVITY_MPS2 * dt;
        self.position.y += self.vertical_velocity * dt;

        let ground_height = env
            .map(|e| e.ground_info(self.position, GROUND_MAX_DISTANCE).height)
            .unwrap_or(0.0);
        if self.position.y <= ground_height {
            self.position.y = ground_height;
            self.vertical_velocity = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }

        // Camera follow.
        match self.rig.mode() {
            CameraMode::Third => {
                self.rig.follow_third(
                    self.position.x - start.x,
                    self.position.z - start.z,
                    self.position,
                );
            }
            CameraMode::First => self.rig.follow_first(self.position),
        }
    }

    /// Third-person walk direction; also turns the model toward
    /// `camera_yaw + offset + PI`. The extra half turn is an art-asset
    /// convention: the model's visual front is opposite its walk direction.
    fn third_person_direction(&mut self, keys: &PressedKeys) -> Vec3 {
        let camera_yaw = self.rig.yaw_toward(self.position);
        let offset = direction_offset(keys);

        let target = Quat::from_axis_angle(&Vec3::y_axis(), camera_yaw + offset + PI);
        self.facing = rotate_towards(self.facing, target, FACING_TURN_STEP);

        let orbit = self.rig.orbit_pose();
        let mut forward = orbit.target - orbit.position;
        forward.y = 0.0;
        let forward = if forward.norm_squared() > DIST_EPS {
            forward.normalize()
        } else {
            -Vec3::z()
        };
        Quat::from_axis_angle(&Vec3::y_axis(), offset) * forward
    }

    /// First-person walk direction from the flattened look basis.
    fn first_person_direction(&self, keys: &PressedKeys) -> Vec3 {
        let mut forward = self.rig.look_direction();
        forward.y = 0.0;
        let forward = if forward.norm_squared() > DIST_EPS {
            forward.normalize()
        } else {
            -Vec3::z()
        };
        let right = forward.cross(&Vec3::y());

        let mut dir = Vec3::zeros();
        if keys.forward {
            dir += forward;
        }
        if keys.back {
            dir -= forward;
        }
        if keys.right {
            dir += right;
        }
        if keys.left {
            dir -= right;
        }
        if dir.norm_squared() > DIST_EPS {
            dir.normalize()
        } else {
            Vec3::zeros()
        }
    }

    /// Jump if standing on ground; a no-op while airborne.
    pub fn jump(&mut self) {
        if self.grounded {
            self.vertical_velocity = JUMP_SPEED_MPS;
            self.grounded = false;
        }
    }

    /// Flip the run toggle (sprint on by default).
    pub fn toggle_run(&mut self) {
        self.run_toggle = !self.run_toggle;
    }

    /// Switch between third- and first-person camera. Returns the new mode.
    pub fn toggle_camera_mode(&mut self) -> CameraMode {
        let yaw = yaw_of(&self.facing);
        self.rig.toggle(self.position, yaw)
    }

    /// Reset to a spawn position. Facing is kept; velocity is cleared and
    /// grounded-ness is recomputed on the next update.
    pub fn respawn(&mut self, at: Point3) {
        self.position = at;
        self.vertical_velocity = 0.0;
        self.grounded = false;
    }

    #[inline]
    pub fn position(&self) -> Point3 {
        self.position
    }

    #[inline]
    pub fn facing(&self) -> Quat {
        self.facing
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    #[inline]
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    #[inline]
    pub fn animation_state(&self) -> AnimationState {
        self.state
    }

    #[inline]
    pub fn run_enabled(&self) -> bool {
        self.run_toggle
    }

    #[inline]
    pub fn camera_mode(&self) -> CameraMode {
        self.rig.mode()
    }

    #[inline]
    pub fn camera_mount(&self) -> CameraMount {
        self.rig.mount()
    }

    /// Whether the presentation layer should hold pointer lock right now.
    #[inline]
    pub fn wants_pointer_lock(&self) -> bool {
        self.rig.wants_pointer_lock()
    }
}

/// Rotate `from` toward `to` by at most `max_angle` radians.
fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_to(&to);
    if angle <= max_angle {
        return to;
    }
    from.try_slerp(&to, max_angle / angle, 1.0e-9).unwrap_or(to)
}

/// Yaw of a facing quaternion (rotation of -Z around +Y).
fn yaw_of(q: &Quat) -> f32 {
    let f = q * Vec3::new(0.0, 0.0, -1.0);
    (-f.x).atan2(-f.z)
}
