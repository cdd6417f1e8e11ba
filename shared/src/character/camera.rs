//! Camera rig: third-person orbit vs. first-person yaw/pitch.
//!
//! The rig never touches the scene graph. It exposes the active pose as a
//! tagged [`CameraMount`] and the render layer writes whichever variant is
//! current onto the real camera. Mode switches snapshot and restore the
//! orbit pose, so toggling twice with no movement in between is a perfect
//! round trip.

use crate::input::PointerState;
use crate::settings::{
    CAMERA_TARGET_HEIGHT, EYE_HEIGHT, MOUSE_SENSITIVITY, ORBIT_MAX_DISTANCE, ORBIT_MIN_DISTANCE,
    PITCH_LIMIT_MARGIN, THIRD_PERSON_DISTANCE, THIRD_PERSON_HEIGHT,
};
use crate::types::{Point3, Vec3};

use std::f32::consts::FRAC_PI_2;

/// Which rig drives the render camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    Third,
    First,
}

/// Third-person orbit pose: where the camera sits and what it aims at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitPose {
    pub position: Point3,
    pub target: Point3,
    pub min_distance: f32,
    pub max_distance: f32,
}

/// The active camera pose, read by the render layer every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraMount {
    Orbit {
        position: Point3,
        target: Point3,
        min_distance: f32,
        max_distance: f32,
    },
    FirstPerson {
        eye: Point3,
        yaw: f32,
        pitch: f32,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct CameraRig {
    mode: CameraMode,
    orbit: OrbitPose,
    saved_orbit: Option<OrbitPose>,
    eye: Point3,
    yaw: f32,
    pitch: f32,
}

impl CameraRig {
    /// Start in third person at the given pose.
    pub fn third_person(position: Point3, target: Point3) -> Self {
        Self {
            mode: CameraMode::Third,
            orbit: OrbitPose {
                position,
                target,
                min_distance: ORBIT_MIN_DISTANCE,
                max_distance: ORBIT_MAX_DISTANCE,
            },
            saved_orbit: None,
            eye: target,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    #[inline]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// The pose the render layer should apply this frame.
    pub fn mount(&self) -> CameraMount {
        match self.mode {
            CameraMode::Third => CameraMount::Orbit {
                position: self.orbit.position,
                target: self.orbit.target,
                min_distance: self.orbit.min_distance,
                max_distance: self.orbit.max_distance,
            },
            CameraMode::First => CameraMount::FirstPerson {
                eye: self.eye,
                yaw: self.yaw,
                pitch: self.pitch,
            },
        }
    }

    /// Switch between third and first person.
    ///
    /// Entering first person snapshots the orbit pose and aims the look rig
    /// along the character's current facing with level pitch. Leaving
    /// restores the snapshot when one exists, otherwise recomputes a
    /// third-person pose behind the character's facing.
    pub fn toggle(&mut self, feet: Point3, facing_yaw: f32) -> CameraMode {
        match self.mode {
            CameraMode::Third => {
                self.saved_orbit = Some(self.orbit);
                self.eye = Point3::new(feet.x, feet.y + EYE_HEIGHT, feet.z);
                self.yaw = facing_yaw;
                self.pitch = 0.0;
                self.mode = CameraMode::First;
            }
            CameraMode::First => {
                self.orbit = self.saved_orbit.take().unwrap_or_else(|| {
                    let forward = yaw_forward(facing_yaw);
                    OrbitPose {
                        position: Point3::new(
                            feet.x - forward.x * THIRD_PERSON_DISTANCE,
                            feet.y + THIRD_PERSON_HEIGHT,
                            feet.z - forward.z * THIRD_PERSON_DISTANCE,
                        ),
                        target: Point3::new(feet.x, feet.y + CAMERA_TARGET_HEIGHT, feet.z),
                        min_distance: ORBIT_MIN_DISTANCE,
                        max_distance: ORBIT_MAX_DISTANCE,
                    }
                });
                self.mode = CameraMode::Third;
            }
        }
        self.mode
    }

    /// Apply this frame's pointer deltas to the first-person look.
    /// Ignored outside first person or while the lock is not engaged.
    pub fn apply_pointer(&mut self, pointer: &PointerState) {
        if self.mode != CameraMode::First || !pointer.locked {
            return;
        }
        self.yaw -= pointer.delta_x * MOUSE_SENSITIVITY;
        self.pitch = (self.pitch - pointer.delta_y * MOUSE_SENSITIVITY).clamp(
            -FRAC_PI_2 + PITCH_LIMIT_MARGIN,
            FRAC_PI_2 - PITCH_LIMIT_MARGIN,
        );
    }

    /// Third-person follow: shift the camera by the character's horizontal
    /// delta, then re-aim the orbit target at chest height.
    pub fn follow_third(&mut self, moved_x: f32, moved_z: f32, feet: Point3) {
        self.orbit.position.x += moved_x;
        self.orbit.position.z += moved_z;
        self.orbit.target = Point3::new(feet.x, feet.y + CAMERA_TARGET_HEIGHT, feet.z);
    }

    /// First-person follow: pin the eye to the character's head. Rotation is
    /// pointer-driven only.
    pub fn follow_first(&mut self, feet: Point3) {
        self.eye = Point3::new(feet.x, feet.y + EYE_HEIGHT, feet.z);
    }

    /// Yaw of the camera-to-character direction, used as the base angle for
    /// third-person locomotion.
    pub fn yaw_toward(&self, feet: Point3) -> f32 {
        (feet.x - self.orbit.position.x).atan2(feet.z - self.orbit.position.z)
    }

    /// The live third-person pose (also valid, though dormant, in first
    /// person: it is what a snapshot-less exit would rebuild from).
    #[inline]
    pub fn orbit_pose(&self) -> &OrbitPose {
        &self.orbit
    }

    /// First-person look direction including pitch.
    pub fn look_direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    /// Whether the presentation layer should hold pointer lock.
    #[inline]
    pub fn wants_pointer_lock(&self) -> bool {
        self.mode == CameraMode::First
    }
}

/// Unit forward vector for a yaw angle (yaw 0 faces -Z).
#[inline]
pub(super) fn yaw_forward(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}
