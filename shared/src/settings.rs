/*!
Character controller and environment tunables.

These constants centralize the parameters used by locomotion, collision
resolution, ground snapping, spawn placement, and the camera rig. Keeping
them together makes tuning easier and keeps per-frame behavior deterministic.

Notes
- Distances are in meters (at fridge scale), time in seconds, angles in radians.
- Favor practical world-space tolerances over machine epsilon.
*/

use std::f32::consts::FRAC_PI_2;

/// Walking speed in meters per second.
pub const WALK_SPEED_MPS: f32 = 2.0;

/// Running speed in meters per second (run toggle engaged).
pub const RUN_SPEED_MPS: f32 = 5.0;

/// Gravity magnitude in meters per second squared (positive value,
/// integrated as a downward acceleration).
pub const GRAVITY_MPS2: f32 = 25.0;

/// Upward velocity applied by a grounded jump (meters per second).
pub const JUMP_SPEED_MPS: f32 = 8.0;

/// Vertical velocity above which the controller is considered airborne for
/// animation-state selection, even if the ground clamp has not released yet.
pub const AIRBORNE_VELOCITY_THRESHOLD: f32 = 0.1;

/// Crossfade duration between animation clips (seconds).
pub const ANIMATION_FADE_SECS: f32 = 0.2;

/// Maximum facing rotation per update toward the camera-relative walk
/// direction (radians). Fixed per update, not time-scaled.
pub const FACING_TURN_STEP: f32 = 0.2;

/// Speed multiplier while standing on a slippery surface (ice, butter).
pub const SLIPPERY_SPEED_FACTOR: f32 = 1.15;

/// Speed multiplier while standing on a sticky surface (jam, honey).
pub const STICKY_SPEED_FACTOR: f32 = 0.5;

/// Horizontal collision radius of the character (meters).
pub const PLAYER_RADIUS: f32 = 0.25;

/// Vertical slack when testing a move against a blocking volume (meters).
/// Fixed, not derived from character height.
pub const BLOCKER_VERTICAL_TOLERANCE: f32 = 1.0;

/// Tighter vertical slack used by safe-spawn rejection sampling (meters).
pub const SPAWN_VERTICAL_TOLERANCE: f32 = 0.5;

/// Height above the query point from which the downward ground ray starts.
pub const GROUND_RAY_LIFT: f32 = 2.0;

/// Default search distance for ground below the character (meters).
pub const GROUND_MAX_DISTANCE: f32 = 6.0;

/// Rate at which the exit door swings open, in fraction of the full swing
/// per second.
pub const DOOR_OPEN_RATE: f32 = 0.6;

/// Full door swing angle (radians).
pub const DOOR_OPEN_ANGLE: f32 = FRAC_PI_2;

/// Fraction of a shelf's width/depth kept clear at its edges.
pub const SHELF_MARGIN_FRACTION: f32 = 0.06;

/// Minimum absolute shelf edge margin (meters).
pub const SHELF_MARGIN_MIN: f32 = 0.01;

/// A mesh is shelf-like if its height is at most this fraction of the
/// container height (with [`SHELF_THICKNESS_MIN`] as an absolute floor) ...
pub const SHELF_THIN_FRACTION: f32 = 0.06;

/// ... at least this tall in absolute terms still counts as thin.
pub const SHELF_THICKNESS_MIN: f32 = 0.02;

/// ... and it spans at least this fraction of the container width ...
pub const SHELF_WIDTH_FRACTION: f32 = 0.35;

/// ... and this fraction of the container depth.
pub const SHELF_DEPTH_FRACTION: f32 = 0.15;

/// Collision radius used when validating spawn candidates (meters).
pub const SAFE_SPAWN_RADIUS: f32 = 0.12;

/// Random spawn candidates tried before falling back to the shelf center.
pub const SAFE_SPAWN_TRIES: u32 = 80;

/// Height above the character's feet at which the orbit camera aims
/// (chest height, meters).
pub const CAMERA_TARGET_HEIGHT: f32 = 1.0;

/// First-person eye height above the character's feet (meters).
pub const EYE_HEIGHT: f32 = 1.55;

/// Default camera distance behind the character when a third-person pose
/// must be recomputed instead of restored.
pub const THIRD_PERSON_DISTANCE: f32 = 5.0;

/// Camera height above the character for the recomputed third-person pose.
pub const THIRD_PERSON_HEIGHT: f32 = 2.5;

/// Orbit camera distance limits (restored when leaving first person).
pub const ORBIT_MIN_DISTANCE: f32 = 2.0;
pub const ORBIT_MAX_DISTANCE: f32 = 15.0;

/// First-person look sensitivity (radians per pointer-delta unit).
pub const MOUSE_SENSITIVITY: f32 = 0.002;

/// Pitch is clamped this far short of straight up/down (radians).
pub const PITCH_LIMIT_MARGIN: f32 = 0.05;

/// Practical small distance for world-space comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-6;
