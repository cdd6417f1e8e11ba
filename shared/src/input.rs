//! Input snapshots consumed by the character controller.
//!
//! The presentation layer owns the actual event sources (keyboard, mouse,
//! cursor grab) and folds them into these plain snapshots once per frame.
//! The core never touches windowing types, which keeps every update a pure
//! function of (state, input, dt, environment queries).

/// Pressed state of the four movement keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PressedKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl PressedKeys {
    /// No keys held.
    pub const NONE: PressedKeys = PressedKeys {
        forward: false,
        back: false,
        left: false,
        right: false,
    };

    /// True if any direction key is held.
    #[inline]
    pub fn any_direction(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }
}

/// Pointer-lock state and relative motion accumulated this frame.
///
/// `locked` reflects the *confirmed* engagement state; deltas received while
/// unlocked are ignored by the rig, so a silently revoked lock (e.g. the user
/// pressing Escape) can do no harm.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub locked: bool,
    pub delta_x: f32,
    pub delta_y: f32,
}

impl PointerState {
    /// An unlocked pointer with no motion.
    pub const IDLE: PointerState = PointerState {
        locked: false,
        delta_x: 0.0,
        delta_y: 0.0,
    };
}
