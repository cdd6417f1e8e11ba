//! Animation state selection and the clip-playback seam.
//!
//! The controller decides *which* state should play; actually blending clips
//! is the presentation layer's job, reached through [`AnimationDriver`]. A
//! missing clip is never fatal: the state machine stays where it is and the
//! gap is logged.

use log::warn;

use crate::settings::{AIRBORNE_VELOCITY_THRESHOLD, ANIMATION_FADE_SECS};

/// Locomotion animation states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Walk,
    Run,
    Jump,
}

impl AnimationState {
    /// Clip name in the character asset.
    pub fn clip_name(self) -> &'static str {
        match self {
            AnimationState::Idle => "idle",
            AnimationState::Walk => "walk",
            AnimationState::Run => "run",
            AnimationState::Jump => "jump",
        }
    }

    /// The jump clip plays once and holds its last frame; the rest loop.
    #[inline]
    pub fn plays_once(self) -> bool {
        matches!(self, AnimationState::Jump)
    }

    /// Pick the state for this frame.
    ///
    /// Jump wins whenever the character is airborne or still rising,
    /// regardless of movement keys; otherwise held direction keys select
    /// run/walk by the run toggle, and idle is the rest state.
    pub fn select(
        grounded: bool,
        vertical_velocity: f32,
        direction_pressed: bool,
        run_toggle: bool,
    ) -> Self {
        if !grounded || vertical_velocity > AIRBORNE_VELOCITY_THRESHOLD {
            AnimationState::Jump
        } else if direction_pressed && run_toggle {
            AnimationState::Run
        } else if direction_pressed {
            AnimationState::Walk
        } else {
            AnimationState::Idle
        }
    }
}

/// Clip playback as the controller sees it.
///
/// `fade_in` restarts the clip from the beginning; `once` requests
/// play-once-and-clamp instead of looping.
pub trait AnimationDriver {
    fn has_clip(&self, state: AnimationState) -> bool;
    fn fade_out(&mut self, state: AnimationState, duration: f32);
    fn fade_in(&mut self, state: AnimationState, duration: f32, once: bool);
}

/// Driver for headless use: every clip is present, playback goes nowhere.
pub struct NullAnimations;

impl AnimationDriver for NullAnimations {
    fn has_clip(&self, _state: AnimationState) -> bool {
        true
    }
    fn fade_out(&mut self, _state: AnimationState, _duration: f32) {}
    fn fade_in(&mut self, _state: AnimationState, _duration: f32, _once: bool) {}
}

/// Crossfade from `*current` to `next` if they differ and the target clip
/// exists. On a missing clip the state is left unchanged.
pub(super) fn advance(
    current: &mut AnimationState,
    next: AnimationState,
    driver: &mut dyn AnimationDriver,
) {
    if next == *current {
        return;
    }
    if !driver.has_clip(next) {
        warn!(
            "animation clip '{}' missing; staying in '{}'",
            next.clip_name(),
            current.clip_name()
        );
        return;
    }
    driver.fade_out(*current, ANIMATION_FADE_SECS);
    driver.fade_in(next, ANIMATION_FADE_SECS, next.plays_once());
    *current = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_is_exhaustive_and_deterministic() {
        use AnimationState::*;

        // (grounded, vertical_velocity, direction, run_toggle) -> state
        let cases = [
            (true, 0.0, false, false, Idle),
            (true, 0.0, false, true, Idle),
            (true, 0.0, true, false, Walk),
            (true, 0.0, true, true, Run),
            // Airborne overrides movement keys.
            (false, 0.0, true, true, Jump),
            (false, -3.0, false, false, Jump),
            // Rising fast enough counts as airborne even if still clamped.
            (true, 0.2, true, true, Jump),
            // Slow rise below the threshold does not.
            (true, 0.05, true, true, Run),
        ];

        for (grounded, vv, dir, run, expected) in cases {
            assert_eq!(
                AnimationState::select(grounded, vv, dir, run),
                expected,
                "select({grounded}, {vv}, {dir}, {run})"
            );
        }
    }

    /// Records driver calls so transitions can be asserted.
    struct Recording {
        present: Vec<AnimationState>,
        calls: Vec<(String, AnimationState, bool)>,
    }

    impl AnimationDriver for Recording {
        fn has_clip(&self, state: AnimationState) -> bool {
            self.present.contains(&state)
        }
        fn fade_out(&mut self, state: AnimationState, _duration: f32) {
            self.calls.push(("out".into(), state, false));
        }
        fn fade_in(&mut self, state: AnimationState, _duration: f32, once: bool) {
            self.calls.push(("in".into(), state, once));
        }
    }

    #[test]
    fn transition_fades_out_old_and_in_new() {
        let mut driver = Recording {
            present: vec![AnimationState::Idle, AnimationState::Walk],
            calls: Vec::new(),
        };
        let mut state = AnimationState::Idle;
        advance(&mut state, AnimationState::Walk, &mut driver);

        assert_eq!(state, AnimationState::Walk);
        assert_eq!(driver.calls.len(), 2);
        assert_eq!(driver.calls[0], ("out".into(), AnimationState::Idle, false));
        assert_eq!(driver.calls[1], ("in".into(), AnimationState::Walk, false));
    }

    #[test]
    fn jump_clip_plays_once() {
        let mut driver = Recording {
            present: vec![AnimationState::Idle, AnimationState::Jump],
            calls: Vec::new(),
        };
        let mut state = AnimationState::Idle;
        advance(&mut state, AnimationState::Jump, &mut driver);
        assert_eq!(driver.calls[1], ("in".into(), AnimationState::Jump, true));
    }

    #[test]
    fn missing_clip_keeps_the_previous_state() {
        let mut driver = Recording {
            present: vec![AnimationState::Idle],
            calls: Vec::new(),
        };
        let mut state = AnimationState::Idle;
        advance(&mut state, AnimationState::Run, &mut driver);

        assert_eq!(state, AnimationState::Idle);
        assert!(driver.calls.is_empty());
    }

    #[test]
    fn same_state_is_a_no_op() {
        let mut driver = Recording {
            present: vec![AnimationState::Idle],
            calls: Vec::new(),
        };
        let mut state = AnimationState::Idle;
        advance(&mut state, AnimationState::Idle, &mut driver);
        assert!(driver.calls.is_empty());
    }
}
