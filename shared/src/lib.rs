pub mod character;
pub mod environment;
pub mod input;
pub mod settings;
pub mod types;

pub use character::{
    AnimationDriver, AnimationState, CameraMode, CameraMount, CharacterController, NullAnimations,
    direction_offset,
};
pub use environment::Environment;
pub use input::{PointerState, PressedKeys};
pub use types::{GroundInfo, MeshId, MeshRecord, SurfaceKind};
