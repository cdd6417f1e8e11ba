/*!
Core math aliases and plain data types shared by the environment and
character modules.

This module intentionally contains no algorithms. It defines the data
exchanged between:
- the presentation layer (mesh records extracted from the loaded scene)
- the environment (spatial classification and queries)
- the character controller (ground and surface results)
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

pub use parry3d::bounding_volume::Aabb;

/// Opaque handle for a mesh in the loaded scene.
///
/// The presentation layer assigns these when extracting [`MeshRecord`]s and
/// uses them to map classified volumes (the door, decor) back to its own
/// scene entities. The core never dereferences one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// Everything the core sees of one loaded scene mesh.
#[derive(Clone, Debug)]
pub struct MeshRecord {
    pub id: MeshId,
    /// Node name from the source asset; classification keys off it once at load.
    pub name: String,
    /// World-space bounds, with the environment's scale already applied.
    pub aabb: Aabb,
    /// World yaw of the source node. Only the door cares (its closed rotation).
    pub yaw: f32,
}

impl MeshRecord {
    pub fn new(id: MeshId, name: impl Into<String>, aabb: Aabb) -> Self {
        Self {
            id,
            name: name.into(),
            aabb,
            yaw: 0.0,
        }
    }
}

/// Surface-effect tag carried by a zone volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    Slippery,
    Sticky,
}

impl SurfaceKind {
    /// Multiplier applied to the character's base speed while on this surface.
    #[inline]
    pub fn speed_factor(self) -> f32 {
        match self {
            SurfaceKind::Slippery => crate::settings::SLIPPERY_SPEED_FACTOR,
            SurfaceKind::Sticky => crate::settings::STICKY_SPEED_FACTOR,
        }
    }
}

/// Result of a downward ground query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundInfo {
    /// World height of the supporting surface (0.0 when nothing was hit).
    pub height: f32,
    /// Surface tag at the hit point, if the hit lies inside an effect zone.
    pub surface: Option<SurfaceKind>,
}

impl GroundInfo {
    /// The answer when the environment is not loaded or no surface is below.
    pub const FLOOR: GroundInfo = GroundInfo {
        height: 0.0,
        surface: None,
    };
}
