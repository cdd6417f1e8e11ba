//! Conversions between the core's nalgebra types and Bevy's render math.

use bevy::prelude::{Quat, Vec3};

pub fn render_point(p: shared::types::Point3) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

pub fn render_quat(q: shared::types::Quat) -> Quat {
    let c = q.coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}
