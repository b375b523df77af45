pub mod vec3;
pub mod quat;
pub mod mat4;
pub mod ray;
pub mod aabb;

pub use self::vec3::Vec3;
pub use self::quat::Quat;
pub use self::mat4::Mat4;
pub use self::ray::Ray;
pub use self::aabb::AABB;
pub use std::f32::{INFINITY, NEG_INFINITY, NAN};
pub use std::f32::consts::*;

/// Surface offset and minimum hit distance used to avoid self-intersections
pub const EPSILON: f32 = 1e-5;
pub const INV_PI: f32 = FRAC_1_PI;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis { X, Y, Z }

impl Axis {
	pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}
