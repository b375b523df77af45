use crate::math::Vec3;

/// Half-line `origin + t * direction`, `t >= 0`.
///
/// Rays built with `Ray::new` carry a unit direction, which every
/// intersection routine relies on to report `t` as a Euclidean distance.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
	pub origin: Vec3,
	pub direction: Vec3,
}

impl Ray {
	pub fn new(origin: Vec3, direction: Vec3) -> Ray {
		Ray { origin, direction: direction.normalized() }
	}

	pub fn point_at(&self, t: f32) -> Vec3 {
		self.origin + self.direction * t
	}
}
