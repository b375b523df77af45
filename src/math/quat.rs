use std::ops::Mul;
use crate::math::Vec3;

/// Rotation quaternion `w + xi + yj + zk`
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Quat {
	pub x: f32,
	pub y: f32,
	pub z: f32,
	pub w: f32,
}

impl Quat {
	pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Quat {
		Quat { x, y, z, w }
	}

	pub const fn identity() -> Quat {
		Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
	}

	/// Rotation of `angle` radians around `axis`
	pub fn from_axis_angle(axis: Vec3, angle: f32) -> Quat {
		let (s, c) = (angle * 0.5).sin_cos();
		let a = axis.normalized() * s;
		Quat { x: a.x, y: a.y, z: a.z, w: c }
	}

	#[inline(always)]
	pub fn vector(self) -> Vec3 {
		Vec3::new(self.x, self.y, self.z)
	}

	#[inline(always)]
	pub fn conjugate(self) -> Quat {
		Quat { x: -self.x, y: -self.y, z: -self.z, w: self.w }
	}

	pub fn length(self) -> f32 {
		(self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
	}

	/// Normalize, falling back to the identity for a zero quaternion
	pub fn normalized(self) -> Quat {
		let l = self.length();
		if l > 0.0 && l.is_finite() {
			Quat { x: self.x / l, y: self.y / l, z: self.z / l, w: self.w / l }
		} else {
			Quat::identity()
		}
	}

	/// Computes `conjugate(q)·(0,v)·q`.
	///
	/// For a primitive with orientation `q`, `rotate(v, q)` maps a world
	/// vector into the primitive's local frame and `rotate(v, q.conjugate())`
	/// maps it back.
	#[inline]
	pub fn rotate(v: Vec3, q: Quat) -> Vec3 {
		let p = Quat { x: v.x, y: v.y, z: v.z, w: 0.0 };
		(q.conjugate() * p * q).vector()
	}
}

impl Default for Quat {
	fn default() -> Quat {
		Quat::identity()
	}
}

/// Hamilton product
impl Mul for Quat {
	type Output = Quat;
	#[inline(always)]
	fn mul(self, rhs: Quat) -> Quat {
		let (a, b) = (self.vector(), rhs.vector());
		let v = b * self.w + a * rhs.w + Vec3::cross(a, b);
		Quat {
			x: v.x,
			y: v.y,
			z: v.z,
			w: self.w * rhs.w - Vec3::dot(a, b),
		}
	}
}
