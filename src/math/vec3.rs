use std::ops::{Add, AddAssign, Sub, SubAssign, Mul, MulAssign, Div, Neg, Index, IndexMut};
use crate::math::Axis;

/// 3-component vector, also used for points and RGB radiance
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct Vec3 {
	pub x: f32,
	pub y: f32,
	pub z: f32,
}

impl Vec3 {
	#[inline(always)]
	pub const fn new(x: f32, y: f32, z: f32) -> Vec3 {
		Vec3 { x, y, z }
	}

	#[inline(always)]
	pub const fn zero() -> Vec3 {
		Vec3 { x: 0.0, y: 0.0, z: 0.0 }
	}

	#[inline(always)]
	pub const fn thrice(v: f32) -> Vec3 {
		Vec3 { x: v, y: v, z: v }
	}

	#[inline(always)]
	pub fn dot(lhs: Vec3, rhs: Vec3) -> f32 {
		lhs.x * rhs.x + lhs.y * rhs.y + lhs.z * rhs.z
	}

	#[inline(always)]
	pub fn cross(lhs: Vec3, rhs: Vec3) -> Vec3 {
		Vec3 {
			x: lhs.y * rhs.z - lhs.z * rhs.y,
			y: lhs.z * rhs.x - lhs.x * rhs.z,
			z: lhs.x * rhs.y - lhs.y * rhs.x,
		}
	}

	#[inline(always)]
	pub fn length_squared(self) -> f32 {
		Vec3::dot(self, self)
	}

	#[inline(always)]
	pub fn length(self) -> f32 {
		self.length_squared().sqrt()
	}

	/// May return non-finite components for a zero-length vector; callers
	/// sampling directions check `all_finite` before using the result.
	#[inline(always)]
	pub fn normalized(self) -> Vec3 {
		self / self.length()
	}

	#[inline(always)]
	pub fn min(lhs: Vec3, rhs: Vec3) -> Vec3 {
		Vec3::zip(lhs, rhs, f32::min)
	}

	#[inline(always)]
	pub fn max(lhs: Vec3, rhs: Vec3) -> Vec3 {
		Vec3::zip(lhs, rhs, f32::max)
	}

	#[inline(always)]
	pub fn abs(self) -> Vec3 {
		self.map(f32::abs)
	}

	#[inline(always)]
	pub fn max_elem(self) -> f32 {
		self.x.max(self.y).max(self.z)
	}

	#[inline(always)]
	pub fn min_elem(self) -> f32 {
		self.x.min(self.y).min(self.z)
	}

	#[inline(always)]
	pub fn has_nan(self) -> bool {
		self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
	}

	#[inline(always)]
	pub fn all_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
	}

	/// True if any component is strictly positive
	#[inline(always)]
	pub fn any_positive(self) -> bool {
		self.x > 0.0 || self.y > 0.0 || self.z > 0.0
	}

	#[inline(always)]
	pub fn map<F>(self, f: F) -> Vec3
		where F: Fn(f32) -> f32
	{
		Vec3 { x: f(self.x), y: f(self.y), z: f(self.z) }
	}

	#[inline(always)]
	pub fn zip<F>(lhs: Vec3, rhs: Vec3, f: F) -> Vec3
		where F: Fn(f32, f32) -> f32
	{
		Vec3 { x: f(lhs.x, rhs.x), y: f(lhs.y, rhs.y), z: f(lhs.z, rhs.z) }
	}
}

// component-wise binary operators, with a scalar right-hand side variant
macro_rules! impl_binop {
	($trait:ident, $method:ident, $op:tt) => {
		impl $trait for Vec3 {
			type Output = Vec3;
			#[inline(always)]
			fn $method(self, rhs: Vec3) -> Vec3 {
				Vec3 { x: self.x $op rhs.x, y: self.y $op rhs.y, z: self.z $op rhs.z }
			}
		}

		impl $trait<f32> for Vec3 {
			type Output = Vec3;
			#[inline(always)]
			fn $method(self, rhs: f32) -> Vec3 {
				Vec3 { x: self.x $op rhs, y: self.y $op rhs, z: self.z $op rhs }
			}
		}

		impl $trait<Vec3> for f32 {
			type Output = Vec3;
			#[inline(always)]
			fn $method(self, rhs: Vec3) -> Vec3 {
				Vec3 { x: self $op rhs.x, y: self $op rhs.y, z: self $op rhs.z }
			}
		}
	};
}

impl_binop!(Add, add, +);
impl_binop!(Sub, sub, -);
impl_binop!(Mul, mul, *);
impl_binop!(Div, div, /);

impl AddAssign for Vec3 {
	#[inline(always)]
	fn add_assign(&mut self, rhs: Vec3) {
		*self = *self + rhs;
	}
}

impl SubAssign for Vec3 {
	#[inline(always)]
	fn sub_assign(&mut self, rhs: Vec3) {
		*self = *self - rhs;
	}
}

impl MulAssign for Vec3 {
	#[inline(always)]
	fn mul_assign(&mut self, rhs: Vec3) {
		*self = *self * rhs;
	}
}

impl MulAssign<f32> for Vec3 {
	#[inline(always)]
	fn mul_assign(&mut self, rhs: f32) {
		*self = *self * rhs;
	}
}

impl Neg for Vec3 {
	type Output = Vec3;
	#[inline(always)]
	fn neg(self) -> Vec3 {
		Vec3 { x: -self.x, y: -self.y, z: -self.z }
	}
}

impl Index<Axis> for Vec3 {
	type Output = f32;
	#[inline(always)]
	fn index(&self, index: Axis) -> &f32 {
		match index {
			Axis::X => &self.x,
			Axis::Y => &self.y,
			Axis::Z => &self.z,
		}
	}
}

impl IndexMut<Axis> for Vec3 {
	#[inline(always)]
	fn index_mut(&mut self, index: Axis) -> &mut f32 {
		match index {
			Axis::X => &mut self.x,
			Axis::Y => &mut self.y,
			Axis::Z => &mut self.z,
		}
	}
}

impl From<[f32; 3]> for Vec3 {
	fn from([x, y, z]: [f32; 3]) -> Vec3 {
		Vec3 { x, y, z }
	}
}
