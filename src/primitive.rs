use crate::math::*;
use crate::material::Material;

/// Shape-specific payload, expressed in the primitive's local frame
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
	Ellipsoid { radii: Vec3 },
	/// Infinite plane through the local origin
	Plane { normal: Vec3 },
	/// Box centered on the local origin
	Box { half_size: Vec3 },
	/// Vertices are already in world space; position and rotation stay identity
	Triangle { vertices: [Vec3; 3] },
}

/// A renderable solid or surface placed in the world by a rigid transform
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Primitive {
	pub shape: Shape,
	pub position: Vec3,
	/// Unit quaternion; world to local is `Quat::rotate(v, rotation)`
	pub rotation: Quat,
	pub material: Material,
	pub color: Vec3,
	pub emission: Vec3,
}

impl Primitive {
	pub fn new(shape: Shape) -> Primitive {
		if let Shape::Ellipsoid { radii: s } | Shape::Box { half_size: s } = shape {
			debug_assert!(s.min_elem() > 0.0, "non-positive extent {:?}", s);
		}
		let shape = match shape {
			Shape::Plane { normal } => Shape::Plane { normal: normal.normalized() },
			s => s,
		};
		Primitive {
			shape,
			position: Vec3::zero(),
			rotation: Quat::identity(),
			material: Material::Diffuse,
			color: Vec3::thrice(1.0),
			emission: Vec3::zero(),
		}
	}

	pub fn ellipsoid(radii: Vec3) -> Primitive {
		Primitive::new(Shape::Ellipsoid { radii })
	}

	pub fn plane(normal: Vec3) -> Primitive {
		Primitive::new(Shape::Plane { normal })
	}

	pub fn cuboid(half_size: Vec3) -> Primitive {
		Primitive::new(Shape::Box { half_size })
	}

	pub fn triangle(a: Vec3, b: Vec3, c: Vec3) -> Primitive {
		Primitive::new(Shape::Triangle { vertices: [a, b, c] })
	}

	pub fn with_position(mut self, position: Vec3) -> Primitive {
		self.position = position;
		self
	}

	pub fn with_rotation(mut self, rotation: Quat) -> Primitive {
		self.rotation = rotation.normalized();
		self
	}

	pub fn with_material(mut self, material: Material) -> Primitive {
		self.material = material;
		self
	}

	pub fn with_color(mut self, color: Vec3) -> Primitive {
		self.color = color;
		self
	}

	pub fn with_emission(mut self, emission: Vec3) -> Primitive {
		self.emission = emission;
		self
	}

	pub fn is_emissive(&self) -> bool {
		self.emission.any_positive()
	}

	pub fn is_plane(&self) -> bool {
		match self.shape {
			Shape::Plane { .. } => true,
			_ => false,
		}
	}

	pub fn is_triangle(&self) -> bool {
		match self.shape {
			Shape::Triangle { .. } => true,
			_ => false,
		}
	}

	#[inline]
	pub fn to_local(&self, p: Vec3) -> Vec3 {
		Quat::rotate(p - self.position, self.rotation)
	}

	#[inline]
	pub fn to_world(&self, p: Vec3) -> Vec3 {
		Quat::rotate(p, self.rotation.conjugate()) + self.position
	}

	/// World-space bounds: the local extents' 8 corners moved to world space.
	///
	/// Panics for planes, which are unbounded and never put in a BVH.
	pub fn aabb(&self) -> AABB {
		let local = match self.shape {
			Shape::Ellipsoid { radii: s } | Shape::Box { half_size: s } => AABB { min: -s, max: s },
			Shape::Triangle { vertices } => {
				// triangles are stored in world space
				let mut aabb = AABB::empty();
				for &v in &vertices {
					aabb.extend_point(v);
				}
				return aabb;
			}
			Shape::Plane { .. } => panic!("planes are unbounded and have no AABB"),
		};
		let mut aabb = AABB::empty();
		for &c in &local.corners() {
			aabb.extend_point(self.to_world(c));
		}
		aabb
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn aabb_of_rotated_box_covers_corners() {
		let q = Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), FRAC_PI_4);
		let b = Primitive::cuboid(Vec3::new(1.0, 1.0, 1.0))
			.with_position(Vec3::new(0.0, 5.0, 0.0))
			.with_rotation(q);
		let aabb = b.aabb();
		let r = 2f32.sqrt();
		assert!((aabb.max.x - r).abs() < 1e-4 && (aabb.min.z + r).abs() < 1e-4);
		assert!((aabb.min.y - 4.0).abs() < 1e-5 && (aabb.max.y - 6.0).abs() < 1e-5);
		let unit = AABB { min: -Vec3::thrice(1.0), max: Vec3::thrice(1.0) };
		for &c in &unit.corners() {
			let w = b.to_world(c);
			assert!(aabb.contains(w + (aabb.center() - w) * 1e-4));
		}
	}

	#[test]
	fn aabb_of_triangle() {
		let t = Primitive::triangle(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 0.0), Vec3::new(-1.0, 3.0, 4.0));
		let aabb = t.aabb();
		assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, 0.0));
		assert_eq!(aabb.max, Vec3::new(2.0, 3.0, 4.0));
	}

	#[test]
	#[should_panic]
	fn planes_have_no_aabb() {
		Primitive::plane(Vec3::new(0.0, 1.0, 0.0)).aabb();
	}

	#[test]
	fn local_world_round_trip() {
		let p = Primitive::ellipsoid(Vec3::new(1.0, 2.0, 3.0))
			.with_position(Vec3::new(1.0, -2.0, 0.5))
			.with_rotation(Quat::new(0.1, 0.7, -0.2, 0.6));
		let v = Vec3::new(3.0, 1.0, -7.0);
		assert!((p.to_world(p.to_local(v)) - v).length() < 1e-4);
	}
}
