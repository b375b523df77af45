use crate::math::*;
use crate::geometry::{self, BoxHit};

/// Axis-Aligned Bounding Box
///
/// The empty box has `min = +inf` and `max = -inf` so that extending it
/// with anything yields that thing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AABB {
	pub min: Vec3,
	pub max: Vec3,
}

impl AABB {
	pub fn empty() -> AABB {
		AABB { min: Vec3::thrice(INFINITY), max: Vec3::thrice(NEG_INFINITY) }
	}

	pub fn is_empty(&self) -> bool {
		self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
	}

	pub fn extend_point(&mut self, p: Vec3) {
		self.min = Vec3::min(self.min, p);
		self.max = Vec3::max(self.max, p);
	}

	pub fn extend(&mut self, b: &AABB) {
		*self = self.union(b);
	}

	pub fn union(&self, b: &AABB) -> AABB {
		AABB {
			min: Vec3::min(self.min, b.min),
			max: Vec3::max(self.max, b.max),
		}
	}

	pub fn contains(&self, p: Vec3) -> bool {
		self.min.x <= p.x && p.x <= self.max.x
			&& self.min.y <= p.y && p.y <= self.max.y
			&& self.min.z <= p.z && p.z <= self.max.z
	}

	pub fn center(&self) -> Vec3 {
		(self.min + self.max) * 0.5
	}

	pub fn half_size(&self) -> Vec3 {
		(self.max - self.min) * 0.5
	}

	/// The 8 corners, bit `i` of the index selecting max over min on axis `i`
	pub fn corners(&self) -> [Vec3; 8] {
		let mut corners = [Vec3::zero(); 8];
		for (mask, c) in corners.iter_mut().enumerate() {
			*c = Vec3 {
				x: if mask & 1 != 0 { self.max.x } else { self.min.x },
				y: if mask & 2 != 0 { self.max.y } else { self.min.y },
				z: if mask & 4 != 0 { self.max.z } else { self.min.z },
			};
		}
		corners
	}

	pub fn surface_area(&self) -> f32 {
		if self.is_empty() {
			return 0.0;
		}
		let d = self.max - self.min;
		2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
	}

	/// Slab test of the ray against the box, treated as a non-rotated box
	/// centered on `center()`. `inside` is set when the ray starts within it.
	#[inline]
	pub fn intersect(&self, ray: Ray) -> Option<BoxHit> {
		let local = Ray { origin: ray.origin - self.center(), direction: ray.direction };
		geometry::intersect_box_small(self.half_size(), local)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::Rng;
	use rand_pcg::Pcg32;

	fn random_points(rng: &mut Pcg32, n: usize) -> Vec<Vec3> {
		(0..n).map(|_| Vec3::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0))).collect()
	}

	fn bound(points: &[Vec3]) -> AABB {
		let mut b = AABB::empty();
		for &p in points {
			b.extend_point(p);
		}
		b
	}

	#[test]
	fn extend_contains_every_point() {
		let mut rng = Pcg32::new(7, 0);
		for n in 1..20 {
			let points = random_points(&mut rng, n);
			let b = bound(&points);
			assert!(b.min.x <= b.max.x && b.min.y <= b.max.y && b.min.z <= b.max.z);
			for &p in &points {
				assert!(b.contains(p));
			}
		}
	}

	#[test]
	fn union_is_commutative_associative_idempotent() {
		let mut rng = Pcg32::new(11, 0);
		for _ in 0..50 {
			let a = bound(&random_points(&mut rng, 3));
			let b = bound(&random_points(&mut rng, 4));
			let c = bound(&random_points(&mut rng, 5));
			assert_eq!(a.union(&b), b.union(&a));
			assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
			assert_eq!(a.union(&a), a);
			assert_eq!(a.union(&AABB::empty()), a);
		}
	}

	#[test]
	fn extend_order_does_not_matter() {
		let mut rng = Pcg32::new(3, 0);
		let mut points = random_points(&mut rng, 30);
		let forward = bound(&points);
		points.reverse();
		assert_eq!(forward, bound(&points));
	}

	#[test]
	fn ray_slab_test() {
		let b = AABB { min: Vec3::new(1.0, -1.0, -1.0), max: Vec3::new(3.0, 1.0, 1.0) };
		let hit = b.intersect(Ray::new(Vec3::new(-2.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0))).unwrap();
		assert!((hit.distance - 3.0).abs() < 1e-5);
		assert!(!hit.inside);

		let hit = b.intersect(Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0))).unwrap();
		assert!((hit.distance - 1.0).abs() < 1e-5);
		assert!(hit.inside);

		assert!(b.intersect(Ray::new(Vec3::new(-2.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0))).is_none());
		assert!(b.intersect(Ray::new(Vec3::new(-2.0, 5.0, 0.0), Vec3::new(1.0, 0.0, 0.0))).is_none());
	}

	#[test]
	fn surface_area_of_unit_cube() {
		let b = AABB { min: Vec3::zero(), max: Vec3::thrice(1.0) };
		assert_eq!(b.surface_area(), 6.0);
		assert_eq!(AABB::empty().surface_area(), 0.0);
	}
}
