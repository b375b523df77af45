use crate::bvh::BVH;
use crate::camera::Camera;
use crate::distribution::Distribution;
use crate::geometry::Intersection;
use crate::math::*;
use crate::primitive::Primitive;

/// Scene as produced by a loader, before any acceleration structure exists
#[derive(Clone, Debug)]
pub struct SceneDescription {
	pub camera: Camera,
	pub background: Vec3,
	/// Carried over from scene files; the path tracer does not use it
	pub ambient: Vec3,
	pub ray_depth: u32,
	pub samples: u32,
	/// Bounded primitives, indexed by the BVH
	pub primitives: Vec<Primitive>,
	/// Infinite planes, tested by brute force
	pub planes: Vec<Primitive>,
}

impl Default for SceneDescription {
	fn default() -> SceneDescription {
		SceneDescription {
			camera: Camera::default(),
			background: Vec3::zero(),
			ambient: Vec3::zero(),
			ray_depth: 6,
			samples: 16,
			primitives: Vec::new(),
			planes: Vec::new(),
		}
	}
}

/// Immutable, render-ready scene
pub struct Scene {
	pub camera: Camera,
	pub background: Vec3,
	pub ambient: Vec3,
	pub ray_depth: u32,
	pub samples: u32,
	primitives: Vec<Primitive>,
	planes: Vec<Primitive>,
	bvh: Option<BVH>,
	distribution: Distribution,
}

impl Scene {
	pub fn init(desc: SceneDescription) -> Scene {
		let SceneDescription { camera, background, ambient, ray_depth, samples, primitives, planes } = desc;

		let bvh = if primitives.is_empty() {
			None
		} else {
			Some(BVH::build(&primitives, (0..primitives.len()).collect()))
		};

		let emitters: Vec<usize> = primitives.iter()
			.enumerate()
			.filter(|(_, p)| p.is_emissive())
			.map(|(i, _)| i)
			.collect();
		if planes.iter().any(|p| p.is_emissive()) {
			log::warn!("emissive planes are only reached by cosine sampling");
		}

		let mut members = vec![Distribution::Cosine];
		if !emitters.is_empty() {
			log::debug!("sampling distribution: cosine + {} emitters", emitters.len());
			members.push(Distribution::over_primitives(&primitives, emitters));
		} else {
			log::debug!("sampling distribution: cosine only");
		}

		Scene {
			camera,
			background,
			ambient,
			ray_depth,
			samples,
			primitives,
			planes,
			bvh,
			distribution: Distribution::Mixture(members),
		}
	}

	pub fn primitives(&self) -> &[Primitive] {
		&self.primitives
	}

	pub fn distribution(&self) -> &Distribution {
		&self.distribution
	}

	/// Closest hit among planes and bounded primitives
	pub fn intersect(&self, ray: Ray) -> Option<Intersection<'_>> {
		let mut best: Option<Intersection> = None;
		for plane in &self.planes {
			if let Some(its) = plane.intersect(ray) {
				if best.map_or(true, |b| its.distance < b.distance) {
					best = Some(its);
				}
			}
		}

		if let Some(ref bvh) = self.bvh {
			let max_distance = best.map_or(INFINITY, |b| b.distance);
			if let Some(its) = bvh.intersect(&self.primitives, ray, max_distance) {
				if best.map_or(true, |b| its.distance < b.distance) {
					best = Some(its);
				}
			}
		}

		best
	}
}
