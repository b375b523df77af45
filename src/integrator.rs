use rand::Rng;

use crate::material::*;
use crate::math::*;
use crate::scene::Scene;

/// Estimate the radiance arriving along `ray` with a single recursive path.
///
/// Diffuse bounces draw their direction from the scene's distribution;
/// specular ones follow the mirror or refracted direction.
pub fn trace<R: Rng>(scene: &Scene, ray: Ray, depth: u32, rng: &mut R) -> Vec3 {
	if depth >= scene.ray_depth {
		return Vec3::zero();
	}

	let its = match scene.intersect(ray) {
		Some(its) => its,
		None => return scene.background,
	};
	let prim = its.primitive;
	let normal = its.normal;

	match prim.material {
		Material::Diffuse => {
			let x = its.point + normal * EPSILON;
			let dist = scene.distribution();
			let w = dist.sample(scene.primitives(), rng, x, normal);
			let cos = Vec3::dot(w, normal);
			// NaN fails the test too
			if !(cos > 0.0) {
				return prim.emission;
			}
			let pdf = dist.pdf(scene.primitives(), x, normal, w);
			if !(pdf > 0.0) || !pdf.is_finite() {
				return prim.emission;
			}
			let incoming = trace(scene, Ray::new(x, w), depth + 1, rng);
			prim.emission + prim.color * incoming * (cos / (PI * pdf))
		}
		Material::Metallic => {
			let dir = reflect(ray.direction, normal);
			let incoming = trace(scene, Ray::new(its.point + normal * EPSILON, dir), depth + 1, rng);
			prim.emission + prim.color * incoming
		}
		Material::Dielectric { ior } => {
			let eta = if its.inside { ior } else { 1.0 / ior };
			let interface = refract(ray.direction, normal, eta);
			let refracted = match interface.refracted {
				Some(dir) if rng.gen::<f32>() >= interface.reflectance => dir,
				_ => {
					let dir = reflect(ray.direction, normal);
					let incoming = trace(scene, Ray::new(its.point + normal * EPSILON, dir), depth + 1, rng);
					return prim.emission + incoming;
				}
			};
			let incoming = trace(scene, Ray::new(its.point - normal * EPSILON, refracted), depth + 1, rng);
			let tint = if its.inside { Vec3::thrice(1.0) } else { prim.color };
			prim.emission + tint * incoming
		}
	}
}
