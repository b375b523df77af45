use crate::math::*;

/// Surface response model of a primitive
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Material {
	/// Lambertian reflection of the surface color
	Diffuse,
	/// Perfect mirror tinted by the surface color
	Metallic,
	/// Smooth glass-like interface with the given index of refraction
	Dielectric { ior: f32 },
}

/// Mirror `dir` around `normal`
#[inline]
pub fn reflect(dir: Vec3, normal: Vec3) -> Vec3 {
	dir - normal * (2.0 * Vec3::dot(normal, dir))
}

/// Outcome of a ray crossing a dielectric interface
pub struct Interface {
	/// Fraction of light reflected (Schlick), 1 on total internal reflection
	pub reflectance: f32,
	/// Refracted direction, `None` on total internal reflection
	pub refracted: Option<Vec3>,
}

/// Refraction of unit `dir` through a surface whose `normal` faces it.
///
/// `eta` is the ratio `n1 / n2` of the index on the incoming side over the
/// index on the far side.
pub fn refract(dir: Vec3, normal: Vec3, eta: f32) -> Interface {
	let cos_i = -Vec3::dot(normal, dir);
	let sin_t = eta * (1.0 - cos_i * cos_i).max(0.0).sqrt();
	if sin_t.abs() > 1.0 {
		return Interface { reflectance: 1.0, refracted: None };
	}
	let cos_t = (1.0 - sin_t * sin_t).sqrt();
	let refracted = dir * eta + normal * (eta * cos_i - cos_t);

	Interface {
		reflectance: fresnel::schlick(eta, cos_i),
		refracted: Some(refracted.normalized()),
	}
}

pub mod fresnel {
	/// Schlick's approximation of the Fresnel reflectance for relative index `eta`
	pub fn schlick(eta: f32, cos_i: f32) -> f32 {
		let r0 = ((eta - 1.0) / (eta + 1.0)).powi(2);
		r0 + (1.0 - r0) * (1.0 - cos_i).max(0.0).powi(5)
	}
}
