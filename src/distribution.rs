//! Direction sampling for next-event estimation
//!
//! A distribution draws a direction `w` leaving the point `x` (with surface
//! normal `n_x`) and reports the solid-angle density of drawing it.
//! Primitive-backed variants hold handles into the scene's primitive arena.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::bvh::{BVH, NodeKind};
use crate::geometry::Intersection;
use crate::math::*;
use crate::primitive::{Primitive, Shape};
use crate::warp;

/// Upper bound on redraws when a sampled point is not visible along its direction
const MAX_REJECTIONS: usize = 1000;

/// Distance used to step past a surface before looking for the next crossing
const CROSSING_STEP: f32 = 1e-4;

pub enum Distribution {
	/// Cosine-weighted hemisphere around `n_x`
	Cosine,
	/// Uniform by area over a box's surface
	Box(usize),
	/// Uniform unit-sphere directions mapped onto an ellipsoid
	Ellipsoid(usize),
	/// Uniform by area over a triangle
	Triangle(usize),
	/// Uniform choice among the members
	Mixture(Vec<Distribution>),
	/// Uniform choice among the members, with the density gathered through a
	/// BVH. Member `i` describes the primitive in slot `i` of `bvh.items()`.
	MixtureOverBVH { bvh: BVH, members: Vec<Distribution> },
}

impl Distribution {
	/// Area sampler for a bounded primitive
	pub fn for_primitive(primitives: &[Primitive], index: usize) -> Distribution {
		match primitives[index].shape {
			Shape::Box { .. } => Distribution::Box(index),
			Shape::Ellipsoid { .. } => Distribution::Ellipsoid(index),
			Shape::Triangle { .. } => Distribution::Triangle(index),
			Shape::Plane { .. } => panic!("planes are unbounded and cannot be sampled"),
		}
	}

	/// Uniform mixture over `emitters`, indexed by a dedicated BVH
	pub fn over_primitives(primitives: &[Primitive], emitters: Vec<usize>) -> Distribution {
		assert!(!emitters.is_empty(), "mixture over an empty primitive set");
		let bvh = BVH::build(primitives, emitters);
		let members = bvh.items().iter()
			.map(|&i| Distribution::for_primitive(primitives, i))
			.collect();
		Distribution::MixtureOverBVH { bvh, members }
	}

	pub fn sample<R: Rng>(&self, primitives: &[Primitive], rng: &mut R, x: Vec3, n_x: Vec3) -> Vec3 {
		match *self {
			Distribution::Cosine => {
				let s = Vec3::new(rng.sample(StandardNormal), rng.sample(StandardNormal), rng.sample(StandardNormal));
				cosine_from_sphere_point(s.normalized(), n_x)
			}
			Distribution::Box(i) => sample_box(&primitives[i], rng, x),
			Distribution::Ellipsoid(i) => sample_ellipsoid(&primitives[i], rng, x),
			Distribution::Triangle(i) => sample_triangle(&primitives[i], rng, x),
			Distribution::Mixture(ref members) | Distribution::MixtureOverBVH { ref members, .. } => {
				let pick = ((rng.gen::<f32>() * members.len() as f32) as usize).min(members.len() - 1);
				members[pick].sample(primitives, rng, x, n_x)
			}
		}
	}

	pub fn pdf(&self, primitives: &[Primitive], x: Vec3, n_x: Vec3, w: Vec3) -> f32 {
		if w.has_nan() {
			return 0.0;
		}
		match *self {
			Distribution::Cosine => Vec3::dot(w, n_x).max(0.0) * INV_PI,
			Distribution::Box(i) => pdf_convex(&primitives[i], x, w, box_pdf1),
			Distribution::Ellipsoid(i) => pdf_convex(&primitives[i], x, w, ellipsoid_pdf1),
			Distribution::Triangle(i) => pdf_triangle(&primitives[i], x, w),
			Distribution::Mixture(ref members) => {
				if members.is_empty() {
					return 0.0;
				}
				let sum: f32 = members.iter().map(|m| m.pdf(primitives, x, n_x, w)).sum();
				sum / members.len() as f32
			}
			Distribution::MixtureOverBVH { ref bvh, ref members } => {
				let ray = Ray::new(x, w);
				pdf_over_bvh(bvh, members, primitives, 0, ray, n_x) / members.len() as f32
			}
		}
	}
}

/// Turn a uniform point `s` of the unit sphere into a cosine-distributed
/// direction around `n_x`, falling back to `n_x` itself when the result is
/// degenerate or grazing.
pub fn cosine_from_sphere_point(s: Vec3, n_x: Vec3) -> Vec3 {
	let w = s + n_x;
	// the unnormalized sum is tested, NaN fails both comparisons
	if !(w.length() > EPSILON) || !(Vec3::dot(w, n_x) > EPSILON) {
		return n_x;
	}
	w.normalized()
}

/// Redraw points from `draw` until the direction toward one actually reaches
/// the primitive, giving up after `MAX_REJECTIONS` attempts.
fn sample_visible<F>(prim: &Primitive, x: Vec3, mut draw: F) -> Vec3
	where F: FnMut() -> Vec3
{
	let mut w = Vec3::zero();
	for _ in 0..MAX_REJECTIONS {
		let y = draw();
		w = (y - x).normalized();
		// same ray as the one callers rebuild from `w`
		if !w.has_nan() && prim.intersect(Ray::new(x, w)).is_some() {
			return w;
		}
	}
	log::debug!("no visible point found on {:?} from {:?}", prim.shape, x);
	w
}

fn sample_box<R: Rng>(prim: &Primitive, rng: &mut R, x: Vec3) -> Vec3 {
	let s = match prim.shape {
		Shape::Box { half_size } => half_size,
		_ => unreachable!("box sampler over a {:?}", prim.shape),
	};
	// area of the faces orthogonal to X, Y and Z
	let areas = [s.y * s.z, s.x * s.z, s.x * s.y];
	let total = areas[0] + areas[1] + areas[2];

	sample_visible(prim, x, || {
		let mut u = rng.gen::<f32>() * total;
		let mut axis = 2;
		for (i, &a) in areas.iter().enumerate() {
			if u < a {
				axis = i;
				break;
			}
			u -= a;
		}
		let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };

		let mut local = Vec3::zero();
		for (i, &a) in Axis::ALL.iter().enumerate() {
			local[a] = if i == axis {
				sign * s[a]
			} else {
				(2.0 * rng.gen::<f32>() - 1.0) * s[a]
			};
		}
		prim.to_world(local)
	})
}

fn sample_ellipsoid<R: Rng>(prim: &Primitive, rng: &mut R, x: Vec3) -> Vec3 {
	let radii = match prim.shape {
		Shape::Ellipsoid { radii } => radii,
		_ => unreachable!("ellipsoid sampler over a {:?}", prim.shape),
	};
	sample_visible(prim, x, || prim.to_world(warp::uniform_sphere(rng.gen()) * radii))
}

fn sample_triangle<R: Rng>(prim: &Primitive, rng: &mut R, x: Vec3) -> Vec3 {
	let [a, b, c] = match prim.shape {
		Shape::Triangle { vertices } => vertices,
		_ => unreachable!("triangle sampler over a {:?}", prim.shape),
	};
	let (u, v) = warp::uniform_triangle(rng.gen());
	let y = a + (b - a) * u + (c - a) * v;
	(y - x).normalized()
}

/// Sum the one-crossing density `pdf1` over the (at most two) crossings of a
/// convex solid along `w`.
fn pdf_convex<F>(prim: &Primitive, x: Vec3, w: Vec3, pdf1: F) -> f32
	where F: Fn(&Primitive, Vec3, Vec3, &Intersection) -> f32
{
	let mut origin = x;
	let mut total = 0.0;
	for _ in 0..2 {
		let hit = match prim.intersect(Ray::new(origin, w)) {
			Some(hit) => hit,
			None => break,
		};
		total += pdf1(prim, x, w, &hit);
		origin = hit.point + w * CROSSING_STEP;
	}
	total
}

/// Density of reaching the box surface at `hit` along `w` from `x`
fn box_pdf1(prim: &Primitive, x: Vec3, w: Vec3, hit: &Intersection) -> f32 {
	let s = match prim.shape {
		Shape::Box { half_size } => half_size,
		_ => unreachable!(),
	};
	let area = 8.0 * (s.y * s.z + s.x * s.z + s.x * s.y);
	(hit.point - x).length_squared() / (area * Vec3::dot(w, hit.normal).abs() + 1e-7)
}

/// Density of reaching the ellipsoid surface at `hit` along `w` from `x`
fn ellipsoid_pdf1(prim: &Primitive, x: Vec3, w: Vec3, hit: &Intersection) -> f32 {
	let r = match prim.shape {
		Shape::Ellipsoid { radii } => radii,
		_ => unreachable!(),
	};
	// position on the unit sphere this point was mapped from
	let n = prim.to_local(hit.point) / r;
	let jacobian = Vec3::new(n.x * r.y * r.z, r.x * n.y * r.z, r.x * r.y * n.z).length();
	(1.0 / (4.0 * PI * jacobian)) * (hit.point - x).length_squared() / (Vec3::dot(w, hit.normal).abs() + 1e-5)
}

fn pdf_triangle(prim: &Primitive, x: Vec3, w: Vec3) -> f32 {
	let [a, b, c] = match prim.shape {
		Shape::Triangle { vertices } => vertices,
		_ => unreachable!("triangle density over a {:?}", prim.shape),
	};
	match prim.intersect(Ray::new(x, w)) {
		None => 0.0,
		Some(hit) => {
			let area = 0.5 * Vec3::cross(b - a, c - a).length();
			(hit.point - x).length_squared() / (area * Vec3::dot(w, hit.normal).abs() + 1e-7)
		}
	}
}

/// Sum the densities of the members whose bounds `ray` crosses
fn pdf_over_bvh(bvh: &BVH, members: &[Distribution], primitives: &[Primitive], id: usize, ray: Ray, n_x: Vec3) -> f32 {
	let node = bvh.node(id);
	if node.bbox.intersect(ray).is_none() {
		return 0.0;
	}
	match node.kind {
		NodeKind::Split { left, right } => {
			pdf_over_bvh(bvh, members, primitives, left, ray, n_x)
				+ pdf_over_bvh(bvh, members, primitives, right, ray, n_x)
		}
		NodeKind::Leaf { first, count } => {
			members[first..first + count].iter()
				.map(|m| m.pdf(primitives, ray.origin, n_x, ray.direction))
				.sum()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand_pcg::Pcg32;

	/// Estimate the integral of `pdf` over all directions leaving `x`
	fn integrate(dist: &Distribution, primitives: &[Primitive], x: Vec3, n_x: Vec3, samples: usize) -> f32 {
		let mut rng = Pcg32::new(42, 7);
		let sum: f32 = (0..samples)
			.map(|_| dist.pdf(primitives, x, n_x, warp::uniform_sphere(rng.gen())))
			.sum();
		4.0 * PI * sum / samples as f32
	}

	fn lights() -> Vec<Primitive> {
		let q = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalized(), 0.7);
		vec![
			Primitive::cuboid(Vec3::new(1.0, 0.5, 0.8)).with_position(Vec3::new(0.0, 3.0, 0.0)).with_rotation(q),
			Primitive::ellipsoid(Vec3::new(1.0, 0.5, 0.8)).with_position(Vec3::new(3.0, 1.0, 0.0)).with_rotation(q),
			Primitive::triangle(Vec3::new(-3.0, 0.0, -1.0), Vec3::new(-3.0, 0.0, 1.0), Vec3::new(-3.0, 2.0, 0.0)),
		]
	}

	#[test]
	fn cosine_samples_face_the_normal() {
		let mut rng = Pcg32::new(3, 3);
		let normals = [Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, -2.0, 0.5).normalized()];
		for &n in &normals {
			for _ in 0..5000 {
				let w = Distribution::Cosine.sample(&[], &mut rng, Vec3::zero(), n);
				assert!(w == n || Vec3::dot(w, n) >= -1e-6);
				assert!((w.length() - 1.0).abs() < 1e-4);
			}
		}
	}

	#[test]
	fn cosine_falls_back_to_the_normal() {
		let n = Vec3::new(0.0, 0.0, 1.0);
		assert_eq!(cosine_from_sphere_point(-n, n), n);
		// nearly opposite: the sum is tiny and almost tangent
		let s = Vec3::new(1e-3, 0.0, -1.0).normalized();
		assert_eq!(cosine_from_sphere_point(s, n), n);
		let nan = Vec3::new(NAN, 0.0, 0.0);
		assert_eq!(cosine_from_sphere_point(nan, n), n);
	}

	#[test]
	fn cosine_pdf_integrates_to_one() {
		let n = Vec3::new(0.0, 1.0, 0.0);
		let total = integrate(&Distribution::Cosine, &[], Vec3::zero(), n, 100_000);
		assert!((total - 1.0).abs() < 0.02, "{}", total);
	}

	#[test]
	fn primitive_pdfs_integrate_to_one() {
		let primitives = lights();
		let x = Vec3::new(0.0, 0.5, 0.0);
		for i in 0..primitives.len() {
			let dist = Distribution::for_primitive(&primitives, i);
			let total = integrate(&dist, &primitives, x, Vec3::new(0.0, 1.0, 0.0), 400_000);
			assert!((total - 1.0).abs() < 0.1, "primitive {}: {}", i, total);
		}
	}

	#[test]
	fn primitive_samples_reach_the_primitive() {
		let primitives = lights();
		let mut rng = Pcg32::new(11, 0);
		let x = Vec3::new(0.0, 0.5, 0.0);
		for i in 0..primitives.len() {
			let dist = Distribution::for_primitive(&primitives, i);
			for _ in 0..500 {
				let w = dist.sample(&primitives, &mut rng, x, Vec3::new(0.0, 1.0, 0.0));
				assert!(primitives[i].intersect(Ray::new(x, w)).is_some());
				assert!(dist.pdf(&primitives, x, Vec3::new(0.0, 1.0, 0.0), w) > 0.0);
			}
		}
	}

	#[test]
	fn sphere_pdf_matches_solid_angle() {
		// a sphere of radius 1 at distance 4 subtends a cone of half-angle asin(1/4);
		// every direction inside it has density 2/cone (both crossings count)
		let primitives = vec![Primitive::ellipsoid(Vec3::thrice(1.0)).with_position(Vec3::new(0.0, 0.0, -4.0))];
		let dist = Distribution::Ellipsoid(0);
		let p = dist.pdf(&primitives, Vec3::zero(), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));
		// towards the center: (1/4π)·(3² + 5²)
		let expected = (9.0 + 25.0) / (4.0 * PI);
		assert!((p - expected).abs() < 1e-2 * expected, "{} vs {}", p, expected);
		assert_eq!(dist.pdf(&primitives, Vec3::zero(), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0)), 0.0);
	}

	#[test]
	fn nan_direction_has_zero_density() {
		let primitives = lights();
		let w = Vec3::new(NAN, 0.0, 1.0);
		for i in 0..primitives.len() {
			assert_eq!(Distribution::for_primitive(&primitives, i).pdf(&primitives, Vec3::zero(), Vec3::new(0.0, 1.0, 0.0), w), 0.0);
		}
	}

	#[test]
	fn mixture_pdf_is_the_average() {
		let primitives = lights();
		let members = || (0..primitives.len()).map(|i| Distribution::for_primitive(&primitives, i))
			.chain(std::iter::once(Distribution::Cosine))
			.collect::<Vec<_>>();
		let mixture = Distribution::Mixture(members());
		let x = Vec3::new(0.0, 0.5, 0.0);
		let n = Vec3::new(0.0, 1.0, 0.0);

		let mut rng = Pcg32::new(5, 1);
		for _ in 0..200 {
			let w = mixture.sample(&primitives, &mut rng, x, n);
			let expected: f32 = members().iter().map(|m| m.pdf(&primitives, x, n, w)).sum::<f32>() / 4.0;
			let got = mixture.pdf(&primitives, x, n, w);
			assert!((got - expected).abs() <= 1e-5 * expected.max(1.0));
			assert!(got > 0.0);
		}
	}

	#[test]
	fn bvh_mixture_matches_plain_mixture() {
		let mut rng = Pcg32::new(8, 2);
		let mut primitives = lights();
		for i in 0..30 {
			let p = Vec3::new(rng.gen_range(-10.0..10.0), rng.gen_range(2.0..10.0), rng.gen_range(-10.0..10.0));
			primitives.push(match i % 3 {
				0 => Primitive::cuboid(Vec3::thrice(0.3)).with_position(p),
				1 => Primitive::ellipsoid(Vec3::new(0.3, 0.2, 0.4)).with_position(p),
				_ => Primitive::triangle(p, p + Vec3::new(0.5, 0.0, 0.0), p + Vec3::new(0.0, 0.0, 0.5)),
			});
		}
		let all: Vec<usize> = (0..primitives.len()).collect();
		let over_bvh = Distribution::over_primitives(&primitives, all.clone());
		let plain = Distribution::Mixture(all.iter().map(|&i| Distribution::for_primitive(&primitives, i)).collect());

		let x = Vec3::new(0.0, 0.5, 0.0);
		let n = Vec3::new(0.0, 1.0, 0.0);
		for k in 0..500 {
			// alternate sampled directions and arbitrary ones
			let w = if k % 2 == 0 {
				over_bvh.sample(&primitives, &mut rng, x, n)
			} else {
				warp::uniform_sphere(rng.gen())
			};
			let a = over_bvh.pdf(&primitives, x, n, w);
			let b = plain.pdf(&primitives, x, n, w);
			assert!((a - b).abs() <= 1e-3 * b.max(1.0), "{} vs {}", a, b);
			if k % 2 == 0 {
				assert!(a > 0.0);
			}
		}
	}
}
