//! Closed-form ray/primitive intersection in each primitive's local frame

use crate::math::*;
use crate::primitive::{Primitive, Shape};

/// Closest hit of a ray on a primitive
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
	pub distance: f32,
	pub point: Vec3,
	/// Unit normal, always facing the incoming ray
	pub normal: Vec3,
	/// The ray started inside the (closed) solid
	pub inside: bool,
	pub primitive: &'a Primitive,
}

/// Box hit without shading data, for bounding-volume tests
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoxHit {
	pub distance: f32,
	pub inside: bool,
}

/// Local-frame result before it is moved back to world space
struct LocalHit {
	distance: f32,
	normal: Vec3,
	inside: bool,
}

impl Primitive {
	/// Nearest intersection farther than `EPSILON` along `ray`.
	///
	/// `ray.direction` must be a unit vector.
	pub fn intersect(&self, ray: Ray) -> Option<Intersection<'_>> {
		let local = match self.shape {
			// triangles live in world space already
			Shape::Triangle { vertices } => return intersect_triangle(&vertices, ray).map(|h| Intersection {
				distance: h.distance,
				point: ray.point_at(h.distance),
				normal: h.normal,
				inside: false,
				primitive: self,
			}),
			Shape::Ellipsoid { radii } => intersect_ellipsoid(radii, self.local_ray(ray)),
			Shape::Plane { normal } => intersect_plane(normal, self.local_ray(ray)),
			Shape::Box { half_size } => intersect_box(half_size, self.local_ray(ray)),
		};

		local.map(|h| Intersection {
			distance: h.distance,
			point: ray.point_at(h.distance),
			normal: Quat::rotate(h.normal, self.rotation.conjugate()).normalized(),
			inside: h.inside,
			primitive: self,
		})
	}

	fn local_ray(&self, ray: Ray) -> Ray {
		Ray {
			origin: self.to_local(ray.origin),
			direction: Quat::rotate(ray.direction, self.rotation),
		}
	}
}

/// Pick the first root past the surface floor; the origin is inside when
/// only the far root qualifies.
#[inline(always)]
fn choose_root(t_near: f32, t_far: f32) -> Option<(f32, bool)> {
	if t_near >= EPSILON {
		Some((t_near, false))
	} else if t_far >= EPSILON {
		Some((t_far, true))
	} else {
		None
	}
}

/// Turn an outward normal so that it faces the ray origin's side
#[inline(always)]
fn orient(outward: Vec3, inside: bool) -> Vec3 {
	if inside { -outward } else { outward }
}

fn intersect_ellipsoid(radii: Vec3, ray: Ray) -> Option<LocalHit> {
	let o = ray.origin / radii;
	let d = ray.direction / radii;
	let a = Vec3::dot(d, d);
	let b = 2.0 * Vec3::dot(o, d);
	let c = Vec3::dot(o, o) - 1.0;
	let discriminant = b * b - 4.0 * a * c;
	if !(discriminant >= 0.0) {
		return None;
	}

	let s = discriminant.sqrt();
	let t1 = (-b - s) / (2.0 * a);
	let t2 = (-b + s) / (2.0 * a);
	let (t, inside) = choose_root(t1.min(t2), t1.max(t2))?;

	let p = ray.point_at(t);
	let outward = (p / (radii * radii)).normalized();
	Some(LocalHit { distance: t, normal: orient(outward, inside), inside })
}

fn intersect_plane(normal: Vec3, ray: Ray) -> Option<LocalHit> {
	let nd = Vec3::dot(ray.direction, normal);
	let t = -Vec3::dot(ray.origin, normal) / nd;
	if !(t >= EPSILON) || !t.is_finite() {
		return None;
	}
	let normal = if nd > 0.0 { -normal } else { normal };
	Some(LocalHit { distance: t, normal, inside: false })
}

/// Entry and exit parameters of the line through the box `[-half, half]`
#[inline(always)]
fn box_slabs(half: Vec3, ray: Ray) -> Option<(f32, f32)> {
	let t1 = (half - ray.origin) / ray.direction;
	let t2 = (-half - ray.origin) / ray.direction;
	let t_near = Vec3::min(t1, t2).max_elem();
	let t_far = Vec3::max(t1, t2).min_elem();
	if t_near > t_far {
		None
	} else {
		Some((t_near, t_far))
	}
}

/// Distance-only box test shared by the full box intersection and AABB tests
pub fn intersect_box_small(half: Vec3, ray: Ray) -> Option<BoxHit> {
	let (t_near, t_far) = box_slabs(half, ray)?;
	let (distance, inside) = choose_root(t_near, t_far)?;
	Some(BoxHit { distance, inside })
}

fn intersect_box(half: Vec3, ray: Ray) -> Option<LocalHit> {
	let BoxHit { distance, inside } = intersect_box_small(half, ray)?;

	// the face is the axis whose coordinate is closest to the half extent;
	// points on an edge or corner get the average of the touching faces
	let ratio = ray.point_at(distance) / half;
	let largest = ratio.abs().max_elem();
	let face = ratio.map(|r| if r.abs() >= largest - EPSILON { r.signum() } else { 0.0 });

	Some(LocalHit { distance, normal: orient(face.normalized(), inside), inside })
}

fn intersect_triangle(vertices: &[Vec3; 3], ray: Ray) -> Option<LocalHit> {
	let [a, b, c] = *vertices;
	let (b, c) = (b - a, c - a);
	let n = Vec3::cross(b, c);

	let nd = Vec3::dot(ray.direction, n);
	let t = Vec3::dot(a - ray.origin, n) / nd;
	if !(t >= EPSILON) || !t.is_finite() {
		return None;
	}

	let p = ray.point_at(t) - a;
	if Vec3::dot(Vec3::cross(b, p), n) < 0.0
		|| Vec3::dot(Vec3::cross(p, c), n) < 0.0
		|| Vec3::dot(Vec3::cross(c - b, p - b), n) < 0.0
	{
		return None;
	}

	let n = n.normalized();
	let normal = if nd > 0.0 { -n } else { n };
	Some(LocalHit { distance: t, normal, inside: false })
}
