use crate::math::*;

/// Warp a sample from [0:1[² on the unit sphere
pub fn uniform_sphere((u, v): (f32, f32)) -> Vec3 {
	let y = 1.0 - 2.0 * u;
	let r = (1.0 - y * y).max(0.0).sqrt();
	let phi = 2.0 * PI * v;
	Vec3::new(r * phi.cos(), y, r * phi.sin())
}

/// Warp a sample from [0:1[² to barycentric weights `(u, v)` uniformly covering
/// the triangle `u + v ≤ 1`
pub fn uniform_triangle((u, v): (f32, f32)) -> (f32, f32) {
	if u + v > 1.0 {
		(1.0 - u, 1.0 - v)
	} else {
		(u, v)
	}
}
