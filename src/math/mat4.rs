use std::ops::{Index, Mul};
use crate::math::{Vec3, Quat};

/// Row-major 4x4 affine matrix, used to flatten scene node hierarchies
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Mat4(pub(crate) [f32; 16]);

impl Mat4 {
	pub fn identity() -> Mat4 {
		Mat4([
			1.0, 0.0, 0.0, 0.0,
			0.0, 1.0, 0.0, 0.0,
			0.0, 0.0, 1.0, 0.0,
			0.0, 0.0, 0.0, 1.0,
		])
	}

	/// Build from 16 floats stored column by column (glTF layout)
	pub fn from_column_major(m: &[f32; 16]) -> Mat4 {
		let mut rows = [0.0; 16];
		for (i, &v) in m.iter().enumerate() {
			rows[(i % 4) * 4 + i / 4] = v;
		}
		Mat4(rows)
	}

	pub fn scale(v: Vec3) -> Mat4 {
		Mat4([
			v.x, 0.0, 0.0, 0.0,
			0.0, v.y, 0.0, 0.0,
			0.0, 0.0, v.z, 0.0,
			0.0, 0.0, 0.0, 1.0,
		])
	}

	pub fn translate(v: Vec3) -> Mat4 {
		Mat4([
			1.0, 0.0, 0.0, v.x,
			0.0, 1.0, 0.0, v.y,
			0.0, 0.0, 1.0, v.z,
			0.0, 0.0, 0.0, 1.0,
		])
	}

	/// Rotation matrix of the unit quaternion `q` (active rotation `q·v·q*`)
	pub fn rotate(q: Quat) -> Mat4 {
		let Quat { x, y, z, w } = q;
		Mat4([
			1.0 - 2.0*(y*y + z*z),       2.0*(x*y - z*w),       2.0*(x*z + y*w), 0.0,
			      2.0*(x*y + z*w), 1.0 - 2.0*(x*x + z*z),       2.0*(y*z - x*w), 0.0,
			      2.0*(x*z - y*w),       2.0*(y*z + x*w), 1.0 - 2.0*(x*x + y*y), 0.0,
			                  0.0,                   0.0,                   0.0, 1.0,
		])
	}

	/// `T·R·S`, the order glTF composes node transforms in
	pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
		Mat4::translate(translation) * Mat4::rotate(rotation) * Mat4::scale(scale)
	}

	pub fn transform_point(&self, p: Vec3) -> Vec3 {
		let a = &self;
		Vec3 {
			x: a[(0,0)] * p.x + a[(0,1)] * p.y + a[(0,2)] * p.z + a[(0,3)],
			y: a[(1,0)] * p.x + a[(1,1)] * p.y + a[(1,2)] * p.z + a[(1,3)],
			z: a[(2,0)] * p.x + a[(2,1)] * p.y + a[(2,2)] * p.z + a[(2,3)],
		}
	}
}

impl Mul for Mat4 {
	type Output = Mat4;
	fn mul(self, rhs: Mat4) -> Mat4 {
		let mut result = [0.0; 16];
		for i in 0..4 {
			for t in 0..4 {
				result[i*4 + t] = (0..4).map(|k| self[(i, k)] * rhs[(k, t)]).sum();
			}
		}
		Mat4(result)
	}
}

impl Index<(usize, usize)> for Mat4 {
	type Output = f32;

	fn index(&self, (row, col): (usize, usize)) -> &f32 {
		&self.0[4 * row + col]
	}
}

#[test]
fn test_identity_product() {
	let m = Mat4::from_trs(Vec3::new(1.0, 2.0, 3.0), Quat::identity(), Vec3::thrice(2.0));
	assert_eq!(m * Mat4::identity(), m);
	assert_eq!(Mat4::identity() * m, m);
}

#[test]
fn test_trs_order() {
	let q = Quat::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), std::f32::consts::FRAC_PI_2);
	let m = Mat4::from_trs(Vec3::new(10.0, 0.0, 0.0), q, Vec3::thrice(2.0));
	// scaled to (2,0,0), rotated to (0,2,0), then translated
	let p = m.transform_point(Vec3::new(1.0, 0.0, 0.0));
	assert!((p - Vec3::new(10.0, 2.0, 0.0)).length() < 1e-5);
	// matches the quaternion rotation convention
	let r = Mat4::rotate(q).transform_point(Vec3::new(0.3, 0.5, -0.2));
	assert!((r - Quat::rotate(Vec3::new(0.3, 0.5, -0.2), q.conjugate())).length() < 1e-5);
}

#[test]
fn test_column_major() {
	let cols = [
		1.0, 0.0, 0.0, 0.0,
		0.0, 1.0, 0.0, 0.0,
		0.0, 0.0, 1.0, 0.0,
		4.0, 5.0, 6.0, 1.0,
	];
	assert_eq!(Mat4::from_column_major(&cols), Mat4::translate(Vec3::new(4.0, 5.0, 6.0)));
}
