use crate::math::*;

/// Field of view as given by the scene source; the other axis follows from
/// the image aspect ratio
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Fov {
	/// Horizontal angle in radians
	X(f32),
	/// Vertical angle in radians
	Y(f32),
}

/// Pinhole camera with an explicit orthonormal-ish basis
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
	pub position: Vec3,
	pub right: Vec3,
	pub up: Vec3,
	pub forward: Vec3,
	pub fov: Fov,
	pub resolution: (usize, usize),
}

impl Default for Camera {
	fn default() -> Camera {
		Camera {
			position: Vec3::zero(),
			right: Vec3::new(1.0, 0.0, 0.0),
			up: Vec3::new(0.0, 1.0, 0.0),
			forward: Vec3::new(0.0, 0.0, -1.0),
			fov: Fov::X(FRAC_PI_2),
			resolution: (640, 480),
		}
	}
}

impl Camera {
	/// Horizontal and vertical field of view, in radians
	pub fn fov_xy(&self) -> (f32, f32) {
		let (w, h) = self.resolution;
		let aspect = h as f32 / w as f32;
		match self.fov {
			Fov::X(x) => (x, 2.0 * ((x * 0.5).tan() * aspect).atan()),
			Fov::Y(y) => (2.0 * ((y * 0.5).tan() / aspect).atan(), y),
		}
	}

	/// Ray through the image-plane point `(x, y)`, measured in pixels from the
	/// top-left corner
	pub fn make_ray(&self, x: f32, y: f32) -> Ray {
		let (w, h) = self.resolution;
		let (fov_x, fov_y) = self.fov_xy();
		let sx = (2.0 * x / w as f32 - 1.0) * (fov_x * 0.5).tan();
		let sy = -(2.0 * y / h as f32 - 1.0) * (fov_y * 0.5).tan();
		Ray::new(self.position, self.up * sy + self.right * sx + self.forward)
	}
}

/// ACES filmic curve fit, clamped to [0, 1]
pub fn aces(c: Vec3) -> Vec3 {
	c.map(|x| {
		let v = x * (2.51 * x + 0.03) / (x * (2.43 * x + 0.59) + 0.14);
		v.max(0.0).min(1.0)
	})
}

pub fn gamma(c: Vec3) -> Vec3 {
	c.map(|v| v.powf(1.0 / 2.2))
}

/// Map a [0, 1] value to the nearest 8-bit level
pub fn quantize(v: f32) -> u8 {
	(v * 255.0).round().max(0.0).min(255.0) as u8
}

/// Full display transform of a linear radiance value
pub fn to_rgb8(c: Vec3) -> [u8; 3] {
	let v = gamma(aces(c));
	[quantize(v.x), quantize(v.y), quantize(v.z)]
}
