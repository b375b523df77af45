//! Command-stream scene format
//!
//! A scene is a sequence of whitespace-separated commands, each one a keyword
//! followed by its numeric arguments. Shape commands (`PLANE`, `ELLIPSOID`,
//! `BOX`, `TRIANGLE`) start a new primitive; `POSITION`, `ROTATION`, `COLOR`,
//! `EMISSION`, `METALLIC`, `DIELECTRIC` and `IOR` then apply to it. Text after
//! `#` is a comment.

use std::collections::VecDeque;
use std::str::FromStr;

use crate::camera::Fov;
use crate::error::{Result, SceneError};
use crate::material::Material;
use crate::math::*;
use crate::primitive::Primitive;
use crate::scene::SceneDescription;

const DEFAULT_IOR: f32 = 1.5;

/// Primitive being described, with its refraction settings kept apart until
/// the material is known
struct PendingPrimitive {
	primitive: Primitive,
	dielectric: bool,
	ior: f32,
}

impl PendingPrimitive {
	fn new(primitive: Primitive) -> PendingPrimitive {
		PendingPrimitive { primitive, dielectric: false, ior: DEFAULT_IOR }
	}

	fn finish(self) -> Primitive {
		let PendingPrimitive { primitive, dielectric, ior } = self;
		if dielectric {
			primitive.with_material(Material::Dielectric { ior })
		} else {
			primitive
		}
	}
}

pub struct TextParser {
	tokens: VecDeque<(usize, String)>,
	scene: SceneDescription,
	pending: Vec<PendingPrimitive>,
}

impl TextParser {
	pub fn new(content: &str) -> TextParser {
		let tokens = content
			.lines()
			.enumerate()
			.flat_map(|(i, line)| {
				let line = line.split('#').next().unwrap_or("");
				line.split_whitespace().map(move |t| (i + 1, t.to_string()))
			})
			.collect();

		TextParser {
			tokens,
			scene: SceneDescription::default(),
			pending: Vec::new(),
		}
	}

	pub fn parse(mut self) -> Result<SceneDescription> {
		let mut ignored_lights = 0;

		while let Some((line, command)) = self.tokens.pop_front() {
			match command.as_str() {
				"DIMENSIONS" => {
					let w = self.positive::<usize>(line, &command)?;
					let h = self.positive::<usize>(line, &command)?;
					self.scene.camera.resolution = (w, h);
				}
				"BG_COLOR" => self.scene.background = self.vec3(line, &command)?,
				"AMBIENT_LIGHT" => self.scene.ambient = self.vec3(line, &command)?,
				"CAMERA_POSITION" => self.scene.camera.position = self.vec3(line, &command)?,
				"CAMERA_RIGHT" => self.scene.camera.right = self.vec3(line, &command)?,
				"CAMERA_UP" => self.scene.camera.up = self.vec3(line, &command)?,
				"CAMERA_FORWARD" => self.scene.camera.forward = self.vec3(line, &command)?,
				"CAMERA_FOV_X" => self.scene.camera.fov = Fov::X(self.real(line, &command)?),
				"RAY_DEPTH" => self.scene.ray_depth = self.number(line, &command)?,
				"SAMPLES" => self.scene.samples = self.positive(line, &command)?,

				"NEW_PRIMITIVE" => {}
				"PLANE" => {
					let normal = self.vec3(line, &command)?;
					if !(normal.length() > 0.0) {
						return Err(SceneError::Parse { line, message: "plane normal has zero length".to_string() });
					}
					self.start(Primitive::plane(normal));
				}
				"ELLIPSOID" => {
					let radii = self.extent(line, &command)?;
					self.start(Primitive::ellipsoid(radii));
				}
				"BOX" => {
					let half_size = self.extent(line, &command)?;
					self.start(Primitive::cuboid(half_size));
				}
				"TRIANGLE" => {
					let a = self.vec3(line, &command)?;
					let b = self.vec3(line, &command)?;
					let c = self.vec3(line, &command)?;
					self.start(Primitive::triangle(a, b, c));
				}

				"POSITION" => {
					let v = self.vec3(line, &command)?;
					let p = self.current(line, &command)?;
					if p.primitive.is_triangle() {
						return Err(SceneError::Parse { line, message: "triangles are placed by their vertices".to_string() });
					}
					p.primitive.position = v;
				}
				"ROTATION" => {
					let v = self.vec3(line, &command)?;
					let w = self.real(line, &command)?;
					let q = Quat::new(v.x, v.y, v.z, w);
					if !(q.length() > 0.0) {
						return Err(SceneError::Parse { line, message: "rotation has zero length".to_string() });
					}
					let p = self.current(line, &command)?;
					if p.primitive.is_triangle() {
						return Err(SceneError::Parse { line, message: "triangles are placed by their vertices".to_string() });
					}
					p.primitive.rotation = q.normalized();
				}
				"COLOR" => {
					let v = self.vec3(line, &command)?;
					self.current(line, &command)?.primitive.color = v;
				}
				"EMISSION" => {
					let v = self.vec3(line, &command)?;
					self.current(line, &command)?.primitive.emission = v;
				}
				"METALLIC" => {
					let p = self.current(line, &command)?;
					p.primitive.material = Material::Metallic;
					p.dielectric = false;
				}
				"DIELECTRIC" => self.current(line, &command)?.dielectric = true,
				"IOR" => {
					let ior = self.positive_real(line, &command)?;
					self.current(line, &command)?.ior = ior;
				}

				// point and directional lights from older scenes
				"NEW_LIGHT" => ignored_lights += 1,
				"LIGHT_INTENSITY" | "LIGHT_DIRECTION" | "LIGHT_POSITION" | "LIGHT_ATTENUATION" => {
					self.vec3(line, &command)?;
				}

				_ => return Err(SceneError::UnknownCommand { line, command }),
			}
		}

		if ignored_lights > 0 {
			log::warn!("ignoring {} light source(s): only emissive primitives light the scene", ignored_lights);
		}

		let mut scene = self.scene;
		for p in self.pending {
			let p = p.finish();
			if p.is_plane() {
				scene.planes.push(p);
			} else {
				scene.primitives.push(p);
			}
		}
		Ok(scene)
	}

	fn start(&mut self, primitive: Primitive) {
		self.pending.push(PendingPrimitive::new(primitive));
	}

	fn current(&mut self, line: usize, command: &str) -> Result<&mut PendingPrimitive> {
		self.pending.last_mut().ok_or_else(|| SceneError::NoPrimitive { line, command: command.to_string() })
	}

	fn number<T: FromStr>(&mut self, line: usize, command: &str) -> Result<T> {
		match self.tokens.front() {
			Some((l, token)) if *l == line => {
				let value = token.parse().map_err(|_| SceneError::Parse {
					line,
					message: format!("`{}` expects a number, found `{}`", command, token),
				})?;
				self.tokens.pop_front();
				Ok(value)
			}
			_ => Err(SceneError::Parse { line, message: format!("missing argument for `{}`", command) }),
		}
	}

	fn positive<T: FromStr + PartialOrd + Default>(&mut self, line: usize, command: &str) -> Result<T> {
		let v: T = self.number(line, command)?;
		if v > T::default() {
			Ok(v)
		} else {
			Err(SceneError::Parse { line, message: format!("`{}` expects positive values", command) })
		}
	}

	/// A float argument; `nan` and `inf` parse as `f32` but are rejected
	fn real(&mut self, line: usize, command: &str) -> Result<f32> {
		let v: f32 = self.number(line, command)?;
		if v.is_finite() {
			Ok(v)
		} else {
			Err(SceneError::Parse { line, message: format!("`{}` expects finite values, found `{}`", command, v) })
		}
	}

	fn positive_real(&mut self, line: usize, command: &str) -> Result<f32> {
		let v = self.real(line, command)?;
		if v > 0.0 {
			Ok(v)
		} else {
			Err(SceneError::Parse { line, message: format!("`{}` expects positive values", command) })
		}
	}

	fn vec3(&mut self, line: usize, command: &str) -> Result<Vec3> {
		Ok(Vec3::new(self.real(line, command)?, self.real(line, command)?, self.real(line, command)?))
	}

	fn extent(&mut self, line: usize, command: &str) -> Result<Vec3> {
		Ok(Vec3::new(self.positive_real(line, command)?, self.positive_real(line, command)?, self.positive_real(line, command)?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SCENE: &str = "
DIMENSIONS 320 240
BG_COLOR 0.1 0.2 0.3
CAMERA_POSITION 0 1 5
CAMERA_FOV_X 1.5708
RAY_DEPTH 4
SAMPLES 64

NEW_PRIMITIVE
PLANE 0 2 0
COLOR 0.5 0.5 0.5

NEW_PRIMITIVE   # a glass ball
ELLIPSOID 1 1 1
POSITION 0 1 0
ROTATION 0 0 0 2
IOR 1.33
DIELECTRIC

NEW_PRIMITIVE
BOX 0.5 0.1 0.5
POSITION 0 4 0
EMISSION 10 10 10

TRIANGLE 0 0 0  1 0 0  0 1 0
METALLIC

NEW_LIGHT
LIGHT_INTENSITY 1 1 1
LIGHT_DIRECTION 0 -1 0
";

	#[test]
	fn parses_a_scene() {
		let scene = TextParser::new(SCENE).parse().unwrap();
		assert_eq!(scene.camera.resolution, (320, 240));
		assert_eq!(scene.background, Vec3::new(0.1, 0.2, 0.3));
		assert_eq!(scene.camera.position, Vec3::new(0.0, 1.0, 5.0));
		assert_eq!(scene.camera.fov, Fov::X(1.5708));
		assert_eq!(scene.ray_depth, 4);
		assert_eq!(scene.samples, 64);

		assert_eq!(scene.planes.len(), 1);
		assert!(scene.planes[0].is_plane());
		assert_eq!(scene.planes[0].color, Vec3::thrice(0.5));

		assert_eq!(scene.primitives.len(), 3);
		let ball = &scene.primitives[0];
		assert_eq!(ball.material, Material::Dielectric { ior: 1.33 });
		assert_eq!(ball.position, Vec3::new(0.0, 1.0, 0.0));
		assert_eq!(ball.rotation, Quat::identity());
		assert!(scene.primitives[1].is_emissive());
		assert_eq!(scene.primitives[2].material, Material::Metallic);
	}

	#[test]
	fn defaults() {
		let scene = TextParser::new("").parse().unwrap();
		assert_eq!(scene.ray_depth, 6);
		assert_eq!(scene.samples, 16);
		assert_eq!(scene.background, Vec3::zero());
		assert!(scene.primitives.is_empty() && scene.planes.is_empty());
	}

	#[test]
	fn unknown_command() {
		match TextParser::new("BG_COLOR 0 0 0\n\nSPHERE 1").parse() {
			Err(SceneError::UnknownCommand { line: 3, ref command }) if command == "SPHERE" => {}
			r => panic!("unexpected {:?}", r.map(|_| ())),
		}
	}

	#[test]
	fn malformed_arguments() {
		for &(input, expected_line) in &[
			("BOX 1 1\nPOSITION 0 0 0", 1),
			("ELLIPSOID 1 x 1", 1),
			("\nELLIPSOID 1 0 1", 2),
			("BOX 1 1 -1", 1),
			("DIMENSIONS 0 10", 1),
			("PLANE 0 0 0", 1),
			("ELLIPSOID 1 1 1\nPOSITION nan 0 0", 2),
			("BOX 1 inf 1", 1),
			("NEW_PRIMITIVE\nBOX 1 1 1\nROTATION 0 0 0 -inf", 3),
			("CAMERA_FOV_X NaN", 1),
		] {
			match TextParser::new(input).parse() {
				Err(SceneError::Parse { line, .. }) => assert_eq!(line, expected_line, "{}", input),
				r => panic!("{}: unexpected {:?}", input, r.map(|_| ())),
			}
		}
	}

	#[test]
	fn attribute_before_shape() {
		match TextParser::new("NEW_PRIMITIVE\nCOLOR 1 0 0\nBOX 1 1 1").parse() {
			Err(SceneError::NoPrimitive { line: 2, .. }) => {}
			r => panic!("unexpected {:?}", r.map(|_| ())),
		}
	}
}
