use std::fs;

use rand::Rng;
use rand_pcg::Pcg32;

use pathtracer::camera::{to_rgb8, Camera};
use pathtracer::loader;
use pathtracer::material::Material;
use pathtracer::math::*;
use pathtracer::primitive::Primitive;
use pathtracer::scene::{Scene, SceneDescription};

fn camera(width: usize, height: usize) -> Camera {
	Camera { resolution: (width, height), ..Camera::default() }
}

#[test]
fn empty_scene_is_background() {
	let background = Vec3::new(0.2, 0.5, 0.9);
	let scene = Scene::init(SceneDescription {
		camera: camera(16, 9),
		background,
		samples: 3,
		..SceneDescription::default()
	});
	let film = pathtracer::render(&scene, 0);
	assert_eq!((film.width, film.height), (16, 9));
	let expected = to_rgb8(background);
	for y in 0..9 {
		for x in 0..16 {
			assert_eq!(film.pixel(x, y), expected);
		}
	}
}

#[test]
fn emitter_filling_the_frame_at_depth_one() {
	let emission = Vec3::new(0.7, 1.5, 3.0);
	let wall = Primitive::cuboid(Vec3::new(100.0, 100.0, 1.0))
		.with_position(Vec3::new(0.0, 0.0, -5.0))
		.with_color(Vec3::new(0.9, 0.2, 0.4))
		.with_emission(emission);
	let expected = to_rgb8(emission);

	for &samples in &[1, 7] {
		let scene = Scene::init(SceneDescription {
			camera: camera(12, 12),
			ray_depth: 1,
			samples,
			primitives: vec![wall],
			..SceneDescription::default()
		});
		let film = pathtracer::render(&scene, 3);
		assert!(film.data.chunks(3).all(|p| p == &expected[..]), "{} spp", samples);
	}
}

#[test]
fn renders_are_reproducible() {
	let desc = lit_sphere(8, 8);
	let scene = Scene::init(SceneDescription { samples: 4, ..desc });
	assert_eq!(pathtracer::render(&scene, 9), pathtracer::render(&scene, 9));
}

/// A tinted diffuse sphere lit from above by an emissive slab kept out of frame
fn lit_sphere(width: usize, height: usize) -> SceneDescription {
	SceneDescription {
		camera: camera(width, height),
		ray_depth: 2,
		primitives: vec![
			Primitive::ellipsoid(Vec3::thrice(1.0))
				.with_position(Vec3::new(0.0, 0.0, -3.0))
				.with_color(Vec3::new(0.8, 0.5, 0.3)),
			Primitive::cuboid(Vec3::new(1.0, 0.1, 1.0))
				.with_position(Vec3::new(0.0, 3.5, -3.0))
				.with_emission(Vec3::thrice(20.0)),
		],
		..SceneDescription::default()
	}
}

/// Brute-force estimator: linear scan, uniform hemisphere sampling
fn reference_trace(primitives: &[Primitive], ray: Ray, depth: u32, max_depth: u32, rng: &mut Pcg32) -> Vec3 {
	if depth >= max_depth {
		return Vec3::zero();
	}
	let hit = primitives.iter()
		.filter_map(|p| p.intersect(ray))
		.min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap());
	let hit = match hit {
		Some(hit) => hit,
		None => return Vec3::zero(),
	};
	assert_eq!(hit.primitive.material, Material::Diffuse);

	let mut w = Vec3::zero();
	while !(w.length() > 1e-3) {
		w = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
		if w.length() > 1.0 {
			w = Vec3::zero();
		}
	}
	let mut w = w.normalized();
	if Vec3::dot(w, hit.normal) < 0.0 {
		w = -w;
	}
	let incoming = reference_trace(primitives, Ray::new(hit.point + hit.normal * 1e-4, w), depth + 1, max_depth, rng);
	hit.primitive.emission + hit.primitive.color * incoming * (2.0 * Vec3::dot(w, hit.normal))
}

#[test]
fn converges_to_brute_force_reference() {
	let (width, height) = (32, 32);
	let desc = lit_sphere(width, height);
	let primitives = desc.primitives.clone();
	let scene = Scene::init(SceneDescription { samples: 64, ..desc });

	let radiance = pathtracer::render_radiance(&scene, 1);
	let mean = radiance.iter().fold(Vec3::zero(), |a, &b| a + b) / radiance.len() as f32;

	let mut rng = Pcg32::new(77, 0);
	let reference_spp = 256;
	let mut sum = Vec3::zero();
	for y in 0..height {
		for x in 0..width {
			for _ in 0..reference_spp {
				let ray = scene.camera.make_ray(x as f32 + rng.gen::<f32>(), y as f32 + rng.gen::<f32>());
				sum += reference_trace(&primitives, ray, 0, 2, &mut rng);
			}
		}
	}
	let reference = sum / (width * height * reference_spp) as f32;

	for &axis in &Axis::ALL {
		assert!(reference[axis] > 0.0);
		let error = (mean[axis] - reference[axis]).abs() / reference[axis];
		assert!(error < 0.1, "{:?} channel: mean {:?} vs reference {:?}", axis, mean, reference);
	}
}

#[test]
fn text_scene_to_ppm() {
	let dir = std::env::temp_dir().join(format!("pathtracer-e2e-{}", std::process::id()));
	fs::create_dir_all(&dir).unwrap();
	let scene_path = dir.join("scene.txt");
	fs::write(&scene_path, "
DIMENSIONS 6 4
BG_COLOR 1 0 0
SAMPLES 2
NEW_PRIMITIVE
PLANE 0 1 0
POSITION 0 -1 0
COLOR 0.5 0.5 0.5
").unwrap();

	let desc = loader::load(&scene_path).unwrap();
	assert_eq!(desc.planes.len(), 1);
	let film = pathtracer::render(&Scene::init(desc), 0);

	let out = dir.join("image.ppm");
	film.save(&out).unwrap();
	let bytes = fs::read(&out).unwrap();
	let header = b"P6\n6 4\n255\n";
	assert_eq!(&bytes[..header.len()], &header[..]);
	assert_eq!(bytes.len(), header.len() + 6 * 4 * 3);
	// the top row looks at the sky
	assert_eq!(film.pixel(0, 0), to_rgb8(Vec3::new(1.0, 0.0, 0.0)));
}
