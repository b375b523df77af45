pub mod bvh;
pub mod camera;
pub mod distribution;
pub mod error;
pub mod film;
pub mod geometry;
pub mod integrator;
pub mod loader;
pub mod material;
pub mod math;
pub mod primitive;
pub mod scene;

mod warp;

use rand::Rng;
use rand_pcg::Pcg32;
use rayon::prelude::*;
use time::PreciseTime;

use crate::film::Film;
use crate::integrator::trace;
use crate::math::*;
use crate::scene::Scene;

pub use crate::error::{Result, SceneError};
pub use crate::scene::SceneDescription;

/// Mean radiance of every pixel, row-major with the top row first.
///
/// Each pixel draws from its own generator, seeded with `seed` and the pixel
/// index, so the result does not depend on thread scheduling.
pub fn render_radiance(scene: &Scene, seed: u64) -> Vec<Vec3> {
	let (width, height) = scene.camera.resolution;
	let spp = scene.samples;
	let mut radiance = vec![Vec3::zero(); width * height];

	log::info!("rendering {}x{} with {} samples per pixel", width, height, spp);
	let start = PreciseTime::now();

	radiance.par_iter_mut().enumerate().for_each(|(i, p)| {
		let mut rng = Pcg32::new(seed, i as u64);
		let (x, y) = ((i % width) as f32, (i / width) as f32);
		let mut sum = Vec3::zero();
		for _ in 0..spp {
			let ray = scene.camera.make_ray(x + rng.gen::<f32>(), y + rng.gen::<f32>());
			let v = trace(scene, ray, 0, &mut rng);
			if v.all_finite() {
				sum += v;
			}
		}
		*p = sum / spp.max(1) as f32;
	});

	let end = PreciseTime::now();
	let tot_s = start.to(end).num_milliseconds() as f32 / 1000.0;
	log::info!("rendered {} spp in {:.3}s ({:.3}s per sample)", spp, tot_s, tot_s / spp.max(1) as f32);

	radiance
}

/// Render to a displayable 8-bit image
pub fn render(scene: &Scene, seed: u64) -> Film {
	let (width, height) = scene.camera.resolution;
	Film::from_radiance(width, height, &render_radiance(scene, seed))
}
