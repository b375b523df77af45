use std::env;

use anyhow::{bail, Context, Result};

use pathtracer::loader;
use pathtracer::scene::Scene;

const USAGE: &str = "usage: render <scene> <width> <height> <samples> <output> [seed]";

fn parse_arg<T: std::str::FromStr>(args: &[String], i: usize, name: &str) -> Result<T>
	where T::Err: std::error::Error + Send + Sync + 'static
{
	args[i].parse().with_context(|| format!("invalid {} `{}`\n{}", name, args[i], USAGE))
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args: Vec<String> = env::args().collect();
	if args.len() != 6 && args.len() != 7 {
		bail!(USAGE);
	}

	let width: usize = parse_arg(&args, 2, "width")?;
	let height: usize = parse_arg(&args, 3, "height")?;
	let samples: u32 = parse_arg(&args, 4, "sample count")?;
	let seed: u64 = if args.len() == 7 { parse_arg(&args, 6, "seed")? } else { 0 };
	if width == 0 || height == 0 || samples == 0 {
		bail!("image size and sample count must be positive\n{}", USAGE);
	}

	let mut desc = loader::load(&args[1])
		.with_context(|| format!("failed to load scene {}", args[1]))?;
	desc.camera.resolution = (width, height);
	desc.samples = samples;

	let scene = Scene::init(desc);
	let film = pathtracer::render(&scene, seed);

	film.save(&args[5])
		.with_context(|| format!("failed to write image {}", args[5]))?;
	log::info!("image written to {}", args[5]);
	Ok(())
}
