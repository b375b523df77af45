//! Scene file readers

pub mod gltf;
pub mod text;

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::scene::SceneDescription;

/// Read a scene, picking the format from the file extension: `.gltf` files
/// are glTF documents, anything else is a text command stream.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SceneDescription> {
	let path = path.as_ref();
	let is_gltf = path.extension()
		.and_then(|e| e.to_str())
		.map_or(false, |e| e.eq_ignore_ascii_case("gltf"));

	let scene = if is_gltf {
		gltf::load(path)?
	} else {
		text::TextParser::new(&fs::read_to_string(path)?).parse()?
	};

	log::info!("loaded {}: {} primitives ({} emissive), {} planes",
		path.display(),
		scene.primitives.len(),
		scene.primitives.iter().filter(|p| p.is_emissive()).count(),
		scene.planes.len());
	Ok(scene)
}
