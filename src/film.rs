use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::camera::to_rgb8;
use crate::error::{Result, SceneError};
use crate::math::Vec3;

/// 8-bit RGB image, row-major with the top row first
#[derive(Clone, Debug, PartialEq)]
pub struct Film {
	pub width: usize,
	pub height: usize,
	pub data: Vec<u8>,
}

impl Film {
	/// Tonemap, gamma-correct and quantize linear radiance values
	pub fn from_radiance(width: usize, height: usize, radiance: &[Vec3]) -> Film {
		debug_assert_eq!(radiance.len(), width * height);
		let data = radiance.iter().flat_map(|&c| to_rgb8(c).to_vec()).collect();
		Film { width, height, data }
	}

	pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
		let i = 3 * (y * self.width + x);
		[self.data[i], self.data[i + 1], self.data[i + 2]]
	}

	/// Binary portable pixmap
	pub fn write_ppm<W: Write>(&self, mut out: W) -> Result<()> {
		write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
		out.write_all(&self.data)?;
		out.flush()?;
		Ok(())
	}

	/// Write to `path`, in a format chosen from its extension
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		let ext = path.extension()
			.and_then(|e| e.to_str())
			.map(|e| e.to_ascii_lowercase());
		match ext.as_ref().map(|e| e.as_str()) {
			Some("ppm") => self.write_ppm(BufWriter::new(File::create(path)?)),
			Some(_) => {
				image::save_buffer(path, &self.data, self.width as u32, self.height as u32, image::ColorType::Rgb8)?;
				Ok(())
			}
			None => Err(SceneError::OutputFormat(path.to_path_buf())),
		}
	}
}
