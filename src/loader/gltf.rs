//! glTF 2.0 scenes (JSON document with external binary buffers)
//!
//! Every mesh is flattened into world-space triangles; the first node holding
//! a camera defines the view.

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use serde_derive::Deserialize;

use crate::camera::Fov;
use crate::error::{Result, SceneError};
use crate::material::Material as Kind;
use crate::math::*;
use crate::primitive::Primitive;
use crate::scene::SceneDescription;

const FLOAT: u32 = 5126;
const UNSIGNED_BYTE: u32 = 5121;
const UNSIGNED_SHORT: u32 = 5123;
const UNSIGNED_INT: u32 = 5125;

const GLASS_IOR: f32 = 1.5;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct Document {
	buffers: Vec<Buffer>,
	buffer_views: Vec<BufferView>,
	accessors: Vec<Accessor>,
	meshes: Vec<Mesh>,
	nodes: Vec<Node>,
	materials: Vec<Material>,
	cameras: Vec<Camera>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Buffer {
	byte_length: usize,
	uri: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct BufferView {
	buffer: usize,
	byte_length: usize,
	#[serde(default)]
	byte_offset: usize,
	byte_stride: Option<usize>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Accessor {
	buffer_view: Option<usize>,
	#[serde(default)]
	byte_offset: usize,
	component_type: u32,
	count: usize,
	#[serde(rename = "type")]
	kind: String,
}

#[derive(Deserialize, Debug)]
struct Mesh {
	primitives: Vec<MeshPrimitive>,
}

#[derive(Deserialize, Debug)]
struct MeshPrimitive {
	attributes: HashMap<String, usize>,
	indices: Option<usize>,
	material: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Node {
	mesh: Option<usize>,
	camera: Option<usize>,
	children: Vec<usize>,
	matrix: Option<[f32; 16]>,
	translation: Option<[f32; 3]>,
	/// `[x, y, z, w]`
	rotation: Option<[f32; 4]>,
	scale: Option<[f32; 3]>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct Material {
	pbr_metallic_roughness: Pbr,
	emissive_factor: [f32; 3],
	extensions: MaterialExtensions,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase", default)]
struct Pbr {
	base_color_factor: [f32; 4],
	metallic_factor: f32,
}

impl Default for Pbr {
	fn default() -> Pbr {
		Pbr { base_color_factor: [1.0; 4], metallic_factor: 1.0 }
	}
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct MaterialExtensions {
	#[serde(rename = "KHR_materials_emissive_strength")]
	emissive_strength: Option<EmissiveStrength>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EmissiveStrength {
	emissive_strength: f32,
}

#[derive(Deserialize, Debug)]
struct Camera {
	perspective: Option<Perspective>,
}

#[derive(Deserialize, Debug)]
struct Perspective {
	yfov: f32,
}

fn get<'a, T>(items: &'a [T], index: usize, kind: &'static str) -> Result<&'a T> {
	items.get(index).ok_or(SceneError::IndexOutOfBounds { kind, index })
}

/// Load a `.gltf` file, resolving buffers relative to its directory
pub fn load<P: AsRef<Path>>(path: P) -> Result<SceneDescription> {
	let path = path.as_ref();
	let json = fs::read_to_string(path)?;
	let dir = path.parent().unwrap_or_else(|| Path::new("."));
	load_document(&json, dir)
}

pub fn load_document(json: &str, dir: &Path) -> Result<SceneDescription> {
	let doc: Document = serde_json::from_str(json)?;

	let buffers = doc.buffers.iter()
		.enumerate()
		.map(|(i, b)| read_buffer(dir, i, b))
		.collect::<Result<Vec<_>>>()?;
	let world = world_transforms(&doc.nodes)?;

	let mut scene = SceneDescription::default();
	let mut degenerate = 0;
	for (node, transform) in doc.nodes.iter().zip(&world) {
		let mesh = match node.mesh {
			Some(i) => get(&doc.meshes, i, "mesh")?,
			None => continue,
		};
		for prim in &mesh.primitives {
			let surface = match prim.material {
				Some(i) => Surface::from(get(&doc.materials, i, "material")?),
				None => Surface::default(),
			};

			let position = *prim.attributes.get("POSITION")
				.ok_or_else(|| SceneError::InvalidDocument("mesh primitive without POSITION".to_string()))?;
			let positions = read_positions(&doc, &buffers, position)?;
			let indices = match prim.indices {
				Some(i) => read_indices(&doc, &buffers, i)?,
				None => (0..positions.len() as u32).collect(),
			};

			for tri in indices.chunks_exact(3) {
				let mut v = [Vec3::zero(); 3];
				for (k, &i) in tri.iter().enumerate() {
					v[k] = transform.transform_point(*get(&positions, i as usize, "vertex")?);
				}
				if Vec3::cross(v[1] - v[0], v[2] - v[0]).length_squared() == 0.0 {
					degenerate += 1;
					continue;
				}
				scene.primitives.push(surface.apply(Primitive::triangle(v[0], v[1], v[2])));
			}
		}
	}
	if degenerate > 0 {
		log::debug!("skipped {} degenerate triangles", degenerate);
	}

	if let Some((node, transform)) = doc.nodes.iter().zip(&world).find(|(n, _)| n.camera.is_some()) {
		let camera = get(&doc.cameras, node.camera.unwrap_or_default(), "camera")?;
		let perspective = camera.perspective.as_ref()
			.ok_or_else(|| SceneError::InvalidDocument("only perspective cameras are supported".to_string()))?;
		let position = transform.transform_point(Vec3::zero());
		let c = &mut scene.camera;
		c.position = position;
		c.right = transform.transform_point(Vec3::new(1.0, 0.0, 0.0)) - position;
		c.up = transform.transform_point(Vec3::new(0.0, 1.0, 0.0)) - position;
		c.forward = transform.transform_point(Vec3::new(0.0, 0.0, -1.0)) - position;
		c.fov = Fov::Y(perspective.yfov);
	}

	Ok(scene)
}

fn read_buffer(dir: &Path, index: usize, buffer: &Buffer) -> Result<Vec<u8>> {
	let uri = buffer.uri.as_ref()
		.ok_or_else(|| SceneError::InvalidDocument(format!("buffer {} has no uri", index)))?;
	if uri.starts_with("data:") {
		return Err(SceneError::InvalidDocument("embedded buffers are not supported".to_string()));
	}
	let data = fs::read(dir.join(uri))?;
	if data.len() < buffer.byte_length {
		return Err(SceneError::TruncatedBuffer { index, needed: buffer.byte_length, len: data.len() });
	}
	Ok(data)
}

/// Bytes of an accessor's view starting at its first element, with the
/// element stride
fn accessor_bytes<'a>(doc: &Document, buffers: &'a [Vec<u8>], accessor: &Accessor, elem_size: usize) -> Result<(&'a [u8], usize)> {
	let view_index = accessor.buffer_view
		.ok_or_else(|| SceneError::UnsupportedAccessor("sparse or empty accessor".to_string()))?;
	let view = get(&doc.buffer_views, view_index, "bufferView")?;
	let buffer = get(buffers, view.buffer, "buffer")?;
	let stride = view.byte_stride.unwrap_or(elem_size);

	// counts and offsets come from the file, so overflow means truncation
	let span = match accessor.count {
		0 => Some(0),
		n => stride.checked_mul(n - 1).and_then(|s| s.checked_add(elem_size)),
	};
	let needed = span.and_then(|s| s.checked_add(accessor.byte_offset));
	let end = view.byte_offset.checked_add(view.byte_length);
	match (needed, end) {
		(Some(needed), Some(end)) if needed <= view.byte_length && end <= buffer.len() => {
			let start = view.byte_offset + accessor.byte_offset;
			Ok((&buffer[start..end], stride))
		}
		(needed, _) => Err(SceneError::TruncatedBuffer {
			index: view.buffer,
			needed: needed
				.and_then(|n| n.max(view.byte_length).checked_add(view.byte_offset))
				.unwrap_or(usize::MAX),
			len: buffer.len(),
		}),
	}
}

fn read_positions(doc: &Document, buffers: &[Vec<u8>], index: usize) -> Result<Vec<Vec3>> {
	let accessor = get(&doc.accessors, index, "accessor")?;
	if accessor.component_type != FLOAT || accessor.kind != "VEC3" {
		return Err(SceneError::UnsupportedAccessor(format!(
			"positions must be float VEC3, got {} {}", accessor.component_type, accessor.kind)));
	}
	let (bytes, stride) = accessor_bytes(doc, buffers, accessor, 12)?;
	(0..accessor.count)
		.map(|i| -> Result<Vec3> {
			let mut r = Cursor::new(&bytes[i * stride..]);
			Ok(Vec3::new(r.read_f32::<LittleEndian>()?, r.read_f32::<LittleEndian>()?, r.read_f32::<LittleEndian>()?))
		})
		.collect()
}

fn read_indices(doc: &Document, buffers: &[Vec<u8>], index: usize) -> Result<Vec<u32>> {
	let accessor = get(&doc.accessors, index, "accessor")?;
	if accessor.kind != "SCALAR" {
		return Err(SceneError::UnsupportedAccessor(format!("indices must be SCALAR, got {}", accessor.kind)));
	}
	let size = match accessor.component_type {
		UNSIGNED_BYTE => 1,
		UNSIGNED_SHORT => 2,
		UNSIGNED_INT => 4,
		t => return Err(SceneError::UnsupportedAccessor(format!("index component type {}", t))),
	};
	let (bytes, stride) = accessor_bytes(doc, buffers, accessor, size)?;
	(0..accessor.count)
		.map(|i| -> Result<u32> {
			let mut r = Cursor::new(&bytes[i * stride..]);
			Ok(match size {
				1 => r.read_u8()? as u32,
				2 => r.read_u16::<LittleEndian>()? as u32,
				_ => r.read_u32::<LittleEndian>()?,
			})
		})
		.collect()
}

fn local_transform(node: &Node) -> Mat4 {
	if let Some(ref m) = node.matrix {
		return Mat4::from_column_major(m);
	}
	let t = node.translation.map_or(Vec3::zero(), Vec3::from);
	let r = node.rotation.map_or(Quat::identity(), |[x, y, z, w]| Quat::new(x, y, z, w).normalized());
	let s = node.scale.map_or(Vec3::thrice(1.0), Vec3::from);
	Mat4::from_trs(t, r, s)
}

/// Product of the local transforms from the root down to each node
fn world_transforms(nodes: &[Node]) -> Result<Vec<Mat4>> {
	let mut parent = vec![None; nodes.len()];
	for (i, node) in nodes.iter().enumerate() {
		for &child in &node.children {
			match parent.get_mut(child) {
				None => return Err(SceneError::IndexOutOfBounds { kind: "node", index: child }),
				Some(Some(_)) => return Err(SceneError::InvalidDocument(format!("node {} has several parents", child))),
				Some(p) => *p = Some(i),
			}
		}
	}

	let local: Vec<Mat4> = nodes.iter().map(local_transform).collect();
	let mut world = Vec::with_capacity(nodes.len());
	for i in 0..nodes.len() {
		let mut m = local[i];
		let mut current = i;
		let mut depth = 0;
		while let Some(p) = parent[current] {
			depth += 1;
			if depth > nodes.len() {
				return Err(SceneError::InvalidDocument(format!("node {} is part of a cycle", i)));
			}
			m = local[p] * m;
			current = p;
		}
		world.push(m);
	}
	Ok(world)
}

/// Shading attributes shared by every triangle of a mesh primitive
#[derive(Copy, Clone, Debug)]
struct Surface {
	kind: Kind,
	color: Vec3,
	emission: Vec3,
}

impl Default for Surface {
	fn default() -> Surface {
		Surface { kind: Kind::Diffuse, color: Vec3::thrice(1.0), emission: Vec3::zero() }
	}
}

impl<'a> From<&'a Material> for Surface {
	fn from(m: &Material) -> Surface {
		let [r, g, b, alpha] = m.pbr_metallic_roughness.base_color_factor;
		let strength = m.extensions.emissive_strength.as_ref().map_or(1.0, |e| e.emissive_strength);
		let kind = if alpha < 1.0 {
			Kind::Dielectric { ior: GLASS_IOR }
		} else if m.pbr_metallic_roughness.metallic_factor > 0.0 {
			Kind::Metallic
		} else {
			Kind::Diffuse
		};
		Surface { kind, color: Vec3::new(r, g, b), emission: Vec3::from(m.emissive_factor) * strength }
	}
}

impl Surface {
	fn apply(self, p: Primitive) -> Primitive {
		p.with_material(self.kind).with_color(self.color).with_emission(self.emission)
	}
}
