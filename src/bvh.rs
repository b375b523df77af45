use time::PreciseTime;

use crate::geometry::Intersection;
use crate::math::*;
use crate::primitive::Primitive;

/// Bounding volume hierarchy over handles into a primitive arena.
///
/// Nodes live in a flat array, children being appended in construction
/// order. Leaves cover a contiguous range of `items`, which is the input
/// handle list permuted during the build.
pub struct BVH {
	nodes: Vec<Node>,
	items: Vec<usize>,
}

pub struct Node {
	pub bbox: AABB,
	pub kind: NodeKind,
}

pub enum NodeKind {
	Leaf { first: usize, count: usize },
	Split { left: usize, right: usize },
}

/// Best partition found by the surface area heuristic
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Split {
	pub axis: Axis,
	/// Number of items going to the left child
	pub index: usize,
	pub cost: f32,
}

/// Build-time record of an item
#[derive(Copy, Clone)]
struct Entry {
	item: usize,
	bbox: AABB,
	centroid: Vec3,
}

impl BVH {
	/// Build over `items`, each one an index into `primitives`
	pub fn build(primitives: &[Primitive], items: Vec<usize>) -> BVH {
		let start = PreciseTime::now();

		let mut entries: Vec<Entry> = items.iter()
			.map(|&item| {
				let bbox = primitives[item].aabb();
				Entry { item, bbox, centroid: bbox.center() }
			})
			.collect();

		let mut nodes = Vec::with_capacity(2 * entries.len());
		build_rec(&mut nodes, &mut entries, 0);
		let items = entries.iter().map(|e| e.item).collect();

		let end = PreciseTime::now();
		log::debug!("BVH built over {} primitives ({} nodes) in {} ms",
			entries.len(), nodes.len(), start.to(end).num_milliseconds());

		BVH { nodes, items }
	}

	pub fn root(&self) -> &Node {
		&self.nodes[0]
	}

	pub fn node(&self, id: usize) -> &Node {
		&self.nodes[id]
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Item handles in leaf order
	pub fn items(&self) -> &[usize] {
		&self.items
	}

	/// Closest hit among the indexed primitives, at most `max_distance` away
	pub fn intersect<'a>(&self, primitives: &'a [Primitive], ray: Ray, max_distance: f32) -> Option<Intersection<'a>> {
		let mut best = None;
		let mut min_distance = max_distance;
		self.intersect_rec(primitives, ray, 0, &mut min_distance, &mut best);
		best
	}

	fn intersect_rec<'a>(&self, primitives: &'a [Primitive], ray: Ray, id: usize,
		min_distance: &mut f32, best: &mut Option<Intersection<'a>>)
	{
		let node = &self.nodes[id];
		match node.bbox.intersect(ray) {
			None => return,
			Some(hit) if hit.distance > *min_distance && !hit.inside => return,
			Some(_) => {}
		}

		match node.kind {
			NodeKind::Split { left, right } => {
				self.intersect_rec(primitives, ray, left, min_distance, best);
				self.intersect_rec(primitives, ray, right, min_distance, best);
			}
			NodeKind::Leaf { first, count } => {
				for &item in &self.items[first..first + count] {
					if let Some(its) = primitives[item].intersect(ray) {
						if its.distance < *min_distance {
							*min_distance = its.distance;
							*best = Some(its);
						}
					}
				}
			}
		}
	}
}

/// Cost of keeping `count` items with bounds `bbox` in a single leaf
pub fn leaf_cost(bbox: &AABB, count: usize) -> f32 {
	bbox.surface_area() * count as f32
}

fn build_rec(nodes: &mut Vec<Node>, entries: &mut [Entry], first: usize) -> usize {
	let count = entries.len();
	let mut bbox = AABB::empty();
	for e in entries.iter() {
		bbox.extend(&e.bbox);
	}

	let id = nodes.len();
	nodes.push(Node { bbox, kind: NodeKind::Leaf { first, count } });
	if count <= 1 {
		return id;
	}

	let split = match find_split(entries, &bbox) {
		// couldn't find a split that reduces the cost, keep the leaf
		None => return id,
		Some(split) => split,
	};

	sort_by_centroid(entries, split.axis);
	let (left_entries, right_entries) = entries.split_at_mut(split.index);
	let left = build_rec(nodes, left_entries, first);
	let right = build_rec(nodes, right_entries, first + split.index);
	nodes[id].kind = NodeKind::Split { left, right };
	id
}

/// Search all axes for the split minimising `SA(left)·n_left + SA(right)·n_right`.
///
/// Returns `None` unless the best split is strictly cheaper than a leaf.
/// Leaves `entries` sorted along the last axis tried.
fn find_split(entries: &mut [Entry], bbox: &AABB) -> Option<Split> {
	let count = entries.len();
	let mut best: Option<Split> = None;
	let mut left_cost = vec![0.0; count + 1];

	for &axis in &Axis::ALL {
		sort_by_centroid(entries, axis);

		// left_cost[j]: cost of the first j items
		let mut acc = AABB::empty();
		for (j, e) in entries.iter().enumerate() {
			acc.extend(&e.bbox);
			left_cost[j + 1] = leaf_cost(&acc, j + 1);
		}

		let mut acc = AABB::empty();
		for j in (1..count).rev() {
			acc.extend(&entries[j].bbox);
			let cost = left_cost[j] + leaf_cost(&acc, count - j);
			if best.map_or(true, |b| cost < b.cost) {
				best = Some(Split { axis, index: j, cost });
			}
		}
	}

	best.filter(|s| s.cost < leaf_cost(bbox, count))
}

fn sort_by_centroid(entries: &mut [Entry], axis: Axis) {
	entries.sort_by(|a, b| {
		a.centroid[axis].partial_cmp(&b.centroid[axis]).expect("centroid is NaN")
	});
}
