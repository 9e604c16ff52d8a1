//! Keyed reconciliation of a computed [`Layout`] against what is already on
//! screen.
//!
//! The synchronizer owns every rendered element. Elements are matched by key
//! across passes: new keys are created, missing keys removed, and surviving
//! keys updated in place only when their geometry moved. Styling runs as a
//! separate pass that can be repeated without structural changes.

use std::collections::{HashMap, HashSet};

use super::layout::{Layout, PlacedEdge, PlacedLabel, PlacedNode};
use super::params::{ArrowheadStyle, LayoutParams};
use super::scale::{LinearScale, Rgb};

/// Drawing surface the synchronizer drives.
///
/// Implementations must insert new edges behind every node so nodes stay on
/// top regardless of creation order.
pub trait SceneBackend {
	type Handle;

	fn create_node(&mut self, node: &PlacedNode) -> Self::Handle;
	fn update_node(&mut self, handle: &Self::Handle, node: &PlacedNode);
	fn create_edge(&mut self, edge: &PlacedEdge) -> Self::Handle;
	fn update_edge(&mut self, handle: &Self::Handle, edge: &PlacedEdge);
	fn create_label(&mut self, label: &PlacedLabel) -> Self::Handle;
	fn update_label(&mut self, handle: &Self::Handle, label: &PlacedLabel);
	fn remove(&mut self, handle: Self::Handle);

	fn style_node(&mut self, handle: &Self::Handle, style: &NodeStyle);
	fn style_edge(&mut self, handle: &Self::Handle, style: &EdgeStyle);
	/// `None` hides the arrowhead marker.
	fn set_arrowhead(&mut self, arrowhead: Option<&Arrowhead>);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	pub fill: Rgb,
	pub stroke: Rgb,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub stroke: Rgb,
	pub width: f64,
	pub opacity: f64,
	pub arrowhead: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrowhead {
	pub stroke: Rgb,
	/// `None` for the empty (outline) style.
	pub fill: Option<Rgb>,
	/// Distance in marker units that pulls the tip back to the node border.
	pub ref_x: f64,
}

/// Marker geometry: a 10×10 view box drawn 7 px wide.
pub const MARKER_VIEW: f64 = 10.0;
pub const MARKER_SIZE: f64 = 7.0;

pub fn node_style(params: &LayoutParams, node: &PlacedNode) -> NodeStyle {
	NodeStyle {
		fill: if node.is_bias {
			params.bias_node_color
		} else {
			params.node_color
		},
		stroke: params.node_border_color,
	}
}

pub fn edge_style(params: &LayoutParams, weight: f64) -> EdgeStyle {
	let magnitude = weight.abs();
	let width = if params.edge_width_proportional_to_weight {
		LinearScale::new((0.0, 1.0), (0.0, params.edge_width)).apply(magnitude)
	} else {
		params.edge_width
	};
	let opacity = if params.edge_opacity_proportional_to_weight {
		LinearScale::new((0.0, 1.0), (0.0, 1.0)).apply(magnitude)
	} else {
		params.edge_opacity
	};
	let stroke = if params.edge_color_proportional_to_weight {
		params.weight_colors().color(weight)
	} else {
		params.default_color
	};
	EdgeStyle {
		stroke,
		width,
		opacity,
		arrowhead: params.show_arrowheads,
	}
}

pub fn arrowhead(params: &LayoutParams, layout: &Layout) -> Option<Arrowhead> {
	if !params.show_arrowheads {
		return None;
	}
	let radius = params.node_size * layout.fit.scale / 2.0;
	Some(Arrowhead {
		stroke: params.default_color,
		fill: match params.arrowhead_style {
			ArrowheadStyle::Filled => Some(params.default_color),
			ArrowheadStyle::Empty => None,
		},
		ref_x: MARKER_VIEW + radius * MARKER_VIEW / MARKER_SIZE,
	})
}

/// Element counts touched by one sync pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
	pub created: usize,
	pub updated: usize,
	pub unchanged: usize,
	pub removed: usize,
}

struct Rendered<T, S, H> {
	handle: H,
	placed: T,
	style: Option<S>,
}

/// Everything currently on screen, by key.
pub struct VisualState<H> {
	nodes: HashMap<String, Rendered<PlacedNode, NodeStyle, H>>,
	edges: HashMap<String, Rendered<PlacedEdge, EdgeStyle, H>>,
	labels: HashMap<String, Rendered<PlacedLabel, (), H>>,
	arrowhead: Option<Option<Arrowhead>>,
	report: SyncReport,
}

impl<H> Default for VisualState<H> {
	fn default() -> Self {
		Self {
			nodes: HashMap::new(),
			edges: HashMap::new(),
			labels: HashMap::new(),
			arrowhead: None,
			report: SyncReport::default(),
		}
	}
}

/// One kind of keyed element.
trait Element: Clone {
	fn key(&self) -> &str;
	/// True when nothing visible besides styling differs.
	fn same_geometry(&self, other: &Self) -> bool;
	fn create<B: SceneBackend>(&self, backend: &mut B) -> B::Handle;
	fn update<B: SceneBackend>(&self, backend: &mut B, handle: &B::Handle);
}

impl Element for PlacedNode {
	fn key(&self) -> &str {
		&self.key
	}

	fn same_geometry(&self, other: &Self) -> bool {
		(self.x, self.y, self.width, self.height, self.corner_radius)
			== (other.x, other.y, other.width, other.height, other.corner_radius)
	}

	fn create<B: SceneBackend>(&self, backend: &mut B) -> B::Handle {
		backend.create_node(self)
	}

	fn update<B: SceneBackend>(&self, backend: &mut B, handle: &B::Handle) {
		backend.update_node(handle, self)
	}
}

impl Element for PlacedEdge {
	fn key(&self) -> &str {
		&self.key
	}

	fn same_geometry(&self, other: &Self) -> bool {
		self.path == other.path
	}

	fn create<B: SceneBackend>(&self, backend: &mut B) -> B::Handle {
		backend.create_edge(self)
	}

	fn update<B: SceneBackend>(&self, backend: &mut B, handle: &B::Handle) {
		backend.update_edge(handle, self)
	}
}

impl Element for PlacedLabel {
	fn key(&self) -> &str {
		&self.key
	}

	fn same_geometry(&self, other: &Self) -> bool {
		self == other
	}

	fn create<B: SceneBackend>(&self, backend: &mut B) -> B::Handle {
		backend.create_label(self)
	}

	fn update<B: SceneBackend>(&self, backend: &mut B, handle: &B::Handle) {
		backend.update_label(handle, self)
	}
}

fn reconcile<B: SceneBackend, T: Element, S>(
	backend: &mut B,
	rendered: &mut HashMap<String, Rendered<T, S, B::Handle>>,
	incoming: &[T],
	report: &mut SyncReport,
) {
	let live: HashSet<&str> = incoming.iter().map(Element::key).collect();
	let stale: Vec<String> = rendered
		.keys()
		.filter(|k| !live.contains(k.as_str()))
		.cloned()
		.collect();
	for key in stale {
		if let Some(old) = rendered.remove(&key) {
			backend.remove(old.handle);
			report.removed += 1;
		}
	}

	for item in incoming {
		match rendered.get_mut(item.key()) {
			Some(existing) if existing.placed.same_geometry(item) => {
				existing.placed = item.clone();
				report.unchanged += 1;
			}
			Some(existing) => {
				item.update(backend, &existing.handle);
				existing.placed = item.clone();
				report.updated += 1;
			}
			None => {
				let handle = item.create(backend);
				rendered.insert(
					item.key().to_string(),
					Rendered {
						handle,
						placed: item.clone(),
						style: None,
					},
				);
				report.created += 1;
			}
		}
	}
}

impl<H> VisualState<H> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn report(&self) -> SyncReport {
		self.report
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn label_count(&self) -> usize {
		self.labels.len()
	}

	pub fn node_handle(&self, key: &str) -> Option<&H> {
		self.nodes.get(key).map(|r| &r.handle)
	}

	pub fn edge_handle(&self, key: &str) -> Option<&H> {
		self.edges.get(key).map(|r| &r.handle)
	}

	/// Brings the scene in line with `layout`, then restyles it.
	pub fn sync<B>(mut self, backend: &mut B, layout: &Layout, params: &LayoutParams) -> Self
	where
		B: SceneBackend<Handle = H>,
	{
		let mut report = SyncReport::default();
		reconcile(backend, &mut self.edges, &layout.edges, &mut report);
		reconcile(backend, &mut self.nodes, &layout.nodes, &mut report);
		reconcile(backend, &mut self.labels, &layout.labels, &mut report);
		self.report = report;
		self.restyle(backend, layout, params);
		self
	}

	/// Applies colours, widths and markers. Only elements whose computed
	/// style differs from the last applied one are touched.
	pub fn restyle<B>(&mut self, backend: &mut B, layout: &Layout, params: &LayoutParams)
	where
		B: SceneBackend<Handle = H>,
	{
		let marker = arrowhead(params, layout);
		if self.arrowhead != Some(marker) {
			backend.set_arrowhead(marker.as_ref());
			self.arrowhead = Some(marker);
		}
		for r in self.edges.values_mut() {
			let style = edge_style(params, r.placed.weight);
			if r.style != Some(style) {
				backend.style_edge(&r.handle, &style);
				r.style = Some(style);
			}
		}
		for r in self.nodes.values_mut() {
			let style = node_style(params, &r.placed);
			if r.style != Some(style) {
				backend.style_node(&r.handle, &style);
				r.style = Some(style);
			}
		}
	}

	/// Removes every element, leaving an empty state.
	pub fn clear<B>(self, backend: &mut B)
	where
		B: SceneBackend<Handle = H>,
	{
		let handles = self
			.edges
			.into_values()
			.map(|r| r.handle)
			.chain(self.nodes.into_values().map(|r| r.handle))
			.chain(self.labels.into_values().map(|r| r.handle));
		for handle in handles {
			backend.remove(handle);
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::super::layout::layout;
	use super::super::model::build;
	use super::super::types::{Architecture, Viewport};
	use super::*;

	#[derive(Debug, Clone, PartialEq)]
	enum Op {
		Create(String),
		Update(String),
		Remove(u32),
		StyleNode(u32),
		StyleEdge(u32, EdgeStyle),
		Arrowhead(Option<Arrowhead>),
	}

	#[derive(Default)]
	struct Recorder {
		next: u32,
		ops: Vec<Op>,
		/// Draw order, back to front: (handle, is_edge).
		order: Vec<(u32, bool)>,
	}

	impl Recorder {
		fn take(&mut self) -> Vec<Op> {
			std::mem::take(&mut self.ops)
		}

		fn fresh(&mut self, key: &str) -> u32 {
			self.next += 1;
			self.ops.push(Op::Create(key.to_string()));
			self.next
		}
	}

	impl SceneBackend for Recorder {
		type Handle = u32;

		fn create_node(&mut self, node: &PlacedNode) -> u32 {
			let h = self.fresh(&node.key);
			self.order.push((h, false));
			h
		}

		fn update_node(&mut self, _: &u32, node: &PlacedNode) {
			self.ops.push(Op::Update(node.key.clone()));
		}

		fn create_edge(&mut self, edge: &PlacedEdge) -> u32 {
			let h = self.fresh(&edge.key);
			let first_node = self.order.iter().position(|&(_, e)| !e).unwrap_or(self.order.len());
			self.order.insert(first_node, (h, true));
			h
		}

		fn update_edge(&mut self, _: &u32, edge: &PlacedEdge) {
			self.ops.push(Op::Update(edge.key.clone()));
		}

		fn create_label(&mut self, label: &PlacedLabel) -> u32 {
			self.fresh(&label.key)
		}

		fn update_label(&mut self, _: &u32, label: &PlacedLabel) {
			self.ops.push(Op::Update(label.key.clone()));
		}

		fn remove(&mut self, handle: u32) {
			self.order.retain(|&(h, _)| h != handle);
			self.ops.push(Op::Remove(handle));
		}

		fn style_node(&mut self, handle: &u32, _: &NodeStyle) {
			self.ops.push(Op::StyleNode(*handle));
		}

		fn style_edge(&mut self, handle: &u32, style: &EdgeStyle) {
			self.ops.push(Op::StyleEdge(*handle, *style));
		}

		fn set_arrowhead(&mut self, arrowhead: Option<&Arrowhead>) {
			self.ops.push(Op::Arrowhead(arrowhead.copied()));
		}
	}

	fn layout_for(
		widths: &[usize],
		params: &LayoutParams,
		viewport: Viewport,
		seed: u64,
	) -> Layout {
		let a = Architecture::new(widths.to_vec()).unwrap();
		let model = build(&a, params.build_options(), &mut SmallRng::seed_from_u64(seed));
		layout(&model, &a, params, viewport)
	}

	fn created(ops: &[Op]) -> Vec<String> {
		ops.iter()
			.filter_map(|op| match op {
				Op::Create(k) => Some(k.clone()),
				_ => None,
			})
			.collect()
	}

	#[test]
	fn first_sync_creates_everything() {
		let params = LayoutParams::default().with_bias(true);
		let l = layout_for(&[4, 3, 2], &params, Viewport::DEFAULT, 1);
		let mut backend = Recorder::default();
		let state = VisualState::new().sync(&mut backend, &l, &params);
		assert_eq!(state.node_count(), 9);
		assert_eq!(state.edge_count(), 18);
		assert_eq!(state.label_count(), 3);
		assert_eq!(
			state.report(),
			SyncReport {
				created: 30,
				..SyncReport::default()
			}
		);
	}

	#[test]
	fn identical_layout_is_a_no_op() {
		let params = LayoutParams::default();
		let l = layout_for(&[2, 3, 1], &params, Viewport::DEFAULT, 2);
		let mut backend = Recorder::default();
		let state = VisualState::new().sync(&mut backend, &l, &params);
		backend.take();
		let state = state.sync(&mut backend, &l, &params);
		assert!(backend.take().is_empty());
		let total = state.node_count() + state.edge_count() + state.label_count();
		assert_eq!(state.report().unchanged, total);
	}

	#[test]
	fn resize_updates_positions_without_recreating() {
		let params = LayoutParams::default();
		let mut backend = Recorder::default();
		let small = layout_for(&[3, 4, 2], &params, Viewport::new(500.0, 500.0), 3);
		let state = VisualState::new().sync(&mut backend, &small, &params);
		let handle = *state.node_handle("1_2").unwrap();
		backend.take();

		let wide = layout_for(&[3, 4, 2], &params, Viewport::new(800.0, 300.0), 3);
		let state = state.sync(&mut backend, &wide, &params);
		let ops = backend.take();
		assert!(created(&ops).is_empty());
		assert!(!ops.iter().any(|op| matches!(op, Op::Remove(_))));
		assert_eq!(state.report().created, 0);
		assert_eq!(state.report().removed, 0);
		assert!(state.report().updated > 0);
		assert_eq!(state.node_handle("1_2"), Some(&handle));
	}

	#[test]
	fn growing_a_layer_keeps_existing_elements() {
		let params = LayoutParams::default();
		let mut backend = Recorder::default();
		let before = layout_for(&[1, 1, 1], &params, Viewport::DEFAULT, 4);
		let state = VisualState::new().sync(&mut backend, &before, &params);
		let kept = *state.node_handle("1_0").unwrap();
		backend.take();

		let after = layout_for(&[1, 2, 1], &params, Viewport::DEFAULT, 5);
		let state = state.sync(&mut backend, &after, &params);
		let mut new_keys = created(&backend.take());
		new_keys.sort();
		assert_eq!(new_keys, vec!["0_0-1_1", "1_1", "1_1-2_0"]);
		assert_eq!(state.node_handle("1_0"), Some(&kept));
		assert_eq!(state.report().removed, 0);
		assert!(state.edge_handle("1_0-2_0").is_some());
	}

	#[test]
	fn shrinking_removes_stale_elements() {
		let params = LayoutParams::default().with_bias(true);
		let mut backend = Recorder::default();
		let before = layout_for(&[2, 3, 1], &params, Viewport::DEFAULT, 6);
		let after = layout_for(&[2, 2, 1], &params, Viewport::DEFAULT, 7);
		let state = VisualState::new().sync(&mut backend, &before, &params);
		let state = state.sync(&mut backend, &after, &params);
		// node 1_2 and its 2 incoming plus 1 outgoing edge
		assert_eq!(state.report().removed, 4);
		assert!(state.node_handle("1_2").is_none());
		assert_eq!(state.node_count(), 5);
	}

	#[test]
	fn edges_stay_behind_nodes() {
		let params = LayoutParams::default();
		let mut backend = Recorder::default();
		let first = layout_for(&[2, 2], &params, Viewport::DEFAULT, 8);
		let state = VisualState::new().sync(&mut backend, &first, &params);
		let wider = layout_for(&[2, 4], &params, Viewport::DEFAULT, 9);
		let _ = state.sync(&mut backend, &wider, &params);
		let first_node = backend.order.iter().position(|&(_, e)| !e).unwrap();
		assert!(backend.order[first_node..].iter().all(|&(_, e)| !e));
	}

	#[test]
	fn restyle_is_idempotent() {
		let params = LayoutParams::default();
		let l = layout_for(&[3, 3], &params, Viewport::DEFAULT, 10);
		let mut backend = Recorder::default();
		let mut state = VisualState::new().sync(&mut backend, &l, &params);
		backend.take();
		state.restyle(&mut backend, &l, &params);
		assert!(backend.take().is_empty());

		let arrows = LayoutParams {
			show_arrowheads: true,
			arrowhead_style: ArrowheadStyle::Filled,
			..params
		};
		state.restyle(&mut backend, &l, &arrows);
		let ops = backend.take();
		let marker = ops.iter().find_map(|op| match op {
			Op::Arrowhead(a) => Some(*a),
			_ => None,
		});
		let marker = marker.flatten().unwrap();
		assert_eq!(marker.fill, Some(arrows.default_color));
		let edge_styles = ops
			.iter()
			.filter(|op| matches!(op, Op::StyleEdge(_, s) if s.arrowhead))
			.count();
		assert_eq!(edge_styles, 9);
	}

	#[test]
	fn edge_style_follows_weight() {
		let params = LayoutParams {
			edge_color_proportional_to_weight: true,
			edge_width_proportional_to_weight: true,
			edge_opacity_proportional_to_weight: true,
			..LayoutParams::default()
		};
		let strong = edge_style(&params, 1.0);
		assert_eq!(strong.stroke, params.positive_color);
		assert_eq!(strong.width, params.edge_width);
		assert_eq!(strong.opacity, 1.0);

		let negative = edge_style(&params, -1.0);
		assert_eq!(negative.stroke, params.negative_color);

		let zero = edge_style(&params, 0.0);
		assert_eq!(zero.stroke, Rgb::WHITE);
		assert_eq!(zero.width, 0.0);

		let plain = edge_style(&LayoutParams::default(), -0.3);
		assert_eq!(plain.stroke, LayoutParams::default().default_color);
		assert_eq!(plain.width, 0.5);
	}

	#[test]
	fn clear_removes_everything() {
		let params = LayoutParams::default();
		let mut backend = Recorder::default();
		let placed = layout_for(&[2, 2], &params, Viewport::DEFAULT, 11);
		let state = VisualState::new().sync(&mut backend, &placed, &params);
		state.clear(&mut backend);
		assert!(backend.order.is_empty());
	}
}
