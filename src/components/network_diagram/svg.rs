use std::cell::Cell;

use log::warn;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use super::layout::{PlacedEdge, PlacedLabel, PlacedNode};
use super::sync::{Arrowhead, EdgeStyle, MARKER_SIZE, MARKER_VIEW, NodeStyle, SceneBackend};
use super::types::Viewport;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

thread_local! {
	static NEXT_MARKER: Cell<u32> = const { Cell::new(0) };
}

/// Retained SVG scene: one group per element kind, stacked edges, nodes,
/// labels so that nodes always cover the edges.
pub struct SvgBackend {
	document: Document,
	root: Element,
	edges: Element,
	nodes: Element,
	labels: Element,
	marker: Element,
	marker_path: Element,
	marker_url: String,
}

fn set(el: &Element, name: &str, value: impl ToString) {
	let _ = el.set_attribute(name, &value.to_string());
}

impl SvgBackend {
	/// Takes over `root`, clearing anything already drawn in it.
	pub fn new(root: Element) -> Result<Self, JsValue> {
		let document = root
			.owner_document()
			.ok_or_else(|| JsValue::from_str("svg root is detached"))?;
		root.set_inner_html("");
		set(&root, "xmlns", SVG_NS);

		let create = |tag: &str| document.create_element_ns(Some(SVG_NS), tag);
		let defs = create("defs")?;
		let marker = create("marker")?;
		let marker_path = create("path")?;
		let marker_id = NEXT_MARKER.with(|n| {
			n.set(n.get() + 1);
			format!("visualnet-arrow-{}", n.get())
		});
		set(&marker, "id", &marker_id);
		set(&marker, "viewBox", format!("0 -5 {MARKER_VIEW} {MARKER_VIEW}"));
		set(&marker, "markerWidth", MARKER_SIZE);
		set(&marker, "markerHeight", MARKER_SIZE);
		set(&marker, "markerUnits", "userSpaceOnUse");
		set(&marker, "orient", "auto");
		set(&marker_path, "d", "M0,-5L10,0L0,5");
		marker.append_child(&marker_path)?;
		defs.append_child(&marker)?;
		root.append_child(&defs)?;

		let group = |class: &str| -> Result<Element, JsValue> {
			let g = create("g")?;
			set(&g, "class", class);
			root.append_child(&g)?;
			Ok(g)
		};
		let edges = group("links")?;
		let nodes = group("nodes")?;
		let labels = group("labels")?;

		Ok(Self {
			document,
			root,
			edges,
			nodes,
			labels,
			marker,
			marker_path,
			marker_url: format!("url(#{marker_id})"),
		})
	}

	/// Sizes the root element to the viewport.
	pub fn resize(&self, viewport: Viewport) {
		set(&self.root, "width", viewport.width);
		set(&self.root, "height", viewport.height);
		set(
			&self.root,
			"viewBox",
			format!("0 0 {} {}", viewport.width, viewport.height),
		);
	}

	fn append(&self, parent: &Element, tag: &str, class: &str) -> Option<Element> {
		let el = self
			.document
			.create_element_ns(Some(SVG_NS), tag)
			.and_then(|el| parent.append_child(&el).map(|_| el));
		match el {
			Ok(el) => {
				set(&el, "class", class);
				Some(el)
			}
			Err(e) => {
				warn!("failed to create <{tag}>: {e:?}");
				None
			}
		}
	}
}

fn place_node(el: &Element, node: &PlacedNode) {
	set(el, "x", node.x - node.width / 2.0);
	set(el, "y", node.y - node.height / 2.0);
	set(el, "width", node.width);
	set(el, "height", node.height);
	set(el, "rx", node.corner_radius);
	set(el, "ry", node.corner_radius);
}

fn place_label(el: &Element, label: &PlacedLabel) {
	set(el, "x", label.x);
	set(el, "y", label.y);
	set(el, "text-anchor", label.anchor.as_svg());
	set(el, "font-size", format!("{:.1}px", label.font_size));
	el.set_text_content(Some(&label.text));
}

impl SceneBackend for SvgBackend {
	type Handle = Option<Element>;

	fn create_node(&mut self, node: &PlacedNode) -> Self::Handle {
		let el = self.append(&self.nodes, "rect", "node")?;
		set(&el, "id", &node.key);
		place_node(&el, node);
		Some(el)
	}

	fn update_node(&mut self, handle: &Self::Handle, node: &PlacedNode) {
		if let Some(el) = handle {
			place_node(el, node);
		}
	}

	fn create_edge(&mut self, edge: &PlacedEdge) -> Self::Handle {
		let el = self.append(&self.edges, "path", "link")?;
		set(&el, "fill", "none");
		set(&el, "d", edge.path.to_svg());
		Some(el)
	}

	fn update_edge(&mut self, handle: &Self::Handle, edge: &PlacedEdge) {
		if let Some(el) = handle {
			set(el, "d", edge.path.to_svg());
		}
	}

	fn create_label(&mut self, label: &PlacedLabel) -> Self::Handle {
		let el = self.append(&self.labels, "text", "text")?;
		set(&el, "dy", ".35em");
		place_label(&el, label);
		Some(el)
	}

	fn update_label(&mut self, handle: &Self::Handle, label: &PlacedLabel) {
		if let Some(el) = handle {
			place_label(el, label);
		}
	}

	fn remove(&mut self, handle: Self::Handle) {
		if let Some(el) = handle {
			el.remove();
		}
	}

	fn style_node(&mut self, handle: &Self::Handle, style: &NodeStyle) {
		if let Some(el) = handle {
			set(el, "fill", style.fill);
			set(el, "stroke", style.stroke);
		}
	}

	fn style_edge(&mut self, handle: &Self::Handle, style: &EdgeStyle) {
		let Some(el) = handle else {
			return;
		};
		set(el, "stroke", style.stroke);
		set(el, "stroke-width", style.width);
		set(el, "stroke-opacity", style.opacity);
		if style.arrowhead {
			set(el, "marker-end", &self.marker_url);
		} else {
			let _ = el.remove_attribute("marker-end");
		}
	}

	fn set_arrowhead(&mut self, arrowhead: Option<&Arrowhead>) {
		let Some(a) = arrowhead else {
			return;
		};
		set(&self.marker, "refX", a.ref_x);
		set(&self.marker_path, "stroke", a.stroke);
		match a.fill {
			Some(fill) => set(&self.marker_path, "fill", fill),
			None => set(&self.marker_path, "fill", "none"),
		}
	}
}
