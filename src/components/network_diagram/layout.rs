use std::fmt::Write as _;

use super::params::{Direction, EdgeShape, FitMode, LayoutParams, NodeShape};
use super::types::{Architecture, GraphModel, NodeId, Viewport};

/// Width of a compressed input layer, in node sizes.
pub const INPUT_WIDTH_FACTOR: f64 = 16.0;
/// Distance between the widest layer's edge and the layer labels.
pub const LABEL_MARGIN: f64 = 20.0;
/// Rough glyph width relative to font size, for label bounds.
const GLYPH_WIDTH: f64 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgePath {
	Line { from: Point, to: Point },
	Cubic { from: Point, c1: Point, c2: Point, to: Point },
}

impl EdgePath {
	#[cfg(test)]
	pub fn points(&self) -> Vec<Point> {
		match *self {
			EdgePath::Line { from, to } => vec![from, to],
			EdgePath::Cubic { from, c1, c2, to } => vec![from, c1, c2, to],
		}
	}

	/// SVG path data.
	pub fn to_svg(&self) -> String {
		let mut d = String::new();
		match *self {
			EdgePath::Line { from, to } => {
				let _ = write!(d, "M{:.2},{:.2} L{:.2},{:.2}", from.x, from.y, to.x, to.y);
			}
			EdgePath::Cubic { from, c1, c2, to } => {
				let _ = write!(
					d,
					"M{:.2},{:.2} C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
					from.x, from.y, c1.x, c1.y, c2.x, c2.y, to.x, to.y
				);
			}
		}
		d
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
	#[default]
	Start,
	Middle,
}

impl TextAnchor {
	pub fn as_svg(&self) -> &'static str {
		match self {
			TextAnchor::Start => "start",
			TextAnchor::Middle => "middle",
		}
	}
}

/// A node in viewport pixels; `x`/`y` is the centre.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedNode {
	pub key: String,
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	/// Rounds a square node into a circle (or a wide node into a pill).
	pub corner_radius: f64,
	pub is_bias: bool,
	pub representative: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedEdge {
	pub key: String,
	pub source: NodeId,
	pub target: NodeId,
	pub weight: f64,
	pub path: EdgePath,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLabel {
	pub key: String,
	pub layer: usize,
	pub text: String,
	pub x: f64,
	pub y: f64,
	pub anchor: TextAnchor,
	pub font_size: f64,
}

/// Uniform scale and translation from diagram space into the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitTransform {
	pub scale: f64,
	pub translate_x: f64,
	pub translate_y: f64,
}

impl FitTransform {
	pub fn apply(&self, p: Point) -> Point {
		Point::new(p.x * self.scale + self.translate_x, p.y * self.scale + self.translate_y)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
	pub nodes: Vec<PlacedNode>,
	pub edges: Vec<PlacedEdge>,
	pub labels: Vec<PlacedLabel>,
	/// Per-layer centring offset against the widest layer, unscaled.
	pub layer_offsets: Vec<f64>,
	/// Cross-axis span of the widest layer, unscaled.
	pub largest_extent: f64,
	/// Unscaled bounds of everything drawn.
	pub diagram_width: f64,
	pub diagram_height: f64,
	pub fit: FitTransform,
	pub viewport: Viewport,
}

/// Axis-aligned bounds accumulated in diagram space.
#[derive(Clone, Copy, Debug)]
struct Bounds {
	min: Point,
	max: Point,
}

impl Bounds {
	fn empty() -> Self {
		Self {
			min: Point::new(f64::INFINITY, f64::INFINITY),
			max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
		}
	}

	fn include(&mut self, centre: Point, width: f64, height: f64) {
		self.min.x = self.min.x.min(centre.x - width / 2.0);
		self.min.y = self.min.y.min(centre.y - height / 2.0);
		self.max.x = self.max.x.max(centre.x + width / 2.0);
		self.max.y = self.max.y.max(centre.y + height / 2.0);
	}

	fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	fn height(&self) -> f64 {
		self.max.y - self.min.y
	}
}

/// Per-layer geometry along the cross axis, in diagram space.
struct LayerGeometry {
	extent: f64,
	offset: f64,
	gap: f64,
	drawn: usize,
	compressed: bool,
}

/// Places every node, edge and label of `model` inside `viewport`.
///
/// `architecture` must be the one `model` was built from. The result depends
/// only on the arguments; edge weights are carried through untouched.
pub fn layout(
	model: &GraphModel,
	architecture: &Architecture,
	params: &LayoutParams,
	viewport: Viewport,
) -> Layout {
	let params = params.clone().sanitized();
	let viewport = viewport.or_default();
	let ns = params.node_size;
	let layers = architecture.len();

	let mut geometry: Vec<LayerGeometry> = (0..layers)
		.map(|i| {
			let drawn = model.drawn_width(architecture, i);
			let compressed = i == 0 && model.compressed_input.is_some();
			let gap = params.gap(i);
			let extent = if compressed {
				ns * INPUT_WIDTH_FACTOR
			} else {
				drawn as f64 * ns + (drawn as f64 - 1.0) * gap
			};
			LayerGeometry {
				extent,
				offset: 0.0,
				gap,
				drawn,
				compressed,
			}
		})
		.collect();
	let largest = geometry.iter().map(|g| g.extent).fold(ns, f64::max);
	for g in &mut geometry {
		g.offset = (largest - g.extent) / 2.0;
	}

	let layer_step = params.between_layers + ns;
	let main_shift = (layers as f64 - 1.0) * layer_step / 2.0;
	let main = |layer: usize| layer as f64 * layer_step - main_shift;

	// centre of node `index` along the cross axis, plus its cross-axis size
	let cross = |layer: usize, index: usize| -> (f64, f64) {
		let g = &geometry[layer];
		if g.compressed {
			let slot = g.extent / g.drawn as f64;
			let c = g.offset + (index as f64 + 0.5) * slot - largest / 2.0;
			(c, (slot - g.gap).max(ns))
		} else {
			(g.offset + index as f64 * (ns + g.gap) - largest / 2.0 + ns / 2.0, ns)
		}
	};

	let orient = |main: f64, cross: f64| match params.direction {
		Direction::TopToBottom => Point::new(cross, main),
		Direction::LeftToRight => Point::new(main, cross),
	};
	let oriented_size = |cross_size: f64| match params.direction {
		Direction::TopToBottom => (cross_size, ns),
		Direction::LeftToRight => (ns, cross_size),
	};
	let centre = |id: NodeId| orient(main(id.layer), cross(id.layer, id.index).0);

	let mut bounds = Bounds::empty();
	let mut nodes: Vec<PlacedNode> = model
		.nodes
		.iter()
		.map(|n| {
			let (_, cross_size) = cross(n.id.layer, n.id.index);
			let (width, height) = oriented_size(cross_size);
			let p = centre(n.id);
			bounds.include(p, width, height);
			PlacedNode {
				key: n.key(),
				id: n.id,
				x: p.x,
				y: p.y,
				width,
				height,
				corner_radius: 0.0,
				is_bias: n.is_bias,
				representative: n.representative,
			}
		})
		.collect();

	let font = params.label_font_size;
	let mut labels: Vec<PlacedLabel> = if params.show_labels {
		model
			.labels
			.iter()
			.map(|l| {
				let text_width = l.text.chars().count() as f64 * font * GLYPH_WIDTH;
				let (p, anchor, text_centre) = match params.direction {
					Direction::TopToBottom => {
						let p = Point::new(largest / 2.0 + LABEL_MARGIN, main(l.layer));
						(p, TextAnchor::Start, Point::new(p.x + text_width / 2.0, p.y))
					}
					Direction::LeftToRight => {
						let p = Point::new(main(l.layer), largest / 2.0 + LABEL_MARGIN);
						(p, TextAnchor::Middle, p)
					}
				};
				bounds.include(text_centre, text_width, font);
				PlacedLabel {
					key: l.key(),
					layer: l.layer,
					text: l.text.clone(),
					x: p.x,
					y: p.y,
					anchor,
					font_size: font,
				}
			})
			.collect()
	} else {
		Vec::new()
	};

	let (diagram_width, diagram_height) = (bounds.width(), bounds.height());
	let scale = match params.fit {
		FitMode::Contain => (viewport.width / diagram_width)
			.min(viewport.height / diagram_height)
			.min(params.max_scale),
		FitMode::Center => 1.0,
	};
	let fit = FitTransform {
		scale,
		translate_x: (viewport.width - diagram_width * scale) / 2.0 - bounds.min.x * scale,
		translate_y: (viewport.height - diagram_height * scale) / 2.0 - bounds.min.y * scale,
	};

	for n in &mut nodes {
		let p = fit.apply(Point::new(n.x, n.y));
		(n.x, n.y) = (p.x, p.y);
		n.width *= scale;
		n.height *= scale;
		n.corner_radius = match params.node_shape {
			NodeShape::Circle => n.width.min(n.height) / 2.0,
			NodeShape::Square => 0.0,
		};
	}
	for l in &mut labels {
		let p = fit.apply(Point::new(l.x, l.y));
		(l.x, l.y) = (p.x, p.y);
		l.font_size *= scale;
	}

	let edges = model
		.edges
		.iter()
		.map(|e| {
			let from = fit.apply(centre(e.source));
			let to = fit.apply(centre(e.target));
			let path = match params.edge_shape {
				EdgeShape::Straight => EdgePath::Line { from, to },
				EdgeShape::Bezier => {
					let (c1, c2) = match params.direction {
						Direction::TopToBottom => {
							let mid = (from.y + to.y) / 2.0;
							(Point::new(from.x, mid), Point::new(to.x, mid))
						}
						Direction::LeftToRight => {
							let mid = (from.x + to.x) / 2.0;
							(Point::new(mid, from.y), Point::new(mid, to.y))
						}
					};
					EdgePath::Cubic { from, c1, c2, to }
				}
			};
			PlacedEdge {
				key: e.key(),
				source: e.source,
				target: e.target,
				weight: e.weight,
				path,
			}
		})
		.collect();

	Layout {
		nodes,
		edges,
		labels,
		layer_offsets: geometry.iter().map(|g| g.offset).collect(),
		largest_extent: largest,
		diagram_width,
		diagram_height,
		fit,
		viewport,
	}
}
