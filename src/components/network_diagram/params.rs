//! Layout and style parameters, threaded by value through build, layout and
//! sync.

use serde::{Deserialize, Serialize};

use super::model::{BuildOptions, LabelStyle};
use super::scale::{Rgb, WeightColorScale};

/// Smallest node size the layout accepts; keeps every extent positive.
pub const MIN_NODE_SIZE: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
	/// Layers stacked vertically, input at the top.
	#[default]
	TopToBottom,
	/// Layers side by side, input on the left.
	LeftToRight,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeShape {
	#[default]
	Circle,
	Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeShape {
	#[default]
	Straight,
	Bezier,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowheadStyle {
	Filled,
	#[default]
	Empty,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
	/// Scale the diagram to fill the viewport, keeping its aspect ratio.
	#[default]
	Contain,
	/// Draw at natural size, centred.
	Center,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
	pub node_size: f64,
	pub node_shape: NodeShape,
	/// Gap between nodes of layer `i`; layers past the end use the last entry.
	pub between_nodes_in_layer: Vec<f64>,
	pub between_layers: f64,
	pub direction: Direction,
	pub edge_shape: EdgeShape,
	pub fit: FitMode,
	pub max_scale: f64,

	pub edge_width: f64,
	pub edge_width_proportional_to_weight: bool,
	pub edge_opacity: f64,
	pub edge_opacity_proportional_to_weight: bool,
	pub edge_color_proportional_to_weight: bool,
	pub negative_color: Rgb,
	pub positive_color: Rgb,
	/// Colour at weight 0; `None` interpolates straight between the ends.
	pub midpoint_color: Option<Rgb>,
	pub default_color: Rgb,
	pub node_color: Rgb,
	pub node_border_color: Rgb,
	pub bias_node_color: Rgb,
	pub show_arrowheads: bool,
	pub arrowhead_style: ArrowheadStyle,

	pub show_labels: bool,
	pub label_style: LabelStyle,
	pub label_font_size: f64,
	pub show_bias: bool,
	pub input_compression: Option<usize>,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			node_size: 20.0,
			node_shape: NodeShape::Circle,
			between_nodes_in_layer: vec![20.0],
			between_layers: 80.0,
			direction: Direction::TopToBottom,
			edge_shape: EdgeShape::Straight,
			fit: FitMode::Contain,
			max_scale: 2.0,
			edge_width: 0.5,
			edge_width_proportional_to_weight: false,
			edge_opacity: 1.0,
			edge_opacity_proportional_to_weight: false,
			edge_color_proportional_to_weight: false,
			negative_color: Rgb::new(0x00, 0x00, 0xff),
			positive_color: Rgb::new(0xff, 0x00, 0x00),
			midpoint_color: Some(Rgb::WHITE),
			default_color: Rgb::new(0x50, 0x50, 0x50),
			node_color: Rgb::WHITE,
			node_border_color: Rgb::new(0x33, 0x33, 0x33),
			bias_node_color: Rgb::new(0xdd, 0xdd, 0xdd),
			show_arrowheads: false,
			arrowhead_style: ArrowheadStyle::Empty,
			show_labels: true,
			label_style: LabelStyle::Role,
			label_font_size: 12.0,
			show_bias: false,
			input_compression: None,
		}
	}
}

impl LayoutParams {
	/// Compact look for the digit classifier: small square nodes, weight
	/// coloured edges and a compressed 784-pixel input layer.
	pub fn mnist() -> Self {
		Self {
			node_size: 10.0,
			node_shape: NodeShape::Square,
			between_nodes_in_layer: vec![2.0],
			between_layers: 60.0,
			max_scale: 1.5,
			edge_color_proportional_to_weight: true,
			negative_color: Rgb::new(0x9e, 0x58, 0xb4),
			positive_color: Rgb::new(0x3b, 0x82, 0xf6),
			midpoint_color: None,
			default_color: Rgb::new(0x71, 0x74, 0xe2),
			show_bias: true,
			input_compression: Some(5),
			..Self::default()
		}
	}

	pub fn with_direction(mut self, direction: Direction) -> Self {
		self.direction = direction;
		self
	}

	pub fn with_edge_shape(mut self, shape: EdgeShape) -> Self {
		self.edge_shape = shape;
		self
	}

	pub fn with_bias(mut self, show_bias: bool) -> Self {
		self.show_bias = show_bias;
		self
	}

	pub fn with_labels(mut self, show_labels: bool) -> Self {
		self.show_labels = show_labels;
		self
	}

	/// Replaces unusable numbers so layout never divides by zero or yields
	/// NaN.
	pub fn sanitized(mut self) -> Self {
		let defaults = Self::default();
		let fix = |v: f64, fallback: f64, min: f64| {
			if v.is_finite() { v.max(min) } else { fallback }
		};
		self.node_size = fix(self.node_size, defaults.node_size, MIN_NODE_SIZE);
		self.between_layers = fix(self.between_layers, defaults.between_layers, 0.0);
		self.between_nodes_in_layer = self
			.between_nodes_in_layer
			.iter()
			.map(|&g| fix(g, defaults.between_nodes_in_layer[0], 0.0))
			.collect();
		if self.between_nodes_in_layer.is_empty() {
			self.between_nodes_in_layer = defaults.between_nodes_in_layer;
		}
		// +inf means uncapped
		if self.max_scale.is_nan() || self.max_scale <= 0.0 {
			self.max_scale = defaults.max_scale;
		}
		self.label_font_size = fix(self.label_font_size, defaults.label_font_size, 1.0);
		self.edge_width = fix(self.edge_width, defaults.edge_width, 0.0);
		self.edge_opacity = fix(self.edge_opacity, defaults.edge_opacity, 0.0).min(1.0);
		self
	}

	pub fn gap(&self, layer: usize) -> f64 {
		self.between_nodes_in_layer
			.get(layer)
			.or(self.between_nodes_in_layer.last())
			.copied()
			.unwrap_or(0.0)
	}

	pub fn build_options(&self) -> BuildOptions {
		BuildOptions {
			show_bias: self.show_bias,
			input_compression: self.input_compression,
			label_style: self.label_style,
		}
	}

	pub fn weight_colors(&self) -> WeightColorScale {
		WeightColorScale {
			negative: self.negative_color,
			midpoint: self.midpoint_color,
			positive: self.positive_color,
		}
	}
}
