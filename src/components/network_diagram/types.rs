use std::fmt;

use crate::error::ArchitectureError;

/// Ordered layer widths, input first and output last.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Architecture(Vec<usize>);

impl Architecture {
	/// Validates `widths`: at least two layers, none of them empty.
	pub fn new(widths: Vec<usize>) -> Result<Self, ArchitectureError> {
		if widths.is_empty() {
			return Err(ArchitectureError::Empty);
		}
		if widths.len() < 2 {
			return Err(ArchitectureError::TooFewLayers(widths.len()));
		}
		if let Some(layer) = widths.iter().position(|&w| w == 0) {
			return Err(ArchitectureError::EmptyLayer { layer });
		}
		Ok(Self(widths))
	}

	pub fn widths(&self) -> &[usize] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn width(&self, layer: usize) -> usize {
		self.0[layer]
	}

	#[cfg(test)]
	pub fn is_output(&self, layer: usize) -> bool {
		layer + 1 == self.0.len()
	}

	/// Connection count of the fully connected network, ignoring compression.
	pub fn connection_count(&self) -> usize {
		self.0.windows(2).map(|w| w[0] * w[1]).sum()
	}
}

/// `[1, 1, 1]`, the smallest network the pages draw.
impl Default for Architecture {
	fn default() -> Self {
		Self(vec![1, 1, 1])
	}
}

impl fmt::Display for Architecture {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let widths: Vec<String> = self.0.iter().map(ToString::to_string).collect();
		write!(f, "[{}]", widths.join(", "))
	}
}

/// Stable identity of a node: `"{layer}_{index}"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
	pub layer: usize,
	pub index: usize,
}

impl NodeId {
	pub fn new(layer: usize, index: usize) -> Self {
		Self { layer, index }
	}

	pub fn key(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}_{}", self.layer, self.index)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiagramNode {
	pub id: NodeId,
	/// Index 0 of a non-output layer while bias display is on.
	pub is_bias: bool,
	/// Stands in for many input units of a compressed input layer.
	pub representative: bool,
}

impl DiagramNode {
	pub fn key(&self) -> String {
		self.id.key()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiagramEdge {
	pub source: NodeId,
	pub target: NodeId,
	/// Decorative weight in `[-1, 1]`, regenerated on every build.
	pub weight: f64,
}

impl DiagramEdge {
	pub fn key(&self) -> String {
		format!("{}-{}", self.source, self.target)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerLabel {
	pub layer: usize,
	pub text: String,
}

impl LayerLabel {
	pub fn key(&self) -> String {
		format!("layer_{}_label", self.layer)
	}
}

/// Input layer drawn as a few representative nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressedInput {
	pub true_width: usize,
	pub representatives: usize,
}

/// Output of the graph model builder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphModel {
	pub nodes: Vec<DiagramNode>,
	pub edges: Vec<DiagramEdge>,
	pub labels: Vec<LayerLabel>,
	pub compressed_input: Option<CompressedInput>,
}

impl GraphModel {
	/// Number of nodes drawn for `layer`.
	pub fn drawn_width(&self, architecture: &Architecture, layer: usize) -> usize {
		match self.compressed_input {
			Some(c) if layer == 0 => c.representatives,
			_ => architecture.width(layer),
		}
	}
}

/// Pixel size of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub const DEFAULT: Viewport = Viewport {
		width: 800.0,
		height: 600.0,
	};

	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Falls back to the default size when either side is unusable.
	pub fn or_default(self) -> Self {
		let usable = |v: f64| v.is_finite() && v > 0.0;
		if usable(self.width) && usable(self.height) {
			self
		} else {
			Self::DEFAULT
		}
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self::DEFAULT
	}
}
