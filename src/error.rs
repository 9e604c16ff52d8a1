//! Error types shared across the diagram engine and the training collaborator.

use thiserror::Error;

/// A layer-width sequence that cannot be drawn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchitectureError {
	/// No layers at all.
	#[error("architecture has no layers")]
	Empty,

	/// Fewer than an input and an output layer.
	#[error("architecture needs at least 2 layers, got {0}")]
	TooFewLayers(usize),

	/// A layer with zero units.
	#[error("layer {layer} has no units")]
	EmptyLayer {
		/// Offending layer index.
		layer: usize,
	},
}

/// A colour string that is not `#rrggbb` or `#rgb`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid colour {0:?}, expected #rrggbb")]
pub struct ColorParseError(pub String);

/// Failures reported by the trainable-model collaborator.
#[derive(Debug, Error)]
pub enum TrainingError {
	/// Sample or prediction width disagrees with the model.
	#[error("shape mismatch: expected {expected} values, got {actual}")]
	ShapeMismatch {
		/// Width the model expects.
		expected: usize,
		/// Width that was supplied.
		actual: usize,
	},

	/// Nothing to train on.
	#[error("training data is empty")]
	EmptyData,

	/// No labeled dataset has been supplied to the page.
	#[error("no digit dataset is loaded")]
	DatasetUnavailable,

	/// A digit label outside `0..=9`.
	#[error("label {0} is not a digit")]
	InvalidLabel(usize),

	/// Loss blew up; the model is left as it was before the failing batch.
	#[error("loss diverged at epoch {epoch}")]
	Diverged {
		/// Epoch the failing batch belonged to.
		epoch: usize,
	},

	/// Model export failed.
	#[error("model export failed: {0}")]
	Export(#[from] serde_json::Error),

	/// Invalid model description.
	#[error("invalid model: {0}")]
	InvalidModel(#[from] ArchitectureError),
}
