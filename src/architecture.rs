//! Hidden-layer configuration edited by the settings panels.
//!
//! Every edit returns a new [`ArchitectureState`]; the diagram and the
//! trainer only ever see complete, validated [`Architecture`] values.

use crate::components::network_diagram::Architecture;
use crate::error::ArchitectureError;

/// Upper limits on hidden layers and neurons per hidden layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchitectureBounds {
	pub max_hidden_layers: usize,
	pub max_neurons: usize,
}

impl ArchitectureBounds {
	/// Function-fitting page.
	pub const fn mlp() -> Self {
		Self {
			max_hidden_layers: 6,
			max_neurons: 6,
		}
	}

	/// Digit-classifier page.
	pub const fn mnist() -> Self {
		Self {
			max_hidden_layers: 4,
			max_neurons: 64,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchitectureState {
	input: usize,
	hidden: Vec<usize>,
	output: usize,
	bounds: ArchitectureBounds,
}

impl ArchitectureState {
	/// One hidden layer of one neuron between `input` and `output` units.
	pub fn new(input: usize, output: usize, bounds: ArchitectureBounds) -> Self {
		Self {
			input: input.max(1),
			hidden: vec![1],
			output: output.max(1),
			bounds,
		}
	}

	/// Single input, single output: fits `y = f(x)`.
	pub fn mlp() -> Self {
		Self::new(1, 1, ArchitectureBounds::mlp())
	}

	/// 28×28 pixel input, ten digit classes.
	pub fn mnist() -> Self {
		Self::new(784, 10, ArchitectureBounds::mnist())
	}

	/// Replaces the hidden widths, clamping count and widths to the bounds.
	/// An empty list becomes a single one-neuron layer.
	pub fn with_hidden(mut self, hidden: Vec<usize>) -> Self {
		let max = self.bounds.max_neurons;
		self.hidden = hidden
			.into_iter()
			.take(self.bounds.max_hidden_layers)
			.map(|n| n.clamp(1, max))
			.collect();
		if self.hidden.is_empty() {
			self.hidden.push(1);
		}
		self
	}

	pub fn bounds(&self) -> ArchitectureBounds {
		self.bounds
	}

	pub fn hidden(&self) -> &[usize] {
		&self.hidden
	}

	pub fn hidden_layer_count(&self) -> usize {
		self.hidden.len()
	}

	/// Neurons in hidden layer `i`, if it exists.
	pub fn neuron_count(&self, i: usize) -> Option<usize> {
		self.hidden.get(i).copied()
	}

	/// Appends a one-neuron hidden layer, up to the bound.
	pub fn increment_layer_count(&self) -> Self {
		self.insert_layer(self.hidden.len())
	}

	/// Drops the last hidden layer; the first one is never removed.
	pub fn decrement_layer_count(&self) -> Self {
		self.remove_layer(self.hidden.len().saturating_sub(1))
	}

	/// Inserts a one-neuron hidden layer before hidden layer `at` (or at the
	/// end when `at` is past it).
	pub fn insert_layer(&self, at: usize) -> Self {
		let mut next = self.clone();
		if next.hidden.len() < next.bounds.max_hidden_layers {
			let at = at.min(next.hidden.len());
			next.hidden.insert(at, 1);
		}
		next
	}

	pub fn remove_layer(&self, at: usize) -> Self {
		let mut next = self.clone();
		if next.hidden.len() > 1 && at < next.hidden.len() {
			next.hidden.remove(at);
		}
		next
	}

	pub fn increment_neuron_count(&self, i: usize) -> Self {
		match self.neuron_count(i) {
			Some(n) => self.set_neuron_count(i, n + 1),
			None => self.clone(),
		}
	}

	/// Decrementing a one-neuron layer removes it, unless it is the only
	/// hidden layer.
	pub fn decrement_neuron_count(&self, i: usize) -> Self {
		match self.neuron_count(i) {
			Some(1) => self.remove_layer(i),
			Some(n) => self.set_neuron_count(i, n - 1),
			None => self.clone(),
		}
	}

	/// Sets hidden layer `i` to `n` neurons, clamped to `1..=max_neurons`.
	pub fn set_neuron_count(&self, i: usize, n: usize) -> Self {
		let mut next = self.clone();
		if let Some(slot) = next.hidden.get_mut(i) {
			*slot = n.clamp(1, next.bounds.max_neurons);
		}
		next
	}

	/// `[input, hidden..., output]`.
	pub fn widths(&self) -> Vec<usize> {
		let mut widths = Vec::with_capacity(self.hidden.len() + 2);
		widths.push(self.input);
		widths.extend_from_slice(&self.hidden);
		widths.push(self.output);
		widths
	}

	pub fn architecture(&self) -> Result<Architecture, ArchitectureError> {
		Architecture::new(self.widths())
	}
}

impl Default for ArchitectureState {
	fn default() -> Self {
		Self::mlp()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn mlp(hidden: &[usize]) -> ArchitectureState {
		ArchitectureState::mlp().with_hidden(hidden.to_vec())
	}

	#[test]
	fn starts_with_one_single_neuron_layer() {
		let s = ArchitectureState::mlp();
		assert_eq!(s.widths(), vec![1, 1, 1]);
		assert_eq!(ArchitectureState::mnist().widths(), vec![784, 1, 10]);
	}

	#[test]
	fn layer_count_respects_bounds() {
		let mut s = ArchitectureState::mlp();
		for _ in 0..10 {
			s = s.increment_layer_count();
		}
		assert_eq!(s.hidden_layer_count(), 6);
		for _ in 0..10 {
			s = s.decrement_layer_count();
		}
		assert_eq!(s.hidden(), &[1]);
	}

	#[test]
	fn edits_return_new_values() {
		let s = mlp(&[2, 3]);
		let grown = s.increment_neuron_count(0);
		assert_eq!(s.hidden(), &[2, 3]);
		assert_eq!(grown.hidden(), &[3, 3]);
	}

	#[test]
	fn neuron_count_clamps() {
		let s = mlp(&[6]).increment_neuron_count(0);
		assert_eq!(s.hidden(), &[6]);
		let s = ArchitectureState::mnist().set_neuron_count(0, 500);
		assert_eq!(s.hidden(), &[64]);
		assert_eq!(s.set_neuron_count(0, 0).hidden(), &[1]);
	}

	#[test]
	fn decrement_at_one_removes_layer() {
		let s = mlp(&[3, 1, 2]).decrement_neuron_count(1);
		assert_eq!(s.hidden(), &[3, 2]);
	}

	#[test]
	fn decrement_keeps_last_layer() {
		let s = mlp(&[1]).decrement_neuron_count(0);
		assert_eq!(s.hidden(), &[1]);
	}

	#[test]
	fn out_of_range_edits_are_ignored() {
		let s = mlp(&[2]);
		assert_eq!(s.increment_neuron_count(5), s);
		assert_eq!(s.decrement_neuron_count(5), s);
		assert_eq!(s.remove_layer(5), s);
	}

	#[test]
	fn insert_layer_in_middle() {
		let s = mlp(&[2, 3]).insert_layer(1);
		assert_eq!(s.hidden(), &[2, 1, 3]);
		assert_eq!(mlp(&[2]).insert_layer(99).hidden(), &[2, 1]);
	}

	#[test]
	fn with_hidden_clamps() {
		let s = mlp(&[0, 9, 1, 1, 1, 1, 1, 1]);
		assert_eq!(s.hidden(), &[1, 6, 1, 1, 1, 1]);
		assert_eq!(mlp(&[]).hidden(), &[1]);
	}

	#[test]
	fn architecture_wraps_hidden_with_input_and_output() {
		let arch = mlp(&[1]).increment_neuron_count(0).architecture().unwrap();
		assert_eq!(arch.widths(), &[1, 2, 1]);
		let arch = ArchitectureState::mnist().with_hidden(vec![16, 8]).architecture().unwrap();
		assert_eq!(arch.widths(), &[784, 16, 8, 10]);
	}
}
