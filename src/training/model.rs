//! Small dense network trained with mini-batch SGD.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::components::network_diagram::Architecture;
use crate::error::TrainingError;

/// One training example.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
	/// Values fed to the input layer.
	pub input: Vec<f64>,
	/// Expected output-layer values.
	pub target: Vec<f64>,
}

impl Sample {
	/// Pairs an input with its target.
	pub fn new(input: Vec<f64>, target: Vec<f64>) -> Self {
		Self { input, target }
	}

	/// Single-input, single-output sample for function fitting.
	pub fn scalar(x: f64, y: f64) -> Self {
		Self::new(vec![x], vec![y])
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
	#[default]
	Relu,
	Identity,
}

impl Activation {
	fn apply(self, z: f64) -> f64 {
		match self {
			Activation::Relu => z.max(0.0),
			Activation::Identity => z,
		}
	}

	/// Derivative in terms of the post-activation value.
	fn derivative(self, y: f64) -> f64 {
		match self {
			Activation::Relu => {
				if y > 0.0 {
					1.0
				} else {
					0.0
				}
			}
			Activation::Identity => 1.0,
		}
	}
}

/// Output layer and the loss paired with it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
	/// Identity output, mean squared error.
	#[default]
	Regression,
	/// Softmax output, cross-entropy against one-hot targets.
	Classification,
}

/// Everything needed to build a model.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSpec {
	pub architecture: Architecture,
	pub hidden: Activation,
	pub output: OutputKind,
	pub learning_rate: f64,
}

impl ModelSpec {
	pub fn regression(architecture: Architecture) -> Self {
		Self {
			architecture,
			hidden: Activation::Relu,
			output: OutputKind::Regression,
			learning_rate: 0.005,
		}
	}

	pub fn classification(architecture: Architecture) -> Self {
		Self {
			architecture,
			hidden: Activation::Relu,
			output: OutputKind::Classification,
			learning_rate: 0.05,
		}
	}

	#[cfg(test)]
	pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
		self.learning_rate = learning_rate;
		self
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpochMetrics {
	/// 1-based count of epochs trained so far.
	pub epoch: usize,
	/// Mean loss over the epoch's samples.
	pub loss: f64,
}

/// The model contract the pages train against.
pub trait TrainableModel {
	fn input_width(&self) -> usize;
	fn output_width(&self) -> usize;

	/// One gradient step over `batch`, returning the batch's summed loss.
	/// A step that would make the loss or any parameter non-finite is
	/// rejected and leaves the model untouched.
	fn fit_batch(&mut self, batch: &[&Sample]) -> Result<f64, TrainingError>;

	/// Counts one more finished epoch with mean loss `loss`.
	fn complete_epoch(&mut self, loss: f64) -> EpochMetrics;

	fn predict(&self, input: &[f64]) -> Result<Vec<f64>, TrainingError>;

	/// One pass over `samples` in shuffled mini-batches.
	fn fit_epoch(
		&mut self,
		samples: &[Sample],
		batch_size: usize,
		rng: &mut dyn RngCore,
	) -> Result<EpochMetrics, TrainingError> {
		check_samples(self, samples)?;
		let mut order: Vec<usize> = (0..samples.len()).collect();
		order.shuffle(rng);

		let mut total = 0.0;
		for chunk in order.chunks(batch_size.max(1)) {
			let batch: Vec<&Sample> = chunk.iter().map(|&i| &samples[i]).collect();
			total += self.fit_batch(&batch)?;
		}
		Ok(self.complete_epoch(total / samples.len() as f64))
	}
}

fn check_width(expected: usize, actual: usize) -> Result<(), TrainingError> {
	if expected != actual {
		return Err(TrainingError::ShapeMismatch { expected, actual });
	}
	Ok(())
}

/// Fails unless `samples` is non-empty and every sample matches the model's
/// input and output widths.
pub fn check_samples<M: TrainableModel + ?Sized>(
	model: &M,
	samples: &[Sample],
) -> Result<(), TrainingError> {
	if samples.is_empty() {
		return Err(TrainingError::EmptyData);
	}
	for sample in samples {
		check_width(model.input_width(), sample.input.len())?;
		check_width(model.output_width(), sample.target.len())?;
	}
	Ok(())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct DenseLayer {
	in_dim: usize,
	out_dim: usize,
	/// Row-major, shape (out_dim, in_dim).
	weights: Vec<f64>,
	biases: Vec<f64>,
	activation: Activation,
}

impl DenseLayer {
	fn new<R: Rng + ?Sized>(
		in_dim: usize,
		out_dim: usize,
		activation: Activation,
		rng: &mut R,
	) -> Self {
		// He-uniform
		let limit = (6.0 / in_dim as f64).sqrt();
		let weights = (0..in_dim * out_dim)
			.map(|_| rng.gen_range(-limit..=limit))
			.collect();
		Self {
			in_dim,
			out_dim,
			weights,
			biases: vec![0.0; out_dim],
			activation,
		}
	}

	fn forward(&self, inputs: &[f64]) -> Vec<f64> {
		(0..self.out_dim)
			.map(|o| {
				let row = &self.weights[o * self.in_dim..(o + 1) * self.in_dim];
				let z = row
					.iter()
					.zip(inputs)
					.fold(self.biases[o], |sum, (w, x)| w.mul_add(*x, sum));
				self.activation.apply(z)
			})
			.collect()
	}

	fn is_finite(&self) -> bool {
		self.weights.iter().chain(&self.biases).all(|v| v.is_finite())
	}
}

struct Gradients {
	weights: Vec<Vec<f64>>,
	biases: Vec<Vec<f64>>,
}

impl Gradients {
	fn zeros(layers: &[DenseLayer]) -> Self {
		Self {
			weights: layers.iter().map(|l| vec![0.0; l.weights.len()]).collect(),
			biases: layers.iter().map(|l| vec![0.0; l.out_dim]).collect(),
		}
	}
}

/// Fully connected network: ReLU hidden layers, identity or softmax output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseModel {
	widths: Vec<usize>,
	output: OutputKind,
	learning_rate: f64,
	layers: Vec<DenseLayer>,
	epochs_trained: usize,
}

fn softmax(logits: &[f64]) -> Vec<f64> {
	let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
	let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
	let sum: f64 = exps.iter().sum();
	exps.into_iter().map(|e| e / sum).collect()
}

impl DenseModel {
	pub fn new<R: Rng + ?Sized>(spec: &ModelSpec, rng: &mut R) -> Self {
		let widths = spec.architecture.widths().to_vec();
		let last = widths.len() - 2;
		let layers = widths
			.windows(2)
			.enumerate()
			.map(|(i, w)| {
				let activation = if i == last {
					Activation::Identity
				} else {
					spec.hidden
				};
				DenseLayer::new(w[0], w[1], activation, &mut *rng)
			})
			.collect();
		Self {
			widths,
			output: spec.output,
			learning_rate: spec.learning_rate,
			layers,
			epochs_trained: 0,
		}
	}

	pub fn widths(&self) -> &[usize] {
		&self.widths
	}

	pub fn epochs_trained(&self) -> usize {
		self.epochs_trained
	}

	fn check_sample(&self, sample: &Sample) -> Result<(), TrainingError> {
		check_width(self.input_width(), sample.input.len())?;
		check_width(self.output_width(), sample.target.len())
	}

	/// Post-activation outputs of every layer, input first. The last entry
	/// holds raw logits for classification.
	fn activations(&self, input: &[f64]) -> Vec<Vec<f64>> {
		let mut acts = Vec::with_capacity(self.layers.len() + 1);
		acts.push(input.to_vec());
		for layer in &self.layers {
			let next = layer.forward(&acts[acts.len() - 1]);
			acts.push(next);
		}
		acts
	}

	/// Loss for one sample and its gradient with respect to the last
	/// layer's pre-activation.
	fn output_delta(&self, raw: &[f64], target: &[f64]) -> (f64, Vec<f64>) {
		match self.output {
			OutputKind::Regression => {
				let n = raw.len() as f64;
				let loss = raw.iter().zip(target).map(|(p, t)| (p - t).powi(2)).sum::<f64>() / n;
				let delta = raw.iter().zip(target).map(|(p, t)| 2.0 * (p - t) / n).collect();
				(loss, delta)
			}
			OutputKind::Classification => {
				let probs = softmax(raw);
				let loss = -probs
					.iter()
					.zip(target)
					.map(|(p, t)| t * p.max(f64::MIN_POSITIVE).ln())
					.sum::<f64>();
				let delta = probs.iter().zip(target).map(|(p, t)| p - t).collect();
				(loss, delta)
			}
		}
	}

	fn accumulate(&self, sample: &Sample, grads: &mut Gradients) -> f64 {
		let acts = self.activations(&sample.input);
		let (loss, mut delta) = self.output_delta(&acts[acts.len() - 1], &sample.target);

		for (l, layer) in self.layers.iter().enumerate().rev() {
			let inputs = &acts[l];
			let mut d_inputs = vec![0.0; layer.in_dim];
			for o in 0..layer.out_dim {
				let d = delta[o];
				grads.biases[l][o] += d;
				let row = o * layer.in_dim;
				for i in 0..layer.in_dim {
					grads.weights[l][row + i] += d * inputs[i];
					d_inputs[i] += layer.weights[row + i] * d;
				}
			}
			if l > 0 {
				let prev = &self.layers[l - 1];
				delta = d_inputs
					.iter()
					.zip(inputs)
					.map(|(d, y)| d * prev.activation.derivative(*y))
					.collect();
			}
		}
		loss
	}

	fn apply(&mut self, grads: &Gradients, batch_len: usize) {
		let step = self.learning_rate / batch_len as f64;
		for (l, layer) in self.layers.iter_mut().enumerate() {
			for (w, g) in layer.weights.iter_mut().zip(&grads.weights[l]) {
				*w -= step * g;
			}
			for (b, g) in layer.biases.iter_mut().zip(&grads.biases[l]) {
				*b -= step * g;
			}
		}
	}
}

impl TrainableModel for DenseModel {
	fn input_width(&self) -> usize {
		self.widths[0]
	}

	fn output_width(&self) -> usize {
		self.widths[self.widths.len() - 1]
	}

	fn fit_batch(&mut self, batch: &[&Sample]) -> Result<f64, TrainingError> {
		if batch.is_empty() {
			return Err(TrainingError::EmptyData);
		}
		for sample in batch {
			self.check_sample(sample)?;
		}

		let mut grads = Gradients::zeros(&self.layers);
		let total: f64 = batch.iter().map(|s| self.accumulate(s, &mut grads)).sum();
		let diverged = TrainingError::Diverged {
			epoch: self.epochs_trained + 1,
		};
		if !total.is_finite() {
			return Err(diverged);
		}
		let snapshot = self.layers.clone();
		self.apply(&grads, batch.len());
		if !self.layers.iter().all(DenseLayer::is_finite) {
			self.layers = snapshot;
			return Err(diverged);
		}
		Ok(total)
	}

	fn complete_epoch(&mut self, loss: f64) -> EpochMetrics {
		self.epochs_trained += 1;
		EpochMetrics {
			epoch: self.epochs_trained,
			loss,
		}
	}

	fn predict(&self, input: &[f64]) -> Result<Vec<f64>, TrainingError> {
		check_width(self.input_width(), input.len())?;
		let mut acts = self.activations(input);
		let raw = acts.pop().unwrap_or_default();
		Ok(match self.output {
			OutputKind::Regression => raw,
			OutputKind::Classification => softmax(&raw),
		})
	}
}
