//! Cooperative training: a bounded number of samples per animation frame so
//! the page stays responsive, with stale runs cancelled through a generation
//! counter.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use wasm_bindgen::prelude::*;

use super::model::{EpochMetrics, Sample, TrainableModel, check_samples};
use crate::error::TrainingError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrainingPlan {
	pub epochs: usize,
	pub batch_size: usize,
	/// Samples trained per animation frame. Whole batches are always
	/// finished, so a frame may go over by up to one batch.
	pub samples_per_frame: usize,
}

impl TrainingPlan {
	/// Small inputs: about five passes over a 501-point curve per frame.
	pub fn function_fit(epochs: usize, batch_size: usize) -> Self {
		Self {
			epochs,
			batch_size,
			samples_per_frame: 2500,
		}
	}

	/// 784-pixel images: a handful of batches per frame.
	pub fn digits(epochs: usize, batch_size: usize) -> Self {
		Self {
			epochs,
			batch_size,
			samples_per_frame: 64,
		}
	}
}

impl Default for TrainingPlan {
	fn default() -> Self {
		Self::function_fit(500, 32)
	}
}

/// Where a run stands after a step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Progress {
	Running(EpochMetrics),
	Finished(EpochMetrics),
}

/// Monotonic counter shared by everything that can start a run. Bumping it
/// invalidates every token handed out before.
#[derive(Clone, Debug, Default)]
pub struct Generation(Rc<Cell<u64>>);

impl Generation {
	pub fn bump(&self) -> GenerationToken {
		self.0.set(self.0.get() + 1);
		self.token()
	}

	pub fn token(&self) -> GenerationToken {
		GenerationToken {
			counter: self.0.clone(),
			at: self.0.get(),
		}
	}
}

#[derive(Clone, Debug)]
pub struct GenerationToken {
	counter: Rc<Cell<u64>>,
	at: u64,
}

impl GenerationToken {
	pub fn is_current(&self) -> bool {
		self.counter.get() == self.at
	}
}

/// A model, its data and how far through the plan training has got.
///
/// Epochs are walked in shuffled order with a batch cursor, so a step can
/// stop part way through an epoch and the next one picks up from there.
pub struct TrainingRun<M> {
	model: M,
	samples: Vec<Sample>,
	plan: TrainingPlan,
	order: Vec<usize>,
	cursor: usize,
	epoch_loss: f64,
	done: usize,
	last: Option<EpochMetrics>,
	rng: SmallRng,
}

impl<M: TrainableModel> TrainingRun<M> {
	pub fn new(
		model: M,
		samples: Vec<Sample>,
		plan: TrainingPlan,
		seed: u64,
	) -> Result<Self, TrainingError> {
		check_samples(&model, &samples)?;
		let order = (0..samples.len()).collect();
		Ok(Self {
			model,
			samples,
			plan,
			order,
			cursor: 0,
			epoch_loss: 0.0,
			done: 0,
			last: None,
			rng: SmallRng::seed_from_u64(seed),
		})
	}

	pub fn model(&self) -> &M {
		&self.model
	}

	pub fn into_model(self) -> M {
		self.model
	}

	pub fn epochs_done(&self) -> usize {
		self.done
	}

	pub fn is_finished(&self) -> bool {
		self.done >= self.plan.epochs
	}

	/// Trains batches until this frame's sample budget is spent or the plan
	/// is done. Until the first epoch completes, the reported loss is the
	/// running mean of the current epoch.
	pub fn step(&mut self) -> Result<Progress, TrainingError> {
		let batch_size = self.plan.batch_size.max(1);
		let budget = self.plan.samples_per_frame.max(1);
		let mut spent = 0;
		while spent < budget && !self.is_finished() {
			if self.cursor == 0 {
				self.order.shuffle(&mut self.rng);
				self.epoch_loss = 0.0;
			}
			let end = (self.cursor + batch_size).min(self.order.len());
			let batch: Vec<&Sample> = self.order[self.cursor..end]
				.iter()
				.map(|&i| &self.samples[i])
				.collect();
			self.epoch_loss += self.model.fit_batch(&batch)?;
			spent += batch.len();
			self.cursor = end;

			if self.cursor == self.order.len() {
				self.cursor = 0;
				let mean = self.epoch_loss / self.order.len() as f64;
				self.last = Some(self.model.complete_epoch(mean));
				self.done += 1;
			}
		}

		let metrics = self.last.unwrap_or(EpochMetrics {
			epoch: self.done,
			loss: if self.cursor > 0 {
				self.epoch_loss / self.cursor as f64
			} else {
				f64::NAN
			},
		});
		Ok(if self.is_finished() {
			Progress::Finished(metrics)
		} else {
			Progress::Running(metrics)
		})
	}
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Drives `run` from `requestAnimationFrame` until it finishes, fails, or
/// `token` goes stale. `on_frame` sees the model after every step;
/// `on_done` gets the run back unless it was cancelled.
pub fn drive<M, F, D>(run: TrainingRun<M>, token: GenerationToken, mut on_frame: F, on_done: D)
where
	M: TrainableModel + 'static,
	F: FnMut(&M, EpochMetrics) + 'static,
	D: FnOnce(Result<TrainingRun<M>, TrainingError>) + 'static,
{
	let Some(window) = web_sys::window() else {
		warn!("no window; training not started");
		return;
	};
	let frame: FrameCallback = Rc::new(RefCell::new(None));
	let frame_inner = frame.clone();
	let mut state = Some((run, on_done));

	*frame.borrow_mut() = Some(Closure::new(move || {
		let Some((mut run, on_done)) = state.take() else {
			return;
		};
		if !token.is_current() {
			info!("training cancelled after {} epochs", run.epochs_done());
			frame_inner.borrow_mut().take();
			return;
		}
		let finished = match run.step() {
			Ok(Progress::Running(metrics)) => {
				on_frame(run.model(), metrics);
				false
			}
			Ok(Progress::Finished(metrics)) => {
				on_frame(run.model(), metrics);
				info!("training finished: {} epochs, loss {:.5}", metrics.epoch, metrics.loss);
				true
			}
			Err(e) => {
				warn!("training stopped: {e}");
				on_done(Err(e));
				frame_inner.borrow_mut().take();
				return;
			}
		};
		if finished {
			on_done(Ok(run));
			frame_inner.borrow_mut().take();
			return;
		}
		state = Some((run, on_done));
		if let Some(win) = web_sys::window() {
			if let Some(ref cb) = *frame_inner.borrow() {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}
	}));

	if let Some(ref cb) = *frame.borrow() {
		if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
			warn!("requestAnimationFrame failed: {e:?}");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_diagram::Architecture;
	use crate::training::model::{DenseModel, ModelSpec};

	fn run(epochs: usize, samples_per_frame: usize) -> TrainingRun<DenseModel> {
		let arch = Architecture::new(vec![1, 2, 1]).unwrap();
		let model = DenseModel::new(&ModelSpec::regression(arch), &mut SmallRng::seed_from_u64(4));
		let samples = (0..8).map(|i| Sample::scalar(i as f64 / 8.0, 1.0)).collect();
		let plan = TrainingPlan {
			epochs,
			batch_size: 4,
			samples_per_frame,
		};
		TrainingRun::new(model, samples, plan, 11).unwrap()
	}

	#[test]
	fn steps_in_frame_sized_chunks() {
		// eight samples: a 40-sample budget is five epochs
		let mut r = run(12, 40);
		assert!(matches!(r.step().unwrap(), Progress::Running(m) if m.epoch == 5));
		assert!(matches!(r.step().unwrap(), Progress::Running(m) if m.epoch == 10));
		assert!(matches!(r.step().unwrap(), Progress::Finished(m) if m.epoch == 12));
		assert!(r.is_finished());
		assert_eq!(r.model().epochs_trained(), 12);
		// stepping a finished run trains nothing more
		assert!(matches!(r.step().unwrap(), Progress::Finished(m) if m.epoch == 12));
	}

	#[test]
	fn budget_smaller_than_an_epoch_yields_mid_epoch() {
		let mut r = run(2, 4);
		match r.step().unwrap() {
			Progress::Running(m) => {
				assert_eq!(m.epoch, 0);
				assert!(m.loss.is_finite());
			}
			other => panic!("expected a running step, got {other:?}"),
		}
		assert_eq!(r.epochs_done(), 0);
		assert_eq!(r.model().epochs_trained(), 0);

		assert!(matches!(r.step().unwrap(), Progress::Running(m) if m.epoch == 1));
		r.step().unwrap();
		assert!(matches!(r.step().unwrap(), Progress::Finished(m) if m.epoch == 2));
		assert_eq!(r.into_model().epochs_trained(), 2);
	}

	#[test]
	fn mismatched_samples_are_rejected_up_front() {
		let arch = Architecture::new(vec![2, 1]).unwrap();
		let model = DenseModel::new(&ModelSpec::regression(arch), &mut SmallRng::seed_from_u64(4));
		assert!(matches!(
			TrainingRun::new(model, vec![Sample::scalar(1.0, 1.0)], TrainingPlan::default(), 0),
			Err(TrainingError::ShapeMismatch { expected: 2, actual: 1 })
		));
	}

	#[test]
	fn empty_samples_are_rejected() {
		let arch = Architecture::new(vec![1, 1]).unwrap();
		let model = DenseModel::new(&ModelSpec::regression(arch), &mut SmallRng::seed_from_u64(4));
		assert!(matches!(
			TrainingRun::new(model, vec![], TrainingPlan::default(), 0),
			Err(TrainingError::EmptyData)
		));
	}

	#[test]
	fn bumping_generation_invalidates_tokens() {
		let generation = Generation::default();
		let first = generation.bump();
		assert!(first.is_current());
		let second = generation.bump();
		assert!(!first.is_current());
		assert!(second.is_current());
		assert!(generation.token().is_current());
	}
}
