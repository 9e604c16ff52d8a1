//! Labeled 28×28 digit images.

use super::model::{Sample, TrainableModel};
use crate::error::TrainingError;

pub const IMAGE_PIXELS: usize = 28 * 28;
pub const DIGIT_CLASSES: usize = 10;

/// Train and test splits of `(pixels, one-hot digit)` samples.
pub trait LabeledImageDataset {
	/// Samples the model is fitted on.
	fn train(&self) -> &[Sample];
	/// Held-out samples for accuracy and the probability preview.
	fn test(&self) -> &[Sample];
}

/// Dataset held entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDataset {
	train: Vec<Sample>,
	test: Vec<Sample>,
}

impl InMemoryDataset {
	/// Checks every sample for 784 inputs and a 10-wide one-hot target.
	pub fn new(train: Vec<Sample>, test: Vec<Sample>) -> Result<Self, TrainingError> {
		for sample in train.iter().chain(&test) {
			if sample.input.len() != IMAGE_PIXELS {
				return Err(TrainingError::ShapeMismatch {
					expected: IMAGE_PIXELS,
					actual: sample.input.len(),
				});
			}
			if sample.target.len() != DIGIT_CLASSES {
				return Err(TrainingError::ShapeMismatch {
					expected: DIGIT_CLASSES,
					actual: sample.target.len(),
				});
			}
		}
		if train.is_empty() {
			return Err(TrainingError::EmptyData);
		}
		Ok(Self { train, test })
	}

	/// Builds both splits from `(pixels, digit)` pairs, one-hot encoding the
	/// digits.
	pub fn from_digits<I, J>(train: I, test: J) -> Result<Self, TrainingError>
	where
		I: IntoIterator<Item = (Vec<f64>, usize)>,
		J: IntoIterator<Item = (Vec<f64>, usize)>,
	{
		let encode = |(pixels, digit): (Vec<f64>, usize)| {
			if digit >= DIGIT_CLASSES {
				return Err(TrainingError::InvalidLabel(digit));
			}
			Ok(Sample::new(pixels, one_hot(digit)))
		};
		let train = train.into_iter().map(encode).collect::<Result<Vec<_>, _>>()?;
		let test = test.into_iter().map(encode).collect::<Result<Vec<_>, _>>()?;
		Self::new(train, test)
	}
}

impl LabeledImageDataset for InMemoryDataset {
	fn train(&self) -> &[Sample] {
		&self.train
	}

	fn test(&self) -> &[Sample] {
		&self.test
	}
}

/// Ten-wide target with a 1 at `digit`; all zeros when out of range.
pub fn one_hot(digit: usize) -> Vec<f64> {
	let mut v = vec![0.0; DIGIT_CLASSES];
	if let Some(slot) = v.get_mut(digit) {
		*slot = 1.0;
	}
	v
}

/// Index of the largest value; the first one wins ties.
pub fn argmax(values: &[f64]) -> Option<usize> {
	values
		.iter()
		.enumerate()
		.fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
			Some((_, b)) if b >= v => best,
			_ => Some((i, v)),
		})
		.map(|(i, _)| i)
}

/// Share of `samples` whose predicted class matches the target.
pub fn accuracy<M: TrainableModel + ?Sized>(
	model: &M,
	samples: &[Sample],
) -> Result<f64, TrainingError> {
	if samples.is_empty() {
		return Err(TrainingError::EmptyData);
	}
	let mut hits = 0;
	for sample in samples {
		let predicted = argmax(&model.predict(&sample.input)?);
		if predicted.is_some() && predicted == argmax(&sample.target) {
			hits += 1;
		}
	}
	Ok(hits as f64 / samples.len() as f64)
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::network_diagram::Architecture;
	use crate::training::model::{DenseModel, ModelSpec};

	fn image(digit: usize) -> Sample {
		Sample::new(vec![digit as f64 / 10.0; IMAGE_PIXELS], one_hot(digit))
	}

	#[test]
	fn rejects_wrong_shapes() {
		let bad = Sample::new(vec![0.0; 10], one_hot(1));
		assert!(matches!(
			InMemoryDataset::new(vec![bad], vec![]),
			Err(TrainingError::ShapeMismatch { expected: IMAGE_PIXELS, actual: 10 })
		));
		assert!(matches!(InMemoryDataset::new(vec![], vec![]), Err(TrainingError::EmptyData)));
	}

	#[test]
	fn keeps_splits_apart() {
		let ds = InMemoryDataset::new(vec![image(1), image(2)], vec![image(3)]).unwrap();
		assert_eq!(ds.train().len(), 2);
		assert_eq!(ds.test().len(), 1);
	}

	#[test]
	fn from_digits_encodes_labels() {
		let pixels = || vec![0.5; IMAGE_PIXELS];
		let ds = InMemoryDataset::from_digits([(pixels(), 7)], [(pixels(), 0)]).unwrap();
		assert_eq!(argmax(&ds.train()[0].target), Some(7));
		assert_eq!(ds.test()[0].target, one_hot(0));
		assert!(matches!(
			InMemoryDataset::from_digits([(pixels(), 10)], Vec::<(Vec<f64>, usize)>::new()),
			Err(TrainingError::InvalidLabel(10))
		));
	}

	#[test]
	fn one_hot_and_argmax_agree() {
		for d in 0..DIGIT_CLASSES {
			assert_eq!(argmax(&one_hot(d)), Some(d));
		}
		assert_eq!(one_hot(42), vec![0.0; DIGIT_CLASSES]);
		assert_eq!(argmax(&[]), None);
		assert_eq!(argmax(&[1.0, 3.0, 3.0]), Some(1));
	}

	#[test]
	fn accuracy_is_a_fraction() {
		let arch = Architecture::new(vec![IMAGE_PIXELS, 4, DIGIT_CLASSES]).unwrap();
		let mut rng = SmallRng::seed_from_u64(9);
		let model = DenseModel::new(&ModelSpec::classification(arch), &mut rng);
		let samples: Vec<Sample> = (0..DIGIT_CLASSES).map(image).collect();
		let acc = accuracy(&model, &samples).unwrap();
		assert!((0.0..=1.0).contains(&acc));
	}
}
