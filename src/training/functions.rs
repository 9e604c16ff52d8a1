//! Generating functions the function-fitting page learns.

use std::f64::consts::PI;

use super::model::Sample;

/// Sample count over the plotted domain.
pub const DOMAIN_POINTS: usize = 501;
pub const DOMAIN_MIN: f64 = -5.0;
pub const DOMAIN_MAX: f64 = 5.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TargetFunction {
	#[default]
	Square,
	Waves,
	XLogX,
}

impl TargetFunction {
	pub const ALL: [TargetFunction; 3] =
		[TargetFunction::Square, TargetFunction::Waves, TargetFunction::XLogX];

	pub fn label(self) -> &'static str {
		match self {
			TargetFunction::Square => "x²",
			TargetFunction::Waves => "sin(2πx) + cos(3πx)",
			TargetFunction::XLogX => "x·log(x + 1)",
		}
	}

	pub fn index(self) -> usize {
		Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
	}

	pub fn from_index(i: usize) -> Option<Self> {
		Self::ALL.get(i).copied()
	}

	pub fn eval(self, x: f64) -> f64 {
		match self {
			TargetFunction::Square => x * x,
			TargetFunction::Waves => (2.0 * PI * x).sin() + (3.0 * PI * x).cos(),
			TargetFunction::XLogX => x * (x + 1.0).ln(),
		}
	}

	/// Evenly spaced x values over `[-5, 5]`, dropping points where the
	/// function is undefined.
	pub fn domain(self) -> Vec<f64> {
		let step = (DOMAIN_MAX - DOMAIN_MIN) / (DOMAIN_POINTS - 1) as f64;
		(0..DOMAIN_POINTS)
			.map(|i| DOMAIN_MIN + i as f64 * step)
			.filter(|&x| self.eval(x).is_finite())
			.collect()
	}

	pub fn points(self) -> Vec<(f64, f64)> {
		self.domain().into_iter().map(|x| (x, self.eval(x))).collect()
	}

	pub fn samples(self) -> Vec<Sample> {
		self.points().into_iter().map(|(x, y)| Sample::scalar(x, y)).collect()
	}
}
