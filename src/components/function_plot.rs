//! 2D plot of a target function and, once training starts, the model's
//! predictions over the same domain.

use std::fmt::Write as _;

use leptos::prelude::*;

use super::network_diagram::scale::LinearScale;

pub const PLOT_WIDTH: f64 = 500.0;
pub const PLOT_HEIGHT: f64 = 500.0;
const MARGIN_TOP: f64 = 10.0;
const MARGIN_RIGHT: f64 = 10.0;
const MARGIN_BOTTOM: f64 = 20.0;
const MARGIN_LEFT: f64 = 30.0;
const TICKS: usize = 10;

const TARGET_COLOR: &str = "#3b82f6";
const PREDICTION_COLOR: &str = "#3b8255";

/// Round tick values covering `[min, max]` with roughly `count` steps.
pub fn ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
	let span = max - min;
	if !(span.is_finite() && span > 0.0) || count == 0 {
		return vec![min];
	}
	let raw = span / count as f64;
	let mut step = 10f64.powf(raw.log10().floor());
	let err = raw / step;
	if err >= 50f64.sqrt() {
		step *= 10.0;
	} else if err >= 10f64.sqrt() {
		step *= 5.0;
	} else if err >= 2f64.sqrt() {
		step *= 2.0;
	}
	let first = (min / step).ceil() as i64;
	let last = (max / step).floor() as i64;
	(first..=last).map(|i| i as f64 * step).collect()
}

/// Scales from data space into the plot's inner area.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotFrame {
	pub x: LinearScale,
	pub y: LinearScale,
	pub x_domain: (f64, f64),
	pub y_domain: (f64, f64),
	pub inner_width: f64,
	pub inner_height: f64,
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
	values
		.filter(|v| v.is_finite())
		.fold(None, |acc, v| match acc {
			None => Some((v, v)),
			Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
		})
}

impl PlotFrame {
	/// Frames `points` with 5% vertical headroom. Predictions are not part
	/// of the frame; they are clamped to it.
	pub fn fit(points: &[(f64, f64)], width: f64, height: f64) -> Self {
		let inner_width = (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
		let inner_height = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
		let widen = |(lo, hi): (f64, f64)| if hi > lo { (lo, hi) } else { (lo - 1.0, hi + 1.0) };
		let x_domain = widen(extent(points.iter().map(|p| p.0)).unwrap_or((0.0, 1.0)));
		let (y_lo, y_hi) = widen(extent(points.iter().map(|p| p.1)).unwrap_or((0.0, 1.0)));
		let pad = (y_hi - y_lo) * 0.05;
		let y_domain = (y_lo - pad, y_hi + pad);
		Self {
			x: LinearScale::new(x_domain, (0.0, inner_width)),
			y: LinearScale::new(y_domain, (inner_height, 0.0)),
			x_domain,
			y_domain,
			inner_width,
			inner_height,
		}
	}

	/// SVG path through `points`, skipping non-finite samples.
	pub fn path(&self, points: &[(f64, f64)]) -> String {
		let mut d = String::new();
		for (x, y) in points.iter().filter(|(x, y)| x.is_finite() && y.is_finite()) {
			let cmd = if d.is_empty() { 'M' } else { 'L' };
			let _ = write!(d, "{cmd}{:.2},{:.2}", self.x.apply(*x), self.y.apply(*y));
		}
		d
	}

	pub fn x_ticks(&self) -> Vec<f64> {
		ticks(self.x_domain.0, self.x_domain.1, TICKS)
	}

	pub fn y_ticks(&self) -> Vec<f64> {
		ticks(self.y_domain.0, self.y_domain.1, TICKS)
	}
}

fn tick_label(v: f64) -> String {
	let s = format!("{v:.2}");
	s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[component]
pub fn FunctionPlot(
	#[prop(into)] target: Signal<Vec<(f64, f64)>>,
	#[prop(into)] predictions: Signal<Option<Vec<(f64, f64)>>>,
) -> impl IntoView {
	let frame = Memo::new(move |_| target.with(|t| PlotFrame::fit(t, PLOT_WIDTH, PLOT_HEIGHT)));

	let grid = move || {
		let f = frame.get();
		let vertical = f.x_ticks().into_iter().map(|t| {
			let x = f.x.apply(t);
			view! {
				<line class="grid" x1=x x2=x y1=0.0 y2=f.inner_height />
				<text class="tick" x=x y=f.inner_height + 14.0 text-anchor="middle">
					{tick_label(t)}
				</text>
			}
		});
		let horizontal = f.y_ticks().into_iter().map(|t| {
			let y = f.y.apply(t);
			view! {
				<line class="grid" x1=0.0 x2=f.inner_width y1=y y2=y />
				<text class="tick" x=-4.0 y=y dy=".32em" text-anchor="end">{tick_label(t)}</text>
			}
		});
		(vertical.collect_view(), horizontal.collect_view())
	};

	let target_path = move || target.with(|t| frame.get().path(t));
	let prediction_path = move || {
		predictions.with(|p| p.as_ref().map(|p| frame.get().path(p))).unwrap_or_default()
	};

	view! {
		<svg
			class="function-plot"
			width=PLOT_WIDTH
			height=PLOT_HEIGHT
			viewBox=format!("0 0 {PLOT_WIDTH} {PLOT_HEIGHT}")
		>
			<g transform=format!("translate({MARGIN_LEFT},{MARGIN_TOP})")>
				<g class="axis-grid" stroke="#e5e7eb">{grid}</g>
				<line
					class="axis"
					x1=0.0
					x2=0.0
					y1=0.0
					y2=move || frame.get().inner_height
					stroke="#000"
				/>
				<line
					class="axis"
					x1=0.0
					x2=move || frame.get().inner_width
					y1=move || frame.get().inner_height
					y2=move || frame.get().inner_height
					stroke="#000"
				/>
				<path class="model-line" d=target_path fill="none" stroke=TARGET_COLOR />
				<path class="eval-line" d=prediction_path fill="none" stroke=PREDICTION_COLOR />
			</g>
		</svg>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ticks_are_round() {
		let expected: Vec<f64> = (-5..=5).map(f64::from).collect();
		assert_eq!(ticks(-5.0, 5.0, 10), expected);
		assert_eq!(ticks(0.0, 20.0, 4), vec![0.0, 5.0, 10.0, 15.0, 20.0]);
		assert_eq!(ticks(3.0, 3.0, 10), vec![3.0]);
	}

	#[test]
	fn frame_maps_extent_to_inner_area() {
		let points = [(-5.0, 0.0), (0.0, 10.0), (5.0, 20.0)];
		let f = PlotFrame::fit(&points, PLOT_WIDTH, PLOT_HEIGHT);
		assert_eq!(f.inner_width, 460.0);
		assert_eq!(f.inner_height, 470.0);
		assert_eq!(f.x.apply(-5.0), 0.0);
		assert_eq!(f.x.apply(5.0), 460.0);
		// y grows upward and keeps headroom
		assert!(f.y.apply(20.0) > 0.0);
		assert!(f.y.apply(0.0) < 470.0);
		assert!(f.y.apply(20.0) < f.y.apply(0.0));
	}

	#[test]
	fn flat_data_still_frames() {
		let f = PlotFrame::fit(&[(1.0, 2.0)], PLOT_WIDTH, PLOT_HEIGHT);
		assert!(f.x_domain.1 > f.x_domain.0);
		assert!(f.y_domain.1 > f.y_domain.0);
		assert!(PlotFrame::fit(&[], PLOT_WIDTH, PLOT_HEIGHT).path(&[]).is_empty());
	}

	#[test]
	fn path_skips_non_finite_samples() {
		let f = PlotFrame::fit(&[(0.0, 0.0), (1.0, 1.0)], PLOT_WIDTH, PLOT_HEIGHT);
		let d = f.path(&[(0.0, 0.0), (0.5, f64::NAN), (1.0, 1.0)]);
		assert!(d.starts_with("M0.00,"));
		assert_eq!(d.matches('L').count(), 1);
	}

	#[test]
	fn tick_labels_drop_trailing_zeros() {
		assert_eq!(tick_label(5.0), "5");
		assert_eq!(tick_label(0.25), "0.25");
		assert_eq!(tick_label(-1.5), "-1.5");
	}
}
