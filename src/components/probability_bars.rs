use leptos::prelude::*;

use crate::training::dataset::DIGIT_CLASSES;

/// Bar width in percent; an empty bar still shows a 10% stub.
pub fn bar_width(probability: f64) -> f64 {
	let p = if probability.is_finite() {
		probability.clamp(0.0, 1.0)
	} else {
		0.0
	};
	p * 90.0 + 10.0
}

pub fn percent_label(probability: f64) -> String {
	let p = if probability.is_finite() { probability } else { 0.0 };
	format!("{:.1}%", p * 100.0)
}

/// One bar per digit class; missing entries read as zero.
#[component]
pub fn ProbabilityBars(#[prop(into)] probabilities: Signal<Vec<f64>>) -> impl IntoView {
	let row = move |digit: usize| {
		let p = move || probabilities.with(|ps| ps.get(digit).copied().unwrap_or(0.0));
		view! {
			<div class="prob-row">
				<div class="prob-digit">{digit}</div>
				<div class="prob-track">
					<div class="prob-fill" style:width=move || format!("{}%", bar_width(p()))></div>
				</div>
				<div class="prob-label">{move || percent_label(p())}</div>
			</div>
		}
	};

	view! { <div class="probability-bars">{(0..DIGIT_CLASSES).map(row).collect_view()}</div> }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bars_never_vanish() {
		assert_eq!(bar_width(0.0), 10.0);
		assert_eq!(bar_width(1.0), 100.0);
		assert_eq!(bar_width(0.5), 55.0);
		assert_eq!(bar_width(f64::NAN), 10.0);
		assert_eq!(bar_width(3.0), 100.0);
	}

	#[test]
	fn labels_show_one_decimal() {
		assert_eq!(percent_label(0.1234), "12.3%");
		assert_eq!(percent_label(1.0), "100.0%");
		assert_eq!(percent_label(f64::INFINITY), "0.0%");
	}
}
