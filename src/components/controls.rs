//! Settings-panel inputs.

use leptos::prelude::*;

use crate::training::TargetFunction;

#[component]
pub fn IncDecButton(
	#[prop(into)] label: String,
	#[prop(into)] value: Signal<usize>,
	on_dec: Callback<()>,
	on_inc: Callback<()>,
) -> impl IntoView {
	view! {
		<div class="inc-dec">
			<label class="control-label">{label}</label>
			<div class="inc-dec-row">
				<button type="button" class="inc-dec-button" on:click=move |_| on_dec.run(())>
					"-"
				</button>
				<input
					type="text"
					class="inc-dec-value"
					readonly=true
					prop:value=move || value.get().to_string()
				/>
				<button type="button" class="inc-dec-button" on:click=move |_| on_inc.run(())>
					"+"
				</button>
			</div>
		</div>
	}
}

#[component]
pub fn Slider(
	#[prop(into)] label: String,
	#[prop(into)] value: Signal<usize>,
	min: usize,
	max: usize,
	on_input: Callback<usize>,
) -> impl IntoView {
	view! {
		<div class="slider">
			<p class="control-label">{label}</p>
			<input
				type="range"
				min=min.to_string()
				max=max.to_string()
				prop:value=move || value.get().to_string()
				on:input=move |ev| {
					if let Ok(v) = event_target_value(&ev).parse::<usize>() {
						on_input.run(v.clamp(min, max));
					}
				}
			/>
			<span class="slider-value">{move || value.get()}</span>
		</div>
	}
}

#[component]
pub fn Toggle(
	#[prop(into)] label: String,
	#[prop(into)] checked: Signal<bool>,
	on_toggle: Callback<bool>,
) -> impl IntoView {
	view! {
		<label class="toggle">
			<input
				type="checkbox"
				prop:checked=checked
				on:change=move |ev| on_toggle.run(event_target_checked(&ev))
			/>
			<span class="control-label">{label}</span>
		</label>
	}
}

#[component]
pub fn FunctionSelect(
	#[prop(into)] value: Signal<TargetFunction>,
	on_change: Callback<TargetFunction>,
) -> impl IntoView {
	view! {
		<div class="function-select">
			<p class="control-label">"Generating function"</p>
			<select
				prop:value=move || value.get().index().to_string()
				on:change=move |ev| {
					let picked = event_target_value(&ev)
						.parse::<usize>()
						.ok()
						.and_then(TargetFunction::from_index);
					if let Some(f) = picked {
						on_change.run(f);
					}
				}
			>
				{TargetFunction::ALL
					.into_iter()
					.map(|f| view! { <option value=f.index().to_string()>{f.label()}</option> })
					.collect_view()}
			</select>
		</div>
	}
}
