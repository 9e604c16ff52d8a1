pub mod home;
pub mod mlp;
pub mod mnist;
pub mod not_found;

use leptos::prelude::*;
use log::warn;

use crate::architecture::ArchitectureState;
use crate::components::controls::IncDecButton;
use crate::components::network_diagram::Architecture;

/// Full architecture derived from the settings, holding on to the last valid
/// one if an edit ever produces something undrawable.
fn drawable_architecture(state: RwSignal<ArchitectureState>) -> Memo<Architecture> {
	Memo::new(move |prev: Option<&Architecture>| match state.with(ArchitectureState::architecture) {
		Ok(architecture) => architecture,
		Err(e) => {
			warn!("keeping previous architecture: {e}");
			prev.cloned().unwrap_or_default()
		}
	})
}

/// Hidden-layer count control shared by both pages.
#[component]
fn LayerCountControl(state: RwSignal<ArchitectureState>) -> impl IntoView {
	view! {
		<IncDecButton
			label="Hidden layers"
			value=Signal::derive(move || state.with(ArchitectureState::hidden_layer_count))
			on_dec=Callback::new(move |_| state.update(|s| *s = s.decrement_layer_count()))
			on_inc=Callback::new(move |_| state.update(|s| *s = s.increment_layer_count()))
		/>
	}
}
