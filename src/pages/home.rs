use leptos::prelude::*;
use leptos_router::components::A;

use crate::architecture::ArchitectureState;
use crate::components::header::Header;
use crate::components::network_diagram::types::Viewport;
use crate::components::network_diagram::{LayoutParams, NetworkDiagram, ViewportPolicy};

const PREVIEW: Viewport = Viewport::new(240.0, 160.0);

/// Small static diagram shown on a landing card.
#[component]
fn Preview(state: ArchitectureState, params: LayoutParams) -> impl IntoView {
	let architecture = Signal::stored(state.architecture().unwrap_or_default());
	view! {
		<div class="card-preview">
			<NetworkDiagram
				architecture=architecture
				params=Signal::stored(params.with_labels(false))
				policy=ViewportPolicy::Fixed(PREVIEW)
			/>
		</div>
	}
}

/// Landing page linking to the two playgrounds.
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<div class="page">
			<Header title="VisualNet" />
			<div class="cards">
				<A href="/mlp" attr:class="card">
					<Preview
						state=ArchitectureState::mlp().with_hidden(vec![4, 4])
						params=LayoutParams::default()
					/>
					<h5>"Simple MLP"</h5>
					<p>
						"Build the best neural network you can to approximate a function!"
					</p>
				</A>
				<A href="/mnist" attr:class="card">
					<Preview
						state=ArchitectureState::mnist().with_hidden(vec![16, 16])
						params=LayoutParams::mnist()
					/>
					<h5>"MNIST Classification"</h5>
					<p>
						"Shape a digit classifier and watch its class probabilities as it trains."
					</p>
				</A>
			</div>
		</div>
	}
}
