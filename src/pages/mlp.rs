use leptos::prelude::*;
use log::info;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::{LayerCountControl, drawable_architecture};
use crate::architecture::ArchitectureState;
use crate::components::controls::{FunctionSelect, IncDecButton, Slider, Toggle};
use crate::components::function_plot::FunctionPlot;
use crate::components::header::Header;
use crate::components::network_diagram::model::LabelStyle;
use crate::components::network_diagram::{Direction, EdgeShape, LayoutParams, NetworkDiagram};
use crate::components::notification::{Notice, Notification};
use crate::training::export::{EXPORT_FILE_NAME, export_json};
use crate::training::model::EpochMetrics;
use crate::training::run::drive;
use crate::training::{
	DenseModel, Generation, ModelSpec, TargetFunction, TrainableModel, TrainingPlan, TrainingRun,
};

const MAX_EPOCHS: usize = 2000;
const MAX_BATCH_SIZE: usize = 128;

fn diagram_params(
	show_bias: bool,
	show_labels: bool,
	bezier: bool,
	sideways: bool,
) -> LayoutParams {
	LayoutParams {
		between_layers: 160.0,
		label_style: LabelStyle::Dimension,
		..LayoutParams::default()
	}
	.with_bias(show_bias)
	.with_labels(show_labels)
	.with_edge_shape(if bezier {
		EdgeShape::Bezier
	} else {
		EdgeShape::Straight
	})
	.with_direction(if sideways {
		Direction::LeftToRight
	} else {
		Direction::TopToBottom
	})
}

/// Function-fitting page: build a small regression network and watch it
/// learn a generating function.
#[component]
pub fn Mlp() -> impl IntoView {
	let state = RwSignal::new(ArchitectureState::mlp());
	let architecture = drawable_architecture(state);

	let show_bias = RwSignal::new(false);
	let show_labels = RwSignal::new(true);
	let bezier = RwSignal::new(true);
	let sideways = RwSignal::new(false);
	let params = Memo::new(move |_| {
		diagram_params(show_bias.get(), show_labels.get(), bezier.get(), sideways.get())
	});

	let batch_size = RwSignal::new(32usize);
	let epochs = RwSignal::new(500usize);
	let function = RwSignal::new(TargetFunction::default());
	let target = Memo::new(move |_| function.get().points());
	let predictions = RwSignal::new(None::<Vec<(f64, f64)>>);
	let progress = RwSignal::new(None::<EpochMetrics>);
	let training = RwSignal::new(false);
	let export = RwSignal::new(None::<String>);
	let notice = RwSignal::new(None::<Notice>);

	// any change to what is being learned invalidates the running fit
	let generation = Generation::default();
	let generation_reset = generation.clone();
	Effect::new(move |_| {
		architecture.track();
		function.track();
		generation_reset.bump();
		predictions.set(None);
		progress.set(None);
		training.set(false);
		export.set(None);
	});

	let on_train = move |_| {
		let f = function.get_untracked();
		let seed: u64 = rand::random();
		let spec = ModelSpec::regression(architecture.get_untracked());
		let model = DenseModel::new(&spec, &mut SmallRng::seed_from_u64(seed));
		let plan = TrainingPlan::function_fit(epochs.get_untracked(), batch_size.get_untracked());
		let run = match TrainingRun::new(model, f.samples(), plan, seed) {
			Ok(run) => run,
			Err(e) => {
				notice.set(Some(Notice::error(e.to_string())));
				return;
			}
		};
		info!("training {} on {} for {} epochs", spec.architecture, f.label(), plan.epochs);
		let token = generation.bump();
		training.set(true);
		notice.set(None);

		let xs = f.domain();
		drive(
			run,
			token,
			move |model: &DenseModel, metrics| {
				let ys = xs
					.iter()
					.filter_map(|&x| {
						let y = model.predict(&[x]).ok()?;
						y.first().map(|y| (x, *y))
					})
					.collect();
				predictions.set(Some(ys));
				progress.set(Some(metrics));
			},
			move |result| {
				training.set(false);
				let exported =
					result.and_then(|run| export_json(&run.into_model(), &params.get_untracked()));
				match exported {
					Ok(json) => export.set(Some(json)),
					Err(e) => notice.set(Some(Notice::error(e.to_string()))),
				}
			},
		);
	};

	let neuron_controls = move || {
		(0..state.with(ArchitectureState::hidden_layer_count))
			.map(|i| {
				view! {
					<IncDecButton
						label=format!("Neurons in layer {}", i + 1)
						value=Signal::derive(move || state.with(|s| s.neuron_count(i).unwrap_or(0)))
						on_dec=Callback::new(move |_| {
							state.update(|s| *s = s.decrement_neuron_count(i))
						})
						on_inc=Callback::new(move |_| {
							state.update(|s| *s = s.increment_neuron_count(i))
						})
					/>
				}
			})
			.collect_view()
	};

	let status = move || {
		progress.get().map(|m| format!("Epoch {} · loss {:.4}", m.epoch, m.loss))
	};

	view! {
		<div class="page">
			<Header title="Simple MLP" export=export file_name=EXPORT_FILE_NAME />
			<Notification notice=notice />
			<div class="columns">
				<div class="column">
					<FunctionPlot target=target predictions=predictions />
					<p class="status">{status}</p>
				</div>
				<div class="column diagram-column">
					<NetworkDiagram architecture=architecture params=params />
				</div>
				<div class="column settings">
					<h1>"Settings"</h1>
					<h2>"Architecture"</h2>
					<LayerCountControl state=state />
					{neuron_controls}
					<h2>"Diagram"</h2>
					<Toggle
						label="Show bias"
						checked=show_bias
						on_toggle=Callback::new(move |v| show_bias.set(v))
					/>
					<Toggle
						label="Show labels"
						checked=show_labels
						on_toggle=Callback::new(move |v| show_labels.set(v))
					/>
					<Toggle
						label="Curved edges"
						checked=bezier
						on_toggle=Callback::new(move |v| bezier.set(v))
					/>
					<Toggle
						label="Left to right"
						checked=sideways
						on_toggle=Callback::new(move |v| sideways.set(v))
					/>
					<h2>"Hyperparameters"</h2>
					<Slider
						label="Epochs"
						value=epochs
						min=1
						max=MAX_EPOCHS
						on_input=Callback::new(move |v| epochs.set(v))
					/>
					<FunctionSelect
						value=function
						on_change=Callback::new(move |f| function.set(f))
					/>
					<button class="train-button" prop:disabled=training on:click=on_train>
						"Train Model"
					</button>
				</div>
			</div>
		</div>
	}
}
